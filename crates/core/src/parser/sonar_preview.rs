use std::io::Read;

use crate::types::Preview;

pub fn parse_preview<R: Read>(r: R) -> serde_json::Result<Preview> {
    serde_json::from_reader(r)
}
