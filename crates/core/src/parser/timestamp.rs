//! Preview timestamps: `yyyy-MM-dd'T'HH:mm:ss`, optionally followed by
//! fractional seconds and a UTC offset, both of which are dropped.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static RE_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?$")
        .expect("valid regex")
});

pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
    let cap = RE_TIMESTAMP
        .captures(raw.trim())
        .ok_or_else(|| format!("timestamp {raw:?} does not match yyyy-MM-dd'T'HH:mm:ss"))?;
    let local = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
    NaiveDateTime::parse_from_str(local, FORMAT).map_err(|e| format!("timestamp {raw:?}: {e}"))
}

pub mod option {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => s.serialize_str(&ts.format(super::FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(d)? {
            Some(raw) => super::parse(&raw).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
