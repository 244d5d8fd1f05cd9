use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use previewgate_core::config::Config;
use previewgate_core::gate::{commas, Thresholds, GATE_ORDER};
use previewgate_core::parser::DEFAULT_MAX_REPORT_BYTES;
use previewgate_core::report::{AnalysisStatus, GateReport};
use previewgate_core::types::Severity;
use previewgate_core::{process_analysis, QueryAnalysis};

#[derive(Parser, Debug)]
#[command(
    name = "previewgate",
    version,
    about = "Breaks the build when a SonarQube preview report has too many new issues"
)]
struct Cli {
    /// Log filter directive, e.g. `debug` or `previewgate_core=trace`
    #[arg(long, env = "PREVIEWGATE_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the quality gate against a preview report
    Check {
        /// Preview report written by sonar.report.export.path
        #[arg(long, env = "SONAR_REPORT_EXPORT_PATH")]
        report_path: Option<String>,

        #[arg(long)]
        max_blockers: Option<u32>,

        /// Limit for new CRITICAL issues
        #[arg(long)]
        max_vulnerabilities: Option<u32>,

        #[arg(long)]
        max_majors: Option<u32>,

        #[arg(long)]
        max_minors: Option<u32>,

        /// Directory searched for a relative report path (repeatable)
        #[arg(long = "resource-dir")]
        resource_dirs: Vec<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "previewgate-out")]
        out: PathBuf,

        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    None,
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    orange: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    orange: "\x1b[38;5;208m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    orange: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let res = match cli.cmd {
        Commands::Check {
            report_path,
            max_blockers,
            max_vulnerabilities,
            max_majors,
            max_minors,
            resource_dirs,
            config,
            out,
            output_format,
        } => {
            let cli_limits = Thresholds {
                max_blockers,
                max_vulnerabilities,
                max_majors,
                max_minors,
            };
            load_config(config.as_deref())
                .and_then(|cfg| build_query(report_path, cli_limits, resource_dirs, &cfg))
                .and_then(|query| run_check(&query, &out, &output_format))
        }
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}preview{reset}{orange}|{reset}{dim}gate{reset}  {dim}sonar new-issue gate{reset}\n",
        bold = s.bold,
        orange = s.orange,
        dim = s.dim,
        reset = s.reset,
    );
}

fn severity_color(sev: Severity) -> &'static str {
    let s = style();
    match sev {
        Severity::Blocker | Severity::Critical => s.red,
        Severity::Major => s.yellow,
        Severity::Minor | Severity::Info | Severity::Other => s.dim,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load(p).context("failed to load config"),
        None => Ok(Config::discover()
            .context("failed to load discovered config")?
            .unwrap_or_default()),
    }
}

const MISSING_REPORT_PATH: &str = "no report path: pass --report-path, \
    set SONAR_REPORT_EXPORT_PATH or report_path in previewgate.toml";

/// Command-line limits win over the config file, per severity.
fn merge_thresholds(cli: Thresholds, cfg: Thresholds) -> Thresholds {
    Thresholds {
        max_blockers: cli.max_blockers.or(cfg.max_blockers),
        max_vulnerabilities: cli.max_vulnerabilities.or(cfg.max_vulnerabilities),
        max_majors: cli.max_majors.or(cfg.max_majors),
        max_minors: cli.max_minors.or(cfg.max_minors),
    }
}

fn build_query(
    report_path: Option<String>,
    cli_limits: Thresholds,
    resource_dirs: Vec<PathBuf>,
    cfg: &Config,
) -> anyhow::Result<QueryAnalysis> {
    let report_path = report_path
        .or_else(|| cfg.report_path.clone())
        .context(MISSING_REPORT_PATH)?;

    let mut dirs = cfg.resource_dirs.clone();
    dirs.extend(resource_dirs);

    Ok(
        QueryAnalysis::new(report_path, merge_thresholds(cli_limits, cfg.thresholds()))
            .with_resource_dirs(dirs)
            .with_max_report_bytes(cfg.max_report_bytes.unwrap_or(DEFAULT_MAX_REPORT_BYTES)),
    )
}

fn print_report(report: &GateReport, out: &Path, format: &OutputFormat) {
    let s = style();
    let counts = &report.summary.new_by_severity;

    eprintln!(
        "  {dim}issues        {reset}{bold}{}{reset} {dim}({} new){reset}",
        commas(report.summary.total_issues),
        commas(report.summary.new_issues),
        dim = s.dim,
        bold = s.bold,
        reset = s.reset
    );
    for severity in GATE_ORDER {
        let limit = report
            .thresholds
            .limit_for(severity)
            .map(|m| commas(u64::from(m)))
            .unwrap_or_else(|| "-".to_string());
        eprintln!(
            "  {sc}{:<13}{reset} {bold}{}{reset} {dim}/ {}{reset}",
            severity.as_str(),
            commas(counts.get(severity)),
            limit,
            sc = severity_color(severity),
            bold = s.bold,
            dim = s.dim,
            reset = s.reset
        );
    }

    let files: &[&str] = match format {
        OutputFormat::Json => &["report.json", "report.md"],
        OutputFormat::Markdown => &["report.md"],
        OutputFormat::None => &[],
    };
    if !files.is_empty() {
        eprintln!();
        for f in files {
            eprintln!(
                "  {dim}\u{2192} {}{reset}",
                out.join(f).display(),
                dim = s.dim,
                reset = s.reset
            );
        }
    }
    eprintln!();
}

fn write_outputs(report: &GateReport, out: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    if matches!(format, OutputFormat::None) {
        return Ok(());
    }

    std::fs::create_dir_all(out).with_context(|| format!("create out dir {}", out.display()))?;

    if matches!(format, OutputFormat::Json) {
        let json_path = out.join("report.json");
        let json = serde_json::to_vec_pretty(report).context("serialize report json")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("write {}", json_path.display()))?;
    }

    let md_path = out.join("report.md");
    std::fs::write(&md_path, report.to_markdown())
        .with_context(|| format!("write {}", md_path.display()))?;

    Ok(())
}

fn exit_code_for(status: AnalysisStatus) -> u8 {
    match status {
        AnalysisStatus::Error => 2,
        AnalysisStatus::Warn | AnalysisStatus::Info | AnalysisStatus::Success => 0,
    }
}

fn run_check(
    query: &QueryAnalysis,
    out: &Path,
    output_format: &OutputFormat,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    print_banner();

    let report = process_analysis(query).context("problems processing the preview analysis")?;

    write_outputs(&report, out, output_format)?;

    let counts = &report.summary.new_by_severity;
    // Machine-parseable line on stdout
    println!(
        "status={} new_issues={} blocker={} critical={} major={} minor={}",
        report.result.status(),
        report.summary.new_issues,
        counts.blocker,
        counts.critical,
        counts.major,
        counts.minor
    );

    // Human-readable output on stderr
    print_report(&report, out, output_format);

    let status = report.result.status();
    let message = report.result.message().unwrap_or_default();
    match status {
        AnalysisStatus::Error => {
            error!("{message}");
            eprintln!(
                "  {red}{bold}GATE FAILED{reset}  Build does not pass the preview analysis. {}",
                message,
                red = s.red,
                bold = s.bold,
                reset = s.reset,
            );
        }
        AnalysisStatus::Warn => eprintln!(
            "  {yellow}{bold}WARN{reset}  Build with warnings. {}",
            message,
            yellow = s.yellow,
            bold = s.bold,
            reset = s.reset,
        ),
        AnalysisStatus::Info => eprintln!(
            "  {bold}INFO{reset}  Build with some info messages. {}",
            message,
            bold = s.bold,
            reset = s.reset,
        ),
        AnalysisStatus::Success => eprintln!(
            "  {green}{bold}PASS{reset}  Build ok.",
            green = s.green,
            bold = s.bold,
            reset = s.reset
        ),
    }

    eprintln!();

    Ok(std::process::ExitCode::from(exit_code_for(status)))
}
