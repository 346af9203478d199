//! CLI command implementations

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::glob;

use crate::analyzer::{Analyzer, Verdict};
use crate::codec::DecodeMode;
use crate::config::Config;
use crate::http_server::HttpServer;
use crate::observability::{log_event_with_fields, set_min_severity, Event};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_line};

/// Options for one scan run
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Register every envelope in a file, not just the first
    pub all: bool,
    pub exhaustive: bool,
}

/// Outcome of scanning a file set
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Every verdict, in path order
    pub verdicts: Vec<(PathBuf, Verdict)>,
    pub files_scanned: usize,
    /// Files that matched the pattern but could not be read
    pub unreadable: Vec<PathBuf>,
    pub discoveries: usize,
    pub rejected: usize,
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run an already parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    set_min_severity(cli.log_level);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Scan {
            pattern,
            json,
            all,
            exhaustive,
        } => {
            let analyzer = Analyzer::new(config.analyzer);
            let summary = scan(&analyzer, &pattern, &json, ScanOptions { all, exhaustive })?;
            print_summary(&summary, &json)
        }
        Command::Analyze {
            path,
            source_id,
            exhaustive,
        } => {
            let analyzer = Analyzer::new(config.analyzer);
            let source_id = source_id.unwrap_or_else(|| path.display().to_string());
            let verdict = analyze(&analyzer, &path, &source_id, exhaustive)?;
            write_json(&verdict)
        }
        Command::Serve { port } => serve(config, port),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let config = Config::load(path)?;
    log_event_with_fields(Event::ConfigLoaded, &[("path", &path.display().to_string())]);
    Ok(config)
}

fn decode_mode(analyzer: &Analyzer, exhaustive: bool) -> DecodeMode {
    if exhaustive {
        DecodeMode::Exhaustive
    } else {
        analyzer.config().decode_mode
    }
}

/// Analyze every file matching `pattern`, in sorted path order, and write the
/// registry export to `export_path`.
///
/// Each file's path is its source id. Unreadable files are skipped and
/// reported in the summary.
pub fn scan(
    analyzer: &Analyzer,
    pattern: &str,
    export_path: &Path,
    options: ScanOptions,
) -> CliResult<ScanSummary> {
    log_event_with_fields(Event::ScanStart, &[("pattern", pattern)]);

    let mut paths: Vec<PathBuf> = glob(pattern)
        .map_err(|e| CliError::pattern_error(format!("invalid glob '{}': {}", pattern, e)))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mode = decode_mode(analyzer, options.exhaustive);
    let mut summary = ScanSummary {
        verdicts: Vec::new(),
        files_scanned: 0,
        unreadable: Vec::new(),
        discoveries: 0,
        rejected: 0,
    };

    for path in paths {
        let source_id = path.display().to_string();
        let verdicts = match read_input(analyzer, &path, &source_id) {
            Ok(Input::Bytes(bytes)) if options.all => {
                analyzer.analyze_all_with_mode(&source_id, &bytes, mode)
            }
            Ok(Input::Bytes(bytes)) => vec![analyzer.analyze_with_mode(&source_id, &bytes, mode)],
            Ok(Input::Oversized(verdict)) => vec![verdict],
            Err(e) => {
                log_event_with_fields(
                    Event::InputRejected,
                    &[("source_id", &source_id), ("reason", &e.to_string())],
                );
                summary.unreadable.push(path);
                continue;
            }
        };

        summary.files_scanned += 1;
        for verdict in verdicts {
            if verdict.valid {
                summary.discoveries += 1;
            } else {
                summary.rejected += 1;
            }
            summary.verdicts.push((path.clone(), verdict));
        }
    }

    let export = analyzer.registry().export()?;
    fs::write(export_path, serde_json::to_string_pretty(&export)?)?;
    log_event_with_fields(
        Event::ExportWritten,
        &[
            ("path", &export_path.display().to_string()),
            ("records", &export.len().to_string()),
        ],
    );
    log_event_with_fields(
        Event::ScanComplete,
        &[
            ("files", &summary.files_scanned.to_string()),
            ("discoveries", &summary.discoveries.to_string()),
            ("rejected", &summary.rejected.to_string()),
        ],
    );

    Ok(summary)
}

/// Analyze a single file
pub fn analyze(
    analyzer: &Analyzer,
    path: &Path,
    source_id: &str,
    exhaustive: bool,
) -> CliResult<Verdict> {
    let mode = decode_mode(analyzer, exhaustive);
    match read_input(analyzer, path, source_id)? {
        Input::Bytes(bytes) => Ok(analyzer.analyze_with_mode(source_id, &bytes, mode)),
        Input::Oversized(verdict) => Ok(verdict),
    }
}

enum Input {
    Bytes(Vec<u8>),
    Oversized(Verdict),
}

/// Reads a file unless its size already exceeds the analyzer's cap
fn read_input(analyzer: &Analyzer, path: &Path, source_id: &str) -> CliResult<Input> {
    let size = fs::metadata(path)
        .map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?
        .len();
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    if size > analyzer.config().max_input_bytes {
        return Ok(Input::Oversized(analyzer.oversized_verdict(source_id, size)));
    }
    let bytes =
        fs::read(path).map_err(|e| CliError::io_error(format!("{}: {}", path.display(), e)))?;
    Ok(Input::Bytes(bytes))
}

fn print_summary(summary: &ScanSummary, export_path: &Path) -> CliResult<()> {
    for (path, verdict) in &summary.verdicts {
        let line = match (verdict.sequence_number, verdict.codec_used) {
            (Some(sequence_number), Some(codec)) => {
                let found = verdict
                    .matches
                    .iter()
                    .map(|m| format!("{}@{}", m.label, m.offset))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "[FOUND] #{} -> {} ({}: {})",
                    sequence_number,
                    path.display(),
                    codec,
                    found
                )
            }
            _ => format!(
                "[SKIP] {}: {}",
                path.display(),
                verdict.error_code.as_deref().unwrap_or("ARMOR_UNKNOWN")
            ),
        };
        write_line(&line)?;
    }
    for path in &summary.unreadable {
        write_line(&format!("[UNREADABLE] {}", path.display()))?;
    }

    write_line("")?;
    write_line("--- Scan Complete ---")?;
    write_line(&format!("Files scanned: {}", summary.files_scanned))?;
    write_line(&format!("Discoveries: {}", summary.discoveries))?;
    write_line(&format!("Rejected: {}", summary.rejected))?;
    write_line(&format!("Export written to {}", export_path.display()))
}

/// Run the HTTP server until it stops
pub fn serve(config: Config, port: Option<u16>) -> CliResult<()> {
    let mut http_config = config.http;
    if let Some(port) = port {
        http_config.port = port;
    }

    let analyzer = Arc::new(Analyzer::new(config.analyzer));
    let server = HttpServer::with_config(http_config, analyzer);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}
