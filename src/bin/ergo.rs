//! Ergo CLI - Command-line interface for Ergo Flux
//!
//! Commands:
//! - analyze: Process a file of landmark frames into reports (batch mode)
//! - run: Process streaming frames from stdin (streaming mode)
//! - validate: Validate frame record schema
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ergo_flux::config::AnalyzerConfig;
use ergo_flux::encoder::ReportPayload;
use ergo_flux::pipeline::ErgoProcessor;
use ergo_flux::schema::{FrameRecord, FrameRecordAdapter, FRAME_SCHEMA_VERSION};
use ergo_flux::{ERGO_VERSION, PRODUCER_NAME};

/// Ergo - Ergonomic risk analytics for pose landmark streams
#[derive(Parser)]
#[command(name = "ergo")]
#[command(version = ERGO_VERSION)]
#[command(about = "Turn pose landmarks into ergonomic risk reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze landmark frames into reports (batch mode)
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Analyzer configuration (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the session summary to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Process streaming frames from stdin (streaming mode)
    Run {
        /// Analyzer configuration (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,

        /// Write the session summary to this file on exit
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Validate frame record schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (pose.landmark_frame.v1)
    Input,
    /// Output schema (per-frame report payload)
    Output,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ErgoCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
            summary,
        } => cmd_analyze(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            summary.as_deref(),
        ),

        Commands::Run {
            config,
            flush,
            summary,
        } => cmd_run(config.as_deref(), flush, summary.as_deref()),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    summary: Option<&Path>,
) -> Result<(), ErgoCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;

    if records.is_empty() {
        return Err(ErgoCliError::NoFrames);
    }

    let mut processor = ErgoProcessor::with_config(load_config(config)?);
    info!("analyzing {} frames", records.len());

    let mut payloads: Vec<ReportPayload> = Vec::with_capacity(records.len());
    for record in &records {
        payloads.push(processor.process_record(record)?);
    }

    let output_data = format_output(&payloads, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    if let Some(path) = summary {
        fs::write(path, serde_json::to_string_pretty(&processor.summary())?)?;
    }

    Ok(())
}

fn cmd_run(config: Option<&Path>, flush: bool, summary: Option<&Path>) -> Result<(), ErgoCliError> {
    let mut processor = ErgoProcessor::with_config(load_config(config)?);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let record: FrameRecord = serde_json::from_str(trimmed)
            .map_err(|e| ErgoCliError::ParseError(format!("Failed to parse frame: {}", e)))?;

        let payload = processor.process_record(&record)?;
        writeln!(stdout, "{}", serde_json::to_string(&payload)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    let stats = processor.summary();
    info!(
        "stream closed after {} frames ({} with pose)",
        stats.frames_seen, stats.frames_with_pose
    );

    if let Some(path) = summary {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), ErgoCliError> {
    let input_data = read_input(input)?;
    let records = parse_records(&input_data, &input_format)?;

    let results = FrameRecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_frames: records.len(),
        valid_frames: records.len() - results.len(),
        invalid_frames: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                frame_id: r.frame_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Frame {} (index {}): {}",
                    err.frame_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(ErgoCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ErgoCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "ergo_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Ergo Flux version {}", ERGO_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Input schema: {}", FRAME_SCHEMA_VERSION),
        },
    ];

    if let Some(path) = config {
        let check = if !path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match AnalyzerConfig::load(path) {
                Ok(cfg) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid ({:?} mode, min visibility {}, score window {})",
                        cfg.mode, cfg.min_visibility, cfg.score_window
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            }
        };
        checks.push(check);
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (streaming mode ready)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ERGO_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Ergo Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ErgoCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), ErgoCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", FRAME_SCHEMA_VERSION);
                println!();
                println!("One record per captured frame:");
                println!();
                println!("- timestamp_ms: capture time on a monotonic clock (required)");
                println!("- source_id: camera/video/photo identifier; a change starts a new session");
                println!("- frame_id: optional record identifier");
                println!("- landmarks: array of {{ x, y, z?, visibility? }} in pose-model index");
                println!("  order (33 points), or null when no person was detected");
                println!();
                println!("Coordinates are normalized to the frame (0-1), y grows downward.");
                println!("Landmarks with visibility below the configured minimum are ignored.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: per-frame report payload");
                println!();
                println!("- ergo_version, producer: {{ name, version, instance_id }}");
                println!("- timestamp_ms, computed_at_utc, source_id?");
                println!("- pose_detected: false when no usable pose was found");
                println!("- report (null without a pose):");
                println!("  - score (0-100), risk (Low/Medium/High)");
                println!("  - angles: {{ neckFlexionDeg, trunkLeanDeg, shoulderTiltDeg, elbows?, knees? }}");
                println!("  - issues: [{{ id, title, severity, measured, whyItMatters, fix }}]");
                println!("  - lever: {{ shoulderMomentIndex, lowBackMomentIndex, strainIndex, strainLevel, points, force }}");
                println!("  - action: {{ label, confidence, notes? }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, ErgoCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(data: &str, format: &InputFormat) -> Result<Vec<FrameRecord>, ErgoCliError> {
    let records = match format {
        InputFormat::Ndjson => FrameRecordAdapter::parse_ndjson(data)?,
        InputFormat::Json => FrameRecordAdapter::parse_array(data)?,
    };
    debug!("parsed {} frame records", records.len());
    Ok(records)
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, ErgoCliError> {
    match path {
        Some(path) => Ok(AnalyzerConfig::load(path)?),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn format_output(payloads: &[ReportPayload], format: &OutputFormat) -> Result<String, ErgoCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::with_capacity(payloads.len());
            for payload in payloads {
                lines.push(serde_json::to_string(payload)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": FRAME_SCHEMA_VERSION,
        "description": "Timestamped pose landmark frame",
        "type": "object",
        "required": ["timestamp_ms"],
        "properties": {
            "schema_version": { "type": "string", "const": FRAME_SCHEMA_VERSION },
            "frame_id": { "type": "string" },
            "timestamp_ms": { "type": "number", "minimum": 0 },
            "source_id": { "type": "string" },
            "landmarks": {
                "type": ["array", "null"],
                "maxItems": 33,
                "items": {
                    "type": "object",
                    "required": ["x", "y"],
                    "properties": {
                        "x": { "type": "number" },
                        "y": { "type": "number" },
                        "z": { "type": "number" },
                        "visibility": { "type": "number", "minimum": 0, "maximum": 1 }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "ergo report payload",
        "type": "object",
        "required": ["ergo_version", "producer", "timestamp_ms", "computed_at_utc", "pose_detected", "report"],
        "properties": {
            "ergo_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "timestamp_ms": { "type": "number" },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "source_id": { "type": "string" },
            "pose_detected": { "type": "boolean" },
            "report": {
                "type": ["object", "null"],
                "required": ["score", "risk", "angles", "issues"],
                "properties": {
                    "score": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "risk": { "enum": ["Low", "Medium", "High"] },
                    "angles": { "type": "object" },
                    "issues": { "type": "array", "items": { "type": "object" } },
                    "lever": { "type": "object" },
                    "action": { "type": "object" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum ErgoCliError {
    Io(io::Error),
    Compute(ergo_flux::ComputeError),
    Json(serde_json::Error),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for ErgoCliError {
    fn from(e: io::Error) -> Self {
        ErgoCliError::Io(e)
    }
}

impl From<ergo_flux::ComputeError> for ErgoCliError {
    fn from(e: ergo_flux::ComputeError) -> Self {
        ErgoCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ErgoCliError {
    fn from(e: serde_json::Error) -> Self {
        ErgoCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ErgoCliError> for CliError {
    fn from(e: ErgoCliError) -> Self {
        match e {
            ErgoCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ErgoCliError::Compute(ergo_flux::ComputeError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'ergo doctor --config <file>' for details".to_string()),
            },
            ErgoCliError::Compute(ergo_flux::ComputeError::InvalidFrame(msg)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'ergo validate' for details".to_string()),
            },
            ErgoCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", FRAME_SCHEMA_VERSION)),
            },
            ErgoCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ErgoCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ErgoCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            ErgoCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            ErgoCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    frame_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
