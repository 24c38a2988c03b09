//! Command-line interface.
//!
//! `lambda` serves the delivery stream. The other commands run the same
//! code paths locally: `invoke` replays an invocation event, `catalog`
//! prints the table the crawler keeps in sync, and `config` inspects the
//! resolved configuration.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use gm_catalog::{decode_payload, StorageLayout, TableDefinition};
use gm_common::{Error, OutputFormat, PartitionKeys, RecordId, Result, SCHEMA_VERSION};
use gm_config::{
    config_schema, resolve_config, validate, ConfigPaths, LogFormat, ResolvedConfig,
    TimeZoneMode, ValidationResult, CONFIG_SCHEMA_VERSION,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::exit_codes::ExitCode;
use crate::firehose::{FirehoseEvent, FirehoseResponse};
use crate::logging::init_logging;
use crate::transform::Transformer;

/// Glue metrics record transformer.
#[derive(Parser, Debug)]
#[command(name = "gm-core", version, about, long_about = None)]
pub struct Cli {
    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json, env = "GM_FORMAT")]
    pub format: OutputFormat,

    /// Configuration file (overrides GM_CONFIG and the config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve delivery stream invocations through the Lambda runtime API
    Lambda,
    /// Transform one invocation event read from a file or stdin
    Invoke(InvokeArgs),
    /// Print the catalog table definition and delivery prefixes
    Catalog(CatalogArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Invocation event JSON ("-" reads stdin)
    #[arg(long, value_name = "PATH")]
    pub event: PathBuf,

    /// Time zone for partition keys (local, utc or an offset like +09:00)
    #[arg(long, value_name = "ZONE")]
    pub time_zone: Option<TimeZoneMode>,

    /// Print only the response the delivery stream would receive
    #[arg(long, conflicts_with = "preview")]
    pub response_only: bool,

    /// Read each transformed payload against the catalog table schema
    #[arg(long)]
    pub preview: bool,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Bucket holding delivered objects (overrides catalog.bucket_name)
    #[arg(long, value_name = "NAME")]
    pub bucket: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where it came from
    Show,
    /// Validate the resolved configuration
    Validate,
    /// Print the JSON Schema of the configuration file
    Schema,
}

impl Commands {
    /// Log format used when the configuration does not set one.
    fn default_log_format(&self) -> LogFormat {
        match self {
            Commands::Lambda => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Commands::Lambda => "lambda",
            Commands::Invoke(_) => "invoke",
            Commands::Catalog(_) => "catalog",
            Commands::Config(args) => match args.command {
                ConfigCommands::Show => "config show",
                ConfigCommands::Validate => "config validate",
                ConfigCommands::Schema => "config schema",
            },
        }
    }
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> ExitCode {
    let command = cli.command.name();
    let format = cli.format;

    // The schema is static; a broken config file must not hide it.
    if let Commands::Config(ConfigArgs {
        command: ConfigCommands::Schema,
    }) = &cli.command
    {
        return run_config_schema();
    }

    let resolved = match resolve_config(&ConfigPaths::discover(cli.config.clone())) {
        Ok(resolved) => resolved,
        Err(err) => return report_error(format, command, &err.into()),
    };
    if let Err(err) = init_logging(
        &resolved.config.logging,
        cli.verbose,
        cli.command.default_log_format(),
    ) {
        return report_error(format, command, &err);
    }

    match &cli.command {
        Commands::Lambda => run_lambda(&resolved),
        Commands::Invoke(args) => run_invoke(format, &resolved, args),
        Commands::Catalog(args) => run_catalog(format, &resolved, args),
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => run_config_show(format, &resolved),
            ConfigCommands::Validate => run_config_validate(format, &resolved),
            ConfigCommands::Schema => run_config_schema(),
        },
    }
}

fn run_lambda(resolved: &ResolvedConfig) -> ExitCode {
    for finding in validate(&resolved.config).errors {
        warn!(field = %finding.field, message = %finding.message, "configuration finding");
    }
    let transformer = Transformer::from_config(&resolved.config.transform);
    info!(
        time_zone = %transformer.clock().zone(),
        source = ?resolved.source,
        "starting Lambda runtime"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start async runtime");
            return ExitCode::IoError;
        }
    };
    match runtime.block_on(crate::lambda::run(transformer)) {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            error!(error = %err, "Lambda runtime stopped");
            ExitCode::InternalError
        }
    }
}

/// Per-record view of an invocation response.
#[derive(Debug, Serialize)]
struct RecordSummary {
    record_id: RecordId,
    events: usize,
    bytes: usize,
    object_prefix: String,
    partition_keys: PartitionKeys,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview_error: Option<String>,
}

fn run_invoke(format: OutputFormat, resolved: &ResolvedConfig, args: &InvokeArgs) -> ExitCode {
    let event = match read_event(&args.event) {
        Ok(event) => event,
        Err(err) => return report_error(format, "invoke", &err),
    };

    let mut transform = resolved.config.transform.clone();
    if let Some(zone) = args.time_zone {
        transform.time_zone = zone;
    }
    let transformer = Transformer::from_config(&transform);
    let response = match transformer.transform(&event) {
        Ok(response) => response,
        Err(err) => return report_error(format, "invoke", &err.into()),
    };

    if args.response_only {
        return print_json(&response);
    }

    let layout = StorageLayout::from_config(&resolved.config.delivery);
    let mut summaries = Vec::with_capacity(response.records.len());
    let mut previews = Vec::new();
    for record in &response.records {
        let payload = match record.decoded_data() {
            Ok(payload) => payload,
            Err(err) => {
                let err = Error::Runtime(format!("record {}: {err}", record.record_id));
                return report_error(format, "invoke", &err);
            }
        };
        let mut summary = RecordSummary {
            record_id: record.record_id.clone(),
            events: payload.iter().filter(|&&b| b == b'\n').count(),
            bytes: payload.len(),
            object_prefix: layout.object_prefix(&record.metadata.partition_keys),
            partition_keys: record.metadata.partition_keys.clone(),
            preview_rows: None,
            preview_error: None,
        };
        if args.preview {
            match decode_payload(&payload) {
                Ok(batch) => {
                    summary.preview_rows = Some(batch.num_rows());
                    previews.push((record.record_id.clone(), batch));
                }
                Err(err) => summary.preview_error = Some(err.to_string()),
            }
        }
        summaries.push(summary);
    }

    match format {
        OutputFormat::Json => print_json(&envelope(
            "invoke",
            json!({
                "invocation_id": event.invocation_id,
                "time_zone": transform.time_zone.to_string(),
                "summary": {
                    "received": event.records.len(),
                    "returned": response.records.len(),
                    "omitted": event.records.len() - response.records.len(),
                },
                "records": summaries,
                "response": response,
            }),
        )),
        OutputFormat::Pretty => {
            print_invoke_pretty(&event, &response, &summaries);
            for (record_id, batch) in previews {
                println!();
                println!("## {record_id}");
                match arrow::util::pretty::pretty_format_batches(&[batch]) {
                    Ok(table) => println!("{table}"),
                    Err(err) => println!("  (preview unavailable: {err})"),
                }
            }
            ExitCode::Clean
        }
    }
}

fn print_invoke_pretty(
    event: &FirehoseEvent,
    response: &FirehoseResponse,
    summaries: &[RecordSummary],
) {
    println!(
        "# Invocation {} ({} records in, {} out)",
        event.invocation_id,
        event.records.len(),
        response.records.len()
    );
    println!();
    for summary in summaries {
        println!(
            "  {}  {} event(s), {} bytes -> {}",
            summary.record_id, summary.events, summary.bytes, summary.object_prefix
        );
        if let Some(err) = &summary.preview_error {
            println!("    preview failed: {err}");
        }
    }
}

fn read_event(path: &Path) -> Result<FirehoseEvent> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    serde_json::from_str(&content)
        .map_err(|e| Error::InvalidEvent(format!("{}: {e}", path.display())))
}

fn run_catalog(format: OutputFormat, resolved: &ResolvedConfig, args: &CatalogArgs) -> ExitCode {
    let mut catalog = resolved.config.catalog.clone();
    if let Some(bucket) = &args.bucket {
        catalog.bucket_name = Some(bucket.clone());
    }
    let delivery = &resolved.config.delivery;
    let table = match TableDefinition::from_config(&catalog, delivery) {
        Ok(table) => table,
        Err(err) => return report_error(format, "catalog", &err.into()),
    };
    let layout = StorageLayout::from_config(delivery);

    match format {
        OutputFormat::Json => print_json(&envelope(
            "catalog",
            json!({
                "table": table,
                "delivery": {
                    "data_prefix_expression": layout.delivery_prefix_expression(),
                    "error_prefix": layout.error_prefix(),
                    "processor_retries": delivery.processor_retries,
                    "lambda_buffer_size_mb": delivery.lambda_buffer_size_mb,
                    "lambda_buffer_interval_secs": delivery.lambda_buffer_interval_secs,
                    "s3_buffer_size_mb": delivery.s3_buffer_size_mb,
                    "s3_buffer_interval_secs": delivery.s3_buffer_interval_secs,
                },
            }),
        )),
        OutputFormat::Pretty => {
            println!("# Table {}.{}", table.database_name, table.table_name);
            println!();
            println!("  Location: {}", table.location);
            println!("  SerDe:    {}", table.serde_library);
            println!("  Crawler:  {}", table.crawler.name);
            println!();
            println!("  Columns:");
            for column in &table.columns {
                println!("    {:<20} {}", column.name, column.data_type);
            }
            println!("  Partition keys:");
            for column in &table.partition_keys {
                println!("    {:<20} {}", column.name, column.data_type);
            }
            println!();
            println!("  Data prefix:  {}", layout.delivery_prefix_expression());
            println!("  Error prefix: {}", layout.error_prefix());
            ExitCode::Clean
        }
    }
}

fn run_config_show(format: OutputFormat, resolved: &ResolvedConfig) -> ExitCode {
    match format {
        OutputFormat::Json => print_json(&envelope(
            "config show",
            json!({
                "config_schema_version": CONFIG_SCHEMA_VERSION,
                "source": resolved.source,
                "overrides": resolved.overrides,
                "config": resolved.config,
            }),
        )),
        OutputFormat::Pretty => match serde_yaml::to_string(&resolved.config) {
            Ok(text) => {
                println!("# source: {:?}", resolved.source);
                if !resolved.overrides.is_empty() {
                    println!("# overrides: {}", resolved.overrides.join(", "));
                }
                print!("{text}");
                ExitCode::Clean
            }
            Err(err) => report_error(format, "config show", &Error::Config(err.to_string())),
        },
    }
}

fn run_config_validate(format: OutputFormat, resolved: &ResolvedConfig) -> ExitCode {
    let result = validate(&resolved.config);
    let failure = validation_failure(&result);
    let code = failure.as_ref().map_or(ExitCode::Clean, ExitCode::for_error);

    match format {
        OutputFormat::Json => {
            let mut output = envelope(
                "config validate",
                json!({
                    "source": resolved.source,
                    "valid": result.is_valid(),
                    "errors": result.errors,
                    "warnings": result.warnings,
                }),
            );
            if let (Some(err), Some(out)) = (&failure, output.as_object_mut()) {
                out.insert(
                    "error".to_string(),
                    json!({"code": err.code(), "message": err.to_string()}),
                );
                out.insert("exit_code".to_string(), json!(code.as_i32()));
            }
            let printed = print_json(&output);
            if printed.is_error() {
                return printed;
            }
        }
        OutputFormat::Pretty => {
            if result.is_valid() {
                println!("Configuration is valid");
            } else {
                println!("Configuration has {} error(s)", result.errors.len());
            }
            for finding in &result.errors {
                println!("  error:   {finding}");
            }
            for finding in &result.warnings {
                println!("  warning: {finding}");
            }
        }
    }
    code
}

/// Blocking findings as a single error, or `None` when the config is usable.
fn validation_failure(result: &ValidationResult) -> Option<Error> {
    if result.is_valid() {
        return None;
    }
    let findings: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
    Some(Error::ConfigValidation(findings.join("; ")))
}

fn run_config_schema() -> ExitCode {
    print_json(&config_schema())
}

fn envelope(command: &str, fields: Value) -> Value {
    let mut output = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
    });
    if let (Some(out), Value::Object(extra)) = (output.as_object_mut(), fields) {
        out.extend(extra);
    }
    output
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(err) => {
            let err = Error::from(err);
            eprintln!("error: failed to render output: {err}");
            ExitCode::for_error(&err)
        }
    }
}

fn report_error(format: OutputFormat, command: &str, err: &Error) -> ExitCode {
    let code = ExitCode::for_error(err);
    match format {
        OutputFormat::Json => {
            let output = envelope(
                command,
                json!({
                    "error": {
                        "code": err.code(),
                        "message": err.to_string(),
                    },
                    "exit_code": code.as_i32(),
                }),
            );
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{text}"),
                Err(_) => eprintln!("error: {err}"),
            }
        }
        OutputFormat::Pretty => eprintln!("error: {err}"),
    }
    code
}
