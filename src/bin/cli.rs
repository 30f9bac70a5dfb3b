//! CloudFront real-time log tools
//!
//! Local execution entry point. For AWS Lambda, use `rtl-lambda`.

use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use cf_rtl::{
    config::load_config,
    error::{AppError, Result},
    models::Config,
    pipeline::{self, BatchSummary, BatchTransformer, InputRecord, RecordOutcome, ReplayOptions},
    services::{GeoLocator, MaxMindLocator, UapClassifier, UserAgentClassifier},
    stream::{RecordPublisher, StdoutPublisher},
    utils::percent_decode,
};
use clap::{Parser, Subcommand};
use serde_json::json;

/// rtl - CloudFront real-time log transformer
#[derive(Parser, Debug)]
#[command(
    name = "rtl",
    version,
    about = "CloudFront real-time log transform and replay tools"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "rtl.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transform raw log lines into enriched JSON lines
    Transform {
        /// File with one raw log line per line
        #[arg(short, long)]
        input: PathBuf,

        /// Skip geolocation enrichment
        #[arg(long)]
        no_geoip: bool,

        /// Skip user-agent enrichment
        #[arg(long)]
        no_user_agent: bool,
    },

    /// Look up one IP address per line
    Geoip {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Classify one user-agent string per line
    UaParse {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Replay archived log files into a Kinesis data stream
    Replay {
        /// Directory of archived log files
        #[arg(short, long)]
        dir: PathBuf,

        /// Target stream name
        #[arg(long, required_unless_present = "dry_run")]
        stream: Option<String>,

        /// AWS region of the stream (default: from the environment)
        #[arg(long)]
        region: Option<String>,

        /// Partition key for every record
        #[arg(long, default_value = "partitionKey")]
        partition_key: String,

        /// Print lines instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Skip lines with the wrong field count
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Validate configuration and load the enrichment datasets
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config)?;
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Transform {
            input,
            no_geoip,
            no_user_agent,
        } => {
            if no_geoip {
                config.enrichment.geoip.enabled = false;
            }
            if no_user_agent {
                config.enrichment.user_agent.enabled = false;
            }
            let summary = transform_file(&config, &input).await?;
            log::info!(
                "Transformed {} lines: {} ok, {} dropped, {} failed, {} warnings",
                summary.total,
                summary.ok,
                summary.dropped,
                summary.failed,
                summary.warnings
            );
        }

        Command::Geoip { input } => {
            let locator = MaxMindLocator::open(&config.enrichment.geoip.database_path)?;
            let mut stdout = std::io::stdout().lock();
            for (number, line) in read_lines(&input)? {
                let ip = match line.trim().parse::<IpAddr>() {
                    Ok(ip) => ip,
                    Err(e) => {
                        log::warn!("Skipping line {number} {line:?}: {e}");
                        continue;
                    }
                };
                let location = locator.lookup(ip)?;
                let body = json!({ "ip": ip, "location": location });
                writeln!(stdout, "{body}")?;
            }
        }

        Command::UaParse { input } => {
            let classifier = UapClassifier::from_path(&config.enrichment.user_agent.regexes_path)?;
            let mut stdout = std::io::stdout().lock();
            for (_, line) in read_lines(&input)? {
                let info = classifier.classify(&percent_decode(&line));
                let body = json!({ "user_agent": line, "parsed": info });
                writeln!(stdout, "{body}")?;
            }
        }

        Command::Replay {
            dir,
            stream,
            region,
            partition_key,
            dry_run,
            skip_invalid,
        } => {
            config.validate()?;
            let schema = config.active_schema()?;
            let options = ReplayOptions { skip_invalid };

            let publisher: Box<dyn RecordPublisher> = if dry_run {
                Box::new(StdoutPublisher::new())
            } else {
                kinesis_publisher(stream, partition_key, region).await?
            };

            let summary = pipeline::run_replay(&dir, schema, publisher.as_ref(), options).await?;
            log::info!(
                "Replayed {} files: {} sent, {} skipped",
                summary.files,
                summary.sent,
                summary.skipped
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let schema = config.active_schema()?;
            log::info!(
                "✓ Config OK (schema {}, {} columns)",
                schema.name,
                schema.width()
            );
            log::info!("Columns: {}", schema.column_names().join(" "));

            BatchTransformer::from_config(&config)?;
            log::info!("✓ Enrichment datasets loaded");

            log::info!("All validations passed!");
        }
    }

    Ok(())
}

async fn transform_file(config: &Config, input: &Path) -> Result<BatchSummary> {
    let transformer = BatchTransformer::from_config(config)?;
    let inputs = read_lines(input)?
        .into_iter()
        .map(|(number, line)| InputRecord {
            record_id: format!("{}:{}", input.display(), number),
            data: line.into_bytes(),
        })
        .collect();

    let outputs = transformer.transform_batch(inputs).await;

    let mut stdout = std::io::stdout().lock();
    for output in &outputs {
        if let RecordOutcome::Ok { data, .. } = &output.outcome {
            stdout.write_all(data)?;
            if !data.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(BatchSummary::from_outputs(&outputs))
}

/// Non-empty lines of a text file with their 1-based line numbers.
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect())
}

#[cfg(feature = "kinesis")]
async fn kinesis_publisher(
    stream: Option<String>,
    partition_key: String,
    region: Option<String>,
) -> Result<Box<dyn RecordPublisher>> {
    let stream = stream.ok_or_else(|| AppError::config("--stream is required"))?;
    log::info!("Publishing to Kinesis stream {stream}");
    let publisher = cf_rtl::stream::KinesisPublisher::from_env(stream, partition_key, region).await;
    Ok(Box::new(publisher))
}

#[cfg(not(feature = "kinesis"))]
async fn kinesis_publisher(
    _stream: Option<String>,
    _partition_key: String,
    _region: Option<String>,
) -> Result<Box<dyn RecordPublisher>> {
    Err(AppError::config(
        "Kinesis support is not compiled in; rebuild with --features kinesis or use --dry-run",
    ))
}
