use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use hotelflux_core::config::PipelineConfig;
use hotelflux_core::db;
use hotelflux_core::pipeline::{process_file, ProcessedFile, References};
use hotelflux_core::sinks::{deliver, SinkOutcome};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hotel PMS export ingestion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize, clean and load PMS exports
    Process(ProcessArgs),
    /// Run database migrations
    Migrate,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Files or glob patterns to process
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Hotel reference CSV
    #[arg(long)]
    hotel_ref: PathBuf,

    /// Segment reference CSV
    #[arg(long)]
    segment_ref: PathBuf,

    /// Optional TOML file with pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `output_dir` from the config
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Overrides `max_rooms_occupied` from the config
    #[arg(long)]
    max_rooms: Option<f64>,

    /// Do not load rows into Postgres
    #[arg(long)]
    skip_db: bool,

    /// Do not write parquet files
    #[arg(long)]
    skip_parquet: bool,

    /// Run migrations before loading
    #[arg(long)]
    migrate: bool,

    /// Print per-file summaries as JSON instead of a table
    #[arg(long)]
    json: bool,
}

struct FileOutcome {
    path: PathBuf,
    result: Result<Loaded>,
}

struct Loaded {
    processed: ProcessedFile,
    sinks: SinkOutcome,
}

impl FileOutcome {
    fn failed(&self) -> bool {
        match &self.result {
            Ok(loaded) => !loaded.sinks.is_ok(),
            Err(_) => true,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => {
            let pool = connect_pool().await?;
            db::run_migrations(&pool).await?;
            info!("Database migrations applied");
            Ok(ExitCode::SUCCESS)
        }
        Command::Process(args) => run_process(args).await,
    }
}

async fn run_process(args: ProcessArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(output_dir) = args.output_dir.clone() {
        config.output_dir = output_dir;
    }
    if let Some(max_rooms) = args.max_rooms {
        config.max_rooms_occupied = max_rooms;
    }
    config.validate()?;

    let references = References::load(&args.hotel_ref, &args.segment_ref)
        .context("failed to load reference tables")?;

    let files = expand_patterns(&args.patterns)?;
    if files.is_empty() {
        warn!(patterns = ?args.patterns, "no input files matched");
    }

    let pool = if args.skip_db {
        None
    } else {
        let pool = connect_pool().await?;
        if args.migrate {
            db::run_migrations(&pool).await?;
        }
        Some(pool)
    };

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let result = load_file(&path, &references, &config, &args, pool.as_ref()).await;
        if let Err(err) = &result {
            error!(file = %path.display(), error = %format!("{err:#}"), "file skipped");
        }
        outcomes.push(FileOutcome { path, result });
    }

    if args.json {
        print_json(&outcomes)?;
    } else {
        print_table(&outcomes);
    }

    let failures = outcomes.iter().filter(|o| o.failed()).count();
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn load_file(
    path: &Path,
    references: &References,
    config: &PipelineConfig,
    args: &ProcessArgs,
    pool: Option<&db::DbPool>,
) -> Result<Loaded> {
    let processed = process_file(path, references, config)?;

    let output_dir = (!args.skip_parquet).then_some(config.output_dir.as_path());
    let upsert = pool.map(|pool| {
        db::upsert_final_records(
            pool,
            &config.table_name,
            &processed.records,
            config.upsert_batch_size,
        )
    });
    let sinks = deliver(&processed.records, path, output_dir, upsert).await;

    Ok(Loaded { processed, sinks })
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern {pattern}"))? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "could not read path from pattern"),
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn print_table(outcomes: &[FileOutcome]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "file", "format", "raw", "dropped", "dupes", "final", "parquet", "upserted", "status",
    ]);

    for outcome in outcomes {
        let name = outcome
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.path.display().to_string());
        match &outcome.result {
            Ok(loaded) => {
                let summary = &loaded.processed.summary;
                table.add_row(vec![
                    name,
                    summary.format.to_string(),
                    summary.raw_rows.to_string(),
                    summary.cleaning.dropped_missing_date.to_string(),
                    summary.dedup.total().to_string(),
                    summary.final_rows.to_string(),
                    match &loaded.sinks.parquet {
                        Some(Ok(path)) => path.display().to_string(),
                        Some(Err(_)) => "failed".to_string(),
                        None => "-".to_string(),
                    },
                    match &loaded.sinks.upserted {
                        Some(Ok(rows)) => rows.to_string(),
                        Some(Err(_)) => "failed".to_string(),
                        None => "-".to_string(),
                    },
                    if loaded.sinks.is_ok() {
                        "ok".to_string()
                    } else {
                        format!("failed: {}", loaded.sinks.errors().join("; "))
                    },
                ]);
            }
            Err(err) => {
                let mut row = vec![name];
                row.extend(std::iter::repeat("-".to_string()).take(7));
                row.push(format!("failed: {err}"));
                table.add_row(row);
            }
        }
    }

    println!("{table}");
}

fn print_json(outcomes: &[FileOutcome]) -> Result<()> {
    let report: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(loaded) => serde_json::json!({
                "path": outcome.path,
                "summary": loaded.processed.summary,
                "parquet": loaded.sinks.parquet.as_ref().and_then(|r| r.as_ref().ok()),
                "upserted": loaded.sinks.upserted.as_ref().and_then(|r| r.as_ref().ok()),
                "errors": loaded.sinks.errors(),
            }),
            Err(err) => serde_json::json!({
                "path": outcome.path,
                "error": format!("{err:#}"),
            }),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn connect_pool() -> Result<db::DbPool> {
    let database_url = db::database_url_from_env();
    db::connect(&database_url).await
}
