//! schema-introspect CLI - Inspect table metadata through the schema cache.

use clap::{Parser, Subcommand};
use schema_introspect::drivers::{self, common::with_deadline};
use schema_introspect::{Config, IntrospectError, SchemaCache, Table};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

const DEFAULT_CONFIG: &str = "introspect.yaml";

#[derive(Parser)]
#[command(name = "schema-introspect")]
#[command(about = "Dialect-neutral table metadata for MySQL and PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file [default: introspect.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Connection URL; replaces the configured connection.url
    #[arg(long)]
    url: Option<String>,

    /// Schema to introspect; replaces the configured connection.schema
    #[arg(short, long)]
    schema: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the schema and list its tables
    Tables,

    /// Show the columns and indexes of one table
    Describe {
        /// Table name, case-sensitive
        table: String,
    },

    /// Test the catalog connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), IntrospectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(IntrospectError::Config)?;

    let config = resolve_config(&cli)?;
    info!(
        "Using {} schema '{}'",
        config.connection.redacted_url(),
        config.connection.schema
    );

    match cli.command {
        Commands::Tables => {
            let cache = SchemaCache::from_config(&config)?;
            let report = cache.refresh().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Schema '{}' ({}):", report.schema, cache.dialect());
                for name in &report.tables_loaded {
                    println!("  {}", name);
                }
                for skipped in &report.skipped {
                    println!("  {} (skipped: {})", skipped.table, skipped.reason);
                }
                println!(
                    "\n  Tables: {}/{} in {}ms",
                    report.tables_loaded.len(),
                    report.tables_listed,
                    report.duration_ms
                );
            }
        }

        Commands::Describe { table } => {
            let cache = SchemaCache::from_config(&config)?;
            let table = cache.lookup(&table).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(table.as_ref())?);
            } else {
                print_table(&table);
            }
        }

        Commands::HealthCheck => {
            let source = drivers::source_for(&config.connection)?;
            let started = Instant::now();

            let mut conn = with_deadline(
                "connect",
                config.connection.connect_timeout(),
                source.connect(),
            )
            .await?;
            let listed = with_deadline(
                "list tables",
                config.connection.query_timeout(),
                conn.list_tables(&config.connection.schema),
            )
            .await;
            conn.close().await;
            let tables = listed?;
            let latency_ms = started.elapsed().as_millis() as u64;

            if cli.output_json {
                let result = serde_json::json!({
                    "healthy": true,
                    "dialect": source.dialect(),
                    "schema": config.connection.schema,
                    "tables": tables.len(),
                    "latency_ms": latency_ms,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Catalog ({}): OK ({}ms)",
                    source.dialect(),
                    latency_ms
                );
                println!(
                    "  Schema '{}': {} tables",
                    config.connection.schema,
                    tables.len()
                );
            }
        }
    }

    Ok(())
}

/// Build the effective configuration from the file and command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config, IntrospectError> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        (None, Some(url)) => Config::new(url.clone(), cli.schema.clone().unwrap_or_default()),
        (None, None) => Config::load(DEFAULT_CONFIG)?,
    };

    if let Some(ref url) = cli.url {
        config.connection.url = url.clone();
    }
    if let Some(ref schema) = cli.schema {
        config.connection.schema = schema.clone();
    }

    config.validate()?;
    Ok(config)
}

fn print_table(table: &Table) {
    println!("Table '{}':", table.name);
    for column in &table.columns {
        let mut notes = Vec::new();
        if column.is_primary_key {
            notes.push("primary key".to_string());
        }
        if column.is_nullable() {
            notes.push("null".to_string());
        }
        if let Some(default) = column.default_value() {
            notes.push(format!("default {}", default));
        }

        if notes.is_empty() {
            println!("  {} {}", column.name, column.declared_type);
        } else {
            println!(
                "  {} {} ({})",
                column.name,
                column.declared_type,
                notes.join(", ")
            );
        }
    }

    if !table.indexes.is_empty() {
        println!("\n  Indexes:");
        for index in &table.indexes {
            println!(
                "    {}{} ({})",
                index.name,
                if index.is_unique { " UNIQUE" } else { "" },
                index.columns.join(", ")
            );
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity '{}'", other)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format '{}'; use text or json", other)),
    }

    Ok(())
}
