//! OpenTrain Ingest - train-stop loader

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opentrain_common::logging::{init_logging, LogConfig, LogLevel};
use opentrain_ingest::{
    config::IngestConfig, db, ingest, IngestOptions, PgSchemaManager, PgSession,
    SchemaDescription, SchemaManager,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "opentrain-ingest")]
#[command(author, version, about = "Load train-stop TSV files into PostgreSQL")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset the schema and load a stop file
    Load {
        /// Tab-separated stop file
        file: PathBuf,

        /// Rows per committed batch
        #[arg(long)]
        commit_every: Option<usize>,

        /// Stop after this many lines
        #[arg(long)]
        max_lines: Option<usize>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Drop every table in the schema and recreate the loader's tables
    Reset,

    /// Print the DDL the loader creates
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let mut log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("opentrain-ingest")
        .build();

    // Environment variables take precedence
    log_config.apply_env()?;
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Schema => print!("{}", schema_ddl()),
        Command::Reset => {
            let config = load_config(cli.database_url, |_| {})?;
            let pool = db::connect(&config.database)
                .await
                .context("Failed to connect to database")?;

            let mut schema = PgSchemaManager::new(pool.clone(), SchemaDescription::opentrain());
            let report = schema.reset().await?;
            info!(
                tables_dropped = report.dropped.tables_dropped,
                constraints_dropped = report.dropped.constraints_dropped,
                tables_created = report.tables_created,
                "Schema reset complete"
            );

            pool.close().await;
        },
        Command::Load {
            file,
            commit_every,
            max_lines,
            no_progress,
        } => {
            let config = load_config(cli.database_url, |config| {
                if let Some(commit_every) = commit_every {
                    config.commit_every = commit_every;
                }
                if max_lines.is_some() {
                    config.max_lines = max_lines;
                }
            })?;

            let pool = db::connect(&config.database)
                .await
                .context("Failed to connect to database")?;
            db::health_check(&pool).await?;

            let mut schema = PgSchemaManager::new(pool.clone(), SchemaDescription::opentrain());
            let mut session = PgSession::with_capacity(pool.clone(), config.commit_every);
            let options = IngestOptions::from_config(&config).with_progress(!no_progress);

            info!(file = %file.display(), commit_every = config.commit_every, "Loading stops");
            let report = ingest(&file, &mut schema, &mut session, &options)
                .await
                .with_context(|| format!("Failed to load {}", file.display()))?;

            info!(
                lines = report.lines_read,
                rows = report.rows_written,
                batches = report.batches,
                "Load complete"
            );

            pool.close().await;
        },
    }

    Ok(())
}

/// DDL listing for the `schema` command; needs no configuration
fn schema_ddl() -> String {
    SchemaDescription::opentrain()
        .create_statements()
        .iter()
        .map(|statement| format!("{statement};\n\n"))
        .collect()
}

/// Read the environment, apply CLI overrides, then validate the result
///
/// Overrides can replace values `from_env` already checked, so validation
/// runs again once they are in place.
fn load_config(
    database_url: Option<String>,
    overrides: impl FnOnce(&mut IngestConfig),
) -> Result<IngestConfig> {
    let mut config = IngestConfig::from_env().context("Invalid loader configuration")?;
    if let Some(url) = database_url {
        config.database.url = url;
    }
    overrides(&mut config);
    config
        .validate()
        .context("Invalid loader configuration")?;
    Ok(config)
}
