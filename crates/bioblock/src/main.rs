use anyhow::{Context, Result};
use bioblock_common::{logger, AppConfig};
use bioblock_redact::{anonymize_phi, Redactor, Workbook};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "bioblock")]
#[command(about = "Bio-Block - dataset summary storage, semantic search and spreadsheet redaction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Database path (overrides DB_BASE_PATH)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Redact a spreadsheet file without starting the server
    Redact {
        /// Input spreadsheet (.xlsx, .xls or .ods)
        input: PathBuf,

        /// Output .xlsx path
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = RedactMode::Pii)]
        mode: RedactMode,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RedactMode {
    /// Replace detected PII in every text cell
    Pii,
    /// Mask PHI columns with per-patient pseudonyms
    Phi,
}

async fn serve(host: Option<String>, port: Option<u16>, db_path: Option<String>) -> Result<()> {
    // Override with CLI arguments
    if let Some(host) = &host {
        std::env::set_var("SERVER_HOST", host);
    }
    if let Some(port) = port {
        std::env::set_var("SERVER_PORT", port.to_string());
    }
    if let Some(db) = &db_path {
        std::env::set_var("DB_BASE_PATH", db);
    }

    let config = AppConfig::from_env()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("Bio-Block starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Database: {}", config.db_base_path.display());
    tracing::info!("  Collection: {}", config.collection_name);
    tracing::info!(
        "  Embedding: {:?} ({}, dim {})",
        config.embedding_backend,
        config.embedding_model,
        config.embedding_dim
    );

    println!("Server listening on http://{}", config.server_bind_address());

    bioblock_server::start_server(config).await?;
    Ok(())
}

fn redact_file(input: PathBuf, output: PathBuf, mode: RedactMode) -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    logger::setup_console_logging(&log_level)?;

    let mut workbook = Workbook::open(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    match mode {
        RedactMode::Pii => {
            let report = workbook.redact(&Redactor::default());
            for (entity, count) in &report.entities {
                tracing::info!("  {}: {}", entity, count);
            }
        }
        RedactMode::Phi => {
            anonymize_phi(&mut workbook);
        }
    }

    workbook
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            db_path,
        }) => serve(host, port, db_path).await,
        Some(Commands::Redact {
            input,
            output,
            mode,
        }) => redact_file(input, output, mode),
        None => serve(None, None, None).await,
    }
}
