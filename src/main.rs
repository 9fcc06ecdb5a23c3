use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use receiptwatch::{
    encode_image_file, format_file_detail, format_file_list, normalize, parse_records_file,
    BackendClient, BackendConfig, DashboardExport, RawCollection,
};

#[derive(Parser)]
#[command(name = "receiptwatch")]
#[command(author, version, about = "Receipt processing pipeline client and stage dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all submitted receipts with their normalized processing state
    Dashboard {
        /// Read a saved records snapshot instead of fetching from the backend
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the normalized summaries as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the full stage history for one receipt
    Show {
        /// File identifier to inspect
        #[arg(long)]
        id: String,

        /// Read a saved records snapshot instead of fetching from the backend
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Upload a receipt image for processing
    Upload {
        /// Receipt image file
        #[arg(long)]
        image: PathBuf,

        /// Employee id the receipt belongs to
        #[arg(long)]
        employee_id: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dashboard {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            run_dashboard(input, output).await
        }
        Commands::Show { id, input, verbose } => {
            setup_logging(verbose);
            run_show(id, input).await
        }
        Commands::Upload {
            image,
            employee_id,
            verbose,
        } => {
            setup_logging(verbose);
            run_upload(image, employee_id).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Load the raw collection from a snapshot file or the live backend.
async fn load_records(input: Option<PathBuf>) -> Result<RawCollection> {
    match input {
        Some(path) => {
            info!("Loading records snapshot from {:?}", path);
            parse_records_file(&path).context("Failed to parse records snapshot")
        }
        None => {
            let config = BackendConfig::from_env()?;
            let client = BackendClient::new(config);
            client.fetch_all_files().await
        }
    }
}

async fn run_dashboard(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let raw = load_records(input).await?;
    info!("Normalizing {} file records", raw.len());

    let summaries = normalize(&raw);
    print!("{}", format_file_list(&summaries));

    if let Some(path) = output {
        let export = DashboardExport::new(summaries);
        export.write_json(&path)?;
        info!("Summaries written to {:?}", path);
    }

    Ok(())
}

async fn run_show(id: String, input: Option<PathBuf>) -> Result<()> {
    let raw = load_records(input).await?;
    let summaries = normalize(&raw);

    let summary = summaries
        .iter()
        .find(|s| s.id == id)
        .with_context(|| format!("No receipt with id {:?}", id))?;

    print!("{}", format_file_detail(summary));

    Ok(())
}

async fn run_upload(image: PathBuf, employee_id: String) -> Result<()> {
    info!("Encoding receipt image from {:?}", image);
    let receipt_base64 = encode_image_file(&image)?;

    let config = BackendConfig::from_env()?;
    let client = BackendClient::new(config);

    let body = client.upload_receipt(&receipt_base64, &employee_id).await?;
    info!("Backend response: {}", body.trim());
    println!("Receipt submitted for employee {}", employee_id);

    Ok(())
}
