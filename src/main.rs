use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use printq::application::checkout::CheckoutInput;
use printq::application::engine::PrintEngine;
use printq::application::submission::{FileUpload, JobSubmission};
use printq::config::GatewayConfig;
use printq::domain::ports::{FileStoreBox, JobStoreBox};
use printq::infrastructure::in_memory::{InMemoryFileStore, InMemoryJobStore};
use printq::infrastructure::local_fs::LocalFileStore;
use printq::infrastructure::paymongo::PayMongoGateway;
use printq::interfaces::csv::job_writer::JobWriter;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(author, version, about = "Print-job intake, checkout and payment reconciliation", long_about = None)]
struct Cli {
    /// Path to persistent job database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "PRINTQ_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Directory for uploaded files (optional). Defaults to in-memory storage.
    #[arg(long, global = true, env = "PRINTQ_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a print job
    Submit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        pages: Option<String>,
        #[arg(long)]
        copies: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// "pickup"; any other value means delivery
        #[arg(long)]
        fulfillment: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        /// File to print; repeat for several files
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Open a checkout session for a job
    Checkout {
        #[arg(long)]
        job_id: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Apply a gateway webhook payload ("-" reads stdin)
    Webhook { payload: PathBuf },
    /// Show the status of a job
    Status { job_id: String },
    /// Write every job as CSV to stdout
    Export,
}

fn job_store(db_path: Option<PathBuf>) -> Result<JobStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = printq::infrastructure::rocksdb::RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryJobStore::new()))
        }
        None => Ok(Box::new(InMemoryJobStore::new())),
    }
}

fn file_store(upload_dir: Option<PathBuf>) -> FileStoreBox {
    match upload_dir {
        Some(dir) => Box::new(LocalFileStore::new(dir)),
        None => Box::new(InMemoryFileStore::new()),
    }
}

async fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes = tokio::fs::read(path).await.into_diagnostic()?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FileUpload {
        file_name,
        content_type: None,
        bytes,
    })
}

async fn read_payload(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut body = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut body)
            .await
            .into_diagnostic()?;
        Ok(body)
    } else {
        tokio::fs::read(path).await.into_diagnostic()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "printq=info".into()),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let engine = PrintEngine::new(job_store(cli.db_path)?, file_store(cli.upload_dir));

    match cli.command {
        Command::Submit {
            name,
            phone,
            pages,
            copies,
            color,
            fulfillment,
            location,
            amount,
            files,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(read_upload(path).await?);
            }
            let receipt = engine
                .submit(JobSubmission {
                    customer_name: name,
                    customer_phone: phone,
                    page_count: pages,
                    copy_count: copies,
                    color_mode: color,
                    fulfillment_mode: fulfillment,
                    location,
                    amount,
                    files: uploads,
                })
                .await
                .into_diagnostic()?;
            print_json(&receipt)?;
        }
        Command::Checkout {
            job_id,
            amount,
            email,
        } => {
            let config = GatewayConfig::from_env().into_diagnostic()?;
            let client = reqwest::Client::builder()
                .timeout(GATEWAY_TIMEOUT)
                .build()
                .into_diagnostic()?;
            let engine = engine.with_gateway(Box::new(PayMongoGateway::with_client(client, config)));
            let link = engine
                .create_checkout(&CheckoutInput {
                    job_id,
                    amount,
                    email,
                })
                .await
                .into_diagnostic()?;
            print_json(&link)?;
        }
        Command::Webhook { payload } => {
            let body = read_payload(&payload).await?;
            let ack = engine.handle_webhook(&body).await.into_diagnostic()?;
            print_json(&ack)?;
        }
        Command::Status { job_id } => {
            let view = engine.status(&job_id).await.into_diagnostic()?;
            print_json(&view)?;
        }
        Command::Export => {
            let jobs = engine.all_jobs().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = JobWriter::new(stdout.lock());
            writer.write_jobs(&jobs).into_diagnostic()?;
        }
    }

    Ok(())
}
