use anyhow::Context;
use clap::Parser;
use mybay::{CatalogManager, EngineConfig, ErrorResponse, FilterRequest, SearchEngine};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Run a filter request against a directory of catalog snapshots
#[derive(Parser, Debug)]
#[command(name = "mybay")]
#[command(
    about = "Filter marketplace listings with exact and fuzzy field matching",
    long_about = None
)]
struct Args {
    /// Directory holding one `<collection>.json` or `<collection>.jsonl` file per collection
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Request JSON file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    request: String,

    /// Engine configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn read_request(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading request {}", source))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // Logs go to stderr so stdout stays a clean JSON document
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting mybay v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let catalog = CatalogManager::load_dir(&args.data_dir)?;
    info!("Collections: {:?}", catalog.list_collections());

    let engine = SearchEngine::new(Arc::new(catalog), config)?;
    let raw = read_request(&args.request)?;

    // Malformed bodies get the same envelope as any other rejected request
    let result = FilterRequest::from_json(&raw).and_then(|request| engine.execute(&request));
    let (body, status) = match result {
        Ok(response) => (serde_json::to_value(&response)?, None),
        Err(err) => {
            let envelope = ErrorResponse::from(&err);
            (serde_json::to_value(&envelope)?, Some(envelope.status))
        }
    };

    let out = if args.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{}", out);

    if let Some(status) = status {
        anyhow::bail!("request failed with status {}", status);
    }
    Ok(())
}
