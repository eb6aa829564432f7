//! logiscan CLI: run a scanner or inspect its state.
//!
//! # Commands
//! ```bash
//! logiscan logistics --root <addr> --start-block <n> [--rpc-url <url>] [--ws-url <url>]
//! logiscan token     --root <addr> --start-block <n> [--rpc-url <url>] [--ws-url <url>]
//! logiscan status    --flavor logistics|token [--database <path>]
//! logiscan info
//! ```

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use logiscan_abi::Interfaces;
use logiscan_core::error::IndexerError;
use logiscan_core::store::{CheckpointStore, RecordStore};
use logiscan_core::types::Flavor;
use logiscan_evm::{Indexer, ScanConfigBuilder};
use logiscan_storage::SqliteStorage;

mod logging;

#[derive(Parser)]
#[command(
    name = "logiscan",
    about = "Logiscan: logistics platform indexer",
    long_about = "
Logiscan follows an EVM chain from the block that deployed a root contract and
records every transaction against the platform's contracts.

ENVIRONMENT VARIABLES:
  LOGISCAN_RPC_URL     HTTP JSON-RPC endpoint
  LOGISCAN_WS_URL      WebSocket endpoint for new heads (optional)
  LOGISCAN_DATABASE    SQLite path or URL
  RUST_LOG             Overrides --log-level and --log
",
    version
)]
struct Cli {
    /// Default log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Per-component level, e.g. `logiscan_evm=debug` (repeatable)
    #[arg(long = "log", global = true)]
    log_components: Vec<String>,

    /// Emit JSON structured logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index service, company and order contracts
    Logistics(ScanArgs),

    /// Index the platform token
    Token(ScanArgs),

    /// Show the checkpoint and record count of a flavor
    Status {
        #[arg(long)]
        flavor: Flavor,
        #[arg(long, env = "LOGISCAN_DATABASE", default_value = "./logiscan.db")]
        database: String,
    },

    /// Show build and interface info
    Info,
}

#[derive(Args)]
struct ScanArgs {
    /// Address of the root contract
    #[arg(long)]
    root: String,

    /// Block that deploys the root contract
    #[arg(long)]
    start_block: u64,

    #[arg(long, env = "LOGISCAN_RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Follow new heads over WebSocket instead of polling
    #[arg(long, env = "LOGISCAN_WS_URL")]
    ws_url: Option<String>,

    #[arg(long, env = "LOGISCAN_DATABASE", default_value = "./logiscan.db")]
    database: String,

    /// Head polling interval without a WebSocket endpoint
    #[arg(long, default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Directory with `<family>.json` ABI overrides
    #[arg(long)]
    abi_dir: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(
        &logging::LogConfig {
            level: cli.log_level.clone(),
            json: cli.log_json,
            ..Default::default()
        }
        .with_overrides(&cli.log_components),
    );

    let result = match cli.command {
        Commands::Logistics(args) => cmd_scan(Flavor::Logistics, args).await,
        Commands::Token(args) => cmd_scan(Flavor::Token, args).await,
        Commands::Status { flavor, database } => cmd_status(flavor, &database).await,
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{e:#}"), "logiscan stopped");
        eprintln!("error: {e:#}");
        let fatal = e
            .downcast_ref::<IndexerError>()
            .is_some_and(IndexerError::is_fatal);
        if fatal {
            eprintln!();
            let _ = Cli::command().print_help();
        }
        process::exit(1);
    }
}

async fn cmd_scan(flavor: Flavor, args: ScanArgs) -> Result<()> {
    let mut builder = ScanConfigBuilder::new(flavor)
        .root(args.root)
        .start_block(args.start_block)
        .rpc_url(args.rpc_url)
        .database(args.database)
        .poll_interval_ms(args.poll_interval_ms);
    if let Some(ws_url) = args.ws_url {
        builder = builder.ws_url(ws_url);
    }
    if let Some(dir) = args.abi_dir {
        builder = builder.abi_dir(dir);
    }
    let config = builder.build()?;

    let store = SqliteStorage::open(&config.database)
        .await
        .with_context(|| format!("opening database '{}'", config.database))?;
    let indexer = Indexer::connect(config, Arc::new(store))?;

    tokio::select! {
        result = indexer.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(flavor = %flavor, "interrupted, shutting down");
        }
    }
    Ok(())
}

async fn cmd_status(flavor: Flavor, database: &str) -> Result<()> {
    let store = SqliteStorage::open(database)
        .await
        .with_context(|| format!("opening database '{database}'"))?;
    let checkpoint = store.load(flavor).await?;
    let derived = store.count_derived(flavor).await?;
    let event_logs = store.event_log_count(flavor).await?;

    let status = serde_json::json!({
        "flavor": flavor,
        "checkpoint": checkpoint,
        "derivedRecords": derived,
        "eventLogs": event_logs,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn cmd_info() -> Result<()> {
    let interfaces = Interfaces::embedded()?;
    println!("Logiscan v{}", env!("CARGO_PKG_VERSION"));
    println!("  Flavors: logistics (service, company, order), token");
    println!("  Storage: SQLite (WAL)");
    for iface in [
        &interfaces.probe,
        &interfaces.service,
        &interfaces.company,
        &interfaces.order,
        &interfaces.token,
    ] {
        println!(
            "  Interface {:<8} {} events",
            iface.kind().as_str(),
            iface.events().len()
        );
    }
    Ok(())
}
