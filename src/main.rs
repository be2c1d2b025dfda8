//! Lottery console.
//!
//! A terminal front-end for a pre-deployed lottery contract.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  LOTTERY CONSOLE                     │
//!                 │                                                      │
//!   CLI command ──┼─▶ ┌──────────┐   submit_*   ┌──────────────────┐     │
//!                 │   │  main.rs │ ───────────▶ │ SessionController│     │
//!   stdout  ◀─────┼── │  (view)  │ ◀─ events ── │  session + store │     │
//!                 │   └──────────┘              └───┬──────────┬───┘     │
//!                 │                        accounts │          │ reads/  │
//!                 │                                 ▼          ▼ writes  │
//!                 │                          ┌─────────┐ ┌────────────┐  │
//!                 │                          │ Wallet  │ │LotteryClient│─┼──▶ JSON-RPC
//!                 │                          └─────────┘ └────────────┘  │
//!                 │  config · observability · lifecycle (cross-cutting)  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use lottery_console::config::load_config;
use lottery_console::controller::{ProjectionEvent, ProjectionKind, SessionController};
use lottery_console::lifecycle::{signals, startup, Shutdown};
use lottery_console::lottery::address::checksum;
use lottery_console::lottery::types::{format_ether, ItemCatalog, TxReceipt};
use lottery_console::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lottery-console")]
#[command(about = "Bid on and administer a deployed lottery contract", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "LOTTERY_CONFIG", default_value = "lottery.toml")]
    config: PathBuf,

    /// Index of the loaded private key to use as the active account.
    #[arg(short, long)]
    account: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the contract and print every projection update until Ctrl-C
    Watch,
    #[command(flatten)]
    Action(Action),
}

#[derive(Subcommand)]
enum Action {
    /// Print the current lottery state once
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Bid on an item
    Bid { item_id: u64 },
    /// Declare winners (owners only)
    DeclareWinners,
    /// Withdraw the contract balance (owners only)
    Withdraw,
    /// Reset the lottery (owners only)
    Reset,
    /// Transfer ownership to another address (owners only)
    TransferOwnership { address: String },
    /// Destroy the contract (owners only)
    Destroy,
    /// Check whether the active account won anything
    CheckWinner,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        contract = %config.lottery.contract_address,
        rpc_url = %config.blockchain.rpc_url,
        poll_interval_ms = config.lottery.poll_interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = startup::start(&config, cli.account).await?;

    match cli.command {
        Commands::Watch => watch(app.controller, app.catalog).await,
        Commands::Action(action) => one_shot(app.controller, app.catalog, action).await,
    }
}

async fn watch(
    controller: Arc<SessionController>,
    catalog: ItemCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    // Subscribe before connecting so the first refresh is printed too
    let events = controller.subscribe();
    let printer = tokio::spawn(print_events(
        Arc::clone(&controller),
        events,
        catalog.clone(),
        shutdown.subscribe(),
    ));

    let result = Arc::clone(&controller).run(shutdown.subscribe()).await;
    shutdown.trigger();
    let _ = printer.await;

    if let Err(e) = result {
        eprint!("{}", controller.view(&catalog));
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn print_events(
    controller: Arc<SessionController>,
    mut events: broadcast::Receiver<ProjectionEvent>,
    catalog: ItemCatalog,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&controller, &catalog, event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Display fell behind; showing latest state");
                    print!("{}", controller.view(&catalog));
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}

fn print_event(controller: &SessionController, catalog: &ItemCatalog, event: ProjectionEvent) {
    let snapshot = controller.snapshot();

    match event {
        ProjectionEvent::Updated(ProjectionKind::Items) => {
            for (position, item) in snapshot.items.iter().enumerate() {
                let winner = item
                    .winner
                    .map(|w| format!("  winner: {}", checksum(&w)))
                    .unwrap_or_default();
                println!("[items] {}: {} bids{}", catalog.name(position), item.bid_count(), winner);
            }
        }
        ProjectionEvent::Updated(ProjectionKind::Owners) => {
            let owners: Vec<String> = snapshot.owners.iter().map(checksum).collect();
            println!("[owners] {}", owners.join(", "));
        }
        ProjectionEvent::Updated(ProjectionKind::Balance) => {
            println!("[balance] {} ETH", format_ether(snapshot.status.contract_balance));
        }
        ProjectionEvent::Updated(ProjectionKind::WinnersDeclared) => {
            println!("[status] winners declared: {}", snapshot.status.winners_declared);
        }
        ProjectionEvent::SessionChanged => {
            let session = controller.session();
            match session.active_address {
                Some(active) => println!("[session] current address: {}", checksum(&active)),
                None => println!("[session] not connected"),
            }
        }
    }
}

async fn one_shot(
    controller: Arc<SessionController>,
    catalog: ItemCatalog,
    action: Action,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = controller.connect().await {
        eprint!("{}", controller.view(&catalog));
        return Err(e.into());
    }

    let receipt: Option<TxReceipt> = match action {
        Action::Status { json } => {
            let view = controller.view(&catalog);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view);
            }
            None
        }
        Action::CheckWinner => {
            for line in controller.check_if_winner().messages(&catalog) {
                println!("{}", line);
            }
            None
        }
        Action::Bid { item_id } => Some(controller.submit_bid(item_id).await?),
        Action::DeclareWinners => Some(controller.submit_declare_winners().await?),
        Action::Withdraw => Some(controller.submit_withdraw().await?),
        Action::Reset => Some(controller.submit_reset().await?),
        Action::TransferOwnership { address } => {
            Some(controller.submit_transfer_ownership(&address).await?)
        }
        Action::Destroy => Some(controller.submit_destroy().await?),
    };

    if let Some(receipt) = receipt {
        println!("transaction {} mined", receipt.tx_hash);
        print!("{}", controller.view(&catalog));
    }

    controller.teardown();
    Ok(())
}
