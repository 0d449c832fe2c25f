//! Point-balance ledger service entry point.
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌───────────────┐    ┌──────────┐
//! │  Config  │───▶│   Gateway    │───▶│ PointService  │───▶│  Stores  │
//! │  (YAML)  │    │ (axum HTTP)  │    │ (lock + rules)│    │ (tables) │
//! └──────────┘    └──────────────┘    └───────────────┘    └──────────┘
//! ```

use std::sync::Arc;

use point_ledger::config::AppConfig;
use point_ledger::gateway::run_server;
use point_ledger::service::PointService;
use point_ledger::store::{MemoryBalanceStore, MemoryHistoryStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = point_ledger::logging::init_logging(&config);

    tracing::info!("starting point-ledger in {} mode", env);

    let port = get_port_override().unwrap_or(config.gateway.port);

    let service = Arc::new(PointService::with_max_balance(
        Arc::new(MemoryBalanceStore::new()),
        Arc::new(MemoryHistoryStore::new()),
        config.ledger.max_balance,
    ));
    tracing::info!("ledger ready, max balance {}", service.max_balance());

    run_server(&config.gateway.host, port, service).await
}
