use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_adapters::{RuntimeDriver, ShellRuntimeDriver};
use fleet_worker::WorkerAgent;

/// Worker node: connects to a coordinator, registers, and services
/// lifecycle commands for the containers placed on it (§6).
#[derive(Parser, Debug)]
#[command(name = "fleet-workerd")]
struct Args {
    /// Coordinator host to register against.
    coordinator_ip: String,
    /// Coordinator TCP port.
    coordinator_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let runtime: Arc<dyn RuntimeDriver> = Arc::new(ShellRuntimeDriver::new());

    tracing::info!(ip = %args.coordinator_ip, port = args.coordinator_port, "connecting to coordinator");
    let agent = WorkerAgent::connect(&args.coordinator_ip, args.coordinator_port, runtime)
        .await
        .map_err(|e| anyhow::anyhow!("failed to register with coordinator: {e}"))?;
    tracing::info!(node_id = %agent.node_id(), "worker registered");

    tokio::select! {
        _ = agent.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down worker node");
        }
    }

    Ok(())
}
