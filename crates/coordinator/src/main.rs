use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_coordinator::state::CoordinatorState;

/// Single distributed-fleet coordinator: accepts worker connections on
/// `--port` and serves the operator REPL on stdin (§6).
#[derive(Parser, Debug)]
#[command(name = "fleet-coordinatord")]
struct Args {
    /// TCP port workers register against.
    #[arg(long, default_value_t = 7000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let state = Arc::new(CoordinatorState::new());

    let _reaper = fleet_engine::Reaper::spawn(Arc::clone(&state.registry), fleet_core::SystemClock);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(port = args.port, "coordinator listening");

    let accept_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(%addr, "accepted worker connection");
                    let state = Arc::clone(&accept_state);
                    tokio::spawn(async move { fleet_coordinator::connection::handle(stream, state).await });
                }
                Err(e) => tracing::error!(error = %e, "accept error"),
            }
        }
    });

    fleet_coordinator::repl::run(state).await;
    Ok(())
}
