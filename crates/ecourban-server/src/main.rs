use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ecourban_core::storage::data_dir;
use ecourban_core::Config;
use ecourban_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let dir = data_dir()?;
    let config = Config::load_in(&dir)?;
    let paths = config.artifact_paths(&dir);
    let state = AppState::from_config(paths, &config.server);

    if config.server.preload_model {
        match state.store.preload() {
            Ok(()) => info!("model preloaded"),
            Err(e) => warn!("model not preloaded: {e}"),
        }
    }

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, data_dir = %dir.display(), "Energy Forecasting API listening");

    serve(listener, state).await?;
    Ok(())
}
