//! Iriscope Web Server
//!
//! Run with: cargo run -p iriscope-web

use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = iriscope_web::config::Config::load()?;
    info!(
        backend = %config.backend.base_url,
        environment = %config.backend.environment,
        "Starting Iriscope web server..."
    );

    // Create app state
    let state = iriscope_web::state::AppState::new(config.clone());

    // Build router
    let app = iriscope_web::router::build_router(state);

    // Bind to the configured address
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
