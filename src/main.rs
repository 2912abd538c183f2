use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod db;
mod error;
mod models;
mod services;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    utils::init_tracing();

    let config = config::AppConfig::from_env()?;

    // One store handle for the whole process, shared by every request.
    let store = db::connect(&config).await?;
    let shared_state = Arc::new(models::AppState::new(store));

    let app = api::router(shared_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
