use roster_export::core::{database, logging};
use roster_export::{AppState, Config, create_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init_tracing();

    let config = Config::from_env()?;
    config.print_info();

    let db = database::connect_lazy(&config)?;
    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, db)?);

    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
