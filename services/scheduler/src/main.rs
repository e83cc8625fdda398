use scheduler::config::Config;
use scheduler::router::create_router;
use scheduler::state::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting scheduler service");

    let config = Config::from_env();
    config.ensure_layout()?;

    // Initialize application state
    let state = AppState::new(&config)?;

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(config.listen_addr).await?;

    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
