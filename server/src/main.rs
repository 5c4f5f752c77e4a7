use tracing::info;

use birdbook::{observability, routes, state::AppState};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Create and run the tokio runtime
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> color_eyre::Result<()> {
    // Initialize tracing
    observability::setup_tracing("birdbook")?;

    // Initialize application state (env config, pool, migrations)
    let app_state = AppState::from_env().await?;

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()?;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, routes::routes(app_state)).await?;

    Ok(())
}
