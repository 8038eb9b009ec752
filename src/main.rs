/// Веб-форма рекомендаций культур

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crop_advisor::{create_router, AppState, Artifacts, Config, CropAdvisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    tracing::info!("Crop Advisor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Artifact dir: {}", config.artifact_dir.display());

    let artifacts = Artifacts::load(&config.artifact_paths());
    if !artifacts.is_ready() {
        tracing::warn!("Model or scalers missing, /predict will report a configuration error");
    }

    let state = AppState::new(CropAdvisor::new(artifacts));

    let mut app = create_router(state);
    if config.debug {
        app = app.layer(TraceLayer::new_for_http());
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
