//! Item Weight Measure - form host server

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iwm_backend::{create_app, external::ErpClient, AppState, Config, ItemWeightMeasureService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iwm_server=debug,iwm_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Item Weight Measure Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        erp = %config.erp.base_url,
        response_shape = ?config.erp.response_shape,
        generation_policy = ?config.form.generation_policy,
        "ERP report source configured"
    );

    let erp = ErpClient::new(&config.erp)?;
    let form = ItemWeightMeasureService::new(Arc::new(erp), config.form.generation_policy);

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        form,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
