//! Zoinkies Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zoinkies_engine::api;
use zoinkies_engine::infrastructure::{
    clock::{SystemClock, SystemRandom},
    playable_locations::PlayableLocationsClient,
    readiness::{Milestone, Readiness},
    resilient_provider::ResilientLocationProvider,
    settings::{load_dotenv_files, AppSettings},
};
use zoinkies_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The engine may be started from `crates/engine`, so look in the workspace root.
    let workspace_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let dotenv_files = load_dotenv_files(&workspace_root);

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zoinkies_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?dotenv_files, "Starting Zoinkies Engine");

    let readiness = Arc::new(Readiness::new());
    {
        let readiness = readiness.clone();
        tokio::spawn(async move {
            readiness.wait_ready().await;
            tracing::info!("All startup milestones reached, accepting traffic");
        });
    }

    // Load configuration
    let settings = AppSettings::load()?;
    readiness.mark(Milestone::SettingsLoaded);

    // Create infrastructure clients
    let client = Arc::new(PlayableLocationsClient::new(
        &settings.provider.base_url,
        &settings.provider.api_key,
        settings.request_timeout(),
    )?);
    let retry_config = settings.provider.retry.clone();
    tracing::info!(
        "Location provider configured with retry: max_retries={}, base_delay_ms={}",
        retry_config.max_retries,
        retry_config.base_delay_ms
    );
    let provider = Arc::new(ResilientLocationProvider::new(client, retry_config));
    readiness.mark(Milestone::ProviderConfigured);

    // Create application
    let addr: SocketAddr = settings.server.bind_address().parse()?;
    let app = Arc::new(App::new(
        settings,
        provider,
        Arc::new(SystemClock::new()),
        Arc::new(SystemRandom::new()),
        readiness,
    )?);

    let router = api::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
