use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue, Method};
use drainwatch_api::actor::{USER_ID_HEADER, USER_ROLE_HEADER};
use drainwatch_api::services::TracingNotifier;
use drainwatch_api::{create_router, ApiConfig, AppState};
use drainwatch_core::config::LayeredConfig;
use drainwatch_store::postgres::{PostgresConfig, PostgresStore};
use drainwatch_store::{LocalFileStore, MemoryStore, Seed, Store};
use drainwatch_workflow::DrainageService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drainwatch_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    let mut layered = LayeredConfig::with_defaults();
    if let Some(path) = &config.config_file {
        layered = layered
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }
    let workflow_config = layered.load_from_env().workflow_config();

    tracing::info!(
        port = config.port,
        match_threshold_meters = workflow_config.match_threshold_meters,
        auto_link_nearby = workflow_config.auto_link_nearby,
        "Starting Drainwatch API server"
    );

    let store: Arc<dyn Store> = match &config.database_url {
        Some(_) => {
            tracing::info!("DATABASE_URL found, connecting to PostgreSQL...");
            let pg_config = PostgresConfig::from_env().context("Invalid PostgreSQL configuration")?;
            let store = PostgresStore::new(pg_config).await.map_err(|e| {
                tracing::error!(
                    "Remediation:\n\
                    1. Ensure PostgreSQL is running\n\
                    2. Verify DATABASE_URL is correct\n\
                    3. Check that the database exists and is accessible"
                );
                anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e)
            })?;
            Arc::new(store)
        }
        None => {
            tracing::info!("Using in-memory storage (set DATABASE_URL for PostgreSQL)");
            match &config.seed_file {
                Some(path) => {
                    let seed = Seed::from_file(path)
                        .with_context(|| format!("Failed to load seed {}", path.display()))?;
                    Arc::new(MemoryStore::from_seed(seed))
                }
                None => Arc::new(MemoryStore::new()),
            }
        }
    };

    let files = Arc::new(LocalFileStore::new(&config.storage_root, config.public_url.clone()));
    let service =
        DrainageService::new(store, files, Arc::new(TracingNotifier), workflow_config);
    let state = Arc::new(AppState::new(service));

    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin '{}'", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    let app = create_router(state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await?;
    Ok(())
}
