use crate::config::Config;
use crate::db::PgStore;
use crate::handlers::{
    get_record, missing_key, put_record, storage_method_not_allowed, translate_method_not_allowed,
    translate_record,
};
use crate::store::{DocumentStore, MemoryStore};
use crate::translation::TranslationClient;
use anyhow::{Context, Result};
use axum::routing::{get, MethodRouter};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub translator: Arc<TranslationClient>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, translator: TranslationClient) -> Self {
        Self {
            store,
            translator: Arc::new(translator),
        }
    }
}

/// Build the HTTP router
///
/// The static `translate` segment wins over the `:key` capture, so
/// `/dkv/translate/{key}` never reaches the storage handlers. Segments after
/// the key (including a bare trailing slash) are accepted and ignored. HEAD is
/// registered explicitly so it is rejected instead of falling through to GET.
pub fn build_router(state: AppState) -> Router {
    let storage = || -> MethodRouter<AppState> {
        get(get_record)
            .post(put_record)
            .head(storage_method_not_allowed)
            .fallback(storage_method_not_allowed)
    };
    let translate = || -> MethodRouter<AppState> {
        get(translate_record)
            .head(translate_method_not_allowed)
            .fallback(translate_method_not_allowed)
    };

    Router::new()
        .route(
            "/dkv/",
            get(missing_key)
                .post(put_record)
                .head(storage_method_not_allowed)
                .fallback(storage_method_not_allowed),
        )
        .route("/dkv/:key", storage())
        .route("/dkv/:key/", storage())
        .route("/dkv/:key/*rest", storage())
        .route(
            "/dkv/translate/",
            get(missing_key)
                .head(translate_method_not_allowed)
                .fallback(translate_method_not_allowed),
        )
        .route("/dkv/translate/:key", translate())
        .route("/dkv/translate/:key/", translate())
        .route("/dkv/translate/:key/*rest", translate())
        .fallback(missing_key)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured store
async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if config.in_memory {
        info!("Using in-memory store; records are lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL not set")?;
    let store = PgStore::connect(url, config.db_max_connections).await?;
    Ok(Arc::new(store))
}

/// Run the HTTP server until SIGINT/SIGTERM
pub async fn run(config: &Config) -> Result<()> {
    let store = open_store(config).await?;

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let translator = TranslationClient::from_config(http, config);
    info!("Translation endpoint: {}", translator.endpoint());

    let app = build_router(AppState::new(store, translator));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
