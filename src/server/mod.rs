//! HTTP surface: JSON API, stored-file downloads and the bundled front-end.
//!
//! Routes:
//! - `POST /api/download` runs the download pipeline
//! - `POST /api/transfer` copies the library to a remote host
//! - `GET /api/files`, `GET /api/search` page through the library
//! - `PUT /api/files/:filename/metadata` edits tags by hand
//! - `POST /api/files/:filename/import-lastfm` merges Last.fm track info
//! - `GET /downloads/*filename` serves one stored file
//! - everything else falls through to the static `public` directory

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::downloader::YtDlp;
use crate::enrichment::EnrichmentService;
use crate::error::{Error, Result};
use crate::library::Library;
use crate::metadata::{LoftyTags, TagStore};
use crate::pipeline::Pipeline;
use crate::transfer::{ScpTransfer, TransferService};

/// Services shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub transfer: TransferService,
    pub library: Library,
}

impl AppState {
    /// Wire the real downloader, tag store, transfer tool and HTTP clients.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tools = &config.tools;
        let download_dir = &config.library.download_dir;

        let enrichment = EnrichmentService::from_config(config)?;
        let tags: Arc<dyn TagStore> = Arc::new(LoftyTags);
        let downloader = Arc::new(YtDlp::new(&tools.ytdlp_path, tools.download_timeout()));
        let transferer = Arc::new(ScpTransfer::new(
            &tools.scp_path,
            &tools.sshpass_path,
            tools.transfer_timeout(),
        ));

        Ok(Self {
            pipeline: Pipeline::new(downloader, tags.clone(), enrichment.clone(), download_dir),
            transfer: TransferService::new(transferer, download_dir),
            library: Library::new(download_dir, tags, enrichment),
        })
    }
}

/// Build the application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/api/download", post(handlers::download))
        .route("/api/transfer", post(handlers::transfer))
        .route("/api/files", get(handlers::list_files))
        .route("/api/search", get(handlers::search_files))
        .route("/api/files/:filename/metadata", put(handlers::update_metadata))
        .route(
            "/api/files/:filename/import-lastfm",
            post(handlers::import_lastfm),
        )
        .route("/downloads/*filename", get(handlers::serve_download))
        .fallback_service(ServeDir::new(&server.public_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors_layer(&server.allowed_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Cross-origin policy; `None` keeps the API same-origin only.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    tokio::fs::create_dir_all(&config.library.download_dir).await?;

    let ip = config
        .server
        .bind_address
        .parse()
        .map_err(|_| Error::config(format!("Invalid bind address: {}", config.server.bind_address)))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        download_dir = %config.library.download_dir.display(),
        lastfm = config.lastfm_api_key().is_some(),
        "Server listening"
    );

    axum::serve(listener, router(state, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
