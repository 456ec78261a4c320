//! HTTP server for Folio pages.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Published pages at the paths derived from the page tree
//! - A link endpoint resolving page ids to canonical URLs
//! - The admin API under `/manage/api/pages`
//!
//! Public routes are rebuilt in full whenever an admin action changes an
//! alias, a parent or a page's deletion state.
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         database_url: "sqlite:folio.db".to_string(),
//!         version: "1.0.0".to_string(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (folio-server)
//!                        │
//!                        ├─► Public pages ──► RouteRegistry snapshot ──► PageStore
//!                        │
//!                        └─► Admin API ──► PageStore ──► RouteRegistry rebuild
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod registry;
mod render;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use folio_pages::TemplateCatalog;
use folio_store::{PageStore, SqlitePageStore};
use state::AppState;

pub use error::ServerError;
pub use registry::RouteRegistry;
pub use render::{DefaultRenderer, PageRenderer, SiteRenderer, resolve_renderer};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Database connection URL.
    pub database_url: String,
    /// Maximum pooled database connections.
    pub max_connections: u32,
    /// Register public page routes.
    pub pages_enabled: bool,
    /// Directory of site layouts (`None` uses the built-in page).
    pub site_templates_dir: Option<PathBuf>,
    /// Selectable templates and layouts with their defaults.
    pub catalog: TemplateCatalog,
    /// Admin list page size.
    pub page_size: u32,
    /// Bearer token for the admin API (`None` leaves it open).
    pub admin_token: Option<String>,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
            database_url: "sqlite:folio.db".to_owned(),
            max_connections: 1,
            pages_enabled: true,
            site_templates_dir: None,
            catalog: TemplateCatalog::default(),
            page_size: 50,
            admin_token: None,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqlitePageStore::connect(&config.database_url, config.max_connections).await?;
    if !store.is_migrated().await? {
        tracing::warn!(
            database = %config.database_url,
            "Pages table missing, run `folio migrate` to create it"
        );
    }

    let state = Arc::new(AppState {
        store: Arc::new(store),
        routes: RouteRegistry::new(),
        renderer: resolve_renderer(config.site_templates_dir.as_deref()),
        catalog: config.catalog,
        page_size: config.page_size,
        admin_token: config.admin_token,
        pages_enabled: config.pages_enabled,
        version: config.version,
    });
    state.rebuild_routes().await?;

    // Create router
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Folio config.
///
/// # Arguments
///
/// * `config` - Folio configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_config(config: &folio_config::Config, version: String) -> ServerConfig {
    let pages = &config.pages;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        pages_enabled: pages.enabled,
        site_templates_dir: pages.site_templates_dir.clone(),
        catalog: TemplateCatalog {
            default_template: pages.default_template.clone(),
            default_layout: pages.default_layout.clone(),
            templates: pages.templates.clone(),
            layouts: pages.layouts.clone(),
        },
        page_size: pages.page_size,
        admin_token: config.admin.token.clone(),
        version,
    }
}
