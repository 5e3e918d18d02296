pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::catalog_service::CatalogService;
use application::sessions::SessionStore;
use application::shop_service::ShopService;
use application::venue_service::VenueService;
use domain::ports::{FarmRepository, StockDecrementer, VenueRepository};
use infrastructure::memory_catalog::InMemoryCatalog;

pub use config::Config;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("{} pending migration(s) applied", applied.len());
    Ok(())
}

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub venues: VenueService,
    pub shop: ShopService,
}

impl AppState {
    /// Serve listings, venues and stock from one backend.
    pub fn with_backend<B>(backend: Arc<B>, stock_decrement_timeout: Duration) -> Self
    where
        B: FarmRepository + VenueRepository + StockDecrementer,
    {
        Self {
            catalog: CatalogService::new(backend.clone()),
            venues: VenueService::new(backend.clone()),
            shop: ShopService::new(
                backend.clone(),
                backend,
                SessionStore::default(),
                stock_decrement_timeout,
            ),
        }
    }

    pub fn in_memory(stock_decrement_timeout: Duration) -> Self {
        Self::with_backend(Arc::new(InMemoryCatalog::default()), stock_decrement_timeout)
    }

    /// Expire shopping sessions left idle for `idle_timeout`.
    pub fn with_session_idle_timeout(self, idle_timeout: Duration) -> Self {
        Self {
            shop: self.shop.with_session_idle_timeout(idle_timeout),
            ..self
        }
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = handlers::ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
