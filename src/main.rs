use std::io;
use std::sync::Arc;

use agridirect::infrastructure::farm_repo::DieselFarmRepository;
use agridirect::{build_server, create_pool, run_migrations, AppState, Config};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).map_err(io::Error::other)?;
            run_migrations(&pool).map_err(io::Error::other)?;
            AppState::with_backend(
                Arc::new(DieselFarmRepository::new(pool)),
                config.stock_decrement_timeout,
            )
        }
        None => {
            log::warn!("DATABASE_URL is not set, listings are kept in memory only");
            AppState::in_memory(config.stock_decrement_timeout)
        }
    }
    .with_session_idle_timeout(config.session_idle_timeout);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
