use clean_arch_service::{
    build_server, create_pool, in_memory_modules, postgres_modules, run_migrations, Config,
    StorageBackend,
};
use dotenvy::dotenv;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let registry = match config.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database.url).map_err(io::Error::other)?;
            run_migrations(&pool).map_err(io::Error::other)?;
            postgres_modules(pool)
        }
        StorageBackend::Memory => in_memory_modules(),
    };

    log::info!(
        "Starting server at http://{}:{} ({} storage)",
        config.server.host,
        config.server.port,
        config.backend
    );

    build_server(registry, &config.server.host, config.server.port)?.await
}
