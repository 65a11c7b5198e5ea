pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod modules;
pub mod openapi;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::application::{OrderService, UserService};
use crate::domain::ports::{OrderRepository, UserRepository};
use crate::infrastructure::{
    DieselOrderRepository, DieselUserRepository, InMemoryOrderRepository, InMemoryUserRepository,
};
use crate::modules::{order_module, user_module, ModuleRegistry};

pub use config::{Config, StorageBackend};
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Registers the feature modules, users first, over the given repositories.
pub fn build_registry(
    users: Box<dyn UserRepository>,
    orders: Box<dyn OrderRepository>,
) -> ModuleRegistry {
    ModuleRegistry::new()
        .register(user_module(web::Data::new(UserService::new(users))))
        .register(order_module(web::Data::new(OrderService::new(orders))))
}

pub fn postgres_modules(pool: DbPool) -> ModuleRegistry {
    build_registry(
        Box::new(DieselUserRepository::new(pool.clone())),
        Box::new(DieselOrderRepository::new(pool)),
    )
}

pub fn in_memory_modules() -> ModuleRegistry {
    build_registry(
        Box::new(InMemoryUserRepository::new()),
        Box::new(InMemoryOrderRepository::new()),
    )
}

/// Mounts `/health`, every module under `/api/v1`, and the API docs.
pub fn configure_app(cfg: &mut web::ServiceConfig, registry: web::Data<ModuleRegistry>) {
    cfg.app_data(registry.clone())
        .route("/health", web::get().to(handlers::health::health))
        .service(web::scope("/api/v1").configure(|api| registry.configure(api)))
        .configure(openapi::configure);
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    registry: ModuleRegistry,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let registry = web::Data::new(registry);
    Ok(HttpServer::new(move || {
        let registry = registry.clone();
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| configure_app(cfg, registry))
    })
    .bind((host.to_string(), port))?
    .run())
}
