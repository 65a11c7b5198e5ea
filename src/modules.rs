use actix_web::web;

use crate::handlers::{self, DynOrderService, DynUserService};

type RouteFn = Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// A feature module: a name, used as its mount point under `/api/v1`, and
/// the closure that registers its routes.
pub struct Module {
    name: &'static str,
    routes: RouteFn,
}

impl Module {
    pub fn new<F>(name: &'static str, routes: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        Self {
            name,
            routes: Box::new(routes),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Ordered list of feature modules, assembled once at start-up and only
/// read afterwards.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, module: Module) -> Self {
        log::info!("Registered module '{}'", module.name);
        self.modules.push(module);
        self
    }

    /// Module names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(Module::name)
    }

    /// Mounts every module at `/<name>`, in registration order.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for module in &self.modules {
            cfg.service(web::scope(&format!("/{}", module.name)).configure(|c| (module.routes)(c)));
        }
    }
}

pub fn user_module(service: web::Data<DynUserService>) -> Module {
    Module::new("users", move |cfg| {
        cfg.app_data(service.clone());
        handlers::users::configure(cfg);
    })
}

pub fn order_module(service: web::Data<DynOrderService>) -> Module {
    Module::new("orders", move |cfg| {
        cfg.app_data(service.clone());
        handlers::orders::configure(cfg);
    })
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    use super::{Module, ModuleRegistry};

    fn ping_module(name: &'static str) -> Module {
        Module::new(name, move |cfg| {
            cfg.route("/ping", web::get().to(move || async move { HttpResponse::Ok().body(name) }));
        })
    }

    #[::core::prelude::v1::test]
    fn names_keep_registration_order() {
        let registry = ModuleRegistry::new()
            .register(ping_module("users"))
            .register(ping_module("orders"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["users", "orders"]);
    }

    #[actix_web::test]
    async fn each_module_is_mounted_under_its_name() {
        let registry = ModuleRegistry::new()
            .register(ping_module("users"))
            .register(ping_module("orders"));
        let app = test::init_service(
            App::new().service(web::scope("/api/v1").configure(|cfg| registry.configure(cfg))),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/orders/ping").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "orders");

        let req = test::TestRequest::get().uri("/api/v1/carts/ping").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
