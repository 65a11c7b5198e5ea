use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{health, orders, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::create_user,
        users::list_users,
        users::active_users,
        users::search_users,
        users::users_by_domain,
        users::get_user,
        users::update_user,
        users::change_password,
        users::delete_user,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::delete_order,
        orders::confirm_order,
        orders::ship_order,
        orders::deliver_order,
        orders::cancel_order,
        orders::get_order_items,
        orders::add_item,
        orders::remove_item,
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "users", description = "User management"),
        (name = "orders", description = "Order lifecycle"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document at `/api-docs/openapi.json` and Swagger UI at
/// `/swagger-ui/`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
