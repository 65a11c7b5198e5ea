use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::application::queries::{ListOrdersQuery, Page};
use crate::application::OrderItemInput;
use crate::domain::order::{Order, OrderItem};
use crate::errors::AppError;

use super::DynOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

/// Most fractional digits accepted in a price.
const MAX_PRICE_SCALE: i64 = 4;
/// Most digits accepted left of the decimal point.
const MAX_PRICE_INTEGER_DIGITS: i64 = 15;

/// Rejects prices whose exponent would make totals expand to an unbounded
/// number of digits.
fn price_in_range(price: &BigDecimal) -> bool {
    let (_, scale) = price.as_bigint_and_exponent();
    let integer_digits = (price.digits() as i64).saturating_sub(scale);
    scale <= MAX_PRICE_SCALE && integer_digits <= MAX_PRICE_INTEGER_DIGITS
}

impl OrderItemRequest {
    fn into_input(self) -> Result<OrderItemInput, AppError> {
        let price = BigDecimal::from_str(&self.price)
            .ok()
            .filter(price_in_range)
            .ok_or_else(|| AppError::BadRequest(format!("invalid price '{}'", self.price)))?;
        Ok(OrderItemInput {
            product_id: self.product_id,
            quantity: self.quantity,
            price,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price.to_string(),
            subtotal: item.subtotal().to_string(),
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    /// One of pending, confirmed, shipped, delivered, cancelled.
    pub status: String,
    pub total_amount: String,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            user_id: order.user_id(),
            status: order.status().to_string(),
            total_amount: order.total_amount().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPageResponse {
    pub orders: Vec<OrderResponse>,
    pub limit: i64,
    pub offset: i64,
    /// Number of orders in this page.
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemsResponse {
    pub order_id: i64,
    pub items: Vec<OrderItemResponse>,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersParams {
    /// Only list this user's orders.
    pub user_id: Option<i64>,
    /// Page size. Defaults to 10, maximum 100.
    #[serde(default)]
    pub limit: i64,
    /// Number of orders to skip. Defaults to 0.
    #[serde(default)]
    pub offset: i64,
}

// ── Routes ───────────────────────────────────────────────────────────────────

/// Registers the order routes relative to the module scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_order))
        .route("", web::get().to(list_orders))
        .route("/{id}", web::get().to(get_order))
        .route("/{id}", web::delete().to(delete_order))
        .route("/{id}/confirm", web::put().to(confirm_order))
        .route("/{id}/ship", web::put().to(ship_order))
        .route("/{id}/deliver", web::put().to(deliver_order))
        .route("/{id}/cancel", web::put().to(cancel_order))
        .route("/{id}/items", web::get().to(get_order_items))
        .route("/{id}/items", web::post().to(add_item))
        .route("/{id}/items/{item_id}", web::delete().to(remove_item));
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/orders
///
/// Creates a `pending` order together with its items.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid user id, empty order or malformed item"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<DynOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let items = body
        .items
        .into_iter()
        .map(OrderItemRequest::into_input)
        .collect::<Result<Vec<_>, _>>()?;

    let order = web::block(move || service.create_order(body.user_id, items))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(&order)))
}

/// GET /api/v1/orders
///
/// Lists orders by ascending id, optionally restricted to one user.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "One page of orders", body = OrderPageResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<DynOrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = Page::new(params.limit, params.offset);

    let orders = web::block(move || {
        service.list_orders(ListOrdersQuery {
            user_id: params.user_id,
            limit: page.limit,
            offset: page.offset,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let orders: Vec<OrderResponse> = orders.iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(OrderPageResponse {
        count: orders.len(),
        orders,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /api/v1/orders/{id}
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.get_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// DELETE /api/v1/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 204, description = "Order soft-deleted"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.delete_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/v1/orders/{id}/confirm
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/confirm",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order confirmed", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn confirm_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.confirm_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// PUT /api/v1/orders/{id}/ship
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/ship",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order shipped", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not confirmed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn ship_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.ship_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// PUT /api/v1/orders/{id}/deliver
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/deliver",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order delivered", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not shipped"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn deliver_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.deliver_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// PUT /api/v1/orders/{id}/cancel
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/cancel",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already delivered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.cancel_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// GET /api/v1/orders/{id}/items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Items of the order", body = OrderItemsResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_items(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let items = web::block(move || service.get_order_items(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderItemsResponse {
        order_id,
        items: items.iter().map(OrderItemResponse::from).collect(),
    }))
}

/// POST /api/v1/orders/{id}/items
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/items",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    request_body = OrderItemRequest,
    responses(
        (status = 201, description = "Item added, returns the updated order", body = OrderResponse),
        (status = 400, description = "Malformed item"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn add_item(
    service: web::Data<DynOrderService>,
    path: web::Path<i64>,
    body: web::Json<OrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = body.into_inner().into_input()?;

    let order = web::block(move || service.add_item(id, item))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(&order)))
}

/// DELETE /api/v1/orders/{id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}/items/{item_id}",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("item_id" = i64, Path, description = "Item id"),
    ),
    responses(
        (status = 200, description = "Item removed, returns the updated order", body = OrderResponse),
        (status = 404, description = "Order or item not found"),
        (status = 409, description = "Order is not pending"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn remove_item(
    service: web::Data<DynOrderService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (id, item_id) = path.into_inner();

    let order = web::block(move || service.remove_item(id, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}
