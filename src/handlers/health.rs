use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::modules::ModuleRegistry;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Every registered module, keyed by name.
    pub modules: BTreeMap<String, String>,
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(registry: web::Data<ModuleRegistry>) -> HttpResponse {
    let modules = registry
        .names()
        .map(|name| (name.to_string(), "active".to_string()))
        .collect();

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        modules,
    })
}
