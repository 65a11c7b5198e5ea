use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::commands::{ChangePasswordCommand, CreateUserCommand};
use crate::application::queries::{GetUserQuery, GetUsersQuery, Page, SearchUsersQuery};
use crate::domain::user::User;
use crate::errors::AppError;

use super::DynUserService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Empty or missing fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// A user as seen by clients. The password is never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPageResponse {
    pub users: Vec<UserResponse>,
    pub limit: i64,
    pub offset: i64,
    /// Number of users in this page.
    pub count: usize,
}

impl UserPageResponse {
    fn new(users: Vec<User>, page: Page) -> Self {
        let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        Self {
            count: users.len(),
            users,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub count: usize,
}

impl From<Vec<User>> for UserListResponse {
    fn from(users: Vec<User>) -> Self {
        let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        Self {
            count: users.len(),
            users,
        }
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Page size. Defaults to 10, maximum 100.
    #[serde(default)]
    pub limit: i64,
    /// Number of users to skip. Defaults to 0.
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchUsersParams {
    /// Substring of the email address.
    #[serde(default)]
    pub email: String,
    /// Substring of the name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

// ── Routes ───────────────────────────────────────────────────────────────────

/// Registers the user routes relative to the module scope. Fixed segments
/// come before `/{id}` so they are not captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_user))
        .route("", web::get().to(list_users))
        .route("/active", web::get().to(active_users))
        .route("/search", web::get().to(search_users))
        .route("/domain/{domain}", web::get().to(users_by_domain))
        .route("/{id}", web::get().to(get_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user))
        .route("/{id}/password", web::put().to(change_password));
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing field or password too short"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn create_user(
    service: web::Data<DynUserService>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let cmd = CreateUserCommand {
        email: body.email,
        name: body.name,
        password: body.password,
    };

    let user = web::block(move || service.create_user(cmd))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "One page of users", body = UserPageResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn list_users(
    service: web::Data<DynUserService>,
    query: web::Query<ListUsersParams>,
) -> Result<HttpResponse, AppError> {
    let page = Page::new(query.limit, query.offset);

    let users = web::block(move || {
        service.get_users(GetUsersQuery {
            limit: page.limit,
            offset: page.offset,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserPageResponse::new(users, page)))
}

/// GET /api/v1/users/active
#[utoipa::path(
    get,
    path = "/api/v1/users/active",
    responses(
        (status = 200, description = "Every user that is not deleted", body = UserListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn active_users(service: web::Data<DynUserService>) -> Result<HttpResponse, AppError> {
    let users = web::block(move || service.active_users())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserListResponse::from(users)))
}

/// GET /api/v1/users/search
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    params(SearchUsersParams),
    responses(
        (status = 200, description = "Users matching every non-empty filter", body = UserPageResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn search_users(
    service: web::Data<DynUserService>,
    query: web::Query<SearchUsersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = Page::new(params.limit, params.offset);

    let users = web::block(move || {
        service.search_users(SearchUsersQuery {
            email: params.email,
            name: params.name,
            limit: page.limit,
            offset: page.offset,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserPageResponse::new(users, page)))
}

/// GET /api/v1/users/domain/{domain}
#[utoipa::path(
    get,
    path = "/api/v1/users/domain/{domain}",
    params(
        ("domain" = String, Path, description = "Email domain, e.g. example.com"),
    ),
    responses(
        (status = 200, description = "Users whose email is at the domain", body = UserListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn users_by_domain(
    service: web::Data<DynUserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let domain = path.into_inner();

    let users = web::block(move || service.users_by_email_domain(&domain))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserListResponse::from(users)))
}

/// GET /api/v1/users/{id}
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user(
    service: web::Data<DynUserService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let user = web::block(move || service.get_user(GetUserQuery { user_id }))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PUT /api/v1/users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(
        ("id" = i64, Path, description = "User id"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn update_user(
    service: web::Data<DynUserService>,
    path: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();

    let user = web::block(move || service.update_user(id, &body.email, &body.name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PUT /api/v1/users/{id}/password
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    params(
        ("id" = i64, Path, description = "User id"),
    ),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Password too short"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn change_password(
    service: web::Data<DynUserService>,
    path: web::Path<i64>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let cmd = ChangePasswordCommand {
        user_id: path.into_inner(),
        new_password: body.into_inner().password,
    };

    web::block(move || service.change_password(cmd))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/v1/users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 204, description = "User soft-deleted"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    service: web::Data<DynUserService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.delete_user(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
