//! Borrow endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{Action, Borrow, Caller, CreateBorrow, Resource, UpdateBorrow},
    AppState,
};

use super::{ApiJson, ApiPath};

/// List every borrow record
#[utoipa::path(
    get,
    path = "/borrows/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrow records", body = Vec<Borrow>),
        (status = 403, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_borrows(State(state): State<AppState>, caller: Caller) -> AppResult<Json<Vec<Borrow>>> {
    caller.authorize(Resource::Borrows, Action::List)?;

    let borrows = state.services.borrows.list_borrows().await?;
    Ok(Json(borrows))
}

/// Get borrow record by ID
#[utoipa::path(
    get,
    path = "/borrows/{id}/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Borrow record", body = Borrow),
        (status = 403, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrow(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
) -> AppResult<Json<Borrow>> {
    caller.authorize(Resource::Borrows, Action::Retrieve)?;
    let ApiPath(id) = path?;

    let borrow = state.services.borrows.get_borrow(id).await?;
    Ok(Json(borrow))
}

/// Borrow a book as the calling user
#[utoipa::path(
    post,
    path = "/borrows/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed", body = Borrow),
        (status = 400, description = "Missing due date or book not available", body = crate::error::ErrorResponse),
        (status = 403, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<ApiJson<CreateBorrow>, AppError>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    caller.authorize(Resource::Borrows, Action::Create)?;
    let borrower = caller.user()?;
    let ApiJson(request) = body?;

    let borrow = state.services.borrows.create_borrow(borrower, request).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Change the due date of a borrow record
#[utoipa::path(
    patch,
    path = "/borrows/{id}/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    request_body = UpdateBorrow,
    responses(
        (status = 200, description = "Borrow updated", body = Borrow),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_borrow(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
    body: Result<ApiJson<UpdateBorrow>, AppError>,
) -> AppResult<Json<Borrow>> {
    caller.authorize(Resource::Borrows, Action::Update)?;
    let ApiPath(id) = path?;
    let ApiJson(changes) = body?;

    let updated = state.services.borrows.update_borrow(id, changes).await?;
    Ok(Json(updated))
}

/// Delete a borrow record; the book is not made available again
#[utoipa::path(
    delete,
    path = "/borrows/{id}/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 204, description = "Borrow deleted"),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_borrow(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
) -> AppResult<StatusCode> {
    caller.authorize(Resource::Borrows, Action::Delete)?;
    let ApiPath(id) = path?;

    state.services.borrows.delete_borrow(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
