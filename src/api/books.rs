//! Book (catalog) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{Action, Book, Caller, CreateBook, Resource, UpdateBook},
    AppState,
};

use super::{ApiJson, ApiPath};

/// List all books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>, caller: Caller) -> AppResult<Json<Vec<Book>>> {
    caller.authorize(Resource::Books, Action::List)?;

    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
) -> AppResult<Json<Book>> {
    caller.authorize(Resource::Books, Action::Retrieve)?;
    let ApiPath(id) = path?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<ApiJson<CreateBook>, AppError>,
) -> AppResult<(StatusCode, Json<Book>)> {
    caller.authorize(Resource::Books, Action::Create)?;
    let ApiJson(book) = body?;

    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update some fields of a book
#[utoipa::path(
    patch,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
    body: Result<ApiJson<UpdateBook>, AppError>,
) -> AppResult<Json<Book>> {
    caller.authorize(Resource::Books, Action::Update)?;
    let ApiPath(id) = path?;
    let ApiJson(changes) = body?;

    let updated = state.services.catalog.update_book(id, changes).await?;
    Ok(Json(updated))
}

/// Delete a book and its borrow records
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<ApiPath<i32>, AppError>,
) -> AppResult<StatusCode> {
    caller.authorize(Resource::Books, Action::Delete)?;
    let ApiPath(id) = path?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
