//! API handlers for the lending REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{request::Parts, Method},
    routing::get,
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, RESOURCE_NOT_FOUND},
    models::{Caller, UserClaims},
    AppState,
};

/// Identifies the caller from an optional `Authorization: Bearer` header.
///
/// No header means an anonymous caller. A header that is present but cannot
/// be validated is rejected outright.
#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => {
                let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
                    .map_err(|e| AppError::Authentication(e.to_string()))?;
                Ok(Caller::User(claims))
            }
            Err(rejection) if rejection.is_missing() => Ok(Caller::Anonymous),
            Err(rejection) => Err(AppError::Authentication(rejection.to_string())),
        }
    }
}

/// JSON body extractor whose rejections are rendered as [`AppError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections are rendered as [`AppError`].
///
/// Handlers take it as `Result<ApiPath<T>, AppError>` so permissions are
/// checked before a malformed id is reported.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

async fn route_not_found() -> AppError {
    AppError::NotFound(RESOURCE_NOT_FOUND.to_string())
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(format!("Method \"{}\" not allowed.", method))
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id/",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Borrowing
        .route("/borrows/", get(borrows::list_borrows).post(borrows::create_borrow))
        .route(
            "/borrows/:id/",
            get(borrows::get_borrow)
                .patch(borrows::update_borrow)
                .delete(borrows::delete_borrow),
        )
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
