//! Defines the page to display when a route or resource does not exist.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Renders the 404 page.
pub struct NotFoundError;

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            error_view(
                "Page Not Found",
                "404",
                "Whoops! The page you were looking for does not exist.",
                "Check the URL for typos or head back to the dashboard.",
            ),
        )
            .into_response()
    }
}

/// The handler for requests that do not match any route.
pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}
