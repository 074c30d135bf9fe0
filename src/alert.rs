//! Toast style notifications sent back to htmx form and button requests.
use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A notification rendered into the `#alert-container` element.
///
/// Endpoints return these as the response body for requests made through
/// htmx, which places them via the `response-targets` extension.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A green notification for an operation that completed.
    Success {
        /// Short human readable summary of what happened.
        message: String,
    },
    /// A red notification for an operation that failed.
    Error {
        /// Short human readable summary shown in bold.
        message: String,
        /// What happened and what the user can do about it.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        match self {
            Alert::Success { message } => html! {
                div role="alert" class="flex items-start gap-2 p-4 text-sm rounded-lg border border-green-300 text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800" {
                    p class="grow" { (message) }
                    (dismiss_button())
                }
            },
            Alert::Error { message, details } => html! {
                div role="alert" class="flex items-start gap-2 p-4 text-sm rounded-lg border border-red-300 text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800" {
                    div class="grow" {
                        p class="font-medium" { (message) }
                        p { (details) }
                    }
                    (dismiss_button())
                }
            },
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

fn dismiss_button() -> Markup {
    html! {
        button type="button" aria-label="Dismiss"
            class="shrink-0 font-bold cursor-pointer"
            onclick="this.closest('[role=alert]').remove()" { "✕" }
    }
}
