//! Lets the user stop the server from the browser, mirroring a desktop app's
//! exit action.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base},
    navigation::NavBar,
};

/// How long the server keeps draining open connections after the exit button
/// is pressed.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// The state needed for stopping the server from the exit endpoint.
///
/// This is kept out of [crate::AppState] so that only the exit routes can
/// reach the server handle.
#[derive(Debug, Clone)]
pub struct ExitState {
    /// Signals the running server to shut down.
    pub shutdown_handle: Handle<SocketAddr>,
}

/// Display a page asking the user to confirm they want to stop the server.
pub async fn get_exit_page() -> Response {
    exit_view(NavBar::new(endpoints::EXIT_VIEW)).into_response()
}

/// Stop the server gracefully and confirm the shutdown to the user.
pub async fn post_exit(State(state): State<ExitState>) -> Response {
    tracing::info!("Shutting down at the user's request");

    state
        .shutdown_handle
        .graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));

    html!(
        p id="exit-confirmation" class="font-medium" {
            "The server has stopped. You can close this tab."
        }
    )
    .into_response()
}

fn exit_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4"
            {
                "Exit"
            }

            p class="mb-6"
            {
                "Stopping the server makes the app unavailable until you start it again.
                Your data stays saved on disk."
            }

            div id="exit-outcome" class="w-full max-w-sm"
            {
                button
                    hx-post=(endpoints::EXIT_API)
                    hx-target="#exit-outcome"
                    hx-swap="innerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Stop the server"
                }
            }
        }
    );

    base("Exit", &[], &content)
}
