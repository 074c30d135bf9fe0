//! Application router configuration.

use std::net::SocketAddr;

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};
use axum_server::Handle;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    exit::{ExitState, get_exit_page, post_exit},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
///
/// `shutdown_handle` must belong to the server that will serve this router,
/// otherwise the exit endpoint cannot stop it.
pub fn build_router(state: AppState, shutdown_handle: Handle<SocketAddr>) -> Router {
    let exit_routes = Router::new()
        .route(endpoints::EXIT_VIEW, get(get_exit_page))
        .route(endpoints::EXIT_API, post(post_exit))
        .with_state(ExitState { shutdown_handle });

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::COFFEE, get(get_coffee))
        .merge(exit_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod build_router_tests {
    use axum_server::Handle;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, routing::build_router};

    fn get_test_server() -> TestServer {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state =
            AppState::new(db_connection, "Etc/UTC").expect("Could not initialize database.");

        let app = build_router(state, Handle::new());

        TestServer::new(app)
    }

    fn new_transaction_form() -> [(&'static str, &'static str); 6] {
        [
            ("amount", "42.50"),
            ("date", "2024-05-01"),
            ("description", "Groceries"),
            ("bank", "Nubank"),
            ("payment_method", "Pix"),
            ("category", "Supermercado"),
        ]
    }

    #[tokio::test]
    async fn coffee_route_is_a_teapot() {
        let server = get_test_server();

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(axum::http::StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        let response = server.get("/does-not-exist").await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn exit_page_is_routed() {
        let server = get_test_server();

        let response = server.get(endpoints::EXIT_VIEW).await;

        response.assert_status_ok();
        assert!(response.text().contains("Stop the server"));
    }

    #[tokio::test]
    async fn exit_endpoint_confirms_shutdown() {
        let server = get_test_server();

        let response = server.post(endpoints::EXIT_API).await;

        response.assert_status_ok();
        assert!(response.text().contains("The server has stopped."));
    }

    #[tokio::test]
    async fn created_transaction_shows_up_on_transactions_page() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&new_transaction_form())
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("HX-Redirect"),
            endpoints::TRANSACTIONS_VIEW
        );

        let page = server.get(endpoints::TRANSACTIONS_VIEW).await;

        page.assert_status_ok();
        let text = page.text();
        assert!(text.contains("Groceries"), "want Groceries in {text}");
        assert!(text.contains("R$42.50"), "want R$42.50 in {text}");
    }

    #[tokio::test]
    async fn deleted_transaction_disappears_from_transactions_page() {
        let server = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .form(&new_transaction_form())
            .await
            .assert_status_see_other();

        let response = server
            .delete(&endpoints::format_endpoint(endpoints::TRANSACTION, 1))
            .await;

        response.assert_status_ok();

        let page = server.get(endpoints::TRANSACTIONS_VIEW).await;

        page.assert_status_ok();
        assert!(
            !page.text().contains("Groceries"),
            "transaction should be gone from {}",
            page.text()
        );
    }

    #[tokio::test]
    async fn untouched_filter_form_submission_lists_all_rows() {
        let server = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .form(&new_transaction_form())
            .await
            .assert_status_see_other();

        // Submitting the filter form without touching any input sends every
        // field as an empty value.
        let page = server
            .get(&format!(
                "{}?start_date=&end_date=&category=&min_value=&max_value=&bank=&payment_method=",
                endpoints::TRANSACTIONS_VIEW
            ))
            .await;

        page.assert_status_ok();
        let text = page.text();
        assert!(text.contains("Groceries"), "want Groceries in {text}");
    }

    #[tokio::test]
    async fn filtered_transactions_page_only_lists_matching_rows() {
        let server = get_test_server();

        server
            .post(endpoints::TRANSACTIONS_API)
            .form(&new_transaction_form())
            .await
            .assert_status_see_other();
        server
            .post(endpoints::TRANSACTIONS_API)
            .form(&[
                ("amount", "200.00"),
                ("date", "2024-05-10"),
                ("description", "Fuel"),
                ("bank", "C6"),
                ("payment_method", "Crédito"),
                ("category", "Carro"),
            ])
            .await
            .assert_status_see_other();

        let page = server
            .get(endpoints::TRANSACTIONS_VIEW)
            .add_query_param("bank", "C6")
            .await;

        page.assert_status_ok();
        let text = page.text();
        assert!(text.contains("Fuel"), "want Fuel in {text}");
        assert!(!text.contains("Groceries"), "Groceries should be filtered out of {text}");
    }
}
