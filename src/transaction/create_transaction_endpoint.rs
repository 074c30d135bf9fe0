//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::{
    AppState, Error, endpoints,
    timezone::get_local_offset,
    transaction::{Transaction, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in reais.
    pub amount: f64,
    /// The date when the expense happened.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The bank the money was paid from.
    pub bank: String,
    /// How the expense was paid.
    pub payment_method: String,
    /// The spending category.
    pub category: String,
}

/// A route handler for creating a new transaction, redirects to transactions
/// view on success.
///
/// The log timestamp records when the record was entered, using the server's
/// local timezone.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            tracing::error!("Invalid timezone {}", state.local_timezone);
            return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
        }
    };
    let now_local = OffsetDateTime::now_utc().to_offset(local_offset);

    let transaction = Transaction::build(form.amount, form.date, &form.description)
        .bank(&form.bank)
        .payment_method(&form.payment_method)
        .category(&form.category)
        .logged_at(PrimitiveDateTime::new(now_local.date(), now_local.time()));

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(transaction, &connection) {
        tracing::error!("Could not create transaction with {form:?}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
