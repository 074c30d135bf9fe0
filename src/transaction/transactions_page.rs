//! Defines the route handler for the page that displays transactions as a
//! filterable table.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Must use axum_extra's Query since that parses an empty string as None
// instead of rejecting the request like axum::Query.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    transaction::{BANKS, CATEGORIES, PAYMENT_METHODS},
};

use super::{
    core::Transaction,
    filter::{TransactionFilter, get_filtered_transactions},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transactions table, narrowed down by the filter criteria in the
/// query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, Error> {
    let filter = filter.normalized();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_filtered_transactions(&filter, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&transactions, &filter).into_response())
}

fn transactions_view(transactions: &[Transaction], filter: &TransactionFilter) -> Markup {
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let filter_active = *filter != TransactionFilter::default();

    let table_row = |transaction: &Transaction| {
        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
            {
                td class={(TABLE_CELL_STYLE) " text-right font-medium"}
                {
                    (format_currency(transaction.amount))
                }

                td class=(TABLE_CELL_STYLE) { (transaction.date) }

                td class=(TABLE_CELL_STYLE) { (transaction.description) }

                td class=(TABLE_CELL_STYLE) { (transaction.bank) }

                td class=(TABLE_CELL_STYLE) { (transaction.payment_method) }

                td class=(TABLE_CELL_STYLE) { (transaction.category) }

                td class=(TABLE_CELL_STYLE)
                {
                    button
                        hx-delete=(format_endpoint(endpoints::TRANSACTION, transaction.index))
                        hx-confirm={
                            "Are you sure you want to delete transaction #"
                            (transaction.index) "?"
                        }
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        )
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "New Transaction"
                    }
                }

                (filter_form(filter))

                div class="rounded bg-gray-50 dark:bg-gray-800 overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class="px-6 py-3 text-right"
                                {
                                    "Amount"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Date"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Description"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Bank"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Payment"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Category"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="7"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if filter_active {
                                            "No transactions match these filters."
                                        } @else {
                                            "No transactions logged yet. "
                                            a href=(new_transaction_route) class=(LINK_STYLE)
                                            {
                                                "Log your first expense"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Renders the filter controls as a plain GET form so that applying filters
/// reloads the page with the criteria in the query string.
fn filter_form(filter: &TransactionFilter) -> Markup {
    let transactions_route = endpoints::TRANSACTIONS_VIEW;

    let label_select =
        |name: &str, label_text: &str, any_label: &str, labels: &[&str], selected: Option<&str>| {
            html!(
                div
                {
                    label for=(name) class=(FORM_LABEL_STYLE) { (label_text) }

                    select name=(name) id=(name) class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { (any_label) }

                        @for label in labels {
                            option value=(label) selected[selected == Some(*label)]
                            {
                                (label)
                            }
                        }
                    }
                }
            )
        };

    html! {
        form
            method="get"
            action=(transactions_route)
            class="grid gap-4 md:grid-cols-3 items-end p-4 rounded bg-gray-50 dark:bg-gray-800"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    name="start_date"
                    id="start_date"
                    type="date"
                    value=[filter.start_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    name="end_date"
                    id="end_date"
                    type="date"
                    value=[filter.end_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (label_select(
                "category",
                "Category",
                "Any category",
                &CATEGORIES,
                filter.category.as_deref(),
            ))

            div
            {
                label for="min_value" class=(FORM_LABEL_STYLE) { "Min Amount" }

                input
                    name="min_value"
                    id="min_value"
                    type="number"
                    step="0.01"
                    min="0"
                    value=[filter.min_value]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="max_value" class=(FORM_LABEL_STYLE) { "Max Amount" }

                input
                    name="max_value"
                    id="max_value"
                    type="number"
                    step="0.01"
                    min="0"
                    value=[filter.max_value]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (label_select("bank", "Bank", "Any bank", &BANKS, filter.bank.as_deref()))

            (label_select(
                "payment_method",
                "Payment Method",
                "Any method",
                &PAYMENT_METHODS,
                filter.payment_method.as_deref(),
            ))

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply Filters" }

                a href=(transactions_route) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::Response};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::{ElementRef, Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        transaction::{Transaction, TransactionFilter, create_transaction},
    };

    use super::{TransactionsViewState, get_transactions_page};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn get_test_state(conn: Connection) -> TransactionsViewState {
        TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn seed_transactions(conn: &Connection) {
        let rows = [
            ("Groceries", 120.50, "Nubank", "Pix", "Supermercado"),
            ("Fuel", 200.0, "C6", "Crédito", "Carro"),
            ("Dinner", 89.90, "Nubank", "Crédito", "Restaurante"),
        ];

        for (description, amount, bank, payment_method, category) in rows {
            create_transaction(
                Transaction::build(amount, date!(2024 - 05 - 01), description)
                    .bank(bank)
                    .payment_method(payment_method)
                    .category(category),
                conn,
            )
            .expect("Could not create transaction");
        }
    }

    #[tokio::test]
    async fn transactions_page_displays_all_transactions() {
        let conn = get_test_connection();
        seed_transactions(&conn);
        let state = get_test_state(conn);

        let response = get_transactions_page(State(state), Query(TransactionFilter::default()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);
        let rows = get_transaction_rows(&html);
        assert_eq!(rows.len(), 3, "want 3 table rows, got {}", rows.len());
        for (row, want_index) in rows.iter().zip(1..) {
            assert_row_has_delete_button(row, want_index);
        }
    }

    #[tokio::test]
    async fn transactions_page_applies_filter_from_query() {
        let conn = get_test_connection();
        seed_transactions(&conn);
        let state = get_test_state(conn);
        let filter = TransactionFilter {
            bank: Some("Nubank".to_owned()),
            payment_method: Some("Crédito".to_owned()),
            ..TransactionFilter::default()
        };

        let response = get_transactions_page(State(state), Query(filter))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);
        let rows = get_transaction_rows(&html);
        assert_eq!(rows.len(), 1, "want 1 table row, got {}", rows.len());
        let row_text = rows[0].text().collect::<String>();
        assert!(
            row_text.contains("Dinner"),
            "want row for 'Dinner', got {row_text}"
        );
    }

    #[tokio::test]
    async fn transactions_page_treats_blank_criteria_as_unset() {
        let conn = get_test_connection();
        seed_transactions(&conn);
        let state = get_test_state(conn);
        let filter = TransactionFilter {
            category: Some("".to_owned()),
            min_value: Some(0.0),
            ..TransactionFilter::default()
        };

        let response = get_transactions_page(State(state), Query(filter))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let rows = get_transaction_rows(&html);
        assert_eq!(rows.len(), 3, "want 3 table rows, got {}", rows.len());
    }

    #[tokio::test]
    async fn transactions_page_shows_empty_state_with_create_link() {
        let conn = get_test_connection();
        let state = get_test_state(conn);

        let response = get_transactions_page(State(state), Query(TransactionFilter::default()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);
        let empty_state = must_get_empty_state(&html);
        let link = empty_state
            .select(&Selector::parse("a").unwrap())
            .next()
            .expect("Empty state should link to the new transaction page");
        assert_eq!(
            link.value().attr("href"),
            Some(endpoints::NEW_TRANSACTION_VIEW)
        );
    }

    #[tokio::test]
    async fn transactions_page_filtered_empty_state_has_no_create_link() {
        let conn = get_test_connection();
        seed_transactions(&conn);
        let state = get_test_state(conn);
        let filter = TransactionFilter {
            bank: Some("Itau - L".to_owned()),
            ..TransactionFilter::default()
        };

        let response = get_transactions_page(State(state), Query(filter))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let empty_state = must_get_empty_state(&html);
        let text = empty_state.text().collect::<String>();
        assert!(
            text.contains("No transactions match these filters."),
            "want filtered empty-state message, got {text}"
        );
        assert!(
            empty_state
                .select(&Selector::parse("a").unwrap())
                .next()
                .is_none(),
            "filtered empty state should not link to the new transaction page"
        );
    }

    #[tokio::test]
    async fn transactions_page_has_filter_form() {
        let conn = get_test_connection();
        let state = get_test_state(conn);

        let response = get_transactions_page(State(state), Query(TransactionFilter::default()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let form_selector = Selector::parse("form[method='get']").unwrap();
        let form = html
            .select(&form_selector)
            .next()
            .expect("No filter form found");
        assert_eq!(
            form.value().attr("action"),
            Some(endpoints::TRANSACTIONS_VIEW),
            "filter form should submit back to the transactions page"
        );

        for name in [
            "start_date",
            "end_date",
            "category",
            "min_value",
            "max_value",
            "bank",
            "payment_method",
        ] {
            let control_selector = Selector::parse(&format!("[name='{name}']")).unwrap();
            assert!(
                form.select(&control_selector).next().is_some(),
                "filter form is missing the control named {name}"
            );
        }
    }

    #[tokio::test]
    async fn transactions_page_preselects_filter_values() {
        let conn = get_test_connection();
        seed_transactions(&conn);
        let state = get_test_state(conn);
        let filter = TransactionFilter {
            bank: Some("C6".to_owned()),
            min_value: Some(50.0),
            ..TransactionFilter::default()
        };

        let response = get_transactions_page(State(state), Query(filter))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let selected_bank = html
            .select(&Selector::parse("select[name='bank'] option[selected]").unwrap())
            .next()
            .expect("No bank option preselected");
        assert_eq!(selected_bank.value().attr("value"), Some("C6"));

        let min_value_input = html
            .select(&Selector::parse("input[name='min_value']").unwrap())
            .next()
            .expect("No min_value input found");
        assert_eq!(min_value_input.value().attr("value"), Some("50"));
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    fn get_transaction_rows(html: &Html) -> Vec<ElementRef<'_>> {
        let row_selector = Selector::parse("tbody tr[data-transaction-row='true']").unwrap();
        html.select(&row_selector).collect()
    }

    #[track_caller]
    fn must_get_empty_state(html: &Html) -> ElementRef<'_> {
        let empty_row_selector = Selector::parse("tbody tr td[data-empty-state='true']").unwrap();
        let empty_state = html
            .select(&empty_row_selector)
            .next()
            .expect("No empty-state row found");
        let colspan = empty_state
            .value()
            .attr("colspan")
            .expect("Empty-state cell missing colspan attribute");
        assert_eq!(colspan, "7", "Empty-state cell should span 7 columns");

        empty_state
    }

    #[track_caller]
    fn assert_row_has_delete_button(row: &ElementRef, want_index: i64) {
        let button = row
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .unwrap_or_else(|| panic!("No delete button found in row for index {want_index}"));

        let want_url = format_endpoint(endpoints::TRANSACTION, want_index);
        let got_url = button.value().attr("hx-delete").unwrap();
        assert_eq!(
            got_url, want_url,
            "want delete button targeting {want_url}, got {got_url}"
        );
        assert_eq!(button.value().attr("hx-target"), Some("closest tr"));
        assert_eq!(button.value().attr("hx-swap"), Some("delete"));
        assert_eq!(
            button.value().attr("hx-target-error"),
            Some("#alert-container")
        );
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
