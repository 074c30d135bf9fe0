//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The state type used by the handler

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    dashboard::{
        cards::monthly_total_card,
        charts::{DashboardChart, bank_chart, category_chart, charts_script, charts_view},
        summary::{
            SpendingTotal, get_monthly_total, get_total_by_bank, get_total_by_category,
            month_to_date,
        },
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by the dashboard handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for summarising transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    monthly_total: f64,
    charts: [DashboardChart; 2],
}

/// Display a page with an overview of the current month's spending.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(&state.local_timezone, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, data.monthly_total, &data.charts).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// # Arguments
/// * `local_timezone_name` - Timezone name like "America/Sao_Paulo"
/// * `connection` - Database connection
///
/// # Returns
/// All dashboard data ready for rendering, or `None` if no transactions fall
/// within the current month.
///
/// # Errors
/// Returns error if database queries fail or the timezone is invalid.
fn build_dashboard_data(
    local_timezone_name: &str,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let local_timezone = get_local_offset(local_timezone_name).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone_name);
        Error::InvalidTimezoneError(local_timezone_name.to_owned())
    })?;

    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();
    let date_range = month_to_date(today);

    let totals_by_category = get_total_by_category(&date_range, connection)
        .inspect_err(|error| tracing::error!("could not get totals by category: {error}"))?;

    // No rows this month means there is nothing to chart.
    if totals_by_category.is_empty() {
        return Ok(None);
    }

    let totals_by_bank = get_total_by_bank(&date_range, connection)
        .inspect_err(|error| tracing::error!("could not get totals by bank: {error}"))?;

    let monthly_total = get_monthly_total(&date_range, connection)
        .inspect_err(|error| tracing::error!("could not get monthly total: {error}"))?;

    let charts = build_dashboard_charts(&totals_by_category, &totals_by_bank);

    Ok(Some(DashboardData {
        monthly_total,
        charts,
    }))
}

/// Creates the array of dashboard charts from the month to date summaries.
///
/// The chart options are serialized to JSON for ECharts consumption.
fn build_dashboard_charts(
    totals_by_category: &[SpendingTotal],
    totals_by_bank: &[SpendingTotal],
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "category-chart",
            options: category_chart(totals_by_category).to_string(),
        },
        DashboardChart {
            id: "bank-chart",
            options: bank_chart(totals_by_bank).to_string(),
        },
    ]
}

/// Renders the dashboard page when no transactions fall within the current
/// month.
///
/// The monthly total card still renders with a zero amount, followed by a
/// message pointing at the new transaction page.
///
/// # Arguments
/// * `nav_bar` - Navigation bar component
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "here");

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (monthly_total_card(0.0))

            div class="flex flex-col items-center px-6 py-8 mx-auto"
            {
                h2 class="text-xl font-bold"
                {
                    "Nothing here yet..."
                }

                p
                {
                    "No expenses found for the current month.
                    Charts will show up here once you add some transactions " (new_transaction_link) "."
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with the monthly total card and spending
/// charts.
///
/// # Arguments
/// * `nav_bar` - Navigation bar component
/// * `monthly_total` - The sum of all amounts recorded this month
/// * `charts` - Dashboard charts to display
fn dashboard_view(nav_bar: NavBar, monthly_total: f64, charts: &[DashboardChart]) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (monthly_total_card(monthly_total))

            (charts_view(charts))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("https://unpkg.com/echarts@6.0.0/dist/echarts.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}
