//! Month to date spending summaries for the dashboard.
//!
//! All aggregation happens in SQL so the dashboard always reads the same rows
//! the transactions page writes.

use std::ops::RangeInclusive;

use rusqlite::Connection;
use time::Date;

use crate::Error;

/// A label (bank or category) paired with the total amount spent under it.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SpendingTotal {
    /// The bank or category name.
    pub label: String,
    /// The sum of all amounts recorded under the label.
    pub total: f64,
}

/// The inclusive date window from the first day of `today`'s month through
/// `today`.
pub(super) fn month_to_date(today: Date) -> RangeInclusive<Date> {
    let first_of_month = today.replace_day(1).unwrap();
    first_of_month..=today
}

/// Get the sum of all transactions dated within `date_range`.
///
/// Returns 0.0 when no transactions fall inside the window.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(super) fn get_monthly_total(
    date_range: &RangeInclusive<Date>,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(Valor), 0.0) FROM main_db WHERE Data BETWEEN ?1 AND ?2",
            [date_range.start().to_string(), date_range.end().to_string()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the total spent per bank within `date_range`, ordered by bank name.
///
/// Banks with no transactions in the window are omitted.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(super) fn get_total_by_bank(
    date_range: &RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<SpendingTotal>, Error> {
    get_totals_grouped_by("Banco", date_range, connection)
}

/// Get the total spent per category within `date_range`, ordered by category
/// name.
///
/// Categories with no transactions in the window are omitted.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub(super) fn get_total_by_category(
    date_range: &RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<SpendingTotal>, Error> {
    get_totals_grouped_by("Categoria", date_range, connection)
}

fn get_totals_grouped_by(
    column: &str,
    date_range: &RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<SpendingTotal>, Error> {
    let query = format!(
        "SELECT {column}, SUM(Valor) FROM main_db WHERE Data BETWEEN ?1 AND ?2 \
         GROUP BY {column} ORDER BY {column} ASC"
    );

    connection
        .prepare(&query)?
        .query_map(
            [date_range.start().to_string(), date_range.end().to_string()],
            |row| {
                Ok(SpendingTotal {
                    label: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|total_result| total_result.map_err(Error::SqlError))
        .collect()
}
