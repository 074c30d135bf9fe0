//! Builds SQL queries from optional filter criteria.
//!
//! The transactions page narrows its listing with these filters. Every field
//! is optional and an unset filter matches every row.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Deserializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

use super::core::{Transaction, map_transaction_row};

/// The format dates take in form and query string submissions.
const FORM_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Optional criteria for narrowing down a transaction query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// The first day of the date range, inclusive.
    #[serde(default, deserialize_with = "optional_date_from_form")]
    pub start_date: Option<Date>,
    /// The last day of the date range, inclusive.
    #[serde(default, deserialize_with = "optional_date_from_form")]
    pub end_date: Option<Date>,
    /// Match transactions with this exact category.
    pub category: Option<String>,
    /// Match transactions worth at least this much.
    #[serde(default, deserialize_with = "optional_amount_from_form")]
    pub min_value: Option<f64>,
    /// Match transactions worth at most this much.
    #[serde(default, deserialize_with = "optional_amount_from_form")]
    pub max_value: Option<f64>,
    /// Match transactions paid from this bank.
    pub bank: Option<String>,
    /// Match transactions paid with this payment method.
    pub payment_method: Option<String>,
}

/// Deserialize a date criterion from a form value, treating an empty string
/// as unset.
///
/// Browsers submit untouched date inputs as `start_date=`, which the stock
/// `Option<Date>` impl rejects instead of skipping.
fn optional_date_from_form<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, FORM_DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Deserialize an amount bound from a form value, treating an empty string
/// as unset.
fn optional_amount_from_form<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl TransactionFilter {
    /// Collapse blank form values into unset criteria.
    ///
    /// Untouched selects submit empty strings, and an amount bound only
    /// applies when strictly positive. Zero means the number input was left
    /// at its default, so neither should constrain the query.
    pub fn normalized(self) -> Self {
        Self {
            start_date: self.start_date,
            end_date: self.end_date,
            category: self.category.filter(|category| !category.is_empty()),
            min_value: self.min_value.filter(|&min_value| min_value > 0.0),
            max_value: self.max_value.filter(|&max_value| max_value > 0.0),
            bank: self.bank.filter(|bank| !bank.is_empty()),
            payment_method: self
                .payment_method
                .filter(|payment_method| !payment_method.is_empty()),
        }
    }

    /// Build the SQL query string and parameter list matching this filter.
    ///
    /// Each present criterion contributes one WHERE clause. The date range
    /// only applies when both endpoints are set, a single-sided range is
    /// ignored.
    pub fn build_query(&self) -> (String, Vec<Value>) {
        let mut query_string_parts = vec![
            "SELECT \"Index\", Log, Data, Descricao, Valor, Banco, Forma_de_pagamento, Categoria \
             FROM main_db"
                .to_owned(),
        ];
        let mut where_clause_parts = Vec::new();
        let mut query_parameters: Vec<Value> = Vec::new();

        if let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) {
            where_clause_parts.push(format!(
                "Data BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2
            ));
            query_parameters.push(Value::Text(start_date.to_string()));
            query_parameters.push(Value::Text(end_date.to_string()));
        }

        if let Some(category) = &self.category {
            where_clause_parts.push(format!("Categoria = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category.clone()));
        }

        if let Some(min_value) = self.min_value {
            where_clause_parts.push(format!("Valor >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(min_value));
        }

        if let Some(max_value) = self.max_value {
            where_clause_parts.push(format!("Valor <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(max_value));
        }

        if let Some(bank) = &self.bank {
            where_clause_parts.push(format!("Banco = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(bank.clone()));
        }

        if let Some(payment_method) = &self.payment_method {
            where_clause_parts.push(format!(
                "Forma_de_pagamento = ?{}",
                query_parameters.len() + 1
            ));
            query_parameters.push(Value::Text(payment_method.clone()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(format!("WHERE {}", where_clause_parts.join(" AND ")));
        }

        (query_string_parts.join(" "), query_parameters)
    }
}

/// Get every transaction matching `filter`, in insertion order.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_filtered_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (query, query_parameters) = filter.build_query();

    connection
        .prepare(&query)?
        .query_map(params_from_iter(query_parameters), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod build_query_tests {
    use rusqlite::types::Value;
    use time::macros::date;

    use super::TransactionFilter;

    const BASE_QUERY: &str = "SELECT \"Index\", Log, Data, Descricao, Valor, Banco, \
                              Forma_de_pagamento, Categoria FROM main_db";

    #[test]
    fn empty_filter_builds_bare_select() {
        let (query, query_parameters) = TransactionFilter::default().build_query();

        assert_eq!(query, BASE_QUERY);
        assert!(
            query_parameters.is_empty(),
            "got parameters {query_parameters:?}, want none"
        );
    }

    #[test]
    fn full_filter_builds_clauses_in_canonical_order() {
        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 05 - 01)),
            end_date: Some(date!(2024 - 05 - 31)),
            category: Some("Supermercado".to_owned()),
            min_value: Some(10.0),
            max_value: Some(100.0),
            bank: Some("Nubank".to_owned()),
            payment_method: Some("Pix".to_owned()),
        };

        let (query, query_parameters) = filter.build_query();

        let want_query = format!(
            "{BASE_QUERY} WHERE Data BETWEEN ?1 AND ?2 AND Categoria = ?3 AND Valor >= ?4 \
             AND Valor <= ?5 AND Banco = ?6 AND Forma_de_pagamento = ?7"
        );
        assert_eq!(query, want_query);
        assert_eq!(
            query_parameters,
            vec![
                Value::Text("2024-05-01".to_owned()),
                Value::Text("2024-05-31".to_owned()),
                Value::Text("Supermercado".to_owned()),
                Value::Real(10.0),
                Value::Real(100.0),
                Value::Text("Nubank".to_owned()),
                Value::Text("Pix".to_owned()),
            ]
        );
    }

    #[test]
    fn single_sided_date_range_is_ignored() {
        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 05 - 01)),
            bank: Some("C6".to_owned()),
            ..TransactionFilter::default()
        };

        let (query, query_parameters) = filter.build_query();

        assert_eq!(query, format!("{BASE_QUERY} WHERE Banco = ?1"));
        assert_eq!(query_parameters, vec![Value::Text("C6".to_owned())]);
    }

    // The transactions page extracts the filter from the query string with
    // axum-extra, which parses it through serde_html_form.
    #[test]
    fn untouched_filter_form_submission_parses_as_default() {
        // Browsers submit every untouched input as an empty value.
        let query_string =
            "start_date=&end_date=&category=&min_value=&max_value=&bank=&payment_method=";

        let filter: TransactionFilter = serde_html_form::from_str(query_string)
            .expect("an untouched form submission should deserialize");

        assert_eq!(filter.start_date, None);
        assert_eq!(filter.end_date, None);
        assert_eq!(filter.min_value, None);
        assert_eq!(filter.max_value, None);
        assert_eq!(filter.normalized(), TransactionFilter::default());
    }

    #[test]
    fn zeroed_number_inputs_normalize_as_default() {
        let query_string =
            "start_date=&end_date=&category=&min_value=0&max_value=0&bank=&payment_method=";

        let filter: TransactionFilter = serde_html_form::from_str(query_string).unwrap();

        assert_eq!(filter.normalized(), TransactionFilter::default());
    }

    #[test]
    fn filled_filter_form_submission_parses_all_criteria() {
        let query_string = "start_date=2024-05-01&end_date=2024-05-31&category=Supermercado\
                            &min_value=10&max_value=100&bank=Nubank&payment_method=Pix";

        let filter: TransactionFilter = serde_html_form::from_str(query_string).unwrap();

        let want = TransactionFilter {
            start_date: Some(date!(2024 - 05 - 01)),
            end_date: Some(date!(2024 - 05 - 31)),
            category: Some("Supermercado".to_owned()),
            min_value: Some(10.0),
            max_value: Some(100.0),
            bank: Some("Nubank".to_owned()),
            payment_method: Some("Pix".to_owned()),
        };
        assert_eq!(filter, want);
    }

    #[test]
    fn normalized_drops_empty_strings_and_non_positive_bounds() {
        let filter = TransactionFilter {
            start_date: None,
            end_date: None,
            category: Some("".to_owned()),
            min_value: Some(0.0),
            max_value: Some(-5.0),
            bank: Some("".to_owned()),
            payment_method: Some("Crédito".to_owned()),
        };

        let got = filter.normalized();

        let want = TransactionFilter {
            payment_method: Some("Crédito".to_owned()),
            ..TransactionFilter::default()
        };
        assert_eq!(got, want);
    }

    #[test]
    fn normalized_keeps_positive_bounds() {
        let filter = TransactionFilter {
            min_value: Some(0.01),
            max_value: Some(50.0),
            ..TransactionFilter::default()
        };

        let got = filter.clone().normalized();

        assert_eq!(got, filter);
    }
}

#[cfg(test)]
mod filter_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{Transaction, create_transaction},
    };

    use super::{TransactionFilter, get_filtered_transactions};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn seed_transactions(conn: &Connection) {
        let rows = [
            (date!(2024 - 05 - 01), "Groceries", 120.50, "Nubank", "Pix", "Supermercado"),
            (date!(2024 - 05 - 10), "Fuel", 200.0, "C6", "Crédito", "Carro"),
            (date!(2024 - 06 - 02), "Dinner", 89.90, "Nubank", "Crédito", "Restaurante"),
        ];

        for (date, description, amount, bank, payment_method, category) in rows {
            create_transaction(
                Transaction::build(amount, date, description)
                    .bank(bank)
                    .payment_method(payment_method)
                    .category(category),
                conn,
            )
            .expect("Could not create transaction");
        }
    }

    #[test]
    fn empty_filter_returns_all_rows() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let got = get_filtered_transactions(&TransactionFilter::default(), &conn)
            .expect("Could not query transactions");

        assert_eq!(got.len(), 3, "got {} transactions, want 3", got.len());
    }

    #[test]
    fn date_range_is_inclusive_at_both_ends() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 05 - 01)),
            end_date: Some(date!(2024 - 05 - 10)),
            ..TransactionFilter::default()
        };
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        let got_descriptions: Vec<&str> = got
            .iter()
            .map(|transaction| transaction.description.as_str())
            .collect();
        assert_eq!(got_descriptions, vec!["Groceries", "Fuel"]);
    }

    #[test]
    fn filters_by_bank_and_payment_method() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            bank: Some("Nubank".to_owned()),
            payment_method: Some("Crédito".to_owned()),
            ..TransactionFilter::default()
        };
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        assert_eq!(got.len(), 1, "got {} transactions, want 1", got.len());
        assert_eq!(got[0].description, "Dinner");
    }

    #[test]
    fn filters_by_value_range() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            min_value: Some(100.0),
            max_value: Some(150.0),
            ..TransactionFilter::default()
        };
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        assert_eq!(got.len(), 1, "got {} transactions, want 1", got.len());
        assert_eq!(got[0].description, "Groceries");
    }

    #[test]
    fn negative_value_bound_is_treated_as_unset() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            max_value: Some(-5.0),
            ..TransactionFilter::default()
        }
        .normalized();
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        assert_eq!(got.len(), 3, "got {} transactions, want 3", got.len());
    }

    #[test]
    fn contradictory_value_bounds_return_no_rows() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            min_value: Some(500.0),
            max_value: Some(100.0),
            ..TransactionFilter::default()
        };
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        assert!(got.is_empty(), "got {got:?}, want no transactions");
    }

    #[test]
    fn unknown_category_returns_no_rows() {
        let conn = get_test_connection();
        seed_transactions(&conn);

        let filter = TransactionFilter {
            category: Some("Iate".to_owned()),
            ..TransactionFilter::default()
        };
        let got = get_filtered_transactions(&filter, &conn).expect("Could not query transactions");

        assert!(got.is_empty(), "got {got:?}, want no transactions");
    }
}
