//! Defines the core data model and database queries for expense records.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

/// The row index assigned to a transaction by the database.
pub type TransactionIndex = i64;

/// The storage format for the timestamp recording when a transaction was
/// entered, e.g. "2024-05-01 10:00:00".
const LOG_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

// ============================================================================
// MODELS
// ============================================================================

/// A single expense: an event where money was spent.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The index of the transaction, assigned by the database.
    pub index: TransactionIndex,
    /// When the transaction was entered into the application.
    pub logged_at: PrimitiveDateTime,
    /// The day the expense happened.
    pub date: Date,
    /// A text description of what the expense was for.
    pub description: String,
    /// The amount of money spent.
    pub amount: f64,
    /// The bank the money was paid from.
    pub bank: String,
    /// How the expense was paid, e.g. "Pix".
    pub payment_method: String,
    /// The spending category, e.g. "Supermercado".
    pub category: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            bank: String::new(),
            payment_method: String::new(),
            category: String::new(),
            logged_at: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Set the labels with the chained methods and pass the builder to
/// [create_transaction] to insert the record and get the stored
/// [Transaction] back.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money spent.
    pub amount: f64,

    /// The day the expense happened.
    ///
    /// This represents when the money moved, not when the record was entered
    /// into the application.
    pub date: Date,

    /// A human-readable description of the expense.
    pub description: String,

    /// The bank the money was paid from, e.g. "Nubank".
    pub bank: String,

    /// How the expense was paid, e.g. "Débito", "Pix" or "Crédito".
    pub payment_method: String,

    /// The spending category, e.g. "Casa", "Supermercado".
    pub category: String,

    /// When the record was entered into the application.
    ///
    /// Defaults to the current UTC time if not specified. HTTP endpoints set
    /// this to the current time in the server's local timezone.
    pub logged_at: Option<PrimitiveDateTime>,
}

impl TransactionBuilder {
    /// Set the bank for the transaction.
    pub fn bank(mut self, bank: &str) -> Self {
        self.bank = bank.to_owned();
        self
    }

    /// Set the payment method for the transaction.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = payment_method.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the timestamp recording when the transaction was entered.
    pub fn logged_at(mut self, logged_at: PrimitiveDateTime) -> Self {
        self.logged_at = Some(logged_at);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDateFormat] if the log timestamp cannot be formatted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let logged_at = builder.logged_at.unwrap_or_else(|| {
        let now = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(now.date(), now.time())
    });
    let log = logged_at
        .format(LOG_TIMESTAMP_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), logged_at.to_string()))?;

    let transaction = connection
        .prepare(
            "INSERT INTO main_db (Log, Data, Descricao, Valor, Banco, Forma_de_pagamento, Categoria)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING \"Index\", Log, Data, Descricao, Valor, Banco, Forma_de_pagamento, Categoria",
        )?
        .query_row(
            (
                log,
                builder.date,
                builder.description,
                builder.amount,
                builder.bank,
                builder.payment_method,
                builder.category,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `index`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `index` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    index: TransactionIndex,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT \"Index\", Log, Data, Descricao, Valor, Banco, Forma_de_pagamento, Categoria
             FROM main_db WHERE \"Index\" = :index",
        )?
        .query_one(&[(":index", &index)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(\"Index\") FROM main_db;", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// "Index" is a reserved word in SQLite, so the column name must be quoted
/// everywhere it appears.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS main_db (
                \"Index\" INTEGER PRIMARY KEY AUTOINCREMENT,
                Log TEXT NOT NULL,
                Data TEXT NOT NULL,
                Descricao TEXT NOT NULL,
                Valor REAL NOT NULL,
                Banco TEXT NOT NULL,
                Forma_de_pagamento TEXT NOT NULL,
                Categoria TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('main_db', 0)",
        (),
    )?;

    // Add index used by the date windowed dashboard queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_main_db_data ON main_db(Data);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let index = row.get(0)?;
    let log: String = row.get(1)?;
    let logged_at = PrimitiveDateTime::parse(&log, LOG_TIMESTAMP_FORMAT).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let date = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let bank = row.get(5)?;
    let payment_method = row.get(6)?;
    let category = row.get(7)?;

    Ok(Transaction {
        index,
        logged_at,
        date,
        description,
        amount,
        bank,
        payment_method,
        category,
    })
}

// ============================================================================
// TESTS
// ============================================================================
