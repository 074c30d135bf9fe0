use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use financas_rs::initialize_db;

/// A utility for creating a database pre-filled with demo expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Inserting demo transactions...");

    let today = OffsetDateTime::now_utc().date();

    // Days back from today, so some rows land in the current month and the
    // older ones in previous months.
    let seed_rows: [(i64, &str, f64, &str, &str, &str); 9] = [
        (0, "Feira da semana", 187.35, "Nubank", "Débito", "Supermercado"),
        (1, "Almoço no quilo", 42.90, "Next - R", "Pix", "Restaurante"),
        (2, "Jantar de sexta", 56.40, "Nubank", "Crédito", "Ifood"),
        (3, "Uber para o trabalho", 18.75, "C6", "Pix", "Pessoal"),
        (5, "Gasolina", 250.00, "Itau - R", "Crédito", "Carro"),
        (8, "Farmácia", 64.20, "Next - L", "Débito", "Saúde"),
        (13, "Mensalidade da academia", 119.90, "C6", "Crédito", "Assinaturas"),
        (21, "Cinema", 75.00, "Nubank", "Crédito", "Lazer"),
        (34, "Conta de luz", 214.60, "Itau - L", "Pix", "Casa"),
    ];

    for (days_ago, description, amount, bank, payment_method, category) in seed_rows {
        let date = today - Duration::days(days_ago);

        conn.execute(
            "INSERT INTO main_db (Log, Data, Descricao, Valor, Banco, Forma_de_pagamento, Categoria) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                format!("{date} 12:00:00"),
                date.to_string(),
                description,
                amount,
                bank,
                payment_method,
                category,
            ),
        )?;
    }

    println!("Inserted {} demo transactions.", seed_rows.len());
    println!("Success!");

    Ok(())
}
