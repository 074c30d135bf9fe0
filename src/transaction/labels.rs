//! The fixed sets of labels a transaction can be tagged with.
//!
//! These drive the drop-downs on the new transaction page and the filter
//! form on the transactions page.

/// The banks money can be paid from.
pub const BANKS: [&str; 6] = [
    "Nubank",
    "Next - R",
    "C6",
    "Next - L",
    "Itau - R",
    "Itau - L",
];

/// The ways an expense can be paid.
pub const PAYMENT_METHODS: [&str; 3] = ["Débito", "Pix", "Crédito"];

/// The spending categories.
pub const CATEGORIES: [&str; 11] = [
    "Casa",
    "Supermercado",
    "Restaurante",
    "Ifood",
    "Saúde",
    "Carro",
    "Pessoal",
    "Educação",
    "Lazer",
    "Viagem",
    "Assinaturas",
];
