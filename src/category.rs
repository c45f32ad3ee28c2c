//! Keyword-based product categorization.
//!
//! Each ingested record is tagged with a coarse category so catalog
//! listings can be grouped. Matching runs against the normalized key, so
//! keywords are written without diacritics. The first category whose
//! keyword appears as a whole token (or token prefix for plurals) wins.

use crate::models::NormalizedKey;

/// Fallback category for products no keyword recognizes.
pub const UNCATEGORIZED: &str = "outros";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "hortifruti",
        &[
            "alface", "tomate", "cebola", "batata", "cenoura", "fruta", "verdura", "legume",
            "banana", "laranja", "maca", "abacaxi", "limao", "couve", "repolho", "beterraba",
            "abobora", "melancia", "uva", "apple", "potato", "onion", "lettuce",
        ],
    ),
    (
        "carnes",
        &[
            "carne", "frango", "peixe", "bovina", "suina", "bacon", "file", "picanha",
            "alcatra", "costela", "linguica", "salsicha", "presunto", "mortadela", "salame",
            "beef", "chicken", "pork", "ham",
        ],
    ),
    (
        "laticinios",
        &[
            "leite", "queijo", "manteiga", "iogurte", "requeijao", "creme", "nata", "yogurte",
            "coalhada", "parmesao", "milk", "cheese", "butter", "yogurt",
        ],
    ),
    (
        "bebidas",
        &[
            "refrigerante", "suco", "agua", "energetico", "isotonico", "cerveja", "vinho",
            "juice", "soda", "beer", "wine", "water",
        ],
    ),
    (
        "limpeza",
        &[
            "sabao", "detergente", "alcool", "desinfetante", "multiuso", "amaciante",
            "sanitaria", "esponja", "vassoura", "rodo", "detergent", "bleach",
        ],
    ),
    (
        "padaria",
        &[
            "pao", "bolo", "bisnaga", "frances", "croissant", "baguete", "broa", "torta",
            "bolacha", "biscoito", "bread", "cake", "cookie",
        ],
    ),
    (
        "mercearia",
        &[
            "arroz", "feijao", "acucar", "cafe", "oleo", "farinha", "macarrao", "molho",
            "extrato", "sal", "tempero", "conserva", "rice", "beans", "sugar", "coffee",
            "flour", "pasta", "oil",
        ],
    ),
    (
        "higiene",
        &[
            "shampoo", "condicionador", "sabonete", "dental", "escova", "higienico",
            "absorvente", "fralda", "desodorante", "perfume", "colonia", "soap", "toothpaste",
        ],
    ),
];

/// Returns the category for a normalized product key.
pub fn categorize(key: &NormalizedKey) -> &'static str {
    for (category, keywords) in CATEGORIES {
        let hit = key.as_str().split(' ').any(|token| {
            keywords
                .iter()
                .any(|kw| token == *kw || is_plural_of(token, kw))
        });
        if hit {
            return category;
        }
    }
    UNCATEGORIZED
}

fn is_plural_of(token: &str, keyword: &str) -> bool {
    token
        .strip_prefix(keyword)
        .is_some_and(|rest| rest == "s" || rest == "es")
}
