//! Product-name normalization.
//!
//! Turns free-text product names (and optional brands) into a
//! [`NormalizedKey`] that can be compared across supermarkets.
//!
//! # Algorithm
//!
//! 1. Lower-case.
//! 2. Strip diacritics (NFD decomposition, combining marks dropped).
//! 3. Replace punctuation with spaces. `.` and `,` survive only between two
//!    digits so that `1,5kg` stays one token.
//! 4. Drop quantity/unit tokens: glued forms (`500g`, `1,5kg`, `12x350ml`),
//!    standalone unit words (`kg`, `ml`, `un`, ...), numbers directly
//!    followed by a unit word (`1 kg`), and decimal numbers.
//! 5. Join the remaining tokens with single spaces.
//! 6. If a brand is given, append its normalized tokens that are not
//!    already in the name.
//!
//! The function is pure, and applying it to its own output is a no-op.

use std::collections::BTreeSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::NormalizedKey;

const UNIT_WORDS: &[&str] = &[
    "g", "gr", "grs", "kg", "kgs", "mg", "ml", "l", "lt", "lts", "litro", "litros", "un", "und",
    "unid", "unidade", "unidades", "pct", "pc", "pcs", "cx", "dz", "oz", "lb", "lbs",
];

/// Normalizes a product name, optionally qualified by a brand.
pub fn normalize(text: &str, brand: Option<&str>) -> NormalizedKey {
    let mut tokens = canonical_tokens(text);

    if let Some(brand) = brand {
        for t in canonical_tokens(brand) {
            if !tokens.contains(&t) {
                tokens.push(t);
            }
        }
    }

    if tokens.is_empty() {
        NormalizedKey::empty()
    } else {
        NormalizedKey::from_canonical(tokens.join(" "))
    }
}

/// Token set of a key, as used by the fuzzy matcher.
pub fn tokens(key: &NormalizedKey) -> BTreeSet<&str> {
    key.as_str().split(' ').filter(|t| !t.is_empty()).collect()
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` of two token sets.
///
/// Two empty sets score `0.0`.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Lower-cases and strips diacritics, leaving everything else in place.
pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn canonical_tokens(text: &str) -> Vec<String> {
    let folded: Vec<char> = fold(text).chars().collect();

    let mut spaced = String::with_capacity(folded.len());
    for (i, &c) in folded.iter().enumerate() {
        let between_digits = i > 0
            && i + 1 < folded.len()
            && folded[i - 1].is_ascii_digit()
            && folded[i + 1].is_ascii_digit();
        if c.is_alphanumeric() || ((c == '.' || c == ',') && between_digits) {
            spaced.push(c);
        } else {
            spaced.push(' ');
        }
    }

    let raw: Vec<&str> = spaced.split_whitespace().collect();
    let mut out = Vec::with_capacity(raw.len());
    for (i, tok) in raw.iter().enumerate() {
        if is_unit_word(tok) || is_glued_quantity(tok) || is_decimal_number(tok) {
            continue;
        }
        let next_is_unit = raw.get(i + 1).is_some_and(|n| is_unit_word(n));
        if is_integer(tok) && next_is_unit {
            continue;
        }
        out.push((*tok).to_string());
    }
    out
}

pub(crate) fn is_unit_word(tok: &str) -> bool {
    UNIT_WORDS.contains(&tok)
}

fn is_integer(tok: &str) -> bool {
    !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_number(tok: &str) -> bool {
    tok.contains(['.', ','])
        && tok
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.' || b == b',')
}

/// `500g`, `1,5kg`, `2l`, `12x350ml`, `6x1l`.
fn is_glued_quantity(tok: &str) -> bool {
    let digits_end = tok
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(tok.len());
    if digits_end == 0 {
        return false;
    }
    let rest = &tok[digits_end..];
    if is_unit_word(rest) {
        return true;
    }
    // Multipack: `<count>x<quantity><unit>` or a bare `<count>x`.
    match rest.strip_prefix('x') {
        Some("") => true,
        Some(inner) => is_glued_quantity(inner),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> String {
        normalize(text, None).as_str().to_string()
    }

    #[test]
    fn lowercases_and_strips_diacritics() {
        assert_eq!(key("Feijão Carioca"), "feijao carioca");
        assert_eq!(key("AÇÚCAR Refinado"), "acucar refinado");
    }

    #[test]
    fn removes_quantity_and_unit_tokens() {
        assert_eq!(key("Rice 1kg"), "rice");
        assert_eq!(key("Arroz Tipo 1 5 kg"), "arroz tipo 1");
        assert_eq!(key("Leite Integral 1,5L"), "leite integral");
        assert_eq!(key("Cerveja 12x350ml"), "cerveja");
        assert_eq!(key("Refrigerante 2l - pct"), "refrigerante");
    }

    #[test]
    fn keeps_numbers_that_are_part_of_the_name() {
        assert_eq!(key("Arroz Tipo 1"), "arroz tipo 1");
    }

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(key("  Café   Pilão!!  (Extra-Forte) "), "cafe pilao extra forte");
    }

    #[test]
    fn appends_brand_tokens_once() {
        assert_eq!(
            normalize("Arroz", Some("Tio João")).as_str(),
            "arroz tio joao"
        );
        assert_eq!(
            normalize("Arroz Tio Joao", Some("Tio João")).as_str(),
            "arroz tio joao"
        );
        assert_eq!(normalize("Arroz", Some("  ")).as_str(), "arroz");
    }

    #[test]
    fn empty_after_stripping_is_the_sentinel() {
        assert!(normalize("", None).is_empty());
        assert!(normalize("500g !!", None).is_empty());
        assert_eq!(normalize("---", None), NormalizedKey::empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "Arroz Tipo 1 5 kg",
            "Leite Integral 1,5L Piracanjuba",
            "  Café   Pilão!!  (Extra-Forte) ",
            "Cerveja 12x350ml",
            "ÓLEO de soja 900 ml",
            "2 x Sabão em pó 1kg",
        ];
        for input in inputs {
            let once = normalize(input, None);
            let twice = normalize(once.as_str(), None);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let a = normalize("Macarrão Espaguete 500g", Some("Renata"));
        let b = normalize("Macarrão Espaguete 500g", Some("Renata"));
        assert_eq!(a, b);
    }

    #[test]
    fn jaccard_similarity() {
        let a = NormalizedKey::from_canonical("arroz tipo 1".into());
        let b = NormalizedKey::from_canonical("arroz tipo 2".into());
        let score = jaccard(&tokens(&a), &tokens(&b));
        assert!((score - 0.5).abs() < 1e-9);

        let empty = NormalizedKey::empty();
        assert_eq!(jaccard(&tokens(&empty), &tokens(&empty)), 0.0);
    }
}
