//! Estimated savings across a comparison.
//!
//! For each item with a best option, the saving is the mean price of the
//! *other* found supermarkets minus the best price, times the quantity.
//! Negative contributions are kept. Items without alternatives add nothing.
//!
//! Each item's contribution is computed exactly as a fraction and rounded
//! half away from zero to whole cents before summing. Arithmetic is carried
//! in `i128`; a result beyond the `Cents` range saturates at its bound.

use crate::models::{Cents, ComparisonResult};

/// Savings for one item, or `None` when there is nothing to compare against.
pub fn item_savings(result: &ComparisonResult) -> Option<Cents> {
    exact_item_savings(result).map(saturate)
}

/// Total estimated savings, in cents.
pub fn total_savings(results: &[ComparisonResult]) -> Cents {
    saturate(results.iter().filter_map(exact_item_savings).fold(0i128, i128::saturating_add))
}

fn exact_item_savings(result: &ComparisonResult) -> Option<i128> {
    let best = result.best_option.as_ref()?;
    let best_price = best.price?;

    let others: Vec<i128> = result
        .results
        .iter()
        .filter(|q| q.found && q.supermarket != best.supermarket)
        .filter_map(|q| q.price.map(i128::from))
        .collect();
    if others.is_empty() {
        return None;
    }

    let n = others.len() as i128;
    let sum: i128 = others.iter().sum();
    // (sum / n - best) * quantity, kept as a single fraction over n.
    let numerator =
        (sum - i128::from(best_price) * n).saturating_mul(i128::from(result.item.quantity));
    Some(div_round_half_away(numerator, n))
}

fn saturate(cents: i128) -> Cents {
    Cents::try_from(cents).unwrap_or(if cents < 0 { Cents::MIN } else { Cents::MAX })
}

fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}
