use bigdecimal::{BigDecimal, Signed};

/// Rounds `value` to `places` decimal places, halves away from zero.
///
/// Every sub-total on an invoice goes through this before it is summed, so
/// a grand total is a sum of already rounded amounts.
pub fn round(value: &BigDecimal, places: i64) -> BigDecimal {
    let half = BigDecimal::new(5.into(), places + 1);
    let nudged = if value.is_negative() {
        value - &half
    } else {
        value + &half
    };

    // with_scale truncates toward zero
    nudged.with_scale(places)
}
