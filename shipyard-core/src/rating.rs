//! Derived ship rating.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{NewShip, Ship};

/// Year the rating formula counts production age from.
pub const RATING_BASE_YEAR: i32 = 3019;
/// Multiplier applied to speed.
pub const RATING_SCALE: f64 = 80.0;

const USED_PENALTY: f64 = 0.5;

/// Compute `80 * speed * k / (3019 - year + 1)` rounded to two decimals,
/// where `k` is 0.5 for used ships and 1 otherwise.
pub fn compute_rating(speed: f64, is_used: bool, prod_year: i32) -> f64 {
    let usage = if is_used { USED_PENALTY } else { 1.0 };
    let age = f64::from(RATING_BASE_YEAR - prod_year + 1);
    round2(RATING_SCALE * speed * usage / age)
}

/// Rating for a stored ship, from its current fields.
pub fn rate_ship(ship: &Ship) -> f64 {
    compute_rating(ship.speed, ship.is_used, ship.prod_year())
}

/// Rating for a ship about to be inserted.
pub fn rate_new_ship(ship: &NewShip) -> f64 {
    compute_rating(ship.speed, ship.is_used, ship.prod_year())
}

/// Round to two decimals, half away from zero.
///
/// Rounding happens on the shortest decimal form of `value`, so `1.005`
/// becomes `1.01` even though its binary value sits just below the tie.
/// Non-finite values are returned unchanged.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .map(|decimal| decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_resolves_binary_ties_upwards() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(0.125), 0.13);
    }

    #[test]
    fn round2_rounds_negative_ties_away_from_zero() {
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(-0.004), 0.0);
    }

    #[test]
    fn round2_keeps_short_values_and_non_finite() {
        assert_eq!(round2(0.33), 0.33);
        assert_eq!(round2(12.0), 12.0);
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn rating_for_new_ship_of_year_2900() {
        // 80 * 0.5 / 120 = 0.333..
        assert_eq!(compute_rating(0.5, false, 2900), 0.33);
    }

    #[test]
    fn used_ships_rate_half() {
        assert_eq!(compute_rating(0.99, false, 3019), 79.2);
        assert_eq!(compute_rating(0.99, true, 3019), 39.6);
    }

    #[test]
    fn older_ships_rate_lower() {
        let recent = compute_rating(0.6, false, 3010);
        let old = compute_rating(0.6, false, 2800);
        assert!(recent > old);
        assert_eq!(old, 0.22);
    }
}
