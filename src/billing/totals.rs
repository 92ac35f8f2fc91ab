use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use super::duration::duration_hours;
use super::rates::{ResolvedRate, resolve_rate};
use super::rounding::round;
use crate::models::BillableActivity;

/// Flat surcharge per kilometre of transit: 0.85.
pub fn transit_rate_per_km() -> BigDecimal {
    BigDecimal::new(85.into(), 2)
}

/// What one activity contributes to an invoice.
///
/// Each charge is already rounded to cents; `subtotal` is their plain sum.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub rate: ResolvedRate,
    pub duration_hours: BigDecimal,
    pub service: BigDecimal,
    pub transit_distance: BigDecimal,
    pub transit_time: BigDecimal,
    pub subtotal: BigDecimal,
}

fn present(value: &Option<BigDecimal>) -> Option<&BigDecimal> {
    value.as_ref().filter(|v| !v.is_zero())
}

pub fn activity_cost(billable: &BillableActivity) -> CostBreakdown {
    let activity = &billable.activity;
    let rate = resolve_rate(billable);
    let hours = duration_hours(activity.start_time, activity.end_time);

    let service = round(&(&hours * &rate.rate), 2);

    let transit_distance = present(&activity.transit_distance)
        .map(|km| round(&(km * &transit_rate_per_km()), 2))
        .unwrap_or_else(BigDecimal::zero);

    // minutes * rate / 60 keeps the division exact for cent-valued rates
    let transit_time = present(&activity.transit_duration)
        .map(|minutes| round(&((minutes * &rate.rate) / BigDecimal::from(60_i64)), 2))
        .unwrap_or_else(BigDecimal::zero);

    let subtotal = &service + &transit_distance + &transit_time;

    CostBreakdown {
        rate,
        duration_hours: hours,
        service,
        transit_distance,
        transit_time,
        subtotal,
    }
}

/// Grand total of an invoice: the sum of each activity's rounded charges.
pub fn total_cost(activities: &[BillableActivity]) -> BigDecimal {
    activities
        .iter()
        .map(|billable| activity_cost(billable).subtotal)
        .fold(BigDecimal::zero(), |total, subtotal| total + subtotal)
}
