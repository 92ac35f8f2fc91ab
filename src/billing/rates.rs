use std::fmt;

use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveTime, Timelike, Weekday};
use serde::Serialize;

use crate::error::BillingError;
use crate::models::{BillableActivity, SupportItem};

/// Activities ending strictly after this many seconds past midnight (20:00)
/// qualify for the weeknight rate.
const WEEKNIGHT_START_SECS: u32 = 20 * 60 * 60;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateBucket {
    Weekday,
    Weeknight,
    Saturday,
    Sunday,
}

impl fmt::Display for RateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RateBucket::Weekday => "weekday",
            RateBucket::Weeknight => "weeknight",
            RateBucket::Saturday => "saturday",
            RateBucket::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

/// The billing code and rate chosen for one activity.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    pub bucket: RateBucket,
    pub code: String,
    pub rate: BigDecimal,
}

impl ResolvedRate {
    /// False when the support item offers nothing for the chosen bucket.
    ///
    /// Such an activity still totals to zero rather than failing.
    pub fn is_billable(&self) -> bool {
        !self.code.is_empty() && !self.rate.is_zero()
    }
}

/// The (code, rate) pair a support item offers for a bucket, if any.
///
/// A pair only counts as offered when the code is non-empty and a rate is
/// present. A rate of zero is still present.
pub fn offered(item: &SupportItem, bucket: RateBucket) -> Option<(&str, &BigDecimal)> {
    let (code, rate) = match bucket {
        RateBucket::Weekday => (&item.weekday_code, &item.weekday_rate),
        RateBucket::Weeknight => (&item.weeknight_code, &item.weeknight_rate),
        RateBucket::Saturday => (&item.saturday_code, &item.saturday_rate),
        RateBucket::Sunday => (&item.sunday_code, &item.sunday_rate),
    };

    match (code.as_deref(), rate) {
        (Some(code), Some(rate)) if !code.is_empty() => Some((code, rate)),
        _ => None,
    }
}

fn ends_after_weeknight_start(end_time: NaiveTime) -> bool {
    end_time.num_seconds_from_midnight() > WEEKNIGHT_START_SECS
}

/// Picks the billing code and rate for an activity.
///
/// Saturday, then Sunday, then weeknight are tried in that order and the
/// first bucket that applies and is offered wins. Otherwise the weekday pair
/// is used as-is, which may be an empty code and a zero rate. A weekend
/// activity that runs past 20:00 therefore keeps its weekend rate.
pub fn resolve_rate(billable: &BillableActivity) -> ResolvedRate {
    let item = &billable.support_item;
    let activity = &billable.activity;
    let day = activity.date.weekday();

    let candidates = [
        (RateBucket::Saturday, day == Weekday::Sat),
        (RateBucket::Sunday, day == Weekday::Sun),
        (
            RateBucket::Weeknight,
            ends_after_weeknight_start(activity.end_time),
        ),
    ];

    for (bucket, applies) in candidates {
        if !applies {
            continue;
        }
        if let Some((code, rate)) = offered(item, bucket) {
            return ResolvedRate {
                bucket,
                code: code.to_string(),
                rate: rate.clone(),
            };
        }
    }

    ResolvedRate {
        bucket: RateBucket::Weekday,
        code: item.weekday_code.clone().unwrap_or_default(),
        rate: item.weekday_rate.clone().unwrap_or_else(BigDecimal::zero),
    }
}

/// Normalises a rate typed as text, e.g. `54.30` or `$54.30`.
pub fn parse_rate(input: &str) -> Result<BigDecimal, BillingError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

    digits
        .parse::<BigDecimal>()
        .map_err(|_| BillingError::InvalidRate(input.to_string()))
}
