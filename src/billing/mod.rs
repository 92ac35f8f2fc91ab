//! Invoice arithmetic: which rate applies to an activity, how long it ran,
//! what it costs, and what the next invoice should be numbered.
//!
//! Everything here is a pure function of its inputs. Amounts are
//! [`BigDecimal`](bigdecimal::BigDecimal) throughout so that what is shown on
//! an invoice is exactly what was summed.

pub mod duration;
pub mod numbering;
pub mod rates;
pub mod rounding;
pub mod totals;

pub use duration::{duration_hours, duration_minutes, format_time, parse_time, pretty_duration};
pub use numbering::{highest_invoice_no, next_invoice_no};
pub use rates::{RateBucket, ResolvedRate, parse_rate, resolve_rate};
pub use rounding::round;
pub use totals::{CostBreakdown, activity_cost, total_cost, transit_rate_per_km};
