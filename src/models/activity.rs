use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};

use super::SupportItem;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Activity {
    pub id: i32,
    pub invoice_id: i32,
    pub support_item_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Kilometres travelled as the service itself (per-km support items)
    pub item_distance: Option<BigDecimal>,
    /// Kilometres travelled getting to the activity
    pub transit_distance: Option<BigDecimal>,
    /// Minutes spent getting to the activity
    pub transit_duration: Option<BigDecimal>,
}

/// An activity joined with the support item it is billed under.
#[derive(Debug, Clone)]
pub struct BillableActivity {
    pub activity: Activity,
    pub support_item: SupportItem,
}

impl BillableActivity {
    pub fn new(activity: Activity, support_item: SupportItem) -> Self {
        Self {
            activity,
            support_item,
        }
    }
}
