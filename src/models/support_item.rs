use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::error::BillingError;

#[derive(sqlx::Type, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "rate_type")]
pub enum RateType {
    #[sqlx(rename = "HOUR")]
    Hour,
    #[sqlx(rename = "KM")]
    Kilometre,
}

impl RateType {
    /// Unit suffix used when displaying a rate, as in `$54.30/hr`
    pub fn unit(&self) -> &'static str {
        match self {
            RateType::Hour => "hr",
            RateType::Kilometre => "km",
        }
    }
}

impl FromStr for RateType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hr" => Ok(RateType::Hour),
            "km" | "kilometre" => Ok(RateType::Kilometre),
            _ => Err(BillingError::InvalidRateType(s.to_string())),
        }
    }
}

/// A billable service with one optional (code, rate) pair per rate bucket.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SupportItem {
    pub id: i32,
    pub description: String,
    pub rate_type: RateType,
    pub weekday_code: Option<String>,
    pub weekday_rate: Option<BigDecimal>,
    pub weeknight_code: Option<String>,
    pub weeknight_rate: Option<BigDecimal>,
    pub saturday_code: Option<String>,
    pub saturday_rate: Option<BigDecimal>,
    pub sunday_code: Option<String>,
    pub sunday_rate: Option<BigDecimal>,
}
