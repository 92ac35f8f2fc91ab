use thiserror::Error;

/// Failures turning raw text input into billing values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    #[error("invalid time `{0}`, expected HH:mm")]
    InvalidTime(String),

    #[error("invalid date `{0}`, expected DD/MM/YYYY")]
    InvalidDate(String),

    #[error("invalid rate `{0}`")]
    InvalidRate(String),

    #[error("invalid rate type `{0}`, expected hour or km")]
    InvalidRateType(String),

    #[error("{0} must be a number, got `{1}`")]
    NotANumber(&'static str, String),

    #[error("{0} is required")]
    Required(&'static str),
}
