mod activity;
mod client;
mod invoice;
mod support_item;

pub use activity::{Activity, BillableActivity};
pub use client::Client;
pub use invoice::Invoice;
pub use support_item::{RateType, SupportItem};
