use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::billing::{CostBreakdown, activity_cost, format_time, pretty_duration};
use crate::models::{BillableActivity, Client, Invoice, RateType};

/// One billed activity, ready to lay out on a rendered invoice.
#[derive(Serialize, Debug, Clone)]
pub struct StatementLine {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub rate_type: RateType,
    pub pretty_duration: String,
    pub billable: bool,
    #[serde(flatten)]
    pub cost: CostBreakdown,
}

/// Everything a renderer needs for one invoice, with all amounts computed.
#[derive(Serialize, Debug, Clone)]
pub struct InvoiceStatement {
    pub invoice_no: String,
    pub bill_to: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub lines: Vec<StatementLine>,
    pub total: BigDecimal,
}

impl InvoiceStatement {
    pub fn build(invoice: &Invoice, client: &Client, activities: &[BillableActivity]) -> Self {
        let mut total = BigDecimal::zero();
        let mut lines = Vec::with_capacity(activities.len());

        for billable in activities {
            let cost = activity_cost(billable);
            let billable_rate = cost.rate.is_billable();
            if !billable_rate {
                warn!(
                    invoice_no = %invoice.invoice_no,
                    activity_id = billable.activity.id,
                    support_item = %billable.support_item.description,
                    bucket = %cost.rate.bucket,
                    "support item has no rate for this activity"
                );
            }

            total += &cost.subtotal;
            lines.push(StatementLine {
                date: billable.activity.date,
                start_time: format_time(billable.activity.start_time),
                end_time: format_time(billable.activity.end_time),
                description: billable.support_item.description.clone(),
                rate_type: billable.support_item.rate_type,
                pretty_duration: pretty_duration(&cost.duration_hours),
                billable: billable_rate,
                cost,
            });
        }

        Self {
            invoice_no: invoice.invoice_no.clone(),
            bill_to: invoice.bill_to.clone(),
            client_name: client.name.clone(),
            date: invoice.date,
            lines,
            total,
        }
    }

    pub fn unbillable_lines(&self) -> usize {
        self.lines.iter().filter(|line| !line.billable).count()
    }
}
