//! Text form values for invoices and their activity rows.
//!
//! Dates are entered as `DD/MM/YYYY` and times as `HH:mm`. Numeric fields
//! are free text: a blank, zero or unparsable entry means the value is absent.

use bigdecimal::{BigDecimal, Zero};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::billing::{format_time, parse_rate, parse_time};
use crate::error::BillingError;
use crate::models::{Activity, Client, Invoice, RateType, SupportItem};

const DATE_FORMAT: &str = "%d/%m/%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(input: &str) -> Result<NaiveDate, BillingError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| BillingError::InvalidDate(input.to_string()))
}

fn parse_optional_number(input: &str) -> Option<BigDecimal> {
    input
        .trim()
        .parse::<BigDecimal>()
        .ok()
        .filter(|value| !value.is_zero())
}

fn format_optional_number(value: &Option<BigDecimal>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A blank rate means the bucket is not offered; anything else must parse.
fn optional_rate(input: &str) -> Result<Option<BigDecimal>, BillingError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_rate(input).map(Some)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientForm {
    pub id: Option<i32>,
    pub name: String,
    /// Participant number, digits only
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub invoice_prefix: String,
    #[serde(default)]
    pub bill_to: String,
}

impl ClientForm {
    pub fn from_client(client: &Client) -> Self {
        Self {
            id: Some(client.id),
            name: client.name.clone(),
            number: client.number.clone().unwrap_or_default(),
            invoice_prefix: client.invoice_prefix.clone().unwrap_or_default(),
            bill_to: client.bill_to.clone().unwrap_or_default(),
        }
    }

    pub fn to_client(&self) -> Result<Client, BillingError> {
        let name = optional_text(&self.name).ok_or(BillingError::Required("name"))?;
        let number = optional_text(&self.number);
        if let Some(number) = &number {
            if !number.chars().all(|c| c.is_ascii_digit()) {
                return Err(BillingError::NotANumber("number", number.clone()));
            }
        }

        Ok(Client {
            id: self.id.unwrap_or(0),
            name,
            number,
            invoice_prefix: optional_text(&self.invoice_prefix),
            bill_to: optional_text(&self.bill_to),
        })
    }
}

/// Rate schedule as typed: codes and rates are free text, blank when the
/// bucket is not offered.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportItemForm {
    pub id: Option<i32>,
    pub description: String,
    /// `hour` or `km`
    pub rate_type: String,
    #[serde(default)]
    pub weekday_code: String,
    #[serde(default)]
    pub weekday_rate: String,
    #[serde(default)]
    pub weeknight_code: String,
    #[serde(default)]
    pub weeknight_rate: String,
    #[serde(default)]
    pub saturday_code: String,
    #[serde(default)]
    pub saturday_rate: String,
    #[serde(default)]
    pub sunday_code: String,
    #[serde(default)]
    pub sunday_rate: String,
}

impl SupportItemForm {
    pub fn from_support_item(item: &SupportItem) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            id: Some(item.id),
            description: item.description.clone(),
            rate_type: item.rate_type.unit().to_string(),
            weekday_code: text(&item.weekday_code),
            weekday_rate: format_optional_number(&item.weekday_rate),
            weeknight_code: text(&item.weeknight_code),
            weeknight_rate: format_optional_number(&item.weeknight_rate),
            saturday_code: text(&item.saturday_code),
            saturday_rate: format_optional_number(&item.saturday_rate),
            sunday_code: text(&item.sunday_code),
            sunday_rate: format_optional_number(&item.sunday_rate),
        }
    }

    pub fn to_support_item(&self) -> Result<SupportItem, BillingError> {
        Ok(SupportItem {
            id: self.id.unwrap_or(0),
            description: optional_text(&self.description)
                .ok_or(BillingError::Required("description"))?,
            rate_type: self.rate_type.parse::<RateType>()?,
            weekday_code: optional_text(&self.weekday_code),
            weekday_rate: optional_rate(&self.weekday_rate)?,
            weeknight_code: optional_text(&self.weeknight_code),
            weeknight_rate: optional_rate(&self.weeknight_rate)?,
            saturday_code: optional_text(&self.saturday_code),
            saturday_rate: optional_rate(&self.saturday_rate)?,
            sunday_code: optional_text(&self.sunday_code),
            sunday_rate: optional_rate(&self.sunday_rate)?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityForm {
    pub id: Option<i32>,
    pub support_item_id: i32,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub item_distance: String,
    #[serde(default)]
    pub transit_distance: String,
    #[serde(default)]
    pub transit_duration: String,
}

impl ActivityForm {
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            id: Some(activity.id),
            support_item_id: activity.support_item_id,
            date: format_date(activity.date),
            start_time: format_time(activity.start_time),
            end_time: format_time(activity.end_time),
            item_distance: format_optional_number(&activity.item_distance),
            transit_distance: format_optional_number(&activity.transit_distance),
            transit_duration: format_optional_number(&activity.transit_duration),
        }
    }

    pub fn to_activity(&self, invoice_id: i32) -> Result<Activity, BillingError> {
        Ok(Activity {
            id: self.id.unwrap_or(0),
            invoice_id,
            support_item_id: self.support_item_id,
            date: parse_date(&self.date)?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
            item_distance: parse_optional_number(&self.item_distance),
            transit_distance: parse_optional_number(&self.transit_distance),
            transit_duration: parse_optional_number(&self.transit_duration),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub id: Option<i32>,
    pub invoice_no: String,
    pub client_id: i32,
    pub bill_to: String,
    /// Blank means today
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub activities: Vec<ActivityForm>,
}

impl InvoiceForm {
    pub fn from_invoice(invoice: &Invoice, activities: &[Activity]) -> Self {
        Self {
            id: Some(invoice.id),
            invoice_no: invoice.invoice_no.clone(),
            client_id: invoice.client_id,
            bill_to: invoice.bill_to.clone(),
            date: format_date(invoice.date),
            activities: activities.iter().map(ActivityForm::from_activity).collect(),
        }
    }

    pub fn to_invoice(&self) -> Result<(Invoice, Vec<Activity>), BillingError> {
        let date = if self.date.trim().is_empty() {
            Local::now().date_naive()
        } else {
            parse_date(&self.date)?
        };
        let id = self.id.unwrap_or(0);

        let invoice = Invoice {
            id,
            client_id: self.client_id,
            invoice_no: self.invoice_no.trim().to_string(),
            bill_to: self.bill_to.trim().to_string(),
            date,
        };
        let activities = self
            .activities
            .iter()
            .map(|activity| activity.to_activity(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((invoice, activities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ActivityForm {
        ActivityForm {
            id: None,
            support_item_id: 3,
            date: "15/06/2024".to_string(),
            start_time: "09:00".to_string(),
            end_time: "11:30".to_string(),
            item_distance: String::new(),
            transit_distance: "12.5".to_string(),
            transit_duration: "0".to_string(),
        }
    }

    #[test]
    fn parses_activity_row() {
        let activity = row().to_activity(4).unwrap();

        assert_eq!(activity.id, 0);
        assert_eq!(activity.invoice_id, 4);
        assert_eq!(activity.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(format_time(activity.end_time), "11:30");
        assert_eq!(activity.item_distance, None);
        assert_eq!(activity.transit_distance, Some("12.5".parse().unwrap()));
        assert_eq!(activity.transit_duration, None);
    }

    #[test]
    fn unparsable_numbers_are_absent() {
        let mut form = row();
        form.transit_distance = "lots".to_string();
        assert_eq!(form.to_activity(1).unwrap().transit_distance, None);
    }

    #[test]
    fn rejects_bad_dates_and_times() {
        let mut form = row();
        form.date = "2024-06-15".to_string();
        assert_eq!(
            form.to_activity(1).unwrap_err(),
            BillingError::InvalidDate("2024-06-15".to_string())
        );

        let mut form = row();
        form.start_time = "9".to_string();
        assert_eq!(
            form.to_activity(1).unwrap_err(),
            BillingError::InvalidTime("9".to_string())
        );
    }

    #[test]
    fn invoice_values_survive_a_form_edit() {
        let form = InvoiceForm {
            id: Some(12),
            invoice_no: " JS-8 ".to_string(),
            client_id: 2,
            bill_to: "Plan Managers Pty Ltd".to_string(),
            date: "01/07/2024".to_string(),
            activities: vec![row()],
        };

        let (invoice, activities) = form.to_invoice().unwrap();
        assert_eq!(invoice.invoice_no, "JS-8");
        assert_eq!(activities[0].invoice_id, 12);

        let again = InvoiceForm::from_invoice(&invoice, &activities);
        assert_eq!(again.date, "01/07/2024");
        assert_eq!(again.activities[0].transit_distance, "12.5");
        assert_eq!(again.activities[0].transit_duration, "");
    }

    #[test]
    fn blank_invoice_date_means_today() {
        let form = InvoiceForm {
            client_id: 1,
            ..Default::default()
        };
        let (invoice, activities) = form.to_invoice().unwrap();
        assert_eq!(invoice.date, Local::now().date_naive());
        assert!(activities.is_empty());
    }

    fn schedule() -> SupportItemForm {
        SupportItemForm {
            description: "Community Access".to_string(),
            rate_type: "hour".to_string(),
            weekday_code: "04_104_0125_6_1".to_string(),
            weekday_rate: "$54.30".to_string(),
            weeknight_code: "04_103_0125_6_1".to_string(),
            weeknight_rate: "61.05".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn support_item_rates_are_normalised_from_text() {
        let item = schedule().to_support_item().unwrap();

        assert_eq!(item.id, 0);
        assert_eq!(item.rate_type, RateType::Hour);
        assert_eq!(item.weekday_rate, Some("54.3".parse().unwrap()));
        assert_eq!(item.weeknight_rate, Some("61.05".parse().unwrap()));
        assert_eq!(item.saturday_code, None);
        assert_eq!(item.saturday_rate, None);
    }

    #[test]
    fn support_item_rejects_bad_rates_and_rate_types() {
        let mut form = schedule();
        form.sunday_rate = "a lot".to_string();
        assert_eq!(
            form.to_support_item().unwrap_err(),
            BillingError::InvalidRate("a lot".to_string())
        );

        let mut form = schedule();
        form.rate_type = "day".to_string();
        assert_eq!(
            form.to_support_item().unwrap_err(),
            BillingError::InvalidRateType("day".to_string())
        );

        let mut form = schedule();
        form.description = "  ".to_string();
        assert_eq!(
            form.to_support_item().unwrap_err(),
            BillingError::Required("description")
        );
    }

    #[test]
    fn support_item_edit_keeps_existing_schedule() {
        let mut item = schedule().to_support_item().unwrap();
        item.id = 6;
        item.rate_type = RateType::Kilometre;

        let mut form = SupportItemForm::from_support_item(&item);
        assert_eq!(form.rate_type, "km");
        assert_eq!(form.weekday_rate, "54.30");

        form.saturday_code = "04_105_0125_6_1".to_string();
        form.saturday_rate = "77.81".to_string();
        let updated = form.to_support_item().unwrap();

        assert_eq!(updated.id, 6);
        assert_eq!(updated.rate_type, RateType::Kilometre);
        assert_eq!(updated.weekday_rate, item.weekday_rate);
        assert_eq!(updated.saturday_rate, Some("77.81".parse().unwrap()));
    }

    #[test]
    fn client_form_validates_name_and_number() {
        let form = ClientForm {
            name: " John Smith ".to_string(),
            number: "431234567".to_string(),
            invoice_prefix: "JS".to_string(),
            ..Default::default()
        };
        let client = form.to_client().unwrap();
        assert_eq!(client.name, "John Smith");
        assert_eq!(client.invoice_prefix.as_deref(), Some("JS"));
        assert_eq!(client.bill_to, None);
        assert_eq!(ClientForm::from_client(&client).number, "431234567");

        let mut form = ClientForm::from_client(&client);
        form.number = "43-12".to_string();
        assert_eq!(
            form.to_client().unwrap_err(),
            BillingError::NotANumber("number", "43-12".to_string())
        );

        let form = ClientForm::default();
        assert_eq!(form.to_client().unwrap_err(), BillingError::Required("name"));
    }

    #[test]
    fn deserializes_browser_field_names() {
        let json = r#"{
            "id": null,
            "invoiceNo": "AB-1",
            "clientId": 5,
            "billTo": "Self managed",
            "activities": [{
                "supportItemId": 3,
                "date": "17/06/2024",
                "startTime": "18:00",
                "endTime": "21:00"
            }]
        }"#;
        let form: InvoiceForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.activities[0].support_item_id, 3);
        assert_eq!(form.activities[0].transit_distance, "");
    }
}
