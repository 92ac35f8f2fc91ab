use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use support_invoicing::billing::{
    RateBucket, activity_cost, duration_hours, next_invoice_no, parse_time, pretty_duration,
    resolve_rate, round, total_cost,
};
use support_invoicing::forms::{ActivityForm, InvoiceForm};
use support_invoicing::models::{BillableActivity, RateType, SupportItem};

fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

fn community_access() -> SupportItem {
    SupportItem {
        id: 1,
        description: "Access Community, Social And Rec Activities - Standard".to_string(),
        rate_type: RateType::Hour,
        weekday_code: Some("04_104_0125_6_1".to_string()),
        weekday_rate: Some(dec("54.30")),
        weeknight_code: Some("04_103_0125_6_1".to_string()),
        weeknight_rate: Some(dec("61.05")),
        saturday_code: Some("04_105_0125_6_1".to_string()),
        saturday_rate: Some(dec("77.81")),
        sunday_code: Some("04_106_0125_6_1".to_string()),
        sunday_rate: Some(dec("100.16")),
    }
}

fn entered(date: &str, start: &str, end: &str, km: &str, minutes: &str) -> BillableActivity {
    let form = ActivityForm {
        id: None,
        support_item_id: 1,
        date: date.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        item_distance: String::new(),
        transit_distance: km.to_string(),
        transit_duration: minutes.to_string(),
    };
    BillableActivity::new(form.to_activity(1).unwrap(), community_access())
}

#[test]
fn single_activity_without_transit_is_rounded_duration_times_rate() {
    let samples = [("09:00", "09:00"), ("09:00", "09:20"), ("10:05", "13:47")];

    for (start, end) in samples {
        let activity = entered("18/06/2024", start, end, "", "");
        let hours = duration_hours(parse_time(start).unwrap(), parse_time(end).unwrap());
        let expected = round(&(hours * dec("54.30")), 2);

        assert_eq!(total_cost(&[activity]), expected, "{start}-{end}");
    }
}

#[test]
fn saturday_precedes_weeknight() {
    let activity = entered("15/06/2024", "17:00", "22:00", "", "");
    let resolved = resolve_rate(&activity);

    assert_eq!(resolved.bucket, RateBucket::Saturday);
    assert_eq!(resolved.rate, dec("77.81"));
}

#[test]
fn duration_is_symmetric() {
    let times = ["00:00", "06:45", "12:00", "17:13", "23:59"];
    for a in times {
        for b in times {
            let (a, b) = (parse_time(a).unwrap(), parse_time(b).unwrap());
            assert_eq!(duration_hours(a, b), duration_hours(b, a));
        }
    }
}

#[test]
fn pretty_durations() {
    assert_eq!(pretty_duration(&dec("1.5")), "1 hour, 30 mins");
    assert_eq!(pretty_duration(&dec("2.0")), "2 hours");
    assert_eq!(pretty_duration(&dec("0.25")), "15 mins");
    assert_eq!(pretty_duration(&dec("0")), "");
}

#[test]
fn invoice_numbering() {
    let none: [&str; 0] = [];
    assert_eq!(next_invoice_no(&["JS-3", "JS-7", "JS-2"], None), "JS-8");
    assert_eq!(next_invoice_no(&none, Some("AB")), "AB-1");
    assert_eq!(next_invoice_no(&none, None), "");
}

#[test]
fn sub_totals_are_rounded_before_summing() {
    // Tuesday, two hours, 10 km and 30 minutes of transit
    let activity = entered("18/06/2024", "09:00", "11:00", "10", "30");
    let cost = activity_cost(&activity);

    assert_eq!(cost.service, dec("108.60"));
    assert_eq!(cost.transit_distance, dec("8.50"));
    assert_eq!(cost.transit_time, dec("27.15"));
    assert_eq!(total_cost(&[activity]), dec("144.25"));
}

#[test]
fn invoice_form_feeds_the_calculator() {
    let form = InvoiceForm {
        id: Some(3),
        invoice_no: "JS-8".to_string(),
        client_id: 1,
        bill_to: "Plan Partners".to_string(),
        date: "30/06/2024".to_string(),
        activities: vec![ActivityForm {
            id: None,
            support_item_id: 1,
            // Sunday, running into the evening
            date: "16/06/2024".to_string(),
            start_time: "18:00".to_string(),
            end_time: "21:00".to_string(),
            ..Default::default()
        }],
    };

    let (invoice, activities) = form.to_invoice().unwrap();
    assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());

    let billable: Vec<_> = activities
        .into_iter()
        .map(|activity| BillableActivity::new(activity, community_access()))
        .collect();

    assert_eq!(resolve_rate(&billable[0]).bucket, RateBucket::Sunday);
    // 3 h * 100.16
    assert_eq!(total_cost(&billable), dec("300.48"));
}
