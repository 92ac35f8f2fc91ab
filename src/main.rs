use anyhow::{Result, bail};
use bigdecimal::{BigDecimal, Zero};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use support_invoicing::billing::{
    RateBucket, activity_cost, duration_hours, parse_time, pretty_duration, total_cost,
};
use support_invoicing::billing::rates::offered;
use support_invoicing::config;
use support_invoicing::db::{self, Database};
use support_invoicing::forms::{
    ActivityForm, ClientForm, InvoiceForm, SupportItemForm, format_date,
};
use support_invoicing::models::{BillableActivity, SupportItem};
use support_invoicing::statement::InvoiceStatement;

#[derive(Parser)]
#[command(name = "support-invoicing", about = "Invoices for support services")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Client fields; on update, omitted fields keep their current value.
#[derive(Args)]
struct ClientArgs {
    #[arg(long)]
    number: Option<String>,
    #[arg(long)]
    prefix: Option<String>,
    #[arg(long)]
    bill_to: Option<String>,
}

impl ClientArgs {
    fn apply(self, form: &mut ClientForm) {
        let fields = [
            (self.number, &mut form.number),
            (self.prefix, &mut form.invoice_prefix),
            (self.bill_to, &mut form.bill_to),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

/// Codes and rates per bucket. Rates are plain text such as `54.30` or
/// `$54.30`; an empty string removes the bucket. On update, omitted fields
/// keep their current value.
#[derive(Args)]
struct ScheduleArgs {
    /// `hour` or `km`
    #[arg(long)]
    rate_type: Option<String>,
    #[arg(long)]
    weekday_code: Option<String>,
    #[arg(long)]
    weekday_rate: Option<String>,
    #[arg(long)]
    weeknight_code: Option<String>,
    #[arg(long)]
    weeknight_rate: Option<String>,
    #[arg(long)]
    saturday_code: Option<String>,
    #[arg(long)]
    saturday_rate: Option<String>,
    #[arg(long)]
    sunday_code: Option<String>,
    #[arg(long)]
    sunday_rate: Option<String>,
}

impl ScheduleArgs {
    fn apply(self, form: &mut SupportItemForm) {
        let fields = [
            (self.rate_type, &mut form.rate_type),
            (self.weekday_code, &mut form.weekday_code),
            (self.weekday_rate, &mut form.weekday_rate),
            (self.weeknight_code, &mut form.weeknight_code),
            (self.weeknight_rate, &mut form.weeknight_rate),
            (self.saturday_code, &mut form.saturday_code),
            (self.saturday_rate, &mut form.saturday_rate),
            (self.sunday_code, &mut form.sunday_code),
            (self.sunday_rate, &mut form.sunday_rate),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List clients
    Clients,
    /// Add a client
    CreateClient {
        name: String,
        #[command(flatten)]
        fields: ClientArgs,
    },
    /// Change a client's details
    UpdateClient {
        client_id: i32,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ClientArgs,
    },
    /// Delete a client with all of its invoices
    DeleteClient { client_id: i32 },
    /// List support items and their rates
    SupportItems,
    /// Add a support item and its rate schedule
    CreateSupportItem {
        description: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Change a support item's description or rates
    UpdateSupportItem {
        support_item_id: i32,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Delete a support item no activity uses
    DeleteSupportItem { support_item_id: i32 },
    /// List invoices with their totals
    Invoices {
        #[arg(long)]
        client: Option<i32>,
    },
    /// Show an invoice line by line
    Show {
        invoice_id: i32,
        /// Print the statement as JSON for a renderer
        #[arg(long)]
        json: bool,
    },
    /// Suggest the next invoice number for a client
    NextNumber { client_id: i32 },
    /// Create an empty invoice for a client
    CreateInvoice {
        client_id: i32,
        /// Defaults to the suggested next number
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        bill_to: Option<String>,
        /// DD/MM/YYYY, defaults to today
        #[arg(long, default_value = "")]
        date: String,
    },
    /// Add an activity to an invoice
    AddActivity {
        invoice_id: i32,
        #[arg(long)]
        support_item: i32,
        /// DD/MM/YYYY
        #[arg(long)]
        date: String,
        /// HH:mm
        #[arg(long)]
        start: String,
        /// HH:mm
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "")]
        item_km: String,
        #[arg(long, default_value = "")]
        transit_km: String,
        #[arg(long, default_value = "")]
        transit_minutes: String,
    },
    /// Duplicate an invoice under the next number
    Copy { invoice_id: i32 },
    /// Delete an invoice and its activities
    DeleteInvoice { invoice_id: i32 },
    /// Work out the billable duration between two times
    Duration { start: String, end: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match Cli::parse().command {
        Command::Duration { start, end } => print_duration(&start, &end),
        command => run(command).await,
    }
}

fn print_duration(start: &str, end: &str) -> Result<()> {
    let hours = duration_hours(parse_time(start)?, parse_time(end)?);
    println!("{} hours ({})", hours, pretty_duration(&hours));
    Ok(())
}

fn code_or_placeholder(code: &str) -> &str {
    if code.is_empty() { "(no code)" } else { code }
}

async fn run(command: Command) -> Result<()> {
    let config = config::init()?;
    let db = db::init(&config).await?;

    match command {
        Command::Clients => list_clients(&db).await?,
        Command::CreateClient { name, fields } => {
            let mut form = ClientForm {
                name,
                ..Default::default()
            };
            fields.apply(&mut form);
            let id = db.create_client(&form.to_client()?).await?;
            println!("Created client {id}");
        }
        Command::UpdateClient {
            client_id,
            name,
            fields,
        } => {
            let mut form = ClientForm::from_client(&db.get_client(client_id).await?);
            if let Some(name) = name {
                form.name = name;
            }
            fields.apply(&mut form);
            db.update_client(&form.to_client()?).await?;
            println!("Updated client {client_id}");
        }
        Command::DeleteClient { client_id } => {
            db.delete_client(client_id).await?;
            println!("Deleted client {client_id}");
        }
        Command::SupportItems => list_support_items(&db).await?,
        Command::CreateSupportItem {
            description,
            schedule,
        } => {
            let mut form = SupportItemForm {
                description,
                rate_type: "hour".to_string(),
                ..Default::default()
            };
            schedule.apply(&mut form);
            let id = db.create_support_item(&form.to_support_item()?).await?;
            println!("Created support item {id}");
        }
        Command::UpdateSupportItem {
            support_item_id,
            description,
            schedule,
        } => {
            let existing = db.get_support_item(support_item_id).await?;
            let mut form = SupportItemForm::from_support_item(&existing);
            if let Some(description) = description {
                form.description = description;
            }
            schedule.apply(&mut form);
            db.update_support_item(&form.to_support_item()?).await?;
            println!("Updated support item {support_item_id}");
        }
        Command::DeleteSupportItem { support_item_id } => {
            db.delete_support_item(support_item_id).await?;
            println!("Deleted support item {support_item_id}");
        }
        Command::Invoices { client } => list_invoices(&db, client).await?,
        Command::Show { invoice_id, json } => show_invoice(&db, invoice_id, json).await?,
        Command::NextNumber { client_id } => {
            let next = db.suggest_invoice_no(client_id).await?;
            if next.is_empty() {
                println!("No invoice prefix or previous invoices for client {client_id}");
            } else {
                println!("{next}");
            }
        }
        Command::CreateInvoice {
            client_id,
            number,
            bill_to,
            date,
        } => create_invoice(&db, client_id, number, bill_to, date).await?,
        Command::AddActivity {
            invoice_id,
            support_item,
            date,
            start,
            end,
            item_km,
            transit_km,
            transit_minutes,
        } => {
            let form = ActivityForm {
                id: None,
                support_item_id: support_item,
                date,
                start_time: start,
                end_time: end,
                item_distance: item_km,
                transit_distance: transit_km,
                transit_duration: transit_minutes,
            };
            add_activity(&db, invoice_id, form).await?
        }
        Command::Copy { invoice_id } => {
            let id = db.copy_invoice(invoice_id).await?;
            let copy = db.get_invoice(id).await?;
            println!("Copied to invoice {} (id {})", copy.invoice_no, id);
        }
        Command::DeleteInvoice { invoice_id } => {
            db.delete_invoice(invoice_id).await?;
            println!("Deleted invoice {invoice_id}");
        }
        Command::Duration { start, end } => print_duration(&start, &end)?,
    }

    Ok(())
}

async fn list_clients(db: &Database) -> Result<()> {
    println!("{:<6} {:<30} {:<12} {:<8}", "ID", "Name", "Number", "Prefix");
    for client in db.list_clients().await? {
        println!(
            "{:<6} {:<30} {:<12} {:<8}",
            client.id,
            client.name,
            client.number.as_deref().unwrap_or("-"),
            client.invoice_prefix.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

fn describe_bucket(item: &SupportItem, bucket: RateBucket) -> String {
    match offered(item, bucket) {
        Some((code, rate)) => format!("{} ${}/{}", code, rate, item.rate_type.unit()),
        None => "N/A".to_string(),
    }
}

async fn list_support_items(db: &Database) -> Result<()> {
    for item in db.list_support_items().await? {
        println!("[{}] {}", item.id, item.description);
        for bucket in [
            RateBucket::Weekday,
            RateBucket::Weeknight,
            RateBucket::Saturday,
            RateBucket::Sunday,
        ] {
            println!("    {:<10} {}", bucket, describe_bucket(&item, bucket));
        }
    }

    Ok(())
}

async fn list_invoices(db: &Database, client_id: Option<i32>) -> Result<()> {
    println!(
        "{:<10} {:<12} {:<24} {:>4} {:>12} {:>12}",
        "Date", "Invoice #", "Bill to", "Acts", "Total", "Running"
    );

    let mut running = BigDecimal::zero();
    for invoice in db.list_invoices(client_id).await? {
        let (_, activities) = db.get_invoice_with_activities(invoice.id).await?;
        let total = total_cost(&activities);
        running += &total;

        println!(
            "{:<10} {:<12} {:<24} {:>4} {:>12} {:>12}",
            format_date(invoice.date),
            invoice.invoice_no,
            invoice.bill_to,
            activities.len(),
            format!("${total}"),
            format!("${running}"),
        );
    }

    Ok(())
}

async fn show_invoice(db: &Database, invoice_id: i32, json: bool) -> Result<()> {
    let (invoice, activities) = db.get_invoice_with_activities(invoice_id).await?;
    let client = db.get_client(invoice.client_id).await?;
    let statement = InvoiceStatement::build(&invoice, &client, &activities);

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    println!("Invoice {}  {}", statement.invoice_no, format_date(statement.date));
    println!("Bill to {} for {}", statement.bill_to, statement.client_name);
    println!();
    for line in &statement.lines {
        println!(
            "{} {}-{}  {:<16} {} @ ${}/{}  {}",
            format_date(line.date),
            line.start_time,
            line.end_time,
            code_or_placeholder(&line.cost.rate.code),
            line.description,
            line.cost.rate.rate,
            line.rate_type.unit(),
            line.pretty_duration,
        );
        println!(
            "    service ${}  transit ${}  travel time ${}  = ${}",
            line.cost.service,
            line.cost.transit_distance,
            line.cost.transit_time,
            line.cost.subtotal
        );
    }
    println!();
    println!("Total ${}", statement.total);

    let unbillable = statement.unbillable_lines();
    if unbillable > 0 {
        println!("{unbillable} activity line(s) have no rate and were billed at $0");
    }

    Ok(())
}

async fn create_invoice(
    db: &Database,
    client_id: i32,
    number: Option<String>,
    bill_to: Option<String>,
    date: String,
) -> Result<()> {
    let client = db.get_client(client_id).await?;
    let invoice_no = match number {
        Some(number) => number,
        None => db.suggest_invoice_no(client_id).await?,
    };
    if invoice_no.trim().is_empty() {
        bail!(
            "client {} has no invoice prefix or previous invoices, pass --number",
            client.name
        );
    }

    let form = InvoiceForm {
        id: None,
        invoice_no,
        client_id,
        bill_to: bill_to.or(client.bill_to).unwrap_or(client.name),
        date,
        activities: Vec::new(),
    };
    let (invoice, activities) = form.to_invoice()?;
    let id = db.save_invoice_with_activities(&invoice, &activities).await?;

    println!("Created invoice {} (id {})", invoice.invoice_no, id);
    Ok(())
}

async fn add_activity(db: &Database, invoice_id: i32, form: ActivityForm) -> Result<()> {
    let activity = form.to_activity(invoice_id)?;
    db.get_invoice(invoice_id).await?;
    let support_item = db.get_support_item(activity.support_item_id).await?;

    let id = db.add_activity(invoice_id, &activity).await?;

    let cost = activity_cost(&BillableActivity::new(activity, support_item));
    println!(
        "Added activity {}: {} ({}) at {} ${} = ${}",
        id,
        pretty_duration(&cost.duration_hours),
        cost.rate.bucket,
        code_or_placeholder(&cost.rate.code),
        cost.rate.rate,
        cost.subtotal,
    );

    Ok(())
}
