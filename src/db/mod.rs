use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use crate::billing::next_invoice_no;
use crate::config::Config;
use crate::models::{Activity, BillableActivity, Client, Invoice, SupportItem};

const ACTIVITY_COLUMNS: &str = "id, invoice_id, support_item_id, date, start_time, end_time, \
     item_distance, transit_distance, transit_duration";

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(config.database_url())
            .await
            .context("failed to connect to the database")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    // Client operations
    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, number, invoice_prefix, bill_to FROM clients ORDER BY name ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        debug!(count = clients.len(), "loaded clients");
        Ok(clients)
    }

    pub async fn get_client(&self, id: i32) -> Result<Client> {
        sqlx::query_as::<_, Client>(
            "SELECT id, name, number, invoice_prefix, bill_to FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?
        .with_context(|| format!("client {id} not found"))
    }

    pub async fn create_client(&self, client: &Client) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO clients (name, number, invoice_prefix, bill_to)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&client.name)
        .bind(&client.number)
        .bind(&client.invoice_prefix)
        .bind(&client.bill_to)
        .fetch_one(self.get_pool())
        .await?;

        info!(client_id = id, name = %client.name, "created client");
        Ok(id)
    }

    pub async fn update_client(&self, client: &Client) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE clients
            SET name = $1, number = $2, invoice_prefix = $3, bill_to = $4
            WHERE id = $5
            "#,
        )
        .bind(&client.name)
        .bind(&client.number)
        .bind(&client.invoice_prefix)
        .bind(&client.bill_to)
        .bind(client.id)
        .execute(self.get_pool())
        .await?;

        info!(client_id = client.id, "updated client");
        Ok(())
    }

    /// Deletes a client together with its invoices and their activities.
    pub async fn delete_client(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM activities \
             WHERE invoice_id IN (SELECT id FROM invoices WHERE client_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoices WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(client_id = id, "deleted client");
        Ok(())
    }

    // Support item operations
    pub async fn list_support_items(&self) -> Result<Vec<SupportItem>> {
        let items = sqlx::query_as::<_, SupportItem>(
            "SELECT * FROM support_items ORDER BY description ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        debug!(count = items.len(), "loaded support items");
        Ok(items)
    }

    pub async fn get_support_item(&self, id: i32) -> Result<SupportItem> {
        sqlx::query_as::<_, SupportItem>("SELECT * FROM support_items WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .with_context(|| format!("support item {id} not found"))
    }

    pub async fn create_support_item(&self, item: &SupportItem) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO support_items (
                description, rate_type,
                weekday_code, weekday_rate, weeknight_code, weeknight_rate,
                saturday_code, saturday_rate, sunday_code, sunday_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&item.description)
        .bind(item.rate_type)
        .bind(&item.weekday_code)
        .bind(&item.weekday_rate)
        .bind(&item.weeknight_code)
        .bind(&item.weeknight_rate)
        .bind(&item.saturday_code)
        .bind(&item.saturday_rate)
        .bind(&item.sunday_code)
        .bind(&item.sunday_rate)
        .fetch_one(self.get_pool())
        .await?;

        info!(support_item_id = id, description = %item.description, "created support item");
        Ok(id)
    }

    /// Rate changes apply to every invoice total computed afterwards,
    /// including invoices already issued.
    pub async fn update_support_item(&self, item: &SupportItem) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE support_items
            SET description = $1, rate_type = $2,
                weekday_code = $3, weekday_rate = $4,
                weeknight_code = $5, weeknight_rate = $6,
                saturday_code = $7, saturday_rate = $8,
                sunday_code = $9, sunday_rate = $10
            WHERE id = $11
            "#,
        )
        .bind(&item.description)
        .bind(item.rate_type)
        .bind(&item.weekday_code)
        .bind(&item.weekday_rate)
        .bind(&item.weeknight_code)
        .bind(&item.weeknight_rate)
        .bind(&item.saturday_code)
        .bind(&item.saturday_rate)
        .bind(&item.sunday_code)
        .bind(&item.sunday_rate)
        .bind(item.id)
        .execute(self.get_pool())
        .await?;

        info!(support_item_id = item.id, "updated support item");
        Ok(())
    }

    pub async fn delete_support_item(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM support_items WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await
            .map_err(|err| support_item_delete_error(id, err))?;

        info!(support_item_id = id, "deleted support item");
        Ok(())
    }

    // Invoice operations
    pub async fn list_invoices(&self, client_id: Option<i32>) -> Result<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, client_id, invoice_no, bill_to, date
            FROM invoices
            WHERE $1::int4 IS NULL OR client_id = $1
            ORDER BY date DESC, invoice_no DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(self.get_pool())
        .await?;

        debug!(count = invoices.len(), ?client_id, "loaded invoices");
        Ok(invoices)
    }

    pub async fn get_invoice(&self, id: i32) -> Result<Invoice> {
        sqlx::query_as::<_, Invoice>(
            "SELECT id, client_id, invoice_no, bill_to, date FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?
        .with_context(|| format!("invoice {id} not found"))
    }

    pub async fn get_activities_by_invoice(&self, invoice_id: i32) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE invoice_id = $1 \
             ORDER BY date ASC, start_time ASC, id ASC"
        ))
        .bind(invoice_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(activities)
    }

    /// Loads an invoice with each activity joined to its support item.
    pub async fn get_invoice_with_activities(
        &self,
        id: i32,
    ) -> Result<(Invoice, Vec<BillableActivity>)> {
        let invoice = self.get_invoice(id).await?;
        let activities = self.get_activities_by_invoice(id).await?;

        let mut item_ids: Vec<i32> = activities.iter().map(|a| a.support_item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let items: HashMap<i32, SupportItem> =
            sqlx::query_as::<_, SupportItem>("SELECT * FROM support_items WHERE id = ANY($1)")
                .bind(&item_ids)
                .fetch_all(self.get_pool())
                .await?
                .into_iter()
                .map(|item| (item.id, item))
                .collect();

        let billable = activities
            .into_iter()
            .map(|activity| -> Result<BillableActivity> {
                let item = items.get(&activity.support_item_id).cloned().ok_or_else(|| {
                    anyhow!(
                        "activity {} references missing support item {}",
                        activity.id,
                        activity.support_item_id
                    )
                })?;
                Ok(BillableActivity::new(activity, item))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(invoice_id = id, activities = billable.len(), "loaded invoice");
        Ok((invoice, billable))
    }

    /// Inserts or updates an invoice and replaces its activities, in one
    /// transaction. An invoice with id 0 is new.
    pub async fn save_invoice_with_activities(
        &self,
        invoice: &Invoice,
        activities: &[Activity],
    ) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let invoice_id = if invoice.id == 0 {
            sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO invoices (client_id, invoice_no, bill_to, date)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(invoice.client_id)
            .bind(&invoice.invoice_no)
            .bind(&invoice.bill_to)
            .bind(invoice.date)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE invoices
                SET client_id = $1, invoice_no = $2, bill_to = $3, date = $4
                WHERE id = $5
                "#,
            )
            .bind(invoice.client_id)
            .bind(&invoice.invoice_no)
            .bind(&invoice.bill_to)
            .bind(invoice.date)
            .bind(invoice.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM activities WHERE invoice_id = $1")
                .bind(invoice.id)
                .execute(&mut *tx)
                .await?;

            invoice.id
        };

        for activity in activities {
            sqlx::query(
                r#"
                INSERT INTO activities (
                    invoice_id, support_item_id, date, start_time, end_time,
                    item_distance, transit_distance, transit_duration
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(invoice_id)
            .bind(activity.support_item_id)
            .bind(activity.date)
            .bind(activity.start_time)
            .bind(activity.end_time)
            .bind(&activity.item_distance)
            .bind(&activity.transit_distance)
            .bind(&activity.transit_duration)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            invoice_id,
            invoice_no = %invoice.invoice_no,
            activities = activities.len(),
            "saved invoice"
        );
        Ok(invoice_id)
    }

    /// Appends one activity to an existing invoice.
    pub async fn add_activity(&self, invoice_id: i32, activity: &Activity) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO activities (
                invoice_id, support_item_id, date, start_time, end_time,
                item_distance, transit_distance, transit_duration
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(invoice_id)
        .bind(activity.support_item_id)
        .bind(activity.date)
        .bind(activity.start_time)
        .bind(activity.end_time)
        .bind(&activity.item_distance)
        .bind(&activity.transit_distance)
        .bind(&activity.transit_duration)
        .fetch_one(self.get_pool())
        .await?;

        info!(invoice_id, activity_id = id, "added activity");
        Ok(id)
    }

    pub async fn delete_invoice(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM activities WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(invoice_id = id, "deleted invoice");
        Ok(())
    }

    pub async fn invoice_numbers_for_client(&self, client_id: i32) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar::<_, String>(
            "SELECT invoice_no FROM invoices WHERE client_id = $1 ORDER BY id ASC",
        )
        .bind(client_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(numbers)
    }

    /// Next invoice number for a client, or an empty string when the client
    /// has neither a prefix nor previous invoices.
    pub async fn suggest_invoice_no(&self, client_id: i32) -> Result<String> {
        let client = self.get_client(client_id).await?;
        let previous = self.invoice_numbers_for_client(client_id).await?;

        Ok(next_invoice_no(&previous, client.invoice_prefix.as_deref()))
    }

    /// Duplicates an invoice and its activities under the client's next
    /// invoice number, dated today.
    pub async fn copy_invoice(&self, id: i32) -> Result<i32> {
        let source = self.get_invoice(id).await?;
        let activities = self.get_activities_by_invoice(id).await?;

        let invoice_no = self.suggest_invoice_no(source.client_id).await?;
        let copy = Invoice {
            id: 0,
            invoice_no,
            date: chrono::Local::now().date_naive(),
            ..source
        };

        let new_id = self.save_invoice_with_activities(&copy, &activities).await?;
        info!(from = id, to = new_id, "copied invoice");
        Ok(new_id)
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        // 23503: foreign_key_violation
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}

/// Names the activities as the cause only when the delete hit their
/// foreign key; any other failure is passed through unchanged.
fn support_item_delete_error(id: i32, err: sqlx::Error) -> anyhow::Error {
    if is_foreign_key_violation(&err) {
        anyhow::Error::new(err).context(format!("support item {id} is still used by activities"))
    } else {
        anyhow::Error::new(err).context(format!("failed to delete support item {id}"))
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    info!("database connection established");

    Ok(db)
}
