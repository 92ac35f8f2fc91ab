#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Invoice {
    pub id: i32,
    pub client_id: i32,
    pub invoice_no: String,
    pub bill_to: String,
    pub date: chrono::NaiveDate,
}
