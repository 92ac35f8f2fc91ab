#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub number: Option<String>,
    /// Fixed prefix for this client's invoice numbers, e.g. `JS`
    pub invoice_prefix: Option<String>,
    /// Default bill-to name for new invoices
    pub bill_to: Option<String>,
}
