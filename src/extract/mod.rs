//! Row-to-text extraction
//!
//! Every row of every table becomes one self-contained sentence-like chunk
//! carrying IDs, names, statuses and dates inline. Formatting lives in one
//! pure function per entity; reading rows lives behind [`TableExtractor`].

mod aggregate;

pub use aggregate::*;

use crate::db::{Customer, HvacDb, InvoiceView, QuoteView, Table, Technician, WorkOrderView};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder for a missing value
pub const MISSING: &str = "N/A";

/// One chunk of text derived from a single source row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source table
    pub table: Table,
    /// Primary key of the source row
    pub row_id: i64,
    /// Rendered text handed to the embedder
    pub text: String,
    /// Raw row as read from the database
    pub row: serde_json::Value,
}

impl Chunk {
    fn from_row<T: Serialize>(table: Table, row_id: i64, text: String, row: &T) -> Result<Self> {
        Ok(Self {
            table,
            row_id,
            text,
            row: serde_json::to_value(row)?,
        })
    }
}

/// How a table is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Direct field interpolation
    Flat,
    /// Foreign keys resolved to names through LEFT JOINs
    Joined,
}

impl ExtractMode {
    pub fn for_table(table: Table) -> Self {
        match table {
            Table::Customers | Table::Technicians => ExtractMode::Flat,
            Table::Quotes | Table::WorkOrders | Table::Invoices => ExtractMode::Joined,
        }
    }
}

/// A value that may be absent when read from a row
pub trait FieldValue {
    /// Text for a present value, `None` when missing
    fn render(&self) -> Option<String>;
}

impl FieldValue for str {
    fn render(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl FieldValue for String {
    fn render(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl FieldValue for i64 {
    fn render(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl FieldValue for f64 {
    fn render(&self) -> Option<String> {
        if !self.is_finite() {
            return None;
        }
        // Whole numbers keep one decimal: 3.0, not 3
        if self.fract() == 0.0 {
            Some(format!("{:.1}", self))
        } else {
            Some(self.to_string())
        }
    }
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn render(&self) -> Option<String> {
        (**self).render()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn render(&self) -> Option<String> {
        self.as_ref().and_then(|v| v.render())
    }
}

/// Render `prefix + value + suffix`, or `default` when the value is missing
pub fn format_optional<V: FieldValue + ?Sized>(
    value: &V,
    prefix: &str,
    suffix: &str,
    default: &str,
) -> String {
    match value.render() {
        Some(v) => format!("{}{}{}", prefix, v, suffix),
        None => default.to_string(),
    }
}

fn or_missing<V: FieldValue + ?Sized>(value: &V) -> String {
    format_optional(value, "", "", MISSING)
}

fn amount(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => MISSING.to_string(),
    }
}

pub fn customer_chunk(c: &Customer) -> String {
    format!(
        "Customer {}: Name: {}, Email: {}, Phone: {}, City: {}, Created: {}",
        c.customer_id, c.name, c.email, c.phone, c.city, c.created_date
    )
}

pub fn technician_chunk(t: &Technician) -> String {
    format!(
        "Technician {}: Name: {}, Specialization: {}, Experience: {} years, Hired: {}",
        t.technician_id, t.name, t.specialization, t.experience_years, t.hire_date
    )
}

pub fn quote_chunk(q: &QuoteView) -> String {
    format!(
        "Quote {}: Customer: '{}' (ID: {}), Amount: {}, Status: {}, Created: {}",
        q.quote_id,
        or_missing(&q.customer_name),
        or_missing(&q.customer_id),
        amount(q.amount),
        or_missing(&q.status),
        or_missing(&q.created_date),
    )
}

pub fn work_order_chunk(wo: &WorkOrderView) -> String {
    format!(
        "WorkOrder {}: Customer: '{}' (ID: {}), Technician: '{}' (ID: {}), Status: {}, Created: {}, {}, {}, {}",
        wo.work_order_id,
        or_missing(&wo.customer_name),
        or_missing(&wo.customer_id),
        or_missing(&wo.technician_name),
        or_missing(&wo.technician_id),
        or_missing(&wo.status),
        or_missing(&wo.created_date),
        format_optional(&wo.completion_date, "Completed: ", "", MISSING),
        format_optional(&wo.travel_time_minutes, "Travel: ", " mins", MISSING),
        format_optional(&wo.work_hours, "Hours: ", "", MISSING),
    )
}

pub fn invoice_chunk(i: &InvoiceView) -> String {
    format!(
        "Invoice {}: WorkOrder: {} (for Customer '{}' [ID:{}] created on {}), Amount: {}, Issued: {}",
        i.invoice_id,
        or_missing(&i.work_order_id),
        or_missing(&i.customer_name),
        or_missing(&i.customer_id),
        or_missing(&i.work_order_created),
        amount(i.amount),
        or_missing(&i.issued_date),
    )
}

/// Source of chunks for a single table
#[async_trait]
pub trait TableExtractor: Send + Sync {
    /// One chunk per row, primary key ascending
    async fn extract(&self, table: Table) -> Result<Vec<Chunk>>;
}

/// Extractor reading straight from the business records database
pub struct SqlExtractor {
    db: HvacDb,
}

impl SqlExtractor {
    pub fn new(db: HvacDb) -> Self {
        Self { db }
    }

    async fn read(&self, table: Table) -> Result<Vec<Chunk>> {
        let chunks = match table {
            Table::Customers => self
                .db
                .list_customers()
                .await?
                .iter()
                .map(|c| Chunk::from_row(table, c.customer_id, customer_chunk(c), c))
                .collect::<Result<Vec<_>>>()?,
            Table::Technicians => self
                .db
                .list_technicians()
                .await?
                .iter()
                .map(|t| Chunk::from_row(table, t.technician_id, technician_chunk(t), t))
                .collect::<Result<Vec<_>>>()?,
            Table::Quotes => self
                .db
                .list_quote_views()
                .await?
                .iter()
                .map(|q| Chunk::from_row(table, q.quote_id, quote_chunk(q), q))
                .collect::<Result<Vec<_>>>()?,
            Table::WorkOrders => self
                .db
                .list_work_order_views()
                .await?
                .iter()
                .map(|wo| Chunk::from_row(table, wo.work_order_id, work_order_chunk(wo), wo))
                .collect::<Result<Vec<_>>>()?,
            Table::Invoices => self
                .db
                .list_invoice_views()
                .await?
                .iter()
                .map(|i| Chunk::from_row(table, i.invoice_id, invoice_chunk(i), i))
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(chunks)
    }
}

#[async_trait]
impl TableExtractor for SqlExtractor {
    async fn extract(&self, table: Table) -> Result<Vec<Chunk>> {
        debug!(
            "Extracting {} ({:?})",
            table,
            ExtractMode::for_table(table)
        );
        self.read(table)
            .await
            .map_err(|e| Error::extraction(table, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{sample_data, setup_test_db};

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&None::<String>, "Completed: ", "", "N/A"), "N/A");
        assert_eq!(
            format_optional(&Some("2023-03-04".to_string()), "Completed: ", "", "N/A"),
            "Completed: 2023-03-04"
        );
        assert_eq!(format_optional(&Some(45i64), "Travel: ", " mins", "N/A"), "Travel: 45 mins");
        assert_eq!(format_optional(&Some(f64::NAN), "Hours: ", "", "N/A"), "N/A");
        assert_eq!(format_optional(&Some(3.0f64), "Hours: ", "", "N/A"), "Hours: 3.0");
        assert_eq!(format_optional(&Some(2.5f64), "Hours: ", "", "-"), "Hours: 2.5");
        assert_eq!(format_optional(&None::<i64>, "", "", "-"), "-");
    }

    #[test]
    fn test_work_order_chunk_uses_na_for_open_orders() {
        let wo = WorkOrderView {
            work_order_id: 2,
            status: Some("Scheduled".to_string()),
            created_date: Some("2023-04-01".to_string()),
            customer_id: Some(2),
            customer_name: Some("Sam Hill".to_string()),
            technician_id: Some(1),
            technician_name: Some("Technician 1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            work_order_chunk(&wo),
            "WorkOrder 2: Customer: 'Sam Hill' (ID: 2), Technician: 'Technician 1' (ID: 1), \
             Status: Scheduled, Created: 2023-04-01, N/A, N/A, N/A"
        );
    }

    #[test]
    fn test_amounts_have_two_decimals() {
        let q = QuoteView {
            quote_id: 1,
            amount: Some(1200.5),
            status: Some("Sent".to_string()),
            created_date: Some("2023-01-20".to_string()),
            customer_id: Some(2),
            customer_name: Some("Sam Hill".to_string()),
        };
        assert_eq!(
            quote_chunk(&q),
            "Quote 1: Customer: 'Sam Hill' (ID: 2), Amount: 1200.50, Status: Sent, Created: 2023-01-20"
        );

        let i = InvoiceView {
            invoice_id: 3,
            amount: Some(250.0),
            issued_date: Some("2023-03-06".to_string()),
            work_order_id: Some(1),
            work_order_created: Some("2023-03-01".to_string()),
            customer_id: Some(1),
            customer_name: Some("Jane Doe".to_string()),
        };
        assert_eq!(
            invoice_chunk(&i),
            "Invoice 3: WorkOrder: 1 (for Customer 'Jane Doe' [ID:1] created on 2023-03-01), \
             Amount: 250.00, Issued: 2023-03-06"
        );
    }

    #[tokio::test]
    async fn test_customer_round_trip_contains_every_field() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();

        let chunks = SqlExtractor::new(db).extract(Table::Customers).await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0].text,
            "Customer 1: Name: Jane Doe, Email: jane@x.com, Phone: 555-1234, City: Chicago, Created: 2023-01-01"
        );
        assert_eq!(chunks[0].row_id, 1);
        assert_eq!(chunks[0].row["email"], "jane@x.com");
    }

    #[tokio::test]
    async fn test_completed_work_order_chunk() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();

        let chunks = SqlExtractor::new(db).extract(Table::WorkOrders).await.unwrap();
        assert_eq!(
            chunks[0].text,
            "WorkOrder 1: Customer: 'Jane Doe' (ID: 1), Technician: 'Technician 1' (ID: 1), \
             Status: Completed, Created: 2023-03-01, Completed: 2023-03-04, Travel: 45 mins, Hours: 2.5"
        );
        assert!(chunks[1].text.ends_with("N/A, N/A, N/A"));
    }

    #[tokio::test]
    async fn test_missing_table_is_typed_extraction_error() {
        let (db, _tmp) = setup_test_db(true).await;

        let err = SqlExtractor::new(db)
            .extract(Table::Technicians)
            .await
            .unwrap_err();
        match err {
            Error::Extraction { table, .. } => assert_eq!(table, "Technicians"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
