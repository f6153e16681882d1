//! Business records storage using SQLite
//!
//! This module owns the relational side of the system:
//! - Schema creation and teardown
//! - Transactional seeding
//! - Row reads used by the extractor (flat and joined)

mod models;
mod schema;

pub use models::*;
pub use schema::*;

use crate::config::Config;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use tracing::{debug, info};

/// Business records database handle
#[derive(Clone)]
pub struct HvacDb {
    pool: SqlitePool,
}

impl HvacDb {
    /// Connect to the database named in the configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::new(&config.paths.db_file, config.database.foreign_keys).await
    }

    /// Create database with path directly (without full config)
    pub async fn new(db_path: &Path, foreign_keys: bool) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(foreign_keys);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create all tables; fails if any of them already exists
    pub async fn create_schema(&self) -> Result<()> {
        info!("Creating database schema");
        let mut tx = self.pool.begin().await?;
        sqlx::query(SCHEMA_SQL).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Drop all tables if present
    pub async fn drop_schema(&self) -> Result<()> {
        info!("Dropping existing tables (if any)");
        let mut tx = self.pool.begin().await?;
        sqlx::query(DROP_SQL).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Check if the schema has been created
    pub async fn is_initialized(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('Customers', 'Technicians', 'Quotes', 'WorkOrders', 'Invoices')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count == 5)
    }

    /// Create the schema and insert every generated row in one transaction.
    ///
    /// Any failure rolls back the whole run, including the optional drop.
    pub async fn seed_database(&self, data: &SeedData, drop_existing: bool) -> Result<TableCounts> {
        let mut tx = self.pool.begin().await?;

        if drop_existing {
            info!("Dropping existing tables (if any)");
            sqlx::query(DROP_SQL).execute(&mut *tx).await?;
        }

        info!("Creating new tables");
        sqlx::query(SCHEMA_SQL).execute(&mut *tx).await?;

        insert_customers(&mut tx, &data.customers).await?;
        info!("{} customers inserted", data.customers.len());

        insert_technicians(&mut tx, &data.technicians).await?;
        info!("{} technicians inserted", data.technicians.len());

        insert_work_orders(&mut tx, &data.work_orders).await?;
        info!("{} work orders inserted", data.work_orders.len());

        insert_invoices(&mut tx, &data.invoices).await?;
        info!("{} invoices inserted", data.invoices.len());

        insert_quotes(&mut tx, &data.quotes).await?;
        info!("{} quotes inserted", data.quotes.len());

        tx.commit().await?;
        Ok(TableCounts::from(data))
    }

    /// Row counts per table
    pub async fn table_counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            customers: self.count(Table::Customers).await?,
            technicians: self.count(Table::Technicians).await?,
            quotes: self.count(Table::Quotes).await?,
            work_orders: self.count(Table::WorkOrders).await?,
            invoices: self.count(Table::Invoices).await?,
        })
    }

    async fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.sql_name());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as usize)
    }

    // ===== Flat reads =====

    /// All customers by ID
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query_as::<_, Customer>(
            r#"
            SELECT CustomerID AS customer_id, Name AS name, Email AS email,
                   Phone AS phone, City AS city, CreatedDate AS created_date
            FROM Customers
            ORDER BY CustomerID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All technicians by ID
    pub async fn list_technicians(&self) -> Result<Vec<Technician>> {
        let rows = sqlx::query_as::<_, Technician>(
            r#"
            SELECT TechnicianID AS technician_id, Name AS name,
                   Specialization AS specialization, ExperienceYears AS experience_years,
                   HireDate AS hire_date
            FROM Technicians
            ORDER BY TechnicianID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All work orders by ID, unjoined
    pub async fn list_work_orders(&self) -> Result<Vec<WorkOrder>> {
        let rows = sqlx::query_as::<_, WorkOrder>(
            r#"
            SELECT WorkOrderID AS work_order_id, CustomerID AS customer_id,
                   TechnicianID AS technician_id, Status AS status,
                   CreatedDate AS created_date, CompletionDate AS completion_date,
                   TravelTimeMinutes AS travel_time_minutes, WorkHours AS work_hours
            FROM WorkOrders
            ORDER BY WorkOrderID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All invoices by ID, unjoined
    pub async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT InvoiceID AS invoice_id, WorkOrderID AS work_order_id,
                   Amount AS amount, IssuedDate AS issued_date
            FROM Invoices
            ORDER BY InvoiceID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ===== Joined reads =====

    /// Quotes with customer names; quotes without a customer are kept
    pub async fn list_quote_views(&self) -> Result<Vec<QuoteView>> {
        let rows = sqlx::query_as::<_, QuoteView>(
            r#"
            SELECT q.QuoteID AS quote_id, q.Amount AS amount, q.Status AS status,
                   q.CreatedDate AS created_date,
                   q.CustomerID AS customer_id, c.Name AS customer_name
            FROM Quotes q
            LEFT JOIN Customers c ON q.CustomerID = c.CustomerID
            ORDER BY q.QuoteID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Work orders with customer and technician names
    pub async fn list_work_order_views(&self) -> Result<Vec<WorkOrderView>> {
        let rows = sqlx::query_as::<_, WorkOrderView>(
            r#"
            SELECT wo.WorkOrderID AS work_order_id, wo.Status AS status,
                   wo.CreatedDate AS created_date, wo.CompletionDate AS completion_date,
                   wo.TravelTimeMinutes AS travel_time_minutes, wo.WorkHours AS work_hours,
                   wo.CustomerID AS customer_id, c.Name AS customer_name,
                   wo.TechnicianID AS technician_id, t.Name AS technician_name
            FROM WorkOrders wo
            LEFT JOIN Customers c ON wo.CustomerID = c.CustomerID
            LEFT JOIN Technicians t ON wo.TechnicianID = t.TechnicianID
            ORDER BY wo.WorkOrderID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Invoices with their work order creation date and customer
    pub async fn list_invoice_views(&self) -> Result<Vec<InvoiceView>> {
        let rows = sqlx::query_as::<_, InvoiceView>(
            r#"
            SELECT i.InvoiceID AS invoice_id, i.Amount AS amount, i.IssuedDate AS issued_date,
                   i.WorkOrderID AS work_order_id, wo.CreatedDate AS work_order_created,
                   wo.CustomerID AS customer_id, c.Name AS customer_name
            FROM Invoices i
            LEFT JOIN WorkOrders wo ON i.WorkOrderID = wo.WorkOrderID
            LEFT JOIN Customers c ON wo.CustomerID = c.CustomerID
            ORDER BY i.InvoiceID
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn insert_customers(tx: &mut Transaction<'_, Sqlite>, rows: &[Customer]) -> Result<()> {
    for c in rows {
        sqlx::query(
            r#"
            INSERT INTO Customers (CustomerID, Name, Email, Phone, City, CreatedDate)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.customer_id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.city)
        .bind(&c.created_date)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_technicians(tx: &mut Transaction<'_, Sqlite>, rows: &[Technician]) -> Result<()> {
    for t in rows {
        sqlx::query(
            r#"
            INSERT INTO Technicians (TechnicianID, Name, Specialization, ExperienceYears, HireDate)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(t.technician_id)
        .bind(&t.name)
        .bind(&t.specialization)
        .bind(t.experience_years)
        .bind(&t.hire_date)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_work_orders(tx: &mut Transaction<'_, Sqlite>, rows: &[WorkOrder]) -> Result<()> {
    for wo in rows {
        sqlx::query(
            r#"
            INSERT INTO WorkOrders (WorkOrderID, CustomerID, TechnicianID, Status, CreatedDate,
                                    CompletionDate, TravelTimeMinutes, WorkHours)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(wo.work_order_id)
        .bind(wo.customer_id)
        .bind(wo.technician_id)
        .bind(&wo.status)
        .bind(&wo.created_date)
        .bind(&wo.completion_date)
        .bind(wo.travel_time_minutes)
        .bind(wo.work_hours)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_invoices(tx: &mut Transaction<'_, Sqlite>, rows: &[Invoice]) -> Result<()> {
    for i in rows {
        sqlx::query(
            r#"
            INSERT INTO Invoices (InvoiceID, WorkOrderID, Amount, IssuedDate)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(i.invoice_id)
        .bind(i.work_order_id)
        .bind(i.amount)
        .bind(&i.issued_date)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_quotes(tx: &mut Transaction<'_, Sqlite>, rows: &[Quote]) -> Result<()> {
    for q in rows {
        sqlx::query(
            r#"
            INSERT INTO Quotes (QuoteID, CustomerID, Amount, Status, CreatedDate)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(q.quote_id)
        .bind(q.customer_id)
        .bind(q.amount)
        .bind(&q.status)
        .bind(&q.created_date)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
