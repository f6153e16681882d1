//! Row types for the business records tables

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Tables that feed the retrieval index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Customers,
    Technicians,
    Quotes,
    WorkOrders,
    Invoices,
}

impl Table {
    /// Fixed order used when chunks are aggregated
    pub const AGGREGATION_ORDER: [Table; 5] = [
        Table::Customers,
        Table::Technicians,
        Table::Quotes,
        Table::WorkOrders,
        Table::Invoices,
    ];

    /// Table name as it appears in SQL
    pub fn sql_name(&self) -> &'static str {
        match self {
            Table::Customers => "Customers",
            Table::Technicians => "Technicians",
            Table::Quotes => "Quotes",
            Table::WorkOrders => "WorkOrders",
            Table::Invoices => "Invoices",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "customers" | "customer" => Ok(Table::Customers),
            "technicians" | "technician" => Ok(Table::Technicians),
            "quotes" | "quote" => Ok(Table::Quotes),
            "workorders" | "workorder" => Ok(Table::WorkOrders),
            "invoices" | "invoice" => Ok(Table::Invoices),
            _ => Err(Error::Config(format!("Unknown table: {}", s))),
        }
    }
}

/// Work order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderStatus {
    Scheduled,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 5] = [
        WorkOrderStatus::Scheduled,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::Completed,
        WorkOrderStatus::OnHold,
        WorkOrderStatus::Cancelled,
    ];

    /// Whether labor was performed and billed
    pub fn is_worked(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed)
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkOrderStatus::Scheduled => write!(f, "Scheduled"),
            WorkOrderStatus::InProgress => write!(f, "In Progress"),
            WorkOrderStatus::OnHold => write!(f, "On Hold"),
            WorkOrderStatus::Completed => write!(f, "Completed"),
            WorkOrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for WorkOrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(WorkOrderStatus::Scheduled),
            "in progress" => Ok(WorkOrderStatus::InProgress),
            "on hold" => Ok(WorkOrderStatus::OnHold),
            "completed" => Ok(WorkOrderStatus::Completed),
            "cancelled" => Ok(WorkOrderStatus::Cancelled),
            _ => Err(Error::Config(format!("Unknown work order status: {}", s))),
        }
    }
}

/// Quote status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    Sent,
    Accepted,
    Rejected,
    Missed,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Missed,
    ];
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteStatus::Sent => write!(f, "Sent"),
            QuoteStatus::Accepted => write!(f, "Accepted"),
            QuoteStatus::Rejected => write!(f, "Rejected"),
            QuoteStatus::Missed => write!(f, "Missed"),
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            "missed" => Ok(QuoteStatus::Missed),
            _ => Err(Error::Config(format!("Unknown quote status: {}", s))),
        }
    }
}

/// A customer
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub created_date: String,
}

/// A field technician
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Technician {
    pub technician_id: i64,
    pub name: String,
    pub specialization: String,
    pub experience_years: i64,
    pub hire_date: String,
}

/// A work order as stored
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct WorkOrder {
    pub work_order_id: i64,
    pub customer_id: i64,
    pub technician_id: i64,
    pub status: String,
    pub created_date: String,
    pub completion_date: Option<String>,
    pub travel_time_minutes: Option<i64>,
    pub work_hours: Option<f64>,
}

impl WorkOrder {
    pub fn get_status(&self) -> Result<WorkOrderStatus> {
        self.status.parse()
    }
}

/// An invoice for a completed work order
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: i64,
    pub work_order_id: i64,
    pub amount: f64,
    pub issued_date: String,
}

/// A quote sent to a customer
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub status: String,
    pub created_date: String,
}

impl Quote {
    pub fn get_status(&self) -> Result<QuoteStatus> {
        self.status.parse()
    }
}

/// Quote joined with its customer's name
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct QuoteView {
    pub quote_id: i64,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub created_date: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
}

/// Work order joined with customer and technician names
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct WorkOrderView {
    pub work_order_id: i64,
    pub status: Option<String>,
    pub created_date: Option<String>,
    pub completion_date: Option<String>,
    pub travel_time_minutes: Option<i64>,
    pub work_hours: Option<f64>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub technician_id: Option<i64>,
    pub technician_name: Option<String>,
}

/// Invoice joined with its work order and customer
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct InvoiceView {
    pub invoice_id: i64,
    pub amount: Option<f64>,
    pub issued_date: Option<String>,
    pub work_order_id: Option<i64>,
    pub work_order_created: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
}

/// Every row produced by one seed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    pub customers: Vec<Customer>,
    pub technicians: Vec<Technician>,
    pub work_orders: Vec<WorkOrder>,
    pub invoices: Vec<Invoice>,
    pub quotes: Vec<Quote>,
}

/// Row counts per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub customers: usize,
    pub technicians: usize,
    pub quotes: usize,
    pub work_orders: usize,
    pub invoices: usize,
}

impl TableCounts {
    pub fn get(&self, table: Table) -> usize {
        match table {
            Table::Customers => self.customers,
            Table::Technicians => self.technicians,
            Table::Quotes => self.quotes,
            Table::WorkOrders => self.work_orders,
            Table::Invoices => self.invoices,
        }
    }

    pub fn total(&self) -> usize {
        Table::AGGREGATION_ORDER.iter().map(|t| self.get(*t)).sum()
    }
}

impl From<&SeedData> for TableCounts {
    fn from(data: &SeedData) -> Self {
        Self {
            customers: data.customers.len(),
            technicians: data.technicians.len(),
            quotes: data.quotes.len(),
            work_orders: data.work_orders.len(),
            invoices: data.invoices.len(),
        }
    }
}
