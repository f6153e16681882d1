//! SQLite schema definition

/// SQL schema for the business records database.
///
/// Plain `CREATE TABLE` statements: running this against a database that
/// already holds the tables fails. Use [`DROP_SQL`] first to rebuild.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE Customers (
    CustomerID INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL,
    Email TEXT NOT NULL,
    Phone TEXT NOT NULL,
    City TEXT NOT NULL,
    CreatedDate TEXT NOT NULL
);

CREATE TABLE Technicians (
    TechnicianID INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL,
    Specialization TEXT NOT NULL,
    ExperienceYears INTEGER NOT NULL,
    HireDate TEXT NOT NULL
);

CREATE TABLE Quotes (
    QuoteID INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomerID INTEGER NOT NULL REFERENCES Customers(CustomerID),
    Amount REAL NOT NULL,
    Status TEXT NOT NULL,
    CreatedDate TEXT NOT NULL
);

CREATE TABLE WorkOrders (
    WorkOrderID INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomerID INTEGER NOT NULL REFERENCES Customers(CustomerID),
    TechnicianID INTEGER NOT NULL REFERENCES Technicians(TechnicianID),
    Status TEXT NOT NULL,
    CreatedDate TEXT NOT NULL,
    CompletionDate TEXT,
    TravelTimeMinutes INTEGER,
    WorkHours REAL
);

CREATE TABLE Invoices (
    InvoiceID INTEGER PRIMARY KEY AUTOINCREMENT,
    WorkOrderID INTEGER NOT NULL REFERENCES WorkOrders(WorkOrderID),
    Amount REAL NOT NULL,
    IssuedDate TEXT NOT NULL
);

CREATE INDEX idx_quotes_customer ON Quotes(CustomerID);
CREATE INDEX idx_workorders_customer ON WorkOrders(CustomerID);
CREATE INDEX idx_workorders_technician ON WorkOrders(TechnicianID);
CREATE INDEX idx_invoices_workorder ON Invoices(WorkOrderID);
"#;

/// Drops every table, children before parents
pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS Invoices;
DROP TABLE IF EXISTS WorkOrders;
DROP TABLE IF EXISTS Quotes;
DROP TABLE IF EXISTS Technicians;
DROP TABLE IF EXISTS Customers;
"#;
