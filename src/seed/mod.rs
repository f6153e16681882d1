//! Synthetic business records
//!
//! Generation is a pure function of the seed settings, an anchor date
//! standing in for "now", and a random source. Writing the rows is left
//! to [`HvacDb::seed_database`](crate::db::HvacDb::seed_database).

use crate::config::{SeedConfig, DATE_FORMAT};
use crate::db::{
    Customer, Invoice, Quote, QuoteStatus, SeedData, Technician, WorkOrder, WorkOrderStatus,
};
use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

const CITIES: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
    "San Antonio",
    "San Diego",
];

const SPECIALIZATIONS: &[&str] = &[
    "HVAC",
    "Plumbing",
    "Electrical",
    "Appliance Repair",
    "General Maintenance",
];

/// Random source for a seed run, deterministic when `rng_seed` is set
pub fn rng_from_config(config: &SeedConfig) -> StdRng {
    match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Earliest and latest hire date for a technician with `experience_years`.
///
/// The latest date is the one that still yields that much experience by
/// `anchor`, but never earlier than `floor`.
pub fn hire_date_window(
    floor: NaiveDate,
    anchor: NaiveDate,
    experience_years: i64,
) -> (NaiveDate, NaiveDate) {
    let experience_days = (365.25 * experience_years as f64).floor() as i64;
    let candidate = anchor - Duration::days(experience_days);
    (floor, floor.max(candidate))
}

/// Pick a hire date uniformly inside [`hire_date_window`]
pub fn pick_hire_date<R: Rng + ?Sized>(
    floor: NaiveDate,
    anchor: NaiveDate,
    experience_years: i64,
    rng: &mut R,
) -> NaiveDate {
    let (earliest, latest) = hire_date_window(floor, anchor, experience_years);
    random_date(earliest, latest, rng)
}

fn random_date<R: Rng + ?Sized>(start: NaiveDate, end: NaiveDate, rng: &mut R) -> NaiveDate {
    let span = (end - start).num_days().max(0);
    start + Duration::days(rng.random_range(0..=span))
}

fn pick<'a, R: Rng + ?Sized>(values: &[&'a str], rng: &mut R) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Generate a full, internally consistent data set
pub fn generate<R: Rng + ?Sized>(
    config: &SeedConfig,
    anchor: NaiveDate,
    rng: &mut R,
) -> Result<SeedData> {
    let customer_start = config.customer_start_date()?;
    let technician_floor = config.technician_floor_date()?;
    let activity_start = config.activity_start_date()?;

    if (config.work_orders > 0 || config.quotes > 0) && config.customers == 0 {
        return Err(Error::Seed(
            "work orders and quotes need at least one customer".to_string(),
        ));
    }
    if config.work_orders > 0 && config.technicians == 0 {
        return Err(Error::Seed(
            "work orders need at least one technician".to_string(),
        ));
    }

    let mut data = SeedData::default();

    for i in 1..=config.customers as i64 {
        data.customers.push(Customer {
            customer_id: i,
            name: format!("Customer {}", i),
            email: format!("customer{}@example.com", i),
            phone: format!(
                "555-{}-{}",
                rng.random_range(100..=999),
                rng.random_range(1000..=9999)
            ),
            city: pick(CITIES, rng).to_string(),
            created_date: fmt_date(random_date(customer_start, anchor, rng)),
        });
    }

    for i in 1..=config.technicians as i64 {
        let specialization = pick(SPECIALIZATIONS, rng).to_string();
        let experience_years = rng.random_range(1..=25);
        let hire_date = pick_hire_date(technician_floor, anchor, experience_years, rng);
        data.technicians.push(Technician {
            technician_id: i,
            name: format!("Technician {}", i),
            specialization,
            experience_years,
            hire_date: fmt_date(hire_date),
        });
    }

    for i in 1..=config.work_orders as i64 {
        let customer_id = rng.random_range(1..=config.customers as i64);
        let technician_id = rng.random_range(1..=config.technicians as i64);
        let status = WorkOrderStatus::ALL[rng.random_range(0..WorkOrderStatus::ALL.len())];
        let created = random_date(activity_start, anchor, rng).min(anchor);

        let mut work_order = WorkOrder {
            work_order_id: i,
            customer_id,
            technician_id,
            status: status.to_string(),
            created_date: fmt_date(created),
            completion_date: None,
            travel_time_minutes: None,
            work_hours: None,
        };

        if status.is_worked() {
            let completed = (created + Duration::days(rng.random_range(0..=14))).min(anchor);
            work_order.completion_date = Some(fmt_date(completed));
            work_order.work_hours = Some(round_to(rng.random_range(0.5..=8.0), 1));
            work_order.travel_time_minutes = Some(rng.random_range(15..=120));

            let amount = round_to(rng.random_range(50.0..=1500.0), 2);
            let issued = (completed + Duration::days(rng.random_range(0..=5))).min(anchor);
            data.invoices.push(Invoice {
                invoice_id: data.invoices.len() as i64 + 1,
                work_order_id: i,
                amount,
                issued_date: fmt_date(issued),
            });
        }

        data.work_orders.push(work_order);
    }

    for i in 1..=config.quotes as i64 {
        let customer_id = rng.random_range(1..=config.customers as i64);
        let amount = round_to(rng.random_range(100.0..=5000.0), 2);
        let status = QuoteStatus::ALL[rng.random_range(0..QuoteStatus::ALL.len())];
        let created = random_date(activity_start, anchor, rng).min(anchor);
        data.quotes.push(Quote {
            quote_id: i,
            customer_id,
            amount,
            status: status.to_string(),
            created_date: fmt_date(created),
        });
    }

    debug!(
        customers = data.customers.len(),
        technicians = data.technicians.len(),
        work_orders = data.work_orders.len(),
        invoices = data.invoices.len(),
        quotes = data.quotes.len(),
        "Generated seed data"
    );

    Ok(data)
}
