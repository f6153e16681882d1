//! Database maintenance commands

use crate::db::{HvacDb, TableCounts};
use crate::error::{Error, Result};
use tracing::info;

/// Create the five tables; fails if they already exist
pub async fn cmd_db_init(db: &HvacDb) -> Result<()> {
    db.create_schema().await?;
    info!("Schema created");
    Ok(())
}

/// Drop every table; requires explicit confirmation
pub async fn cmd_db_drop(db: &HvacDb, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(Error::Other(
            "Refusing to drop tables without --yes".to_string(),
        ));
    }
    db.drop_schema().await?;
    info!("Schema dropped");
    Ok(())
}

/// Row counts, or `NotInitialized` when the schema is missing
pub async fn cmd_db_status(db: &HvacDb) -> Result<TableCounts> {
    if !db.is_initialized().await? {
        return Err(Error::NotInitialized);
    }
    db.table_counts().await
}

pub fn print_table_counts(counts: &TableCounts) {
    println!("  Customers: {}", counts.customers);
    println!("  Technicians: {}", counts.technicians);
    println!("  Work orders: {}", counts.work_orders);
    println!("  Invoices: {}", counts.invoices);
    println!("  Quotes: {}", counts.quotes);
    println!("  Total: {}", counts.total());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::setup_test_db;

    #[tokio::test]
    async fn test_db_lifecycle() {
        let (db, _tmp) = setup_test_db(true).await;

        assert!(matches!(
            cmd_db_status(&db).await,
            Err(Error::NotInitialized)
        ));

        cmd_db_init(&db).await.unwrap();
        assert_eq!(cmd_db_status(&db).await.unwrap().total(), 0);
        assert!(cmd_db_init(&db).await.is_err());

        assert!(cmd_db_drop(&db, false).await.is_err());
        assert!(db.is_initialized().await.unwrap());

        cmd_db_drop(&db, true).await.unwrap();
        assert!(!db.is_initialized().await.unwrap());
    }
}
