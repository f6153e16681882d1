//! Combine per-table chunks into a single ordered list

use super::{Chunk, TableExtractor};
use crate::config::ExtractErrorPolicy;
use crate::db::Table;
use crate::error::Result;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of extracting one table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: Table,
    pub chunks: usize,
    /// Set when the table was skipped after a failure
    pub error: Option<String>,
}

/// All chunks from one extraction pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregation {
    pub chunks: Vec<Chunk>,
    pub tables: Vec<TableReport>,
}

impl Aggregation {
    /// True when at least one table was skipped
    pub fn is_partial(&self) -> bool {
        self.tables.iter().any(|t| t.error.is_some())
    }

    pub fn failed_tables(&self) -> Vec<Table> {
        self.tables
            .iter()
            .filter(|t| t.error.is_some())
            .map(|t| t.table)
            .collect()
    }
}

/// Extract every table in [`Table::AGGREGATION_ORDER`] and concatenate the results.
///
/// With [`ExtractErrorPolicy::Skip`] a failing table contributes no chunks
/// and the pass continues; with [`ExtractErrorPolicy::Abort`] the first
/// failure is returned.
pub async fn aggregate(
    extractor: &dyn TableExtractor,
    policy: ExtractErrorPolicy,
) -> Result<Aggregation> {
    info!("Extracting data with joins");
    let mut aggregation = Aggregation::default();

    for table in Table::AGGREGATION_ORDER {
        match extractor.extract(table).await {
            Ok(chunks) => {
                aggregation.tables.push(TableReport {
                    table,
                    chunks: chunks.len(),
                    error: None,
                });
                aggregation.chunks.extend(chunks);
            }
            Err(e) => match policy {
                ExtractErrorPolicy::Abort => return Err(e),
                ExtractErrorPolicy::Skip => {
                    warn!("Skipping {}: {}", table, e);
                    aggregation.tables.push(TableReport {
                        table,
                        chunks: 0,
                        error: Some(e.to_string()),
                    });
                }
            },
        }
    }

    info!("Total chunks extracted: {}", aggregation.chunks.len());
    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{sample_data, setup_test_db};
    use crate::error::Error;
    use crate::extract::SqlExtractor;

    #[tokio::test]
    async fn test_aggregation_order() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();

        let result = aggregate(&SqlExtractor::new(db), ExtractErrorPolicy::Skip)
            .await
            .unwrap();
        assert!(!result.is_partial());

        let tables: Vec<Table> = result.chunks.iter().map(|c| c.table).collect();
        assert_eq!(
            tables,
            vec![
                Table::Customers,
                Table::Customers,
                Table::Technicians,
                Table::Quotes,
                Table::WorkOrders,
                Table::WorkOrders,
                Table::Invoices,
            ]
        );
        assert!(result.chunks[0].text.starts_with("Customer 1:"));
        assert!(result.chunks[6].text.starts_with("Invoice 1:"));
    }

    #[tokio::test]
    async fn test_failing_table_is_skipped() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        sqlx::query("ALTER TABLE Technicians RENAME COLUMN Specialization TO Spec")
            .execute(db.pool())
            .await
            .unwrap();

        let result = aggregate(&SqlExtractor::new(db), ExtractErrorPolicy::Skip)
            .await
            .unwrap();

        assert!(result.is_partial());
        assert_eq!(result.failed_tables(), vec![Table::Technicians]);
        // 2 customers + 1 quote + 2 work orders + 1 invoice
        assert_eq!(result.chunks.len(), 6);
        assert!(result.chunks.iter().all(|c| c.table != Table::Technicians));
        // Work orders still resolve technician names
        let wo = result
            .chunks
            .iter()
            .find(|c| c.table == Table::WorkOrders)
            .unwrap();
        assert!(wo.text.contains("Technician: 'Technician 1'"));
    }

    #[tokio::test]
    async fn test_abort_policy_returns_first_failure() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        sqlx::query("ALTER TABLE Technicians RENAME COLUMN Specialization TO Spec")
            .execute(db.pool())
            .await
            .unwrap();

        let err = aggregate(&SqlExtractor::new(db), ExtractErrorPolicy::Abort)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { ref table, .. } if table == "Technicians"));
    }

    #[tokio::test]
    async fn test_orphan_technician_still_yields_one_chunk() {
        let (db, _tmp) = setup_test_db(false).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        sqlx::query("UPDATE WorkOrders SET TechnicianID = 999 WHERE WorkOrderID = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let result = aggregate(&SqlExtractor::new(db), ExtractErrorPolicy::Skip)
            .await
            .unwrap();

        let orders: Vec<&Chunk> = result
            .chunks
            .iter()
            .filter(|c| c.table == Table::WorkOrders && c.row_id == 1)
            .collect();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].text.contains("Technician: 'N/A' (ID: 999)"));
    }
}
