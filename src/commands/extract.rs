//! Extract command - preview the chunks that would be indexed

use crate::config::Config;
use crate::db::{HvacDb, Table};
use crate::error::Result;
use crate::extract::{aggregate, Chunk, SqlExtractor, TableExtractor, TableReport};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only this table
    pub table: Option<Table>,
    /// Print at most this many chunks
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutput {
    pub total: usize,
    pub chunks: Vec<Chunk>,
    pub tables: Vec<TableReport>,
}

pub async fn cmd_extract(
    config: &Config,
    db: &HvacDb,
    options: ExtractOptions,
) -> Result<ExtractOutput> {
    let extractor = SqlExtractor::new(db.clone());

    let (mut chunks, tables) = match options.table {
        Some(table) => {
            let chunks = extractor.extract(table).await?;
            let report = TableReport {
                table,
                chunks: chunks.len(),
                error: None,
            };
            (chunks, vec![report])
        }
        None => {
            let aggregation = aggregate(&extractor, config.extract.on_error).await?;
            (aggregation.chunks, aggregation.tables)
        }
    };

    let total = chunks.len();
    if let Some(limit) = options.limit {
        chunks.truncate(limit);
    }

    Ok(ExtractOutput {
        total,
        chunks,
        tables,
    })
}

pub fn print_extract_output(output: &ExtractOutput) {
    for chunk in &output.chunks {
        println!("{}", chunk.text);
    }

    println!();
    for report in &output.tables {
        match &report.error {
            Some(e) => println!("  {:<12} skipped: {}", report.table.to_string(), e),
            None => println!("  {:<12} {} chunks", report.table.to_string(), report.chunks),
        }
    }
    if output.chunks.len() < output.total {
        println!("Showing {} of {} chunks", output.chunks.len(), output.total);
    } else {
        println!("Total chunks: {}", output.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{sample_data, setup_test_db};

    #[tokio::test]
    async fn test_extract_single_table_with_limit() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();

        let output = cmd_extract(
            &Config::default(),
            &db,
            ExtractOptions {
                table: Some(Table::WorkOrders),
                limit: Some(1),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.total, 2);
        assert_eq!(output.chunks.len(), 1);
        assert_eq!(output.tables.len(), 1);
        assert!(output.chunks[0].text.starts_with("WorkOrder 1:"));
    }

    #[tokio::test]
    async fn test_extract_all_tables() {
        let (db, _tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();

        let output = cmd_extract(&Config::default(), &db, ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(output.total, 7);
        assert_eq!(output.tables.len(), 5);
    }
}
