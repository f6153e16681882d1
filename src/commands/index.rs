//! Index command - embed every extracted chunk and rebuild the vector index

use crate::config::{Config, ExtractErrorPolicy};
use crate::db::{HvacDb, Table};
use crate::embed::{embed_in_batches, Embedder};
use crate::error::{Error, Result};
use crate::extract::{aggregate, SqlExtractor, TableExtractor};
use crate::progress::progress_bar;
use crate::store::{IndexedChunk, VectorIndex};
use serde::Serialize;
use tracing::{info, warn};

/// Index statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub chunks_indexed: usize,
    pub skipped_tables: Vec<Table>,
    pub dimension: usize,
    pub embedding_model: String,
    pub index: String,
}

/// Extract, embed, then replace the index contents as a whole.
///
/// Any failure, while embedding or while writing, leaves the previous
/// index intact.
pub async fn build_index(
    extractor: &dyn TableExtractor,
    policy: ExtractErrorPolicy,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    batch_size: usize,
    show_progress: bool,
) -> Result<IndexStats> {
    let aggregation = aggregate(extractor, policy).await?;
    let skipped_tables = aggregation.failed_tables();
    if aggregation.is_partial() {
        warn!("Index will be partial; skipped {:?}", skipped_tables);
    }

    let chunks = aggregation.chunks;
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

    let pb = show_progress.then(|| progress_bar(texts.len() as u64, "Embedding"));
    let vectors = embed_in_batches(embedder, texts, batch_size, pb.as_ref()).await?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if vectors.len() != chunks.len() {
        return Err(Error::Embedding(format!(
            "Expected {} embeddings, got {}",
            chunks.len(),
            vectors.len()
        )));
    }

    let points = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| IndexedChunk::new(chunk, vector))
        .collect::<Result<Vec<_>>>()?;
    let chunks_indexed = points.len();

    index.replace_all(points).await?;

    info!("Indexed {} chunks into {}", chunks_indexed, index.describe());

    Ok(IndexStats {
        chunks_indexed,
        skipped_tables,
        dimension: embedder.dimension(),
        embedding_model: embedder.model_name().to_string(),
        index: index.describe(),
    })
}

pub async fn cmd_index(
    config: &Config,
    db: &HvacDb,
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    show_progress: bool,
) -> Result<IndexStats> {
    let extractor = SqlExtractor::new(db.clone());
    build_index(
        &extractor,
        config.extract.on_error,
        embedder,
        index,
        config.embedding.batch_size,
        show_progress,
    )
    .await
}

pub fn print_index_stats(stats: &IndexStats) {
    println!("✓ Indexed {} chunks", stats.chunks_indexed);
    println!(
        "  Embeddings: {} ({} dims)",
        stats.embedding_model, stats.dimension
    );
    println!("  Index: {}", stats.index);
    if !stats.skipped_tables.is_empty() {
        let names: Vec<String> = stats.skipped_tables.iter().map(|t| t.to_string()).collect();
        println!("  Skipped tables: {}", names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{sample_data, setup_test_db};
    use crate::embed::embed_query;
    use crate::embed::tests::KeywordEmbedder;
    use crate::store::LocalIndex;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_index_is_idempotent() {
        let (db, _db_tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        let extractor = SqlExtractor::new(db.clone());

        let embedder = KeywordEmbedder::new(vec!["customer", "technician", "invoice", "quote"]);
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::open(tmp.path(), embedder.dimension()).await.unwrap();

        let stats = build_index(
            &extractor,
            ExtractErrorPolicy::Abort,
            &embedder,
            &index,
            3,
            false,
        )
        .await
        .unwrap();
        assert_eq!(stats.chunks_indexed, 7);
        assert!(stats.skipped_tables.is_empty());
        assert_eq!(index.count().await.unwrap(), 7);
        // 7 chunks in batches of 3
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);

        build_index(
            &extractor,
            ExtractErrorPolicy::Abort,
            &embedder,
            &index,
            3,
            false,
        )
        .await
        .unwrap();
        assert_eq!(index.count().await.unwrap(), 7);

        let query = embed_query(&embedder, "invoice").await.unwrap();
        let hits = index.search(query, 1).await.unwrap();
        assert_eq!(hits[0].payload.table, "Invoices");
    }

    #[tokio::test]
    async fn test_build_index_skips_broken_table() {
        let (db, _db_tmp) = setup_test_db(false).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        sqlx::query("ALTER TABLE Quotes RENAME COLUMN Amount TO Total")
            .execute(db.pool())
            .await
            .unwrap();

        let embedder = KeywordEmbedder::new(vec!["customer"]);
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::open(tmp.path(), embedder.dimension()).await.unwrap();

        let stats = build_index(
            &SqlExtractor::new(db.clone()),
            ExtractErrorPolicy::Skip,
            &embedder,
            &index,
            32,
            false,
        )
        .await
        .unwrap();
        assert_eq!(stats.chunks_indexed, 6);
        assert_eq!(stats.skipped_tables, vec![Table::Quotes]);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_index() {
        let (db, _db_tmp) = setup_test_db(true).await;
        db.seed_database(&sample_data(), false).await.unwrap();
        let extractor = SqlExtractor::new(db.clone());

        let embedder = KeywordEmbedder::new(vec!["customer", "technician", "invoice", "quote"]);
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::open(tmp.path(), embedder.dimension()).await.unwrap();
        build_index(&extractor, ExtractErrorPolicy::Abort, &embedder, &index, 3, false)
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 7);

        // Vectors of the wrong width make the write fail mid-rebuild
        let narrow = KeywordEmbedder::new(vec!["customer"]);
        let err = build_index(&extractor, ExtractErrorPolicy::Abort, &narrow, &index, 3, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Index(_)));

        assert_eq!(index.count().await.unwrap(), 7);
        let query = embed_query(&embedder, "invoice").await.unwrap();
        let hits = index.search(query, 1).await.unwrap();
        assert_eq!(hits[0].payload.table, "Invoices");
    }
}
