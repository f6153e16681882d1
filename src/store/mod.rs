//! Vector index
//!
//! This module provides:
//! - The [`VectorIndex`] trait the pipeline writes to and searches
//! - An on-disk SQLite index (default)
//! - A Qdrant collection backend

mod local;
mod payload;
mod qdrant;

pub use local::*;
pub use payload::*;
pub use qdrant::*;

use crate::config::{Config, IndexBackend};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// A scored search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

/// Similarity-searchable store of embedded chunks
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Remove every stored point, leaving an empty index
    async fn reset(&self) -> Result<()>;

    /// Insert or replace points by ID
    async fn upsert(&self, points: Vec<IndexedChunk>) -> Result<()>;

    /// Make `points` the whole contents of the index.
    ///
    /// On error the previous contents remain searchable.
    async fn replace_all(&self, points: Vec<IndexedChunk>) -> Result<()>;

    /// Up to `limit` hits, best first
    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>>;

    /// Number of stored points (zero when the index does not exist yet)
    async fn count(&self) -> Result<usize>;

    /// Human-readable location, for status output
    fn describe(&self) -> String;
}

/// Open the configured index for vectors of `dimension`
pub async fn open_index(config: &Config, dimension: usize) -> Result<Arc<dyn VectorIndex>> {
    match config.index.backend {
        IndexBackend::Local => Ok(Arc::new(
            LocalIndex::open(&config.paths.index_dir, dimension).await?,
        )),
        IndexBackend::Qdrant => Ok(Arc::new(
            QdrantIndex::new(
                &config.index.qdrant_url,
                &config.index.collection_name,
                dimension,
            )
            .await?,
        )),
    }
}

/// Cosine similarity; zero for empty, mismatched or zero-length vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_open_local_index_from_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));

        let index = open_index(&config, 3).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
        assert!(tmp.path().join("index").exists());
    }
}
