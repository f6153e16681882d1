//! On-disk vector index backed by SQLite
//!
//! Embeddings are stored as little-endian f32 blobs and searched by
//! brute-force cosine similarity, which is plenty for a few thousand rows.

use super::{cosine_similarity, ChunkPayload, IndexedChunk, SearchHit, VectorIndex};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Row, Sqlite, Transaction};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_FILE: &str = "index.db";

const INDEX_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS points (
    point_id TEXT PRIMARY KEY,
    source_table TEXT NOT NULL,
    row_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    row_json TEXT NOT NULL,
    embedding BLOB NOT NULL
);
"#;

/// Persistent local index inside a directory
pub struct LocalIndex {
    pool: SqlitePool,
    path: PathBuf,
    dimension: usize,
}

impl LocalIndex {
    /// Open (creating if needed) the index stored in `dir`
    pub async fn open(dir: &Path, dimension: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(INDEX_FILE);

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        debug!("Opening local index at {:?}", path);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(INDEX_SCHEMA).execute(&pool).await?;

        Ok(Self {
            pool,
            path,
            dimension,
        })
    }

    fn check_dimension(&self, len: usize, what: &str) -> Result<()> {
        if len != self.dimension {
            return Err(Error::Index(format!(
                "{} dimension mismatch: index expects {}, got {}",
                what, self.dimension, len
            )));
        }
        Ok(())
    }
}

async fn insert_point(tx: &mut Transaction<'_, Sqlite>, p: &IndexedChunk) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO points (point_id, source_table, row_id, text, row_json, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(p.id.to_string())
    .bind(&p.payload.table)
    .bind(p.payload.row_id)
    .bind(&p.payload.text)
    .bind(&p.payload.row)
    .bind(serialize_embedding(&p.vector))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[async_trait]
impl VectorIndex for LocalIndex {
    async fn reset(&self) -> Result<()> {
        info!("Clearing local index at {:?}", self.path);
        sqlx::query("DELETE FROM points").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexedChunk>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        for p in &points {
            self.check_dimension(p.vector.len(), "Vector")?;
        }

        debug!("Upserting {} points to local index", points.len());

        let mut tx = self.pool.begin().await?;
        for p in &points {
            insert_point(&mut tx, p).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn replace_all(&self, points: Vec<IndexedChunk>) -> Result<()> {
        info!("Replacing local index contents with {} points", points.len());

        // Dropping the transaction on error rolls back the DELETE too
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM points").execute(&mut *tx).await?;
        for p in &points {
            self.check_dimension(p.vector.len(), "Vector")?;
            insert_point(&mut tx, p).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        self.check_dimension(vector.len(), "Query")?;

        let rows = sqlx::query(
            "SELECT point_id, source_table, row_id, text, row_json, embedding FROM points",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .map(|row| {
                let embedding: Vec<u8> = row.get("embedding");
                SearchHit {
                    id: row.get("point_id"),
                    score: cosine_similarity(&vector, &deserialize_embedding(&embedding)),
                    payload: ChunkPayload {
                        table: row.get("source_table"),
                        row_id: row.get("row_id"),
                        text: row.get("text"),
                        row: row.get("row_json"),
                    },
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM points")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    fn describe(&self) -> String {
        format!("local ({})", self.path.display())
    }
}
