//! Qdrant vector database integration

use super::{ChunkPayload, IndexedChunk, SearchHit, VectorIndex};
use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    GetCollectionInfoResponse, PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value;
use tracing::{debug, info};

const UPSERT_BATCH: usize = 256;

/// Qdrant collection handle
pub struct QdrantIndex {
    client: Qdrant,
    url: String,
    collection: String,
    dimension: usize,
}

impl QdrantIndex {
    /// Create a new connection; the collection is created lazily
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            dimension,
        })
    }

    /// Ensure the collection exists with the expected vector size
    pub async fn ensure_collection(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            debug!("Collection {} already exists", self.collection);

            let info = self.client.collection_info(&self.collection).await?;
            if let Some(size) = vector_size(&info) {
                if size as usize != self.dimension {
                    return Err(Error::Qdrant(format!(
                        "Collection '{}' has vector size {}, but the embedding model produces {}. \
                         Run 'hvac-assistant index' to rebuild it.",
                        self.collection, size, self.dimension
                    )));
                }
            }
            return Ok(());
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, self.dimension
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn reset(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            info!("Deleting existing collection {}", self.collection);
            self.client.delete_collection(&self.collection).await?;
        }
        self.ensure_collection().await
    }

    async fn upsert(&self, points: Vec<IndexedChunk>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        if let Some(mismatch) = points.iter().find(|p| p.vector.len() != self.dimension) {
            return Err(Error::Qdrant(format!(
                "Vector dimension mismatch for collection '{}': expected {} (got {})",
                self.collection,
                self.dimension,
                mismatch.vector.len()
            )));
        }

        debug!(
            "Upserting {} points to collection {}",
            points.len(),
            self.collection
        );

        let point_structs: Vec<PointStruct> =
            points.into_iter().map(|p| p.to_point_struct()).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, point_structs).wait(true))
            .await?;

        Ok(())
    }

    async fn replace_all(&self, points: Vec<IndexedChunk>) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            let info = self.client.collection_info(&self.collection).await?;
            if vector_size(&info).is_some_and(|size| size as usize != self.dimension) {
                info!(
                    "Recreating collection {} for dimension {}",
                    self.collection, self.dimension
                );
                self.client.delete_collection(&self.collection).await?;
            }
        }
        self.ensure_collection().await?;

        // Upsert before deleting so a failure leaves every old point in place
        let keep: Vec<PointId> = points.iter().map(|p| p.id.to_string().into()).collect();
        let mut remaining = points;
        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(UPSERT_BATCH));
            self.upsert(remaining).await?;
            remaining = rest;
        }

        info!("Removing stale points from collection {}", self.collection);
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Filter::must_not([Condition::has_id(keep)]))
                    .wait(true),
            )
            .await?;

        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        debug!(
            "Searching collection {} with limit {}",
            self.collection, limit
        );

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, limit as u64)
                    .with_payload(true),
            )
            .await?;

        response
            .result
            .into_iter()
            .map(|p| {
                let payload = p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_from_qdrant_value(v)))
                    .collect::<serde_json::Map<String, Value>>();

                Ok(SearchHit {
                    id: point_id_to_string(p.id),
                    score: p.score,
                    payload: ChunkPayload::try_from(payload)?,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(0);
        }

        let info = self.client.collection_info(&self.collection).await?;
        let points = info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or(0);
        Ok(points as usize)
    }

    fn describe(&self) -> String {
        format!("qdrant ({} / {})", self.url, self.collection)
    }
}

fn vector_size(info: &GetCollectionInfoResponse) -> Option<u64> {
    let config = info
        .result
        .as_ref()?
        .config
        .as_ref()?
        .params
        .as_ref()?
        .vectors_config
        .as_ref()?
        .config
        .as_ref()?;

    match config {
        qdrant_client::qdrant::vectors_config::Config::Params(params) => Some(params.size),
        qdrant_client::qdrant::vectors_config::Config::ParamsMap(map) => {
            map.map.values().next().map(|p| p.size)
        }
    }
}

fn point_id_to_string(id: Option<PointId>) -> String {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

/// Convert Qdrant value to serde_json Value
fn json_from_qdrant_value(v: qdrant_client::qdrant::Value) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}
