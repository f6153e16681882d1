//! Payload stored next to every vector

use crate::db::Table;
use crate::extract::Chunk;
use crate::error::Result;
use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable point ID for a source row: UUIDv5 of `{table}:{row_id}`
pub fn point_id(table: Table, row_id: i64) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{}:{}", table, row_id).as_bytes(),
    )
}

/// A chunk with its embedding, ready to be written to an index
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl IndexedChunk {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Result<Self> {
        Ok(Self {
            id: point_id(chunk.table, chunk.row_id),
            vector,
            payload: ChunkPayload {
                table: chunk.table.to_string(),
                row_id: chunk.row_id,
                row: serde_json::to_string(&chunk.row)?,
                text: chunk.text,
            },
        })
    }

    /// Convert to qdrant-client PointStruct
    pub fn to_point_struct(self) -> PointStruct {
        let payload_map = self.payload.to_qdrant_payload();
        PointStruct::new(self.id.to_string(), self.vector, payload_map)
    }
}

/// Provenance and text of an indexed chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    /// Source table name
    pub table: String,

    /// Primary key of the source row
    pub row_id: i64,

    /// Chunk text
    pub text: String,

    /// Source row as JSON text
    pub row: String,
}

impl ChunkPayload {
    /// Convert to Qdrant payload format
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("table".to_string(), string_to_qdrant(&self.table));
        map.insert("row_id".to_string(), int_to_qdrant(self.row_id));
        map.insert("text".to_string(), string_to_qdrant(&self.text));
        map.insert("row".to_string(), string_to_qdrant(&self.row));
        map
    }
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for ChunkPayload {
    type Error = crate::error::Error;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(
            s.to_string(),
        )),
    }
}

fn int_to_qdrant(i: i64) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::IntegerValue(i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_id_is_stable_per_row() {
        assert_eq!(point_id(Table::Quotes, 7), point_id(Table::Quotes, 7));
        assert_ne!(point_id(Table::Quotes, 7), point_id(Table::Invoices, 7));
        assert_ne!(point_id(Table::Quotes, 7), point_id(Table::Quotes, 8));
    }

    #[test]
    fn test_payload_from_json_map() {
        let value = json!({
            "table": "Invoices",
            "row_id": 3,
            "text": "Invoice 3: ...",
            "row": "{\"invoice_id\":3}",
        });
        let map = value.as_object().unwrap().clone();
        let payload = ChunkPayload::try_from(map).unwrap();
        assert_eq!(payload.row_id, 3);
        assert_eq!(payload.table, "Invoices");

        let qdrant = payload.to_qdrant_payload();
        assert_eq!(qdrant.len(), 4);
    }
}
