//! Embedding generation
//!
//! This module provides an abstraction over embedding models with:
//! - A trait for different embedding backends
//! - Local FastEmbed backend (`local-embed` feature)
//! - HTTP embedding backend
//! - Batch processing for efficiency

#[cfg(feature = "local-embed")]
mod fastembed_impl;
mod http_backend;

#[cfg(feature = "local-embed")]
pub use fastembed_impl::*;
pub use http_backend::*;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::info;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    info!("Using {:?} embedding backend ({})", config.backend, config.model);
    match config.backend {
        EmbeddingBackend::Http => Ok(Arc::new(HttpEmbedder::new(config)?)),
        #[cfg(feature = "local-embed")]
        EmbeddingBackend::Local => Ok(Arc::new(FastEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embed"))]
        EmbeddingBackend::Local => Err(Error::Config(
            "embedding.backend = \"local\" requires the 'local-embed' feature; \
             rebuild with it or set embedding.backend = \"http\""
                .to_string(),
        )),
    }
}

/// Embed a single query string
pub async fn embed_query(embedder: &dyn Embedder, query: &str) -> Result<Vec<f32>> {
    embedder
        .embed(vec![query.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("No embedding returned for query".to_string()))
}

/// Helper to embed in batches with progress
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: Vec<String>,
    batch_size: usize,
    progress: Option<&ProgressBar>,
) -> Result<Vec<Vec<f32>>> {
    let mut all_embeddings = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let batch_texts: Vec<String> = chunk.to_vec();
        let embeddings = embedder.embed(batch_texts).await?;
        if embeddings.len() != chunk.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunk.len(),
                embeddings.len()
            )));
        }
        all_embeddings.extend(embeddings);
        if let Some(pb) = progress {
            pb.inc(chunk.len() as u64);
        }
    }

    Ok(all_embeddings)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder for tests: counts keyword hits per axis
    pub(crate) struct KeywordEmbedder {
        pub keywords: Vec<&'static str>,
        pub calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        pub(crate) fn new(keywords: Vec<&'static str>) -> Self {
            Self {
                keywords,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    let mut v: Vec<f32> = self
                        .keywords
                        .iter()
                        .map(|k| lower.matches(k).count() as f32)
                        .collect();
                    // Bias axis keeps every vector non-zero
                    v.push(0.1);
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            self.keywords.len() + 1
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    #[tokio::test]
    async fn test_batch_splitting() {
        let embedder = KeywordEmbedder::new(vec!["customer"]);
        let texts: Vec<String> = (0..10).map(|i| format!("text {}", i)).collect();
        let pb = ProgressBar::hidden();
        pb.set_length(10);

        let embeddings = embed_in_batches(&embedder, texts, 3, Some(&pb))
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 10);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4); // 3 + 3 + 3 + 1
        assert_eq!(pb.position(), 10);
    }

    #[tokio::test]
    async fn test_embed_query() {
        let embedder = KeywordEmbedder::new(vec!["invoice", "quote"]);
        let v = embed_query(&embedder, "Which quote?").await.unwrap();
        assert_eq!(v, vec![0.0, 1.0, 0.1]);
    }
}
