//! Retrieval-augmented question answering

use crate::config::Config;
use crate::embed::{embed_query, Embedder};
use crate::error::{Error, Result};
use crate::llm::LanguageModel;
use crate::store::{SearchHit, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Answer plus the chunks it was grounded on
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SearchHit>,
}

/// Retrieve top chunks, stuff them into one prompt, ask the model
pub struct RetrievalQa {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LanguageModel>,
    top_k: usize,
    min_score: f32,
    timeout: Duration,
}

impl RetrievalQa {
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            top_k: config.retrieval.top_k,
            min_score: config.retrieval.min_score,
            timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }

    /// Override the model timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Other("Question must not be empty".to_string()));
        }

        if self.index.count().await? == 0 {
            return Err(Error::EmptyIndex);
        }

        let vector = embed_query(self.embedder.as_ref(), question).await?;
        let sources: Vec<SearchHit> = self
            .index
            .search(vector, self.top_k)
            .await?
            .into_iter()
            .filter(|hit| hit.score >= self.min_score)
            .collect();

        debug!("Retrieved {} chunks for question", sources.len());

        let prompt = build_prompt(question, &sources);
        let answer = tokio::time::timeout(self.timeout, self.llm.complete(&prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))??;

        info!(
            "Answered with {} ({} sources)",
            self.llm.model_name(),
            sources.len()
        );

        Ok(Answer { answer, sources })
    }
}

/// Stuff retrieved chunk texts into a single prompt
pub fn build_prompt(question: &str, sources: &[SearchHit]) -> String {
    let context = sources
        .iter()
        .map(|hit| hit.payload.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Table;
    use crate::embed::tests::KeywordEmbedder;
    use crate::extract::Chunk;
    use crate::store::{IndexedChunk, LocalIndex};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Echoes a fixed answer and remembers the last prompt
    pub(crate) struct ScriptedLlm {
        pub answer: String,
        pub delay: Duration,
        pub last_prompt: Mutex<Option<String>>,
    }

    impl ScriptedLlm {
        pub(crate) fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                delay: Duration::ZERO,
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.answer.clone())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    pub(crate) const KEYWORDS: [&str; 3] = ["customer", "technician", "invoice"];

    /// Local index holding one chunk per keyword
    pub(crate) async fn indexed_fixture(
        embedder: &KeywordEmbedder,
    ) -> (Arc<dyn VectorIndex>, TempDir) {
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::open(tmp.path(), embedder.dimension())
            .await
            .unwrap();

        let chunks = vec![
            (Table::Customers, 1, "Customer 1: Name: Customer 1, City: Chicago"),
            (Table::Technicians, 2, "Technician 2: Name: Technician 2, Specialization: HVAC"),
            (Table::Invoices, 3, "Invoice 3: WorkOrder: 8, Amount: 99.50"),
        ];
        let texts: Vec<String> = chunks.iter().map(|c| c.2.to_string()).collect();
        let vectors = embedder.embed(texts).await.unwrap();

        let points = chunks
            .into_iter()
            .zip(vectors)
            .map(|((table, row_id, text), vector)| {
                IndexedChunk::new(
                    Chunk {
                        table,
                        row_id,
                        text: text.to_string(),
                        row: serde_json::json!({}),
                    },
                    vector,
                )
                .unwrap()
            })
            .collect();
        index.upsert(points).await.unwrap();
        (Arc::new(index), tmp)
    }

    #[tokio::test]
    async fn test_ask_stuffs_best_chunks() {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        let (index, _tmp) = indexed_fixture(&embedder).await;
        let llm = Arc::new(ScriptedLlm::new("It was 99.50."));

        let mut config = Config::default();
        config.retrieval.top_k = 1;
        let qa = RetrievalQa::new(&config, embedder, index, llm.clone());

        let answer = qa.ask("How much was invoice 3?").await.unwrap();
        assert_eq!(answer.answer, "It was 99.50.");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].payload.table, "Invoices");

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Invoice 3: WorkOrder: 8"));
        assert!(!prompt.contains("Customer 1:"));
        assert!(prompt.contains("Question: How much was invoice 3?"));
    }

    #[tokio::test]
    async fn test_min_score_drops_weak_hits() {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        let (index, _tmp) = indexed_fixture(&embedder).await;

        let mut config = Config::default();
        config.retrieval.min_score = 0.9;
        let qa = RetrievalQa::new(&config, embedder, index, Arc::new(ScriptedLlm::new("ok")));

        let answer = qa.ask("which technician?").await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].payload.row_id, 2);
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        let (index, _tmp) = indexed_fixture(&embedder).await;
        let mut llm = ScriptedLlm::new("late");
        llm.delay = Duration::from_secs(5);

        let qa = RetrievalQa::new(&Config::default(), embedder, index, Arc::new(llm))
            .with_timeout(Duration::from_millis(50));

        assert!(matches!(qa.ask("customer?").await, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_empty_index_is_reported() {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        let tmp = TempDir::new().unwrap();
        let index = Arc::new(LocalIndex::open(tmp.path(), 4).await.unwrap());
        let qa = RetrievalQa::new(
            &Config::default(),
            embedder,
            index,
            Arc::new(ScriptedLlm::new("unused")),
        );

        assert!(matches!(qa.ask("anything").await, Err(Error::EmptyIndex)));
        assert!(qa.ask("   ").await.is_err());
    }
}
