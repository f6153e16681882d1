//! Ask command - one-shot question against the index

use crate::chain::{Answer, RetrievalQa};
use crate::error::Result;
use tracing::info;

pub async fn cmd_ask(qa: &RetrievalQa, question: &str) -> Result<Answer> {
    info!("Answering: {}", question);
    qa.ask(question).await
}

pub fn print_answer(answer: &Answer, show_sources: bool) {
    println!("{}", answer.answer.trim());

    if show_sources && !answer.sources.is_empty() {
        println!("\nSources:");
        for (i, hit) in answer.sources.iter().enumerate() {
            println!(
                "  {}. [{} #{}] (score: {:.3}) {}",
                i + 1,
                hit.payload.table,
                hit.payload.row_id,
                hit.score,
                hit.payload.text
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{indexed_fixture, ScriptedLlm, KEYWORDS};
    use crate::config::Config;
    use crate::embed::tests::KeywordEmbedder;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ask_returns_answer_with_sources() {
        let embedder = Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec()));
        let (index, _tmp) = indexed_fixture(&embedder).await;
        let qa = RetrievalQa::new(
            &Config::default(),
            embedder,
            index,
            Arc::new(ScriptedLlm::new("Invoice 7 was issued in May.")),
        );

        let answer = cmd_ask(&qa, "  When was the invoice issued?  ").await.unwrap();
        assert_eq!(answer.answer, "Invoice 7 was issued in May.");
        assert!(!answer.sources.is_empty());
    }
}
