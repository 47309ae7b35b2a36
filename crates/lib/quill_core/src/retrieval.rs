//! Optional grounding of prompts with stored knowledge.
//!
//! Deep research embeds the query and asks pgvector for the nearest
//! documents. When that yields nothing (or fails) a plain substring search
//! runs instead. Retrieval never fails a generation: every error here
//! degrades to "no knowledge".

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::inference::InferenceBackend;

/// How many chunks to splice into a prompt.
pub const MATCH_COUNT: i64 = 6;
/// Minimum cosine similarity for a vector match.
pub const SIMILARITY_THRESHOLD: f64 = 0.75;
/// Characters of each chunk that go into the prompt.
const SNIPPET_CHARS: usize = 600;

/// A stored document fragment.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct KnowledgeChunk {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Where knowledge chunks come from.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Nearest chunks to `embedding` above `threshold`, best first.
    async fn match_chunks(
        &self,
        embedding: &[f32],
        count: i64,
        threshold: f64,
    ) -> Result<Vec<KnowledgeChunk>, sqlx::Error>;

    /// Chunks whose content contains `query`, case-insensitively.
    async fn search_text(&self, query: &str, limit: i64)
    -> Result<Vec<KnowledgeChunk>, sqlx::Error>;
}

/// Knowledge stored in the `documents` table.
#[derive(Clone)]
pub struct PgKnowledgeStore {
    pool: PgPool,
}

impl PgKnowledgeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Format a vector as a pgvector literal: `[0.1,0.2,...]`.
fn vector_literal(embedding: &[f32]) -> String {
    format!(
        "[{}]",
        embedding
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

/// `%query%` with LIKE wildcards in the query escaped.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl KnowledgeStore for PgKnowledgeStore {
    async fn match_chunks(
        &self,
        embedding: &[f32],
        count: i64,
        threshold: f64,
    ) -> Result<Vec<KnowledgeChunk>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeChunk>(
            "SELECT title, content FROM match_chunks($1::vector, $2, $3::int)",
        )
        .bind(vector_literal(embedding))
        .bind(threshold)
        .bind(count)
        .fetch_all(&self.pool)
        .await
    }

    async fn search_text(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeChunk>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeChunk>(
            "SELECT title, content FROM documents WHERE content ILIKE $1 LIMIT $2",
        )
        .bind(contains_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Render chunks as the prompt's knowledge block.
pub fn format_knowledge(chunks: &[KnowledgeChunk]) -> Option<String> {
    if chunks.is_empty() {
        return None;
    }
    let lines: Vec<String> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let title = match chunk.title.as_deref() {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => format!("Doc {}", i + 1),
            };
            let snippet: String = chunk
                .content
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(SNIPPET_CHARS)
                .collect();
            format!("- {title}: {snippet}")
        })
        .collect();
    Some(format!("Relevant knowledge:\n{}", lines.join("\n")))
}

/// Look up knowledge for `query`. Returns the formatted block, or `None`
/// when nothing relevant was found.
pub async fn gather_knowledge(
    store: &dyn KnowledgeStore,
    backend: &dyn InferenceBackend,
    query: &str,
    deep_research: bool,
) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let mut chunks = Vec::new();

    if deep_research {
        match backend.feature_extraction(query).await {
            Ok(embedding) => {
                match store
                    .match_chunks(&embedding, MATCH_COUNT, SIMILARITY_THRESHOLD)
                    .await
                {
                    Ok(hits) => chunks = hits,
                    Err(e) => warn!(error = %e, "vector match failed, using text search"),
                }
            }
            Err(e) => warn!(error = %e, "query embedding failed, using text search"),
        }
    }

    if chunks.is_empty() {
        match store.search_text(query, MATCH_COUNT).await {
            Ok(hits) => chunks = hits,
            Err(e) => warn!(error = %e, "text search failed"),
        }
    }

    debug!(query, hits = chunks.len(), deep_research, "knowledge lookup");
    format_knowledge(&chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{GenerationParams, InferenceError};
    use std::sync::Mutex;

    struct FakeStore {
        vector_hits: Result<Vec<KnowledgeChunk>, ()>,
        text_hits: Vec<KnowledgeChunk>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeStore {
        fn new(
            vector_hits: Result<Vec<KnowledgeChunk>, ()>,
            text_hits: Vec<KnowledgeChunk>,
        ) -> Self {
            Self {
                vector_hits,
                text_hits,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KnowledgeStore for FakeStore {
        async fn match_chunks(
            &self,
            _embedding: &[f32],
            count: i64,
            threshold: f64,
        ) -> Result<Vec<KnowledgeChunk>, sqlx::Error> {
            assert_eq!(count, MATCH_COUNT);
            assert_eq!(threshold, SIMILARITY_THRESHOLD);
            self.calls.lock().unwrap().push("vector");
            self.vector_hits
                .clone()
                .map_err(|_| sqlx::Error::PoolTimedOut)
        }

        async fn search_text(
            &self,
            _query: &str,
            limit: i64,
        ) -> Result<Vec<KnowledgeChunk>, sqlx::Error> {
            assert_eq!(limit, MATCH_COUNT);
            self.calls.lock().unwrap().push("text");
            Ok(self.text_hits.clone())
        }
    }

    struct Embedder {
        fail: bool,
    }

    #[async_trait]
    impl InferenceBackend for Embedder {
        async fn text_generation(
            &self,
            _model: &str,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, InferenceError> {
            unreachable!()
        }

        async fn conversational(
            &self,
            _model: &str,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, InferenceError> {
            unreachable!()
        }

        async fn feature_extraction(&self, _text: &str) -> Result<Vec<f32>, InferenceError> {
            if self.fail {
                Err(InferenceError::MissingToken)
            } else {
                Ok(vec![0.1, 0.2])
            }
        }
    }

    fn chunk(title: Option<&str>, content: &str) -> KnowledgeChunk {
        KnowledgeChunk {
            title: title.map(str::to_string),
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn knowledge_block_defaults_titles_and_truncates() {
        let long = "y".repeat(700);
        let block = format_knowledge(&[chunk(Some("Guide"), "short"), chunk(None, &long)]).unwrap();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "Relevant knowledge:");
        assert_eq!(lines[1], "- Guide: short");
        assert_eq!(lines[2], format!("- Doc 2: {}", "y".repeat(600)));
    }

    #[test]
    fn no_chunks_no_block() {
        assert_eq!(format_knowledge(&[]), None);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("plain"), "%plain%");
    }

    #[test]
    fn vector_literal_is_pgvector_syntax() {
        assert_eq!(vector_literal(&[0.5, -1.0]), "[0.5,-1]");
    }

    #[tokio::test]
    async fn blank_query_skips_lookup() {
        let store = FakeStore::new(Ok(vec![]), vec![chunk(None, "x")]);
        let out = gather_knowledge(&store, &Embedder { fail: false }, "   ", true).await;
        assert_eq!(out, None);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn deep_research_prefers_vector_hits() {
        let store = FakeStore::new(
            Ok(vec![chunk(Some("V"), "vec")]),
            vec![chunk(Some("T"), "txt")],
        );
        let out = gather_knowledge(&store, &Embedder { fail: false }, "q", true)
            .await
            .unwrap();
        assert!(out.contains("- V: vec"));
        assert_eq!(store.calls(), vec!["vector"]);
    }

    #[tokio::test]
    async fn empty_vector_hits_fall_back_to_text() {
        let store = FakeStore::new(Ok(vec![]), vec![chunk(Some("T"), "txt")]);
        let out = gather_knowledge(&store, &Embedder { fail: false }, "q", true)
            .await
            .unwrap();
        assert!(out.contains("- T: txt"));
        assert_eq!(store.calls(), vec!["vector", "text"]);
    }

    #[tokio::test]
    async fn vector_errors_fall_back_to_text() {
        let store = FakeStore::new(Err(()), vec![chunk(Some("T"), "txt")]);
        let out = gather_knowledge(&store, &Embedder { fail: false }, "q", true).await;
        assert!(out.is_some());
        assert_eq!(store.calls(), vec!["vector", "text"]);
    }

    #[tokio::test]
    async fn embedding_errors_fall_back_to_text() {
        let store = FakeStore::new(Ok(vec![chunk(None, "never")]), vec![chunk(Some("T"), "txt")]);
        let out = gather_knowledge(&store, &Embedder { fail: true }, "q", true)
            .await
            .unwrap();
        assert!(out.contains("- T: txt"));
        assert_eq!(store.calls(), vec!["text"]);
    }

    #[tokio::test]
    async fn without_deep_research_only_text_search_runs() {
        let store = FakeStore::new(Ok(vec![chunk(None, "never")]), vec![]);
        let out = gather_knowledge(&store, &Embedder { fail: false }, "q", false).await;
        assert_eq!(out, None);
        assert_eq!(store.calls(), vec!["text"]);
    }
}
