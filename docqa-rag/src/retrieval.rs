//! Query-time retrieval: embed a query, search the index, format context.
//!
//! [`IndexHandle`] pairs a built [`VectorIndex`] with the embedding provider
//! that built it. Queries always go through that same provider, which keeps
//! query and corpus vectors in one metric space.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::VectorIndex;

/// Marker appended to a chunk's text when it was cut to fit a budget.
pub const TRUNCATION_MARKER: &str = "...";

/// Ranked search results, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    results: Vec<SearchResult>,
}

impl RetrievalResult {
    pub(crate) fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }

    /// Distances of each result, in rank order.
    pub fn distances(&self) -> Vec<f32> {
        self.results.iter().map(|r| r.distance).collect()
    }

    /// Retrieved chunks, in rank order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.results.iter().map(|r| &r.chunk)
    }

    /// Consume the result, returning the underlying list.
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }

    /// Join the retrieved chunk texts into a single context string.
    pub fn to_context(&self, options: &ContextOptions) -> String {
        self.results
            .iter()
            .enumerate()
            .map(|(rank, result)| {
                let text = match options.max_chunk_chars {
                    Some(budget) => truncate_chars(&result.chunk.text, budget),
                    None => Cow::Borrowed(result.chunk.text.as_str()),
                };
                if options.numbered {
                    format!("[Chunk {}]\n{text}", rank + 1)
                } else {
                    text.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(&options.separator)
    }
}

impl Deref for RetrievalResult {
    type Target = [SearchResult];

    fn deref(&self) -> &Self::Target {
        &self.results
    }
}

impl IntoIterator for RetrievalResult {
    type Item = SearchResult;
    type IntoIter = std::vec::IntoIter<SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// How retrieved chunks are joined into a prompt context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Placed between consecutive chunks.
    pub separator: String,
    /// Prefix each chunk with a `[Chunk n]` header line.
    pub numbered: bool,
    /// Per-chunk character budget; longer chunks are truncated.
    pub max_chunk_chars: Option<usize>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self { separator: "\n\n".to_string(), numbered: false, max_chunk_chars: None }
    }
}

impl ContextOptions {
    /// Prefix each chunk with a `[Chunk n]` header.
    pub fn numbered(mut self) -> Self {
        self.numbered = true;
        self
    }

    /// Truncate each chunk to at most `max_chars` characters.
    pub fn with_max_chunk_chars(mut self, max_chars: usize) -> Self {
        self.max_chunk_chars = Some(max_chars);
        self
    }

    /// Use a custom separator between chunks.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Cut `text` to at most `max_chars` characters.
///
/// When the text is longer than the budget the cut is moved back to the
/// last newline inside the budget (if that leaves something), and
/// [`TRUNCATION_MARKER`] is appended.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return Cow::Borrowed(text);
    };
    let head = &text[..cut];
    let head = match head.rfind('\n') {
        Some(newline) if newline > 0 => &head[..newline],
        _ => head,
    };
    Cow::Owned(format!("{head}{TRUNCATION_MARKER}"))
}

/// Outcome of a retrieval that feeds a prompt.
///
/// Orchestration code branches on this type instead of inspecting text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievedContext {
    /// At least one chunk was retrieved.
    Found {
        /// The formatted context.
        context: String,
        /// Distances of the chunks that make up `context`, in rank order.
        distances: Vec<f32>,
    },
    /// Nothing was retrieved.
    Empty,
}

impl RetrievedContext {
    /// Build from a retrieval result using the given formatting.
    pub fn from_result(result: &RetrievalResult, options: &ContextOptions) -> Self {
        if result.is_empty() {
            Self::Empty
        } else {
            Self::Found { context: result.to_context(options), distances: result.distances() }
        }
    }

    /// The formatted context, if any.
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Found { context, .. } => Some(context),
            Self::Empty => None,
        }
    }
}

/// A built index bundled with the embedding provider that built it.
///
/// Cloning is cheap; the index is shared read-only.
#[derive(Clone)]
pub struct IndexHandle {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHandle")
            .field("chunks", &self.index.len())
            .field("dimensions", &self.index.dimensions())
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl IndexHandle {
    /// Embed `chunks` with `embedder` and build a new index over them.
    ///
    /// # Errors
    ///
    /// See [`VectorIndex::build`].
    pub async fn build(chunks: Vec<Chunk>, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let mut index = VectorIndex::new();
        index.build(chunks, embedder.as_ref()).await?;
        Ok(Self { index: Arc::new(index), embedder })
    }

    /// The underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// The provider used for both corpus and query embeddings.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Embed `query` and return the `k` nearest chunks.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures and [`VectorIndex::search`] errors.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        debug!(query_len = query.len(), k, "embedding query");
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, k)?;
        info!(k, result_count = results.len(), "retrieval completed");
        Ok(results)
    }

    /// Retrieve and format the result as a [`RetrievedContext`].
    pub async fn retrieve_context(
        &self,
        query: &str,
        k: usize,
        options: &ContextOptions,
    ) -> Result<RetrievedContext> {
        let results = self.retrieve(query, k).await?;
        Ok(RetrievedContext::from_result(&results, options))
    }
}

/// Build an index over `chunks` using one batched embedding call.
pub async fn build_index(
    chunks: Vec<Chunk>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<IndexHandle> {
    IndexHandle::build(chunks, embedder).await
}

/// Retrieve the `k` chunks nearest to `query` from `handle`.
pub async fn retrieve(handle: &IndexHandle, query: &str, k: usize) -> Result<RetrievalResult> {
    handle.retrieve(query, k).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(texts: &[&str]) -> RetrievalResult {
        RetrievalResult::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| SearchResult {
                    chunk: Chunk {
                        index: i,
                        text: text.to_string(),
                        start: 0,
                        end: text.chars().count(),
                    },
                    distance: i as f32 * 0.5,
                })
                .collect(),
        )
    }

    #[test]
    fn truncation_leaves_short_text_alone() {
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert!(matches!(truncate_chars("hello", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn truncation_prefers_a_newline() {
        assert_eq!(truncate_chars("first line\nsecond line", 15), "first line...");
    }

    #[test]
    fn truncation_without_newline_cuts_at_budget() {
        assert_eq!(truncate_chars("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn truncation_ignores_leading_newline() {
        assert_eq!(truncate_chars("\nabcdefgh", 4), "\nabc...");
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("日本語のテキスト", 3), "日本語...");
    }

    #[test]
    fn default_context_is_a_plain_join() {
        let context = result(&["alpha", "beta"]).to_context(&ContextOptions::default());
        assert_eq!(context, "alpha\n\nbeta");
    }

    #[test]
    fn numbered_context_with_budget() {
        let options = ContextOptions::default().numbered().with_max_chunk_chars(3);
        let context = result(&["alpha", "be"]).to_context(&options);
        assert_eq!(context, "[Chunk 1]\nalp...\n\n[Chunk 2]\nbe");
    }

    #[test]
    fn empty_result_is_empty_context() {
        let context = RetrievedContext::from_result(&result(&[]), &ContextOptions::default());
        assert_eq!(context, RetrievedContext::Empty);
        assert!(context.context().is_none());
    }

    #[test]
    fn found_context_carries_distances() {
        let context =
            RetrievedContext::from_result(&result(&["a", "b"]), &ContextOptions::default());
        match context {
            RetrievedContext::Found { context, distances } => {
                assert_eq!(context, "a\n\nb");
                assert_eq!(distances, vec![0.0, 0.5]);
            }
            RetrievedContext::Empty => panic!("expected context"),
        }
    }
}
