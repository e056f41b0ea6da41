//! Search collaborator boundary.
//!
//! The packer never talks to an index directly. Everything it needs (ranking
//! an ad-hoc candidate set, chunked recall over raw text, filtered search over
//! the persisted index) goes through [`SearchService`], injected at
//! construction time.

pub mod term_frequency;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::item::{Fragment, Metadata};
use crate::types::identifiers::{Entity, SearchDomain, User};

pub use term_frequency::{IndexedEntity, TermFrequencySearch};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("Search service unavailable: {0}")]
    Unavailable(String),

    #[error("Search request rejected: {0}")]
    Rejected(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Vector,
    Keyword,
    Hybrid,
}

/// Filtered search over the persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    /// Empty means "the whole workspace".
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub mode: SearchMode,
    pub limit: usize,
    #[serde(default)]
    pub domains: Vec<SearchDomain>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub enable_reranker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
}

/// One hit from the persisted index. Several hits may share an id when
/// different chunks of the same entity match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub id: String,
    pub domain: SearchDomain,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A text handed to on-the-fly indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Index `content` in memory and return the `k` best matches for `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemorySearchRequest {
    pub content: Vec<IndexDocument>,
    pub query: String,
    pub k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Metadata>,
    /// Split each document into chunks before scoring.
    #[serde(default)]
    pub need_chunk: bool,
    #[serde(default)]
    pub additional_metadata: Metadata,
}

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Search the persisted index, scoped by entity and domain filters.
    async fn search(
        &self,
        user: &User,
        request: SearchRequest,
        options: SearchOptions,
    ) -> Result<Vec<SearchResultItem>, SearchError>;

    /// Index the given documents on the fly and run a similarity search over them.
    /// Without chunking the result is the input set reordered by relevance.
    async fn in_memory_search_with_indexing(
        &self,
        user: &User,
        request: InMemorySearchRequest,
    ) -> Result<Vec<Fragment>, SearchError>;
}

#[async_trait]
impl<S: SearchService + ?Sized> SearchService for std::sync::Arc<S> {
    async fn search(
        &self,
        user: &User,
        request: SearchRequest,
        options: SearchOptions,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        (**self).search(user, request, options).await
    }

    async fn in_memory_search_with_indexing(
        &self,
        user: &User,
        request: InMemorySearchRequest,
    ) -> Result<Vec<Fragment>, SearchError> {
        (**self).in_memory_search_with_indexing(user, request).await
    }
}
