//! Deterministic in-process search backend.
//!
//! Scores text by term frequency (`matches / total_words`), splits text into
//! paragraph chunks with byte offsets, and names chunks by content hash.
//! Identical inputs always produce identical outputs, which makes it a
//! reasonable offline stand-in for a vector index and a convenient test double.

use std::cmp::Ordering;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{
    InMemorySearchRequest, SearchError, SearchOptions, SearchRequest, SearchResultItem,
    SearchService, Snippet,
};
use crate::item::{keys, Fragment, Metadata};
use crate::selection::tokens::floor_char_boundary;
use crate::types::identifiers::{Entity, User};

/// Roughly 200 tokens at four bytes per token.
pub const DEFAULT_CHUNK_CHARS: usize = 800;

/// An entity held in the backend's persisted corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntity {
    pub entity: Entity,
    pub title: String,
    pub content: String,
    pub metadata: Metadata,
}

impl IndexedEntity {
    pub fn new(entity: Entity, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            entity,
            title: title.into(),
            content: content.into(),
            metadata: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TermFrequencySearch {
    corpus: Vec<IndexedEntity>,
    chunk_chars: usize,
}

impl Default for TermFrequencySearch {
    fn default() -> Self {
        Self {
            corpus: Vec::new(),
            chunk_chars: DEFAULT_CHUNK_CHARS,
        }
    }
}

impl TermFrequencySearch {
    pub fn new(corpus: Vec<IndexedEntity>) -> Self {
        Self {
            corpus,
            ..Self::default()
        }
    }

    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    pub fn corpus(&self) -> &[IndexedEntity] {
        &self.corpus
    }
}

/// Lowercased whitespace-separated query terms.
fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(normalize_word)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Share of words in `text` that equal any query term, in `[0.0, 1.0]`.
pub(crate) fn term_frequency_score(text: &str, terms: &[String]) -> f32 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().map(normalize_word).collect();
    let total_words = words.len();
    if total_words == 0 || terms.is_empty() {
        return 0.0;
    }

    let term_matches = words
        .iter()
        .filter(|word| terms.iter().any(|term| term == *word))
        .count();

    let score = term_matches as f32 / total_words as f32;
    debug_assert!((0.0..=1.0).contains(&score), "score {score} out of range [0.0, 1.0]");
    score
}

fn descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn fragment_id(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    format!("sha256:{}", hex::encode(hash))
}

/// Split `text` into chunks of at most `max_chars` bytes, never crossing a
/// paragraph break. Each chunk is returned with its byte offset in `text`.
pub(crate) fn chunk_text(text: &str, max_chars: usize) -> Vec<(usize, &str)> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut offset = 0;

    for paragraph in text.split("\n\n") {
        let paragraph_start = offset;
        offset += paragraph.len() + 2;

        let lead = paragraph.len() - paragraph.trim_start().len();
        let mut start = paragraph_start + lead;
        let mut rest = paragraph.trim();

        while rest.len() > max_chars {
            let mut cut = floor_char_boundary(rest, max_chars);
            if !rest[cut..].starts_with(char::is_whitespace) {
                if let Some(ws) = rest[..cut].rfind(char::is_whitespace) {
                    if ws > 0 {
                        cut = ws;
                    }
                }
            }
            if cut == 0 {
                // a single character wider than the window
                cut = rest.char_indices().nth(1).map(|(i, _)| i).unwrap_or(rest.len());
            }

            chunks.push((start, rest[..cut].trim_end()));

            let tail = &rest[cut..];
            let skipped = tail.len() - tail.trim_start().len();
            start += cut + skipped;
            rest = tail.trim_start();
        }

        if !rest.is_empty() {
            chunks.push((start, rest));
        }
    }

    chunks
}

fn matches_filter(metadata: &Metadata, filter: Option<&Metadata>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value)),
    }
}

#[async_trait]
impl SearchService for TermFrequencySearch {
    async fn search(
        &self,
        _user: &User,
        request: SearchRequest,
        _options: SearchOptions,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        let terms = query_terms(&request.query);

        let mut hits: Vec<(f32, &IndexedEntity, usize, &str)> = self
            .corpus
            .iter()
            .filter(|e| request.entities.is_empty() || request.entities.contains(&e.entity))
            .filter(|e| request.domains.is_empty() || request.domains.contains(&e.entity.entity_type))
            .flat_map(|e| {
                chunk_text(&e.content, self.chunk_chars)
                    .into_iter()
                    .map(move |(start, text)| (start, text, e))
            })
            .map(|(start, text, e)| (term_frequency_score(text, &terms), e, start, text))
            .collect();

        // score desc, then entity id asc, then position asc
        hits.sort_by(|a, b| {
            descending(a.0, b.0)
                .then_with(|| a.1.entity.entity_id.cmp(&b.1.entity.entity_id))
                .then_with(|| a.2.cmp(&b.2))
        });
        hits.truncate(request.limit);

        tracing::debug!(
            query = %request.query,
            hits = hits.len(),
            "term-frequency search over persisted corpus"
        );

        Ok(hits
            .into_iter()
            .map(|(_, e, start, text)| {
                let mut metadata = e.metadata.clone();
                metadata.insert_number(keys::START, start as i64);
                SearchResultItem {
                    id: e.entity.entity_id.clone(),
                    domain: e.entity.entity_type,
                    title: e.title.clone(),
                    snippets: vec![Snippet {
                        text: text.to_string(),
                    }],
                    metadata,
                }
            })
            .collect())
    }

    async fn in_memory_search_with_indexing(
        &self,
        _user: &User,
        request: InMemorySearchRequest,
    ) -> Result<Vec<Fragment>, SearchError> {
        let terms = query_terms(&request.query);

        let mut candidates: Vec<(f32, Fragment)> = Vec::new();
        for doc in &request.content {
            let mut metadata = doc.metadata.clone();
            metadata.merge(request.additional_metadata.clone());
            if !matches_filter(&metadata, request.filter.as_ref()) {
                continue;
            }

            if request.need_chunk {
                for (start, text) in chunk_text(&doc.page_content, self.chunk_chars) {
                    let mut chunk_metadata = metadata.clone();
                    chunk_metadata.insert_number(keys::START, start as i64);
                    let fragment = Fragment::new(text)
                        .with_id(fragment_id(text))
                        .with_start(start)
                        .with_metadata(chunk_metadata);
                    candidates.push((term_frequency_score(text, &terms), fragment));
                }
            } else {
                let fragment = Fragment::new(doc.page_content.clone()).with_metadata(metadata);
                candidates.push((term_frequency_score(&doc.page_content, &terms), fragment));
            }
        }

        // Stable: equal scores keep indexing order.
        candidates.sort_by(|a, b| descending(a.0, b.0));
        candidates.truncate(request.k);

        Ok(candidates.into_iter().map(|(_, fragment)| fragment).collect())
    }
}
