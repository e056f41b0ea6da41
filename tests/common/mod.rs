#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use context_packer::config::PackingConfig;
use context_packer::item::{keys, ContentItem, DocumentItem, Fragment, Metadata, ResourceItem};
use context_packer::search::{
    InMemorySearchRequest, SearchError, SearchOptions, SearchRequest, SearchResultItem,
    SearchService, Snippet,
};
use context_packer::selection::{ApproxTokenCounter, ContextPacker};
use context_packer::types::{SearchDomain, User};

/// Every collaborator call the stub received.
#[derive(Debug, Clone)]
pub enum Call {
    Search(SearchRequest, SearchOptions),
    InMemory(InMemorySearchRequest),
}

/// Scripted search service.
///
/// Ranking reorders candidates by `rank_order` (matched on docId, resourceId
/// or title, in that order). Recall returns the fragments registered for the
/// entity id (indexed) or the title (ad hoc).
#[derive(Default)]
pub struct StubSearch {
    calls: Mutex<Vec<Call>>,
    rank_order: Vec<String>,
    fragments: HashMap<String, Vec<Fragment>>,
    workspace_hits: Vec<SearchResultItem>,
    fail_ranking: bool,
    fail_retrieval: bool,
}

impl StubSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank_by(mut self, order: &[&str]) -> Self {
        self.rank_order = order.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn fragments_for(mut self, key: &str, fragments: Vec<Fragment>) -> Self {
        self.fragments.insert(key.to_string(), fragments);
        self
    }

    pub fn workspace_hits(mut self, hits: Vec<SearchResultItem>) -> Self {
        self.workspace_hits = hits;
        self
    }

    pub fn failing_ranking(mut self) -> Self {
        self.fail_ranking = true;
        self
    }

    pub fn failing_retrieval(mut self) -> Self {
        self.fail_retrieval = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ranking_calls(&self) -> Vec<InMemorySearchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::InMemory(r) if !r.need_chunk => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn ad_hoc_calls(&self) -> Vec<InMemorySearchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::InMemory(r) if r.need_chunk => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn search_calls(&self) -> Vec<(SearchRequest, SearchOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(r, o) => Some((r, o)),
                _ => None,
            })
            .collect()
    }

    fn rank_key(metadata: &Metadata) -> Option<&str> {
        metadata
            .get_str(keys::DOC_ID)
            .or_else(|| metadata.get_str(keys::RESOURCE_ID))
            .or_else(|| metadata.title())
    }
}

#[async_trait]
impl SearchService for StubSearch {
    async fn search(
        &self,
        _user: &User,
        request: SearchRequest,
        options: SearchOptions,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Search(request.clone(), options));
        if self.fail_retrieval {
            return Err(SearchError::Unavailable("index offline".into()));
        }

        let Some(entity) = request.entities.first() else {
            return Ok(self.workspace_hits.clone());
        };

        let fragments = self
            .fragments
            .get(&entity.entity_id)
            .cloned()
            .unwrap_or_default();
        Ok(fragments
            .into_iter()
            .map(|f| {
                let mut metadata = f.metadata.clone();
                if let Some(start) = f.start {
                    metadata.insert_number(keys::START, start as i64);
                }
                SearchResultItem {
                    id: entity.entity_id.clone(),
                    domain: entity.entity_type,
                    title: String::new(),
                    snippets: vec![Snippet { text: f.text }],
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
        self.calls.lock().unwrap().push(Call::InMemory(request.clone()));

        if request.need_chunk {
            if self.fail_retrieval {
                return Err(SearchError::Unavailable("indexer offline".into()));
            }
            let key = request
                .content
                .first()
                .and_then(|d| d.metadata.title())
                .unwrap_or_default();
            return Ok(self.fragments.get(key).cloned().unwrap_or_default());
        }

        if self.fail_ranking {
            return Err(SearchError::Rejected("ranking quota exceeded".into()));
        }

        let position = |doc: &context_packer::search::IndexDocument| {
            Self::rank_key(&doc.metadata)
                .and_then(|k| self.rank_order.iter().position(|o| o == k))
                .unwrap_or(usize::MAX)
        };
        let mut docs = request.content.clone();
        docs.sort_by_key(|d| position(d));
        docs.truncate(request.k);

        Ok(docs
            .into_iter()
            .map(|d| Fragment::new(d.page_content).with_metadata(d.metadata))
            .collect())
    }
}

pub fn user() -> User {
    User::new("u-test")
}

pub fn packer(search: Arc<StubSearch>) -> ContextPacker<Arc<StubSearch>, ApproxTokenCounter> {
    ContextPacker::with_defaults(search, user())
}

pub fn packer_with(
    search: Arc<StubSearch>,
    config: PackingConfig,
) -> ContextPacker<Arc<StubSearch>, ApproxTokenCounter> {
    ContextPacker::new(search, ApproxTokenCounter, config, user())
}

/// Text of exactly `tokens` tokens under the approximate counter.
pub fn text_of(tokens: usize, fill: char) -> String {
    std::iter::repeat(fill).take(tokens * 4).collect()
}

pub fn whole(title: &str, content: String) -> ContentItem {
    let mut metadata = Metadata::new();
    metadata.insert_string(keys::TITLE, title);
    metadata.insert_bool(keys::USE_WHOLE_CONTENT, true);
    ContentItem::new(content, metadata)
}

pub fn whole_doc(id: &str, content: String) -> DocumentItem {
    let mut metadata = Metadata::new();
    metadata.insert_bool(keys::USE_WHOLE_CONTENT, true);
    DocumentItem::new(id, format!("Doc {id}"), content).with_metadata(metadata)
}

pub fn whole_resource(id: &str, content: String) -> ResourceItem {
    let mut metadata = Metadata::new();
    metadata.insert_bool(keys::USE_WHOLE_CONTENT, true);
    ResourceItem::new(id, format!("Resource {id}"), content).with_metadata(metadata)
}

pub fn hit(id: &str, domain: SearchDomain, title: &str, text: &str, start: Option<i64>) -> SearchResultItem {
    let mut metadata = Metadata::new();
    if let Some(start) = start {
        metadata.insert_number(keys::START, start);
    }
    metadata.insert_string(keys::URL, format!("https://kb.example/{id}"));
    SearchResultItem {
        id: id.to_string(),
        domain,
        title: title.to_string(),
        snippets: vec![Snippet {
            text: text.to_string(),
        }],
        metadata,
    }
}
