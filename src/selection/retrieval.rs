use crate::item::{keys, ContextEntry, Fragment, Metadata, RetrievalTarget};
use crate::search::{
    IndexDocument, InMemorySearchRequest, SearchMode, SearchOptions, SearchRequest, SearchService,
};
use crate::types::context_bundle::PackError;
use crate::types::identifiers::{Entity, SearchDomain};

use super::tokens::TokenCounter;
use super::ContextPacker;

/// Identity attached to ad-hoc indexed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdHocSource<'a> {
    pub entity_id: Option<&'a str>,
    pub title: Option<&'a str>,
    pub entity_type: Option<&'a str>,
}

impl<S, T> ContextPacker<S, T>
where
    S: SearchService,
    T: TokenCounter,
{
    /// Fragments of `item` relevant to `query`, from the index when the item
    /// has an id, from on-the-fly indexing of its text otherwise.
    pub async fn retrieve<I: ContextEntry>(&self, query: &str, item: &I) -> Result<Vec<Fragment>, PackError> {
        match item.retrieval_target() {
            RetrievalTarget::Indexed(entity) => {
                let domain = entity.entity_type;
                self.search_relevant_chunks(query, vec![entity], vec![domain], self.config.retrieval_limit)
                    .await
            }
            RetrievalTarget::AdHoc {
                content,
                entity_id,
                title,
                entity_type,
            } => {
                let source = AdHocSource {
                    entity_id,
                    title,
                    entity_type,
                };
                self.in_memory_relevant_chunks(query, content, source).await
            }
        }
    }

    /// Search the persisted index, reranking disabled.
    pub async fn search_relevant_chunks(
        &self,
        query: &str,
        entities: Vec<Entity>,
        domains: Vec<SearchDomain>,
        limit: usize,
    ) -> Result<Vec<Fragment>, PackError> {
        let request = SearchRequest {
            query: query.to_string(),
            entities,
            mode: SearchMode::Vector,
            limit,
            domains,
        };
        let options = SearchOptions {
            enable_reranker: false,
        };

        let hits = self
            .search
            .search(&self.user, request, options)
            .await
            .map_err(PackError::Retrieval)?;

        Ok(hits
            .into_iter()
            .map(|hit| {
                let text = hit
                    .snippets
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join(&self.config.snippet_separator);

                let mut metadata = hit.metadata;
                metadata.insert_string(keys::TITLE, hit.title);
                metadata.insert_string(keys::DOMAIN, hit.domain.as_str());

                Fragment {
                    id: Some(hit.id),
                    text,
                    start: metadata.start(),
                    metadata,
                }
            })
            .collect())
    }

    /// Index `content` on the fly and return its chunks most relevant to `query`.
    pub async fn in_memory_relevant_chunks(
        &self,
        query: &str,
        content: &str,
        source: AdHocSource<'_>,
    ) -> Result<Vec<Fragment>, PackError> {
        let mut metadata = Metadata::new();
        metadata.set_optional_string(keys::NODE_TYPE, source.entity_type);
        metadata.set_optional_string(keys::ENTITY_TYPE, source.entity_type);
        metadata.set_optional_string(keys::TITLE, source.title);
        metadata.set_optional_string(keys::ENTITY_ID, source.entity_id);
        metadata.insert_string(keys::TENANT_ID, self.user.uid.as_str());

        let request = InMemorySearchRequest {
            content: vec![IndexDocument {
                page_content: content.to_string(),
                metadata,
            }],
            query: query.to_string(),
            k: self.config.retrieval_limit,
            filter: None,
            need_chunk: true,
            additional_metadata: Metadata::new(),
        };

        let mut fragments = self
            .search
            .in_memory_search_with_indexing(&self.user, request)
            .await
            .map_err(PackError::Retrieval)?;

        for fragment in &mut fragments {
            if fragment.start.is_none() {
                fragment.start = fragment.metadata.start();
            }
        }

        Ok(fragments)
    }
}
