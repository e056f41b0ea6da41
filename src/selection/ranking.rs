use crate::item::{ContextEntry, Metadata};
use crate::search::{InMemorySearchRequest, SearchService};
use crate::types::context_bundle::PackError;

use super::tokens::{truncate_text, TokenCounter};
use super::ContextPacker;

impl<S, T> ContextPacker<S, T>
where
    S: SearchService,
    T: TokenCounter,
{
    /// Reorder `items` from most to least relevant to `query`.
    ///
    /// Lists of zero or one item are returned as is without a search call.
    /// Results the search returns that cannot be mapped back to a candidate
    /// are dropped.
    pub async fn rank<I: ContextEntry>(&self, query: &str, items: &[I]) -> Result<Vec<I>, PackError> {
        if items.len() <= 1 {
            return Ok(items.to_vec());
        }

        // 1. One index document per item, text clipped to keep the call cheap
        let content = items
            .iter()
            .map(|item| {
                let text = truncate_text(item.content(), self.config.rank_truncate_tokens, &self.tokenizer);
                item.to_index_document(text.to_string())
            })
            .collect();

        // 2. Ask for the whole set back, in ranked order
        let request = InMemorySearchRequest {
            content,
            query: query.to_string(),
            k: items.len(),
            filter: None,
            need_chunk: false,
            additional_metadata: Metadata::new(),
        };
        let ranked = self
            .search
            .in_memory_search_with_indexing(&self.user, request)
            .await
            .map_err(PackError::Ranking)?;

        // 3. Correlate back to the candidates
        let result: Vec<I> = ranked
            .iter()
            .filter_map(|hit| I::from_ranked(hit, items))
            .collect();

        if result.len() != items.len() {
            tracing::debug!(
                kind = I::KIND.as_str(),
                candidates = items.len(),
                returned = ranked.len(),
                correlated = result.len(),
                "ranking did not return every candidate"
            );
        }

        Ok(result)
    }
}
