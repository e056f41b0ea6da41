use std::collections::HashMap;

use crate::item::{DocumentItem, Fragment, Metadata, ResourceItem, WorkspaceItem};
use crate::search::SearchService;
use crate::types::context_bundle::{
    CategorySummary, ComposedContext, CompositionSummary, MentionedContext, PackError,
};
use crate::types::identifiers::SearchDomain;

use super::chunks::assemble_chunks_with;
use super::tokens::TokenCounter;
use super::ContextPacker;

impl<S, T> ContextPacker<S, T>
where
    S: SearchService,
    T: TokenCounter,
{
    /// Split `budget` across the three categories and pack each independently.
    pub async fn compose(
        &self,
        query: &str,
        context: &MentionedContext,
        budget: usize,
    ) -> Result<ComposedContext, PackError> {
        let budgets = self.config.shares.split(budget);

        let content = self.pack(query, &context.content_list, budgets.content).await?;
        let resources = self.pack(query, &context.resources, budgets.resources).await?;
        let documents = self.pack(query, &context.documents, budgets.documents).await?;

        let summary = CompositionSummary {
            budget,
            content: CategorySummary::from(&content),
            resources: CategorySummary::from(&resources),
            documents: CategorySummary::from(&documents),
        };

        tracing::info!(
            budget,
            content_budget = budgets.content,
            resource_budget = budgets.resources,
            document_budget = budgets.documents,
            tokens_used = summary.tokens_used(),
            "composed mentioned context"
        );

        Ok(ComposedContext {
            context: MentionedContext {
                content_list: content.items,
                resources: resources.items,
                documents: documents.items,
            },
            summary,
        })
    }

    /// [`compose`](Self::compose) without the summary.
    pub async fn process_mentioned_context(
        &self,
        query: &str,
        context: &MentionedContext,
        budget: usize,
    ) -> Result<MentionedContext, PackError> {
        Ok(self.compose(query, context, budget).await?.context)
    }

    /// Search every resource and document in the workspace and return one
    /// item per entity hit, its fragments assembled in source order.
    pub async fn process_whole_space(&self, query: &str) -> Result<Vec<WorkspaceItem>, PackError> {
        let chunks = self
            .search_relevant_chunks(
                query,
                Vec::new(),
                vec![SearchDomain::Resource, SearchDomain::Document],
                self.config.workspace_search_limit,
            )
            .await?;

        // Group by (domain, id), first hit decides the order.
        let mut groups: Vec<((SearchDomain, String), Vec<Fragment>)> = Vec::new();
        let mut positions: HashMap<(SearchDomain, String), usize> = HashMap::new();
        for chunk in chunks {
            let domain = chunk.metadata.domain().and_then(|d| d.parse::<SearchDomain>().ok());
            let (Some(domain), Some(id)) = (domain, chunk.id.clone()) else {
                tracing::debug!("workspace hit without domain or id dropped");
                continue;
            };
            let key = (domain, id);
            match positions.get(&key) {
                Some(&i) => groups[i].1.push(chunk),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![chunk]));
                }
            }
        }

        let separator = self.config.chunk_separator.as_str();
        let mut result = Vec::with_capacity(groups.len());
        for ((domain, id), fragments) in groups {
            let title = fragments.first().and_then(|f| f.metadata.title()).map(str::to_string);
            let url = fragments.first().and_then(|f| f.metadata.url()).map(str::to_string);
            let content = assemble_chunks_with(fragments, separator);

            match domain {
                SearchDomain::Resource => result.push(WorkspaceItem::Resource(ResourceItem {
                    resource_id: Some(id),
                    title,
                    content,
                    url,
                    metadata: Metadata::new(),
                })),
                SearchDomain::Document => result.push(WorkspaceItem::Document(DocumentItem {
                    doc_id: Some(id),
                    title,
                    content,
                    url,
                    metadata: Metadata::new(),
                })),
                SearchDomain::Project => {
                    tracing::debug!(id = %id, "project hit ignored in workspace mode");
                }
            }
        }

        tracing::info!(items = result.len(), "assembled whole-workspace context");

        Ok(result)
    }
}
