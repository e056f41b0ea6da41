use crate::item::ContextEntry;
use crate::search::SearchService;
use crate::types::context_bundle::{Inclusion, PackDecision, PackError, PackResult};

use super::chunks::{assemble_chunks_with, fit_chunks};
use super::tokens::TokenCounter;
use super::ContextPacker;

fn include<I: ContextEntry>(result: &mut PackResult<I>, item: I, decision: PackDecision) {
    tracing::debug!(
        kind = I::KIND.as_str(),
        rank = decision.rank,
        entity_id = decision.entity_id.as_deref().unwrap_or("-"),
        inclusion = ?decision.inclusion,
        source_tokens = decision.source_tokens,
        tokens = decision.tokens,
        "packed item"
    );
    result.tokens_used += decision.tokens;
    result.decisions.push(decision);
    result.items.push(item);
}

impl<S, T> ContextPacker<S, T>
where
    S: SearchService,
    T: TokenCounter,
{
    /// Pack one category of items into `budget` tokens.
    ///
    /// Items are ranked, then walked twice. The relevance pass keeps small
    /// items whole up to the primary cutoff and replaces oversized ones with
    /// their retrieved fragments; it stops at the first item that does not
    /// fit. The remainder pass keeps every short item and squeezes the rest
    /// into whatever budget is left.
    ///
    /// Oversized items in the relevance pass are recalled without checking
    /// the budget first, so `tokens_used` can end up above the cutoff (or the
    /// budget) by one item's fragments. Items the ranking could not map back
    /// (no id) count as considered and dropped.
    pub async fn pack<I: ContextEntry>(
        &self,
        query: &str,
        items: &[I],
        budget: usize,
    ) -> Result<PackResult<I>, PackError> {
        let ratios = self.config.ratios_for(I::KIND);
        let primary_cutoff = ratios.primary_cutoff(budget);
        let mut result = PackResult::empty(budget, primary_cutoff, ratios.short_cap(budget));

        if items.is_empty() {
            return Ok(result);
        }

        // 1. Ranking phase
        let ranked = self.rank(query, items).await?;
        result.items_considered = items.len();

        let separator = self.config.chunk_separator.as_str();
        let mut next = 0;

        // 2. Relevance pass
        while next < ranked.len() {
            let item = &ranked[next];
            let tokens = self.count_tokens(item.content());

            if tokens > self.config.need_recall_tokens || !item.use_whole_content() {
                let chunks = self.retrieve(query, item).await?;
                let relevant = assemble_chunks_with(chunks, separator);
                let relevant_tokens = self.count_tokens(&relevant);
                let decision = PackDecision {
                    rank: next,
                    entity_id: item.entity_id().map(str::to_string),
                    inclusion: Inclusion::Recalled,
                    source_tokens: tokens,
                    tokens: relevant_tokens,
                };
                include(&mut result, item.with_content(relevant), decision);
            } else if result.tokens_used + tokens <= primary_cutoff {
                let decision = PackDecision {
                    rank: next,
                    entity_id: item.entity_id().map(str::to_string),
                    inclusion: Inclusion::Whole,
                    source_tokens: tokens,
                    tokens,
                };
                include(&mut result, item.clone(), decision);
            } else {
                // Ranked order: everything after this is less relevant.
                break;
            }

            next += 1;
            if result.tokens_used >= primary_cutoff {
                break;
            }
        }

        // 3. Remainder pass
        while next < ranked.len() {
            let item = &ranked[next];
            let tokens = self.count_tokens(item.content());

            if tokens < self.config.short_content_threshold {
                let decision = PackDecision {
                    rank: next,
                    entity_id: item.entity_id().map(str::to_string),
                    inclusion: Inclusion::Short,
                    source_tokens: tokens,
                    tokens,
                };
                include(&mut result, item.clone(), decision);
            } else {
                let remaining_tokens = budget.saturating_sub(result.tokens_used);
                let chunks = self.retrieve(query, item).await?;
                let chunks = fit_chunks(chunks, remaining_tokens, separator, &self.tokenizer);
                let relevant = assemble_chunks_with(chunks, separator);
                let relevant_tokens = self.count_tokens(&relevant);
                let decision = PackDecision {
                    rank: next,
                    entity_id: item.entity_id().map(str::to_string),
                    inclusion: Inclusion::RecalledWithinBudget,
                    source_tokens: tokens,
                    tokens: relevant_tokens,
                };
                include(&mut result, item.with_content(relevant), decision);
            }

            next += 1;
            if result.tokens_used >= budget {
                break;
            }
        }

        result.items_dropped = result.items_considered - result.items.len();

        tracing::info!(
            kind = I::KIND.as_str(),
            budget,
            primary_cutoff,
            tokens_used = result.tokens_used,
            considered = result.items_considered,
            included = result.items.len(),
            dropped = result.items_dropped,
            "packed category"
        );

        Ok(result)
    }
}
