use serde::{Deserialize, Serialize};

use crate::item::{ContentItem, DocumentItem, ResourceItem};
use crate::search::SearchError;

/// Candidate context gathered by the caller, one list per category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionedContext {
    #[serde(default)]
    pub content_list: Vec<ContentItem>,
    #[serde(default)]
    pub resources: Vec<ResourceItem>,
    #[serde(default)]
    pub documents: Vec<DocumentItem>,
}

impl MentionedContext {
    pub fn is_empty(&self) -> bool {
        self.content_list.is_empty() && self.resources.is_empty() && self.documents.is_empty()
    }
}

/// How an item made it into the packed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusion {
    /// Relevance pass, included unmodified.
    Whole,
    /// Relevance pass, oversized or not marked whole: replaced by all retrieved fragments.
    Recalled,
    /// Remainder pass, short enough to keep unmodified.
    Short,
    /// Remainder pass, replaced by the retrieved fragments that fit the remaining budget.
    RecalledWithinBudget,
}

/// Explanation for one packed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDecision {
    /// Position of the item in ranked order.
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub inclusion: Inclusion,
    /// Tokens of the item as it entered the packer.
    pub source_tokens: usize,
    /// Tokens charged against the budget.
    pub tokens: usize,
}

/// The outcome of packing one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackResult<I> {
    pub items: Vec<I>,
    pub decisions: Vec<PackDecision>,
    pub budget: usize,
    pub primary_cutoff: usize,
    /// Documented only; the remainder pass does not enforce it.
    pub short_cap: usize,
    /// Can exceed `budget` through an item recalled in the relevance pass or
    /// through short items, which the remainder pass keeps unconditionally.
    /// Remainder-pass recalls are fitted to what is left, gap markers included.
    pub tokens_used: usize,
    /// Every candidate handed in, including those lost during ranking.
    pub items_considered: usize,
    pub items_dropped: usize,
}

impl<I> PackResult<I> {
    pub fn empty(budget: usize, primary_cutoff: usize, short_cap: usize) -> Self {
        Self {
            items: Vec::new(),
            decisions: Vec::new(),
            budget,
            primary_cutoff,
            short_cap,
            tokens_used: 0,
            items_considered: 0,
            items_dropped: 0,
        }
    }
}

/// Per-category summary of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub budget: usize,
    pub tokens_used: usize,
    pub items_considered: usize,
    pub items_included: usize,
}

impl<I> From<&PackResult<I>> for CategorySummary {
    fn from(result: &PackResult<I>) -> Self {
        Self {
            budget: result.budget,
            tokens_used: result.tokens_used,
            items_considered: result.items_considered,
            items_included: result.items.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    pub budget: usize,
    pub content: CategorySummary,
    pub resources: CategorySummary,
    pub documents: CategorySummary,
}

impl CompositionSummary {
    pub fn tokens_used(&self) -> usize {
        self.content.tokens_used + self.resources.tokens_used + self.documents.tokens_used
    }
}

/// The packed context and how it was packed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedContext {
    pub context: MentionedContext,
    pub summary: CompositionSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Ranking failed: {0}")]
    Ranking(#[source] SearchError),

    #[error("Fragment retrieval failed: {0}")]
    Retrieval(#[source] SearchError),
}
