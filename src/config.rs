//! Packing thresholds and budget ratios.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. Ratios are integer percentages to keep budget splits exact.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::ItemKind;
use crate::selection::chunks::CHUNK_SEPARATOR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `floor(budget * percent / 100)`.
pub fn percent_of(budget: usize, percent: u32) -> usize {
    let scaled = budget as u128 * u128::from(percent) / 100;
    usize::try_from(scaled).unwrap_or(usize::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingConfig {
    /// Items above this many tokens are always reduced to fragments.
    #[serde(default = "default_need_recall_tokens")]
    pub need_recall_tokens: usize,
    /// Text handed to the ranking search is clipped to this many tokens.
    #[serde(default = "default_rank_truncate_tokens")]
    pub rank_truncate_tokens: usize,
    /// Items below this many tokens are kept whole in the remainder pass.
    #[serde(default = "default_short_content_threshold")]
    pub short_content_threshold: usize,
    #[serde(default)]
    pub content: CategoryRatios,
    #[serde(default)]
    pub documents: CategoryRatios,
    #[serde(default)]
    pub resources: CategoryRatios,
    #[serde(default)]
    pub shares: BudgetShares,
    /// Fragments requested per recalled item.
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,
    /// Fragments requested by whole-workspace search.
    #[serde(default = "default_workspace_search_limit")]
    pub workspace_search_limit: usize,
    #[serde(default = "default_chunk_separator")]
    pub chunk_separator: String,
    /// Joins the snippets of one search hit into a fragment.
    #[serde(default = "default_snippet_separator")]
    pub snippet_separator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRatios {
    /// Share of a category budget available to the relevance pass.
    #[serde(default = "default_primary_percent")]
    pub primary_percent: u32,
    /// Share reserved for short items. Reported, not enforced.
    #[serde(default = "default_short_percent")]
    pub short_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetShares {
    #[serde(default = "default_content_percent")]
    pub content_percent: u32,
    #[serde(default = "default_resource_percent")]
    pub resource_percent: u32,
    #[serde(default = "default_document_percent")]
    pub document_percent: u32,
}

fn default_need_recall_tokens() -> usize {
    4096
}

fn default_rank_truncate_tokens() -> usize {
    4096
}

fn default_short_content_threshold() -> usize {
    100
}

fn default_primary_percent() -> u32 {
    70
}

fn default_short_percent() -> u32 {
    30
}

fn default_content_percent() -> u32 {
    40
}

fn default_resource_percent() -> u32 {
    30
}

fn default_document_percent() -> u32 {
    30
}

fn default_retrieval_limit() -> usize {
    10
}

fn default_workspace_search_limit() -> usize {
    10
}

fn default_chunk_separator() -> String {
    CHUNK_SEPARATOR.to_string()
}

fn default_snippet_separator() -> String {
    "\n\n".to_string()
}

impl Default for CategoryRatios {
    fn default() -> Self {
        Self {
            primary_percent: default_primary_percent(),
            short_percent: default_short_percent(),
        }
    }
}

impl CategoryRatios {
    pub fn primary_cutoff(&self, budget: usize) -> usize {
        percent_of(budget, self.primary_percent)
    }

    pub fn short_cap(&self, budget: usize) -> usize {
        percent_of(budget, self.short_percent)
    }
}

impl Default for BudgetShares {
    fn default() -> Self {
        Self {
            content_percent: default_content_percent(),
            resource_percent: default_resource_percent(),
            document_percent: default_document_percent(),
        }
    }
}

/// Token budget for each category of a mentioned context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudgets {
    pub content: usize,
    pub resources: usize,
    pub documents: usize,
}

impl BudgetShares {
    pub fn split(&self, total: usize) -> CategoryBudgets {
        CategoryBudgets {
            content: percent_of(total, self.content_percent),
            resources: percent_of(total, self.resource_percent),
            documents: percent_of(total, self.document_percent),
        }
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            need_recall_tokens: default_need_recall_tokens(),
            rank_truncate_tokens: default_rank_truncate_tokens(),
            short_content_threshold: default_short_content_threshold(),
            content: CategoryRatios::default(),
            documents: CategoryRatios::default(),
            resources: CategoryRatios::default(),
            shares: BudgetShares::default(),
            retrieval_limit: default_retrieval_limit(),
            workspace_search_limit: default_workspace_search_limit(),
            chunk_separator: default_chunk_separator(),
            snippet_separator: default_snippet_separator(),
        }
    }
}

impl PackingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PackingConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn ratios_for(&self, kind: ItemKind) -> &CategoryRatios {
        match kind {
            ItemKind::Content => &self.content,
            ItemKind::Document => &self.documents,
            ItemKind::Resource => &self.resources,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, ratios) in [
            ("content", &self.content),
            ("documents", &self.documents),
            ("resources", &self.resources),
        ] {
            if ratios.primary_percent > 100 || ratios.short_percent > 100 {
                return Err(ConfigError::Invalid(format!(
                    "{name}: percentages must be within 0..=100"
                )));
            }
        }

        let shares = self
            .shares
            .content_percent
            .saturating_add(self.shares.resource_percent)
            .saturating_add(self.shares.document_percent);
        if shares > 100 {
            return Err(ConfigError::Invalid(format!(
                "category shares add up to {shares}%, more than the whole budget"
            )));
        }

        if self.retrieval_limit == 0 || self.workspace_search_limit == 0 {
            return Err(ConfigError::Invalid("search limits must be positive".into()));
        }

        Ok(())
    }
}
