pub mod budgeting;
pub mod chunks;
pub mod composer;
pub mod ranking;
pub mod retrieval;
pub mod tokens;

use crate::config::PackingConfig;
use crate::search::SearchService;
use crate::types::identifiers::User;

pub use chunks::{assemble_chunks, assemble_chunks_with, fit_chunks, truncate_chunks};
pub use tokens::{truncate_text, ApproxTokenCounter, TokenCounter};

/// Ranks, recalls and packs candidate context into token budgets.
///
/// Holds no mutable state: every call keeps its own accumulator, so one
/// packer can serve concurrent requests for the same user.
pub struct ContextPacker<S, T> {
    search: S,
    tokenizer: T,
    config: PackingConfig,
    user: User,
}

impl<S> ContextPacker<S, ApproxTokenCounter>
where
    S: SearchService,
{
    pub fn with_defaults(search: S, user: User) -> Self {
        Self::new(search, ApproxTokenCounter, PackingConfig::default(), user)
    }
}

impl<S, T> ContextPacker<S, T>
where
    S: SearchService,
    T: TokenCounter,
{
    pub fn new(search: S, tokenizer: T, config: PackingConfig, user: User) -> Self {
        Self {
            search,
            tokenizer,
            config,
            user,
        }
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub(crate) fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.count_tokens(text)
    }
}
