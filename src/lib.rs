//! Token-budgeted context packing for LLM prompts.
//!
//! `context-packer` takes the candidate context an agent has gathered
//! (free-text snippets, documents, resources), ranks each category against
//! the user's query and packs it into a fixed token budget. Each item is
//! kept whole, reduced to its most relevant fragments, or dropped. Ranking
//! and fragment recall go through an injected [`search::SearchService`];
//! token counting goes through [`selection::TokenCounter`].
//!
//! The entry point is [`selection::ContextPacker`].

pub mod config;
pub mod item;
pub mod search;
pub mod selection;
pub mod types;

pub use config::{ConfigError, PackingConfig};
pub use selection::ContextPacker;
pub use types::{MentionedContext, PackError, PackResult};
