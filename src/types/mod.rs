pub mod context_bundle;
pub mod identifiers;

pub use context_bundle::{
    CategorySummary, ComposedContext, CompositionSummary, Inclusion, MentionedContext, PackDecision,
    PackError, PackResult,
};
pub use identifiers::{Entity, SearchDomain, User};
