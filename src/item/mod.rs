pub mod context_item;
pub mod fragment;
pub mod metadata;

pub use context_item::{
    ContentItem, ContextEntry, DocumentItem, ItemKind, ResourceItem, RetrievalTarget, WorkspaceItem,
};
pub use fragment::Fragment;
pub use metadata::{keys, Metadata, MetadataValue};
