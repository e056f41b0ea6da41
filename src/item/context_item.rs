use serde::{Deserialize, Serialize};

use super::fragment::Fragment;
use super::metadata::{keys, Metadata};
use crate::search::IndexDocument;
use crate::types::identifiers::{Entity, SearchDomain};

/// The three categories of candidate context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Content,
    Document,
    Resource,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Content => "content",
            ItemKind::Document => "document",
            ItemKind::Resource => "resource",
        }
    }
}

/// Where the fragments of an oversized item come from.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalTarget<'a> {
    /// The item lives in the persisted index and is addressed by id.
    Indexed(Entity),
    /// The item is indexed on the fly from its own text.
    AdHoc {
        content: &'a str,
        entity_id: Option<&'a str>,
        title: Option<&'a str>,
        entity_type: Option<&'a str>,
    },
}

/// Accessors the packer needs from every item category.
pub trait ContextEntry: Clone + Send + Sync {
    const KIND: ItemKind;

    fn content(&self) -> &str;

    fn metadata(&self) -> &Metadata;

    /// Stable identity used to correlate ranked results; content items have none.
    fn entity_id(&self) -> Option<&str>;

    fn title(&self) -> Option<&str>;

    /// Same item, same identity, different text.
    fn with_content(&self, content: String) -> Self;

    /// Representation handed to the ranking search. `page_content` is the
    /// already truncated text.
    fn to_index_document(&self, page_content: String) -> IndexDocument;

    /// Map a ranked search result back to an item, or `None` if it matches nothing.
    fn from_ranked(ranked: &Fragment, candidates: &[Self]) -> Option<Self>;

    fn retrieval_target(&self) -> RetrievalTarget<'_>;

    fn use_whole_content(&self) -> bool {
        self.metadata().use_whole_content()
    }
}

/// Free-floating text with no persisted entity behind it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ContentItem {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

impl ContextEntry for ContentItem {
    const KIND: ItemKind = ItemKind::Content;

    fn content(&self) -> &str {
        &self.content
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn entity_id(&self) -> Option<&str> {
        None
    }

    fn title(&self) -> Option<&str> {
        self.metadata.title()
    }

    fn with_content(&self, content: String) -> Self {
        Self {
            content,
            metadata: self.metadata.clone(),
        }
    }

    fn to_index_document(&self, page_content: String) -> IndexDocument {
        let mut metadata = self.metadata.clone();
        let node_type = self.metadata.get_str(keys::ENTITY_TYPE).map(str::to_string);
        metadata.set_optional_string(keys::NODE_TYPE, node_type.as_deref());
        IndexDocument {
            page_content,
            metadata,
        }
    }

    // No id to join on: the result itself is the item.
    fn from_ranked(ranked: &Fragment, _candidates: &[Self]) -> Option<Self> {
        Some(Self {
            content: ranked.text.clone(),
            metadata: ranked.metadata.clone(),
        })
    }

    fn retrieval_target(&self) -> RetrievalTarget<'_> {
        RetrievalTarget::AdHoc {
            content: &self.content,
            entity_id: self.metadata.entity_id(),
            title: self.metadata.title(),
            entity_type: self.metadata.domain(),
        }
    }
}

/// A document from the knowledge base.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl DocumentItem {
    pub fn new(doc_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            doc_id: Some(doc_id.into()),
            title: Some(title.into()),
            content: content.into(),
            url: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl ContextEntry for DocumentItem {
    const KIND: ItemKind = ItemKind::Document;

    fn content(&self) -> &str {
        &self.content
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn entity_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn with_content(&self, content: String) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    fn to_index_document(&self, page_content: String) -> IndexDocument {
        let mut metadata = self.metadata.clone();
        metadata.set_optional_string(keys::TITLE, self.title.as_deref());
        metadata.insert_string(keys::NODE_TYPE, ItemKind::Document.as_str());
        metadata.set_optional_string(keys::DOC_ID, self.doc_id.as_deref());
        IndexDocument {
            page_content,
            metadata,
        }
    }

    fn from_ranked(ranked: &Fragment, candidates: &[Self]) -> Option<Self> {
        let id = ranked.metadata.get_str(keys::DOC_ID)?;
        candidates
            .iter()
            .find(|doc| doc.doc_id.as_deref() == Some(id))
            .cloned()
    }

    fn retrieval_target(&self) -> RetrievalTarget<'_> {
        match &self.doc_id {
            Some(id) => RetrievalTarget::Indexed(Entity::new(id.clone(), SearchDomain::Document)),
            None => RetrievalTarget::AdHoc {
                content: &self.content,
                entity_id: None,
                title: self.title.as_deref(),
                entity_type: Some(ItemKind::Document.as_str()),
            },
        }
    }
}

/// A resource (web page, uploaded file, ...) from the knowledge base.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ResourceItem {
    pub fn new(
        resource_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            title: Some(title.into()),
            content: content.into(),
            url: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl ContextEntry for ResourceItem {
    const KIND: ItemKind = ItemKind::Resource;

    fn content(&self) -> &str {
        &self.content
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn entity_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn with_content(&self, content: String) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    fn to_index_document(&self, page_content: String) -> IndexDocument {
        let mut metadata = self.metadata.clone();
        metadata.set_optional_string(keys::TITLE, self.title.as_deref());
        metadata.insert_string(keys::NODE_TYPE, ItemKind::Resource.as_str());
        metadata.set_optional_string(keys::RESOURCE_ID, self.resource_id.as_deref());
        IndexDocument {
            page_content,
            metadata,
        }
    }

    fn from_ranked(ranked: &Fragment, candidates: &[Self]) -> Option<Self> {
        let id = ranked.metadata.get_str(keys::RESOURCE_ID)?;
        candidates
            .iter()
            .find(|res| res.resource_id.as_deref() == Some(id))
            .cloned()
    }

    fn retrieval_target(&self) -> RetrievalTarget<'_> {
        match &self.resource_id {
            Some(id) => RetrievalTarget::Indexed(Entity::new(id.clone(), SearchDomain::Resource)),
            None => RetrievalTarget::AdHoc {
                content: &self.content,
                entity_id: None,
                title: self.title.as_deref(),
                entity_type: Some(ItemKind::Resource.as_str()),
            },
        }
    }
}

/// One entry produced by whole-workspace search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceItem {
    Resource(ResourceItem),
    Document(DocumentItem),
}

impl WorkspaceItem {
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            WorkspaceItem::Resource(r) => r.entity_id(),
            WorkspaceItem::Document(d) => d.entity_id(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            WorkspaceItem::Resource(r) => &r.content,
            WorkspaceItem::Document(d) => &d.content,
        }
    }
}
