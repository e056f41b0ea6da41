use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Index domain an entity or search hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDomain {
    Resource,
    Document,
    Project,
}

impl SearchDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDomain::Resource => "resource",
            SearchDomain::Document => "document",
            SearchDomain::Project => "project",
        }
    }
}

impl fmt::Display for SearchDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown search domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for SearchDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource" => Ok(SearchDomain::Resource),
            "document" => Ok(SearchDomain::Document),
            "project" => Ok(SearchDomain::Project),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

/// Reference to a persisted, indexed entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub entity_id: String,
    pub entity_type: SearchDomain,
}

impl Entity {
    pub fn new(entity_id: impl Into<String>, entity_type: SearchDomain) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_type,
        }
    }
}

/// The principal on whose behalf collaborator calls are made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}
