//! Retrieval index interface and wire types.
//!
//! The retrieve protocol uses PascalCase keys on the wire. The full result
//! is serialized back to JSON when it is embedded as grounding context, so
//! the types round-trip unknown fields instead of dropping them.

pub mod kendra;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One passage returned by a retrieve query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetrievedPassage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        rename = "DocumentURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub document_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from a retrieve query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveResult {
    #[serde(rename = "ResultItems", default)]
    pub result_items: Vec<RetrievedPassage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Abstract interface to a retrieval index.
#[async_trait]
pub trait RetrievalIndex: Send + Sync {
    /// Run one retrieve query and return the matching passages.
    async fn retrieve(&self, query: &str) -> Result<RetrieveResult>;
}
