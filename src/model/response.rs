use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::post::{LocalizedText, read_str, title_from_bson};

/// Paginated post listing. `total` counts matches inside the requested page
/// window (see the planner notes), not across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub total: i64,
    pub posts: Vec<PostSummary>,
}

/// Projected post row inside a listing; `content` and `delYn` are excluded
/// by the list projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub post_id: String,
    pub category: String,
    pub title: Vec<LocalizedText>,
    pub author: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub showed_at: String,
}

impl PostSummary {
    /// # Errors
    /// `Store` when a projected field is missing or mistyped.
    pub fn from_document(doc: &BsonDocument) -> Result<Self, Error> {
        Ok(Self {
            post_id: read_str(doc, "postId")?,
            category: read_str(doc, "category")?,
            title: title_from_bson(doc.get("title"))?,
            author: read_str(doc, "author")?,
            created_at: read_str(doc, "createdAt")?,
            updated_at: doc.get_str("updatedAt").ok().map(str::to_string),
            showed_at: read_str(doc, "showedAt")?,
        })
    }
}

/// Full post as returned by the single-entity read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub post_id: String,
    pub category: String,
    pub title: Vec<LocalizedText>,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
    pub showed_at: String,
    pub del_yn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdResponse {
    pub post_id: String,
}

/// Returned by updates: the post and the trace version minted for the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostVersionResponse {
    pub post_id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceListResponse {
    pub post_id: String,
    pub total: i64,
    pub traces: Vec<TraceSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    pub version: String,
    pub title: Vec<LocalizedText>,
    pub editor: String,
    pub edited_at: String,
}

impl TraceSummary {
    /// # Errors
    /// `Store` when a field is missing or mistyped.
    pub fn from_document(doc: &BsonDocument) -> Result<Self, Error> {
        Ok(Self {
            version: read_str(doc, "version")?,
            title: title_from_bson(doc.get("title"))?,
            editor: read_str(doc, "editor")?,
            edited_at: read_str(doc, "editedAt")?,
        })
    }
}

/// Full trace as returned by the single-version read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResponse {
    pub version: String,
    pub title: Vec<LocalizedText>,
    pub content: String,
    pub editor: String,
    pub edited_at: String,
    pub post_id: String,
}
