use bson::{Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::post::{LocalizedText, read_str, title_from_bson, title_to_bson};

pub const TRACES_COLLECTION: &str = "traces";

/// Immutable snapshot of a post as it was before an accepted edit.
///
/// `version` is a numeric string allocated from the per-post trace sequence;
/// `editedAt` carries the post's prior `updatedAt`. Traces are written once
/// and never mutated or deleted by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub version: String,
    pub title: Vec<LocalizedText>,
    pub content: String,
    pub editor: String,
    pub edited_at: String,
    pub post_id: String,
}

impl Trace {
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        doc! {
            "version": &self.version,
            "title": title_to_bson(&self.title),
            "content": &self.content,
            "editor": &self.editor,
            "editedAt": &self.edited_at,
            "postId": &self.post_id,
        }
    }

    /// # Errors
    /// `Store` when a required field is missing or mistyped.
    pub fn from_document(doc: &BsonDocument) -> Result<Self, Error> {
        Ok(Self {
            version: read_str(doc, "version")?,
            title: title_from_bson(doc.get("title"))?,
            content: read_str(doc, "content")?,
            editor: read_str(doc, "editor")?,
            edited_at: read_str(doc, "editedAt")?,
            post_id: read_str(doc, "postId")?,
        })
    }
}
