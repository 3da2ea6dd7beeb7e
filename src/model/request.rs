use serde::{Deserialize, Serialize};

use super::post::LocalizedText;

/// Inbound payload for post creation. All fields optional at the wire level;
/// presence and format are checked by `service::validate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub category: Option<String>,
    pub title: Option<Vec<LocalizedText>>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub showed_at: Option<String>,
}

/// Inbound payload for post mutation. `author` is required (the editor is
/// always recorded); absent title/content leave the stored values untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<Vec<LocalizedText>>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub del_yn: Option<bool>,
}
