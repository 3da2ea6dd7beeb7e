use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const POSTS_COLLECTION: &str = "posts";

/// One localized title entry. Titles are ordered lists of these, and the
/// q-expression `title` field searches across every entry's `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub lang: String,
    pub value: String,
}

impl LocalizedText {
    #[must_use]
    pub fn new(lang: &str, value: &str) -> Self {
        Self { lang: lang.to_string(), value: value.to_string() }
    }
}

/// The primary board article record. Timestamps are epoch-millis strings;
/// `showedAt` defaults to `createdAt` and `updatedAt` equals `createdAt`
/// until the first accepted edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
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

impl Post {
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        doc! {
            "postId": &self.post_id,
            "category": &self.category,
            "title": title_to_bson(&self.title),
            "content": &self.content,
            "author": &self.author,
            "createdAt": &self.created_at,
            "updatedAt": &self.updated_at,
            "showedAt": &self.showed_at,
            "delYn": self.del_yn,
        }
    }

    /// # Errors
    /// `Store` when a required field is missing or mistyped.
    pub fn from_document(doc: &BsonDocument) -> Result<Self, Error> {
        Ok(Self {
            post_id: read_str(doc, "postId")?,
            category: read_str(doc, "category")?,
            title: title_from_bson(doc.get("title"))?,
            content: read_str(doc, "content")?,
            author: read_str(doc, "author")?,
            created_at: read_str(doc, "createdAt")?,
            updated_at: read_str(doc, "updatedAt")?,
            showed_at: read_str(doc, "showedAt")?,
            del_yn: doc
                .get_bool("delYn")
                .map_err(|e| Error::Store(format!("delYn: {e}")))?,
        })
    }
}

pub(crate) fn read_str(doc: &BsonDocument, key: &str) -> Result<String, Error> {
    doc.get_str(key).map(str::to_string).map_err(|e| Error::Store(format!("{key}: {e}")))
}

pub(crate) fn title_to_bson(title: &[LocalizedText]) -> Bson {
    Bson::Array(
        title
            .iter()
            .map(|t| Bson::Document(doc! {"lang": &t.lang, "value": &t.value}))
            .collect(),
    )
}

pub(crate) fn title_from_bson(value: Option<&Bson>) -> Result<Vec<LocalizedText>, Error> {
    let Some(Bson::Array(items)) = value else {
        return Err(Error::Store("title: expected array".to_string()));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => {
                Ok(LocalizedText { lang: read_str(d, "lang")?, value: read_str(d, "value")? })
            }
            other => Err(Error::Store(format!("title entry: expected document, got {other}"))),
        })
        .collect()
}
