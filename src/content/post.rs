//! Post model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::frontmatter::PostMeta;
use super::reading_time::ReadingTime;
use super::serializer::SerializedContent;
use super::ContentError;

/// One piece of long-form content, built fresh for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,

    pub description: String,

    /// Date as written in the front-matter
    pub date: String,

    pub author: String,

    /// Filename without the `.mdx` extension
    pub slug: String,

    /// Serialized render tree (opaque JSON)
    pub content: String,

    /// e.g. "4 min read"
    pub reading_time: String,

    pub image: String,

    /// Parsed `date`, used for ordering
    #[serde(skip)]
    pub published: Option<NaiveDateTime>,
}

impl Post {
    pub fn new(meta: PostMeta, slug: String, content: String, reading_time: ReadingTime) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            date: meta.date,
            author: meta.author,
            slug,
            content,
            reading_time: reading_time.text,
            image: meta.image,
            published: Some(meta.published),
        }
    }

    /// Decode the stored render tree
    pub fn serialized(&self) -> Result<SerializedContent, ContentError> {
        SerializedContent::from_json(&self.content)
    }

    /// Re-hydrate the stored render tree into HTML
    pub fn content_html(&self) -> Result<String, ContentError> {
        Ok(self.serialized()?.to_html())
    }
}
