//! JSON shapes returned by the HTTP API.
//!
//! Stored models use snake_case and native BSON types; the wire format uses
//! camelCase keys, a hex `_id` and RFC 3339 timestamps.

use bson::oid::ObjectId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::db::models::{Blog, Category, Cv, Hobby, Quote};

fn hex(id: &Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

fn rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `{ "message": "..." }` acknowledgement for deletions.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Rendered body, only on the detail endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: hex(&blog.id),
            created_at: rfc3339(&blog.created_at),
            updated_at: rfc3339(&blog.updated_at),
            title: blog.title,
            content: blog.content,
            content_html: None,
            excerpt: blog.excerpt,
            image: blog.image,
            category: blog.category,
            tags: blog.tags,
            published: blog.published,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
    pub filepath: String,
    pub version: String,
    pub active: bool,
    pub uploaded_at: String,
}

impl From<Cv> for CvResponse {
    fn from(cv: Cv) -> Self {
        Self {
            id: hex(&cv.id),
            uploaded_at: rfc3339(&cv.uploaded_at),
            filename: cv.filename,
            filepath: cv.filepath,
            version: cv.version,
            active: cv.active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HobbyResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub category: String,
    pub headline: String,
    pub image: String,
    pub order: i32,
    pub created_at: String,
}

impl From<Hobby> for HobbyResponse {
    fn from(hobby: Hobby) -> Self {
        Self {
            id: hex(&hobby.id),
            created_at: rfc3339(&hobby.created_at),
            category: hobby.category,
            headline: hobby.headline,
            image: hobby.image,
            order: hobby.order,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub order: i32,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: hex(&category.id),
            created_at: rfc3339(&category.created_at),
            name: category.name,
            order: category.order,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub profile_image: Option<String>,
    pub likes: i64,
    pub shares: i64,
    pub active: bool,
    pub order: i32,
    pub created_at: String,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: hex(&quote.id),
            created_at: rfc3339(&quote.created_at),
            text: quote.text,
            profile_image: quote.profile_image,
            likes: quote.likes,
            shares: quote.shares,
            active: quote.active,
            order: quote.order,
        }
    }
}
