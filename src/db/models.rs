use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default blog category when none is supplied.
pub const DEFAULT_BLOG_CATEGORY: &str = "DevOps";

/// Default CV version label when none is supplied.
pub const DEFAULT_CV_VERSION: &str = "1.0";

/// Parse a hex identifier coming from a URL path.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid id '{}'", id)))
}

/// A blog post stored in the `blogs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    /// Raw Markdown body.
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Public path of the cover image, if any.
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// An uploaded CV document stored in the `cvs` collection.
///
/// At most one CV carries `active = true`; see [`crate::db::cv_repository`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cv {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Name of the file as uploaded by the admin.
    pub filename: String,
    /// Public path of the stored file.
    pub filepath: String,
    pub version: String,
    pub active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub uploaded_at: DateTime<Utc>,
}

impl Cv {
    /// Build a not-yet-persisted CV record. The register decides `active`.
    pub fn new(filename: String, filepath: String, version: Option<String>) -> Self {
        Self {
            id: None,
            filename,
            filepath,
            version: version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CV_VERSION.to_string()),
            active: false,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hobby {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub category: String,
    pub headline: String,
    pub image: String,
    #[serde(default)]
    pub order: i32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// An inspirational quote with public like/share counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub text: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Which quote counter an increment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Shares,
}

impl Counter {
    /// Name of the stored field backing this counter.
    pub fn field(&self) -> &'static str {
        match self {
            Counter::Likes => "likes",
            Counter::Shares => "shares",
        }
    }
}

/// The single administrative account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
