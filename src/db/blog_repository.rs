use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use chrono::{DateTime, Utc};

use crate::db::models::Blog;
use crate::error::AppError;

/// Partial update of a blog post. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl BlogUpdate {
    /// Apply the update to an in-memory blog, bumping `updated_at`.
    pub fn apply(self, blog: &mut Blog, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(content) = self.content {
            blog.content = content;
        }
        if let Some(excerpt) = self.excerpt {
            blog.excerpt = Some(excerpt);
        }
        if let Some(image) = self.image {
            blog.image = Some(image);
        }
        if let Some(category) = self.category {
            blog.category = category;
        }
        if let Some(tags) = self.tags {
            blog.tags = tags;
        }
        if let Some(published) = self.published {
            blog.published = published;
        }
        blog.updated_at = now;
    }

    /// The `$set` document equivalent of [`BlogUpdate::apply`].
    pub fn to_set_document(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(now) };
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(content) = &self.content {
            set.insert("content", content.as_str());
        }
        if let Some(excerpt) = &self.excerpt {
            set.insert("excerpt", excerpt.as_str());
        }
        if let Some(image) = &self.image {
            set.insert("image", image.as_str());
        }
        if let Some(category) = &self.category {
            set.insert("category", category.as_str());
        }
        if let Some(tags) = &self.tags {
            set.insert("tags", tags.clone());
        }
        if let Some(published) = self.published {
            set.insert("published", published);
        }
        set
    }
}

/// Repository trait for blog posts.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List blogs, newest first. Drafts are skipped unless `include_drafts`.
    async fn list(&self, include_drafts: bool) -> Result<Vec<Blog>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError>;

    /// Persist a new blog and return it with its assigned id.
    async fn create(&self, blog: Blog) -> Result<Blog, AppError>;

    async fn update(&self, id: ObjectId, update: BlogUpdate) -> Result<Blog, AppError>;

    async fn delete(&self, id: ObjectId) -> Result<(), AppError>;
}

pub(crate) fn blog_not_found(id: &ObjectId) -> AppError {
    AppError::NotFound(format!("Blog '{}' not found", id.to_hex()))
}

/// MongoDB implementation of the BlogRepository.
pub struct MongoBlogRepository {
    collection: mongodb::Collection<Blog>,
}

impl MongoBlogRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("blogs"),
        }
    }
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    async fn list(&self, include_drafts: bool) -> Result<Vec<Blog>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let filter = if include_drafts {
            doc! {}
        } else {
            doc! { "published": true }
        };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn create(&self, mut blog: Blog) -> Result<Blog, AppError> {
        blog.id = Some(ObjectId::new());
        self.collection.insert_one(&blog).await?;
        Ok(blog)
    }

    async fn update(&self, id: ObjectId, update: BlogUpdate) -> Result<Blog, AppError> {
        use mongodb::options::ReturnDocument;

        let set = update.to_set_document(Utc::now());
        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| blog_not_found(&id))
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(blog_not_found(&id));
        }
        Ok(())
    }
}
