use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::db::models::Hobby;
use crate::error::AppError;

/// Partial update of a hobby card.
#[derive(Debug, Clone, Default)]
pub struct HobbyUpdate {
    pub category: Option<String>,
    pub headline: Option<String>,
    pub image: Option<String>,
    pub order: Option<i32>,
}

impl HobbyUpdate {
    pub fn apply(self, hobby: &mut Hobby) {
        if let Some(category) = self.category {
            hobby.category = category;
        }
        if let Some(headline) = self.headline {
            hobby.headline = headline;
        }
        if let Some(image) = self.image {
            hobby.image = image;
        }
        if let Some(order) = self.order {
            hobby.order = order;
        }
    }

    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(category) = &self.category {
            set.insert("category", category.as_str());
        }
        if let Some(headline) = &self.headline {
            set.insert("headline", headline.as_str());
        }
        if let Some(image) = &self.image {
            set.insert("image", image.as_str());
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        set
    }
}

/// Repository trait for hobby cards.
#[async_trait]
pub trait HobbyRepository: Send + Sync {
    /// All hobbies by ascending `order`, newest first within an order.
    async fn list(&self) -> Result<Vec<Hobby>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Hobby>, AppError>;

    async fn create(&self, hobby: Hobby) -> Result<Hobby, AppError>;

    async fn update(&self, id: ObjectId, update: HobbyUpdate) -> Result<Hobby, AppError>;

    async fn delete(&self, id: ObjectId) -> Result<(), AppError>;
}

pub(crate) fn hobby_not_found(id: &ObjectId) -> AppError {
    AppError::NotFound(format!("Hobby '{}' not found", id.to_hex()))
}

/// MongoDB implementation of the HobbyRepository.
pub struct MongoHobbyRepository {
    collection: mongodb::Collection<Hobby>,
}

impl MongoHobbyRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("hobbies"),
        }
    }
}

#[async_trait]
impl HobbyRepository for MongoHobbyRepository {
    async fn list(&self) -> Result<Vec<Hobby>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "order": 1, "created_at": -1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Hobby>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn create(&self, mut hobby: Hobby) -> Result<Hobby, AppError> {
        hobby.id = Some(ObjectId::new());
        self.collection.insert_one(&hobby).await?;
        Ok(hobby)
    }

    async fn update(&self, id: ObjectId, update: HobbyUpdate) -> Result<Hobby, AppError> {
        use mongodb::options::ReturnDocument;

        let set = update.to_set_document();
        if set.is_empty() {
            // `$set` rejects an empty document.
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await?
                .ok_or_else(|| hobby_not_found(&id));
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| hobby_not_found(&id))
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(hobby_not_found(&id));
        }
        Ok(())
    }
}
