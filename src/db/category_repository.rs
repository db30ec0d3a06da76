use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::db::models::Category;
use crate::error::AppError;

/// Partial update of a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub order: Option<i32>,
}

impl CategoryUpdate {
    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(order) = self.order {
            category.order = order;
        }
    }

    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        set
    }
}

/// Repository trait for blog categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories by ascending `order`, then name.
    async fn list(&self) -> Result<Vec<Category>, AppError>;

    async fn create(&self, category: Category) -> Result<Category, AppError>;

    async fn update(&self, id: ObjectId, update: CategoryUpdate) -> Result<Category, AppError>;

    async fn delete(&self, id: ObjectId) -> Result<(), AppError>;
}

pub(crate) fn category_not_found(id: &ObjectId) -> AppError {
    AppError::NotFound(format!("Category '{}' not found", id.to_hex()))
}

/// MongoDB implementation of the CategoryRepository.
pub struct MongoCategoryRepository {
    collection: mongodb::Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("categories"),
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "order": 1, "name": 1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn create(&self, mut category: Category) -> Result<Category, AppError> {
        category.id = Some(ObjectId::new());
        self.collection.insert_one(&category).await?;
        Ok(category)
    }

    async fn update(&self, id: ObjectId, update: CategoryUpdate) -> Result<Category, AppError> {
        use mongodb::options::ReturnDocument;

        let set = update.to_set_document();
        if set.is_empty() {
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await?
                .ok_or_else(|| category_not_found(&id));
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| category_not_found(&id))
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(category_not_found(&id));
        }
        Ok(())
    }
}
