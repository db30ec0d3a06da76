use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::db::models::{Counter, Quote};
use crate::error::AppError;

/// Partial update of a quote. Counters are not editable here.
#[derive(Debug, Clone, Default)]
pub struct QuoteUpdate {
    pub text: Option<String>,
    pub profile_image: Option<String>,
    pub active: Option<bool>,
    pub order: Option<i32>,
}

impl QuoteUpdate {
    pub fn apply(self, quote: &mut Quote) {
        if let Some(text) = self.text {
            quote.text = text;
        }
        if let Some(profile_image) = self.profile_image {
            quote.profile_image = Some(profile_image);
        }
        if let Some(active) = self.active {
            quote.active = active;
        }
        if let Some(order) = self.order {
            quote.order = order;
        }
    }

    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(text) = &self.text {
            set.insert("text", text.as_str());
        }
        if let Some(profile_image) = &self.profile_image {
            set.insert("profile_image", profile_image.as_str());
        }
        if let Some(active) = self.active {
            set.insert("active", active);
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        set
    }
}

/// Repository trait for quotes and their public counters.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// With `active_only`, active quotes by ascending `order` then newest
    /// first; otherwise every quote, newest first.
    async fn list(&self, active_only: bool) -> Result<Vec<Quote>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Quote>, AppError>;

    async fn create(&self, quote: Quote) -> Result<Quote, AppError>;

    async fn update(&self, id: ObjectId, update: QuoteUpdate) -> Result<Quote, AppError>;

    async fn delete(&self, id: ObjectId) -> Result<(), AppError>;

    /// Atomically add one to `counter` and return the updated quote.
    async fn increment(&self, id: ObjectId, counter: Counter) -> Result<Quote, AppError>;
}

pub(crate) fn quote_not_found(id: &ObjectId) -> AppError {
    AppError::NotFound(format!("Quote '{}' not found", id.to_hex()))
}

/// MongoDB implementation of the QuoteRepository.
pub struct MongoQuoteRepository {
    collection: mongodb::Collection<Quote>,
}

impl MongoQuoteRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("quotes"),
        }
    }
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Quote>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let (filter, sort) = if active_only {
            (doc! { "active": true }, doc! { "order": 1, "created_at": -1 })
        } else {
            (doc! {}, doc! { "created_at": -1, "_id": -1 })
        };
        let options = FindOptions::builder().sort(sort).build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Quote>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn create(&self, mut quote: Quote) -> Result<Quote, AppError> {
        quote.id = Some(ObjectId::new());
        self.collection.insert_one(&quote).await?;
        Ok(quote)
    }

    async fn update(&self, id: ObjectId, update: QuoteUpdate) -> Result<Quote, AppError> {
        use mongodb::options::ReturnDocument;

        let set = update.to_set_document();
        if set.is_empty() {
            return self
                .collection
                .find_one(doc! { "_id": id })
                .await?
                .ok_or_else(|| quote_not_found(&id));
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| quote_not_found(&id))
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(quote_not_found(&id));
        }
        Ok(())
    }

    async fn increment(&self, id: ObjectId, counter: Counter) -> Result<Quote, AppError> {
        use mongodb::options::ReturnDocument;

        let mut inc = Document::new();
        inc.insert(counter.field(), 1_i64);

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": inc })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| quote_not_found(&id))
    }
}
