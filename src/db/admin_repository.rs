use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;

use crate::db::models::Admin;
use crate::error::AppError;

/// Repository trait for the administrative account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;

    /// Insert `admin` only if no admin exists at all.
    ///
    /// Returns `true` when the account was created.
    async fn create_if_none(&self, admin: Admin) -> Result<bool, AppError>;
}

/// MongoDB implementation of the AdminRepository.
pub struct MongoAdminRepository {
    collection: mongodb::Collection<Admin>,
}

impl MongoAdminRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("admins"),
        }
    }

    /// Create the unique index on `email`.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for MongoAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn create_if_none(&self, mut admin: Admin) -> Result<bool, AppError> {
        use mongodb::options::UpdateOptions;

        admin.id = Some(ObjectId::new());
        let fields = bson::to_document(&admin)?;

        // An empty filter matches any existing admin, so the upsert only
        // inserts into an empty collection.
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .collection
            .update_one(doc! {}, doc! { "$setOnInsert": fields })
            .with_options(options)
            .await?;

        Ok(result.upserted_id.is_some())
    }
}
