//! The CV register: a collection in which at most one record is active.
//!
//! `upload` and `activate` both hand the active flag over from whatever
//! record held it to a single designated record. Each handoff is applied as
//! one atomic unit, so no reader ever observes two active CVs.

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::Cv;
use crate::error::AppError;

/// Repository trait for the CV register.
///
/// This trait allows swapping the database layer in tests.
#[async_trait]
pub trait CvRepository: Send + Sync {
    /// Deactivate every CV and insert `cv` as the only active one.
    ///
    /// `uploaded_at` is stamped when the handoff commits, so the newest
    /// upload is always the active one.
    async fn upload(&self, cv: Cv) -> Result<Cv, AppError>;

    /// Deactivate every CV, then mark `id` active.
    ///
    /// When `id` does not exist the deactivation still takes effect and the
    /// register is left with no active CV; the call then fails with
    /// [`AppError::NotFound`].
    async fn activate(&self, id: ObjectId) -> Result<Cv, AppError>;

    /// The most recently uploaded active CV, if any.
    async fn get_active(&self) -> Result<Option<Cv>, AppError>;

    /// All CVs, newest upload first.
    async fn list_all(&self) -> Result<Vec<Cv>, AppError>;

    /// Remove a CV. The active flag is not reassigned.
    async fn delete(&self, id: ObjectId) -> Result<(), AppError>;
}

pub(crate) fn cv_not_found(id: &ObjectId) -> AppError {
    AppError::NotFound(format!("CV '{}' not found", id.to_hex()))
}

/// How many times a handoff is retried when MongoDB labels the failure as a
/// transient transaction error (typically a write conflict with another
/// instance of the service).
const MAX_HANDOFF_ATTEMPTS: usize = 3;

/// MongoDB implementation of the CvRepository.
///
/// Handoffs run inside a multi-document transaction, which requires the
/// server to be a replica set member. Within one process they are also
/// serialized by `handoff`, so local callers never conflict with each other.
pub struct MongoCvRepository {
    client: mongodb::Client,
    collection: mongodb::Collection<Cv>,
    handoff: tokio::sync::Mutex<()>,
}

impl MongoCvRepository {
    pub fn new(client: &mongodb::Client, db: &mongodb::Database) -> Self {
        Self {
            client: client.clone(),
            collection: db.collection("cvs"),
            handoff: tokio::sync::Mutex::new(()),
        }
    }

    /// Create the index backing `get_active`.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        let index = IndexModel::builder()
            .keys(doc! { "active": 1, "uploaded_at": -1 })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn try_upload(&self, cv: &Cv) -> Result<(), mongodb::error::Error> {
        use mongodb::bson::doc;

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        self.collection
            .update_many(doc! { "active": true }, doc! { "$set": { "active": false } })
            .session(&mut session)
            .await?;
        self.collection.insert_one(cv).session(&mut session).await?;

        session.commit_transaction().await
    }

    async fn try_activate(&self, id: ObjectId) -> Result<Option<Cv>, mongodb::error::Error> {
        use mongodb::bson::doc;
        use mongodb::options::ReturnDocument;

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        self.collection
            .update_many(doc! { "active": true }, doc! { "$set": { "active": false } })
            .session(&mut session)
            .await?;
        let activated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": { "active": true } })
            .return_document(ReturnDocument::After)
            .session(&mut session)
            .await?;

        // Committed even when nothing matched: an unknown id leaves the
        // register with zero active CVs.
        session.commit_transaction().await?;
        Ok(activated)
    }
}

fn is_transient(err: &mongodb::error::Error) -> bool {
    err.contains_label(mongodb::error::TRANSIENT_TRANSACTION_ERROR)
}

#[async_trait]
impl CvRepository for MongoCvRepository {
    async fn upload(&self, mut cv: Cv) -> Result<Cv, AppError> {
        let _guard = self.handoff.lock().await;
        cv.id = Some(ObjectId::new());
        cv.uploaded_at = chrono::Utc::now();
        cv.active = true;

        let mut attempt = 1;
        loop {
            match self.try_upload(&cv).await {
                Ok(()) => return Ok(cv),
                Err(e) if attempt < MAX_HANDOFF_ATTEMPTS && is_transient(&e) => {
                    tracing::warn!("Retrying CV upload after transient error (attempt {attempt}): {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn activate(&self, id: ObjectId) -> Result<Cv, AppError> {
        let _guard = self.handoff.lock().await;
        let mut attempt = 1;
        loop {
            match self.try_activate(id).await {
                Ok(Some(cv)) => return Ok(cv),
                Ok(None) => {
                    tracing::warn!("Activated unknown CV '{}'; no CV is active now", id.to_hex());
                    return Err(cv_not_found(&id));
                }
                Err(e) if attempt < MAX_HANDOFF_ATTEMPTS && is_transient(&e) => {
                    tracing::warn!("Retrying CV activation after transient error (attempt {attempt}): {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn get_active(&self) -> Result<Option<Cv>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOneOptions;

        let options = FindOneOptions::builder()
            .sort(doc! { "uploaded_at": -1, "_id": -1 })
            .build();

        Ok(self
            .collection
            .find_one(doc! { "active": true })
            .with_options(options)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<Cv>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "uploaded_at": -1, "_id": -1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        use mongodb::bson::doc;

        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(cv_not_found(&id));
        }
        Ok(())
    }
}
