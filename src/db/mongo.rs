use std::sync::Arc;

use anyhow::Context;

use crate::app::Repositories;
use crate::db::admin_repository::MongoAdminRepository;
use crate::db::blog_repository::MongoBlogRepository;
use crate::db::category_repository::MongoCategoryRepository;
use crate::db::cv_repository::MongoCvRepository;
use crate::db::hobby_repository::MongoHobbyRepository;
use crate::db::quote_repository::MongoQuoteRepository;

/// Strip the password from a connection string so it can be logged.
pub fn redact_uri(uri: &str) -> String {
    match url::Url::parse(uri) {
        Ok(mut parsed) if parsed.password().is_some() => {
            // Only fails for cannot-be-a-base URLs, which have no password.
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        Ok(_) => uri.to_string(),
        Err(_) => "<unparseable uri>".to_string(),
    }
}

/// Connect to MongoDB, create the indexes the repositories rely on and
/// return the repository set.
pub async fn connect(uri: &str, database: &str) -> anyhow::Result<Repositories> {
    let client = mongodb::Client::with_uri_str(uri)
        .await
        .with_context(|| format!("Failed to connect to MongoDB at {}", redact_uri(uri)))?;
    let db = client.database(database);

    let cv_repo = MongoCvRepository::new(&client, &db);
    cv_repo.ensure_indexes().await?;
    let admin_repo = MongoAdminRepository::new(&db);
    admin_repo.ensure_indexes().await?;

    tracing::info!("Connected to MongoDB at {} (database '{}')", redact_uri(uri), database);

    Ok(Repositories {
        blog_repo: Arc::new(MongoBlogRepository::new(&db)),
        cv_repo: Arc::new(cv_repo),
        hobby_repo: Arc::new(MongoHobbyRepository::new(&db)),
        category_repo: Arc::new(MongoCategoryRepository::new(&db)),
        quote_repo: Arc::new(MongoQuoteRepository::new(&db)),
        admin_repo: Arc::new(admin_repo),
    })
}
