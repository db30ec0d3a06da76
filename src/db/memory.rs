//! In-memory repositories.
//!
//! Used by `serve --ephemeral` and by the HTTP integration tests. Every
//! operation runs under a single lock per collection, which also makes the
//! CV handoff atomic.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;

use crate::db::admin_repository::AdminRepository;
use crate::db::blog_repository::{blog_not_found, BlogRepository, BlogUpdate};
use crate::db::category_repository::{category_not_found, CategoryRepository, CategoryUpdate};
use crate::db::cv_repository::{cv_not_found, CvRepository};
use crate::db::hobby_repository::{hobby_not_found, HobbyRepository, HobbyUpdate};
use crate::db::models::{Admin, Blog, Category, Counter, Cv, Hobby, Quote};
use crate::db::quote_repository::{quote_not_found, QuoteRepository, QuoteUpdate};
use crate::error::AppError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("In-memory store lock poisoned".into()))
}

fn id_key(id: &Option<ObjectId>) -> [u8; 12] {
    id.map(|id| id.bytes()).unwrap_or_default()
}

#[derive(Default)]
pub struct MemoryCvRepository {
    records: Mutex<Vec<Cv>>,
}

impl MemoryCvRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CvRepository for MemoryCvRepository {
    async fn upload(&self, mut cv: Cv) -> Result<Cv, AppError> {
        let mut records = lock(&self.records)?;
        for record in records.iter_mut() {
            record.active = false;
        }
        cv.id = Some(ObjectId::new());
        cv.uploaded_at = Utc::now();
        cv.active = true;
        records.push(cv.clone());
        Ok(cv)
    }

    async fn activate(&self, id: ObjectId) -> Result<Cv, AppError> {
        let mut records = lock(&self.records)?;
        for record in records.iter_mut() {
            record.active = false;
        }
        let record = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| cv_not_found(&id))?;
        record.active = true;
        Ok(record.clone())
    }

    async fn get_active(&self) -> Result<Option<Cv>, AppError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|r| r.active)
            .max_by_key(|r| (r.uploaded_at, id_key(&r.id)))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Cv>, AppError> {
        let mut records = lock(&self.records)?.clone();
        records.sort_by_key(|r| Reverse((r.uploaded_at, id_key(&r.id))));
        Ok(records)
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        if records.len() == before {
            return Err(cv_not_found(&id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlogRepository {
    records: Mutex<Vec<Blog>>,
}

impl MemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for MemoryBlogRepository {
    async fn list(&self, include_drafts: bool) -> Result<Vec<Blog>, AppError> {
        let mut blogs: Vec<Blog> = lock(&self.records)?
            .iter()
            .filter(|b| include_drafts || b.published)
            .cloned()
            .collect();
        blogs.sort_by_key(|b| Reverse((b.created_at, id_key(&b.id))));
        Ok(blogs)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Blog>, AppError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|b| b.id == Some(id))
            .cloned())
    }

    async fn create(&self, mut blog: Blog) -> Result<Blog, AppError> {
        blog.id = Some(ObjectId::new());
        lock(&self.records)?.push(blog.clone());
        Ok(blog)
    }

    async fn update(&self, id: ObjectId, update: BlogUpdate) -> Result<Blog, AppError> {
        let mut records = lock(&self.records)?;
        let blog = records
            .iter_mut()
            .find(|b| b.id == Some(id))
            .ok_or_else(|| blog_not_found(&id))?;
        update.apply(blog, Utc::now());
        Ok(blog.clone())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|b| b.id != Some(id));
        if records.len() == before {
            return Err(blog_not_found(&id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryHobbyRepository {
    records: Mutex<Vec<Hobby>>,
}

impl MemoryHobbyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HobbyRepository for MemoryHobbyRepository {
    async fn list(&self) -> Result<Vec<Hobby>, AppError> {
        let mut hobbies = lock(&self.records)?.clone();
        hobbies.sort_by_key(|h| (h.order, Reverse(h.created_at)));
        Ok(hobbies)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Hobby>, AppError> {
        Ok(lock(&self.records)?.iter().find(|h| h.id == Some(id)).cloned())
    }

    async fn create(&self, mut hobby: Hobby) -> Result<Hobby, AppError> {
        hobby.id = Some(ObjectId::new());
        lock(&self.records)?.push(hobby.clone());
        Ok(hobby)
    }

    async fn update(&self, id: ObjectId, update: HobbyUpdate) -> Result<Hobby, AppError> {
        let mut records = lock(&self.records)?;
        let hobby = records
            .iter_mut()
            .find(|h| h.id == Some(id))
            .ok_or_else(|| hobby_not_found(&id))?;
        update.apply(hobby);
        Ok(hobby.clone())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|h| h.id != Some(id));
        if records.len() == before {
            return Err(hobby_not_found(&id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCategoryRepository {
    records: Mutex<Vec<Category>>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let mut categories = lock(&self.records)?.clone();
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn create(&self, mut category: Category) -> Result<Category, AppError> {
        category.id = Some(ObjectId::new());
        lock(&self.records)?.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: ObjectId, update: CategoryUpdate) -> Result<Category, AppError> {
        let mut records = lock(&self.records)?;
        let category = records
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| category_not_found(&id))?;
        update.apply(category);
        Ok(category.clone())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|c| c.id != Some(id));
        if records.len() == before {
            return Err(category_not_found(&id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryQuoteRepository {
    records: Mutex<Vec<Quote>>,
}

impl MemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteRepository for MemoryQuoteRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Quote>, AppError> {
        let mut quotes: Vec<Quote> = lock(&self.records)?
            .iter()
            .filter(|q| !active_only || q.active)
            .cloned()
            .collect();
        if active_only {
            quotes.sort_by_key(|q| (q.order, Reverse(q.created_at)));
        } else {
            quotes.sort_by_key(|q| Reverse((q.created_at, id_key(&q.id))));
        }
        Ok(quotes)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Quote>, AppError> {
        Ok(lock(&self.records)?.iter().find(|q| q.id == Some(id)).cloned())
    }

    async fn create(&self, mut quote: Quote) -> Result<Quote, AppError> {
        quote.id = Some(ObjectId::new());
        lock(&self.records)?.push(quote.clone());
        Ok(quote)
    }

    async fn update(&self, id: ObjectId, update: QuoteUpdate) -> Result<Quote, AppError> {
        let mut records = lock(&self.records)?;
        let quote = records
            .iter_mut()
            .find(|q| q.id == Some(id))
            .ok_or_else(|| quote_not_found(&id))?;
        update.apply(quote);
        Ok(quote.clone())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), AppError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|q| q.id != Some(id));
        if records.len() == before {
            return Err(quote_not_found(&id));
        }
        Ok(())
    }

    async fn increment(&self, id: ObjectId, counter: Counter) -> Result<Quote, AppError> {
        let mut records = lock(&self.records)?;
        let quote = records
            .iter_mut()
            .find(|q| q.id == Some(id))
            .ok_or_else(|| quote_not_found(&id))?;
        match counter {
            Counter::Likes => quote.likes += 1,
            Counter::Shares => quote.shares += 1,
        }
        Ok(quote.clone())
    }
}

#[derive(Default)]
pub struct MemoryAdminRepository {
    records: Mutex<Vec<Admin>>,
}

impl MemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for MemoryAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        Ok(lock(&self.records)?
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create_if_none(&self, mut admin: Admin) -> Result<bool, AppError> {
        let mut records = lock(&self.records)?;
        if !records.is_empty() {
            return Ok(false);
        }
        admin.id = Some(ObjectId::new());
        records.push(admin);
        Ok(true)
    }
}
