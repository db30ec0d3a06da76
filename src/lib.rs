pub mod app;
pub mod config;
pub mod error;
pub mod api {
    pub mod auth;
    pub mod blogs;
    pub mod categories;
    pub mod cv;
    pub mod errors;
    pub mod hobbies;
    pub mod quotes;
    pub mod types;
    pub mod upload;
}
pub mod auth {
    pub mod bootstrap;
    pub mod middleware;
    pub mod models;
    pub mod token;
}
pub mod db {
    pub mod admin_repository;
    pub mod blog_repository;
    pub mod category_repository;
    pub mod cv_repository;
    pub mod hobby_repository;
    pub mod memory;
    pub mod models;
    pub mod mongo;
    pub mod quote_repository;
}
pub mod rendering {
    pub mod markdown;
}
pub mod storage {
    pub mod client;
}
