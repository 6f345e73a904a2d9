pub mod cave_repository;
pub mod manager;
pub mod models;
pub mod paginate;
pub mod query_builder;
pub mod user_repository;
