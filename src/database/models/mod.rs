pub mod cave;
pub mod cave_query;
pub mod user;
