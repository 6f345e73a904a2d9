pub mod auth_service;
pub mod bootstrap;
pub mod cave_import;
pub mod geo;
