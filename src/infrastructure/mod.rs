pub mod farm_repo;
pub mod memory_catalog;
pub mod models;
