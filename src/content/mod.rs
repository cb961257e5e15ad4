pub mod json;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use json::JsonCatalogRepository;
pub use repository::CatalogRepository;
pub use sqlite::{CatalogDbError, SqliteCatalogRepository};
