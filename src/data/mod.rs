pub mod catalog;
pub mod settings;

pub use catalog::{
    load_catalog_file, parse_catalog, CatalogFile, ClusterDefinition, CountryDefinition,
    DataError, CATALOG_SCHEMA_VERSION,
};
pub use settings::{load_settings, QuizSettings};
