use crate::simulation::catalog::CountryCatalog;

/// Source of the static cluster configuration loaded at startup.
pub trait CatalogRepository {
    fn load_catalog(&self) -> Result<CountryCatalog, Box<dyn std::error::Error>>;
    fn describe(&self) -> String;
}
