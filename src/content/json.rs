use std::path::{Path, PathBuf};

use crate::content::repository::CatalogRepository;
use crate::data::catalog::load_catalog_file;
use crate::simulation::catalog::CountryCatalog;

pub struct JsonCatalogRepository {
    path: PathBuf,
}

impl JsonCatalogRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogRepository for JsonCatalogRepository {
    fn load_catalog(&self) -> Result<CountryCatalog, Box<dyn std::error::Error>> {
        let file = load_catalog_file(&self.path)?;
        Ok(CountryCatalog::from_file(file))
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_catalog_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
                "schema_version": 2,
                "clusters": [
                    {"map_image": "maps/a.png",
                     "countries": [{"name": "Germany"}, {"name": "France"}],
                     "answer_slots": ["input_field", "input_field"]}
                ]
            }"#,
        )
        .unwrap();

        let repo = JsonCatalogRepository::new(&path);
        let catalog = repo.load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_country("france"));
        assert!(repo.describe().starts_with("json:"));
    }

    #[test]
    fn missing_files_are_errors() {
        let repo = JsonCatalogRepository::new("/nonexistent/catalog.json");
        assert!(repo.load_catalog().is_err());
    }
}
