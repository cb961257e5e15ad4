use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::content::repository::CatalogRepository;
use crate::content::schema::{CATALOG_DB_SCHEMA, CONTENT_SCHEMA_VERSION};
use crate::data::catalog::{
    CatalogFile, ClusterDefinition, CountryDefinition, DataError, CATALOG_SCHEMA_VERSION,
};
use crate::simulation::catalog::CountryCatalog;

const CONTENT_VERSION: &str = "catalog-v1";

#[derive(Debug)]
pub enum CatalogDbError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
    Data(DataError),
}

impl std::fmt::Display for CatalogDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogDbError::Sqlite(err) => write!(f, "database error: {}", err),
            CatalogDbError::InvalidData(message) => write!(f, "invalid catalog db: {}", message),
            CatalogDbError::Data(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CatalogDbError {}

impl From<rusqlite::Error> for CatalogDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

impl From<DataError> for CatalogDbError {
    fn from(err: DataError) -> Self {
        Self::Data(err)
    }
}

pub struct SqliteCatalogRepository {
    conn: Connection,
}

impl SqliteCatalogRepository {
    /// Open an existing catalog database read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogDbError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "query_only", true)?;
        validate_content_meta(&conn)?;
        Ok(Self { conn })
    }

    /// Open or create a writable catalog database.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CatalogDbError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, CatalogDbError> {
        conn.execute_batch(CATALOG_DB_SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO content_meta (id, schema_version, content_version) VALUES (1, ?1, ?2)",
            params![CONTENT_SCHEMA_VERSION, CONTENT_VERSION],
        )?;
        validate_content_meta(&conn)?;
        Ok(Self { conn })
    }

    /// Replace the stored catalog with `catalog`.
    pub fn store_catalog(&mut self, catalog: &CatalogFile) -> Result<(), CatalogDbError> {
        catalog.validate()?;
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cluster_slots", [])?;
        tx.execute("DELETE FROM cluster_countries", [])?;
        tx.execute("DELETE FROM clusters", [])?;

        for (cluster_id, cluster) in catalog.clusters.iter().enumerate() {
            tx.execute(
                "INSERT INTO clusters (cluster_id, map_image, source) VALUES (?1, ?2, ?3)",
                params![cluster_id as i64, cluster.map_image, cluster.source],
            )?;
            for (position, country) in cluster.countries.iter().enumerate() {
                tx.execute(
                    "INSERT INTO cluster_countries (cluster_id, position, country_name, flag_image) VALUES (?1, ?2, ?3, ?4)",
                    params![cluster_id as i64, position as i64, country.name, country.flag],
                )?;
            }
            for (position, slot) in cluster.answer_slots.iter().enumerate() {
                tx.execute(
                    "INSERT INTO cluster_slots (cluster_id, position, slot_ref) VALUES (?1, ?2, ?3)",
                    params![cluster_id as i64, position as i64, slot],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn load_catalog_file(&self) -> Result<CatalogFile, CatalogDbError> {
        let mut cluster_stmt = self
            .conn
            .prepare("SELECT cluster_id, map_image, source FROM clusters ORDER BY cluster_id")?;
        let mut country_stmt = self.conn.prepare(
            "SELECT country_name, flag_image FROM cluster_countries \
             WHERE cluster_id = ?1 ORDER BY position",
        )?;
        let mut slot_stmt = self
            .conn
            .prepare("SELECT slot_ref FROM cluster_slots WHERE cluster_id = ?1 ORDER BY position")?;

        let rows = cluster_stmt.query_map([], |row| {
            let cluster_id: i64 = row.get(0)?;
            let map_image: Option<String> = row.get(1)?;
            let source: Option<String> = row.get(2)?;
            Ok((cluster_id, map_image, source))
        })?;

        let mut clusters = Vec::new();
        for row in rows {
            let (cluster_id, map_image, source) = row?;
            let countries = country_stmt
                .query_map([cluster_id], |row| {
                    Ok(CountryDefinition {
                        name: row.get(0)?,
                        flag: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            let answer_slots = slot_stmt
                .query_map([cluster_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            clusters.push(ClusterDefinition {
                map_image,
                countries,
                answer_slots,
                source,
            });
        }

        let catalog = CatalogFile {
            schema_version: CATALOG_SCHEMA_VERSION,
            clusters,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn load_catalog(&self) -> Result<CountryCatalog, Box<dyn std::error::Error>> {
        Ok(CountryCatalog::from_file(self.load_catalog_file()?))
    }

    fn describe(&self) -> String {
        match self.conn.path() {
            Some(path) if !path.is_empty() => format!("sqlite:{}", path),
            _ => "sqlite:memory".to_string(),
        }
    }
}

fn validate_content_meta(conn: &Connection) -> Result<(), CatalogDbError> {
    let table = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='content_meta'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(CatalogDbError::InvalidData(
            "content_meta table missing".to_string(),
        ));
    }

    let schema_version = conn
        .query_row(
            "SELECT schema_version FROM content_meta WHERE id = 1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match schema_version {
        Some(CONTENT_SCHEMA_VERSION) => Ok(()),
        Some(other) => Err(CatalogDbError::InvalidData(format!(
            "schema_version {} does not match expected {}",
            other, CONTENT_SCHEMA_VERSION
        ))),
        None => Err(CatalogDbError::InvalidData(
            "content_meta missing row id=1".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::parse_catalog;

    fn sample_file() -> CatalogFile {
        parse_catalog(
            r#"{
                "schema_version": 2,
                "clusters": [
                    {"map_image": "maps/a.png", "source": "cluster_001",
                     "countries": [{"name": "Germany", "flag": "flags/Germany.png"},
                                   {"name": "France"}],
                     "answer_slots": ["input_field", "input_field"]},
                    {"map_image": null,
                     "countries": [{"name": "Chad"}],
                     "answer_slots": ["input_field"]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn stored_catalogs_load_back_unchanged() {
        let mut repo =
            SqliteCatalogRepository::from_connection(Connection::open_in_memory().unwrap())
                .unwrap();
        let file = sample_file();
        repo.store_catalog(&file).unwrap();
        assert_eq!(repo.load_catalog_file().unwrap(), file);

        let catalog = repo.load_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.flag_for("germany").map(|f| f.as_str()),
            Some("flags/Germany.png")
        );
        assert_eq!(repo.describe(), "sqlite:memory");
    }

    #[test]
    fn storing_replaces_previous_contents() {
        let mut repo =
            SqliteCatalogRepository::from_connection(Connection::open_in_memory().unwrap())
                .unwrap();
        repo.store_catalog(&sample_file()).unwrap();
        let mut smaller = sample_file();
        smaller.clusters.truncate(1);
        repo.store_catalog(&smaller).unwrap();
        assert_eq!(repo.load_catalog_file().unwrap().clusters.len(), 1);
    }

    #[test]
    fn empty_databases_fail_validation() {
        let repo =
            SqliteCatalogRepository::from_connection(Connection::open_in_memory().unwrap())
                .unwrap();
        assert!(matches!(
            repo.load_catalog_file(),
            Err(CatalogDbError::Data(DataError::Validation(_)))
        ));
    }

    #[test]
    fn rejects_databases_without_meta() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            validate_content_meta(&conn),
            Err(CatalogDbError::InvalidData(_))
        ));
    }

    #[test]
    fn rejects_schema_drift() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CATALOG_DB_SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO content_meta (id, schema_version, content_version) VALUES (1, 99, 'x')",
            [],
        )
        .unwrap();
        let err = validate_content_meta(&conn).unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn reopens_files_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let mut repo = SqliteCatalogRepository::create(&path).unwrap();
            repo.store_catalog(&sample_file()).unwrap();
        }
        let repo = SqliteCatalogRepository::open(&path).unwrap();
        assert_eq!(repo.load_catalog().unwrap().len(), 2);
    }
}
