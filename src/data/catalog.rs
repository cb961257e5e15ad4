use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version written by this crate. Older documents are migrated on load.
pub const CATALOG_SCHEMA_VERSION: u32 = 2;

/// Current on-disk catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub schema_version: u32,
    pub clusters: Vec<ClusterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDefinition {
    #[serde(default)]
    pub map_image: Option<String>,
    pub countries: Vec<CountryDefinition>,
    #[serde(default)]
    pub answer_slots: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDefinition {
    pub name: String,
    #[serde(default)]
    pub flag: Option<String>,
}

/// Schema 1: clusters carried bare country names with no flags.
#[derive(Debug, Clone, Deserialize)]
struct CatalogFileV1 {
    clusters: Vec<ClusterDefinitionV1>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClusterDefinitionV1 {
    #[serde(default)]
    map_image: Option<String>,
    countries: Vec<String>,
    #[serde(default)]
    answer_slots: Vec<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug)]
pub enum DataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    UnsupportedSchema(u32),
    Validation(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            DataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            DataError::UnsupportedSchema(version) => {
                write!(f, "unsupported catalog schema version {}", version)
            }
            DataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for DataError {}

pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<CatalogFile, DataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&raw).map_err(|err| match err {
        DataError::Json { source, .. } => DataError::Json {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Parse a catalog document of any supported schema version and validate it.
pub fn parse_catalog(raw: &str) -> Result<CatalogFile, DataError> {
    let json_err = |source| DataError::Json {
        path: "<inline>".to_string(),
        source,
    };
    let value: Value = serde_json::from_str(raw).map_err(json_err)?;
    let version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32;

    let catalog = match version {
        1 => {
            let legacy: CatalogFileV1 = serde_json::from_value(value).map_err(json_err)?;
            migrate_v1(legacy)
        }
        CATALOG_SCHEMA_VERSION => serde_json::from_value(value).map_err(json_err)?,
        other => return Err(DataError::UnsupportedSchema(other)),
    };
    catalog.validate()?;
    Ok(catalog)
}

fn migrate_v1(legacy: CatalogFileV1) -> CatalogFile {
    CatalogFile {
        schema_version: CATALOG_SCHEMA_VERSION,
        clusters: legacy
            .clusters
            .into_iter()
            .map(|cluster| ClusterDefinition {
                map_image: cluster.map_image,
                countries: cluster
                    .countries
                    .into_iter()
                    .map(|name| CountryDefinition { name, flag: None })
                    .collect(),
                answer_slots: cluster.answer_slots,
                source: cluster.source,
            })
            .collect(),
    }
}

impl CatalogFile {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.clusters.is_empty() {
            return Err(DataError::Validation(
                "catalog has no clusters".to_string(),
            ));
        }
        for (index, cluster) in self.clusters.iter().enumerate() {
            let label = cluster
                .source
                .clone()
                .unwrap_or_else(|| format!("cluster #{}", index));
            let mut names = HashSet::new();
            for country in &cluster.countries {
                let key = country.name.trim().to_lowercase();
                if key.is_empty() {
                    return Err(DataError::Validation(format!(
                        "{} has a country with an empty name",
                        label
                    )));
                }
                if !names.insert(key) {
                    return Err(DataError::Validation(format!(
                        "{} lists {} more than once",
                        label, country.name
                    )));
                }
            }
            if cluster.answer_slots.len() != cluster.countries.len() {
                return Err(DataError::Validation(format!(
                    "{} has {} answer slots for {} countries",
                    label,
                    cluster.answer_slots.len(),
                    cluster.countries.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrates_flat_name_lists() {
        let raw = r#"{
            "schema_version": 1,
            "clusters": [
                {"map_image": "maps/cluster_001.png",
                 "countries": ["Germany", "France"],
                 "answer_slots": ["input_field", "input_field"]}
            ]
        }"#;
        let catalog = parse_catalog(raw).unwrap();
        assert_eq!(catalog.schema_version, CATALOG_SCHEMA_VERSION);
        assert_eq!(catalog.clusters[0].countries[1].name, "France");
        assert!(catalog.clusters[0].countries[1].flag.is_none());
    }

    #[test]
    fn missing_version_is_treated_as_legacy() {
        let raw = r#"{"clusters": [{"countries": ["Chad"], "answer_slots": ["slot"]}]}"#;
        let catalog = parse_catalog(raw).unwrap();
        assert_eq!(catalog.clusters[0].countries[0].name, "Chad");
    }

    #[test]
    fn reads_current_schema_with_flags() {
        let raw = r#"{
            "schema_version": 2,
            "clusters": [
                {"map_image": "maps/a.png",
                 "countries": [{"name": "Italy", "flag": "flags/Italy.png"}],
                 "answer_slots": ["slot"]}
            ]
        }"#;
        let catalog = parse_catalog(raw).unwrap();
        assert_eq!(
            catalog.clusters[0].countries[0].flag.as_deref(),
            Some("flags/Italy.png")
        );
    }

    #[test]
    fn rejects_unknown_schema() {
        let raw = r#"{"schema_version": 9, "clusters": []}"#;
        assert!(matches!(
            parse_catalog(raw),
            Err(DataError::UnsupportedSchema(9))
        ));
    }

    #[test]
    fn rejects_slot_mismatch() {
        let raw = r#"{
            "schema_version": 2,
            "clusters": [{"countries": [{"name": "Peru"}, {"name": "Chile"}],
                          "answer_slots": ["slot"]}]
        }"#;
        let err = parse_catalog(raw).unwrap_err();
        assert!(err.to_string().contains("1 answer slots for 2 countries"));
    }

    #[test]
    fn rejects_duplicates_within_a_cluster() {
        let raw = r#"{
            "schema_version": 2,
            "clusters": [{"countries": [{"name": "Peru"}, {"name": " peru "}],
                          "answer_slots": ["a", "b"]}]
        }"#;
        assert!(matches!(parse_catalog(raw), Err(DataError::Validation(_))));
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_catalog_file(&path).unwrap_err();
        assert!(err.to_string().contains("catalog.json"));
    }
}
