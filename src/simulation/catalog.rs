use std::collections::HashMap;

use bevy_ecs::prelude::*;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::catalog::{CatalogFile, ClusterDefinition, CountryDefinition};

/// Opaque reference to an image or prefab owned by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub flag: Option<AssetRef>,
}

impl CountryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: None,
        }
    }

    pub fn with_flag(name: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: Some(AssetRef::new(flag)),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// A group of neighbouring countries drawn on one map image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub map_image: Option<AssetRef>,
    pub countries: Vec<CountryRecord>,
    pub answer_slots: Vec<AssetRef>,
    pub source: Option<String>,
}

impl Cluster {
    pub fn new(map_image: Option<&str>, countries: Vec<CountryRecord>) -> Self {
        let answer_slots = countries
            .iter()
            .map(|_| AssetRef::new("input_field"))
            .collect();
        Self {
            map_image: map_image.map(AssetRef::new),
            countries,
            answer_slots,
            source: None,
        }
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn contains_country(&self, name: &str) -> bool {
        self.countries.iter().any(|c| c.matches(name))
    }

    /// Non-empty and backed by a map image.
    pub fn is_playable(&self) -> bool {
        !self.countries.is_empty() && self.map_image.is_some()
    }
}

impl From<ClusterDefinition> for Cluster {
    fn from(def: ClusterDefinition) -> Self {
        Self {
            map_image: def.map_image.map(AssetRef),
            countries: def
                .countries
                .into_iter()
                .map(|c| CountryRecord {
                    name: c.name.trim().to_string(),
                    flag: c.flag.map(AssetRef),
                })
                .collect(),
            answer_slots: def.answer_slots.into_iter().map(AssetRef).collect(),
            source: def.source,
        }
    }
}

impl From<&Cluster> for ClusterDefinition {
    fn from(cluster: &Cluster) -> Self {
        Self {
            map_image: cluster.map_image.as_ref().map(|a| a.0.clone()),
            countries: cluster
                .countries
                .iter()
                .map(|c| CountryDefinition {
                    name: c.name.clone(),
                    flag: c.flag.as_ref().map(|a| a.0.clone()),
                })
                .collect(),
            answer_slots: cluster.answer_slots.iter().map(|a| a.0.clone()).collect(),
            source: cluster.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub clusters: usize,
    pub unique_countries: usize,
    pub smallest_cluster: usize,
    pub largest_cluster: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Clusters: {} | Unique Countries: {} | Cluster Size Range: {}-{}",
            self.clusters, self.unique_countries, self.smallest_cluster, self.largest_cluster
        )
    }
}

/// Read-only table of clusters, shared by every other part of the game.
#[derive(Resource, Debug, Clone, Default)]
pub struct CountryCatalog {
    clusters: Vec<Cluster>,
    unique: Vec<CountryRecord>,
}

impl CountryCatalog {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        let unique = dedup_countries(&clusters);
        Self { clusters, unique }
    }

    pub fn from_file(file: CatalogFile) -> Self {
        Self::new(file.clusters.into_iter().map(Cluster::from).collect())
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            schema_version: crate::data::catalog::CATALOG_SCHEMA_VERSION,
            clusters: self.clusters.iter().map(ClusterDefinition::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    /// Every country once, keyed case-insensitively. The first occurrence
    /// keeps its position; its flag wins unless it has none.
    pub fn all_countries(&self) -> Vec<CountryRecord> {
        self.unique.clone()
    }

    pub fn unique_countries(&self) -> &[CountryRecord] {
        &self.unique
    }

    pub fn contains_country(&self, name: &str) -> bool {
        self.find_country(name).is_some()
    }

    pub fn find_country(&self, name: &str) -> Option<&CountryRecord> {
        let key = name_key(name);
        if key.is_empty() {
            return None;
        }
        self.unique.iter().find(|c| name_key(&c.name) == key)
    }

    pub fn flag_for(&self, name: &str) -> Option<&AssetRef> {
        self.find_country(name).and_then(|c| c.flag.as_ref())
    }

    pub fn random_cluster<R: Rng>(&self, rng: &mut R) -> Option<(usize, &Cluster)> {
        self.pick(rng, |c| !c.countries.is_empty())
    }

    /// Like [`random_cluster`](Self::random_cluster) but skips clusters with
    /// no map image to show.
    pub fn random_playable_cluster<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Option<(usize, &Cluster)> {
        self.pick(rng, Cluster::is_playable)
    }

    pub fn clusters_containing(&self, name: &str) -> Vec<&Cluster> {
        self.clusters
            .iter()
            .filter(|c| c.contains_country(name))
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let sizes = self
            .clusters
            .iter()
            .map(Cluster::country_count)
            .filter(|&n| n > 0);
        let smallest = sizes.clone().min().unwrap_or(0);
        let largest = sizes.max().unwrap_or(0);
        CatalogStats {
            clusters: self.clusters.len(),
            unique_countries: self.unique.len(),
            smallest_cluster: smallest,
            largest_cluster: largest,
        }
    }

    fn pick<R, F>(&self, rng: &mut R, keep: F) -> Option<(usize, &Cluster)>
    where
        R: Rng,
        F: Fn(&Cluster) -> bool,
    {
        let candidates: Vec<usize> = self
            .clusters
            .iter()
            .enumerate()
            .filter(|&(_, c)| keep(c))
            .map(|(idx, _)| idx)
            .collect();
        let idx = *candidates.choose(rng)?;
        Some((idx, &self.clusters[idx]))
    }
}

/// Comparison key for country names.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn dedup_countries(clusters: &[Cluster]) -> Vec<CountryRecord> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<CountryRecord> = Vec::new();
    for country in clusters.iter().flat_map(|c| c.countries.iter()) {
        let key = name_key(&country.name);
        if key.is_empty() {
            continue;
        }
        match seen.get(&key) {
            Some(&idx) => {
                if out[idx].flag.is_none() {
                    out[idx].flag = country.flag.clone();
                }
            }
            None => {
                seen.insert(key, out.len());
                out.push(CountryRecord {
                    name: country.name.trim().to_string(),
                    flag: country.flag.clone(),
                });
            }
        }
    }
    out
}
