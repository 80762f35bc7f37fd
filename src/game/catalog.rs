use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::assets::AssetRef;
use crate::{Error, Result};

static NO_SIMILAR: BTreeSet<String> = BTreeSet::new();

/// One selectable item: an emotion, a song keyword.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub key: String,
    pub label: String,
    pub asset: AssetRef,
    /// Keys too easily confused with this one. Declaring one side is enough.
    #[serde(default)]
    pub similar: BTreeSet<String>,
}

impl Concept {
    pub fn new(key: &str, label: &str, asset: &str) -> Self {
        Concept {
            key: key.to_string(),
            label: label.to_string(),
            asset: AssetRef::from(asset),
            similar: BTreeSet::new(),
        }
    }

    pub fn similar_to(mut self, keys: &[&str]) -> Self {
        self.similar.extend(keys.iter().map(|key| key.to_string()));
        self
    }
}

/// Unvalidated catalog description, as written in a catalog TOML document or
/// assembled in code.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub name: String,
    #[serde(default)]
    pub concepts: Vec<Concept>,
    /// Auxiliary distractors drawn once the main pool runs dry.
    #[serde(default)]
    pub unrelated: Vec<Concept>,
    /// Safe fallback keys, all present in `concepts`. When omitted the first two
    /// concepts serve.
    #[serde(default)]
    pub defaults: Vec<String>,
}

impl CatalogSpec {
    pub fn new(name: &str) -> Self {
        CatalogSpec {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn unrelated(mut self, concept: Concept) -> Self {
        self.unrelated.push(concept);
        self
    }

    pub fn defaults(mut self, keys: &[&str]) -> Self {
        self.defaults = keys.iter().map(|key| key.to_string()).collect();
        self
    }

    pub fn build(self) -> Result<ConceptCatalog> {
        let CatalogSpec {
            name,
            mut concepts,
            mut unrelated,
            defaults,
        } = self;

        let mut catalog_keys = HashSet::new();
        for concept in &concepts {
            if !catalog_keys.insert(concept.key.clone()) {
                return Err(Error::DuplicateKey(concept.key.clone()));
            }
        }
        let mut unrelated_keys = HashSet::new();
        for concept in &unrelated {
            if catalog_keys.contains(&concept.key) {
                return Err(Error::UnrelatedCollision(concept.key.clone()));
            }
            if !unrelated_keys.insert(concept.key.clone()) {
                return Err(Error::DuplicateKey(concept.key.clone()));
            }
        }

        for concept in concepts.iter_mut().chain(unrelated.iter_mut()) {
            if concept.similar.remove(&concept.key) {
                warn!("Catalog '{}': dropped self-similarity on '{}'", name, concept.key);
            }
        }

        let defaults = if defaults.is_empty() {
            concepts.iter().take(2).map(|c| c.key.clone()).collect()
        } else {
            for key in &defaults {
                if !catalog_keys.contains(key) {
                    return Err(Error::UnknownDefault(key.clone()));
                }
            }
            defaults
        };

        let mut similarity: HashMap<String, BTreeSet<String>> = HashMap::new();
        for concept in concepts.iter().chain(unrelated.iter()) {
            for other in &concept.similar {
                similarity
                    .entry(concept.key.clone())
                    .or_default()
                    .insert(other.clone());
                similarity
                    .entry(other.clone())
                    .or_default()
                    .insert(concept.key.clone());
            }
        }

        Ok(ConceptCatalog {
            name,
            concepts,
            unrelated,
            defaults,
            similarity,
        })
    }
}

/// The immutable concept pool for one game session.
#[derive(Clone, Debug)]
pub struct ConceptCatalog {
    name: String,
    concepts: Vec<Concept>,
    unrelated: Vec<Concept>,
    defaults: Vec<String>,
    similarity: HashMap<String, BTreeSet<String>>,
}

impl ConceptCatalog {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str::<CatalogSpec>(raw)?.build()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn all_concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn unrelated(&self) -> &[Concept] {
        &self.unrelated
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Distinct keys across the catalog and the unrelated pool.
    pub fn distinct_count(&self) -> usize {
        self.concepts.len() + self.unrelated.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.concepts.iter().any(|c| c.key == key)
    }

    /// Looks in the main catalog first, then the unrelated pool.
    pub fn by_key(&self, key: &str) -> Result<&Concept> {
        self.concepts
            .iter()
            .chain(self.unrelated.iter())
            .find(|c| c.key == key)
            .ok_or_else(|| Error::NotFound(format!("concept '{}' in catalog '{}'", key, self.name)))
    }

    /// Undirected: includes keys that declared `key` as similar.
    pub fn similar_to(&self, key: &str) -> &BTreeSet<String> {
        self.similarity.get(key).unwrap_or(&NO_SIMILAR)
    }

    pub fn are_similar(&self, a: &str, b: &str) -> bool {
        self.similar_to(a).contains(b)
    }
}
