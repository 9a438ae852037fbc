use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A concept the answer is expected to mention, with accepted surface forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub text: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub weight: u32,
}

impl Keyphrase {
    pub fn new(text: &str, weight: u32) -> Self {
        Self {
            text: text.to_string(),
            synonyms: Vec::new(),
            weight,
        }
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRubric {
    pub id: String,
    pub title: String,
    pub pass_threshold: u8,
    pub keyphrases: Vec<Keyphrase>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub question: String,
}

impl SkillRubric {
    pub fn new(id: &str, title: &str, pass_threshold: u8, keyphrases: Vec<Keyphrase>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            pass_threshold,
            keyphrases,
            category: String::new(),
            difficulty: String::new(),
            question: String::new(),
        }
    }
}

/// Maps skill identifiers to rubrics. Storage and versioning are up to the
/// implementor.
pub trait RubricProvider: Send + Sync {
    fn rubric(&self, skill_id: &str) -> Option<Arc<SkillRubric>>;
}

impl<P: RubricProvider + ?Sized> RubricProvider for Arc<P> {
    fn rubric(&self, skill_id: &str) -> Option<Arc<SkillRubric>> {
        (**self).rubric(skill_id)
    }
}

impl RubricProvider for HashMap<String, Arc<SkillRubric>> {
    fn rubric(&self, skill_id: &str) -> Option<Arc<SkillRubric>> {
        self.get(skill_id).cloned()
    }
}

#[derive(Debug, Error)]
pub enum RubricError {
    #[error("failed to read rubric file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rubric catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("skill '{0}' is defined more than once")]
    DuplicateSkill(String),
    #[error("skill '{0}' has no keyphrases")]
    EmptyRubric(String),
    #[error("failed to watch rubric file: {0}")]
    Watch(#[from] notify::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    version: String,
    skills: Vec<SkillRubric>,
}

/// Immutable snapshot of every rubric known to the service.
#[derive(Debug, Clone)]
pub struct RubricCatalog {
    version: String,
    loaded_at: DateTime<Utc>,
    order: Vec<String>,
    skills: HashMap<String, Arc<SkillRubric>>,
}

impl Default for RubricCatalog {
    fn default() -> Self {
        Self {
            version: String::new(),
            loaded_at: Utc::now(),
            order: Vec::new(),
            skills: HashMap::new(),
        }
    }
}

impl RubricCatalog {
    pub fn from_rubrics(
        version: &str,
        rubrics: impl IntoIterator<Item = SkillRubric>,
    ) -> Result<Self, RubricError> {
        let mut order = Vec::new();
        let mut skills = HashMap::new();

        for rubric in rubrics {
            if rubric.keyphrases.is_empty() {
                return Err(RubricError::EmptyRubric(rubric.id));
            }
            if skills.contains_key(&rubric.id) {
                return Err(RubricError::DuplicateSkill(rubric.id));
            }
            order.push(rubric.id.clone());
            skills.insert(rubric.id.clone(), Arc::new(rubric));
        }

        Ok(Self {
            version: version.to_string(),
            loaded_at: Utc::now(),
            order,
            skills,
        })
    }

    pub fn from_ron_str(content: &str) -> Result<Self, RubricError> {
        let document: CatalogDocument = ron::from_str(content)?;
        Self::from_rubrics(&document.version, document.skills)
    }

    pub fn load(path: &Path) -> Result<Self, RubricError> {
        let content = fs::read_to_string(path).map_err(|source| RubricError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rubrics in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SkillRubric>> {
        self.order.iter().filter_map(|id| self.skills.get(id))
    }
}

impl RubricProvider for RubricCatalog {
    fn rubric(&self, skill_id: &str) -> Option<Arc<SkillRubric>> {
        self.skills.get(skill_id).cloned()
    }
}

/// File-backed catalog that can be swapped at runtime without blocking readers.
pub struct RubricRegistry {
    path: PathBuf,
    current: ArcSwap<RubricCatalog>,
}

impl RubricRegistry {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, RubricError> {
        let path = path.into();
        let catalog = RubricCatalog::load(&path)?;
        Ok(Self {
            path,
            current: ArcSwap::from_pointee(catalog),
        })
    }

    pub fn with_catalog(path: impl Into<PathBuf>, catalog: RubricCatalog) -> Self {
        Self {
            path: path.into(),
            current: ArcSwap::from_pointee(catalog),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<RubricCatalog> {
        self.current.load_full()
    }

    /// Re-reads the backing file. The previous catalog stays active on error.
    pub fn reload(&self) -> Result<Arc<RubricCatalog>, RubricError> {
        let catalog = Arc::new(RubricCatalog::load(&self.path)?);
        self.current.store(catalog.clone());
        tracing::info!(
            path = %self.path.display(),
            version = catalog.version(),
            skills = catalog.len(),
            "rubric catalog reloaded"
        );
        Ok(catalog)
    }

    /// Reloads the catalog whenever the backing file changes. The returned
    /// watcher must be kept alive for as long as reloading is wanted.
    pub fn watch(
        self: &Arc<Self>,
        on_reload: impl Fn(Result<Arc<RubricCatalog>, RubricError>) + Send + 'static,
    ) -> Result<RecommendedWatcher, RubricError> {
        let registry = Arc::clone(self);
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            match event {
                Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                    on_reload(registry.reload());
                }
                Ok(_) => {}
                Err(e) => on_reload(Err(RubricError::Watch(e))),
            }
        })?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }
}

impl RubricProvider for RubricRegistry {
    fn rubric(&self, skill_id: &str) -> Option<Arc<SkillRubric>> {
        self.current.load().rubric(skill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"(
        version: "test-1",
        skills: [
            (
                id: "blockchain-basics",
                title: "Blockchain Fundamentals",
                passThreshold: 60,
                keyphrases: [
                    (text: "consensus", weight: 30),
                    (text: "immutable", synonyms: ["tamper-proof"], weight: 30),
                ],
            ),
            (
                id: "smart-contracts",
                title: "Smart Contracts",
                passThreshold: 70,
                keyphrases: [(text: "solidity", weight: 40)],
            ),
        ],
    )"#;

    #[test]
    fn test_catalog_parses_ron() {
        let catalog = RubricCatalog::from_ron_str(CATALOG).unwrap();
        assert_eq!(catalog.version(), "test-1");
        assert_eq!(catalog.len(), 2);

        let ids: Vec<&str> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["blockchain-basics", "smart-contracts"]);

        let rubric = catalog.rubric("blockchain-basics").unwrap();
        assert_eq!(rubric.pass_threshold, 60);
        assert_eq!(rubric.keyphrases[1].synonyms, vec!["tamper-proof"]);
        assert!(rubric.keyphrases[0].synonyms.is_empty());
    }

    #[test]
    fn test_catalog_unknown_skill() {
        let catalog = RubricCatalog::from_ron_str(CATALOG).unwrap();
        assert!(catalog.rubric("quantum-basket-weaving").is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let rubric = SkillRubric::new("dup", "Dup", 50, vec![Keyphrase::new("a", 1)]);
        let result = RubricCatalog::from_rubrics("v", vec![rubric.clone(), rubric]);
        assert!(matches!(result, Err(RubricError::DuplicateSkill(id)) if id == "dup"));
    }

    #[test]
    fn test_catalog_rejects_empty_rubric() {
        let rubric = SkillRubric::new("empty", "Empty", 50, Vec::new());
        let result = RubricCatalog::from_rubrics("v", vec![rubric]);
        assert!(matches!(result, Err(RubricError::EmptyRubric(_))));
    }

    #[test]
    fn test_keyphrase_variants_canonical_first() {
        let kp = Keyphrase::new("ledger", 10).with_synonyms(&["distributed ledger", "dlt"]);
        let variants: Vec<&str> = kp.variants().collect();
        assert_eq!(variants, vec!["ledger", "distributed ledger", "dlt"]);
    }

    #[test]
    fn test_registry_reload_swaps_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let registry = RubricRegistry::load(file.path()).unwrap();
        assert!(registry.rubric("smart-contracts").is_some());

        let updated = CATALOG.replace("smart-contracts", "defi-basics");
        fs::write(file.path(), updated).unwrap();
        registry.reload().unwrap();

        assert!(registry.rubric("smart-contracts").is_none());
        assert!(registry.rubric("defi-basics").is_some());
    }

    #[test]
    fn test_registry_keeps_catalog_on_bad_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let registry = RubricRegistry::load(file.path()).unwrap();
        fs::write(file.path(), "(skills: [ broken").unwrap();

        assert!(matches!(registry.reload(), Err(RubricError::Parse(_))));
        assert!(registry.rubric("blockchain-basics").is_some());
        assert_eq!(registry.snapshot().version(), "test-1");
    }

    #[test]
    fn test_registry_missing_file() {
        let result = RubricRegistry::load("/definitely/not/here/rubrics.ron");
        assert!(matches!(result, Err(RubricError::Io { .. })));
    }
}
