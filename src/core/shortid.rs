//! Short ID aliases for command-line use
//!
//! Every record seen in a listing gets a stable `PREFIX@N` alias
//! (`AST@3`, `CASE@12`) so users do not have to paste ULIDs.
//! Aliases are persisted in `.fleet/shortids.json`.

use std::collections::HashMap;
use std::fs;

use crate::core::project::{Project, PROJECT_DIR};

const INDEX_FILE: &str = "shortids.json";

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to full entity ID string (e.g., "AST@1" -> "AST-01ABC...")
    entries: HashMap<String, String>,
    /// Full entity ID to alias (rebuilt on load)
    #[serde(skip)]
    reverse: HashMap<String, String>,
    /// Next available number per prefix
    next_ids: HashMap<String, u32>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or start empty if absent or unreadable
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(PROJECT_DIR).join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };
        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                index
            }
            Err(e) => {
                tracing::warn!(error = %e, "short id index unreadable, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(PROJECT_DIR).join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    fn extract_prefix(entity_id: &str) -> Option<&str> {
        entity_id.split_once('-').map(|(prefix, _)| prefix)
    }

    /// Assign an alias to an ID if it has none, and return the alias
    pub fn add(&mut self, entity_id: String) -> Option<String> {
        if let Some(existing) = self.reverse.get(&entity_id) {
            return Some(existing.clone());
        }
        let prefix = Self::extract_prefix(&entity_id)?.to_string();
        let next = self.next_ids.entry(prefix.clone()).or_insert(1);
        let alias = format!("{}@{}", prefix, next);
        *next += 1;
        self.entries.insert(alias.clone(), entity_id.clone());
        self.reverse.insert(entity_id, alias.clone());
        Some(alias)
    }

    pub fn ensure_all(&mut self, ids: impl IntoIterator<Item = String>) {
        for id in ids {
            self.add(id);
        }
    }

    /// Resolve an alias to a full ID
    ///
    /// Accepts `PREFIX@N` in any case. Anything else is returned unchanged
    /// so callers can try it as a full ID or case number.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        match reference.split_once('@') {
            Some((prefix, num)) if !prefix.is_empty() => {
                let key = format!("{}@{}", prefix.to_ascii_uppercase(), num);
                self.entries.get(&key).cloned()
            }
            _ => Some(reference.to_string()),
        }
    }

    pub fn get_short_id(&self, entity_id: &str) -> Option<String> {
        self.reverse.get(entity_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_short_id() {
        let mut index = ShortIdIndex::new();

        assert_eq!(index.add("AST-01ABC".to_string()).as_deref(), Some("AST@1"));
        assert_eq!(index.add("AST-02DEF".to_string()).as_deref(), Some("AST@2"));
        assert_eq!(index.add("CASE-01GHI".to_string()).as_deref(), Some("CASE@1"));

        assert_eq!(index.resolve("AST@2"), Some("AST-02DEF".to_string()));
        assert_eq!(index.resolve("case@1"), Some("CASE-01GHI".to_string()));
        assert_eq!(index.resolve("AST@99"), None);
    }

    #[test]
    fn test_short_id_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("AST-01ABC"), Some("AST-01ABC".to_string()));
        assert_eq!(index.resolve("REP-2026-0001"), Some("REP-2026-0001".to_string()));
    }

    #[test]
    fn test_short_id_no_duplicates() {
        let mut index = ShortIdIndex::new();
        let first = index.add("AST-001".to_string());
        let second = index.add("AST-001".to_string());
        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get_short_id("AST-001").as_deref(), Some("AST@1"));
    }

    #[test]
    fn test_persisted_aliases_survive_reload() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let mut index = ShortIdIndex::new();
        index.ensure_all(["AST-A".to_string(), "AST-B".to_string()]);
        index.save(&project).unwrap();

        let mut reloaded = ShortIdIndex::load(&project);
        assert_eq!(reloaded.get_short_id("AST-B").as_deref(), Some("AST@2"));
        assert_eq!(reloaded.add("AST-C".to_string()).as_deref(), Some("AST@3"));
    }
}
