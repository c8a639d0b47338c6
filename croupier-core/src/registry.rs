use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::catalog::{Catalog, CatalogEntry};
use crate::Result;

/// Snapshot of the template ids the host item registry knows about.
///
/// Everything the generator emits is checked against this set; ids outside
/// it are treated as if they were not in the catalog at all.
#[derive(Debug, Clone, Default)]
pub struct ValidItems {
    ids: HashSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<String>),
    Table(BTreeMap<String, Value>),
}

impl ValidItems {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Every id the catalog references, for running without a host registry.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.template_ids())
    }

    /// Read a snapshot file: either a JSON array of ids or the host's item
    /// table (an object keyed by template id).
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        Ok(match snapshot {
            Snapshot::List(ids) => Self::new(ids),
            Snapshot::Table(table) => Self::new(table.into_keys()),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Keep only the catalog entries the registry knows.
    pub fn retain_entries<'a, T: CatalogEntry>(&self, entries: &'a [T]) -> Vec<&'a T> {
        entries.iter().filter(|e| self.contains(e.id())).collect()
    }

    /// Keep only the bare ids the registry knows.
    pub fn retain_ids<'a>(&self, ids: &'a [String]) -> Vec<&'a String> {
        ids.iter().filter(|id| self.contains(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GearItem;

    fn gear(id: &str) -> GearItem {
        GearItem {
            id: id.to_string(),
            ..GearItem::default()
        }
    }

    #[test]
    fn filters_unknown_entries_and_ids() {
        let valid = ValidItems::new(["a", "c"]);
        let entries = vec![gear("a"), gear("b"), gear("c")];
        let kept: Vec<&str> = valid.retain_entries(&entries).iter().map(|e| e.id()).collect();
        assert_eq!(kept, vec!["a", "c"]);

        let ids = vec!["c".to_string(), "d".to_string()];
        assert_eq!(valid.retain_ids(&ids), vec![&ids[0]]);
    }

    #[test]
    fn loads_list_and_table_snapshots() {
        let dir = std::env::temp_dir().join(format!("croupier-registry-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let list = dir.join("list.json");
        fs::write(&list, r#"["x", "y"]"#).unwrap();
        let from_list = ValidItems::load(&list).unwrap();
        assert_eq!(from_list.len(), 2);
        assert!(from_list.contains("y"));

        let table = dir.join("items.json");
        fs::write(&table, r#"{ "x": { "_name": "X" }, "z": {} }"#).unwrap();
        let from_table = ValidItems::load(&table).unwrap();
        assert!(from_table.contains("z"));
        assert!(!from_table.contains("y"));

        let _ = fs::remove_dir_all(&dir);
    }
}
