//! Avatar resources.
//!
//! Character ids resolve to sprite resource ids through a directory that is
//! loaded at most once per [`ResourceDirectoryCache`] and then shared by
//! reference with every render.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde_json::Value;

use crate::conf::{C_AVATAR_URL_PREFIX, C_AVATAR_URL_SUFFIX};
use crate::error::{ReportError, Result};
use crate::spec::{EnumCellValue, SpecCharacterEntry};

/// One directory row: character id to sprite resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResourceEntry {
    pub id: String,
    pub resource_id: String,
}

/// Source of the resource directory.
pub trait ResourceDirectoryLoader: Send + Sync {
    fn load(&self) -> Result<Vec<SpecResourceEntry>>;
}

/// Loads the directory from a JSON file (array of `{id, resource_id}`).
#[derive(Debug, Clone)]
pub struct JsonFileDirectoryLoader {
    pub path: PathBuf,
}

impl ResourceDirectoryLoader for JsonFileDirectoryLoader {
    fn load(&self) -> Result<Vec<SpecResourceEntry>> {
        let c_text = std::fs::read_to_string(&self.path)?;
        parse_resource_directory(&c_text)
    }
}

/// In-memory directory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectoryLoader {
    pub entries: Vec<SpecResourceEntry>,
}

impl ResourceDirectoryLoader for StaticDirectoryLoader {
    fn load(&self) -> Result<Vec<SpecResourceEntry>> {
        Ok(self.entries.clone())
    }
}

/// Fetch-once resource directory.
///
/// A failed load yields an empty directory; avatars then render blank.
pub struct ResourceDirectoryCache {
    loader: Option<Box<dyn ResourceDirectoryLoader>>,
    directory: OnceLock<BTreeMap<String, String>>,
}

impl ResourceDirectoryCache {
    pub fn new(loader: impl ResourceDirectoryLoader + 'static) -> Self {
        Self {
            loader: Some(Box::new(loader)),
            directory: OnceLock::new(),
        }
    }

    /// Cache with no directory at all.
    pub fn empty() -> Self {
        Self {
            loader: None,
            directory: OnceLock::from(BTreeMap::new()),
        }
    }

    /// Directory, loading it on first access.
    pub fn directory(&self) -> &BTreeMap<String, String> {
        self.directory.get_or_init(|| {
            let Some(loader) = self.loader.as_ref() else {
                return BTreeMap::new();
            };
            match loader.load() {
                Ok(l_entries) => {
                    log::debug!("Loaded {} avatar resource entries.", l_entries.len());
                    l_entries
                        .into_iter()
                        .filter(|entry| !entry.resource_id.is_empty())
                        .map(|entry| (entry.id, entry.resource_id))
                        .collect()
                }
                Err(err) => {
                    log::warn!("Avatar resource directory unavailable: {err}");
                    BTreeMap::new()
                }
            }
        })
    }

    /// Resource id of a character id.
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.directory().get(id).map(String::as_str)
    }
}

impl std::fmt::Debug for ResourceDirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDirectoryCache")
            .field("if_loaded", &self.directory.get().is_some())
            .finish()
    }
}

fn convert_json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a directory JSON array; rows without both ids are skipped.
pub fn parse_resource_directory(text: &str) -> Result<Vec<SpecResourceEntry>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(l_rows) = value else {
        return Err(ReportError::InvalidDataset(
            "resource directory must be a JSON array".to_string(),
        ));
    };
    Ok(l_rows
        .iter()
        .filter_map(|row| {
            Some(SpecResourceEntry {
                id: convert_json_id(row.get("id")?)?,
                resource_id: convert_json_id(row.get("resource_id")?)?,
            })
        })
        .collect())
}

/// Resource id of an entry: its own first, then the directory.
pub fn derive_resource_id(entry: &SpecCharacterEntry, cache: &ResourceDirectoryCache) -> Option<String> {
    if let Some(rid) = entry.resource_id.as_deref().filter(|rid| !rid.is_empty()) {
        return Some(rid.to_string());
    }
    if entry.id.is_empty() {
        return None;
    }
    cache.lookup(&entry.id).map(str::to_string)
}

/// Sprite URL of a resource id, zero-padded to three digits.
pub fn derive_avatar_url(resource_id: &str) -> String {
    format!("{C_AVATAR_URL_PREFIX}{resource_id:0>3}{C_AVATAR_URL_SUFFIX}")
}

/// Avatar cell value: an `IMAGE` formula, or an empty string without a resource.
pub fn derive_avatar_cell(entry: &SpecCharacterEntry, cache: &ResourceDirectoryCache) -> EnumCellValue {
    match derive_resource_id(entry, cache) {
        Some(rid) => {
            let c_url = derive_avatar_url(&rid).replace('"', "\"\"");
            EnumCellValue::Formula {
                formula: format!("_xlfn.IMAGE(\"{c_url}\")"),
                result: String::new(),
            }
        }
        None => EnumCellValue::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingLoader {
        n_calls: Arc<AtomicUsize>,
        if_fail: bool,
    }

    impl ResourceDirectoryLoader for CountingLoader {
        fn load(&self) -> Result<Vec<SpecResourceEntry>> {
            self.n_calls.fetch_add(1, Ordering::SeqCst);
            if self.if_fail {
                return Err(ReportError::InvalidDataset("offline".to_string()));
            }
            Ok(vec![SpecResourceEntry {
                id: "10".to_string(),
                resource_id: "7".to_string(),
            }])
        }
    }

    #[test]
    fn test_cache_loads_once() {
        let n_calls = Arc::new(AtomicUsize::new(0));
        let cache = ResourceDirectoryCache::new(CountingLoader {
            n_calls: Arc::clone(&n_calls),
            if_fail: false,
        });
        assert_eq!(cache.lookup("10"), Some("7"));
        assert_eq!(cache.lookup("11"), None);
        assert_eq!(n_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_yields_empty_directory() {
        let n_calls = Arc::new(AtomicUsize::new(0));
        let cache = ResourceDirectoryCache::new(CountingLoader {
            n_calls: Arc::clone(&n_calls),
            if_fail: true,
        });
        assert!(cache.directory().is_empty());
        assert!(cache.directory().is_empty());
        assert_eq!(n_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_avatar_cell() {
        let cache = ResourceDirectoryCache::new(StaticDirectoryLoader {
            entries: parse_resource_directory(r#"[{"id": 10, "resource_id": 7}, {"id": 11}]"#)
                .unwrap(),
        });
        let entry = SpecCharacterEntry {
            id: "10".to_string(),
            ..Default::default()
        };
        assert_eq!(
            derive_avatar_cell(&entry, &cache),
            EnumCellValue::Formula {
                formula: format!("_xlfn.IMAGE(\"{C_AVATAR_URL_PREFIX}007{C_AVATAR_URL_SUFFIX}\")"),
                result: String::new(),
            }
        );

        let entry_own = SpecCharacterEntry {
            id: "99".to_string(),
            resource_id: Some("1234".to_string()),
            ..Default::default()
        };
        assert_eq!(derive_resource_id(&entry_own, &cache).as_deref(), Some("1234"));

        let entry_unknown = SpecCharacterEntry {
            id: "12".to_string(),
            ..Default::default()
        };
        assert_eq!(
            derive_avatar_cell(&entry_unknown, &ResourceDirectoryCache::empty()),
            EnumCellValue::String(String::new())
        );
        assert_eq!(derive_avatar_cell(&entry_unknown, &cache), EnumCellValue::String(String::new()));
    }
}
