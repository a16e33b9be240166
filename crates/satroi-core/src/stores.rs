use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
}

impl StoreEntry {
    /// Name with the city appended when one is configured, e.g.
    /// `"Centrum (Utrecht)"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => format!("{} ({city})", self.name.trim()),
            _ => self.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreEntry>,
}

/// Store id to display-name lookup.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    entries: BTreeMap<i64, StoreEntry>,
}

impl StoreDirectory {
    #[must_use]
    pub fn get(&self, store_id: i64) -> Option<&StoreEntry> {
        self.entries.get(&store_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreEntry> {
        self.entries.values()
    }
}

impl From<StoresFile> for StoreDirectory {
    fn from(file: StoresFile) -> Self {
        Self {
            entries: file.stores.into_iter().map(|s| (s.id, s)).collect(),
        }
    }
}

/// Load and validate the store directory from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoreDirectory, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(StoreDirectory::from(stores_file))
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store {} has an empty name",
                store.id
            )));
        }

        if !seen_ids.insert(store.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: {}",
                store.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, city: Option<&str>) -> StoreEntry {
        StoreEntry {
            id,
            name: name.to_string(),
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn display_name_appends_city() {
        assert_eq!(
            entry(1, "Centrum", Some("Utrecht")).display_name(),
            "Centrum (Utrecht)"
        );
    }

    #[test]
    fn display_name_without_city() {
        assert_eq!(entry(1, " Centrum ", None).display_name(), "Centrum");
        assert_eq!(entry(1, "Centrum", Some("  ")).display_name(), "Centrum");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = StoresFile {
            stores: vec![entry(1, "  ", None)],
        };
        let err = validate_stores(&file).unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn validate_rejects_duplicate_id() {
        let file = StoresFile {
            stores: vec![entry(26304, "Centrum", None), entry(26304, "Noord", None)],
        };
        let err = validate_stores(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate store id: 26304"));
    }

    #[test]
    fn directory_lookup_by_id() {
        let dir = StoreDirectory::from(StoresFile {
            stores: vec![entry(100, "Centrum", None), entry(200, "Noord", None)],
        });
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get(200).map(|s| s.name.as_str()), Some("Noord"));
        assert!(dir.get(300).is_none());
    }

    #[test]
    fn parses_yaml_with_optional_city() {
        let yaml = "stores:\n  - id: 100\n    name: Centrum\n    city: Utrecht\n  - id: 200\n    name: Noord\n";
        let file: StoresFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.stores.len(), 2);
        assert!(file.stores[1].city.is_none());
    }

    #[test]
    fn load_stores_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("stores.yaml");
        assert!(
            path.exists(),
            "stores.yaml missing at {path:?}; required for this test"
        );
        let result = load_stores(&path);
        assert!(result.is_ok(), "failed to load stores.yaml: {result:?}");
        assert!(!result.unwrap().is_empty());
    }

    #[test]
    fn load_stores_reports_missing_file() {
        let err = load_stores(Path::new("/nonexistent/stores.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::StoresFileIo { .. }));
    }
}
