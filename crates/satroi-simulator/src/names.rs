use std::collections::{BTreeMap, HashMap};

use satroi_core::StoreDirectory;

/// Store id to display name lookup used to label simulation results.
///
/// An id without an entry is not an error; the result keeps no name.
pub trait StoreNames {
    fn store_name(&self, store_id: i64) -> Option<String>;
}

impl StoreNames for StoreDirectory {
    fn store_name(&self, store_id: i64) -> Option<String> {
        self.get(store_id).map(satroi_core::StoreEntry::display_name)
    }
}

impl StoreNames for HashMap<i64, String> {
    fn store_name(&self, store_id: i64) -> Option<String> {
        self.get(&store_id).cloned()
    }
}

impl StoreNames for BTreeMap<i64, String> {
    fn store_name(&self, store_id: i64) -> Option<String> {
        self.get(&store_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use satroi_core::{StoreEntry, StoresFile};

    use super::*;

    #[test]
    fn directory_uses_display_name() {
        let dir = StoreDirectory::from(StoresFile {
            stores: vec![StoreEntry {
                id: 100,
                name: "Centrum".to_string(),
                city: Some("Utrecht".to_string()),
            }],
        });
        assert_eq!(dir.store_name(100).as_deref(), Some("Centrum (Utrecht)"));
        assert_eq!(dir.store_name(999), None);
    }

    #[test]
    fn plain_map_lookup() {
        let map: HashMap<i64, String> = HashMap::from([(7, "Noord".to_string())]);
        assert_eq!(map.store_name(7).as_deref(), Some("Noord"));
        assert_eq!(map.store_name(8), None);
    }
}
