use std::sync::RwLock;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{self, Tables};
use crate::traits::DataStore;

/// In-memory, BTreeMap-based data store.
///
/// This is the store a document carries while it is open. All tables are
/// held behind a `RwLock`; values are cloned on read and write.
pub struct InMemoryDataStore {
    tables: RwLock<Tables>,
}

impl InMemoryDataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    /// Build a store from an export.
    pub fn from_snapshot(bytes: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            tables: RwLock::new(snapshot::decode(bytes)?),
        })
    }

    /// Names of all non-empty tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> usize {
        self.tables
            .read()
            .expect("lock poisoned")
            .values()
            .flat_map(|rows| rows.values())
            .map(Vec::len)
            .sum()
    }
}

fn check_table(table: &str) -> StoreResult<()> {
    if table.is_empty() {
        return Err(StoreError::InvalidTable(table.to_string()));
    }
    Ok(())
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for InMemoryDataStore {
    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.get(table).and_then(|rows| rows.get(key)).cloned())
    }

    fn insert(&self, table: &str, key: &str, value: &[u8]) -> StoreResult<bool> {
        check_table(table)?;
        let mut tables = self.tables.write().expect("lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(key) {
            return Ok(false);
        }
        rows.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn put(&self, table: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        check_table(table)?;
        let mut tables = self.tables.write().expect("lock poisoned");
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().expect("lock poisoned");
        Ok(tables
            .get_mut(table)
            .map(|rows| rows.remove(key).is_some())
            .unwrap_or(false))
    }

    fn count(&self, table: &str) -> StoreResult<usize> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables.get(table).map_or(0, |rows| rows.len()))
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let tables = self.tables.read().expect("lock poisoned");
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn clear_table(&self, table: &str) -> StoreResult<usize> {
        let mut tables = self.tables.write().expect("lock poisoned");
        Ok(tables.remove(table).map_or(0, |rows| rows.len()))
    }

    fn export(&self) -> StoreResult<Vec<u8>> {
        let tables = self.tables.read().expect("lock poisoned");
        let bytes = snapshot::encode(&tables)?;
        debug!(tables = tables.len(), bytes = bytes.len(), "exported store");
        Ok(bytes)
    }

    fn import(&self, bytes: &[u8]) -> StoreResult<()> {
        // Decode fully before taking the write lock so a bad snapshot
        // leaves the current contents in place.
        let decoded = snapshot::decode(bytes)?;
        let mut tables = self.tables.write().expect("lock poisoned");
        debug!(tables = decoded.len(), bytes = bytes.len(), "imported store");
        *tables = decoded;
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDataStore")
            .field("tables", &self.table_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Rows
    // -----------------------------------------------------------------------

    #[test]
    fn insert_and_get() {
        let store = InMemoryDataStore::new();
        assert!(store.insert("notes", "a", b"first").unwrap());
        assert_eq!(store.get("notes", "a").unwrap().unwrap(), b"first");
        assert!(store.get("notes", "missing").unwrap().is_none());
        assert!(store.get("nope", "a").unwrap().is_none());
    }

    #[test]
    fn insert_existing_is_noop() {
        let store = InMemoryDataStore::new();
        assert!(store.insert("notes", "a", b"first").unwrap());
        assert!(!store.insert("notes", "a", b"second").unwrap());
        assert_eq!(store.get("notes", "a").unwrap().unwrap(), b"first");
    }

    #[test]
    fn put_overwrites() {
        let store = InMemoryDataStore::new();
        store.put("notes", "a", b"first").unwrap();
        store.put("notes", "a", b"second").unwrap();
        assert_eq!(store.get("notes", "a").unwrap().unwrap(), b"second");
        assert_eq!(store.count("notes").unwrap(), 1);
    }

    #[test]
    fn delete_and_contains() {
        let store = InMemoryDataStore::new();
        store.put("notes", "a", b"x").unwrap();
        assert!(store.contains("notes", "a").unwrap());
        assert!(store.delete("notes", "a").unwrap());
        assert!(!store.delete("notes", "a").unwrap());
        assert!(!store.contains("notes", "a").unwrap());
    }

    #[test]
    fn scan_is_key_ordered() {
        let store = InMemoryDataStore::new();
        store.put("t", "b", b"2").unwrap();
        store.put("t", "a", b"1").unwrap();
        store.put("t", "c", b"3").unwrap();
        let keys: Vec<String> = store.scan("t").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn clear_table_reports_count() {
        let store = InMemoryDataStore::new();
        store.put("t", "a", b"1").unwrap();
        store.put("t", "b", b"2").unwrap();
        store.put("other", "a", b"1").unwrap();
        assert_eq!(store.clear_table("t").unwrap(), 2);
        assert_eq!(store.count("t").unwrap(), 0);
        assert_eq!(store.count("other").unwrap(), 1);
    }

    #[test]
    fn empty_table_name_rejected() {
        let store = InMemoryDataStore::new();
        assert!(matches!(
            store.put("", "a", b"x"),
            Err(StoreError::InvalidTable(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    #[test]
    fn export_import_reproduces_tables() {
        let source = InMemoryDataStore::new();
        source.put("commits", "h1", b"root").unwrap();
        source.put("notes", "n1", &[0, 1, 2, 255]).unwrap();

        let bytes = source.export().unwrap();
        let target = InMemoryDataStore::new();
        target.put("stale", "x", b"gone").unwrap();
        target.import(&bytes).unwrap();

        assert_eq!(target.table_names(), vec!["commits", "notes"]);
        assert_eq!(target.get("notes", "n1").unwrap().unwrap(), vec![0, 1, 2, 255]);
        assert!(target.get("stale", "x").unwrap().is_none());
    }

    #[test]
    fn failed_import_keeps_contents() {
        let store = InMemoryDataStore::new();
        store.put("notes", "a", b"keep").unwrap();
        assert!(store.import(b"garbage").is_err());
        assert_eq!(store.get("notes", "a").unwrap().unwrap(), b"keep");
    }

    #[test]
    fn from_snapshot_and_total_bytes() {
        let source = InMemoryDataStore::new();
        source.put("t", "a", b"1234").unwrap();
        source.put("t", "b", b"56").unwrap();
        let copy = InMemoryDataStore::from_snapshot(&source.export().unwrap()).unwrap();
        assert_eq!(copy.total_bytes(), 6);
    }

    #[test]
    fn export_is_deterministic() {
        let a = InMemoryDataStore::new();
        let b = InMemoryDataStore::new();
        a.put("t", "x", b"1").unwrap();
        a.put("t", "y", b"2").unwrap();
        b.put("t", "y", b"2").unwrap();
        b.put("t", "x", b"1").unwrap();
        assert_eq!(a.export().unwrap(), b.export().unwrap());
    }
}
