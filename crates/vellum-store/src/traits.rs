use crate::error::StoreResult;

/// Table-oriented byte store embedded in a document.
///
/// All implementations must satisfy these invariants:
/// - Rows are addressed by `(table, key)`; values are opaque bytes.
/// - [`insert`](DataStore::insert) never overwrites an existing row.
/// - [`export`](DataStore::export) followed by [`import`](DataStore::import)
///   on any store reproduces every table exactly.
/// - A failed `import` leaves the previous contents untouched.
pub trait DataStore: Send + Sync {
    /// Read one row. Returns `Ok(None)` if the row does not exist.
    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert a row if the key is absent.
    ///
    /// Returns `true` if the row was written, `false` if a row with this
    /// key already existed (the existing value is kept).
    fn insert(&self, table: &str, key: &str, value: &[u8]) -> StoreResult<bool>;

    /// Insert or overwrite a row.
    fn put(&self, table: &str, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Delete a row. Returns `true` if the row existed.
    fn delete(&self, table: &str, key: &str) -> StoreResult<bool>;

    /// Number of rows in a table (0 for an unknown table).
    fn count(&self, table: &str) -> StoreResult<usize>;

    /// All rows of a table in key order.
    fn scan(&self, table: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Remove every row of a table and return how many were removed.
    fn clear_table(&self, table: &str) -> StoreResult<usize>;

    /// Serialize the whole store into a self-describing byte snapshot.
    fn export(&self) -> StoreResult<Vec<u8>>;

    /// Replace the whole store with a snapshot produced by `export`.
    fn import(&self, bytes: &[u8]) -> StoreResult<()>;

    /// Returns `true` if a row exists.
    ///
    /// Default implementation calls `get()`.
    fn contains(&self, table: &str, key: &str) -> StoreResult<bool> {
        Ok(self.get(table, key)?.is_some())
    }
}
