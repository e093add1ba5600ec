//! The record store.
//!
//! Each collection is persisted as two documents: `<name>` holds the active
//! records in insertion order and `<name>_trash` holds soft-deleted records,
//! each tagged with a `deletedAt` timestamp. Every operation performs a full
//! read-modify-write of those documents while holding a per-collection lock,
//! so concurrent writers to one collection are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use bizdir_core::types::{key_string, now_rfc3339, Record, DELETED_AT_FIELD};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::backend::{MemoryBackend, StorageBackend};
use crate::error::{StoreError, StoreResult};

/// Names a collection, the field that keys its records, and any other
/// fields whose values must be unique across active and trashed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub name: &'static str,
    pub key_field: &'static str,
    pub unique_fields: &'static [&'static str],
}

impl Collection {
    pub const fn new(name: &'static str, key_field: &'static str) -> Self {
        Self {
            name,
            key_field,
            unique_fields: &[],
        }
    }

    /// Require `fields` to be unique in addition to the key.
    pub const fn with_unique(self, fields: &'static [&'static str]) -> Self {
        Self {
            unique_fields: fields,
            ..self
        }
    }

    /// The record's key in string form, if it has a usable one.
    pub fn key_of(&self, record: &Record) -> Option<String> {
        record.get(self.key_field).and_then(key_string)
    }

    fn has_key(&self, record: &Record, key: &str) -> bool {
        self.key_of(record).as_deref() == Some(key)
    }

    fn position(&self, records: &[Record], key: &str) -> Option<usize> {
        records.iter().position(|r| self.has_key(r, key))
    }

    /// First unique field whose value in `candidate` is already held by
    /// one of `others`. Absent and null values never clash.
    fn taken_field<'a>(
        &self,
        candidate: &Record,
        others: impl IntoIterator<Item = &'a Record> + Clone,
    ) -> Option<StoreError> {
        self.unique_fields.iter().find_map(|field| {
            let value = candidate.get(*field).filter(|v| !v.is_null())?;
            others
                .clone()
                .into_iter()
                .any(|other| other.get(*field) == Some(value))
                .then(|| StoreError::DuplicateField {
                    collection: self.name.to_string(),
                    field: *field,
                    value: value.to_string(),
                })
        })
    }

    fn trash_doc(&self) -> String {
        format!("{}_trash", self.name)
    }

    fn not_found(&self, key: &str) -> StoreError {
        StoreError::NotFound {
            collection: self.name.to_string(),
            key: key.to_string(),
        }
    }

    fn duplicate(&self, key: &str) -> StoreError {
        StoreError::DuplicateKey {
            collection: self.name.to_string(),
            key: key.to_string(),
        }
    }

    fn missing_key(&self) -> StoreError {
        StoreError::MissingKey {
            collection: self.name.to_string(),
            field: self.key_field,
        }
    }
}

/// Persistent CRUD and soft-delete lifecycle over a [`StorageBackend`].
///
/// Construct once per process and share behind an `Arc`.
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// A store over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Check that the underlying backend is usable.
    pub async fn health_check(&self) -> StoreResult<()> {
        self.backend.health_check().await
    }

    // -- Collections ---------------------------------------------------------

    /// Active records in insertion order, seeding the collection on first access.
    pub async fn read_all(&self, c: &Collection, seed: &[Record]) -> StoreResult<Vec<Record>> {
        let _guard = self.lock(c.name).await;
        self.load_active(c, seed).await
    }

    /// The active record with `key`.
    pub async fn find(&self, c: &Collection, key: &str, seed: &[Record]) -> StoreResult<Record> {
        let _guard = self.lock(c.name).await;
        let active = self.load_active(c, seed).await?;
        active
            .into_iter()
            .find(|r| c.has_key(r, key))
            .ok_or_else(|| c.not_found(key))
    }

    /// Append a record to the active set.
    ///
    /// The key must not already be used by an active or trashed record.
    pub async fn add_record(
        &self,
        c: &Collection,
        record: Record,
        seed: &[Record],
    ) -> StoreResult<Record> {
        let key = c.key_of(&record).ok_or_else(|| c.missing_key())?;

        let _guard = self.lock(c.name).await;
        let mut active = self.load_active(c, seed).await?;
        let trash = self.load_trash(c).await?;
        if c.position(&active, &key).is_some() || c.position(&trash, &key).is_some() {
            return Err(c.duplicate(&key));
        }
        if let Some(err) = c.taken_field(&record, active.iter().chain(&trash)) {
            return Err(err);
        }

        active.push(record.clone());
        self.save_records(c.name, &active).await?;
        tracing::info!(collection = c.name, %key, "Record added");
        Ok(record)
    }

    /// Merge `patch` over the active record with `key`.
    ///
    /// Patch fields win; fields the patch does not mention are kept. If the
    /// patch changes the key, the new key must be free.
    pub async fn update_record(
        &self,
        c: &Collection,
        key: &str,
        patch: Record,
        seed: &[Record],
    ) -> StoreResult<Record> {
        let _guard = self.lock(c.name).await;
        let mut active = self.load_active(c, seed).await?;
        let idx = c.position(&active, key).ok_or_else(|| c.not_found(key))?;

        let mut merged = active[idx].clone();
        merged.extend(patch);

        let new_key = c.key_of(&merged).ok_or_else(|| c.missing_key())?;
        let trash = self.load_trash(c).await?;
        if new_key != key {
            if c.position(&active, &new_key).is_some() || c.position(&trash, &new_key).is_some()
            {
                return Err(c.duplicate(&new_key));
            }
            tracing::info!(collection = c.name, old_key = key, %new_key, "Record re-keyed");
        }
        let others = active
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, r)| r)
            .chain(&trash);
        if let Some(err) = c.taken_field(&merged, others) {
            return Err(err);
        }

        active[idx] = merged.clone();
        self.save_records(c.name, &active).await?;
        tracing::debug!(collection = c.name, key = %new_key, "Record updated");
        Ok(merged)
    }

    /// Move the active record with `key` to the trash, stamping `deletedAt`.
    ///
    /// Returns the trash entry.
    pub async fn soft_delete(
        &self,
        c: &Collection,
        key: &str,
        seed: &[Record],
    ) -> StoreResult<Record> {
        let _guard = self.lock(c.name).await;
        let mut active = self.load_active(c, seed).await?;
        let idx = c.position(&active, key).ok_or_else(|| c.not_found(key))?;

        let mut entry = active.remove(idx);
        entry.insert(DELETED_AT_FIELD.to_string(), Value::String(now_rfc3339()));

        let mut trash = self.load_trash(c).await?;
        trash.push(entry.clone());

        // Trash first: a failure between the writes leaves a copy in both
        // documents rather than losing the record.
        self.save_records(&c.trash_doc(), &trash).await?;
        self.save_records(c.name, &active).await?;
        tracing::info!(collection = c.name, key, "Record moved to trash");
        Ok(entry)
    }

    /// Permanently remove `key` from the trash.
    ///
    /// Returns whether a record was removed; an absent key is not an error.
    pub async fn delete_hard(&self, c: &Collection, key: &str) -> StoreResult<bool> {
        let _guard = self.lock(c.name).await;
        let mut trash = self.load_trash(c).await?;
        let before = trash.len();
        trash.retain(|r| !c.has_key(r, key));

        if trash.len() == before {
            tracing::debug!(collection = c.name, key, "Hard delete of absent trash entry");
            return Ok(false);
        }

        self.save_records(&c.trash_doc(), &trash).await?;
        tracing::info!(collection = c.name, key, "Record permanently deleted");
        Ok(true)
    }

    /// Move `key` from the trash back to the end of the active set.
    ///
    /// Drops the `deletedAt` stamp. Fails if an active record already holds
    /// the key.
    pub async fn restore(&self, c: &Collection, key: &str, seed: &[Record]) -> StoreResult<Record> {
        let _guard = self.lock(c.name).await;
        let mut trash = self.load_trash(c).await?;
        let idx = c.position(&trash, key).ok_or_else(|| c.not_found(key))?;

        let mut active = self.load_active(c, seed).await?;
        if c.position(&active, key).is_some() {
            return Err(c.duplicate(key));
        }
        if let Some(err) = c.taken_field(&trash[idx], &active) {
            return Err(err);
        }

        let mut record = trash.remove(idx);
        record.remove(DELETED_AT_FIELD);
        active.push(record.clone());

        self.save_records(c.name, &active).await?;
        self.save_records(&c.trash_doc(), &trash).await?;
        tracing::info!(collection = c.name, key, "Record restored from trash");
        Ok(record)
    }

    /// Soft-deleted records, oldest deletion first.
    pub async fn read_trash(&self, c: &Collection) -> StoreResult<Vec<Record>> {
        let _guard = self.lock(c.name).await;
        self.load_trash(c).await
    }

    // -- Singletons ----------------------------------------------------------

    /// Read a whole document, falling back to `defaults` if it was never written.
    pub async fn read_singleton(&self, name: &str, defaults: Value) -> StoreResult<Value> {
        let _guard = self.lock(name).await;
        Ok(self.backend.load(name).await?.unwrap_or(defaults))
    }

    /// Replace a whole document.
    pub async fn write_singleton(&self, name: &str, value: Value) -> StoreResult<Value> {
        let _guard = self.lock(name).await;
        self.backend.save(name, &value).await?;
        tracing::info!(document = name, "Singleton document written");
        Ok(value)
    }

    // -- Internals -----------------------------------------------------------

    async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    async fn load_active(&self, c: &Collection, seed: &[Record]) -> StoreResult<Vec<Record>> {
        match self.load_records(c.name).await? {
            Some(records) => Ok(records),
            None => {
                let records = seed.to_vec();
                self.save_records(c.name, &records).await?;
                tracing::info!(collection = c.name, count = records.len(), "Seeded collection");
                Ok(records)
            }
        }
    }

    async fn load_trash(&self, c: &Collection) -> StoreResult<Vec<Record>> {
        Ok(self.load_records(&c.trash_doc()).await?.unwrap_or_default())
    }

    async fn load_records(&self, doc: &str) -> StoreResult<Option<Vec<Record>>> {
        let Some(value) = self.backend.load(doc).await? else {
            return Ok(None);
        };
        let records = serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
            document: doc.to_string(),
            reason: format!("expected an array of objects: {e}"),
        })?;
        Ok(Some(records))
    }

    async fn save_records(&self, doc: &str, records: &[Record]) -> StoreResult<()> {
        let value = serde_json::to_value(records)?;
        self.backend.save(doc, &value).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const CAFES: Collection = Collection::new("cafes", "slug");
    const USERS: Collection = Collection::new("users", "id").with_unique(&["username"]);

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn seed() -> Vec<Record> {
        vec![
            record(json!({"slug": "corner-roastery", "name": "Corner Roastery"})),
            record(json!({"slug": "bean-there", "name": "Bean There"})),
        ]
    }

    fn keys(records: &[Record]) -> Vec<String> {
        records.iter().filter_map(|r| CAFES.key_of(r)).collect()
    }

    #[tokio::test]
    async fn first_read_persists_seed() {
        let backend = Arc::new(MemoryBackend::new());
        let store = RecordStore::new(backend.clone());
        let seed = seed();

        let records = store.read_all(&CAFES, &seed).await.unwrap();
        assert_eq!(keys(&records), vec!["corner-roastery", "bean-there"]);
        assert!(backend.load("cafes").await.unwrap().is_some());
        assert_eq!(seed.len(), 2, "seed itself is untouched");
    }

    #[tokio::test]
    async fn persisted_state_wins_over_seed() {
        let store = RecordStore::in_memory();
        store.read_all(&CAFES, &[]).await.unwrap();

        let records = store.read_all(&CAFES, &seed()).await.unwrap();
        assert!(records.is_empty(), "seed is only used before first persist");
    }

    #[tokio::test]
    async fn add_then_read_includes_record() {
        let store = RecordStore::in_memory();
        let new = record(json!({"slug": "five-diamonds", "name": "Five Diamonds", "rating": 4.5}));
        store.add_record(&CAFES, new.clone(), &seed()).await.unwrap();

        let records = store.read_all(&CAFES, &seed()).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records.last(), Some(&new));
    }

    #[tokio::test]
    async fn add_rejects_missing_key() {
        let store = RecordStore::in_memory();
        let result = store
            .add_record(&CAFES, record(json!({"name": "No Slug"})), &[])
            .await;
        assert_matches!(result, Err(StoreError::MissingKey { field: "slug", .. }));
    }

    #[tokio::test]
    async fn add_rejects_duplicate_active_key() {
        let store = RecordStore::in_memory();
        let dup = record(json!({"slug": "bean-there", "name": "Another"}));
        let result = store.add_record(&CAFES, dup, &seed()).await;
        assert_matches!(result, Err(StoreError::DuplicateKey { key, .. }) if key == "bean-there");
        assert_eq!(store.read_all(&CAFES, &seed()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_key_held_by_trash() {
        let store = RecordStore::in_memory();
        store.soft_delete(&CAFES, "bean-there", &seed()).await.unwrap();

        let dup = record(json!({"slug": "bean-there"}));
        let result = store.add_record(&CAFES, dup, &seed()).await;
        assert_matches!(result, Err(StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn numeric_and_string_keys_collide() {
        let store = RecordStore::in_memory();
        store
            .add_record(&USERS, record(json!({"id": 7, "username": "a"})), &[])
            .await
            .unwrap();
        let result = store
            .add_record(&USERS, record(json!({"id": "7", "username": "b"})), &[])
            .await;
        assert_matches!(result, Err(StoreError::DuplicateKey { .. }));
        assert!(store.find(&USERS, "7", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let store = RecordStore::in_memory();
        let patch = record(json!({"rating": 4.9, "featured": true}));
        let updated = store
            .update_record(&CAFES, "bean-there", patch, &seed())
            .await
            .unwrap();

        assert_eq!(updated["name"], "Bean There");
        assert_eq!(updated["rating"], 4.9);
        assert_eq!(updated["featured"], true);

        let stored = store.find(&CAFES, "bean-there", &seed()).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_can_rename_key() {
        let store = RecordStore::in_memory();
        let patch = record(json!({"slug": "bean-here"}));
        store
            .update_record(&CAFES, "bean-there", patch, &seed())
            .await
            .unwrap();

        assert!(store.find(&CAFES, "bean-here", &seed()).await.is_ok());
        assert_matches!(
            store.find(&CAFES, "bean-there", &seed()).await,
            Err(StoreError::NotFound { .. })
        );
        let records = store.read_all(&CAFES, &seed()).await.unwrap();
        assert_eq!(keys(&records), vec!["corner-roastery", "bean-here"], "position is kept");
    }

    #[tokio::test]
    async fn update_rejects_rename_onto_existing_key() {
        let store = RecordStore::in_memory();
        let patch = record(json!({"slug": "corner-roastery"}));
        let result = store.update_record(&CAFES, "bean-there", patch, &seed()).await;
        assert_matches!(result, Err(StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn update_rejects_clearing_key() {
        let store = RecordStore::in_memory();
        let patch = record(json!({"slug": null}));
        let result = store.update_record(&CAFES, "bean-there", patch, &seed()).await;
        assert_matches!(result, Err(StoreError::MissingKey { .. }));
    }

    #[tokio::test]
    async fn update_unknown_key_is_not_found() {
        let store = RecordStore::in_memory();
        let result = store
            .update_record(&CAFES, "missing", Record::new(), &seed())
            .await;
        assert_matches!(result, Err(StoreError::NotFound { key, .. }) if key == "missing");
    }

    #[tokio::test]
    async fn soft_delete_moves_to_trash_with_timestamp() {
        let store = RecordStore::in_memory();
        let entry = store.soft_delete(&CAFES, "bean-there", &seed()).await.unwrap();
        assert!(entry[DELETED_AT_FIELD].is_string());

        let active = store.read_all(&CAFES, &seed()).await.unwrap();
        assert_eq!(keys(&active), vec!["corner-roastery"]);

        let trash = store.read_trash(&CAFES).await.unwrap();
        assert_eq!(trash, vec![entry]);
    }

    #[tokio::test]
    async fn soft_delete_unknown_key_is_not_found() {
        let store = RecordStore::in_memory();
        let result = store.soft_delete(&CAFES, "missing", &seed()).await;
        assert_matches!(result, Err(StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn restore_undoes_soft_delete() {
        let store = RecordStore::in_memory();
        let original = store.find(&CAFES, "corner-roastery", &seed()).await.unwrap();

        store.soft_delete(&CAFES, "corner-roastery", &seed()).await.unwrap();
        let restored = store.restore(&CAFES, "corner-roastery", &seed()).await.unwrap();

        assert_eq!(restored, original);
        assert!(store.read_trash(&CAFES).await.unwrap().is_empty());
        let active = store.read_all(&CAFES, &seed()).await.unwrap();
        assert_eq!(keys(&active), vec!["bean-there", "corner-roastery"]);
    }

    #[tokio::test]
    async fn restore_rejects_key_held_by_active_record() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .save("cafes", &json!([{"slug": "bean-there", "name": "Bean There II"}]))
            .await
            .unwrap();
        backend
            .save(
                "cafes_trash",
                &json!([{"slug": "bean-there", "name": "Bean There", "deletedAt": "2024-01-01T00:00:00.000Z"}]),
            )
            .await
            .unwrap();
        let store = RecordStore::new(backend);

        let result = store.restore(&CAFES, "bean-there", &seed()).await;
        assert_matches!(result, Err(StoreError::DuplicateKey { key, .. }) if key == "bean-there");

        let active = store.read_all(&CAFES, &seed()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["name"], "Bean There II");
        assert_eq!(store.read_trash(&CAFES).await.unwrap().len(), 1, "trash entry is kept");
    }

    #[tokio::test]
    async fn unique_field_is_enforced_on_add() {
        let store = RecordStore::in_memory();
        store
            .add_record(&USERS, record(json!({"id": "u1", "username": "bob"})), &[])
            .await
            .unwrap();

        let result = store
            .add_record(&USERS, record(json!({"id": "u2", "username": "bob"})), &[])
            .await;
        assert_matches!(
            result,
            Err(StoreError::DuplicateField { field: "username", .. })
        );
        assert_eq!(store.read_all(&USERS, &[]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unique_field_counts_trashed_records() {
        let store = RecordStore::in_memory();
        store
            .add_record(&USERS, record(json!({"id": "u1", "username": "bob"})), &[])
            .await
            .unwrap();
        store.soft_delete(&USERS, "u1", &[]).await.unwrap();

        let result = store
            .add_record(&USERS, record(json!({"id": "u2", "username": "bob"})), &[])
            .await;
        assert_matches!(result, Err(StoreError::DuplicateField { .. }));
    }

    #[tokio::test]
    async fn unique_field_is_enforced_on_update() {
        let store = RecordStore::in_memory();
        for (id, username) in [("u1", "bob"), ("u2", "alice")] {
            store
                .add_record(&USERS, record(json!({"id": id, "username": username})), &[])
                .await
                .unwrap();
        }

        let rename = record(json!({"username": "bob"}));
        let result = store.update_record(&USERS, "u2", rename, &[]).await;
        assert_matches!(result, Err(StoreError::DuplicateField { .. }));

        let unchanged = record(json!({"username": "alice", "email": "a@example.com"}));
        assert!(store.update_record(&USERS, "u2", unchanged, &[]).await.is_ok());
    }

    #[tokio::test]
    async fn unique_field_is_enforced_on_restore() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .save("users", &json!([{"id": "u2", "username": "dave"}]))
            .await
            .unwrap();
        backend
            .save("users_trash", &json!([{"id": "u9", "username": "dave"}]))
            .await
            .unwrap();
        let store = RecordStore::new(backend);
        let result = store.restore(&USERS, "u9", &[]).await;
        assert_matches!(result, Err(StoreError::DuplicateField { .. }));
    }

    #[tokio::test]
    async fn restore_unknown_key_is_not_found() {
        let store = RecordStore::in_memory();
        let result = store.restore(&CAFES, "bean-there", &seed()).await;
        assert_matches!(result, Err(StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_hard_is_idempotent() {
        let store = RecordStore::in_memory();
        store.soft_delete(&CAFES, "bean-there", &seed()).await.unwrap();

        assert!(store.delete_hard(&CAFES, "bean-there").await.unwrap());
        assert!(!store.delete_hard(&CAFES, "bean-there").await.unwrap());
        assert!(!store.delete_hard(&CAFES, "never-existed").await.unwrap());
        assert!(store.read_trash(&CAFES).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_hard_ignores_active_records() {
        let store = RecordStore::in_memory();
        assert!(!store.delete_hard(&CAFES, "bean-there").await.unwrap());
        assert_eq!(store.read_all(&CAFES, &seed()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn trash_of_untouched_collection_is_empty() {
        let store = RecordStore::in_memory();
        assert!(store.read_trash(&CAFES).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_collection_document_is_reported() {
        let backend = Arc::new(MemoryBackend::new());
        backend.save("cafes", &json!({"not": "an array"})).await.unwrap();
        let store = RecordStore::new(backend);

        let result = store.read_all(&CAFES, &seed()).await;
        assert_matches!(result, Err(StoreError::Corrupt { document, .. }) if document == "cafes");
    }

    #[tokio::test]
    async fn singleton_defaults_then_written_value() {
        let store = RecordStore::in_memory();
        let defaults = json!({"siteName": "Default"});

        let read = store.read_singleton("settings", defaults.clone()).await.unwrap();
        assert_eq!(read, defaults);

        store
            .write_singleton("settings", json!({"siteName": "Custom"}))
            .await
            .unwrap();
        let read = store.read_singleton("settings", defaults).await.unwrap();
        assert_eq!(read, json!({"siteName": "Custom"}));
    }

    #[tokio::test]
    async fn concurrent_adds_are_all_kept() {
        let store = Arc::new(RecordStore::in_memory());
        let mut handles = Vec::new();
        for i in 0..25 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let r = record(json!({"slug": format!("cafe-{i}")}));
                store.add_record(&CAFES, r, &[]).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read_all(&CAFES, &[]).await.unwrap().len(), 25);
    }
}
