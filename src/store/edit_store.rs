use serde_json::Value;
use tracing::warn;

use crate::{
    edit::edit_model::{EDITS_KEY, EditMap, EditRecord},
    store::kv_store::{KvStore, StoreError},
};

/// Reads the edits mapping. Entries that are not records are dropped with a
/// warning; a record without an id takes its key.
pub fn load_edits<S: KvStore + ?Sized>(store: &S) -> Result<EditMap, StoreError> {
    let Some(value) = store.get(EDITS_KEY)? else {
        return Ok(EditMap::new());
    };

    let Value::Object(entries) = value else {
        warn!("stored edits are not a mapping; ignoring them");
        return Ok(EditMap::new());
    };

    let mut edits = EditMap::new();
    for (key, entry) in entries {
        match serde_json::from_value::<EditRecord>(entry) {
            Ok(mut record) => {
                if record.id.is_empty() {
                    record.id = key.clone();
                }
                edits.insert(key, record);
            }
            Err(e) => warn!(edit_id = %key, error = %e, "skipping malformed edit record"),
        }
    }
    Ok(edits)
}

pub fn save_edits<S: KvStore + ?Sized>(store: &mut S, edits: &EditMap) -> Result<(), StoreError> {
    store.set(EDITS_KEY, serde_json::to_value(edits)?)
}

/// Read-modify-write of a single record, keyed by its id.
pub fn upsert_edit<S: KvStore + ?Sized>(store: &mut S, record: EditRecord) -> Result<(), StoreError> {
    let mut edits = load_edits(store)?;
    edits.insert(record.id.clone(), record);
    save_edits(store, &edits)
}

pub fn clear_all_edits<S: KvStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(EDITS_KEY)
}
