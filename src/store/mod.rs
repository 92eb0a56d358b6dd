pub mod edit_store;
pub mod kv_store;

pub use edit_store::{clear_all_edits, load_edits, save_edits, upsert_edit};
pub use kv_store::{JsonFileStore, KvStore, MemoryStore, StoreError};
