use std::path::PathBuf;

use crate::{dom::SelectorError, store::StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid page snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("no element matches `{0}`")]
    TargetNotFound(String),
}
