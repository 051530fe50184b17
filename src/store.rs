//! Single-file JSON document store with named tables.
//!
//! The on-disk layout is one JSON object mapping table name to an array of
//! flat records: `{"comment_tb": [...], "submission_tb": [...]}`. Tables are
//! append-only in this system; every mutation rewrites the whole file through
//! a temp-file-then-atomic-rename so a crash never leaves a half-written doc.
//! No schema is enforced — a table stores whatever record shape it is given.

use crate::util::{create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SUBMISSION_TABLE: &str = "submission_tb";
pub const COMMENT_TABLE: &str = "comment_tb";

/// Remove the store file if present. Missing file is success (idempotent).
pub fn destroy_store(path: &Path) -> Result<()> {
    tracing::debug!("destroying {}", path.display());
    remove_with_backoff(path, 16, 50)
}

/// Handle to an open document store. Passed explicitly through the pipeline;
/// there is no ambient/global store state.
pub struct DocStore {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl DocStore {
    /// Open (creating if absent) the store at `path` with both tables present.
    /// An existing file is loaded as-is; missing tables are added empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read store {}", path.display()))?;
            serde_json::from_slice::<Map<String, Value>>(&bytes)
                .with_context(|| format!("parse store {}", path.display()))?
        } else {
            Map::new()
        };

        let mut store = Self { path, doc };
        for table in [COMMENT_TABLE, SUBMISSION_TABLE] {
            store
                .doc
                .entry(table.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
        }
        store.persist()?;
        tracing::debug!("store initialized at {}", store.path.display());
        Ok(store)
    }

    /// Append one record to `table` and persist.
    pub fn insert<T: Serialize>(&mut self, table: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).context("serialize record")?;
        self.rows_mut(table)?.push(value);
        self.persist()
    }

    /// Append a batch of records to `table` in one write.
    pub fn insert_many<T: Serialize>(&mut self, table: &str, records: &[T]) -> Result<()> {
        let rows = self.rows_mut(table)?;
        for r in records {
            rows.push(serde_json::to_value(r).context("serialize record")?);
        }
        self.persist()
    }

    /// Number of records currently in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.doc
            .get(table)
            .and_then(|v| v.as_array())
            .map(|a| a.len())
            .unwrap_or(0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rows_mut(&mut self, table: &str) -> Result<&mut Vec<Value>> {
        self.doc
            .get_mut(table)
            .and_then(|v| v.as_array_mut())
            .ok_or_else(|| anyhow!("no such table: {}", table))
    }

    /// Rewrite the whole document: write a sibling temp file, then promote it.
    fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let mut f = create_with_backoff(&tmp, 16, 50)
            .with_context(|| format!("create {}", tmp.display()))?;
        serde_json::to_writer(&mut f, &self.doc)
            .with_context(|| format!("write {}", tmp.display()))?;
        f.flush().with_context(|| format!("flush {}", tmp.display()))?;
        drop(f);
        replace_file_atomic_backoff(&tmp, &self.path)
    }
}
