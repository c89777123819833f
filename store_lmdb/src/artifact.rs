//! LMDB implementation of ObjectStore.
//!
//! Artifacts are stored whole under their object name. `put_object` is a
//! plain LMDB put, which replaces any previous value under the same key.

use heed::types::Bytes;
use heed::{Database, Env};

use transcript_store::object::{ObjectStore, StoredObject};
use transcript_store::StoreError;

use crate::keys::{decode, encode};
use crate::LmdbError;

pub struct LmdbObjectStore {
    pub(crate) env: Env,
    pub(crate) artifacts_db: Database<Bytes, Bytes>,
}

impl ObjectStore for LmdbObjectStore {
    fn put_object(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let object = StoredObject {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        };
        let value = encode(&object)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.artifacts_db
            .put(&mut wtxn, name.as_bytes(), &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(name, size = bytes.len(), "stored artifact");
        Ok(())
    }

    fn get_object(&self, name: &str) -> Result<StoredObject, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .artifacts_db
            .get(&rtxn, name.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("artifact {name}")))?;
        Ok(decode(value)?)
    }

    fn delete_object(&self, name: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .artifacts_db
            .delete(&mut wtxn, name.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(name, removed, "deleted artifact");
        Ok(())
    }

    fn object_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.artifacts_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
