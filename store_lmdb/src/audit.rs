//! LMDB implementation of AuditStore.
//!
//! Entries are keyed by a big-endian append sequence, so a reverse cursor
//! walk returns newest-first without a secondary time index.

use heed::types::Bytes;
use heed::{Database, Env};

use transcript_store::audit::AuditStore;
use transcript_store::StoreError;
use transcript_types::AuditLogEntry;

use crate::keys::{decode, encode, next_sequence, AUDIT_SEQ_KEY};
use crate::LmdbError;

pub struct LmdbAuditStore {
    pub(crate) env: Env,
    pub(crate) audit_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl AuditStore for LmdbAuditStore {
    fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        let bytes = encode(entry)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let seq = next_sequence(&self.meta_db, &mut wtxn, AUDIT_SEQ_KEY)?;
        self.audit_db
            .put(&mut wtxn, &seq.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn latest(&self, offset: usize, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut entries = Vec::with_capacity(limit.min(256));
        for entry in self
            .audit_db
            .rev_iter(&rtxn)
            .map_err(LmdbError::from)?
            .skip(offset)
            .take(limit)
        {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            entries.push(decode(val)?);
        }
        Ok(entries)
    }

    fn audit_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.audit_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
