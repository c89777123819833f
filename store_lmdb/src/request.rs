//! LMDB implementation of RequestStore.
//!
//! Requests live in `requests`, keyed by id. Three index databases point back
//! at request ids: the pending queue (ordered by `requested_at`, then
//! sequence), per-student history, and issued verification codes. Every
//! mutation updates the primary record and its indexes in one write
//! transaction.

use heed::{Env, RoTxn};

use transcript_store::request::RequestStore;
use transcript_store::StoreError;
use transcript_types::{CertificationRequest, Decision, RequestId, RequestStatus, StudentRef};

use crate::environment::Databases;
use crate::keys::{
    decode, encode, next_sequence, pending_key, request_id_from, student_prefix,
    student_request_key, REQUEST_SEQ_KEY,
};
use crate::LmdbError;

pub struct LmdbRequestStore {
    pub(crate) env: Env,
    pub(crate) dbs: Databases,
}

impl LmdbRequestStore {
    fn load(&self, txn: &RoTxn<'_>, id: &[u8]) -> Result<Option<CertificationRequest>, LmdbError> {
        match self.dbs.requests.get(txn, id)? {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// Resolve index values to requests. A dangling index entry is corruption.
    fn load_all(
        &self,
        txn: &RoTxn<'_>,
        ids: Vec<[u8; 16]>,
    ) -> Result<Vec<CertificationRequest>, StoreError> {
        ids.into_iter()
            .map(|id| {
                self.load(txn, &id)?.ok_or_else(|| {
                    StoreError::Corruption(format!(
                        "index points at missing request {}",
                        RequestId::from_bytes(id)
                    ))
                })
            })
            .collect()
    }

    fn student_request_ids(&self, txn: &RoTxn<'_>, student: &StudentRef) -> Result<Vec<[u8; 16]>, LmdbError> {
        let prefix = student_prefix(student);
        let mut ids = Vec::new();
        for entry in self.dbs.student_index.prefix_iter(txn, &prefix)? {
            let (_key, val) = entry?;
            ids.push(request_id_from(val)?);
        }
        Ok(ids)
    }
}

impl RequestStore for LmdbRequestStore {
    fn insert_pending(
        &self,
        request: &CertificationRequest,
    ) -> Result<CertificationRequest, StoreError> {
        if request.status != RequestStatus::Pending {
            return Err(StoreError::StatusConflict {
                current: request.status,
            });
        }
        request
            .check_invariants()
            .map_err(|e| StoreError::Corruption(e.to_string()))?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if self.load(&wtxn, request.id.as_bytes())?.is_some() {
            return Err(StoreError::Duplicate(format!("request {}", request.id)));
        }
        let existing = self.student_request_ids(&wtxn, &request.student)?;
        for other in self.load_all(&wtxn, existing)? {
            if other.status == RequestStatus::Pending {
                return Err(StoreError::Duplicate(format!(
                    "pending request {} for student {}",
                    other.id, other.student
                )));
            }
        }

        let mut stored = request.clone();
        stored.sequence = next_sequence(&self.dbs.meta, &mut wtxn, REQUEST_SEQ_KEY)?;
        let id = stored.id.as_bytes();
        self.dbs
            .requests
            .put(&mut wtxn, id, &encode(&stored)?)
            .map_err(LmdbError::from)?;
        self.dbs
            .pending_index
            .put(&mut wtxn, &pending_key(stored.requested_at, stored.sequence), id)
            .map_err(LmdbError::from)?;
        self.dbs
            .student_index
            .put(&mut wtxn, &student_request_key(&stored.student, stored.sequence), id)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(request = %stored.id, student = %stored.student, sequence = stored.sequence, "inserted pending request");
        Ok(stored)
    }

    fn get_request(&self, id: &RequestId) -> Result<CertificationRequest, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(&rtxn, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))
    }

    fn decide(
        &self,
        id: &RequestId,
        decision: &Decision,
    ) -> Result<CertificationRequest, StoreError> {
        // The read, the status check and the write share one write
        // transaction; LMDB admits a single writer, so concurrent decisions
        // on the same request serialize here.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut request = self
            .load(&wtxn, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;

        if let Err(current) = request.apply(decision) {
            return Err(StoreError::StatusConflict { current });
        }
        request
            .check_invariants()
            .map_err(|e| StoreError::Corruption(e.to_string()))?;

        if let Some(code) = &request.verification_code {
            let code_key = code.as_str().as_bytes();
            if self
                .dbs
                .code_index
                .get(&wtxn, code_key)
                .map_err(LmdbError::from)?
                .is_some()
            {
                return Err(StoreError::Duplicate("verification code already issued".to_string()));
            }
            self.dbs
                .code_index
                .put(&mut wtxn, code_key, id.as_bytes())
                .map_err(LmdbError::from)?;
        }

        self.dbs
            .pending_index
            .delete(&mut wtxn, &pending_key(request.requested_at, request.sequence))
            .map_err(LmdbError::from)?;
        self.dbs
            .requests
            .put(&mut wtxn, id.as_bytes(), &encode(&request)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(request)
    }

    fn pending_requests(&self, limit: usize) -> Result<Vec<CertificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        for entry in self
            .dbs
            .pending_index
            .iter(&rtxn)
            .map_err(LmdbError::from)?
            .take(limit)
        {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            ids.push(request_id_from(val)?);
        }
        self.load_all(&rtxn, ids)
    }

    fn requests_for_student(
        &self,
        student: &StudentRef,
    ) -> Result<Vec<CertificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids = self.student_request_ids(&rtxn, student)?;
        ids.reverse();
        self.load_all(&rtxn, ids)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<CertificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .dbs
            .code_index
            .get(&rtxn, code.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(val) => request_id_from(val)?,
            None => return Ok(None),
        };
        Ok(self.load(&rtxn, &id)?)
    }

    fn request_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.dbs.requests.len(&rtxn).map_err(LmdbError::from)?)
    }
}
