//! Nullable store: thread-safe in-memory storage for testing.
//!
//! Implements every storage trait over one mutex, so `decide` has the same
//! read-check-write atomicity as the LMDB backend. Failures can be injected
//! per concern to exercise the core's error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use transcript_store::{
    AcademicRecordStore, AuditStore, MetaStore, ObjectStore, RequestStore, StoreError,
    StoredObject, StudentStore,
};
use transcript_types::{
    AcademicRecord, AuditLogEntry, CertificationRequest, Decision, RequestId, RequestStatus,
    Student, StudentRef,
};

#[derive(Default)]
struct Tables {
    requests: HashMap<RequestId, CertificationRequest>,
    next_sequence: u64,
    codes: HashMap<String, RequestId>,
    students: HashMap<StudentRef, Student>,
    records: BTreeMap<(StudentRef, u8), AcademicRecord>,
    audit: Vec<AuditLogEntry>,
    objects: BTreeMap<String, StoredObject>,
    schema_version: u32,
}

/// An in-memory implementation of all store traits.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    failing_object_puts: AtomicU32,
    object_puts: AtomicU64,
    audit_down: AtomicBool,
    lookups_down: AtomicBool,
    code_lookups: AtomicU64,
}

fn injected(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {what} failure"))
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` object writes fail with a backend error.
    pub fn fail_next_object_puts(&self, n: u32) {
        self.failing_object_puts.store(n, Ordering::SeqCst);
    }

    /// Number of successful object writes so far.
    pub fn object_puts(&self) -> u64 {
        self.object_puts.load(Ordering::SeqCst)
    }

    /// Make every audit append fail until switched back.
    pub fn set_audit_down(&self, down: bool) {
        self.audit_down.store(down, Ordering::SeqCst);
    }

    /// Make verification-code lookups fail until switched back.
    pub fn set_lookups_down(&self, down: bool) {
        self.lookups_down.store(down, Ordering::SeqCst);
    }

    /// Number of verification-code lookups that reached the store.
    pub fn code_lookups(&self) -> u64 {
        self.code_lookups.load(Ordering::SeqCst)
    }

    /// Every stored object name, sorted.
    pub fn object_names(&self) -> Vec<String> {
        self.tables.lock().unwrap().objects.keys().cloned().collect()
    }
}

impl RequestStore for NullStore {
    fn insert_pending(
        &self,
        request: &CertificationRequest,
    ) -> Result<CertificationRequest, StoreError> {
        if request.status != RequestStatus::Pending {
            return Err(StoreError::StatusConflict {
                current: request.status,
            });
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.requests.contains_key(&request.id) {
            return Err(StoreError::Duplicate(format!("request {}", request.id)));
        }
        if let Some(other) = tables
            .requests
            .values()
            .find(|r| r.student == request.student && r.status == RequestStatus::Pending)
        {
            return Err(StoreError::Duplicate(format!(
                "pending request {} for student {}",
                other.id, other.student
            )));
        }
        tables.next_sequence += 1;
        let mut stored = request.clone();
        stored.sequence = tables.next_sequence;
        tables.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn get_request(&self, id: &RequestId) -> Result<CertificationRequest, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))
    }

    fn decide(
        &self,
        id: &RequestId,
        decision: &Decision,
    ) -> Result<CertificationRequest, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut request = tables
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("request {id}")))?;
        if let Err(current) = request.apply(decision) {
            return Err(StoreError::StatusConflict { current });
        }
        request
            .check_invariants()
            .map_err(|e| StoreError::Corruption(e.to_string()))?;
        if let Some(code) = &request.verification_code {
            if tables.codes.contains_key(code.as_str()) {
                return Err(StoreError::Duplicate(
                    "verification code already issued".to_string(),
                ));
            }
            tables.codes.insert(code.as_str().to_string(), request.id);
        }
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn pending_requests(&self, limit: usize) -> Result<Vec<CertificationRequest>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut pending: Vec<_> = tables
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| (r.requested_at, r.sequence));
        pending.truncate(limit);
        Ok(pending)
    }

    fn requests_for_student(
        &self,
        student: &StudentRef,
    ) -> Result<Vec<CertificationRequest>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut history: Vec<_> = tables
            .requests
            .values()
            .filter(|r| &r.student == student)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        Ok(history)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<CertificationRequest>, StoreError> {
        self.code_lookups.fetch_add(1, Ordering::SeqCst);
        if self.lookups_down.load(Ordering::SeqCst) {
            return Err(injected("lookup"));
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .codes
            .get(code)
            .and_then(|id| tables.requests.get(id))
            .cloned())
    }

    fn request_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.lock().unwrap().requests.len() as u64)
    }
}

impl StudentStore for NullStore {
    fn put_student(&self, student: &Student) -> Result<(), StoreError> {
        self.tables
            .lock()
            .unwrap()
            .students
            .insert(student.usn.clone(), student.clone());
        Ok(())
    }

    fn get_student(&self, usn: &StudentRef) -> Result<Student, StoreError> {
        if self.lookups_down.load(Ordering::SeqCst) {
            return Err(injected("lookup"));
        }
        self.tables
            .lock()
            .unwrap()
            .students
            .get(usn)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("student {usn}")))
    }
}

impl AcademicRecordStore for NullStore {
    fn upsert_record(&self, record: &AcademicRecord) -> Result<(), StoreError> {
        self.tables.lock().unwrap().records.insert(
            (record.student.clone(), record.semester.get()),
            record.clone(),
        );
        Ok(())
    }

    fn records_for_student(
        &self,
        student: &StudentRef,
    ) -> Result<Vec<AcademicRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .range((student.clone(), 0)..=(student.clone(), u8::MAX))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl AuditStore for NullStore {
    fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        if self.audit_down.load(Ordering::SeqCst) {
            return Err(injected("audit"));
        }
        self.tables.lock().unwrap().audit.push(entry.clone());
        Ok(())
    }

    fn latest(&self, offset: usize, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .audit
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn audit_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.lock().unwrap().audit.len() as u64)
    }
}

impl ObjectStore for NullStore {
    fn put_object(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let armed = self
            .failing_object_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(injected("object write"));
        }
        self.tables.lock().unwrap().objects.insert(
            name.to_string(),
            StoredObject {
                name: name.to_string(),
                content_type: content_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        self.object_puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get_object(&self, name: &str) -> Result<StoredObject, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .objects
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("object {name}")))
    }

    fn delete_object(&self, name: &str) -> Result<(), StoreError> {
        self.tables.lock().unwrap().objects.remove(name);
        Ok(())
    }

    fn object_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.lock().unwrap().objects.len() as u64)
    }
}

impl MetaStore for NullStore {
    fn schema_version(&self) -> Result<u32, StoreError> {
        Ok(self.tables.lock().unwrap().schema_version)
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.tables.lock().unwrap().schema_version = version;
        Ok(())
    }
}
