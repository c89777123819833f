//! LMDB implementation of AcademicRecordStore.
//!
//! Keys are `usn ++ 0x00 ++ semester`, so a prefix scan over one student
//! yields their records already in ascending semester order.

use heed::types::Bytes;
use heed::{Database, Env};

use transcript_store::record::AcademicRecordStore;
use transcript_store::StoreError;
use transcript_types::{AcademicRecord, StudentRef};

use crate::keys::{decode, encode, record_key, student_prefix};
use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Env,
    pub(crate) records_db: Database<Bytes, Bytes>,
}

impl AcademicRecordStore for LmdbRecordStore {
    fn upsert_record(&self, record: &AcademicRecord) -> Result<(), StoreError> {
        let bytes = encode(record)?;
        let key = record_key(&record.student, record.semester);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.records_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn records_for_student(
        &self,
        student: &StudentRef,
    ) -> Result<Vec<AcademicRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = student_prefix(student);
        let mut records = Vec::new();
        for entry in self
            .records_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?
        {
            let (_key, val) = entry.map_err(LmdbError::from)?;
            records.push(decode(val)?);
        }
        Ok(records)
    }
}
