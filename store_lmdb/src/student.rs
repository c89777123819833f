//! LMDB implementation of StudentStore.

use heed::types::Bytes;
use heed::{Database, Env};

use transcript_store::student::StudentStore;
use transcript_store::StoreError;
use transcript_types::{Student, StudentRef};

use crate::keys::{decode, encode};
use crate::LmdbError;

pub struct LmdbStudentStore {
    pub(crate) env: Env,
    pub(crate) students_db: Database<Bytes, Bytes>,
}

impl StudentStore for LmdbStudentStore {
    fn put_student(&self, student: &Student) -> Result<(), StoreError> {
        let bytes = encode(student)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.students_db
            .put(&mut wtxn, student.usn.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_student(&self, usn: &StudentRef) -> Result<Student, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .students_db
            .get(&rtxn, usn.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("student {usn}")))?;
        Ok(decode(bytes)?)
    }
}
