//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::{
    LmdbAuditStore, LmdbError, LmdbMetaStore, LmdbObjectStore, LmdbRecordStore,
    LmdbRequestStore, LmdbStudentStore, Migrator,
};

/// Number of named databases opened by [`LmdbEnvironment::open`].
const MAX_DBS: u32 = 16;

/// Handles for every named database in the environment.
#[derive(Clone, Copy)]
pub(crate) struct Databases {
    pub requests: Database<Bytes, Bytes>,
    pub pending_index: Database<Bytes, Bytes>,
    pub student_index: Database<Bytes, Bytes>,
    pub code_index: Database<Bytes, Bytes>,
    pub students: Database<Bytes, Bytes>,
    pub records: Database<Bytes, Bytes>,
    pub audit: Database<Bytes, Bytes>,
    pub artifacts: Database<Bytes, Bytes>,
    pub meta: Database<Bytes, Bytes>,
}

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    dbs: Databases,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment directory is owned by this process; it is
        // never opened twice from the same process, which is the condition
        // LMDB requires.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let dbs = Databases {
            requests: env.create_database(&mut wtxn, Some("requests"))?,
            pending_index: env.create_database(&mut wtxn, Some("pending_index"))?,
            student_index: env.create_database(&mut wtxn, Some("student_index"))?,
            code_index: env.create_database(&mut wtxn, Some("code_index"))?,
            students: env.create_database(&mut wtxn, Some("students"))?,
            records: env.create_database(&mut wtxn, Some("records"))?,
            audit: env.create_database(&mut wtxn, Some("audit"))?,
            artifacts: env.create_database(&mut wtxn, Some("artifacts"))?,
            meta: env.create_database(&mut wtxn, Some("meta"))?,
        };
        wtxn.commit()?;

        let environment = Self { env, dbs };
        Migrator::run(&environment.meta_store())?;
        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(environment)
    }

    pub fn request_store(&self) -> LmdbRequestStore {
        LmdbRequestStore {
            env: self.env.clone(),
            dbs: self.dbs,
        }
    }

    pub fn student_store(&self) -> LmdbStudentStore {
        LmdbStudentStore {
            env: self.env.clone(),
            students_db: self.dbs.students,
        }
    }

    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: self.env.clone(),
            records_db: self.dbs.records,
        }
    }

    pub fn audit_store(&self) -> LmdbAuditStore {
        LmdbAuditStore {
            env: self.env.clone(),
            audit_db: self.dbs.audit,
            meta_db: self.dbs.meta,
        }
    }

    pub fn object_store(&self) -> LmdbObjectStore {
        LmdbObjectStore {
            env: self.env.clone(),
            artifacts_db: self.dbs.artifacts,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: self.env.clone(),
            meta_db: self.dbs.meta,
        }
    }
}
