//! LMDB storage backend for transcript issuance.
//!
//! Implements all storage traits from `transcript-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment. LMDB allows one write transaction at a time, which is
//! what makes [`LmdbRequestStore`]'s conditional decision update atomic.

pub mod artifact;
pub mod audit;
pub mod environment;
pub mod error;
mod keys;
pub mod meta;
pub mod migration;
pub mod record;
pub mod request;
pub mod student;

pub use artifact::LmdbObjectStore;
pub use audit::LmdbAuditStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
pub use record::LmdbRecordStore;
pub use request::LmdbRequestStore;
pub use student::LmdbStudentStore;
