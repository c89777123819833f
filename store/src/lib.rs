//! Abstract storage traits for transcript issuance.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! The one serialization point in the system is [`RequestStore::decide`]: the
//! status check and the status update must happen as one atomic operation.

pub mod audit;
pub mod error;
pub mod meta;
pub mod object;
pub mod record;
pub mod request;
pub mod student;

pub use audit::AuditStore;
pub use error::StoreError;
pub use meta::MetaStore;
pub use object::{ObjectStore, StoredObject};
pub use record::AcademicRecordStore;
pub use request::RequestStore;
pub use student::StudentStore;
