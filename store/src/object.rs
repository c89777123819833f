//! Durable object storage for rendered certificates.

use crate::StoreError;
use serde::{Deserialize, Serialize};

/// A named artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Named artifact store.
///
/// `put` is an idempotent upsert: storing under an existing name replaces the
/// previous artifact instead of creating a second one.
pub trait ObjectStore: Send + Sync {
    fn put_object(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    fn get_object(&self, name: &str) -> Result<StoredObject, StoreError>;

    /// Remove `name`. Removing a missing object is not an error.
    fn delete_object(&self, name: &str) -> Result<(), StoreError>;

    fn object_count(&self) -> Result<u64, StoreError>;
}
