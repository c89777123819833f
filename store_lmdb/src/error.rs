use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema version {stored} is newer than supported version {supported}")]
    SchemaTooNew { stored: u32, supported: u32 },

    #[error("no migration from schema version {from}")]
    NoMigration { from: u32 },
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for transcript_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(key) => transcript_store::StoreError::NotFound(key),
            LmdbError::Serialization(msg) => transcript_store::StoreError::Serialization(msg),
            other => transcript_store::StoreError::Backend(other.to_string()),
        }
    }
}
