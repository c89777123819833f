//! Schema versioning for the LMDB environment.
//!
//! The version lives in the `meta` database. On open, every step between the
//! stored version and [`CURRENT_SCHEMA_VERSION`] is applied in order, then the
//! new version is written. A database stamped by a newer build is refused.

use transcript_store::MetaStore;

use crate::LmdbError;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// One upgrade step, keyed by the version it upgrades *from*.
type Step = fn() -> Result<(), LmdbError>;

/// Version 0 is a fresh environment; its databases were created on open.
const STEPS: &[(u32, Step)] = &[(0, || Ok(()))];

pub struct Migrator;

impl Migrator {
    pub fn run(meta_store: &impl MetaStore) -> Result<(), LmdbError> {
        let stored = meta_store
            .schema_version()
            .map_err(|e| LmdbError::Heed(e.to_string()))?;

        if stored > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if stored == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = stored, "schema up to date");
            return Ok(());
        }

        for from in stored..CURRENT_SCHEMA_VERSION {
            let (_, step) = STEPS
                .iter()
                .find(|(v, _)| *v == from)
                .ok_or(LmdbError::NoMigration { from })?;
            step()?;
            tracing::info!(from, to = from + 1, "applied schema step");
        }

        meta_store
            .set_schema_version(CURRENT_SCHEMA_VERSION)
            .map_err(|e| LmdbError::Heed(e.to_string()))?;
        Ok(())
    }
}
