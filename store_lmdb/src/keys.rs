//! Key layouts and value codecs shared by the LMDB stores.
//!
//! | database        | key                                   | value                    |
//! |-----------------|---------------------------------------|--------------------------|
//! | `requests`      | request id (16 bytes)                 | bincode request          |
//! | `pending_index` | requested_at BE ++ sequence BE        | request id               |
//! | `student_index` | usn ++ 0x00 ++ sequence BE            | request id               |
//! | `code_index`    | verification code                     | request id               |
//! | `records`       | usn ++ 0x00 ++ semester               | bincode record           |
//! | `audit`         | sequence BE                           | bincode entry            |

use heed::types::Bytes;
use heed::{Database, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use transcript_types::{Semester, StudentRef, Timestamp};

use crate::LmdbError;

pub(crate) const REQUEST_SEQ_KEY: &[u8] = b"request_seq";
pub(crate) const AUDIT_SEQ_KEY: &[u8] = b"audit_seq";

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn pending_key(requested_at: Timestamp, sequence: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&requested_at.to_be_bytes());
    key[8..].copy_from_slice(&sequence.to_be_bytes());
    key
}

/// `usn ++ 0x00`. USNs are alphanumeric, so the separator cannot collide.
pub(crate) fn student_prefix(usn: &StudentRef) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(usn.as_str().len() + 1);
    prefix.extend_from_slice(usn.as_str().as_bytes());
    prefix.push(0);
    prefix
}

pub(crate) fn student_request_key(usn: &StudentRef, sequence: u64) -> Vec<u8> {
    let mut key = student_prefix(usn);
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

pub(crate) fn record_key(usn: &StudentRef, semester: Semester) -> Vec<u8> {
    let mut key = student_prefix(usn);
    key.push(semester.get());
    key
}

pub(crate) fn request_id_from(bytes: &[u8]) -> Result<[u8; 16], LmdbError> {
    bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("index value has {} bytes, expected 16", bytes.len())))
}

/// Read-increment-write a counter inside an open write transaction.
///
/// The first value handed out is 1.
pub(crate) fn next_sequence(
    meta: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn<'_>,
    key: &[u8],
) -> Result<u64, LmdbError> {
    let current = match meta.get(wtxn, key)? {
        Some(bytes) if bytes.len() == 8 => {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(bytes);
            u64::from_be_bytes(arr)
        }
        Some(_) => {
            return Err(LmdbError::Serialization(format!(
                "counter {} has unexpected byte length",
                String::from_utf8_lossy(key)
            )))
        }
        None => 0,
    };
    let next = current + 1;
    meta.put(wtxn, key, &next.to_be_bytes())?;
    Ok(next)
}
