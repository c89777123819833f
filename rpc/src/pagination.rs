//! Cursor-based pagination for the audit listing.
//!
//! The cursor is an opaque hex token wrapping the offset of the next page
//! in the newest-first ordering.

use serde::{Deserialize, Serialize};

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub cursor: Option<String>,
    pub count: Option<usize>,
}

impl PaginationParams {
    /// Page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self, default: usize) -> usize {
        self.count.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset encoded in the cursor; 0 if absent or unreadable.
    pub fn decode_offset(&self) -> usize {
        self.cursor.as_deref().and_then(decode_cursor).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Cursor for the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

pub fn encode_cursor(offset: usize) -> String {
    hex::encode((offset as u64).to_be_bytes())
}

pub fn decode_cursor(cursor: &str) -> Option<usize> {
    let bytes: [u8; 8] = hex::decode(cursor).ok()?.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(bytes)).ok()
}

/// Cursor for the page after one that started at `offset` and returned
/// `returned` of `page_size` items. `None` on a short page.
pub fn next_cursor(offset: usize, returned: usize, page_size: usize) -> Option<String> {
    (returned >= page_size).then(|| encode_cursor(offset + returned))
}
