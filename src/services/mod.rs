//! Data access for each entity. The CRUD services never check ownership; handlers do
//! that through `utils::guard` before calling in.

use serde::Serialize;

pub mod chat;
pub mod insights;
pub mod plans;
pub mod profiles;
pub mod progress;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// Result of a delete. A missing row is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

impl DeleteOutcome {
    pub(crate) fn from_rows(rows_affected: u64, entity: &str) -> Self {
        if rows_affected == 0 {
            Self {
                success: false,
                message: format!("{} not found", entity),
            }
        } else {
            Self {
                success: true,
                message: format!("{} deleted successfully", entity),
            }
        }
    }
}

/// Offset pagination with the limit clamped to `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
