//! Ownership checks for per-user rows.

use std::future::Future;

use crate::error::AppError;
use crate::models::{chat::ChatMessage, plan::Plan, progress::Progress};

/// A row that belongs to exactly one user.
pub trait Owned {
    /// Name used in error messages, e.g. "Plan".
    const KIND: &'static str;

    fn owner_id(&self) -> i64;
}

impl Owned for Plan {
    const KIND: &'static str = "Plan";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Progress {
    const KIND: &'static str = "Progress entry";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for ChatMessage {
    const KIND: &'static str = "Message";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// 404 when the row is missing, 403 when it belongs to someone else.
pub fn authorize<T: Owned>(row: Option<T>, user_id: i64) -> Result<T, AppError> {
    let row = row.ok_or_else(|| AppError::NotFound(format!("{} not found", T::KIND)))?;

    if row.owner_id() != user_id {
        return Err(AppError::Forbidden(format!(
            "Not authorized to access this {}",
            T::KIND.to_lowercase()
        )));
    }

    Ok(row)
}

/// Runs `loader` and checks the result belongs to `user_id`.
pub async fn load_owned<T, F>(loader: F, user_id: i64) -> Result<T, AppError>
where
    T: Owned,
    F: Future<Output = Result<Option<T>, sqlx::Error>>,
{
    let row = loader.await?;
    authorize(row, user_id)
}
