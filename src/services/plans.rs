use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::plan::{Plan, PlanPatch, PlanType};
use crate::services::{DeleteOutcome, Page};

/// Inserts a plan. Generic over the executor so mark-plan can run it inside its transaction.
pub async fn create<'e, E>(
    db: E,
    owner_id: i64,
    plan_type: PlanType,
    content: &str,
) -> Result<Plan, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Plan>(
        r#"
        INSERT INTO plans (user_id, type, content, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, type, content, created_at
        "#,
    )
    .bind(owner_id)
    .bind(plan_type.as_str())
    .bind(content)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(
        "SELECT id, user_id, type, content, created_at FROM plans WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Newest first.
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    page: Page,
) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, user_id, type, content, created_at
        FROM plans
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(pool)
    .await
}

pub async fn list_by_type(
    pool: &SqlitePool,
    owner_id: i64,
    plan_type: PlanType,
    page: Page,
) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, user_id, type, content, created_at
        FROM plans
        WHERE user_id = ? AND type = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(owner_id)
    .bind(plan_type.as_str())
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(pool)
    .await
}

/// Applies the fields present in `patch`. Returns `None` if the plan does not exist.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    patch: PlanPatch,
) -> Result<Option<Plan>, sqlx::Error> {
    if patch.is_empty() {
        return get_by_id(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE plans SET ");
    let mut separated = builder.separated(", ");

    if let Some(plan_type) = patch.plan_type {
        separated.push("type = ");
        separated.push_bind_unseparated(plan_type.as_str());
    }

    if let Some(content) = patch.content {
        separated.push("content = ");
        separated.push_bind_unseparated(content);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING id, user_id, type, content, created_at");

    builder.build_query_as::<Plan>().fetch_optional(pool).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(DeleteOutcome::from_rows(result.rows_affected(), "Plan"))
}
