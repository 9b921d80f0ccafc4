use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::coach::{self, CoachModel};
use crate::models::chat::{ChatMessage, ChatMessagePatch, ChatReply, ChatRole};
use crate::models::plan::PlanType;
use crate::models::profile::Profile;
use crate::services::{DeleteOutcome, Page};

const MESSAGE_COLUMNS: &str = "id, user_id, role, content, timestamp, is_plan, plan_type";

pub async fn create_message(
    pool: &SqlitePool,
    owner_id: i64,
    role: ChatRole,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (id, user_id, role, content, timestamp, is_plan, plan_type)
        VALUES (?, ?, ?, ?, ?, FALSE, NULL)
        RETURNING id, user_id, role, content, timestamp, is_plan, plan_type
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(owner_id)
    .bind(role.as_str())
    .bind(content)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Chronological order, oldest first.
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    page: Page,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(MESSAGE_COLUMNS);
    builder.push(" FROM chat_messages WHERE user_id = ");
    builder.push_bind(owner_id);
    builder.push(" ORDER BY timestamp ASC, rowid ASC LIMIT ");
    builder.push_bind(page.limit);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    builder.build_query_as::<ChatMessage>().fetch_all(pool).await
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ChatMessage>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(MESSAGE_COLUMNS);
    builder.push(" FROM chat_messages WHERE id = ");
    builder.push_bind(id);

    builder.build_query_as::<ChatMessage>().fetch_optional(pool).await
}

/// Applies the fields present in `patch`. Returns `None` if the message does not exist.
pub async fn update_message<'e, E>(
    db: E,
    id: &str,
    patch: &ChatMessagePatch,
) -> Result<Option<ChatMessage>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE chat_messages SET ");
    let mut separated = builder.separated(", ");

    if let Some(content) = &patch.content {
        separated.push("content = ");
        separated.push_bind_unseparated(content.as_str());
    }
    if let Some(is_plan) = patch.is_plan {
        separated.push("is_plan = ");
        separated.push_bind_unseparated(is_plan);
    }
    if let Some(plan_type) = patch.plan_type {
        separated.push("plan_type = ");
        separated.push_bind_unseparated(plan_type.as_str());
    }
    if patch.is_empty() {
        // No-op assignment keeps the statement valid and still reports a missing row.
        separated.push("id = id");
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(MESSAGE_COLUMNS);

    builder.build_query_as::<ChatMessage>().fetch_optional(db).await
}

pub async fn delete_message(pool: &SqlitePool, id: &str) -> Result<DeleteOutcome, sqlx::Error> {
    let result = sqlx::query("DELETE FROM chat_messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(DeleteOutcome::from_rows(result.rows_affected(), "Message"))
}

/// Marks a message as a plan and, when a plan type is given, materializes it as a Plan row.
/// Both writes share one transaction. Returns the updated message and the new plan id.
pub async fn mark_as_plan(
    pool: &SqlitePool,
    message: &ChatMessage,
    patch: &ChatMessagePatch,
) -> Result<(Option<ChatMessage>, Option<i64>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = update_message(&mut *tx, &message.id, patch).await?;

    let plan_id = match (patch.is_plan, patch.plan_type) {
        (Some(true), Some(plan_type)) => {
            let source = updated.as_ref().unwrap_or(message);
            Some(create_plan_from_message(&mut *tx, source, plan_type).await?)
        }
        _ => None,
    };

    tx.commit().await?;

    Ok((updated, plan_id))
}

/// Stores `message.content` as a new plan owned by the message owner.
pub async fn create_plan_from_message<'e, E>(
    db: E,
    message: &ChatMessage,
    plan_type: PlanType,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let plan = crate::services::plans::create(db, message.user_id, plan_type, &message.content).await?;
    Ok(plan.id)
}

/// Stores the user's turn, asks the coach, and stores the reply as the assistant turn.
/// Coach failures become an apology reply; only database errors are returned.
pub async fn process_user_message(
    pool: &SqlitePool,
    model: &dyn CoachModel,
    owner_id: i64,
    content: &str,
    profile: Option<&Profile>,
) -> Result<ChatReply, sqlx::Error> {
    create_message(pool, owner_id, ChatRole::User, content).await?;

    let reply = coach::chat_reply(model, content, profile).await;

    let stored = create_message(pool, owner_id, ChatRole::Assistant, &reply).await?;

    Ok(ChatReply {
        message_id: stored.id,
        response: stored.content,
        timestamp: stored.timestamp,
    })
}
