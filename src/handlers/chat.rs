// src/handlers/chat.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    coach::CoachModel,
    error::AppError,
    models::{
        chat::{ChatHistory, ChatMessagePatch, HistoryParams, SendMessageRequest},
        user::User,
    },
    services::{Page, chat, profiles},
    utils::guard::load_owned,
};

/// Stores the caller's message and the coach's reply.
/// The reply is an apology when the coach is unavailable; the request still succeeds.
pub async fn send_message(
    State(pool): State<SqlitePool>,
    State(model): State<Arc<dyn CoachModel>>,
    Extension(user): Extension<User>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = profiles::get_by_user(&pool, user.id).await?;

    let reply = chat::process_user_message(
        &pool,
        model.as_ref(),
        user.id,
        &payload.content,
        profile.as_ref(),
    )
    .await?;

    Ok(Json(reply))
}

/// Oldest first.
pub async fn get_history(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(params.skip, params.limit);

    let messages = chat::list_by_owner(&pool, user.id, page).await?;

    Ok(Json(ChatHistory { messages }))
}

/// Updates a message's plan flags. Setting `is_plan` with a `plan_type` also saves it as a plan.
pub async fn mark_plan(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<ChatMessagePatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let message = load_owned(chat::get_by_id(&pool, &id), user.id).await?;

    let (updated, plan_id) = chat::mark_as_plan(&pool, &message, &payload).await?;
    let updated = updated.ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    if let Some(plan_id) = plan_id {
        tracing::info!(user_id = user.id, plan_id, message_id = %updated.id, "saved chat message as plan");
    }

    Ok(Json(json!({
        "message": updated,
        "plan_id": plan_id,
    })))
}

pub async fn delete_message(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_owned(chat::get_by_id(&pool, &id), user.id).await?;

    let outcome = chat::delete_message(&pool, &id).await?;
    if !outcome.success {
        return Err(AppError::NotFound(outcome.message));
    }

    Ok(Json(json!({ "message": outcome.message })))
}
