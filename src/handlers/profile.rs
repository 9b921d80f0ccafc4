// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{profile::ProfilePatch, user::User},
    services::profiles,
};

/// Returns the caller's profile, creating an empty one on first access.
pub async fn get_my_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let (profile, created) = profiles::get_or_create(&pool, user.id).await?;

    if created {
        tracing::info!(user_id = user.id, "created empty profile on first access");
    }

    Ok(Json(profile))
}

/// Creates the caller's profile. 400 if one already exists.
pub async fn create_my_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<ProfilePatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if profiles::get_by_user(&pool, user.id).await?.is_some() {
        return Err(AppError::BadRequest(
            "Profile already exists. Use PUT to update.".to_string(),
        ));
    }

    let profile = profiles::create(&pool, user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Updates the present fields, creating the profile if needed.
pub async fn update_my_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<ProfilePatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = profiles::update(&pool, user.id, payload).await?;

    Ok(Json(profile))
}

pub async fn delete_my_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = profiles::delete(&pool, user.id).await?;
    if !outcome.success {
        return Err(AppError::NotFound(outcome.message));
    }

    Ok(Json(json!({ "message": outcome.message })))
}
