// src/handlers/progress.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    coach::CoachModel,
    error::AppError,
    models::{
        plan::PlanType,
        progress::{
            AdaptivePlanParams, CreateProgressRequest, ProgressList, ProgressListParams,
            ProgressPatch, WindowParams,
        },
        user::User,
    },
    services::{Page, insights, progress},
    utils::guard::load_owned,
};

pub async fn create_progress(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = progress::create(&pool, user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Lists the caller's entries, most recent first. `days` switches to a date window.
pub async fn list_progress(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Query(params): Query<ProgressListParams>,
) -> Result<impl IntoResponse, AppError> {
    let entries = match params.days {
        Some(days) => progress::list_recent(&pool, user.id, days).await?,
        None => {
            let page = Page::new(params.skip, params.limit);
            progress::list_by_owner(&pool, user.id, page).await?
        }
    };

    Ok(Json(ProgressList { progress: entries }))
}

pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let entry = load_owned(progress::get_by_id(&pool, id), user.id).await?;
    Ok(Json(entry))
}

pub async fn update_progress(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<ProgressPatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    load_owned(progress::get_by_id(&pool, id), user.id).await?;

    let entry = progress::update(&pool, id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Progress entry not found".to_string()))?;

    Ok(Json(entry))
}

pub async fn delete_progress(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_owned(progress::get_by_id(&pool, id), user.id).await?;

    let outcome = progress::delete(&pool, id).await?;
    if !outcome.success {
        return Err(AppError::NotFound(outcome.message));
    }

    Ok(Json(json!({ "message": outcome.message })))
}

/// Series of one metric, e.g. `weight`, `body_fat` or `measurement.waist`.
pub async fn get_trend(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(metric): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params.days.unwrap_or(progress::DEFAULT_TREND_DAYS);

    let trend = progress::trend(&pool, user.id, &metric, days).await?;

    Ok(Json(trend))
}

pub async fn analyze_progress(
    State(pool): State<SqlitePool>,
    State(model): State<Arc<dyn CoachModel>>,
    Extension(user): Extension<User>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params.days.unwrap_or(insights::DEFAULT_ANALYSIS_DAYS);

    let analysis = insights::analyze_progress(&pool, model.as_ref(), user.id, days).await?;

    Ok(Json(analysis))
}

pub async fn create_adaptive_plan(
    State(pool): State<SqlitePool>,
    State(model): State<Arc<dyn CoachModel>>,
    Extension(user): Extension<User>,
    Query(params): Query<AdaptivePlanParams>,
) -> Result<impl IntoResponse, AppError> {
    let plan_type = params
        .plan_type
        .parse::<PlanType>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created = insights::create_adaptive_plan(
        &pool,
        model.as_ref(),
        user.id,
        plan_type,
        params.original_plan_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
