// src/handlers/plans.rs

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
    coach::{self, CoachModel},
    error::AppError,
    models::{
        plan::{CreatePlanRequest, PlanList, PlanListParams, PlanPatch},
        user::User,
    },
    services::{Page, plans, profiles},
    utils::guard::load_owned,
};

pub async fn create_plan(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let plan = plans::create(&pool, user.id, payload.plan_type, &payload.content).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

/// Lists the caller's plans, newest first, optionally filtered by type.
pub async fn list_plans(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Query(params): Query<PlanListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(params.skip, params.limit);

    let plans = match params.plan_type {
        Some(plan_type) => plans::list_by_type(&pool, user.id, plan_type, page).await?,
        None => plans::list_by_owner(&pool, user.id, page).await?,
    };

    Ok(Json(PlanList { plans }))
}

pub async fn get_plan(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let plan = load_owned(plans::get_by_id(&pool, id), user.id).await?;
    Ok(Json(plan))
}

pub async fn update_plan(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<PlanPatch>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    load_owned(plans::get_by_id(&pool, id), user.id).await?;

    let plan = plans::update(&pool, id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

    Ok(Json(plan))
}

pub async fn delete_plan(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    load_owned(plans::get_by_id(&pool, id), user.id).await?;

    let outcome = plans::delete(&pool, id).await?;
    if !outcome.success {
        return Err(AppError::NotFound(outcome.message));
    }

    Ok(Json(json!({ "message": outcome.message })))
}

/// Asks the coach to review one of the caller's plans.
/// Coach failures still return 200 with an apology as the analysis text.
pub async fn analyze_plan(
    State(pool): State<SqlitePool>,
    State(model): State<Arc<dyn CoachModel>>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let plan = load_owned(plans::get_by_id(&pool, id), user.id).await?;
    let profile = profiles::get_by_user(&pool, user.id).await?;

    let analysis = coach::analyze_plan(model.as_ref(), &plan, profile.as_ref()).await;

    Ok(Json(analysis))
}
