//! Coach-backed progress analysis and adaptive plan generation.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::coach::{
    self, CoachModel, ProgressInsights,
    snapshot::{AdaptiveSnapshot, ProgressSnapshot},
};
use crate::error::AppError;
use crate::models::plan::{Plan, PlanType};
use crate::services::{Page, plans, profiles, progress};
use crate::utils::guard::load_owned;

pub const DEFAULT_ANALYSIS_DAYS: i64 = 30;
const ADAPTIVE_WINDOW_DAYS: i64 = 30;
const ANALYZED_PLANS: i64 = 3;
const ANALYZED_METRICS: [&str; 2] = ["weight", "body_fat"];

pub const NOT_ENOUGH_DATA: &str =
    "Not enough progress data for analysis. Please log more progress entries.";

#[derive(Debug, Serialize)]
pub struct ProgressAnalysis {
    pub success: bool,
    #[serde(flatten)]
    pub insights: ProgressInsights,
}

#[derive(Debug, Serialize)]
pub struct AdaptivePlan {
    pub success: bool,
    pub message: String,
    pub plan: Plan,
}

/// Analyzes the owner's last `days` days of progress. Fails with 400 when there is
/// nothing to analyze or the coach cannot answer.
pub async fn analyze_progress(
    pool: &SqlitePool,
    model: &dyn CoachModel,
    owner_id: i64,
    days: i64,
) -> Result<ProgressAnalysis, AppError> {
    let days = progress::clamp_window(days);
    let entries = progress::list_recent(pool, owner_id, days).await?;
    if entries.is_empty() {
        return Err(AppError::BadRequest(NOT_ENOUGH_DATA.to_string()));
    }

    let profile = profiles::get_by_user(pool, owner_id).await?;
    let recent_plans = plans::list_by_owner(pool, owner_id, Page::new(None, Some(ANALYZED_PLANS))).await?;
    let trends: Vec<_> = ANALYZED_METRICS
        .iter()
        .map(|metric| progress::compute_trend(metric, &entries, days))
        .collect();

    let snapshot = ProgressSnapshot::new(profile.as_ref(), &entries, &recent_plans, &trends);
    let insights = coach::analyze_progress(model, &snapshot).await?;

    Ok(ProgressAnalysis {
        success: true,
        insights,
    })
}

/// Generates a plan from the owner's profile and recent progress, optionally adapting
/// one of their existing plans, and stores it.
pub async fn create_adaptive_plan(
    pool: &SqlitePool,
    model: &dyn CoachModel,
    owner_id: i64,
    plan_type: PlanType,
    original_plan_id: Option<i64>,
) -> Result<AdaptivePlan, AppError> {
    let original = match original_plan_id {
        Some(id) => Some(load_owned(plans::get_by_id(pool, id), owner_id).await?),
        None => None,
    };

    let profile = profiles::get_by_user(pool, owner_id).await?;
    let entries = progress::list_recent(pool, owner_id, ADAPTIVE_WINDOW_DAYS).await?;

    let snapshot = AdaptiveSnapshot::new(profile.as_ref(), &entries, original.as_ref(), plan_type);
    let content = coach::generate_adaptive_plan(model, plan_type, &snapshot).await?;

    let plan = plans::create(pool, owner_id, plan_type, &content).await?;
    tracing::info!(user_id = owner_id, plan_id = plan.id, "adaptive plan created");

    Ok(AdaptivePlan {
        success: true,
        message: "Adaptive plan created successfully".to_string(),
        plan,
    })
}
