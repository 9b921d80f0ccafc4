use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Named numeric readings, e.g. `{"waist": 82.0}` or `{"bench_press": 80.0}`.
pub type MetricMap = BTreeMap<String, f64>;

/// Represents the 'progress' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Progress {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,

    pub weight: Option<f64>,
    pub body_fat: Option<f64>,

    pub measurements: Option<Json<MetricMap>>,
    pub workout_performance: Option<Json<MetricMap>>,

    pub energy_level: Option<i32>,
    pub mood: Option<i32>,
    pub sleep_quality: Option<i32>,

    pub notes: Option<String>,
}

/// DTO for logging a progress entry. `date` defaults to now.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateProgressRequest {
    pub date: Option<DateTime<Utc>>,

    #[validate(range(exclusive_min = 0.0, max = 500.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub body_fat: Option<f64>,

    pub measurements: Option<MetricMap>,
    pub workout_performance: Option<MetricMap>,

    #[validate(range(min = 1, max = 10))]
    pub energy_level: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub mood: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub sleep_quality: Option<i32>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Partial update of a progress entry. Missing and `null` fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProgressPatch {
    pub date: Option<DateTime<Utc>>,

    #[validate(range(exclusive_min = 0.0, max = 500.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub body_fat: Option<f64>,

    pub measurements: Option<MetricMap>,
    pub workout_performance: Option<MetricMap>,

    #[validate(range(min = 1, max = 10))]
    pub energy_level: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub mood: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub sleep_quality: Option<i32>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl ProgressPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.weight.is_none()
            && self.body_fat.is_none()
            && self.measurements.is_none()
            && self.workout_performance.is_none()
            && self.energy_level.is_none()
            && self.mood.is_none()
            && self.sleep_quality.is_none()
            && self.notes.is_none()
    }
}

/// Query parameters for listing progress entries.
/// When `days` is set, pagination is ignored and the recent window is returned.
#[derive(Debug, Deserialize)]
pub struct ProgressListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProgressList {
    pub progress: Vec<Progress>,
}

/// Query parameters shared by trend and analysis endpoints.
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdaptivePlanParams {
    pub plan_type: String,
    pub original_plan_id: Option<i64>,
}

/// A single point of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Ordered series for one metric plus the first-to-last change.
#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub metric: String,
    pub data: Vec<TrendPoint>,
    /// `None` unless at least two points exist.
    pub change: Option<f64>,
    pub period_days: i64,
}
