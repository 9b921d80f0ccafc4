//! JSON bundles describing a user's state, embedded in analysis and plan prompts.
//! Dates serialize as ISO-8601 strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::plan::{Plan, PlanType};
use crate::models::profile::Profile;
use crate::models::progress::{MetricMap, Progress, Trend, TrendPoint};

#[derive(Debug, Serialize)]
pub struct EntrySnapshot<'a> {
    pub date: DateTime<Utc>,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    pub measurements: Option<&'a MetricMap>,
    pub workout_performance: Option<&'a MetricMap>,
    pub energy_level: Option<i32>,
    pub mood: Option<i32>,
    pub sleep_quality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

impl<'a> EntrySnapshot<'a> {
    pub fn new(entry: &'a Progress, with_notes: bool) -> Self {
        Self {
            date: entry.date,
            weight: entry.weight,
            body_fat: entry.body_fat,
            measurements: entry.measurements.as_ref().map(|m| &m.0),
            workout_performance: entry.workout_performance.as_ref().map(|m| &m.0),
            energy_level: entry.energy_level,
            mood: entry.mood,
            sleep_quality: entry.sleep_quality,
            notes: if with_notes { entry.notes.as_deref() } else { None },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanSnapshot<'a> {
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Plan> for PlanSnapshot<'a> {
    fn from(plan: &'a Plan) -> Self {
        Self {
            plan_type: plan.plan_type,
            content: &plan.content,
            created_at: plan.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendSnapshot<'a> {
    pub data: &'a [TrendPoint],
    pub change: Option<f64>,
}

/// Input for the progress analysis prompt.
#[derive(Debug, Serialize)]
pub struct ProgressSnapshot<'a> {
    pub user_profile: Option<&'a Profile>,
    pub progress_entries: Vec<EntrySnapshot<'a>>,
    pub active_plans: Vec<PlanSnapshot<'a>>,
    pub trends: BTreeMap<&'a str, TrendSnapshot<'a>>,
}

impl<'a> ProgressSnapshot<'a> {
    /// Trends with no points are left out.
    pub fn new(
        profile: Option<&'a Profile>,
        entries: &'a [Progress],
        plans: &'a [Plan],
        trends: &'a [Trend],
    ) -> Self {
        Self {
            user_profile: profile,
            progress_entries: entries.iter().map(|e| EntrySnapshot::new(e, true)).collect(),
            active_plans: plans.iter().map(PlanSnapshot::from).collect(),
            trends: trends
                .iter()
                .filter(|trend| !trend.data.is_empty())
                .map(|trend| {
                    (
                        trend.metric.as_str(),
                        TrendSnapshot {
                            data: &trend.data,
                            change: trend.change,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OriginalPlanSnapshot<'a> {
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Input for adaptive plan generation.
#[derive(Debug, Serialize)]
pub struct AdaptiveSnapshot<'a> {
    pub user_profile: Option<&'a Profile>,
    pub progress_entries: Vec<EntrySnapshot<'a>>,
    pub original_plan: Option<OriginalPlanSnapshot<'a>>,
    pub plan_type: PlanType,
}

impl<'a> AdaptiveSnapshot<'a> {
    pub fn new(
        profile: Option<&'a Profile>,
        entries: &'a [Progress],
        original: Option<&'a Plan>,
        plan_type: PlanType,
    ) -> Self {
        Self {
            user_profile: profile,
            progress_entries: entries.iter().map(|e| EntrySnapshot::new(e, false)).collect(),
            original_plan: original.map(|plan| OriginalPlanSnapshot {
                content: &plan.content,
                created_at: plan.created_at,
            }),
            plan_type,
        }
    }
}
