//! Everything that talks to the language model. This module is the only error boundary
//! between the external API and the rest of the service: callers get text, parsed
//! insights, or a `CoachFailure` carrying a user-facing message.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub mod client;
pub mod prompts;
pub mod snapshot;

pub use client::{CoachError, CoachModel, CompletionRequest, OpenAiClient, PromptMessage};

use crate::error::AppError;
use crate::models::plan::{Plan, PlanAnalysis, PlanType};
use crate::models::profile::Profile;
use snapshot::{AdaptiveSnapshot, ProgressSnapshot};

pub const CHAT_APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request. Please try again later.";

pub const PLAN_APOLOGY: &str =
    "I apologize, but I'm having trouble analyzing this plan. Please try again later.";

const CHAT_MAX_TOKENS: u32 = 1000;
const PLAN_ANALYSIS_MAX_TOKENS: u32 = 1500;
const PROGRESS_ANALYSIS_MAX_TOKENS: u32 = 1500;
const ADAPTIVE_PLAN_MAX_TOKENS: u32 = 2000;

/// A coach call that did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachFailure {
    pub message: String,
}

impl CoachFailure {
    fn new(context: &str, err: &CoachError) -> Self {
        tracing::warn!(error = %err, "{}", context);
        Self {
            message: format!("{}. Please try again later.", context),
        }
    }
}

impl From<CoachFailure> for AppError {
    fn from(failure: CoachFailure) -> Self {
        AppError::BadRequest(failure.message)
    }
}

/// Reply to a chat message. Falls back to `CHAT_APOLOGY` on any failure.
pub async fn chat_reply(model: &dyn CoachModel, message: &str, profile: Option<&Profile>) -> String {
    let request = CompletionRequest::new(
        prompts::chat_system(profile),
        message.to_string(),
        CHAT_MAX_TOKENS,
    );

    match model.complete(request).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(error = %err, "chat reply failed, sending apology");
            CHAT_APOLOGY.to_string()
        }
    }
}

/// Review of a plan. Falls back to `PLAN_APOLOGY` on any failure.
pub async fn analyze_plan(
    model: &dyn CoachModel,
    plan: &Plan,
    profile: Option<&Profile>,
) -> PlanAnalysis {
    let request = CompletionRequest::new(
        prompts::plan_analysis_system(profile),
        prompts::plan_analysis_user(plan),
        PLAN_ANALYSIS_MAX_TOKENS,
    );

    let analysis = match model.complete(request).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, plan_id = plan.id, "plan analysis failed");
            PLAN_APOLOGY.to_string()
        }
    };

    PlanAnalysis {
        analysis_id: Uuid::new_v4().to_string(),
        plan_id: plan.id,
        analysis,
        timestamp: Utc::now(),
    }
}

/// Structured reply of a progress analysis. Absent keys default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressInsights {
    pub analysis_summary: String,
    pub insights: Vec<Value>,
    pub recommendations: Vec<Value>,
    pub plan_adjustments: Map<String, Value>,
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

/// Parses the model's JSON reply, tolerating a surrounding markdown code fence.
pub fn parse_insights(raw: &str) -> Result<ProgressInsights, CoachError> {
    let body = CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw.trim(), |m| m.as_str());

    serde_json::from_str(body).map_err(|e| CoachError::Parse(e.to_string()))
}

pub async fn analyze_progress(
    model: &dyn CoachModel,
    snapshot: &ProgressSnapshot<'_>,
) -> Result<ProgressInsights, CoachFailure> {
    const CONTEXT: &str = "Error analyzing progress data";

    let bundle = serde_json::to_string(snapshot)
        .map_err(|e| CoachFailure::new(CONTEXT, &CoachError::Parse(e.to_string())))?;

    let request = CompletionRequest::new(
        prompts::PROGRESS_ANALYST_ROLE.to_string(),
        prompts::progress_analysis_user(&bundle),
        PROGRESS_ANALYSIS_MAX_TOKENS,
    );

    let raw = model
        .complete(request)
        .await
        .map_err(|e| CoachFailure::new(CONTEXT, &e))?;

    parse_insights(&raw).map_err(|e| CoachFailure::new(CONTEXT, &e))
}

/// Generates the text of a new plan adapted to the user's recent progress.
pub async fn generate_adaptive_plan(
    model: &dyn CoachModel,
    plan_type: PlanType,
    snapshot: &AdaptiveSnapshot<'_>,
) -> Result<String, CoachFailure> {
    const CONTEXT: &str = "Error generating adaptive plan";

    let bundle = serde_json::to_string(snapshot)
        .map_err(|e| CoachFailure::new(CONTEXT, &CoachError::Parse(e.to_string())))?;

    let request = CompletionRequest::new(
        prompts::adaptive_plan_system(plan_type.as_str()),
        prompts::adaptive_plan_user(plan_type.as_str(), &bundle),
        ADAPTIVE_PLAN_MAX_TOKENS,
    );

    model
        .complete(request)
        .await
        .map_err(|e| CoachFailure::new(CONTEXT, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_default_to_empty() {
        let parsed = parse_insights(r#"{"analysis_summary": "Steady progress"}"#).unwrap();
        assert_eq!(parsed.analysis_summary, "Steady progress");
        assert!(parsed.insights.is_empty());
        assert!(parsed.recommendations.is_empty());
        assert!(parsed.plan_adjustments.is_empty());
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"insights\": [{\"title\": \"Sleep\"}]}\n```";
        let parsed = parse_insights(raw).unwrap();
        assert_eq!(parsed.insights.len(), 1);
        assert_eq!(parsed.insights[0]["title"], "Sleep");
    }

    #[test]
    fn prose_reply_is_a_parse_error() {
        let err = parse_insights("You are doing great!").unwrap_err();
        assert!(matches!(err, CoachError::Parse(_)));
    }

    #[test]
    fn failure_message_is_user_facing() {
        let failure = CoachFailure::new(
            "Error analyzing progress data",
            &CoachError::Transport("connection refused".to_string()),
        );
        assert_eq!(
            failure.message,
            "Error analyzing progress data. Please try again later."
        );
    }
}
