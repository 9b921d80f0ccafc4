use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Kind of plan. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Workout,
    Diet,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Workout => "workout",
            PlanType::Diet => "diet",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid plan type '{0}', expected 'workout' or 'diet'")]
pub struct InvalidPlanType(pub String);

/// Case-insensitive, so query parameters like `Workout` are accepted.
impl FromStr for PlanType {
    type Err = InvalidPlanType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workout" => Ok(PlanType::Workout),
            "diet" => Ok(PlanType::Diet),
            _ => Err(InvalidPlanType(s.to_string())),
        }
    }
}

impl TryFrom<String> for PlanType {
    type Error = InvalidPlanType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'plans' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: i64,
    pub user_id: i64,

    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub plan_type: PlanType,

    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new plan.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[serde(rename = "type")]
    pub plan_type: PlanType,

    #[validate(length(
        min = 1,
        max = 20000,
        message = "Content length must be between 1 and 20000 chars"
    ))]
    pub content: String,
}

/// Partial update. Missing and `null` fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PlanPatch {
    #[serde(rename = "type")]
    pub plan_type: Option<PlanType>,

    #[validate(length(
        min = 1,
        max = 20000,
        message = "Content length must be between 1 and 20000 chars"
    ))]
    pub content: Option<String>,
}

impl PlanPatch {
    pub fn is_empty(&self) -> bool {
        self.plan_type.is_none() && self.content.is_none()
    }
}

/// Query parameters for listing plans.
#[derive(Debug, Deserialize)]
pub struct PlanListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub plan_type: Option<PlanType>,
}

#[derive(Debug, Serialize)]
pub struct PlanList {
    pub plans: Vec<Plan>,
}

/// Result of asking the coach to review a plan.
#[derive(Debug, Serialize)]
pub struct PlanAnalysis {
    pub analysis_id: String,
    pub plan_id: i64,
    pub analysis: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_type_parses_case_insensitively() {
        assert_eq!("Workout".parse::<PlanType>().unwrap(), PlanType::Workout);
        assert_eq!(" diet ".parse::<PlanType>().unwrap(), PlanType::Diet);
        assert!("meditation".parse::<PlanType>().is_err());
    }

    #[test]
    fn patch_treats_null_as_absent() {
        let patch: PlanPatch = serde_json::from_str(r#"{"type": null, "content": "x"}"#).unwrap();
        assert!(patch.plan_type.is_none());
        assert_eq!(patch.content.as_deref(), Some("x"));

        let empty: PlanPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
