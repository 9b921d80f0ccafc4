use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub const FITNESS_LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

pub const FITNESS_GOALS: [&str; 6] = [
    "weight_loss",
    "muscle_gain",
    "endurance",
    "general_fitness",
    "strength",
    "flexibility",
];

/// Represents the 'user_profiles' table. One row per user at most.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,

    /// Centimetres.
    pub height: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    pub age: Option<i32>,

    pub fitness_level: Option<String>,
    pub fitness_goal: Option<String>,

    pub dietary_preferences: Option<String>,
    pub workout_preferences: Option<String>,
    pub available_equipment: Option<String>,

    pub health_conditions: Option<String>,
}

/// Profile fields sent by the client, used for both creation and partial update.
/// Missing and `null` fields are skipped on update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfilePatch {
    #[validate(range(exclusive_min = 0.0, max = 300.0, message = "Height must be in (0, 300] cm"))]
    pub height: Option<f64>,

    #[validate(range(exclusive_min = 0.0, max = 500.0, message = "Weight must be in (0, 500] kg"))]
    pub weight: Option<f64>,

    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: Option<i32>,

    #[validate(custom(function = validate_fitness_level))]
    pub fitness_level: Option<String>,

    #[validate(custom(function = validate_fitness_goal))]
    pub fitness_goal: Option<String>,

    #[validate(length(max = 1000))]
    pub dietary_preferences: Option<String>,
    #[validate(length(max = 1000))]
    pub workout_preferences: Option<String>,
    #[validate(length(max = 1000))]
    pub available_equipment: Option<String>,
    #[validate(length(max = 1000))]
    pub health_conditions: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.height.is_none()
            && self.weight.is_none()
            && self.age.is_none()
            && self.fitness_level.is_none()
            && self.fitness_goal.is_none()
            && self.dietary_preferences.is_none()
            && self.workout_preferences.is_none()
            && self.available_equipment.is_none()
            && self.health_conditions.is_none()
    }
}

fn validate_fitness_level(level: &str) -> Result<(), ValidationError> {
    if !FITNESS_LEVELS.contains(&level) {
        return Err(ValidationError::new("invalid_fitness_level"));
    }
    Ok(())
}

fn validate_fitness_goal(goal: &str) -> Result<(), ValidationError> {
    if !FITNESS_GOALS.contains(&goal) {
        return Err(ValidationError::new("invalid_fitness_goal"));
    }
    Ok(())
}
