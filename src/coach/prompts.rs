//! System prompts and user payloads sent to the language model.

use std::fmt::Display;

use crate::models::plan::Plan;
use crate::models::profile::Profile;

const NOT_SPECIFIED: &str = "Not specified";

pub const CHAT_ROLE: &str = "You are an AI fitness coach assistant. Your role is to help users with:
1. Creating personalized workout plans based on their goals, fitness level, and preferences
2. Designing diet plans that align with their nutritional needs and goals
3. Providing fitness advice and answering exercise-related questions
4. Motivating users and helping them stay on track with their fitness journey

Be supportive, knowledgeable, and provide detailed, actionable advice.";

const CHAT_PROFILE_HINT: &str = "Use this information to provide highly personalized advice and plans tailored to the user's specific needs and circumstances.";

pub const PLAN_ANALYST_ROLE: &str = "You are an AI fitness plan analyst. Review workout and diet plans and give constructive feedback.
For each plan:
1. Evaluate how effective it is for the user's goals and fitness level
2. Identify strengths and areas for improvement
3. Suggest specific modifications that fit the user's needs
4. Take any health conditions or limitations into account
5. Rate how well the plan matches the user's profile out of 10

Structure the analysis as:
- Overall Assessment
- Strengths
- Areas for Improvement
- Suggested Modifications
- Plan Rating (X/10)";

const PLAN_PROFILE_HINT: &str = "Base your analysis on this profile so the review fits the user's specific needs and circumstances.";

pub const PROGRESS_ANALYST_ROLE: &str = r#"You are an AI fitness coach analyzing user progress data.
Identify patterns and recommend adjustments to the user's workout and diet plans. Focus on:
1. Progress trends (weight, body fat, measurements, workout performance)
2. Correlation with subjective metrics (energy, mood, sleep)
3. Alignment with the user's fitness goals
4. Specific, actionable recommendations

Respond with JSON only, using this structure:
{
  "analysis_summary": "Brief overall assessment of progress",
  "insights": [{"title": "Insight title", "description": "Detailed explanation"}],
  "recommendations": [{"title": "Recommendation title", "description": "Detailed explanation"}],
  "plan_adjustments": {"workout": ["Workout plan adjustments"], "diet": ["Diet plan adjustments"]}
}"#;

fn field<T: Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => v.to_string(),
        Some(v) => format!("{} {}", v, unit),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// One `- Label: value` line per profile field.
pub fn profile_paragraph(profile: &Profile) -> String {
    let lines = [
        ("Height", field(profile.height, "cm")),
        ("Weight", field(profile.weight, "kg")),
        ("Age", field(profile.age, "years")),
        ("Fitness Level", field(profile.fitness_level.as_deref(), "")),
        ("Fitness Goal", field(profile.fitness_goal.as_deref(), "")),
        ("Dietary Preferences", field(profile.dietary_preferences.as_deref(), "")),
        ("Workout Preferences", field(profile.workout_preferences.as_deref(), "")),
        ("Available Equipment", field(profile.available_equipment.as_deref(), "")),
        ("Health Conditions", field(profile.health_conditions.as_deref(), "")),
    ];

    let mut paragraph = String::from("User Profile Information:");
    for (label, value) in lines {
        paragraph.push_str(&format!("\n- {}: {}", label, value));
    }
    paragraph
}

fn with_profile(role: &str, profile: Option<&Profile>, hint: &str) -> String {
    match profile {
        Some(profile) => format!("{}\n\n{}\n\n{}", role, profile_paragraph(profile), hint),
        None => role.to_string(),
    }
}

pub fn chat_system(profile: Option<&Profile>) -> String {
    with_profile(CHAT_ROLE, profile, CHAT_PROFILE_HINT)
}

pub fn plan_analysis_system(profile: Option<&Profile>) -> String {
    with_profile(PLAN_ANALYST_ROLE, profile, PLAN_PROFILE_HINT)
}

pub fn plan_analysis_user(plan: &Plan) -> String {
    format!(
        "Please analyze this {kind} plan:\n\nPlan Type: {kind}\nPlan Content:\n{content}",
        kind = plan.plan_type,
        content = plan.content
    )
}

pub fn progress_analysis_user(bundle: &str) -> String {
    format!("Here is my progress data for analysis: {}", bundle)
}

pub fn adaptive_plan_system(plan_type: &str) -> String {
    format!(
        "You are an AI fitness coach creating an adaptive {kind} plan.
Using the user's profile, progress data, and previous plan (if any), write a personalized {kind} plan
that addresses their current needs and moves them toward their goals.

The plan should be:
1. Tailored to their current fitness level as shown in their progress data
2. Adjusted to their recent performance and trends
3. Aligned with their fitness goals
4. Structured and detailed enough to be actionable

Format the response as a complete {kind} plan with clear sections and instructions.",
        kind = plan_type
    )
}

pub fn adaptive_plan_user(plan_type: &str, bundle: &str) -> String {
    format!(
        "Here is my data for creating an adaptive {} plan: {}",
        plan_type, bundle
    )
}
