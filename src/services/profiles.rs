use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::profile::{Profile, ProfilePatch};
use crate::services::DeleteOutcome;

const PROFILE_COLUMNS: &str = "id, user_id, height, weight, age, fitness_level, fitness_goal, \
    dietary_preferences, workout_preferences, available_equipment, health_conditions";

pub async fn get_by_user(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(PROFILE_COLUMNS);
    builder.push(" FROM user_profiles WHERE user_id = ");
    builder.push_bind(user_id);

    builder.build_query_as::<Profile>().fetch_optional(pool).await
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    profile: ProfilePatch,
) -> Result<Profile, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO user_profiles (user_id, height, weight, age, fitness_level, fitness_goal, \
         dietary_preferences, workout_preferences, available_equipment, health_conditions) ",
    );
    builder.push_values(std::iter::once(profile), |mut row, p| {
        row.push_bind(user_id)
            .push_bind(p.height)
            .push_bind(p.weight)
            .push_bind(p.age)
            .push_bind(p.fitness_level)
            .push_bind(p.fitness_goal)
            .push_bind(p.dietary_preferences)
            .push_bind(p.workout_preferences)
            .push_bind(p.available_equipment)
            .push_bind(p.health_conditions);
    });
    builder.push(" RETURNING ");
    builder.push(PROFILE_COLUMNS);

    builder.build_query_as::<Profile>().fetch_one(pool).await
}

/// Returns the user's profile, creating an all-empty one on first access.
/// The flag is `true` when a row was created.
pub async fn get_or_create(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<(Profile, bool), sqlx::Error> {
    if let Some(profile) = get_by_user(pool, user_id).await? {
        return Ok((profile, false));
    }

    // A concurrent first access may have inserted in between; keep whichever row won.
    let inserted = sqlx::query(
        "INSERT INTO user_profiles (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    let profile = get_by_user(pool, user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok((profile, inserted == 1))
}

/// Applies the present fields, or creates the profile from them if none exists yet.
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    patch: ProfilePatch,
) -> Result<Profile, sqlx::Error> {
    let Some(existing) = get_by_user(pool, user_id).await? else {
        return create(pool, user_id, patch).await;
    };

    if patch.is_empty() {
        return Ok(existing);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE user_profiles SET ");
    let mut separated = builder.separated(", ");

    if let Some(height) = patch.height {
        separated.push("height = ");
        separated.push_bind_unseparated(height);
    }
    if let Some(weight) = patch.weight {
        separated.push("weight = ");
        separated.push_bind_unseparated(weight);
    }
    if let Some(age) = patch.age {
        separated.push("age = ");
        separated.push_bind_unseparated(age);
    }
    if let Some(fitness_level) = patch.fitness_level {
        separated.push("fitness_level = ");
        separated.push_bind_unseparated(fitness_level);
    }
    if let Some(fitness_goal) = patch.fitness_goal {
        separated.push("fitness_goal = ");
        separated.push_bind_unseparated(fitness_goal);
    }
    if let Some(dietary_preferences) = patch.dietary_preferences {
        separated.push("dietary_preferences = ");
        separated.push_bind_unseparated(dietary_preferences);
    }
    if let Some(workout_preferences) = patch.workout_preferences {
        separated.push("workout_preferences = ");
        separated.push_bind_unseparated(workout_preferences);
    }
    if let Some(available_equipment) = patch.available_equipment {
        separated.push("available_equipment = ");
        separated.push_bind_unseparated(available_equipment);
    }
    if let Some(health_conditions) = patch.health_conditions {
        separated.push("health_conditions = ");
        separated.push_bind_unseparated(health_conditions);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(existing.id);
    builder.push(" RETURNING ");
    builder.push(PROFILE_COLUMNS);

    builder.build_query_as::<Profile>().fetch_one(pool).await
}

pub async fn delete(pool: &SqlitePool, user_id: i64) -> Result<DeleteOutcome, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(DeleteOutcome::from_rows(result.rows_affected(), "Profile"))
}
