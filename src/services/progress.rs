use chrono::{DateTime, Duration, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json};

use crate::models::progress::{CreateProgressRequest, Progress, ProgressPatch, Trend, TrendPoint};
use crate::services::{DeleteOutcome, Page};

const PROGRESS_COLUMNS: &str = "id, user_id, date, weight, body_fat, measurements, \
    workout_performance, energy_level, mood, sleep_quality, notes";

pub const DEFAULT_TREND_DAYS: i64 = 90;

/// Upper bound for any lookback window, roughly a century.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Lookback windows are clamped to `0..=MAX_WINDOW_DAYS`.
pub fn clamp_window(days: i64) -> i64 {
    days.clamp(0, MAX_WINDOW_DAYS)
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    entry: CreateProgressRequest,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(
        r#"
        INSERT INTO progress (user_id, date, weight, body_fat, measurements, workout_performance,
                              energy_level, mood, sleep_quality, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, date, weight, body_fat, measurements, workout_performance,
                  energy_level, mood, sleep_quality, notes
        "#,
    )
    .bind(owner_id)
    .bind(entry.date.unwrap_or_else(Utc::now))
    .bind(entry.weight)
    .bind(entry.body_fat)
    .bind(entry.measurements.map(Json))
    .bind(entry.workout_performance.map(Json))
    .bind(entry.energy_level)
    .bind(entry.mood)
    .bind(entry.sleep_quality)
    .bind(entry.notes)
    .fetch_one(pool)
    .await
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Progress>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(PROGRESS_COLUMNS);
    builder.push(" FROM progress WHERE id = ");
    builder.push_bind(id);

    builder.build_query_as::<Progress>().fetch_optional(pool).await
}

/// Most recent entries first.
pub async fn list_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    page: Page,
) -> Result<Vec<Progress>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(PROGRESS_COLUMNS);
    builder.push(" FROM progress WHERE user_id = ");
    builder.push_bind(owner_id);
    builder.push(" ORDER BY date DESC, id DESC LIMIT ");
    builder.push_bind(page.limit);
    builder.push(" OFFSET ");
    builder.push_bind(page.skip);

    builder.build_query_as::<Progress>().fetch_all(pool).await
}

/// Entries dated within `[start, end]`, most recent first.
pub async fn list_in_range(
    pool: &SqlitePool,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Progress>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(PROGRESS_COLUMNS);
    builder.push(" FROM progress WHERE user_id = ");
    builder.push_bind(owner_id);
    builder.push(" AND date >= ");
    builder.push_bind(start);
    builder.push(" AND date <= ");
    builder.push_bind(end);
    builder.push(" ORDER BY date DESC, id DESC");

    builder.build_query_as::<Progress>().fetch_all(pool).await
}

/// Entries from the last `days` days, clamped with `clamp_window`.
pub async fn list_recent(
    pool: &SqlitePool,
    owner_id: i64,
    days: i64,
) -> Result<Vec<Progress>, sqlx::Error> {
    let end = Utc::now();
    let start = end - Duration::days(clamp_window(days));
    list_in_range(pool, owner_id, start, end).await
}

/// Applies the fields present in `patch`. Returns `None` if the entry does not exist.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    patch: ProgressPatch,
) -> Result<Option<Progress>, sqlx::Error> {
    if patch.is_empty() {
        return get_by_id(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE progress SET ");
    let mut separated = builder.separated(", ");

    if let Some(date) = patch.date {
        separated.push("date = ");
        separated.push_bind_unseparated(date);
    }
    if let Some(weight) = patch.weight {
        separated.push("weight = ");
        separated.push_bind_unseparated(weight);
    }
    if let Some(body_fat) = patch.body_fat {
        separated.push("body_fat = ");
        separated.push_bind_unseparated(body_fat);
    }
    if let Some(measurements) = patch.measurements {
        separated.push("measurements = ");
        separated.push_bind_unseparated(Json(measurements));
    }
    if let Some(workout_performance) = patch.workout_performance {
        separated.push("workout_performance = ");
        separated.push_bind_unseparated(Json(workout_performance));
    }
    if let Some(energy_level) = patch.energy_level {
        separated.push("energy_level = ");
        separated.push_bind_unseparated(energy_level);
    }
    if let Some(mood) = patch.mood {
        separated.push("mood = ");
        separated.push_bind_unseparated(mood);
    }
    if let Some(sleep_quality) = patch.sleep_quality {
        separated.push("sleep_quality = ");
        separated.push_bind_unseparated(sleep_quality);
    }
    if let Some(notes) = patch.notes {
        separated.push("notes = ");
        separated.push_bind_unseparated(notes);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(PROGRESS_COLUMNS);

    builder.build_query_as::<Progress>().fetch_optional(pool).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<DeleteOutcome, sqlx::Error> {
    let result = sqlx::query("DELETE FROM progress WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(DeleteOutcome::from_rows(result.rows_affected(), "Progress entry"))
}

/// A metric that can be charted over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    Weight,
    BodyFat,
    EnergyLevel,
    Mood,
    SleepQuality,
    /// `measurement.<key>` into the measurements map.
    Measurement(String),
    /// `workout.<key>` into the workout performance map.
    Workout(String),
}

impl Metric {
    /// Returns `None` for names that match no field.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "weight" => Some(Metric::Weight),
            "body_fat" => Some(Metric::BodyFat),
            "energy_level" => Some(Metric::EnergyLevel),
            "mood" => Some(Metric::Mood),
            "sleep_quality" => Some(Metric::SleepQuality),
            _ => match name.split_once('.') {
                Some(("measurement", key)) if !key.is_empty() => {
                    Some(Metric::Measurement(key.to_string()))
                }
                Some(("workout", key)) if !key.is_empty() => Some(Metric::Workout(key.to_string())),
                _ => None,
            },
        }
    }

    /// Reads the metric from one entry. Absent keys and nulls yield `None`, never zero.
    pub fn value_in(&self, entry: &Progress) -> Option<f64> {
        match self {
            Metric::Weight => entry.weight,
            Metric::BodyFat => entry.body_fat,
            Metric::EnergyLevel => entry.energy_level.map(f64::from),
            Metric::Mood => entry.mood.map(f64::from),
            Metric::SleepQuality => entry.sleep_quality.map(f64::from),
            Metric::Measurement(key) => entry
                .measurements
                .as_ref()
                .and_then(|map| map.0.get(key).copied()),
            Metric::Workout(key) => entry
                .workout_performance
                .as_ref()
                .and_then(|map| map.0.get(key).copied()),
        }
    }
}

/// Builds the series for `metric` from already-windowed entries.
pub fn compute_trend(metric: &str, entries: &[Progress], period_days: i64) -> Trend {
    let mut data: Vec<TrendPoint> = match Metric::parse(metric) {
        Some(parsed) => entries
            .iter()
            .filter_map(|entry| {
                parsed.value_in(entry).map(|value| TrendPoint {
                    date: entry.date,
                    value,
                })
            })
            .collect(),
        None => Vec::new(),
    };

    data.sort_by_key(|point| point.date);

    let change = match (data.first(), data.last()) {
        (Some(first), Some(last)) if data.len() >= 2 => Some(last.value - first.value),
        _ => None,
    };

    Trend {
        metric: metric.to_string(),
        data,
        change,
        period_days,
    }
}

/// Trend of `metric` over the owner's last `days` days. `period_days` reports the
/// clamped window.
pub async fn trend(
    pool: &SqlitePool,
    owner_id: i64,
    metric: &str,
    days: i64,
) -> Result<Trend, sqlx::Error> {
    let days = clamp_window(days);
    let entries = list_recent(pool, owner_id, days).await?;
    Ok(compute_trend(metric, &entries, days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn entry(id: i64, date: &str) -> Progress {
        let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Progress {
            id,
            user_id: 1,
            date: Utc.from_utc_datetime(&day.and_hms_opt(8, 0, 0).unwrap()),
            weight: None,
            body_fat: None,
            measurements: None,
            workout_performance: None,
            energy_level: None,
            mood: None,
            sleep_quality: None,
            notes: None,
        }
    }

    fn with_weight(mut e: Progress, weight: f64) -> Progress {
        e.weight = Some(weight);
        e
    }

    #[test]
    fn no_points_means_no_change() {
        let trend = compute_trend("weight", &[], 90);
        assert!(trend.data.is_empty());
        assert_eq!(trend.change, None);
        assert_eq!(trend.period_days, 90);
    }

    #[test]
    fn single_point_means_no_change() {
        let entries = vec![with_weight(entry(1, "2024-01-01"), 80.0)];
        let trend = compute_trend("weight", &entries, 90);
        assert_eq!(trend.data.len(), 1);
        assert_eq!(trend.change, None);
    }

    #[test]
    fn change_is_last_minus_first_by_date() {
        // Stored order is newest first, as the window query returns it.
        let entries = vec![
            with_weight(entry(2, "2024-02-01"), 78.0),
            with_weight(entry(1, "2024-01-01"), 80.0),
        ];
        let trend = compute_trend("weight", &entries, 90);

        assert_eq!(trend.data[0].value, 80.0);
        assert_eq!(trend.data[1].value, 78.0);
        assert_eq!(trend.change, Some(-2.0));
    }

    #[test]
    fn measurement_path_skips_rows_without_the_key() {
        let mut with_waist = entry(1, "2024-01-01");
        with_waist.measurements = Some(Json(BTreeMap::from([("waist".to_string(), 90.0)])));

        let mut only_chest = entry(2, "2024-01-10");
        only_chest.measurements = Some(Json(BTreeMap::from([("chest".to_string(), 100.0)])));

        let no_measurements = with_weight(entry(3, "2024-01-15"), 81.0);

        let mut later_waist = entry(4, "2024-01-20");
        later_waist.measurements = Some(Json(BTreeMap::from([("waist".to_string(), 87.5)])));

        let entries = vec![with_waist, only_chest, no_measurements, later_waist];
        let trend = compute_trend("measurement.waist", &entries, 30);

        assert_eq!(trend.data.len(), 2);
        assert_eq!(trend.change, Some(-2.5));
    }

    #[test]
    fn workout_path_and_subjective_scores_are_supported() {
        let mut first = entry(1, "2024-03-01");
        first.workout_performance = Some(Json(BTreeMap::from([("squat".to_string(), 100.0)])));
        first.mood = Some(5);

        let mut second = entry(2, "2024-03-08");
        second.workout_performance = Some(Json(BTreeMap::from([("squat".to_string(), 110.0)])));
        second.mood = Some(8);

        let entries = vec![first, second];
        assert_eq!(compute_trend("workout.squat", &entries, 30).change, Some(10.0));
        assert_eq!(compute_trend("mood", &entries, 30).change, Some(3.0));
    }

    #[test]
    fn unknown_metric_yields_empty_series() {
        let entries = vec![with_weight(entry(1, "2024-01-01"), 80.0)];
        for name in ["height", "measurement.", "workout", "foo.bar"] {
            let trend = compute_trend(name, &entries, 30);
            assert!(trend.data.is_empty(), "{} should not match", name);
            assert_eq!(trend.change, None);
        }
    }

    #[test]
    fn windows_are_clamped_to_a_safe_range() {
        assert_eq!(clamp_window(30), 30);
        assert_eq!(clamp_window(-5), 0);
        assert_eq!(clamp_window(1_000_000_000), MAX_WINDOW_DAYS);
        assert_eq!(clamp_window(i64::MAX), MAX_WINDOW_DAYS);
        // The widest window still yields a representable start date.
        let now = Utc::now();
        assert!(now - Duration::days(MAX_WINDOW_DAYS) < now);
    }
}
