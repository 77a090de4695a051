// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with typed operations.
//!
//! Provides high-level operations for:
//! - Routines (nested exercise/set-template trees, replace-on-update)
//! - Sessions (append-only workout records)
//! - History (per-exercise aggregation queries)

use crate::error::AppError;
use crate::models::{
    ExerciseSessionRow, MonthVolumeRow, Routine, RoutineExercise, RoutineWithCount, SessionSet,
    SetTemplate, StatsRow,
};
use crate::routes::routines::{ExerciseSpec, SaveRoutineRequest, SaveSessionRequest};
use crate::time_utils;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

/// Most recent distinct sessions returned by the exercise-history query.
const HISTORY_SESSION_LIMIT: i64 = 20;

/// Calendar months returned by the volume-progression query.
const VOLUME_MONTH_LIMIT: i64 = 12;

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if necessary) and migrate the database.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection; pin it to one so
        // every handle sees the same data.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("failed to open database: {e}")))?;

        super::run_migrations(&pool).await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(Self { pool })
    }

    // ─── Routine Operations ──────────────────────────────────────

    /// All routines owned by `user_id`, newest first, each with its
    /// current exercise count.
    pub async fn list_routines(&self, user_id: &str) -> Result<Vec<RoutineWithCount>, AppError> {
        sqlx::query_as::<_, RoutineWithCount>(
            "SELECT r.id, r.user_id, r.title, r.subtitle, r.tags, r.schedule_days,
                    r.last_performed, r.completion_rate, r.streak,
                    COUNT(e.id) AS exercises_count
               FROM routines r
               LEFT JOIN routine_exercises e ON e.routine_id = r.id
              WHERE r.user_id = ?
              GROUP BY r.id
              ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Fetch a routine by id, without an ownership filter; callers compare
    /// `user_id` themselves so absent and foreign rows are indistinguishable.
    pub async fn get_routine(&self, routine_id: i64) -> Result<Option<Routine>, AppError> {
        sqlx::query_as::<_, Routine>("SELECT * FROM routines WHERE id = ?")
            .bind(routine_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Exercises of a routine in display order.
    pub async fn exercises_for_routine(
        &self,
        routine_id: i64,
    ) -> Result<Vec<RoutineExercise>, AppError> {
        sqlx::query_as::<_, RoutineExercise>(
            "SELECT * FROM routine_exercises WHERE routine_id = ? ORDER BY sort_order",
        )
        .bind(routine_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Set templates of an exercise in display order.
    pub async fn set_templates_for_exercise(
        &self,
        exercise_id: i64,
    ) -> Result<Vec<SetTemplate>, AppError> {
        sqlx::query_as::<_, SetTemplate>(
            "SELECT * FROM set_templates WHERE exercise_id = ? ORDER BY sort_order",
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a routine and its full exercise tree in one transaction.
    /// Returns the new routine id.
    pub async fn create_routine(
        &self,
        user_id: &str,
        data: &SaveRoutineRequest,
    ) -> Result<i64, AppError> {
        let tags = encode_list(&data.tags)?;
        let schedule_days = encode_list(&data.schedule_days)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO routines (user_id, title, subtitle, tags, schedule_days)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.subtitle)
        .bind(&tags)
        .bind(&schedule_days)
        .execute(&mut *tx)
        .await?;
        let routine_id = result.last_insert_rowid();

        insert_exercise_tree(&mut tx, routine_id, &data.exercises).await?;

        tx.commit().await?;
        Ok(routine_id)
    }

    /// Replace a routine's scalar fields and its entire exercise tree.
    ///
    /// The tree is not diffed: all existing exercises are deleted (set
    /// templates cascade) and the submitted tree is re-inserted with fresh
    /// positional sort keys, all in one transaction.
    pub async fn update_routine(
        &self,
        routine_id: i64,
        data: &SaveRoutineRequest,
    ) -> Result<(), AppError> {
        let tags = encode_list(&data.tags)?;
        let schedule_days = encode_list(&data.schedule_days)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE routines SET title = ?, subtitle = ?, tags = ?, schedule_days = ?
              WHERE id = ?",
        )
        .bind(&data.title)
        .bind(&data.subtitle)
        .bind(&tags)
        .bind(&schedule_days)
        .bind(routine_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM routine_exercises WHERE routine_id = ?")
            .bind(routine_id)
            .execute(&mut *tx)
            .await?;

        insert_exercise_tree(&mut tx, routine_id, &data.exercises).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a routine. Exercises and set templates cascade; sessions that
    /// referenced it keep their rows with the reference cleared.
    pub async fn delete_routine(&self, routine_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM routines WHERE id = ?")
            .bind(routine_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Record a completed session and its sets in one transaction.
    ///
    /// Best-effort side effect: when the referenced routine exists and is
    /// owned by the caller, its `last_performed` label is set to today's
    /// display date. A missing or foreign routine skips the label silently
    /// and the session is stored with its reference cleared.
    pub async fn record_session(
        &self,
        user_id: &str,
        data: &SaveSessionRequest,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let routine_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM routines WHERE id = ?")
            .bind(data.routine_id)
            .fetch_one(&mut *tx)
            .await?;
        let routine_id = (routine_exists > 0).then_some(data.routine_id);

        let result = sqlx::query(
            "INSERT INTO workout_sessions
                 (user_id, routine_id, routine_name, started_at, finished_at, total_volume_kg)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(routine_id)
        .bind(&data.routine_name)
        .bind(&data.started_at)
        .bind(&data.finished_at)
        .bind(data.total_volume_kg)
        .execute(&mut *tx)
        .await?;
        let session_id = result.last_insert_rowid();

        for set in &data.sets {
            sqlx::query(
                "INSERT INTO session_sets
                     (session_id, exercise_name, weight, reps, rpe, nivel_anillas)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(&set.exercise_name)
            .bind(set.weight)
            .bind(set.reps)
            .bind(set.rpe)
            .bind(set.nivel_anillas)
            .execute(&mut *tx)
            .await?;
        }

        let today = time_utils::format_display_date(chrono::Utc::now().date_naive());
        sqlx::query("UPDATE routines SET last_performed = ? WHERE id = ? AND user_id = ?")
            .bind(&today)
            .bind(data.routine_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session_id)
    }

    // ─── History Operations ──────────────────────────────────────

    /// Sorted distinct exercise names across the user's sessions.
    pub async fn distinct_exercise_names(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar(
            "SELECT DISTINCT s.exercise_name
               FROM session_sets s
               JOIN workout_sessions w ON w.id = s.session_id
              WHERE w.user_id = ?
              ORDER BY s.exercise_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Aggregate stats for one exercise over sessions finishing on/after
    /// `since` (ISO text comparison). NULL aggregates mean no matching rows.
    pub async fn exercise_stats(
        &self,
        user_id: &str,
        name: &str,
        since: &str,
    ) -> Result<StatsRow, AppError> {
        sqlx::query_as::<_, StatsRow>(
            "SELECT MAX(s.reps) AS max_reps,
                    MAX(s.weight) AS max_weight,
                    COUNT(DISTINCT s.session_id) AS total_sessions,
                    SUM(s.weight * s.reps) AS total_volume
               FROM session_sets s
               JOIN workout_sessions w ON w.id = s.session_id
              WHERE s.exercise_name = ? AND w.user_id = ? AND w.finished_at >= ?",
        )
        .bind(name)
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// The most recent distinct sessions containing an exercise.
    pub async fn recent_sessions_for_exercise(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Vec<ExerciseSessionRow>, AppError> {
        sqlx::query_as::<_, ExerciseSessionRow>(
            "SELECT DISTINCT s.session_id, w.routine_name, w.finished_at
               FROM session_sets s
               JOIN workout_sessions w ON w.id = s.session_id
              WHERE s.exercise_name = ? AND w.user_id = ?
              ORDER BY w.finished_at DESC
              LIMIT ?",
        )
        .bind(name)
        .bind(user_id)
        .bind(HISTORY_SESSION_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// One session's sets for an exercise, in insertion order.
    pub async fn session_sets_for_exercise(
        &self,
        session_id: i64,
        name: &str,
    ) -> Result<Vec<SessionSet>, AppError> {
        sqlx::query_as::<_, SessionSet>(
            "SELECT * FROM session_sets
              WHERE session_id = ? AND exercise_name = ?
              ORDER BY id",
        )
        .bind(session_id)
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Per-calendar-month volume sums for an exercise, ascending, oldest
    /// months first. Sessions without a finish time carry no month and are
    /// skipped.
    pub async fn monthly_volume(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Vec<MonthVolumeRow>, AppError> {
        sqlx::query_as::<_, MonthVolumeRow>(
            "SELECT strftime('%Y-%m', w.finished_at) AS month_key,
                    SUM(s.weight * s.reps) AS volume
               FROM session_sets s
               JOIN workout_sessions w ON w.id = s.session_id
              WHERE s.exercise_name = ? AND w.user_id = ?
                AND strftime('%Y-%m', w.finished_at) IS NOT NULL
              GROUP BY month_key
              ORDER BY month_key
              LIMIT ?",
        )
        .bind(name)
        .bind(user_id)
        .bind(VOLUME_MONTH_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }
}

/// Insert the submitted exercise tree with dense positional sort keys.
async fn insert_exercise_tree(
    tx: &mut Transaction<'_, Sqlite>,
    routine_id: i64,
    exercises: &[ExerciseSpec],
) -> Result<(), AppError> {
    for (position, exercise) in exercises.iter().enumerate() {
        let equipment = encode_list(&exercise.equipment)?;

        let result = sqlx::query(
            "INSERT INTO routine_exercises
                 (routine_id, name, muscle, equipment, rest_seconds, sort_order)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(routine_id)
        .bind(&exercise.name)
        .bind(&exercise.muscle)
        .bind(&equipment)
        .bind(exercise.rest_seconds)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
        let exercise_id = result.last_insert_rowid();

        for (row_position, row) in exercise.rows.iter().enumerate() {
            sqlx::query(
                "INSERT INTO set_templates
                     (exercise_id, sets, reps, weight, nivel_anillas, sort_order)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(exercise_id)
            .bind(&row.sets)
            .bind(&row.reps)
            .bind(&row.weight)
            .bind(&row.nivel)
            .bind(row_position as i64)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

/// JSON-encode a string list column; decoding is the client's concern and
/// the stored text round-trips exactly.
fn encode_list(values: &[String]) -> Result<String, AppError> {
    serde_json::to_string(values).map_err(|e| AppError::Internal(e.into()))
}
