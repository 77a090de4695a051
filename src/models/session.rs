// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recorded workout sessions and their per-set results.
//!
//! `routine_name` and `exercise_name` are denormalized snapshots, not
//! foreign keys: history must survive routine/exercise renames and deletes.

use sqlx::FromRow;

/// One completed (or in-progress) workout session.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: String,
    /// Cleared (not cascaded) when the source routine is deleted
    pub routine_id: Option<i64>,
    pub routine_name: String,
    pub started_at: String,
    /// Absent while the session is still in progress
    pub finished_at: Option<String>,
    pub total_volume_kg: f64,
}

/// One performed set within a session.
#[derive(Debug, Clone, FromRow)]
pub struct SessionSet {
    pub id: i64,
    pub session_id: i64,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: i64,
    /// Perceived-effort rating
    pub rpe: Option<f64>,
    /// Secondary resistance level (e.g. ring/band setting)
    pub nivel_anillas: Option<i64>,
}

/// Session identity row for the exercise-history query.
#[derive(Debug, Clone, FromRow)]
pub struct ExerciseSessionRow {
    pub session_id: i64,
    pub routine_name: String,
    pub finished_at: Option<String>,
}

/// Aggregate row for exercise statistics; NULLs mean no matching sets.
#[derive(Debug, Clone, FromRow)]
pub struct StatsRow {
    pub max_reps: Option<i64>,
    pub max_weight: Option<f64>,
    pub total_sessions: i64,
    pub total_volume: Option<f64>,
}

/// Per-month volume bucket ("YYYY-MM" key, ascending).
#[derive(Debug, Clone, FromRow)]
pub struct MonthVolumeRow {
    pub month_key: String,
    pub volume: f64,
}
