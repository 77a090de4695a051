// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine rows: a user-authored workout plan with its nested exercise tree.

use sqlx::FromRow;

/// Stored routine record.
#[derive(Debug, Clone, FromRow)]
pub struct Routine {
    pub id: i64,
    /// Owning user's identity (subject claim of the bearer token)
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    /// JSON-encoded `Vec<String>`
    pub tags: String,
    /// JSON-encoded `Vec<String>`
    pub schedule_days: String,
    /// Free-text display date; "Nunca" until a session is recorded
    pub last_performed: String,
    pub completion_rate: Option<i64>,
    pub streak: Option<String>,
    pub created_at: String,
}

/// Routine row annotated with its exercise count (list query aggregate).
#[derive(Debug, Clone, FromRow)]
pub struct RoutineWithCount {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub tags: String,
    pub schedule_days: String,
    pub last_performed: String,
    pub completion_rate: Option<i64>,
    pub streak: Option<String>,
    pub exercises_count: i64,
}

/// Exercise within a routine, ordered by `sort_order`.
#[derive(Debug, Clone, FromRow)]
pub struct RoutineExercise {
    pub id: i64,
    pub routine_id: i64,
    pub name: String,
    pub muscle: String,
    /// JSON-encoded `Vec<String>`
    pub equipment: String,
    pub rest_seconds: i64,
    pub sort_order: i64,
}

/// Prescribed set/rep/weight targets for one exercise row.
///
/// Sets, reps and weight are free-form text so ranges like "8-10" survive.
#[derive(Debug, Clone, FromRow)]
pub struct SetTemplate {
    pub id: i64,
    pub exercise_id: i64,
    pub sets: String,
    pub reps: String,
    pub weight: String,
    pub nivel_anillas: String,
    pub sort_order: i64,
}
