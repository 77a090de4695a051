// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only history and analytics routes.
//!
//! Everything here aggregates over denormalized `exercise_name` snapshots,
//! so results survive routine and exercise edits.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::time_utils;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// History routes (require authentication).
/// The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history/exercises", get(get_exercise_names))
        .route("/history/stats", get(get_exercise_stats))
        .route("/history/sessions", get(get_exercise_history))
        .route("/history/volume", get(get_volume_progression))
}

#[derive(Deserialize)]
struct NameQuery {
    name: String,
}

#[derive(Deserialize)]
struct StatsQuery {
    name: String,
    /// Inclusive lower bound on the session finish timestamp (ISO 8601)
    since: String,
}

// ─── Exercise Names ──────────────────────────────────────────

/// Sorted distinct exercise names across the caller's sessions.
async fn get_exercise_names(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<String>>> {
    let names = state.db.distinct_exercise_names(&user.user_id).await?;
    Ok(Json(names))
}

// ─── Exercise Stats ──────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStatsResponse {
    pub max_reps: i64,
    pub max_weight: f64,
    pub total_sessions: i64,
    pub total_volume: f64,
}

/// Aggregate stats for one exercise since a lower-bound finish time.
/// No matching sets reports zeros, never an error.
async fn get_exercise_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<ExerciseStatsResponse>> {
    tracing::debug!(
        name = %params.name,
        since = %params.since,
        "Fetching exercise stats"
    );

    let stats = state
        .db
        .exercise_stats(&user.user_id, &params.name, &params.since)
        .await?;

    Ok(Json(ExerciseStatsResponse {
        max_reps: stats.max_reps.unwrap_or(0),
        max_weight: stats.max_weight.unwrap_or(0.0),
        total_sessions: stats.total_sessions,
        total_volume: stats.total_volume.unwrap_or(0.0),
    }))
}

// ─── Exercise History ────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDetail {
    pub weight: f64,
    pub reps: i64,
    pub rpe: Option<f64>,
    pub nivel_anillas: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub session_id: i64,
    /// Display date of the session's finish time ("3 Jun 2024")
    pub date: String,
    pub routine_name: String,
    pub sets: Vec<SetDetail>,
    /// Sum of weight x reps over just this exercise's sets
    pub total_volume: f64,
}

/// The most recent sessions in which an exercise appears, with that
/// exercise's sets and volume per session.
async fn get_exercise_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NameQuery>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let sessions = state
        .db
        .recent_sessions_for_exercise(&user.user_id, &params.name)
        .await?;

    let mut entries = Vec::with_capacity(sessions.len());
    for session in sessions {
        let sets = state
            .db
            .session_sets_for_exercise(session.session_id, &params.name)
            .await?;

        let total_volume: f64 = sets.iter().map(|s| s.weight * s.reps as f64).sum();

        let date = session
            .finished_at
            .as_deref()
            .map(time_utils::display_date_or_raw)
            .unwrap_or_default();

        entries.push(HistoryEntry {
            session_id: session.session_id,
            date,
            routine_name: session.routine_name,
            sets: sets
                .into_iter()
                .map(|s| SetDetail {
                    weight: s.weight,
                    reps: s.reps,
                    rpe: s.rpe,
                    nivel_anillas: s.nivel_anillas,
                })
                .collect(),
            total_volume,
        });
    }

    Ok(Json(entries))
}

// ─── Volume Progression ──────────────────────────────────────

#[derive(Serialize)]
pub struct VolumePoint {
    /// Short month name ("Jun")
    pub month: String,
    pub volume: f64,
    /// Rounded volume with unit, e.g. "1140 kg"
    pub label: String,
}

/// Per-calendar-month volume for one exercise, ascending, at most 12 points.
async fn get_volume_progression(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NameQuery>,
) -> Result<Json<Vec<VolumePoint>>> {
    let buckets = state.db.monthly_volume(&user.user_id, &params.name).await?;

    let points = buckets
        .into_iter()
        .map(|bucket| {
            let month = time_utils::month_label(&bucket.month_key)
                .unwrap_or_else(|| bucket.month_key.clone());
            VolumePoint {
                month,
                volume: bucket.volume,
                label: format!("{} kg", bucket.volume.round() as i64),
            }
        })
        .collect();

    Ok(Json(points))
}
