// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine management and session recording routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Routine, RoutineWithCount};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Routine and session routes (require authentication).
/// The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routines", get(list_routines).post(create_routine))
        .route(
            "/routines/{id}",
            get(get_routine).put(update_routine).delete(delete_routine),
        )
        .route("/sessions", post(save_session))
}

// ─── Request Bodies ──────────────────────────────────────────

/// Prescribed targets for one set-template row. Free-form text so ranges
/// like "8-10" survive.
#[derive(Debug, Deserialize, Validate)]
pub struct SetTemplateSpec {
    #[serde(default = "default_sets")]
    #[validate(length(max = 50))]
    pub sets: String,
    #[serde(default = "default_reps")]
    #[validate(length(max = 50))]
    pub reps: String,
    #[serde(default = "default_weight")]
    #[validate(length(max = 50))]
    pub weight: String,
    /// Secondary resistance level (e.g. ring/band setting)
    #[serde(default)]
    #[validate(length(max = 50))]
    pub nivel: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExerciseSpec {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub muscle: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: i64,
    #[serde(default)]
    #[validate(nested)]
    pub rows: Vec<SetTemplateSpec>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveRoutineRequest {
    #[validate(length(max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub subtitle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "scheduleDays")]
    pub schedule_days: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<ExerciseSpec>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetInput {
    #[validate(length(max = 200))]
    pub exercise_name: String,
    pub weight: f64,
    pub reps: i64,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub nivel_anillas: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionRequest {
    pub routine_id: i64,
    /// Snapshot of the routine name at recording time; survives later
    /// routine edits and deletion.
    #[validate(length(max = 200))]
    pub routine_name: String,
    pub started_at: String,
    /// Absent while the session is still in progress
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub total_volume_kg: f64,
    #[serde(default)]
    #[validate(nested)]
    pub sets: Vec<SessionSetInput>,
}

fn default_sets() -> String {
    "3".to_string()
}
fn default_reps() -> String {
    "10".to_string()
}
fn default_weight() -> String {
    "0".to_string()
}
fn default_rest_seconds() -> i64 {
    90
}

// ─── Responses ───────────────────────────────────────────────

/// Routine summary; `tags` and `schedule_days` are the raw JSON-encoded
/// strings, decoded by the client.
#[derive(Serialize)]
pub struct RoutineOut {
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

impl From<RoutineWithCount> for RoutineOut {
    fn from(r: RoutineWithCount) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            subtitle: r.subtitle,
            tags: r.tags,
            schedule_days: r.schedule_days,
            last_performed: r.last_performed,
            completion_rate: r.completion_rate,
            streak: r.streak,
            exercises_count: r.exercises_count,
        }
    }
}

impl RoutineOut {
    fn from_routine(r: Routine, exercises_count: i64) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            subtitle: r.subtitle,
            tags: r.tags,
            schedule_days: r.schedule_days,
            last_performed: r.last_performed,
            completion_rate: r.completion_rate,
            streak: r.streak,
            exercises_count,
        }
    }
}

#[derive(Serialize)]
pub struct SetTemplateOut {
    pub id: i64,
    pub sets: String,
    pub reps: String,
    pub weight: String,
    pub nivel_anillas: String,
}

#[derive(Serialize)]
pub struct ExerciseOut {
    pub id: i64,
    pub routine_id: i64,
    pub name: String,
    pub muscle: String,
    /// JSON-encoded string list
    pub equipment: String,
    pub rest_seconds: i64,
    pub sort_order: i64,
    pub rows: Vec<SetTemplateOut>,
}

#[derive(Serialize)]
pub struct RoutineDetailResponse {
    pub routine: RoutineOut,
    pub exercises: Vec<ExerciseOut>,
}

#[derive(Serialize)]
pub struct IdResponse {
    pub id: i64,
}

// ─── Handlers ────────────────────────────────────────────────

/// List the caller's routines, newest first, with exercise counts.
async fn list_routines(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RoutineOut>>> {
    let routines = state.db.list_routines(&user.user_id).await?;
    Ok(Json(routines.into_iter().map(RoutineOut::from).collect()))
}

/// Routine detail with its ordered exercises and set templates.
async fn get_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<i64>,
) -> Result<Json<RoutineDetailResponse>> {
    let routine = owned_routine(&state, routine_id, &user.user_id).await?;

    let exercises = state.db.exercises_for_routine(routine_id).await?;
    let exercises_count = exercises.len() as i64;

    let mut exercises_out = Vec::with_capacity(exercises.len());
    for exercise in exercises {
        let rows = state
            .db
            .set_templates_for_exercise(exercise.id)
            .await?
            .into_iter()
            .map(|t| SetTemplateOut {
                id: t.id,
                sets: t.sets,
                reps: t.reps,
                weight: t.weight,
                nivel_anillas: t.nivel_anillas,
            })
            .collect();

        exercises_out.push(ExerciseOut {
            id: exercise.id,
            routine_id: exercise.routine_id,
            name: exercise.name,
            muscle: exercise.muscle,
            equipment: exercise.equipment,
            rest_seconds: exercise.rest_seconds,
            sort_order: exercise.sort_order,
            rows,
        });
    }

    Ok(Json(RoutineDetailResponse {
        routine: RoutineOut::from_routine(routine, exercises_count),
        exercises: exercises_out,
    }))
}

/// Create a routine with its full exercise tree.
async fn create_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(data): Json<SaveRoutineRequest>,
) -> Result<Json<IdResponse>> {
    data.validate()?;

    let id = state.db.create_routine(&user.user_id, &data).await?;

    tracing::info!(
        routine_id = id,
        exercises = data.exercises.len(),
        "Routine created"
    );
    Ok(Json(IdResponse { id }))
}

/// Replace a routine's fields and exercise tree.
async fn update_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<i64>,
    Json(data): Json<SaveRoutineRequest>,
) -> Result<Json<IdResponse>> {
    data.validate()?;

    owned_routine(&state, routine_id, &user.user_id).await?;

    state.db.update_routine(routine_id, &data).await?;

    tracing::info!(routine_id, "Routine updated");
    Ok(Json(IdResponse { id: routine_id }))
}

/// Delete a routine; historical sessions survive with the reference cleared.
async fn delete_routine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(routine_id): Path<i64>,
) -> Result<StatusCode> {
    owned_routine(&state, routine_id, &user.user_id).await?;

    state.db.delete_routine(routine_id).await?;

    tracing::info!(routine_id, "Routine deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Record a completed workout session and its sets.
async fn save_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(data): Json<SaveSessionRequest>,
) -> Result<(StatusCode, Json<IdResponse>)> {
    data.validate()?;

    let id = state.db.record_session(&user.user_id, &data).await?;

    tracing::info!(session_id = id, sets = data.sets.len(), "Session recorded");
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// Fetch a routine the caller owns. Absent and foreign routines answer
/// with the same NotFound so ids cannot be probed.
async fn owned_routine(state: &AppState, routine_id: i64, user_id: &str) -> Result<Routine> {
    match state.db.get_routine(routine_id).await? {
        Some(routine) if routine.user_id == user_id => Ok(routine),
        _ => Err(AppError::NotFound("Routine not found".to_string())),
    }
}
