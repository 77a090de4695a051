// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine CRUD tests: nested-tree round trips, replace-on-update,
//! ownership isolation, validation.

use axum::http::StatusCode;
use serde_json::json;

mod common;

fn routine_body(title: &str, exercise_names: &[&str], rows_per_exercise: usize) -> serde_json::Value {
    let exercises: Vec<_> = exercise_names
        .iter()
        .map(|name| {
            let rows: Vec<_> = (0..rows_per_exercise)
                .map(|i| {
                    json!({
                        "sets": "3",
                        "reps": format!("{}-{}", 8 + i, 10 + i),
                        "weight": format!("{}", 20 + i * 5),
                        "nivel": ""
                    })
                })
                .collect();
            json!({
                "name": name,
                "muscle": "Espalda",
                "equipment": ["Anillas", "Banda"],
                "rest_seconds": 120,
                "rows": rows
            })
        })
        .collect();

    json!({
        "title": title,
        "subtitle": "Fuerza",
        "tags": ["tirar", "empujar"],
        "scheduleDays": ["Lunes", "Jueves"],
        "exercises": exercises
    })
}

#[tokio::test]
async fn test_create_then_get_preserves_tree_order() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let body = routine_body("Dominadas", &["Pull-up", "Row", "Face Pull"], 2);
    let response = common::send(&app, "POST", "/routines", Some(&token), Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = common::json_body(response).await["id"].as_i64().unwrap();

    let response =
        common::send(&app, "GET", &format!("/routines/{id}"), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = common::json_body(response).await;

    assert_eq!(detail["routine"]["title"], "Dominadas");
    assert_eq!(detail["routine"]["exercises_count"], 3);
    // List columns are stored and returned as JSON text, order preserved
    assert_eq!(detail["routine"]["tags"], "[\"tirar\",\"empujar\"]");
    assert_eq!(detail["routine"]["schedule_days"], "[\"Lunes\",\"Jueves\"]");
    assert_eq!(detail["routine"]["last_performed"], "Nunca");

    let exercises = detail["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 3);
    for (i, (exercise, expected)) in exercises
        .iter()
        .zip(["Pull-up", "Row", "Face Pull"])
        .enumerate()
    {
        assert_eq!(exercise["name"], expected);
        assert_eq!(exercise["sort_order"], i as i64);
        assert_eq!(exercise["equipment"], "[\"Anillas\",\"Banda\"]");

        let rows = exercise["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["reps"], "8-10");
        assert_eq!(rows[1]["reps"], "9-11");
    }
}

#[tokio::test]
async fn test_list_routines_with_counts_newest_first() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(routine_body("Primera", &["Pull-up", "Dip"], 1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(routine_body("Segunda", &[], 0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::send(&app, "GET", "/routines", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = common::json_body(response).await;
    let list = list.as_array().unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Segunda");
    assert_eq!(list[0]["exercises_count"], 0);
    assert_eq!(list[1]["title"], "Primera");
    assert_eq!(list[1]["exercises_count"], 2);
}

#[tokio::test]
async fn test_update_replaces_whole_tree() {
    let (app, state) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(routine_body("Empuje", &["Dip", "Push-up", "Pike"], 3)),
    )
    .await;
    let id = common::json_body(response).await["id"].as_i64().unwrap();

    // Capture the original exercise ids before the update wipes them.
    let old_exercises = state.db.exercises_for_routine(id).await.unwrap();
    assert_eq!(old_exercises.len(), 3);

    let response = common::send(
        &app,
        "PUT",
        &format!("/routines/{id}"),
        Some(&token),
        Some(routine_body("Empuje v2", &["Handstand"], 1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::json_body(response).await["id"], id);

    let response =
        common::send(&app, "GET", &format!("/routines/{id}"), Some(&token), None).await;
    let detail = common::json_body(response).await;

    assert_eq!(detail["routine"]["title"], "Empuje v2");
    let exercises = detail["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0]["name"], "Handstand");
    assert_eq!(exercises[0]["sort_order"], 0);
    assert_eq!(exercises[0]["rows"].as_array().unwrap().len(), 1);

    // No orphans: the old exercises' templates are gone with them.
    for exercise in old_exercises {
        let templates = state
            .db
            .set_templates_for_exercise(exercise.id)
            .await
            .unwrap();
        assert!(templates.is_empty());
    }
}

#[tokio::test]
async fn test_update_missing_routine_is_not_found() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "PUT",
        "/routines/4711",
        Some(&token),
        Some(routine_body("Nada", &[], 0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_routine() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(routine_body("Temporal", &["Pull-up"], 1)),
    )
    .await;
    let id = common::json_body(response).await["id"].as_i64().unwrap();

    let response =
        common::send(&app, "DELETE", &format!("/routines/{id}"), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response =
        common::send(&app, "GET", &format!("/routines/{id}"), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response =
        common::send(&app, "DELETE", &format!("/routines/{id}"), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cross_user_isolation() {
    let (app, _) = common::create_test_app().await;
    let owner = common::create_test_jwt("user_owner");
    let intruder = common::create_test_jwt("user_intruder");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&owner),
        Some(routine_body("Privada", &["Pull-up"], 1)),
    )
    .await;
    let id = common::json_body(response).await["id"].as_i64().unwrap();

    // A guessed id answers exactly like a missing one.
    let response =
        common::send(&app, "GET", &format!("/routines/{id}"), Some(&intruder), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(
        &app,
        "PUT",
        &format!("/routines/{id}"),
        Some(&intruder),
        Some(routine_body("Robada", &[], 0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(
        &app,
        "DELETE",
        &format!("/routines/{id}"),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(&app, "GET", "/routines", Some(&intruder), None).await;
    assert_eq!(common::json_body(response).await, serde_json::json!([]));

    // The owner still sees the untouched routine.
    let response =
        common::send(&app, "GET", &format!("/routines/{id}"), Some(&owner), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = common::json_body(response).await;
    assert_eq!(detail["routine"]["title"], "Privada");
}

#[tokio::test]
async fn test_missing_title_is_unprocessable() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(json!({"subtitle": "sin titulo"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_oversized_title_is_unprocessable() {
    let (app, _) = common::create_test_app().await;
    let token = common::create_test_jwt("user_1");

    let response = common::send(
        &app,
        "POST",
        "/routines",
        Some(&token),
        Some(json!({"title": "a".repeat(201)})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = common::json_body(response).await;
    assert_eq!(body["error"], "validation_error");
}
