// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod routine;
pub mod session;

pub use routine::{Routine, RoutineExercise, RoutineWithCount, SetTemplate};
pub use session::{ExerciseSessionRow, MonthVolumeRow, SessionSet, StatsRow, WorkoutSession};
