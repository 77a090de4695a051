// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CaliSheet API: workout routines, recorded sessions, and training history.
//!
//! This crate provides the backend for storing user-owned exercise routines,
//! recording completed workout sessions, and answering statistical queries
//! over past sessions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::TokenVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub token_verifier: Arc<TokenVerifier>,
}
