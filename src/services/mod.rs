// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - external collaborators.

pub mod jwks;

pub use jwks::{TokenVerifier, VerifyError};
