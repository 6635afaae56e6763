// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CalTrack: meal-photo nutrition tracking core.
//!
//! Two halves share this crate: the analysis service (an axum app
//! proxying meal photos to a vision model behind origin control and
//! input validation) and the client core (the capture pipeline,
//! review/validation flow, and optimistic mutations a front end
//! drives).

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod validation;

use std::sync::Arc;

use config::Config;
use services::VisionGateway;

/// Shared state for the analysis service.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn VisionGateway>,
}
