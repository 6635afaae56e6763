// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client core: the capture pipeline a front end drives.
//!
//! Intake → rate limiter → transport → review → mutations is the main
//! flow; session, stats, export, and the goal calculator support the
//! surrounding screens. Everything here is UI-framework agnostic.

pub mod cache;
pub mod calculator;
pub mod capture;
pub mod errors;
pub mod export;
pub mod intake;
pub mod mutations;
pub mod rate_limit;
pub mod review;
pub mod session;
pub mod stats;
pub mod transport;

pub use cache::{QueryCache, QueryKey};
pub use capture::CapturePipeline;
pub use errors::ClientError;
pub use intake::CapturedImage;
pub use mutations::{GoalsMutations, MealMutations};
pub use rate_limit::{Admission, RetryCountdown, SlidingWindowLimiter};
pub use review::ReviewSession;
pub use session::SessionContext;
pub use transport::{AnalysisTransport, HttpAnalysisTransport};
