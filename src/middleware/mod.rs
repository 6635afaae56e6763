// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (origin control, correlation ids, security).

pub mod origin;
pub mod request_id;
pub mod security;

pub use origin::enforce_origin;
pub use request_id::{assign_request_id, RequestId};
