// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gateway;
pub mod parser;
pub mod payload;

pub use gateway::{AiGatewayClient, GatewayReply, VisionGateway};
pub use parser::parse_model_output;
pub use payload::validate_image_payload;
