// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The capture pipeline: file in, review session out.
//!
//! Ordering is fixed: intake and compression finish before a preview
//! exists, analysis only runs against a captured image, and every
//! analysis attempt passes the local rate limiter first. A denied
//! attempt never reaches the transport.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::errors::ClientError;
use crate::client::intake::{prepare_image, CapturedImage};
use crate::client::rate_limit::{ceil_secs, Admission, RetryCountdown, SlidingWindowLimiter};
use crate::client::review::ReviewSession;
use crate::client::transport::AnalysisTransport;

/// One user's capture pipeline. Owns the limiter state; shares the
/// transport.
pub struct CapturePipeline {
    transport: Arc<dyn AnalysisTransport>,
    limiter: Mutex<SlidingWindowLimiter>,
}

impl CapturePipeline {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> CapturePipeline {
        CapturePipeline {
            transport,
            limiter: Mutex::new(SlidingWindowLimiter::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_limiter(
        transport: Arc<dyn AnalysisTransport>,
        limiter: SlidingWindowLimiter,
    ) -> CapturePipeline {
        CapturePipeline {
            transport,
            limiter: Mutex::new(limiter),
        }
    }

    /// Validate and compress a selected file. No network use.
    pub async fn select_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<CapturedImage, ClientError> {
        prepare_image(file_name, mime, bytes).await
    }

    /// Submit a captured image for analysis. Rate-limit denials return
    /// immediately with the seconds to wait; the countdown handle in
    /// [`CapturePipeline::start_countdown`] drives live feedback.
    pub async fn analyze(&self, image: &CapturedImage) -> Result<ReviewSession, ClientError> {
        match self.limiter.lock().await.try_admit() {
            Admission::Admitted => {}
            Admission::Denied { retry_in } => {
                return Err(ClientError::RateLimited {
                    retry_in_secs: ceil_secs(retry_in),
                });
            }
        }

        let analysis = self.transport.analyze(&image.data_uri()).await?;
        Ok(ReviewSession::from_analysis(analysis))
    }

    /// Live once-per-second countdown for a denied attempt.
    pub fn start_countdown(retry_in_secs: u64) -> RetryCountdown {
        RetryCountdown::start(std::time::Duration::from_secs(retry_in_secs))
    }
}
