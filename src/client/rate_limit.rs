// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local sliding-window admission control for analysis attempts.
//!
//! Advisory only: it exists to stop obviously wasted upstream calls
//! and to give immediate feedback, not to throttle with any security
//! guarantee (the edge service and gateway own that). State is one
//! in-memory timestamp list per pipeline.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Window length.
pub const WINDOW: Duration = Duration::from_secs(60);
/// Admitted requests per window.
pub const MAX_REQUESTS: usize = 5;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Denied; the oldest recorded request leaves the window after
    /// `retry_in`.
    Denied { retry_in: Duration },
}

/// Whole seconds to display for a wait, rounded up.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs_f64().ceil() as u64
}

pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    /// Admission times, oldest first.
    timestamps: Vec<Instant>,
}

impl SlidingWindowLimiter {
    pub fn new() -> SlidingWindowLimiter {
        SlidingWindowLimiter::with_limits(WINDOW, MAX_REQUESTS)
    }

    pub fn with_limits(window: Duration, max_requests: usize) -> SlidingWindowLimiter {
        SlidingWindowLimiter {
            window,
            max_requests,
            timestamps: Vec::new(),
        }
    }

    /// Prune expired records, then admit or deny this attempt.
    pub fn try_admit(&mut self) -> Admission {
        let now = Instant::now();
        self.timestamps
            .retain(|recorded| now.duration_since(*recorded) < self.window);

        if self.timestamps.len() >= self.max_requests {
            let retry_in = match self.timestamps.first() {
                Some(oldest) => (*oldest + self.window).duration_since(now),
                None => Duration::ZERO,
            };
            return Admission::Denied { retry_in };
        }

        self.timestamps.push(now);
        Admission::Admitted
    }

    /// Requests currently inside the window.
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.timestamps
            .iter()
            .filter(|recorded| now.duration_since(**recorded) < self.window)
            .count()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> SlidingWindowLimiter {
        SlidingWindowLimiter::new()
    }
}

/// Live once-per-second countdown for a denied attempt. Decrements to
/// zero, then the driving task exits on its own; dropping the handle
/// cancels it early.
pub struct RetryCountdown {
    seconds: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl RetryCountdown {
    pub fn start(retry_in: Duration) -> RetryCountdown {
        let initial = ceil_secs(retry_in);
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut remaining = initial;
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately; consume it so the
            // first decrement lands a full second in.
            interval.tick().await;

            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                if tx.send(remaining).is_err() {
                    break;
                }
            }
        });

        RetryCountdown { seconds: rx, task }
    }

    pub fn seconds_left(&self) -> u64 {
        *self.seconds.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.seconds_left() == 0
    }

    /// A receiver for UI bindings that re-render on every tick.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.seconds.clone()
    }
}

impl Drop for RetryCountdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
