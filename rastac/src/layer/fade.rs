//! Explicit opacity interpolation.
//!
//! A fade is plain data: the manager stores a plan per layer and applies
//! interpolated opacities when the host drives [`tick_fades`] from its
//! frame or timer primitive. Removing a layer (or setting opacity
//! directly) drops the plan, so no timer can act on a disposed layer.
//!
//! [`tick_fades`]: crate::layer::LayerManager::tick_fades

use std::time::{Duration, Instant};

/// An in-flight linear opacity interpolation.
#[derive(Debug, Clone)]
pub struct FadePlan {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl FadePlan {
    pub(crate) fn new(from: f64, to: f64, duration: Duration, now: Instant) -> Self {
        Self {
            from,
            to,
            started: now,
            duration,
        }
    }

    /// Target opacity when the fade completes.
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Interpolated opacity at `now`, clamped to the plan's endpoints.
    pub fn opacity_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    /// True once the fade has reached its target.
    pub fn done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}
