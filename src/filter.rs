//! Debouncing of the per-frame gesture stream.
//!
//! The classifier output jitters from frame to frame. [`GestureFilter`] only
//! confirms a gesture once it has been seen on enough consecutive frames, and
//! never twice within the cooldown window. After a confirmation the run length
//! starts over, so a held gesture has to stabilize again before it can fire a
//! second time.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gesture::Gesture;

/// Stability and cooldown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(default)]
pub struct FilterConfig {
    /// Consecutive identical frames required before a gesture is confirmed
    pub stable_frames: u32,
    /// Minimum time between two confirmations, in seconds
    pub cooldown_seconds: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            stable_frames: 8,
            cooldown_seconds: 1.0,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stable_frames == 0 {
            return Err(Error::Config(
                "filter.stable_frames must be at least 1".to_string(),
            ));
        }
        self.cooldown()?;
        Ok(())
    }

    /// The cooldown as a [`Duration`]. Negative, NaN and out of range values
    /// are rejected.
    pub fn cooldown(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.cooldown_seconds).map_err(|_| {
            Error::Config(format!(
                "filter.cooldown_seconds must be a non-negative number, got {}",
                self.cooldown_seconds
            ))
        })
    }
}

/// Stateful debounce filter, one per tracking session.
///
/// Timestamps passed to [`GestureFilter::update`] must not go backwards.
#[derive(Debug, Clone)]
pub struct GestureFilter {
    stable_frames: u32,
    cooldown: Duration,
    last_gesture: Gesture,
    count: u32,
    last_trigger: Option<Duration>,
}

impl GestureFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            stable_frames: config.stable_frames,
            cooldown: config.cooldown()?,
            last_gesture: Gesture::None,
            count: 0,
            last_trigger: None,
        })
    }

    /// Feeds the label of the current frame.
    ///
    /// Returns the gesture when it is confirmed on this frame.
    pub fn update(&mut self, gesture: Gesture, now: Duration) -> Option<Gesture> {
        if gesture == self.last_gesture {
            self.count = self.count.saturating_add(1);
        } else {
            self.last_gesture = gesture;
            self.count = 1;
        }

        // Sentinels still move the bookkeeping above but never fire.
        if !gesture.is_actionable() {
            return None;
        }

        if self.count >= self.stable_frames && self.cooled_down(now) {
            debug!("Confirmed {gesture} after {} frames", self.count);
            self.last_trigger = Some(now);
            self.count = 0;
            return Some(gesture);
        }
        None
    }

    fn cooled_down(&self, now: Duration) -> bool {
        match self.last_trigger {
            Some(last) => now.saturating_sub(last) >= self.cooldown,
            None => true,
        }
    }

    /// Back to the startup state.
    pub fn reset(&mut self) {
        self.last_gesture = Gesture::None;
        self.count = 0;
        self.last_trigger = None;
    }

    pub fn last_gesture(&self) -> Gesture {
        self.last_gesture
    }

    /// Length of the current run of identical labels.
    pub fn consecutive_count(&self) -> u32 {
        self.count
    }

    pub fn last_trigger(&self) -> Option<Duration> {
        self.last_trigger
    }
}
