pub mod request;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use request::{RequestError, ScheduleRequest};

/// One candidate posting opportunity. Never mutated once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub day: u32,
    pub hour: u32,
    pub platform: String,
    pub engagement: f64,
}

impl Slot {
    pub fn new(day: u32, hour: u32, platform: impl Into<String>, engagement: f64) -> Self {
        Self {
            day,
            hour,
            platform: platform.into(),
            engagement,
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "day {} {:02}:00 {} ({:.4})",
            self.day, self.hour, self.platform, self.engagement
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapacityConfig {
    pub max_per_day: usize,
    pub max_per_platform_day: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_per_day: 3,
            max_per_platform_day: 1,
        }
    }
}

/// Largest engagement magnitude accepted in a request.
pub const MAX_ENGAGEMENT: f64 = 1e12;

pub fn round4(value: f64) -> f64 {
    let scaled = value * 10_000.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 10_000.0
}
