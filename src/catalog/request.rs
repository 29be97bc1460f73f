use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CapacityConfig, Slot, MAX_ENGAGEMENT};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed schedule request: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{field} must be a positive integer, got {value}")]
    NonPositiveCapacity { field: &'static str, value: i64 },
    #[error("slot {index}: hour {hour} is outside 0..=23")]
    HourOutOfRange { index: usize, hour: u32 },
    #[error("slot {index}: engagement is not a finite number")]
    NonFiniteEngagement { index: usize },
    #[error("slot {index}: engagement {value} exceeds the supported magnitude")]
    EngagementOutOfRange { index: usize, value: f64 },
    #[error("slot {index}: platform is empty")]
    EmptyPlatform { index: usize },
}

/// The input record as it arrives on the wire. `slots` is required; the caps
/// fall back to configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_posts_per_day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_posts_per_platform_day: Option<i64>,
}

impl ScheduleRequest {
    pub fn from_json(raw: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validates the record and splits it into the catalog and the effective
    /// capacity limits.
    pub fn resolve(self, defaults: CapacityConfig) -> Result<(Vec<Slot>, CapacityConfig), RequestError> {
        let max_per_day = positive_cap(
            "max_posts_per_day",
            self.max_posts_per_day,
            defaults.max_per_day,
        )?;
        let max_per_platform_day = positive_cap(
            "max_posts_per_platform_day",
            self.max_posts_per_platform_day,
            defaults.max_per_platform_day,
        )?;

        for (index, slot) in self.slots.iter().enumerate() {
            if slot.hour > 23 {
                return Err(RequestError::HourOutOfRange {
                    index,
                    hour: slot.hour,
                });
            }
            if !slot.engagement.is_finite() {
                return Err(RequestError::NonFiniteEngagement { index });
            }
            if slot.engagement.abs() > MAX_ENGAGEMENT {
                return Err(RequestError::EngagementOutOfRange {
                    index,
                    value: slot.engagement,
                });
            }
            if slot.platform.trim().is_empty() {
                return Err(RequestError::EmptyPlatform { index });
            }
        }

        Ok((
            self.slots,
            CapacityConfig {
                max_per_day,
                max_per_platform_day,
            },
        ))
    }
}

fn positive_cap(field: &'static str, value: Option<i64>, default: usize) -> Result<usize, RequestError> {
    let value = value.unwrap_or(i64::try_from(default).unwrap_or(i64::MAX));
    if value >= 1 {
        Ok(value as usize)
    } else {
        Err(RequestError::NonPositiveCapacity { field, value })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::catalog::request::{RequestError, ScheduleRequest};
    use crate::catalog::CapacityConfig;

    #[test]
    fn applies_defaults_when_caps_absent() {
        let request: ScheduleRequest = serde_json::from_value(json!({
            "slots": [{"day": 0, "hour": 9, "platform": "instagram", "engagement": 0.85}]
        }))
        .expect("request should parse");
        let (slots, caps) = request
            .resolve(CapacityConfig::default())
            .expect("request should resolve");
        assert_eq!(slots.len(), 1);
        assert_eq!(caps, CapacityConfig::default());
    }

    #[test]
    fn request_caps_override_defaults() {
        let request: ScheduleRequest = serde_json::from_value(json!({
            "slots": [],
            "max_posts_per_day": 5,
            "max_posts_per_platform_day": 2
        }))
        .expect("request should parse");
        let (_, caps) = request
            .resolve(CapacityConfig::default())
            .expect("request should resolve");
        assert_eq!(caps.max_per_day, 5);
        assert_eq!(caps.max_per_platform_day, 2);
    }

    #[test]
    fn rejects_missing_slots_and_missing_engagement() {
        assert!(matches!(
            ScheduleRequest::from_json(r#"{"max_posts_per_day": 3}"#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(
            ScheduleRequest::from_json(r#"{"slots": [{"day": 0, "hour": 9, "platform": "x"}]}"#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(
            ScheduleRequest::from_json(r#"{"slots": {"day": 0}}"#),
            Err(RequestError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_zero_and_negative_caps() {
        let zero = ScheduleRequest::from_json(r#"{"slots": [], "max_posts_per_day": 0}"#)
            .expect("request should parse");
        assert!(matches!(
            zero.resolve(CapacityConfig::default()),
            Err(RequestError::NonPositiveCapacity {
                field: "max_posts_per_day",
                value: 0
            })
        ));

        let negative =
            ScheduleRequest::from_json(r#"{"slots": [], "max_posts_per_platform_day": -2}"#)
                .expect("request should parse");
        assert!(matches!(
            negative.resolve(CapacityConfig::default()),
            Err(RequestError::NonPositiveCapacity { value: -2, .. })
        ));
    }

    #[test]
    fn rejects_bad_hour_and_blank_platform() {
        let late = ScheduleRequest::from_json(
            r#"{"slots": [{"day": 0, "hour": 24, "platform": "x", "engagement": 0.1}]}"#,
        )
        .expect("request should parse");
        assert!(matches!(
            late.resolve(CapacityConfig::default()),
            Err(RequestError::HourOutOfRange { index: 0, hour: 24 })
        ));

        let blank = ScheduleRequest::from_json(
            r#"{"slots": [
                {"day": 0, "hour": 1, "platform": "x", "engagement": 0.1},
                {"day": 0, "hour": 2, "platform": "  ", "engagement": 0.1}
            ]}"#,
        )
        .expect("request should parse");
        assert!(matches!(
            blank.resolve(CapacityConfig::default()),
            Err(RequestError::EmptyPlatform { index: 1 })
        ));
    }

    #[test]
    fn rejects_engagement_beyond_supported_magnitude() {
        let huge = ScheduleRequest::from_json(
            r#"{"slots": [
                {"day": 0, "hour": 9, "platform": "a", "engagement": 0.4},
                {"day": 0, "hour": 10, "platform": "a", "engagement": 1e305}
            ]}"#,
        )
        .expect("request should parse");
        assert!(matches!(
            huge.resolve(CapacityConfig::default()),
            Err(RequestError::EngagementOutOfRange { index: 1, .. })
        ));

        let negative = ScheduleRequest::from_json(
            r#"{"slots": [{"day": 0, "hour": 9, "platform": "a", "engagement": -2.5}]}"#,
        )
        .expect("request should parse");
        assert!(negative.resolve(CapacityConfig::default()).is_ok());
    }
}
