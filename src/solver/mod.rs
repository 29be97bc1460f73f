pub mod approximate;
#[cfg(feature = "anneal")]
pub mod anneal;
pub mod external;
pub mod greedy;
pub mod normalize;
pub mod orchestrator;

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize, Serializer};

use crate::catalog::{round4, CapacityConfig, Slot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolveMethod {
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "qaoa")]
    Approximate,
    #[serde(rename = "classical_greedy")]
    ClassicalGreedy,
}

impl SolveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Approximate => "qaoa",
            Self::ClassicalGreedy => "classical_greedy",
        }
    }
}

impl Display for SolveMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedSlot {
    pub day: u32,
    pub hour: u32,
    pub platform: String,
    pub score: f64,
}

impl From<&Slot> for SelectedSlot {
    fn from(slot: &Slot) -> Self {
        Self {
            day: slot.day,
            hour: slot.hour,
            platform: slot.platform.clone(),
            score: round4(slot.engagement),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionResult {
    pub selected_slots: Vec<SelectedSlot>,
    pub method: SolveMethod,
    pub iterations: u32,
    #[serde(serialize_with = "serialize_energy")]
    pub energy: f64,
}

/// Zero energy goes out as the integer `0`, everything else as a float.
fn serialize_energy<S: Serializer>(energy: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if *energy == 0.0 {
        serializer.serialize_i64(0)
    } else {
        serializer.serialize_f64(*energy)
    }
}

impl SelectionResult {
    pub fn total_score(&self) -> f64 {
        self.selected_slots.iter().map(|s| s.score).sum()
    }

    pub fn is_feasible(&self, caps: &CapacityConfig) -> bool {
        let mut per_day: HashMap<u32, usize> = HashMap::new();
        let mut per_platform_day: HashMap<(u32, &str), usize> = HashMap::new();
        for slot in &self.selected_slots {
            *per_day.entry(slot.day).or_default() += 1;
            *per_platform_day
                .entry((slot.day, slot.platform.as_str()))
                .or_default() += 1;
        }
        per_day.values().all(|&n| n <= caps.max_per_day)
            && per_platform_day
                .values()
                .all(|&n| n <= caps.max_per_platform_day)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::catalog::CapacityConfig;
    use crate::solver::{SelectedSlot, SelectionResult, SolveMethod};

    fn picked(day: u32, hour: u32, platform: &str, score: f64) -> SelectedSlot {
        SelectedSlot {
            day,
            hour,
            platform: platform.to_string(),
            score,
        }
    }

    #[test]
    fn method_labels_match_wire_names() {
        assert_eq!(serde_json::to_value(SolveMethod::Empty).unwrap(), json!("empty"));
        assert_eq!(serde_json::to_value(SolveMethod::Approximate).unwrap(), json!("qaoa"));
        assert_eq!(
            serde_json::to_value(SolveMethod::ClassicalGreedy).unwrap(),
            json!("classical_greedy")
        );
        assert_eq!(SolveMethod::Approximate.to_string(), "qaoa");
    }

    #[test]
    fn feasibility_checks_both_caps() {
        let caps = CapacityConfig {
            max_per_day: 2,
            max_per_platform_day: 1,
        };
        let ok = SelectionResult {
            selected_slots: vec![picked(0, 9, "a", 0.9), picked(0, 11, "b", 0.7)],
            method: SolveMethod::ClassicalGreedy,
            iterations: 0,
            energy: -1.6,
        };
        assert!(ok.is_feasible(&caps));
        assert!((ok.total_score() - 1.6).abs() < 1e-12);

        let same_platform = SelectionResult {
            selected_slots: vec![picked(0, 9, "a", 0.9), picked(0, 10, "a", 0.8)],
            ..ok.clone()
        };
        assert!(!same_platform.is_feasible(&caps));

        let crowded_day = SelectionResult {
            selected_slots: vec![
                picked(0, 9, "a", 0.9),
                picked(0, 10, "b", 0.8),
                picked(0, 11, "c", 0.7),
            ],
            ..ok
        };
        assert!(!crowded_day.is_feasible(&caps));
    }
}
