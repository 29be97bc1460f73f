use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CapacityConfig, Slot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("cannot build a model from an empty slot catalog")]
    EmptyCatalog,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Day,
    PlatformDay,
}

/// `sum(x[i] for i in variables) <= rhs`, all coefficients +1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub variables: Vec<usize>,
    pub rhs: usize,
}

impl LinearConstraint {
    pub fn load(&self, assignment: &[f64]) -> f64 {
        self.variables.iter().map(|&i| assignment[i]).sum()
    }
}

/// Binary selection model. Variable `i` corresponds to catalog slot `i`; the
/// objective is minimized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationModel {
    pub name: String,
    pub variables: Vec<String>,
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl OptimizationModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn objective_value(&self, assignment: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(assignment)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Total amount by which the assignment exceeds constraint right-hand sides.
    pub fn violation(&self, assignment: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|c| (c.load(assignment) - c.rhs as f64).max(0.0))
            .sum()
    }

    pub fn is_feasible(&self, assignment: &[f64]) -> bool {
        assignment.len() == self.num_variables() && self.violation(assignment) <= 1e-9
    }
}

pub fn build_model(slots: &[Slot], caps: &CapacityConfig) -> Result<OptimizationModel, ModelError> {
    if slots.is_empty() {
        return Err(ModelError::EmptyCatalog);
    }

    let variables = (0..slots.len()).map(|i| format!("x_{i}")).collect();
    let objective = slots.iter().map(|s| -s.engagement).collect();

    let mut by_day: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut by_platform_day: BTreeMap<(u32, &str), Vec<usize>> = BTreeMap::new();
    for (i, slot) in slots.iter().enumerate() {
        by_day.entry(slot.day).or_default().push(i);
        by_platform_day
            .entry((slot.day, slot.platform.as_str()))
            .or_default()
            .push(i);
    }

    let mut constraints = Vec::new();
    for (day, indices) in by_day {
        if indices.len() > caps.max_per_day {
            constraints.push(LinearConstraint {
                name: format!("max_day_{day}"),
                kind: ConstraintKind::Day,
                variables: indices,
                rhs: caps.max_per_day,
            });
        }
    }
    for ((day, platform), indices) in by_platform_day {
        if indices.len() > caps.max_per_platform_day {
            constraints.push(LinearConstraint {
                name: format!("max_{platform}_day_{day}"),
                kind: ConstraintKind::PlatformDay,
                variables: indices,
                rhs: caps.max_per_platform_day,
            });
        }
    }

    Ok(OptimizationModel {
        name: "schedule_optimizer".to_string(),
        variables,
        objective,
        constraints,
    })
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CapacityConfig, Slot};
    use crate::model::{build_model, ConstraintKind, ModelError};

    fn caps(max_per_day: usize, max_per_platform_day: usize) -> CapacityConfig {
        CapacityConfig {
            max_per_day,
            max_per_platform_day,
        }
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(
            build_model(&[], &CapacityConfig::default()),
            Err(ModelError::EmptyCatalog)
        );
    }

    #[test]
    fn objective_negates_engagement_in_catalog_order() {
        let slots = vec![Slot::new(0, 9, "a", 0.9), Slot::new(1, 10, "b", 0.25)];
        let model = build_model(&slots, &CapacityConfig::default()).expect("model");
        assert_eq!(model.variables, vec!["x_0", "x_1"]);
        assert_eq!(model.objective, vec![-0.9, -0.25]);
        assert!(model.constraints.is_empty());
    }

    #[test]
    fn emits_constraints_only_for_groups_over_capacity() {
        let slots = vec![
            Slot::new(0, 9, "a", 0.9),
            Slot::new(0, 10, "a", 0.8),
            Slot::new(0, 11, "b", 0.7),
            Slot::new(1, 9, "a", 0.6),
            Slot::new(1, 12, "b", 0.5),
        ];
        let model = build_model(&slots, &caps(2, 1)).expect("model");

        let names: Vec<&str> = model.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["max_day_0", "max_a_day_0"]);

        let day = &model.constraints[0];
        assert_eq!(day.kind, ConstraintKind::Day);
        assert_eq!(day.variables, vec![0, 1, 2]);
        assert_eq!(day.rhs, 2);

        let platform = &model.constraints[1];
        assert_eq!(platform.kind, ConstraintKind::PlatformDay);
        assert_eq!(platform.variables, vec![0, 1]);
        assert_eq!(platform.rhs, 1);
    }

    #[test]
    fn evaluates_objective_and_feasibility() {
        let slots = vec![
            Slot::new(0, 9, "a", 0.9),
            Slot::new(0, 10, "a", 0.8),
            Slot::new(0, 11, "b", 0.7),
        ];
        let model = build_model(&slots, &caps(2, 1)).expect("model");

        let good = [1.0, 0.0, 1.0];
        assert!(model.is_feasible(&good));
        assert!((model.objective_value(&good) + 1.6).abs() < 1e-12);

        let bad = [1.0, 1.0, 1.0];
        assert!(!model.is_feasible(&bad));
        // day load 3 > 2 and platform load 2 > 1
        assert!((model.violation(&bad) - 2.0).abs() < 1e-12);

        assert!(!model.is_feasible(&[1.0, 0.0]));
    }
}
