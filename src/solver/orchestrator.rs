use std::fmt::{Display, Formatter};

use tracing::{debug, info, warn};

use crate::catalog::{CapacityConfig, Slot};
use crate::config::SolverConfig;
use crate::model::build_model;
use crate::solver::approximate::{
    discover_optimizer, run_optimizer, ApproximateOptimizer, OptimizerError, SolveBudget,
};
use crate::solver::greedy::solve_greedy;
use crate::solver::normalize::{
    approximate_result, classical_result, decode_assignment, empty_result, threshold_assignment,
};
use crate::solver::SelectionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverPolicy {
    /// Catalogs larger than this skip the approximate path entirely.
    pub approximate_slot_limit: usize,
    pub budget: SolveBudget,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            approximate_slot_limit: 30,
            budget: SolveBudget::default(),
        }
    }
}

impl From<&SolverConfig> for SolverPolicy {
    fn from(config: &SolverConfig) -> Self {
        Self {
            approximate_slot_limit: config.approximate_slot_limit,
            budget: SolveBudget {
                max_iterations: config.max_iterations,
                reps: config.reps,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassicalReason {
    Unavailable,
    OverScale { slots: usize, limit: usize },
}

impl Display for ClassicalReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "approximate optimizer unavailable"),
            Self::OverScale { slots, limit } => {
                write!(f, "{slots} slots exceeds approximate limit of {limit}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Empty,
    Approximate,
    Classical(ClassicalReason),
}

pub fn choose_strategy(slot_count: usize, approximate_available: bool, policy: &SolverPolicy) -> Strategy {
    if slot_count == 0 {
        return Strategy::Empty;
    }
    if !approximate_available {
        return Strategy::Classical(ClassicalReason::Unavailable);
    }
    if slot_count > policy.approximate_slot_limit {
        return Strategy::Classical(ClassicalReason::OverScale {
            slots: slot_count,
            limit: policy.approximate_slot_limit,
        });
    }
    Strategy::Approximate
}

/// Runs one selection: approximate engine when allowed, greedy otherwise or
/// when the engine fails. Holds no per-run state.
pub struct Scheduler {
    optimizer: Option<Box<dyn ApproximateOptimizer>>,
    policy: SolverPolicy,
}

impl Scheduler {
    pub fn new(optimizer: Option<Box<dyn ApproximateOptimizer>>, policy: SolverPolicy) -> Self {
        Self { optimizer, policy }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(discover_optimizer(config), SolverPolicy::from(config))
    }

    pub fn classical_only(policy: SolverPolicy) -> Self {
        Self::new(None, policy)
    }

    pub fn policy(&self) -> &SolverPolicy {
        &self.policy
    }

    pub fn optimizer_name(&self) -> Option<&str> {
        self.optimizer.as_deref().map(|o| o.name())
    }

    pub fn solve(&self, slots: &[Slot], caps: &CapacityConfig) -> SelectionResult {
        let strategy = choose_strategy(slots.len(), self.optimizer.is_some(), &self.policy);
        debug!(?strategy, slots = slots.len(), "strategy chosen");

        let result = match (strategy, self.optimizer.as_deref()) {
            (Strategy::Empty, _) => empty_result(),
            (Strategy::Approximate, Some(optimizer)) => {
                match self.try_approximate(optimizer, slots, caps) {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(
                            "{} failed, falling back to classical: {err}",
                            optimizer.name()
                        );
                        self.solve_classical(slots, caps)
                    }
                }
            }
            (Strategy::Classical(reason), _) => {
                debug!("classical path: {reason}");
                self.solve_classical(slots, caps)
            }
            (Strategy::Approximate, None) => self.solve_classical(slots, caps),
        };

        info!(
            method = %result.method,
            selected = result.selected_slots.len(),
            energy = result.energy,
            "schedule solved"
        );
        result
    }

    fn try_approximate(
        &self,
        optimizer: &dyn ApproximateOptimizer,
        slots: &[Slot],
        caps: &CapacityConfig,
    ) -> Result<SelectionResult, OptimizerError> {
        let model = build_model(slots, caps)?;
        let assignment = run_optimizer(optimizer, &model, &self.policy.budget)?;

        let indicator = threshold_assignment(&assignment.values);
        if !model.is_feasible(&indicator) {
            return Err(OptimizerError::Infeasible {
                violation: model.violation(&indicator),
            });
        }

        let selected = decode_assignment(slots, &assignment.values);
        Ok(approximate_result(
            selected,
            assignment.objective_value,
            self.policy.budget.max_iterations,
        ))
    }

    fn solve_classical(&self, slots: &[Slot], caps: &CapacityConfig) -> SelectionResult {
        classical_result(solve_greedy(slots, caps))
    }
}
