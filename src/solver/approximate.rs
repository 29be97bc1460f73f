use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::SolverConfig;
use crate::model::{ModelError, OptimizationModel};
use crate::solver::external::ExternalProcessOptimizer;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("assignment has {got} values, model has {expected} variables")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("numerical failure: {0}")]
    Numerical(String),
    #[error("decoded selection violates capacity by {violation}")]
    Infeasible { violation: f64 },
    #[error("optimizer process failed: {0}")]
    Process(String),
    #[error("could not decode optimizer output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("optimizer panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolveBudget {
    pub max_iterations: u32,
    pub reps: u32,
}

impl Default for SolveBudget {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            reps: 2,
        }
    }
}

/// Raw engine output: one value per model variable (not necessarily exactly
/// 0 or 1) and the objective value the engine reports for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub values: Vec<f64>,
    pub objective_value: f64,
}

pub trait ApproximateOptimizer: Send + Sync {
    fn name(&self) -> &str;
    fn solve(
        &self,
        model: &OptimizationModel,
        budget: &SolveBudget,
    ) -> Result<Assignment, OptimizerError>;
}

/// Calls the engine and converts every way it can go wrong, panics included,
/// into an `OptimizerError`.
pub fn run_optimizer(
    optimizer: &dyn ApproximateOptimizer,
    model: &OptimizationModel,
    budget: &SolveBudget,
) -> Result<Assignment, OptimizerError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| optimizer.solve(model, budget)))
        .map_err(|payload| OptimizerError::Panicked(panic_message(payload.as_ref())))?;
    let assignment = outcome?;

    if assignment.values.len() != model.num_variables() {
        return Err(OptimizerError::DimensionMismatch {
            expected: model.num_variables(),
            got: assignment.values.len(),
        });
    }
    if !assignment.objective_value.is_finite() || assignment.values.iter().any(|v| !v.is_finite())
    {
        return Err(OptimizerError::Numerical(
            "non-finite value in optimizer output".to_string(),
        ));
    }
    Ok(assignment)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Picks the approximate engine for this process, if any. An explicit external
/// command wins over the built-in engine.
pub fn discover_optimizer(config: &SolverConfig) -> Option<Box<dyn ApproximateOptimizer>> {
    if !config.approximate_enabled {
        debug!("approximate path disabled by configuration");
        return None;
    }
    if let Some(external) = ExternalProcessOptimizer::from_command(&config.external_command) {
        debug!("using external optimizer {}", external.name());
        return Some(Box::new(external));
    }
    builtin_optimizer(config)
}

#[cfg(feature = "anneal")]
fn builtin_optimizer(config: &SolverConfig) -> Option<Box<dyn ApproximateOptimizer>> {
    Some(Box::new(crate::solver::anneal::AnnealingOptimizer::new(
        config.seed,
    )))
}

#[cfg(not(feature = "anneal"))]
fn builtin_optimizer(_config: &SolverConfig) -> Option<Box<dyn ApproximateOptimizer>> {
    debug!("built without an approximate engine");
    None
}
