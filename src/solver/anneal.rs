use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::trace;

use crate::model::OptimizationModel;
use crate::solver::approximate::{ApproximateOptimizer, Assignment, OptimizerError, SolveBudget};

/// Simulated annealing over the penalized binary objective
/// `c·x + P·Σ max(0, load - rhs)²`. Each rep is an independent restart from
/// the empty selection; the budget is the number of sweeps per restart.
#[derive(Debug, Clone)]
pub struct AnnealingOptimizer {
    seed: u64,
    cooling_ratio: f64,
}

impl AnnealingOptimizer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cooling_ratio: 1e-3,
        }
    }
}

struct Walk<'a> {
    model: &'a OptimizationModel,
    membership: Vec<Vec<usize>>,
    penalty: f64,
    state: Vec<bool>,
    loads: Vec<usize>,
    objective: f64,
    excess: usize,
}

impl<'a> Walk<'a> {
    fn new(model: &'a OptimizationModel, membership: Vec<Vec<usize>>, penalty: f64) -> Self {
        Self {
            model,
            membership,
            penalty,
            state: vec![false; model.num_variables()],
            loads: vec![0; model.constraints.len()],
            objective: 0.0,
            excess: 0,
        }
    }

    fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = false);
        self.loads.iter_mut().for_each(|l| *l = 0);
        self.objective = 0.0;
        self.excess = 0;
    }

    fn penalty_of(&self, constraint: usize, load: usize) -> f64 {
        let over = load.saturating_sub(self.model.constraints[constraint].rhs) as f64;
        self.penalty * over * over
    }

    fn flip_delta(&self, i: usize) -> f64 {
        let on = !self.state[i];
        let mut delta = if on {
            self.model.objective[i]
        } else {
            -self.model.objective[i]
        };
        for &c in &self.membership[i] {
            let load = self.loads[c];
            let next = if on { load + 1 } else { load - 1 };
            delta += self.penalty_of(c, next) - self.penalty_of(c, load);
        }
        delta
    }

    fn flip(&mut self, i: usize) {
        let on = !self.state[i];
        self.state[i] = on;
        self.objective += if on {
            self.model.objective[i]
        } else {
            -self.model.objective[i]
        };
        for &c in &self.membership[i] {
            let rhs = self.model.constraints[c].rhs;
            let before = self.loads[c].saturating_sub(rhs);
            if on {
                self.loads[c] += 1;
            } else {
                self.loads[c] -= 1;
            }
            let after = self.loads[c].saturating_sub(rhs);
            self.excess = self.excess + after - before;
        }
    }
}

impl ApproximateOptimizer for AnnealingOptimizer {
    fn name(&self) -> &str {
        "anneal"
    }

    fn solve(
        &self,
        model: &OptimizationModel,
        budget: &SolveBudget,
    ) -> Result<Assignment, OptimizerError> {
        let n = model.num_variables();
        if n == 0 || model.objective.len() != n {
            return Err(OptimizerError::Numerical(format!(
                "objective has {} coefficients for {n} variables",
                model.objective.len()
            )));
        }
        if budget.max_iterations == 0 {
            return Err(OptimizerError::Numerical(
                "iteration budget is zero".to_string(),
            ));
        }

        let mut membership = vec![Vec::new(); n];
        for (c, constraint) in model.constraints.iter().enumerate() {
            for &v in &constraint.variables {
                let Some(slot) = membership.get_mut(v) else {
                    return Err(OptimizerError::DimensionMismatch {
                        expected: n,
                        got: v + 1,
                    });
                };
                slot.push(c);
            }
        }

        let penalty = 1.0 + model.objective.iter().map(|c| c.abs()).sum::<f64>();
        if !penalty.is_finite() {
            return Err(OptimizerError::Numerical(
                "objective coefficients overflow".to_string(),
            ));
        }
        let t_start = penalty;
        let t_end = penalty * self.cooling_ratio;
        let sweeps = budget.max_iterations as usize;

        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        let mut walk = Walk::new(model, membership, penalty);
        // The empty selection is always feasible.
        let mut best = vec![false; n];
        let mut best_objective = 0.0;

        for rep in 0..budget.reps.max(1) {
            walk.reset();
            for sweep in 0..sweeps {
                let progress = if sweeps > 1 {
                    sweep as f64 / (sweeps - 1) as f64
                } else {
                    1.0
                };
                let temperature = t_start * (t_end / t_start).powf(progress);
                for _ in 0..n {
                    let i = rng.gen_range(0..n);
                    let delta = walk.flip_delta(i);
                    if delta <= 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                        walk.flip(i);
                        if walk.excess == 0 && walk.objective < best_objective - 1e-12 {
                            best_objective = walk.objective;
                            best.copy_from_slice(&walk.state);
                        }
                    }
                }
            }
            trace!(rep, best_objective, "annealing restart finished");
        }

        if !best_objective.is_finite() {
            return Err(OptimizerError::Numerical(
                "objective diverged".to_string(),
            ));
        }

        let values: Vec<f64> = best.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect();
        Ok(Assignment {
            objective_value: model.objective_value(&values),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CapacityConfig, Slot};
    use crate::model::build_model;
    use crate::solver::anneal::AnnealingOptimizer;
    use crate::solver::approximate::{ApproximateOptimizer, SolveBudget};
    use crate::solver::greedy::solve_greedy;

    #[test]
    fn finds_optimum_on_small_catalog() {
        let slots = vec![
            Slot::new(0, 9, "a", 0.9),
            Slot::new(0, 10, "a", 0.8),
            Slot::new(0, 11, "b", 0.7),
        ];
        let caps = CapacityConfig {
            max_per_day: 2,
            max_per_platform_day: 1,
        };
        let model = build_model(&slots, &caps).expect("model");
        let out = AnnealingOptimizer::new(7)
            .solve(&model, &SolveBudget::default())
            .expect("solve");
        assert_eq!(out.values, vec![1.0, 0.0, 1.0]);
        assert!((out.objective_value + 1.6).abs() < 1e-9);
    }

    #[test]
    fn result_is_feasible_and_reproducible() {
        let slots: Vec<Slot> = (0..24u32)
            .map(|i| {
                Slot::new(
                    i % 4,
                    8 + i % 10,
                    ["instagram", "linkedin", "tiktok"][(i % 3) as usize],
                    ((i * 53) % 97) as f64 / 97.0,
                )
            })
            .collect();
        let caps = CapacityConfig::default();
        let model = build_model(&slots, &caps).expect("model");
        let first = AnnealingOptimizer::new(11)
            .solve(&model, &SolveBudget::default())
            .expect("solve");
        let second = AnnealingOptimizer::new(11)
            .solve(&model, &SolveBudget::default())
            .expect("solve");
        assert_eq!(first, second);
        assert!(model.is_feasible(&first.values));
        assert!(first.objective_value < 0.0);

        let greedy: f64 = solve_greedy(&slots, &caps).iter().map(|s| s.score).sum();
        assert!(-first.objective_value >= greedy * 0.5);
    }

    #[test]
    fn zero_budget_is_a_numerical_failure() {
        let slots = vec![Slot::new(0, 9, "a", 0.9)];
        let model = build_model(&slots, &CapacityConfig::default()).expect("model");
        let budget = SolveBudget {
            max_iterations: 0,
            reps: 2,
        };
        assert!(AnnealingOptimizer::new(1).solve(&model, &budget).is_err());
    }
}
