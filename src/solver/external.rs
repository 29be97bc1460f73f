use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::model::OptimizationModel;
use crate::solver::approximate::{ApproximateOptimizer, Assignment, OptimizerError, SolveBudget};

#[derive(Debug, Serialize)]
struct ExternalRequest<'a> {
    model: &'a OptimizationModel,
    max_iterations: u32,
    reps: u32,
}

#[derive(Debug, Deserialize)]
struct ExternalReply {
    x: Vec<f64>,
    fval: f64,
}

/// Hands the model to another program: JSON request on stdin, `{"x": [...],
/// "fval": ...}` expected on stdout.
#[derive(Debug, Clone)]
pub struct ExternalProcessOptimizer {
    label: String,
    program: String,
    args: Vec<String>,
}

impl ExternalProcessOptimizer {
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            label: format!("external:{program}"),
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl ApproximateOptimizer for ExternalProcessOptimizer {
    fn name(&self) -> &str {
        &self.label
    }

    fn solve(
        &self,
        model: &OptimizationModel,
        budget: &SolveBudget,
    ) -> Result<Assignment, OptimizerError> {
        let payload = serde_json::to_vec(&ExternalRequest {
            model,
            max_iterations: budget.max_iterations,
            reps: budget.reps,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| OptimizerError::Process(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(OptimizerError::Process(format!("failed writing request: {e}")));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| OptimizerError::Process(format!("failed waiting for {}: {e}", self.program)))?;
        if !output.status.success() {
            return Err(OptimizerError::Process(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let reply: ExternalReply = serde_json::from_slice(&output.stdout)?;
        Ok(Assignment {
            values: reply.x,
            objective_value: reply.fval,
        })
    }
}
