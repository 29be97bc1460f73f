//! Selects posting slots across platforms to maximize predicted engagement
//! under per-day and per-platform-per-day caps. An approximate engine is
//! tried on small catalogs; a deterministic greedy pass covers everything else.

pub mod catalog;
pub mod config;
pub mod model;
pub mod output;
pub mod server;
pub mod solver;

use catalog::{CapacityConfig, RequestError, ScheduleRequest};
use solver::orchestrator::Scheduler;
use solver::SelectionResult;

/// Parses, validates and solves one input record.
pub fn optimize_request(
    scheduler: &Scheduler,
    request: ScheduleRequest,
    defaults: CapacityConfig,
) -> Result<SelectionResult, RequestError> {
    let (slots, caps) = request.resolve(defaults)?;
    Ok(scheduler.solve(&slots, &caps))
}
