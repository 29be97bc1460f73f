use crate::catalog::{round4, Slot};
use crate::solver::{SelectedSlot, SelectionResult, SolveMethod};

const SELECTED_THRESHOLD: f64 = 0.5;

/// Binary indicator per variable, thresholding relaxed engine output at 0.5.
pub fn threshold_assignment(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v > SELECTED_THRESHOLD { 1.0 } else { 0.0 })
        .collect()
}

pub fn decode_assignment(slots: &[Slot], values: &[f64]) -> Vec<SelectedSlot> {
    slots
        .iter()
        .zip(values)
        .filter(|&(_, &v)| v > SELECTED_THRESHOLD)
        .map(|(slot, _)| SelectedSlot::from(slot))
        .collect()
}

pub fn sort_by_time(selected: &mut [SelectedSlot]) {
    selected.sort_by_key(|s| (s.day, s.hour));
}

pub fn empty_result() -> SelectionResult {
    SelectionResult {
        selected_slots: Vec::new(),
        method: SolveMethod::Empty,
        iterations: 0,
        energy: 0.0,
    }
}

pub fn approximate_result(
    mut selected: Vec<SelectedSlot>,
    objective_value: f64,
    iterations: u32,
) -> SelectionResult {
    sort_by_time(&mut selected);
    SelectionResult {
        selected_slots: selected,
        method: SolveMethod::Approximate,
        iterations,
        energy: round4(objective_value),
    }
}

pub fn classical_result(mut selected: Vec<SelectedSlot>) -> SelectionResult {
    sort_by_time(&mut selected);
    let total: f64 = selected.iter().map(|s| s.score).sum();
    SelectionResult {
        energy: round4(-total),
        selected_slots: selected,
        method: SolveMethod::ClassicalGreedy,
        iterations: 0,
    }
}
