use std::collections::HashMap;

use crate::catalog::{CapacityConfig, Slot};
use crate::solver::SelectedSlot;

/// Single pass over slots in descending engagement order, taking a slot
/// whenever both its day and its platform-day still have room. Ties keep
/// catalog order. Feasible by construction, not necessarily optimal.
pub fn solve_greedy(slots: &[Slot], caps: &CapacityConfig) -> Vec<SelectedSlot> {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| slots[b].engagement.total_cmp(&slots[a].engagement));

    let mut day_counts: HashMap<u32, usize> = HashMap::new();
    let mut platform_day_counts: HashMap<(&str, u32), usize> = HashMap::new();
    let mut selected = Vec::new();

    for idx in order {
        let slot = &slots[idx];
        let key = (slot.platform.as_str(), slot.day);

        if day_counts.get(&slot.day).copied().unwrap_or(0) >= caps.max_per_day {
            continue;
        }
        if platform_day_counts.get(&key).copied().unwrap_or(0) >= caps.max_per_platform_day {
            continue;
        }

        *day_counts.entry(slot.day).or_default() += 1;
        *platform_day_counts.entry(key).or_default() += 1;
        selected.push(SelectedSlot::from(slot));
    }

    selected
}
