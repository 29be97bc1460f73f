use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::solver::{SelectionResult, SolveMethod};

pub fn render_selection_table(result: &SelectionResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Day", "Hour", "Platform", "Score"]);

    for slot in &result.selected_slots {
        table.add_row(Row::from(vec![
            Cell::new(slot.day.to_string()),
            Cell::new(format!("{:02}:00", slot.hour)),
            Cell::new(slot.platform.clone()),
            Cell::new(format!("{:.4}", slot.score)),
        ]));
    }

    let method_cell = match result.method {
        SolveMethod::Approximate => Cell::new(result.method.as_str()).fg(Color::Green),
        SolveMethod::ClassicalGreedy => Cell::new(result.method.as_str()).fg(Color::Yellow),
        SolveMethod::Empty => Cell::new(result.method.as_str()),
    };
    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    summary.set_header(vec!["Method", "Iterations", "Energy", "Selected"]);
    summary.add_row(Row::from(vec![
        method_cell,
        Cell::new(result.iterations.to_string()),
        Cell::new(format!("{:.4}", result.energy)),
        Cell::new(result.selected_slots.len().to_string()),
    ]));

    format!("{table}\n{summary}")
}

#[cfg(test)]
mod tests {
    use crate::output::table::render_selection_table;
    use crate::solver::normalize::classical_result;
    use crate::solver::SelectedSlot;

    #[test]
    fn lists_slots_and_summary() {
        let result = classical_result(vec![SelectedSlot {
            day: 1,
            hour: 7,
            platform: "linkedin".to_string(),
            score: 0.4,
        }]);
        let rendered = render_selection_table(&result);
        assert!(rendered.contains("linkedin"));
        assert!(rendered.contains("07:00"));
        assert!(rendered.contains("classical_greedy"));
        assert!(rendered.contains("-0.4000"));
    }
}
