use anyhow::Result;

use crate::solver::SelectionResult;

pub fn selection_to_csv(result: &SelectionResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["day", "hour", "platform", "score"])?;
    for slot in &result.selected_slots {
        writer.write_record([
            slot.day.to_string(),
            slot.hour.to_string(),
            slot.platform.clone(),
            format!("{:.4}", slot.score),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use crate::output::csv::selection_to_csv;
    use crate::solver::normalize::classical_result;
    use crate::solver::SelectedSlot;

    #[test]
    fn writes_one_row_per_slot() {
        let result = classical_result(vec![SelectedSlot {
            day: 0,
            hour: 9,
            platform: "instagram".to_string(),
            score: 0.85,
        }]);
        let csv = selection_to_csv(&result).expect("csv");
        assert_eq!(csv, "day,hour,platform,score\n0,9,instagram,0.8500\n");
    }
}
