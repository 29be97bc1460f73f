use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_json_compact<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::output::json::render_json_compact;
    use crate::solver::normalize::{classical_result, empty_result};
    use crate::solver::SelectedSlot;

    #[test]
    fn empty_result_has_wire_shape() {
        let rendered = render_json_compact(&empty_result()).expect("render");
        assert!(rendered.contains(r#""energy":0}"#));
        let value: Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(
            value,
            json!({"selected_slots": [], "method": "empty", "iterations": 0, "energy": 0})
        );
    }

    #[test]
    fn non_zero_energy_stays_fractional() {
        let result = classical_result(vec![SelectedSlot {
            day: 0,
            hour: 9,
            platform: "a".to_string(),
            score: 2.0,
        }]);
        let rendered = render_json_compact(&result).expect("render");
        assert!(rendered.contains(r#""energy":-2.0"#));
    }
}
