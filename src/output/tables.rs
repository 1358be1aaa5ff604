use chrono::TimeDelta;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Colours Jenkins build results and pipeline stage statuses alike.
pub fn color_coded_result_cell(result: &str) -> Cell {
    match result {
        "" => Cell::new("IN PROGRESS").fg(TableColor::DarkGrey),
        "SUCCESS" => Cell::new(result).fg(TableColor::Green),
        "UNSTABLE" | "PAUSED_PENDING_INPUT" => Cell::new(result).fg(TableColor::Yellow),
        "FAILURE" | "FAILED" => Cell::new(result).fg(TableColor::Red),
        _ => Cell::new(result).fg(TableColor::DarkGrey),
    }
}

/// Renders `1h 2m 3.4s`, `2m 3.0s`, `1.5s` or `250ms`; negative values get a
/// leading `-`.
pub fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let millis = duration.num_milliseconds().unsigned_abs();
    if millis < 1000 {
        return format!("{sign}{millis}ms");
    }

    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    #[allow(clippy::cast_precision_loss)]
    let seconds = (millis % 60_000) as f64 / 1000.0;

    if hours > 0 {
        format!("{sign}{hours}h {minutes}m {seconds:.1}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds:.1}s")
    } else {
        format!("{sign}{seconds:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_millis() {
        assert_eq!(format_duration(TimeDelta::zero()), "0ms");
        assert_eq!(format_duration(TimeDelta::milliseconds(250)), "250ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(TimeDelta::milliseconds(1500)), "1.5s");
        assert_eq!(format_duration(TimeDelta::seconds(9)), "9.0s");
    }

    #[test]
    fn test_format_duration_minutes_and_hours() {
        assert_eq!(format_duration(TimeDelta::milliseconds(123_000)), "2m 3.0s");
        assert_eq!(format_duration(TimeDelta::milliseconds(3_723_400)), "1h 2m 3.4s");
    }

    #[test]
    fn test_format_negative_duration() {
        assert_eq!(format_duration(TimeDelta::milliseconds(-5)), "-5ms");
        assert_eq!(format_duration(TimeDelta::milliseconds(-1500)), "-1.5s");
    }
}
