//! Tabular probe report

use comfy_table::{ContentArrangement, Table};

use crate::probe::ProbeResult;

/// ASCII borders with a rule under the header and none between rows
const REPORT_PRESET: &str = "||--+-++|    ++++++";

/// Column headers
pub const HEADER: [&str; 3] = ["Description", "URL", "Result"];

/// Render results as a bordered three-column table.
///
/// Rows keep input order. Columns are as wide as their widest cell, header
/// included, and nothing is wrapped or truncated. No colour or terminal
/// detection is involved, so equal input gives byte-identical output.
pub fn render(results: &[ProbeResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(REPORT_PRESET)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(HEADER);

    for result in results {
        table.add_row(vec![
            result.description.clone(),
            result.target.clone(),
            result.outcome.to_string(),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeFailure, ProbeOutcome};

    fn result(description: &str, target: &str, passed: bool) -> ProbeResult {
        ProbeResult {
            description: description.to_string(),
            target: target.to_string(),
            outcome: if passed {
                ProbeOutcome::Success
            } else {
                ProbeOutcome::Failure
            },
            failure: (!passed).then_some(ProbeFailure::TimedOut),
        }
    }

    fn sample() -> Vec<ProbeResult> {
        vec![
            result("Health / 8080", "http://127.0.0.1:8080", true),
            result("Metrics endpoint / 9002", "http://127.0.0.1:9002/metrics", false),
            result("Socat Relay / 8089", "http://127.0.0.1:8089", true),
        ]
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&sample()), render(&sample()));
    }

    #[test]
    fn test_rows_keep_input_order() {
        let table = render(&sample());
        let first = table.find("Health / 8080").unwrap();
        let second = table.find("Metrics endpoint / 9002").unwrap();
        let third = table.find("Socat Relay / 8089").unwrap();

        assert!(first < second && second < third);
    }

    #[test]
    fn test_long_content_is_not_truncated() {
        let long_target = format!("http://127.0.0.1:8089/{}", "x".repeat(300));
        let table = render(&[result("Socat Relay / 8089", &long_target, true)]);

        assert!(table.contains(&long_target));
        // Top border, header, header rule, one unwrapped row, bottom border
        assert_eq!(table.lines().count(), 5);
    }

    #[test]
    fn test_borders_are_aligned() {
        let table = render(&sample());
        let rules: Vec<&str> = table.lines().filter(|l| l.starts_with('+')).collect();

        // Top, under the header, bottom
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|rule| *rule == rules[0]));

        let widest_target = "http://127.0.0.1:9002/metrics".len();
        let segments: Vec<usize> = rules[0]
            .split('+')
            .filter(|s| !s.is_empty())
            .map(|s| s.len())
            .collect();
        // Column width plus one space of padding on each side
        assert_eq!(segments[0], "Metrics endpoint / 9002".len() + 2);
        assert_eq!(segments[1], widest_target + 2);
    }

    #[test]
    fn test_header_wider_than_content() {
        let table = render(&[result("a", "b", true)]);
        assert!(table.contains("Description"));
        assert!(table.contains("URL"));
        assert!(table.contains("Result"));
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let table = render(&[]);
        assert!(table.contains("Description"));
        assert!(!table.contains("success"));
    }
}
