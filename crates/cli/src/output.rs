//! Output formatting for CLI

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use webtest_common::config::ReportSettings;
use webtest_e2e::SuiteOutcome;

/// Per-file results of the run
pub fn summary_table(outcome: &SuiteOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Trial", "Test", "Result", "Duration"]);
    for trial in &outcome.trials {
        for result in &trial.results {
            let status = if result.success() {
                "passed".to_string()
            } else {
                format!("failed ({})", result.exit_code)
            };
            table.add_row(vec![
                trial.trial.to_string(),
                result.name.clone(),
                status,
                format!("{} ms", result.duration_ms),
            ]);
        }
    }
    table
}

pub fn print_summary(outcome: &SuiteOutcome) {
    if outcome.all_results().next().is_none() {
        println!("No tests were run.");
        return;
    }
    println!("{}", summary_table(outcome));

    let line = format!(
        "{} passed, {} failed in {} trial(s)",
        outcome.passed(),
        outcome.failed(),
        outcome.trials.len()
    );
    if outcome.exit_code == 0 {
        println!("{} {}", "✓".green(), line);
    } else {
        println!("{} {}", "✗".red(), line);
    }
}

/// Help lines printed when the suite fails
pub fn failure_help(report: &ReportSettings, under_ci: bool) -> Vec<String> {
    let mut lines = vec![
        format!("The {} tests failed!  For help debugging, read:", report.suite_name),
        format!("  {}", report.docs_url),
    ];
    if under_ci {
        lines.push(String::new());
        lines.push("Note: Screenshots of failures are available as build artifacts.".to_string());
    }
    lines
}

pub fn print_failure_help(report: &ReportSettings, under_ci: bool) {
    let lines = failure_help(report, under_ci);
    eprintln!();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            eprintln!("{}", line.red().bold());
        } else {
            eprintln!("{}", line);
        }
    }
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use webtest_e2e::runner::{FileResult, TrialResult};

    #[test]
    fn test_failure_help_local() {
        let report = ReportSettings::default();
        let lines = failure_help(&report, false);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("browser frontend tests failed"));
        assert!(lines[1].contains(&report.docs_url));
    }

    #[test]
    fn test_failure_help_ci_mentions_screenshots() {
        let lines = failure_help(&ReportSettings::default(), true);
        assert!(lines.last().unwrap().contains("Screenshots"));
    }

    #[test]
    fn test_summary_table_rows() {
        let outcome = SuiteOutcome {
            trials: vec![TrialResult {
                trial: 1,
                results: vec![
                    FileResult {
                        name: "00-realm.js".to_string(),
                        path: PathBuf::from("/t/00-realm.js"),
                        exit_code: 0,
                        duration_ms: 12,
                    },
                    FileResult {
                        name: "01-login.js".to_string(),
                        path: PathBuf::from("/t/01-login.js"),
                        exit_code: 2,
                        duration_ms: 30,
                    },
                ],
            }],
            exit_code: 2,
            ..Default::default()
        };
        let rendered = summary_table(&outcome).to_string();
        assert!(rendered.contains("00-realm.js"));
        assert!(rendered.contains("failed (2)"));
    }
}
