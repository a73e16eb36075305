//! Run summary output

use owo_colors::OwoColorize;
use skelsync_engine::{ExecutionReport, Resolution};

/// One summary line per plan path
pub fn path_lines(report: &ExecutionReport) -> Vec<String> {
    report
        .paths
        .iter()
        .map(|entry| match &entry.resolution {
            Resolution::Applied { index, kind } => {
                let detail = if *index == 0 {
                    kind.clone()
                } else {
                    format!("{kind}, fallback #{index}")
                };
                format!(
                    "  {} {} {}",
                    "✓".bright_green(),
                    entry.path,
                    format!("({detail})").dimmed()
                )
            }
            Resolution::NoActions => {
                format!("  {} {} {}", "○".dimmed(), entry.path, "(no actions)".dimmed())
            }
        })
        .collect()
}

/// Print the per-path lines and the totals
pub fn print_summary(report: &ExecutionReport) {
    for line in path_lines(report) {
        println!("{line}");
    }

    let applied = report.applied();
    let skipped = report.paths.len() - applied;
    if skipped > 0 {
        println!(
            "{} {} synced | {} {} without actions",
            "●".bright_green(),
            applied.to_string().bright_green().bold(),
            "●".dimmed(),
            skipped.to_string().bold(),
        );
    } else {
        println!(
            "{} {} synced",
            "●".bright_green(),
            applied.to_string().bright_green().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use skelsync_engine::{PathReport, RelPath};

    #[test]
    fn test_path_lines() {
        let report = ExecutionReport {
            checks_run: 1,
            paths: vec![
                PathReport {
                    path: RelPath::try_from("build/setup.mk").unwrap(),
                    resolution: Resolution::Applied {
                        index: 0,
                        kind: "overwrite_file".to_string(),
                    },
                },
                PathReport {
                    path: RelPath::try_from("NOTICE").unwrap(),
                    resolution: Resolution::Applied {
                        index: 1,
                        kind: "overwrite_file".to_string(),
                    },
                },
                PathReport {
                    path: RelPath::try_from("docs").unwrap(),
                    resolution: Resolution::NoActions,
                },
            ],
        };

        let lines = path_lines(&report);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("build/setup.mk"));
        assert!(lines[0].contains("overwrite_file"));
        assert!(lines[1].contains("fallback #1"));
        assert!(lines[2].contains("no actions"));
    }
}
