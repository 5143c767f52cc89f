//! CLI presentation: text formatters for progress, verification and the run summary.

use crate::pipeline::{ProgressUpdate, RunSummary, VerificationReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const BAR_WIDTH: usize = 50;

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Start-of-run banner with the active switches
pub fn format_banner(dry_run: bool, topic_filter: Option<usize>, resume: bool) -> String {
    let mut out = format!("{}\n", heading("Glossa content generator"));
    if dry_run {
        out.push_str(&format!(
            "{}\n",
            "DRY RUN: no files will be modified".yellow()
        ));
    }
    if let Some(count) = topic_filter {
        out.push_str(&format!("Topic filter: {} topic(s) specified\n", count));
    }
    if !resume {
        out.push_str("Starting fresh (ignoring previous progress)\n");
    }
    out
}

/// Progress bar and counters shown before each topic
pub fn format_progress(update: &ProgressUpdate) -> String {
    let percentage = update.percentage();
    let filled = ((percentage / 2.0).floor() as usize).min(BAR_WIDTH);
    format!(
        "\n[{}{}] {:.1}%\nProcessing: {} ({})\nProgress: {}/{} | Successful: {} | Failed: {} | Remaining: {}\nETA: {}",
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        percentage,
        update.title,
        update.topic_id,
        update.processed,
        update.total,
        update.successful,
        update.failed,
        update.remaining,
        update.eta()
    )
}

pub fn format_verification(report: &VerificationReport) -> String {
    let mut out = format!("{}\n\n", heading("Verification"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Check", "Result"]);
    table.add_row(vec!["Entries in file".to_string(), report.total_in_file.to_string()]);
    table.add_row(vec!["Processed topics".to_string(), report.total_processed.to_string()]);
    table.add_row(vec![
        "Missing entries".to_string(),
        report.missing_topics.len().to_string(),
    ]);
    table.add_row(vec![
        "Syntax".to_string(),
        if report.syntax_valid { "valid" } else { "invalid" }.to_string(),
    ]);
    out.push_str(&format!("{}\n", table));

    for id in &report.missing_topics {
        out.push_str(&format!("  - {}\n", id));
    }
    if let Some(error) = &report.error {
        out.push_str(&format!("  {}\n", error.red()));
    }
    let verdict = if report.valid {
        format!("{}", "VERIFICATION PASSED".green())
    } else {
        format!("{}", "VERIFICATION FAILED".red())
    };
    out.push_str(&verdict);
    out.push('\n');
    out
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    if let Some(report) = &summary.verification {
        out.push_str(&format_verification(report));
        out.push('\n');
    }

    out.push_str(&format!("{}\n\n", heading("Generation summary")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Total topics", summary.total.to_string()),
        ("Processed", summary.processed.to_string()),
        ("Successful", summary.successful.to_string()),
        ("Failed", summary.failed.to_string()),
        ("Skipped", summary.skipped.to_string()),
        ("Total duration", summary.duration.clone()),
        ("Average time per topic", summary.average_time_per_topic.clone()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    out.push_str(&format!("{}\n", table));

    if !summary.failed_topics.is_empty() {
        out.push_str(&format!("\n{}\n", heading("Failed topics")));
        for id in &summary.failed_topics {
            out.push_str(&format!("  - {}\n", id));
        }
    }
    if !summary.validation_issues.is_empty() {
        out.push_str(&format!("\n{}\n", heading("Needs review")));
        for (id, errors) in &summary.validation_issues {
            out.push_str(&format!("  - {}: {}\n", id, errors.join("; ")));
        }
    }
    if summary.curriculum_changed {
        out.push_str(&format!(
            "\n{}\n",
            "WARNING: curriculum file was modified during generation".yellow()
        ));
    }

    let closing = if summary.dry_run {
        "Dry run completed (no files were modified)"
    } else {
        "Generation completed"
    };
    out.push_str(&format!("\n{}\n", closing.green()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_width() {
        let update = ProgressUpdate {
            topic_id: "7".into(),
            title: "Алгебра".into(),
            total: 4,
            processed: 1,
            successful: 1,
            failed: 0,
            remaining: 3,
            eta_ms: Some(65_000),
        };
        let text = format_progress(&update);
        let bar = text.lines().nth(1).unwrap();
        assert!(bar.starts_with(&format!("[{}{}]", "=".repeat(12), " ".repeat(38))));
        assert!(bar.ends_with("25.0%"));
        assert!(text.contains("Processing: Алгебра (7)"));
        assert!(text.ends_with("ETA: 1m 5s"));
    }

    #[test]
    fn test_summary_lists_failures_and_review_items() {
        let mut summary = RunSummary {
            total: 3,
            processed: 2,
            successful: 2,
            failed: 1,
            failed_topics: vec!["9".into()],
            ..RunSummary::default()
        };
        summary
            .validation_issues
            .insert("4".into(), vec!["Content too short: 10 words (minimum 500)".into()]);
        let text = format_summary(&summary);
        assert!(text.contains("Total topics"));
        assert!(text.contains("  - 9"));
        assert!(text.contains("  - 4: Content too short"));
    }
}
