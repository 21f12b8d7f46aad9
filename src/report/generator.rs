//! Markdown report generation.
//!
//! This module renders scan and fix reports into Markdown documents
//! from the orchestrator's result structures.

use crate::models::{AnalysisResult, FixReport, ScanReport};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Payload list keys rendered as their own sections, with headings.
const PAYLOAD_SECTIONS: [(&str, &str); 6] = [
    ("vulnerabilities", "Vulnerabilities"),
    ("issues", "Issues"),
    ("violations", "Violations"),
    ("recommendations", "Recommendations"),
    ("suggestions", "Suggestions"),
    ("learning_opportunities", "Learning Opportunities"),
];

/// Generate a complete Markdown report for one scan.
pub fn generate_scan_markdown(report: &ScanReport) -> String {
    let mut output = String::new();

    output.push_str("# DevGuardian Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_summary_table(report));
    output.push_str(&generate_agent_sections(report, 2));
    output.push_str(&generate_footer());

    output
}

/// Generate a combined Markdown report for a directory scan.
pub fn generate_scan_set_markdown(reports: &[ScanReport]) -> String {
    let mut output = String::new();

    output.push_str("# DevGuardian Report\n\n");
    output.push_str(&format!("- **Files Scanned:** {}\n", reports.len()));
    if let Some(first) = reports.first() {
        output.push_str(&format!(
            "- **Scan Date:** {}\n",
            first.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    output.push_str(&format!(
        "- **Project Score:** **{}/100**\n\n",
        average_score(reports)
    ));

    output.push_str("## Files\n\n");
    output.push_str("| File | Score | Agents OK |\n");
    output.push_str("|:---|:---:|:---:|\n");
    for report in reports {
        output.push_str(&format!(
            "| `{}` | {} | {}/{} |\n",
            report.filepath.as_deref().unwrap_or("(inline)"),
            report.overall_score,
            report.success_count(),
            report.agents.len()
        ));
    }
    output.push('\n');

    for report in reports {
        output.push_str(&format!(
            "## 📄 {}\n\n",
            report.filepath.as_deref().unwrap_or("(inline)")
        ));
        output.push_str(&format!("*Score: {}/100*\n\n", report.overall_score));
        output.push_str(&generate_agent_sections(report, 3));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate a Markdown report for one fix run.
pub fn generate_fix_markdown(report: &FixReport) -> String {
    let mut output = String::new();

    output.push_str("# DevGuardian Fix Report\n\n");
    output.push_str(&format!(
        "- **Date:** {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "- **Fixed:** {}/{} issues\n\n",
        report.fixed_issues, report.total_issues
    ));

    for outcome in &report.fixes {
        let badge = if outcome.status.is_success() {
            "✅"
        } else {
            "❌"
        };
        output.push_str(&format!("## {} Issue {}\n\n", badge, outcome.issue_id));

        if let Some(ref error) = outcome.error {
            output.push_str(&format!("**Error:** {}\n\n", error));
            continue;
        }
        let Some(ref fix) = outcome.fix else { continue };

        if let Some(code) = fix.get("fixed_code").and_then(Value::as_str) {
            output.push_str("```\n");
            output.push_str(code);
            if !code.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("```\n\n");
        }
        if let Some(explanation) = fix.get("explanation").and_then(Value::as_str) {
            output.push_str(&format!("{}\n\n", explanation));
        }
    }

    output.push_str(&generate_footer());
    output
}

/// Serialize any report structure as pretty JSON.
pub fn generate_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// Average overall score across reports, rounded. Zero when empty.
pub fn average_score(reports: &[ScanReport]) -> u8 {
    if reports.is_empty() {
        return 0;
    }
    let total: u32 = reports.iter().map(|r| u32::from(r.overall_score)).sum();
    ((f64::from(total)) / (reports.len() as f64)).round() as u8
}

/// Generate the metadata section for a single-file report.
fn generate_metadata_section(report: &ScanReport) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **Scanned:** `{}`\n",
        report.filepath.as_deref().unwrap_or("(inline)")
    ));
    section.push_str(&format!("- **Language:** {}\n", report.language));
    if let Some(ref repository) = report.repository {
        section.push_str(&format!("- **Repository:** {}\n", repository));
    }
    section.push_str(&format!(
        "- **Scan Date:** {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Overall Score:** **{}/100**\n\n",
        report.overall_score
    ));

    section
}

/// Generate the per-agent summary table.
fn generate_summary_table(report: &ScanReport) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Agent | Status | Score | Duration |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for (kind, result) in &report.agents {
        let status = if result.status.is_success() {
            "✅"
        } else {
            "❌"
        };
        let score = match result.score {
            Some(score) => format!("{:.0}", score),
            None => "-".to_string(),
        };
        section.push_str(&format!(
            "| {} {} | {} | {} | {}ms |\n",
            kind.emoji(),
            kind.label(),
            status,
            score,
            result.duration_ms
        ));
    }
    section.push('\n');

    if !report.unknown_agents.is_empty() {
        section.push_str(&format!(
            "> ⚠️ Unrecognized agents skipped: {}\n\n",
            report
                .unknown_agents
                .iter()
                .map(|name| format!("`{}`", name))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    section
}

/// Generate one section per agent at the given heading level.
fn generate_agent_sections(report: &ScanReport, level: usize) -> String {
    let mut section = String::new();
    let heading = "#".repeat(level);

    for (kind, result) in &report.agents {
        section.push_str(&format!(
            "{} {} {}\n\n",
            heading,
            kind.emoji(),
            kind.label()
        ));
        section.push_str(&generate_result_block(result));
    }

    section
}

/// Generate the body of one agent's section.
fn generate_result_block(result: &AnalysisResult) -> String {
    let mut block = String::new();

    if let Some(ref error) = result.error {
        block.push_str(&format!("**Error:** {}\n\n", error));
        return block;
    }

    if let Some(summary) = result.payload.get("summary").and_then(Value::as_str) {
        block.push_str(&format!("*{}*\n\n", summary));
    }

    for (key, title) in PAYLOAD_SECTIONS {
        let Some(items) = result.payload.get(key).and_then(Value::as_array) else {
            continue;
        };
        if items.is_empty() {
            continue;
        }

        block.push_str(&format!("**{}** ({})\n\n", title, items.len()));
        for item in items {
            block.push_str(&generate_item_line(item));
        }
        block.push('\n');
    }

    block
}

/// Render one finding as a list item.
fn generate_item_line(item: &Value) -> String {
    let title = first_string(
        item,
        &["type", "category", "standard", "topic", "target", "title"],
    )
    .unwrap_or("Finding");
    let badge = first_string(item, &["severity", "priority", "level"]);

    let mut line = match badge {
        Some(badge) => format!("- **{}** ({})", title, badge),
        None => format!("- **{}**", title),
    };
    if let Some(description) = item.get("description").and_then(Value::as_str) {
        line.push_str(&format!(": {}", description));
    }
    line.push('\n');
    line
}

/// First string value found among the given keys.
fn first_string<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by DevGuardian*\n");

    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentAnalysis, AgentKind, FixOutcome};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn create_test_report() -> ScanReport {
        let mut agents = BTreeMap::new();
        agents.insert(
            AgentKind::Security,
            AnalysisResult::success(
                AgentKind::Security,
                AgentAnalysis {
                    score: Some(65.0),
                    payload: json!({
                        "summary": "One injection path found",
                        "vulnerabilities": [{
                            "type": "SQL Injection",
                            "severity": "critical",
                            "description": "User input concatenated into a query"
                        }]
                    }),
                },
                1200,
            ),
        );
        agents.insert(
            AgentKind::Quality,
            AnalysisResult::error(AgentKind::Quality, "model request timed out after 120s", 120_000),
        );

        ScanReport {
            timestamp: Utc::now(),
            filepath: Some("src/db.py".to_string()),
            language: "python".to_string(),
            repository: None,
            agents,
            unknown_agents: vec!["linting".to_string()],
            overall_score: 65,
        }
    }

    #[test]
    fn test_generate_scan_markdown() {
        let report = create_test_report();
        let markdown = generate_scan_markdown(&report);

        assert!(markdown.contains("# DevGuardian Report"));
        assert!(markdown.contains("`src/db.py`"));
        assert!(markdown.contains("**65/100**"));
        assert!(markdown.contains("## 🔒 Security"));
        assert!(markdown.contains("SQL Injection"));
        assert!(markdown.contains("(critical)"));
        assert!(markdown.contains("model request timed out"));
        assert!(markdown.contains("`linting`"));
    }

    #[test]
    fn test_generate_scan_set_markdown() {
        let reports = vec![create_test_report(), create_test_report()];
        let markdown = generate_scan_set_markdown(&reports);

        assert!(markdown.contains("**Files Scanned:** 2"));
        assert!(markdown.contains("**Project Score:** **65/100**"));
        assert!(markdown.contains("## 📄 src/db.py"));
        assert!(markdown.contains("### 🔒 Security"));
    }

    #[test]
    fn test_generate_fix_markdown() {
        let report = FixReport::new(vec![
            FixOutcome::success(
                "1",
                json!({
                    "fixed_code": "query = db.execute(sql, params)",
                    "explanation": "Switched to a parameterized query."
                }),
            ),
            FixOutcome::error("2", "fix capability unavailable"),
        ]);

        let markdown = generate_fix_markdown(&report);
        assert!(markdown.contains("# DevGuardian Fix Report"));
        assert!(markdown.contains("**Fixed:** 1/2 issues"));
        assert!(markdown.contains("## ✅ Issue 1"));
        assert!(markdown.contains("parameterized query"));
        assert!(markdown.contains("## ❌ Issue 2"));
        assert!(markdown.contains("fix capability unavailable"));
    }

    #[test]
    fn test_generate_json() {
        let report = create_test_report();
        let json = generate_json(&report).unwrap();

        assert!(json.contains("\"overall_score\": 65"));
        assert!(json.contains("\"security\""));
        assert!(json.contains("\"unknown_agents\""));
    }

    #[test]
    fn test_average_score() {
        assert_eq!(average_score(&[]), 0);

        let mut a = create_test_report();
        a.overall_score = 80;
        let mut b = create_test_report();
        b.overall_score = 81;
        assert_eq!(average_score(&[a, b]), 81);
    }
}
