//! Data models for the analysis orchestrator.
//!
//! This module contains all the core data structures used throughout
//! the application for representing code units, per-agent results,
//! scan reports, and fix reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Analysis category handled by a dedicated agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Vulnerability and secret detection.
    Security,
    /// Code quality and maintainability review.
    Quality,
    /// CI/CD and deployment recommendations.
    Devops,
    /// Documentation coverage review.
    Documentation,
    /// Regulatory compliance checking.
    Compliance,
    /// Mentorship and learning suggestions.
    Learning,
}

impl AgentKind {
    /// All categories, in canonical order.
    pub const ALL: [AgentKind; 6] = [
        AgentKind::Security,
        AgentKind::Quality,
        AgentKind::Devops,
        AgentKind::Documentation,
        AgentKind::Compliance,
        AgentKind::Learning,
    ];

    /// Canonical lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Security => "security",
            AgentKind::Quality => "quality",
            AgentKind::Devops => "devops",
            AgentKind::Documentation => "documentation",
            AgentKind::Compliance => "compliance",
            AgentKind::Learning => "learning",
        }
    }

    /// Returns an emoji representation of the category.
    pub fn emoji(&self) -> &'static str {
        match self {
            AgentKind::Security => "🔒",
            AgentKind::Quality => "✨",
            AgentKind::Devops => "🚀",
            AgentKind::Documentation => "📚",
            AgentKind::Compliance => "📋",
            AgentKind::Learning => "🎓",
        }
    }

    /// Human-readable label for report headings.
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Security => "Security",
            AgentKind::Quality => "Quality",
            AgentKind::Devops => "DevOps",
            AgentKind::Documentation => "Documentation",
            AgentKind::Compliance => "Compliance",
            AgentKind::Learning => "Learning",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "security" => Ok(AgentKind::Security),
            "quality" => Ok(AgentKind::Quality),
            "devops" => Ok(AgentKind::Devops),
            "documentation" | "docs" => Ok(AgentKind::Documentation),
            "compliance" => Ok(AgentKind::Compliance),
            "learning" => Ok(AgentKind::Learning),
            other => Err(format!("unknown agent '{}'", other)),
        }
    }
}

/// Outcome status of a single agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

impl AgentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, AgentStatus::Success)
    }
}

/// A unit of source code submitted for analysis.
///
/// Owned by the caller and never mutated by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Source code to analyze.
    pub code: String,
    /// Programming language of the code.
    pub language: String,
    /// Path the code came from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    /// Repository the code came from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Free-form context passed through to agent prompts.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl CodeUnit {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            filepath: None,
            repository: None,
            context: BTreeMap::new(),
        }
    }
}

/// Successful output of one agent's analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAnalysis {
    /// Category score on a 0-100 scale, when the agent produced one.
    pub score: Option<f64>,
    /// Category-specific findings, opaque to the orchestrator.
    pub payload: Value,
}

/// Result of dispatching one agent, success or error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Category that produced this result.
    pub agent: AgentKind,
    /// Whether the invocation succeeded.
    pub status: AgentStatus,
    /// Category score, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Category-specific findings.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    /// Wall-clock duration of the invocation.
    pub duration_ms: u64,
    /// Failure message, present only on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Wraps a completed analysis.
    pub fn success(agent: AgentKind, analysis: AgentAnalysis, duration_ms: u64) -> Self {
        Self {
            agent,
            status: AgentStatus::Success,
            score: analysis.score,
            payload: analysis.payload,
            duration_ms,
            error: None,
        }
    }

    /// Wraps a contained failure.
    pub fn error(agent: AgentKind, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            agent,
            status: AgentStatus::Error,
            score: None,
            payload: Value::Null,
            duration_ms,
            error: Some(message.into()),
        }
    }
}

/// The complete result of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// When the scan finished.
    pub timestamp: DateTime<Utc>,
    /// Path of the scanned code, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    /// Language of the scanned code.
    pub language: String,
    /// Repository of the scanned code, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// One entry per dispatched category, success or error.
    pub agents: BTreeMap<AgentKind, AnalysisResult>,
    /// Requested names that did not match any category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_agents: Vec<String>,
    /// Weighted aggregate score, 0-100.
    pub overall_score: u8,
}

impl ScanReport {
    /// Number of categories that completed successfully.
    pub fn success_count(&self) -> usize {
        self.agents
            .values()
            .filter(|r| r.status.is_success())
            .count()
    }

    /// Number of categories that failed.
    pub fn error_count(&self) -> usize {
        self.agents.len() - self.success_count()
    }
}

/// An issue selected for automated fixing.
///
/// Issues originate from earlier scan payloads and cross a serialization
/// boundary, so `agent` stays a free string: a name this build does not
/// recognize must still produce an error outcome rather than a decode
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Caller-assigned identifier, echoed into the outcome.
    pub id: String,
    /// Name of the category that reported the issue.
    pub agent: String,
    /// Kind of issue, as reported by the agent.
    #[serde(default, rename = "type")]
    pub issue_type: String,
    /// Severity, as reported by the agent.
    #[serde(default)]
    pub severity: String,
    /// Description of the issue.
    #[serde(default)]
    pub description: String,
}

/// Outcome of one fix attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixOutcome {
    /// Identifier of the issue this outcome belongs to.
    pub issue_id: String,
    /// Whether a fix was produced.
    pub status: AgentStatus,
    /// Generated fix payload, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Value>,
    /// Failure message, present only on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FixOutcome {
    pub fn success(issue_id: impl Into<String>, fix: Value) -> Self {
        Self {
            issue_id: issue_id.into(),
            status: AgentStatus::Success,
            fix: Some(fix),
            error: None,
        }
    }

    pub fn error(issue_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issue_id: issue_id.into(),
            status: AgentStatus::Error,
            fix: None,
            error: Some(message.into()),
        }
    }
}

/// The complete result of one fix run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixReport {
    /// When the fix run finished.
    pub timestamp: DateTime<Utc>,
    /// Number of issues submitted.
    pub total_issues: usize,
    /// Number of issues that received a fix.
    pub fixed_issues: usize,
    /// One outcome per submitted issue, in input order.
    pub fixes: Vec<FixOutcome>,
}

impl FixReport {
    /// Builds a report from outcomes, deriving both counters.
    pub fn new(fixes: Vec<FixOutcome>) -> Self {
        let fixed_issues = fixes.iter().filter(|f| f.status.is_success()).count();
        Self {
            timestamp: Utc::now(),
            total_issues: fixes.len(),
            fixed_issues,
            fixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_from_str() {
        assert_eq!("security".parse::<AgentKind>(), Ok(AgentKind::Security));
        assert_eq!("Quality".parse::<AgentKind>(), Ok(AgentKind::Quality));
        assert_eq!(" DEVOPS ".parse::<AgentKind>(), Ok(AgentKind::Devops));
        assert_eq!("docs".parse::<AgentKind>(), Ok(AgentKind::Documentation));
        assert!("linting".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_agent_kind_serde_form() {
        let json = serde_json::to_string(&AgentKind::Security).unwrap();
        assert_eq!(json, "\"security\"");
        let kind: AgentKind = serde_json::from_str("\"compliance\"").unwrap();
        assert_eq!(kind, AgentKind::Compliance);
    }

    #[test]
    fn test_analysis_result_constructors() {
        let ok = AnalysisResult::success(
            AgentKind::Security,
            AgentAnalysis {
                score: Some(87.0),
                payload: serde_json::json!({"vulnerabilities": []}),
            },
            120,
        );
        assert!(ok.status.is_success());
        assert_eq!(ok.score, Some(87.0));
        assert_eq!(ok.duration_ms, 120);
        assert!(ok.error.is_none());

        let err = AnalysisResult::error(AgentKind::Quality, "model timed out", 30_000);
        assert!(!err.status.is_success());
        assert!(err.score.is_none());
        assert_eq!(err.error.as_deref(), Some("model timed out"));
    }

    #[test]
    fn test_fix_report_derives_counts() {
        let report = FixReport::new(vec![
            FixOutcome::success("1", serde_json::json!({"fixed_code": "x"})),
            FixOutcome::error("2", "fix capability unavailable"),
            FixOutcome::success("3", serde_json::json!({"fixed_code": "y"})),
        ]);
        assert_eq!(report.total_issues, 3);
        assert_eq!(report.fixed_issues, 2);
        assert_eq!(report.fixes[1].issue_id, "2");
    }

    #[test]
    fn test_fix_report_empty() {
        let report = FixReport::new(Vec::new());
        assert_eq!(report.total_issues, 0);
        assert_eq!(report.fixed_issues, 0);
        assert!(report.fixes.is_empty());
    }

    #[test]
    fn test_scan_report_counts() {
        let mut agents = BTreeMap::new();
        agents.insert(
            AgentKind::Security,
            AnalysisResult::success(
                AgentKind::Security,
                AgentAnalysis {
                    score: Some(80.0),
                    payload: Value::Null,
                },
                10,
            ),
        );
        agents.insert(
            AgentKind::Quality,
            AnalysisResult::error(AgentKind::Quality, "boom", 10),
        );
        let report = ScanReport {
            timestamp: Utc::now(),
            filepath: None,
            language: "rust".to_string(),
            repository: None,
            agents,
            unknown_agents: Vec::new(),
            overall_score: 80,
        };
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.error_count(), 1);
    }
}
