//! Concurrent fix generation.
//!
//! Issues are fixed a bounded number at a time, and outcomes line up
//! with the input: `fixes[i]` answers `issues[i]`, whether the fix
//! succeeded, the agent refused, or no agent could take the issue at
//! all.

use crate::error::OrchestratorError;
use crate::models::{AgentKind, CodeUnit, FixOutcome, FixReport, Issue};
use crate::orchestrator::Orchestrator;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{info, warn};

/// Outcome message for issues no registered agent can fix.
const UNAVAILABLE: &str = "fix capability unavailable";

impl Orchestrator {
    /// Generates a fix for every issue, in input order.
    ///
    /// One issue failing never aborts the others; it becomes an error
    /// outcome at its own position.
    pub async fn execute_auto_fix(
        &self,
        unit: &CodeUnit,
        issues: &[Issue],
    ) -> Result<FixReport, OrchestratorError> {
        let _work = self.begin_work().await?;

        info!("Generating fixes for {} issues", issues.len());
        let timeout = self.config.agent_timeout;
        let fixes: Vec<FixOutcome> = stream::iter(issues)
            .map(|issue| self.fix_one(unit, issue, timeout))
            .buffered(self.config.fix_concurrency.max(1))
            .collect()
            .await;

        let report = FixReport::new(fixes);
        info!(
            "Fixed {}/{} issues",
            report.fixed_issues, report.total_issues
        );
        Ok(report)
    }

    /// Routes one issue to the agent that reported it.
    async fn fix_one(&self, unit: &CodeUnit, issue: &Issue, timeout: Duration) -> FixOutcome {
        let Ok(kind) = issue.agent.parse::<AgentKind>() else {
            warn!("No agent can fix '{}' issues", issue.agent);
            return FixOutcome::error(issue.id.clone(), UNAVAILABLE);
        };
        let Some(agent) = self.agent(kind) else {
            warn!("No {} agent registered for issue {}", kind, issue.id);
            return FixOutcome::error(issue.id.clone(), UNAVAILABLE);
        };
        if !agent.supports_fix() {
            warn!("{} agent does not generate fixes", kind);
            return FixOutcome::error(issue.id.clone(), UNAVAILABLE);
        }

        match tokio::time::timeout(timeout, agent.generate_fix(unit, issue)).await {
            Ok(Ok(fix)) => FixOutcome::success(issue.id.clone(), fix),
            Ok(Err(e)) => {
                warn!("Fix for issue {} failed: {}", issue.id, e);
                FixOutcome::error(issue.id.clone(), e.to_string())
            }
            Err(_) => {
                warn!("Fix for issue {} timed out", issue.id);
                FixOutcome::error(
                    issue.id.clone(),
                    format!("fix generation timed out after {}s", timeout.as_secs()),
                )
            }
        }
    }
}
