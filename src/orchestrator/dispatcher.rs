//! Concurrent scan dispatch.
//!
//! Each requested category runs on its own task behind a per-call
//! timeout. The scan joins every branch before assembling the report,
//! so exactly one entry exists per dispatched category no matter how
//! the branch ended: success, agent error, timeout, panic, or
//! cancellation.

use crate::agents::Agent;
use crate::error::OrchestratorError;
use crate::models::{AgentKind, AnalysisResult, CodeUnit, ScanReport};
use crate::orchestrator::{score, Orchestrator};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Options for one scan dispatch.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Overrides the configured per-agent-call timeout.
    pub agent_timeout: Option<Duration>,
    /// Cooperative cancellation for the whole scan. Categories that
    /// already completed keep their results; pending ones are aborted
    /// and recorded as errors.
    pub cancellation: Option<CancellationToken>,
}

impl Orchestrator {
    /// Runs the requested categories concurrently against one unit.
    ///
    /// Unknown names are warned about and recorded on the report;
    /// a request with no valid name at all is rejected up front.
    pub async fn execute_scan(
        &self,
        unit: &CodeUnit,
        requested: &[String],
        options: ScanOptions,
    ) -> Result<ScanReport, OrchestratorError> {
        let _work = self.begin_work().await?;

        if unit.code.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "code unit is empty".to_string(),
            ));
        }

        let (kinds, unknown_agents) = resolve_agents(requested);
        if kinds.is_empty() {
            return Err(OrchestratorError::Validation(
                "no valid agents requested".to_string(),
            ));
        }

        let timeout = options.agent_timeout.unwrap_or(self.config.agent_timeout);
        info!(
            "Dispatching {} agents against {} ({}s per-call timeout)",
            kinds.len(),
            unit.filepath.as_deref().unwrap_or("code"),
            timeout.as_secs()
        );

        let started = Instant::now();
        let mut agents: BTreeMap<AgentKind, AnalysisResult> = BTreeMap::new();
        let mut handles: Vec<(AgentKind, JoinHandle<AnalysisResult>)> = Vec::new();

        for kind in kinds {
            match self.agent(kind) {
                Some(agent) => {
                    let agent = Arc::clone(agent);
                    let unit = unit.clone();
                    handles.push((
                        kind,
                        tokio::spawn(async move { run_agent(kind, agent, &unit, timeout).await }),
                    ));
                }
                None => {
                    warn!("No {} agent registered", kind);
                    agents.insert(
                        kind,
                        AnalysisResult::error(kind, "category not registered", 0),
                    );
                }
            }
        }

        // Full barrier: every spawned branch settles before the report
        // is assembled.
        let mut cancelled = false;
        for (kind, mut handle) in handles {
            let result = if cancelled {
                handle.abort();
                reap(kind, handle, started).await
            } else if let Some(token) = &options.cancellation {
                tokio::select! {
                    joined = &mut handle => settle(kind, joined, started),
                    _ = token.cancelled() => {
                        warn!("Scan cancelled, aborting pending agents");
                        cancelled = true;
                        handle.abort();
                        reap(kind, handle, started).await
                    }
                }
            } else {
                settle(kind, handle.await, started)
            };
            agents.insert(kind, result);
        }

        let overall_score = score::overall_score(&agents);
        let report = ScanReport {
            timestamp: Utc::now(),
            filepath: unit.filepath.clone(),
            language: unit.language.clone(),
            repository: unit.repository.clone(),
            agents,
            unknown_agents,
            overall_score,
        };

        info!(
            "Scan finished in {}ms: {}/{} agents succeeded, overall score {}",
            started.elapsed().as_millis(),
            report.success_count(),
            report.agents.len(),
            report.overall_score
        );
        Ok(report)
    }
}

/// Splits requested names into parsed kinds (deduplicated, in request
/// order) and names that match no category.
fn resolve_agents(requested: &[String]) -> (Vec<AgentKind>, Vec<String>) {
    let mut kinds = Vec::new();
    let mut unknown = Vec::new();

    for name in requested {
        match name.parse::<AgentKind>() {
            Ok(kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Err(_) => {
                warn!("Ignoring unknown agent '{}'", name);
                if !unknown.contains(name) {
                    unknown.push(name.clone());
                }
            }
        }
    }

    (kinds, unknown)
}

/// Runs one agent behind the per-call timeout, converting every
/// failure into that category's error result.
async fn run_agent(
    kind: AgentKind,
    agent: Arc<dyn Agent>,
    unit: &CodeUnit,
    timeout: Duration,
) -> AnalysisResult {
    let started = Instant::now();
    match tokio::time::timeout(timeout, agent.analyze(unit)).await {
        Ok(Ok(analysis)) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            debug!("{} agent finished in {}ms", kind, duration_ms);
            AnalysisResult::success(kind, analysis, duration_ms)
        }
        Ok(Err(e)) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            warn!("{} agent failed: {}", kind, e);
            AnalysisResult::error(kind, e.to_string(), duration_ms)
        }
        Err(_) => {
            warn!("{} agent timed out after {}s", kind, timeout.as_secs());
            AnalysisResult::error(
                kind,
                format!("analysis timed out after {}s", timeout.as_secs()),
                started.elapsed().as_millis() as u64,
            )
        }
    }
}

/// Converts a joined branch into its category result.
fn settle(
    kind: AgentKind,
    joined: Result<AnalysisResult, JoinError>,
    scan_started: Instant,
) -> AnalysisResult {
    match joined {
        Ok(result) => result,
        Err(e) => {
            let duration_ms = scan_started.elapsed().as_millis() as u64;
            if e.is_panic() {
                warn!("{} agent task panicked", kind);
                AnalysisResult::error(kind, "agent task panicked", duration_ms)
            } else {
                AnalysisResult::error(kind, "scan cancelled", duration_ms)
            }
        }
    }
}

/// Awaits an aborted branch, keeping its result when it finished
/// before the abort landed.
async fn reap(
    kind: AgentKind,
    handle: JoinHandle<AnalysisResult>,
    scan_started: Instant,
) -> AnalysisResult {
    settle(kind, handle.await, scan_started)
}
