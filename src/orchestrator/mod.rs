//! Scan orchestration.
//!
//! The orchestrator owns the agent registry and a small lifecycle
//! machine around it: initialize every agent once before accepting
//! work, dispatch scans and fixes while ready, and drain in-flight
//! work on shutdown. Agents are injected at construction so tests can
//! run isolated instances against scripted agents.

pub mod dispatcher;
pub mod fixes;
pub mod score;

pub use dispatcher::ScanOptions;

use crate::agents::{Agent, AgentRegistry, PipelineSpec};
use crate::error::OrchestratorError;
use crate::models::{AgentKind, CodeUnit};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{info, warn};

/// Lifecycle phase of an orchestrator instance.
///
/// `Failed` is terminal: a single agent setup failure refuses all
/// subsequent work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Stopped,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Dispatch tunables.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Time budget for each individual agent call. There is no
    /// whole-scan deadline.
    pub agent_timeout: Duration,
    /// Parallel fix-generation bound.
    pub fix_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(120),
            fix_concurrency: 4,
        }
    }
}

/// Coordinates the analysis agents for scans and fix runs.
pub struct Orchestrator {
    agents: AgentRegistry,
    config: OrchestratorConfig,
    state: Mutex<LifecycleState>,
    // Scans and fix runs hold read guards for their whole duration;
    // shutdown takes the write guard to wait them out.
    work: RwLock<()>,
}

impl Orchestrator {
    /// Builds an orchestrator over an injected agent registry.
    pub fn new(agents: AgentRegistry, config: OrchestratorConfig) -> Self {
        Self {
            agents,
            config,
            state: Mutex::new(LifecycleState::Uninitialized),
            work: RwLock::new(()),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.lock().await
    }

    pub(crate) fn agent(&self, kind: AgentKind) -> Option<&Arc<dyn Agent>> {
        self.agents.get(&kind)
    }

    /// Runs every agent's setup hook, in registry order.
    ///
    /// Idempotent: calling on a ready instance logs a warning and
    /// returns. Any single setup failure is fatal and leaves the
    /// instance in `Failed`.
    pub async fn initialize(&self) -> Result<(), OrchestratorError> {
        // The state lock is held across setup so concurrent callers
        // wait for the outcome instead of double-initializing.
        let mut state = self.state.lock().await;
        match *state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Ready => {
                warn!("Orchestrator already initialized, skipping");
                return Ok(());
            }
            other => return Err(OrchestratorError::NotReady(other)),
        }
        *state = LifecycleState::Initializing;

        for (kind, agent) in &self.agents {
            info!("Initializing {} agent", kind);
            if let Err(e) = agent.initialize().await {
                *state = LifecycleState::Failed;
                return Err(OrchestratorError::Setup {
                    agent: *kind,
                    source: e,
                });
            }
        }

        *state = LifecycleState::Ready;
        info!("Orchestrator ready with {} agents", self.agents.len());
        Ok(())
    }

    /// Drains in-flight work, runs every agent's teardown hook, and
    /// stops. Idempotent.
    pub async fn shutdown(&self) -> Result<(), OrchestratorError> {
        {
            let mut state = self.state.lock().await;
            match *state {
                LifecycleState::Stopped | LifecycleState::ShuttingDown => {
                    warn!("Orchestrator already shut down, skipping");
                    return Ok(());
                }
                _ => {}
            }
            *state = LifecycleState::ShuttingDown;
        }

        info!("Shutting down, waiting for in-flight work to drain");
        let _drain = self.work.write().await;

        for (kind, agent) in &self.agents {
            if let Err(e) = agent.shutdown().await {
                warn!("{} agent teardown failed: {}", kind, e);
            }
        }

        *self.state.lock().await = LifecycleState::Stopped;
        info!("Orchestrator stopped");
        Ok(())
    }

    /// Admits one unit of work, holding the drain latch while it runs.
    ///
    /// The read guard is acquired before the state check: work that
    /// saw `Ready` keeps shutdown waiting until it finishes, and work
    /// that arrives after shutdown began fails fast.
    pub(crate) async fn begin_work(
        &self,
    ) -> Result<RwLockReadGuard<'_, ()>, OrchestratorError> {
        let guard = self.work.read().await;
        let state = *self.state.lock().await;
        if state != LifecycleState::Ready {
            return Err(OrchestratorError::NotReady(state));
        }
        Ok(guard)
    }

    /// Routes pipeline generation to the DevOps agent.
    pub async fn generate_pipeline(&self, spec: &PipelineSpec) -> Result<Value, OrchestratorError> {
        let _work = self.begin_work().await?;
        let agent = self
            .agent(AgentKind::Devops)
            .ok_or(OrchestratorError::AgentUnavailable(AgentKind::Devops))?;
        agent
            .generate_pipeline(spec)
            .await
            .map_err(|e| OrchestratorError::Agent {
                kind: AgentKind::Devops,
                source: e,
            })
    }

    /// Routes a standards check to the compliance agent.
    pub async fn check_compliance(
        &self,
        unit: &CodeUnit,
        standards: &[String],
    ) -> Result<Value, OrchestratorError> {
        let _work = self.begin_work().await?;
        let agent = self
            .agent(AgentKind::Compliance)
            .ok_or(OrchestratorError::AgentUnavailable(AgentKind::Compliance))?;
        agent
            .check_compliance(unit, standards)
            .await
            .map_err(|e| OrchestratorError::Agent {
                kind: AgentKind::Compliance,
                source: e,
            })
    }
}
