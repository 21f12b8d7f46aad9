//! Error types for the orchestrator and its agents.
//!
//! Failures are layered: `LlmError` covers the reasoning-service call,
//! `AgentError` covers one agent invocation, and `OrchestratorError`
//! covers request validation and lifecycle. Agent failures are contained
//! per category or per issue and never abort a whole scan.

use crate::models::AgentKind;
use crate::orchestrator::LifecycleState;
use thiserror::Error;

/// Failure while calling the text-generation service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to Ollama at {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("Ollama API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode Ollama response: {0}")]
    Decode(String),
}

/// Failure during one agent invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Service(#[from] LlmError),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("{0} not supported by this agent")]
    Unsupported(&'static str),
}

/// Failure at the orchestration layer.
///
/// These are the only errors that escape `execute_scan` and
/// `execute_auto_fix`; everything agent-level is recorded in the report
/// instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("orchestrator is not ready (state: {0})")]
    NotReady(LifecycleState),

    #[error("{agent} agent failed to initialize: {source}")]
    Setup {
        agent: AgentKind,
        #[source]
        source: AgentError,
    },

    #[error("{0} agent not available")]
    AgentUnavailable(AgentKind),

    #[error("{kind} agent failed: {source}")]
    Agent {
        kind: AgentKind,
        #[source]
        source: AgentError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_messages() {
        let err = LlmError::Timeout(120);
        assert_eq!(err.to_string(), "model request timed out after 120s");

        let err = LlmError::Api {
            status: 500,
            body: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("status 500"));
    }

    #[test]
    fn test_agent_error_wraps_llm_error() {
        let err = AgentError::from(LlmError::Connect("http://localhost:11434".to_string()));
        assert!(err.to_string().contains("cannot connect"));
    }

    #[test]
    fn test_orchestrator_error_messages() {
        let err = OrchestratorError::AgentUnavailable(AgentKind::Devops);
        assert_eq!(err.to_string(), "devops agent not available");

        let err = OrchestratorError::Validation("no valid agents requested".to_string());
        assert!(err.to_string().starts_with("invalid request"));
    }
}
