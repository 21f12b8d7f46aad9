//! Analysis agents.
//!
//! Each analysis category is handled by one agent implementing the
//! `Agent` trait against a shared text-generation client. Optional
//! capabilities (fix generation, pipeline generation, compliance
//! checking) default to unsupported so the orchestrator can route by
//! explicit capability instead of probing.

pub mod compliance;
pub mod devops;
pub mod documentation;
pub mod learning;
pub mod quality;
pub mod response;
pub mod security;

pub use compliance::ComplianceAgent;
pub use devops::DevopsAgent;
pub use documentation::DocumentationAgent;
pub use learning::LearningAgent;
pub use quality::QualityAgent;
pub use security::SecurityAgent;

use crate::error::AgentError;
use crate::llm::TextGenerator;
use crate::models::{AgentAnalysis, AgentKind, CodeUnit, Issue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Request for CI/CD pipeline generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub language: String,
    pub framework: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_deploy_target")]
    pub deploy_target: String,
}

fn default_platform() -> String {
    "github".to_string()
}

fn default_deploy_target() -> String {
    "aws".to_string()
}

/// One analysis capability, implemented per category.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Category this agent covers.
    fn kind(&self) -> AgentKind;

    /// Agent name used in logs.
    fn name(&self) -> &'static str;

    /// One-time setup hook, run by the lifecycle manager before any
    /// dispatch is accepted.
    async fn initialize(&self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Analyzes one code unit.
    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError>;

    /// Whether this agent can generate fixes.
    fn supports_fix(&self) -> bool {
        false
    }

    /// Generates a fix for one issue.
    async fn generate_fix(&self, _unit: &CodeUnit, _issue: &Issue) -> Result<Value, AgentError> {
        Err(AgentError::Unsupported("fix generation"))
    }

    /// Generates a CI/CD pipeline configuration.
    async fn generate_pipeline(&self, _spec: &PipelineSpec) -> Result<Value, AgentError> {
        Err(AgentError::Unsupported("pipeline generation"))
    }

    /// Checks one code unit against regulatory standards.
    async fn check_compliance(
        &self,
        _unit: &CodeUnit,
        _standards: &[String],
    ) -> Result<Value, AgentError> {
        Err(AgentError::Unsupported("compliance checking"))
    }

    /// Teardown hook, run during graceful shutdown.
    async fn shutdown(&self) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Registry mapping each category to its agent.
pub type AgentRegistry = BTreeMap<AgentKind, Arc<dyn Agent>>;

/// Builds the full six-agent registry against one shared client.
pub fn default_registry(client: Arc<dyn TextGenerator>) -> AgentRegistry {
    let mut agents: AgentRegistry = BTreeMap::new();
    agents.insert(
        AgentKind::Security,
        Arc::new(SecurityAgent::new(client.clone())),
    );
    agents.insert(
        AgentKind::Quality,
        Arc::new(QualityAgent::new(client.clone())),
    );
    agents.insert(
        AgentKind::Devops,
        Arc::new(DevopsAgent::new(client.clone())),
    );
    agents.insert(
        AgentKind::Documentation,
        Arc::new(DocumentationAgent::new(client.clone())),
    );
    agents.insert(
        AgentKind::Compliance,
        Arc::new(ComplianceAgent::new(client.clone())),
    );
    agents.insert(AgentKind::Learning, Arc::new(LearningAgent::new(client)));
    agents
}

/// Appends caller-supplied context lines to a prompt.
pub(crate) fn push_context(prompt: &mut String, unit: &CodeUnit) {
    if unit.context.is_empty() {
        return;
    }
    prompt.push_str("Additional context:\n");
    for (key, value) in &unit.context {
        prompt.push_str(&format!("- {}: {}\n", key, value));
    }
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmConfig;
    use crate::llm::OllamaClient;

    #[test]
    fn test_default_registry_covers_all_kinds() {
        let client = Arc::new(OllamaClient::new(LlmConfig::default()));
        let registry = default_registry(client);
        assert_eq!(registry.len(), AgentKind::ALL.len());
        for kind in AgentKind::ALL {
            let agent = registry.get(&kind).expect("agent registered");
            assert_eq!(agent.kind(), kind);
        }
    }

    #[test]
    fn test_fix_capability_flags() {
        let client = Arc::new(OllamaClient::new(LlmConfig::default()));
        let registry = default_registry(client);
        assert!(registry[&AgentKind::Security].supports_fix());
        assert!(registry[&AgentKind::Quality].supports_fix());
        assert!(!registry[&AgentKind::Devops].supports_fix());
        assert!(!registry[&AgentKind::Documentation].supports_fix());
        assert!(!registry[&AgentKind::Compliance].supports_fix());
        assert!(!registry[&AgentKind::Learning].supports_fix());
    }

    #[test]
    fn test_pipeline_spec_defaults() {
        let spec: PipelineSpec =
            serde_json::from_str(r#"{"language": "rust", "framework": "axum"}"#).unwrap();
        assert_eq!(spec.platform, "github");
        assert_eq!(spec.deploy_target, "aws");
    }
}
