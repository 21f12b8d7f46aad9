//! DevOps analysis agent.
//!
//! Reviews code for CI/CD and deployment concerns, and generates
//! complete pipeline configurations on request.

use crate::agents::{push_context, Agent, PipelineSpec};
use crate::error::AgentError;
use crate::llm::{GenerateOptions, TextGenerator};
use crate::models::{AgentAnalysis, AgentKind, CodeUnit};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const ANALYSIS_FORMAT: &str = r#"Respond in JSON format:
{
  "recommendations": [
    {
      "category": "ci-cd|deployment|infrastructure|monitoring|security",
      "priority": "high|medium|low",
      "description": "string",
      "implementation": "string"
    }
  ],
  "score": 0,
  "summary": "string"
}

"score" is 0-100 where 100 means production-ready operations. Only output JSON, no other text."#;

const PIPELINE_FORMAT: &str = r#"Respond in JSON format:
{
  "pipeline_config": "string (complete pipeline file content)",
  "platform": "string",
  "explanation": "string",
  "prerequisites": ["string"],
  "environment_variables": [
    {"name": "string", "description": "string", "required": true}
  ],
  "deployment_strategy": "string"
}

Only output JSON, no other text."#;

pub struct DevopsAgent {
    client: Arc<dyn TextGenerator>,
}

impl DevopsAgent {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for DevopsAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Devops
    }

    fn name(&self) -> &'static str {
        "DevopsAgent"
    }

    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError> {
        debug!(
            "{}: reviewing {} for operational readiness",
            self.name(),
            unit.filepath.as_deref().unwrap_or("code")
        );

        let mut prompt = String::new();
        prompt.push_str("You are a DevOps engineer reviewing code for operational readiness.\n\n");
        prompt.push_str(&format!(
            "Review the following {} code:\n\n```{}\n{}\n```\n\n",
            unit.language, unit.language, unit.code
        ));
        push_context(&mut prompt, unit);
        prompt.push_str(
            "Recommend improvements around:\n\
             1. CI/CD readiness (testability, build reproducibility)\n\
             2. Deployment concerns (configuration, twelve-factor violations)\n\
             3. Infrastructure needs (containers, scaling)\n\
             4. Monitoring and observability hooks\n\
             5. Operational security (secret handling, least privilege)\n\n",
        );
        prompt.push_str(ANALYSIS_FORMAT);

        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.5,
                    max_tokens: 4096,
                },
            )
            .await?;

        crate::agents::response::parse_analysis(&text)
    }

    async fn generate_pipeline(&self, spec: &PipelineSpec) -> Result<Value, AgentError> {
        debug!(
            "{}: generating {} pipeline for {} / {}",
            self.name(),
            spec.platform,
            spec.language,
            spec.framework
        );

        let mut prompt = String::new();
        prompt.push_str("You are a DevOps engineer writing a CI/CD pipeline.\n\n");
        prompt.push_str(&format!(
            "Generate a complete {} pipeline for a {} project using the {} framework, \
             deploying to {}.\n\n",
            spec.platform, spec.language, spec.framework, spec.deploy_target
        ));
        prompt.push_str(
            "The pipeline must cover: dependency installation, linting, tests with \
             coverage, a production build, security scanning, and deployment with a \
             sensible strategy (blue/green or rolling). List every environment \
             variable the pipeline expects.\n\n",
        );
        prompt.push_str(PIPELINE_FORMAT);

        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.5,
                    max_tokens: 8192,
                },
            )
            .await?;

        crate::agents::response::extract_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    struct ScriptedGenerator {
        response: String,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerateOptions,
        ) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_generate_pipeline_returns_config() {
        let agent = DevopsAgent::new(Arc::new(ScriptedGenerator {
            response: r#"{"pipeline_config": "name: ci", "platform": "github"}"#.to_string(),
        }));
        let spec = PipelineSpec {
            language: "rust".to_string(),
            framework: "axum".to_string(),
            platform: "github".to_string(),
            deploy_target: "aws".to_string(),
        };

        let pipeline = agent.generate_pipeline(&spec).await.unwrap();
        assert_eq!(pipeline["platform"], "github");
        assert!(pipeline["pipeline_config"]
            .as_str()
            .unwrap()
            .contains("name: ci"));
    }

    #[tokio::test]
    async fn test_fix_generation_is_unsupported() {
        let agent = DevopsAgent::new(Arc::new(ScriptedGenerator {
            response: "{}".to_string(),
        }));
        assert!(!agent.supports_fix());

        let unit = CodeUnit::new("fn main() {}", "rust");
        let issue = crate::models::Issue {
            id: "1".to_string(),
            agent: "devops".to_string(),
            issue_type: "missing healthcheck".to_string(),
            severity: "low".to_string(),
            description: String::new(),
        };
        let err = agent.generate_fix(&unit, &issue).await.unwrap_err();
        assert!(matches!(err, AgentError::Unsupported(_)));
    }
}
