//! Regulatory compliance agent.
//!
//! Scores code against SOC2/GDPR/HIPAA-style controls and exposes a
//! dedicated check against caller-selected standards.

use crate::agents::{push_context, Agent};
use crate::error::AgentError;
use crate::llm::{GenerateOptions, TextGenerator};
use crate::models::{AgentAnalysis, AgentKind, CodeUnit};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Standards assumed when the caller names none.
const DEFAULT_STANDARDS: [&str; 2] = ["SOC2", "GDPR"];

const ANALYSIS_FORMAT: &str = r#"Respond in JSON format:
{
  "violations": [
    {
      "standard": "string",
      "control": "string",
      "severity": "critical|high|medium|low",
      "description": "string",
      "remediation": "string"
    }
  ],
  "standards": ["string"],
  "compliant": true,
  "score": 0,
  "summary": "string"
}

"score" is 0-100 where 100 means fully compliant. Only output JSON, no other text."#;

pub struct ComplianceAgent {
    client: Arc<dyn TextGenerator>,
}

impl ComplianceAgent {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    fn build_prompt(&self, unit: &CodeUnit, standards: &[String]) -> String {
        let mut prompt = String::new();
        prompt.push_str("You are a compliance auditor reviewing code.\n\n");
        prompt.push_str(&format!(
            "Audit the following {} code against these standards: {}.\n\n",
            unit.language,
            standards.join(", ")
        ));
        prompt.push_str(&format!("```{}\n{}\n```\n\n", unit.language, unit.code));
        push_context(&mut prompt, unit);
        prompt.push_str(
            "Look for violations around personal data handling, data retention, \
             audit logging, access control, encryption at rest and in transit, \
             and consent. Cite the standard and control for each violation.\n\n",
        );
        prompt.push_str(ANALYSIS_FORMAT);
        prompt
    }

    fn effective_standards(standards: &[String]) -> Vec<String> {
        if standards.is_empty() {
            DEFAULT_STANDARDS.iter().map(|s| s.to_string()).collect()
        } else {
            standards.to_vec()
        }
    }
}

#[async_trait]
impl Agent for ComplianceAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Compliance
    }

    fn name(&self) -> &'static str {
        "ComplianceAgent"
    }

    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError> {
        debug!(
            "{}: auditing {} for compliance",
            self.name(),
            unit.filepath.as_deref().unwrap_or("code")
        );

        let standards = Self::effective_standards(&[]);
        let prompt = self.build_prompt(unit, &standards);
        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.2,
                    max_tokens: 4096,
                },
            )
            .await?;

        crate::agents::response::parse_analysis(&text)
    }

    async fn check_compliance(
        &self,
        unit: &CodeUnit,
        standards: &[String],
    ) -> Result<Value, AgentError> {
        let standards = Self::effective_standards(standards);
        debug!(
            "{}: checking against {}",
            self.name(),
            standards.join(", ")
        );

        let prompt = self.build_prompt(unit, &standards);
        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.2,
                    max_tokens: 4096,
                },
            )
            .await?;

        crate::agents::response::extract_json(&text)
    }
}
