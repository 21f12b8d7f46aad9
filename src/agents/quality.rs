//! Code quality analysis agent.

use crate::agents::{push_context, Agent};
use crate::error::AgentError;
use crate::llm::{GenerateOptions, TextGenerator};
use crate::models::{AgentAnalysis, AgentKind, CodeUnit, Issue};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const ANALYSIS_FORMAT: &str = r#"Respond in JSON format:
{
  "issues": [
    {
      "category": "complexity|maintainability|performance|best-practices|code-smell",
      "type": "string",
      "severity": "high|medium|low",
      "line": 0,
      "description": "string",
      "suggestion": "string",
      "code_snippet": "string"
    }
  ],
  "metrics": {
    "cyclomatic_complexity": 0,
    "cognitive_complexity": 0,
    "maintainability_index": 0,
    "lines_of_code": 0,
    "comment_ratio": 0.0
  },
  "score": 0,
  "summary": "string",
  "recommendations": ["string"]
}

"score" is 0-100 where 100 means excellent quality. Only output JSON, no other text."#;

const IMPROVEMENT_FORMAT: &str = r#"Respond in JSON format:
{
  "improved_code": "string (complete improved code)",
  "explanation": "string",
  "improvements": ["string"],
  "tradeoffs": ["string"]
}

Only output JSON, no other text."#;

/// Reviews complexity, maintainability, and performance.
pub struct QualityAgent {
    client: Arc<dyn TextGenerator>,
}

impl QualityAgent {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    fn build_analysis_prompt(&self, unit: &CodeUnit) -> String {
        let mut prompt = String::new();
        prompt.push_str("You are a senior engineer reviewing code quality.\n\n");
        prompt.push_str(&format!(
            "Review the following {} code for quality issues:\n\n",
            unit.language
        ));
        prompt.push_str(&format!("```{}\n{}\n```\n\n", unit.language, unit.code));
        push_context(&mut prompt, unit);
        prompt.push_str(
            "Evaluate:\n\
             1. Cyclomatic and cognitive complexity\n\
             2. Maintainability and readability\n\
             3. Performance problems and inefficient algorithms\n\
             4. Violations of language best practices\n\
             5. Code smells (duplication, long functions, deep nesting)\n\
             6. Naming and structure\n\n\
             Estimate the metrics rather than omitting them.\n\n",
        );
        prompt.push_str(ANALYSIS_FORMAT);
        prompt
    }
}

#[async_trait]
impl Agent for QualityAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Quality
    }

    fn name(&self) -> &'static str {
        "QualityAgent"
    }

    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError> {
        debug!(
            "{}: reviewing {} for quality issues",
            self.name(),
            unit.filepath.as_deref().unwrap_or("code")
        );

        let prompt = self.build_analysis_prompt(unit);
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

    fn supports_fix(&self) -> bool {
        true
    }

    async fn generate_fix(&self, unit: &CodeUnit, issue: &Issue) -> Result<Value, AgentError> {
        debug!(
            "{}: generating improvement for {}",
            self.name(),
            issue.issue_type
        );

        let mut prompt = String::new();
        prompt.push_str("You are a senior engineer improving code quality.\n\n");
        prompt.push_str(&format!(
            "Original code:\n```{}\n{}\n```\n\n",
            unit.language, unit.code
        ));
        prompt.push_str(&format!(
            "Issue: {}\nSeverity: {}\nDescription: {}\n\n",
            issue.issue_type, issue.severity, issue.description
        ));
        prompt.push_str(
            "Rewrite the code to resolve this issue while preserving behavior. \
             Explain the improvement and any tradeoffs.\n\n",
        );
        prompt.push_str(IMPROVEMENT_FORMAT);

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
    async fn test_analyze_parses_metrics() {
        let agent = QualityAgent::new(Arc::new(ScriptedGenerator {
            response: r#"{"issues": [], "metrics": {"lines_of_code": 42}, "score": 78}"#
                .to_string(),
        }));
        let unit = CodeUnit::new("fn main() {}", "rust");

        let analysis = agent.analyze(&unit).await.unwrap();
        assert_eq!(analysis.score, Some(78.0));
        assert_eq!(analysis.payload["metrics"]["lines_of_code"], 42);
    }

    #[tokio::test]
    async fn test_generate_fix_returns_improvement() {
        let agent = QualityAgent::new(Arc::new(ScriptedGenerator {
            response: r#"{"improved_code": "fn add(a: u32, b: u32) -> u32 { a + b }"}"#
                .to_string(),
        }));
        let unit = CodeUnit::new("fn add(a: u32, b: u32) -> u32 { return a + b; }", "rust");
        let issue = Issue {
            id: "q-1".to_string(),
            agent: "quality".to_string(),
            issue_type: "redundant return".to_string(),
            severity: "low".to_string(),
            description: "explicit return on tail expression".to_string(),
        };

        let fix = agent.generate_fix(&unit, &issue).await.unwrap();
        assert!(fix["improved_code"].as_str().unwrap().contains("a + b"));
    }
}
