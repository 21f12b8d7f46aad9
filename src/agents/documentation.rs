//! Documentation coverage agent.

use crate::agents::{push_context, Agent};
use crate::error::AgentError;
use crate::llm::{GenerateOptions, TextGenerator};
use crate::models::{AgentAnalysis, AgentKind, CodeUnit};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const ANALYSIS_FORMAT: &str = r#"Respond in JSON format:
{
  "suggestions": [
    {
      "target": "string (function, module, or file)",
      "priority": "high|medium|low",
      "description": "string",
      "example": "string (suggested doc text)"
    }
  ],
  "score": 0,
  "summary": "string"
}

"score" is 0-100 where 100 means fully documented. Only output JSON, no other text."#;

pub struct DocumentationAgent {
    client: Arc<dyn TextGenerator>,
}

impl DocumentationAgent {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for DocumentationAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Documentation
    }

    fn name(&self) -> &'static str {
        "DocumentationAgent"
    }

    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError> {
        debug!(
            "{}: reviewing {} for documentation coverage",
            self.name(),
            unit.filepath.as_deref().unwrap_or("code")
        );

        let mut prompt = String::new();
        prompt.push_str("You are a technical writer reviewing code documentation.\n\n");
        prompt.push_str(&format!(
            "Review the following {} code:\n\n```{}\n{}\n```\n\n",
            unit.language, unit.language, unit.code
        ));
        push_context(&mut prompt, unit);
        prompt.push_str(
            "Assess doc comments, public API documentation, inline comments on \
             non-obvious logic, and README-worthy gaps. Suggest concrete additions \
             in the language's native doc style.\n\n",
        );
        prompt.push_str(ANALYSIS_FORMAT);

        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.4,
                    max_tokens: 4096,
                },
            )
            .await?;

        crate::agents::response::parse_analysis(&text)
    }
}
