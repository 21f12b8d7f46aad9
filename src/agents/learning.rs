//! Developer learning agent.

use crate::agents::{push_context, Agent};
use crate::error::AgentError;
use crate::llm::{GenerateOptions, TextGenerator};
use crate::models::{AgentAnalysis, AgentKind, CodeUnit};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const ANALYSIS_FORMAT: &str = r#"Respond in JSON format:
{
  "learning_opportunities": [
    {
      "topic": "string",
      "level": "beginner|intermediate|advanced",
      "description": "string",
      "resources": ["string"]
    }
  ],
  "score": 0,
  "summary": "string"
}

"score" is 0-100 reflecting how well the code applies established practice. Only output JSON, no other text."#;

pub struct LearningAgent {
    client: Arc<dyn TextGenerator>,
}

impl LearningAgent {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for LearningAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Learning
    }

    fn name(&self) -> &'static str {
        "LearningAgent"
    }

    async fn analyze(&self, unit: &CodeUnit) -> Result<AgentAnalysis, AgentError> {
        debug!(
            "{}: finding learning opportunities in {}",
            self.name(),
            unit.filepath.as_deref().unwrap_or("code")
        );

        let mut prompt = String::new();
        prompt.push_str("You are a mentor reviewing code with its author.\n\n");
        prompt.push_str(&format!(
            "Review the following {} code:\n\n```{}\n{}\n```\n\n",
            unit.language, unit.language, unit.code
        ));
        push_context(&mut prompt, unit);
        prompt.push_str(
            "Identify the concepts the author would benefit from studying: design \
             patterns they are reinventing, idioms of the language they are missing, \
             error-handling habits, and testing techniques. Be encouraging and \
             specific.\n\n",
        );
        prompt.push_str(ANALYSIS_FORMAT);

        let text = self
            .client
            .generate(
                &prompt,
                GenerateOptions {
                    temperature: 0.6,
                    max_tokens: 4096,
                },
            )
            .await?;

        crate::agents::response::parse_analysis(&text)
    }
}
