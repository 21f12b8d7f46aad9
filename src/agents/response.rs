//! Shared parsing for model responses.
//!
//! Agents ask for pure JSON, but models often wrap it in code fences or
//! prose. Extraction tolerates both; anything without a decodable JSON
//! object is a malformed response.

use crate::error::AgentError;
use crate::models::AgentAnalysis;
use serde_json::Value;

/// Extracts the first JSON object from model output.
pub fn extract_json(text: &str) -> Result<Value, AgentError> {
    let trimmed = text.trim();

    // Prefer the contents of a ``` fence when one is present.
    let candidate = match trimmed.find("```") {
        Some(start) => {
            let after = &trimmed[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => trimmed,
    };

    // Fall back to the outermost brace pair to shed surrounding prose.
    let candidate = candidate.trim();
    let object = match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if end > start => &candidate[start..=end],
        _ => {
            return Err(AgentError::MalformedResponse(
                "no JSON object found in model output".to_string(),
            ))
        }
    };

    serde_json::from_str(object).map_err(|e| AgentError::MalformedResponse(e.to_string()))
}

/// Decodes a scored analysis payload.
///
/// A missing or non-numeric `score` is not an error; the result simply
/// contributes nothing to the overall score.
pub fn parse_analysis(text: &str) -> Result<AgentAnalysis, AgentError> {
    let payload = extract_json(text)?;
    let score = payload
        .get("score")
        .and_then(Value::as_f64)
        .map(|s| s.clamp(0.0, 100.0));
    Ok(AgentAnalysis { score, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json(r#"{"score": 90, "summary": "clean"}"#).unwrap();
        assert_eq!(value["score"], 90);
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here is the analysis:\n```json\n{\"score\": 72}\n```\nDone.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["score"], 72);
    }

    #[test]
    fn test_extract_json_with_prose() {
        let text = "Sure! {\"score\": 55, \"summary\": \"ok\"} Hope this helps.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let err = extract_json("I could not analyze this code.").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_parse_analysis_clamps_score() {
        let analysis = parse_analysis(r#"{"score": 140}"#).unwrap();
        assert_eq!(analysis.score, Some(100.0));

        let analysis = parse_analysis(r#"{"score": -3}"#).unwrap();
        assert_eq!(analysis.score, Some(0.0));
    }

    #[test]
    fn test_parse_analysis_without_score() {
        let analysis = parse_analysis(r#"{"summary": "no score given"}"#).unwrap();
        assert_eq!(analysis.score, None);
        assert_eq!(analysis.payload["summary"], "no score given");
    }
}
