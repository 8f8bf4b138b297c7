//! Structured extraction: rendered prompt → model call → JSON object.
//!
//! The model is not guaranteed to emit bare JSON. A response that already is a
//! JSON object is taken as-is, then its outermost `{...}` span is tried. Only
//! after that are Markdown code fences stripped and the same two attempts
//! repeated, so backticks inside string values survive. Anything else is a
//! `ParseError` carrying the raw response.
//! Callers only ever see a JSON object, so the heuristic can be swapped for a
//! stricter model contract without touching them.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::llm_client::prompts::{PromptLibrary, TemplateError};
use crate::llm_client::{CompletionModel, LlmError};

/// Deterministic sampling so repeated runs over the same input agree.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// An untyped key/value record decoded from a model response.
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Model response is not a JSON object: {reason}")]
    Parse { reason: String, raw: String },
}

impl ExtractionError {
    /// The raw model response, when the failure happened after the model answered.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ExtractionError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Renders prompts from the shared library and turns model output into records.
#[derive(Clone)]
pub struct StructuredExtractor {
    prompts: Arc<PromptLibrary>,
    model: Arc<dyn CompletionModel>,
}

impl StructuredExtractor {
    pub fn new(prompts: Arc<PromptLibrary>, model: Arc<dyn CompletionModel>) -> Self {
        Self { prompts, model }
    }

    pub async fn extract(
        &self,
        prompt_name: &str,
        args: &HashMap<&str, String>,
    ) -> Result<Record, ExtractionError> {
        let prompt = self.prompts.render(prompt_name, args)?;
        let response = self.model.generate(&prompt, EXTRACTION_TEMPERATURE).await?;

        parse_record(&response).map_err(|reason| {
            warn!("Could not parse '{prompt_name}' response as JSON: {reason}");
            ExtractionError::Parse {
                reason,
                raw: response,
            }
        })
    }
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?i)\s*`{3,}(?:json\b)?\s*").expect("valid fence regex"))
}

/// Removes Markdown code-fence markers (optionally tagged `json`) and trims.
///
/// Repeats until nothing changes: removing one fence can join stray backticks
/// into a new one, and the result must be a fixed point.
pub fn strip_json_fences(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = fence_pattern().replace_all(&current, "").trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Decodes a model response as a single JSON object.
pub fn parse_record(response: &str) -> Result<Record, String> {
    if let Some(record) = decode_object(response.trim()) {
        return Ok(record);
    }

    let cleaned = strip_json_fences(response);
    if let Some(record) = decode_object(&cleaned) {
        return Ok(record);
    }

    Err(match serde_json::from_str::<Value>(&cleaned) {
        Ok(other) => format!("expected a JSON object, found {}", json_kind(&other)),
        Err(e) => e.to_string(),
    })
}

/// The whole text as an object, else its outermost brace span.
fn decode_object(text: &str) -> Option<Record> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    // Prose around the object.
    let (start, end) = (text.find('{')?, text.rfind('}')?);
    if start >= end {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{CompletionModel, LlmError};

    /// Replays canned responses in order and records every prompt it was sent.
    #[derive(Default)]
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<(String, f32)>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16, message: &str) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err(LlmError::Api {
                    status,
                    message: message.to_string(),
                })])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn sent_prompts(&self) -> Vec<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .map(|(p, _)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use serde_json::json;

    fn extractor(model: Arc<ScriptedModel>) -> StructuredExtractor {
        let prompts = PromptLibrary::from_templates([("echo", "Analyze: {input}")]);
        StructuredExtractor::new(Arc::new(prompts), model)
    }

    fn input(value: &str) -> HashMap<&'static str, String> {
        HashMap::from([("input", value.to_string())])
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_is_idempotent() {
        let samples = [
            "```json\n{\"a\":1}\n```",
            "Here you go:\n```JSON\n{\"a\":1}\n```\nThanks",
            "`` ```json ``",
            "``````",
            "plain text",
            "  padded  ",
            "",
            "````json```",
        ];
        for sample in samples {
            let once = strip_json_fences(sample);
            assert_eq!(strip_json_fences(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_parse_record_fenced_and_bare_agree() {
        let fenced = parse_record("```json\n{\"a\":1}\n```").unwrap();
        let bare = parse_record("{\"a\":1}").unwrap();
        assert_eq!(fenced, bare);
        assert_eq!(Value::Object(bare), json!({"a": 1}));
    }

    #[test]
    fn test_strip_json_fences_keeps_unknown_tags_whole() {
        let input = "```jsonc\n{\"a\":1}\n```";
        assert_eq!(strip_json_fences(input), "jsonc\n{\"a\":1}");
        assert_eq!(parse_record(input).unwrap()["a"], 1);
        assert_eq!(parse_record("```JSONL\n{\"a\":2}\n```").unwrap()["a"], 2);
    }

    #[test]
    fn test_parse_record_preserves_backticks_in_strings() {
        let bare = r#"{"summary": "Writes docs in ``` json blocks"}"#;
        assert_eq!(
            parse_record(bare).unwrap()["summary"],
            "Writes docs in ``` json blocks"
        );

        let fenced = "```json\n{\"summary\": \"Uses ```json fences\"}\n```";
        assert_eq!(parse_record(fenced).unwrap()["summary"], "Uses ```json fences");
    }

    #[test]
    fn test_parse_record_tolerates_surrounding_prose() {
        let record = parse_record("Sure! Here is the analysis: {\"a\": {\"b\": 2}} Let me know.")
            .unwrap();
        assert_eq!(record["a"]["b"], 2);
    }

    #[test]
    fn test_parse_record_rejects_arrays() {
        let err = parse_record("[1, 2]").unwrap_err();
        assert!(err.contains("array"));
    }

    #[test]
    fn test_parse_record_rejects_prose() {
        assert!(parse_record("I cannot analyze this.").is_err());
    }

    #[tokio::test]
    async fn test_extract_renders_prompt_at_zero_temperature() {
        let model = Arc::new(ScriptedModel::new(["{\"ok\": true}"]));
        let record = extractor(model.clone())
            .extract("echo", &input("resume"))
            .await
            .unwrap();

        assert_eq!(record["ok"], true);
        let sent = model.prompts.lock().unwrap().clone();
        assert_eq!(sent, vec![("Analyze: resume".to_string(), 0.0)]);
    }

    #[tokio::test]
    async fn test_extract_fenced_response_matches_bare() {
        let model = Arc::new(ScriptedModel::new(["```json\n{\"a\":1}\n```", "{\"a\":1}"]));
        let ex = extractor(model);
        let fenced = ex.extract("echo", &input("x")).await.unwrap();
        let bare = ex.extract("echo", &input("x")).await.unwrap();
        assert_eq!(fenced, bare);
    }

    #[tokio::test]
    async fn test_extract_unparseable_response_keeps_raw_text() {
        let model = Arc::new(ScriptedModel::new(["I cannot analyze this."]));
        let err = extractor(model.clone())
            .extract("echo", &input("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Parse { .. }));
        assert_eq!(err.raw_response(), Some("I cannot analyze this."));
        // No retry after a parse failure.
        assert_eq!(model.sent_prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_unknown_prompt_never_calls_model() {
        let model = Arc::new(ScriptedModel::new(["{}"]));
        let err = extractor(model.clone())
            .extract("nope", &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Template(TemplateError::UnknownPrompt(_))
        ));
        assert!(model.sent_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_argument_never_calls_model() {
        let model = Arc::new(ScriptedModel::new(["{}"]));
        let err = extractor(model.clone())
            .extract("echo", &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::Template(TemplateError::MissingArgument { .. })
        ));
        assert!(model.sent_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_extract_model_failure_is_model_error() {
        let model = Arc::new(ScriptedModel::failing(429, "quota exceeded"));
        let err = extractor(model.clone())
            .extract("echo", &input("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Model(LlmError::Api { status: 429, .. })));
        assert_eq!(model.sent_prompts().len(), 1);
    }
}
