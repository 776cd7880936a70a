//! `generateContent` REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use storyboard_common::config::{ApiConfig, ImageDefaults};
use storyboard_project_model::analysis::ScriptAnalysis;

use crate::error::{GenAiError, GenAiResult};
use crate::schema::script_schema;

/// Prefix added to every sketch prompt.
pub const SKETCH_PROMPT_PREFIX: &str = "Movie storyboard sketch, rough pencil drawing, cinematic: ";

const CREDENTIAL_MARKERS: &[&str] = &[
    "Requested entity was not found",
    "API_KEY_INVALID",
    "PERMISSION_DENIED",
];

/// Per-request image parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub aspect_ratio: String,
    pub image_size: String,
}

impl ImageOptions {
    pub fn from_defaults(defaults: &ImageDefaults) -> Self {
        Self {
            aspect_ratio: defaults.aspect_ratio.clone(),
            image_size: defaults.resolution.clone(),
        }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self::from_defaults(&ImageDefaults::default())
    }
}

/// The three backend calls the application makes.
#[async_trait]
pub trait StoryboardModel: Send + Sync {
    /// Minimal request proving the key is accepted.
    async fn ping(&self, api_key: &str) -> GenAiResult<()>;

    /// Break a screenplay down into acts, scenes and shots with ids assigned.
    async fn analyze(&self, script: &str, api_key: &str) -> GenAiResult<ScriptAnalysis>;

    /// Draw one sketch. `Ok(None)` when the response carried no image.
    async fn generate_image(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> GenAiResult<Option<String>>;
}

/// Whether a failed response means the key itself is unusable.
pub fn is_credential_failure(status: Option<u16>, body: &str) -> bool {
    matches!(status, Some(401 | 403)) || CREDENTIAL_MARKERS.iter().any(|m| body.contains(m))
}

/// Text of the first candidate's first text part.
pub fn extract_text(response: &Value) -> Option<&str> {
    response["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .find_map(|part| part["text"].as_str())
}

/// First inline image of the first candidate, as a data URL.
pub fn extract_inline_image(response: &Value) -> Option<String> {
    response["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))?
                .as_str()?;
            let data = inline["data"].as_str()?;
            Some(format!("data:{mime};base64,{data}"))
        })
}

/// Drop a surrounding Markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse model output into an analysis with positional ids.
pub fn parse_analysis(text: &str) -> GenAiResult<ScriptAnalysis> {
    let mut analysis: ScriptAnalysis = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| GenAiError::analysis(format!("malformed analysis JSON: {e}"), false))?;
    analysis.assign_ids();

    if let Some((scene, shot)) = analysis
        .shots()
        .find(|(_, shot)| !(shot.duration.is_finite() && shot.duration > 0.0))
    {
        return Err(GenAiError::analysis(
            format!(
                "shot {} in '{}' has invalid duration {}",
                shot.id, scene.header, shot.duration
            ),
            false,
        ));
    }
    Ok(analysis)
}

/// Prompt sent with the script text.
pub fn analysis_prompt(script: &str) -> String {
    format!(
        "Break this screenplay down into Acts/Scenes/Shots and return JSON. \
         Keep the logline and shot descriptions in the screenplay's language; \
         write both prompts in English. Screenplay: {script}"
    )
}

/// A failed call, before it is mapped onto the caller's error variant.
#[derive(Debug)]
struct ApiFailure {
    message: String,
    credential: bool,
}

impl From<reqwest::Error> for ApiFailure {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        Self {
            credential: is_credential_failure(status, ""),
            message: e.to_string(),
        }
    }
}

/// REST client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: ApiConfig,
}

impl GeminiClient {
    pub fn new(config: ApiConfig) -> GenAiResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<Value, ApiFailure> {
        debug!(model, "generateContent request");
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), "Backend returned an error");
            return Err(ApiFailure {
                credential: is_credential_failure(Some(status.as_u16()), &text),
                message: format!("HTTP {}: {}", status.as_u16(), text.trim()),
            });
        }

        let value: Value = response.json().await?;
        if let Some(err) = value.get("error") {
            let text = err.to_string();
            return Err(ApiFailure {
                credential: is_credential_failure(None, &text),
                message: text,
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl StoryboardModel for GeminiClient {
    async fn ping(&self, api_key: &str) -> GenAiResult<()> {
        let body = json!({ "contents": [{ "parts": [{ "text": "ping" }] }] });
        self.generate_content(&self.config.ping_model, api_key, &body)
            .await
            .map(|_| ())
            .map_err(|f| GenAiError::credential(f.message))
    }

    async fn analyze(&self, script: &str, api_key: &str) -> GenAiResult<ScriptAnalysis> {
        if script.trim().is_empty() {
            return Err(GenAiError::invalid_request("script is empty"));
        }

        info!(chars = script.chars().count(), "Analysing script");
        let body = json!({
            "contents": [{ "parts": [{ "text": analysis_prompt(script) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": script_schema(),
            }
        });

        let response = self
            .generate_content(&self.config.analysis_model, api_key, &body)
            .await
            .map_err(|f| GenAiError::analysis(f.message, f.credential))?;
        let text = extract_text(&response)
            .ok_or_else(|| GenAiError::analysis("response contained no text", false))?;

        let analysis = parse_analysis(text)?;
        info!(
            scenes = analysis.scene_count(),
            shots = analysis.shot_count(),
            "Analysis parsed"
        );
        Ok(analysis)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        api_key: &str,
        options: &ImageOptions,
    ) -> GenAiResult<Option<String>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("{SKETCH_PROMPT_PREFIX}{prompt}") }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {
                    "aspectRatio": options.aspect_ratio,
                    "imageSize": options.image_size,
                }
            }
        });

        let response = self
            .generate_content(&self.config.image_model, api_key, &body)
            .await
            .map_err(|f| GenAiError::image(f.message, f.credential))?;
        Ok(extract_inline_image(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failure_detection() {
        assert!(is_credential_failure(Some(401), ""));
        assert!(is_credential_failure(Some(403), ""));
        assert!(is_credential_failure(
            Some(404),
            r#"{"error": {"message": "Requested entity was not found."}}"#
        ));
        assert!(is_credential_failure(Some(400), "reason: API_KEY_INVALID"));
        assert!(!is_credential_failure(Some(500), "internal"));
        assert!(!is_credential_failure(None, "rate limited"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_and_parse_assigns_ids() {
        let analysis_json = r#"{"title": "Bit", "genre": "Sci-fi", "logline_vi": "L",
            "characters": [],
            "acts": [{"title": "I", "scenes": [{"scene_number": "1", "header": "H",
                "location": "Yard", "time": "Day",
                "shots": [{"type": "WS", "duration": 4, "description_vi": "d",
                           "camera_movement": "", "prompt_en": "p",
                           "prompt_video_en": "v"}]}]}]}"#;
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": analysis_json }] } }]
        });

        let text = extract_text(&response).unwrap();
        let analysis = parse_analysis(text).unwrap();
        assert_eq!(analysis.acts[0].scenes[0].shots[0].id, "shot-0-0-0");
        assert_eq!(analysis.acts[0].scenes[0].id, "scene-0-0");
    }

    #[test]
    fn test_parse_failure_is_analysis_error() {
        let err = parse_analysis("{\"title\": 3}").unwrap_err();
        assert!(matches!(err, GenAiError::Analysis { credential: false, .. }));
        assert!(err.to_string().starts_with("analysis failed"));
    }

    #[test]
    fn test_non_positive_duration_is_analysis_error() {
        let shots = |durations: &[&str]| {
            let shots: Vec<String> = durations
                .iter()
                .map(|d| format!(r#"{{"type": "WS", "duration": {d}, "prompt_en": "p"}}"#))
                .collect();
            format!(
                r#"{{"title": "Bit", "genre": "Drama", "logline_vi": "L", "characters": [],
                    "acts": [{{"title": "I", "scenes": [{{"scene_number": "1", "header": "H",
                    "location": "Yard", "time": "Day", "shots": [{}]}}]}}]}}"#,
                shots.join(",")
            )
        };

        let err = parse_analysis(&shots(&["5", "-3", "2"])).unwrap_err();
        assert!(matches!(err, GenAiError::Analysis { credential: false, .. }));
        assert!(err.to_string().contains("shot-0-0-1"));

        assert!(parse_analysis(&shots(&["5", "0"])).is_err());
        assert!(parse_analysis(&shots(&["5", "2"])).is_ok());
    }

    #[test]
    fn test_extract_inline_image_skips_text_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your sketch" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
            ] } }]
        });
        assert_eq!(
            extract_inline_image(&response).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );

        let no_image = json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] });
        assert_eq!(extract_inline_image(&no_image), None);
        assert_eq!(extract_inline_image(&json!({})), None);
    }

    #[test]
    fn test_endpoint_joins_base_and_model() {
        let client = GeminiClient::new(ApiConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("m"),
            "https://example.test/v1beta/models/m:generateContent"
        );
    }

    #[tokio::test]
    async fn test_empty_script_rejected_before_request() {
        let client = GeminiClient::new(ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = client.analyze("   \n", "key").await.unwrap_err();
        assert!(matches!(err, GenAiError::InvalidRequest { .. }));
    }
}
