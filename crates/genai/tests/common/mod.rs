//! In-process stand-in for the generative backend.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use storyboard_common::cancel::CancelToken;
use storyboard_genai::{
    extract_text, parse_analysis, GenAiError, GenAiResult, ImageOptions, StoryboardModel,
};
use storyboard_project_model::analysis::ScriptAnalysis;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sprout")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should be readable")
}

pub fn fixture_analysis() -> ScriptAnalysis {
    let response: serde_json::Value =
        serde_json::from_str(&fixture_text("analysis_response.json")).expect("fixture is JSON");
    parse_analysis(extract_text(&response).expect("fixture has text")).expect("fixture parses")
}

/// What the fake does for one prompt.
#[derive(Debug, Clone)]
pub enum Outcome {
    Image,
    NoImage,
    Fail,
    Deny,
}

#[derive(Default)]
pub struct FakeModel {
    /// Outcome per prompt substring; unmatched prompts get an image.
    pub outcomes: Vec<(String, Outcome)>,
    pub analysis: Option<ScriptAnalysis>,
    pub analysis_error: Option<fn() -> GenAiError>,
    pub ping_ok: bool,
    /// Cancel this token once the given number of image calls were made.
    pub cancel_after: Option<(usize, CancelToken)>,
    pub image_calls: Mutex<Vec<String>>,
    pub analyze_calls: Mutex<usize>,
    pub seen_options: Mutex<HashMap<String, ImageOptions>>,
}

impl FakeModel {
    pub fn with_outcome(mut self, prompt_part: &str, outcome: Outcome) -> Self {
        self.outcomes.push((prompt_part.to_string(), outcome));
        self
    }

    pub fn image_calls(&self) -> Vec<String> {
        self.image_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryboardModel for FakeModel {
    async fn ping(&self, _api_key: &str) -> GenAiResult<()> {
        if self.ping_ok {
            Ok(())
        } else {
            Err(GenAiError::credential("HTTP 400: API_KEY_INVALID"))
        }
    }

    async fn analyze(&self, _script: &str, _api_key: &str) -> GenAiResult<ScriptAnalysis> {
        *self.analyze_calls.lock().unwrap() += 1;
        if let Some(make_err) = self.analysis_error {
            return Err(make_err());
        }
        self.analysis
            .clone()
            .ok_or_else(|| GenAiError::analysis("no canned analysis", false))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        _api_key: &str,
        options: &ImageOptions,
    ) -> GenAiResult<Option<String>> {
        let calls = {
            let mut calls = self.image_calls.lock().unwrap();
            calls.push(prompt.to_string());
            calls.len()
        };
        self.seen_options
            .lock()
            .unwrap()
            .insert(prompt.to_string(), options.clone());

        if let Some((after, token)) = &self.cancel_after {
            if calls >= *after {
                token.cancel();
            }
        }

        let outcome = self
            .outcomes
            .iter()
            .find(|(part, _)| prompt.contains(part.as_str()))
            .map(|(_, o)| o.clone())
            .unwrap_or(Outcome::Image);

        match outcome {
            Outcome::Image => Ok(Some(fixture_text("sketch_data_url.txt").trim().to_string())),
            Outcome::NoImage => Ok(None),
            Outcome::Fail => Err(GenAiError::image("HTTP 503: overloaded", false)),
            Outcome::Deny => Err(GenAiError::image(
                "HTTP 404: Requested entity was not found.",
                true,
            )),
        }
    }
}
