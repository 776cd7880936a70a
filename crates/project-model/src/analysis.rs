//! Screenplay breakdown produced by script analysis.
//!
//! The backend returns the structure without identifiers; ids are assigned
//! positionally once the response is parsed (see [`ScriptAnalysis::assign_ids`]).

use serde::{Deserialize, Serialize};

/// Structured breakdown of one screenplay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptAnalysis {
    pub title: String,

    #[serde(default)]
    pub genre: String,

    /// One-sentence summary in the script's language.
    #[serde(rename = "logline_vi", alias = "logline", default)]
    pub logline: String,

    #[serde(default)]
    pub characters: Vec<Character>,

    pub acts: Vec<Act>,
}

/// A named character with a short description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Top-level grouping of scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    /// `act-{a}`.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub scenes: Vec<Scene>,
}

/// A location/time-bounded group of shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// `scene-{a}-{s}`.
    #[serde(default)]
    pub id: String,

    #[serde(rename = "scene_number", alias = "sceneNumber", default)]
    pub scene_number: String,

    /// Slug line, e.g. `EXT. JUNKYARD - DAY`.
    pub header: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub time: String,

    pub shots: Vec<Shot>,
}

/// One camera setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// `shot-{a}-{s}-{sh}`.
    #[serde(default)]
    pub id: String,

    /// Shot-size label (wide, medium, close-up, ...).
    #[serde(rename = "type")]
    pub shot_type: String,

    /// Seconds.
    pub duration: f64,

    /// Action description in the script's language.
    #[serde(rename = "description_vi", alias = "descriptionLocal", default)]
    pub description_local: String,

    #[serde(rename = "camera_movement", alias = "cameraMovement", default)]
    pub camera_movement: String,

    /// English prompt for sketch generation.
    #[serde(rename = "prompt_en", alias = "promptForImage", default)]
    pub prompt_for_image: String,

    /// English prompt for a future video pass. Stored only.
    #[serde(rename = "prompt_video_en", alias = "promptForVideo", default)]
    pub prompt_for_video: String,

    /// Sketch as a data URL. `None` means "not yet sketched".
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ScriptAnalysis {
    /// Assign deterministic ids to every act, scene and shot by position.
    ///
    /// Any ids already present are overwritten.
    pub fn assign_ids(&mut self) {
        for (a, act) in self.acts.iter_mut().enumerate() {
            act.id = format!("act-{a}");
            for (s, scene) in act.scenes.iter_mut().enumerate() {
                scene.id = format!("scene-{a}-{s}");
                for (sh, shot) in scene.shots.iter_mut().enumerate() {
                    shot.id = format!("shot-{a}-{s}-{sh}");
                }
            }
        }
    }

    /// Total number of shots across all acts and scenes.
    pub fn shot_count(&self) -> usize {
        self.scenes().map(|scene| scene.shots.len()).sum()
    }

    /// Total number of scenes across all acts.
    pub fn scene_count(&self) -> usize {
        self.scenes().count()
    }

    /// Scenes in document order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.acts.iter().flat_map(|act| act.scenes.iter())
    }

    /// Shots in document order, paired with their owning scene.
    pub fn shots(&self) -> impl Iterator<Item = (&Scene, &Shot)> {
        self.scenes()
            .flat_map(|scene| scene.shots.iter().map(move |shot| (scene, shot)))
    }

    /// Report structural problems that do not prevent loading.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];

        if self.title.trim().is_empty() {
            issues.push("Analysis has an empty title".to_string());
        }
        if self.shot_count() == 0 {
            issues.push("Analysis contains no shots".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for (scene, shot) in self.shots() {
            if !(shot.duration.is_finite() && shot.duration > 0.0) {
                issues.push(format!(
                    "Shot {} in '{}' has non-positive duration {}",
                    shot.id, scene.header, shot.duration
                ));
            }
            if !shot.id.is_empty() && !seen.insert(shot.id.as_str()) {
                issues.push(format!("Duplicate shot id {}", shot.id));
            }
        }

        issues
    }
}

impl Shot {
    /// Whether a sketch has been generated for this shot.
    pub fn has_sketch(&self) -> bool {
        self.image_url.is_some()
    }
}
