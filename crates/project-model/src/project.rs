//! Saved project files.
//!
//! A project is the minimal state needed to resume a session: the script
//! text, the latest analysis and the timeline built from it (including any
//! sketches generated so far).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::ScriptAnalysis;
use crate::timeline::Timeline;

/// Demo screenplay used by `storyboard new --sample`.
pub const SAMPLE_SCRIPT: &str = "SCENE 1
EXT. TECH JUNKYARD - DAY
WIDE SHOT. Among towering heaps of rusted metal in a future city, a small robot named BIT (round body, blue LED eyes) is digging. The sky is grey and dusty.

CLOSE-UP. The robot's hand touches a faint streak of green beneath the scrap. It is a tiny glowing sprout.

SCENE 2
EXT. BIT'S BALCONY - SUNSET
MEDIUM SHOT. Bit carefully sets the sprout into a pot made from an old can. Burnt-orange sunset light washes over the metal towers in the distance.

CLOSE-UP ON BIT. The robot's LED eyes turn into hearts. He gently touches the tiny leaf with one metal finger.";

/// Top-level project file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProject {
    /// Raw screenplay text.
    #[serde(default)]
    pub script_input: String,

    /// Latest analysis, if the script has been analysed.
    #[serde(default)]
    pub analysis_data: Option<ScriptAnalysis>,

    /// Timeline derived from `analysis_data`, carrying generated sketches.
    #[serde(default)]
    pub timeline_items: Timeline,
}

impl SavedProject {
    /// A project holding only a script.
    pub fn from_script(script: impl Into<String>) -> Self {
        Self {
            script_input: script.into(),
            ..Default::default()
        }
    }

    /// Create a project from a plain-text script file.
    pub fn from_script_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        Ok(Self::from_script(read_script(path)?))
    }

    /// Replace the script input verbatim with the contents of a file.
    ///
    /// Analysis and timeline are kept until the next analysis replaces them.
    pub fn import_script(&mut self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        self.script_input = read_script(path)?;
        Ok(())
    }

    /// Install a new analysis and rebuild the timeline from it.
    pub fn apply_analysis(&mut self, analysis: ScriptAnalysis) {
        self.timeline_items = Timeline::rebuild(&analysis);
        self.analysis_data = Some(analysis);
    }

    /// Project title, if analysed.
    pub fn title(&self) -> Option<&str> {
        self.analysis_data.as_ref().map(|a| a.title.as_str())
    }

    /// Whether the project has everything a storyboard export needs.
    pub fn is_exportable(&self) -> bool {
        self.analysis_data.is_some() && !self.timeline_items.is_empty()
    }

    /// Fail unless the project can be exported.
    pub fn ensure_exportable(&self) -> Result<(), ProjectError> {
        if self.analysis_data.is_none() {
            return Err(ProjectError::ValidationError {
                message: "project has not been analysed yet".to_string(),
            });
        }
        if self.timeline_items.is_empty() {
            return Err(ProjectError::ValidationError {
                message: "timeline contains no shots".to_string(),
            });
        }
        Ok(())
    }

    /// Load a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save the project file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check consistency between analysis and timeline.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.script_input.trim().is_empty() {
            errors.push("Script input is empty".to_string());
        }

        let Some(analysis) = &self.analysis_data else {
            if !self.timeline_items.is_empty() {
                errors.push("Timeline present without analysis data".to_string());
            }
            return errors;
        };

        errors.extend(analysis.validate());

        if analysis.shot_count() != self.timeline_items.len() {
            errors.push(format!(
                "Timeline has {} items but analysis has {} shots",
                self.timeline_items.len(),
                analysis.shot_count()
            ));
        }
        for (_, shot) in analysis.shots() {
            if self.timeline_items.get(&shot.id).is_none() {
                errors.push(format!("Shot {} missing from timeline", shot.id));
            }
        }
        if !self.timeline_items.is_contiguous() {
            errors.push("Timeline start offsets are not contiguous".to_string());
        }

        errors
    }
}

/// File name used for the exported storyboard document.
///
/// Whitespace runs in the title collapse to a single underscore.
pub fn export_file_name(title: &str) -> String {
    let mut name = String::from("STORYBOARD_");
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    name.push_str(".pdf");
    name
}

fn read_script(path: impl AsRef<Path>) -> Result<String, ProjectError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Act, Scene, Shot};

    fn sample_analysis() -> ScriptAnalysis {
        let shot = |d: f64| Shot {
            id: String::new(),
            shot_type: "WIDE".to_string(),
            duration: d,
            description_local: "Bit digs".to_string(),
            camera_movement: String::new(),
            prompt_for_image: "robot digging".to_string(),
            prompt_for_video: String::new(),
            image_url: None,
        };
        let mut analysis = ScriptAnalysis {
            title: "The Sprout".to_string(),
            genre: "Sci-fi".to_string(),
            logline: "A robot finds life.".to_string(),
            characters: vec![],
            acts: vec![Act {
                id: String::new(),
                title: "Act I".to_string(),
                scenes: vec![Scene {
                    id: String::new(),
                    scene_number: "1".to_string(),
                    header: "EXT. JUNKYARD - DAY".to_string(),
                    location: "Junkyard".to_string(),
                    time: "Day".to_string(),
                    shots: vec![shot(4.0), shot(2.5)],
                }],
            }],
        };
        analysis.assign_ids();
        analysis
    }

    #[test]
    fn test_export_file_name_collapses_whitespace() {
        assert_eq!(export_file_name("The Sprout"), "STORYBOARD_The_Sprout.pdf");
        assert_eq!(export_file_name("A  \t B"), "STORYBOARD_A_B.pdf");
        assert_eq!(export_file_name("Solo"), "STORYBOARD_Solo.pdf");
        assert_eq!(export_file_name(" Edge "), "STORYBOARD__Edge_.pdf");
    }

    #[test]
    fn test_apply_analysis_rebuilds_timeline() {
        let mut project = SavedProject::from_script(SAMPLE_SCRIPT);
        assert!(!project.is_exportable());
        assert!(matches!(
            project.ensure_exportable(),
            Err(ProjectError::ValidationError { .. })
        ));

        project.apply_analysis(sample_analysis());
        assert!(project.is_exportable());
        assert_eq!(project.timeline_items.len(), 2);
        assert_eq!(project.title(), Some("The Sprout"));
        assert!(project.validate().is_empty());
    }

    #[test]
    fn test_project_round_trip_is_structurally_equal() {
        let dir = std::env::temp_dir().join("storyboard_test_round_trip");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("project.json");

        let mut project = SavedProject::from_script("INT. ROOM - NIGHT");
        project.apply_analysis(sample_analysis());
        project
            .timeline_items
            .patch_image("shot-0-0-1", "data:image/png;base64,iVBORw0KGgo=");

        project.save(&path).unwrap();
        let loaded = SavedProject::load(&path).unwrap();
        assert_eq!(loaded, project);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = std::env::temp_dir().join("storyboard_test_malformed");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SavedProject::load(&path).unwrap_err();
        assert!(matches!(err, ProjectError::ParseError { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_script_replaces_verbatim() {
        let dir = std::env::temp_dir().join("storyboard_test_import");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("script.txt");
        let text = "CẢNH 1\nEXT. BÃI PHẾ LIỆU - NGÀY\n  trailing  \n";
        std::fs::write(&path, text).unwrap();

        let mut project = SavedProject::from_script("old");
        project.apply_analysis(sample_analysis());
        project.import_script(&path).unwrap();

        assert_eq!(project.script_input, text);
        assert!(project.analysis_data.is_some());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_loads_web_app_project_file() {
        let json = r#"{
            "scriptInput": "CẢNH 1",
            "analysisData": {
                "title": "T", "genre": "G", "logline_vi": "L", "characters": [],
                "acts": [{"id": "act-0", "title": "A", "scenes": [{
                    "id": "scene-0-0", "scene_number": "1", "header": "H",
                    "location": "L", "time": "D",
                    "shots": [{"id": "shot-0-0-0", "type": "CU", "duration": 3,
                               "description_vi": "d", "camera_movement": "",
                               "prompt_en": "p", "prompt_video_en": "v"}]
                }]}]
            },
            "timelineItems": [{
                "id": "shot-0-0-0", "start": 0, "duration": 3, "sceneHeader": "H",
                "data": {"id": "shot-0-0-0", "type": "CU", "duration": 3,
                         "description_vi": "d", "camera_movement": "",
                         "prompt_en": "p", "prompt_video_en": "v",
                         "imageUrl": "data:image/png;base64,AA=="}
            }]
        }"#;

        let project: SavedProject = serde_json::from_str(json).unwrap();
        assert_eq!(project.timeline_items.len(), 1);
        assert!(project.timeline_items.items()[0].has_sketch());
        assert!(project.validate().is_empty());
    }
}
