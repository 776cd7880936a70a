//! Response schema for structured script analysis.
//!
//! Field names match the project file format so the model output can be
//! deserialized straight into [`ScriptAnalysis`](storyboard_project_model::analysis::ScriptAnalysis).

use serde_json::{json, Value};

/// Schema passed as `generationConfig.responseSchema`.
pub fn script_schema() -> Value {
    let shot = json!({
        "type": "OBJECT",
        "properties": {
            "type": { "type": "STRING" },
            "duration": { "type": "NUMBER" },
            "description_vi": { "type": "STRING" },
            "camera_movement": { "type": "STRING" },
            "prompt_en": { "type": "STRING" },
            "prompt_video_en": { "type": "STRING" }
        },
        "required": [
            "type", "duration", "description_vi",
            "prompt_en", "prompt_video_en", "camera_movement"
        ]
    });

    let scene = json!({
        "type": "OBJECT",
        "properties": {
            "scene_number": { "type": "STRING" },
            "header": { "type": "STRING" },
            "location": { "type": "STRING" },
            "time": { "type": "STRING" },
            "shots": { "type": "ARRAY", "items": shot }
        },
        "required": ["scene_number", "header", "location", "time", "shots"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "genre": { "type": "STRING" },
            "logline_vi": { "type": "STRING" },
            "characters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "description"]
                }
            },
            "acts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "scenes": { "type": "ARRAY", "items": scene }
                    },
                    "required": ["title", "scenes"]
                }
            }
        },
        "required": ["title", "genre", "logline_vi", "acts"]
    })
}
