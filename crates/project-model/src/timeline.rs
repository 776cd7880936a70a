//! Shots in playback order.
//!
//! The timeline is a derived view of a [`ScriptAnalysis`]: it is rebuilt in
//! full whenever the analysis changes and is otherwise only patched by id.

use serde::{Deserialize, Serialize};

use crate::analysis::{ScriptAnalysis, Shot};

/// A shot placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    /// Same as the shot id.
    pub id: String,

    /// Offset in seconds: sum of all preceding durations.
    pub start: f64,

    /// Seconds.
    pub duration: f64,

    /// The shot itself.
    pub data: Shot,

    /// Header of the owning scene.
    pub scene_header: String,
}

impl TimelineItem {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn has_sketch(&self) -> bool {
        self.data.has_sketch()
    }
}

/// Partial edit of a shot's user-editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotUpdate {
    pub shot_type: Option<String>,
    pub duration: Option<f64>,
    pub description_local: Option<String>,
    pub camera_movement: Option<String>,
    pub prompt_for_image: Option<String>,
    pub prompt_for_video: Option<String>,
}

impl ShotUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Ordered collection of timeline items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    items: Vec<TimelineItem>,
}

impl Timeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the timeline from scratch in document order.
    pub fn rebuild(analysis: &ScriptAnalysis) -> Self {
        let mut items = Vec::with_capacity(analysis.shot_count());
        let mut current = 0.0;

        for (scene, shot) in analysis.shots() {
            items.push(TimelineItem {
                id: shot.id.clone(),
                start: current,
                duration: shot.duration,
                data: shot.clone(),
                scene_header: scene.header.clone(),
            });
            current += shot.duration;
        }

        Self { items }
    }

    pub fn from_items(items: Vec<TimelineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Zero-based index of the item with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// End time of the last item.
    pub fn total_duration(&self) -> f64 {
        self.items.last().map(TimelineItem::end).unwrap_or(0.0)
    }

    /// Items without a sketch, in list order.
    pub fn pending(&self) -> impl Iterator<Item = &TimelineItem> {
        self.items.iter().filter(|item| !item.has_sketch())
    }

    pub fn sketched_count(&self) -> usize {
        self.items.iter().filter(|item| item.has_sketch()).count()
    }

    /// Set the sketch of one item. Returns `false` when the id is unknown.
    pub fn patch_image(&mut self, id: &str, image_url: impl Into<String>) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.data.image_url = Some(image_url.into());
                true
            }
            None => false,
        }
    }

    /// Apply a partial edit to one shot. Start offsets are left untouched;
    /// call [`Timeline::reflow`] to recompute them.
    pub fn update_shot(&mut self, id: &str, update: &ShotUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        let shot = &mut item.data;
        if let Some(v) = &update.shot_type {
            shot.shot_type = v.clone();
        }
        if let Some(v) = update.duration {
            shot.duration = v;
            item.duration = v;
        }
        if let Some(v) = &update.description_local {
            shot.description_local = v.clone();
        }
        if let Some(v) = &update.camera_movement {
            shot.camera_movement = v.clone();
        }
        if let Some(v) = &update.prompt_for_image {
            shot.prompt_for_image = v.clone();
        }
        if let Some(v) = &update.prompt_for_video {
            shot.prompt_for_video = v.clone();
        }
        true
    }

    /// Recompute every start offset as the prefix sum of durations.
    pub fn reflow(&mut self) {
        let mut current = 0.0;
        for item in &mut self.items {
            item.start = current;
            current += item.duration;
        }
    }

    /// Whether start offsets equal the prefix sums of durations.
    pub fn is_contiguous(&self) -> bool {
        let mut current = 0.0;
        for item in &self.items {
            if item.start != current {
                return false;
            }
            current += item.duration;
        }
        true
    }
}
