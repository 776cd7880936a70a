//! Zoomable timeline layout and interaction.
//!
//! Geometry is in screen pixels. The view owns zoom and selection; items
//! are passed in on every call so the caller stays the single owner of the
//! timeline.

use storyboard_common::clock::{format_seconds, format_timecode};
use storyboard_common::config::TimelineConfig;
use storyboard_project_model::timeline::TimelineItem;

/// Height of the ruler strip.
pub const RULER_HEIGHT: f64 = 28.0;
/// Height of the track below the ruler.
pub const TRACK_HEIGHT: f64 = 128.0;
/// Top edge of every block.
pub const BLOCK_TOP: f64 = RULER_HEIGHT + 20.0;
pub const BLOCK_HEIGHT: f64 = 80.0;
/// Blank space after the last block.
pub const TAIL_PADDING: f64 = 400.0;
/// Seconds of ruler drawn past the end of the timeline.
pub const RULER_OVERRUN_SECS: f64 = 60.0;
/// Upper bound on ruler ticks for absurdly long timelines.
pub const MAX_RULER_TICKS: usize = 10_000;

pub const TOOLTIP_OFFSET: f64 = 15.0;
pub const TOOLTIP_WIDTH: f64 = 256.0;
pub const TOOLTIP_HEIGHT: f64 = 120.0;

/// Visual weight of a ruler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Minor,
    /// Every ten seconds.
    Major,
    /// Every full minute except zero.
    Minute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    pub seconds: u32,
    pub x: f64,
    pub kind: TickKind,
    /// `MM:SS`, present on major and minute ticks.
    pub label: Option<String>,
}

/// Screen rectangle of one timeline item.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub id: String,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scene_header: String,
    pub shot_type: String,
    pub duration_label: String,
    pub has_thumbnail: bool,
    pub selected: bool,
}

impl BlockLayout {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Everything needed to draw the timeline at the current zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub zoom: f64,
    pub total_duration: f64,
    pub content_width: f64,
    pub ruler: Vec<RulerTick>,
    /// In item order.
    pub blocks: Vec<BlockLayout>,
}

impl TimelineLayout {
    /// Blocks from bottom to top: item order, with the selection last.
    pub fn paint_order(&self) -> impl Iterator<Item = &BlockLayout> {
        self.blocks
            .iter()
            .filter(|b| !b.selected)
            .chain(self.blocks.iter().filter(|b| b.selected))
    }
}

/// Emitted when a click selects a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub id: String,
    pub index: usize,
}

/// Hover details for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub scene_header: String,
    pub shot_type: String,
    pub duration_label: String,
    pub description: String,
}

/// Ruler spacing for a zoom level.
pub fn ruler_interval(zoom: f64) -> u32 {
    if zoom < 10.0 {
        30
    } else if zoom < 40.0 {
        10
    } else {
        1
    }
}

/// Ticks from zero through `total + 60` seconds, at most [`MAX_RULER_TICKS`].
pub fn ruler_ticks(total_duration: f64, zoom: f64) -> Vec<RulerTick> {
    let interval = ruler_interval(zoom);
    let limit = total_duration.max(0.0) + RULER_OVERRUN_SECS;
    let mut ticks = Vec::new();
    let mut t: u32 = 0;

    while t as f64 <= limit && ticks.len() < MAX_RULER_TICKS {
        let kind = if t % 60 == 0 && t != 0 {
            TickKind::Minute
        } else if t % 10 == 0 {
            TickKind::Major
        } else {
            TickKind::Minor
        };
        let label = (kind != TickKind::Minor).then(|| format_timecode(t as f64));
        ticks.push(RulerTick {
            seconds: t,
            x: t as f64 * zoom,
            kind,
            label,
        });
        t += interval;
    }
    ticks
}

/// Interactive state of the timeline panel.
#[derive(Debug, Clone)]
pub struct TimelineView {
    config: TimelineConfig,
    zoom: f64,
    selected: Option<String>,
    hovered: Option<String>,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelineView {
    pub fn new(config: TimelineConfig) -> Self {
        let config = config.sanitized();
        let zoom = config.default_zoom.clamp(config.min_zoom, config.max_zoom);
        Self {
            config,
            zoom,
            selected: None,
            hovered: None,
        }
    }

    /// Pixels per second.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom relative to the default, e.g. `100` at the default zoom.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom / self.config.default_zoom * 100.0).round() as u32
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom * self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom / self.config.zoom_step)
    }

    pub fn time_to_x(&self, seconds: f64) -> f64 {
        seconds * self.zoom
    }

    pub fn x_to_time(&self, x: f64) -> f64 {
        x / self.zoom
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Select an item by id. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, items: &[TimelineItem], id: &str) -> Option<SelectionEvent> {
        let index = items.iter().position(|item| item.id == id)?;
        self.selected = Some(id.to_string());
        Some(SelectionEvent {
            id: id.to_string(),
            index,
        })
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drop selection and hover that refer to items no longer present.
    pub fn sync(&mut self, items: &[TimelineItem]) {
        let exists = |id: &Option<String>| {
            id.as_ref()
                .map_or(true, |id| items.iter().any(|item| &item.id == id))
        };
        if !exists(&self.selected) {
            self.selected = None;
        }
        if !exists(&self.hovered) {
            self.hovered = None;
        }
    }

    pub fn layout(&self, items: &[TimelineItem]) -> TimelineLayout {
        let total_duration = items.last().map(TimelineItem::end).unwrap_or(0.0);

        let blocks = items
            .iter()
            .enumerate()
            .map(|(index, item)| BlockLayout {
                id: item.id.clone(),
                index,
                x: self.time_to_x(item.start),
                y: BLOCK_TOP,
                width: self.time_to_x(item.duration).max(self.config.min_block_px),
                height: BLOCK_HEIGHT,
                scene_header: item.scene_header.clone(),
                shot_type: item.data.shot_type.clone(),
                duration_label: format!("{}s", format_seconds(item.duration)),
                has_thumbnail: item.has_sketch(),
                selected: self.selected.as_deref() == Some(item.id.as_str()),
            })
            .collect();

        TimelineLayout {
            zoom: self.zoom,
            total_duration,
            content_width: total_duration * self.zoom + TAIL_PADDING,
            ruler: ruler_ticks(total_duration, self.zoom),
            blocks,
        }
    }

    /// Topmost block under the point.
    pub fn hit_test<'l>(&self, layout: &'l TimelineLayout, x: f64, y: f64) -> Option<&'l BlockLayout> {
        let selected = layout.blocks.iter().find(|b| b.selected && b.contains(x, y));
        selected.or_else(|| layout.blocks.iter().rev().find(|b| b.contains(x, y)))
    }

    /// Select the block under the point. Empty space keeps the selection.
    pub fn click(&mut self, items: &[TimelineItem], x: f64, y: f64) -> Option<SelectionEvent> {
        let layout = self.layout(items);
        let id = self.hit_test(&layout, x, y)?.id.clone();
        self.select(items, &id)
    }

    /// Update hover state and build the tooltip for the block under the
    /// pointer. `viewport` is the visible area size.
    pub fn hover(
        &mut self,
        items: &[TimelineItem],
        x: f64,
        y: f64,
        viewport: (f64, f64),
    ) -> Option<Tooltip> {
        let layout = self.layout(items);
        let Some(block) = self.hit_test(&layout, x, y) else {
            self.hovered = None;
            return None;
        };
        let item = &items[block.index];
        self.hovered = Some(block.id.clone());

        let (tip_x, tip_y) = tooltip_position(x, y, viewport);
        Some(Tooltip {
            x: tip_x,
            y: tip_y,
            width: TOOLTIP_WIDTH,
            scene_header: item.scene_header.clone(),
            shot_type: item.data.shot_type.clone(),
            duration_label: block.duration_label.clone(),
            description: item.data.description_local.clone(),
        })
    }
}

/// Pointer + offset, flipped to the other side on an axis that would
/// otherwise leave the viewport.
pub fn tooltip_position(x: f64, y: f64, viewport: (f64, f64)) -> (f64, f64) {
    let mut tip_x = x + TOOLTIP_OFFSET;
    if tip_x + TOOLTIP_WIDTH > viewport.0 {
        tip_x = (x - TOOLTIP_OFFSET - TOOLTIP_WIDTH).max(0.0);
    }
    let mut tip_y = y + TOOLTIP_OFFSET;
    if tip_y + TOOLTIP_HEIGHT > viewport.1 {
        tip_y = (y - TOOLTIP_OFFSET - TOOLTIP_HEIGHT).max(0.0);
    }
    (tip_x, tip_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_project_model::analysis::Shot;

    fn items(durations: &[f64]) -> Vec<TimelineItem> {
        let mut start = 0.0;
        durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| {
                let item = TimelineItem {
                    id: format!("shot-0-0-{i}"),
                    start,
                    duration,
                    data: Shot {
                        id: format!("shot-0-0-{i}"),
                        shot_type: "CU".to_string(),
                        duration,
                        description_local: format!("beat {i}"),
                        camera_movement: String::new(),
                        prompt_for_image: String::new(),
                        prompt_for_video: String::new(),
                        image_url: None,
                    },
                    scene_header: "INT. LAB - NIGHT".to_string(),
                };
                start += duration;
                item
            })
            .collect()
    }

    #[test]
    fn test_zoom_steps_and_bounds() {
        let mut view = TimelineView::default();
        assert_eq!(view.zoom(), 20.0);
        assert_eq!(view.zoom_percent(), 100);

        assert_eq!(view.zoom_in(), 30.0);
        assert_eq!(view.zoom_percent(), 150);
        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.zoom(), 150.0);
        for _ in 0..20 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), 5.0);
        assert_eq!(view.zoom_percent(), 25);
    }

    #[test]
    fn test_inverted_zoom_bounds_do_not_panic() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{ "min_zoom": 50.0, "max_zoom": 10.0 }"#).unwrap();
        let mut view = TimelineView::new(config);
        assert_eq!(view.zoom(), 20.0);
        assert_eq!(view.zoom_in(), 30.0);
        assert_eq!(view.zoom_out(), 20.0);
    }

    #[test]
    fn test_ruler_interval_table() {
        assert_eq!(ruler_interval(5.0), 30);
        assert_eq!(ruler_interval(9.9), 30);
        assert_eq!(ruler_interval(10.0), 10);
        assert_eq!(ruler_interval(39.0), 10);
        assert_eq!(ruler_interval(40.0), 1);
    }

    #[test]
    fn test_ruler_ticks_cover_overrun_and_mark_minutes() {
        let ticks = ruler_ticks(65.0, 20.0);
        let seconds: Vec<u32> = ticks.iter().map(|t| t.seconds).collect();
        assert_eq!(seconds, (0..=120).step_by(10).collect::<Vec<_>>());

        assert_eq!(ticks[0].kind, TickKind::Major);
        assert_eq!(ticks[0].label.as_deref(), Some("00:00"));
        assert_eq!(ticks[6].kind, TickKind::Minute);
        assert_eq!(ticks[6].label.as_deref(), Some("01:00"));
        assert_eq!(ticks[6].x, 1200.0);

        let fine = ruler_ticks(0.0, 50.0);
        assert_eq!(fine.len(), 61);
        assert_eq!(fine[3].kind, TickKind::Minor);
        assert!(fine[3].label.is_none());
    }

    #[test]
    fn test_ruler_ticks_are_capped_for_huge_durations() {
        let ticks = ruler_ticks(1.0e9, 50.0);
        assert_eq!(ticks.len(), MAX_RULER_TICKS);
        assert_eq!(ticks.last().map(|t| t.seconds), Some(MAX_RULER_TICKS as u32 - 1));

        assert_eq!(ruler_ticks(f64::INFINITY, 5.0).len(), MAX_RULER_TICKS);
    }

    #[test]
    fn test_block_geometry_and_minimum_width() {
        let items = items(&[5.0, 0.0, 3.0]);
        let layout = TimelineView::default().layout(&items);

        assert_eq!(layout.total_duration, 8.0);
        assert_eq!(layout.content_width, 8.0 * 20.0 + 400.0);
        assert_eq!(layout.blocks[0].width, 100.0);
        assert_eq!(layout.blocks[1].x, 100.0);
        assert_eq!(layout.blocks[1].width, 2.0);
        assert_eq!(layout.blocks[2].duration_label, "3s");
    }

    #[test]
    fn test_click_selects_exclusively_and_ignores_empty_space() {
        let items = items(&[5.0, 3.0]);
        let mut view = TimelineView::default();
        let y = BLOCK_TOP + 10.0;

        let event = view.click(&items, 10.0, y).unwrap();
        assert_eq!(event.index, 0);
        assert_eq!(view.selected(), Some("shot-0-0-0"));

        view.click(&items, 110.0, y).unwrap();
        assert_eq!(view.selected(), Some("shot-0-0-1"));
        let layout = view.layout(&items);
        assert_eq!(layout.blocks.iter().filter(|b| b.selected).count(), 1);

        assert!(view.click(&items, 1000.0, y).is_none());
        assert!(view.click(&items, 10.0, 2.0).is_none());
        assert_eq!(view.selected(), Some("shot-0-0-1"));
    }

    #[test]
    fn test_selected_block_wins_overlap() {
        // Zero-length shot widened to the minimum overlaps its neighbour.
        let items = items(&[0.0, 3.0]);
        let mut view = TimelineView::default();
        let layout = view.layout(&items);
        let y = BLOCK_TOP + 1.0;
        assert_eq!(view.hit_test(&layout, 1.0, y).unwrap().index, 1);

        view.select(&items, "shot-0-0-0");
        let layout = view.layout(&items);
        assert_eq!(view.hit_test(&layout, 1.0, y).unwrap().index, 0);
        assert_eq!(layout.paint_order().last().unwrap().index, 0);
    }

    #[test]
    fn test_tooltip_flips_near_viewport_edges() {
        assert_eq!(tooltip_position(100.0, 50.0, (1000.0, 600.0)), (115.0, 65.0));
        assert_eq!(tooltip_position(900.0, 550.0, (1000.0, 600.0)), (629.0, 415.0));

        let items = items(&[5.0]);
        let mut view = TimelineView::default();
        let tip = view.hover(&items, 10.0, BLOCK_TOP + 5.0, (800.0, 600.0)).unwrap();
        assert_eq!(tip.description, "beat 0");
        assert_eq!(view.hovered(), Some("shot-0-0-0"));
        assert!(view.hover(&items, 500.0, 5.0, (800.0, 600.0)).is_none());
        assert_eq!(view.hovered(), None);
    }

    #[test]
    fn test_sync_clears_stale_selection() {
        let mut view = TimelineView::default();
        let before = items(&[1.0, 1.0]);
        view.select(&before, "shot-0-0-1");

        view.sync(&items(&[1.0, 1.0, 1.0]));
        assert_eq!(view.selected(), Some("shot-0-0-1"));

        view.sync(&items(&[1.0]));
        assert_eq!(view.selected(), None);
    }
}
