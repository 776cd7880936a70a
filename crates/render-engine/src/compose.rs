//! Storyboard document layout.
//!
//! Page 1 is a cover; every following page holds up to three shot cards.
//! All text goes through the [`TextRasterizer`] and is placed as an image,
//! each block positioned using the measured height of the one above it.
//!
//! Font sizes below are typographic points and are converted to
//! millimetres before rasterizing.

use std::sync::Arc;

use storyboard_common::clock::format_seconds;
use storyboard_common::error::{StoryboardError, StoryboardResult};
use storyboard_project_model::analysis::ScriptAnalysis;
use storyboard_project_model::timeline::TimelineItem;

use crate::image_data::decode_data_url_image;
use crate::labels::Labels;
use crate::surface::{Color, DrawingSurface, RectMm};
use crate::text::{TextRasterizer, TextStyle};

pub const ORANGE: Color = Color::rgb(249, 115, 22);
pub const ORANGE_50: Color = Color::rgb(255, 247, 237);
pub const ORANGE_300: Color = Color::rgb(253, 186, 116);
pub const ZINC_50: Color = Color::rgb(250, 250, 250);
pub const ZINC_200: Color = Color::rgb(228, 228, 231);
pub const ZINC_400: Color = Color::rgb(161, 161, 170);
pub const ZINC_600: Color = Color::rgb(82, 82, 91);
pub const ZINC_900: Color = Color::rgb(24, 24, 27);

pub const SHOTS_PER_PAGE: usize = 3;
pub const MARGIN: f32 = 15.0;
pub const CARD_HEIGHT: f32 = 75.0;
pub const CARD_GUTTER: f32 = 8.0;
pub const CARDS_TOP: f32 = 25.0;
pub const THUMB_WIDTH: f32 = 85.0;
pub const THUMB_HEIGHT: f32 = 47.8;

const COVER_BAND: f32 = 40.0;
const PAGE_BAND: f32 = 15.0;
const COVER_SIDE: f32 = 20.0;
const TITLE_TOP: f32 = 60.0;
const LOGLINE_MIN_HEIGHT: f32 = 30.0;
const ACCENT_WIDTH: f32 = 2.0;

fn pt(size: f32) -> f32 {
    size * 25.4 / 72.0
}

/// Number of pages for `shot_count` shots, cover included.
pub fn page_count_for(shot_count: usize) -> usize {
    1 + shot_count.div_ceil(SHOTS_PER_PAGE)
}

/// Top edge of a card on its page.
pub fn card_top(index_in_page: usize) -> f32 {
    CARDS_TOP + index_in_page as f32 * (CARD_HEIGHT + CARD_GUTTER)
}

/// What was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeSummary {
    pub pages: usize,
    pub cards: usize,
    pub missing_sketches: usize,
}

/// Lays out a storyboard onto any [`DrawingSurface`].
pub struct Composer<'a> {
    raster: &'a TextRasterizer,
    labels: &'a Labels,
}

impl<'a> Composer<'a> {
    pub fn new(raster: &'a TextRasterizer, labels: &'a Labels) -> Self {
        Self { raster, labels }
    }

    /// Draw the cover and all shot cards.
    ///
    /// The surface is expected to be fresh (one empty page).
    pub fn compose<S: DrawingSurface>(
        &self,
        surface: &mut S,
        analysis: &ScriptAnalysis,
        items: &[TimelineItem],
        export_date: &str,
    ) -> StoryboardResult<ComposeSummary> {
        if items.is_empty() {
            return Err(StoryboardError::export("Timeline contains no shots"));
        }

        self.cover_page(surface, analysis, export_date);

        let mut missing_sketches = 0;
        for (i, item) in items.iter().enumerate() {
            let slot = i % SHOTS_PER_PAGE;
            if slot == 0 {
                self.content_page(surface, &analysis.title);
            }
            if !self.shot_card(surface, i, item, card_top(slot))? {
                missing_sketches += 1;
            }
        }

        Ok(ComposeSummary {
            pages: surface.page_count(),
            cards: items.len(),
            missing_sketches,
        })
    }

    /// Place a rasterized text block and return its height in mm.
    fn text<S: DrawingSurface>(
        &self,
        surface: &mut S,
        text: &str,
        x: f32,
        y: f32,
        max_width: f32,
        style: TextStyle,
    ) -> f32 {
        let block = self.raster.render_mm(text, max_width, &style);
        surface.draw_image(
            RectMm::new(x, y, block.width, block.height),
            Arc::new(block.image),
        );
        block.height
    }

    fn cover_page<S: DrawingSurface>(
        &self,
        surface: &mut S,
        analysis: &ScriptAnalysis,
        export_date: &str,
    ) {
        let (page_w, page_h) = surface.page_size();
        let inner_w = page_w - 2.0 * COVER_SIDE;

        surface.fill_rect(RectMm::new(0.0, 0.0, page_w, page_h), Color::WHITE);
        surface.fill_rect(RectMm::new(0.0, 0.0, page_w, COVER_BAND), ORANGE);

        self.text(
            surface,
            self.labels.badge,
            COVER_SIDE,
            15.0,
            inner_w,
            TextStyle::new(pt(9.0), Color::WHITE).bold().centered(),
        );

        let mut y = TITLE_TOP;
        y += self.text(
            surface,
            self.labels.app_title,
            COVER_SIDE,
            y,
            inner_w,
            TextStyle::new(pt(28.0), ORANGE).bold().centered(),
        );

        y += 10.0;
        surface.line((40.0, y), (page_w - 40.0, y), ORANGE, 1.0);

        y += 10.0;
        y += self.text(
            surface,
            &analysis.title.to_uppercase(),
            COVER_SIDE,
            y,
            inner_w,
            TextStyle::new(pt(22.0), ZINC_900).bold().centered(),
        );

        y += 5.0;
        let genre = format!("{} {}", self.labels.genre, analysis.genre.to_uppercase());
        y += self.text(
            surface,
            &genre,
            COVER_SIDE,
            y,
            inner_w,
            TextStyle::new(pt(10.0), ZINC_600).centered(),
        );

        let box_y = y + 12.0;
        let logline =
            self.raster
                .render_mm(&analysis.logline, page_w - 60.0, &TextStyle::new(pt(11.0), ZINC_900).centered());
        let box_h = LOGLINE_MIN_HEIGHT.max(logline.height + 20.0);
        let logline_box = RectMm::new(COVER_SIDE, box_y, inner_w, box_h);
        surface.fill_rect(logline_box, ORANGE_50);
        surface.stroke_rect(logline_box, ORANGE_300, 0.5);
        surface.draw_image(
            RectMm::new(30.0, box_y + 10.0, logline.width, logline.height),
            Arc::new(logline.image),
        );

        let date = format!("{} {}", self.labels.exported_on, export_date);
        self.text(
            surface,
            &date,
            COVER_SIDE,
            page_h - 20.0,
            inner_w,
            TextStyle::new(pt(8.0), ZINC_400).centered(),
        );
    }

    fn content_page<S: DrawingSurface>(&self, surface: &mut S, title: &str) {
        surface.add_page();
        let (page_w, page_h) = surface.page_size();

        surface.fill_rect(RectMm::new(0.0, 0.0, page_w, page_h), Color::WHITE);
        surface.fill_rect(RectMm::new(0.0, 0.0, page_w, PAGE_BAND), ORANGE);

        let header = self.labels.page_header(title, surface.page_count() - 1);
        self.text(
            surface,
            &header,
            MARGIN,
            5.0,
            page_w - 2.0 * MARGIN,
            TextStyle::new(pt(7.0), Color::WHITE).bold(),
        );
    }

    /// Draw one card. Returns whether the shot had a sketch.
    fn shot_card<S: DrawingSurface>(
        &self,
        surface: &mut S,
        index: usize,
        item: &TimelineItem,
        y: f32,
    ) -> StoryboardResult<bool> {
        let (page_w, _) = surface.page_size();
        let card_w = page_w - 2.0 * MARGIN;
        let card = RectMm::new(MARGIN, y, card_w, CARD_HEIGHT);

        surface.fill_rect(card, Color::WHITE);
        surface.stroke_rect(card, ORANGE, 0.3);

        let thumb = RectMm::new(MARGIN + 5.0, y + 5.0, THUMB_WIDTH, THUMB_HEIGHT);
        surface.fill_rect(thumb, ZINC_50);
        surface.stroke_rect(thumb, ZINC_200, 0.3);

        let sketched = match &item.data.image_url {
            Some(url) => {
                let image = decode_data_url_image(url).map_err(|e| {
                    StoryboardError::export(format!("Sketch for {} is unreadable: {e}", item.id))
                })?;
                surface.draw_image(thumb, Arc::new(image));
                true
            }
            None => {
                let placeholder = self.raster.render_mm(
                    self.labels.no_sketch,
                    THUMB_WIDTH,
                    &TextStyle::new(pt(8.0), ZINC_400).centered(),
                );
                let py = thumb.y + (THUMB_HEIGHT - placeholder.height) / 2.0;
                surface.draw_image(
                    RectMm::new(thumb.x, py, placeholder.width, placeholder.height),
                    Arc::new(placeholder.image),
                );
                false
            }
        };

        let info_x = MARGIN + THUMB_WIDTH + 10.0;
        let info_w = card_w - THUMB_WIDTH - 15.0;

        let mut field_y = y + 5.0;
        field_y += self.text(
            surface,
            &format!("{}{}", self.labels.shot, index + 1),
            info_x,
            field_y,
            info_w,
            TextStyle::new(pt(13.0), ORANGE).bold(),
        );

        field_y += 2.0;
        field_y += self.text(
            surface,
            &self.metadata_line(item),
            info_x,
            field_y,
            info_w,
            TextStyle::new(pt(8.5), ZINC_900).bold(),
        );

        field_y += 4.0;
        let description = match item.data.description_local.trim() {
            "" => self.labels.no_description,
            text => text,
        };
        self.text(
            surface,
            description,
            info_x,
            field_y,
            info_w,
            TextStyle::new(pt(9.5), ZINC_600),
        );

        self.text(
            surface,
            &item.scene_header,
            info_x,
            y + CARD_HEIGHT - 8.0,
            info_w,
            TextStyle::new(pt(7.0), ZINC_400),
        );

        surface.fill_rect(RectMm::new(MARGIN, y, ACCENT_WIDTH, CARD_HEIGHT), ORANGE);

        Ok(sketched)
    }

    /// `type • 5s • camera`.
    fn metadata_line(&self, item: &TimelineItem) -> String {
        let camera = match item.data.camera_movement.trim() {
            "" => self.labels.static_camera,
            text => text,
        };
        format!(
            "{} • {}s • {}",
            item.data.shot_type,
            format_seconds(item.duration),
            camera
        )
    }
}
