//! Timeline strip rendered to a bitmap.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use storyboard_common::config::Theme;
use storyboard_common::error::{StoryboardError, StoryboardResult};
use storyboard_project_model::timeline::TimelineItem;

use crate::image_data::decode_data_url_image;
use crate::surface::Color;
use crate::text::{TextRasterizer, TextStyle};
use crate::timeline_view::{BlockLayout, TickKind, TimelineLayout, RULER_HEIGHT, TRACK_HEIGHT};

/// Widest strip we are willing to allocate.
pub const MAX_RASTER_WIDTH: u32 = 16_384;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub ruler: Color,
    pub ruler_border: Color,
    pub tick: Color,
    pub tick_major: Color,
    pub tick_minute: Color,
    pub label: Color,
    pub block: Color,
    pub block_border: Color,
    pub selection: Color,
    pub text: Color,
    pub text_muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::rgb(9, 9, 11),
                ruler: Color::rgb(24, 24, 27),
                ruler_border: Color::rgb(39, 39, 42),
                tick: Color::rgb(63, 63, 70),
                tick_major: Color::rgb(113, 113, 122),
                tick_minute: Color::rgb(249, 115, 22),
                label: Color::rgb(161, 161, 170),
                block: Color::rgb(39, 39, 42),
                block_border: Color::rgb(63, 63, 70),
                selection: Color::rgb(249, 115, 22),
                text: Color::rgb(244, 244, 245),
                text_muted: Color::rgb(161, 161, 170),
            },
            Theme::Light => Self {
                background: Color::rgb(250, 250, 250),
                ruler: Color::rgb(244, 244, 245),
                ruler_border: Color::rgb(228, 228, 231),
                tick: Color::rgb(212, 212, 216),
                tick_major: Color::rgb(161, 161, 170),
                tick_minute: Color::rgb(249, 115, 22),
                label: Color::rgb(113, 113, 122),
                block: Color::rgb(255, 255, 255),
                block_border: Color::rgb(228, 228, 231),
                selection: Color::rgb(234, 88, 12),
                text: Color::rgb(24, 24, 27),
                text_muted: Color::rgb(113, 113, 122),
            },
        }
    }
}

/// Draw ruler and blocks. Text is skipped when no rasterizer is given.
pub fn render_timeline(
    layout: &TimelineLayout,
    items: &[TimelineItem],
    theme: Theme,
    text: Option<&TextRasterizer>,
) -> RgbaImage {
    let palette = Palette::for_theme(theme);
    let width = (layout.content_width.ceil() as u32).clamp(1, MAX_RASTER_WIDTH);
    let height = (RULER_HEIGHT + TRACK_HEIGHT) as u32;
    if (layout.content_width.ceil() as u32) > MAX_RASTER_WIDTH {
        tracing::warn!(
            requested = layout.content_width,
            max = MAX_RASTER_WIDTH,
            "Timeline strip truncated"
        );
    }

    let mut img = RgbaImage::from_pixel(width, height, palette.background.to_rgba(255));
    draw_ruler(&mut img, layout, &palette, text);

    for block in layout.paint_order() {
        let item = items.get(block.index);
        draw_block(&mut img, block, item, &palette, text);
    }

    img
}

/// Render the strip and write it as PNG.
pub fn render_timeline_png(
    layout: &TimelineLayout,
    items: &[TimelineItem],
    theme: Theme,
    text: Option<&TextRasterizer>,
    path: &Path,
) -> StoryboardResult<()> {
    let img = render_timeline(layout, items, theme, text);
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| StoryboardError::render(format!("Failed to write {}: {e}", path.display())))
}

fn draw_ruler(
    img: &mut RgbaImage,
    layout: &TimelineLayout,
    palette: &Palette,
    text: Option<&TextRasterizer>,
) {
    let (width, height) = img.dimensions();
    let ruler_h = RULER_HEIGHT as u32;
    let minute_guide = mix(palette.tick_minute, palette.background, 0.25);
    draw_filled_rect_mut(
        img,
        Rect::at(0, 0).of_size(width, ruler_h),
        palette.ruler.to_rgba(255),
    );
    draw_line_segment_mut(
        img,
        (0.0, RULER_HEIGHT as f32 - 1.0),
        (width as f32, RULER_HEIGHT as f32 - 1.0),
        palette.ruler_border.to_rgba(255),
    );

    for tick in &layout.ruler {
        if tick.x >= width as f64 {
            break;
        }
        let x = tick.x as f32;
        let (color, length) = match tick.kind {
            TickKind::Minor => (palette.tick, 6.0),
            TickKind::Major => (palette.tick_major, 12.0),
            TickKind::Minute => (palette.tick_minute, RULER_HEIGHT as f32),
        };
        let bottom = RULER_HEIGHT as f32 - 1.0;
        draw_line_segment_mut(img, (x, bottom - length), (x, bottom), color.to_rgba(255));

        if tick.kind == TickKind::Minute {
            draw_line_segment_mut(
                img,
                (x, RULER_HEIGHT as f32),
                (x, height as f32),
                minute_guide.to_rgba(255),
            );
        }

        if let (Some(label), Some(raster)) = (&tick.label, text) {
            let color = if tick.kind == TickKind::Minute {
                palette.tick_minute
            } else {
                palette.label
            };
            let mut style = TextStyle::new(10.0, color);
            style.bold = tick.kind == TickKind::Minute;
            let rendered = raster.render_px(label, 48.0, &style);
            imageops::overlay(img, &rendered.image, tick.x as i64 + 4, 2);
        }
    }
}

fn draw_block(
    img: &mut RgbaImage,
    block: &BlockLayout,
    item: Option<&TimelineItem>,
    palette: &Palette,
    text: Option<&TextRasterizer>,
) {
    let x = block.x.round() as i32;
    let y = block.y.round() as i32;
    let w = (block.width.round() as u32).max(1);
    let h = (block.height.round() as u32).max(1);
    let rect = Rect::at(x, y).of_size(w, h);

    draw_filled_rect_mut(img, rect, palette.block.to_rgba(255));

    if let Some(url) = item.and_then(|i| i.data.image_url.as_deref()) {
        match decode_data_url_image(url) {
            Ok(sketch) => {
                let thumb = dimmed_thumbnail(&sketch, w, h);
                imageops::overlay(img, &thumb, x as i64, y as i64);
            }
            Err(e) => tracing::warn!(id = %block.id, error = %e, "Skipping unreadable thumbnail"),
        }
    }

    if block.selected {
        draw_hollow_rect_mut(img, rect, palette.selection.to_rgba(255));
        if w > 2 && h > 2 {
            let inner = Rect::at(x + 1, y + 1).of_size(w - 2, h - 2);
            draw_hollow_rect_mut(img, inner, palette.selection.to_rgba(255));
        }
    } else {
        draw_hollow_rect_mut(img, rect, palette.block_border.to_rgba(255));
    }

    let Some(raster) = text else {
        return;
    };
    if block.width < 24.0 {
        return;
    }
    let max_w = (block.width - 8.0) as f32;
    let lines = [
        (block.scene_header.as_str(), TextStyle::new(9.0, palette.text_muted), 4),
        (
            block.shot_type.as_str(),
            TextStyle::new(12.0, palette.text).bold(),
            20,
        ),
        (
            block.duration_label.as_str(),
            TextStyle::new(10.0, palette.text_muted),
            h as i64 - 20,
        ),
    ];
    for (label, style, dy) in lines {
        let rendered = raster.render_px(label, max_w, &style);
        let clipped = imageops::crop_imm(
            &rendered.image,
            0,
            0,
            rendered.image.width().min(w.saturating_sub(8)),
            rendered.image.height().min(18),
        )
        .to_image();
        imageops::overlay(img, &clipped, x as i64 + 4, y as i64 + dy);
    }
}

/// Sketch scaled to the block, desaturated and at half opacity.
fn dimmed_thumbnail(sketch: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let scaled = imageops::resize(sketch, width, height, FilterType::Triangle);
    let mut out = RgbaImage::new(width, height);
    for (src, dst) in scaled.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let luma = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
        *dst = Rgba([luma, luma, luma, a / 2]);
    }
    out
}

/// Linear blend, `t = 1` is all `a`.
fn mix(a: Color, b: Color, t: f32) -> Color {
    let channel = |x: u8, y: u8| (x as f32 * t + y as f32 * (1.0 - t)).round() as u8;
    Color::rgb(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline_view::{TimelineView, BLOCK_TOP};
    use storyboard_project_model::analysis::Shot;

    fn item(id: &str, start: f64, duration: f64, image_url: Option<String>) -> TimelineItem {
        TimelineItem {
            id: id.to_string(),
            start,
            duration,
            data: Shot {
                id: id.to_string(),
                shot_type: "WS".to_string(),
                duration,
                description_local: String::new(),
                camera_movement: String::new(),
                prompt_for_image: String::new(),
                prompt_for_video: String::new(),
                image_url,
            },
            scene_header: "EXT. YARD".to_string(),
        }
    }

    #[test]
    fn test_strip_size_follows_content_width() {
        let items = vec![item("a", 0.0, 5.0, None), item("b", 5.0, 5.0, None)];
        let layout = TimelineView::default().layout(&items);
        let img = render_timeline(&layout, &items, Theme::Dark, None);

        assert_eq!(img.width(), 10 * 20 + 400);
        assert_eq!(img.height(), (RULER_HEIGHT + TRACK_HEIGHT) as u32);
    }

    #[test]
    fn test_selected_block_outlined_with_selection_colour() {
        let items = vec![item("a", 0.0, 5.0, None)];
        let mut view = TimelineView::default();
        view.select(&items, "a");
        let layout = view.layout(&items);
        let img = render_timeline(&layout, &items, Theme::Light, None);

        let palette = Palette::for_theme(Theme::Light);
        let corner = img.get_pixel(0, BLOCK_TOP as u32);
        assert_eq!(*corner, palette.selection.to_rgba(255));
    }

    #[test]
    fn test_thumbnail_is_grey_and_dimmed() {
        let sketch = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let thumb = dimmed_thumbnail(&sketch, 4, 4);
        let p = thumb.get_pixel(1, 1).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[3], 127);
    }

    #[test]
    fn test_unreadable_thumbnail_does_not_fail_render() {
        let items = vec![item("a", 0.0, 5.0, Some("data:image/png;base64,AAAA".to_string()))];
        let layout = TimelineView::default().layout(&items);
        let img = render_timeline(&layout, &items, Theme::Dark, None);
        assert_eq!(img.width(), 500);
    }
}
