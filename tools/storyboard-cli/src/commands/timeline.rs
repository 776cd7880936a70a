//! Inspect the timeline and render it to PNG.

use std::path::PathBuf;

use storyboard_common::clock::format_timecode;
use storyboard_common::config::{AppConfig, Theme};
use storyboard_project_model::project::SavedProject;
use storyboard_render_engine::text::TextRasterizer;
use storyboard_render_engine::timeline_raster::render_timeline_png;
use storyboard_render_engine::timeline_view::{
    TickKind, TimelineView, BLOCK_HEIGHT, BLOCK_TOP, RULER_HEIGHT, TRACK_HEIGHT,
};

pub struct TimelineArgs {
    pub zoom_in: u32,
    pub zoom_out: u32,
    pub select: Option<String>,
    pub click: Option<f64>,
    pub hover: Option<f64>,
    pub png: Option<PathBuf>,
    pub theme: Option<String>,
}

pub fn run(config: AppConfig, project: PathBuf, args: TimelineArgs) -> anyhow::Result<()> {
    let saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let items = saved.timeline_items.items();

    let theme = match args.theme.as_deref() {
        None => config.timeline.theme,
        Some("dark") => Theme::Dark,
        Some("light") => Theme::Light,
        Some(other) => anyhow::bail!("Unknown theme: {other}. Use: dark, light"),
    };

    let mut view = TimelineView::new(config.timeline.clone());
    for _ in 0..args.zoom_in {
        view.zoom_in();
    }
    for _ in 0..args.zoom_out {
        view.zoom_out();
    }

    let block_mid = BLOCK_TOP + BLOCK_HEIGHT / 2.0;
    if let Some(id) = &args.select {
        if view.select(items, id).is_none() {
            anyhow::bail!("No shot with id {id}");
        }
    }
    if let Some(x) = args.click {
        match view.click(items, x, block_mid) {
            Some(event) => println!("Clicked shot #{} ({})", event.index + 1, event.id),
            None => println!("Nothing at x={x}"),
        }
    }

    let layout = view.layout(items);
    println!("Timeline: {}", project.display());
    println!(
        "  Zoom: {}% ({} px/s)  Length: {}  Width: {:.0}px",
        view.zoom_percent(),
        layout.zoom,
        format_timecode(layout.total_duration),
        layout.content_width
    );
    let labels: Vec<&str> = layout
        .ruler
        .iter()
        .filter(|t| t.kind != TickKind::Minor)
        .filter_map(|t| t.label.as_deref())
        .collect();
    if !labels.is_empty() {
        println!("  Ruler: {}", labels.join(" "));
    }
    println!();

    let mut last_scene = "";
    for block in &layout.blocks {
        if block.scene_header != last_scene {
            println!("  {}", block.scene_header);
            last_scene = &block.scene_header;
        }
        println!(
            "  {} #{:<3} {:<14} x={:<8.1} w={:<7.1} {:>5} {}",
            if block.selected { ">" } else { " " },
            block.index + 1,
            block.id,
            block.x,
            block.width,
            block.duration_label,
            if block.has_thumbnail {
                format!("{} [sketch]", block.shot_type)
            } else {
                block.shot_type.clone()
            }
        );
    }

    if let Some(x) = args.hover {
        let viewport = (layout.content_width, RULER_HEIGHT + TRACK_HEIGHT);
        match view.hover(items, x, block_mid, viewport) {
            Some(tip) => {
                println!();
                println!("Tooltip at ({:.0}, {:.0}):", tip.x, tip.y);
                println!("  {}", tip.scene_header);
                println!("  {} | {}", tip.shot_type, tip.duration_label);
                println!("  {}", tip.description);
            }
            None => println!("Nothing under x={x}"),
        }
    }

    if let Some(path) = args.png {
        let text = match TextRasterizer::from_config(&config.render) {
            Ok(raster) => Some(raster),
            Err(e) => {
                tracing::warn!(error = %e, "No font available; timeline labels are omitted");
                None
            }
        };
        render_timeline_png(&layout, items, theme, text.as_ref(), &path)?;
        println!();
        println!("Wrote {}", path.display());
    }

    Ok(())
}
