//! Generate a sketch for one shot.

use std::path::PathBuf;

use storyboard_common::config::AppConfig;
use storyboard_genai::{sketch_shot, ImageOptions};
use storyboard_project_model::project::SavedProject;

use crate::session::Session;

pub async fn run(
    config: AppConfig,
    api_key: Option<String>,
    project: PathBuf,
    shot_id: String,
    aspect_ratio: Option<String>,
    resolution: Option<String>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let mut saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    let mut options = ImageOptions::from_defaults(&session.config.images);
    if let Some(ratio) = aspect_ratio {
        options.aspect_ratio = ratio;
    }
    if let Some(size) = resolution {
        options.image_size = size;
    }

    let client = session.client()?;
    let mut credentials = session.credentials(api_key)?;

    let mut result = sketch_shot(
        &client,
        &mut saved.timeline_items,
        &shot_id,
        &credentials,
        &options,
        &mut session.log,
    )
    .await;
    session.print_log();

    // A rejected key gets one retry with a freshly entered one.
    if matches!(&result, Err(e) if e.is_credential()) {
        if let Some(fresh) = session.reacquire() {
            credentials = fresh;
            result = sketch_shot(
                &client,
                &mut saved.timeline_items,
                &shot_id,
                &credentials,
                &options,
                &mut session.log,
            )
            .await;
            session.print_log();
        }
    }

    if result? {
        saved
            .save(&project)
            .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    }

    Ok(())
}
