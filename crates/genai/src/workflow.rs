//! User-level operations: analyse a project, sketch one shot, check a key.
//!
//! Each operation reports to the activity log and leaves the project
//! untouched when it fails.

use storyboard_common::activity::ActivityLog;
use storyboard_project_model::project::SavedProject;
use storyboard_project_model::timeline::Timeline;

use crate::client::{ImageOptions, StoryboardModel};
use crate::credentials::CredentialState;
use crate::error::{GenAiError, GenAiResult};

/// Analyse the project's script and rebuild its timeline.
pub async fn analyze_project<M: StoryboardModel + ?Sized>(
    model: &M,
    project: &mut SavedProject,
    credentials: &CredentialState,
    log: &mut ActivityLog,
) -> GenAiResult<()> {
    if project.script_input.trim().is_empty() {
        let err = GenAiError::invalid_request("script is empty");
        log.error(err.to_string());
        return Err(err);
    }

    log.info("Analysing script structure...");
    match model.analyze(&project.script_input, credentials.key()).await {
        Ok(analysis) => {
            let message = format!(
                "Analysis complete: \"{}\", {} scenes, {} shots",
                analysis.title,
                analysis.scene_count(),
                analysis.shot_count()
            );
            project.apply_analysis(analysis);
            log.success(message);
            Ok(())
        }
        Err(e) => {
            if e.is_credential() {
                credentials.invalidate();
            }
            log.error(e.to_string());
            Err(e)
        }
    }
}

/// Generate a sketch for a single shot. Returns whether an image was stored.
pub async fn sketch_shot<M: StoryboardModel + ?Sized>(
    model: &M,
    timeline: &mut Timeline,
    shot_id: &str,
    credentials: &CredentialState,
    options: &ImageOptions,
    log: &mut ActivityLog,
) -> GenAiResult<bool> {
    let Some(item) = timeline.get(shot_id) else {
        let err = GenAiError::invalid_request(format!("no shot with id {shot_id}"));
        log.error(err.to_string());
        return Err(err);
    };
    let prompt = item.data.prompt_for_image.clone();

    log.info(format!("Sketching shot {shot_id}..."));
    match model.generate_image(&prompt, credentials.key(), options).await {
        Ok(Some(url)) => {
            timeline.patch_image(shot_id, url);
            log.success(format!("Sketch ready for shot {shot_id}"));
            Ok(true)
        }
        Ok(None) => {
            log.warning(format!("No image returned for shot {shot_id}"));
            Ok(false)
        }
        Err(e) => {
            if e.is_credential() {
                credentials.invalidate();
            }
            log.error(e.to_string());
            Err(e)
        }
    }
}

/// Ping the backend with the current key.
pub async fn check_credentials<M: StoryboardModel + ?Sized>(
    model: &M,
    credentials: &CredentialState,
    log: &mut ActivityLog,
) -> bool {
    log.info(format!("Checking API key from {}...", credentials.source()));
    match credentials.validate(model).await {
        Ok(()) => {
            log.success("API key accepted");
            true
        }
        Err(e) => {
            log.error(format!("API key check failed: {e}"));
            false
        }
    }
}
