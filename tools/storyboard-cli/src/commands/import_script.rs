//! Replace a project's script input.

use std::path::PathBuf;

use storyboard_common::config::AppConfig;
use storyboard_project_model::project::SavedProject;

use crate::session::Session;

pub fn run(config: AppConfig, project: PathBuf, script: PathBuf) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let mut saved =
        SavedProject::load(&project).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    match saved.import_script(&script) {
        Ok(()) => session.log.success(format!(
            "Imported script from {}",
            script.display()
        )),
        Err(e) => {
            session.log.error(format!("Script import failed: {e}"));
            session.print_log();
            return Err(e.into());
        }
    }

    if saved.analysis_data.is_some() {
        session
            .log
            .info("The existing breakdown is kept until the script is analysed again");
    }

    saved
        .save(&project)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
    session.print_log();

    Ok(())
}
