//! Create a new project file.

use std::path::PathBuf;

use storyboard_project_model::project::{SavedProject, SAMPLE_SCRIPT};

pub fn run(
    project: PathBuf,
    script: Option<PathBuf>,
    sample: bool,
    force: bool,
) -> anyhow::Result<()> {
    if project.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            project.display()
        );
    }

    let saved = match (script, sample) {
        (Some(path), _) => SavedProject::from_script_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to import script: {e}"))?,
        (None, true) => SavedProject::from_script(SAMPLE_SCRIPT),
        (None, false) => SavedProject::default(),
    };

    saved
        .save(&project)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("Created project: {}", project.display());
    println!(
        "  Script: {} lines",
        saved.script_input.lines().filter(|l| !l.trim().is_empty()).count()
    );
    println!();
    println!("Next: storyboard analyze {}", project.display());

    Ok(())
}
