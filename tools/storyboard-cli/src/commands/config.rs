//! Show or initialise the configuration file.

use storyboard_common::config::{config_file_path, AppConfig};

pub fn run(config: AppConfig, init: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if init {
        if path.exists() {
            println!("Config already exists: {}", path.display());
            return Ok(());
        }
        let written = AppConfig::default().save()?;
        println!("Wrote default config: {}", written.display());
        return Ok(());
    }

    println!(
        "# {}{}",
        path.display(),
        if path.exists() { "" } else { " (not found, showing defaults)" }
    );
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
