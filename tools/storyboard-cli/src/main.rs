//! Storyboard CLI: screenplay breakdown, sketching, timeline and PDF export.
//!
//! Usage:
//!   storyboard new <PROJECT>               Create a project from a script
//!   storyboard analyze <PROJECT>           Break the script into shots
//!   storyboard sketch-all <PROJECT>        Draw every missing sketch
//!   storyboard timeline <PROJECT>          Inspect or render the timeline
//!   storyboard export <PROJECT>            Export the storyboard PDF
//!   storyboard check-key                   Validate the API key

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use storyboard_common::config::AppConfig;
use storyboard_genai::HostProvided;

mod commands;
mod session;

#[derive(Parser)]
#[command(
    name = "storyboard",
    about = "Turn a screenplay into a sketched, shot-by-shot storyboard",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key to use instead of GEMINI_API_KEY / API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file
    New {
        /// Project file to create
        project: PathBuf,

        /// Plain-text script to start from
        #[arg(long, conflicts_with = "sample")]
        script: Option<PathBuf>,

        /// Start from the built-in sample script
        #[arg(long)]
        sample: bool,

        /// Overwrite an existing project file
        #[arg(long)]
        force: bool,
    },

    /// Replace a project's script with the contents of a text file
    ImportScript {
        /// Path to the project file
        project: PathBuf,

        /// Plain-text script
        script: PathBuf,
    },

    /// Break the script down into acts, scenes and shots
    Analyze {
        /// Path to the project file
        project: PathBuf,
    },

    /// Generate a sketch for one shot
    Sketch {
        /// Path to the project file
        project: PathBuf,

        /// Shot id (e.g. shot-0-1-2)
        shot_id: String,

        /// Aspect ratio for this sketch
        #[arg(long)]
        aspect_ratio: Option<String>,

        /// Resolution class for this sketch (1K, 2K, 4K)
        #[arg(long)]
        resolution: Option<String>,
    },

    /// Generate sketches for every shot that lacks one (Ctrl-C stops)
    SketchAll {
        /// Path to the project file
        project: PathBuf,

        /// Pause between requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Edit one shot's details
    EditShot {
        /// Path to the project file
        project: PathBuf,

        /// Shot id
        shot_id: String,

        /// Shot type (e.g. "CLOSE-UP")
        #[arg(long = "type")]
        shot_type: Option<String>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Shot description
        #[arg(long)]
        description: Option<String>,

        /// Camera movement
        #[arg(long)]
        camera: Option<String>,

        /// Image prompt
        #[arg(long)]
        image_prompt: Option<String>,

        /// Video prompt
        #[arg(long)]
        video_prompt: Option<String>,

        /// Recompute start times after the edit
        #[arg(long)]
        reflow: bool,
    },

    /// Show the timeline layout, optionally rendering it to PNG
    Timeline {
        /// Path to the project file
        project: PathBuf,

        /// Zoom in this many steps
        #[arg(long, default_value = "0")]
        zoom_in: u32,

        /// Zoom out this many steps
        #[arg(long, default_value = "0")]
        zoom_out: u32,

        /// Select a shot by id
        #[arg(long)]
        select: Option<String>,

        /// Select the shot under this x position (pixels)
        #[arg(long)]
        click: Option<f64>,

        /// Show the tooltip for this x position (pixels)
        #[arg(long)]
        hover: Option<f64>,

        /// Write the timeline strip to a PNG file
        #[arg(long)]
        png: Option<PathBuf>,

        /// Color theme: dark|light
        #[arg(long)]
        theme: Option<String>,
    },

    /// Export the storyboard as PDF
    Export {
        /// Path to the project file
        project: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Label language: en|vi
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show project information
    Info {
        /// Path to the project file
        project: PathBuf,
    },

    /// Check that the API key is accepted
    CheckKey,

    /// Show the user guide
    Guide {
        /// Language: en|vi
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Show or initialise the configuration file
    Config {
        /// Write the default configuration
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    HostProvided::load_dotenv();

    let config = AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    storyboard_common::logging::init_logging(&logging);

    let api_key = cli.api_key;
    match cli.command {
        Commands::New {
            project,
            script,
            sample,
            force,
        } => commands::new::run(project, script, sample, force),
        Commands::ImportScript { project, script } => {
            commands::import_script::run(config, project, script)
        }
        Commands::Analyze { project } => commands::analyze::run(config, api_key, project).await,
        Commands::Sketch {
            project,
            shot_id,
            aspect_ratio,
            resolution,
        } => {
            commands::sketch::run(config, api_key, project, shot_id, aspect_ratio, resolution)
                .await
        }
        Commands::SketchAll { project, delay_ms } => {
            commands::sketch_all::run(config, api_key, project, delay_ms).await
        }
        Commands::EditShot {
            project,
            shot_id,
            shot_type,
            duration,
            description,
            camera,
            image_prompt,
            video_prompt,
            reflow,
        } => commands::edit_shot::run(
            project,
            shot_id,
            storyboard_project_model::timeline::ShotUpdate {
                shot_type,
                duration,
                description_local: description,
                camera_movement: camera,
                prompt_for_image: image_prompt,
                prompt_for_video: video_prompt,
            },
            reflow,
        ),
        Commands::Timeline {
            project,
            zoom_in,
            zoom_out,
            select,
            click,
            hover,
            png,
            theme,
        } => commands::timeline::run(
            config,
            project,
            commands::timeline::TimelineArgs {
                zoom_in,
                zoom_out,
                select,
                click,
                hover,
                png,
                theme,
            },
        ),
        Commands::Export {
            project,
            output,
            lang,
        } => commands::export::run(config, project, output, lang),
        Commands::Info { project } => commands::info::run(project),
        Commands::CheckKey => commands::check_key::run(config, api_key).await,
        Commands::Guide { lang } => commands::guide::run(&lang),
        Commands::Config { init } => commands::config::run(config, init),
    }
}
