//! Export configuration and job management.

use std::path::PathBuf;

use storyboard_common::activity::ActivityLog;
use storyboard_common::config::{Locale, RenderConfig};
use storyboard_common::error::{StoryboardError, StoryboardResult};
use storyboard_project_model::project::{export_file_name, SavedProject};

use crate::compose::{ComposeSummary, Composer};
use crate::labels::Labels;
use crate::pdf::write_pdf;
use crate::surface::Document;
use crate::text::TextRasterizer;

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Directory receiving `STORYBOARD_<title>.pdf`.
    pub output_dir: PathBuf,

    /// Fonts, supersampling and label language.
    pub render: RenderConfig,

    /// Date printed on the cover. Defaults to today in the locale's format.
    pub export_date: Option<String>,
}

impl ExportJob {
    pub fn new(output_dir: impl Into<PathBuf>, render: RenderConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            render,
            export_date: None,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.render.locale = locale;
        self
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Composing,
    Encoding,
    Writing,
    Complete,
    Failed,
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub summary: ComposeSummary,
    pub bytes: usize,
}

/// Export the project to a storyboard PDF.
///
/// The whole document is built in memory and written only when every step
/// succeeded. Any failure is recorded as one error entry in `log` and
/// returned; no file is left behind.
pub fn export_storyboard(
    project: &SavedProject,
    job: &ExportJob,
    log: &mut ActivityLog,
    progress: Option<ProgressCallback>,
) -> StoryboardResult<ExportOutcome> {
    let report = |progress_value: f64, stage: ExportStage| {
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: progress_value,
                stage,
            });
        }
    };

    log.info("Packaging storyboard document...");
    match run_export(project, job, &report) {
        Ok(outcome) => {
            report(1.0, ExportStage::Complete);
            log.success(format!(
                "Exported {} pages to {}",
                outcome.summary.pages,
                outcome.path.display()
            ));
            Ok(outcome)
        }
        Err(e) => {
            report(1.0, ExportStage::Failed);
            log.error(format!("PDF export failed: {e}"));
            Err(e)
        }
    }
}

fn run_export(
    project: &SavedProject,
    job: &ExportJob,
    report: &dyn Fn(f64, ExportStage),
) -> StoryboardResult<ExportOutcome> {
    project
        .ensure_exportable()
        .map_err(|e| StoryboardError::export(e.to_string()))?;
    let analysis = project
        .analysis_data
        .as_ref()
        .ok_or_else(|| StoryboardError::export("Project has not been analysed"))?;

    report(0.0, ExportStage::Preparing);
    let raster = TextRasterizer::from_config(&job.render)?;
    let labels = Labels::for_locale(job.render.locale);
    let export_date = job
        .export_date
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format(labels.date_format).to_string());

    tracing::info!(
        shots = project.timeline_items.len(),
        locale = ?job.render.locale,
        output_dir = %job.output_dir.display(),
        "Starting export"
    );

    report(0.1, ExportStage::Composing);
    let mut doc = Document::a4();
    doc.set_title(analysis.title.clone());
    let summary = Composer::new(&raster, labels).compose(
        &mut doc,
        analysis,
        project.timeline_items.items(),
        &export_date,
    )?;

    report(0.7, ExportStage::Encoding);
    let bytes = write_pdf(&doc)?;

    report(0.9, ExportStage::Writing);
    std::fs::create_dir_all(&job.output_dir)?;
    let path = job.output_dir.join(export_file_name(&analysis.title));
    std::fs::write(&path, &bytes)?;

    tracing::info!(
        path = %path.display(),
        pages = summary.pages,
        bytes = bytes.len(),
        "Export complete"
    );

    Ok(ExportOutcome {
        path,
        summary,
        bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_common::activity::Severity;

    #[test]
    fn test_unanalysed_project_logs_single_error() {
        let dir = std::env::temp_dir().join("storyboard_test_export_unanalysed");
        let _ = std::fs::remove_dir_all(&dir);

        let project = SavedProject::from_script("INT. ROOM - NIGHT");
        let job = ExportJob::new(&dir, RenderConfig::default());
        let mut log = ActivityLog::new(16);

        let err = export_storyboard(&project, &job, &mut log, None).unwrap_err();
        assert!(matches!(err, StoryboardError::Export { .. }));
        assert_eq!(log.count(Severity::Error), 1);
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_font_is_reported_not_panicking() {
        let dir = std::env::temp_dir().join("storyboard_test_export_font");
        let _ = std::fs::remove_dir_all(&dir);

        let mut project = SavedProject::from_script("x");
        let analysis: storyboard_project_model::analysis::ScriptAnalysis =
            serde_json::from_str(
                r#"{"title": "T", "acts": [{"title": "A", "scenes": [{"header": "H",
                    "shots": [{"type": "CU", "duration": 2}]}]}]}"#,
            )
            .unwrap();
        project.apply_analysis(analysis);

        let render = RenderConfig {
            font_path: Some(dir.join("missing.ttf")),
            ..Default::default()
        };
        let stages = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = stages.clone();
        let progress: ProgressCallback = Box::new(move |p| seen.lock().unwrap().push(p.stage));

        let mut log = ActivityLog::new(16);
        let result = export_storyboard(&project, &ExportJob::new(&dir, render), &mut log, Some(progress));

        assert!(matches!(result, Err(StoryboardError::FileNotFound { .. })));
        assert_eq!(log.count(Severity::Error), 1);
        assert_eq!(stages.lock().unwrap().last(), Some(&ExportStage::Failed));
        assert!(!dir.join("STORYBOARD_T.pdf").exists());
    }
}
