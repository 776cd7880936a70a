//! Sequential sketch generation for every shot that lacks one.

use std::time::Duration;

use tracing::{debug, info};

use storyboard_common::activity::ActivityLog;
use storyboard_common::cancel::CancelToken;
use storyboard_common::clock::RequestPacer;
use storyboard_project_model::timeline::Timeline;

use crate::client::{ImageOptions, StoryboardModel};
use crate::credentials::CredentialState;

/// How often a pacing pause re-checks the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Stopped,
}

/// Reported after every attempt, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub state: BatchState,
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub halted_by_credentials: bool,
}

/// Drives one image request at a time over the pending shots.
pub struct BatchDriver<'a, M: StoryboardModel + ?Sized> {
    model: &'a M,
    pacer: RequestPacer,
    options: ImageOptions,
    state: BatchState,
}

impl<'a, M: StoryboardModel + ?Sized> BatchDriver<'a, M> {
    pub fn new(model: &'a M, pacer: RequestPacer, options: ImageOptions) -> Self {
        Self {
            model,
            pacer,
            options,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Generate sketches for the shots pending when the run starts.
    ///
    /// Each success is patched into `timeline` immediately. A credential
    /// failure invalidates `credentials` and halts the run; any other
    /// failure is logged and the run moves on.
    pub async fn run(
        &mut self,
        timeline: &mut Timeline,
        credentials: &CredentialState,
        cancel: &CancelToken,
        log: &mut ActivityLog,
        mut on_progress: impl FnMut(BatchProgress),
    ) -> BatchReport {
        let queue: Vec<(String, String)> = timeline
            .pending()
            .map(|item| (item.id.clone(), item.data.prompt_for_image.clone()))
            .collect();
        let total = queue.len();

        let mut report = BatchReport {
            state: BatchState::Idle,
            total,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            halted_by_credentials: false,
        };

        if !credentials.is_valid() {
            log.error("API key is not valid; select or enter a key before generating sketches");
            self.state = BatchState::Stopped;
            report.state = self.state;
            report.halted_by_credentials = true;
            return report;
        }

        if total == 0 {
            log.info("Every shot already has a sketch");
            self.state = BatchState::Completed;
            report.state = self.state;
            return report;
        }

        self.state = BatchState::Running;
        log.info(format!("Generating sketches for {total} shots..."));
        info!(total, delay_ms = self.pacer.interval().as_millis() as u64, "Batch started");

        for (index, (id, prompt)) in queue.iter().enumerate() {
            if cancel.is_cancelled() {
                self.state = BatchState::Stopped;
                log.warning(format!(
                    "Sketch generation stopped after {}/{total} shots",
                    report.attempted
                ));
                break;
            }

            debug!(id = %id, "Requesting sketch");
            let result = self
                .model
                .generate_image(prompt, credentials.key(), &self.options)
                .await;
            report.attempted += 1;

            let halt = match result {
                Ok(Some(url)) => {
                    timeline.patch_image(id, url);
                    report.succeeded += 1;
                    false
                }
                Ok(None) => {
                    report.failed += 1;
                    log.warning(format!("No image returned for shot {id}"));
                    false
                }
                Err(e) if e.is_credential() => {
                    report.failed += 1;
                    credentials.invalidate();
                    log.error(format!(
                        "API key rejected while sketching shot {id}; batch halted: {e}"
                    ));
                    true
                }
                Err(e) => {
                    report.failed += 1;
                    log.warning(format!("Sketch for shot {id} failed: {e}"));
                    false
                }
            };

            // A rejected shot is not counted as done.
            if halt {
                self.state = BatchState::Stopped;
                report.halted_by_credentials = true;
                break;
            }

            on_progress(BatchProgress {
                completed: report.attempted,
                total,
            });

            if self.pacer.should_wait_after(index, total) {
                pause(self.pacer.interval(), cancel).await;
            }
        }

        if self.state == BatchState::Running {
            self.state = BatchState::Completed;
            log.success(format!(
                "Sketch generation finished: {} of {total} shots drawn",
                report.succeeded
            ));
        }

        report.state = self.state;
        info!(?report, "Batch finished");
        report
    }
}

/// Sleep for `interval`, returning early once `cancel` is set.
async fn pause(interval: Duration, cancel: &CancelToken) {
    let mut remaining = interval;
    while !remaining.is_zero() && !cancel.is_cancelled() {
        let step = remaining.min(CANCEL_POLL);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
}
