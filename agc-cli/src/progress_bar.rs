use std::time::Duration;

use agc::progress::{ProgressNotifier, ProgressStage};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Spinner for stages of unknown length (reading), bar with ETA otherwise.
fn stage_style(num_iter: Option<u64>) -> ProgressStyle {
    let template = match num_iter {
        Some(_) => "{msg}: {wide_bar} {pos}/{len} [ETA {eta}]",
        None => "{spinner} {msg}: {pos} ({per_sec})",
    };

    ProgressStyle::with_template(template).expect("Invalid progress bar template")
}

/// Progress bar displayed on the standard error, hidden until shown.
#[derive(Debug, Clone)]
pub(crate) struct AgcProgressBar {
    bar: ProgressBar,
}

impl AgcProgressBar {
    pub fn new() -> AgcProgressBar {
        let bar = ProgressBar::hidden();
        bar.set_style(ProgressStyle::default_spinner());
        bar.enable_steady_tick(Duration::from_millis(50));
        bar.set_message("Initializing...");

        Self { bar }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for AgcProgressBar {
    fn start_stage(&self, stage: ProgressStage, num_iter: Option<u64>) {
        self.bar.reset();
        self.bar.set_style(stage_style(num_iter));
        if let Some(num_iter) = num_iter {
            self.bar.set_length(num_iter);
        }
        self.bar.set_message(stage.name());
    }

    fn inc_iter(&self) {
        self.bar.inc(1);
    }
}
