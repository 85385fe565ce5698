//! Implements ProgressPort with an indicatif spinner.

use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

/// Spinner shown while a long operation runs. Created on the first `notify`,
/// cleared by `finish`, so it never overlaps interactive prompts.
#[derive(Default)]
pub struct SpinnerProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn spinner() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(TICK);
        bar
    }
}

impl ProgressPort for SpinnerProgress {
    fn notify(&self, message: &str) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        slot.get_or_insert_with(Self::spinner)
            .set_message(message.to_string());
    }

    fn finish(&self, message: &str) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = slot.take() {
            bar.finish_with_message(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_clears_spinner() {
        let progress = SpinnerProgress::new();
        progress.notify("Creating Invoice Database...");
        assert!(progress.bar.lock().unwrap().is_some());
        progress.finish("done");
        assert!(progress.bar.lock().unwrap().is_none());
        // Finishing twice is harmless.
        progress.finish("done");
    }
}
