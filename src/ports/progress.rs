//! Progress outbound port. Operator-facing status messages (cosmetic).

/// Port for short progress notifications during long-running steps.
///
/// Implemented by the terminal UI (spinner). Use cases call `notify` before each step;
/// nothing depends on the messages for correctness.
pub trait ProgressPort: Send + Sync {
    /// Show a status message for the step about to start.
    fn notify(&self, message: &str);

    /// Mark the whole operation as done.
    fn finish(&self, message: &str);
}

/// Progress sink that drops every message. For headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressPort for SilentProgress {
    fn notify(&self, _message: &str) {}

    fn finish(&self, _message: &str) {}
}
