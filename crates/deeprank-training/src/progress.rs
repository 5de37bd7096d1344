//! Best-effort progress reporting to an external tuning service.
//!
//! The trainer pushes the per-epoch validation personalized AUC and the
//! final best score through a [`ProgressReporter`]. Reporting is a side
//! channel: implementations must not fail the training run, so the trait
//! has no error path.

use tracing::info;

/// Receiver for intermediate and final scalar results.
pub trait ProgressReporter: Send {
    /// Reports one intermediate result (per-epoch validation score).
    fn report_intermediate(&mut self, value: f64);

    /// Reports the final result (best validation score of the run).
    fn report_final(&mut self, value: f64);
}

/// Reporter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report_intermediate(&mut self, _value: f64) {}

    fn report_final(&mut self, _value: f64) {}
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReporter;

impl ProgressReporter for LoggingReporter {
    fn report_intermediate(&mut self, value: f64) {
        info!(value, "intermediate result");
    }

    fn report_final(&mut self, value: f64) {
        info!(value, "final result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_reporter_is_silent() {
        let mut reporter = NullReporter;
        reporter.report_intermediate(0.5);
        reporter.report_final(0.7);
    }

    #[test]
    fn test_reporters_are_object_safe() {
        let mut reporters: Vec<Box<dyn ProgressReporter>> =
            vec![Box::new(NullReporter), Box::new(LoggingReporter)];
        for reporter in &mut reporters {
            reporter.report_intermediate(0.1);
        }
    }
}
