pub mod json;
pub mod terminal;

use error_stack::Report;

use crate::error::AnalysisError;
use crate::model::SignalResult;

/// Sink for analysis outcomes.
pub trait Notifier: Send + Sync {
    fn notify(&self, result: &SignalResult);

    /// `input` is the symbol exactly as the user typed it.
    fn notify_failure(&self, input: &str, report: &Report<AnalysisError>);
}

/// Build the notifier for a `--format` value; unknown values fall back to text.
pub fn build_notifier(format: &str) -> Box<dyn Notifier> {
    match format {
        "json" => Box::new(json::JsonNotifier),
        _ => Box::new(terminal::TerminalNotifier),
    }
}
