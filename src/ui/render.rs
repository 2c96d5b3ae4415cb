use crate::platform::readiness::ReadinessResult;
use crate::status::{LogEntry, Status};
use crate::ui::style;

/// The status line shown above the log. `Idle` has no action of its own to
/// report, so it renders the startup readiness state instead.
pub fn status_line(status: &Status, readiness: &ReadinessResult) -> String {
    match status {
        Status::Idle => match (&readiness.error, readiness.ready) {
            (Some(error), _) => style::error(format!("initialization error: {error}")),
            (None, true) => style::success("sdk initialized"),
            (None, false) => style::dim("sdk initializing..."),
        },
        Status::Pending => style::yellow("pending..."),
        Status::Success(message) => style::success(message),
        Status::Warning(message) => style::yellow(message),
        Status::Error(message) => style::error(message),
    }
}

/// The full ordered log, one `[HH:MM:SS] message` line per entry.
pub fn log_text(entries: &[LogEntry]) -> String {
    let mut text = String::new();
    for entry in entries {
        text.push_str(&format!(
            "[{}] {}\n",
            entry.at.format("%H:%M:%S"),
            entry.message
        ));
    }
    text
}
