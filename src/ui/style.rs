use console::style;
use std::fmt::Display;

/// Green bold — success checkmarks, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold — hard failures
pub fn error<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold — section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim — subtitles, secondary text, decorative lines
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow — warnings, in-flight states
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green — confirmed values, identifiers
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan — field labels
pub fn cyan<D: Display>(text: D) -> String {
    style(text).cyan().to_string()
}
