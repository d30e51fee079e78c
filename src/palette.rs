//! Color palette and styling for CLI output.
//!
//! Every styled string goes through a `fmt_*` helper so `--color never`
//! produces plain text.

use owo_colors::{OwoColorize, Style};

/// Style for family names, the primary identifier.
pub fn family_name() -> Style {
    Style::new().cyan().bold()
}

/// Style for section headings like "Installed families:".
pub fn heading() -> Style {
    Style::new().white().bold()
}

/// Style for labels like "Category:" or "Variants:".
pub fn label() -> Style {
    Style::new().blue()
}

/// Style for secondary text such as descriptions and paths.
pub fn description() -> Style {
    Style::new().dimmed()
}

/// Style for successful counts.
pub fn status_success() -> Style {
    Style::new().green()
}

/// Style for cached counts.
pub fn status_cached() -> Style {
    Style::new().yellow()
}

/// Style for failure counts and errors.
pub fn status_error() -> Style {
    Style::new().red()
}

/// Apply `style` when color is enabled.
fn paint(text: &str, style: Style, use_color: bool) -> String {
    if use_color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Format a family name with styling.
pub fn fmt_family_name(name: &str, use_color: bool) -> String {
    paint(name, family_name(), use_color)
}

/// Format a section heading with styling.
pub fn fmt_heading(text: &str, use_color: bool) -> String {
    paint(text, heading(), use_color)
}

/// Format a label with styling.
pub fn fmt_label(text: &str, use_color: bool) -> String {
    paint(text, label(), use_color)
}

/// Format description text with styling.
pub fn fmt_description(text: &str, use_color: bool) -> String {
    paint(text, description(), use_color)
}

/// Format a download summary: `Success N Failed M Cached K`.
pub fn fmt_summary(succeeded: usize, failed: usize, cached: usize, use_color: bool) -> String {
    format!(
        "{} {} {}",
        paint(&format!("Success {succeeded}"), status_success(), use_color),
        paint(&format!("Failed {failed}"), status_error(), use_color),
        paint(&format!("Cached {cached}"), status_cached(), use_color),
    )
}
