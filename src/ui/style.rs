//! Colors for the `providers` and `configure` listings.

use owo_colors::OwoColorize;
use std::fmt::Display;

pub struct Style;

impl Style {
    pub fn heading(text: &str) -> String {
        format!("{}", text.bold())
    }

    /// A `[chat]` setting name such as `model` or `temperature`.
    pub fn setting(name: &str) -> String {
        format!("{}", name.dimmed())
    }

    /// Provider names, model names and other chosen values.
    pub fn value<T: Display>(value: T) -> String {
        format!("{}", value.cyan())
    }

    /// Endpoints, file paths and similar supporting detail.
    pub fn detail<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    pub fn unset() -> String {
        format!("{}", "(not set)".dimmed().italic())
    }

    pub fn default_marker() -> String {
        format!("{}", "(default)".dimmed())
    }

    pub fn saved() -> String {
        format!("{}", "✓".green())
    }
}
