use std::{
    fmt,
    io::IsTerminal,
    sync::RwLock,
};

use colored::Colorize;
use once_cell::sync::OnceCell;
use portal_core::{Notice, Notifier, Severity};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

impl From<Severity> for MessageKind {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => MessageKind::Info,
            Severity::Success => MessageKind::Success,
            Severity::Warning => MessageKind::Warning,
            Severity::Error => MessageKind::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputPreferences {
    /// Suppresses info and success messages.
    pub quiet_mode: bool,
    /// No colors and ASCII-only rules.
    pub plain_mode: bool,
}

static PREFERENCES: OnceCell<RwLock<OutputPreferences>> = OnceCell::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
    let colorize = !prefs.plain_mode
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();
    colored::control::set_override(colorize);
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn should_skip(kind: MessageKind, prefs: &OutputPreferences) -> bool {
    prefs.quiet_mode && matches!(kind, MessageKind::Info | MessageKind::Success)
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

/// Formats a message with its label and, unless plain, its color.
pub fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        other => format!("{}: {}", label(other), text),
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    if should_skip(kind, &prefs) {
        return;
    }
    println!("{}", apply_style(kind, message));
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Text of a notice as printed on the console.
pub fn notice_line(notice: &Notice) -> String {
    let mut line = if notice.message.is_empty() {
        notice.title.clone()
    } else {
        format!("{}: {}", notice.title, notice.message)
    };
    if notice.sticky {
        line.push_str(" [pinned]");
    }
    line
}

/// Prints engine notices to stdout as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        print(notice.severity.into(), notice_line(&notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_line_marks_sticky_notices() {
        let notice = Notice::warning("Trip partially saved", "1 of 3 itinerary entries could not be saved.")
            .sticky();
        assert_eq!(
            notice_line(&notice),
            "Trip partially saved: 1 of 3 itinerary entries could not be saved. [pinned]"
        );
        assert_eq!(notice_line(&Notice::info("Blank Search", "")), "Blank Search");
    }

    #[test]
    fn plain_style_has_labels_without_escapes() {
        colored::control::set_override(false);
        assert_eq!(apply_style(MessageKind::Error, "boom"), "ERROR: boom");
        assert_eq!(apply_style(MessageKind::Section, " Trips "), "=== Trips ===");
    }
}
