//! Colour helpers on top of `colored`.
//!
//! Colouring is global: [`disable`] turns every helper (and every
//! `colored` call elsewhere) into a no-op, which is what `--no-color` does.

use colored::{Colorize, control};
use once_cell::sync::Lazy;
use regex::Regex;

static ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ANSI escape regex")
});

pub fn enable() {
    control::set_override(true);
}

pub fn disable() {
    control::set_override(false);
}

/// Back to auto-detection (TTY, `NO_COLOR`, `CLICOLOR`).
pub fn reset() {
    control::unset_override();
}

pub fn is_enabled() -> bool {
    control::SHOULD_COLORIZE.should_colorize()
}

pub fn red(text: impl AsRef<str>) -> String {
    text.as_ref().red().to_string()
}

pub fn green(text: impl AsRef<str>) -> String {
    text.as_ref().green().to_string()
}

pub fn yellow(text: impl AsRef<str>) -> String {
    text.as_ref().yellow().to_string()
}

pub fn blue(text: impl AsRef<str>) -> String {
    text.as_ref().blue().to_string()
}

pub fn magenta(text: impl AsRef<str>) -> String {
    text.as_ref().magenta().to_string()
}

pub fn cyan(text: impl AsRef<str>) -> String {
    text.as_ref().cyan().to_string()
}

pub fn white(text: impl AsRef<str>) -> String {
    text.as_ref().white().to_string()
}

pub fn black(text: impl AsRef<str>) -> String {
    text.as_ref().black().to_string()
}

pub fn bold(text: impl AsRef<str>) -> String {
    text.as_ref().bold().to_string()
}

pub fn dim(text: impl AsRef<str>) -> String {
    text.as_ref().dimmed().to_string()
}

pub fn underline(text: impl AsRef<str>) -> String {
    text.as_ref().underline().to_string()
}

/// Removes every ANSI CSI escape sequence from `text`.
pub fn strip(text: &str) -> String {
    ESCAPE.replace_all(text, "").into_owned()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
