//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR via `console`):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, commands, hints
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;
use dialoguer::Confirm;

/// Print a success message with checkmark (green).
///
/// Example: `✓ Created vault: dev`
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ vault not found: dev`
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ run: covert init`
pub fn hint(msg: &str) {
    eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", style(title).bold());
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  Owner:  alice@example.com`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", style(label).dim(), style(value).bold());
}

/// Print a list item.
///
/// Example: `  - alice@example.com`
pub fn list_item(item: &str) {
    println!("  - {}", item);
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}

/// Ask for confirmation of a destructive action, unless forced.
///
/// Returns false when the user declines or no interactive terminal is
/// available.
pub fn confirm(prompt: &str, force: bool) -> bool {
    if force {
        return true;
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}
