//! Console rendering for deployer runs.
//!
//! Progress goes to stdout as short status lines; the failure summary goes
//! to stderr. Color is handled by `colored`, which honors `NO_COLOR`.

use colored::Colorize;
use std::env;

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoxStyle {
    Info,
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Created,
    Updated,
    Unchanged,
    Skipped,
    Failed,
    Info,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Created => "✔",
            ItemStatus::Updated => "↻",
            ItemStatus::Unchanged => "=",
            ItemStatus::Skipped => "⏭",
            ItemStatus::Failed => "✘",
            ItemStatus::Info => "▸",
        }
    }
}

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(80)
}

fn box_width() -> usize {
    terminal_width().clamp(MIN_BOX_WIDTH, MAX_BOX_WIDTH)
}

fn box_row(content: &str, width: usize) -> String {
    let padding = width.saturating_sub(2).saturating_sub(content.chars().count());
    let left = padding / 2;
    format!(
        "║{}{}{}║",
        " ".repeat(left),
        content,
        " ".repeat(padding - left)
    )
}

fn box_lines(title: &str, subtitle: &str) -> Vec<String> {
    let width = box_width();
    let mut lines = vec![format!("╔{}╗", "═".repeat(width - 2)), box_row(title, width)];
    if !subtitle.is_empty() {
        lines.push(box_row(subtitle, width));
    }
    lines.push(format!("╚{}╝", "═".repeat(width - 2)));
    lines
}

/// Boxed banner. Error boxes go to stderr.
pub fn render_box(title: &str, subtitle: &str, style: BoxStyle) {
    for line in box_lines(title, subtitle) {
        match style {
            BoxStyle::Info => println!("{}", line.bright_cyan().bold()),
            BoxStyle::Success => println!("{}", line.bright_green().bold()),
            BoxStyle::Error => eprintln!("{}", line.bright_red().bold()),
        }
    }
}

pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

pub fn item(message: &str, status: ItemStatus) {
    let icon = status.icon();
    let icon = match status {
        ItemStatus::Created => icon.bright_green(),
        ItemStatus::Updated => icon.bright_yellow(),
        ItemStatus::Unchanged | ItemStatus::Skipped => icon.bright_black(),
        ItemStatus::Failed => icon.bright_red(),
        ItemStatus::Info => icon.cyan(),
    };
    println!("  {} {}", icon, message);
}

pub fn step(message: &str) {
    item(message, ItemStatus::Info);
}

pub fn failure(message: &str) {
    item(message, ItemStatus::Failed);
}
