use studyplan_lib::document::Importance;
use studyplan_lib::store::ReviewRecord;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn heading(text: &str, use_color: bool) -> String {
    let title = paint(text, Color::BOLD, use_color);
    format!("{}\n{}", title, "\u{2500}".repeat(text.chars().count().max(30)))
}

pub fn importance_color(importance: Importance) -> &'static str {
    match importance {
        Importance::High => Color::RED,
        Importance::Medium => Color::YELLOW,
        Importance::Low => Color::GRAY,
    }
}

/// Fixed-width importance marker, e.g. `[high]`
pub fn importance_badge(importance: Importance, use_color: bool) -> String {
    let label = format!("[{}]", importance);
    paint(&format!("{:<8}", label), importance_color(importance), use_color)
}

pub fn last_reviewed(record: &ReviewRecord) -> String {
    record
        .last_reviewed
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("Never")
        .to_string()
}

/// Compact interval: 1d, 2w, 1mo
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

/// Column width for a list of labels, clamped to a sensible range
pub fn column_width<'a>(labels: impl Iterator<Item = &'a str>, min: usize, max: usize) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(min).clamp(min, max)
}
