//! Color constants for the terminal board.

use ratatui::style::Color;

use crate::fields::TaskStatus;

/// Feature list column
pub const SLATE: Color = Color::Rgb(90, 110, 140);
/// Design doc column
pub const DARK_GREEN: Color = Color::Rgb(0, 110, 40);
/// PRD column
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Prototype column
pub const DARK_PURPLE: Color = Color::Rgb(120, 70, 140);

pub fn stage_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Featurelist => SLATE,
        TaskStatus::Design => DARK_GREEN,
        TaskStatus::Prd => GOLD,
        TaskStatus::Prototype => DARK_PURPLE,
    }
}

/// Readable foreground on top of a stage color.
pub fn text_on(color: Color) -> Color {
    match color {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
