// src/theme.rs
// Blueprint palette: white and cyan on deep navy

use ratatui::style::{Color, Modifier, Style};

// Core Theme Colors
pub const COLOR_BLUEPRINT: Color = Color::Rgb(100, 190, 255);  // Drafting cyan
pub const COLOR_NAVY_BG: Color = Color::Rgb(10, 22, 48);       // Blueprint paper
pub const COLOR_PAPER: Color = Color::Rgb(230, 238, 250);      // Body text
pub const COLOR_MUTED: Color = Color::Rgb(110, 130, 165);      // Secondary text
pub const COLOR_ERROR_RED: Color = Color::Red;

// Difficulty badges, beginner to expert
pub const COLOR_DIFFICULTY: [Color; 4] = [Color::Green, Color::Yellow, Color::Rgb(255, 150, 40), Color::Red];

// Base Styles
pub const STYLE_BASE: Style = Style::new().fg(COLOR_PAPER).bg(COLOR_NAVY_BG);
pub const STYLE_BORDER: Style = Style::new().fg(COLOR_BLUEPRINT);
pub const STYLE_DIM: Style = Style::new().fg(COLOR_MUTED);

// List Styles
pub const STYLE_FAMILY_TITLE: Style = Style::new()
    .fg(COLOR_BLUEPRINT)
    .add_modifier(Modifier::BOLD);

pub const STYLE_ENTRY_NAME: Style = Style::new().fg(COLOR_PAPER);

pub const STYLE_PRICE: Style = Style::new().fg(COLOR_MUTED);

pub const STYLE_SCORE: Style = Style::new()
    .fg(COLOR_BLUEPRINT)
    .add_modifier(Modifier::BOLD);

pub const STYLE_LIST_HIGHLIGHT: Style = Style::new()
    .bg(COLOR_BLUEPRINT)
    .fg(COLOR_NAVY_BG)
    .add_modifier(Modifier::BOLD);

// Details Styles
pub const STYLE_METADATA_LABEL: Style = Style::new()
    .fg(COLOR_BLUEPRINT)
    .add_modifier(Modifier::BOLD);

pub const STYLE_METADATA_TEXT: Style = Style::new().fg(COLOR_PAPER);

pub const STYLE_HINT_TEXT: Style = Style::new().fg(COLOR_MUTED);

// Quiz Styles
pub const STYLE_QUESTION: Style = Style::new()
    .fg(COLOR_PAPER)
    .add_modifier(Modifier::BOLD);

pub const STYLE_OPTION_SELECTED: Style = Style::new()
    .fg(COLOR_BLUEPRINT)
    .add_modifier(Modifier::BOLD);

pub const STYLE_PROGRESS: Style = Style::new().fg(COLOR_BLUEPRINT).bg(COLOR_NAVY_BG);

// Status Bar Styles
pub const STYLE_STATUS_BAR: Style = Style::new()
    .bg(COLOR_BLUEPRINT)
    .fg(COLOR_NAVY_BG)
    .add_modifier(Modifier::BOLD);

// Error Styles
pub const STYLE_ERROR_TEXT: Style = Style::new()
    .fg(COLOR_ERROR_RED)
    .add_modifier(Modifier::BOLD);

/// Badge style for a difficulty level (1..=4).
pub fn difficulty_style(level: u8) -> Style {
    let idx = usize::from(level.clamp(1, 4) - 1);
    Style::new().fg(COLOR_DIFFICULTY[idx]).add_modifier(Modifier::BOLD)
}
