//! Colors and styles for the tracker screen.
//!
//! Views take every color from here: teal for structure, coral for whoever
//! holds the turn, and a green/amber/red band for hit points.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::core::combat::CombatantType;

// ── Structure ───────────────────────────────────────────────────────────────

/// Focused borders and section headings.
pub const PRIMARY: Color = Color::Rgb(0x00, 0x80, 0x80);
/// Initiative values and key hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x00, 0x96, 0x88);
/// The active turn, its clock and modal titles.
pub const ACCENT: Color = Color::Rgb(0xFF, 0x7F, 0x50);
/// Modal fill behind forms and prompts.
pub const BG_BASE: Color = Color::Rgb(0x0A, 0x19, 0x19);

// ── Text ────────────────────────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(0xE0, 0xE0, 0xE0);
/// Downed combatants and empty-state hints.
pub const TEXT_DIM: Color = Color::Rgb(0x50, 0x50, 0x50);
const TEXT_LABEL: Color = Color::Rgb(0x80, 0x80, 0x80);

// ── HP bands & combatant sides ──────────────────────────────────────────────

/// Low HP, monsters, errors.
pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
/// Bloodied HP, marks and defenses.
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
/// Players and armor class.
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

// ── Style helpers ───────────────────────────────────────────────────────────

pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_LABEL)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

/// Above half health is green, above a quarter amber, otherwise red.
pub fn hp_color(ratio: f64) -> Color {
    if ratio > 0.5 {
        SUCCESS
    } else if ratio > 0.25 {
        WARNING
    } else {
        ERROR
    }
}

pub fn type_color(combatant_type: CombatantType) -> Color {
    match combatant_type {
        CombatantType::Player => INFO,
        CombatantType::Monster => ERROR,
    }
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
