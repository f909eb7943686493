/// Initiative Tracker - combat turn tracking for tabletop RPG game masters.
///
/// Core library providing the combatant roster, initiative ordering,
/// the turn cycle with per-turn timing, damage modifiers and
/// end-of-combat statistics, plus a terminal front end.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
