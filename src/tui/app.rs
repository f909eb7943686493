use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use super::theme;
use super::views::combat::CombatView;
use crate::config::AppConfig;
use crate::core::combat::CombatTracker;

/// Central application state.
pub struct AppState {
    pub running: bool,
    pub combat: CombatView,
    /// How long to wait for input before redrawing.
    tick_rate: Duration,
    /// Refresh interval of the live turn clock.
    clock_tick: Duration,
    last_clock_draw: Instant,
    dirty: bool,
}

impl AppState {
    pub fn new(tracker: CombatTracker, config: &AppConfig) -> Self {
        Self {
            running: true,
            combat: CombatView::new(tracker),
            tick_rate: Duration::from_millis(config.tui.tick_rate_ms.max(1)),
            clock_tick: Duration::from_millis(config.combat.clock_tick_ms.max(1)),
            last_clock_draw: Instant::now(),
            dirty: true,
        }
    }

    pub fn tracker(&self) -> &CombatTracker {
        self.combat.tracker()
    }

    /// Blocking event loop. Redraws after input, and once per clock tick while
    /// a turn is running.
    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while self.running {
            if self.dirty {
                terminal.draw(|frame| self.render(frame))?;
                self.dirty = false;
            }

            if event::poll(self.tick_rate)? {
                let input = event::read()?;
                self.handle_event(&input);
            } else {
                self.on_tick(Instant::now());
            }
        }
        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    fn handle_event(&mut self, event: &Event) {
        if let Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            if modifiers.contains(KeyModifiers::CONTROL) {
                self.running = false;
                return;
            }
        }

        if matches!(event, Event::Resize(..)) {
            self.dirty = true;
            return;
        }

        if self.combat.handle_event(event) {
            self.dirty = true;
            return;
        }

        if let Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            if !self.combat.is_editing() {
                self.running = false;
            }
        }
    }

    /// The clock only needs repainting while someone holds the turn.
    fn on_tick(&mut self, now: Instant) {
        if !self.tracker().is_in_turn() {
            return;
        }
        if now.duration_since(self.last_clock_draw) >= self.clock_tick {
            self.last_clock_draw = now;
            self.dirty = true;
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(frame.area());
        self.combat.render(frame, rows[0]);
        self.render_status_bar(frame, rows[1]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let tracker = self.tracker();
        let mut spans = vec![
            Span::styled(
                " INITIATIVE ",
                Style::default()
                    .fg(theme::BG_BASE)
                    .bg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} combatant(s)", tracker.combatants().len()),
                theme::muted(),
            ),
        ];
        if let Some(round) = tracker.round() {
            spans.push(Span::styled(format!(" │ round {round}"), theme::muted()));
        }
        spans.push(Span::styled(
            format!(" │ {} turn(s) logged", tracker.history().len()),
            theme::dim(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Helper to create a centered rectangle.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
