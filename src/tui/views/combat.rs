//! Combat tracker view: roster in turn order, HP entry, turn controls and the
//! end-of-combat statistics panel.

use std::collections::BTreeSet;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::core::combat::{
    format_duration_ms, Combatant, CombatStatsSummary, CombatTracker, CombatantPatch,
    CombatantType, DamageResponse, ManualModifier,
};
use crate::tui::app::centered_rect;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::{CharFilter, InputBuffer};

/// History rows shown under the detail panel.
const HISTORY_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Roster,
    AddForm,
    Damage,
    Heal,
    TypedDamage,
    Initiative,
    Rename,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    MaxHp,
    Initiative,
    Type,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::MaxHp,
            Self::MaxHp => Self::Initiative,
            Self::Initiative => Self::Type,
            Self::Type => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Type,
            Self::MaxHp => Self::Name,
            Self::Initiative => Self::MaxHp,
            Self::Type => Self::Initiative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypedField {
    Amount,
    DamageType,
}

/// One-line feedback under the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    text: String,
    is_error: bool,
}

pub struct CombatView {
    tracker: CombatTracker,
    mode: Mode,
    /// Index into the effective turn order.
    selected: usize,
    /// Targets for typed damage.
    marked: BTreeSet<String>,

    form_name: InputBuffer,
    form_hp: InputBuffer,
    form_init: InputBuffer,
    form_type: CombatantType,
    form_field: FormField,

    amount: InputBuffer,
    modifier: ManualModifier,
    damage_type: InputBuffer,
    typed_field: TypedField,
    initiative: InputBuffer,
    /// Shared by the rename and notes prompts.
    detail: InputBuffer,

    notice: Option<Notice>,
}

impl CombatView {
    pub fn new(tracker: CombatTracker) -> Self {
        Self {
            tracker,
            mode: Mode::Roster,
            selected: 0,
            marked: BTreeSet::new(),
            form_name: InputBuffer::new(),
            form_hp: InputBuffer::with_filter(CharFilter::Adjustment),
            form_init: InputBuffer::with_filter(CharFilter::Signed),
            form_type: CombatantType::Player,
            form_field: FormField::Name,
            amount: InputBuffer::with_filter(CharFilter::Adjustment),
            modifier: ManualModifier::Normal,
            damage_type: InputBuffer::new(),
            typed_field: TypedField::Amount,
            initiative: InputBuffer::with_filter(CharFilter::Signed),
            detail: InputBuffer::new(),
            notice: None,
        }
    }

    pub fn tracker(&self) -> &CombatTracker {
        &self.tracker
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether a text field currently owns the keyboard.
    pub fn is_editing(&self) -> bool {
        self.mode != Mode::Roster
    }

    fn selected_id(&self) -> Option<String> {
        self.tracker.effective_order().into_iter().nth(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.tracker.combatants().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.marked.retain(|id| self.tracker.get(id).is_some());
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
        });
    }

    fn name_of(&self, id: &str) -> String {
        self.tracker
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    // ────────────────────────────────────────────────────────────────────
    // Event handling
    // ────────────────────────────────────────────────────────────────────

    /// Returns `true` when the event was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match self.mode {
            Mode::Roster => self.handle_roster(*code),
            Mode::AddForm => self.handle_form(*code),
            Mode::Damage | Mode::Heal => self.handle_amount(*code),
            Mode::TypedDamage => self.handle_typed(*code),
            Mode::Initiative => self.handle_initiative(*code),
            Mode::Rename | Mode::Notes => self.handle_detail(*code),
        }
    }

    fn handle_roster(&mut self, code: KeyCode) -> bool {
        if self.tracker.stats_visible() && matches!(code, KeyCode::Esc | KeyCode::Enter) {
            self.tracker.dismiss_stats();
            return true;
        }

        let len = self.tracker.combatants().len();
        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    self.selected = (self.selected + 1) % len;
                }
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if len > 0 {
                    self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
                }
                true
            }
            KeyCode::Char('a') => {
                self.reset_form();
                self.mode = Mode::AddForm;
                true
            }
            KeyCode::Char('d' | 'h' | 'i' | 't' | 'c' | 'N') if len == 0 =>
            {
                self.warn("Add a combatant first");
                true
            }
            KeyCode::Char('d') => {
                self.amount.clear();
                self.modifier = ManualModifier::Normal;
                self.mode = Mode::Damage;
                true
            }
            KeyCode::Char('h') => {
                self.amount.clear();
                self.mode = Mode::Heal;
                true
            }
            KeyCode::Char('t') => {
                self.amount.clear();
                self.typed_field = TypedField::Amount;
                self.mode = Mode::TypedDamage;
                true
            }
            KeyCode::Char('i') => {
                let current = self
                    .selected_id()
                    .and_then(|id| self.tracker.get(&id).map(|c| c.initiative.to_string()))
                    .unwrap_or_default();
                self.initiative.set_text(&current);
                self.mode = Mode::Initiative;
                true
            }
            KeyCode::Char('c') => {
                let current = self.selected_id().map(|id| self.name_of(&id)).unwrap_or_default();
                self.detail.set_text(&current);
                self.mode = Mode::Rename;
                true
            }
            KeyCode::Char('N') => {
                let current = self
                    .selected_id()
                    .and_then(|id| self.tracker.get(&id).map(|c| c.notes.clone()))
                    .unwrap_or_default();
                self.detail.set_text(&current);
                self.mode = Mode::Notes;
                true
            }
            KeyCode::Char('m') => {
                if let Some(id) = self.selected_id() {
                    if !self.marked.remove(&id) {
                        self.marked.insert(id);
                    }
                }
                true
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.selected_id() {
                    if let Some(removed) = self.tracker.remove_combatant(&id) {
                        self.notify(format!("Removed {}", removed.name));
                    }
                    self.clamp_selection();
                }
                true
            }
            KeyCode::Char('r') => {
                if let Some(id) = self.selected_id() {
                    if self.tracker.reset_hp(&id) {
                        self.notify(format!("{} restored to full HP", self.name_of(&id)));
                    }
                }
                true
            }
            KeyCode::Char('R') => {
                self.tracker.reset_all_hp();
                self.notify("All combatants restored to full HP");
                true
            }
            KeyCode::Char('K') => {
                if let Some(id) = self.selected_id() {
                    if self.tracker.move_up(&id) {
                        self.selected = self.selected.saturating_sub(1);
                    }
                }
                true
            }
            KeyCode::Char('J') => {
                if let Some(id) = self.selected_id() {
                    if self.tracker.move_down(&id) {
                        self.selected = (self.selected + 1).min(len.saturating_sub(1));
                    }
                }
                true
            }
            KeyCode::Char('o') => {
                if self.tracker.has_manual_order() {
                    self.tracker.clear_manual_order();
                    self.notify("Back to initiative order");
                }
                true
            }
            KeyCode::Char('M') => {
                let removed = self.tracker.clear_by_type(CombatantType::Monster);
                self.clamp_selection();
                self.notify(format!("Cleared {removed} monster(s)"));
                true
            }
            KeyCode::Char('P') => {
                let removed = self.tracker.clear_by_type(CombatantType::Player);
                self.clamp_selection();
                self.notify(format!("Cleared {removed} player(s)"));
                true
            }
            KeyCode::Char('X') => {
                self.tracker.clear_all();
                self.clamp_selection();
                self.notify("Roster cleared");
                true
            }
            KeyCode::Char('s') => {
                if self.tracker.is_in_turn() {
                    self.warn("Combat already running");
                } else if self.tracker.start_combat() {
                    self.follow_active();
                    self.notify("Combat started");
                } else {
                    self.warn("Nobody to start combat with");
                }
                true
            }
            KeyCode::Char(' ') | KeyCode::Char('n') => {
                if self.tracker.advance_turn() {
                    self.follow_active();
                }
                true
            }
            KeyCode::Char('e') => {
                if self.tracker.is_in_turn() {
                    self.tracker.end_combat();
                    self.notify("Combat ended");
                }
                true
            }
            _ => false,
        }
    }

    /// Move the selection onto whoever holds the turn.
    fn follow_active(&mut self) {
        if let Some(active) = self.tracker.active_turn() {
            let active_id = active.combatant_id.clone();
            if let Some(pos) = self
                .tracker
                .effective_order()
                .iter()
                .position(|id| *id == active_id)
            {
                self.selected = pos;
            }
        }
    }

    fn handle_form(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Roster;
            }
            KeyCode::Tab | KeyCode::Down => self.form_field = self.form_field.next(),
            KeyCode::BackTab | KeyCode::Up => self.form_field = self.form_field.prev(),
            KeyCode::Enter => self.submit_form(),
            _ if self.form_field == FormField::Type => {
                if matches!(code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    self.form_type = self.form_type.toggle();
                }
            }
            _ => {
                let buf = match self.form_field {
                    FormField::Name => &mut self.form_name,
                    FormField::MaxHp => &mut self.form_hp,
                    FormField::Initiative => &mut self.form_init,
                    FormField::Type => return true,
                };
                edit_buffer(buf, code);
            }
        }
        true
    }

    fn submit_form(&mut self) {
        let result = self.tracker.add_from_form(
            self.form_name.text(),
            self.form_hp.text(),
            self.form_init.text(),
            self.form_type,
        );
        match result {
            Ok(id) => {
                let name = self.name_of(&id);
                self.notify(format!("Added {name}"));
                // Keep the type so a batch of monsters can be entered quickly.
                let kept_type = self.form_type;
                self.reset_form();
                self.form_type = kept_type;
            }
            Err(e) => self.warn(e.to_string()),
        }
    }

    fn reset_form(&mut self) {
        self.form_name.clear();
        self.form_hp.clear();
        self.form_init.clear();
        self.form_type = CombatantType::Player;
        self.form_field = FormField::Name;
    }

    fn handle_amount(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.mode = Mode::Roster,
            KeyCode::Char('r') if self.mode == Mode::Damage => {
                self.modifier = self.modifier.select(ManualModifier::Resistant);
            }
            KeyCode::Char('v') if self.mode == Mode::Damage => {
                self.modifier = self.modifier.select(ManualModifier::Vulnerable);
            }
            KeyCode::Enter => self.submit_amount(),
            _ => edit_buffer(&mut self.amount, code),
        }
        true
    }

    fn submit_amount(&mut self) {
        let Some(id) = self.selected_id() else {
            self.mode = Mode::Roster;
            return;
        };
        let result = match self.mode {
            Mode::Damage => self.tracker.apply_damage(&id, self.amount.text(), self.modifier),
            _ => self.tracker.apply_healing(&id, self.amount.text()),
        };
        match result {
            Ok(Some(change)) => {
                let name = self.name_of(&id);
                let verb = if self.mode == Mode::Damage { "takes" } else { "heals" };
                self.notify(format!(
                    "{name} {verb} {} ({} → {})",
                    change.amount, change.before, change.after
                ));
                self.modifier = ManualModifier::Normal;
                self.mode = Mode::Roster;
            }
            Ok(None) => self.mode = Mode::Roster,
            // Stay in the prompt so the entry can be corrected.
            Err(e) => self.warn(e.to_string()),
        }
    }

    /// Marked combatants in turn order, or the selection when nothing is marked.
    fn typed_targets(&self) -> Vec<String> {
        if self.marked.is_empty() {
            return self.selected_id().into_iter().collect();
        }
        self.tracker
            .effective_order()
            .into_iter()
            .filter(|id| self.marked.contains(id))
            .collect()
    }

    fn handle_typed(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.mode = Mode::Roster,
            KeyCode::Tab | KeyCode::BackTab => {
                self.typed_field = match self.typed_field {
                    TypedField::Amount => TypedField::DamageType,
                    TypedField::DamageType => TypedField::Amount,
                };
            }
            KeyCode::Enter => self.submit_typed(),
            _ => match self.typed_field {
                TypedField::Amount => edit_buffer(&mut self.amount, code),
                TypedField::DamageType => edit_buffer(&mut self.damage_type, code),
            },
        }
        true
    }

    fn submit_typed(&mut self) {
        let targets = self.typed_targets();
        let damage_type = self.damage_type.text().trim().to_string();
        match self
            .tracker
            .apply_typed_damage(&targets, self.amount.text(), &damage_type)
        {
            Ok(hits) => {
                let summary: Vec<String> = hits
                    .iter()
                    .map(|hit| {
                        let name = self.name_of(&hit.combatant_id);
                        match hit.response {
                            DamageResponse::Immune => format!("{name} immune"),
                            DamageResponse::Resistant => format!("{name} -{} (resists)", hit.change.delta()),
                            DamageResponse::Vulnerable => {
                                format!("{name} -{} (vulnerable)", hit.change.delta())
                            }
                            DamageResponse::Normal => format!("{name} -{}", hit.change.delta()),
                        }
                    })
                    .collect();
                let label = if damage_type.is_empty() { "untyped" } else { damage_type.as_str() };
                self.notify(format!("{label}: {}", summary.join(", ")));
                self.marked.clear();
                self.mode = Mode::Roster;
            }
            Err(e) => self.warn(e.to_string()),
        }
    }

    fn handle_initiative(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.mode = Mode::Roster,
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    if self.tracker.update_initiative_text(&id, self.initiative.text()) {
                        // The roster re-sorts; keep the same combatant selected.
                        if let Some(pos) = self.tracker.effective_order().iter().position(|o| *o == id) {
                            self.selected = pos;
                        }
                    } else {
                        self.warn(format!("Invalid initiative: {}", self.initiative.text().trim()));
                    }
                }
                self.mode = Mode::Roster;
            }
            _ => edit_buffer(&mut self.initiative, code),
        }
        true
    }

    fn handle_detail(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.mode = Mode::Roster,
            KeyCode::Enter => self.submit_detail(),
            _ => edit_buffer(&mut self.detail, code),
        }
        true
    }

    fn submit_detail(&mut self) {
        let Some(id) = self.selected_id() else {
            self.mode = Mode::Roster;
            return;
        };
        let text = self.detail.text().to_string();
        let patch = match self.mode {
            Mode::Rename => CombatantPatch {
                name: Some(text),
                ..CombatantPatch::default()
            },
            _ => CombatantPatch {
                notes: Some(text.trim().to_string()),
                ..CombatantPatch::default()
            },
        };
        match self.tracker.update_details(&id, patch) {
            Ok(_) => {
                self.notify(format!("Updated {}", self.name_of(&id)));
                self.mode = Mode::Roster;
            }
            // An empty name keeps the prompt open.
            Err(e) => self.warn(e.to_string()),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Rendering
    // ────────────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Combat Tracker");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(2), // Turn header + hints
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Notice
        ])
        .split(inner);

        self.render_header(frame, rows[0]);

        let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        self.render_roster(frame, cols[0]);

        let right = Layout::vertical([
            Constraint::Min(6),
            Constraint::Length(HISTORY_ROWS as u16 + 2),
        ])
        .split(cols[1]);
        self.render_detail(frame, right[0]);
        self.render_history(frame, right[1]);

        self.render_notice(frame, rows[2]);

        match self.mode {
            Mode::AddForm => self.render_form(frame, inner),
            Mode::Damage | Mode::Heal | Mode::Initiative | Mode::Rename | Mode::Notes => {
                self.render_amount_prompt(frame, inner)
            }
            Mode::TypedDamage => self.render_typed_prompt(frame, inner),
            Mode::Roster => {
                if let (true, Some(summary)) = (self.tracker.stats_visible(), self.tracker.stats()) {
                    render_stats(frame, inner, summary);
                }
            }
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let status = match self.tracker.active_turn() {
            Some(active) => {
                let name = self
                    .tracker
                    .active_combatant()
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                let elapsed = self
                    .tracker
                    .elapsed()
                    .map(|d| format_duration_ms(d.num_milliseconds()))
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(format!(" Round {} ", active.round), theme::title()),
                    Span::styled("│ ", theme::dim()),
                    Span::styled(
                        format!("Turn {} ", self.tracker.turn_number().unwrap_or(1)),
                        theme::muted(),
                    ),
                    Span::styled(
                        name,
                        Style::default()
                            .fg(theme::PRIMARY_LIGHT)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" │ ", theme::dim()),
                    Span::styled(elapsed, Style::default().fg(theme::ACCENT)),
                ])
            }
            None => Line::from(Span::styled(" Not in combat", theme::muted())),
        };

        let hints: &[(&str, &str)] = if self.tracker.is_in_turn() {
            &[
                ("Space", "next"),
                ("e", "end"),
                ("d", "dmg"),
                ("h", "heal"),
                ("t", "typed"),
                ("m", "mark"),
                ("a", "add"),
                ("x", "del"),
                ("K/J", "move"),
                ("q", "quit"),
            ]
        } else {
            &[
                ("s", "start"),
                ("a", "add"),
                ("d", "dmg"),
                ("h", "heal"),
                ("t", "typed"),
                ("i", "init"),
                ("c/N", "edit"),
                ("K/J", "move"),
                ("o", "auto"),
                ("r/R", "reset"),
                ("M/P/X", "clear"),
                ("q", "quit"),
            ]
        };
        frame.render_widget(Paragraph::new(vec![status, hint_line(hints)]), area);
    }

    fn render_roster(&self, frame: &mut Frame, area: Rect) {
        let title = if self.tracker.has_manual_order() {
            " Initiative (manual) "
        } else {
            " Initiative "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let ordered = self.tracker.ordered_combatants();
        if ordered.is_empty() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::raw(""),
                    Line::from(vec![
                        Span::styled(" No combatants. Press ", theme::dim()),
                        Span::styled("a", theme::key_hint()),
                        Span::styled(" to add one.", theme::dim()),
                    ]),
                ]),
                inner,
            );
            return;
        }

        let active_id = self.tracker.active_turn().map(|a| a.combatant_id.as_str());
        let lines: Vec<Line> = ordered
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let is_active = active_id == Some(c.id.as_str());
                let is_selected = i == self.selected;
                let prefix = match (is_selected, is_active) {
                    (true, true) => "▸▶",
                    (false, true) => " ▶",
                    (true, false) => "▸ ",
                    (false, false) => "  ",
                };
                let mark = if self.marked.contains(&c.id) { "•" } else { " " };

                let name_style = if c.is_down() {
                    Style::default()
                        .fg(theme::TEXT_DIM)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else if is_active {
                    theme::title()
                } else if is_selected {
                    Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme::TEXT)
                };

                Line::from(vec![
                    Span::styled(prefix, Style::default().fg(theme::ACCENT)),
                    Span::styled(mark, Style::default().fg(theme::WARNING)),
                    Span::styled(
                        format!("{:>3} ", c.initiative),
                        Style::default().fg(theme::PRIMARY_LIGHT),
                    ),
                    Span::styled(
                        truncate_name(&c.name, (inner.width as usize).saturating_sub(18)),
                        name_style,
                    ),
                    hp_span(c),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Detail");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(c) = self.selected_id().and_then(|id| self.tracker.get(&id)) else {
            frame.render_widget(
                Paragraph::new(Span::styled(" No combatant selected", theme::dim())),
                inner,
            );
            return;
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!(" {}", c.name),
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({})", c.combatant_type.label()),
                Style::default().fg(theme::type_color(c.combatant_type)),
            ),
        ])];

        let ratio = c.hp_ratio();
        let color = theme::hp_color(ratio);
        let bar_width = (inner.width as usize).saturating_sub(16).min(30);
        let filled = ((ratio * bar_width as f64) as usize).min(bar_width);
        lines.push(Line::from(vec![
            Span::styled(" HP: ", theme::muted()),
            Span::styled(
                format!("{}/{}", c.current_hp, c.max_hp),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
            Span::styled("░".repeat(bar_width - filled), theme::dim()),
        ]));

        let mut stat_spans = vec![
            Span::styled(" Init: ", theme::muted()),
            Span::styled(
                c.initiative.to_string(),
                Style::default().fg(theme::PRIMARY_LIGHT),
            ),
        ];
        if let Some(ac) = c.armor_class {
            stat_spans.push(Span::styled("  AC: ", theme::muted()));
            stat_spans.push(Span::styled(ac.to_string(), Style::default().fg(theme::INFO)));
        }
        lines.push(Line::from(stat_spans));

        for (label, list) in [
            ("Immune", &c.defenses.damage_immunities),
            ("Resists", &c.defenses.damage_resistances),
            ("Vulnerable", &c.defenses.damage_vulnerabilities),
        ] {
            if !list.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {label}: "), theme::muted()),
                    Span::styled(list.join(", "), Style::default().fg(theme::WARNING)),
                ]));
            }
        }

        if !c.tags.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(" Tags: ", theme::muted()),
                Span::styled(c.tags.join(", "), Style::default().fg(theme::TEXT)),
            ]));
        }
        if !c.notes.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(" Notes: ", theme::muted()),
                Span::styled(c.notes.as_str(), Style::default().fg(theme::TEXT)),
            ]));
        }

        if let Some(turns) = self.tracker.stats().and_then(|s| s.for_combatant(&c.id)) {
            lines.push(Line::from(vec![
                Span::styled(" Turns: ", theme::muted()),
                Span::styled(
                    format!(
                        "{} · avg {} · longest {}",
                        turns.turn_count,
                        format_duration_ms(turns.average_duration_ms.round() as i64),
                        format_duration_ms(turns.longest_turn_ms)
                    ),
                    Style::default().fg(theme::TEXT),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Turn History");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let history = self.tracker.history();
        if history.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" No turns yet", theme::dim())),
                inner,
            );
            return;
        }

        let lines: Vec<Line> = history
            .iter()
            .rev()
            .take(HISTORY_ROWS)
            .map(|entry| {
                Line::from(vec![
                    Span::styled(format!(" R{:<3}", entry.round), theme::dim()),
                    Span::styled(
                        format!("{:>8} ", format_duration_ms(entry.duration_ms)),
                        Style::default().fg(theme::PRIMARY_LIGHT),
                    ),
                    Span::styled(entry.combatant_name.as_str(), Style::default().fg(theme::TEXT)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_notice(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = &self.notice {
            let color = if notice.is_error { theme::ERROR } else { theme::SUCCESS };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {}", notice.text),
                    Style::default().fg(color),
                )),
                area,
            );
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(50, 60, area);
        frame.render_widget(Clear, modal);
        let block = theme::block_focused("Add Combatant").style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let chunks = Layout::vertical([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Max HP
            Constraint::Length(3), // Initiative
            Constraint::Length(1), // Type
            Constraint::Length(1),
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let fields = [
            ("Name", &self.form_name, FormField::Name),
            ("Max HP", &self.form_hp, FormField::MaxHp),
            ("Initiative", &self.form_init, FormField::Initiative),
        ];
        for (chunk, (label, buf, field)) in chunks.iter().zip(fields) {
            let focused = self.form_field == field;
            let block = if focused {
                theme::block_focused(label)
            } else {
                theme::block_default(label)
            };
            let field_inner = block.inner(*chunk);
            frame.render_widget(block, *chunk);
            frame.render_widget(
                Paragraph::new(Span::styled(buf.text(), Style::default().fg(theme::TEXT))),
                field_inner,
            );
            if focused {
                frame.set_cursor_position((field_inner.x + buf.cursor_column() as u16, field_inner.y));
            }
        }

        let type_focused = self.form_field == FormField::Type;
        let type_spans: Vec<Span> = [CombatantType::Player, CombatantType::Monster]
            .into_iter()
            .map(|ct| {
                let style = if ct == self.form_type {
                    Style::default()
                        .fg(theme::type_color(ct))
                        .add_modifier(Modifier::BOLD)
                } else {
                    theme::dim()
                };
                Span::styled(format!(" [{}]", ct.label()), style)
            })
            .collect();
        let mut type_line = vec![Span::styled(
            " Type:",
            if type_focused { theme::heading() } else { theme::muted() },
        )];
        type_line.extend(type_spans);
        frame.render_widget(Paragraph::new(Line::from(type_line)), chunks[3]);

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("Enter", "add"),
                ("Tab", "field"),
                ("Space", "type"),
                ("Esc", "done"),
            ])),
            chunks[5],
        );
    }

    fn render_amount_prompt(&self, frame: &mut Frame, area: Rect) {
        let (label, color, buf) = match self.mode {
            Mode::Damage => ("Damage", theme::ERROR, &self.amount),
            Mode::Heal => ("Heal", theme::SUCCESS, &self.amount),
            Mode::Rename => ("Rename", theme::INFO, &self.detail),
            Mode::Notes => ("Notes", theme::PRIMARY, &self.detail),
            _ => ("Initiative", theme::PRIMARY_LIGHT, &self.initiative),
        };
        let target = self
            .selected_id()
            .map(|id| self.name_of(&id))
            .unwrap_or_default();

        let modal = prompt_rect(area, 5);
        frame.render_widget(Clear, modal);
        let block = Block::default()
            .title(format!(" {label}: {target} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let mut lines = vec![Line::from(Span::styled(
            buf.text(),
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
        ))];
        if self.mode == Mode::Damage {
            lines.push(Line::from(vec![
                Span::styled("r", theme::key_hint()),
                Span::styled(":resist ", theme::dim()),
                Span::styled("v", theme::key_hint()),
                Span::styled(":vuln ", theme::dim()),
                Span::styled(
                    self.modifier.label(),
                    if self.modifier == ManualModifier::Normal {
                        theme::muted()
                    } else {
                        Style::default()
                            .fg(theme::WARNING)
                            .add_modifier(Modifier::BOLD)
                    },
                ),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), inner);
        frame.set_cursor_position((inner.x + buf.cursor_column() as u16, inner.y));
    }

    fn render_typed_prompt(&self, frame: &mut Frame, area: Rect) {
        let targets = self.typed_targets();
        let modal = prompt_rect(area, 6);
        frame.render_widget(Clear, modal);
        let block = Block::default()
            .title(format!(" Typed damage: {} target(s) ", targets.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ERROR))
            .style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let field_style = |field: TypedField| {
            if self.typed_field == field {
                theme::heading()
            } else {
                theme::muted()
            }
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("Amount: ", field_style(TypedField::Amount)),
                Span::styled(self.amount.text(), Style::default().fg(theme::TEXT)),
            ]),
            Line::from(vec![
                Span::styled("Type:   ", field_style(TypedField::DamageType)),
                Span::styled(self.damage_type.text(), Style::default().fg(theme::TEXT)),
            ]),
            Line::raw(""),
            hint_line(&[("Tab", "field"), ("Enter", "apply"), ("Esc", "cancel")]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        let (buf, row) = match self.typed_field {
            TypedField::Amount => (&self.amount, 0),
            TypedField::DamageType => (&self.damage_type, 1),
        };
        frame.set_cursor_position((inner.x + 8 + buf.cursor_column() as u16, inner.y + row));
    }
}

fn render_stats(frame: &mut Frame, area: Rect, summary: &CombatStatsSummary) {
    let modal = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal);
    let block = theme::block_focused("Combat Statistics").style(Style::default().bg(theme::BG_BASE));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let mut lines = vec![Line::raw("")];
    if summary.is_empty() {
        lines.push(Line::from(Span::styled("No turns were recorded", theme::muted())));
    } else {
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<18}"), theme::muted()),
                Span::styled(value, Style::default().fg(theme::TEXT)),
            ])
        };
        lines.push(row("Total time", format_duration_ms(summary.total_duration_ms)));
        lines.push(row("Turns", summary.total_turns.to_string()));
        if let Some(avg) = summary.average_turn_duration_ms {
            lines.push(row("Average turn", format_duration_ms(avg.round() as i64)));
        }
        if let Some(turn) = &summary.longest_turn {
            lines.push(row(
                "Longest turn",
                format!("{} ({})", format_duration_ms(turn.duration_ms), turn.combatant_name),
            ));
        }
        if let Some(turn) = &summary.fastest_turn {
            lines.push(row(
                "Fastest turn",
                format!("{} ({})", format_duration_ms(turn.duration_ms), turn.combatant_name),
            ));
        }
        if let Some(slow) = &summary.slowest_average {
            lines.push(row(
                "Slowest average",
                format!(
                    "{} ({})",
                    format_duration_ms(slow.average_duration_ms.round() as i64),
                    slow.combatant_name
                ),
            ));
        }
        if let Some(quick) = &summary.quickest_average {
            lines.push(row(
                "Quickest average",
                format!(
                    "{} ({})",
                    format_duration_ms(quick.average_duration_ms.round() as i64),
                    quick.combatant_name
                ),
            ));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{:<20}{:>6}{:>10}{:>10}{:>10}", "Combatant", "Turns", "Total", "Average", "Longest"),
            theme::heading(),
        )));
        for c in &summary.per_combatant {
            lines.push(Line::from(Span::styled(
                format!(
                    "{:<20}{:>6}{:>10}{:>10}{:>10}",
                    truncate_name(&c.combatant_name, 19),
                    c.turn_count,
                    format_duration_ms(c.total_duration_ms),
                    format_duration_ms(c.average_duration_ms.round() as i64),
                    format_duration_ms(c.longest_turn_ms),
                ),
                Style::default().fg(theme::TEXT),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines.push(hint_line(&[("Enter/Esc", "close")]));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}

// ============================================================================
// Helpers
// ============================================================================

fn edit_buffer(buf: &mut InputBuffer, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            buf.insert_char(c);
        }
        KeyCode::Backspace => buf.backspace(),
        KeyCode::Delete => buf.delete(),
        KeyCode::Left => buf.move_left(),
        KeyCode::Right => buf.move_right(),
        KeyCode::Home => buf.move_home(),
        KeyCode::End => buf.move_end(),
        _ => {}
    }
}

fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let spans: Vec<Span<'static>> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(key.to_string(), theme::key_hint()),
                Span::styled(format!(":{action} "), theme::dim()),
            ]
        })
        .collect();
    Line::from(spans)
}

/// A fixed-height prompt centered in `area`.
fn prompt_rect(area: Rect, height: u16) -> Rect {
    let width = 44.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn hp_span(c: &Combatant) -> Span<'static> {
    let color = theme::hp_color(c.hp_ratio());
    let text = if c.is_down() {
        format!(" {}/{} DOWN", c.current_hp, c.max_hp)
    } else {
        format!(" {}/{}", c.current_hp, c.max_hp)
    };
    Span::styled(text, Style::default().fg(color))
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else if max > 1 {
        let mut cut: String = name.chars().take(max - 1).collect();
        cut.push('…');
        cut
    } else {
        name.chars().take(max).collect()
    }
}
