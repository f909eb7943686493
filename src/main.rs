use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use initiative_tracker::config::{AppConfig, ConfigSource};
use initiative_tracker::core::combat::{
    compute_stats, format_duration_ms, Clock, CombatSnapshot, CombatTracker, SystemClock,
};
use initiative_tracker::core::logging;
use initiative_tracker::tui::app::AppState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_source) = AppConfig::load();
    if let ConfigSource::Invalid { path, error } = &config_source {
        eprintln!("Ignoring invalid config at {}: {error}", path.display());
    }

    if std::env::args().nth(1).as_deref() == Some("--report") {
        let _log_guard = logging::init(&config.log_dir());
        config_source.log();
        print_report(&config);
        return Ok(());
    }

    // Initialize logging (file only; the TUI owns stdout)
    let _log_guard = logging::init_tui(&config.log_dir());
    log::info!("{} v{} starting", initiative_tracker::NAME, initiative_tracker::VERSION);
    config_source.log();

    let tracker = load_tracker(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(tracker, &config);
    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if config.combat.autosave {
        let path = config.snapshot_path();
        if let Err(e) = app.tracker().snapshot().save_to_file(&path) {
            tracing::error!(path = %path.display(), error = %e, "Failed to save combat snapshot");
            eprintln!("Could not save combat to {}: {e}", path.display());
        }
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "Terminal loop failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    log::info!("Shutdown complete");
    Ok(())
}

/// Fresh tracker, seeded from the autosave when one exists.
fn load_tracker(config: &AppConfig) -> CombatTracker {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut tracker = CombatTracker::with_clock(clock.clone())
        .with_unknown_label(config.combat.unknown_combatant_label.as_str());

    let path = config.snapshot_path();
    if !config.combat.autosave || !path.exists() {
        return tracker;
    }

    match CombatSnapshot::load_from_file(&path, clock.now()) {
        Ok(report) => {
            for rejected in &report.rejected {
                tracing::warn!(
                    index = rejected.index,
                    error = %rejected.error,
                    "Skipped unreadable combatant record"
                );
            }
            if report.reissued_ids > 0 || report.clamped_hp > 0 || report.dropped_history > 0 {
                tracing::warn!(
                    reissued_ids = report.reissued_ids,
                    clamped_hp = report.clamped_hp,
                    dropped_history = report.dropped_history,
                    "Snapshot needed repairs"
                );
            }
            tracker.load_snapshot(report.snapshot);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable combat snapshot");
        }
    }
    tracker
}

/// Print the autosaved roster and the statistics of its turn history.
fn print_report(config: &AppConfig) {
    let tracker = load_tracker(config);
    if tracker.is_empty() {
        println!("No saved combatants at {}", config.snapshot_path().display());
        return;
    }

    println!("Turn order:");
    for (i, c) in tracker.ordered_combatants().iter().enumerate() {
        println!(
            "{:>3}. {:<24} init {:>3}  HP {}/{}  ({})",
            i + 1,
            c.name,
            c.initiative,
            c.current_hp,
            c.max_hp,
            c.combatant_type.label()
        );
    }

    let stats = compute_stats(tracker.history());
    if stats.is_empty() {
        return;
    }
    println!();
    println!(
        "{} turns, {} total",
        stats.total_turns,
        format_duration_ms(stats.total_duration_ms)
    );
    for c in &stats.per_combatant {
        println!(
            "  {:<24} {:>3} turns  total {:>8}  avg {:>8}  longest {:>8}",
            c.combatant_name,
            c.turn_count,
            format_duration_ms(c.total_duration_ms),
            format_duration_ms(c.average_duration_ms.round() as i64),
            format_duration_ms(c.longest_turn_ms)
        );
    }
}
