//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::types::ControlUpdate;

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Char('s') => app.cycle_speed(),
        KeyCode::Char('n') => app.skip_forward(),
        KeyCode::Char('a') => app.auto_adjust(),
        KeyCode::Char('b') => app.adjust(ControlUpdate::ToggleBatteryMode),
        KeyCode::Up => app.nudge_coal(1.0),
        KeyCode::Down => app.nudge_coal(-1.0),
        KeyCode::Right => app.nudge_gas(1.0),
        KeyCode::Left => app.nudge_gas(-1.0),
        KeyCode::Char('1') => app.switch_preset("baseline"),
        KeyCode::Char('2') => app.switch_preset("evening_peak"),
        KeyCode::Char('3') => app.switch_preset("renewable_heavy"),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }
}
