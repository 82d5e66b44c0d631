//! Live terminal UI for the grid simulator.
//!
//! Feature-gated behind `tui`. Launch with `--tui` on the CLI.

mod controls;
mod layout;
/// Application state and background optimization.
pub mod runtime;
mod style;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::ScenarioConfig;
use crate::error::GridResult;

use runtime::App;

/// Upper bound on input polling so background results are picked up promptly.
const MAX_POLL: Duration = Duration::from_millis(100);

/// Launches the TUI event loop for a validated scenario shown as `label`.
///
/// Sets up the terminal (raw mode, alternate screen), runs the event loop,
/// and restores the terminal on exit.
///
/// # Errors
///
/// Returns an IO error if the terminal cannot be set up or drawn.
pub fn run(scenario: ScenarioConfig, label: &str) -> GridResult<()> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
    };

    let mut app = App::new(scenario, label);
    let result = event_loop(&mut terminal, &mut app);

    // Teardown, always restore terminal state
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result.map_err(Into::into)
}

/// Core event loop: poll input, apply finished searches, advance, draw.
fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| layout::render(frame, app))?;

        if app.quit {
            return Ok(());
        }

        let timeout = app.sim.tick_interval();
        let deadline = app.last_tick + timeout;
        let poll_timeout = deadline.saturating_duration_since(Instant::now()).min(MAX_POLL);

        if event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                controls::handle_key(app, key);
            }
        }

        app.poll_optimizer();

        if app.last_tick.elapsed() >= timeout {
            app.tick();
            app.last_tick = Instant::now();
        }
    }
}
