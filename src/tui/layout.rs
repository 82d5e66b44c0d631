//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use crate::sim::frequency::FrequencyModel;

use super::runtime::App;
use super::style;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // chart
            Constraint::Length(3), // score gauge
            Constraint::Length(6), // score panel
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_score_gauge(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

/// Header bar: preset, simulated time, speed, play state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.sim.is_playing() {
        ("▶", "PLAYING")
    } else {
        ("‖", "PAUSED")
    };

    let header = Line::from(vec![
        Span::styled(
            " POWERGRID ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.preset_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ {} ({:.0}% of day) │ {} │ {} {} ",
            app.sim.now(),
            app.sim.now().day_fraction() * 100.0,
            app.sim.speed(),
            state_icon,
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Supply vs demand over the tick history.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.sim.history();
    let supply_data: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.supply_mw))
        .collect();
    let demand_data: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.demand_mw))
        .collect();

    let y_bounds = style::auto_bounds_y(&supply_data, &demand_data);
    let x_hi = (history.len().max(2) - 1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Supply")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::SUPPLY_COLOR))
            .data(&supply_data),
        Dataset::default()
            .name("Demand")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::DEMAND_COLOR))
            .data(&demand_data),
    ];

    let x_label_lo = history
        .iter()
        .next()
        .map_or_else(String::new, |r| r.time.to_string());
    let x_label_hi = history.latest().map_or_else(String::new, |r| r.time.to_string());

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Supply vs Demand ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("time")
                .bounds([0.0, x_hi])
                .labels(vec![x_label_lo, x_label_hi]),
        )
        .y_axis(
            Axis::default()
                .title("MW")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.0}", y_bounds[0]),
                    format!("{:.0}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Total score gauge colored by grade.
fn render_score_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let score = app.score();
    let grade = score.grade();
    let gauge = Gauge::default()
        .block(Block::default().title(" Score ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(style::grade_color(grade)))
        .ratio((f64::from(score.total_score) / 1000.0).clamp(0.0, 1.0))
        .label(format!("{} / 1000  grade {grade}", score.total_score));
    frame.render_widget(gauge, area);
}

/// Score components, system status, and current settings.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let s = app.score();
    let status = s.status();
    let settings = app.sim.settings();
    let lines = vec![
        Line::from(vec![
            Span::raw("  status "),
            Span::styled(
                status.to_string(),
                Style::default()
                    .fg(style::status_color(status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  supply={:.0} MW  demand={:.0} MW  {:.2} Hz ({})",
                s.total_supply,
                s.total_demand,
                s.frequency,
                app.sim.frequency_model().name(),
            )),
        ]),
        Line::from(format!(
            "  stability={:>5.1}  economic={:>5.1}  environment={:>5.1}  demand={:>5.1}",
            s.stability_score, s.economic_score, s.environmental_score, s.demand_score,
        )),
        Line::from(format!(
            "  coal={:.0} gas={:.0} hydro={:.0} battery={:.0} ({})  dsm={:.0}%",
            settings.coal,
            settings.gas,
            settings.hydro,
            settings.battery_power,
            settings.battery_mode,
            settings.dsm,
        )),
        Line::from(format!(
            "  renewables={:.1}%  emissions={:.1} kg  margin={:.0}",
            s.renewable_percentage, s.total_emissions, s.profit_margin,
        )),
    ];

    let block = Block::default().title(" Grid ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints, or the latest notification.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.message {
        Some(ref msg) => Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(style::MESSAGE_FG),
        )),
        None => Line::from(Span::styled(
            " q:Quit  Space:Play  s:Speed  n:+15min  a:Auto  ↑↓:Coal  ←→:Gas  b:Battery  1/2/3:Preset  r:Restart",
            Style::default().fg(style::FOOTER_FG),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
