//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

use crate::sim::score::{Grade, SystemStatus};

/// Supply line color.
pub const SUPPLY_COLOR: Color = Color::Cyan;
/// Demand line color.
pub const DEMAND_COLOR: Color = Color::Yellow;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Notification text color.
pub const MESSAGE_FG: Color = Color::Magenta;

pub fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::APlus | Grade::A => Color::Green,
        Grade::B => Color::LightGreen,
        Grade::C => Color::Yellow,
        Grade::D => Color::Red,
    }
}

pub fn status_color(status: SystemStatus) -> Color {
    match status {
        SystemStatus::Optimal => Color::Green,
        SystemStatus::Stable => Color::Cyan,
        SystemStatus::Warning => Color::Yellow,
        SystemStatus::Critical => Color::Red,
    }
}

/// Computes Y-axis bounds from chart data points with 10% padding.
pub fn auto_bounds_y(supply: &[(f64, f64)], demand: &[(f64, f64)]) -> [f64; 2] {
    let all = supply.iter().chain(demand.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(1.0);
    let pad = range * 0.1;
    [(min - pad).max(0.0), max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_range() {
        let b = auto_bounds_y(&[(0.0, 100.0)], &[(0.0, 200.0)]);
        assert_eq!(b, [90.0, 210.0]);
    }

    #[test]
    fn empty_bounds_default() {
        assert_eq!(auto_bounds_y(&[], &[]), [0.0, 1.0]);
    }
}
