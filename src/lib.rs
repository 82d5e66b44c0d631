//! Power-grid operations simulator: multi-objective scoring, simulated
//! annealing auto-optimization, and a 15-minute tick driver.

pub mod config;
/// Time-based generation and sector demand models.
pub mod devices;
pub mod error;
pub mod io;
/// Scoring, optimizer, clock, and tick driver.
pub mod sim;
#[cfg(feature = "tui")]
pub mod tui;
