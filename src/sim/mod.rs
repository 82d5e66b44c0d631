/// Simulated time of day and playback speed.
pub mod clock;
pub mod engine;
/// Pluggable grid frequency models.
pub mod frequency;
pub mod history;
pub mod kpi;
pub mod optimizer;
pub mod score;
pub mod types;
