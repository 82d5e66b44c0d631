//! Time-driven generation and demand components.

/// Grid battery with charge/discharge mode.
pub mod battery;
/// Sector demand curves and the combined demand model.
pub mod demand;
/// Solar generation on a daylight curve.
pub mod solar;
pub mod types;
/// Wind generation on a daily variability curve.
pub mod wind;

// Re-export the main types for convenience
pub use battery::{Battery, BatteryMode};
pub use demand::{DemandModel, Sector, SectorLoad};
pub use solar::SolarFarm;
pub use types::Device;
pub use types::DeviceContext;
pub use wind::WindFarm;
