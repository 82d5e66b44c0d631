//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use powergrid_sim::sim::clock::SimTime;
use powergrid_sim::sim::optimizer::{Optimizer, OptimizerConfig};
use powergrid_sim::sim::types::{DemandProfile, GenerationMix, GridSnapshot, TariffSet};

/// Pre-dawn thermal-heavy snapshot: 625 MW supply against 268 MW demand.
pub fn oversupply_snapshot() -> GridSnapshot {
    GridSnapshot {
        generation: GenerationMix {
            coal: 250.0,
            gas: 180.0,
            hydro: 120.0,
            solar: 0.0,
            wind: 75.0,
            battery: 0.0,
        },
        demand: DemandProfile {
            residential: 72.0,
            commercial: 34.0,
            industrial: 162.0,
        },
        dsm: 10.0,
        tariffs: TariffSet {
            residential: 4.5,
            commercial: 6.2,
            industrial: 5.8,
        },
        frequency: 50.0,
    }
}

/// Hydro + wind exactly matching 300 MW of demand, no DSM.
pub fn balanced_snapshot() -> GridSnapshot {
    GridSnapshot {
        generation: GenerationMix {
            hydro: 150.0,
            wind: 150.0,
            ..GenerationMix::default()
        },
        demand: DemandProfile {
            residential: 100.0,
            commercial: 100.0,
            industrial: 100.0,
        },
        dsm: 0.0,
        tariffs: TariffSet::default(),
        frequency: 50.0,
    }
}

/// Short annealing schedule for fast tests.
pub fn quick_config(restarts: usize) -> OptimizerConfig {
    OptimizerConfig {
        restarts,
        iterations: 300,
        ..OptimizerConfig::default()
    }
}

/// Seeded optimizer with a short schedule.
pub fn seeded_optimizer(seed: u64, restarts: usize) -> Optimizer {
    Optimizer::new(quick_config(restarts)).with_seed(seed)
}

pub fn evening() -> SimTime {
    SimTime::new(19, 0)
}
