//! Property tests for model and scoring invariants.

use proptest::prelude::*;

use powergrid_sim::devices::{Device, DeviceContext, SolarFarm, WindFarm};
use powergrid_sim::sim::clock::{MINUTES_PER_DAY, SimTime};
use powergrid_sim::sim::engine::Simulation;
use powergrid_sim::sim::history::HISTORY_CAPACITY;
use powergrid_sim::sim::score::calculate_score;
use powergrid_sim::sim::types::{ControlSettings, DemandProfile, GenerationMix, GridSnapshot, TariffSet};

fn time_strategy() -> impl Strategy<Value = SimTime> {
    (0..MINUTES_PER_DAY).prop_map(SimTime::from_minutes)
}

fn snapshot_strategy() -> impl Strategy<Value = GridSnapshot> {
    let mw = -1e6..1e6_f64;
    (
        (mw.clone(), mw.clone(), mw.clone(), mw.clone(), mw.clone(), mw),
        (0.0..1e6_f64, 0.0..1e6_f64, 0.0..1e6_f64),
        -100.0..100.0_f64,
        (0.0..20.0_f64, 0.0..20.0_f64, 0.0..20.0_f64),
        40.0..60.0_f64,
    )
        .prop_map(|(g, d, dsm, t, frequency)| GridSnapshot {
            generation: GenerationMix {
                coal: g.0,
                gas: g.1,
                hydro: g.2,
                solar: g.3,
                wind: g.4,
                battery: g.5,
            },
            demand: DemandProfile {
                residential: d.0,
                commercial: d.1,
                industrial: d.2,
            },
            dsm,
            tariffs: TariffSet {
                residential: t.0,
                commercial: t.1,
                industrial: t.2,
            },
            frequency,
        })
}

proptest! {
    #[test]
    fn solar_is_zero_outside_daylight(time in time_strategy(), nameplate in 0.0..200.0_f64) {
        let out = SolarFarm::new(nameplate).power_mw(&DeviceContext::new(time));
        let tod = time.time_of_day();
        if !(6.0..18.0).contains(&tod) {
            prop_assert_eq!(out, 0.0);
        }
        prop_assert!(out >= 0.0);
        prop_assert!(out <= nameplate.round());
    }

    #[test]
    fn wind_stays_within_band(time in time_strategy(), nameplate in 0.0..150.0_f64) {
        let out = WindFarm::new(nameplate).power_mw(&DeviceContext::new(time));
        prop_assert!(out >= 0.2 * nameplate - 0.5);
        prop_assert!(out <= nameplate + 0.5);
    }

    #[test]
    fn components_are_clamped(snapshot in snapshot_strategy()) {
        let s = calculate_score(&snapshot);
        prop_assert!((0.0..=350.0).contains(&s.stability_score));
        prop_assert!((0.0..=250.0).contains(&s.economic_score));
        prop_assert!((0.0..=250.0).contains(&s.environmental_score));
        prop_assert!((0.0..=150.0).contains(&s.demand_score));
        prop_assert!((0..=1000).contains(&s.total_score));
        prop_assert!(s.is_finite());
    }

    #[test]
    fn scoring_is_pure(snapshot in snapshot_strategy()) {
        prop_assert_eq!(calculate_score(&snapshot), calculate_score(&snapshot));
    }

    #[test]
    fn history_never_exceeds_capacity(ticks in 0usize..200, start in time_strategy()) {
        let mut sim = Simulation::new(ControlSettings::default(), start);
        sim.run(ticks);
        prop_assert!(sim.history().len() <= HISTORY_CAPACITY);
        prop_assert_eq!(sim.history().len(), ticks.min(HISTORY_CAPACITY));
    }
}
