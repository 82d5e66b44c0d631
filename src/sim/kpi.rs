//! Post-hoc KPI computation over tick records.

use std::fmt;

use serde::Serialize;

use super::history::TickRecord;
use super::score::BALANCE_TOLERANCE;

/// Aggregate indicators derived from a run of tick records.
///
/// Computed post-hoc from the records so the report always agrees with the
/// exported data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub ticks: usize,
    pub mean_score: f64,
    pub min_score: i32,
    pub max_score: i32,
    /// MW.
    pub peak_supply_mw: f64,
    /// MW.
    pub peak_demand_mw: f64,
    /// Mean of `|supply - demand|` (MW).
    pub mean_abs_imbalance_mw: f64,
    /// kg CO2 summed over all ticks.
    pub total_emissions: f64,
    /// Generation cost summed over all ticks.
    pub total_cost: f64,
    pub mean_renewable_pct: f64,
    /// Ticks whose supply/demand mismatch exceeded the 3% tolerance.
    pub imbalance_violation_count: usize,
}

impl KpiReport {
    /// Computes all KPIs from a slice of records.
    ///
    /// # Returns
    ///
    /// A `KpiReport` with all fields populated; zeros for an empty slice.
    pub fn from_records(records: &[TickRecord]) -> Self {
        if records.is_empty() {
            return Self {
                ticks: 0,
                mean_score: 0.0,
                min_score: 0,
                max_score: 0,
                peak_supply_mw: 0.0,
                peak_demand_mw: 0.0,
                mean_abs_imbalance_mw: 0.0,
                total_emissions: 0.0,
                total_cost: 0.0,
                mean_renewable_pct: 0.0,
                imbalance_violation_count: 0,
            };
        }

        let n = records.len() as f64;
        let mut score_sum = 0.0_f64;
        let mut min_score = i32::MAX;
        let mut max_score = i32::MIN;
        let mut peak_supply = 0.0_f64;
        let mut peak_demand = 0.0_f64;
        let mut imbalance_sum = 0.0_f64;
        let mut emissions = 0.0_f64;
        let mut cost = 0.0_f64;
        let mut renewable_sum = 0.0_f64;
        let mut violations = 0_usize;

        for r in records {
            score_sum += f64::from(r.score);
            min_score = min_score.min(r.score);
            max_score = max_score.max(r.score);
            peak_supply = peak_supply.max(r.supply_mw);
            peak_demand = peak_demand.max(r.demand_mw);
            imbalance_sum += r.imbalance_mw().abs();
            emissions += r.emissions;
            cost += r.cost;
            renewable_sum += r.renewable_pct;

            if r.imbalance_mw().abs() / r.demand_mw.max(1.0) > BALANCE_TOLERANCE {
                violations += 1;
            }
        }

        Self {
            ticks: records.len(),
            mean_score: score_sum / n,
            min_score,
            max_score,
            peak_supply_mw: peak_supply,
            peak_demand_mw: peak_demand,
            mean_abs_imbalance_mw: imbalance_sum / n,
            total_emissions: emissions,
            total_cost: cost,
            mean_renewable_pct: renewable_sum / n,
            imbalance_violation_count: violations,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Ticks:                 {}", self.ticks)?;
        writeln!(
            f,
            "Score:                 mean {:.1}, min {}, max {}",
            self.mean_score, self.min_score, self.max_score
        )?;
        writeln!(f, "Peak supply:           {:.0} MW", self.peak_supply_mw)?;
        writeln!(f, "Peak demand:           {:.0} MW", self.peak_demand_mw)?;
        writeln!(f, "Mean |imbalance|:      {:.1} MW", self.mean_abs_imbalance_mw)?;
        writeln!(f, "Total emissions:       {:.1} kg CO2", self.total_emissions)?;
        writeln!(f, "Total cost:            {:.0}", self.total_cost)?;
        writeln!(f, "Mean renewable share:  {:.1}%", self.mean_renewable_pct)?;
        write!(f, "Imbalance violations:  {}", self.imbalance_violation_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::SimTime;

    fn make_record(supply: f64, demand: f64, score: i32) -> TickRecord {
        TickRecord {
            time: SimTime::default(),
            supply_mw: supply,
            demand_mw: demand,
            coal_mw: supply,
            gas_mw: 0.0,
            hydro_mw: 0.0,
            solar_mw: 0.0,
            wind_mw: 0.0,
            battery_mw: 0.0,
            residential_mw: demand,
            commercial_mw: 0.0,
            industrial_mw: 0.0,
            frequency_hz: 50.0,
            emissions: supply * 0.85,
            cost: supply * 300.0,
            renewable_pct: 0.0,
            score,
        }
    }

    #[test]
    fn score_statistics() {
        let records = vec![
            make_record(100.0, 100.0, 400),
            make_record(100.0, 100.0, 600),
            make_record(100.0, 100.0, 500),
        ];
        let kpi = KpiReport::from_records(&records);
        assert_eq!(kpi.ticks, 3);
        assert!((kpi.mean_score - 500.0).abs() < 1e-9);
        assert_eq!(kpi.min_score, 400);
        assert_eq!(kpi.max_score, 600);
    }

    #[test]
    fn imbalance_and_violations() {
        // |imbalance|: 0, 20, 2 -> violations only for 20/100
        let records = vec![
            make_record(100.0, 100.0, 0),
            make_record(120.0, 100.0, 0),
            make_record(98.0, 100.0, 0),
        ];
        let kpi = KpiReport::from_records(&records);
        assert!((kpi.mean_abs_imbalance_mw - 22.0 / 3.0).abs() < 1e-9);
        assert_eq!(kpi.imbalance_violation_count, 1);
        assert_eq!(kpi.peak_supply_mw, 120.0);
    }

    #[test]
    fn totals_are_summed() {
        let records = vec![make_record(100.0, 100.0, 0); 4];
        let kpi = KpiReport::from_records(&records);
        assert!((kpi.total_emissions - 340.0).abs() < 1e-9);
        assert!((kpi.total_cost - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn empty_records() {
        let kpi = KpiReport::from_records(&[]);
        assert_eq!(kpi.ticks, 0);
        assert_eq!(kpi.imbalance_violation_count, 0);
    }
}
