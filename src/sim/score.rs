//! Multi-objective grid scoring.
//!
//! [`calculate_score`] maps a [`GridSnapshot`] to a [`ScoreBreakdown`]. It is
//! pure and deterministic: the optimizer compares candidates by calling it
//! thousands of times and relies on identical inputs giving identical scores.

use std::fmt;

use serde::Serialize;

use super::frequency::NOMINAL_FREQUENCY_HZ;
use super::types::{GenerationMix, GridSnapshot, Source};

/// Fraction of an hour covered by one scoring interval (15 minutes).
pub const INTERVAL_HOURS: f64 = 0.25;

pub const MAX_STABILITY_SCORE: f64 = 350.0;
pub const MAX_ECONOMIC_SCORE: f64 = 250.0;
pub const MAX_ENVIRONMENTAL_SCORE: f64 = 250.0;
pub const MAX_DEMAND_SCORE: f64 = 150.0;

/// Supply/demand mismatch tolerated without a stability penalty.
pub const BALANCE_TOLERANCE: f64 = 0.03;

/// Generation cost in currency per MWh.
pub fn cost_per_mwh(source: Source) -> f64 {
    match source {
        Source::Coal => 1200.0,
        Source::Gas => 1800.0,
        Source::Hydro => 2800.0,
        Source::Solar => 3200.0,
        Source::Wind => 3000.0,
        Source::Battery => 4500.0,
    }
}

/// Emission factor in kg CO2 per MWh-equivalent.
pub fn emission_factor(source: Source) -> f64 {
    match source {
        Source::Coal => 0.85,
        Source::Gas => 0.45,
        Source::Hydro => 0.02,
        Source::Solar => 0.05,
        Source::Wind => 0.01,
        Source::Battery => 0.0,
    }
}

/// How the battery contributes to total supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryAccounting {
    /// Battery magnitude counts as supply in either direction.
    #[default]
    Magnitude,
    /// Signed battery: charging subtracts from supply.
    ChargingAsLoad,
}

/// Scoring options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringRules {
    pub battery_accounting: BatteryAccounting,
}

impl ScoringRules {
    pub fn new(battery_accounting: BatteryAccounting) -> Self {
        Self { battery_accounting }
    }

    /// Aggregate supply in MW under these rules.
    pub fn total_supply(&self, generation: &GenerationMix) -> f64 {
        let non_battery: f64 = generation
            .iter()
            .filter(|(s, _)| *s != Source::Battery)
            .map(|(_, mw)| mw.abs())
            .sum();
        let battery = match self.battery_accounting {
            BatteryAccounting::Magnitude => generation.battery.abs(),
            BatteryAccounting::ChargingAsLoad => generation.battery,
        };
        non_battery + battery
    }

    /// Scores a snapshot.
    pub fn calculate(&self, snapshot: &GridSnapshot) -> ScoreBreakdown {
        let generation = &snapshot.generation;
        let total_supply = self.total_supply(generation);
        let total_demand = snapshot.demand.total();

        let total_cost = generation
            .iter()
            .map(|(s, mw)| mw.abs() * cost_per_mwh(s))
            .sum::<f64>()
            * INTERVAL_HOURS;

        // Tariffs are per kWh; supply is MW.
        let avg_tariff = snapshot.tariffs.average();
        let total_revenue = total_supply * avg_tariff * 1000.0 * INTERVAL_HOURS;

        let total_emissions: f64 = generation
            .iter()
            .map(|(s, mw)| mw.abs() * emission_factor(s))
            .sum();

        let renewable_mw: f64 = generation
            .iter()
            .filter(|(s, _)| s.is_renewable())
            .map(|(_, mw)| mw)
            .sum();
        let renewable_percentage = if total_supply > 0.0 {
            renewable_mw / total_supply * 100.0
        } else {
            0.0
        };

        let balance_ratio = (total_supply - total_demand).abs() / total_demand.max(1.0);
        let frequency_deviation = (snapshot.frequency - NOMINAL_FREQUENCY_HZ).abs();

        let profit_margin = total_revenue - total_cost;
        let cost_efficiency = if total_supply > 0.0 {
            total_cost / total_supply
        } else {
            5000.0
        };

        let stability_score = stability_score(balance_ratio, frequency_deviation);
        let economic_score = economic_score(profit_margin, cost_efficiency);
        let environmental_score = environmental_score(total_emissions, renewable_percentage);
        let demand_score = demand_score(snapshot.dsm, avg_tariff);

        let total_score =
            (stability_score + economic_score + environmental_score + demand_score).round() as i32;

        ScoreBreakdown {
            total_score,
            stability_score,
            economic_score,
            environmental_score,
            demand_score,
            total_supply,
            total_demand,
            total_cost,
            total_revenue,
            profit_margin,
            total_emissions,
            renewable_percentage,
            balance_ratio,
            frequency: snapshot.frequency,
        }
    }
}

/// Scores a snapshot with the default rules.
pub fn calculate_score(snapshot: &GridSnapshot) -> ScoreBreakdown {
    ScoringRules::default().calculate(snapshot)
}

/// Grid stability component in `[0, 350]`.
pub fn stability_score(balance_ratio: f64, frequency_deviation: f64) -> f64 {
    let base = if balance_ratio <= BALANCE_TOLERANCE {
        MAX_STABILITY_SCORE
    } else {
        (MAX_STABILITY_SCORE - balance_ratio * 1500.0).max(0.0)
    };
    (base - frequency_deviation * 100.0).clamp(0.0, MAX_STABILITY_SCORE)
}

/// Economic component in `[0, 250]`.
pub fn economic_score(profit_margin: f64, cost_efficiency: f64) -> f64 {
    let profit_base = if profit_margin > 0.0 { 120.0 } else { 0.0 };
    let profit_bonus = (profit_margin / 150.0).max(0.0);
    let efficiency_bonus = ((100.0 - cost_efficiency) * 2.5).max(0.0);
    (profit_base + profit_bonus + efficiency_bonus).clamp(0.0, MAX_ECONOMIC_SCORE)
}

/// Environmental component in `[0, 250]`.
pub fn environmental_score(total_emissions: f64, renewable_percentage: f64) -> f64 {
    let carbon_penalty = total_emissions * 1.8;
    let renewable_bonus = (renewable_percentage * 1.2).min(120.0);
    (75.0 + renewable_bonus - carbon_penalty).clamp(0.0, MAX_ENVIRONMENTAL_SCORE)
}

/// Demand-management component in `[0, 150]`.
pub fn demand_score(dsm: f64, avg_tariff: f64) -> f64 {
    let dsm_bonus = (dsm * 7.5).min(75.0);
    let tariff_bonus = ((avg_tariff - 4.0) * 20.0).clamp(0.0, 40.0);
    (35.0 + dsm_bonus + tariff_bonus).clamp(0.0, MAX_DEMAND_SCORE)
}

/// Scored snapshot: total, components, and derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Rounded sum of the four components, nominally 0-1000.
    pub total_score: i32,
    pub stability_score: f64,
    pub economic_score: f64,
    pub environmental_score: f64,
    pub demand_score: f64,
    /// MW.
    pub total_supply: f64,
    /// MW.
    pub total_demand: f64,
    /// Currency per 15-minute interval.
    pub total_cost: f64,
    /// Currency per 15-minute interval.
    pub total_revenue: f64,
    pub profit_margin: f64,
    /// kg CO2.
    pub total_emissions: f64,
    pub renewable_percentage: f64,
    /// `|supply - demand| / max(demand, 1)`.
    pub balance_ratio: f64,
    /// Hz.
    pub frequency: f64,
}

impl ScoreBreakdown {
    pub fn component_sum(&self) -> f64 {
        self.stability_score + self.economic_score + self.environmental_score + self.demand_score
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.total_score)
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus::assess(
            self.balance_ratio,
            (self.frequency - NOMINAL_FREQUENCY_HZ).abs(),
        )
    }

    /// `true` when every metric is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.component_sum(),
            self.total_supply,
            self.total_demand,
            self.total_cost,
            self.total_revenue,
            self.total_emissions,
            self.renewable_percentage,
            self.balance_ratio,
            self.frequency,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Grid Score ---")?;
        writeln!(
            f,
            "Total score:        {} / 1000 (grade {}, {})",
            self.total_score,
            self.grade(),
            self.status()
        )?;
        writeln!(f, "  Stability:        {:>6.1} / 350", self.stability_score)?;
        writeln!(f, "  Economic:         {:>6.1} / 250", self.economic_score)?;
        writeln!(f, "  Environmental:    {:>6.1} / 250", self.environmental_score)?;
        writeln!(f, "  Demand mgmt:      {:>6.1} / 150", self.demand_score)?;
        writeln!(
            f,
            "Supply / demand:    {:.0} / {:.0} MW ({:.1}% off)",
            self.total_supply,
            self.total_demand,
            self.balance_ratio * 100.0
        )?;
        writeln!(
            f,
            "Revenue / cost:     {:.0} / {:.0} (margin {:.0})",
            self.total_revenue, self.total_cost, self.profit_margin
        )?;
        write!(
            f,
            "Emissions:          {:.2} kg CO2, renewables {:.1}%",
            self.total_emissions, self.renewable_percentage
        )
    }
}

/// Letter grade for a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(total_score: i32) -> Self {
        match total_score {
            s if s >= 900 => Self::APlus,
            s if s >= 800 => Self::A,
            s if s >= 700 => Self::B,
            s if s >= 600 => Self::C,
            _ => Self::D,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(label)
    }
}

/// Operating condition derived from balance and frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SystemStatus {
    Optimal,
    Stable,
    Warning,
    Critical,
}

impl SystemStatus {
    pub fn assess(balance_ratio: f64, frequency_deviation: f64) -> Self {
        if balance_ratio < 0.05 && frequency_deviation < 0.2 {
            Self::Optimal
        } else if balance_ratio < 0.1 && frequency_deviation < 0.5 {
            Self::Stable
        } else if balance_ratio < 0.2 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Optimal => "Optimal",
            Self::Stable => "Stable",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}
