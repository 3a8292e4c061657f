//! Conservative and optimistic variants of a baseline analysis.
use crate::core::finance::{FinancialInputs, FinancialMetrics, Result, calculate_all_metrics};
use serde::{Deserialize, Serialize};

/// Multipliers applied to a baseline's assumptions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioAdjustment {
    /// Scales insurance, maintenance, HOA and utilities. Property tax is
    /// statutory and stays fixed.
    pub expense_factor: f64,
    pub rent_factor: f64,
    pub vacancy_factor: f64,
}

pub const CONSERVATIVE: ScenarioAdjustment = ScenarioAdjustment {
    expense_factor: 1.2,
    rent_factor: 0.9,
    vacancy_factor: 1.2,
};

pub const OPTIMISTIC: ScenarioAdjustment = ScenarioAdjustment {
    expense_factor: 0.8,
    rent_factor: 1.1,
    vacancy_factor: 0.8,
};

impl ScenarioAdjustment {
    pub fn apply(&self, inputs: &FinancialInputs) -> FinancialInputs {
        FinancialInputs {
            insurance_cost: inputs.insurance_cost * self.expense_factor,
            maintenance_cost: inputs.maintenance_cost * self.expense_factor,
            hoa_fees: inputs.hoa_fees * self.expense_factor,
            utility_costs: inputs.utility_costs * self.expense_factor,
            monthly_rent: inputs.monthly_rent * self.rent_factor,
            vacancy_rate: (inputs.vacancy_rate * self.vacancy_factor).min(100.0),
            ..*inputs
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub conservative: FinancialMetrics,
    pub moderate: FinancialMetrics,
    pub optimistic: FinancialMetrics,
}

/// Re-runs the metrics pipeline under [`CONSERVATIVE`] and [`OPTIMISTIC`]
/// assumptions; `baseline` is reported as the moderate case.
pub fn analyze_scenarios(
    inputs: &FinancialInputs,
    baseline: FinancialMetrics,
) -> Result<ScenarioAnalysis> {
    Ok(ScenarioAnalysis {
        conservative: calculate_all_metrics(&CONSERVATIVE.apply(inputs))?,
        moderate: baseline,
        optimistic: calculate_all_metrics(&OPTIMISTIC.apply(inputs))?,
    })
}
