//! Internal rate of return via Newton-Raphson.
use crate::core::finance::{FinanceError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Smallest derivative magnitude the solver will divide by.
const MIN_DERIVATIVE: f64 = 1e-12;

/// Longest holding period [`calculate_irr`] accepts, in years.
pub const MAX_HOLDING_PERIOD_YEARS: u32 = 100;

/// Outcome of an IRR solve. `rate` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Irr {
    pub rate: f64,
    pub iterations: usize,
    /// `false` when the iteration budget ran out before reaching tolerance;
    /// `rate` is then the last estimate and should be presented as approximate.
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct IrrSolver {
    pub guess: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Rates (as fractions) outside this range are reported as divergence.
    pub bounds: RangeInclusive<f64>,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            guess: 0.10,
            tolerance: 1e-4,
            max_iterations: 100,
            bounds: -0.99..=10.0,
        }
    }
}

impl IrrSolver {
    /// Finds the rate at which the NPV of `cash_flows` (one per year, year 0
    /// first) is zero.
    pub fn solve(&self, cash_flows: &[f64]) -> Result<Irr> {
        if cash_flows.len() < 2 {
            return Err(FinanceError::InsufficientCashFlows);
        }

        let mut rate = self.guess;
        for iteration in 1..=self.max_iterations {
            let value = npv(cash_flows, rate);
            let derivative = npv_derivative(cash_flows, rate);
            if !derivative.is_finite() || derivative.abs() < MIN_DERIVATIVE {
                return Err(FinanceError::DerivativeVanished {
                    rate,
                    iterations: iteration,
                });
            }

            let next = rate - value / derivative;
            if !next.is_finite() || !self.bounds.contains(&next) {
                return Err(FinanceError::Diverged {
                    rate: next,
                    iterations: iteration,
                });
            }

            if (next - rate).abs() < self.tolerance {
                return Ok(Irr {
                    rate: next * 100.0,
                    iterations: iteration,
                    converged: true,
                });
            }
            rate = next;
        }

        Ok(Irr {
            rate: rate * 100.0,
            iterations: self.max_iterations,
            converged: false,
        })
    }
}

pub fn npv(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .zip(0..)
        .map(|(cf, t)| cf / (1.0 + rate).powi(t))
        .sum()
}

fn npv_derivative(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .zip(0..)
        .map(|(cf, t)| -f64::from(t) * cf / (1.0 + rate).powi(t + 1))
        .sum()
}

/// Yearly cash flows of a buy, hold and sell: the purchase in year 0, the
/// operating cash flow each year, and the appreciated sale value on top of
/// the final year's cash flow.
pub fn hold_and_sell_cash_flows(
    initial_investment: f64,
    annual_cash_flow: f64,
    appreciation_rate_percent: f64,
    years: u32,
) -> Vec<f64> {
    let growth = 1.0 + appreciation_rate_percent / 100.0;
    let mut property_value = initial_investment;
    let mut flows = Vec::with_capacity(years as usize + 1);
    flows.push(-initial_investment);
    for year in 1..=years {
        property_value *= growth;
        if year == years {
            flows.push(annual_cash_flow + property_value);
        } else {
            flows.push(annual_cash_flow);
        }
    }
    flows
}

/// IRR of holding a property for `years` and selling at the appreciated value.
pub fn calculate_irr(
    initial_investment: f64,
    annual_cash_flow: f64,
    appreciation_rate_percent: f64,
    years: u32,
) -> Result<Irr> {
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(FinanceError::InvalidInput {
            field: "initial_investment",
            requirement: "greater than zero",
            value: initial_investment,
        });
    }
    if !(1..=MAX_HOLDING_PERIOD_YEARS).contains(&years) {
        return Err(FinanceError::InvalidInput {
            field: "years",
            requirement: "between 1 and 100 years",
            value: f64::from(years),
        });
    }
    if !annual_cash_flow.is_finite() || !appreciation_rate_percent.is_finite() {
        return Err(FinanceError::InvalidInput {
            field: "annual_cash_flow",
            requirement: "finite",
            value: annual_cash_flow,
        });
    }

    let flows = hold_and_sell_cash_flows(
        initial_investment,
        annual_cash_flow,
        appreciation_rate_percent,
        years,
    );
    IrrSolver::default().solve(&flows)
}
