//! Month-by-month amortization of a fixed-rate loan.
use crate::core::finance::calculate_monthly_mortgage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based payment number.
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Remaining balance after this payment, floored at zero.
    pub balance: f64,
}

/// Lazily yields one [`AmortizationEntry`] per month.
///
/// The iterator is a pure function of its inputs: constructing a new one with
/// the same arguments replays the identical schedule.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    monthly_rate: f64,
    payment: f64,
    balance: f64,
    month: u32,
    total_months: u32,
}

impl AmortizationSchedule {
    pub fn new(loan_amount: f64, annual_rate_percent: f64, years: u32) -> Self {
        Self {
            monthly_rate: annual_rate_percent / 12.0 / 100.0,
            payment: calculate_monthly_mortgage(loan_amount, annual_rate_percent, years),
            balance: loan_amount,
            month: 0,
            total_months: years.saturating_mul(12),
        }
    }

    pub fn monthly_payment(&self) -> f64 {
        self.payment
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.month >= self.total_months {
            return None;
        }
        self.month += 1;

        let interest = self.balance * self.monthly_rate;
        let principal = self.payment - interest;
        self.balance -= principal;

        Some(AmortizationEntry {
            month: self.month,
            payment: self.payment,
            principal,
            interest,
            balance: self.balance.max(0.0),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_months - self.month) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

pub fn generate_amortization_schedule(
    loan_amount: f64,
    annual_rate_percent: f64,
    years: u32,
) -> Vec<AmortizationEntry> {
    AmortizationSchedule::new(loan_amount, annual_rate_percent, years).collect()
}

/// Totals for one loan year, used for condensed schedule views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal: f64,
    pub interest: f64,
    pub ending_balance: f64,
}

pub fn summarize_by_year(schedule: &[AmortizationEntry]) -> Vec<AmortizationYear> {
    schedule
        .chunks(12)
        .zip(1..)
        .map(|(months, year)| AmortizationYear {
            year,
            principal: months.iter().map(|m| m.principal).sum(),
            interest: months.iter().map(|m| m.interest).sum(),
            ending_balance: months.last().map_or(0.0, |m| m.balance),
        })
        .collect()
}
