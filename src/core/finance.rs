//! Provides the investment metrics engine for rental properties.
//!
//! All rates are plain percentages at the boundary (`4.5` means 4.5%). The
//! functions here are pure: they never log, never touch shared state, and
//! reject out-of-domain input with a [`FinanceError`] instead of letting
//! NaN or infinity reach a report.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest loan term accepted, in years.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinanceError {
    #[error("Invalid input: {field} must be {requirement}, got {value}")]
    InvalidInput {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("IRR requires at least two cash flows")]
    InsufficientCashFlows,

    #[error("IRR derivative vanished at rate {rate} after {iterations} iterations")]
    DerivativeVanished { rate: f64, iterations: usize },

    #[error("IRR diverged to rate {rate} after {iterations} iterations")]
    Diverged { rate: f64, iterations: usize },

    #[error("Computed {metric} is not a finite number")]
    NonFinite { metric: &'static str },
}

pub type Result<T> = std::result::Result<T, FinanceError>;

/// Purchase, loan and operating assumptions for one property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    pub purchase_price: f64,
    /// Down payment as a percentage of the purchase price.
    pub down_payment: f64,
    /// Annual interest rate.
    pub interest_rate: f64,
    /// Loan term in years.
    pub loan_term: u32,
    /// Annual property tax as a percentage of the purchase price.
    #[serde(default)]
    pub property_tax_rate: f64,
    /// Annual insurance premium.
    #[serde(default)]
    pub insurance_cost: f64,
    /// Monthly maintenance budget.
    #[serde(default)]
    pub maintenance_cost: f64,
    #[serde(default)]
    pub hoa_fees: f64,
    #[serde(default)]
    pub utility_costs: f64,
    #[serde(default)]
    pub vacancy_rate: f64,
    pub monthly_rent: f64,
    /// Property management fee as a percentage of rent.
    #[serde(default)]
    pub property_management_fee: f64,
    #[serde(default)]
    pub closing_costs: f64,
    #[serde(default)]
    pub appreciation_rate: f64,
}

impl FinancialInputs {
    /// Checks the invariants every calculation relies on.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("purchase_price", self.purchase_price),
            ("insurance_cost", self.insurance_cost),
            ("maintenance_cost", self.maintenance_cost),
            ("hoa_fees", self.hoa_fees),
            ("utility_costs", self.utility_costs),
            ("monthly_rent", self.monthly_rent),
            ("closing_costs", self.closing_costs),
            ("interest_rate", self.interest_rate),
            ("property_tax_rate", self.property_tax_rate),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FinanceError::InvalidInput {
                    field,
                    requirement: "a finite non-negative number",
                    value,
                });
            }
        }

        let percentages = [
            ("down_payment", self.down_payment),
            ("vacancy_rate", self.vacancy_rate),
            ("property_management_fee", self.property_management_fee),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(FinanceError::InvalidInput {
                    field,
                    requirement: "between 0 and 100",
                    value,
                });
            }
        }

        if !(1..=MAX_LOAN_TERM_YEARS).contains(&self.loan_term) {
            return Err(FinanceError::InvalidInput {
                field: "loan_term",
                requirement: "between 1 and 50 years",
                value: f64::from(self.loan_term),
            });
        }

        if !self.appreciation_rate.is_finite() || self.appreciation_rate <= -100.0 {
            return Err(FinanceError::InvalidInput {
                field: "appreciation_rate",
                requirement: "a finite number above -100",
                value: self.appreciation_rate,
            });
        }

        Ok(())
    }

    pub fn down_payment_amount(&self) -> f64 {
        self.purchase_price * self.down_payment / 100.0
    }

    pub fn loan_amount(&self) -> f64 {
        self.purchase_price - self.down_payment_amount()
    }

    /// Cash put into the deal: down payment plus closing costs.
    pub fn total_investment(&self) -> f64 {
        self.down_payment_amount() + self.closing_costs
    }
}

/// Derived investment metrics. Percentages are plain numbers like the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub monthly_mortgage_payment: f64,
    /// Operating expenses per month, excluding the loan payment.
    pub monthly_expenses: f64,
    pub monthly_cash_flow: f64,
    pub cap_rate: f64,
    pub cash_on_cash_return: f64,
    pub gross_rent_multiplier: f64,
    pub net_operating_income: f64,
    pub return_on_investment: f64,
    /// Years to recover the cash invested from cash flow alone.
    /// `None` when the property never breaks even (cash flow <= 0).
    pub break_even_point: Option<f64>,
    /// `None` when there is no debt to service.
    pub debt_service_coverage_ratio: Option<f64>,
}

/// Fixed-rate monthly payment for `principal` over `years`.
///
/// A zero rate degrades to straight-line repayment. `years` must be positive.
pub fn calculate_monthly_mortgage(principal: f64, annual_rate_percent: f64, years: u32) -> f64 {
    let monthly_rate = annual_rate_percent / 12.0 / 100.0;
    let payments = f64::from(years.saturating_mul(12));
    if monthly_rate == 0.0 {
        return principal / payments;
    }
    let growth = (1.0 + monthly_rate).powf(payments);
    principal * monthly_rate * growth / (growth - 1.0)
}

pub fn calculate_cap_rate(noi: f64, property_value: f64) -> Result<f64> {
    require_positive("property_value", property_value)?;
    Ok((noi / property_value) * 100.0)
}

pub fn calculate_cash_on_cash_return(annual_cash_flow: f64, total_investment: f64) -> Result<f64> {
    require_positive("total_investment", total_investment)?;
    Ok((annual_cash_flow / total_investment) * 100.0)
}

pub fn calculate_noi(annual_rent: f64, operating_expenses: f64, vacancy_loss: f64) -> f64 {
    annual_rent - operating_expenses - vacancy_loss
}

pub fn calculate_dscr(noi: f64, annual_debt_service: f64) -> Result<f64> {
    require_positive("annual_debt_service", annual_debt_service)?;
    Ok(noi / annual_debt_service)
}

pub fn calculate_gross_rent_multiplier(purchase_price: f64, annual_rent: f64) -> Result<f64> {
    require_positive("annual_rent", annual_rent)?;
    Ok(purchase_price / annual_rent)
}

/// Years until `total_investment` is recovered from `annual_cash_flow`.
pub fn calculate_break_even(total_investment: f64, annual_cash_flow: f64) -> Option<f64> {
    (annual_cash_flow > 0.0).then(|| total_investment / annual_cash_flow)
}

/// Runs the full metrics pipeline for one set of assumptions.
pub fn calculate_all_metrics(inputs: &FinancialInputs) -> Result<FinancialMetrics> {
    inputs.validate()?;

    let loan_amount = inputs.loan_amount();
    let monthly_mortgage =
        calculate_monthly_mortgage(loan_amount, inputs.interest_rate, inputs.loan_term);

    let monthly_expenses = inputs.purchase_price * inputs.property_tax_rate / 100.0 / 12.0
        + inputs.insurance_cost / 12.0
        + inputs.maintenance_cost
        + inputs.hoa_fees
        + inputs.utility_costs;

    let annual_rent = inputs.monthly_rent * 12.0;
    let vacancy_loss = annual_rent * inputs.vacancy_rate / 100.0;
    let operating_expenses = monthly_expenses * 12.0;
    let noi = calculate_noi(annual_rent, operating_expenses, vacancy_loss);

    let monthly_cash_flow = inputs.monthly_rent
        - monthly_mortgage
        - monthly_expenses
        - inputs.monthly_rent * inputs.property_management_fee / 100.0;
    let annual_cash_flow = monthly_cash_flow * 12.0;

    let total_investment = inputs.total_investment();
    let cap_rate = calculate_cap_rate(noi, inputs.purchase_price)?;
    let cash_on_cash_return = calculate_cash_on_cash_return(annual_cash_flow, total_investment)?;
    let gross_rent_multiplier = calculate_gross_rent_multiplier(inputs.purchase_price, annual_rent)?;
    let return_on_investment = ((annual_cash_flow
        + inputs.purchase_price * inputs.appreciation_rate / 100.0)
        / total_investment)
        * 100.0;

    let annual_debt_service = monthly_mortgage * 12.0;
    let debt_service_coverage_ratio = if annual_debt_service > 0.0 {
        Some(calculate_dscr(noi, annual_debt_service)?)
    } else {
        None
    };

    let metrics = FinancialMetrics {
        monthly_mortgage_payment: ensure_finite("monthly_mortgage_payment", monthly_mortgage)?,
        monthly_expenses: ensure_finite("monthly_expenses", monthly_expenses)?,
        monthly_cash_flow: ensure_finite("monthly_cash_flow", monthly_cash_flow)?,
        cap_rate: ensure_finite("cap_rate", cap_rate)?,
        cash_on_cash_return: ensure_finite("cash_on_cash_return", cash_on_cash_return)?,
        gross_rent_multiplier: ensure_finite("gross_rent_multiplier", gross_rent_multiplier)?,
        net_operating_income: ensure_finite("net_operating_income", noi)?,
        return_on_investment: ensure_finite("return_on_investment", return_on_investment)?,
        break_even_point: calculate_break_even(total_investment, annual_cash_flow)
            .map(|years| ensure_finite("break_even_point", years))
            .transpose()?,
        debt_service_coverage_ratio: debt_service_coverage_ratio
            .map(|ratio| ensure_finite("debt_service_coverage_ratio", ratio))
            .transpose()?,
    };
    Ok(metrics)
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FinanceError::InvalidInput {
            field,
            requirement: "greater than zero",
            value,
        })
    }
}

fn ensure_finite(metric: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinanceError::NonFinite { metric })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_inputs() -> FinancialInputs {
        FinancialInputs {
            purchase_price: 300_000.0,
            down_payment: 20.0,
            interest_rate: 4.5,
            loan_term: 30,
            property_tax_rate: 1.2,
            insurance_cost: 1200.0,
            maintenance_cost: 200.0,
            hoa_fees: 0.0,
            vacancy_rate: 5.0,
            monthly_rent: 2500.0,
            property_management_fee: 8.0,
            closing_costs: 5000.0,
            appreciation_rate: 3.0,
            utility_costs: 0.0,
        }
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_monthly_mortgage() {
        let payment = calculate_monthly_mortgage(240_000.0, 4.5, 30);
        assert_close(payment, 1216.04, 0.01);

        let payment = calculate_monthly_mortgage(300_000.0, 4.5, 30);
        assert_close(payment, 1520.06, 0.01);
    }

    #[test]
    fn test_monthly_mortgage_zero_rate() {
        assert_eq!(calculate_monthly_mortgage(300_000.0, 0.0, 30), 300_000.0 / 360.0);
        assert_eq!(calculate_monthly_mortgage(0.0, 0.0, 15), 0.0);
        assert_eq!(calculate_monthly_mortgage(120_000.0, 0.0, 10), 1000.0);
    }

    #[test]
    fn test_cap_rate() {
        assert_eq!(calculate_cap_rate(24_000.0, 300_000.0), Ok(8.0));
        assert!(matches!(
            calculate_cap_rate(24_000.0, 0.0),
            Err(FinanceError::InvalidInput {
                field: "property_value",
                ..
            })
        ));
        assert!(calculate_cap_rate(24_000.0, -5.0).is_err());
    }

    #[test]
    fn test_cash_on_cash_return() {
        assert_eq!(calculate_cash_on_cash_return(12_000.0, 100_000.0), Ok(12.0));
        assert!(calculate_cash_on_cash_return(12_000.0, 0.0).is_err());
    }

    #[test]
    fn test_noi_has_no_hidden_rounding() {
        assert_eq!(calculate_noi(36_000.0, 10_000.0, 2000.0), 24_000.0);
        let (rent, expenses, vacancy) = (30_000.1, 7200.37, 1500.005);
        assert_eq!(
            calculate_noi(rent, expenses, vacancy),
            rent - expenses - vacancy
        );
    }

    #[test]
    fn test_dscr_rejects_zero_debt_service() {
        assert_eq!(calculate_dscr(21_300.0, 14_200.0), Ok(1.5));
        assert!(calculate_dscr(21_300.0, 0.0).is_err());
    }

    #[test]
    fn test_break_even() {
        assert_eq!(calculate_break_even(65_000.0, 6500.0), Some(10.0));
        assert_eq!(calculate_break_even(65_000.0, 0.0), None);
        assert_eq!(calculate_break_even(65_000.0, -1200.0), None);
    }

    #[test]
    fn test_calculate_all_metrics() {
        let metrics = calculate_all_metrics(&sample_inputs()).unwrap();

        assert_close(metrics.monthly_mortgage_payment, 1216.04, 0.01);
        assert_close(metrics.monthly_expenses, 600.0, 1e-9);
        assert_close(metrics.net_operating_income, 21_300.0, 1e-9);
        assert_close(metrics.cap_rate, 7.1, 1e-9);
        assert_close(metrics.gross_rent_multiplier, 10.0, 1e-12);
        assert_close(metrics.monthly_cash_flow, 483.96, 0.01);
        assert_close(metrics.cash_on_cash_return, 8.93, 0.01);
        assert_close(metrics.return_on_investment, 22.78, 0.01);
        assert_close(metrics.break_even_point.unwrap(), 11.19, 0.01);
        assert_close(metrics.debt_service_coverage_ratio.unwrap(), 1.46, 0.01);
    }

    #[test]
    fn test_calculate_all_metrics_is_pure() {
        let inputs = sample_inputs();
        let first = calculate_all_metrics(&inputs).unwrap();
        let second = calculate_all_metrics(&inputs).unwrap();
        assert_eq!(
            first.monthly_cash_flow.to_bits(),
            second.monthly_cash_flow.to_bits()
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_cash_flow_has_no_break_even() {
        let inputs = FinancialInputs {
            monthly_rent: 1200.0,
            ..sample_inputs()
        };
        let metrics = calculate_all_metrics(&inputs).unwrap();
        assert!(metrics.monthly_cash_flow < 0.0);
        assert_eq!(metrics.break_even_point, None);
        assert!(metrics.cash_on_cash_return < 0.0);
    }

    #[test]
    fn test_all_cash_purchase_has_no_dscr() {
        let inputs = FinancialInputs {
            down_payment: 100.0,
            ..sample_inputs()
        };
        let metrics = calculate_all_metrics(&inputs).unwrap();
        assert_eq!(metrics.monthly_mortgage_payment, 0.0);
        assert_eq!(metrics.debt_service_coverage_ratio, None);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let zero_price = FinancialInputs {
            purchase_price: 0.0,
            ..sample_inputs()
        };
        assert!(matches!(
            calculate_all_metrics(&zero_price),
            Err(FinanceError::InvalidInput {
                field: "property_value",
                ..
            })
        ));

        let nothing_invested = FinancialInputs {
            down_payment: 0.0,
            closing_costs: 0.0,
            ..sample_inputs()
        };
        assert!(matches!(
            calculate_all_metrics(&nothing_invested),
            Err(FinanceError::InvalidInput {
                field: "total_investment",
                ..
            })
        ));

        let no_rent = FinancialInputs {
            monthly_rent: 0.0,
            ..sample_inputs()
        };
        assert!(calculate_all_metrics(&no_rent).is_err());

        let bad_down_payment = FinancialInputs {
            down_payment: 120.0,
            ..sample_inputs()
        };
        assert!(matches!(
            bad_down_payment.validate(),
            Err(FinanceError::InvalidInput {
                field: "down_payment",
                ..
            })
        ));

        let no_term = FinancialInputs {
            loan_term: 0,
            ..sample_inputs()
        };
        assert!(no_term.validate().is_err());

        let nan_rent = FinancialInputs {
            monthly_rent: f64::NAN,
            ..sample_inputs()
        };
        assert!(nan_rent.validate().is_err());
    }

    #[test]
    fn test_loan_term_is_bounded() {
        let huge_term = FinancialInputs {
            loan_term: 400_000_000,
            ..sample_inputs()
        };
        assert_eq!(
            calculate_all_metrics(&huge_term),
            Err(FinanceError::InvalidInput {
                field: "loan_term",
                requirement: "between 1 and 50 years",
                value: 400_000_000.0,
            })
        );

        let longest = FinancialInputs {
            loan_term: MAX_LOAN_TERM_YEARS,
            ..sample_inputs()
        };
        assert!(calculate_all_metrics(&longest).is_ok());
    }

    #[test]
    fn test_overflowing_metric_is_non_finite() {
        let absurd_rate = FinancialInputs {
            interest_rate: 1e300,
            ..sample_inputs()
        };
        assert!(absurd_rate.validate().is_ok());
        assert_eq!(
            calculate_all_metrics(&absurd_rate),
            Err(FinanceError::NonFinite {
                metric: "monthly_mortgage_payment"
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = calculate_cap_rate(1.0, 0.0).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("property_value"));
        assert!(display.contains("greater than zero"));
    }
}
