//! Default assumptions for analysing a listing from its advertised numbers.
use crate::core::finance::FinancialInputs;

pub const DEFAULT_RENT_TO_PRICE: f64 = 0.01;
pub const DEFAULT_PROPERTY_TAX_RATE: f64 = 1.5;
pub const DEFAULT_INSURANCE_RATE: f64 = 0.5;
pub const DEFAULT_MAINTENANCE_SHARE: f64 = 5.0;
pub const DEFAULT_VACANCY_RATE: f64 = 8.0;
pub const DEFAULT_MANAGEMENT_FEE: f64 = 10.0;
pub const DEFAULT_DOWN_PAYMENT: f64 = 20.0;
pub const DEFAULT_INTEREST_RATE: f64 = 7.0;
pub const DEFAULT_LOAN_TERM: u32 = 30;
pub const DEFAULT_CLOSING_COST_RATE: f64 = 3.0;
pub const DEFAULT_APPRECIATION_RATE: f64 = 3.0;

/// Parses an advertised amount such as `"$1,250,000"` or `"2,400/mo"`.
///
/// Everything except digits and `.` is dropped before parsing.
pub fn parse_listing_amount(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Builds inputs for a listing using typical market assumptions.
///
/// Without a positive rent estimate the 1% rule supplies the monthly rent.
pub fn estimate_inputs(price: f64, rent_estimate: Option<f64>) -> FinancialInputs {
    let monthly_rent = rent_estimate
        .filter(|rent| *rent > 0.0)
        .unwrap_or(price * DEFAULT_RENT_TO_PRICE);

    FinancialInputs {
        purchase_price: price,
        down_payment: DEFAULT_DOWN_PAYMENT,
        interest_rate: DEFAULT_INTEREST_RATE,
        loan_term: DEFAULT_LOAN_TERM,
        property_tax_rate: DEFAULT_PROPERTY_TAX_RATE,
        insurance_cost: price * DEFAULT_INSURANCE_RATE / 100.0,
        maintenance_cost: monthly_rent * DEFAULT_MAINTENANCE_SHARE / 100.0,
        hoa_fees: 0.0,
        utility_costs: 0.0,
        vacancy_rate: DEFAULT_VACANCY_RATE,
        monthly_rent,
        property_management_fee: DEFAULT_MANAGEMENT_FEE,
        closing_costs: price * DEFAULT_CLOSING_COST_RATE / 100.0,
        appreciation_rate: DEFAULT_APPRECIATION_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finance::calculate_all_metrics;

    #[test]
    fn test_parse_listing_amount() {
        assert_eq!(parse_listing_amount("$1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_listing_amount("$2,400/mo"), Some(2400.0));
        assert_eq!(parse_listing_amount("349999.50"), Some(349_999.5));
        assert_eq!(parse_listing_amount("Contact agent"), None);
        assert_eq!(parse_listing_amount(""), None);
    }

    #[test]
    fn test_estimate_uses_one_percent_rule() {
        let inputs = estimate_inputs(350_000.0, None);
        assert_eq!(inputs.monthly_rent, 3500.0);
        assert_eq!(inputs.maintenance_cost, 175.0);
        assert_eq!(inputs.insurance_cost, 1750.0);
        assert_eq!(inputs.closing_costs, 10_500.0);

        let zero_rent = estimate_inputs(350_000.0, Some(0.0));
        assert_eq!(zero_rent.monthly_rent, 3500.0);
    }

    #[test]
    fn test_estimate_prefers_rent_estimate() {
        let inputs = estimate_inputs(350_000.0, Some(2800.0));
        assert_eq!(inputs.monthly_rent, 2800.0);
        assert_eq!(inputs.maintenance_cost, 140.0);
    }

    #[test]
    fn test_estimate_is_analysable() {
        let metrics = calculate_all_metrics(&estimate_inputs(350_000.0, Some(2800.0))).unwrap();
        assert!(metrics.monthly_mortgage_payment > 1800.0);
        assert!(metrics.debt_service_coverage_ratio.is_some());
    }
}
