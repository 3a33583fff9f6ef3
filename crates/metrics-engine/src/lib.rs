//! Derives the fourteen valuation metrics from one input snapshot.
//!
//! Every function guards its own denominator. A degenerate-but-defined result
//! is `0.0`; a mathematically undefined one is `None`. Nothing here returns
//! NaN or infinity for finite input.

use valuation_core::{
    AssumptionInputs, FinancialInputs, Interpretation, MarketInputs, RoaBands, Sector,
    ValuationInputs, ValuationMetrics,
};

/// Book value per share: equity / shares.
pub fn book_value_per_share(equity: f64, shares: f64) -> f64 {
    if shares <= 0.0 {
        return 0.0;
    }
    equity / shares
}

/// Price-to-book: price / BVPS.
pub fn price_to_book(price: f64, bvps: f64) -> f64 {
    if bvps <= 0.0 {
        return 0.0;
    }
    price / bvps
}

/// Earnings per share: profit after tax / shares.
pub fn earnings_per_share(profit: f64, shares: f64) -> f64 {
    if shares <= 0.0 {
        return 0.0;
    }
    profit / shares
}

/// Price-to-earnings. Zero or negative earnings give no meaningful multiple.
pub fn price_to_earnings(price: f64, eps: f64) -> f64 {
    if eps <= 0.0 {
        return 0.0;
    }
    price / eps
}

/// Dividend yield, percent.
pub fn dividend_yield(dividend_per_share: f64, price: f64) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    (dividend_per_share / price) * 100.0
}

/// Share of earnings paid out as dividends, percent.
pub fn payout_ratio(dividend_per_share: f64, eps: f64) -> f64 {
    if eps <= 0.0 {
        return 0.0;
    }
    (dividend_per_share / eps) * 100.0
}

/// Return on equity, percent.
pub fn return_on_equity(profit: f64, equity: f64) -> f64 {
    if equity <= 0.0 {
        return 0.0;
    }
    (profit / equity) * 100.0
}

/// Return on assets, percent.
pub fn return_on_assets(profit: f64, assets: f64) -> f64 {
    if assets <= 0.0 {
        return 0.0;
    }
    (profit / assets) * 100.0
}

pub fn debt_to_equity(liabilities: f64, equity: f64) -> f64 {
    if equity <= 0.0 {
        return 0.0;
    }
    liabilities / equity
}

/// Gordon growth (dividend discount) model.
///
/// `D1 / (r - g)` with `D1 = D0 * (1 + g)`. Rates are percentages.
/// Undefined without a dividend or when growth reaches the required return.
pub fn intrinsic_value(current_dividend: f64, required_return: f64, growth_rate: f64) -> Option<f64> {
    if current_dividend <= 0.0 {
        return None;
    }

    let r = required_return / 100.0;
    let g = growth_rate / 100.0;
    if g >= r {
        return None;
    }

    let next_dividend = current_dividend * (1.0 + g);
    Some(next_dividend / (r - g))
}

/// Margin of safety, percent. Positive means the price sits below intrinsic value.
pub fn margin_of_safety(intrinsic_value: Option<f64>, price: f64) -> Option<f64> {
    match intrinsic_value {
        Some(iv) if iv > 0.0 => Some(((iv - price) / iv) * 100.0),
        _ => None,
    }
}

/// Earnings yield (inverse P/E), percent.
pub fn earnings_yield(eps: f64, price: f64) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    (eps / price) * 100.0
}

/// Year-over-year dividend growth, percent.
pub fn dividend_growth_rate(current_dividend: f64, previous_dividend: f64) -> Option<f64> {
    if previous_dividend <= 0.0 {
        return None;
    }
    Some((current_dividend / previous_dividend - 1.0) * 100.0)
}

/// PEG ratio with dividend growth standing in for earnings growth.
pub fn peg_ratio(pe_ratio: f64, growth_rate: Option<f64>) -> Option<f64> {
    match growth_rate {
        Some(g) if g > 0.0 && pe_ratio > 0.0 => Some(pe_ratio / g),
        _ => None,
    }
}

/// Read ROA against the sector's bands. Informational only, never scored.
pub fn assess_roa(roa: f64, sector: Sector) -> Interpretation {
    let RoaBands { poor, good, .. } = sector.thresholds().roa;
    if roa >= good {
        Interpretation::Positive
    } else if roa < poor {
        Interpretation::Negative
    } else {
        Interpretation::Neutral
    }
}

/// Where the price sits inside the 52-week range, percent (0 = low, 100 = high).
/// Undefined for an empty or inverted range.
pub fn week_52_position(price: f64, low: f64, high: f64) -> Option<f64> {
    if high <= low {
        return None;
    }
    Some((price - low) / (high - low) * 100.0)
}

/// Calculate all fourteen metrics.
pub fn calculate_all_metrics(
    financials: &FinancialInputs,
    market: &MarketInputs,
    assumptions: &AssumptionInputs,
) -> ValuationMetrics {
    let price = market.current_stock_price;

    let bvps = book_value_per_share(financials.total_shareholders_equity, financials.shares_outstanding);
    let pb_ratio = price_to_book(price, bvps);
    let eps = earnings_per_share(financials.profit_after_tax, financials.shares_outstanding);
    let pe_ratio = price_to_earnings(price, eps);

    let intrinsic = intrinsic_value(
        financials.dividend_per_share,
        assumptions.required_rate_of_return,
        assumptions.expected_dividend_growth_rate,
    );
    let growth = dividend_growth_rate(financials.dividend_per_share, financials.previous_year_dividend);

    ValuationMetrics {
        bvps,
        pb_ratio,
        eps,
        pe_ratio,
        dividend_yield: dividend_yield(financials.dividend_per_share, price),
        payout_ratio: payout_ratio(financials.dividend_per_share, eps),
        roe: return_on_equity(financials.profit_after_tax, financials.total_shareholders_equity),
        roa: return_on_assets(financials.profit_after_tax, financials.total_assets),
        debt_to_equity: debt_to_equity(financials.total_liabilities, financials.total_shareholders_equity),
        intrinsic_value: intrinsic,
        margin_of_safety: margin_of_safety(intrinsic, price),
        earnings_yield: earnings_yield(eps, price),
        dividend_growth_rate: growth,
        peg_ratio: peg_ratio(pe_ratio, growth),
    }
}

/// Stateless metrics engine. Every call is independent and reentrant.
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, inputs: &ValuationInputs) -> ValuationMetrics {
        calculate_all_metrics(&inputs.financials, &inputs.market, &inputs.assumptions)
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_per_share_guards() {
        for shares in [0.0, -1.0, -1_000.0] {
            assert_eq!(book_value_per_share(1_000.0, shares), 0.0);
            assert_eq!(earnings_per_share(1_000.0, shares), 0.0);
        }
        assert_relative_eq!(book_value_per_share(1_000.0, 4.0), 250.0);
    }

    #[test]
    fn test_equity_guards() {
        for equity in [0.0, -50.0] {
            assert_eq!(return_on_equity(10.0, equity), 0.0);
            assert_eq!(debt_to_equity(10.0, equity), 0.0);
        }
    }

    #[test]
    fn test_multiples_zero_for_non_positive_denominators() {
        assert_eq!(price_to_book(50.0, 0.0), 0.0);
        assert_eq!(price_to_book(50.0, -3.0), 0.0);
        assert_eq!(price_to_earnings(50.0, -2.0), 0.0);
        assert_eq!(payout_ratio(1.0, 0.0), 0.0);
        assert_eq!(dividend_yield(1.0, 0.0), 0.0);
        assert_eq!(earnings_yield(1.0, 0.0), 0.0);
        assert_eq!(return_on_assets(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_intrinsic_value_gordon() {
        let iv = intrinsic_value(5.5, 15.0, 5.0).unwrap();
        assert_relative_eq!(iv, 57.75, epsilon = 1e-9);
    }

    #[test]
    fn test_intrinsic_value_undefined() {
        assert_eq!(intrinsic_value(0.0, 15.0, 5.0), None);
        assert_eq!(intrinsic_value(-1.0, 15.0, 5.0), None);
        assert_eq!(intrinsic_value(5.5, 10.0, 10.0), None);
        assert_eq!(intrinsic_value(5.5, 8.0, 12.0), None);
    }

    #[test]
    fn test_margin_of_safety_sign() {
        let overvalued = margin_of_safety(Some(57.75), 76.5).unwrap();
        assert_relative_eq!(overvalued, -32.467, epsilon = 0.01);

        let undervalued = margin_of_safety(Some(100.0), 60.0).unwrap();
        assert_relative_eq!(undervalued, 40.0, epsilon = 1e-9);

        assert_eq!(margin_of_safety(None, 60.0), None);
        assert_eq!(margin_of_safety(Some(0.0), 60.0), None);
        assert_eq!(margin_of_safety(Some(-4.0), 60.0), None);
    }

    #[test]
    fn test_dividend_growth_and_peg() {
        let growth = dividend_growth_rate(5.5, 4.75).unwrap();
        assert_relative_eq!(growth, 15.789, epsilon = 0.001);
        assert_eq!(dividend_growth_rate(5.5, 0.0), None);

        assert_relative_eq!(peg_ratio(10.0, Some(5.0)).unwrap(), 2.0);
        assert_eq!(peg_ratio(10.0, None), None);
        assert_eq!(peg_ratio(10.0, Some(-3.0)), None);
        assert_eq!(peg_ratio(10.0, Some(0.0)), None);
        assert_eq!(peg_ratio(0.0, Some(5.0)), None);
    }

    #[test]
    fn test_assess_roa_by_sector() {
        assert_eq!(assess_roa(3.3, Sector::Bank), Interpretation::Positive);
        assert_eq!(assess_roa(1.5, Sector::Bank), Interpretation::Neutral);
        assert_eq!(assess_roa(0.5, Sector::Bank), Interpretation::Negative);
        assert_eq!(assess_roa(3.3, Sector::NonBank), Interpretation::Negative);
        assert_eq!(assess_roa(12.0, Sector::NonBank), Interpretation::Positive);
    }

    #[test]
    fn test_week_52_position() {
        assert_relative_eq!(week_52_position(76.5, 40.0, 100.0).unwrap(), 60.833, epsilon = 0.001);
        assert_eq!(week_52_position(50.0, 40.0, 40.0), None);
        assert_eq!(week_52_position(50.0, 0.0, 0.0), None);
    }

    #[test]
    fn test_sample_metrics() {
        let metrics = MetricsEngine::new().calculate(&ValuationInputs::sample());

        assert_relative_eq!(metrics.bvps, 66.59, epsilon = 0.01);
        assert_relative_eq!(metrics.pb_ratio, 1.149, epsilon = 0.001);
        assert_relative_eq!(metrics.eps, 13.27, epsilon = 0.01);
        assert_relative_eq!(metrics.pe_ratio, 5.764, epsilon = 0.01);
        assert_relative_eq!(metrics.dividend_yield, 7.19, epsilon = 0.01);
        assert_relative_eq!(metrics.payout_ratio, 41.44, epsilon = 0.01);
        assert_relative_eq!(metrics.roe, 19.93, epsilon = 0.01);
        assert_relative_eq!(metrics.roa, 3.283, epsilon = 0.001);
        assert_relative_eq!(metrics.debt_to_equity, 5.070, epsilon = 0.001);
        assert_relative_eq!(metrics.intrinsic_value.unwrap(), 57.75, epsilon = 1e-9);
        assert_relative_eq!(metrics.margin_of_safety.unwrap(), -32.47, epsilon = 0.01);
        assert_relative_eq!(metrics.earnings_yield, 17.35, epsilon = 0.01);
        assert_relative_eq!(metrics.dividend_growth_rate.unwrap(), 15.79, epsilon = 0.01);
        assert_relative_eq!(metrics.peg_ratio.unwrap(), 0.365, epsilon = 0.001);
    }

    #[test]
    fn test_degenerate_snapshot_is_finite() {
        let mut inputs = ValuationInputs::sample();
        inputs.financials.shares_outstanding = 0.0;
        inputs.financials.total_shareholders_equity = -10.0;
        inputs.financials.total_assets = 0.0;
        inputs.financials.dividend_per_share = 0.0;
        inputs.financials.previous_year_dividend = 0.0;
        inputs.market.current_stock_price = 0.0;

        let m = MetricsEngine::default().calculate(&inputs);
        for v in [
            m.bvps, m.pb_ratio, m.eps, m.pe_ratio, m.dividend_yield, m.payout_ratio,
            m.roe, m.roa, m.debt_to_equity, m.earnings_yield,
        ] {
            assert_eq!(v, 0.0);
        }
        assert_eq!(m.intrinsic_value, None);
        assert_eq!(m.margin_of_safety, None);
        assert_eq!(m.dividend_growth_rate, None);
        assert_eq!(m.peg_ratio, None);
    }
}
