//! Turns derived metrics into discrete scores and a buy/sell verdict.
//!
//! Each scored metric lands in one of the fixed bands {-1, 0, +1, +2}.
//! All eight factors carry equal weight and the verdict is taken from the
//! weighted mean of their scores.

use valuation_core::{
    DebtToEquityBands, Interpretation, MetricScore, MetricScores, ScoringResult, Sector,
    ValuationMetrics, Verdict,
};

/// Number of factors in the weighted score.
pub const SCORED_FACTORS: usize = 8;

/// Equal share of 100 for each factor.
pub const EQUAL_WEIGHT: f64 = 100.0 / SCORED_FACTORS as f64;

fn metric_score(value: f64, score: i32, description: &str) -> MetricScore {
    MetricScore {
        value,
        score,
        weight: EQUAL_WEIGHT,
        interpretation: Interpretation::from_score(score),
        description: description.to_string(),
    }
}

/// P/B: < 1.0 +2, < 1.5 +1, < 2.0 0, else -1.
pub fn score_pb_ratio(pb_ratio: f64) -> MetricScore {
    let (score, description) = if pb_ratio <= 0.0 {
        (0, "Cannot calculate (negative or zero book value)")
    } else if pb_ratio < 1.0 {
        (2, "Trading below book value - potentially undervalued")
    } else if pb_ratio < 1.5 {
        (1, "Fairly valued relative to book value")
    } else if pb_ratio < 2.0 {
        (0, "Slight premium to book value")
    } else {
        (-1, "Expensive relative to book value")
    };
    metric_score(pb_ratio, score, description)
}

/// P/E: < 8 +2, < 12 +1, < 18 0, else -1.
pub fn score_pe_ratio(pe_ratio: f64) -> MetricScore {
    let (score, description) = if pe_ratio <= 0.0 {
        (0, "Cannot calculate (negative or zero earnings)")
    } else if pe_ratio < 8.0 {
        (2, "Very cheap - paying less than 8 years of earnings")
    } else if pe_ratio < 12.0 {
        (1, "Reasonably valued")
    } else if pe_ratio < 18.0 {
        (0, "Fairly valued - moderate growth expected")
    } else {
        (-1, "Expensive - high growth expectations priced in")
    };
    metric_score(pe_ratio, score, description)
}

/// Dividend yield: > 7% +2, 5-7% +1, 2-5% 0, < 2% -1.
pub fn score_dividend_yield(dividend_yield: f64) -> MetricScore {
    let (score, description) = if dividend_yield > 7.0 {
        (2, "High yield - strong income potential")
    } else if dividend_yield >= 5.0 {
        (1, "Good yield - solid income stock")
    } else if dividend_yield >= 2.0 {
        (0, "Moderate yield")
    } else {
        (-1, "Low yield - growth stock characteristics")
    };
    metric_score(dividend_yield, score, description)
}

/// ROE: > 20% +2, 15-20% +1, 10-15% 0, < 10% -1.
pub fn score_roe(roe: f64) -> MetricScore {
    let (score, description) = if roe > 20.0 {
        (2, "Excellent profitability - efficient use of equity")
    } else if roe >= 15.0 {
        (1, "Good profitability")
    } else if roe >= 10.0 {
        (0, "Acceptable profitability")
    } else {
        (-1, "Poor profitability")
    };
    metric_score(roe, score, description)
}

/// Margin of safety: > 30% +2, 15-30% +1, 0-15% 0, < 0% -1.
/// An undefined margin scores neutral and reports a value of 0.
pub fn score_margin_of_safety(margin_of_safety: Option<f64>) -> MetricScore {
    let Some(margin) = margin_of_safety else {
        return metric_score(0.0, 0, "Cannot calculate (no dividend or invalid assumptions)");
    };

    let (score, description) = if margin > 30.0 {
        (2, "Excellent value - significant discount to intrinsic value")
    } else if margin >= 15.0 {
        (1, "Good buying opportunity")
    } else if margin >= 0.0 {
        (0, "Fairly valued")
    } else {
        (-1, "Overvalued - trading above intrinsic value")
    };
    metric_score(margin, score, description)
}

/// Payout ratio: 30-50% +2, 50-70% +1, anything else 0.
pub fn score_payout_ratio(payout_ratio: f64) -> MetricScore {
    let (score, description) = if payout_ratio <= 0.0 {
        (0, "No dividend or negative earnings")
    } else if (30.0..=50.0).contains(&payout_ratio) {
        (2, "Balanced approach - room for growth and dividends")
    } else if payout_ratio > 50.0 && payout_ratio <= 70.0 {
        (1, "Generous dividend policy")
    } else if payout_ratio < 30.0 {
        (0, "Conservative - reinvesting in growth")
    } else {
        (0, "High payout - may not be sustainable long-term")
    };
    metric_score(payout_ratio, score, description)
}

/// Earnings yield relative to the risk-free (T-bill) rate:
/// > 1.5x +2, 1.0-1.5x +1, < 1.0x -1.
pub fn score_earnings_yield_vs_t_bill(earnings_yield: f64, risk_free_rate: f64) -> MetricScore {
    let (score, description) = if risk_free_rate <= 0.0 {
        (0, "Cannot compare (invalid risk-free rate)")
    } else {
        let ratio = earnings_yield / risk_free_rate;
        if ratio > 1.5 {
            (2, "Earnings yield significantly exceeds T-bill rate")
        } else if ratio >= 1.0 {
            (1, "Earnings yield exceeds T-bill rate")
        } else {
            (-1, "T-bills may offer better risk-adjusted returns")
        }
    };
    metric_score(earnings_yield, score, description)
}

/// Debt-to-equity against the sector bands. Banks carry deposits as
/// liabilities, so their bands sit ten times higher.
pub fn score_debt_to_equity(debt_to_equity: f64, sector: Sector) -> MetricScore {
    let DebtToEquityBands {
        conservative,
        moderate,
        leveraged,
    } = sector.thresholds().debt_to_equity;

    let descriptions = match sector {
        Sector::Bank => [
            "Conservative leverage for a bank",
            "Typical leverage for banking sector",
            "High but within banking norms",
            "Very high leverage even for a bank",
        ],
        Sector::NonBank => [
            "Conservative - low financial risk",
            "Moderate leverage - balanced approach",
            "Leveraged but manageable",
            "High leverage - significant financial risk",
        ],
    };

    let (score, description) = if debt_to_equity < conservative {
        (2, descriptions[0])
    } else if debt_to_equity < moderate {
        (1, descriptions[1])
    } else if debt_to_equity < leveraged {
        (0, descriptions[2])
    } else {
        (-1, descriptions[3])
    };
    metric_score(debt_to_equity, score, description)
}

/// Weighted mean of the scores: sum(score * weight) / sum(weight).
pub fn weighted_score(scores: &MetricScores) -> f64 {
    let (weighted_sum, total_weight) = scores
        .entries()
        .iter()
        .fold((0.0, 0.0), |(sum, weight), (_, s)| {
            (sum + s.score as f64 * s.weight, weight + s.weight)
        });

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

/// Score every factor and derive the verdict.
pub fn calculate_scoring(metrics: &ValuationMetrics, risk_free_rate: f64, sector: Sector) -> ScoringResult {
    let scores = MetricScores {
        pb_ratio: score_pb_ratio(metrics.pb_ratio),
        pe_ratio: score_pe_ratio(metrics.pe_ratio),
        dividend_yield: score_dividend_yield(metrics.dividend_yield),
        roe: score_roe(metrics.roe),
        margin_of_safety: score_margin_of_safety(metrics.margin_of_safety),
        payout_ratio: score_payout_ratio(metrics.payout_ratio),
        earnings_yield_vs_t_bill: score_earnings_yield_vs_t_bill(metrics.earnings_yield, risk_free_rate),
        debt_to_equity: score_debt_to_equity(metrics.debt_to_equity, sector),
    };

    let total_weighted_score = weighted_score(&scores);
    let verdict = Verdict::from_score(total_weighted_score);

    ScoringResult {
        scores,
        total_weighted_score,
        verdict,
        verdict_color: verdict.color().to_string(),
    }
}

/// Stateless scoring engine.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, metrics: &ValuationMetrics, risk_free_rate: f64, sector: Sector) -> ScoringResult {
        calculate_scoring(metrics, risk_free_rate, sector)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
