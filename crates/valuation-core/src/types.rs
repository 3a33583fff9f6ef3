use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sector selects which leverage and asset-efficiency bands apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sector {
    Bank,
    NonBank,
}

impl Sector {
    pub fn thresholds(&self) -> SectorThresholds {
        match self {
            Sector::Bank => SectorThresholds {
                debt_to_equity: DebtToEquityBands {
                    conservative: 5.0,
                    moderate: 8.0,
                    leveraged: 12.0,
                },
                roa: RoaBands {
                    poor: 1.0,
                    acceptable: 2.0,
                    good: 3.0,
                },
            },
            Sector::NonBank => SectorThresholds {
                debt_to_equity: DebtToEquityBands {
                    conservative: 0.5,
                    moderate: 1.0,
                    leveraged: 2.0,
                },
                roa: RoaBands {
                    poor: 5.0,
                    acceptable: 8.0,
                    good: 12.0,
                },
            },
        }
    }

    /// Human-readable label for reports
    pub fn to_label(&self) -> &'static str {
        match self {
            Sector::Bank => "Banking",
            Sector::NonBank => "Non-Banking",
        }
    }
}

/// Debt-to-equity band edges, ascending risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtToEquityBands {
    pub conservative: f64,
    pub moderate: f64,
    pub leveraged: f64,
}

/// Return-on-assets band edges, ascending quality (percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoaBands {
    pub poor: f64,
    pub acceptable: f64,
    pub good: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorThresholds {
    pub debt_to_equity: DebtToEquityBands,
    pub roa: RoaBands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub financial_year: String,
    pub sector: Sector,
}

/// Reported figures from the annual report, single currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    pub total_shareholders_equity: f64,
    pub shares_outstanding: f64,
    pub profit_after_tax: f64,
    pub total_revenue: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub dividend_per_share: f64,
    pub previous_year_dividend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInputs {
    pub current_stock_price: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
}

/// Discount-model assumptions, all as percentages (15.0 means 15%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionInputs {
    pub required_rate_of_return: f64,
    pub expected_dividend_growth_rate: f64,
    pub risk_free_rate: f64,
}

impl Default for AssumptionInputs {
    fn default() -> Self {
        Self {
            required_rate_of_return: 15.0,
            expected_dividend_growth_rate: 5.0,
            risk_free_rate: 10.0,
        }
    }
}

/// One snapshot of everything a calculation consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInputs {
    pub company: CompanyInfo,
    pub financials: FinancialInputs,
    pub market: MarketInputs,
    #[serde(default)]
    pub assumptions: AssumptionInputs,
}

impl ValuationInputs {
    /// NCBA FY2024 figures, used by `--sample` and the tests.
    pub fn sample() -> Self {
        Self {
            company: CompanyInfo {
                name: "NCBA Group PLC".to_string(),
                financial_year: "2024".to_string(),
                sector: Sector::Bank,
            },
            financials: FinancialInputs {
                total_shareholders_equity: 109_714_749_000.0,
                shares_outstanding: 1_647_519_200.0,
                profit_after_tax: 21_865_767_000.0,
                total_revenue: 57_220_000_000.0,
                total_assets: 666_000_000_000.0,
                total_liabilities: 556_285_251_000.0,
                dividend_per_share: 5.5,
                previous_year_dividend: 4.75,
            },
            market: MarketInputs {
                current_stock_price: 76.5,
                week_52_high: 100.0,
                week_52_low: 40.0,
            },
            assumptions: AssumptionInputs::default(),
        }
    }
}

/// The fourteen derived valuation numbers.
///
/// `None` marks a value that is mathematically undefined for the inputs,
/// which is distinct from a degenerate-but-defined `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMetrics {
    pub bvps: f64,
    pub pb_ratio: f64,
    pub eps: f64,
    pub pe_ratio: f64,
    /// Percent
    pub dividend_yield: f64,
    /// Percent
    pub payout_ratio: f64,
    /// Percent
    pub roe: f64,
    /// Percent
    pub roa: f64,
    pub debt_to_equity: f64,
    pub intrinsic_value: Option<f64>,
    /// Percent, positive means undervalued
    pub margin_of_safety: Option<f64>,
    /// Percent
    pub earnings_yield: f64,
    /// Percent
    pub dividend_growth_rate: Option<f64>,
    pub peg_ratio: Option<f64>,
}

/// How a scored value reads to an investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    Positive,
    Neutral,
    Negative,
}

impl Interpretation {
    /// Classify a discrete score: above zero reads positive, below zero negative.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => Interpretation::Positive,
            0 => Interpretation::Neutral,
            _ => Interpretation::Negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScore {
    pub value: f64,
    /// -1 to +2
    pub score: i32,
    /// Percentage weight
    pub weight: f64,
    pub interpretation: Interpretation,
    pub description: String,
}

/// Key for each entry of [`MetricScores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoredMetric {
    PbRatio,
    PeRatio,
    DividendYield,
    Roe,
    MarginOfSafety,
    PayoutRatio,
    EarningsYieldVsTBill,
    DebtToEquity,
}

impl ScoredMetric {
    pub fn to_label(&self) -> &'static str {
        match self {
            ScoredMetric::PbRatio => "P/B Ratio",
            ScoredMetric::PeRatio => "P/E Ratio",
            ScoredMetric::DividendYield => "Dividend Yield",
            ScoredMetric::Roe => "Return on Equity",
            ScoredMetric::MarginOfSafety => "Margin of Safety",
            ScoredMetric::PayoutRatio => "Payout Ratio",
            ScoredMetric::EarningsYieldVsTBill => "Earnings Yield vs T-Bill",
            ScoredMetric::DebtToEquity => "Debt-to-Equity",
        }
    }
}

/// Per-metric scores that feed the weighted verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScores {
    pub pb_ratio: MetricScore,
    pub pe_ratio: MetricScore,
    pub dividend_yield: MetricScore,
    pub roe: MetricScore,
    pub margin_of_safety: MetricScore,
    pub payout_ratio: MetricScore,
    pub earnings_yield_vs_t_bill: MetricScore,
    pub debt_to_equity: MetricScore,
}

impl MetricScores {
    /// Entries in display order.
    pub fn entries(&self) -> [(ScoredMetric, &MetricScore); 8] {
        [
            (ScoredMetric::PbRatio, &self.pb_ratio),
            (ScoredMetric::PeRatio, &self.pe_ratio),
            (ScoredMetric::DividendYield, &self.dividend_yield),
            (ScoredMetric::Roe, &self.roe),
            (ScoredMetric::MarginOfSafety, &self.margin_of_safety),
            (ScoredMetric::PayoutRatio, &self.payout_ratio),
            (ScoredMetric::EarningsYieldVsTBill, &self.earnings_yield_vs_t_bill),
            (ScoredMetric::DebtToEquity, &self.debt_to_equity),
        ]
    }

    pub fn get(&self, metric: ScoredMetric) -> &MetricScore {
        match metric {
            ScoredMetric::PbRatio => &self.pb_ratio,
            ScoredMetric::PeRatio => &self.pe_ratio,
            ScoredMetric::DividendYield => &self.dividend_yield,
            ScoredMetric::Roe => &self.roe,
            ScoredMetric::MarginOfSafety => &self.margin_of_safety,
            ScoredMetric::PayoutRatio => &self.payout_ratio,
            ScoredMetric::EarningsYieldVsTBill => &self.earnings_yield_vs_t_bill,
            ScoredMetric::DebtToEquity => &self.debt_to_equity,
        }
    }
}

/// Buy/sell recommendation derived from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Map a weighted mean score onto the five bands:
    /// > 1.5, (0.5, 1.5], [-0.5, 0.5], [-1.5, -0.5), < -1.5
    pub fn from_score(weighted_score: f64) -> Self {
        match weighted_score {
            s if s > 1.5 => Verdict::StrongBuy,
            s if s > 0.5 => Verdict::Buy,
            s if s >= -0.5 => Verdict::Hold,
            s if s >= -1.5 => Verdict::Sell,
            _ => Verdict::StrongSell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "STRONG BUY",
            Verdict::Buy => "BUY",
            Verdict::Hold => "HOLD",
            Verdict::Sell => "SELL",
            Verdict::StrongSell => "STRONG SELL",
        }
    }

    /// Display color (hex). Presentation only.
    pub fn color(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "#28A745",
            Verdict::Buy => "#5cb85c",
            Verdict::Hold => "#FFC107",
            Verdict::Sell => "#fd7e14",
            Verdict::StrongSell => "#DC3545",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub scores: MetricScores,
    /// Weighted mean of the scores, not a sum
    pub total_weighted_score: f64,
    pub verdict: Verdict,
    pub verdict_color: String,
}

/// The atomic persisted unit. Never mutated once built; recalculating
/// produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub inputs: ValuationInputs,
    pub metrics: ValuationMetrics,
    pub scoring: ScoringResult,
    pub timestamp: DateTime<Utc>,
}

/// A named analysis in the saved list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    pub id: String,
    pub name: String,
    pub analysis: AnalysisResult,
    pub created_at: DateTime<Utc>,
}
