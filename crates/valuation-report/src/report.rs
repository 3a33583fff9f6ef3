use chrono::{DateTime, Utc};
use serde::Serialize;
use valuation_core::{AnalysisResult, Interpretation, ValuationError};

use crate::formatting::{format_date, format_kes, format_percent, format_ratio, format_with_commas};

pub const REPORT_TITLE: &str = "NSE Stock Valuation Report";

pub const DISCLAIMER: &str = "This report is for educational and informational purposes only and \
should not be considered as financial advice. Always consult with a qualified financial advisor \
before making investment decisions. Past performance does not guarantee future results.";

/// How a metric value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Kes,
    Ratio,
    Percent,
    Plain,
}

impl MetricUnit {
    /// Render a metric; absent values read `N/A`.
    pub fn format(&self, value: Option<f64>) -> String {
        let Some(v) = value else {
            return "N/A".to_string();
        };
        match self {
            MetricUnit::Kes => format_kes(v),
            MetricUnit::Ratio => format_ratio(v, 2),
            MetricUnit::Percent => format_percent(v, 2),
            MetricUnit::Plain => format!("{:.2}", v),
        }
    }
}

/// Marker and color for an interpretation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterpretationStyle {
    pub marker: &'static str,
    pub color: &'static str,
}

impl InterpretationStyle {
    pub fn for_interpretation(interpretation: Interpretation) -> Self {
        match interpretation {
            Interpretation::Positive => Self { marker: "+", color: "#28A745" },
            Interpretation::Neutral => Self { marker: "=", color: "#FFC107" },
            Interpretation::Negative => Self { marker: "-", color: "#DC3545" },
        }
    }
}

/// One labelled value in the metrics section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub label: String,
    pub value: String,
    pub interpretation: Option<Interpretation>,
}

impl ReportLine {
    fn new(label: &str, value: String, interpretation: Option<Interpretation>) -> Self {
        Self {
            label: label.to_string(),
            value,
            interpretation,
        }
    }
}

/// Everything an exporter needs to lay out a report, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationReport {
    pub title: String,
    pub company_name: String,
    pub subtitle: String,
    pub generated: String,
    pub verdict_label: String,
    pub verdict_color: String,
    pub score_text: String,
    pub metrics: Vec<ReportLine>,
    pub inputs: Vec<String>,
    pub scoring_breakdown: Vec<String>,
    pub disclaimer: String,
    pub file_stem: String,
}

impl ValuationReport {
    pub fn from_analysis(analysis: &AnalysisResult, generated_at: DateTime<Utc>) -> Self {
        let AnalysisResult {
            inputs,
            metrics,
            scoring,
            ..
        } = analysis;
        let scores = &scoring.scores;
        let price = inputs.market.current_stock_price;
        let sector = inputs.company.sector;

        let intrinsic_reading = match metrics.intrinsic_value {
            Some(iv) if iv > price => Interpretation::Positive,
            _ => Interpretation::Neutral,
        };
        let growth_reading = match metrics.dividend_growth_rate {
            Some(g) if g > 0.0 => Interpretation::Positive,
            _ => Interpretation::Neutral,
        };
        let peg_reading = match metrics.peg_ratio {
            Some(p) if p < 1.0 => Interpretation::Positive,
            _ => Interpretation::Neutral,
        };

        let metric_rows: Vec<ReportLine> = vec![
            ReportLine::new("Book Value Per Share (BVPS)", MetricUnit::Kes.format(Some(metrics.bvps)), None),
            ReportLine::new("Price-to-Book Ratio (P/B)", MetricUnit::Ratio.format(Some(metrics.pb_ratio)), Some(scores.pb_ratio.interpretation)),
            ReportLine::new("Earnings Per Share (EPS)", MetricUnit::Kes.format(Some(metrics.eps)), None),
            ReportLine::new("Price-to-Earnings Ratio (P/E)", MetricUnit::Ratio.format(Some(metrics.pe_ratio)), Some(scores.pe_ratio.interpretation)),
            ReportLine::new("Dividend Yield", MetricUnit::Percent.format(Some(metrics.dividend_yield)), Some(scores.dividend_yield.interpretation)),
            ReportLine::new("Payout Ratio", MetricUnit::Percent.format(Some(metrics.payout_ratio)), Some(scores.payout_ratio.interpretation)),
            ReportLine::new("Return on Equity (ROE)", MetricUnit::Percent.format(Some(metrics.roe)), Some(scores.roe.interpretation)),
            ReportLine::new("Return on Assets (ROA)", MetricUnit::Percent.format(Some(metrics.roa)), Some(metrics_engine::assess_roa(metrics.roa, sector))),
            ReportLine::new("Debt-to-Equity Ratio", MetricUnit::Ratio.format(Some(metrics.debt_to_equity)), Some(scores.debt_to_equity.interpretation)),
            ReportLine::new("Earnings Yield", MetricUnit::Percent.format(Some(metrics.earnings_yield)), Some(scores.earnings_yield_vs_t_bill.interpretation)),
            ReportLine::new("Intrinsic Value", MetricUnit::Kes.format(metrics.intrinsic_value), Some(intrinsic_reading)),
            ReportLine::new("Margin of Safety", MetricUnit::Percent.format(metrics.margin_of_safety), Some(scores.margin_of_safety.interpretation)),
            ReportLine::new("Dividend Growth Rate", MetricUnit::Percent.format(metrics.dividend_growth_rate), Some(growth_reading)),
            ReportLine::new("PEG Ratio", MetricUnit::Plain.format(metrics.peg_ratio), Some(peg_reading)),
        ];

        let f = &inputs.financials;
        let m = &inputs.market;
        let a = &inputs.assumptions;
        let week_52 = metrics_engine::week_52_position(price, m.week_52_low, m.week_52_high);
        let input_rows = vec![
            format!("Current Stock Price: KES {}", format_with_commas(m.current_stock_price)),
            format!("52-Week High: KES {}", format_with_commas(m.week_52_high)),
            format!("52-Week Low: KES {}", format_with_commas(m.week_52_low)),
            format!("52-Week Position: {}", MetricUnit::Percent.format(week_52)),
            format!("Total Shareholders' Equity: KES {}", format_with_commas(f.total_shareholders_equity)),
            format!("Shares Outstanding: {}", format_with_commas(f.shares_outstanding)),
            format!("Profit After Tax: KES {}", format_with_commas(f.profit_after_tax)),
            format!("Total Revenue: KES {}", format_with_commas(f.total_revenue)),
            format!("Total Assets: KES {}", format_with_commas(f.total_assets)),
            format!("Total Liabilities: KES {}", format_with_commas(f.total_liabilities)),
            format!("Dividend Per Share: KES {}", format_with_commas(f.dividend_per_share)),
            format!("Required Return: {}%", format_with_commas(a.required_rate_of_return)),
            format!("Expected Growth: {}%", format_with_commas(a.expected_dividend_growth_rate)),
            format!("Risk-Free Rate: {}%", format_with_commas(a.risk_free_rate)),
        ];

        let scoring_breakdown = scores
            .entries()
            .iter()
            .map(|(metric, s)| {
                format!(
                    "{}: {}{} (Weight: {}%)",
                    metric.to_label(),
                    if s.score > 0 { "+" } else { "" },
                    s.score,
                    format_with_commas(s.weight)
                )
            })
            .collect();

        Self {
            title: REPORT_TITLE.to_string(),
            company_name: inputs.company.name.clone(),
            subtitle: format!(
                "Financial Year: {} | Sector: {}",
                inputs.company.financial_year,
                sector.to_label()
            ),
            generated: format!("Generated: {}", format_date(&generated_at)),
            verdict_label: scoring.verdict.to_label().to_string(),
            verdict_color: scoring.verdict_color.clone(),
            score_text: format!("Score: {:.2}", scoring.total_weighted_score),
            metrics: metric_rows,
            inputs: input_rows,
            scoring_breakdown,
            disclaimer: DISCLAIMER.to_string(),
            file_stem: file_stem(&inputs.company.name, &inputs.company.financial_year),
        }
    }

    /// Plain-text rendering for terminals and `.txt` exports.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = |title: &str| format!("\n{}\n{}\n", title, "-".repeat(title.len()));

        out.push_str(&format!("{}\n{}\n", self.title, "=".repeat(self.title.len())));
        out.push_str(&format!("{}\n{}\n{}\n", self.company_name, self.subtitle, self.generated));
        out.push_str(&format!(
            "\nVerdict: {} ({})\n{}\n",
            self.verdict_label, self.verdict_color, self.score_text
        ));

        out.push_str(&rule("Valuation Metrics"));
        for line in &self.metrics {
            let marker = line
                .interpretation
                .map(|i| InterpretationStyle::for_interpretation(i).marker)
                .unwrap_or(" ");
            out.push_str(&format!("[{}] {:<32} {:>26}\n", marker, line.label, line.value));
        }

        out.push_str(&rule("Input Data Summary"));
        for line in &self.inputs {
            out.push_str(line);
            out.push('\n');
        }

        out.push_str(&rule("Scoring Breakdown"));
        for line in &self.scoring_breakdown {
            out.push_str(line);
            out.push('\n');
        }

        out.push_str(&format!("\nDISCLAIMER\n{}\n", self.disclaimer));
        out
    }

    pub fn to_json(&self) -> Result<String, ValuationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `<Company_Name>_Valuation_<year>`, whitespace runs collapsed to `_`.
pub fn file_stem(company_name: &str, financial_year: &str) -> String {
    let name = company_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_Valuation_{}", name, financial_year.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use metrics_engine::MetricsEngine;
    use scoring_engine::ScoringEngine;
    use valuation_core::ValuationInputs;

    fn sample_analysis() -> AnalysisResult {
        let inputs = ValuationInputs::sample();
        let metrics = MetricsEngine::new().calculate(&inputs);
        let scoring = ScoringEngine::new().score(&metrics, 10.0, inputs.company.sector);
        AnalysisResult {
            inputs,
            metrics,
            scoring,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
        }
    }

    fn report() -> ValuationReport {
        let generated = Utc.with_ymd_and_hms(2026, 10, 18, 9, 31, 0).unwrap();
        ValuationReport::from_analysis(&sample_analysis(), generated)
    }

    fn metric<'a>(report: &'a ValuationReport, label: &str) -> &'a ReportLine {
        report
            .metrics
            .iter()
            .find(|l| l.label == label)
            .unwrap_or_else(|| panic!("missing metric {}", label))
    }

    #[test]
    fn test_header() {
        let r = report();
        assert_eq!(r.title, "NSE Stock Valuation Report");
        assert_eq!(r.company_name, "NCBA Group PLC");
        assert_eq!(r.subtitle, "Financial Year: 2024 | Sector: Banking");
        assert_eq!(r.generated, "Generated: 18 Oct 2026, 09:31");
        assert_eq!(r.verdict_label, "BUY");
        assert_eq!(r.verdict_color, "#5cb85c");
        assert_eq!(r.score_text, "Score: 1.25");
        assert_eq!(r.file_stem, "NCBA_Group_PLC_Valuation_2024");
    }

    #[test]
    fn test_fourteen_metric_rows() {
        let r = report();
        assert_eq!(r.metrics.len(), 14);
        assert_eq!(metric(&r, "Price-to-Book Ratio (P/B)").value, "1.15x");
        assert_eq!(metric(&r, "Dividend Yield").value, "7.19%");
        assert_eq!(metric(&r, "Intrinsic Value").value, "KES 57.75");
        assert_eq!(metric(&r, "Margin of Safety").value, "-32.47%");
        assert_eq!(
            metric(&r, "Margin of Safety").interpretation,
            Some(Interpretation::Negative)
        );
        assert_eq!(
            metric(&r, "Return on Assets (ROA)").interpretation,
            Some(Interpretation::Positive)
        );
        assert_eq!(metric(&r, "Book Value Per Share (BVPS)").interpretation, None);
    }

    #[test]
    fn test_absent_metrics_read_na() {
        let mut analysis = sample_analysis();
        analysis.metrics.intrinsic_value = None;
        analysis.metrics.margin_of_safety = None;
        analysis.metrics.peg_ratio = None;

        let r = ValuationReport::from_analysis(&analysis, Utc::now());
        assert_eq!(metric(&r, "Intrinsic Value").value, "N/A");
        assert_eq!(metric(&r, "Margin of Safety").value, "N/A");
        assert_eq!(metric(&r, "PEG Ratio").value, "N/A");
        assert_eq!(
            metric(&r, "Intrinsic Value").interpretation,
            Some(Interpretation::Neutral)
        );
    }

    #[test]
    fn test_inputs_and_breakdown() {
        let r = report();
        assert!(r.inputs.contains(&"Current Stock Price: KES 76.5".to_string()));
        assert!(r.inputs.contains(&"Shares Outstanding: 1,647,519,200".to_string()));
        assert!(r.inputs.contains(&"52-Week Position: 60.83%".to_string()));

        assert_eq!(r.scoring_breakdown.len(), 8);
        assert_eq!(r.scoring_breakdown[0], "P/B Ratio: +1 (Weight: 12.5%)");
        assert_eq!(r.scoring_breakdown[4], "Margin of Safety: -1 (Weight: 12.5%)");
    }

    #[test]
    fn test_render_text_sections() {
        let text = report().render_text();
        assert!(text.starts_with("NSE Stock Valuation Report\n"));
        for section in ["Valuation Metrics", "Input Data Summary", "Scoring Breakdown", "DISCLAIMER"] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("Verdict: BUY (#5cb85c)"));
    }

    #[test]
    fn test_json_export() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["verdictLabel"], "BUY");
        assert_eq!(value["metrics"].as_array().unwrap().len(), 14);
    }

    #[test]
    fn test_interpretation_styles_differ() {
        let p = InterpretationStyle::for_interpretation(Interpretation::Positive);
        let n = InterpretationStyle::for_interpretation(Interpretation::Neutral);
        let x = InterpretationStyle::for_interpretation(Interpretation::Negative);
        assert_ne!(p.marker, n.marker);
        assert_ne!(n.marker, x.marker);
        assert_eq!(x.color, "#DC3545");
    }

    #[test]
    fn test_file_stem_collapses_whitespace() {
        assert_eq!(file_stem("  Safaricom   PLC ", " 2023 "), "Safaricom_PLC_Valuation_2023");
    }
}
