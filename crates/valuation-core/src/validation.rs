//! Input validation run before either engine.
//!
//! The engines are total over the reals, so nothing here protects them from
//! panicking. These rules reject snapshots whose results would be meaningless.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ValuationError, ValuationInputs};

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path, e.g. `market.current_stock_price`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Returns false (and records the error) for NaN or infinite input.
    fn finite(&mut self, field: &str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.push(field, "Must be a number");
            false
        }
    }

    fn at_least(&mut self, field: &str, value: f64, min: f64, message: &str) {
        if self.finite(field, value) && value < min {
            self.push(field, message);
        }
    }

    fn within(&mut self, field: &str, value: f64, min: f64, max: f64, low_msg: &str, high_msg: &str) {
        if !self.finite(field, value) {
            return;
        }
        if value < min {
            self.push(field, low_msg);
        } else if value > max {
            self.push(field, high_msg);
        }
    }
}

/// Check a snapshot against the form rules, collecting every violation.
pub fn validate_inputs(inputs: &ValuationInputs) -> Result<(), ValuationError> {
    let mut c = Checker { errors: Vec::new() };

    if inputs.company.name.trim().is_empty() {
        c.push("company.name", "Company name is required");
    }
    if inputs.company.financial_year.trim().chars().count() < 4 {
        c.push("company.financial_year", "Financial year is required");
    }

    let f = &inputs.financials;
    c.at_least("financials.total_shareholders_equity", f.total_shareholders_equity, 0.0, "Must be positive");
    c.at_least("financials.shares_outstanding", f.shares_outstanding, 1.0, "Must have at least 1 share");
    c.finite("financials.profit_after_tax", f.profit_after_tax);
    c.at_least("financials.total_revenue", f.total_revenue, 0.0, "Must be positive");
    c.at_least("financials.total_assets", f.total_assets, 0.0, "Must be positive");
    c.at_least("financials.total_liabilities", f.total_liabilities, 0.0, "Must be positive");
    c.at_least("financials.dividend_per_share", f.dividend_per_share, 0.0, "Must be positive");
    c.at_least("financials.previous_year_dividend", f.previous_year_dividend, 0.0, "Must be positive");

    let m = &inputs.market;
    c.at_least("market.current_stock_price", m.current_stock_price, 0.01, "Price must be positive");
    c.at_least("market.week_52_high", m.week_52_high, 0.0, "Must be positive");
    c.at_least("market.week_52_low", m.week_52_low, 0.0, "Must be positive");

    let a = &inputs.assumptions;
    c.within(
        "assumptions.required_rate_of_return",
        a.required_rate_of_return,
        1.0,
        50.0,
        "Must be at least 1%",
        "Must be at most 50%",
    );
    c.within(
        "assumptions.expected_dividend_growth_rate",
        a.expected_dividend_growth_rate,
        0.0,
        30.0,
        "Must be positive",
        "Must be at most 30%",
    );
    c.within(
        "assumptions.risk_free_rate",
        a.risk_free_rate,
        0.0,
        30.0,
        "Must be positive",
        "Must be at most 30%",
    );
    if a.expected_dividend_growth_rate >= a.required_rate_of_return {
        c.push(
            "assumptions.expected_dividend_growth_rate",
            "Growth rate must be less than required return for Gordon model",
        );
    }

    if c.errors.is_empty() {
        Ok(())
    } else {
        Err(ValuationError::InvalidInput(c.errors))
    }
}
