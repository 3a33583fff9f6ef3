//! Display values for a finished analysis: number formatting and the content
//! of an exported report. Layout of any binary document is left to the caller.

pub mod formatting;
pub mod report;

pub use formatting::*;
pub use report::{InterpretationStyle, MetricUnit, ReportLine, ValuationReport, DISCLAIMER};
