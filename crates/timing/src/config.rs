//! Configuration for timing trees and their reports.

use crate::error::TimingResult;
use serde::{Deserialize, Serialize};

/// Where `print` and `print_mean_std_dev` write their output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSink {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
    /// One `tracing` info event per report line, target `timing::report`
    Log,
}

/// Report formatting options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Output destination for the convenience print functions
    pub sink: ReportSink,
    /// Digits after the decimal point for times in seconds
    pub precision: usize,
    /// Include per-iteration min/max in the outline report
    pub show_min_max: bool,
    /// Print underscores in labels as spaces
    pub underscores_as_spaces: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sink: ReportSink::Stdout,
            precision: 6,
            show_min_max: true,
            underscores_as_spaces: true,
        }
    }
}

impl ReportConfig {
    /// Builder method to set the output sink.
    pub fn with_sink(mut self, sink: ReportSink) -> Self {
        self.sink = sink;
        self
    }

    /// Builder method to set the time precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder method to toggle min/max columns.
    pub fn with_min_max(mut self, show: bool) -> Self {
        self.show_min_max = show;
        self
    }
}

/// Configuration for a timing tree.
///
/// Loads from JSON with every field optional:
///
/// ```rust
/// use timing::{ReportSink, TimingConfig};
///
/// let config = TimingConfig::from_json(r#"{"checkNesting": true, "report": {"sink": "log"}}"#).unwrap();
/// assert!(config.check_nesting);
/// assert_eq!(config.report.sink, ReportSink::Log);
/// assert_eq!(config.report.precision, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    /// Refuse a `toc` whose label differs from the open region.
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub check_nesting: bool,
    /// Report formatting
    pub report: ReportConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            check_nesting: cfg!(debug_assertions),
            report: ReportConfig::default(),
        }
    }
}

impl TimingConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> TimingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this config to pretty JSON.
    pub fn to_json(&self) -> TimingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder method to toggle nesting checks.
    pub fn with_check_nesting(mut self, check: bool) -> Self {
        self.check_nesting = check;
        self
    }

    /// Builder method to replace report options.
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TimingConfig::default();
        assert_eq!(config.check_nesting, cfg!(debug_assertions));
        assert_eq!(config.report.sink, ReportSink::Stdout);
        assert_eq!(config.report.precision, 6);
        assert!(config.report.show_min_max);
    }

    #[test]
    fn test_from_empty_json() {
        let config = TimingConfig::from_json("{}").unwrap();
        assert_eq!(config, TimingConfig::default());
    }

    #[test]
    fn test_from_json_partial_report() {
        let config =
            TimingConfig::from_json(r#"{"checkNesting": false, "report": {"precision": 3, "sink": "stderr"}}"#)
                .unwrap();
        assert!(!config.check_nesting);
        assert_eq!(config.report.precision, 3);
        assert_eq!(config.report.sink, ReportSink::Stderr);
        assert!(config.report.underscores_as_spaces);
    }

    #[test]
    fn test_from_invalid_json() {
        assert!(TimingConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = TimingConfig::new()
            .with_check_nesting(true)
            .with_report(ReportConfig::default().with_sink(ReportSink::Log).with_precision(2));

        assert!(config.check_nesting);
        assert_eq!(config.report.sink, ReportSink::Log);
        assert_eq!(config.report.precision, 2);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"checkNesting\": true"));
        assert_eq!(TimingConfig::from_json(&json).unwrap(), config);
    }
}
