//! Quality report
//!
//! Per-metric verdicts with the measured value and threshold of every check,
//! plus a plain-text rendering and improvement suggestions for the checks
//! that failed.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The five gate metrics, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    FrequencyCoverage,
    DynamicRange,
    ActivityDistribution,
    SpectralVariety,
    Pacing,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::FrequencyCoverage,
        Metric::DynamicRange,
        Metric::ActivityDistribution,
        Metric::SpectralVariety,
        Metric::Pacing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::FrequencyCoverage => "frequency_coverage",
            Metric::DynamicRange => "dynamic_range",
            Metric::ActivityDistribution => "activity_distribution",
            Metric::SpectralVariety => "spectral_variety",
            Metric::Pacing => "pacing",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Acceptance rule for a measured value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Threshold {
    /// Strictly greater than `limit`
    Above { limit: f64 },
    /// Strictly less than `limit`
    Below { limit: f64 },
    /// Within `[low, high]`, inclusive
    Between { low: f64, high: f64 },
}

impl Threshold {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Threshold::Above { limit } => value > limit,
            Threshold::Below { limit } => value < limit,
            Threshold::Between { low, high } => value >= low && value <= high,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Above { limit } => write!(f, "> {}", limit),
            Threshold::Below { limit } => write!(f, "< {}", limit),
            Threshold::Between { low, high } => write!(f, "{} to {}", low, high),
        }
    }
}

/// One pass/fail comparison inside a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    /// `None` when the quantity is undefined for this input (e.g. silence)
    pub measured: Option<f64>,
    pub threshold: Threshold,
    pub passed: bool,
}

impl Check {
    /// Compare `measured` against `threshold`; an undefined value fails
    pub fn measure(name: &str, measured: Option<f64>, threshold: Threshold) -> Self {
        Self {
            name: name.to_string(),
            measured,
            threshold,
            passed: measured.map_or(false, |v| threshold.admits(v)),
        }
    }
}

/// Informational value reported alongside the checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub name: String,
    pub value: f64,
}

impl Detail {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metric: Metric,
    pub passed: bool,
    pub checks: Vec<Check>,
    pub details: Vec<Detail>,
}

impl MetricReport {
    /// A metric passes when every one of its checks passes
    pub fn new(metric: Metric, checks: Vec<Check>, details: Vec<Detail>) -> Self {
        let passed = !checks.is_empty() && checks.iter().all(|c| c.passed);
        Self {
            metric,
            passed,
            checks,
            details,
        }
    }

    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn detail(&self, name: &str) -> Option<f64> {
        self.details.iter().find(|d| d.name == name).map(|d| d.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub metrics: Vec<MetricReport>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    overall: &'static str,
    score: String,
    metrics: &'a [MetricReport],
    suggestions: Vec<&'static str>,
}

impl QualityReport {
    pub fn new(metrics: Vec<MetricReport>) -> Self {
        Self { metrics }
    }

    /// Number of metrics that passed
    pub fn score(&self) -> usize {
        self.metrics.iter().filter(|m| m.passed).count()
    }

    pub fn total(&self) -> usize {
        self.metrics.len()
    }

    pub fn passed(&self) -> bool {
        self.metrics.iter().all(|m| m.passed)
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed() {
            "PASS"
        } else {
            "FAIL"
        }
    }

    /// `N/5` style score string
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.score(), self.total())
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricReport> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// Improvement hints for every failing check, deduplicated, in report order
    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for report in self.metrics.iter().filter(|m| !m.passed) {
            for check in report.checks.iter().filter(|c| !c.passed) {
                if let Some(hint) = suggestion(report.metric, &check.name) {
                    if !out.contains(&hint) {
                        out.push(hint);
                    }
                }
            }
        }
        out
    }

    /// Human-readable report
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "SOUNDTRACK QUALITY REPORT");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Overall Score: {} tests passed", self.score_label());
        let _ = writeln!(out, "Status: {}", self.verdict());

        for report in &self.metrics {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{} {}",
                mark(report.passed),
                report.metric.name().to_uppercase()
            );
            for check in &report.checks {
                let measured = check
                    .measured
                    .map_or_else(|| "undefined".to_string(), |v| format!("{:.4}", v));
                let _ = writeln!(
                    out,
                    "  {} {}: {} (required {})",
                    mark(check.passed),
                    check.name,
                    measured,
                    check.threshold
                );
            }
            if !report.details.is_empty() {
                let details: Vec<String> = report
                    .details
                    .iter()
                    .map(|d| format!("{}={:.4}", d.name, d.value))
                    .collect();
                let _ = writeln!(out, "  Details: {}", details.join(", "));
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "IMPROVEMENT SUGGESTIONS:");
        let _ = writeln!(out, "{}", rule);
        let suggestions = self.suggestions();
        if suggestions.is_empty() {
            let _ = writeln!(out, "No improvements needed: all quality criteria met");
        } else {
            for hint in suggestions {
                let _ = writeln!(out, "- {}", hint);
            }
        }
        out
    }

    /// Pretty JSON with the verdict, score and suggestions alongside the metrics
    pub fn to_json(&self) -> Result<String> {
        let document = ReportDocument {
            overall: self.verdict(),
            score: self.score_label(),
            metrics: &self.metrics,
            suggestions: self.suggestions(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

fn mark(passed: bool) -> &'static str {
    if passed {
        "✓"
    } else {
        "✗"
    }
}

fn suggestion(metric: Metric, check: &str) -> Option<&'static str> {
    use super::{activity, coverage, dynamics, pacing, variety};

    let hint = match (metric, check) {
        (Metric::FrequencyCoverage, coverage::HAS_SUB_BASS) => {
            "Add more sub-bass content (20-60 Hz) for visceral impact"
        }
        (Metric::FrequencyCoverage, coverage::HAS_BASS) => {
            "Strengthen the bass band (60-250 Hz) so the low end is not hollow"
        }
        (Metric::FrequencyCoverage, coverage::HAS_MIDS) => {
            "Bring up mid-range voices (500-2000 Hz) such as melody or choir"
        }
        (Metric::FrequencyCoverage, coverage::HAS_HIGHS) => {
            "Add high-frequency shimmer or effects for airiness"
        }
        (Metric::FrequencyCoverage, coverage::NOT_TOO_MID_HEAVY) => {
            "Pull back the mids (500-2000 Hz) to avoid a muddy mix"
        }
        (Metric::DynamicRange, dynamics::HAS_DYNAMICS) => {
            "Increase dynamic variation: add quieter and louder moments"
        }
        (Metric::DynamicRange, dynamics::NOT_OVER_DYNAMIC) => {
            "Fill the gaps between loud events so the mix is less sparse"
        }
        (Metric::DynamicRange, dynamics::ADEQUATE_VOLUME) => "Raise the overall level of the mix",
        (Metric::ActivityDistribution, activity::MOSTLY_ACTIVE) => {
            "Fill silent stretches so sound is present throughout"
        }
        (Metric::ActivityDistribution, activity::HAS_VARIATION) => {
            "Vary the energy over time so the mix is not monotonous"
        }
        (Metric::SpectralVariety, variety::HAS_TIMBRAL_VARIETY) => {
            "Add more timbral changes over time: vary the sound palette"
        }
        (Metric::Pacing, pacing::HAS_EVENTS) => "Add more distinct events such as hits or tolls",
        (Metric::Pacing, pacing::WELL_DISTRIBUTED) => {
            "Distribute events more evenly throughout the timeline"
        }
        _ => return None,
    };
    Some(hint)
}
