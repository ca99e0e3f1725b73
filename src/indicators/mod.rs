// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the sixteen indicators in the
// report catalogue.  Per-bar indicators return a `SeriesOutput` whose lines and
// signals are aligned 1:1 with the input bars (empty when the lookback is not
// satisfied); verdict indicators return `Option<Verdict>`.

use serde::Serialize;

use crate::types::Signal;

pub mod series;

pub mod accumulation_distribution;
pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod fibonacci;
pub mod ichimoku;
pub mod macd;
pub mod momentum;
pub mod parabolic_sar;
pub mod pivot_points;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volume_oscillator;
pub mod vortex;
pub mod williams_r;

// =============================================================================
// Output types
// =============================================================================

/// A named per-bar value line.  `None` marks bars before the lookback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub name: &'static str,
    pub values: Vec<Option<f64>>,
}

impl Line {
    pub fn new(name: &'static str, values: Vec<Option<f64>>) -> Self {
        Self { name, values }
    }
}

/// Value lines plus the per-bar signal series of one indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesOutput {
    pub lines: Vec<Line>,
    pub signals: Vec<Signal>,
}

impl SeriesOutput {
    /// The "insufficient data" result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(lines: Vec<Line>, signals: Vec<Signal>) -> Self {
        debug_assert!(lines.iter().all(|l| l.values.len() == signals.len()));
        Self { lines, signals }
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Look up a line by name.
    pub fn line(&self, name: &str) -> Option<&[Option<f64>]> {
        self.lines
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.values.as_slice())
    }

    /// The first (primary) line, or an empty slice.
    pub fn primary(&self) -> &[Option<f64>] {
        self.lines
            .first()
            .map(|l| l.values.as_slice())
            .unwrap_or(&[])
    }

    /// Only the defined values of the named line, in bar order.
    pub fn defined(&self, name: &str) -> Vec<f64> {
        self.line(name)
            .map(|values| values.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Signal of the most recent bar.
    pub fn latest_signal(&self) -> Option<Signal> {
        self.signals.last().copied()
    }
}

/// A named scalar attached to a verdict (levels, averages, SAR state, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
}

/// Current-state judgement of an indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub signal: Signal,
    pub label: String,
    pub metrics: Vec<Metric>,
}

impl Verdict {
    pub fn new(signal: Signal, label: impl Into<String>) -> Self {
        Self {
            signal,
            label: label.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, name: &'static str, value: f64) -> Self {
        self.metrics.push(Metric { name, value });
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }
}

/// Uniform result shape used by the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorOutput {
    Series(SeriesOutput),
    Verdict(Verdict),
    /// Fewer bars than the indicator's lookback.
    Insufficient { required: usize, available: usize },
}

impl IndicatorOutput {
    pub fn as_series(&self) -> Option<&SeriesOutput> {
        match self {
            Self::Series(series) => Some(series),
            _ => None,
        }
    }

    pub fn as_verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Verdict(verdict) => Some(verdict),
            _ => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::Insufficient { .. })
    }

    /// The signal a dashboard would show: the latest per-bar signal or the
    /// verdict's signal.
    pub fn current_signal(&self) -> Option<Signal> {
        match self {
            Self::Series(series) => series.latest_signal(),
            Self::Verdict(verdict) => Some(verdict.signal),
            Self::Insufficient { .. } => None,
        }
    }
}
