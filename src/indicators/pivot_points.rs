// =============================================================================
// Classic Pivot Points
// =============================================================================
//
// Levels from the prior period's high, low and close:
//   PP = (H + L + C) / 3
//   R1 = 2*PP - L      S1 = 2*PP - H
//   R2 = PP + (H - L)  S2 = PP - (H - L)
//
// The prior period is the second-to-last bar; the latest close is placed in
// a zone relative to those levels.
// =============================================================================

use serde::Serialize;

use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotLevels {
    pub pp: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl PivotLevels {
    pub fn from_bar(bar: &Bar) -> Self {
        let pp = (bar.high + bar.low + bar.close) / 3.0;
        let range = bar.high - bar.low;
        Self {
            pp,
            r1: 2.0 * pp - bar.low,
            r2: pp + range,
            s1: 2.0 * pp - bar.high,
            s2: pp - range,
        }
    }

    /// Zone of `close` relative to the levels.
    pub fn classify(&self, close: f64) -> (Signal, &'static str) {
        if close > self.r2 {
            (Signal::Buy, "buy: above R2")
        } else if close > self.r1 {
            (Signal::Buy, "buy: between R1 and R2")
        } else if close > self.pp {
            (Signal::Hold, "hold: between PP and R1")
        } else if close >= self.s1 {
            (Signal::Hold, "hold: between S1 and PP")
        } else if close >= self.s2 {
            (Signal::Sell, "sell: between S2 and S1")
        } else {
            (Signal::Sell, "sell: below S2")
        }
    }
}

/// Zone verdict for the latest close.  `None` with fewer than two bars.
pub fn pivot_points_verdict(bars: &[Bar]) -> Option<Verdict> {
    if bars.len() < 2 {
        return None;
    }
    let prior = &bars[bars.len() - 2];
    let close = bars[bars.len() - 1].close;
    let levels = PivotLevels::from_bar(prior);
    let (signal, label) = levels.classify(close);

    Some(
        Verdict::new(signal, label)
            .with_metric("pp", levels.pp)
            .with_metric("r1", levels.r1)
            .with_metric("r2", levels.r2)
            .with_metric("s1", levels.s1)
            .with_metric("s2", levels.s2),
    )
}
