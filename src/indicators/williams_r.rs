// =============================================================================
// Williams %R
// =============================================================================
//
//   %R = (highest_high - close) / (highest_high - lowest_low) * -100
//
// over the trailing `period` bars, so %R lives in [-100, 0].  A zero range
// yields %R = 0.
//
// Verdict from the latest value: <= oversold (-80) is "buy", >= overbought
// (-20) is "sell", anything in between is "no clear signal".
// =============================================================================

use super::series::ratio_or_zero;
use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

/// %R of the last `period` bars.  `None` when `period == 0` or fewer than
/// `period` bars are available.
pub fn williams_r(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let window = &bars[bars.len() - period..];
    let close = window.last()?.close;
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    Some(ratio_or_zero(highest - close, highest - lowest) * -100.0)
}

/// Classify the latest %R against the oversold/overbought thresholds.
pub fn williams_r_verdict(
    bars: &[Bar],
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Option<Verdict> {
    let value = williams_r(bars, period)?;
    let verdict = if value <= oversold {
        Verdict::new(Signal::Buy, "buy")
    } else if value >= overbought {
        Verdict::new(Signal::Sell, "sell")
    } else {
        Verdict::new(Signal::Hold, format!("no clear signal (%R {value:.2})"))
    };
    Some(verdict.with_metric("williams_r", value))
}
