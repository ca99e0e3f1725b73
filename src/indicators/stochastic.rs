// =============================================================================
// Stochastic Oscillator (slow)
// =============================================================================
//
//   raw %K      = (close - lowest_low) / (highest_high - lowest_low) * 100
//   smoothed %K = SMA(raw %K, smooth_k)
//   %D          = SMA(smoothed %K, smooth_d)
//
// A zero high-low range yields a raw %K of 0.
//
// Signals: Buy when smoothed %K crosses above %D while below the oversold
// level (20), Sell when it crosses below %D while above the overbought level
// (80).
// =============================================================================

use super::series::{cross_signals, ratio_or_zero, rolling_max, rolling_mean, rolling_min};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;
use crate::types::Signal;

/// Bars needed before the first %D value exists.
pub fn stochastic_lookback(period: usize, smooth_k: usize, smooth_d: usize) -> usize {
    period + smooth_k.saturating_sub(1) + smooth_d.saturating_sub(1)
}

/// Compute `"k"` (smoothed), `"d"` and `"raw_k"` lines plus filtered
/// crossover signals.
pub fn calculate_stochastic(
    bars: &[Bar],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
    oversold: f64,
    overbought: f64,
) -> SeriesOutput {
    if period == 0 || smooth_k == 0 || smooth_d == 0 {
        return SeriesOutput::empty();
    }
    if bars.len() < stochastic_lookback(period, smooth_k, smooth_d) {
        return SeriesOutput::empty();
    }

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, period);
    let lowest = rolling_min(&lows, period);

    let raw_k: Vec<Option<f64>> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (highest[i], lowest[i]) {
            (Some(hh), Some(ll)) => Some(ratio_or_zero(bar.close - ll, hh - ll) * 100.0),
            _ => None,
        })
        .collect();
    let k = rolling_mean(&raw_k, smooth_k);
    let d = rolling_mean(&k, smooth_d);

    let signals = cross_signals(&k, &d)
        .into_iter()
        .enumerate()
        .map(|(i, signal)| match (signal, k[i]) {
            (Signal::Buy, Some(kv)) if kv < oversold => Signal::Buy,
            (Signal::Sell, Some(kv)) if kv > overbought => Signal::Sell,
            _ => Signal::Hold,
        })
        .collect();

    SeriesOutput::new(
        vec![
            Line::new("k", k),
            Line::new("d", d),
            Line::new("raw_k", raw_k),
        ],
        signals,
    )
}
