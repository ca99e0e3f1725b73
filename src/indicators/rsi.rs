// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute price changes (deltas) from consecutive closes.
// Step 2: Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3: Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Signals: Buy when RSI crosses up through the oversold level (30), Sell when
// it crosses down through the overbought level (70).
// =============================================================================

use super::series::{closes, level_cross_signals};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Compute the RSI line for `closes`, aligned to the input.
///
/// The first value sits at index `period` (the first `period` deltas seed the
/// averages).  Returns an all-`None` line when there are fewer than
/// `period + 1` closes.
pub fn rsi_line(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    match rsi_from_averages(avg_gain, avg_loss) {
        Some(rsi) => out[period] = Some(rsi),
        None => return out,
    }

    // --- Wilder's smoothing for subsequent values ----------------------------
    // deltas[i - 1] is the change into close i.
    for i in (period + 1)..closes.len() {
        let delta = deltas[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => out[i] = Some(rsi),
            None => break, // Non-finite input ends the line.
        }
    }

    out
}

/// Compute the RSI line (`"rsi"`) and threshold-crossing signals.
///
/// Returns an empty output when fewer than `period + 1` bars are available.
pub fn calculate_rsi(bars: &[Bar], period: usize, oversold: f64, overbought: f64) -> SeriesOutput {
    if period == 0 || bars.len() < period + 1 {
        return SeriesOutput::empty();
    }

    let rsi = rsi_line(&closes(bars), period);
    let signals = level_cross_signals(&rsi, oversold, overbought);

    SeriesOutput::new(vec![Line::new("rsi", rsi)], signals)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .map(|&c| Bar::new(c, c, c, c, 1))
            .collect()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14, 30.0, 70.0).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&bars_from_closes(&[1.0, 2.0, 3.0]), 0, 30.0, 70.0).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes (period deltas). 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&bars_from_closes(&closes), 14, 30.0, 70.0).is_empty());
    }

    #[test]
    fn rsi_all_gains() {
        // Strictly ascending prices => RSI should be 100 at every computed bar.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let out = calculate_rsi(&bars_from_closes(&closes), 14, 30.0, 70.0);
        let values = out.defined("rsi");
        assert_eq!(values.len(), 30 - 14);
        for &v in &values {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
        assert!(out.primary()[..14].iter().all(Option::is_none));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in rsi_line(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market() {
        let closes = vec![100.0; 30];
        for v in rsi_line(&closes, 14).into_iter().flatten() {
            assert!((v - 50.0).abs() < 1e-10, "expected 50.0, got {v}");
        }
    }

    #[test]
    fn rsi_range_check() {
        // Arbitrary data: RSI must always be in [0, 100].
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 47.90, 41.02,
        ];
        let out = calculate_rsi(&bars_from_closes(&closes), 14, 30.0, 70.0);
        assert_eq!(out.signals.len(), closes.len());
        for v in out.defined("rsi") {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_oversold_recovery_buys() {
        // Ten losses drive RSI to 0, then a strong rally lifts it above 30.
        let mut closes: Vec<f64> = (0..11).map(|i| 100.0 - i as f64).collect();
        closes.extend([95.0, 100.0, 105.0]);
        let out = calculate_rsi(&bars_from_closes(&closes), 5, 30.0, 70.0);
        assert!(out.signals.contains(&Signal::Buy));
        assert!(!out.signals.contains(&Signal::Sell));
    }
}
