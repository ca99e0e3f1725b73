// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA_short(close) - EMA_long(close)
//   signal    = EMA_signal(MACD)
//   histogram = MACD - signal
//
// Signal: Buy when MACD crosses above its signal line, Sell on the mirrored
// cross.
// =============================================================================

use super::series::{as_line, closes, cross_signals, ema_line};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Number of bars needed before the first signal-line value exists.
pub fn macd_lookback(long: usize, signal: usize) -> usize {
    long + signal.saturating_sub(1)
}

/// Compute the `"macd"`, `"signal"` and `"histogram"` lines plus crossover
/// signals.
///
/// Returns an empty output when any period is zero, `short >= long`, or fewer
/// than `long + signal - 1` bars are available.
pub fn calculate_macd(bars: &[Bar], short: usize, long: usize, signal: usize) -> SeriesOutput {
    if short == 0 || long == 0 || signal == 0 || short >= long {
        return SeriesOutput::empty();
    }
    if bars.len() < macd_lookback(long, signal) {
        return SeriesOutput::empty();
    }

    let price = as_line(&closes(bars));
    let fast = ema_line(&price, short);
    let slow = ema_line(&price, long);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let signal_line = ema_line(&macd, signal);
    let histogram: Vec<Option<f64>> = macd
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    let signals = cross_signals(&macd, &signal_line);

    SeriesOutput::new(
        vec![
            Line::new("macd", macd),
            Line::new("signal", signal_line),
            Line::new("histogram", histogram),
        ],
        signals,
    )
}

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

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.25).sin() * 8.0).collect()
    }

    #[test]
    fn macd_invalid_periods() {
        let bars = bars_from_closes(&wave(60));
        assert!(calculate_macd(&bars, 26, 12, 9).is_empty());
        assert!(calculate_macd(&bars, 0, 26, 9).is_empty());
        assert!(calculate_macd(&bars, 12, 26, 0).is_empty());
    }

    #[test]
    fn macd_insufficient_data() {
        let bars = bars_from_closes(&wave(33));
        assert!(calculate_macd(&bars, 12, 26, 9).is_empty());
        let bars = bars_from_closes(&wave(34));
        let out = calculate_macd(&bars, 12, 26, 9);
        assert_eq!(out.defined("signal").len(), 1);
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let bars = bars_from_closes(&wave(100));
        let out = calculate_macd(&bars, 12, 26, 9);
        let macd = out.line("macd").unwrap();
        let signal = out.line("signal").unwrap();
        let hist = out.line("histogram").unwrap();
        assert_eq!(out.signals.len(), bars.len());
        for i in 0..bars.len() {
            if let (Some(m), Some(s), Some(h)) = (macd[i], signal[i], hist[i]) {
                assert!((h - (m - s)).abs() < 1e-12);
            } else {
                assert!(hist[i].is_none());
            }
        }
        // First MACD at bar 25, first signal at bar 33.
        assert!(macd[24].is_none() && macd[25].is_some());
        assert!(signal[32].is_none() && signal[33].is_some());
    }

    #[test]
    fn oscillating_prices_produce_both_crosses() {
        let bars = bars_from_closes(&wave(100));
        let out = calculate_macd(&bars, 12, 26, 9);
        assert!(out.signals.contains(&Signal::Buy));
        assert!(out.signals.contains(&Signal::Sell));
    }
}
