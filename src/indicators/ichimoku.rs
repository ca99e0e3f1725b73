// =============================================================================
// Ichimoku Cloud
// =============================================================================
//
//   Tenkan-sen  = (highest high + lowest low) / 2 over `tenkan` bars (9)
//   Kijun-sen   = (highest high + lowest low) / 2 over `kijun` bars (26)
//   Senkou A    = (Tenkan + Kijun) / 2
//   Senkou B    = (highest high + lowest low) / 2 over `senkou_b` bars (52)
//   Chikou      = close shifted back by `displacement` bars (26)
//
// Spans are reported on the bar they are computed from (no forward shift);
// Chikou at bar `i` is the close of bar `i + displacement`.
//
// Signal: Buy when Tenkan crosses above Kijun, Sell on the mirrored cross.
// =============================================================================

use super::series::{cross_signals, rolling_max, rolling_min};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Bars needed for the full cloud (the longest of the three windows).
pub fn ichimoku_lookback(tenkan: usize, kijun: usize, senkou_b: usize) -> usize {
    tenkan.max(kijun).max(senkou_b)
}

/// Compute `"tenkan"`, `"kijun"`, `"span_a"`, `"span_b"` and `"chikou"` lines
/// plus Tenkan/Kijun crossover signals.
pub fn calculate_ichimoku(
    bars: &[Bar],
    tenkan: usize,
    kijun: usize,
    senkou_b: usize,
    displacement: usize,
) -> SeriesOutput {
    if tenkan == 0 || kijun == 0 || senkou_b == 0 {
        return SeriesOutput::empty();
    }
    if bars.len() < ichimoku_lookback(tenkan, kijun, senkou_b) {
        return SeriesOutput::empty();
    }

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let tenkan_line = midpoint(&highs, &lows, tenkan);
    let kijun_line = midpoint(&highs, &lows, kijun);
    let span_b = midpoint(&highs, &lows, senkou_b);
    let span_a: Vec<Option<f64>> = tenkan_line
        .iter()
        .zip(&kijun_line)
        .map(|(t, k)| match (t, k) {
            (Some(t), Some(k)) => Some((t + k) / 2.0),
            _ => None,
        })
        .collect();
    let chikou: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            i.checked_add(displacement)
                .and_then(|j| bars.get(j))
                .map(|b| b.close)
        })
        .collect();

    let signals = cross_signals(&tenkan_line, &kijun_line);

    SeriesOutput::new(
        vec![
            Line::new("tenkan", tenkan_line),
            Line::new("kijun", kijun_line),
            Line::new("span_a", span_a),
            Line::new("span_b", span_b),
            Line::new("chikou", chikou),
        ],
        signals,
    )
}

/// `(highest high + lowest low) / 2` over a trailing window.
fn midpoint(highs: &[f64], lows: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_max(highs, period)
        .into_iter()
        .zip(rolling_min(lows, period))
        .map(|(hh, ll)| Some((hh? + ll?) / 2.0))
        .collect()
}
