// =============================================================================
// Momentum
// =============================================================================
//
//   momentum[i] = close[i] - close[i - period]
//
// Signal: Buy when momentum crosses from <= 0 to > 0, Sell when it crosses
// from >= 0 to < 0.
// =============================================================================

use super::series::{closes, level_cross_signals};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Compute the `"momentum"` line plus zero-line crossing signals.
///
/// Needs `period + 1` bars; the first value sits at bar `period`.
pub fn calculate_momentum(bars: &[Bar], period: usize) -> SeriesOutput {
    if period == 0 || bars.len() < period + 1 {
        return SeriesOutput::empty();
    }

    let closes = closes(bars);
    let momentum: Vec<Option<f64>> = (0..closes.len())
        .map(|i| (i >= period).then(|| closes[i] - closes[i - period]))
        .collect();
    let signals = level_cross_signals(&momentum, 0.0, 0.0);

    SeriesOutput::new(vec![Line::new("momentum", momentum)], signals)
}
