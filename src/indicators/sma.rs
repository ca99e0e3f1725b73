// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(close_{t-period+1} ..= close_t), maintained as a rolling sum.
//
// Signal: Buy when the close crosses from at-or-below the average to above
// it, Sell on the mirrored downward cross, Hold otherwise.
// =============================================================================

use super::series::{as_line, closes, cross_signals, rolling_mean};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Compute the SMA line (`"sma"`) and close-crossing signals.
///
/// Returns an empty output when `period == 0` or fewer than `period` bars
/// are available.  The first defined value sits at bar `period - 1`.
pub fn calculate_sma(bars: &[Bar], period: usize) -> SeriesOutput {
    if period == 0 || bars.len() < period {
        return SeriesOutput::empty();
    }

    let price = as_line(&closes(bars));
    let sma = rolling_mean(&price, period);
    let signals = cross_signals(&price, &sma);

    SeriesOutput::new(vec![Line::new("sma", sma)], signals)
}
