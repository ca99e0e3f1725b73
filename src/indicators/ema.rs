// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

use super::series::{as_line, closes, cross_signals, ema_line};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;

/// Compute the EMA line (`"ema"`) and close-crossing signals.
///
/// # Edge cases
/// - `period == 0` => empty output
/// - `bars.len() < period` => empty output
/// - A non-finite intermediate value ends the line; later bars stay `None`.
pub fn calculate_ema(bars: &[Bar], period: usize) -> SeriesOutput {
    if period == 0 || bars.len() < period {
        return SeriesOutput::empty();
    }

    let price = as_line(&closes(bars));
    let ema = ema_line(&price, period);
    let signals = cross_signals(&price, &ema);

    SeriesOutput::new(vec![Line::new("ema", ema)], signals)
}
