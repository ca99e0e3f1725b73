// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), σ being the population standard deviation of
// the window. The Band Width (BBW) is the normalised distance:
// BBW = (upper - lower) / middle * 100.
//
// Mean and variance are maintained as rolling sums of the closes shifted by
// the first close, which keeps the sum-of-squares form numerically stable and
// makes a constant series yield exactly σ = 0.
//
// Signals: Buy when the close re-enters above the lower band from below, Sell
// when it re-enters below the upper band from above.
// =============================================================================

use super::series::{closes, crossing};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;
use crate::types::Signal;

/// Compute `"middle"`, `"upper"`, `"lower"` and `"width"` lines plus band
/// re-entry signals.
///
/// Returns an empty output when `period == 0` or fewer than `period` bars are
/// available.  `num_std` is taken by magnitude so the bands never invert.
/// A zero middle band gives a zero width.
pub fn calculate_bollinger(bars: &[Bar], period: usize, num_std: f64) -> SeriesOutput {
    if period == 0 || bars.len() < period {
        return SeriesOutput::empty();
    }

    let closes = closes(bars);
    let n = closes.len();
    let k = num_std.abs();
    let period_f = period as f64;
    let shift = closes[0];

    let mut middle = vec![None; n];
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    let mut width = vec![None; n];

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for i in 0..n {
        let d = closes[i] - shift;
        sum += d;
        sum_sq += d * d;
        if i >= period {
            let old = closes[i - period] - shift;
            sum -= old;
            sum_sq -= old * old;
        }
        if i + 1 < period {
            continue;
        }

        let mean_d = sum / period_f;
        let variance = (sum_sq / period_f - mean_d * mean_d).max(0.0);
        let std_dev = variance.sqrt();

        let mid = shift + mean_d;
        let up = mid + k * std_dev;
        let lo = mid - k * std_dev;

        middle[i] = Some(mid);
        upper[i] = Some(up);
        lower[i] = Some(lo);
        width[i] = Some(if mid == 0.0 { 0.0 } else { (up - lo) / mid * 100.0 });
    }

    let mut signals = vec![Signal::Hold; n];
    for i in 1..n {
        let (Some(prev_lo), Some(lo), Some(prev_up), Some(up)) =
            (lower[i - 1], lower[i], upper[i - 1], upper[i])
        else {
            continue;
        };
        if crossing(closes[i - 1], prev_lo, closes[i], lo) == Signal::Buy {
            signals[i] = Signal::Buy;
        } else if crossing(closes[i - 1], prev_up, closes[i], up) == Signal::Sell {
            signals[i] = Signal::Sell;
        }
    }

    SeriesOutput::new(
        vec![
            Line::new("middle", middle),
            Line::new("upper", upper),
            Line::new("lower", lower),
            Line::new("width", width),
        ],
        signals,
    )
}
