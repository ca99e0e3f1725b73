// =============================================================================
// Fibonacci Retracement
// =============================================================================
//
// The swing high / swing low of the `lookback` bars preceding the latest bar
// define a range.  Retracement levels sit at
//   level = high - range * ratio,  ratio ∈ {23.6, 38.2, 50, 61.8, 78.6}%.
//
// Verdict: if the latest close lies within `tolerance_pct`% of the range
// width of a level, Buy when it is at or above the level (support holding),
// Sell when below it.  Otherwise Hold.
// =============================================================================

use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

/// Retracement ratios and the metric names they are reported under.
pub const FIB_LEVELS: [(&str, f64); 5] = [
    ("level_23.6", 0.236),
    ("level_38.2", 0.382),
    ("level_50.0", 0.5),
    ("level_61.8", 0.618),
    ("level_78.6", 0.786),
];

/// Retracement prices for a `(high, low)` range, in `FIB_LEVELS` order.
pub fn retracement_levels(high: f64, low: f64) -> [f64; 5] {
    let range = high - low;
    FIB_LEVELS.map(|(_, ratio)| high - range * ratio)
}

/// Evaluate the latest close against the retracement levels of the prior
/// `lookback` bars.
///
/// Returns `None` when `lookback == 0` or fewer than `lookback + 1` bars are
/// available.
pub fn fibonacci_verdict(bars: &[Bar], lookback: usize, tolerance_pct: f64) -> Option<Verdict> {
    if lookback == 0 || bars.len() < lookback + 1 {
        return None;
    }

    let latest = bars.last()?;
    let prior = &bars[bars.len() - 1 - lookback..bars.len() - 1];

    let high = prior.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = prior.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let range = high - low;
    let levels = retracement_levels(high, low);
    let tolerance = range * tolerance_pct.abs() / 100.0;

    let nearest = levels
        .iter()
        .enumerate()
        .map(|(idx, &price)| (idx, price, (latest.close - price).abs()))
        .min_by(|a, b| a.2.total_cmp(&b.2));

    let mut verdict = match nearest {
        Some((idx, price, distance)) if range > 0.0 && distance <= tolerance => {
            let signal = if latest.close >= price {
                Signal::Buy
            } else {
                Signal::Sell
            };
            let pct = FIB_LEVELS[idx].1 * 100.0;
            Verdict::new(
                signal,
                format!("{} near {pct:.1}% retracement at {price:.4}", signal.as_str()),
            )
        }
        _ => Verdict::new(Signal::Hold, "hold"),
    };

    verdict = verdict.with_metric("high", high).with_metric("low", low);
    for (&(name, _), price) in FIB_LEVELS.iter().zip(levels) {
        verdict = verdict.with_metric(name, price);
    }
    Some(verdict)
}
