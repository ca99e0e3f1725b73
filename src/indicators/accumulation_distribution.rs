// =============================================================================
// Accumulation / Distribution Line
// =============================================================================
//
//   MFM = ((close - low) - (high - close)) / (high - low)
//   MFV = MFM * volume
//   AD  = running sum of MFV
//
// A bar with high == low contributes nothing.
//
// Verdict: compare the last two AD values with the last two closes.  Both
// rising is "buy", both falling is "sell", anything else is "hold".
// =============================================================================

use super::series::ratio_or_zero;
use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

/// Cumulative A/D value for every bar.
pub fn ad_line(bars: &[Bar]) -> Vec<f64> {
    let mut total = 0.0;
    bars.iter()
        .map(|b| {
            let multiplier = ratio_or_zero((b.close - b.low) - (b.high - b.close), b.high - b.low);
            total += multiplier * b.volume as f64;
            total
        })
        .collect()
}

/// Price/volume confirmation verdict.  `None` with fewer than two bars.
pub fn accumulation_distribution_verdict(bars: &[Bar]) -> Option<Verdict> {
    if bars.len() < 2 {
        return None;
    }
    let ad = ad_line(bars);
    let n = bars.len();
    let (ad_prev, ad_last) = (ad[n - 2], ad[n - 1]);
    let (close_prev, close_last) = (bars[n - 2].close, bars[n - 1].close);

    let signal = if ad_last > ad_prev && close_last > close_prev {
        Signal::Buy
    } else if ad_last < ad_prev && close_last < close_prev {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Some(Verdict::new(signal, signal.as_str()).with_metric("ad", ad_last))
}
