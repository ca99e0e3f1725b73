// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Signal: Buy when +DI crosses above -DI while ADX is above the trend
// threshold (25), Sell on the mirrored cross under the same condition.
// =============================================================================

use super::series::{cross_signals, ratio_or_zero, true_range};
use super::{Line, SeriesOutput};
use crate::market_data::Bar;
use crate::types::Signal;

/// Bars needed before the first ADX value exists: `period` transitions for
/// the initial smoothing, then `period` DX values to seed the average.
pub fn adx_lookback(period: usize) -> usize {
    2 * period
}

/// Compute `"adx"`, `"plus_di"` and `"minus_di"` lines plus filtered DI
/// crossover signals.
///
/// Lines are aligned to `bars`: DI values start at bar `period`, ADX at bar
/// `2 * period - 1`.  A zero smoothed true range yields DI = 0, and a zero DI
/// sum yields DX = 0.
pub fn calculate_adx(bars: &[Bar], period: usize, trend_threshold: f64) -> SeriesOutput {
    if period == 0 || bars.len() < adx_lookback(period) {
        return SeriesOutput::empty();
    }

    let n = bars.len();
    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range per bar (bar 0 unused)
    // ------------------------------------------------------------------
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr_vals = vec![0.0; n];

    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;

        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        tr_vals[i] = true_range(bars, i);
    }

    // ------------------------------------------------------------------
    // Step 3-5: Wilder's smoothing, DI and DX from bar `period` onwards
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[1..=period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[1..=period].iter().sum();

    let mut plus_di = vec![None; n];
    let mut minus_di = vec![None; n];
    let mut dx = vec![None; n];

    for i in period..n {
        if i > period {
            smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
            smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
            smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
        }

        let (pdi, mdi, dxv) = directional_index(smooth_plus_dm, smooth_minus_dm, smooth_tr);
        plus_di[i] = Some(pdi);
        minus_di[i] = Some(mdi);
        dx[i] = Some(dxv);
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    let mut adx = vec![None; n];
    let first_adx = adx_lookback(period) - 1;
    let seed: f64 = dx[period..=first_adx].iter().flatten().sum::<f64>() / period_f;
    adx[first_adx] = Some(seed);

    let mut prev = seed;
    for i in (first_adx + 1)..n {
        let Some(dxv) = dx[i] else { break };
        prev = (prev * (period_f - 1.0) + dxv) / period_f;
        adx[i] = Some(prev);
    }

    let signals = cross_signals(&plus_di, &minus_di)
        .into_iter()
        .zip(&adx)
        .map(|(signal, strength)| match strength {
            Some(a) if *a > trend_threshold => signal,
            _ => Signal::Hold,
        })
        .collect();

    SeriesOutput::new(
        vec![
            Line::new("adx", adx),
            Line::new("plus_di", plus_di),
            Line::new("minus_di", minus_di),
        ],
        signals,
    )
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI, -DI and DX from smoothed +DM, -DM and TR.
fn directional_index(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64, f64) {
    let plus_di = ratio_or_zero(smooth_plus_dm, smooth_tr) * 100.0;
    let minus_di = ratio_or_zero(smooth_minus_dm, smooth_tr) * 100.0;
    let dx = ratio_or_zero((plus_di - minus_di).abs(), plus_di + minus_di) * 100.0;
    (plus_di, minus_di, dx)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a simple bar for testing.  Volume is irrelevant for ADX.
    fn candle(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(open, high, low, close, 1)
    }

    #[test]
    fn adx_period_zero() {
        let bars = vec![candle(1.0, 2.0, 0.5, 1.5); 50];
        assert!(calculate_adx(&bars, 0, 25.0).is_empty());
    }

    #[test]
    fn adx_insufficient_data() {
        let bars = vec![candle(1.0, 2.0, 0.5, 1.5); 10];
        assert!(calculate_adx(&bars, 14, 25.0).is_empty());
    }

    #[test]
    fn adx_strong_uptrend() {
        // Consecutive higher highs and higher lows: a strong trend.
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();

        let out = calculate_adx(&bars, 14, 25.0);
        let adx = out.defined("adx");
        let value = *adx.last().unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
        assert!(out.defined("plus_di").last() > out.defined("minus_di").last());
    }

    #[test]
    fn adx_flat_market() {
        // Identical bars, no directional movement.
        let bars = vec![candle(100.0, 101.0, 99.0, 100.0); 60];
        let out = calculate_adx(&bars, 14, 25.0);
        let value = *out.defined("adx").last().unwrap();
        assert!(value < 1.0, "expected ADX near 0 for flat market, got {value}");
        assert!(out.signals.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                candle(base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let out = calculate_adx(&bars, 14, 25.0);
        assert_eq!(out.signals.len(), bars.len());
        for value in out.defined("adx") {
            assert!((0.0..=100.0).contains(&value), "ADX {value} out of [0,100] range");
        }
    }

    #[test]
    fn adx_minimum_bars_exact() {
        let period = 5;
        let min = 2 * period;
        let bars: Vec<Bar> = (0..min)
            .map(|i| {
                let base = 100.0 + i as f64;
                candle(base, base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        let out = calculate_adx(&bars, period, 25.0);
        assert_eq!(out.defined("adx").len(), 1);
        assert!(out.line("adx").unwrap()[min - 1].is_some());

        assert!(calculate_adx(&bars[..min - 1], period, 25.0).is_empty());
    }

    #[test]
    fn trend_reversal_sells_when_trending() {
        // Long decline after a rally: -DI overtakes +DI while ADX is high.
        let mut bars: Vec<Bar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        bars.extend((0..30).map(|i| {
            let base = 158.0 - i as f64 * 4.0;
            candle(base, base + 0.5, base - 1.5, base - 1.0)
        }));
        let out = calculate_adx(&bars, 14, 25.0);
        assert!(out.signals.contains(&Signal::Sell));
        assert!(!out.signals.contains(&Signal::Buy));
    }
}
