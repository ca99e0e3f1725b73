// =============================================================================
// Vortex Indicator
// =============================================================================
//
//   VM+  = |high - previous low|
//   VM-  = |low - previous high|
//   VI+  = sum(VM+, period) / sum(TR, period)
//   VI-  = sum(VM-, period) / sum(TR, period)
//
// Sums run over the last `period` bar-to-bar transitions, so the first VI
// value sits at bar `period`.  A zero true-range sum yields VI = 0.
//
// Verdict: "buy" when VI+ has just crossed above VI-, "sell" on the
// mirrored cross, "hold" otherwise.
// =============================================================================

use super::series::{crossing, ratio_or_zero, rolling_sum, true_range};
use super::Verdict;
use crate::market_data::Bar;

/// VI+ and VI- aligned to `bars`.
pub fn vortex_lines(bars: &[Bar], period: usize) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = bars.len();
    if period == 0 || n < period + 1 {
        return (vec![None; n], vec![None; n]);
    }

    let mut vm_plus = vec![0.0; n];
    let mut vm_minus = vec![0.0; n];
    let mut tr = vec![0.0; n];
    for i in 1..n {
        vm_plus[i] = (bars[i].high - bars[i - 1].low).abs();
        vm_minus[i] = (bars[i].low - bars[i - 1].high).abs();
        tr[i] = true_range(bars, i);
    }

    let sum_plus = rolling_sum(&vm_plus, period);
    let sum_minus = rolling_sum(&vm_minus, period);
    let sum_tr = rolling_sum(&tr, period);

    let mut vi_plus = vec![None; n];
    let mut vi_minus = vec![None; n];
    for i in period..n {
        if let (Some(p), Some(m), Some(t)) = (sum_plus[i], sum_minus[i], sum_tr[i]) {
            vi_plus[i] = Some(ratio_or_zero(p, t));
            vi_minus[i] = Some(ratio_or_zero(m, t));
        }
    }
    (vi_plus, vi_minus)
}

/// Crossing verdict on the last two VI values.  `None` when fewer than
/// `period + 2` bars are available.
pub fn vortex_verdict(bars: &[Bar], period: usize) -> Option<Verdict> {
    if period == 0 || bars.len() < period + 2 {
        return None;
    }
    let (vi_plus, vi_minus) = vortex_lines(bars, period);
    let n = bars.len();
    let (prev_plus, plus) = (vi_plus[n - 2]?, vi_plus[n - 1]?);
    let (prev_minus, minus) = (vi_minus[n - 2]?, vi_minus[n - 1]?);

    let signal = crossing(prev_plus, prev_minus, plus, minus);
    Some(
        Verdict::new(signal, signal.as_str())
            .with_metric("vi_plus", plus)
            .with_metric("vi_minus", minus),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn bar(high: f64, low: f64, close: f64) -> Bar {
        Bar::new(close, high, low, close, 1)
    }

    #[test]
    fn first_value_at_period() {
        let bars: Vec<Bar> = (0..6).map(|i| bar(11.0 + i as f64, 9.0 + i as f64, 10.0 + i as f64)).collect();
        let (plus, minus) = vortex_lines(&bars, 3);
        assert!(plus[2].is_none() && minus[2].is_none());
        // Each transition: VM+ = 3, VM- = 1, TR = 2.
        assert_eq!(plus[3], Some(1.5));
        assert_eq!(minus[3], Some(0.5));
    }

    #[test]
    fn insufficient_data() {
        let bars = vec![bar(2.0, 1.0, 1.5); 15];
        assert!(vortex_verdict(&bars, 14).is_none());
        assert!(vortex_verdict(&vec![bar(2.0, 1.0, 1.5); 16], 14).is_some());
    }

    #[test]
    fn flat_bars_have_zero_vortex() {
        let bars = vec![bar(5.0, 5.0, 5.0); 20];
        let v = vortex_verdict(&bars, 14).unwrap();
        assert_eq!(v.metric("vi_plus"), Some(0.0));
        assert_eq!(v.signal, Signal::Hold);
    }

    #[test]
    fn turn_up_crosses_vi_plus_above() {
        // Steady decline, then one strong up bar.
        let mut bars: Vec<Bar> = (0..6)
            .map(|i| {
                let c = 100.0 - i as f64 * 2.0;
                bar(c + 1.0, c - 1.0, c)
            })
            .collect();
        bars.push(bar(110.0, 95.0, 109.0));
        let v = vortex_verdict(&bars, 3).unwrap();
        assert_eq!(v.signal, Signal::Buy);
        assert_eq!(v.label, "buy");
        assert!(v.metric("vi_plus").unwrap() > v.metric("vi_minus").unwrap());
    }
}
