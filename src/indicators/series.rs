// =============================================================================
// Series primitives shared by the indicator implementations
// =============================================================================
//
// Every per-bar line is aligned 1:1 with the bar snapshot it was computed
// from: index `i` always refers to bar `i`, and indices the recurrence cannot
// evaluate yet hold `None`.

use std::collections::VecDeque;

use crate::market_data::Bar;
use crate::types::Signal;

/// Close prices of `bars`, oldest first.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Lift a dense series into a fully-defined line.
pub fn as_line(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Rolling mean over `period` consecutive defined values.
///
/// The running sum resets whenever a `None` is met, so a gap never leaks
/// into a later window.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let period_f = period as f64;
    let mut sum = 0.0;
    let mut run = 0usize;

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                sum += v;
                run += 1;
                if run > period {
                    sum -= values[i - period].unwrap_or(0.0);
                }
                if run >= period {
                    out[i] = Some(sum / period_f);
                }
            }
            None => {
                sum = 0.0;
                run = 0;
            }
        }
    }
    out
}

/// Rolling sum of a dense series; first value at index `period - 1`.
pub fn rolling_sum(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum);
    }
    out
}

/// Exponential moving average of a line.
///
/// Seeded with the SMA of the first `period` consecutive defined values, then
/// `ema = value * k + prev * (1 - k)` with `k = 2 / (period + 1)`.  The line
/// stops at the first gap or non-finite value after the seed.
pub fn ema_line(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > values.len() {
        return out;
    }

    let mut sum = 0.0;
    for value in &values[start..seed_end] {
        match value {
            Some(v) => sum += v,
            None => return out,
        }
    }

    let multiplier = 2.0 / (period + 1) as f64;
    let mut prev = sum / period as f64;
    if !prev.is_finite() {
        return out;
    }
    out[seed_end - 1] = Some(prev);

    for i in seed_end..values.len() {
        let Some(value) = values[i] else { break };
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        out[i] = Some(ema);
        prev = ema;
    }
    out
}

/// Rolling maximum over `period` values (monotonic deque, amortised O(1)).
pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_extreme(values, period, |candidate, held| candidate >= held)
}

/// Rolling minimum over `period` values.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_extreme(values, period, |candidate, held| candidate <= held)
}

fn rolling_extreme<F>(values: &[f64], period: usize, dominates: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> bool,
{
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(period);
    for (i, &value) in values.iter().enumerate() {
        while let Some(&back) = deque.back() {
            if dominates(value, values[back]) {
                deque.pop_back();
            } else {
                break;
            }
        }
        deque.push_back(i);
        if let Some(&front) = deque.front() {
            if front + period <= i {
                deque.pop_front();
            }
        }
        if i + 1 >= period {
            out[i] = deque.front().map(|&idx| values[idx]);
        }
    }
    out
}

/// True range of bar `i` against the previous close.  Bar 0 has no
/// predecessor and falls back to its own high-low range.
pub fn true_range(bars: &[Bar], i: usize) -> f64 {
    let bar = &bars[i];
    let hl = bar.high - bar.low;
    if i == 0 {
        return hl;
    }
    let prev_close = bars[i - 1].close;
    hl.max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

// =============================================================================
// Crossing detectors
// =============================================================================

/// Classify the transition of `a` relative to `b` between two bars.
///
/// `Buy` when `a` moves from `<= b` to `> b`, `Sell` when it moves from
/// `>= b` to `< b`.
pub fn crossing(prev_a: f64, prev_b: f64, a: f64, b: f64) -> Signal {
    if prev_a <= prev_b && a > b {
        Signal::Buy
    } else if prev_a >= prev_b && a < b {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Per-bar crossing signals of `fast` against `slow`.  Bars where either line
/// (or its predecessor) is undefined are `Hold`.
pub fn cross_signals(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<Signal> {
    let len = fast.len().min(slow.len());
    let mut signals = vec![Signal::Hold; len];
    for i in 1..len {
        if let (Some(pa), Some(pb), Some(a), Some(b)) = (fast[i - 1], slow[i - 1], fast[i], slow[i]) {
            signals[i] = crossing(pa, pb, a, b);
        }
    }
    signals
}

/// Per-bar signals for a line crossing fixed levels: `Buy` when it crosses
/// up through `buy_level`, `Sell` when it crosses down through `sell_level`.
pub fn level_cross_signals(line: &[Option<f64>], buy_level: f64, sell_level: f64) -> Vec<Signal> {
    let mut signals = vec![Signal::Hold; line.len()];
    for i in 1..line.len() {
        let (Some(prev), Some(cur)) = (line[i - 1], line[i]) else {
            continue;
        };
        if prev <= buy_level && cur > buy_level {
            signals[i] = Signal::Buy;
        } else if prev >= sell_level && cur < sell_level {
            signals[i] = Signal::Sell;
        }
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(line: &[Option<f64>]) -> Vec<f64> {
        line.iter().flatten().copied().collect()
    }

    #[test]
    fn rolling_mean_basic() {
        let line = as_line(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let ma = rolling_mean(&line, 3);
        assert_eq!(ma.len(), 6);
        assert!(ma[0].is_none() && ma[1].is_none());
        assert_eq!(defined(&ma), vec![11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn rolling_mean_resets_on_gap() {
        let line = vec![Some(1.0), Some(2.0), None, Some(3.0), Some(5.0)];
        let ma = rolling_mean(&line, 2);
        assert_eq!(ma, vec![None, Some(1.5), None, None, Some(4.0)]);
    }

    #[test]
    fn rolling_sum_basic() {
        let sums = rolling_sum(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(sums, vec![None, Some(3.0), Some(5.0), Some(7.0)]);
        assert!(rolling_sum(&[1.0], 2).iter().all(Option::is_none));
    }

    #[test]
    fn ema_seeds_after_leading_gap() {
        let line = vec![None, Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let ema = ema_line(&line, 3);
        assert!(ema[..3].iter().all(Option::is_none));
        assert!((ema[3].unwrap() - 4.0).abs() < 1e-12);
        // k = 0.5 => 8 * 0.5 + 4 * 0.5
        assert!((ema[4].unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn ema_insufficient() {
        assert!(ema_line(&as_line(&[1.0, 2.0]), 3).iter().all(Option::is_none));
        assert!(ema_line(&[], 3).is_empty());
    }

    #[test]
    fn rolling_extremes() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0];
        assert_eq!(
            rolling_max(&values, 3),
            vec![None, None, Some(4.0), Some(4.0), Some(5.0), Some(9.0), Some(9.0)]
        );
        assert_eq!(
            rolling_min(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn ratio_guard() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(6.0, 3.0), 2.0);
    }

    #[test]
    fn crossings_fire_once() {
        let fast = as_line(&[1.0, 3.0, 4.0, 2.0, 1.0]);
        let slow = as_line(&[2.0, 2.0, 2.0, 2.0, 2.0]);
        let signals = cross_signals(&fast, &slow);
        assert_eq!(
            signals,
            vec![Signal::Hold, Signal::Buy, Signal::Hold, Signal::Hold, Signal::Sell]
        );
    }

    #[test]
    fn level_crossings() {
        let line = vec![None, Some(25.0), Some(35.0), Some(75.0), Some(65.0)];
        let signals = level_cross_signals(&line, 30.0, 70.0);
        assert_eq!(
            signals,
            vec![Signal::Hold, Signal::Hold, Signal::Buy, Signal::Hold, Signal::Sell]
        );
    }
}
