// =============================================================================
// Parabolic SAR (Stop And Reverse)
// =============================================================================
//
// Each bar the SAR moves toward the extreme point (EP) of the current trend:
//   SAR_next = SAR + AF * (EP - SAR)
//
// In an uptrend the SAR may not rise above the two previous lows (mirrored
// for a downtrend).  A new extreme raises AF by `step` up to `max`.  When
// price penetrates the SAR the trend reverses: the SAR jumps to the old EP,
// the EP becomes the current bar's extreme and AF resets to `initial`.
//
// Verdict: "buy" while the final state is an uptrend, "sell" otherwise.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

/// Acceleration factor schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    pub initial: f64,
    pub step: f64,
    pub max: f64,
}

impl Default for Acceleration {
    fn default() -> Self {
        Self {
            initial: 0.02,
            step: 0.02,
            max: 0.20,
        }
    }
}

/// Running state of the SAR recurrence for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub uptrend: bool,
    pub sar: f64,
    pub extreme_point: f64,
    pub acceleration: f64,
}

impl SarState {
    /// Seed from the first two bars: the trend is up when the second close
    /// is not below the first.
    pub fn seed(first: &Bar, second: &Bar, accel: Acceleration) -> Self {
        let uptrend = second.close >= first.close;
        let (sar, extreme_point) = if uptrend {
            (first.low, first.high)
        } else {
            (first.high, first.low)
        };
        Self {
            uptrend,
            sar,
            extreme_point,
            acceleration: accel.initial,
        }
    }

    /// Advance the recurrence to bar `i`.  `bars[i - 1]` must exist.
    pub fn advance(&mut self, bars: &[Bar], i: usize, accel: Acceleration) {
        let bar = &bars[i];
        let mut next = self.sar + self.acceleration * (self.extreme_point - self.sar);

        if self.uptrend {
            next = next.min(bars[i - 1].low);
            if i >= 2 {
                next = next.min(bars[i - 2].low);
            }
            if bar.low < next {
                self.reverse(self.extreme_point, bar.low, accel);
                return;
            }
            if bar.high > self.extreme_point {
                self.extreme_point = bar.high;
                self.accelerate(accel);
            }
        } else {
            next = next.max(bars[i - 1].high);
            if i >= 2 {
                next = next.max(bars[i - 2].high);
            }
            if bar.high > next {
                self.reverse(self.extreme_point, bar.high, accel);
                return;
            }
            if bar.low < self.extreme_point {
                self.extreme_point = bar.low;
                self.accelerate(accel);
            }
        }
        self.sar = next;
    }

    /// The SAR restarts at the extreme point of the trend that just ended.
    fn reverse(&mut self, sar: f64, extreme_point: f64, accel: Acceleration) {
        self.uptrend = !self.uptrend;
        self.sar = sar;
        self.extreme_point = extreme_point;
        self.acceleration = accel.initial;
    }

    fn accelerate(&mut self, accel: Acceleration) {
        self.acceleration = (self.acceleration + accel.step).min(accel.max);
    }
}

/// Run the recurrence over every bar and return the final state, or `None`
/// with fewer than two bars.
pub fn run_sar(bars: &[Bar], accel: Acceleration) -> Option<SarState> {
    if bars.len() < 2 {
        return None;
    }
    let mut state = SarState::seed(&bars[0], &bars[1], accel);
    for i in 1..bars.len() {
        state.advance(bars, i, accel);
    }
    Some(state)
}

/// Current-trend verdict with the final SAR, EP and AF as metrics.
pub fn parabolic_sar_verdict(bars: &[Bar], accel: Acceleration) -> Option<Verdict> {
    let state = run_sar(bars, accel)?;
    let (signal, label) = if state.uptrend {
        (Signal::Buy, "buy")
    } else {
        (Signal::Sell, "sell")
    };
    Some(
        Verdict::new(signal, label)
            .with_metric("sar", state.sar)
            .with_metric("extreme_point", state.extreme_point)
            .with_metric("acceleration", state.acceleration),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64, close: f64) -> Bar {
        Bar::new(close, high, low, close, 1)
    }

    #[test]
    fn needs_two_bars() {
        assert!(parabolic_sar_verdict(&[bar(2.0, 1.0, 1.5)], Acceleration::default()).is_none());
        assert!(parabolic_sar_verdict(&[], Acceleration::default()).is_none());
    }

    #[test]
    fn rising_series_stays_long() {
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let c = 100.0 + i as f64;
                bar(c + 1.0, c - 1.0, c)
            })
            .collect();
        let v = parabolic_sar_verdict(&bars, Acceleration::default()).unwrap();
        assert_eq!(v.signal, Signal::Buy);
        assert_eq!(v.label, "buy");
        assert_eq!(v.metric("extreme_point"), Some(140.0));
        // Every bar makes a new high, so AF ends at its cap.
        assert!((v.metric("acceleration").unwrap() - 0.20).abs() < 1e-12);
        assert!(v.metric("sar").unwrap() < 138.0);
    }

    #[test]
    fn sar_stays_below_lows_in_uptrend() {
        let accel = Acceleration::default();
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let c = 50.0 + i as f64 * 0.5;
                bar(c + 0.4, c - 0.4, c)
            })
            .collect();
        let mut state = SarState::seed(&bars[0], &bars[1], accel);
        for i in 1..bars.len() {
            state.advance(&bars, i, accel);
            assert!(state.uptrend);
            assert!(state.sar <= bars[i - 1].low);
        }
    }

    #[test]
    fn crash_reverses_to_short() {
        let mut bars: Vec<Bar> = (0..20)
            .map(|i| {
                let c = 100.0 + i as f64;
                bar(c + 1.0, c - 1.0, c)
            })
            .collect();
        bars.push(bar(100.0, 80.0, 81.0));
        let state = run_sar(&bars, Acceleration::default()).unwrap();
        assert!(!state.uptrend);
        // SAR restarts at the prior extreme high, EP at the crash low.
        assert_eq!(state.sar, 120.0);
        assert_eq!(state.extreme_point, 80.0);
        assert_eq!(state.acceleration, 0.02);

        let v = parabolic_sar_verdict(&bars, Acceleration::default()).unwrap();
        assert_eq!(v.label, "sell");
    }

    #[test]
    fn falling_start_seeds_downtrend() {
        let state = SarState::seed(&bar(10.0, 8.0, 9.0), &bar(9.5, 7.5, 8.0), Acceleration::default());
        assert!(!state.uptrend);
        assert_eq!(state.sar, 10.0);
        assert_eq!(state.extreme_point, 8.0);
    }
}
