// =============================================================================
// Volume Oscillator
// =============================================================================
//
// Compares the latest bar's volume with the midpoint of a short and a long
// volume SMA:
//   threshold  = (SMA_short(volume) + SMA_long(volume)) / 2
//   oscillator = (SMA_short - SMA_long) / SMA_long * 100
//
// Verdict: "high volume" when the latest volume is above the threshold,
// "low volume" otherwise.  Volume carries no direction, so the signal is Hold.
// =============================================================================

use super::series::ratio_or_zero;
use super::Verdict;
use crate::market_data::Bar;
use crate::types::Signal;

/// Evaluate the latest volume against the short/long average threshold.
///
/// Returns `None` when either period is zero or fewer than `max(short, long)`
/// bars are available.
pub fn volume_verdict(bars: &[Bar], short: usize, long: usize) -> Option<Verdict> {
    if short == 0 || long == 0 || bars.len() < short.max(long) {
        return None;
    }

    let latest = bars.last()?.volume as f64;
    let short_avg = trailing_volume_mean(bars, short);
    let long_avg = trailing_volume_mean(bars, long);
    let threshold = (short_avg + long_avg) / 2.0;
    let oscillator = ratio_or_zero(short_avg - long_avg, long_avg) * 100.0;

    let label = if latest > threshold {
        "high volume"
    } else {
        "low volume"
    };

    Some(
        Verdict::new(Signal::Hold, label)
            .with_metric("latest_volume", latest)
            .with_metric("short_avg", short_avg)
            .with_metric("long_avg", long_avg)
            .with_metric("oscillator", oscillator),
    )
}

fn trailing_volume_mean(bars: &[Bar], period: usize) -> f64 {
    let window = &bars[bars.len() - period..];
    window.iter().map(|b| b.volume as f64).sum::<f64>() / period as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_from_volumes(volumes: &[u64]) -> Vec<Bar> {
        volumes
            .iter()
            .map(|&v| Bar::new(10.0, 11.0, 9.0, 10.0, v))
            .collect()
    }

    #[test]
    fn insufficient_data() {
        let bars = bars_from_volumes(&[100; 19]);
        assert!(volume_verdict(&bars, 5, 20).is_none());
        assert!(volume_verdict(&bars, 0, 5).is_none());
    }

    #[test]
    fn spike_is_high_volume() {
        let mut volumes = vec![100; 19];
        volumes.push(1_000);
        let v = volume_verdict(&bars_from_volumes(&volumes), 5, 20).unwrap();
        assert_eq!(v.label, "high volume");
        assert_eq!(v.signal, Signal::Hold);
        assert_eq!(v.metric("short_avg"), Some(280.0));
        assert_eq!(v.metric("long_avg"), Some(145.0));
        let osc = v.metric("oscillator").unwrap();
        assert!((osc - 135.0 / 145.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn constant_volume_is_low() {
        // Latest equals the threshold exactly, which is not "above".
        let v = volume_verdict(&bars_from_volumes(&[500; 25]), 5, 20).unwrap();
        assert_eq!(v.label, "low volume");
        assert_eq!(v.metric("oscillator"), Some(0.0));
    }

    #[test]
    fn zero_volume_has_zero_oscillator() {
        let v = volume_verdict(&bars_from_volumes(&[0; 20]), 5, 20).unwrap();
        assert_eq!(v.label, "low volume");
        assert_eq!(v.metric("oscillator"), Some(0.0));
    }
}
