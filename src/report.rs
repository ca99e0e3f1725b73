// =============================================================================
// Report Assembler
// =============================================================================
//
// Runs every indicator over one immutable bar snapshot and collects the
// results under stable names.  An indicator without enough bars contributes
// an `Insufficient` entry; it never prevents the rest of the report.
// =============================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::engine_config::IndicatorParams;
use crate::indicators::accumulation_distribution::accumulation_distribution_verdict;
use crate::indicators::adx::{adx_lookback, calculate_adx};
use crate::indicators::bollinger::calculate_bollinger;
use crate::indicators::ema::calculate_ema;
use crate::indicators::fibonacci::fibonacci_verdict;
use crate::indicators::ichimoku::{calculate_ichimoku, ichimoku_lookback};
use crate::indicators::macd::{calculate_macd, macd_lookback};
use crate::indicators::momentum::calculate_momentum;
use crate::indicators::parabolic_sar::parabolic_sar_verdict;
use crate::indicators::pivot_points::pivot_points_verdict;
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::indicators::stochastic::{calculate_stochastic, stochastic_lookback};
use crate::indicators::volume_oscillator::volume_verdict;
use crate::indicators::vortex::vortex_verdict;
use crate::indicators::williams_r::williams_r_verdict;
use crate::indicators::{IndicatorOutput, SeriesOutput, Verdict};
use crate::market_data::Bar;
use crate::types::Signal;

/// Names of the report entries, in the order `build_report` computes them.
pub const INDICATOR_NAMES: [&str; 16] = [
    "sma",
    "ema",
    "rsi",
    "fibonacci",
    "macd",
    "bollinger",
    "stochastic",
    "adx",
    "ichimoku",
    "volume_oscillator",
    "parabolic_sar",
    "williams_r",
    "accumulation_distribution",
    "pivot_points",
    "momentum",
    "vortex",
];

/// Every indicator's result for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub bar_count: usize,
    pub last_date: Option<NaiveDate>,
    pub indicators: BTreeMap<&'static str, IndicatorOutput>,
}

impl Report {
    pub fn get(&self, name: &str) -> Option<&IndicatorOutput> {
        self.indicators.get(name)
    }

    /// Current signal per indicator; indicators without data are omitted.
    pub fn signal_summary(&self) -> BTreeMap<&'static str, Signal> {
        self.indicators
            .iter()
            .filter_map(|(&name, out)| out.current_signal().map(|s| (name, s)))
            .collect()
    }

    /// Names of indicators that lacked data.
    pub fn insufficient(&self) -> Vec<&'static str> {
        self.indicators
            .iter()
            .filter(|(_, out)| out.is_insufficient())
            .map(|(&name, _)| name)
            .collect()
    }
}

/// Build the full report for `bars` using `params`.
pub fn build_report(bars: &[Bar], params: &IndicatorParams) -> Report {
    let n = bars.len();
    let mut indicators = BTreeMap::new();

    let p = params;
    let outputs: [IndicatorOutput; INDICATOR_NAMES.len()] = [
        series(calculate_sma(bars, p.sma.period), p.sma.period, n),
        series(calculate_ema(bars, p.ema.period), p.ema.period, n),
        series(
            calculate_rsi(bars, p.rsi.period, p.rsi.oversold, p.rsi.overbought),
            p.rsi.period + 1,
            n,
        ),
        verdict(
            fibonacci_verdict(bars, p.fibonacci.lookback, p.fibonacci.tolerance_pct),
            p.fibonacci.lookback + 1,
            n,
        ),
        series(
            calculate_macd(bars, p.macd.short, p.macd.long, p.macd.signal),
            macd_lookback(p.macd.long, p.macd.signal),
            n,
        ),
        series(
            calculate_bollinger(bars, p.bollinger.period, p.bollinger.num_std),
            p.bollinger.period,
            n,
        ),
        series(
            calculate_stochastic(
                bars,
                p.stochastic.period,
                p.stochastic.smooth_k,
                p.stochastic.smooth_d,
                p.stochastic.oversold,
                p.stochastic.overbought,
            ),
            stochastic_lookback(p.stochastic.period, p.stochastic.smooth_k, p.stochastic.smooth_d),
            n,
        ),
        series(
            calculate_adx(bars, p.adx.period, p.adx.trend_threshold),
            adx_lookback(p.adx.period),
            n,
        ),
        series(
            calculate_ichimoku(
                bars,
                p.ichimoku.tenkan,
                p.ichimoku.kijun,
                p.ichimoku.senkou_b,
                p.ichimoku.displacement,
            ),
            ichimoku_lookback(p.ichimoku.tenkan, p.ichimoku.kijun, p.ichimoku.senkou_b),
            n,
        ),
        verdict(
            volume_verdict(bars, p.volume_oscillator.short, p.volume_oscillator.long),
            p.volume_oscillator.short.max(p.volume_oscillator.long),
            n,
        ),
        verdict(parabolic_sar_verdict(bars, p.parabolic_sar), 2, n),
        verdict(
            williams_r_verdict(bars, p.williams_r.period, p.williams_r.oversold, p.williams_r.overbought),
            p.williams_r.period,
            n,
        ),
        verdict(accumulation_distribution_verdict(bars), 2, n),
        verdict(pivot_points_verdict(bars), 2, n),
        series(calculate_momentum(bars, p.momentum.period), p.momentum.period + 1, n),
        verdict(vortex_verdict(bars, p.vortex.period), p.vortex.period + 2, n),
    ];
    indicators.extend(INDICATOR_NAMES.into_iter().zip(outputs));

    let report = Report {
        bar_count: n,
        last_date: bars.last().and_then(|b| b.date),
        indicators,
    };

    debug!(
        bars = n,
        insufficient = ?report.insufficient(),
        "indicator report computed"
    );

    report
}

fn series(out: SeriesOutput, required: usize, available: usize) -> IndicatorOutput {
    if out.is_empty() {
        IndicatorOutput::Insufficient { required, available }
    } else {
        IndicatorOutput::Series(out)
    }
}

fn verdict(out: Option<Verdict>, required: usize, available: usize) -> IndicatorOutput {
    match out {
        Some(v) => IndicatorOutput::Verdict(v),
        None => IndicatorOutput::Insufficient { required, available },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05;
                Bar::new(c - 0.2, c + 1.0, c - 1.0, c, 1_000 + (i as u64 % 7) * 100)
            })
            .collect()
    }

    #[test]
    fn full_window_has_every_indicator() {
        let bars = sample_bars(100);
        let report = build_report(&bars, &IndicatorParams::default());
        assert_eq!(report.bar_count, 100);
        assert_eq!(report.indicators.len(), INDICATOR_NAMES.len());
        for name in INDICATOR_NAMES {
            let out = report.get(name).unwrap();
            assert!(!out.is_insufficient(), "{name} lacked data");
            if let Some(series) = out.as_series() {
                assert_eq!(series.len(), 100, "{name} not aligned");
            }
        }
        assert_eq!(report.signal_summary().len(), 16);
    }

    #[test]
    fn empty_window_is_all_insufficient() {
        let report = build_report(&[], &IndicatorParams::default());
        assert_eq!(report.indicators.len(), 16);
        assert_eq!(report.insufficient().len(), 16);
        assert!(report.last_date.is_none());
        assert_eq!(
            report.get("macd"),
            Some(&IndicatorOutput::Insufficient { required: 34, available: 0 })
        );
    }

    #[test]
    fn short_window_keeps_other_indicators() {
        // 30 bars: enough for SMA(25), RSI(14) and ADX(14) but not MACD or
        // Ichimoku.
        let report = build_report(&sample_bars(30), &IndicatorParams::default());
        assert!(report.get("sma").unwrap().as_series().is_some());
        assert!(report.get("rsi").unwrap().as_series().is_some());
        assert!(report.get("pivot_points").unwrap().as_verdict().is_some());
        assert!(report.get("macd").unwrap().is_insufficient());
        assert!(report.get("ichimoku").unwrap().is_insufficient());
        assert!(report.get("adx").unwrap().as_series().is_some());
    }

    #[test]
    fn entries_match_their_indicator() {
        let bars = sample_bars(100);
        let p = IndicatorParams::default();
        let report = build_report(&bars, &p);
        assert_eq!(
            report.get("momentum").and_then(IndicatorOutput::as_series),
            Some(&calculate_momentum(&bars, p.momentum.period))
        );
        assert_eq!(
            report.get("vortex").and_then(IndicatorOutput::as_verdict),
            vortex_verdict(&bars, p.vortex.period).as_ref()
        );
        assert_eq!(
            report.get("pivot_points").and_then(IndicatorOutput::as_verdict),
            pivot_points_verdict(&bars).as_ref()
        );
        assert_eq!(
            report.get("sma").and_then(IndicatorOutput::as_series),
            Some(&calculate_sma(&bars, p.sma.period))
        );
    }

    #[test]
    fn same_snapshot_same_report() {
        let bars = sample_bars(80);
        let params = IndicatorParams::default();
        assert_eq!(build_report(&bars, &params), build_report(&bars, &params));
    }

    #[test]
    fn report_serialises_to_json() {
        let report = build_report(&sample_bars(40), &IndicatorParams::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bar_count"], 40);
        assert_eq!(json["indicators"]["sma"]["kind"], "series");
        assert_eq!(json["indicators"]["pivot_points"]["kind"], "verdict");
        assert_eq!(json["indicators"]["ichimoku"]["kind"], "insufficient");
    }
}
