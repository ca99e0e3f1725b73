// =============================================================================
// Engine Configuration — Indicator parameters with atomic save
// =============================================================================
//
// Every tunable parameter of the indicator engine lives here: the bar window
// size, where bars come from, how often the binary refreshes, and the
// lookback/threshold parameters of each indicator in the report.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::parabolic_sar::Acceleration;
use crate::market_data::DEFAULT_WINDOW_CAPACITY;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

fn default_refresh_secs() -> u64 {
    0
}

// =============================================================================
// Per-indicator parameters
// =============================================================================

/// Single-period indicators (SMA, EMA, momentum, vortex).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodParams {
    pub period: usize,
}

impl PeriodParams {
    const fn with_period(period: usize) -> Self {
        Self { period }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciParams {
    /// Number of bars before the latest one that define the swing range.
    pub lookback: usize,
    /// Distance to a level, as a percentage of the range width, that still
    /// counts as "near" it.
    pub tolerance_pct: f64,
}

impl Default for FibonacciParams {
    fn default() -> Self {
        Self {
            lookback: 23,
            tolerance_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub short: usize,
    pub long: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            short: 12,
            long: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub num_std: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            num_std: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    pub period: usize,
    pub smooth_k: usize,
    pub smooth_d: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            period: 14,
            smooth_k: 3,
            smooth_d: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxParams {
    pub period: usize,
    /// Minimum ADX for a DI crossover to count as a signal.
    pub trend_threshold: f64,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self {
            period: 14,
            trend_threshold: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeOscillatorParams {
    pub short: usize,
    pub long: usize,
}

impl Default for VolumeOscillatorParams {
    fn default() -> Self {
        Self { short: 5, long: 20 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WilliamsRParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: -80.0,
            overbought: -20.0,
        }
    }
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Parameters for every indicator in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma: PeriodParams,
    pub ema: PeriodParams,
    pub rsi: RsiParams,
    pub fibonacci: FibonacciParams,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
    pub stochastic: StochasticParams,
    pub adx: AdxParams,
    pub ichimoku: IchimokuParams,
    pub volume_oscillator: VolumeOscillatorParams,
    pub parabolic_sar: Acceleration,
    pub williams_r: WilliamsRParams,
    pub momentum: PeriodParams,
    pub vortex: PeriodParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma: PeriodParams::with_period(25),
            ema: PeriodParams::with_period(26),
            rsi: RsiParams::default(),
            fibonacci: FibonacciParams::default(),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            stochastic: StochasticParams::default(),
            adx: AdxParams::default(),
            ichimoku: IchimokuParams::default(),
            volume_oscillator: VolumeOscillatorParams::default(),
            parabolic_sar: Acceleration::default(),
            williams_r: WilliamsRParams::default(),
            momentum: PeriodParams::with_period(14),
            vortex: PeriodParams::with_period(14),
        }
    }
}

impl IndicatorParams {
    /// Copy with every period forced to at least 1 and MACD/volume short
    /// periods strictly below their long periods.  Each repair is logged.
    pub fn sanitized(&self) -> Self {
        let mut p = self.clone();

        for (name, period) in [
            ("sma", &mut p.sma.period),
            ("ema", &mut p.ema.period),
            ("rsi", &mut p.rsi.period),
            ("fibonacci", &mut p.fibonacci.lookback),
            ("macd.short", &mut p.macd.short),
            ("macd.long", &mut p.macd.long),
            ("macd.signal", &mut p.macd.signal),
            ("bollinger", &mut p.bollinger.period),
            ("stochastic", &mut p.stochastic.period),
            ("stochastic.smooth_k", &mut p.stochastic.smooth_k),
            ("stochastic.smooth_d", &mut p.stochastic.smooth_d),
            ("adx", &mut p.adx.period),
            ("ichimoku.tenkan", &mut p.ichimoku.tenkan),
            ("ichimoku.kijun", &mut p.ichimoku.kijun),
            ("ichimoku.senkou_b", &mut p.ichimoku.senkou_b),
            ("volume_oscillator.short", &mut p.volume_oscillator.short),
            ("volume_oscillator.long", &mut p.volume_oscillator.long),
            ("williams_r", &mut p.williams_r.period),
            ("momentum", &mut p.momentum.period),
            ("vortex", &mut p.vortex.period),
        ] {
            if *period == 0 {
                warn!(parameter = name, "zero period replaced with 1");
                *period = 1;
            }
        }

        if p.macd.short >= p.macd.long {
            let defaults = MacdParams::default();
            warn!(
                short = p.macd.short,
                long = p.macd.long,
                "macd short period must be below long period, using defaults"
            );
            p.macd.short = defaults.short;
            p.macd.long = defaults.long;
        }
        if p.volume_oscillator.short >= p.volume_oscillator.long {
            let defaults = VolumeOscillatorParams::default();
            warn!(
                short = p.volume_oscillator.short,
                long = p.volume_oscillator.long,
                "volume oscillator short period must be below long period, using defaults"
            );
            p.volume_oscillator = defaults;
        }

        let accel = &mut p.parabolic_sar;
        let valid_accel = accel.initial > 0.0
            && accel.step >= 0.0
            && accel.max >= accel.initial
            && accel.initial.is_finite()
            && accel.step.is_finite()
            && accel.max.is_finite();
        if !valid_accel {
            warn!(?accel, "invalid parabolic SAR acceleration, using defaults");
            *accel = Acceleration::default();
        }

        p
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the indicator engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of most recent bars the window retains.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,

    /// CSV file with `Date,Open,High,Low,Close,Volume` rows.
    #[serde(default)]
    pub bars_path: Option<PathBuf>,

    /// Seconds between report refreshes in the binary; 0 prints once.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    #[serde(default)]
    pub indicators: IndicatorParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            bars_path: None,
            refresh_secs: default_refresh_secs(),
            indicators: IndicatorParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            window_capacity = config.window_capacity,
            refresh_secs = config.refresh_secs,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Load `path`, falling back to defaults with a warning.
    ///
    /// Only a missing file is seeded with the defaults so the user has
    /// something to edit; an unreadable or malformed file is left untouched.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                let config = Self::default();
                if !path.exists() {
                    if let Err(e) = config.save(path) {
                        warn!(error = %e, "Failed to write default config");
                    }
                }
                config
            }
        }
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Copy with a non-zero window capacity and sanitized indicator params.
    pub fn sanitized(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.window_capacity == 0 {
            warn!("window_capacity of 0 replaced with default");
            cfg.window_capacity = DEFAULT_WINDOW_CAPACITY;
        }
        cfg.indicators = cfg.indicators.sanitized();
        cfg
    }
}
