// =============================================================================
// Indicator Engine — shared state behind the report boundary
// =============================================================================
//
// Ties the bar window and the engine configuration together and exposes the
// single presentation operation: compute the current report.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the configuration.
//   - The BarWindow manages its own interior mutability, so ingestion and
//     report computation can run from different tasks via `Arc<Engine>`.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::engine_config::EngineConfig;
use crate::market_data::{Bar, BarWindow, CsvFeed};
use crate::report::{build_report, Report};

pub struct Engine {
    /// Incremented on every ingested batch and configuration change.
    state_version: AtomicU64,
    config: RwLock<EngineConfig>,
    window: Arc<BarWindow>,
}

impl Engine {
    /// Build an engine with an empty window sized from `config`.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let window = Arc::new(BarWindow::new(config.window_capacity));
        Self {
            state_version: AtomicU64::new(1),
            config: RwLock::new(config),
            window,
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current state version.  It only ever increases; a higher value than
    /// the one seen at the last report means a fresher report is available.
    /// The window and config are read separately, so a report is not tied
    /// to one exact version while ingestion runs concurrently.
    pub fn version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Ingestion ───────────────────────────────────────────────────────

    pub fn window(&self) -> &Arc<BarWindow> {
        &self.window
    }

    /// Append one live bar.
    pub fn ingest(&self, bar: Bar) -> u64 {
        self.window.append(bar);
        self.increment_version()
    }

    /// Append a batch of bars under a single window lock.
    pub fn ingest_batch(&self, bars: Vec<Bar>) -> u64 {
        if bars.is_empty() {
            return self.version();
        }
        self.window.extend(bars);
        self.increment_version()
    }

    /// Pull newly appended rows from `feed` into the window.
    pub fn poll_feed(&self, feed: &mut CsvFeed) -> Result<usize> {
        let added = feed.poll(&self.window)?;
        if added > 0 {
            let version = self.increment_version();
            debug!(added, version, "bars ingested from feed");
        }
        Ok(added)
    }

    // ── Configuration ───────────────────────────────────────────────────

    pub fn config(&self) -> EngineConfig {
        self.config.read().clone()
    }

    /// Replace the configuration.  The window capacity is fixed at
    /// construction; a different value is ignored with a warning.
    pub fn update_config(&self, config: EngineConfig) -> u64 {
        let mut config = config.sanitized();
        if config.window_capacity != self.window.capacity() {
            warn!(
                requested = config.window_capacity,
                current = self.window.capacity(),
                "window capacity cannot change at runtime"
            );
            config.window_capacity = self.window.capacity();
        }
        *self.config.write() = config;
        self.increment_version()
    }

    // ── Presentation ────────────────────────────────────────────────────

    /// Run every indicator over a consistent snapshot of the window.
    pub fn compute_report(&self) -> Report {
        let bars = self.window.snapshot();
        let params = self.config.read().indicators.clone();
        build_report(&bars, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: usize) -> Bar {
        let c = 50.0 + (i as f64 * 0.5).cos() * 3.0;
        Bar::new(c, c + 0.5, c - 0.5, c, 500)
    }

    #[test]
    fn ingest_bumps_version() {
        let engine = Engine::new(EngineConfig::default());
        let v0 = engine.version();
        assert_eq!(engine.ingest(bar(0)), v0 + 1);
        assert_eq!(engine.ingest_batch(Vec::new()), v0 + 1);
        assert_eq!(engine.ingest_batch((1..5).map(bar).collect()), v0 + 2);
        assert_eq!(engine.window().len(), 5);
    }

    #[test]
    fn report_reflects_window() {
        let engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.compute_report().insufficient().len(), 16);

        engine.ingest_batch((0..120).map(bar).collect());
        let report = engine.compute_report();
        assert_eq!(report.bar_count, 100);
        assert!(report.insufficient().is_empty());
        assert_eq!(report, engine.compute_report());
    }

    #[test]
    fn config_update_keeps_capacity() {
        let engine = Engine::new(EngineConfig::default());
        let mut cfg = EngineConfig::default();
        cfg.window_capacity = 10;
        cfg.indicators.sma.period = 5;
        let before = engine.version();
        assert!(engine.update_config(cfg) > before);
        assert_eq!(engine.config().window_capacity, 100);
        assert_eq!(engine.config().indicators.sma.period, 5);
    }

    #[test]
    fn concurrent_ingest_and_report() {
        let engine = Arc::new(Engine::new(EngineConfig::default()));
        let writer = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for i in 0..200 {
                    engine.ingest(bar(i));
                }
            })
        };
        for _ in 0..20 {
            let report = engine.compute_report();
            assert!(report.bar_count <= 100);
        }
        writer.join().unwrap();
        assert_eq!(engine.window().len(), 100);
    }
}
