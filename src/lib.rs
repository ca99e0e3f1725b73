// =============================================================================
// Indicator Engine
// =============================================================================
//
// Technical-indicator computation over a bounded window of OHLCV bars.
// Bars enter through `market_data`, indicators are pure functions in
// `indicators`, and `report` assembles all sixteen results for one snapshot.
// =============================================================================

pub mod engine;
pub mod engine_config;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod types;

pub use engine::Engine;
pub use engine_config::{EngineConfig, IndicatorParams};
pub use market_data::{Bar, BarWindow};
pub use report::{build_report, Report};
pub use types::Signal;
