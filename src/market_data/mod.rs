pub mod bar_window;
pub mod csv_feed;

// Re-export the Bar struct for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar_window::{Bar, BarWindow, DEFAULT_WINDOW_CAPACITY};
pub use csv_feed::{load_bars_csv, CsvFeed};
