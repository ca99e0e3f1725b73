// =============================================================================
// Shared types used across the indicator engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Discrete trading signal emitted by an indicator for a single bar (or as a
/// terminal verdict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Default for Signal {
    fn default() -> Self {
        Self::Hold
    }
}

impl Signal {
    /// Lower-case label used in textual verdicts ("buy", "sell", "hold").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}
