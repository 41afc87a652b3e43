// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Timeline Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{LedgerlineError, LedgerlineResult};

/// Marker colors used by the dashboard timeline when none are configured.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#22c55e", "#3b82f6", "#a855f7", "#f59e0b", "#ef4444", "#14b8a6",
];

/// Runtime configuration for one reporting context.
///
/// Holds everything the engine needs besides the event snapshot and
/// the facility registry: the marker palette, the pagination constants,
/// and the emissions threshold that credit balances are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Ordered marker colors. At least one entry, no repeats.
    pub palette: Vec<String>,

    /// Events revealed per facility before the first `advance`.
    /// Default: 20.
    pub initial_window: usize,

    /// Events revealed by each `advance`.
    /// Default: 20.
    pub window_step: usize,

    /// Emissions allowance (tons CO2e) for the credit balance.
    /// Default: 5000.0.
    pub credit_threshold: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            initial_window: 20,
            window_step: 20,
            credit_threshold: 5000.0,
        }
    }
}

impl TimelineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> LedgerlineResult<()> {
        if self.palette.is_empty() {
            return Err(LedgerlineError::Config(
                "palette must contain at least one color".to_string(),
            ));
        }
        if let Some(pos) = self.palette.iter().position(|c| c.trim().is_empty()) {
            return Err(LedgerlineError::Config(format!(
                "palette entry {pos} is blank"
            )));
        }
        for (pos, color) in self.palette.iter().enumerate() {
            if let Some(first) = self.palette[..pos].iter().position(|c| c == color) {
                return Err(LedgerlineError::Config(format!(
                    "palette entry {pos} repeats entry {first} ({color})"
                )));
            }
        }
        if self.initial_window < 1 {
            return Err(LedgerlineError::Config(format!(
                "initial_window must be >= 1, got {}",
                self.initial_window
            )));
        }
        if self.window_step < 1 {
            return Err(LedgerlineError::Config(format!(
                "window_step must be >= 1, got {}",
                self.window_step
            )));
        }
        if !self.credit_threshold.is_finite() {
            return Err(LedgerlineError::Config(format!(
                "credit_threshold must be finite, got {}",
                self.credit_threshold
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> LedgerlineResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerlineError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
