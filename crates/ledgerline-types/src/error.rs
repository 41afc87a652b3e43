// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for the Ledgerline boundaries.
///
/// The timeline engine itself never fails: malformed records degrade to
/// default values. Errors only surface where a caller hands the engine
/// configuration or an input document.
#[derive(Error, Debug)]
pub enum LedgerlineError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Input document could not be read as a ledger event array.
    #[error("input error: {0}")]
    Input(String),
}

pub type LedgerlineResult<T> = Result<T, LedgerlineError>;
