// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Timeline Engine Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Ledger event model, configuration, and error hierarchy for the
//! Ledgerline timeline engine.

pub mod config;
pub mod error;
pub mod event;

pub use config::{TimelineConfig, DEFAULT_PALETTE};
pub use error::{LedgerlineError, LedgerlineResult};
pub use event::{
    sanitize_emissions, EventKind, NormalizedEvent, Provenance, RawEvent, TxRef,
    FACILITY_PREFIX, UNKNOWN_FACILITY,
};
