// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Timeline Engine Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Ledger event normalization and per-facility timeline aggregation
//! for the compliance dashboard.
//!
//! Pipeline: raw records → normalize → group by facility → sort newest
//! first → window → marker colors + emissions rollups.
//!
//! # Invariants
//!
//! 1. **Normalization is total**: every raw record yields exactly one
//!    `NormalizedEvent`. Missing data degrades to `DC-Unknown`, zero
//!    emissions, no transaction reference, or the Unix epoch.
//!
//! 2. **Grouping is complete**: every event lands in exactly one facility
//!    group and every registered facility has a group, empty or not.
//!    Registry spellings win over ids derived from free text.
//!
//! 3. **Windows only grow**: a `WindowCursor` never shrinks on `advance`
//!    and never exceeds the history length.
//!
//! 4. **Neighbours differ**: adjacent events in a window never share a
//!    marker color when the palette has more than one entry. Assignment
//!    takes one random draw per event and always terminates.

pub mod aggregate;
pub mod colors;
pub mod extract;
pub mod group;
pub mod normalize;
pub mod paginate;
pub mod timeline;

pub use aggregate::{aggregate, FleetSummary, WindowMetrics};
pub use colors::{assign_colors, ColorAssignment};
pub use extract::{extract, ExtractedFields};
pub use group::{group, ExternalRegistry, FacilityIndex, FacilityRegistry, StaticRegistry};
pub use normalize::{normalize, normalize_event, parse_raw_events};
pub use paginate::{sort_newest_first, WindowCursor};
pub use timeline::{EventView, FacilityGroup, FacilityView, Timeline};
