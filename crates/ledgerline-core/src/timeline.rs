// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Facility Timeline Pipeline
// ─────────────────────────────────────────────────────────────────────
//! Composes the pipeline stages into the render-ready timeline:
//!
//!   1. Normalize the raw snapshot
//!   2. Group by facility, seeded from the registry
//!   3. Sort each group newest first
//!   4. Attach (or carry over) the group's window cursor
//!   5. On render: color the visible window, aggregate window + history
//!
//! The `Timeline` value owns the cursors. Refreshing with a new snapshot
//! rebuilds the groups and rebases the cursors of facilities that are
//! still present, so an operator's "show more" progress survives new
//! ledger events arriving.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use ledgerline_types::{LedgerlineResult, NormalizedEvent, RawEvent, TimelineConfig};

use crate::aggregate::{aggregate, FleetSummary, WindowMetrics};
use crate::colors::assign_colors;
use crate::group::{group, FacilityRegistry};
use crate::normalize::normalize;
use crate::paginate::{sort_newest_first, WindowCursor};

/// One facility's ordered history and its disclosure cursor.
#[derive(Debug, Clone)]
pub struct FacilityGroup {
    facility_id: String,
    events: Vec<NormalizedEvent>,
    cursor: WindowCursor,
}

impl FacilityGroup {
    fn new(facility_id: String, mut events: Vec<NormalizedEvent>, cursor: WindowCursor) -> Self {
        sort_newest_first(&mut events);
        Self {
            facility_id,
            events,
            cursor,
        }
    }

    pub fn facility_id(&self) -> &str {
        &self.facility_id
    }

    /// Full history, newest first.
    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    pub fn total_count(&self) -> usize {
        self.events.len()
    }

    pub fn cursor(&self) -> &WindowCursor {
        &self.cursor
    }

    /// The revealed prefix of the history.
    pub fn window(&self) -> &[NormalizedEvent] {
        self.cursor.window(&self.events)
    }

    pub fn has_more(&self) -> bool {
        !self.cursor.is_exhausted()
    }

    /// Reveal the next step of history. Returns whether anything changed.
    pub fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    pub fn window_metrics(&self, threshold: f64) -> WindowMetrics {
        aggregate(self.window(), threshold)
    }

    pub fn history_metrics(&self, threshold: f64) -> WindowMetrics {
        aggregate(&self.events, threshold)
    }
}

/// A visible event with its marker color.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: NormalizedEvent,
    pub color: String,
    /// Display name of the system holding the transaction reference.
    pub tx_source: Option<&'static str>,
}

/// Everything the rendering layer needs for one facility.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityView {
    pub facility_id: String,
    pub events: Vec<EventView>,
    pub window_size: usize,
    pub total_count: usize,
    pub has_more: bool,
    pub window_metrics: WindowMetrics,
    pub history_metrics: WindowMetrics,
}

/// Per-facility timelines for one reporting context.
#[derive(Debug, Clone)]
pub struct Timeline {
    config: TimelineConfig,
    groups: BTreeMap<String, FacilityGroup>,
}

impl Timeline {
    /// Build from a raw snapshot. Fails only on invalid configuration.
    pub fn build(
        raw: &[RawEvent],
        registry: &dyn FacilityRegistry,
        config: TimelineConfig,
    ) -> LedgerlineResult<Self> {
        config.validate()?;
        let mut timeline = Self {
            config,
            groups: BTreeMap::new(),
        };
        timeline.refresh(raw, registry);
        Ok(timeline)
    }

    /// Rebuild from a new snapshot, keeping the progress of surviving
    /// facilities.
    pub fn refresh(&mut self, raw: &[RawEvent], registry: &dyn FacilityRegistry) {
        let known = registry.known_facilities();
        let grouped = group(normalize(raw), &known);
        let mut previous = std::mem::take(&mut self.groups);

        let groups: BTreeMap<String, FacilityGroup> = grouped
            .into_iter()
            .map(|(facility_id, events)| {
                let cursor = match previous.remove(&facility_id) {
                    Some(old) => {
                        let mut cursor = old.cursor;
                        cursor.rebase(events.len());
                        cursor
                    }
                    None => WindowCursor::from_config(&self.config, events.len()),
                };
                let group = FacilityGroup::new(facility_id.clone(), events, cursor);
                (facility_id, group)
            })
            .collect();

        if !previous.is_empty() {
            log::debug!("dropped {} facilities absent from snapshot", previous.len());
        }
        log::debug!(
            "timeline rebuilt: {} events across {} facilities",
            raw.len(),
            groups.len()
        );
        self.groups = groups;
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn group(&self, facility_id: &str) -> Option<&FacilityGroup> {
        self.groups.get(facility_id)
    }

    /// Groups in facility-id order.
    pub fn groups(&self) -> impl Iterator<Item = &FacilityGroup> {
        self.groups.values()
    }

    pub fn facility_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Reveal more of one facility. Unknown ids are a no-op.
    pub fn advance(&mut self, facility_id: &str) -> bool {
        match self.groups.get_mut(facility_id) {
            Some(group) => group.advance(),
            None => {
                log::debug!("advance: no facility {facility_id:?}");
                false
            }
        }
    }

    /// Reveal more of every facility. Returns how many changed.
    pub fn advance_all(&mut self) -> usize {
        self.groups
            .values_mut()
            .map(FacilityGroup::advance)
            .filter(|advanced| *advanced)
            .count()
    }

    /// Render-ready views, in facility-id order, with fresh marker colors.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<FacilityView> {
        let threshold = self.config.credit_threshold;
        self.groups
            .values()
            .map(|group| {
                let window = group.window();
                let colors = assign_colors(window, &self.config.palette, &mut *rng);
                let events = window
                    .iter()
                    .enumerate()
                    .map(|(i, event)| EventView {
                        event: event.clone(),
                        color: colors.color_at(i).unwrap_or_default().to_string(),
                        tx_source: event.tx_ref.as_ref().map(|tx| tx.provenance.label()),
                    })
                    .collect();
                FacilityView {
                    facility_id: group.facility_id().to_string(),
                    events,
                    window_size: window.len(),
                    total_count: group.total_count(),
                    has_more: group.has_more(),
                    window_metrics: group.window_metrics(threshold),
                    history_metrics: group.history_metrics(threshold),
                }
            })
            .collect()
    }

    /// Fleet-wide rollup over every facility's full history.
    pub fn summary(&self) -> FleetSummary {
        FleetSummary::collect(
            self.groups.values().map(|g| (g.facility_id(), g.events())),
            self.config.credit_threshold,
        )
    }
}
