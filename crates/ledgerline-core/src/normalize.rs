// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Normalizer
// ─────────────────────────────────────────────────────────────────────
//! Turns raw ledger records into `NormalizedEvent`s.
//!
//! One output per input, same order, each record handled on its own.
//! Missing or malformed fields degrade to documented defaults; nothing
//! in this module returns an error except the JSON document reader at
//! the input boundary.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use ledgerline_types::{EventKind, LedgerlineError, LedgerlineResult, NormalizedEvent, RawEvent};

use crate::extract::extract;

/// Offset-less layouts accepted after RFC 3339. Read as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// UTC years that RFC 3339 can write back out.
const RFC3339_YEARS: RangeInclusive<i32> = 0..=9999;

/// Parse a ledger timestamp.
///
/// Accepts RFC 3339 (any offset), offset-less date-times, and bare dates.
/// Instants whose UTC year falls outside 0000-9999 are rejected.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = parse_any_layout(value)?;
    if !RFC3339_YEARS.contains(&parsed.year()) {
        log::debug!("timestamp {value:?} outside years 0000-9999, ignoring");
        return None;
    }
    Some(parsed)
}

fn parse_any_layout(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Event time: primary timestamp, then creation timestamp, then the epoch.
pub fn resolve_timestamp(raw: &RawEvent) -> DateTime<Utc> {
    if let Some(ts) = raw.timestamp.as_deref().and_then(parse_timestamp) {
        return ts;
    }
    if let Some(ts) = raw.created_at.as_deref().and_then(parse_timestamp) {
        return ts;
    }
    log::debug!("event {:?}: no usable timestamp, using epoch", raw.id);
    DateTime::<Utc>::UNIX_EPOCH
}

/// Normalize a single record.
pub fn normalize_event(raw: &RawEvent) -> NormalizedEvent {
    let fields = extract(raw);
    NormalizedEvent {
        id: raw.id.clone(),
        kind: EventKind::from_tag(&raw.kind),
        timestamp: resolve_timestamp(raw),
        facility_id: fields.facility_id,
        emissions: fields.emissions,
        tx_ref: fields.tx_ref,
        description: raw.description.clone(),
    }
}

/// Normalize a snapshot of records. Output matches input length and order.
pub fn normalize(raw: &[RawEvent]) -> Vec<NormalizedEvent> {
    raw.iter().map(normalize_event).collect()
}

/// Read a JSON array of ledger records.
///
/// Elements that are not JSON objects are skipped with a warning; a
/// document that is not an array is an error.
pub fn parse_raw_events(json: &str) -> LedgerlineResult<Vec<RawEvent>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
        LedgerlineError::Input(format!("expected a JSON array of ledger events: {e}"))
    })?;

    let mut events = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawEvent>(value) {
            Ok(event) => events.push(event),
            Err(e) => log::warn!("skipping ledger record {index}: {e}"),
        }
    }
    Ok(events)
}
