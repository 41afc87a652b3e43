// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Emissions Aggregator
// ─────────────────────────────────────────────────────────────────────
//! Emissions rollups and credit balance against a reporting threshold.
//!
//! `credit_balance = threshold - total_emissions`; a negative balance is a
//! deficit.

use serde::{Deserialize, Serialize};

use ledgerline_types::NormalizedEvent;

/// Rollup over a run of events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub total_emissions: f64,
    pub credit_balance: f64,
    pub is_surplus: bool,
}

/// Sum the emissions of `events` and compare with `threshold`.
pub fn aggregate(events: &[NormalizedEvent], threshold: f64) -> WindowMetrics {
    let total_emissions: f64 = events.iter().map(|e| e.emissions).sum();
    let credit_balance = threshold - total_emissions;
    WindowMetrics {
        total_emissions,
        credit_balance,
        is_surplus: credit_balance >= 0.0,
    }
}

/// Fleet-wide rollup across every facility's full history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub facility_count: usize,
    pub event_count: usize,
    pub total_emissions: f64,
    /// Facilities whose history exceeds the threshold, in input order.
    pub deficit_facilities: Vec<String>,
}

impl FleetSummary {
    /// Collect from `(facility id, events)` pairs.
    pub fn collect<'a, I>(facilities: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [NormalizedEvent])>,
    {
        let mut summary = Self::default();
        for (facility_id, events) in facilities {
            let metrics = aggregate(events, threshold);
            summary.facility_count += 1;
            summary.event_count += events.len();
            summary.total_emissions += metrics.total_emissions;
            if !metrics.is_surplus {
                summary.deficit_facilities.push(facility_id.to_string());
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use ledgerline_types::EventKind;

    use super::*;

    fn emitting(tons: &[f64]) -> Vec<NormalizedEvent> {
        tons.iter()
            .enumerate()
            .map(|(i, &t)| NormalizedEvent {
                id: format!("e{i}"),
                kind: EventKind::EmissionsUploaded,
                timestamp: DateTime::<Utc>::UNIX_EPOCH,
                facility_id: "DC-North".into(),
                emissions: t,
                tx_ref: None,
                description: None,
            })
            .collect()
    }

    #[test]
    fn test_aggregate_surplus() {
        let m = aggregate(&emitting(&[100.0, 200.0, 50.0]), 500.0);
        assert_eq!(m.total_emissions, 350.0);
        assert_eq!(m.credit_balance, 150.0);
        assert!(m.is_surplus);
    }

    #[test]
    fn test_aggregate_deficit() {
        let m = aggregate(&emitting(&[100.0, 200.0, 50.0]), 300.0);
        assert_eq!(m.total_emissions, 350.0);
        assert_eq!(m.credit_balance, -50.0);
        assert!(!m.is_surplus);
    }

    #[test]
    fn test_aggregate_exact_threshold_is_surplus() {
        let m = aggregate(&emitting(&[250.0, 250.0]), 500.0);
        assert_eq!(m.credit_balance, 0.0);
        assert!(m.is_surplus);
    }

    #[test]
    fn test_aggregate_empty() {
        let m = aggregate(&[], 120.0);
        assert_eq!(m.total_emissions, 0.0);
        assert_eq!(m.credit_balance, 120.0);
        assert!(m.is_surplus);
    }

    #[test]
    fn test_fleet_summary() {
        let north = emitting(&[400.0, 300.0]);
        let south = emitting(&[10.0]);
        let idle: Vec<NormalizedEvent> = vec![];
        let summary = FleetSummary::collect(
            [
                ("DC-Idle", idle.as_slice()),
                ("DC-North", north.as_slice()),
                ("DC-South", south.as_slice()),
            ],
            500.0,
        );
        assert_eq!(summary.facility_count, 3);
        assert_eq!(summary.event_count, 3);
        assert_eq!(summary.total_emissions, 710.0);
        assert_eq!(summary.deficit_facilities, vec!["DC-North".to_string()]);
    }
}
