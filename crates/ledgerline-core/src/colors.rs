// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Adjacency Color Assigner
// ─────────────────────────────────────────────────────────────────────
//! Marker colors for a display window.
//!
//! Each event gets a random palette entry that differs from the entry of
//! the event displayed just before it. With a palette of `n > 1` colors
//! the next index is `(prev + 1 + r) mod n`, `r` uniform in `0..n-1`,
//! which is uniform over every index except `prev` and needs exactly one
//! draw. A one-color palette paints everything with that color.
//! Repeated palette entries are collapsed first, so distinct indices
//! always mean distinct colors.
//!
//! Colors are not stable across recomputation; only the adjacency
//! property is.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::Serialize;

use ledgerline_types::NormalizedEvent;

/// Colors assigned to one window, aligned with the window's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColorAssignment {
    entries: Vec<(String, String)>,
}

impl ColorAssignment {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Color of the event at `position` in the window.
    pub fn color_at(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(|(_, color)| color.as_str())
    }

    /// Color of the first window event with `event_id`.
    pub fn color_of(&self, event_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == event_id)
            .map(|(_, color)| color.as_str())
    }

    /// `(event id, color)` pairs in window order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, color)| (id.as_str(), color.as_str()))
    }

    /// Event id → color. Later duplicates of an id overwrite earlier ones.
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries.into_iter().collect()
    }
}

/// Palette indices for `len` consecutive items; no two neighbours share
/// an index when `palette_len > 1`.
pub fn assign_indices<R: Rng + ?Sized>(len: usize, palette_len: usize, rng: &mut R) -> Vec<usize> {
    if palette_len == 0 {
        return Vec::new();
    }
    if palette_len == 1 {
        return vec![0; len];
    }

    let mut indices = Vec::with_capacity(len);
    let mut prev: Option<usize> = None;
    for _ in 0..len {
        let next = match prev {
            None => rng.gen_range(0..palette_len),
            Some(p) => (p + 1 + rng.gen_range(0..palette_len - 1)) % palette_len,
        };
        indices.push(next);
        prev = Some(next);
    }
    indices
}

/// Assign a marker color to every event of `window`, in window order.
///
/// An empty palette yields an empty assignment.
pub fn assign_colors<R: Rng + ?Sized>(
    window: &[NormalizedEvent],
    palette: &[String],
    rng: &mut R,
) -> ColorAssignment {
    if palette.is_empty() {
        log::warn!("assign_colors: empty palette, {} events left unmarked", window.len());
        return ColorAssignment::default();
    }

    let mut seen = HashSet::with_capacity(palette.len());
    let palette: Vec<&String> = palette.iter().filter(|c| seen.insert(c.as_str())).collect();

    let entries = assign_indices(window.len(), palette.len(), rng)
        .into_iter()
        .zip(window)
        .map(|(index, event)| (event.id.clone(), palette[index].clone()))
        .collect();
    ColorAssignment { entries }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use ledgerline_types::EventKind;

    use super::*;

    fn window(n: usize) -> Vec<NormalizedEvent> {
        (0..n)
            .map(|i| NormalizedEvent {
                id: format!("e{i}"),
                kind: EventKind::EmissionsUploaded,
                timestamp: DateTime::<Utc>::UNIX_EPOCH,
                facility_id: "DC-North".into(),
                emissions: 0.0,
                tx_ref: None,
                description: None,
            })
            .collect()
    }

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    fn assert_adjacent_distinct(assignment: &ColorAssignment) {
        for i in 1..assignment.len() {
            assert_ne!(assignment.color_at(i - 1), assignment.color_at(i));
        }
    }

    #[test]
    fn test_two_events_two_colors_many_runs() {
        let events = window(2);
        let colors = palette(&["#000", "#fff"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let assignment = assign_colors(&events, &colors, &mut rng);
            assert_eq!(assignment.len(), 2);
            assert_adjacent_distinct(&assignment);
        }
    }

    #[test]
    fn test_long_window_many_runs() {
        let events = window(60);
        let colors = palette(&["#a", "#b", "#c", "#d"]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            assert_adjacent_distinct(&assign_colors(&events, &colors, &mut rng));
        }
    }

    #[test]
    fn test_thread_rng_adjacency() {
        let events = window(25);
        let colors = palette(&["#a", "#b", "#c"]);
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert_adjacent_distinct(&assign_colors(&events, &colors, &mut rng));
        }
    }

    #[test]
    fn test_single_color_palette_terminates() {
        let events = window(5);
        let colors = palette(&["#only"]);
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = assign_colors(&events, &colors, &mut rng);
        assert_eq!(assignment.len(), 5);
        assert!(assignment.iter().all(|(_, c)| c == "#only"));
    }

    #[test]
    fn test_repeated_palette_entries_stay_distinct() {
        let events = window(12);
        let mut rng = StdRng::seed_from_u64(5);
        let colors = palette(&["#a", "#b", "#a"]);
        for _ in 0..200 {
            assert_adjacent_distinct(&assign_colors(&events, &colors, &mut rng));
        }
    }

    #[test]
    fn test_all_repeated_palette_is_single_color() {
        let events = window(2);
        let mut rng = StdRng::seed_from_u64(5);
        let assignment = assign_colors(&events, &palette(&["#a", "#a"]), &mut rng);
        assert_eq!(assignment.len(), 2);
        assert!(assignment.iter().all(|(_, c)| c == "#a"));
    }

    #[test]
    fn test_empty_palette_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_colors(&window(3), &[], &mut rng).is_empty());
    }

    #[test]
    fn test_empty_window() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_colors(&[], &palette(&["#a", "#b"]), &mut rng).is_empty());
    }

    #[test]
    fn test_colors_come_from_palette() {
        let colors = palette(&["#a", "#b", "#c"]);
        let mut rng = StdRng::seed_from_u64(3);
        let assignment = assign_colors(&window(30), &colors, &mut rng);
        assert!(assignment.iter().all(|(_, c)| colors.iter().any(|p| p == c)));
    }

    #[test]
    fn test_lookup_by_event_id() {
        let mut rng = StdRng::seed_from_u64(9);
        let assignment = assign_colors(&window(3), &palette(&["#a", "#b"]), &mut rng);
        assert_eq!(assignment.color_of("e1"), assignment.color_at(1));
        assert!(assignment.color_of("missing").is_none());
        assert_eq!(assignment.into_map().len(), 3);
    }

    #[test]
    fn test_every_other_color_reachable() {
        // After index 0 the next pick must cover 1..n, never 0.
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let indices = assign_indices(2, 4, &mut rng);
            if indices[0] == 0 {
                seen[indices[1]] = true;
            }
        }
        assert_eq!(seen, [false, true, true, true]);
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let a = assign_indices(20, 5, &mut StdRng::seed_from_u64(99));
        let b = assign_indices(20, 5, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    proptest! {
        #[test]
        fn neighbours_never_share_a_color(
            len in 0usize..80,
            palette_len in 2usize..8,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let indices = assign_indices(len, palette_len, &mut rng);
            prop_assert_eq!(indices.len(), len);
            for pair in indices.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
            prop_assert!(indices.iter().all(|&i| i < palette_len));
        }
    }
}
