// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Facility Registry & Grouper
// ─────────────────────────────────────────────────────────────────────
//! Partitions normalized events by facility.
//!
//! Two sources name facilities: the registry (canonical ids) and the
//! ids the extractor derived from each record. Reconciliation gives the
//! registry precedence: a derived id that names a registered facility
//! under a different spelling is folded into the canonical group.
//!
//! The in-memory registry serves tests and static deployments; a live
//! facility service plugs in through the `FacilityRegistry` trait.

use std::collections::{BTreeMap, HashMap, HashSet};

use ledgerline_types::NormalizedEvent;

use crate::extract::facility_from_text;

/// Source of known facility ids.
pub trait FacilityRegistry: Send + Sync {
    /// Canonical ids of every registered facility.
    fn known_facilities(&self) -> Vec<String>;
}

/// Fixed, in-memory facility registry.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    facilities: Vec<String>,
}

impl StaticRegistry {
    pub fn new<I, S>(facilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            facilities: facilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_facility(&mut self, id: impl Into<String>) {
        self.facilities.push(id.into());
    }
}

impl FacilityRegistry for StaticRegistry {
    fn known_facilities(&self) -> Vec<String> {
        self.facilities.clone()
    }
}

/// Registry that delegates to a function, e.g. a cached service lookup.
type ListFn = Box<dyn Fn() -> Vec<String> + Send + Sync>;

pub struct ExternalRegistry {
    list_fn: ListFn,
}

impl ExternalRegistry {
    pub fn new(list_fn: impl Fn() -> Vec<String> + Send + Sync + 'static) -> Self {
        Self {
            list_fn: Box::new(list_fn),
        }
    }
}

impl FacilityRegistry for ExternalRegistry {
    fn known_facilities(&self) -> Vec<String> {
        (self.list_fn)()
    }
}

/// Lookup from derived facility ids to canonical registry ids.
///
/// Precedence: exact id, then the id ignoring ASCII case, then the
/// `DC-<word>` token the extractor would pull out of the registered id.
/// An alias claimed by two different registered ids is discarded.
#[derive(Debug, Clone, Default)]
pub struct FacilityIndex {
    canonical: Vec<String>,
    exact: HashSet<String>,
    aliases: HashMap<String, Option<String>>,
}

impl FacilityIndex {
    /// Build from registry ids. Ids are kept verbatim as canonical keys;
    /// duplicates collapse onto the first occurrence. Aliases are built
    /// from the trimmed id, and a blank id gets none.
    pub fn new<'a>(known: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::default();
        for id in known {
            if index.exact.insert(id.to_string()) {
                index.canonical.push(id.to_string());
            }
        }

        let canonical = index.canonical.clone();
        for id in &canonical {
            let trimmed = id.trim();
            if trimmed.is_empty() {
                continue;
            }
            index.claim(trimmed.to_ascii_lowercase(), id);
            if let Some(derived) = facility_from_text(trimmed) {
                index.claim(derived.to_ascii_lowercase(), id);
            }
        }
        index
    }

    fn claim(&mut self, alias: String, id: &str) {
        self.aliases
            .entry(alias)
            .and_modify(|owner| {
                if owner.as_deref() != Some(id) {
                    *owner = None;
                }
            })
            .or_insert_with(|| Some(id.to_string()));
    }

    /// Registered ids in registry order.
    pub fn canonical_ids(&self) -> &[String] {
        &self.canonical
    }

    /// Whether `id` is a registered id, spelled exactly.
    pub fn is_known(&self, id: &str) -> bool {
        self.exact.contains(id)
    }

    /// Map a derived id onto its canonical registry id, or keep it.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        if self.is_known(id) {
            return id;
        }
        match self.aliases.get(&id.to_ascii_lowercase()) {
            Some(Some(canonical)) => {
                log::debug!("facility {id:?} reconciled to registered {canonical:?}");
                canonical.as_str()
            }
            _ => id,
        }
    }
}

/// Partition events by facility.
///
/// Every registered facility gets a group, even with no events. Each
/// event lands in exactly one group; input order is kept within a group.
pub fn group(
    events: Vec<NormalizedEvent>,
    known_facilities: &[String],
) -> BTreeMap<String, Vec<NormalizedEvent>> {
    let index = FacilityIndex::new(known_facilities.iter().map(String::as_str));
    group_with_index(events, &index)
}

/// Same as [`group`] with a prebuilt index.
pub fn group_with_index(
    events: Vec<NormalizedEvent>,
    index: &FacilityIndex,
) -> BTreeMap<String, Vec<NormalizedEvent>> {
    let mut groups: BTreeMap<String, Vec<NormalizedEvent>> = index
        .canonical_ids()
        .iter()
        .map(|id| (id.clone(), Vec::new()))
        .collect();

    for event in events {
        let key = index.resolve(&event.facility_id).to_string();
        groups.entry(key).or_default().push(event);
    }
    groups
}
