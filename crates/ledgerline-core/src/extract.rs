// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Field Extractor
// ─────────────────────────────────────────────────────────────────────
//! Pulls the facility, emissions quantity, and transaction reference out
//! of one raw ledger record.
//!
//! Explicit fields win. When they are missing, the free-text description
//! is searched instead. Nothing in here fails: a record with no usable
//! data resolves to `DC-Unknown`, zero emissions, and no reference.

use std::sync::LazyLock;

use regex::Regex;

use ledgerline_types::{sanitize_emissions, Provenance, RawEvent, TxRef};
use ledgerline_types::{FACILITY_PREFIX, UNKNOWN_FACILITY};

/// `DC-` followed by a word, anywhere in the text.
static FACILITY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DC-\w+").expect("facility token regex is valid"));

/// A number (grouping commas allowed, leading decimal point allowed)
/// followed by the `tons` unit.
static EMISSIONS_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9][0-9,]*(?:\.[0-9]+)?|\.[0-9]+)\s*tons\b")
        .expect("emissions quantity regex is valid")
});

/// Fields recovered from one raw record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub facility_id: String,
    pub emissions: f64,
    pub tx_ref: Option<TxRef>,
}

/// Run every extractor over `raw`.
pub fn extract(raw: &RawEvent) -> ExtractedFields {
    ExtractedFields {
        facility_id: resolve_facility(raw),
        emissions: extract_emissions(raw.description.as_deref()),
        tx_ref: extract_tx_ref(raw),
    }
}

/// Resolve the facility a record belongs to.
///
/// Order: explicit field, `DC-<word>` token in the description, first
/// whitespace token starting with `DC-` (stripped to `[A-Za-z0-9-]`),
/// then `DC-Unknown`.
pub fn resolve_facility(raw: &RawEvent) -> String {
    if let Some(explicit) = raw.facility_id.as_deref().map(str::trim) {
        if !explicit.is_empty() {
            return explicit.to_string();
        }
    }

    if let Some(found) = raw.description.as_deref().and_then(facility_from_text) {
        return found;
    }

    log::debug!(
        "event {:?}: no facility in record or description, using {UNKNOWN_FACILITY}",
        raw.id
    );
    UNKNOWN_FACILITY.to_string()
}

/// Facility code mentioned in free text, if any.
///
/// Tries the strict `DC-<word>` pattern first, then the loose token scan.
pub fn facility_from_text(text: &str) -> Option<String> {
    if let Some(m) = FACILITY_TOKEN.find(text) {
        return Some(m.as_str().to_string());
    }

    let token = text
        .split_whitespace()
        .find(|token| token.starts_with(FACILITY_PREFIX))?;
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    // A bare prefix names no facility.
    if cleaned.len() > FACILITY_PREFIX.len() {
        Some(cleaned)
    } else {
        None
    }
}

/// Emissions quantity (tons CO2e) stated in the description, or 0.
pub fn extract_emissions(description: Option<&str>) -> f64 {
    let Some(text) = description else {
        return 0.0;
    };
    let Some(caps) = EMISSIONS_QUANTITY.captures(text) else {
        return 0.0;
    };

    let digits: String = caps[1].chars().filter(|c| *c != ',').collect();
    match digits.parse::<f64>() {
        Ok(value) => sanitize_emissions(value),
        Err(e) => {
            log::debug!("unparseable emissions quantity {:?}: {e}", &caps[1]);
            0.0
        }
    }
}

/// First transaction reference present, by provenance priority.
///
/// Blank reference fields count as absent.
pub fn extract_tx_ref(raw: &RawEvent) -> Option<TxRef> {
    Provenance::PRIORITY.iter().find_map(|&provenance| {
        let id = raw.reference(provenance)?.trim();
        if id.is_empty() {
            None
        } else {
            Some(TxRef {
                provenance,
                id: id.to_string(),
            })
        }
    })
}
