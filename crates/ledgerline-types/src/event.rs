// ─────────────────────────────────────────────────────────────────────
// Ledgerline — Ledger Event Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Prefix shared by every datacenter facility code.
pub const FACILITY_PREFIX: &str = "DC-";

/// Facility id given to events that cannot be attributed to a site.
pub const UNKNOWN_FACILITY: &str = "DC-Unknown";

/// Coerce an extracted emissions quantity into a non-negative finite value.
///
/// NaN, infinities and negative values map to 0.0.
#[inline]
pub fn sanitize_emissions(value: f64) -> f64 {
    if !value.is_finite() {
        log::warn!("sanitize_emissions: non-finite quantity {value}, using 0");
        return 0.0;
    }
    if value < 0.0 {
        log::warn!("sanitize_emissions: negative quantity {value:.4}, using 0");
        return 0.0;
    }
    value
}

/// Ledger event kind.
///
/// The ledger emits a small closed set of tags; anything else is kept
/// verbatim in `Other` so that no record is rejected for its tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    CertificateIssued,
    ReportFrozen,
    EmissionsUploaded,
    ZkProofVerified,
    Other(String),
}

impl EventKind {
    /// Parse a ledger tag. Matching ignores ASCII case and surrounding whitespace.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "CERTIFICATE_ISSUED" => Self::CertificateIssued,
            "REPORT_FROZEN" => Self::ReportFrozen,
            "EMISSIONS_UPLOADED" => Self::EmissionsUploaded,
            "ZK_PROOF_VERIFIED" => Self::ZkProofVerified,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// Wire tag.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::CertificateIssued => "CERTIFICATE_ISSUED",
            Self::ReportFrozen => "REPORT_FROZEN",
            Self::EmissionsUploaded => "EMISSIONS_UPLOADED",
            Self::ZkProofVerified => "ZK_PROOF_VERIFIED",
            Self::Other(tag) => tag,
        }
    }

    /// Operator-facing label.
    pub fn label(&self) -> &str {
        match self {
            Self::CertificateIssued => "Certificate issued",
            Self::ReportFrozen => "Report frozen",
            Self::EmissionsUploaded => "Emissions uploaded",
            Self::ZkProofVerified => "ZK proof verified",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_tag().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Source system of a transaction reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    /// Public ledger-chain transaction hash.
    LedgerChain,
    /// Side-chain transaction id.
    SideChain,
    /// Content-addressed storage hash.
    ContentStore,
    /// Zero-knowledge proof artifact hash.
    Proof,
}

impl Provenance {
    /// Lookup order used when a record carries several references.
    pub const PRIORITY: [Provenance; 4] = [
        Provenance::LedgerChain,
        Provenance::SideChain,
        Provenance::ContentStore,
        Provenance::Proof,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LedgerChain => "Ledger",
            Self::SideChain => "Side-chain",
            Self::ContentStore => "Content store",
            Self::Proof => "Proof",
        }
    }
}

/// Pointer to external evidence corroborating a ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRef {
    pub provenance: Provenance,
    pub id: String,
}

/// One ledger record as delivered by the audit log.
///
/// Every field is optional on the wire. Nothing here is trusted: the
/// normalizer decides what each field is worth. Fields are read
/// leniently so that a badly typed field never costs the whole record:
/// `null` and structured values count as absent, numbers and booleans
/// are kept as text, and numeric time fields are epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(rename = "eventType", alias = "kind", deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::instant"
    )]
    pub timestamp: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::instant"
    )]
    pub created_at: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub facility_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub ledger_tx_hash: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub sidechain_tx_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub content_hash: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub proof_hash: Option<String>,
}

/// Field readers for `RawEvent` that accept any JSON value.
mod lenient {
    use chrono::{DateTime, SecondsFormat};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            Value::Array(_) | Value::Object(_) => {
                log::debug!("ignoring structured value in scalar ledger field");
                None
            }
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    /// Text timestamps pass through; integral numbers are epoch millis.
    pub fn instant<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => match n.as_i64().and_then(DateTime::from_timestamp_millis) {
                Some(dt) => Ok(Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
                None => {
                    log::debug!("epoch millis {n} out of range");
                    Ok(Some(n.to_string()))
                }
            },
            other => Ok(scalar(other)),
        }
    }
}

impl RawEvent {
    /// The reference field carried for `provenance`, if any.
    pub fn reference(&self, provenance: Provenance) -> Option<&str> {
        match provenance {
            Provenance::LedgerChain => self.ledger_tx_hash.as_deref(),
            Provenance::SideChain => self.sidechain_tx_id.as_deref(),
            Provenance::ContentStore => self.content_hash.as_deref(),
            Provenance::Proof => self.proof_hash.as_deref(),
        }
    }

    fn set_reference(&mut self, tx: &TxRef) {
        let slot = match tx.provenance {
            Provenance::LedgerChain => &mut self.ledger_tx_hash,
            Provenance::SideChain => &mut self.sidechain_tx_id,
            Provenance::ContentStore => &mut self.content_hash,
            Provenance::Proof => &mut self.proof_hash,
        };
        *slot = Some(tx.id.clone());
    }
}

/// A ledger record after field resolution. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub kind: EventKind,
    /// UTC instant; the Unix epoch when the record had no usable time.
    pub timestamp: DateTime<Utc>,
    pub facility_id: String,
    /// Tons CO2e, never negative.
    pub emissions: f64,
    pub tx_ref: Option<TxRef>,
    pub description: Option<String>,
}

impl From<&NormalizedEvent> for RawEvent {
    /// Re-wrap a resolved record in the wire shape, with every resolved
    /// field made explicit.
    fn from(event: &NormalizedEvent) -> Self {
        let mut raw = RawEvent {
            id: event.id.clone(),
            kind: event.kind.as_tag().to_string(),
            timestamp: Some(event.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            created_at: None,
            facility_id: Some(event.facility_id.clone()),
            description: event.description.clone(),
            ..Default::default()
        };
        if let Some(tx) = &event.tx_ref {
            raw.set_reference(tx);
        }
        raw
    }
}
