//! Findings API payloads.
//!
//! # Design
//! Notes and occurrences carry a `kind` discriminant that selects exactly one
//! payload field (`finding`, `kpi` or `card`). That rule is encoded as a sum
//! type flattened into the parent object, so the wire shape stays
//! `{"kind":"CARD","card":{...}}` while a mismatched combination cannot be
//! constructed. Optional fields are skipped when absent, never sent as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Certainty {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationType {
    Sum,
}

/// Who reported a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNoteRelatedUrl {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemediationStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Finding template carried by a `FINDING` note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingType {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<RemediationStep>,
}

/// KPI template carried by a `KPI` note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiType {
    pub aggregation_type: AggregationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Source of a card element's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Kpi {
        kpi_note_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    FindingCount {
        finding_note_names: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardElement {
    Numeric {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_time_range: Option<String>,
        value_type: ValueType,
    },
    Breakdown {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_time_range: Option<String>,
        value_types: Vec<ValueType>,
    },
    TimeSeries {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_interval: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_time_range: Option<String>,
        value_types: Vec<ValueType>,
    },
}

/// Dashboard card carried by a `CARD` note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub section: String,
    pub title: String,
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub finding_note_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_configuration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_image: Option<String>,
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteKind {
    Finding,
    Kpi,
    Card,
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoteKind::Finding => "FINDING",
            NoteKind::Kpi => "KPI",
            NoteKind::Card => "CARD",
        })
    }
}

/// Kind-specific part of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotePayload {
    Finding { finding: FindingType },
    Kpi { kpi: KpiType },
    Card { card: Card },
}

impl NotePayload {
    pub fn kind(&self) -> NoteKind {
        match self {
            NotePayload::Finding { .. } => NoteKind::Finding,
            NotePayload::Kpi { .. } => NoteKind::Kpi,
            NotePayload::Card { .. } => NoteKind::Card,
        }
    }

    /// Assemble a payload from loosely-typed parts.
    ///
    /// Exactly the field matching `kind` must be present.
    pub fn from_parts(
        kind: NoteKind,
        finding: Option<FindingType>,
        kpi: Option<KpiType>,
        card: Option<Card>,
    ) -> Result<Self> {
        let supplied: Vec<&str> = [
            finding.as_ref().map(|_| "finding"),
            kpi.as_ref().map(|_| "kpi"),
            card.as_ref().map(|_| "card"),
        ]
        .into_iter()
        .flatten()
        .collect();
        if supplied.len() > 1 {
            return Err(ApiError::InvalidParameter {
                name: "kind",
                reason: format!("{kind} note accepts a single payload, got {}", supplied.join(" and ")),
            });
        }
        match (kind, finding, kpi, card) {
            (NoteKind::Finding, Some(finding), None, None) => Ok(NotePayload::Finding { finding }),
            (NoteKind::Kpi, None, Some(kpi), None) => Ok(NotePayload::Kpi { kpi }),
            (NoteKind::Card, None, None, Some(card)) => Ok(NotePayload::Card { card }),
            (NoteKind::Finding, None, None, None) => Err(ApiError::MissingParameter("finding")),
            (NoteKind::Kpi, None, None, None) => Err(ApiError::MissingParameter("kpi")),
            (NoteKind::Card, None, None, None) => Err(ApiError::MissingParameter("card")),
            (kind, ..) => Err(ApiError::InvalidParameter {
                name: "kind",
                reason: format!("{kind} note got a {} payload", supplied.join("")),
            }),
        }
    }
}

/// A note: the template a finding, KPI or card is reported against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNote {
    /// `{account_id}/providers/{provider_id}/notes/{id}`, set by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub id: String,
    pub short_description: String,
    pub long_description: String,
    #[serde(flatten)]
    pub payload: NotePayload,
    pub reported_by: Reporter,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_url: Vec<ApiNoteRelatedUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

impl ApiNote {
    pub fn new(
        id: &str,
        short_description: &str,
        long_description: &str,
        reported_by: Reporter,
        payload: NotePayload,
    ) -> Self {
        Self {
            name: None,
            id: id.to_string(),
            short_description: short_description.to_string(),
            long_description: long_description.to_string(),
            payload,
            reported_by,
            related_url: Vec::new(),
            expiration_time: None,
            create_time: None,
            update_time: None,
            shared: None,
        }
    }

    pub fn kind(&self) -> NoteKind {
        self.payload.kind()
    }
}

/// Composite name an occurrence uses to reference its note.
pub fn note_name(account_id: &str, provider_id: &str, note_id: &str) -> String {
    format!("{account_id}/providers/{provider_id}/notes/{note_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_crn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_crn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<SocketAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<SocketAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataTransferred {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_packets: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_packets: Option<u64>,
}

/// Concrete finding reported by a `FINDING` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<Certainty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<RemediationStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_connection: Option<NetworkConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_transferred: Option<DataTransferred>,
}

/// Measured value reported by a `KPI` occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Kind-specific part of an occurrence. Occurrences exist for finding and KPI
/// notes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrencePayload {
    Finding { finding: Finding },
    Kpi { kpi: Kpi },
}

impl OccurrencePayload {
    pub fn kind(&self) -> NoteKind {
        match self {
            OccurrencePayload::Finding { .. } => NoteKind::Finding,
            OccurrencePayload::Kpi { .. } => NoteKind::Kpi,
        }
    }
}

/// An instance of a note observed on a concrete resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOccurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub id: String,
    pub note_name: String,
    #[serde(flatten)]
    pub payload: OccurrencePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_data: Option<serde_json::Value>,
}

impl ApiOccurrence {
    pub fn new(id: &str, note_name: &str, payload: OccurrencePayload) -> Self {
        Self {
            name: None,
            id: id.to_string(),
            note_name: note_name.to_string(),
            payload,
            resource_url: None,
            remediation: None,
            create_time: None,
            update_time: None,
            context: None,
            reference_data: None,
        }
    }

    pub fn kind(&self) -> NoteKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProvider {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiListProvidersResponse {
    #[serde(default)]
    pub providers: Vec<ApiProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiListNotesResponse {
    #[serde(default)]
    pub notes: Vec<ApiNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiListOccurrencesResponse {
    #[serde(default)]
    pub occurrences: Vec<ApiOccurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiListNoteOccurrencesResponse {
    #[serde(default)]
    pub occurrences: Vec<ApiOccurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
