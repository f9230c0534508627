//! Per-operation parameters for [`FindingsClient`](super::FindingsClient).
//!
//! Required parameters are plain fields set through `new`; optional ones are
//! `Option`s left as `None` unless the caller fills them in.

use super::types::{ApiNote, ApiOccurrence};

/// Content type of a graph query body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphContentType {
    Graphql,
    Json,
}

impl GraphContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphContentType::Graphql => "application/graphql",
            GraphContentType::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostGraphOptions {
    pub account_id: String,
    /// Sent verbatim.
    pub body: String,
    pub content_type: GraphContentType,
    pub transaction_id: Option<String>,
}

impl PostGraphOptions {
    pub fn new(account_id: &str, body: &str, content_type: GraphContentType) -> Self {
        Self {
            account_id: account_id.to_string(),
            body: body.to_string(),
            content_type,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListProvidersOptions {
    pub account_id: String,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub start_provider_id: Option<String>,
    pub end_provider_id: Option<String>,
    pub transaction_id: Option<String>,
}

impl ListProvidersOptions {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateNoteOptions {
    pub account_id: String,
    pub provider_id: String,
    pub note: ApiNote,
    pub transaction_id: Option<String>,
}

impl CreateNoteOptions {
    pub fn new(account_id: &str, provider_id: &str, note: ApiNote) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            note,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListNotesOptions {
    pub account_id: String,
    pub provider_id: String,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub transaction_id: Option<String>,
}

impl ListNotesOptions {
    pub fn new(account_id: &str, provider_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            ..Default::default()
        }
    }
}

/// Identifies one note; used by `get_note` and `delete_note`.
#[derive(Debug, Clone, Default)]
pub struct NoteOptions {
    pub account_id: String,
    pub provider_id: String,
    pub note_id: String,
    pub transaction_id: Option<String>,
}

impl NoteOptions {
    pub fn new(account_id: &str, provider_id: &str, note_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            note_id: note_id.to_string(),
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateNoteOptions {
    pub account_id: String,
    pub provider_id: String,
    pub note_id: String,
    pub note: ApiNote,
    pub transaction_id: Option<String>,
}

impl UpdateNoteOptions {
    pub fn new(account_id: &str, provider_id: &str, note_id: &str, note: ApiNote) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            note_id: note_id.to_string(),
            note,
            transaction_id: None,
        }
    }
}

/// Identifies one occurrence; used by `get_occurrence`,
/// `get_occurrence_note` and `delete_occurrence`.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceOptions {
    pub account_id: String,
    pub provider_id: String,
    pub occurrence_id: String,
    pub transaction_id: Option<String>,
}

impl OccurrenceOptions {
    pub fn new(account_id: &str, provider_id: &str, occurrence_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            occurrence_id: occurrence_id.to_string(),
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateOccurrenceOptions {
    pub account_id: String,
    pub provider_id: String,
    pub occurrence: ApiOccurrence,
    /// Sent as the `Replace-If-Exists` header.
    pub replace_if_exists: Option<bool>,
    pub transaction_id: Option<String>,
}

impl CreateOccurrenceOptions {
    pub fn new(account_id: &str, provider_id: &str, occurrence: ApiOccurrence) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            occurrence,
            replace_if_exists: None,
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOccurrencesOptions {
    pub account_id: String,
    pub provider_id: String,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub transaction_id: Option<String>,
}

impl ListOccurrencesOptions {
    pub fn new(account_id: &str, provider_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListNoteOccurrencesOptions {
    pub account_id: String,
    pub provider_id: String,
    pub note_id: String,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub transaction_id: Option<String>,
}

impl ListNoteOccurrencesOptions {
    pub fn new(account_id: &str, provider_id: &str, note_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            note_id: note_id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOccurrenceOptions {
    pub account_id: String,
    pub provider_id: String,
    pub occurrence_id: String,
    pub occurrence: ApiOccurrence,
    pub transaction_id: Option<String>,
}

impl UpdateOccurrenceOptions {
    pub fn new(account_id: &str, provider_id: &str, occurrence_id: &str, occurrence: ApiOccurrence) -> Self {
        Self {
            account_id: account_id.to_string(),
            provider_id: provider_id.to_string(),
            occurrence_id: occurrence_id.to_string(),
            occurrence,
            transaction_id: None,
        }
    }
}
