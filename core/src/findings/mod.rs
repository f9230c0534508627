//! Findings API: providers, notes, occurrences and graph queries.

mod options;
mod types;

pub use options::*;
pub use types::*;

use std::collections::HashSet;

use crate::auth::Authenticator;
use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use crate::http::HttpMethod;
use crate::request::{require, Endpoint, RequestSpec};
use crate::response::DetailedResponse;
use crate::service::BaseService;
use crate::transport::{Transport, UreqTransport};

pub const SERVICE_NAME: &str = "FINDINGS_API";
pub const DEFAULT_SERVICE_URL: &str = "https://us-south.secadvisor.cloud.ibm.com/findings";

const TRANSACTION_ID: &str = "Transaction-Id";
const REPLACE_IF_EXISTS: &str = "Replace-If-Exists";

const POST_GRAPH: Endpoint = Endpoint::new("post_graph", HttpMethod::Post, "/v1/{account_id}/graph");
const LIST_PROVIDERS: Endpoint = Endpoint::new("list_providers", HttpMethod::Get, "/v1/{account_id}/providers");
const CREATE_NOTE: Endpoint = Endpoint::new(
    "create_note",
    HttpMethod::Post,
    "/v1/{account_id}/providers/{provider_id}/notes",
);
const LIST_NOTES: Endpoint = Endpoint::new(
    "list_notes",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/notes",
);
const GET_NOTE: Endpoint = Endpoint::new(
    "get_note",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/notes/{note_id}",
);
const UPDATE_NOTE: Endpoint = Endpoint::new(
    "update_note",
    HttpMethod::Put,
    "/v1/{account_id}/providers/{provider_id}/notes/{note_id}",
);
const DELETE_NOTE: Endpoint = Endpoint::new(
    "delete_note",
    HttpMethod::Delete,
    "/v1/{account_id}/providers/{provider_id}/notes/{note_id}",
);
const GET_OCCURRENCE_NOTE: Endpoint = Endpoint::new(
    "get_occurrence_note",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}/note",
);
const CREATE_OCCURRENCE: Endpoint = Endpoint::new(
    "create_occurrence",
    HttpMethod::Post,
    "/v1/{account_id}/providers/{provider_id}/occurrences",
);
const LIST_OCCURRENCES: Endpoint = Endpoint::new(
    "list_occurrences",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/occurrences",
);
const LIST_NOTE_OCCURRENCES: Endpoint = Endpoint::new(
    "list_note_occurrences",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/notes/{note_id}/occurrences",
);
const GET_OCCURRENCE: Endpoint = Endpoint::new(
    "get_occurrence",
    HttpMethod::Get,
    "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}",
);
const UPDATE_OCCURRENCE: Endpoint = Endpoint::new(
    "update_occurrence",
    HttpMethod::Put,
    "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}",
);
const DELETE_OCCURRENCE: Endpoint = Endpoint::new(
    "delete_occurrence",
    HttpMethod::Delete,
    "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}",
);

/// Client for the Findings API.
#[derive(Debug, Clone)]
pub struct FindingsClient<A, T = UreqTransport> {
    service: BaseService<A, T>,
}

impl<A: Authenticator> FindingsClient<A, UreqTransport> {
    /// Client backed by the default `ureq` transport.
    pub fn new(config: ServiceConfig, authenticator: A) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, authenticator, transport)
    }

    /// Client configured from `FINDINGS_API_*` environment variables.
    pub fn from_env(authenticator: A) -> Result<Self> {
        let config = ServiceConfig::from_env(SERVICE_NAME, DEFAULT_SERVICE_URL)?;
        Ok(Self::new(config, authenticator))
    }
}

impl<A: Authenticator, T: Transport> FindingsClient<A, T> {
    pub fn with_transport(config: ServiceConfig, authenticator: A, transport: T) -> Self {
        Self {
            service: BaseService::new(config, authenticator, transport),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        self.service.config()
    }

    /// Run a graph query. The body and the response are passed through as text.
    pub async fn post_graph(&self, options: &PostGraphOptions) -> Result<DetailedResponse<String>> {
        require("body", &options.body)?;
        let spec = RequestSpec::new(POST_GRAPH)
            .path("account_id", &options.account_id)
            .text_body(options.content_type.as_str(), &options.body)
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_text(spec).await
    }

    pub async fn list_providers(
        &self,
        options: &ListProvidersOptions,
    ) -> Result<DetailedResponse<ApiListProvidersResponse>> {
        let spec = RequestSpec::new(LIST_PROVIDERS)
            .path("account_id", &options.account_id)
            .query("limit", options.limit)
            .query("skip", options.skip)
            .query("start_provider_id", options.start_provider_id.as_deref())
            .query("end_provider_id", options.end_provider_id.as_deref())
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn create_note(&self, options: &CreateNoteOptions) -> Result<DetailedResponse<ApiNote>> {
        validate_note(&options.note)?;
        let spec = RequestSpec::new(CREATE_NOTE)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .json_body(&options.note)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn list_notes(&self, options: &ListNotesOptions) -> Result<DetailedResponse<ApiListNotesResponse>> {
        let spec = RequestSpec::new(LIST_NOTES)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .query("page_size", options.page_size)
            .query("page_token", options.page_token.as_deref())
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    /// Every note of a provider, following `next_page_token`.
    pub async fn list_all_notes(&self, account_id: &str, provider_id: &str) -> Result<Vec<ApiNote>> {
        let mut options = ListNotesOptions::new(account_id, provider_id);
        let mut notes = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let page = self.list_notes(&options).await?.result;
            notes.extend(page.notes);
            options.page_token = match next_token(page.next_page_token, &mut seen)? {
                Some(token) => Some(token),
                None => return Ok(notes),
            };
        }
    }

    pub async fn get_note(&self, options: &NoteOptions) -> Result<DetailedResponse<ApiNote>> {
        let spec = note_spec(GET_NOTE, options);
        self.service.send_json(spec).await
    }

    pub async fn update_note(&self, options: &UpdateNoteOptions) -> Result<DetailedResponse<ApiNote>> {
        validate_note(&options.note)?;
        let spec = RequestSpec::new(UPDATE_NOTE)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .path("note_id", &options.note_id)
            .json_body(&options.note)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn delete_note(&self, options: &NoteOptions) -> Result<DetailedResponse<()>> {
        let spec = note_spec(DELETE_NOTE, options);
        self.service.send_empty(spec).await
    }

    /// The note an occurrence was reported against.
    pub async fn get_occurrence_note(&self, options: &OccurrenceOptions) -> Result<DetailedResponse<ApiNote>> {
        let spec = occurrence_spec(GET_OCCURRENCE_NOTE, options);
        self.service.send_json(spec).await
    }

    pub async fn create_occurrence(
        &self,
        options: &CreateOccurrenceOptions,
    ) -> Result<DetailedResponse<ApiOccurrence>> {
        validate_occurrence(&options.occurrence)?;
        let spec = RequestSpec::new(CREATE_OCCURRENCE)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .json_body(&options.occurrence)?
            .header(REPLACE_IF_EXISTS, options.replace_if_exists)
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn list_occurrences(
        &self,
        options: &ListOccurrencesOptions,
    ) -> Result<DetailedResponse<ApiListOccurrencesResponse>> {
        let spec = RequestSpec::new(LIST_OCCURRENCES)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .query("page_size", options.page_size)
            .query("page_token", options.page_token.as_deref())
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    /// Every occurrence of a provider, following `next_page_token`.
    pub async fn list_all_occurrences(&self, account_id: &str, provider_id: &str) -> Result<Vec<ApiOccurrence>> {
        let mut options = ListOccurrencesOptions::new(account_id, provider_id);
        let mut occurrences = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let page = self.list_occurrences(&options).await?.result;
            occurrences.extend(page.occurrences);
            options.page_token = match next_token(page.next_page_token, &mut seen)? {
                Some(token) => Some(token),
                None => return Ok(occurrences),
            };
        }
    }

    pub async fn list_note_occurrences(
        &self,
        options: &ListNoteOccurrencesOptions,
    ) -> Result<DetailedResponse<ApiListNoteOccurrencesResponse>> {
        let spec = RequestSpec::new(LIST_NOTE_OCCURRENCES)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .path("note_id", &options.note_id)
            .query("page_size", options.page_size)
            .query("page_token", options.page_token.as_deref())
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn get_occurrence(&self, options: &OccurrenceOptions) -> Result<DetailedResponse<ApiOccurrence>> {
        let spec = occurrence_spec(GET_OCCURRENCE, options);
        self.service.send_json(spec).await
    }

    pub async fn update_occurrence(
        &self,
        options: &UpdateOccurrenceOptions,
    ) -> Result<DetailedResponse<ApiOccurrence>> {
        validate_occurrence(&options.occurrence)?;
        let spec = RequestSpec::new(UPDATE_OCCURRENCE)
            .path("account_id", &options.account_id)
            .path("provider_id", &options.provider_id)
            .path("occurrence_id", &options.occurrence_id)
            .json_body(&options.occurrence)?
            .header(TRANSACTION_ID, options.transaction_id.as_deref());
        self.service.send_json(spec).await
    }

    pub async fn delete_occurrence(&self, options: &OccurrenceOptions) -> Result<DetailedResponse<()>> {
        let spec = occurrence_spec(DELETE_OCCURRENCE, options);
        self.service.send_empty(spec).await
    }
}

fn note_spec(endpoint: Endpoint, options: &NoteOptions) -> RequestSpec {
    RequestSpec::new(endpoint)
        .path("account_id", &options.account_id)
        .path("provider_id", &options.provider_id)
        .path("note_id", &options.note_id)
        .header(TRANSACTION_ID, options.transaction_id.as_deref())
}

fn occurrence_spec(endpoint: Endpoint, options: &OccurrenceOptions) -> RequestSpec {
    RequestSpec::new(endpoint)
        .path("account_id", &options.account_id)
        .path("provider_id", &options.provider_id)
        .path("occurrence_id", &options.occurrence_id)
        .header(TRANSACTION_ID, options.transaction_id.as_deref())
}

fn validate_note(note: &ApiNote) -> Result<()> {
    require("id", &note.id)?;
    require("short_description", &note.short_description)?;
    require("long_description", &note.long_description)?;
    require("reported_by.id", &note.reported_by.id)?;
    require("reported_by.title", &note.reported_by.title)
}

fn validate_occurrence(occurrence: &ApiOccurrence) -> Result<()> {
    require("id", &occurrence.id)?;
    require("note_name", &occurrence.note_name)
}

/// Token for the next page, `None` when the listing is exhausted.
///
/// A token handed out twice means the listing cycles.
fn next_token(next: Option<String>, seen: &mut HashSet<String>) -> Result<Option<String>> {
    let Some(token) = next.filter(|token| !token.is_empty()) else {
        return Ok(None);
    };
    if !seen.insert(token.clone()) {
        return Err(ApiError::MalformedResponse(format!("page token `{token}` was already returned")));
    }
    Ok(Some(token))
}
