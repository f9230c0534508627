use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----\nMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEmockmockmockmockmockmockmockmock\n-----END PUBLIC KEY-----\n";

const NOTE_KINDS: [&str; 3] = ["FINDING", "KPI", "CARD"];
const OCCURRENCE_KINDS: [&str; 2] = ["FINDING", "KPI"];
const SEVERITIES: [&str; 4] = ["critical", "high", "medium", "low"];

/// `(account_id, provider_id, id)`
type ResourceKey = (String, String, String);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityFlags {
    pub critical: bool,
    pub high: bool,
    pub medium: bool,
    pub low: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSource {
    pub provider_name: String,
    #[serde(default)]
    pub finding_types: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub severity: SeverityFlags,
    pub endpoint: String,
    pub enabled: bool,
    pub alert_source: Vec<AlertSource>,
}

#[derive(Deserialize)]
pub struct ChannelInput {
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub endpoint: String,
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Vec<String>,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub alert_source: Vec<AlertSource>,
}

#[derive(Default)]
pub struct Store {
    notes: BTreeMap<ResourceKey, Value>,
    occurrences: BTreeMap<ResourceKey, Value>,
    channels: BTreeMap<(String, String), Channel>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error response with a `{"message": ...}` body.
#[derive(Debug)]
pub struct ApiFailure(StatusCode, String);

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self(status, message.into())
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/{account_id}/graph", post(post_graph))
        .route("/v1/{account_id}/providers", get(list_providers))
        .route(
            "/v1/{account_id}/providers/{provider_id}/notes",
            get(list_notes).post(create_note),
        )
        .route(
            "/v1/{account_id}/providers/{provider_id}/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route(
            "/v1/{account_id}/providers/{provider_id}/notes/{note_id}/occurrences",
            get(list_note_occurrences),
        )
        .route(
            "/v1/{account_id}/providers/{provider_id}/occurrences",
            get(list_occurrences).post(create_occurrence),
        )
        .route(
            "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}",
            get(get_occurrence).put(update_occurrence).delete(delete_occurrence),
        )
        .route(
            "/v1/{account_id}/providers/{provider_id}/occurrences/{occurrence_id}/note",
            get(get_occurrence_note),
        )
        .route(
            "/v1/{account_id}/notifications/channels",
            get(list_channels).post(create_channel).delete(delete_channels),
        )
        .route(
            "/v1/{account_id}/notifications/channels/{channel_id}",
            get(get_channel).put(update_channel).delete(delete_channel),
        )
        .route(
            "/v1/{account_id}/notifications/channels/{channel_id}/test",
            get(test_channel),
        )
        .route("/v1/{account_id}/notifications/public_key", get(get_public_key))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(req: Request, next: Next) -> Response {
    debug!(method = %req.method(), path = %req.uri().path(), "request");
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if !authorized {
        return ApiFailure::new(StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    }
    next.run(req).await
}

// --- graph ---

async fn post_graph(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiFailure> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !matches!(content_type, "application/graphql" | "application/json") {
        return Err(ApiFailure::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("unsupported content type `{content_type}`"),
        ));
    }
    if body.trim().is_empty() {
        return Err(ApiFailure::bad_request("empty query"));
    }
    let store = db.read().await;
    let data = if body.contains("notes") {
        let ids: Vec<Value> = store
            .notes
            .iter()
            .filter(|((account, _, _), _)| *account == account_id)
            .map(|((_, _, id), _)| json!({ "id": id }))
            .collect();
        json!({ "notes": ids })
    } else {
        json!({})
    };
    Ok(Json(json!({ "data": data })))
}

// --- providers ---

#[derive(Deserialize)]
pub struct ProviderQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub start_provider_id: Option<String>,
    pub end_provider_id: Option<String>,
}

async fn list_providers(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Query(query): Query<ProviderQuery>,
) -> Json<Value> {
    let store = db.read().await;
    let start = query.start_provider_id.as_deref();
    let end = query.end_provider_id.as_deref();
    let mut ids: Vec<&str> = store
        .notes
        .keys()
        .chain(store.occurrences.keys())
        .filter(|(account, _, _)| *account == account_id)
        .map(|(_, provider, _)| provider.as_str())
        .filter(|provider| start.map_or(true, |start| *provider >= start))
        .filter(|provider| end.map_or(true, |end| *provider <= end))
        .collect();
    ids.sort();
    ids.dedup();

    let total = ids.len();
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(200);
    let providers: Vec<Value> = ids
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|id| json!({ "name": format!("{account_id}/providers/{id}"), "id": id }))
        .collect();
    Json(json!({ "providers": providers, "limit": limit, "skip": skip, "total_count": total }))
}

// --- notes ---

#[derive(Deserialize)]
pub struct PageQuery {
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
}

fn paginate(items: Vec<Value>, query: &PageQuery) -> Result<(Vec<Value>, Option<String>), ApiFailure> {
    let start = match query.page_token.as_deref() {
        None | Some("") => 0,
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| ApiFailure::bad_request(format!("invalid page_token `{token}`")))?,
    };
    let size = query.page_size.unwrap_or(200).max(1);
    let end = start.saturating_add(size).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    let page = items.into_iter().skip(start).take(size).collect();
    Ok((page, next))
}

fn required_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, ApiFailure> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiFailure::bad_request(format!("`{field}` is required")))
}

/// The `kind` field must name exactly the one payload object present.
fn validate_kind(value: &Value, allowed: &[&str]) -> Result<String, ApiFailure> {
    let kind = required_str(value, "kind")?;
    if !allowed.contains(&kind) {
        return Err(ApiFailure::bad_request(format!("unsupported kind `{kind}`")));
    }
    let present: Vec<&str> = ["finding", "kpi", "card"]
        .into_iter()
        .filter(|field| value.get(*field).is_some_and(|v| !v.is_null()))
        .collect();
    let expected = kind.to_ascii_lowercase();
    if present != [expected.as_str()] {
        return Err(ApiFailure::bad_request(format!(
            "kind `{kind}` requires exactly one `{expected}` payload, got {present:?}"
        )));
    }
    Ok(kind.to_string())
}

fn validate_note(note: &Value) -> Result<(), ApiFailure> {
    required_str(note, "short_description")?;
    required_str(note, "long_description")?;
    let reporter = note
        .get("reported_by")
        .ok_or_else(|| ApiFailure::bad_request("`reported_by` is required"))?;
    required_str(reporter, "id")?;
    required_str(reporter, "title")?;
    validate_kind(note, &NOTE_KINDS)?;
    Ok(())
}

fn note_name(account_id: &str, provider_id: &str, note_id: &str) -> String {
    format!("{account_id}/providers/{provider_id}/notes/{note_id}")
}

async fn list_notes(
    State(db): State<Db>,
    Path((account_id, provider_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let notes: Vec<Value> = store
        .notes
        .iter()
        .filter(|((account, provider, _), _)| *account == account_id && *provider == provider_id)
        .map(|(_, note)| note.clone())
        .collect();
    let (page, next) = paginate(notes, &query)?;
    let mut body = json!({ "notes": page });
    if let Some(token) = next {
        body["next_page_token"] = json!(token);
    }
    Ok(Json(body))
}

async fn create_note(
    State(db): State<Db>,
    Path((account_id, provider_id)): Path<(String, String)>,
    Json(mut note): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let id = required_str(&note, "id")?.to_string();
    validate_note(&note)?;
    let key = (account_id.clone(), provider_id.clone(), id.clone());
    let mut store = db.write().await;
    if store.notes.contains_key(&key) {
        return Err(ApiFailure::new(StatusCode::CONFLICT, format!("note `{id}` already exists")));
    }
    note["name"] = json!(note_name(&account_id, &provider_id, &id));
    store.notes.insert(key, note.clone());
    Ok(Json(note))
}

async fn get_note(
    State(db): State<Db>,
    Path((account_id, provider_id, note_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    store
        .notes
        .get(&(account_id, provider_id, note_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("note"))
}

async fn update_note(
    State(db): State<Db>,
    Path((account_id, provider_id, note_id)): Path<(String, String, String)>,
    Json(mut note): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let key = (account_id.clone(), provider_id.clone(), note_id.clone());
    let mut store = db.write().await;
    let existing = store.notes.get_mut(&key).ok_or_else(|| ApiFailure::not_found("note"))?;
    validate_note(&note)?;
    note["id"] = json!(note_id);
    note["name"] = json!(note_name(&account_id, &provider_id, &note_id));
    *existing = note.clone();
    Ok(Json(note))
}

async fn delete_note(
    State(db): State<Db>,
    Path((account_id, provider_id, note_id)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    store
        .notes
        .remove(&(account_id, provider_id, note_id))
        .map(|_| StatusCode::OK)
        .ok_or_else(|| ApiFailure::not_found("note"))
}

// --- occurrences ---

/// Resolve `{account}/providers/{provider}/notes/{note}` to a store key.
fn parse_note_name(name: &str) -> Option<ResourceKey> {
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        [account, "providers", provider, "notes", note]
            if !account.is_empty() && !provider.is_empty() && !note.is_empty() =>
        {
            Some((account.to_string(), provider.to_string(), note.to_string()))
        }
        _ => None,
    }
}

fn validate_occurrence(store: &Store, occurrence: &Value) -> Result<(), ApiFailure> {
    let kind = validate_kind(occurrence, &OCCURRENCE_KINDS)?;
    let name = required_str(occurrence, "note_name")?;
    let key = parse_note_name(name)
        .ok_or_else(|| ApiFailure::bad_request(format!("malformed note_name `{name}`")))?;
    let note = store.notes.get(&key).ok_or_else(|| ApiFailure::not_found("note"))?;
    let note_kind = note.get("kind").and_then(Value::as_str).unwrap_or_default();
    if note_kind != kind {
        return Err(ApiFailure::bad_request(format!(
            "occurrence kind `{kind}` does not match note kind `{note_kind}`"
        )));
    }
    Ok(())
}

fn occurrence_name(account_id: &str, provider_id: &str, occurrence_id: &str) -> String {
    format!("{account_id}/providers/{provider_id}/occurrences/{occurrence_id}")
}

async fn list_occurrences(
    State(db): State<Db>,
    Path((account_id, provider_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let occurrences: Vec<Value> = store
        .occurrences
        .iter()
        .filter(|((account, provider, _), _)| *account == account_id && *provider == provider_id)
        .map(|(_, occurrence)| occurrence.clone())
        .collect();
    let (page, next) = paginate(occurrences, &query)?;
    let mut body = json!({ "occurrences": page });
    if let Some(token) = next {
        body["next_page_token"] = json!(token);
    }
    Ok(Json(body))
}

async fn list_note_occurrences(
    State(db): State<Db>,
    Path((account_id, provider_id, note_id)): Path<(String, String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let key = (account_id.clone(), provider_id.clone(), note_id.clone());
    if !store.notes.contains_key(&key) {
        return Err(ApiFailure::not_found("note"));
    }
    let name = note_name(&account_id, &provider_id, &note_id);
    let occurrences: Vec<Value> = store
        .occurrences
        .values()
        .filter(|occurrence| occurrence.get("note_name").and_then(Value::as_str) == Some(name.as_str()))
        .cloned()
        .collect();
    let (page, next) = paginate(occurrences, &query)?;
    let mut body = json!({ "occurrences": page });
    if let Some(token) = next {
        body["next_page_token"] = json!(token);
    }
    Ok(Json(body))
}

async fn create_occurrence(
    State(db): State<Db>,
    Path((account_id, provider_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut occurrence): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let id = required_str(&occurrence, "id")?.to_string();
    let replace = headers
        .get("replace-if-exists")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let key = (account_id.clone(), provider_id.clone(), id.clone());
    let mut store = db.write().await;
    validate_occurrence(&store, &occurrence)?;
    if store.occurrences.contains_key(&key) && !replace {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            format!("occurrence `{id}` already exists"),
        ));
    }
    occurrence["name"] = json!(occurrence_name(&account_id, &provider_id, &id));
    store.occurrences.insert(key, occurrence.clone());
    Ok(Json(occurrence))
}

async fn get_occurrence(
    State(db): State<Db>,
    Path((account_id, provider_id, occurrence_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    store
        .occurrences
        .get(&(account_id, provider_id, occurrence_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("occurrence"))
}

async fn get_occurrence_note(
    State(db): State<Db>,
    Path((account_id, provider_id, occurrence_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let occurrence = store
        .occurrences
        .get(&(account_id, provider_id, occurrence_id))
        .ok_or_else(|| ApiFailure::not_found("occurrence"))?;
    occurrence
        .get("note_name")
        .and_then(Value::as_str)
        .and_then(parse_note_name)
        .and_then(|key| store.notes.get(&key))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("note"))
}

async fn update_occurrence(
    State(db): State<Db>,
    Path((account_id, provider_id, occurrence_id)): Path<(String, String, String)>,
    Json(mut occurrence): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let key = (account_id.clone(), provider_id.clone(), occurrence_id.clone());
    let mut store = db.write().await;
    if !store.occurrences.contains_key(&key) {
        return Err(ApiFailure::not_found("occurrence"));
    }
    validate_occurrence(&store, &occurrence)?;
    occurrence["id"] = json!(occurrence_id);
    occurrence["name"] = json!(occurrence_name(&account_id, &provider_id, &occurrence_id));
    store.occurrences.insert(key, occurrence.clone());
    Ok(Json(occurrence))
}

async fn delete_occurrence(
    State(db): State<Db>,
    Path((account_id, provider_id, occurrence_id)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    store
        .occurrences
        .remove(&(account_id, provider_id, occurrence_id))
        .map(|_| StatusCode::OK)
        .ok_or_else(|| ApiFailure::not_found("occurrence"))
}

// --- channels ---

fn channel_from_input(channel_id: String, input: ChannelInput) -> Result<Channel, ApiFailure> {
    if input.name.trim().is_empty() {
        return Err(ApiFailure::bad_request("`name` is required"));
    }
    if input.channel_type != "Webhook" {
        return Err(ApiFailure::bad_request(format!(
            "unsupported channel type `{}`",
            input.channel_type
        )));
    }
    if !(input.endpoint.starts_with("https://") || input.endpoint.starts_with("http://")) {
        return Err(ApiFailure::bad_request("`endpoint` must be an http(s) URL"));
    }
    let mut severity = SeverityFlags::default();
    for level in &input.severity {
        match level.to_ascii_lowercase().as_str() {
            "critical" => severity.critical = true,
            "high" => severity.high = true,
            "medium" => severity.medium = true,
            "low" => severity.low = true,
            other => {
                return Err(ApiFailure::bad_request(format!(
                    "severity must be one of {SEVERITIES:?}, got `{other}`"
                )))
            }
        }
    }
    Ok(Channel {
        channel_id,
        name: input.name,
        description: input.description,
        channel_type: input.channel_type,
        severity,
        endpoint: input.endpoint,
        enabled: input.enabled.unwrap_or(true),
        alert_source: input.alert_source,
    })
}

#[derive(Deserialize)]
pub struct ChannelQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

async fn list_channels(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> Json<Value> {
    let store = db.read().await;
    let channels: Vec<&Channel> = store
        .channels
        .iter()
        .filter(|((account, _), _)| *account == account_id)
        .map(|(_, channel)| channel)
        .skip(query.skip.unwrap_or(0))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    Json(json!({ "channels": channels }))
}

async fn create_channel(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Json(input): Json<ChannelInput>,
) -> Result<Json<Value>, ApiFailure> {
    let channel = channel_from_input(Uuid::new_v4().to_string(), input)?;
    let channel_id = channel.channel_id.clone();
    db.write()
        .await
        .channels
        .insert((account_id, channel_id.clone()), channel);
    Ok(Json(json!({ "channel_id": channel_id, "status_code": 200 })))
}

/// Unknown ids fail the whole batch with a 500, as the live service does.
async fn delete_channels(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<Value>, ApiFailure> {
    if ids.is_empty() {
        return Err(ApiFailure::bad_request("no channel ids given"));
    }
    let mut store = db.write().await;
    if let Some(missing) = ids
        .iter()
        .find(|id| !store.channels.contains_key(&(account_id.clone(), (*id).clone())))
    {
        return Err(ApiFailure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to delete channel `{missing}`"),
        ));
    }
    for id in ids {
        store.channels.remove(&(account_id.clone(), id));
    }
    Ok(Json(json!({ "message": "Channels deleted" })))
}

async fn get_channel(
    State(db): State<Db>,
    Path((account_id, channel_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    store
        .channels
        .get(&(account_id, channel_id))
        .map(|channel| Json(json!({ "channel": channel })))
        .ok_or_else(|| ApiFailure::not_found("channel"))
}

async fn update_channel(
    State(db): State<Db>,
    Path((account_id, channel_id)): Path<(String, String)>,
    Json(input): Json<ChannelInput>,
) -> Result<Json<Value>, ApiFailure> {
    let mut store = db.write().await;
    let existing = store
        .channels
        .get_mut(&(account_id, channel_id.clone()))
        .ok_or_else(|| ApiFailure::not_found("channel"))?;
    *existing = channel_from_input(channel_id.clone(), input)?;
    Ok(Json(json!({ "channel_id": channel_id, "status_code": 200 })))
}

async fn delete_channel(
    State(db): State<Db>,
    Path((account_id, channel_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let mut store = db.write().await;
    store
        .channels
        .remove(&(account_id, channel_id.clone()))
        .map(|_| Json(json!({ "channel_id": channel_id, "message": "Channel deleted" })))
        .ok_or_else(|| ApiFailure::not_found("channel"))
}

async fn test_channel(
    State(db): State<Db>,
    Path((account_id, channel_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    store
        .channels
        .get(&(account_id, channel_id))
        .map(|_| Json(json!({ "test": "success" })))
        .ok_or_else(|| ApiFailure::not_found("channel"))
}

async fn get_public_key(Path(_account_id): Path<String>) -> Json<Value> {
    Json(json!({ "public_key": PUBLIC_KEY }))
}
