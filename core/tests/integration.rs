//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the clients over
//! real HTTP through the default `ureq` transport. Validates that request
//! building, authentication and response parsing work end-to-end.

use advisor_client::findings::{
    note_name, ApiNote, ApiOccurrence, Card, CardElement, Certainty, CreateNoteOptions, CreateOccurrenceOptions,
    AggregationType, Finding, FindingType, GraphContentType, Kpi, KpiType, ListNoteOccurrencesOptions,
    ListProvidersOptions, NoteKind, NoteOptions, NotePayload, OccurrenceOptions, OccurrencePayload, PostGraphOptions,
    RemediationStep, Reporter, Severity, UpdateNoteOptions, UpdateOccurrenceOptions, ValueType,
};
use advisor_client::notifications::{
    AlertSource, ChannelOptions, ChannelSeverity, CreateNotificationChannelOptions, DeleteNotificationChannelsOptions,
    GetPublicKeyOptions, ListAllChannelsOptions, NotificationChannel, UpdateNotificationChannelOptions,
};
use advisor_client::{
    ApiError, BearerTokenAuthenticator, ErrorBody, FindingsClient, NoAuthAuthenticator, NotificationsClient,
    ServiceConfig,
};

const ACCOUNT: &str = "acc";
const PROVIDER: &str = "test";

/// Serve the mock API on a random local port and return its base URL.
async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn findings_client(url: &str) -> FindingsClient<BearerTokenAuthenticator> {
    FindingsClient::new(ServiceConfig::new(url), BearerTokenAuthenticator::new("test-token").unwrap())
}

fn notifications_client(url: &str) -> NotificationsClient<BearerTokenAuthenticator> {
    NotificationsClient::new(ServiceConfig::new(url), BearerTokenAuthenticator::new("test-token").unwrap())
}

fn reporter() -> Reporter {
    Reporter {
        id: "test_reporter".to_string(),
        title: "reporter".to_string(),
        url: Some("https://cloud.ibm.com".to_string()),
    }
}

fn finding_note(id: &str) -> ApiNote {
    ApiNote::new(
        id,
        "Notes short description",
        "Notes long description",
        reporter(),
        NotePayload::Finding {
            finding: FindingType {
                severity: Severity::High,
                next_steps: vec![RemediationStep {
                    title: Some("Fix this.".to_string()),
                    url: None,
                }],
            },
        },
    )
}

fn finding_occurrence(id: &str, note: &str) -> ApiOccurrence {
    ApiOccurrence::new(
        id,
        &note_name(ACCOUNT, PROVIDER, note),
        OccurrencePayload::Finding {
            finding: Finding {
                severity: Some(Severity::Low),
                certainty: Some(Certainty::Low),
                ..Default::default()
            },
        },
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn findings_lifecycle() {
    let url = start_server().await;
    let client = findings_client(&url);

    // Step 1: nothing reported yet.
    let providers = client.list_providers(&ListProvidersOptions::new(ACCOUNT)).await.unwrap();
    assert_eq!(providers.status, 200);
    assert!(providers.result.providers.is_empty());

    // Step 2: create one note of each kind.
    let created = client
        .create_note(&CreateNoteOptions::new(ACCOUNT, PROVIDER, finding_note("test_finding")))
        .await
        .unwrap();
    assert_eq!(created.status, 200);
    assert_eq!(created.result.name.as_deref(), Some("acc/providers/test/notes/test_finding"));

    let kpi = ApiNote::new(
        "test_kpi",
        "kpi short description",
        "kpi long description",
        reporter(),
        NotePayload::Kpi {
            kpi: KpiType {
                aggregation_type: AggregationType::Sum,
                severity: None,
            },
        },
    );
    client
        .create_note(&CreateNoteOptions::new(ACCOUNT, PROVIDER, kpi))
        .await
        .unwrap();

    let card = ApiNote::new(
        "test_card",
        "short description",
        "long description",
        reporter(),
        NotePayload::Card {
            card: Card {
                section: "test_section".to_string(),
                title: "test_card_title".to_string(),
                subtitle: "test_card_subtitle".to_string(),
                order: Some(1),
                finding_note_names: vec![note_name(ACCOUNT, PROVIDER, "test_finding")],
                requires_configuration: None,
                badge_text: None,
                badge_image: None,
                elements: vec![CardElement::Numeric {
                    text: "test_text".to_string(),
                    default_time_range: Some("1d".to_string()),
                    value_type: ValueType::Kpi {
                        kpi_note_name: note_name(ACCOUNT, PROVIDER, "test_kpi"),
                        text: None,
                    },
                }],
            },
        },
    );
    let created = client
        .create_note(&CreateNoteOptions::new(ACCOUNT, PROVIDER, card))
        .await
        .unwrap();
    assert_eq!(created.result.kind(), NoteKind::Card);

    // Step 3: a duplicate note is rejected.
    let err = client
        .create_note(&CreateNoteOptions::new(ACCOUNT, PROVIDER, finding_note("test_finding")))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));

    // Step 4: reads.
    let notes = client.list_all_notes(ACCOUNT, PROVIDER).await.unwrap();
    assert_eq!(notes.len(), 3);

    let providers = client.list_providers(&ListProvidersOptions::new(ACCOUNT)).await.unwrap();
    assert_eq!(providers.result.providers[0].id, PROVIDER);

    let graph = client
        .post_graph(&PostGraphOptions::new(ACCOUNT, "{notes{id}}", GraphContentType::Graphql))
        .await
        .unwrap();
    assert!(graph.result.contains("test_card"));

    // Step 5: update.
    let mut note = finding_note("test_finding");
    note.short_description = "updated".to_string();
    let updated = client
        .update_note(&UpdateNoteOptions::new(ACCOUNT, PROVIDER, "test_finding", note))
        .await
        .unwrap();
    assert_eq!(updated.result.short_description, "updated");

    // Step 6: occurrences.
    let occurrence = client
        .create_occurrence(&CreateOccurrenceOptions::new(
            ACCOUNT,
            PROVIDER,
            finding_occurrence("test_occurrence", "test_finding"),
        ))
        .await
        .unwrap();
    assert_eq!(
        occurrence.result.name.as_deref(),
        Some("acc/providers/test/occurrences/test_occurrence")
    );

    let err = client
        .create_occurrence(&CreateOccurrenceOptions::new(
            ACCOUNT,
            PROVIDER,
            finding_occurrence("test_occurrence", "test_finding"),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));

    let mut replace =
        CreateOccurrenceOptions::new(ACCOUNT, PROVIDER, finding_occurrence("test_occurrence", "test_finding"));
    replace.replace_if_exists = Some(true);
    client.create_occurrence(&replace).await.unwrap();

    let kpi_occurrence = ApiOccurrence::new(
        "test_kpi_occurrence",
        &note_name(ACCOUNT, PROVIDER, "test_kpi"),
        OccurrencePayload::Kpi {
            kpi: Kpi {
                value: 4.0,
                total: Some(10.0),
            },
        },
    );
    client
        .create_occurrence(&CreateOccurrenceOptions::new(ACCOUNT, PROVIDER, kpi_occurrence.clone()))
        .await
        .unwrap();

    let note = client
        .get_occurrence_note(&OccurrenceOptions::new(ACCOUNT, PROVIDER, "test_occurrence"))
        .await
        .unwrap();
    assert_eq!(note.result.id, "test_finding");

    let listed = client
        .list_note_occurrences(&ListNoteOccurrencesOptions::new(ACCOUNT, PROVIDER, "test_kpi"))
        .await
        .unwrap();
    assert_eq!(listed.result.occurrences.len(), 1);

    let all = client.list_all_occurrences(ACCOUNT, PROVIDER).await.unwrap();
    assert_eq!(all.len(), 2);

    let mut changed = kpi_occurrence;
    changed.payload = OccurrencePayload::Kpi {
        kpi: Kpi {
            value: 7.0,
            total: Some(10.0),
        },
    };
    client
        .update_occurrence(&UpdateOccurrenceOptions::new(
            ACCOUNT,
            PROVIDER,
            "test_kpi_occurrence",
            changed,
        ))
        .await
        .unwrap();
    let fetched = client
        .get_occurrence(&OccurrenceOptions::new(ACCOUNT, PROVIDER, "test_kpi_occurrence"))
        .await
        .unwrap();
    assert_eq!(
        fetched.result.payload,
        OccurrencePayload::Kpi {
            kpi: Kpi {
                value: 7.0,
                total: Some(10.0),
            }
        }
    );

    // Step 7: deletes.
    for id in ["test_occurrence", "test_kpi_occurrence"] {
        let deleted = client
            .delete_occurrence(&OccurrenceOptions::new(ACCOUNT, PROVIDER, id))
            .await
            .unwrap();
        assert_eq!(deleted.status, 200);
    }
    for id in ["test_finding", "test_kpi", "test_card"] {
        client
            .delete_note(&NoteOptions::new(ACCOUNT, PROVIDER, id))
            .await
            .unwrap();
    }

    // Step 8: verify deletion.
    let err = client
        .get_note(&NoteOptions::new(ACCOUNT, PROVIDER, "test_finding"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.body().and_then(ErrorBody::message), Some("note not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn occurrence_for_missing_note_is_not_found() {
    let url = start_server().await;
    let client = findings_client(&url);

    let err = client
        .create_occurrence(&CreateOccurrenceOptions::new(
            ACCOUNT,
            PROVIDER,
            finding_occurrence("orphan", "koi_bhi_note"),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = client
        .get_note(&NoteOptions::new(ACCOUNT, PROVIDER, "koi_bhi_note"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test(flavor = "multi_thread")]
async fn notifications_lifecycle() {
    let url = start_server().await;
    let client = notifications_client(&url);

    let mut channel = NotificationChannel::webhook("test_channel", "https://cloud.ibm.com");
    channel.description = Some("test_description".to_string());
    channel.enabled = Some(true);
    channel.severity.insert(ChannelSeverity::Low);
    channel.alert_source.push(AlertSource {
        provider_name: "test_provider".to_string(),
        finding_types: vec!["test_type".to_string()],
    });

    let created = client
        .create_notification_channel(&CreateNotificationChannelOptions::new(ACCOUNT, channel.clone()))
        .await
        .unwrap();
    assert_eq!(created.status, 200);
    let channel_id = created.result.channel_id;

    let listed = client
        .list_all_channels(&ListAllChannelsOptions::new(ACCOUNT))
        .await
        .unwrap();
    assert_eq!(listed.result.channels.len(), 1);

    let fetched = client
        .get_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
        .await
        .unwrap();
    assert!(fetched.result.channel.severity.contains(ChannelSeverity::Low));
    assert!(!fetched.result.channel.severity.contains(ChannelSeverity::High));

    channel.severity.insert(ChannelSeverity::Critical);
    let updated = client
        .update_notification_channel(&UpdateNotificationChannelOptions::new(ACCOUNT, &channel_id, channel))
        .await
        .unwrap();
    assert_eq!(updated.result.channel_id, channel_id);

    let fetched = client
        .get_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
        .await
        .unwrap();
    assert!(fetched.result.channel.severity.contains(ChannelSeverity::Critical));

    let tested = client
        .test_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
        .await
        .unwrap();
    assert_eq!(tested.result.test, "success");

    let key = client.get_public_key(&GetPublicKeyOptions::new(ACCOUNT)).await.unwrap();
    assert_eq!(key.status, 200);
    assert_eq!(key.result.public_key, mock_server::PUBLIC_KEY);

    let deleted = client
        .delete_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
        .await
        .unwrap();
    assert_eq!(deleted.result.channel_id, channel_id);

    for outcome in [
        client
            .get_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
            .await
            .map(|_| ()),
        client
            .delete_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
            .await
            .map(|_| ()),
        client
            .test_notification_channel(&ChannelOptions::new(ACCOUNT, &channel_id))
            .await
            .map(|_| ()),
    ] {
        assert!(outcome.unwrap_err().is_not_found());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_delete_of_unknown_channels_fails() {
    let url = start_server().await;
    let client = notifications_client(&url);

    let err = client
        .delete_notification_channels(&DeleteNotificationChannelsOptions::new(
            ACCOUNT,
            ["test_channel_1", "test_channel_2"],
        ))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));

    let mut ids = Vec::new();
    for name in ["a", "b"] {
        let created = client
            .create_notification_channel(&CreateNotificationChannelOptions::new(
                ACCOUNT,
                NotificationChannel::webhook(name, "https://cloud.ibm.com"),
            ))
            .await
            .unwrap();
        ids.push(created.result.channel_id);
    }
    let deleted = client
        .delete_notification_channels(&DeleteNotificationChannelsOptions::new(ACCOUNT, ids))
        .await
        .unwrap();
    assert_eq!(deleted.status, 200);
    let listed = client
        .list_all_channels(&ListAllChannelsOptions::new(ACCOUNT))
        .await
        .unwrap();
    assert!(listed.result.channels.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthenticated_requests_are_rejected() {
    let url = start_server().await;
    let client = FindingsClient::new(ServiceConfig::new(&url), NoAuthAuthenticator);

    let err = client.list_providers(&ListProvidersOptions::new(ACCOUNT)).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_refused_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = findings_client(&format!("http://{addr}"));
    let err = client.list_providers(&ListProvidersOptions::new(ACCOUNT)).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}
