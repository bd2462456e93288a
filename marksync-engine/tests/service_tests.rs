mod support;

use marksync_engine::{
    create_sync_service, FolderScorer, LocalTreeAdapter, MemoryTreeAdapter, ServiceHandle,
    StaticSettings, SyncService, SyncSettings, UiChannel, UiMessage,
};
use marksync_types::TreeEvent;
use std::sync::Arc;
use std::time::Duration;
use support::{bookmark_json, folder_json, remote, suggestion, FixedScorer, RecordingChannel};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_service(
    server: &MockServer,
    tree: Arc<dyn LocalTreeAdapter>,
    events_rx: mpsc::Receiver<TreeEvent>,
    scorer: Arc<dyn FolderScorer>,
    ui: Arc<dyn UiChannel>,
    settings: SyncSettings,
) -> (ServiceHandle, tokio::task::JoinHandle<()>) {
    let remote_client = remote(server).await;
    let (handle, service): (ServiceHandle, SyncService) = create_sync_service(
        Arc::new(StaticSettings(settings)),
        remote_client,
        tree,
        scorer,
        ui,
        events_rx,
    );
    let task = tokio::spawn(service.run());
    (handle, task)
}

fn settings(ai_enabled: bool) -> SyncSettings {
    SyncSettings {
        auth_token: Some("tok".into()),
        sync_enabled: true,
        ai_enabled,
        auto_accept: false,
        notifications_enabled: true,
    }
}

async fn count_requests(server: &MockServer, method: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == method && r.url.path() == url_path)
        .count()
}

/// Polls until `server` has seen `n` `method url_path` requests.
async fn wait_for_requests(server: &MockServer, method: &str, url_path: &str, n: usize) {
    for _ in 0..200 {
        if count_requests(server, method, url_path).await >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{method} {url_path} not observed {n} time(s) within 2s");
}

#[tokio::test]
async fn created_bookmark_flows_to_remote_without_ai() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookmarks": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(bookmark_json("r-1", "Example", "https://example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::with_events(event_tx));
    let ui = Arc::new(RecordingChannel::default());
    let (handle, task) = start_service(
        &server,
        tree.clone(),
        events_rx,
        Arc::new(FixedScorer(suggestion("unused", "unused", 0.9))),
        ui,
        settings(false),
    )
    .await;

    tree.create(&tree.default_parent_id(), "Example", Some("https://example.com"))
        .await
        .unwrap();

    wait_for_requests(&server, "POST", "/api/bookmarks", 1).await;
    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn acceptance_syncs_once_via_move_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/folders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "folders": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/folders"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(folder_json("f-r", "Research", None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookmarks": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(bookmark_json("r-1", "Example", "https://example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::with_events(event_tx));
    // The folder exists before the service starts; its buffered Created
    // event is ignored by the forward engine.
    let folder = tree
        .create(&tree.default_parent_id(), "Research", None)
        .await
        .unwrap();
    let ui = Arc::new(RecordingChannel::default());
    let (handle, task) = start_service(
        &server,
        tree.clone(),
        events_rx,
        Arc::new(FixedScorer(suggestion(&folder.id, "Research", 0.9))),
        ui.clone(),
        settings(true),
    )
    .await;

    let node = tree
        .create(&tree.default_parent_id(), "Example", Some("https://example.com"))
        .await
        .unwrap();

    // Wait for the workflow to park the suggestion — the recommendation
    // message is only sent after the pending entry exists.
    for _ in 0..200 {
        if ui.sent().await.iter().any(|m| {
            matches!(m, UiMessage::ShowFolderRecommendation { .. })
        }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let ack = handle.accept_recommendation(&node.id).await.unwrap();
    assert!(ack.success, "accept failed: {:?}", ack.error);

    // The move event performs exactly one upsert (expect(1) above).
    wait_for_requests(&server, "POST", "/api/bookmarks", 1).await;
    assert_eq!(
        tree.get(&node.id).await.unwrap().parent_id.as_deref(),
        Some(folder.id.as_str())
    );

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn dismissal_through_service_syncs_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookmarks": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bookmarks"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(bookmark_json("r-1", "Example", "https://example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::with_events(event_tx));
    let folder = tree
        .create(&tree.default_parent_id(), "Research", None)
        .await
        .unwrap();
    let ui = Arc::new(RecordingChannel::default());
    let (handle, task) = start_service(
        &server,
        tree.clone(),
        events_rx,
        Arc::new(FixedScorer(suggestion(&folder.id, "Research", 0.9))),
        ui.clone(),
        settings(true),
    )
    .await;

    let node = tree
        .create(&tree.default_parent_id(), "Example", Some("https://example.com"))
        .await
        .unwrap();
    for _ in 0..200 {
        if ui.sent().await.iter().any(|m| {
            matches!(m, UiMessage::ShowFolderRecommendation { .. })
        }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let ack = handle.dismiss_recommendation(&node.id).await.unwrap();
    assert!(ack.success, "dismiss failed: {:?}", ack.error);

    // Dismissal synced synchronously inside the command; the bookmark is
    // unmoved and exactly one create went out.
    assert_eq!(count_requests(&server, "POST", "/api/bookmarks").await, 1);
    assert_eq!(tree.get(&node.id).await.unwrap().parent_id, node.parent_id);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn unknown_recommendation_acks_failure() {
    let server = MockServer::start().await;
    let (_event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::new());
    let (handle, task) = start_service(
        &server,
        tree,
        events_rx,
        Arc::new(FixedScorer(suggestion("f", "F", 0.9))),
        Arc::new(RecordingChannel::default()),
        settings(true),
    )
    .await;

    let ack = handle.accept_recommendation("no-such-bookmark").await.unwrap();
    assert!(!ack.success);
    assert!(ack.error.unwrap().contains("no-such-bookmark"));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn disabled_sync_drops_events_and_refuses_reverse_pass() {
    let server = MockServer::start().await;
    let (event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::with_events(event_tx));
    let ui = Arc::new(RecordingChannel::default());
    let (handle, task) = start_service(
        &server,
        tree.clone(),
        events_rx,
        Arc::new(FixedScorer(suggestion("f", "F", 0.9))),
        ui,
        SyncSettings {
            auth_token: Some("tok".into()),
            sync_enabled: false,
            ..SyncSettings::default()
        },
    )
    .await;

    tree.create(&tree.default_parent_id(), "Example", Some("https://example.com"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.received_requests().await.unwrap().is_empty());

    let report = handle.sync_from_markhub().await.unwrap();
    assert!(!report.success);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn reverse_pass_round_trips_through_the_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "folders": [{ "id": "rf-1", "name": "Work", "path": ["Work"] }],
            "bookmarks": [
                { "id": "rb-1", "title": "Q1", "url": "https://q1.example", "folder_path": ["Work"] }
            ]
        })))
        .mount(&server)
        .await;

    let (event_tx, events_rx) = mpsc::channel(256);
    let tree: Arc<dyn LocalTreeAdapter> = Arc::new(MemoryTreeAdapter::with_events(event_tx));
    let (handle, task) = start_service(
        &server,
        tree.clone(),
        events_rx,
        Arc::new(FixedScorer(suggestion("f", "F", 0.9))),
        Arc::new(RecordingChannel::default()),
        settings(false),
    )
    .await;

    let report = handle.sync_from_markhub().await.unwrap();
    assert!(report.success);
    assert_eq!(report.folders_created, 1);
    assert_eq!(report.bookmarks_created, 1);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
