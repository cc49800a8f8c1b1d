//! Drives the client against a real server bound to localhost.

use std::sync::Arc;
use std::time::Duration;

use votegate_admission::MemoryIdentityStore;
use votegate_admission::store::MemoryAdmissionStore;
use votegate_api::{AppState, build_app};
use votegate_client::{ClientStatus, QueueClient, QueuePoller};
use votegate_core::ManualClock;
use votegate_core::config::{AppConfig, StoreBackend};
use votegate_core::error::ErrorKind;
use votegate_entity::Admission;

struct Server {
    base_url: String,
    state: AppState,
    clock: ManualClock,
}

async fn spawn_server(capacity: u32) -> Server {
    let mut config = AppConfig::default();
    config.admission.store = StoreBackend::Memory;
    config.admission.capacity = capacity;
    config.scheduler.enabled = false;

    let identities = MemoryIdentityStore::new();
    for n in 1..=3 {
        identities.register(format!("S-{n}"), format!("key-{n}")).await;
    }
    let clock = ManualClock::default();

    let state = AppState::new(
        config,
        Arc::new(MemoryAdmissionStore::new()),
        Arc::new(identities),
        Arc::new(clock.clone()),
        None,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server {
        base_url: format!("http://{addr}"),
        state,
        clock,
    }
}

fn client(server: &Server) -> QueueClient {
    QueueClient::new(server.base_url.clone(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_queued_client_sees_promotion_with_same_token() {
    let server = spawn_server(1).await;

    let first = client(&server);
    let holder = first.join("S-1", "key-1").await.unwrap();
    assert!(matches!(holder, Admission::Active { .. }));

    let poller = QueuePoller::new(client(&server), Duration::from_secs(30));
    let joined = poller.join("S-2", "key-2").await.unwrap();
    let ClientStatus::Queued { position, token } = joined.clone() else {
        panic!("expected queued, got {joined:?}");
    };
    assert_eq!(position, 1);

    assert_eq!(poller.tick().await, joined);

    first.leave(holder.token()).await.unwrap();
    let report = server.state.promotion.run().await;
    assert_eq!(report.promoted, 1);

    assert_eq!(poller.tick().await, ClientStatus::Active { token });
}

#[tokio::test]
async fn test_expired_session_stops_poller() {
    let server = spawn_server(1).await;

    let poller = QueuePoller::new(client(&server), Duration::from_secs(30));
    poller.join("S-1", "key-1").await.unwrap();

    server.clock.advance(chrono::Duration::seconds(301));

    let status = poller.tick().await;
    assert_eq!(
        status,
        ClientStatus::Error {
            message: "Session expired".into()
        }
    );

    let (_cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::time::timeout(Duration::from_secs(1), poller.run(cancel_rx))
        .await
        .expect("run returns immediately once the status is terminal");
}

#[tokio::test]
async fn test_rejected_join_is_reported() {
    let server = spawn_server(1).await;

    let poller = QueuePoller::new(client(&server), Duration::from_secs(30));
    let err = poller.join("S-1", "wrong").await.unwrap_err();

    match err {
        votegate_client::ClientError::Rejected { kind, message } => {
            assert_eq!(kind, ErrorKind::InvalidCredential);
            assert_eq!(message, "Invalid registration number or voting key");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        poller.status(),
        ClientStatus::Error {
            message: "Failed to join queue".into()
        }
    );
}

#[tokio::test]
async fn test_unreachable_server_means_connection_lost() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = QueueClient::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = client.heartbeat("tok").await.unwrap_err();
    assert!(err.is_transport());

    assert_eq!(
        ClientStatus::after_heartbeat("tok", Err(&err)),
        ClientStatus::Error {
            message: "Connection lost".into()
        }
    );
}

#[tokio::test]
async fn test_leave_goes_idle() {
    let server = spawn_server(2).await;

    let poller = QueuePoller::new(client(&server), Duration::from_secs(30));
    poller.join("S-3", "key-3").await.unwrap();
    poller.leave().await.unwrap();

    assert_eq!(poller.status(), ClientStatus::Idle);
    let ledger = server.state.ledger.state().await.unwrap();
    assert_eq!(ledger.active, 0);
}
