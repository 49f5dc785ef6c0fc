use relaymesh_client::{ParticipantId, RemovalReason, SessionEvent, TransportState};

use crate::integration::{create_test_peer, init_tracing, peers};

#[tokio::test]
async fn test_failed_transport_closes_that_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B", "C"])).await;
    peer.drain_events();

    let transport = peer.factory.latest_for(&b).await.expect("transport for B");
    peer.transport(transport.state_event(TransportState::Failed))
        .await;

    assert!(!peer.has_session("B"));
    assert!(peer.has_session("C"));
    assert!(transport.is_closed().await);

    let events = peer.drain_events();
    assert!(matches!(
        &events[..],
        [SessionEvent::PeerRemoved { reason: RemovalReason::Failed(_), .. }]
    ));
}

#[tokio::test]
async fn test_disconnected_transport_is_kept() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;

    let transport = peer.factory.latest_for(&b).await.expect("transport for B");
    peer.transport(transport.state_event(TransportState::Disconnected))
        .await;

    assert!(peer.has_session("B"));
    assert!(!transport.is_closed().await);
}
