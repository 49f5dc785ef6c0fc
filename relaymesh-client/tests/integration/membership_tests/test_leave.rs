use relaymesh_client::{ParticipantId, RemovalReason, SessionEvent, SignalMessage};

use crate::integration::{create_test_peer, init_tracing, peers};

#[tokio::test]
async fn test_leave_removes_exactly_that_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");
    let c = ParticipantId::from("C");

    peer.identify("A").await;
    peer.relay(peers(&["B", "C"])).await;
    peer.drain_events();

    peer.relay(SignalMessage::Leave { from: b.clone() }).await;

    assert!(!peer.has_session("B"));
    assert!(peer.has_session("C"));

    let b_transport = peer.factory.latest_for(&b).await.expect("transport for B");
    let c_transport = peer.factory.latest_for(&c).await.expect("transport for C");
    assert!(b_transport.is_closed().await);
    assert!(!c_transport.is_closed().await);

    let events = peer.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SessionEvent::PeerRemoved { peer, reason: RemovalReason::Left } if *peer == b
    ));
}

#[tokio::test]
async fn test_leave_for_unknown_peer_is_noop() {
    init_tracing();

    let mut peer = create_test_peer();

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;
    peer.drain_events();

    peer.relay(SignalMessage::Leave {
        from: "nobody".into(),
    })
    .await;

    assert_eq!(peer.session_count(), 1);
    assert!(peer.drain_events().is_empty());
}

#[tokio::test]
async fn test_peer_can_rejoin_after_leave() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;
    peer.relay(SignalMessage::Leave { from: b.clone() }).await;
    peer.relay(peers(&["B"])).await;

    let transports = peer.factory.transports_for(&b).await;
    assert_eq!(transports.len(), 2);
    assert!(transports[1].epoch > transports[0].epoch);
    assert_eq!(peer.signaling.offers_to(&b).await.len(), 2);
}
