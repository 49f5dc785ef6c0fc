use relaymesh_client::{
    ParticipantId, RemovalReason, SessionDescription, SessionEvent, SignalMessage,
};

use crate::integration::{create_test_peer, init_tracing, peers};
use crate::utils::MALFORMED_SDP;

#[tokio::test]
async fn test_bad_offer_drops_only_that_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");
    let c = ParticipantId::from("C");

    peer.identify("A").await;
    peer.relay(peers(&["C"])).await;
    peer.drain_events();

    peer.relay(SignalMessage::Offer {
        offer: SessionDescription::offer(MALFORMED_SDP),
        to: "A".into(),
        from: b.clone(),
    })
    .await;

    assert!(!peer.has_session("B"));
    assert!(peer.has_session("C"));
    assert!(peer.signaling.answers_to(&b).await.is_empty());

    let b_transport = peer.factory.latest_for(&b).await.expect("transport for B");
    assert!(b_transport.is_closed().await);
    let c_transport = peer.factory.latest_for(&c).await.expect("transport for C");
    assert!(!c_transport.is_closed().await);

    let removed = peer.drain_events().into_iter().find_map(|e| match e {
        SessionEvent::PeerRemoved { peer, reason } => Some((peer, reason)),
        _ => None,
    });
    let (removed_peer, reason) = removed.expect("PeerRemoved for B");
    assert_eq!(removed_peer, b);
    assert!(matches!(reason, RemovalReason::Failed(msg) if msg.contains("set remote offer")));
}

#[tokio::test]
async fn test_bad_answer_drops_initiator_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B", "C"])).await;
    peer.relay(SignalMessage::Answer {
        answer: SessionDescription::answer(MALFORMED_SDP),
        to: "A".into(),
        from: b.clone(),
    })
    .await;

    assert!(!peer.has_session("B"));
    assert!(peer.has_session("C"));
}

#[tokio::test]
async fn test_transport_creation_failure_creates_no_session() {
    init_tracing();

    let mut peer = create_test_peer();
    peer.factory.refuse_transports(true);

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;

    assert_eq!(peer.session_count(), 0);
    assert_eq!(peer.signaling.count().await, 0);

    // The next attempt succeeds once transports are available again
    peer.factory.refuse_transports(false);
    peer.relay(peers(&["B"])).await;
    assert!(peer.has_session("B"));
}
