use relaymesh_client::{ParticipantId, SignalMessage, TransportState};

use crate::integration::{create_test_peer, init_tracing, peers};

#[tokio::test]
async fn test_events_from_replaced_transport_are_dropped() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;
    let old = peer.factory.latest_for(&b).await.expect("first transport");

    peer.relay(SignalMessage::Leave { from: b.clone() }).await;
    peer.relay(peers(&["B"])).await;
    let current = peer.factory.latest_for(&b).await.expect("second transport");
    assert_ne!(old.epoch, current.epoch);

    // Late events of the torn-down connection
    peer.transport(old.candidate_event("candidate:stale")).await;
    peer.transport(old.state_event(TransportState::Failed)).await;

    assert!(peer.signaling.candidates_to(&b).await.is_empty());
    assert!(peer.has_session("B"));
    assert!(!current.is_closed().await);
}
