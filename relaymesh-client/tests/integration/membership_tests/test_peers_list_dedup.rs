use relaymesh_client::{ParticipantId, SessionDescription, SignalMessage};

use crate::integration::{create_test_peer, init_tracing, peers};

#[tokio::test]
async fn test_two_peer_lists_create_one_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;
    peer.relay(peers(&["B", "C"])).await;

    assert_eq!(peer.session_count(), 2);
    assert_eq!(peer.factory.transports_for(&b).await.len(), 1);
    assert_eq!(peer.signaling.offers_to(&b).await.len(), 1);
    assert_eq!(peer.signaling.offers_to(&"C".into()).await.len(), 1);
}

#[tokio::test]
async fn test_offer_from_listed_peer_keeps_initiator_session() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(peers(&["B"])).await;
    // Both sides offered at once
    peer.relay(SignalMessage::Offer {
        offer: SessionDescription::offer("remote-offer"),
        to: "A".into(),
        from: b.clone(),
    })
    .await;

    assert_eq!(peer.session_count(), 1);
    assert_eq!(peer.factory.transports_for(&b).await.len(), 1);
    assert!(peer.signaling.answers_to(&b).await.is_empty());
}

#[tokio::test]
async fn test_peers_list_never_includes_self() {
    init_tracing();

    let mut peer = create_test_peer();

    peer.identify("A").await;
    peer.relay(peers(&["A", "B"])).await;

    assert!(!peer.has_session("A"));
    assert!(peer.has_session("B"));
    assert_eq!(peer.session_count(), 1);
}
