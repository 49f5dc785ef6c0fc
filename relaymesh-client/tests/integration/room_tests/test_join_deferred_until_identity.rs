use relaymesh_client::{RoomId, SessionEvent};

use crate::integration::{create_test_peer, init_tracing};

#[tokio::test]
async fn test_join_before_identity_is_sent_exactly_once() {
    init_tracing();

    let mut peer = create_test_peer();
    let room = RoomId::from("k3j9x0aa");

    peer.room.join(room.clone()).await;
    assert!(peer.signaling.joins().await.is_empty());
    assert_eq!(peer.room.pending_join(), Some(&room));

    peer.identify("A").await;
    assert_eq!(peer.signaling.joins().await, vec![room.clone()]);
    assert_eq!(peer.room.room(), Some(&room));
    assert!(peer.room.pending_join().is_none());

    // A repeated id must not replay the join
    peer.identify("A").await;
    assert_eq!(peer.signaling.joins().await.len(), 1);
}

#[tokio::test]
async fn test_join_after_identity_is_immediate() {
    init_tracing();

    let mut peer = create_test_peer();
    let room = RoomId::from("room-2");

    peer.identify("A").await;
    let link = peer.room.join(room.clone()).await;

    assert_eq!(peer.signaling.joins().await, vec![room.clone()]);

    let requested = peer.drain_events().into_iter().find_map(|e| match e {
        SessionEvent::JoinRequested { room, invite_link } => Some((room, invite_link)),
        _ => None,
    });
    assert_eq!(requested, Some((room, link)));
}

#[tokio::test]
async fn test_later_join_replaces_parked_one() {
    init_tracing();

    let mut peer = create_test_peer();

    peer.room.join(RoomId::from("first")).await;
    peer.room.join(RoomId::from("second")).await;
    peer.identify("A").await;

    assert_eq!(peer.signaling.joins().await, vec![RoomId::from("second")]);
}
