use relaymesh_client::{
    IceCandidate, NegotiationRole, NegotiationState, ParticipantId, SdpKind, SessionDescription,
    SignalMessage,
};

use crate::integration::{create_test_peer, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_responder_answers_offer() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");

    peer.identify("A").await;
    peer.relay(SignalMessage::Offer {
        offer: SessionDescription::offer("remote-offer"),
        to: "A".into(),
        from: b.clone(),
    })
    .await;

    let session = peer.room.orchestrator().session(&b).expect("session for B");
    assert_eq!(session.role(), NegotiationRole::Responder);
    assert_eq!(session.state(), NegotiationState::Connected);

    let answers = peer.signaling.answers_to(&b).await;
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].0.kind, SdpKind::Answer);
    assert_eq!(answers[0].1, ParticipantId::from("A"));

    // A following candidate is applied right away
    peer.relay(SignalMessage::Candidate {
        candidate: IceCandidate::new("candidate:late"),
        to: "A".into(),
        from: b.clone(),
    })
    .await;

    let transport = peer.factory.latest_for(&b).await.expect("transport for B");
    assert_eq!(transport.applied_candidates().await, vec!["candidate:late"]);
    assert_eq!(
        transport.calls().await[..3],
        [
            TransportCall::SetRemoteDescription(SessionDescription::offer("remote-offer")),
            TransportCall::CreateAnswer,
            TransportCall::SetLocalDescription(answers[0].0.clone()),
        ]
    );
}

#[tokio::test]
async fn test_repeated_offer_answered_once() {
    init_tracing();

    let mut peer = create_test_peer();
    let b = ParticipantId::from("B");
    let offer = SignalMessage::Offer {
        offer: SessionDescription::offer("remote-offer"),
        to: "A".into(),
        from: b.clone(),
    };

    peer.identify("A").await;
    peer.relay(offer.clone()).await;
    peer.relay(offer).await;

    assert_eq!(peer.session_count(), 1);
    assert_eq!(peer.factory.created_count().await, 1);
    assert_eq!(peer.signaling.answers_to(&b).await.len(), 1);
}
