pub mod negotiation_tests;

use relaymesh_client::{
    LocalStream, ParticipantId, RoomController, RoomLinkTemplate, SessionEvent,
    SessionOrchestrator, SignalMessage, TransportEvent,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{MockSignalingOutput, MockTransportFactory};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A participant driven by hand: tests feed relay messages and transport
/// events directly, in the order they want them handled.
pub struct TestPeer {
    pub room: RoomController,
    pub signaling: MockSignalingOutput,
    pub factory: MockTransportFactory,
    pub events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pub transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

pub fn create_test_peer() -> TestPeer {
    create_test_peer_with_media(None)
}

pub fn create_test_peer_with_media(local_stream: Option<LocalStream>) -> TestPeer {
    let signaling = MockSignalingOutput::new_stored_only();
    let factory = MockTransportFactory::new();
    let (transport_tx, transport_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let orchestrator = SessionOrchestrator::new(
        Arc::new(factory.clone()),
        Arc::new(signaling.clone()),
        local_stream,
        transport_tx,
        events_tx.clone(),
    );
    let room = RoomController::new(
        orchestrator,
        RoomLinkTemplate::default(),
        Arc::new(signaling.clone()),
        events_tx,
    );

    TestPeer {
        room,
        signaling,
        factory,
        events_rx,
        transport_rx,
    }
}

impl TestPeer {
    pub async fn relay(&mut self, msg: SignalMessage) {
        self.room.on_relay_message(msg).await;
    }

    pub async fn identify(&mut self, id: &str) {
        self.relay(SignalMessage::Id { id: id.into() }).await;
    }

    pub async fn transport(&mut self, event: TransportEvent) {
        self.room.on_transport_event(event).await;
    }

    pub fn session_count(&self) -> usize {
        self.room.orchestrator().len()
    }

    pub fn has_session(&self, peer: &str) -> bool {
        self.room
            .orchestrator()
            .session(&ParticipantId::from(peer))
            .is_some()
    }

    /// Everything emitted so far, without waiting.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn peers(ids: &[&str]) -> SignalMessage {
    SignalMessage::Peers {
        peers: ids.iter().map(|id| ParticipantId::from(*id)).collect(),
    }
}
