use crate::session::{RemovalReason, SessionEvent, SessionOrchestrator};
use crate::signaling::SignalingOutput;
use crate::transport::TransportEvent;
use relaymesh_core::{RoomId, RoomLinkTemplate, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Turns room ids into `join` messages and feeds everything else to the
/// [`SessionOrchestrator`].
pub struct RoomController {
    orchestrator: SessionOrchestrator,
    links: RoomLinkTemplate,
    signaling: Arc<dyn SignalingOutput>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    room: Option<RoomId>,
    pending_join: Option<RoomId>,
}

impl RoomController {
    pub fn new(
        orchestrator: SessionOrchestrator,
        links: RoomLinkTemplate,
        signaling: Arc<dyn SignalingOutput>,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            orchestrator,
            links,
            signaling,
            events_tx,
            room: None,
            pending_join: None,
        }
    }

    /// A fresh room id and its share link. Nothing is sent.
    pub fn create(&self) -> (RoomId, String) {
        self.links.create()
    }

    pub fn invite_link(&self, room: &RoomId) -> String {
        self.links.link_for(room)
    }

    /// Requests membership of `room` and returns its invite link.
    ///
    /// Without a local identity the join is parked and sent as soon as the
    /// relay assigns one. A later call replaces a still-parked join.
    pub async fn join(&mut self, room: RoomId) -> String {
        let invite_link = self.links.link_for(&room);
        let _ = self.events_tx.send(SessionEvent::JoinRequested {
            room: room.clone(),
            invite_link: invite_link.clone(),
        });

        if self.orchestrator.local_id().is_none() {
            info!("Join for room {} deferred until identity is assigned", room);
            self.pending_join = Some(room);
        } else {
            self.send_join(room).await;
        }
        invite_link
    }

    pub async fn on_relay_message(&mut self, msg: SignalMessage) {
        let is_identity = matches!(msg, SignalMessage::Id { .. });
        self.orchestrator.on_relay_message(msg).await;

        if is_identity
            && self.orchestrator.local_id().is_some()
            && let Some(room) = self.pending_join.take()
        {
            self.send_join(room).await;
        }
    }

    pub async fn on_transport_event(&mut self, event: TransportEvent) {
        self.orchestrator.on_transport_event(event).await;
    }

    pub async fn on_channel_closed(&mut self) {
        info!("Signaling channel closed, closing all sessions");
        self.pending_join = None;
        self.orchestrator.close_all(RemovalReason::ChannelClosed).await;
        let _ = self.events_tx.send(SessionEvent::ChannelClosed);
    }

    pub async fn shutdown(&mut self) {
        self.pending_join = None;
        self.orchestrator.close_all(RemovalReason::Shutdown).await;
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn pending_join(&self) -> Option<&RoomId> {
        self.pending_join.as_ref()
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }

    async fn send_join(&mut self, room: RoomId) {
        debug!("Sending join for room {}", room);
        self.signaling
            .send_signal(SignalMessage::Join {
                room_id: room.clone(),
            })
            .await;
        self.room = Some(room);
    }
}
