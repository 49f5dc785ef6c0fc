use crate::media::LocalStream;
use crate::session::{
    NegotiationError, NegotiationRole, Outbound, PeerSession, RemovalReason, SessionEvent,
};
use crate::signaling::SignalingOutput;
use crate::transport::{TransportEvent, TransportFactory, TransportState};
use relaymesh_core::{IceCandidate, ParticipantId, SessionDescription, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Owns every [`PeerSession`] of the local participant.
///
/// Inbound signals are routed to the session keyed by their sender, sessions
/// are created on first contact, and whatever a session wants to say is
/// addressed and sent from here. This is the only writer of the session map.
pub struct SessionOrchestrator {
    local_id: Option<ParticipantId>,
    sessions: HashMap<ParticipantId, PeerSession>,
    next_epoch: u64,
    deferred: Vec<(ParticipantId, Outbound)>,
    factory: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingOutput>,
    local_stream: Option<LocalStream>,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionOrchestrator {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        signaling: Arc<dyn SignalingOutput>,
        local_stream: Option<LocalStream>,
        transport_tx: mpsc::UnboundedSender<TransportEvent>,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            local_id: None,
            sessions: HashMap::new(),
            next_epoch: 0,
            deferred: Vec::new(),
            factory,
            signaling,
            local_stream,
            transport_tx,
            events_tx,
        }
    }

    pub fn local_id(&self) -> Option<&ParticipantId> {
        self.local_id.as_ref()
    }

    pub fn session(&self, peer: &ParticipantId) -> Option<&PeerSession> {
        self.sessions.get(peer)
    }

    pub fn peer_ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.sessions.keys()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub async fn on_relay_message(&mut self, msg: SignalMessage) {
        debug!("Relay message: {}", msg.kind());

        match msg {
            SignalMessage::Id { id } => self.assign_identity(id).await,

            SignalMessage::Peers { peers } => {
                for peer in peers {
                    self.connect_to(peer).await;
                }
            }

            SignalMessage::Offer { offer, from, .. } => self.handle_offer(from, offer).await,

            SignalMessage::Answer { answer, from, .. } => self.handle_answer(from, answer).await,

            SignalMessage::Candidate {
                candidate, from, ..
            } => self.handle_candidate(from, candidate).await,

            SignalMessage::Leave { from } => {
                if !self.remove_session(&from, RemovalReason::Left).await {
                    debug!("Leave for unknown participant {}", from);
                }
            }

            SignalMessage::Join { room_id } => {
                debug!("Ignoring join for room {} echoed by relay", room_id);
            }
        }
    }

    pub async fn on_transport_event(&mut self, event: TransportEvent) {
        let (peer, epoch) = {
            let (peer, epoch) = event.origin();
            (peer.clone(), epoch)
        };
        match self.sessions.get(&peer) {
            Some(session) if session.epoch() == epoch => {}
            _ => {
                debug!("Dropping transport event from stale session {}#{}", peer, epoch);
                return;
            }
        }

        match event {
            TransportEvent::CandidateGenerated { candidate, .. } => {
                self.send_signal(&peer, Outbound::Candidate(candidate)).await;
            }

            TransportEvent::RemoteTrack { track, .. } => {
                let Some(session) = self.sessions.get_mut(&peer) else {
                    return;
                };
                if !session.on_remote_track(track) {
                    return;
                }
                let stream = session.remote_stream().cloned();
                if let Some(stream) = stream {
                    self.emit(SessionEvent::RemoteStreamAttached { peer, stream });
                }
            }

            TransportEvent::StateChanged { state, .. } => {
                debug!("Transport to {} is {:?}", peer, state);
                if state == TransportState::Failed {
                    let err = NegotiationError::TransportFailed { peer: peer.clone() };
                    self.fail_session(&peer, err).await;
                }
            }
        }
    }

    /// Tears down every session, e.g. when the relay connection is lost.
    pub async fn close_all(&mut self, reason: RemovalReason) {
        let peers: Vec<ParticipantId> = self.sessions.keys().cloned().collect();
        for peer in peers {
            self.remove_session(&peer, reason.clone()).await;
        }
        self.deferred.clear();
    }

    async fn assign_identity(&mut self, id: ParticipantId) {
        if let Some(current) = &self.local_id {
            warn!(
                "Relay sent a second identity {} (already {}), ignoring",
                id, current
            );
            return;
        }

        info!("Local identity assigned: {}", id);
        self.local_id = Some(id.clone());
        self.emit(SessionEvent::LocalIdentity(id));

        for (to, outbound) in std::mem::take(&mut self.deferred) {
            self.send_signal(&to, outbound).await;
        }
    }

    async fn connect_to(&mut self, peer: ParticipantId) {
        if self.local_id.as_ref() == Some(&peer) {
            return;
        }
        if !self.open_session(&peer, NegotiationRole::Initiator).await {
            return;
        }

        let Some(session) = self.sessions.get_mut(&peer) else {
            return;
        };
        match session.start_offer().await {
            Ok(outbound) => self.send_signal(&peer, outbound).await,
            Err(e) => self.fail_session(&peer, e).await,
        }
    }

    async fn handle_offer(&mut self, from: ParticipantId, offer: SessionDescription) {
        if self.local_id.as_ref() == Some(&from) {
            debug!("Dropping offer that claims to come from ourselves");
            return;
        }
        self.open_session(&from, NegotiationRole::Responder).await;

        let Some(session) = self.sessions.get_mut(&from) else {
            return;
        };
        match session.receive_offer(offer).await {
            Ok(Some(outbound)) => self.send_signal(&from, outbound).await,
            Ok(None) => {}
            Err(e) => self.fail_session(&from, e).await,
        }
    }

    async fn handle_answer(&mut self, from: ParticipantId, answer: SessionDescription) {
        let Some(session) = self.sessions.get_mut(&from) else {
            debug!("Answer from {} has no session, dropping", from);
            return;
        };
        if let Err(e) = session.receive_answer(answer).await {
            self.fail_session(&from, e).await;
        }
    }

    async fn handle_candidate(&mut self, from: ParticipantId, candidate: IceCandidate) {
        let Some(session) = self.sessions.get_mut(&from) else {
            debug!("Candidate from {} has no session, dropping", from);
            return;
        };
        session.receive_candidate(candidate).await;
    }

    /// Returns `true` only when a new session was stored; an existing session
    /// for `peer` is reused untouched.
    async fn open_session(&mut self, peer: &ParticipantId, role: NegotiationRole) -> bool {
        if self.sessions.contains_key(peer) {
            debug!("Session for {} already exists, reusing it", peer);
            return false;
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let transport = match self
            .factory
            .create(peer.clone(), epoch, self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                let err = NegotiationError::TransportUnavailable {
                    peer: peer.clone(),
                    reason: format!("{:#}", e),
                };
                error!("{}", err);
                return false;
            }
        };

        let mut session = PeerSession::new(peer.clone(), epoch, role, transport);
        session.attach_local_media(self.local_stream.as_ref()).await;
        self.sessions.insert(peer.clone(), session);

        info!("Opened {:?} session with {}", role, peer);
        self.emit(SessionEvent::PeerAdded {
            peer: peer.clone(),
            role,
        });
        true
    }

    async fn fail_session(&mut self, peer: &ParticipantId, err: NegotiationError) {
        warn!("Dropping session with {}: {}", peer, err);
        self.remove_session(peer, RemovalReason::Failed(err.to_string()))
            .await;
    }

    async fn remove_session(&mut self, peer: &ParticipantId, reason: RemovalReason) -> bool {
        let Some(mut session) = self.sessions.remove(peer) else {
            return false;
        };
        session.close().await;
        self.deferred.retain(|(to, _)| to != peer);

        self.emit(SessionEvent::PeerRemoved {
            peer: peer.clone(),
            reason,
        });
        true
    }

    /// The single path from a session to the wire.
    async fn send_signal(&mut self, to: &ParticipantId, outbound: Outbound) {
        let Some(from) = self.local_id.clone() else {
            debug!("No local identity yet, deferring signal to {}", to);
            self.deferred.push((to.clone(), outbound));
            return;
        };
        let msg = outbound.into_message(from, to.clone());
        self.signaling.send_signal(msg).await;
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }
}
