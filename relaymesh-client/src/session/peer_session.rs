use crate::media::{LocalStream, MediaTrack, RemoteStream};
use crate::session::{NegotiationError, NegotiationRole, NegotiationState, Outbound};
use crate::transport::PeerTransport;
use relaymesh_core::{IceCandidate, ParticipantId, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Negotiation state machine for one remote participant.
///
/// The session never sends anything itself: every operation that has
/// something to say to the remote side returns an [`Outbound`] which the
/// orchestrator addresses and puts on the wire.
pub struct PeerSession {
    remote: ParticipantId,
    epoch: u64,
    role: NegotiationRole,
    state: NegotiationState,
    transport: Option<Box<dyn PeerTransport>>,
    pending_candidates: Vec<IceCandidate>,
    remote_description_set: bool,
    remote_stream: Option<RemoteStream>,
}

impl PeerSession {
    pub fn new(
        remote: ParticipantId,
        epoch: u64,
        role: NegotiationRole,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        Self {
            remote,
            epoch,
            role,
            state: NegotiationState::New,
            transport: Some(transport),
            pending_candidates: Vec::new(),
            remote_description_set: false,
            remote_stream: None,
        }
    }

    pub fn remote(&self) -> &ParticipantId {
        &self.remote
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn pending_candidates(&self) -> &[IceCandidate] {
        &self.pending_candidates
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description_set
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.state == NegotiationState::Closed
    }

    /// Binds the shared local tracks to this connection.
    ///
    /// Missing media is fine: the session then only receives.
    pub async fn attach_local_media(&mut self, stream: Option<&LocalStream>) {
        let Some(transport) = &self.transport else {
            return;
        };
        let Some(stream) = stream else {
            debug!("No local media for {}, negotiating receive-only", self.remote);
            return;
        };
        if let Err(e) = transport.add_local_stream(stream).await {
            warn!("Failed to attach local media for {}: {:#}", self.remote, e);
        }
    }

    /// Initiator entry point: offer, commit it locally, hand it out.
    pub async fn start_offer(&mut self) -> Result<Outbound, NegotiationError> {
        let Some(transport) = &self.transport else {
            return Err(NegotiationError::TransportFailed {
                peer: self.remote.clone(),
            });
        };

        self.state = NegotiationState::Offering;

        let offer = transport
            .create_offer()
            .await
            .map_err(|e| NegotiationError::rejected(&self.remote, "create offer", e))?;
        transport
            .set_local_description(offer.clone())
            .await
            .map_err(|e| NegotiationError::rejected(&self.remote, "set local offer", e))?;

        self.state = NegotiationState::AwaitingAnswer;
        info!("Offer ready for {}", self.remote);
        Ok(Outbound::Offer(offer))
    }

    /// Responder path. Returns `None` when the offer is not acceptable in
    /// the current state.
    pub async fn receive_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<Option<Outbound>, NegotiationError> {
        if self.role != NegotiationRole::Responder || self.state != NegotiationState::New {
            // Simultaneous offers (glare) land here; resolving them is left
            // to a future policy, the existing session is kept as is.
            warn!(
                "Ignoring offer from {} in state {} ({:?})",
                self.remote, self.state, self.role
            );
            return Ok(None);
        }

        self.state = NegotiationState::OfferReceived;
        self.commit_remote_description(offer, "set remote offer")
            .await?;

        let Some(transport) = &self.transport else {
            return Ok(None);
        };

        self.state = NegotiationState::Answering;

        let answer = transport
            .create_answer()
            .await
            .map_err(|e| NegotiationError::rejected(&self.remote, "create answer", e))?;
        transport
            .set_local_description(answer.clone())
            .await
            .map_err(|e| NegotiationError::rejected(&self.remote, "set local answer", e))?;

        self.state = NegotiationState::Connected;
        info!("Answer ready for {}", self.remote);
        Ok(Some(Outbound::Answer(answer)))
    }

    pub async fn receive_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::AwaitingAnswer {
            debug!(
                "Dropping answer from {} in state {}",
                self.remote, self.state
            );
            return Ok(());
        }

        self.commit_remote_description(answer, "set remote answer")
            .await?;
        self.state = NegotiationState::Connected;
        info!("Negotiation with {} complete", self.remote);
        Ok(())
    }

    /// Applies the candidate now, or buffers it until a remote description
    /// has been committed.
    pub async fn receive_candidate(&mut self, candidate: IceCandidate) {
        if self.is_closed() {
            return;
        }
        if !self.remote_description_set {
            debug!(
                "Buffering candidate from {} ({} pending)",
                self.remote,
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push(candidate);
            return;
        }
        self.apply_candidate(candidate).await;
    }

    /// Returns `true` when the track was not attached before.
    pub fn on_remote_track(&mut self, track: Arc<dyn MediaTrack>) -> bool {
        if self.is_closed() {
            return false;
        }

        let stream_id = track.stream_id();
        if let Some(stream) = self.remote_stream.as_mut() {
            if stream.id() == stream_id {
                return stream.attach(track);
            }
        }

        let mut stream = RemoteStream::new(stream_id);
        stream.attach(track);
        self.remote_stream = Some(stream);
        true
    }

    /// Releases the transport. Safe to call more than once.
    pub async fn close(&mut self) {
        self.pending_candidates.clear();
        self.remote_stream = None;
        self.state = NegotiationState::Closed;

        let Some(transport) = self.transport.take() else {
            return;
        };
        if let Err(e) = transport.close().await {
            warn!("Error closing transport to {}: {:#}", self.remote, e);
        }
        info!("Session with {} closed", self.remote);
    }

    async fn commit_remote_description(
        &mut self,
        desc: SessionDescription,
        step: &'static str,
    ) -> Result<(), NegotiationError> {
        let Some(transport) = &self.transport else {
            return Ok(());
        };
        transport
            .set_remote_description(desc)
            .await
            .map_err(|e| NegotiationError::rejected(&self.remote, step, e))?;
        self.remote_description_set = true;

        // Drain before returning so that no later candidate can overtake
        // the ones that arrived early.
        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!(
                "Applying {} buffered candidate(s) for {}",
                pending.len(),
                self.remote
            );
        }
        for candidate in pending {
            self.apply_candidate(candidate).await;
        }
        Ok(())
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        let Some(transport) = &self.transport else {
            return;
        };
        if let Err(e) = transport.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate for {}: {:#}", self.remote, e);
        }
    }
}
