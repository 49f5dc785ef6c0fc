use crate::media::MediaTrack;
use relaymesh_core::{IceCandidate, ParticipantId};
use std::sync::Arc;

/// Connection state as reported by the underlying peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a transport raises for the session loop.
///
/// Each carries the epoch of the session that created the transport so that
/// events from a torn-down connection can be told apart from a newer session
/// to the same participant.
#[derive(Debug)]
pub enum TransportEvent {
    /// A local ICE candidate was gathered and must be trickled to the remote side.
    CandidateGenerated {
        peer: ParticipantId,
        epoch: u64,
        candidate: IceCandidate,
    },

    /// The remote side started sending a track.
    RemoteTrack {
        peer: ParticipantId,
        epoch: u64,
        track: Arc<dyn MediaTrack>,
    },

    StateChanged {
        peer: ParticipantId,
        epoch: u64,
        state: TransportState,
    },
}

impl TransportEvent {
    pub fn origin(&self) -> (&ParticipantId, u64) {
        match self {
            Self::CandidateGenerated { peer, epoch, .. }
            | Self::RemoteTrack { peer, epoch, .. }
            | Self::StateChanged { peer, epoch, .. } => (peer, *epoch),
        }
    }
}
