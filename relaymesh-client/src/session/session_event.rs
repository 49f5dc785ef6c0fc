use crate::media::RemoteStream;
use crate::session::NegotiationRole;
use relaymesh_core::{ParticipantId, RoomId};

#[derive(Debug, Clone, PartialEq)]
pub enum RemovalReason {
    /// The relay announced the participant left.
    Left,
    /// Negotiation or the transport failed; other sessions are unaffected.
    Failed(String),
    ChannelClosed,
    Shutdown,
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LocalIdentity(ParticipantId),

    /// A join was requested; it may still be waiting for the local identity.
    JoinRequested { room: RoomId, invite_link: String },

    PeerAdded {
        peer: ParticipantId,
        role: NegotiationRole,
    },

    /// Emitted once per newly attached track; re-deliveries are swallowed.
    RemoteStreamAttached {
        peer: ParticipantId,
        stream: RemoteStream,
    },

    PeerRemoved {
        peer: ParticipantId,
        reason: RemovalReason,
    },

    ChannelClosed,
}
