use relaymesh_core::{IceCandidate, ParticipantId, SessionDescription, SignalMessage};
use std::fmt;
use thiserror::Error;

/// Which side produces the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    /// Initiator: producing and committing the local offer.
    Offering,
    /// Initiator: offer sent, waiting for the remote answer.
    AwaitingAnswer,
    /// Responder: committing the remote offer.
    OfferReceived,
    /// Responder: producing and committing the local answer.
    Answering,
    Connected,
    Closed,
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Offering => "offering",
            Self::AwaitingAnswer => "awaiting-answer",
            Self::OfferReceived => "offer-received",
            Self::Answering => "answering",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Signal a session wants delivered to its remote participant.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

impl Outbound {
    pub fn into_message(self, from: ParticipantId, to: ParticipantId) -> SignalMessage {
        match self {
            Self::Offer(offer) => SignalMessage::Offer { offer, to, from },
            Self::Answer(answer) => SignalMessage::Answer { answer, to, from },
            Self::Candidate(candidate) => SignalMessage::Candidate {
                candidate,
                to,
                from,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("could not open a transport to {peer}: {reason}")]
    TransportUnavailable { peer: ParticipantId, reason: String },

    #[error("{step} failed for {peer}: {reason}")]
    Rejected {
        peer: ParticipantId,
        step: &'static str,
        reason: String,
    },

    #[error("transport to {peer} failed")]
    TransportFailed { peer: ParticipantId },
}

impl NegotiationError {
    pub(crate) fn rejected(peer: &ParticipantId, step: &'static str, e: anyhow::Error) -> Self {
        Self::Rejected {
            peer: peer.clone(),
            step,
            reason: format!("{:#}", e),
        }
    }
}
