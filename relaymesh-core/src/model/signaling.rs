use crate::error::ProtocolError;
use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

/// SDP payload in the shape browsers put on the wire: `{"type": "offer", "sdp": "v=0..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Everything exchanged with the relay, one JSON object per frame tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    /// First frame after connect: the identity the relay assigned to us.
    Id { id: ParticipantId },

    /// Participants already in the room at the time we joined.
    Peers { peers: Vec<ParticipantId> },

    Join {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    Offer {
        offer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    },

    Answer {
        answer: SessionDescription,
        to: ParticipantId,
        from: ParticipantId,
    },

    Candidate {
        candidate: IceCandidate,
        to: ParticipantId,
        from: ParticipantId,
    },

    Leave { from: ParticipantId },
}

impl SignalMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Sender of a peer-to-peer message, `None` for relay and join frames.
    pub fn from(&self) -> Option<&ParticipantId> {
        match self {
            Self::Offer { from, .. }
            | Self::Answer { from, .. }
            | Self::Candidate { from, .. }
            | Self::Leave { from } => Some(from),
            Self::Id { .. } | Self::Peers { .. } | Self::Join { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Id { .. } => "id",
            Self::Peers { .. } => "peers",
            Self::Join { .. } => "join",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
            Self::Leave { .. } => "leave",
        }
    }
}
