mod link;
mod participant;
mod room;
mod signaling;

pub use link::RoomLinkTemplate;
pub use participant::ParticipantId;
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalMessage};
