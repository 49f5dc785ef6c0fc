mod client;
mod config;
mod media;
mod recording;
mod room;
mod session;
mod signaling;
mod transport;

pub use client::*;
pub use config::*;
pub use media::*;
pub use recording::*;
pub use room::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;

pub use relaymesh_core::{
    IceCandidate, IceServerConfig, ParticipantId, RoomId, RoomLinkTemplate, SdpKind,
    SessionDescription, SignalMessage,
};
