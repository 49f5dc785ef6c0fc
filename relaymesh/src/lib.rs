pub use relaymesh_core::{ParticipantId, RoomId};

pub mod model {
    pub use relaymesh_core::model::*;
    pub use relaymesh_core::ProtocolError;
}

#[cfg(feature = "client")]
pub mod client {
    pub use relaymesh_client::*;
}
