use crate::media::LocalStream;
use crate::transport::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use relaymesh_core::{IceCandidate, ParticipantId, SessionDescription};
use tokio::sync::mpsc;

/// One negotiated connection to a remote participant.
///
/// Implementations push gathered candidates, remote tracks and state changes
/// into the event channel they were created with.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn add_local_stream(&self, stream: &LocalStream) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        peer: ParticipantId,
        epoch: u64,
        event_tx: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>>;
}
