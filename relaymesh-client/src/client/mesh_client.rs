use crate::config::ClientConfig;
use crate::media::LocalStream;
use crate::room::{RoomCommand, RoomController};
use crate::session::{SessionEvent, SessionOrchestrator};
use crate::signaling::{ChannelEvent, SignalingOutput, WsSignalChannel};
use crate::transport::{RtcTransportFactory, TransportEvent, TransportFactory};
use anyhow::{Context, Result};
use relaymesh_core::{RoomId, RoomLinkTemplate};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Event loop of one participant.
///
/// Relay messages, transport events and user commands are handled one at a
/// time, so a negotiation step for a peer always finishes before the next
/// input for that peer is looked at.
pub struct MeshClient {
    room: RoomController,
    inbound_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    command_rx: mpsc::Receiver<RoomCommand>,
}

/// User-side handle of a running [`MeshClient`].
///
/// Session events are queued without a bound so the event loop never waits
/// on the user. Keep calling [`MeshHandle::next_event`] for as long as the
/// client runs, or drop the handle; events nobody reads pile up in memory.
pub struct MeshHandle {
    command_tx: mpsc::Sender<RoomCommand>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    links: RoomLinkTemplate,
}

impl MeshClient {
    pub fn new(
        links: RoomLinkTemplate,
        signaling: Arc<dyn SignalingOutput>,
        inbound_rx: mpsc::UnboundedReceiver<ChannelEvent>,
        factory: Arc<dyn TransportFactory>,
        local_stream: Option<LocalStream>,
    ) -> (Self, MeshHandle) {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let orchestrator = SessionOrchestrator::new(
            factory,
            signaling.clone(),
            local_stream,
            transport_tx,
            events_tx.clone(),
        );
        let room = RoomController::new(orchestrator, links.clone(), signaling, events_tx);

        let client = Self {
            room,
            inbound_rx,
            transport_rx,
            command_rx,
        };
        let handle = MeshHandle {
            command_tx,
            events_rx,
            links,
        };
        (client, handle)
    }

    pub async fn run(mut self) {
        info!("Mesh client event loop started");

        loop {
            tokio::select! {
                evt = self.inbound_rx.recv() => {
                    match evt {
                        Some(ChannelEvent::Message(msg)) => self.room.on_relay_message(msg).await,
                        Some(ChannelEvent::Closed) | None => {
                            self.room.on_channel_closed().await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.room.on_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(RoomCommand::Join(room)) => {
                            let link = self.room.join(room).await;
                            info!("Invite link: {}", link);
                        }
                        Some(RoomCommand::Shutdown) | None => {
                            info!("Shutdown requested, closing all sessions");
                            self.room.shutdown().await;
                            break;
                        }
                    }
                }
            }
        }

        info!("Mesh client event loop finished");
    }
}

impl MeshHandle {
    /// Returns the invite link for `room`.
    pub async fn join(&self, room: RoomId) -> Result<String> {
        let link = self.links.link_for(&room);
        self.command_tx
            .send(RoomCommand::Join(room))
            .await
            .context("Mesh client is no longer running")?;
        Ok(link)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(RoomCommand::Shutdown)
            .await
            .context("Mesh client is no longer running")
    }

    /// Next queued session event; `None` once the client has stopped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    pub fn links(&self) -> &RoomLinkTemplate {
        &self.links
    }
}

/// Opens the relay connection and spawns a [`MeshClient`] that uses
/// webrtc-rs peer connections.
pub async fn connect(config: &ClientConfig, local_stream: Option<LocalStream>) -> Result<MeshHandle> {
    let (sender, inbound_rx) = WsSignalChannel::connect(&config.relay_url)
        .await
        .context("Failed to open signaling channel")?;
    let factory = RtcTransportFactory::new(config.transport_config());

    let (client, handle) = MeshClient::new(
        config.links.clone(),
        Arc::new(sender),
        inbound_rx,
        Arc::new(factory),
        local_stream,
    );
    tokio::spawn(client.run());
    Ok(handle)
}
