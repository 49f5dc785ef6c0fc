use crate::media::{LocalStream, MediaKind, MediaTrack};
use crate::transport::{PeerTransport, TransportConfig, TransportEvent, TransportFactory, TransportState};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use relaymesh_core::{IceCandidate, ParticipantId, SdpKind, SessionDescription};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// [`PeerTransport`] backed by a webrtc-rs peer connection.
pub struct RtcTransport {
    peer: ParticipantId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Builds the peer connection and wires its callbacks into `event_tx`.
    ///
    /// `close()` runs the state-change callback inline while the event loop
    /// is waiting on it, so the callbacks must never wait on the channel.
    pub async fn new(
        peer: ParticipantId,
        epoch: u64,
        config: &TransportConfig,
        event_tx: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.rtc_ice_servers(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        let state_peer = peer.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let peer = state_peer.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {}", peer, s);
                    let state = match s {
                        RTCPeerConnectionState::Connecting => TransportState::Connecting,
                        RTCPeerConnectionState::Connected => TransportState::Connected,
                        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
                        RTCPeerConnectionState::Failed => TransportState::Failed,
                        RTCPeerConnectionState::Closed => TransportState::Closed,
                        _ => TransportState::New,
                    };
                    let _ = tx.send(TransportEvent::StateChanged { peer, epoch, state });
                })
            },
        ));

        // Trickle: every gathered candidate goes out on its own.
        let ice_tx = event_tx.clone();
        let ice_peer = peer.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let peer = ice_peer.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Could not serialize local candidate for {}: {}", peer, e);
                        return;
                    }
                };
                let _ = tx.send(TransportEvent::CandidateGenerated {
                    peer,
                    epoch,
                    candidate: from_rtc_candidate(init),
                });
            })
        }));

        let track_tx = event_tx;
        let track_peer = peer.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let peer = track_peer.clone();

                Box::pin(async move {
                    debug!("Remote track {} arrived from {}", track.id(), peer);
                    let track: Arc<dyn MediaTrack> = Arc::new(RtcRemoteTrack { track });
                    let _ = tx.send(TransportEvent::RemoteTrack { peer, epoch, track });
                })
            },
        ));

        Ok(Self {
            peer,
            peer_connection,
        })
    }

    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn add_local_stream(&self, stream: &LocalStream) -> Result<()> {
        for track in stream.tracks() {
            let track: Arc<dyn TrackLocal + Send + Sync> = track.clone();
            let sender = self
                .peer_connection
                .add_track(track)
                .await
                .context("Failed to add local track")?;

            // RTCP has to be drained for interceptors such as NACK to work.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }
        debug!(
            "Attached {} local track(s) of stream {} for {}",
            stream.tracks().len(),
            stream.id(),
            self.peer
        );
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates an [`RtcTransport`] per session.
#[derive(Debug, Clone, Default)]
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        peer: ParticipantId,
        epoch: u64,
        event_tx: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>> {
        let transport = RtcTransport::new(peer, epoch, &self.config, event_tx).await?;
        Ok(Box::new(transport))
    }
}

/// Remote track received over an [`RtcTransport`].
pub struct RtcRemoteTrack {
    track: Arc<TrackRemote>,
}

impl RtcRemoteTrack {
    pub fn track(&self) -> &Arc<TrackRemote> {
        &self.track
    }
}

impl fmt::Debug for RtcRemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtcRemoteTrack")
            .field("id", &self.track.id())
            .field("stream_id", &self.track.stream_id())
            .finish()
    }
}

impl MediaTrack for RtcRemoteTrack {
    fn id(&self) -> String {
        self.track.id()
    }

    fn stream_id(&self) -> String {
        self.track.stream_id()
    }

    fn kind(&self) -> MediaKind {
        match self.track.kind() {
            RTPCodecType::Audio => MediaKind::Audio,
            RTPCodecType::Video => MediaKind::Video,
            _ => MediaKind::Unknown,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        SdpKind::Pranswer => RTCSessionDescription::pranswer(desc.sdp)?,
        SdpKind::Rollback => bail!("rollback descriptions are not supported"),
    };
    Ok(rtc)
}

fn from_rtc_description(desc: RTCSessionDescription) -> Result<SessionDescription> {
    let kind = match desc.sdp_type {
        RTCSdpType::Offer => SdpKind::Offer,
        RTCSdpType::Answer => SdpKind::Answer,
        RTCSdpType::Pranswer => SdpKind::Pranswer,
        RTCSdpType::Rollback => SdpKind::Rollback,
        RTCSdpType::Unspecified => bail!("peer connection produced an untyped description"),
    };
    Ok(SessionDescription {
        kind,
        sdp: desc.sdp,
    })
}

fn to_rtc_candidate(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment,
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
