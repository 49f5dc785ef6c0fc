use crate::media::LocalStream;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media permission denied: {0}")]
    PermissionDenied(String),

    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("media source produced no tracks")]
    NoTracks,

    #[error("local stream has no track {0}")]
    UnknownTrack(String),

    #[error("failed to write sample: {0}")]
    Write(#[from] webrtc::Error),
}

/// Capture boundary: yields one audio/video stream on request.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalStream, MediaError>;
}

/// Source whose tracks are fed by the application through
/// [`LocalStream::write_sample`].
#[derive(Debug, Clone)]
pub struct SampleTrackSource {
    stream_id: String,
    video: bool,
    audio: bool,
}

impl SampleTrackSource {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            video: true,
            audio: true,
        }
    }

    pub fn with_video(mut self, enabled: bool) -> Self {
        self.video = enabled;
        self
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }
}

impl Default for SampleTrackSource {
    fn default() -> Self {
        Self::new("relaymesh-local")
    }
}

#[async_trait]
impl MediaSource for SampleTrackSource {
    async fn acquire(&self) -> Result<LocalStream, MediaError> {
        let mut tracks = Vec::new();

        if self.video {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    ..Default::default()
                },
                "video".to_owned(),
                self.stream_id.clone(),
            )));
        }

        if self.audio {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    ..Default::default()
                },
                "audio".to_owned(),
                self.stream_id.clone(),
            )));
        }

        if tracks.is_empty() {
            return Err(MediaError::NoTracks);
        }

        Ok(LocalStream::new(self.stream_id.clone(), tracks))
    }
}
