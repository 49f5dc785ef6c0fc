use crate::media::MediaError;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use webrtc::media::Sample;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// The locally captured stream.
///
/// Cloning is cheap and every clone refers to the same tracks: each peer
/// session binds the tracks to its own connection and never stops them.
/// Samples written through [`LocalStream::write_sample`] also reach every
/// open tap, which is how a recording follows the outgoing media.
#[derive(Clone)]
pub struct LocalStream {
    id: String,
    tracks: Vec<Arc<TrackLocalStaticSample>>,
    taps: Arc<Mutex<Vec<mpsc::UnboundedSender<Bytes>>>>,
}

impl LocalStream {
    pub fn new(id: impl Into<String>, tracks: Vec<Arc<TrackLocalStaticSample>>) -> Self {
        Self {
            id: id.into(),
            tracks,
            taps: Arc::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<TrackLocalStaticSample>] {
        &self.tracks
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.id().to_owned()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sends one encoded sample on the track named `track_id`.
    pub async fn write_sample(&self, track_id: &str, sample: Sample) -> Result<(), MediaError> {
        let track = self
            .tracks
            .iter()
            .find(|t| t.id() == track_id)
            .ok_or_else(|| MediaError::UnknownTrack(track_id.to_owned()))?;

        {
            let mut taps = self.taps.lock().await;
            // A dropped receiver closes its tap
            taps.retain(|tap| tap.send(sample.data.clone()).is_ok());
        }

        track.write_sample(&sample).await?;
        Ok(())
    }

    /// Opens a tap that receives the payload of every sample written from now on.
    pub async fn tap(&self) -> mpsc::UnboundedReceiver<Bytes> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut taps = self.taps.lock().await;
        taps.push(tx);
        debug!("Stream {} has {} tap(s)", self.id, taps.len());
        rx
    }
}

impl fmt::Debug for LocalStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStream")
            .field("id", &self.id)
            .field("tracks", &self.track_ids())
            .finish()
    }
}
