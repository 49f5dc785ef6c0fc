use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Unknown,
}

/// A track received from a remote participant.
pub trait MediaTrack: Send + Sync + fmt::Debug {
    fn id(&self) -> String;

    fn stream_id(&self) -> String;

    fn kind(&self) -> MediaKind;

    /// Access to the concrete track, e.g. to read RTP from an `RtcRemoteTrack`.
    fn as_any(&self) -> &dyn Any;
}

/// The stream a remote participant sends us, assembled track by track.
#[derive(Debug, Clone)]
pub struct RemoteStream {
    id: String,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl RemoteStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn has_track(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id() == track_id)
    }

    /// Returns `false` when the track is already part of the stream.
    pub fn attach(&mut self, track: Arc<dyn MediaTrack>) -> bool {
        if self.has_track(&track.id()) {
            return false;
        }
        self.tracks.push(track);
        true
    }
}
