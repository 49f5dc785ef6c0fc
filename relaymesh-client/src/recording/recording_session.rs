use crate::media::LocalStream;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const RECORDING_MIME: &str = "video/webm";
pub const RECORDING_FILE_NAME: &str = "answer.webm";

/// A finished recording, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: String,
}

impl RecordingArtifact {
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            mime_type: RECORDING_MIME.to_owned(),
            file_name: RECORDING_FILE_NAME.to_owned(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One start/stop cycle of the recorder.
///
/// Chunks are opaque encoder output and are kept in arrival order. Each
/// recording owns its buffer, so a new recording never sees old chunks.
#[derive(Debug)]
pub struct RecordingSession {
    stream_id: String,
    chunks: Vec<Bytes>,
    source: Option<mpsc::UnboundedReceiver<Bytes>>,
}

impl RecordingSession {
    pub fn new(stream_id: impl Into<String>) -> Self {
        let stream_id = stream_id.into();
        info!("Recording started for stream {}", stream_id);
        Self {
            stream_id,
            chunks: Vec::new(),
            source: None,
        }
    }

    /// Starts recording every sample later written to `stream`.
    pub async fn start(stream: &LocalStream) -> Self {
        let mut recording = Self::new(stream.id());
        recording.source = Some(stream.tap().await);
        recording
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn push_chunk(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.push(chunk);
    }

    /// Moves chunks the stream tap has delivered so far into the buffer.
    pub fn collect(&mut self) {
        let Some(mut source) = self.source.take() else {
            return;
        };
        while let Ok(chunk) = source.try_recv() {
            self.push_chunk(chunk);
        }
        self.source = Some(source);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn buffered_len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    /// Ends the recording; the stream tap is closed with it.
    pub fn stop(mut self) -> RecordingArtifact {
        self.collect();
        self.source = None;

        let mut data = BytesMut::with_capacity(self.buffered_len());
        for chunk in &self.chunks {
            data.extend_from_slice(chunk);
        }
        debug!(
            "Recording for stream {} stopped: {} chunk(s), {} bytes",
            self.stream_id,
            self.chunks.len(),
            data.len()
        );
        RecordingArtifact::new(data.freeze())
    }
}
