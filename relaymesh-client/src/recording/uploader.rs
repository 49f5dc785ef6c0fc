use crate::recording::RecordingArtifact;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Posts finished recordings to the transcription endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptUploader {
    http: reqwest::Client,
    endpoint: Url,
}

impl TranscriptUploader {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads `artifact` as multipart field `file` and returns the plain-text
    /// transcript. No retries.
    pub async fn submit(&self, artifact: RecordingArtifact) -> Result<String, UploadError> {
        let size = artifact.len();
        let part = Part::bytes(artifact.data.to_vec())
            .file_name(artifact.file_name)
            .mime_str(&artifact.mime_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            "Uploaded {} byte recording, transcript is {} chars",
            size,
            body.chars().count()
        );
        Ok(body)
    }

    /// Like [`TranscriptUploader::submit`] but reports failure as an empty
    /// transcript.
    pub async fn submit_or_empty(&self, artifact: RecordingArtifact) -> String {
        match self.submit(artifact).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("Transcript upload failed: {}", e);
                String::new()
            }
        }
    }
}
