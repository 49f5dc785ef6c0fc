use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use bytes::Bytes;
use relaymesh_client::{
    MediaSource, RecordingSession, SampleTrackSource, TranscriptUploader, UploadError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;
use webrtc::media::Sample;

use crate::integration::init_tracing;

#[derive(Debug, Clone, Default)]
struct ReceivedFile {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

type Received = Arc<Mutex<Vec<ReceivedFile>>>;

async fn answer_video(State(received): State<Received>, mut multipart: Multipart) -> String {
    while let Ok(Some(field)) = multipart.next_field().await {
        let file = ReceivedFile {
            field: field.name().unwrap_or_default().to_owned(),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(str::to_owned),
            data: field.bytes().await.unwrap().to_vec(),
        };
        received.lock().await.push(file);
    }
    "hello from the transcript".to_owned()
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "whisper is down")
}

async fn spawn_upload_server() -> (Url, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/api/interview/answer-video", post(answer_video))
        .route("/broken", post(broken))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{}/", addr)).unwrap();
    (base, received)
}

#[tokio::test]
async fn test_recording_uploaded_as_single_multipart_file() {
    init_tracing();

    let (base, received) = spawn_upload_server().await;
    let uploader = TranscriptUploader::new(base.join("api/interview/answer-video").unwrap());

    let mut recording = RecordingSession::new("local");
    recording.push_chunk(Bytes::from_static(b"\x1a\x45\xdf\xa3"));
    recording.push_chunk(Bytes::new());
    recording.push_chunk(Bytes::from_static(b"cluster"));

    let transcript = uploader
        .submit(recording.stop())
        .await
        .expect("upload should succeed");
    assert_eq!(transcript, "hello from the transcript");

    let files = received.lock().await.clone();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].field, "file");
    assert_eq!(files[0].file_name.as_deref(), Some("answer.webm"));
    assert_eq!(files[0].content_type.as_deref(), Some("video/webm"));
    assert_eq!(files[0].data, b"\x1a\x45\xdf\xa3cluster".to_vec());
}

#[tokio::test]
async fn test_samples_sent_on_local_stream_are_uploaded() {
    init_tracing();

    let (base, received) = spawn_upload_server().await;
    let uploader = TranscriptUploader::new(base.join("api/interview/answer-video").unwrap());

    let stream = SampleTrackSource::default().acquire().await.unwrap();
    let frame = |data: &'static [u8]| Sample {
        data: Bytes::from_static(data),
        duration: Duration::from_millis(33),
        ..Default::default()
    };

    // Not part of the recording
    stream.write_sample("video", frame(b"warmup")).await.unwrap();

    let recording = RecordingSession::start(&stream).await;
    stream.write_sample("video", frame(b"frame-1;")).await.unwrap();
    stream.write_sample("audio", frame(b"voice;")).await.unwrap();
    stream.write_sample("video", frame(b"frame-2")).await.unwrap();
    let artifact = recording.stop();

    stream.write_sample("video", frame(b"after")).await.unwrap();

    let transcript = uploader.submit(artifact).await.expect("upload should succeed");
    assert_eq!(transcript, "hello from the transcript");

    let files = received.lock().await.clone();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].data, b"frame-1;voice;frame-2".to_vec());
}

#[tokio::test]
async fn test_non_success_status_surfaces_error() {
    init_tracing();

    let (base, _) = spawn_upload_server().await;
    let uploader = TranscriptUploader::new(base.join("broken").unwrap());

    let mut recording = RecordingSession::new("local");
    recording.push_chunk(Bytes::from_static(b"data"));
    let artifact = recording.stop();

    let err = uploader.submit(artifact.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        UploadError::Status { status: 500, ref body } if body == "whisper is down"
    ));

    assert_eq!(uploader.submit_or_empty(artifact).await, "");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_error() {
    init_tracing();

    // Nothing listens on the discard port
    let uploader = TranscriptUploader::new(Url::parse("http://127.0.0.1:9/upload").unwrap());
    let err = uploader
        .submit(RecordingSession::new("local").stop())
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Request(_)));
}
