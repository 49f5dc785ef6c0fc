use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use colored::*;
use relaymesh::client::{
    ClientConfig, LocalStream, MediaSource, RecordingArtifact, RecordingSession, RemovalReason,
    Sample, SampleTrackSource, SessionEvent, TranscriptUploader, connect,
};
use relaymesh::model::RoomLinkTemplate;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Recorder chunk size used when replaying a file through a recording.
const FILE_CHUNK_SIZE: usize = 64 * 1024;

const VIDEO_SAMPLE_SIZE: usize = 4096;
const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Parser)]
#[command(name = "relaymesh")]
#[command(about = "Full-mesh WebRTC rooms over a signaling relay")]
struct Cli {
    #[arg(long, env = "RELAYMESH_RELAY_URL", global = true)]
    relay_url: Option<String>,

    #[arg(long, env = "RELAYMESH_UPLOAD_URL", global = true)]
    upload_url: Option<String>,

    #[arg(long, env = "RELAYMESH_ORIGIN", global = true)]
    origin: Option<String>,

    #[arg(long, env = "RELAYMESH_PATH", global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a room id and print its share link.
    Create,

    /// Join a room by id or link and stay until Ctrl-C.
    Join {
        room: String,

        /// Join receive-only.
        #[arg(long)]
        no_media: bool,

        /// Record the outgoing stream and upload it for a transcript on leave.
        #[arg(long, conflicts_with = "no_media")]
        record: bool,

        /// Send this file as the outgoing video samples.
        #[arg(long, conflicts_with = "no_media")]
        media_file: Option<PathBuf>,
    },

    /// Upload a recorded answer and print the transcript.
    Transcribe { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Commands::Create => {
            let (room, link) = config.links.create();
            println!("{} {}", "Room:".green().bold(), room);
            println!("{} {}", "Link:".green().bold(), link);
        }

        Commands::Join {
            room,
            no_media,
            record,
            media_file,
        } => join_room(&config, &room, no_media, record, media_file.as_deref()).await?,

        Commands::Transcribe { file } => transcribe(&config, &file).await?,
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid environment configuration")?;

    if let Some(url) = &cli.relay_url {
        config.relay_url = url.clone();
    }
    if let Some(url) = &cli.upload_url {
        config.upload_url = url.clone();
    }
    if cli.origin.is_some() || cli.path.is_some() {
        let origin = cli
            .origin
            .clone()
            .unwrap_or_else(|| config.links.origin().to_owned());
        let path = cli
            .path
            .clone()
            .unwrap_or_else(|| config.links.path().to_owned());
        config.links = RoomLinkTemplate::new(origin, path);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn join_room(
    config: &ClientConfig,
    input: &str,
    no_media: bool,
    record: bool,
    media_file: Option<&Path>,
) -> Result<()> {
    let room = RoomLinkTemplate::resolve(input).context("Not a room id or join link")?;

    let local_stream = if no_media {
        None
    } else {
        match SampleTrackSource::default().acquire().await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Continuing without local media: {}", e);
                None
            }
        }
    };

    let feeder = match (&local_stream, media_file) {
        (Some(stream), Some(path)) => {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(tokio::spawn(feed_video(stream.clone(), Bytes::from(data))))
        }
        (None, Some(_)) => {
            warn!("No local stream, not sending the media file");
            None
        }
        _ => None,
    };

    let recording = match (&local_stream, record) {
        (Some(stream), true) => {
            println!("{} {}", "Recording".magenta().bold(), stream.id());
            Some(RecordingSession::start(stream).await)
        }
        (None, true) => {
            warn!("No local stream, nothing to record");
            None
        }
        _ => None,
    };

    println!("{} {}", "Connecting to".cyan(), config.relay_url);
    let mut handle = connect(config, local_stream).await?;
    let link = handle.join(room.clone()).await?;
    println!("{} {}", "Invite:".green().bold(), link);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Leaving room...".yellow());
                handle.shutdown().await?;
                break;
            }

            event = handle.next_event() => {
                let Some(event) = event else { break };
                if !print_event(&event) {
                    break;
                }
            }
        }
    }

    if let Some(feeder) = feeder {
        feeder.abort();
    }
    if let Some(recording) = recording {
        let artifact = recording.stop();
        if artifact.is_empty() {
            warn!("Recording is empty, skipping upload");
        } else {
            upload_for_transcript(config, artifact).await?;
        }
    }

    Ok(())
}

/// Writes `data` to the video track in frame-sized samples at a steady rate.
async fn feed_video(stream: LocalStream, data: Bytes) {
    let mut ticker = tokio::time::interval(VIDEO_FRAME_INTERVAL);
    for chunk in data.chunks(VIDEO_SAMPLE_SIZE) {
        ticker.tick().await;
        let sample = Sample {
            data: data.slice_ref(chunk),
            duration: VIDEO_FRAME_INTERVAL,
            ..Default::default()
        };
        if let Err(e) = stream.write_sample("video", sample).await {
            warn!("Stopped sending media file: {}", e);
            return;
        }
    }
    info!("Media file sent ({} bytes)", data.len());
}

/// Returns `false` once the session is over.
fn print_event(event: &SessionEvent) -> bool {
    match event {
        SessionEvent::LocalIdentity(id) => println!("{} {}", "You are".green(), id),
        SessionEvent::JoinRequested { room, .. } => println!("{} {}", "Joining".cyan(), room),
        SessionEvent::PeerAdded { peer, role } => {
            println!("{} {} ({:?})", "+".green().bold(), peer, role)
        }
        SessionEvent::RemoteStreamAttached { peer, stream } => println!(
            "{} {} sends {} track(s) on {}",
            "~".cyan(),
            peer,
            stream.tracks().len(),
            stream.id()
        ),
        SessionEvent::PeerRemoved { peer, reason } => {
            let why = match reason {
                RemovalReason::Left => "left".to_owned(),
                RemovalReason::Failed(e) => format!("failed: {}", e),
                RemovalReason::ChannelClosed => "relay closed".to_owned(),
                RemovalReason::Shutdown => "shutdown".to_owned(),
            };
            println!("{} {} {}", "-".red().bold(), peer, why);
        }
        SessionEvent::ChannelClosed => {
            println!("{}", "Relay connection closed".red());
            return false;
        }
    }
    true
}

async fn transcribe(config: &ClientConfig, file: &Path) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut recording = RecordingSession::new("file");
    for chunk in data.chunks(FILE_CHUNK_SIZE) {
        recording.push_chunk(Bytes::copy_from_slice(chunk));
    }
    upload_for_transcript(config, recording.stop()).await
}

async fn upload_for_transcript(config: &ClientConfig, artifact: RecordingArtifact) -> Result<()> {
    let uploader = TranscriptUploader::new(config.upload_endpoint()?);
    println!(
        "{} {} bytes to {}",
        "Uploading".cyan(),
        artifact.len(),
        uploader.endpoint()
    );

    let transcript = uploader
        .submit(artifact)
        .await
        .context("Transcript upload failed")?;
    println!("{}", "Transcript:".green().bold());
    println!("{}", transcript);
    Ok(())
}
