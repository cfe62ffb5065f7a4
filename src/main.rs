use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use vidscribe::api::{start_http_server, AppState};
use vidscribe::audio::AudioExtractor;
use vidscribe::config::Config;
use vidscribe::store::VideoStore;
use vidscribe::transcription::{TranscriptionService, WhisperClient};
use vidscribe::workflow::UploadWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("VIDSCRIBE_LOG_LEVEL")
                .unwrap_or_else(|_| "vidscribe=info,tower_http=info,warn".to_string()),
        )
        .init();

    let matches = Command::new("vidscribe")
        .version("0.1.0")
        .about("Video upload, transcription and AI text generation service")
        .subcommand(
            Command::new("serve").about("Start the HTTP API server").arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on (overrides config)"),
            ),
        )
        .subcommand(
            Command::new("process")
                .about("Run the upload workflow for a local video file")
                .arg(
                    Arg::new("video")
                        .value_name("FILE")
                        .help("Video file to process")
                        .required(true),
                )
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .value_name("KEYWORDS")
                        .help("Comma-separated keyword hint for transcription")
                        .default_value(""),
                )
                .arg(
                    Arg::new("print-transcript")
                        .long("print-transcript")
                        .help("Print the transcript to stdout")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let config = Config::load();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    match matches.subcommand() {
        Some(("process", sub)) => {
            let video_path = PathBuf::from(sub.get_one::<String>("video").unwrap());
            let prompt = sub.get_one::<String>("prompt").unwrap();
            let print_transcript = sub.get_flag("print-transcript");

            if !video_path.exists() {
                error!("Video file does not exist: {}", video_path.display());
                return Err(anyhow::anyhow!("video file not found"));
            }

            let store = VideoStore::new(config.storage.data_dir.clone()).await?;
            let whisper = Arc::new(WhisperClient::new(config.transcription.clone())?);
            let transcription = TranscriptionService::new(store.clone(), whisper);

            let mut workflow =
                UploadWorkflow::new(AudioExtractor::new(), store, transcription);

            info!("Processing video: {}", video_path.display());
            let outcome = workflow.run(&video_path, prompt).await?;

            info!("Upload complete, video id: {}", outcome.video_id);
            if print_transcript {
                println!("{}", outcome.transcription);
            }
        }
        _ => {
            let mut port = config.server.port;
            if let Some(("serve", sub)) = matches.subcommand() {
                if let Some(p) = sub.get_one::<String>("port") {
                    port = p.parse()?;
                }
            }

            let state = AppState::from_config(&config).await?;
            start_http_server(state, port).await?;
        }
    }

    Ok(())
}
