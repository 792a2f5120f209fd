//! Sikkim Sage application binary - composition root.
//!
//! Ties the Sage crates together into a terminal chat client:
//! 1. Load configuration from TOML
//! 2. Open the conversation snapshot store under the data directory
//! 3. Build the Gemini backend (or an offline stand-in when no key is set)
//! 4. Run a read-eval loop over stdin, with `/map`, `/voice`, and `/quit`
//!    commands alongside free-form travel questions

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use sage_chat::backend::{ChatBackend, GeminiClient, SessionHandle};
use sage_chat::{format, ChatController, ChatError, FileSnapshotStore};
use sage_core::config::SageConfig;
use sage_core::events::UiEvent;
use sage_core::types::{Message, Sender};
use sage_voice::{TranscriptEvent, UnsupportedRecognizer, VoiceInputAdapter};

/// Backend stand-in used when no API key is configured.
///
/// Every call fails with the configuration error, which drives the
/// controller into its local canned-answer mode.
struct OfflineBackend {
    reason: String,
}

#[async_trait]
impl ChatBackend for OfflineBackend {
    async fn create_session(&self) -> Result<SessionHandle, ChatError> {
        Err(ChatError::Configuration(self.reason.clone()))
    }

    async fn send(&self, _session: &mut SessionHandle, _prompt: &str) -> Result<String, ChatError> {
        Err(ChatError::Configuration(self.reason.clone()))
    }
}

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Resolve the config file path (SAGE_CONFIG env, or ~/.sage/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("SAGE_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".sage").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".sage").join("config.toml");
    }
    PathBuf::from("config.toml")
}

fn print_message(message: &Message) {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "sage",
    };
    let text = format(&message.text).plain_text();
    println!("[{}] {}", who, text);
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Sikkim Sage v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = SageConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Snapshot storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let snapshot = FileSnapshotStore::new(&data_dir)?;
    tracing::info!(path = %data_dir.display(), "Snapshot store opened");

    // Backend: real Gemini client, or the offline stand-in without a key.
    let backend: Arc<dyn ChatBackend> = match GeminiClient::new(&config.backend) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "Remote backend unavailable, answering locally");
            Arc::new(OfflineBackend {
                reason: e.to_string(),
            })
        }
    };

    // Controller.
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    let mut controller =
        ChatController::new(backend, Box::new(snapshot), config.chat.clone()).with_events(ui_tx);
    controller.start().await;

    // Voice input. No terminal speech capture exists, so the unsupported
    // recognizer stands in; `/voice` demonstrates the capability report.
    let (voice_tx, mut voice_rx) = mpsc::unbounded_channel();
    let voice = VoiceInputAdapter::new(Arc::new(UnsupportedRecognizer), voice_tx);
    if config.voice.enabled {
        tracing::debug!(language = %config.voice.language, "Voice input ready");
    }

    // Show the restored (or freshly greeted) conversation.
    for message in controller.messages() {
        print_message(message);
    }
    println!("Commands: /map, /voice, /quit");
    print_prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                let before = controller.messages().len();
                match line.trim() {
                    "/quit" => break,
                    "/map" => controller.map_shortcut(),
                    "/voice" => {
                        if !config.voice.enabled {
                            println!("Voice input is disabled in the configuration.");
                        } else {
                            match voice.toggle() {
                                Ok(state) => controller
                                    .on_listening_changed(state == sage_voice::ListenState::Listening),
                                Err(e) => controller.handle_voice_error(&e.to_string()),
                            }
                        }
                    }
                    text => controller.submit(text).await,
                }
                for message in &controller.messages()[before.min(controller.messages().len())..] {
                    if message.sender == Sender::Bot {
                        print_message(message);
                    }
                }
                print_prompt();
            }
            event = voice_rx.recv() => {
                match event {
                    Some(TranscriptEvent::Transcript(text)) => {
                        let before = controller.messages().len();
                        controller.on_transcript(&text).await;
                        for message in &controller.messages()[before..] {
                            print_message(message);
                        }
                        print_prompt();
                    }
                    Some(TranscriptEvent::Error(detail)) => {
                        controller.handle_voice_error(&detail);
                        if let Some(message) = controller.messages().last() {
                            print_message(message);
                        }
                        print_prompt();
                    }
                    None => break,
                }
            }
        }

        // Surface UI events raised by the last command.
        while let Ok(event) = ui_rx.try_recv() {
            if let UiEvent::NavigateRequested { destination } = event {
                println!("(navigate to {})", destination.route());
                print_prompt();
            }
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
