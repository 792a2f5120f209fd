//! Conversation controller.
//!
//! Central coordinator for the chat widget: owns the session manager, the
//! intent classifier, the canned response bank, the message store, and the
//! per-message view state. The UI layer drives it with user turns and reads
//! back the ordered message log plus `UiEvent`s.
//!
//! Failure policy: a send failure on an established session appends exactly
//! one bot-authored apology and leaves the conversation usable. When no
//! session can be created the controller answers from the response bank by
//! intent instead; a missing credential makes that local mode permanent,
//! while connection failures are retried with a fresh session attempt on
//! every following turn.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use sage_core::config::ChatConfig;
use sage_core::events::UiEvent;
use sage_core::types::{Message, NavigationTarget};

use crate::backend::ChatBackend;
use crate::classifier::{Intent, IntentClassifier};
use crate::format::{format, truncate_plain};
use crate::responses::ResponseBank;
use crate::session::SessionManager;
use crate::store::{MessageStore, SnapshotStore};

/// Bot reply appended when a dispatched turn fails.
pub const APOLOGY: &str = "I apologize, but I could not process your request at the moment.";

/// Bot notice appended when the controller falls back to local mode.
pub const DEGRADED_NOTICE: &str =
    "I'm having trouble reaching the travel service right now, so I'll answer \
     from my local notes. Ask me about trekking, food, permits, weather, \
     places to stay, or trip planning!";

// =============================================================================
// ChatController
// =============================================================================

/// Orchestrates one conversation from user input to stored reply.
pub struct ChatController {
    session: SessionManager,
    classifier: IntentClassifier,
    bank: ResponseBank,
    store: MessageStore,
    config: ChatConfig,
    expanded: HashSet<Uuid>,
    events: Option<mpsc::UnboundedSender<UiEvent>>,
    /// Sticky: no credential is configured, remote dispatch is off for good.
    local_only: bool,
    /// The last session attempt failed; retried on the next turn.
    degraded: bool,
    busy: bool,
    turn: usize,
}

impl ChatController {
    /// Build the controller, restoring any prior conversation from the
    /// snapshot. An empty conversation is seeded with the greeting.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        snapshot: Box<dyn SnapshotStore>,
        config: ChatConfig,
    ) -> Self {
        let mut store = MessageStore::open(snapshot, config.snapshot_key.clone());
        if store.is_empty() {
            store.append(Message::from_bot(config.greeting.clone()));
        }
        Self {
            session: SessionManager::new(backend),
            classifier: IntentClassifier::new(),
            bank: ResponseBank::new(),
            store,
            config,
            expanded: HashSet::new(),
            events: None,
            local_only: false,
            degraded: false,
            busy: false,
            turn: 0,
        }
    }

    /// Attach the UI event channel. Emission is best-effort; a closed
    /// receiver is ignored.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<UiEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Eagerly create the remote session.
    ///
    /// On failure the controller enters local mode and appends a
    /// plain-language notice; it never crashes or refuses turns. A missing
    /// credential disables remote dispatch permanently, while a connection
    /// failure is retried with a fresh session attempt on the next turn.
    pub async fn start(&mut self) {
        match self.session.ensure_session().await {
            Ok(()) => {
                tracing::info!("Chat session established");
                self.emit(UiEvent::SessionReady);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat session unavailable, entering local mode");
                if e.is_configuration() {
                    self.local_only = true;
                }
                self.degraded = true;
                self.append_bot(Message::from_bot(DEGRADED_NOTICE));
                self.emit(UiEvent::SessionFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    // =========================================================================
    // User turns
    // =========================================================================

    /// Process one user turn.
    ///
    /// Empty or whitespace-only input is a no-op: nothing is appended and
    /// no remote call is made. Backend failures append exactly one apology.
    pub async fn submit(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let intent = self.classifier.classify(text);
        tracing::debug!(?intent, "User turn classified");

        let user = Message::from_user(text);
        self.emit(UiEvent::MessageAppended { message_id: user.id });
        self.store.append(user);
        self.turn += 1;

        if self.local_only {
            self.answer_locally(intent);
            self.emit(UiEvent::ReplyArrived);
            return;
        }

        // Dispatch even after an earlier failed attempt: `send` re-creates
        // the session on demand when none exists.
        self.emit(UiEvent::ReplyPending);
        self.busy = true;
        let prompt = self.classifier.build_prompt(intent, text);
        let outcome = self.session.send(&prompt).await;
        self.busy = false;

        match outcome {
            Ok(reply) => {
                self.degraded = false;
                self.append_bot(
                    Message::from_bot(reply).with_itinerary(intent == Intent::Itinerary),
                );
                self.emit(UiEvent::ReplyArrived);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn dispatch failed");
                if e.is_configuration() {
                    // Credentials will not appear mid-conversation; stop
                    // dispatching and answer locally from here on.
                    self.local_only = true;
                    self.degraded = true;
                    self.append_bot(Message::from_bot(APOLOGY));
                } else if !self.session.has_session() {
                    // Session creation failed again; answer this turn from
                    // the bank and retry the session on the next one.
                    self.degraded = true;
                    self.answer_locally(intent);
                } else {
                    self.append_bot(Message::from_bot(APOLOGY));
                }
                self.emit(UiEvent::ReplyArrived);
            }
        }
    }

    /// Feed a final voice transcript into the conversation as typed text.
    pub async fn on_transcript(&mut self, transcript: &str) {
        self.emit(UiEvent::TranscriptReceived {
            text: transcript.to_string(),
        });
        self.submit(transcript).await;
    }

    /// Mirror a microphone toggle outcome into the UI event stream.
    pub fn on_listening_changed(&self, listening: bool) {
        if listening {
            self.emit(UiEvent::ListeningStarted);
        } else {
            self.emit(UiEvent::ListeningStopped);
        }
    }

    /// Surface a voice recognition failure as a bot-authored message.
    pub fn handle_voice_error(&mut self, detail: &str) {
        tracing::warn!(detail, "Voice recognition failed");
        self.append_bot(Message::from_bot(format_voice_error(detail)));
    }

    /// Request navigation to the monastery map.
    pub fn map_shortcut(&self) {
        self.emit(UiEvent::NavigateRequested {
            destination: NavigationTarget::MonasteryMap,
        });
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    /// Ordered conversation log.
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Whether a remote request is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the controller is answering from the local response bank.
    pub fn is_degraded(&self) -> bool {
        self.degraded || self.local_only
    }

    // =========================================================================
    // Display and view state
    // =========================================================================

    /// Toggle the expand/collapse view state for one message.
    ///
    /// Pure view state: no message content changes, and no other message
    /// is affected.
    pub fn toggle_expanded(&mut self, message_id: Uuid) {
        if !self.expanded.remove(&message_id) {
            self.expanded.insert(message_id);
        }
    }

    /// Whether a message is currently expanded.
    pub fn is_expanded(&self, message_id: Uuid) -> bool {
        self.expanded.contains(&message_id)
    }

    /// Plain display text for a message, truncated to the configured
    /// character budget unless expanded. The boolean reports whether the
    /// text was cut (the expand affordance should be shown).
    pub fn display_text(&self, message_id: Uuid) -> Option<(String, bool)> {
        let message = self.store.messages().iter().find(|m| m.id == message_id)?;
        let plain = format(&message.text).plain_text();
        if self.is_expanded(message_id) {
            return Some((plain, false));
        }
        match truncate_plain(&plain, self.config.truncate_chars) {
            Some(cut) => Some((cut, true)),
            None => Some((plain, false)),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn answer_locally(&mut self, intent: Intent) {
        let reply = self.bank.compose(intent, self.turn - 1);
        self.append_bot(Message::from_bot(reply).with_itinerary(intent == Intent::Itinerary));
    }

    fn append_bot(&mut self, message: Message) {
        self.emit(UiEvent::MessageAppended {
            message_id: message.id,
        });
        self.store.append(message);
    }

    fn emit(&self, event: UiEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

fn format_voice_error(detail: &str) -> String {
    format!(
        "Sorry, I couldn't make out what you said ({}). Please try again or type your question.",
        detail
    )
}

// =============================================================================
// Tests
// =============================================================================
