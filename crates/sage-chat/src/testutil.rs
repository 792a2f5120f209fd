//! Scripted backend double shared by the session and controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::{ChatBackend, Content, SessionHandle, SYSTEM_INSTRUCTION};
use crate::error::ChatError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailureMode {
    None,
    CreateAlways,
    CreateOnce,
    SendAlways,
    SendOnce,
}

/// In-memory [`ChatBackend`] with scripted replies and failure modes.
pub struct MockBackend {
    reply: String,
    failure: Mutex<FailureMode>,
    failure_message: String,
    sessions_created: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Backend that always succeeds and returns `reply` for every prompt.
    pub fn replying(reply: &str) -> Self {
        Self::new(reply, FailureMode::None, "")
    }

    /// Backend whose session creation always fails.
    pub fn failing_create(message: &str) -> Self {
        Self::new("ok", FailureMode::CreateAlways, message)
    }

    /// Backend whose first session creation fails, then recovers.
    pub fn failing_create_once(message: &str) -> Self {
        Self::new("ok", FailureMode::CreateOnce, message)
    }

    /// Backend that always fails sends (sessions create fine).
    pub fn failing_send(message: &str) -> Self {
        Self::new("ok", FailureMode::SendAlways, message)
    }

    /// Backend whose first send fails, then recovers.
    pub fn failing_send_once(message: &str) -> Self {
        Self::new("ok", FailureMode::SendOnce, message)
    }

    fn new(reply: &str, failure: FailureMode, failure_message: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: Mutex::new(failure),
            failure_message: failure_message.to_string(),
            sessions_created: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of sessions successfully created.
    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    /// All prompts dispatched through `send`, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts mutex poisoned").clone()
    }

    fn take_failure(&self, once: FailureMode, always: FailureMode) -> bool {
        let mut guard = self.failure.lock().expect("failure mutex poisoned");
        match *guard {
            mode if mode == always => true,
            mode if mode == once => {
                *guard = FailureMode::None;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn create_session(&self) -> Result<SessionHandle, ChatError> {
        if self.take_failure(FailureMode::CreateOnce, FailureMode::CreateAlways) {
            return Err(ChatError::Connection(self.failure_message.clone()));
        }
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(SessionHandle {
            id: Uuid::new_v4(),
            history: vec![
                Content::user(SYSTEM_INSTRUCTION),
                Content::model("Welcome! I am Sikkim Sage."),
            ],
        })
    }

    async fn send(&self, session: &mut SessionHandle, prompt: &str) -> Result<String, ChatError> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.take_failure(FailureMode::SendOnce, FailureMode::SendAlways) {
            return Err(ChatError::Send(self.failure_message.clone()));
        }
        self.prompts
            .lock()
            .expect("prompts mutex poisoned")
            .push(prompt.to_string());
        session.history.push(Content::user(prompt));
        session.history.push(Content::model(self.reply.clone()));
        Ok(self.reply.clone())
    }
}
