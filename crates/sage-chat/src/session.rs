//! Session lifecycle management.
//!
//! Owns the optional remote session handle: create once (eagerly at startup
//! or lazily on the first send), reuse for the widget lifetime, surface
//! failures to the caller. No retry policy; a failed attempt is reported
//! immediately and the next send simply tries again.

use std::sync::Arc;

use crate::backend::{ChatBackend, SessionHandle};
use crate::error::ChatError;

/// Manages the single remote conversation session.
///
/// At most one session exists per controller lifetime; re-creation only
/// occurs when no session exists at send time.
pub struct SessionManager {
    backend: Arc<dyn ChatBackend>,
    session: Option<SessionHandle>,
}

impl SessionManager {
    /// Create a manager with no active session.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    /// Whether a session handle currently exists.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Create the session if none exists. Single attempt, no retry.
    pub async fn ensure_session(&mut self) -> Result<(), ChatError> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self.backend.create_session().await?;
        self.session = Some(session);
        Ok(())
    }

    /// Send a prompt, creating the session on demand if needed.
    ///
    /// Rejects empty prompts before any network dispatch.
    pub async fn send(&mut self, prompt: &str) -> Result<String, ChatError> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.ensure_session().await?;
        let session = self.session.as_mut().ok_or(ChatError::NoSession)?;
        self.backend.send(session, prompt).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBackend;

    // ---- Session creation ----

    #[tokio::test]
    async fn test_ensure_session_creates_once() {
        let backend = Arc::new(MockBackend::replying("ok"));
        let mut manager = SessionManager::new(backend.clone());
        assert!(!manager.has_session());

        manager.ensure_session().await.unwrap();
        assert!(manager.has_session());

        manager.ensure_session().await.unwrap();
        assert_eq!(backend.sessions_created(), 1);
    }

    #[tokio::test]
    async fn test_ensure_session_failure_surfaces() {
        let backend = Arc::new(MockBackend::failing_create("unreachable"));
        let mut manager = SessionManager::new(backend);
        let err = manager.ensure_session().await.unwrap_err();
        assert!(matches!(err, ChatError::Connection(_)));
        assert!(!manager.has_session());
    }

    // ---- Sending ----

    #[tokio::test]
    async fn test_send_creates_session_lazily() {
        let backend = Arc::new(MockBackend::replying("Namaste!"));
        let mut manager = SessionManager::new(backend.clone());

        let reply = manager.send("hello").await.unwrap();
        assert_eq!(reply, "Namaste!");
        assert!(manager.has_session());
        assert_eq!(backend.sessions_created(), 1);
    }

    #[tokio::test]
    async fn test_send_reuses_session() {
        let backend = Arc::new(MockBackend::replying("ok"));
        let mut manager = SessionManager::new(backend.clone());

        manager.send("first").await.unwrap();
        manager.send("second").await.unwrap();
        assert_eq!(backend.sessions_created(), 1);
        assert_eq!(backend.prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_send_empty_prompt_rejected_without_dispatch() {
        let backend = Arc::new(MockBackend::replying("ok"));
        let mut manager = SessionManager::new(backend.clone());

        let err = manager.send("   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
        assert_eq!(backend.sessions_created(), 0);
        assert!(backend.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_does_not_poison_later_sends() {
        let backend = Arc::new(MockBackend::failing_send_once("flaky"));
        let mut manager = SessionManager::new(backend);

        let err = manager.send("first").await.unwrap_err();
        assert!(matches!(err, ChatError::Send(_)));

        // Session still exists; the next turn succeeds.
        assert!(manager.has_session());
        let reply = manager.send("second").await.unwrap();
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_then_success_on_next_send() {
        let backend = Arc::new(MockBackend::failing_create_once("cold start"));
        let mut manager = SessionManager::new(backend.clone());

        assert!(manager.send("hello").await.is_err());
        assert!(!manager.has_session());

        // Lazy fallback: the next send creates the session on demand.
        let reply = manager.send("hello again").await.unwrap();
        assert!(!reply.is_empty());
        assert!(manager.has_session());
    }
}
