//! Remote conversation backend client.
//!
//! Defines the [`ChatBackend`] trait the session manager dispatches through,
//! plus the [`GeminiClient`] implementation speaking the generative-language
//! `generateContent` contract over HTTP. The backend is an opaque RPC
//! collaborator: plain prompt text in, plain reply text out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sage_core::config::BackendConfig;

use crate::error::ChatError;

/// Fixed persona instruction sent as the first message of every new session.
pub const SYSTEM_INSTRUCTION: &str = "You are a friendly, expert travel guide for Sikkim tourism. Your name is 'Sikkim Sage'. \
Your purpose is to assist users in planning their trips to Sikkim. You should be able to:\n\
1. Answer questions about tourist spots, local culture, cuisine, weather, and best times to visit.\n\
2. Help create custom travel itineraries based on user preferences (duration, interests, budget).\n\
3. Provide practical travel advice including transportation, accommodations, and permits.\n\
4. Maintain a positive, helpful, and engaging tone.\n\
5. Structure longer answers with bullet points or numbered lists for readability.\n\
6. Do not answer questions unrelated to Sikkim or tourism. Gently steer the conversation back to planning a trip to Sikkim.\n\
7. Start your very first response with a warm welcome and introduce yourself.";

/// Reply used when the backend returns blank text for a successful call.
pub const BLANK_REPLY_FALLBACK: &str =
    "I apologize, but I could not process your request at the moment.";

// =============================================================================
// Wire types
// =============================================================================

/// One part of a conversation turn (text only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One conversation turn on the wire. Role is `user` or `model`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// =============================================================================
// SessionHandle
// =============================================================================

/// Opaque handle to a remote conversation.
///
/// Holds the full turn history replayed on every send. Created lazily on the
/// first user interaction (or eagerly at startup), reused for the widget
/// lifetime, never explicitly closed; the backend owns cleanup.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    /// Local identifier for logging.
    pub id: Uuid,
    /// Ordered turn history, starting with the persona instruction.
    pub history: Vec<Content>,
}

impl SessionHandle {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
        }
    }
}

// =============================================================================
// ChatBackend trait
// =============================================================================

/// The remote conversation collaborator.
///
/// `create_session` performs the persona handshake; `send` dispatches one
/// prompt within an existing session. Neither retries: failure is surfaced
/// immediately for the controller to turn into a bot-authored message.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Create a new session, sending the persona instruction as its first
    /// message. Fails with `Connection` if the backend is unreachable.
    async fn create_session(&self) -> Result<SessionHandle, ChatError>;

    /// Send one prompt within the session and return the reply text.
    /// Fails with `Send` on backend failure.
    async fn send(&self, session: &mut SessionHandle, prompt: &str) -> Result<String, ChatError>;
}

// =============================================================================
// GeminiClient
// =============================================================================

/// HTTP client for the generative-language API.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_output_tokens: u32,
    temperature: f64,
}

impl GeminiClient {
    /// Build a client from backend configuration.
    ///
    /// Fails with `Configuration` if no credential is available; this is the
    /// single fatal configuration error of the system and must be surfaced
    /// as a bot message rather than a crash.
    pub fn new(config: &BackendConfig) -> Result<Self, ChatError> {
        let api_key = config
            .resolve_api_key()
            .map_err(|e| ChatError::Configuration(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    /// POST the session history and return the first candidate's text.
    async fn generate(&self, history: &[Content]) -> Result<String, ChatError> {
        let request = GenerateContentRequest {
            contents: history,
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Send(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Send(e.to_string()))?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Ok(BLANK_REPLY_FALLBACK.to_string())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn create_session(&self) -> Result<SessionHandle, ChatError> {
        let mut session = SessionHandle::new();
        session.history.push(Content::user(SYSTEM_INSTRUCTION));

        let reply = self
            .generate(&session.history)
            .await
            .map_err(|e| match e {
                // Any failure during the handshake reads as a connection
                // problem to the caller.
                ChatError::Send(msg) | ChatError::Connection(msg) => ChatError::Connection(msg),
                other => other,
            })?;
        session.history.push(Content::model(reply));

        tracing::info!(session_id = %session.id, "Chat session created");
        Ok(session)
    }

    async fn send(&self, session: &mut SessionHandle, prompt: &str) -> Result<String, ChatError> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        session.history.push(Content::user(prompt));
        match self.generate(&session.history).await {
            Ok(reply) => {
                session.history.push(Content::model(reply.clone()));
                tracing::debug!(
                    session_id = %session.id,
                    turns = session.history.len(),
                    "Reply received"
                );
                Ok(reply)
            }
            Err(e) => {
                // Roll the failed turn back so the next send replays a
                // consistent history.
                session.history.pop();
                Err(e)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> BackendConfig {
        BackendConfig {
            api_key: Some("test-key".to_string()),
            ..BackendConfig::default()
        }
    }

    // ---- Client construction ----

    #[test]
    fn test_client_new_with_key() {
        let client = GeminiClient::new(&config_with_key());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_new_without_key_is_configuration_error() {
        if std::env::var(sage_core::config::API_KEY_ENV).is_ok() {
            return; // environment provides a key; nothing to assert
        }
        let config = BackendConfig::default();
        let err = GeminiClient::new(&config).unwrap_err();
        assert!(matches!(err, ChatError::Configuration(_)));
    }

    #[test]
    fn test_url_shape() {
        let client = GeminiClient::new(&config_with_key()).unwrap();
        let url = client.url();
        assert!(url.starts_with("https://generativelanguage.googleapis.com/v1beta/models/"));
        assert!(url.contains("gemini-1.5-pro-latest:generateContent"));
        assert!(url.ends_with("key=test-key"));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let config = BackendConfig {
            api_key: Some("k".to_string()),
            endpoint: "https://example.test/v1/".to_string(),
            ..BackendConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert!(client.url().starts_with("https://example.test/v1/models/"));
    }

    // ---- Wire types ----

    #[test]
    fn test_content_roles() {
        assert_eq!(Content::user("hi").role, "user");
        assert_eq!(Content::model("hello").role, "model");
    }

    #[test]
    fn test_request_serialization_camel_case() {
        let contents = vec![Content::user("hi")];
        let request = GenerateContentRequest {
            contents: &contents,
            generation_config: GenerationConfig {
                max_output_tokens: 2000,
                temperature: 0.7,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":2000"));
        assert!(json.contains("\"temperature\":0.7"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Namaste!" }] } }
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].content.parts[0].text, "Namaste!");
    }

    #[test]
    fn test_response_deserialization_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }

    // ---- Persona instruction ----

    #[test]
    fn test_system_instruction_names_the_persona() {
        assert!(SYSTEM_INSTRUCTION.contains("Sikkim Sage"));
        assert!(SYSTEM_INSTRUCTION.contains("itineraries"));
    }

    // ---- Session handle ----

    #[test]
    fn test_session_handles_are_distinct() {
        let a = SessionHandle::new();
        let b = SessionHandle::new();
        assert_ne!(a.id, b.id);
        assert!(a.history.is_empty());
    }
}
