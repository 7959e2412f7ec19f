//! [`ConversationEventBridge`] over the chat engine's HTTP + SSE protocol.
//!
//! One `POST` is one turn. The response streams events; once the stream has
//! ended the bridge forwards the collected effects and reports exactly one
//! turn-finished, by which time the engine has persisted the exchange.

use crate::sse::{ChatKitEvent, parse_stream};
use async_trait::async_trait;
use intake_core::bridge::{
    BridgeChannels, BridgeSenders, ConversationEventBridge, TranscriptEntry, TurnReply,
    bridge_channels,
};
use intake_core::config::ClientConfig;
use intake_core::error::{IntakeError, Result};
use intake_core::session::{EffectEvent, SessionId};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// Header carrying the configured domain key.
pub const DOMAIN_KEY_HEADER: &str = "x-chatkit-domain-key";

const TRANSCRIPT_CAPACITY: usize = 64;

#[derive(Default)]
struct BridgeState {
    senders: Option<BridgeSenders>,
    thread_id: Option<String>,
}

/// Chat engine bridge for one conversation thread.
///
/// The seed latch belongs to the instance: however many controllers attach
/// over its lifetime, `claim_seed` succeeds once.
pub struct ChatKitBridge {
    client: Client,
    chat_url: String,
    domain_key: String,
    correlation_header: String,
    timeout: Duration,
    state: Mutex<BridgeState>,
    /// Serializes turns so a thread is never created twice.
    turn_lock: tokio::sync::Mutex<()>,
    seed_claimed: AtomicBool,
    transcript: broadcast::Sender<TranscriptEntry>,
}

impl ChatKitBridge {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        let (transcript, _) = broadcast::channel(TRANSCRIPT_CAPACITY);
        Self {
            client,
            chat_url: config.chat_url(),
            domain_key: config.domain_key.clone(),
            correlation_header: config.correlation_header.clone(),
            timeout: config.request_timeout(),
            state: Mutex::new(BridgeState::default()),
            turn_lock: tokio::sync::Mutex::new(()),
            seed_claimed: AtomicBool::new(false),
            transcript,
        }
    }

    /// Continues an existing thread (e.g. after a reload).
    pub fn with_thread(self, thread_id: impl Into<String>) -> Self {
        self.lock_state().thread_id = Some(thread_id.into());
        self
    }

    pub fn thread_id(&self) -> Option<String> {
        self.lock_state().thread_id.clone()
    }

    /// Rendered conversation lines, user and assistant.
    pub fn subscribe_transcript(&self) -> broadcast::Receiver<TranscriptEntry> {
        self.transcript.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn request_body(thread_id: Option<&str>, text: &str) -> Value {
        let input = json!({
            "content": [{"type": "input_text", "text": text}],
            "attachments": [],
            "inference_options": {}
        });
        match thread_id {
            Some(thread_id) => json!({
                "type": "threads.add_user_message",
                "params": {"thread_id": thread_id, "input": input}
            }),
            None => json!({
                "type": "threads.create",
                "params": {"input": input}
            }),
        }
    }

    fn publish(&self, entry: TranscriptEntry) {
        // No subscribers is fine.
        let _ = self.transcript.send(entry);
    }
}

#[async_trait]
impl ConversationEventBridge for ChatKitBridge {
    fn attach(&self, correlation_id: &SessionId) -> BridgeChannels {
        let (senders, channels) = bridge_channels(correlation_id.clone());
        let mut state = self.lock_state();
        if state.senders.is_some() {
            tracing::debug!("[ChatKitBridge] Re-attaching to session {}", correlation_id);
        }
        state.senders = Some(senders);
        channels
    }

    fn has_transcript(&self) -> bool {
        self.lock_state().thread_id.is_some()
    }

    fn claim_seed(&self) -> bool {
        !self.seed_claimed.swap(true, Ordering::SeqCst)
    }

    async fn send_message(&self, text: &str) -> Result<TurnReply> {
        let _turn = self.turn_lock.lock().await;

        let (senders, thread_id) = {
            let state = self.lock_state();
            let senders = state
                .senders
                .clone()
                .ok_or_else(|| IntakeError::bridge("bridge is not attached to a session"))?;
            (senders, state.thread_id.clone())
        };

        self.publish(TranscriptEntry::user(text));
        let body = Self::request_body(thread_id.as_deref(), text);
        tracing::debug!(
            "[ChatKitBridge] POST {} (session={}, thread={:?})",
            self.chat_url,
            senders.correlation_id(),
            thread_id
        );

        let response = self
            .client
            .post(&self.chat_url)
            .header("content-type", "application/json")
            .header(self.correlation_header.as_str(), senders.correlation_id().as_str())
            .header(DOMAIN_KEY_HEADER, self.domain_key.as_str())
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IntakeError::http(None, format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IntakeError::http(Some(status.as_u16()), error_text));
        }

        let stream = response
            .text()
            .await
            .map_err(|e| IntakeError::http(None, format!("chat stream interrupted: {e}")))?;

        let mut reply = TurnReply::default();
        let mut effects = Vec::new();
        let mut failure = None;

        for event in parse_stream(&stream) {
            match event {
                ChatKitEvent::ThreadCreated { thread } => {
                    tracing::info!(
                        "[ChatKitBridge] Thread {} created for session {}",
                        thread.id,
                        senders.correlation_id()
                    );
                    self.lock_state().thread_id = Some(thread.id);
                }
                ChatKitEvent::ItemDone { item } => {
                    if let Some(text) = item.assistant_text() {
                        self.publish(TranscriptEntry::assistant(text.clone()));
                        reply.assistant_messages.push(text);
                    }
                }
                ChatKitEvent::ClientEffect { name, data } => {
                    effects.push(EffectEvent::new(name, data));
                }
                ChatKitEvent::Error { code, message } => {
                    let message = message.unwrap_or_else(|| "unknown error".to_string());
                    tracing::warn!("[ChatKitBridge] Engine error ({:?}): {}", code, message);
                    failure = Some(message);
                }
                ChatKitEvent::Unknown => {}
            }
        }

        for effect in effects {
            tracing::debug!("[ChatKitBridge] Forwarding effect '{}'", effect.name);
            senders.emit_effect(effect);
        }

        if let Some(message) = failure {
            return Err(IntakeError::bridge(message));
        }

        senders.finish_turn();
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::spawn_server;
    use axum::extract::State;
    use axum::http::{HeaderMap, header};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;

    type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

    fn sse(events: &[Value]) -> String {
        events
            .iter()
            .map(|event| format!("data: {event}\n\n"))
            .collect()
    }

    async fn chat_handler(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let kind = body["type"].as_str().unwrap_or_default().to_string();
        let text = body["params"]["input"]["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        captured.lock().unwrap().push((headers, body));

        let mut events = Vec::new();
        if kind == "threads.create" {
            events.push(json!({"type": "thread.created", "thread": {"id": "thr_abc"}}));
        }
        events.push(json!({"type": "progress_update", "text": "..."}));
        if text == "fail" {
            events.push(json!({"type": "error", "code": "overloaded", "message": "try later"}));
        } else {
            events.push(json!({
                "type": "thread.item.done",
                "item": {"type": "assistant_message", "content": [{"type": "output_text", "text": format!("echo: {text}")}]}
            }));
        }
        if text == "done" {
            events.push(json!({"type": "client_effect", "name": "interview_completed", "data": {"id": 5}}));
        }

        ([(header::CONTENT_TYPE, "text/event-stream")], sse(&events))
    }

    async fn bridge_with_server() -> (ChatKitBridge, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/chatkit", post(chat_handler))
            .with_state(captured.clone());
        let base = spawn_server(app).await;
        let config = ClientConfig {
            api_base_url: base,
            domain_key: "clinic-test".to_string(),
            ..ClientConfig::default()
        };
        (ChatKitBridge::new(&config), captured)
    }

    #[tokio::test]
    async fn test_first_message_creates_thread_with_correlation_header() {
        let (bridge, captured) = bridge_with_server().await;
        let mut channels = bridge.attach(&SessionId::new("42"));
        let mut transcript = bridge.subscribe_transcript();
        assert!(!bridge.has_transcript());

        let reply = bridge.send_message("My knee is swollen").await.unwrap();

        assert_eq!(reply.assistant_messages, vec!["echo: My knee is swollen".to_string()]);
        assert!(bridge.has_transcript());
        assert_eq!(bridge.thread_id().as_deref(), Some("thr_abc"));

        let turn = channels.turns.try_recv().unwrap();
        assert_eq!(turn.correlation_id.as_str(), "42");
        assert!(channels.turns.try_recv().is_err());

        assert_eq!(transcript.recv().await.unwrap(), TranscriptEntry::user("My knee is swollen"));
        assert_eq!(
            transcript.recv().await.unwrap(),
            TranscriptEntry::assistant("echo: My knee is swollen")
        );

        let captured = captured.lock().unwrap();
        let (headers, body) = &captured[0];
        assert_eq!(headers["x-interview-id"], "42");
        assert_eq!(headers[DOMAIN_KEY_HEADER], "clinic-test");
        assert_eq!(body["type"], "threads.create");
    }

    #[tokio::test]
    async fn test_follow_up_uses_existing_thread() {
        let (bridge, captured) = bridge_with_server().await;
        let _channels = bridge.attach(&SessionId::new("42"));

        bridge.send_message("first").await.unwrap();
        bridge.send_message("second").await.unwrap();

        let captured = captured.lock().unwrap();
        let (headers, body) = &captured[1];
        assert_eq!(body["type"], "threads.add_user_message");
        assert_eq!(body["params"]["thread_id"], "thr_abc");
        assert_eq!(headers["x-interview-id"], "42");
    }

    #[tokio::test]
    async fn test_effects_are_forwarded_alongside_turn() {
        let (bridge, _captured) = bridge_with_server().await;
        let mut channels = bridge.attach(&SessionId::new("7"));

        bridge.send_message("done").await.unwrap();

        let effect = channels.effects.try_recv().unwrap();
        assert_eq!(effect, EffectEvent::completed(Some(json!({"id": 5}))));
        assert!(channels.turns.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_engine_error_reports_no_turn() {
        let (bridge, _captured) = bridge_with_server().await;
        let mut channels = bridge.attach(&SessionId::new("7"));

        let err = bridge.send_message("fail").await.unwrap_err();

        assert!(matches!(err, IntakeError::Bridge(ref m) if m == "try later"));
        assert!(channels.turns.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reattach_replaces_channels() {
        let (bridge, _captured) = bridge_with_server().await;
        let mut first = bridge.attach(&SessionId::new("1"));
        let mut second = bridge.attach(&SessionId::new("2"));

        bridge.send_message("hello").await.unwrap();

        assert!(first.turns.try_recv().is_err());
        assert_eq!(second.turns.try_recv().unwrap().correlation_id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_unattached_send_fails() {
        let bridge = ChatKitBridge::new(&ClientConfig::default());
        let err = bridge.send_message("hello").await.unwrap_err();
        assert!(matches!(err, IntakeError::Bridge(_)));
    }

    #[test]
    fn test_seed_latch_claims_once() {
        let bridge = ChatKitBridge::new(&ClientConfig::default());
        assert!(bridge.claim_seed());
        assert!(!bridge.claim_seed());
    }

    #[test]
    fn test_existing_thread_counts_as_transcript() {
        let bridge = ChatKitBridge::new(&ClientConfig::default()).with_thread("thr_old");
        assert!(bridge.has_transcript());
    }
}
