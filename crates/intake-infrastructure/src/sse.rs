//! Server-sent-event decoding for the chat engine's response stream.

use serde::Deserialize;
use serde_json::Value;

/// Events the chat engine streams back for one request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ChatKitEvent {
    #[serde(rename = "thread.created")]
    ThreadCreated { thread: ThreadRef },

    #[serde(rename = "thread.item.done")]
    ItemDone { item: ThreadItem },

    #[serde(rename = "client_effect")]
    ClientEffect {
        name: String,
        #[serde(default)]
        data: Option<Value>,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },

    /// Progress, deltas and anything newer than this client.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ThreadItem {
    #[serde(rename = "assistant_message")]
    AssistantMessage {
        #[serde(default)]
        content: Vec<ContentPart>,
    },

    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: String,
}

impl ThreadItem {
    /// Concatenated text of an assistant message, if this is one.
    pub fn assistant_text(&self) -> Option<String> {
        match self {
            Self::AssistantMessage { content } => {
                let text: String = content.iter().map(|part| part.text.as_str()).collect();
                Some(text)
            }
            Self::Other => None,
        }
    }
}

/// Splits an SSE body into decoded events.
///
/// Multi-line `data:` fields are joined with `\n`. Comments, other fields and
/// payloads that are not valid event JSON are skipped.
pub fn parse_stream(body: &str) -> Vec<ChatKitEvent> {
    let mut events = Vec::new();
    let mut data = String::new();

    for line in body.lines().chain(std::iter::once("")) {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if !data.is_empty() {
                if let Some(event) = decode(&data) {
                    events.push(event);
                }
                data.clear();
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    events
}

fn decode(data: &str) -> Option<ChatKitEvent> {
    match serde_json::from_str::<ChatKitEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("[ChatKitBridge] Skipping undecodable event: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_known_events() {
        let body = concat!(
            "data: {\"type\":\"thread.created\",\"thread\":{\"id\":\"thr_1\",\"title\":null}}\n\n",
            "data: {\"type\":\"thread.item.done\",\"item\":{\"type\":\"assistant_message\",",
            "\"content\":[{\"type\":\"output_text\",\"text\":\"How long \"},{\"text\":\"has it hurt?\"}]}}\n\n",
            "data: {\"type\":\"client_effect\",\"name\":\"interview_completed\",\"data\":{\"ok\":true}}\n\n",
        );

        let events = parse_stream(body);

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ChatKitEvent::ThreadCreated {
                thread: ThreadRef { id: "thr_1".to_string() }
            }
        );
        match &events[1] {
            ChatKitEvent::ItemDone { item } => {
                assert_eq!(item.assistant_text().as_deref(), Some("How long has it hurt?"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            events[2],
            ChatKitEvent::ClientEffect {
                name: "interview_completed".to_string(),
                data: Some(json!({"ok": true})),
            }
        );
    }

    #[test]
    fn test_unknown_types_are_kept_as_unknown() {
        let events = parse_stream("data: {\"type\":\"progress_update\",\"text\":\"thinking\"}\n\n");
        assert_eq!(events, vec![ChatKitEvent::Unknown]);
    }

    #[test]
    fn test_non_assistant_items_have_no_text() {
        let events =
            parse_stream("data: {\"type\":\"thread.item.done\",\"item\":{\"type\":\"user_message\"}}\n\n");
        match &events[0] {
            ChatKitEvent::ItemDone { item } => assert!(item.assistant_text().is_none()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_skips_comments_and_garbage() {
        let body = ": keep-alive\n\ndata: not json\n\nevent: ping\ndata: {\"type\":\"error\",\"message\":\"overloaded\"}\n";
        let events = parse_stream(body);
        assert_eq!(
            events,
            vec![ChatKitEvent::Error {
                code: None,
                message: Some("overloaded".to_string()),
            }]
        );
    }

    #[test]
    fn test_multiline_data_and_crlf() {
        let body = "data: {\"type\":\"client_effect\",\r\ndata: \"name\":\"x\"}\r\n\r\n";
        assert_eq!(
            parse_stream(body),
            vec![ChatKitEvent::ClientEffect {
                name: "x".to_string(),
                data: None,
            }]
        );
    }
}
