//! Contract between the interview controller and a chat engine.
//!
//! The engine reports two kinds of events that are not ordered relative to
//! each other, so they travel on two independent channels rather than one
//! combined stream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::session::{EffectEvent, SessionId};

/// Marker for one completed conversational exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnFinished {
    pub correlation_id: SessionId,
}

/// Receiving ends handed to the controller on `attach`.
#[derive(Debug)]
pub struct BridgeChannels {
    pub turns: mpsc::UnboundedReceiver<TurnFinished>,
    pub effects: mpsc::UnboundedReceiver<EffectEvent>,
}

/// Sending ends kept by a bridge implementation.
#[derive(Debug, Clone)]
pub struct BridgeSenders {
    correlation_id: SessionId,
    turns: mpsc::UnboundedSender<TurnFinished>,
    effects: mpsc::UnboundedSender<EffectEvent>,
}

impl BridgeSenders {
    pub fn correlation_id(&self) -> &SessionId {
        &self.correlation_id
    }

    /// Reports a finished turn. Returns `false` if nobody is listening.
    pub fn finish_turn(&self) -> bool {
        self.turns
            .send(TurnFinished {
                correlation_id: self.correlation_id.clone(),
            })
            .is_ok()
    }

    /// Forwards an effect. Returns `false` if nobody is listening.
    pub fn emit_effect(&self, effect: EffectEvent) -> bool {
        self.effects.send(effect).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.turns.is_closed() && self.effects.is_closed()
    }
}

/// Creates a connected sender/receiver pair for one attachment.
pub fn bridge_channels(correlation_id: SessionId) -> (BridgeSenders, BridgeChannels) {
    let (turn_tx, turn_rx) = mpsc::unbounded_channel();
    let (effect_tx, effect_rx) = mpsc::unbounded_channel();
    (
        BridgeSenders {
            correlation_id,
            turns: turn_tx,
            effects: effect_tx,
        },
        BridgeChannels {
            turns: turn_rx,
            effects: effect_rx,
        },
    )
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    User,
    Assistant,
}

/// One rendered line of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Assistant,
            text: text.into(),
        }
    }
}

/// Result of a single outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReply {
    pub assistant_messages: Vec<String>,
}

/// Adapter surface every chat engine must provide.
///
/// Contract:
/// - turn-finished is reported exactly once per completed exchange, after the
///   engine's own persistence of that exchange is expected to have happened;
/// - effects are reported at most once per occurrence, with no ordering
///   guarantee relative to turn-finished;
/// - every outbound request carries the correlation id given to `attach`.
#[async_trait]
pub trait ConversationEventBridge: Send + Sync {
    /// Binds the bridge to a session and returns fresh event channels.
    ///
    /// Attaching again replaces the previous channels; the earlier receivers
    /// stop receiving events.
    fn attach(&self, correlation_id: &SessionId) -> BridgeChannels;

    /// True when the conversation already has turns (e.g. after a reload).
    fn has_transcript(&self) -> bool;

    /// Claims the one-shot seed latch of this bridge instance.
    ///
    /// Returns `true` exactly once per bridge instance.
    fn claim_seed(&self) -> bool;

    /// Sends a user message as one conversational turn.
    async fn send_message(&self, text: &str) -> Result<TurnReply>;
}
