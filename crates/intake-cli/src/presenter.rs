use intake_core::presenter::{CompletionPresenter, CompletionSummary};
use tokio::sync::mpsc;

/// Hands the completion summary to the REPL, which owns the terminal.
pub struct TerminalCompletionPresenter {
    tx: mpsc::UnboundedSender<CompletionSummary>,
}

impl TerminalCompletionPresenter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CompletionSummary>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl CompletionPresenter for TerminalCompletionPresenter {
    fn present(&self, summary: CompletionSummary) {
        let session_id = summary.session_id.clone();
        if self.tx.send(summary).is_err() {
            tracing::warn!(
                "[TerminalPresenter] Completion for session {} arrived after the screen closed",
                session_id
            );
        }
    }
}
