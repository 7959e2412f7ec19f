use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use intake_application::InterviewScreen;
use intake_core::bridge::{ConversationEventBridge, TranscriptEntry, TranscriptRole};
use intake_core::presenter::CompletionSummary;
use intake_core::session::InterviewSession;
use intake_infrastructure::ChatKitBridge;

use crate::app::App;
use crate::presenter::TerminalCompletionPresenter;
use crate::render;

const COMPLETE_PROMPT: &str = "Type 'complete' to finish >> ";

pub type Prompt = Editor<CliHelper, DefaultHistory>;

/// rustyline helper: completion and hints for the interview commands.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: vec!["/intake".to_string(), "/quit".to_string()],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

pub fn new_prompt() -> Result<Prompt> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    Ok(rl)
}

type ReadResult = rustyline::Result<String>;

/// Blocking source of input lines.
pub trait LineSource: 'static {
    fn read_line(&mut self, prompt: &str) -> ReadResult;
    fn add_history(&mut self, line: &str);
}

impl LineSource for Prompt {
    fn read_line(&mut self, prompt: &str) -> ReadResult {
        self.readline(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.add_history_entry(line);
    }
}

enum InputRequest {
    Read {
        prompt: String,
        reply: oneshot::Sender<ReadResult>,
    },
    History(String),
}

/// Line editor running on its own thread, so the interview loop can keep
/// listening for completions while the user is typing.
///
/// `read_line` is cancel-safe: an abandoned read stays pending and the next
/// call returns its line instead of prompting again.
pub struct LineReader {
    requests: std_mpsc::Sender<InputRequest>,
    pending: Option<oneshot::Receiver<ReadResult>>,
}

impl LineReader {
    /// Starts the input thread. The source is built on that thread.
    pub async fn spawn<S, F>(factory: F) -> Result<Self>
    where
        S: LineSource,
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let (requests, inbox) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("intake-input".to_string())
            .spawn(move || {
                let mut source = match factory() {
                    Ok(source) => {
                        let _ = ready_tx.send(Ok(()));
                        source
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                while let Ok(request) = inbox.recv() {
                    match request {
                        InputRequest::Read { prompt, reply } => {
                            let _ = reply.send(source.read_line(&prompt));
                        }
                        InputRequest::History(line) => source.add_history(&line),
                    }
                }
            })?;

        ready_rx
            .await
            .map_err(|_| anyhow::anyhow!("input thread exited during startup"))??;

        Ok(Self {
            requests,
            pending: None,
        })
    }

    pub async fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        let reply = match self.pending.take() {
            Some(reply) => reply,
            None => {
                let (reply_tx, reply) = oneshot::channel();
                self.requests
                    .send(InputRequest::Read {
                        prompt: prompt.to_string(),
                        reply: reply_tx,
                    })
                    .map_err(|_| anyhow::anyhow!("input thread is gone"))?;
                reply
            }
        };

        let pending = self.pending.insert(reply);
        let result = pending.await;
        self.pending = None;
        result.map_err(|_| anyhow::anyhow!("input thread is gone"))
    }

    pub fn add_history(&self, line: &str) {
        let _ = self.requests.send(InputRequest::History(line.to_string()));
    }
}

/// How the interview screen was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Left,
}

/// Runs the chat screen for one session until completion or until the user
/// leaves.
pub async fn run_interview(
    app: &App,
    reader: &mut LineReader,
    session: InterviewSession,
) -> Result<Outcome> {
    let bridge = Arc::new(ChatKitBridge::new(app.config()));
    let printer = spawn_transcript_printer(bridge.subscribe_transcript());

    let (presenter, mut completions) = TerminalCompletionPresenter::channel();
    let mut screen = InterviewScreen::new(app.fetcher(), Arc::new(presenter))
        .with_decay_window(app.config().highlight_decay());

    let handle = screen.open(session, bridge.clone()).await;
    let session_id = handle.session_id().clone();
    let notifier = spawn_update_notifier(handle.subscribe_signal());

    println!("{}", format!("=== Interview {session_id} ===").bright_magenta().bold());
    println!(
        "{}",
        "Answer the assistant's questions. '/intake' shows the intake so far, '/quit' leaves."
            .bright_black()
    );
    println!();

    let result = interview_loop(reader, &screen, bridge.as_ref(), &mut completions).await;

    screen.close().await;
    printer.abort();
    notifier.abort();
    result
}

enum InterviewInput {
    Line(ReadResult),
    Completed(CompletionSummary),
}

/// Waits for whichever comes first: a typed line or a completion.
async fn next_input(
    reader: &mut LineReader,
    completions: &mut mpsc::UnboundedReceiver<CompletionSummary>,
) -> Result<InterviewInput> {
    tokio::select! {
        biased;

        Some(summary) = completions.recv() => Ok(InterviewInput::Completed(summary)),
        line = reader.read_line(">> ") => Ok(InterviewInput::Line(line?)),
    }
}

async fn interview_loop(
    reader: &mut LineReader,
    screen: &InterviewScreen,
    bridge: &ChatKitBridge,
    completions: &mut mpsc::UnboundedReceiver<CompletionSummary>,
) -> Result<Outcome> {
    loop {
        let line = match next_input(reader, completions).await? {
            InterviewInput::Completed(summary) => {
                return confirm_completion(reader, &summary).await;
            }
            InterviewInput::Line(line) => line,
        };

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                reader.add_history(trimmed);

                match trimmed {
                    "/quit" | "quit" | "exit" => return Ok(Outcome::Left),
                    "/intake" => {
                        print_current_intake(screen);
                        continue;
                    }
                    _ => {}
                }

                if let Err(e) = bridge.send_message(trimmed).await {
                    tracing::warn!("[Repl] Turn failed: {}", e);
                    eprintln!("{}", format!("Error: {e}").red());
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to leave the interview.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => return Ok(Outcome::Left),
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_current_intake(screen: &InterviewScreen) {
    match screen.current().and_then(|handle| handle.document()) {
        Some(document) => {
            for line in render::document_lines(&document) {
                println!("{}", line.cyan());
            }
        }
        None => println!("{}", "No intake data yet.".bright_black()),
    }
}

/// Completion screen: read-only summary plus the single "complete" action.
///
/// A read started before the completion arrived is still pending; its line
/// counts as the first answer here.
async fn confirm_completion(reader: &mut LineReader, summary: &CompletionSummary) -> Result<Outcome> {
    println!();
    println!("{}", "=== Interview complete ===".bright_green().bold());
    for line in render::summary_lines(summary) {
        println!("{}", line.green());
    }
    println!();
    println!("{}", COMPLETE_PROMPT.bright_black());

    loop {
        match reader.read_line(COMPLETE_PROMPT).await? {
            Ok(line) if line.trim().eq_ignore_ascii_case("complete") => break,
            Ok(_) => continue,
            Err(rustyline::error::ReadlineError::Interrupted) => continue,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(Outcome::Completed)
}

fn spawn_transcript_printer(mut transcript: broadcast::Receiver<TranscriptEntry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match transcript.recv().await {
                Ok(entry) if entry.role == TranscriptRole::Assistant => {
                    for line in entry.text.lines() {
                        println!("{}", line.bright_blue());
                    }
                    println!();
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Repl] Transcript printer skipped {} entries", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_update_notifier(mut signal: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal.changed().await.is_ok() {
            if *signal.borrow_and_update() {
                println!("{}", "(intake updated)".yellow());
            }
        }
    })
}
