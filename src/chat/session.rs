//! The chat turn lifecycle: append → send → await → reconcile or roll back.
//!
//! A turn is split in two so the state machine can be driven without any
//! real transport:
//!
//! 1. [`ChatSession::begin`] performs every synchronous effect (lock input,
//!    append and render the user turn, show the placeholder, clear the
//!    buffer) and returns a [`PendingTurn`] carrying the outbound request.
//! 2. [`ChatSession::reconcile`] consumes that pending turn together with
//!    the [`Outcome`] of the request and settles the transcript.
//!
//! [`ChatSession::submit`] runs both halves around a [`ChatBackend`] call.
//! The session is busy from `begin` until `reconcile`, and only one
//! `PendingTurn` can exist at a time.

use std::time::Instant;

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::backend::{ChatBackend, ChatReply, ChatRequest};
use crate::config::schema::ChatConfig;
use crate::render::{Handle, Renderer};

use super::input::InputBox;
use super::transcript::{HISTORY_WINDOW, Transcript};
use super::turn::{Role, Turn};

/// Prefix of the bubble shown when the service rejects a message.
pub const BUSINESS_ERROR_MARKER: &str = "🚫";

/// Bubble shown when the service could not be reached or answered garbage.
pub const NETWORK_ERROR_MESSAGE: &str = "❌ Network error, please check the server connection.";

/// Notice shown when a reply updated the stored daily plan.
pub const PLAN_SYNCED_NOTICE: &str = "✅ Daily checklist synced to the dashboard";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How much of the transcript accompanies each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Send recent turns with each message at all.
    pub send_history: bool,
    /// Maximum number of turns sent, newest message included.
    pub history_window: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            send_history: true,
            history_window: HISTORY_WINDOW,
        }
    }
}

impl From<&ChatConfig> for SessionOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            send_history: config.send_history,
            history_window: config.history_window,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome of a request
// ---------------------------------------------------------------------------

/// How an outbound chat request ended.
#[derive(Debug)]
pub enum Outcome {
    /// `status == "success"`.
    Success { reply: String, updated_plan: bool },
    /// The service answered but refused; `reply` explains why.
    BusinessError { reply: String },
    /// The request never produced a usable response.
    TransportError(anyhow::Error),
}

impl Outcome {
    /// Classify a backend result.
    pub fn from_result(result: anyhow::Result<ChatReply>) -> Self {
        match result {
            Ok(reply) if reply.is_success() => Self::Success {
                updated_plan: reply.updated_plan,
                reply: reply.reply,
            },
            Ok(reply) => Self::BusinessError {
                reply: reply.text().to_string(),
            },
            Err(err) => Self::TransportError(err),
        }
    }
}

/// Terminal state of a reconciled turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// User and assistant turns were both committed.
    Committed { updated_plan: bool },
    /// The service refused; the user turn was rolled back.
    BusinessError,
    /// The request failed; the user turn was rolled back.
    TransportError,
}

impl TurnStatus {
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Committed { .. } => "success",
            Self::BusinessError => "business_error",
            Self::TransportError => "transport_error",
        }
    }
}

/// A turn whose request is in flight.
///
/// Must be handed back to [`ChatSession::reconcile`]; until then the session
/// stays busy.
#[must_use = "a pending turn keeps the session busy until it is reconciled"]
#[derive(Debug)]
pub struct PendingTurn {
    request: ChatRequest,
    placeholder: Handle,
    mark: usize,
    started: Instant,
}

impl PendingTurn {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One chat session: transcript, busy flag and entry field, rendered
/// through `R`.
pub struct ChatSession<R: Renderer> {
    transcript: Transcript,
    input: InputBox,
    busy: bool,
    renderer: R,
    options: SessionOptions,
    log: ActivityLog,
}

impl<R: Renderer> ChatSession<R> {
    pub fn new(renderer: R, options: SessionOptions) -> Self {
        Self {
            transcript: Transcript::new(),
            input: InputBox::new(),
            busy: false,
            renderer,
            options,
            log: ActivityLog::disabled(),
        }
    }

    /// Record each reconciled turn in `log`.
    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &InputBox {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBox {
        &mut self.input
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Send `text` and settle the turn. Returns `None` when the text is
    /// blank or a turn is already in flight; nothing happens in that case.
    pub fn submit<B: ChatBackend + ?Sized>(&mut self, backend: &B, text: &str) -> Option<TurnStatus> {
        let pending = self.begin(text)?;
        let result = backend.send_chat(pending.request());
        Some(self.reconcile(pending, Outcome::from_result(result)))
    }

    /// Submit whatever is in the entry field.
    pub fn submit_input<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> Option<TurnStatus> {
        let text = self.input.text().to_string();
        self.submit(backend, &text)
    }

    /// Start a turn: every synchronous effect up to the request.
    pub fn begin(&mut self, text: &str) -> Option<PendingTurn> {
        let text = text.trim();
        if text.is_empty() || self.busy {
            return None;
        }

        self.busy = true;
        self.input.lock();

        let mark = self.transcript.append(Turn::user(text));
        self.renderer.render_turn(Role::User, text);
        let placeholder = self.renderer.render_placeholder();
        self.input.clear();

        let history = self
            .options
            .send_history
            .then(|| self.transcript.recent(self.options.history_window).to_vec());

        Some(PendingTurn {
            request: ChatRequest::new(text, history),
            placeholder,
            mark,
            started: Instant::now(),
        })
    }

    /// Settle a pending turn with the outcome of its request.
    ///
    /// Always leaves the session idle with the entry field enabled and
    /// focused, whatever the outcome.
    pub fn reconcile(&mut self, pending: PendingTurn, outcome: Outcome) -> TurnStatus {
        let PendingTurn {
            request,
            placeholder,
            mark,
            started,
        } = pending;

        self.renderer.remove_placeholder(placeholder);

        let mut error_detail = None;
        let status = match outcome {
            Outcome::Success {
                reply,
                updated_plan,
            } => {
                self.transcript.append(Turn::assistant(reply.as_str()));
                self.renderer.render_turn(Role::Assistant, &reply);
                if updated_plan {
                    self.renderer.notify(PLAN_SYNCED_NOTICE);
                }
                TurnStatus::Committed { updated_plan }
            }
            Outcome::BusinessError { reply } => {
                self.renderer
                    .render_turn(Role::Assistant, &format!("{BUSINESS_ERROR_MARKER} {reply}"));
                self.transcript.rollback(mark);
                error_detail = Some(reply);
                TurnStatus::BusinessError
            }
            Outcome::TransportError(err) => {
                self.renderer.render_turn(Role::Assistant, NETWORK_ERROR_MESSAGE);
                self.transcript.rollback(mark);
                error_detail = Some(format!("{err:#}"));
                TurnStatus::TransportError
            }
        };

        let mut entry = ActivityEntry::new(ActivityKind::Chat, status.as_str());
        entry.history_len = Some(request.history_len());
        entry.latency_ms = Some(started.elapsed().as_millis() as u64);
        entry.updated_plan = Some(matches!(
            status,
            TurnStatus::Committed { updated_plan: true }
        ));
        entry.detail = error_detail;
        self.log.record(&entry);

        self.busy = false;
        self.input.unlock();

        status
    }
}
