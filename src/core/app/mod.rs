use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::error::ClientError;
use crate::core::message::Message;
use crate::utils::logging::LoggingState;

pub mod actions;
pub mod conversation;
pub mod lifecycle;
pub mod snapshot;

pub use actions::{apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand};
pub use conversation::{ChatPipeline, PendingQuestion, RevealView, StreamingPhase};
pub use lifecycle::{
    ActiveSession, CredentialState, LifecycleManager, ProcessingStatus, UploadOutcome,
    UploadState, UploadTicket,
};
pub use snapshot::AppSnapshot;

/// Oldest notices are dropped past this many.
const MAX_NOTICES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Output of a command such as `/status`. Shown once.
    Info,
    /// Inline guidance for a validation or precondition problem.
    Guidance,
    /// A backend failure. Stays until dismissed.
    Banner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

pub struct App {
    pub config: Config,
    pub lifecycle: LifecycleManager,
    pub chat: ChatPipeline,
    pub logging: LoggingState,
    notices: Vec<Notice>,
    next_notice_id: u64,
    exit_requested: bool,
    snapshot_tx: watch::Sender<AppSnapshot>,
}

impl App {
    pub fn new(config: Config, logging: LoggingState) -> Self {
        let mut lifecycle = LifecycleManager::new(config.upload.clone());
        if let Some(model) = config.default_model.as_deref() {
            if let Err(err) = lifecycle.select_model(model) {
                debug!(error = %err, "ignoring configured default model");
            }
        }

        let (snapshot_tx, _) = watch::channel(AppSnapshot::default());
        let mut app = Self {
            config,
            lifecycle,
            chat: ChatPipeline::new(),
            logging,
            notices: Vec::new(),
            next_notice_id: 0,
            exit_requested: false,
            snapshot_tx,
        };
        app.publish();
        app
    }

    /// Observe state changes. A new snapshot is published after every
    /// applied batch of actions.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot::capture(self)
    }

    pub fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn messages(&self) -> &[Message] {
        self.chat.messages()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn push_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id: self.next_notice_id,
            kind,
            text: text.into(),
        });
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Info, text);
    }

    pub fn guidance(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Guidance, text);
    }

    pub fn banner(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Banner, text);
    }

    /// Route an error to where it belongs: guidance, banner, or the debug log.
    pub fn report(&mut self, err: &ClientError) {
        match err {
            ClientError::Stale(stale) => debug!("{stale}"),
            err if err.is_guidance() => self.guidance(err.to_string()),
            err => self.banner(err.to_string()),
        }
    }

    /// Clear guidance and banners along with the error states behind them.
    pub fn dismiss_notices(&mut self) -> usize {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.kind == NoticeKind::Info);
        self.lifecycle.dismiss_error();
        self.chat.clear_error();
        before - self.notices.len()
    }

    pub fn has_active_banner(&self) -> bool {
        self.notices
            .iter()
            .any(|notice| notice.kind == NoticeKind::Banner)
    }

    /// Append a finalized message to the transcript log, if one is active.
    pub fn log_transcript(&mut self, message: &Message) {
        let line = if message.is_user() {
            format!("You: {}", message.content)
        } else {
            message.content.clone()
        };
        if let Err(err) = self.logging.log_message(&line) {
            warn!(error = %err, "failed to write transcript log");
        }
    }

    /// Display name for the selected model, if any.
    pub fn model_display_name(&self) -> Option<String> {
        self.lifecycle
            .selected_model()
            .map(|model| self.config.display_name_for(model))
    }
}
