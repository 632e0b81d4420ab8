use tracing::debug;

use super::{App, AppAction, AppCommand};
use crate::api::QueryRequest;
use crate::core::error::{ClientError, PreconditionError};
use crate::core::message::Message;

pub(super) fn handle_chat_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::ReloadHistory => match app.chat.begin_history_reload() {
            Ok(session_id) => Some(AppCommand::LoadHistory {
                session_id,
                seed_welcome: false,
            }),
            Err(err) => {
                app.report(&ClientError::from(err));
                None
            }
        },
        AppAction::HistoryLoaded {
            session_id,
            seed_welcome,
            result,
        } => {
            if let Err(err) = app.chat.apply_history(&session_id, result, seed_welcome) {
                app.report(&err);
            }
            None
        }
        AppAction::SendQuestion { text } => send_question(app, &text),
        AppAction::QueryFinished {
            request_id,
            session_id,
            result,
        } => {
            let delay = app.config.reveal_delay();
            match app
                .chat
                .apply_query_result(request_id, &session_id, result, delay)
            {
                Ok(plan) => Some(AppCommand::Reveal(plan)),
                Err(err) => {
                    app.report(&err);
                    None
                }
            }
        }
        AppAction::RevealStep { reveal_id, shown } => {
            if !app.chat.apply_reveal_step(reveal_id, shown) {
                debug!(reveal_id, shown, "dropping step for inactive reveal");
            }
            None
        }
        AppAction::RevealFinished { reveal_id } => {
            let persist = app.chat.apply_reveal_finished(reveal_id)?;
            app.log_transcript(&Message::assistant(persist.content.clone()));
            Some(AppCommand::PersistMessage(persist))
        }
        _ => unreachable!("non-chat action routed to chat handler"),
    }
}

/// Questions are serialized here: a new one is refused while the previous
/// answer is still being fetched or revealed.
fn send_question(app: &mut App, text: &str) -> Option<AppCommand> {
    if text.trim().is_empty() {
        return None;
    }
    if app.chat.is_busy() {
        app.guidance(PreconditionError::RequestInFlight.to_string());
        return None;
    }

    let credential_stored = app.lifecycle.credential_stored();
    let session_id = app.lifecycle.session_id().cloned();
    match app
        .chat
        .begin_send(text, session_id.as_ref(), credential_stored)
    {
        Ok(Some(pending)) => {
            app.log_transcript(&Message::user(pending.question.clone()));
            let query = QueryRequest {
                session_id: pending.session_id.clone(),
                question: pending.question.clone(),
                n_results: app.config.query_results(),
                model: app.lifecycle.selected_model().map(str::to_owned),
            };
            Some(AppCommand::SendQuestion { pending, query })
        }
        Ok(None) => None,
        Err(err) => {
            app.report(&ClientError::from(err));
            None
        }
    }
}
