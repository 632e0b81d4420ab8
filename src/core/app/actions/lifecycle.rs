use tracing::debug;

use super::{App, AppAction, AppCommand};
use crate::core::app::UploadOutcome;
use crate::core::document::{format_file_size, DocumentFile};
use crate::core::error::{ClientError, PreconditionError};

pub(super) fn handle_lifecycle_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Bootstrap { resume } => {
            if let Some(session_id) = resume.clone() {
                app.lifecycle.begin_restore(session_id);
            }
            Some(AppCommand::Bootstrap { resume })
        }
        AppAction::HealthChecked { result } => {
            if !app.lifecycle.apply_health(result) {
                app.banner(format!(
                    "Backend is not reachable at {}",
                    app.config.backend_url()
                ));
            }
            None
        }
        AppAction::CredentialStatusLoaded { result } => {
            app.lifecycle.apply_credential_status(result);
            None
        }
        AppAction::SelectModel { model } => {
            select_model(app, &model);
            None
        }
        AppAction::SubmitCredential { api_key } => match app.lifecycle.begin_credential(&api_key) {
            Ok(request) => {
                app.info(format!("Storing API key for {}...", request.model));
                Some(AppCommand::StoreCredential(request))
            }
            Err(err) => {
                app.report(&err);
                None
            }
        },
        AppAction::CredentialStored { model, result } => {
            let display = app.config.display_name_for(&model);
            match app.lifecycle.complete_credential(model, result) {
                Ok(()) => app.info(format!("API key stored. Model: {display}")),
                Err(err) => app.report(&ClientError::Backend(err)),
            }
            None
        }
        AppAction::UploadDocument { path } => start_upload(app, &path),
        AppAction::UploadFinished { ticket, result } => {
            let file_name = ticket.file.name.clone();
            match app.lifecycle.complete_upload(ticket, result) {
                Ok(UploadOutcome::Processed {
                    session_changed, ..
                }) => {
                    if let Some(document) = app.lifecycle.document() {
                        let origin = if document.newly_processed() {
                            "processed"
                        } else {
                            "loaded from cache"
                        };
                        let text = format!(
                            "{} ({}) {origin}.",
                            document.file_name,
                            format_file_size(document.size)
                        );
                        app.info(text);
                    }
                    if session_changed {
                        sync_chat_session(app)
                    } else {
                        None
                    }
                }
                Ok(UploadOutcome::Discarded) => None,
                Err(err) => {
                    app.report(&err);
                    debug!(file = %file_name, "upload failed");
                    None
                }
            }
        }
        AppAction::RemoveDocument => {
            match app.lifecycle.remove_document() {
                Some(session_id) => {
                    debug!(%session_id, "document removed");
                    app.info("Document removed.");
                }
                None => app.guidance(PreconditionError::NoDocument.to_string()),
            }
            sync_chat_session(app)
        }
        AppAction::RestoreFinished { session_id, result } => {
            match app.lifecycle.complete_restore(&session_id, result) {
                Ok(()) => {
                    if let Some(document) = app.lifecycle.document() {
                        let text = format!("Resumed session with {}.", document.file_name);
                        app.info(text);
                    }
                    sync_chat_session(app)
                }
                Err(err) => {
                    app.report(&err);
                    None
                }
            }
        }
        _ => unreachable!("non-lifecycle action routed to lifecycle handler"),
    }
}

fn select_model(app: &mut App, model: &str) {
    match app.lifecycle.select_model(model) {
        Ok(true) => {
            let display = app.config.display_name_for(model.trim());
            app.info(format!("Model selected: {display}"));
        }
        Ok(false) => app.guidance(PreconditionError::CredentialLocked.to_string()),
        Err(err) => app.report(&ClientError::from(err)),
    }
}

fn start_upload(app: &mut App, path: &std::path::Path) -> Option<AppCommand> {
    if app.lifecycle.is_uploading() {
        app.guidance(PreconditionError::UploadInFlight.to_string());
        return None;
    }

    let ticket = DocumentFile::from_path(path)
        .and_then(|file| app.lifecycle.begin_upload(file));
    match ticket {
        Ok(ticket) => {
            app.info(format!(
                "Uploading {} ({})...",
                ticket.file.name,
                format_file_size(ticket.file.size)
            ));
            Some(AppCommand::Upload(ticket))
        }
        Err(err) => {
            app.report(&ClientError::from(err));
            None
        }
    }
}

/// Point the chat pipeline at the lifecycle's current session and request
/// its history when it changed.
pub(super) fn sync_chat_session(app: &mut App) -> Option<AppCommand> {
    let session_id = app.lifecycle.session_id().cloned();
    if !app.chat.on_session_changed(session_id.clone()) {
        return None;
    }
    let session_id = session_id?;
    let seed_welcome = app
        .lifecycle
        .document()
        .is_some_and(|document| document.newly_processed());
    Some(AppCommand::LoadHistory {
        session_id,
        seed_welcome,
    })
}
