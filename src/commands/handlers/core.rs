use std::path::PathBuf;

use super::{required_rest, usage_status};
use crate::commands::registry::{all_commands, CommandInvocation};
use crate::commands::CommandResult;
use crate::core::app::{App, AppAction, CredentialState, ProcessingStatus, StreamingPhase};
use crate::core::document::format_file_size;

const USAGE_UPLOAD: &str = "Usage: /upload <path>";
const USAGE_KEY: &str = "Usage: /key <api-key>";
const USAGE_MODEL: &str = "Usage: /model [id|number]";

pub(crate) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from(
        "Ask questions about the uploaded document by typing them. Commands:\n",
    );
    for command in all_commands() {
        for usage in command.usages {
            help.push_str(&format!("  {:<22} {}\n", usage.syntax, usage.description));
        }
    }
    app.info(help.trim_end().to_string());
    CommandResult::Continue
}

pub(crate) fn handle_upload(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(path) = required_rest(app, &invocation, USAGE_UPLOAD) else {
        return CommandResult::Continue;
    };
    CommandResult::Dispatch(AppAction::UploadDocument {
        path: PathBuf::from(path),
    })
}

pub(crate) fn handle_remove(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::RemoveDocument)
}

pub(crate) fn handle_model(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let options = app.config.model_options();
    match invocation.args_len() {
        0 => {
            let selected = app.lifecycle.selected_model();
            let mut listing = String::from("Models:\n");
            for (index, option) in options.iter().enumerate() {
                let marker = if selected == Some(option.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                listing.push_str(&format!(
                    "{marker} {}. {} ({})\n",
                    index + 1,
                    option.display_name,
                    option.id
                ));
            }
            app.info(listing.trim_end().to_string());
            CommandResult::Continue
        }
        1 => {
            let Some(choice) = invocation.arg(0) else {
                return usage_status(app, USAGE_MODEL);
            };
            let model = choice
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|index| options.get(index))
                .map(|option| option.id.clone())
                .unwrap_or_else(|| choice.to_string());
            CommandResult::Dispatch(AppAction::SelectModel { model })
        }
        _ => usage_status(app, USAGE_MODEL),
    }
}

pub(crate) fn handle_key(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args_len() != 1 {
        return usage_status(app, USAGE_KEY);
    }
    let Some(api_key) = invocation.arg(0) else {
        return usage_status(app, USAGE_KEY);
    };
    CommandResult::Dispatch(AppAction::SubmitCredential {
        api_key: api_key.to_string(),
    })
}

pub(crate) fn handle_status(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let report = status_report(app);
    app.info(report);
    CommandResult::Continue
}

pub(crate) fn handle_history(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::ReloadHistory)
}

pub(crate) fn handle_dismiss(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::DismissNotices)
}

pub(crate) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::Quit)
}

/// Backend, credential, document and chat state as printable lines.
pub fn status_report(app: &App) -> String {
    let lifecycle = &app.lifecycle;
    let mut lines = Vec::new();

    let backend = match lifecycle.backend_connected() {
        Some(true) => "connected",
        Some(false) => "unreachable",
        None => "checking",
    };
    lines.push(format!("Backend:    {} ({backend})", app.config.backend_url()));

    let model = app
        .model_display_name()
        .unwrap_or_else(|| "none selected".to_string());
    let credential = match lifecycle.credential() {
        CredentialState::Stored { .. } => "stored, model locked",
        _ if lifecycle.credential_in_flight() => "storing",
        _ => "not stored",
    };
    lines.push(format!("Model:      {model}"));
    lines.push(format!("API key:    {credential}"));

    match lifecycle.session() {
        Some(session) => {
            let document = &session.document;
            let meta = &document.metadata;
            lines.push(format!(
                "Document:   {} ({}, {})",
                document.file_name,
                format_file_size(document.size),
                document.mime.as_deref().unwrap_or("unknown type")
            ));
            lines.push(format!("Session:    {}", session.id));
            if let Some(chunks) = meta.chunk_count {
                lines.push(format!("Chunks:     {chunks}"));
            }
            if let Some(pages) = meta.page_count {
                lines.push(format!("Pages:      {pages}"));
            }
            let source = if meta.from_cache {
                "cache"
            } else {
                "newly processed"
            };
            lines.push(format!("Source:     {source}"));
            if let Some(secs) = meta.processing_time_secs {
                lines.push(format!("Processed:  {secs:.2}s"));
            }
            lines.push(format!(
                "Uploaded:   {}",
                meta.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        None => lines.push("Document:   none".to_string()),
    }

    match lifecycle.processing_status() {
        ProcessingStatus::Uploading { file_name } => {
            lines.push(format!("Upload:     {file_name} in progress"))
        }
        ProcessingStatus::Failed(reason) => lines.push(format!("Upload:     failed ({reason})")),
        ProcessingStatus::Ready | ProcessingStatus::NoDocument => {}
    }

    let phase = match app.chat.phase() {
        StreamingPhase::Idle => "idle",
        StreamingPhase::Sending => "waiting for answer",
        StreamingPhase::Revealing => "answering",
    };
    lines.push(format!(
        "Chat:       {} messages, {phase}",
        app.chat.messages().len()
    ));
    lines.push(format!("Logging:    {}", app.logging.get_status_string()));

    lines.join("\n")
}
