use super::usage_status;
use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::App;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const USAGE_LOG: &str = "Usage: /log [filename]";
const USAGE_DUMP: &str = "Usage: /dump [filename]";

pub(crate) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.args_len() {
        0 => {
            let timestamp = chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string();
            let pause_message = format!("Logging paused at {timestamp}");
            match app.logging.toggle_logging(&pause_message) {
                Ok(message) => app.info(message),
                Err(e) => app.guidance(format!("Log error: {e}")),
            }
            CommandResult::Continue
        }
        _ => {
            let Some(filename) = invocation.rest() else {
                return usage_status(app, USAGE_LOG);
            };
            match app.logging.set_log_file(filename.to_string()) {
                Ok(message) => app.info(message),
                Err(e) => app.guidance(format!("Logfile error: {e}")),
            }
            CommandResult::Continue
        }
    }
}

pub(crate) fn handle_dump(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let filename = match invocation.args_len() {
        0 => format!("ragline-log-{}.txt", Utc::now().format("%Y-%m-%d")),
        1 => match invocation.arg(0) {
            Some(name) => name.to_string(),
            None => return usage_status(app, USAGE_DUMP),
        },
        _ => return usage_status(app, USAGE_DUMP),
    };

    match dump_conversation(app, Path::new(&filename)) {
        Ok(()) => app.info(format!("Dumped: {filename}")),
        Err(e) => app.guidance(format!("Dump error: {e}")),
    }
    CommandResult::Continue
}

/// Write the chat log to a new file. Refuses to overwrite.
pub fn dump_conversation(app: &App, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let messages = app.messages();
    if messages.is_empty() {
        return Err("No conversation to dump - the chat history is empty.".into());
    }

    if path.exists() {
        return Err(format!(
            "File '{}' already exists. Please specify a different filename with /dump <filename>.",
            path.display()
        )
        .into());
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for msg in messages {
        if msg.is_user() {
            writeln!(writer, "You: {}", msg.content)?;
        } else {
            writeln!(writer, "{}", msg.content)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
