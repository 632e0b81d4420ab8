mod handlers;
mod registry;

pub use handlers::core::status_report;
pub use handlers::io::dump_conversation;
pub use registry::{all_commands, find_command, matching_commands, CommandInvocation};

use crate::core::app::{App, AppAction};

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Hand an action to the reducer, e.g. an upload or credential submit.
    Dispatch(AppAction),
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        (command.handler)(app, CommandInvocation { args })
    } else {
        let suggestions: Vec<String> = matching_commands(command_name)
            .iter()
            .map(|command| format!("/{}", command.name))
            .collect();
        if suggestions.is_empty() {
            app.guidance(format!(
                "Unknown command: /{command_name}. Type /help for the list."
            ));
        } else {
            app.guidance(format!(
                "Unknown command: /{command_name}. Did you mean {}?",
                suggestions.join(" or ")
            ));
        }
        CommandResult::Continue
    }
}

#[cfg(test)]
mod tests;
