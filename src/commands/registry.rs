use super::{handlers, CommandResult};
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct CommandUsage {
    pub syntax: &'static str,
    pub description: &'static str,
}

pub struct Command {
    pub name: &'static str,
    pub usages: &'static [CommandUsage],
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.split_whitespace().nth(index)
    }

    pub fn args_len(&self) -> usize {
        self.args.split_whitespace().count()
    }

    /// Everything after the command name, with one pair of surrounding
    /// quotes removed. Used for paths that may contain spaces.
    pub fn rest(&self) -> Option<&'a str> {
        let rest = self.args.trim();
        if rest.is_empty() {
            return None;
        }
        let unquoted = ['"', '\'']
            .iter()
            .find_map(|quote| {
                rest.strip_prefix(*quote)
                    .and_then(|inner| inner.strip_suffix(*quote))
            })
            .unwrap_or(rest);
        Some(unquoted)
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for completion hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usages: &[CommandUsage {
            syntax: "/help",
            description: "Show available commands.",
        }],
        handler: handlers::core::handle_help,
    },
    Command {
        name: "upload",
        usages: &[CommandUsage {
            syntax: "/upload <path>",
            description: "Upload a PDF or TXT document and start a new session.",
        }],
        handler: handlers::core::handle_upload,
    },
    Command {
        name: "remove",
        usages: &[CommandUsage {
            syntax: "/remove",
            description: "Forget the current document and its chat.",
        }],
        handler: handlers::core::handle_remove,
    },
    Command {
        name: "model",
        usages: &[
            CommandUsage {
                syntax: "/model",
                description: "List the available models.",
            },
            CommandUsage {
                syntax: "/model <id|number>",
                description: "Select the model to store the API key for.",
            },
        ],
        handler: handlers::core::handle_model,
    },
    Command {
        name: "key",
        usages: &[CommandUsage {
            syntax: "/key <api-key>",
            description: "Store the provider API key for the selected model.",
        }],
        handler: handlers::core::handle_key,
    },
    Command {
        name: "status",
        usages: &[CommandUsage {
            syntax: "/status",
            description: "Show backend, credential and document details.",
        }],
        handler: handlers::core::handle_status,
    },
    Command {
        name: "history",
        usages: &[CommandUsage {
            syntax: "/history",
            description: "Reload the chat history from the backend.",
        }],
        handler: handlers::core::handle_history,
    },
    Command {
        name: "dismiss",
        usages: &[CommandUsage {
            syntax: "/dismiss",
            description: "Clear error banners and guidance.",
        }],
        handler: handlers::core::handle_dismiss,
    },
    Command {
        name: "log",
        usages: &[
            CommandUsage {
                syntax: "/log",
                description: "Pause or resume the transcript log.",
            },
            CommandUsage {
                syntax: "/log <filename>",
                description: "Append the transcript to a file.",
            },
        ],
        handler: handlers::io::handle_log,
    },
    Command {
        name: "dump",
        usages: &[CommandUsage {
            syntax: "/dump [filename]",
            description: "Write the current chat to a new file.",
        }],
        handler: handlers::io::handle_dump,
    },
    Command {
        name: "quit",
        usages: &[CommandUsage {
            syntax: "/quit",
            description: "Leave the chat.",
        }],
        handler: handlers::core::handle_quit,
    },
];
