pub(super) mod core;
pub(super) mod io;

use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::App;

pub(super) fn usage_status(app: &mut App, usage: &'static str) -> CommandResult {
    app.guidance(usage);
    CommandResult::Continue
}

pub(super) fn required_rest<'a>(
    app: &mut App,
    invocation: &CommandInvocation<'a>,
    usage: &'static str,
) -> Option<&'a str> {
    match invocation.rest() {
        Some(value) => Some(value),
        None => {
            app.guidance(usage);
            None
        }
    }
}
