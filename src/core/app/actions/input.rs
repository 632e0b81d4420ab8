use super::{apply_action, App, AppAction, AppCommand};
use crate::commands::{process_input, CommandResult};

pub(super) fn handle_input_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SubmitInput { line } => match process_input(app, &line) {
            CommandResult::Continue => None,
            CommandResult::ProcessAsMessage(text) => {
                apply_action(app, AppAction::SendQuestion { text })
            }
            CommandResult::Dispatch(action) => apply_action(app, action),
        },
        AppAction::DismissNotices => {
            if app.dismiss_notices() == 0 {
                app.info("Nothing to dismiss.");
            }
            None
        }
        AppAction::Quit => {
            app.request_exit();
            None
        }
        _ => unreachable!("non-input action routed to input handler"),
    }
}
