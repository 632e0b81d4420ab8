use std::error::Error;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::executors::ExecutorContext;
use crate::api::{BackendGateway, HttpGateway};
use crate::core::app::{apply_actions, App, AppAction, AppActionDispatcher};
use crate::core::config::Config;
use crate::core::reveal::{RevealEvent, RevealService};
use crate::core::session::SessionId;
use crate::ui::console::ConsoleRenderer;
use crate::utils::logging::LoggingState;

pub struct ChatOptions {
    pub config: Config,
    pub log: Option<String>,
    pub resume: Option<SessionId>,
}

fn reveal_action(event: RevealEvent) -> AppAction {
    match event {
        RevealEvent::Step { reveal_id, shown } => AppAction::RevealStep { reveal_id, shown },
        RevealEvent::Finished { reveal_id } => AppAction::RevealFinished { reveal_id },
    }
}

/// Apply everything queued so far as one batch and start the resulting
/// side effects.
pub(crate) fn drain_action_queue(
    app: &mut App,
    executors: &ExecutorContext,
    first: AppAction,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
    reveal_rx: &mut mpsc::UnboundedReceiver<RevealEvent>,
) {
    let mut pending = vec![first];
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }
    while let Ok(event) = reveal_rx.try_recv() {
        pending.push(reveal_action(event));
    }

    let commands = apply_actions(app, pending);
    for command in commands {
        debug!(?command, "executing");
        executors.execute(command);
    }
}

/// Lines from stdin become input actions. End of input quits.
fn spawn_input_reader(dispatcher: AppActionDispatcher) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => dispatcher.dispatch(AppAction::SubmitInput { line }),
                Ok(None) => {
                    dispatcher.dispatch(AppAction::Quit);
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "failed to read input");
                    dispatcher.dispatch(AppAction::Quit);
                    break;
                }
            }
        }
    })
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let ChatOptions {
        config,
        log,
        resume,
    } = options;

    let gateway: Arc<dyn BackendGateway> =
        Arc::new(HttpGateway::new(config.backend_url(), config.request_timeout())?);
    let logging = LoggingState::new(log)?;
    let mut app = App::new(config, logging);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let (reveal, mut reveal_rx) = RevealService::new();
    let executors = ExecutorContext::new(gateway, dispatcher.clone(), reveal);

    let mut snapshots = app.subscribe();
    let mut renderer = ConsoleRenderer::new(io::stdout());

    println!("ragline: ask questions about a document. Type /help for commands.");
    dispatcher.dispatch(AppAction::Bootstrap { resume });
    let input_handle = spawn_input_reader(dispatcher.clone());

    let result = loop {
        if app.exit_requested() {
            break Ok(());
        }

        let first = tokio::select! {
            Some(action) = action_rx.recv() => action,
            Some(event) = reveal_rx.recv() => reveal_action(event),
            else => break Ok(()),
        };

        drain_action_queue(&mut app, &executors, first, &mut action_rx, &mut reveal_rx);

        if snapshots.has_changed().unwrap_or(false) {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Err(err) = renderer.render(&snapshot) {
                break Err(err.into());
            }
        }
    };

    input_handle.abort();
    result
}
