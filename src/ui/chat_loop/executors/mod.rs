use std::sync::Arc;

use crate::api::BackendGateway;
use crate::core::app::{AppActionDispatcher, AppCommand};
use crate::core::reveal::RevealService;

pub mod gateway;

#[derive(Clone)]
pub struct ExecutorContext {
    pub gateway: Arc<dyn BackendGateway>,
    pub dispatcher: AppActionDispatcher,
    pub reveal: RevealService,
}

impl ExecutorContext {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        dispatcher: AppActionDispatcher,
        reveal: RevealService,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            reveal,
        }
    }

    /// Start the side effect a handler asked for. Results come back as
    /// actions through the dispatcher.
    pub fn execute(&self, command: AppCommand) {
        match command {
            AppCommand::Bootstrap { resume } => gateway::spawn_bootstrap(self.clone(), resume),
            AppCommand::StoreCredential(request) => {
                gateway::spawn_store_credential(self.clone(), request)
            }
            AppCommand::Upload(ticket) => gateway::spawn_upload(self.clone(), ticket),
            AppCommand::LoadHistory {
                session_id,
                seed_welcome,
            } => gateway::spawn_history_load(self.clone(), session_id, seed_welcome),
            AppCommand::SendQuestion { pending, query } => {
                gateway::spawn_question(self.clone(), pending, query)
            }
            AppCommand::Reveal(plan) => self.reveal.spawn_reveal(plan),
            AppCommand::PersistMessage(request) => {
                gateway::spawn_persist_message(self.clone(), request)
            }
        }
    }
}
