//! Backend calls spawned on behalf of the reducer.

use tracing::{debug, warn};

use super::ExecutorContext;
use crate::api::{PersistMessageRequest, QueryRequest, StoreCredentialRequest};
use crate::core::app::{AppAction, PendingQuestion, UploadTicket};
use crate::core::session::SessionId;

/// Health and credential status are reported as soon as each arrives. A
/// resumed session's document info follows.
pub fn spawn_bootstrap(ctx: ExecutorContext, resume: Option<SessionId>) {
    tokio::spawn(async move {
        let result = ctx.gateway.health().await;
        ctx.dispatcher.dispatch(AppAction::HealthChecked { result });

        let result = ctx.gateway.credential_status().await;
        ctx.dispatcher
            .dispatch(AppAction::CredentialStatusLoaded { result });

        if let Some(session_id) = resume {
            let result = ctx.gateway.document_info(&session_id).await;
            ctx.dispatcher
                .dispatch(AppAction::RestoreFinished { session_id, result });
        }
    });
}

pub fn spawn_store_credential(ctx: ExecutorContext, request: StoreCredentialRequest) {
    tokio::spawn(async move {
        let result = ctx.gateway.store_credential(&request).await;
        ctx.dispatcher.dispatch(AppAction::CredentialStored {
            model: request.model,
            result,
        });
    });
}

pub fn spawn_upload(ctx: ExecutorContext, ticket: UploadTicket) {
    tokio::spawn(async move {
        let result = ctx.gateway.upload(&ticket.file).await;
        ctx.dispatcher
            .dispatch(AppAction::UploadFinished { ticket, result });
    });
}

pub fn spawn_history_load(ctx: ExecutorContext, session_id: SessionId, seed_welcome: bool) {
    tokio::spawn(async move {
        let result = ctx.gateway.get_messages(&session_id).await;
        ctx.dispatcher.dispatch(AppAction::HistoryLoaded {
            session_id,
            seed_welcome,
            result,
        });
    });
}

/// Persist the question, then ask for its answer. A failed persist is only
/// logged. Cancellation (the session changed) drops the request silently.
pub fn spawn_question(ctx: ExecutorContext, pending: PendingQuestion, query: QueryRequest) {
    tokio::spawn(async move {
        let cancel_token = pending.cancel_token.clone();
        let persist = pending.persist_request();

        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!(request_id = pending.request_id, "question cancelled before persisting");
                return;
            }
            result = ctx.gateway.send_message(&persist) => {
                if let Err(err) = result {
                    warn!(session = %pending.session_id, error = %err, "failed to persist question");
                }
            }
        }

        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!(request_id = pending.request_id, "query cancelled");
            }
            result = ctx.gateway.query(&query) => {
                ctx.dispatcher.dispatch(AppAction::QueryFinished {
                    request_id: pending.request_id,
                    session_id: pending.session_id,
                    result,
                });
            }
        }
    });
}

pub fn spawn_persist_message(ctx: ExecutorContext, request: PersistMessageRequest) {
    tokio::spawn(async move {
        if let Err(err) = ctx.gateway.send_message(&request).await {
            warn!(
                session = %request.session_id,
                role = request.role.as_str(),
                error = %err,
                "failed to persist message"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::api::{CredentialStatus, DocumentInfo};
    use crate::core::app::AppActionDispatcher;
    use crate::core::error::BackendError;
    use crate::core::message::{Message, TranscriptRole};
    use crate::core::reveal::RevealService;
    use crate::utils::test_utils::{FakeGateway, GatewayCall};

    fn context(gateway: Arc<FakeGateway>) -> (ExecutorContext, mpsc::UnboundedReceiver<AppAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (reveal, _reveal_rx) = RevealService::new();
        (
            ExecutorContext::new(gateway, AppActionDispatcher::new(tx), reveal),
            rx,
        )
    }

    fn pending(token: CancellationToken) -> (PendingQuestion, QueryRequest) {
        let session_id = SessionId::from("s1");
        (
            PendingQuestion {
                request_id: 3,
                session_id: session_id.clone(),
                question: "What is the conclusion?".to_string(),
                cancel_token: token,
            },
            QueryRequest {
                session_id,
                question: "What is the conclusion?".to_string(),
                n_results: 3,
                model: None,
            },
        )
    }

    #[tokio::test]
    async fn bootstrap_reports_each_check_in_order() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.script_credential_status(Ok(CredentialStatus {
            has_api_key: true,
            model: Some("llama-3.3-70b-versatile".to_string()),
        }));
        gateway.script_document_info(Ok(DocumentInfo {
            file_name: Some("report.pdf".to_string()),
            file_size: None,
            file_type: None,
            chunk_count: None,
            page_count: None,
            from_cache: true,
            processing_time_secs: None,
            uploaded_at: None,
        }));
        let (ctx, mut rx) = context(gateway.clone());

        spawn_bootstrap(ctx, Some(SessionId::from("s9")));

        assert!(matches!(
            rx.recv().await,
            Some(AppAction::HealthChecked { result: Ok(()) })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppAction::CredentialStatusLoaded { result: Ok(ref status) }) if status.has_api_key
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppAction::RestoreFinished { ref session_id, result: Ok(_) }) if session_id.as_str() == "s9"
        ));
        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::Health,
                GatewayCall::CredentialStatus,
                GatewayCall::DocumentInfo(SessionId::from("s9")),
            ]
        );
    }

    #[tokio::test]
    async fn question_is_persisted_before_query() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.script_answer(Ok("The conclusion is X.".to_string()));
        let (ctx, mut rx) = context(gateway.clone());
        let (pending, query) = pending(CancellationToken::new());

        spawn_question(ctx, pending, query);

        match rx.recv().await {
            Some(AppAction::QueryFinished {
                request_id,
                result,
                ..
            }) => {
                assert_eq!(request_id, 3);
                assert_eq!(result, Ok("The conclusion is X.".to_string()));
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::SendMessage(
                    Message::user("What is the conclusion?"),
                    SessionId::from("s1")
                ),
                GatewayCall::Query {
                    session_id: SessionId::from("s1"),
                    question: "What is the conclusion?".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn persist_failure_does_not_stop_the_query() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.script_send_message(Err(BackendError::Transport("down".to_string())));
        gateway.script_answer(Ok("still answered".to_string()));
        let (ctx, mut rx) = context(gateway);
        let (pending, query) = pending(CancellationToken::new());

        spawn_question(ctx, pending, query);

        assert!(matches!(
            rx.recv().await,
            Some(AppAction::QueryFinished { result: Ok(ref answer), .. }) if answer == "still answered"
        ));
    }

    #[tokio::test]
    async fn cancelled_question_dispatches_nothing() {
        let gateway = Arc::new(FakeGateway::new());
        let (ctx, mut rx) = context(gateway.clone());
        let token = CancellationToken::new();
        token.cancel();
        let (pending, query) = pending(token);

        spawn_question(ctx, pending, query);

        let outcome = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        // The sender side lives on in the spawned task until it returns, so
        // either the channel closes or nothing arrives in time.
        assert!(matches!(outcome, Ok(None) | Err(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn answers_and_uploads_round_trip_through_actions() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.script_messages(Ok(vec![Message::user("q"), Message::assistant("a")]));
        let (ctx, mut rx) = context(gateway.clone());

        spawn_history_load(ctx.clone(), SessionId::from("s1"), true);
        match rx.recv().await {
            Some(AppAction::HistoryLoaded {
                seed_welcome,
                result: Ok(messages),
                ..
            }) => {
                assert!(seed_welcome);
                assert_eq!(messages.len(), 2);
            }
            other => panic!("unexpected action: {other:?}"),
        }

        spawn_persist_message(
            ctx,
            PersistMessageRequest {
                session_id: SessionId::from("s1"),
                role: TranscriptRole::Assistant,
                content: "a".to_string(),
            },
        );
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(gateway.calls().contains(&GatewayCall::SendMessage(
            Message::assistant("a"),
            SessionId::from("s1")
        )));
    }
}
