use super::*;
use crate::core::app::NoticeKind;
use crate::core::message::Message;
use crate::core::session::SessionId;
use crate::utils::test_utils::create_test_app;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn last_notice(app: &App) -> (NoticeKind, String) {
    let notice = app.notices().last().expect("a notice");
    (notice.kind, notice.text.clone())
}

fn app_with_history(messages: Vec<Message>) -> App {
    let mut app = create_test_app();
    let session = SessionId::from("s1");
    app.chat.on_session_changed(Some(session.clone()));
    app.chat
        .apply_history(&session, Ok(messages), false)
        .expect("history applies");
    app
}

#[test]
fn registry_lists_commands() {
    let commands = all_commands();
    for name in ["help", "upload", "remove", "model", "key", "status", "quit"] {
        assert!(
            commands.iter().any(|cmd| cmd.name == name),
            "missing /{name}"
        );
    }
    assert!(find_command("HELP").is_some());
    assert!(find_command("clear").is_none());
}

#[test]
fn matching_commands_completes_prefixes() {
    let names: Vec<_> = matching_commands("d").iter().map(|cmd| cmd.name).collect();
    assert_eq!(names, vec!["dismiss", "dump"]);
    assert!(matching_commands("zzz").is_empty());
}

#[test]
fn plain_text_is_a_message() {
    let mut app = create_test_app();
    let result = process_input(&mut app, "What does chapter 3 say?");
    assert!(matches!(
        result,
        CommandResult::ProcessAsMessage(ref text) if text == "What does chapter 3 say?"
    ));
    assert!(app.notices().is_empty());
}

#[test]
fn lone_slash_is_treated_as_text() {
    let mut app = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/"),
        CommandResult::ProcessAsMessage(_)
    ));
}

#[test]
fn dispatch_reports_unknown_commands() {
    let mut app = create_test_app();
    let result = process_input(&mut app, "/does-not-exist now");
    assert!(matches!(result, CommandResult::Continue));
    assert_eq!(
        last_notice(&app),
        (
            NoticeKind::Guidance,
            "Unknown command: /does-not-exist. Type /help for the list.".to_string()
        )
    );
}

#[test]
fn unknown_prefix_suggests_commands() {
    let mut app = create_test_app();
    process_input(&mut app, "/d");
    assert_eq!(
        last_notice(&app),
        (
            NoticeKind::Guidance,
            "Unknown command: /d. Did you mean /dismiss or /dump?".to_string()
        )
    );
}

#[test]
fn help_command_includes_registry_metadata() {
    let mut app = create_test_app();
    let result = process_input(&mut app, "/help");
    assert!(matches!(result, CommandResult::Continue));
    let (kind, text) = last_notice(&app);
    assert_eq!(kind, NoticeKind::Info);
    assert!(text.contains("/upload <path>"));
    assert!(text.contains("Store the provider API key"));
}

#[test]
fn upload_keeps_paths_with_spaces() {
    let mut app = create_test_app();
    let result = process_input(&mut app, "/upload \"My Docs/annual report.pdf\"");
    match result {
        CommandResult::Dispatch(AppAction::UploadDocument { path }) => {
            assert_eq!(path, PathBuf::from("My Docs/annual report.pdf"));
        }
        _ => panic!("expected an upload dispatch"),
    }
}

#[test]
fn upload_without_path_shows_usage() {
    let mut app = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/upload"),
        CommandResult::Continue
    ));
    assert_eq!(
        last_notice(&app),
        (NoticeKind::Guidance, "Usage: /upload <path>".to_string())
    );
}

#[test]
fn model_without_args_lists_options_and_marks_selection() {
    let mut app = create_test_app();
    app.lifecycle
        .select_model("llama-3.3-70b-versatile")
        .expect("valid model");
    process_input(&mut app, "/model");
    let (kind, text) = last_notice(&app);
    assert_eq!(kind, NoticeKind::Info);
    assert!(text.contains("  1. Llama 3.1 8B Instant (llama-3.1-8b-instant)"));
    assert!(text.contains("* 2. Llama 3.3 70B Versatile (llama-3.3-70b-versatile)"));
}

#[test]
fn model_accepts_number_or_id() {
    let mut app = create_test_app();
    match process_input(&mut app, "/model 2") {
        CommandResult::Dispatch(AppAction::SelectModel { model }) => {
            assert_eq!(model, "llama-3.3-70b-versatile")
        }
        _ => panic!("expected a model dispatch"),
    }
    match process_input(&mut app, "/model my-custom-model") {
        CommandResult::Dispatch(AppAction::SelectModel { model }) => {
            assert_eq!(model, "my-custom-model")
        }
        _ => panic!("expected a model dispatch"),
    }
    // Out of range numbers are passed through as ids.
    match process_input(&mut app, "/model 9") {
        CommandResult::Dispatch(AppAction::SelectModel { model }) => assert_eq!(model, "9"),
        _ => panic!("expected a model dispatch"),
    }
}

#[test]
fn key_is_dispatched_but_never_echoed() {
    let mut app = create_test_app();
    match process_input(&mut app, "/key gsk_secret") {
        CommandResult::Dispatch(AppAction::SubmitCredential { api_key }) => {
            assert_eq!(api_key, "gsk_secret")
        }
        _ => panic!("expected a credential dispatch"),
    }
    assert!(app
        .notices()
        .iter()
        .all(|notice| !notice.text.contains("gsk_secret")));

    assert!(matches!(
        process_input(&mut app, "/key"),
        CommandResult::Continue
    ));
    assert_eq!(
        last_notice(&app),
        (NoticeKind::Guidance, "Usage: /key <api-key>".to_string())
    );
}

#[test]
fn status_reports_missing_document() {
    let mut app = create_test_app();
    process_input(&mut app, "/status");
    let (kind, text) = last_notice(&app);
    assert_eq!(kind, NoticeKind::Info);
    assert!(text.contains("Document:   none"));
    assert!(text.contains("API key:    not stored"));
    assert!(text.contains("Logging:    disabled"));
}

#[test]
fn simple_commands_dispatch_actions() {
    let mut app = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/remove"),
        CommandResult::Dispatch(AppAction::RemoveDocument)
    ));
    assert!(matches!(
        process_input(&mut app, "/History"),
        CommandResult::Dispatch(AppAction::ReloadHistory)
    ));
    assert!(matches!(
        process_input(&mut app, "/dismiss"),
        CommandResult::Dispatch(AppAction::DismissNotices)
    ));
    assert!(matches!(
        process_input(&mut app, "/quit"),
        CommandResult::Dispatch(AppAction::Quit)
    ));
}

#[test]
fn test_dump_conversation() {
    let app = app_with_history(vec![
        Message::user("What is the conclusion?"),
        Message::assistant("The conclusion is X."),
    ]);
    let temp_dir = tempdir().unwrap();
    let dump_file_path = temp_dir.path().join("test_dump.txt");

    dump_conversation(&app, &dump_file_path).expect("dump succeeds");

    let contents = fs::read_to_string(&dump_file_path).unwrap();
    assert_eq!(
        contents,
        "You: What is the conclusion?\n\nThe conclusion is X.\n\n"
    );

    let err = dump_conversation(&app, &dump_file_path).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn dump_of_empty_chat_is_guidance() {
    let temp_dir = tempdir().unwrap();
    let mut app = create_test_app();
    let target = temp_dir.path().join("empty.txt");
    let line = format!("/dump {}", target.display());
    process_input(&mut app, &line);
    let (kind, text) = last_notice(&app);
    assert_eq!(kind, NoticeKind::Guidance);
    assert!(text.contains("chat history is empty"));
    assert!(!target.exists());
}

#[test]
fn log_command_enables_and_toggles_logging() {
    let temp_dir = tempdir().unwrap();
    let mut app = create_test_app();

    process_input(&mut app, "/log");
    assert_eq!(last_notice(&app).0, NoticeKind::Guidance);

    let target = temp_dir.path().join("chat.log");
    process_input(&mut app, &format!("/log {}", target.display()));
    assert!(app.logging.is_active());
    assert!(last_notice(&app).1.starts_with("Logging enabled to:"));

    process_input(&mut app, "/log");
    assert!(!app.logging.is_active());
    let contents = fs::read_to_string(&target).unwrap();
    assert!(contents.starts_with("## Logging paused at "));
}
