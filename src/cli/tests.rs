use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["ragline"]);
    assert!(args.command.is_none());
    assert!(args.log.is_none());
    assert!(args.session.is_none());
}

#[test]
fn chat_flags_are_parsed() {
    let args = parse_args(&[
        "ragline",
        "--session",
        "abc-123",
        "-l",
        "chat.log",
        "--config",
        "/tmp/ragline.toml",
    ]);
    assert_eq!(args.session.as_deref(), Some("abc-123"));
    assert_eq!(args.log.as_deref(), Some("chat.log"));
    assert_eq!(
        args.config.as_deref(),
        Some(std::path::Path::new("/tmp/ragline.toml"))
    );
}

#[test]
fn global_flags_follow_subcommands() {
    let args = parse_args(&["ragline", "models", "--config", "alt.toml"]);
    assert_eq!(args.command, Some(Commands::Models));
    assert!(args.config.is_some());
}

#[test]
fn set_joins_multi_word_values() {
    let args = parse_args(&["ragline", "set", "backend-url", "http://localhost:9000"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "backend-url".to_string(),
            value: vec!["http://localhost:9000".to_string()],
        })
    );

    let args = parse_args(&["ragline", "set", "default-model"]);
    assert!(matches!(args.command, Some(Commands::Set { ref value, .. }) if value.is_empty()));
}

#[test]
fn unset_requires_a_key() {
    assert!(Args::try_parse_from(["ragline", "unset"]).is_err());
    let args = parse_args(&["ragline", "unset", "reveal-delay"]);
    assert_eq!(
        args.command,
        Some(Commands::Unset {
            key: "reveal-delay".to_string()
        })
    );
}

#[test]
fn status_and_config_subcommands() {
    assert_eq!(parse_args(&["ragline", "status"]).command, Some(Commands::Status));
    assert_eq!(parse_args(&["ragline", "config"]).command, Some(Commands::Config));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Args::try_parse_from(["ragline", "auth"]).is_err());
}
