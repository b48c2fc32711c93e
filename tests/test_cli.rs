use cloudnotes::cli::args::{Args, Command};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn given_no_subcommand_when_parsing_then_fails() {
    // Arrange
    let args = vec!["cloudnotes", "-v"];

    // Act & Assert
    let result = Args::try_parse_from(args);
    assert!(result.is_err(), "Should fail without subcommand");
}

#[test]
fn given_list_command_when_parsing_then_defaults_to_plain_output() {
    // Arrange
    let args = vec!["cloudnotes", "list"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::List { json, open } => {
            assert!(!json);
            assert!(!open);
        }
        _ => panic!("Expected List command"),
    }
    assert_eq!(parsed.config, None);
}

#[test]
fn given_list_with_json_and_open_when_parsing_then_fails() {
    let args = vec!["cloudnotes", "list", "--json", "--open"];

    let result = Args::try_parse_from(args);

    assert!(result.is_err(), "--json and --open are exclusive");
}

#[test]
fn given_create_command_with_image_when_parsing_then_succeeds() {
    // Arrange
    let args = vec![
        "cloudnotes",
        "create",
        "--name",
        "Trip",
        "-d",
        "Beach day",
        "-i",
        "/photos/beach.png",
    ];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Create {
            name,
            description,
            image,
        } => {
            assert_eq!(name, "Trip");
            assert_eq!(description, "Beach day");
            assert_eq!(image, Some(PathBuf::from("/photos/beach.png")));
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn given_create_without_description_when_parsing_then_fails() {
    let args = vec!["cloudnotes", "create", "--name", "Trip"];

    let result = Args::try_parse_from(args);

    assert!(result.is_err(), "Description is required");
}

#[test]
fn given_delete_command_when_parsing_then_keeps_id_opaque() {
    // Arrange
    let args = vec!["cloudnotes", "delete", "4f1c0a2e-uuid"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Delete { note_id } => assert_eq!(note_id, "4f1c0a2e-uuid"),
        _ => panic!("Expected Delete command"),
    }
}

#[test]
fn given_login_command_when_parsing_then_reads_username_and_token() {
    let args = vec!["cloudnotes", "login", "-u", "ada", "-t", "eyJraWQ"];

    let parsed = Args::try_parse_from(args).unwrap();

    match parsed.command {
        Command::Login { username, token } => {
            assert_eq!(username, "ada");
            assert_eq!(token, "eyJraWQ");
        }
        _ => panic!("Expected Login command"),
    }
}

#[test]
fn given_verbose_flag_when_parsing_then_increments_count() {
    // Arrange
    let args = vec!["cloudnotes", "-vv", "shell"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert_eq!(parsed.verbose, 2);
    assert!(matches!(parsed.command, Command::Shell));
}

#[test]
fn given_config_flag_after_subcommand_when_parsing_then_succeeds() {
    // Arrange - global flags work anywhere when marked as global
    let args = vec!["cloudnotes", "logout", "-c", "/etc/cloudnotes.toml"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert!(matches!(parsed.command, Command::Logout));
    assert_eq!(parsed.config, Some(PathBuf::from("/etc/cloudnotes.toml")));
}

#[test]
fn given_init_with_force_when_parsing_then_sets_flag() {
    let parsed = Args::try_parse_from(vec!["cloudnotes", "init", "--force"]).unwrap();

    assert!(matches!(parsed.command, Command::Init { force: true }));
}
