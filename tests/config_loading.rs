// tests/config_loading.rs

use std::io::Write;
use tempfile::NamedTempFile;
use procpool::config::load_and_validate;
use procpool::errors::ProcpoolError;
use procpool::types::InputMode;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_full_config_is_loaded() {
    let file = write_config(
        r#"
[config]
max_concurrency = 3

[tool.shellcheck]
cmd = "shellcheck --format=json -"

[tool.yamllint]
cmd = "yamllint"
args = ["-f", "parsable"]
input = "arg"
combine_output = true
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.max_concurrency(), 3);
    assert_eq!(cfg.tool_names().collect::<Vec<_>>(), vec!["shellcheck", "yamllint"]);

    let shellcheck = &cfg.tool["shellcheck"];
    assert_eq!(shellcheck.input, InputMode::Stdin);
    assert!(!shellcheck.combine_output);
    assert!(shellcheck.args.is_empty());

    let yamllint = &cfg.tool["yamllint"];
    assert_eq!(yamllint.input, InputMode::Arg);
    assert!(yamllint.combine_output);
    assert_eq!(yamllint.args, vec!["-f", "parsable"]);
}

#[test]
fn test_default_concurrency_is_positive() {
    let file = write_config(
        r#"
[tool.cat]
cmd = "cat"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    assert!(cfg.config.max_concurrency.is_none());
    assert!(cfg.max_concurrency() >= 1);
}

#[test]
fn test_missing_tools_returns_config_error() {
    let file = write_config(
        r#"
[config]
max_concurrency = 2
"#,
    );

    match load_and_validate(file.path()) {
        Err(ProcpoolError::Config(msg)) => assert!(msg.contains("[tool.<name>]")),
        Err(e) => panic!("Expected Config error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_bad_input_mode_returns_toml_error() {
    let file = write_config(
        r#"
[tool.cat]
cmd = "cat"
input = "pipe"
"#,
    );

    match load_and_validate(file.path()) {
        Err(ProcpoolError::Toml(_)) => {}
        Err(e) => panic!("Expected Toml error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Procpool.toml"));
    assert!(matches!(result, Err(ProcpoolError::Io(_))));
}
