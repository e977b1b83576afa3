// src/exec/resolve.rs

//! Executable lookup and command-line tokenizing.

use std::path::PathBuf;

use tracing::debug;

use crate::errors::ResolveError;

/// Split a shell-like command line into words.
///
/// Handles single/double quotes and backslash escapes. Nothing is expanded.
pub fn split_command_line(line: &str) -> Result<Vec<String>, ResolveError> {
    shell_words::split(line).map_err(|source| ResolveError::Parse {
        line: line.to_string(),
        source,
    })
}

/// Resolve `command` to an executable path plus leading arguments.
///
/// The whole string is first looked up on `PATH` as-is. If that fails it is
/// parsed as a command line and the first word is looked up instead; the
/// remaining words are returned as arguments.
///
/// With `strict_parse`, a command line that cannot be parsed is reported as
/// [`ResolveError::Parse`]. Otherwise the original lookup failure is reported.
pub fn resolve_command(
    command: &str,
    strict_parse: bool,
) -> Result<(PathBuf, Vec<String>), ResolveError> {
    if command.trim().is_empty() {
        return Err(ResolveError::Empty);
    }

    let lookup_err = match which::which(command) {
        Ok(path) => {
            debug!(command, path = %path.display(), "resolved executable");
            return Ok((path, Vec::new()));
        }
        Err(e) => e,
    };

    let words = match split_command_line(command) {
        Ok(words) => words,
        Err(parse_err) if strict_parse => return Err(parse_err),
        Err(parse_err) => {
            debug!(command, error = %parse_err, "command line did not parse");
            return Err(ResolveError::NotFound {
                command: command.to_string(),
                source: lookup_err,
            });
        }
    };

    let Some((first, rest)) = words.split_first() else {
        return Err(ResolveError::Empty);
    };

    match which::which(first) {
        Ok(path) => {
            debug!(command, path = %path.display(), args = ?rest, "resolved command line");
            Ok((path, rest.to_vec()))
        }
        Err(source) => Err(ResolveError::NotFound {
            command: first.clone(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_words() {
        let words = split_command_line("shellcheck --norc -f json").unwrap();
        assert_eq!(words, vec!["shellcheck", "--norc", "-f", "json"]);
    }

    #[test]
    fn split_respects_quotes() {
        let words = split_command_line(r#"tool 'a b' "c d" e\ f"#).unwrap();
        assert_eq!(words, vec!["tool", "a b", "c d", "e f"]);
    }

    #[test]
    fn split_does_not_expand() {
        let words = split_command_line("echo $HOME *").unwrap();
        assert_eq!(words, vec!["echo", "$HOME", "*"]);
    }

    #[test]
    fn split_rejects_unterminated_quote() {
        let err = split_command_line("'broken' 'arg").unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn empty_and_blank_commands_fail() {
        assert!(matches!(resolve_command("", false), Err(ResolveError::Empty)));
        assert!(matches!(resolve_command("   ", true), Err(ResolveError::Empty)));
    }

    #[test]
    fn unparsable_line_error_depends_on_strictness() {
        let strict = resolve_command("'broken' 'arg", true).unwrap_err();
        assert!(matches!(strict, ResolveError::Parse { .. }));

        let lenient = resolve_command("'broken' 'arg", false).unwrap_err();
        assert!(matches!(lenient, ResolveError::NotFound { .. }));
    }

    #[test]
    fn missing_program_is_not_found() {
        let err = resolve_command("this-command-does-not-exist", true).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert!(err.to_string().contains("this-command-does-not-exist"));
    }
}
