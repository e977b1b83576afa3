use serde::Deserialize;

/// How a file is handed to a tool.
///
/// - `Stdin`: the file contents are written to the tool's stdin (default).
/// - `Arg`: the file path is appended to the tool's arguments and stdin is
///   left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Stdin,
    Arg,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Stdin
    }
}
