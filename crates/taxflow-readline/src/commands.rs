//! REPL command parsing.

use std::path::PathBuf;

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/upload",
    "/fields",
    "/set",
    "/regime",
    "/submit",
    "/retry-chat",
    "/status",
    "/help",
];

pub const HELP: &str = "\
/upload <path>        upload a PDF and open the review form
/fields               show the review form
/set <field> <value>  edit a review field
/regime <old|new>     choose the tax regime
/submit               submit the review and compare regimes
/retry-chat           retry opening the advisor chat
/status               show the current stage and session
quit                  exit
anything else is sent to the advisor";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<PathBuf>),
    Fields,
    Set { field: String, value: String },
    Regime(String),
    Submit,
    RetryChat,
    Status,
    Help,
    Quit,
    Chat(String),
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parses a trimmed input line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line == "quit" || line == "exit" {
            return Some(Self::Quit);
        }
        if !line.starts_with('/') {
            return Some(Self::Chat(line.to_string()));
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "/upload" => Self::Upload((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "/fields" => Self::Fields,
            "/set" => match rest.split_once(char::is_whitespace) {
                Some((field, value)) => Self::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                None => Self::Usage("/set <field> <value>"),
            },
            "/regime" if rest.is_empty() => Self::Usage("/regime <old|new>"),
            "/regime" => Self::Regime(rest.to_string()),
            "/submit" => Self::Submit,
            "/retry-chat" => Self::RetryChat,
            "/status" => Self::Status,
            "/help" => Self::Help,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }
}
