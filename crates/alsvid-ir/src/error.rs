//! The shared error type for parsing and execution.

use thiserror::Error;

/// A parse-time or execution-time failure.
///
/// One representation covers both syntax/semantic errors (which carry a
/// source file and usually a line) and binding/arity errors raised while
/// executing a gate (which carry neither). The displayed text is baked at
/// construction so downstream layers can surface it verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Error {
    /// Source file the error was raised in, if known.
    pub file: Option<String>,
    /// Source line, if known.
    pub line: Option<usize>,
    /// The fully formatted message, including the location prefix.
    pub message: String,
}

impl Error {
    /// An error with no source location: `[error]: <msg>`.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            message: format!("[error]: {}", msg.into()),
        }
    }

    /// An error attributed to a file: `[error] in <file>: <msg>`.
    pub fn in_file(file: impl Into<String>, msg: impl Into<String>) -> Self {
        let file = file.into();
        let message = format!("[error] in {file}: {}", msg.into());
        Self {
            file: Some(file),
            line: None,
            message,
        }
    }

    /// An error attributed to a line in a file:
    /// `[error] on line <n> in <file>: <msg>`.
    pub fn at_line(file: impl Into<String>, line: usize, msg: impl Into<String>) -> Self {
        let file = file.into();
        let message = format!("[error] on line {line} in {file}: {}", msg.into());
        Self {
            file: Some(file),
            line: Some(line),
            message,
        }
    }
}

/// Result type used throughout the interpreter.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_message() {
        let e = Error::new("boom");
        assert_eq!(e.to_string(), "[error]: boom");
        assert!(e.file.is_none());
        assert!(e.line.is_none());
    }

    #[test]
    fn test_file_message() {
        let e = Error::in_file("a.qasm", "bad token");
        assert_eq!(e.to_string(), "[error] in a.qasm: bad token");
    }

    #[test]
    fn test_line_message() {
        let e = Error::at_line("a.qasm", 7, "missing ';'");
        assert_eq!(e.to_string(), "[error] on line 7 in a.qasm: missing ';'");
        assert_eq!(e.line, Some(7));
    }
}
