/*============================================================
  Synavera Project: Quack
  Module: quack::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Quack error types so every operation shares one
    diagnostic vocabulary and one exit policy.

  Security / Safety Notes:
    Messages carry package names and paths only; no command
    output beyond trimmed stderr is surfaced.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures up to the binary
    entry point, which renders and maps them to exit codes.

  Revision History:
    2026-10-19 COD  Established Quack error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Quack operations.
pub type Result<T> = std::result::Result<T, QuackError>;

/// Enumerates high-level error domains surfaced by Quack.
#[derive(Debug, Error)]
pub enum QuackError {
    #[error("required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("configuration: {0}")]
    Config(String),
    #[error("network: {0}")]
    Network(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("filesystem: {0}")]
    Filesystem(String),
    #[error("{0}")]
    Runtime(String),
    /// Bad selection or missing operation; reported, never retried.
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Privilege(String),
    /// The operator chose to quit at a review prompt.
    #[error("aborted by user")]
    Quit,
    /// A child process status that becomes our own exit status.
    #[error("exited with status {0}")]
    Exit(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl QuackError {
    /// Map error category to the process exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    fn exit_status(&self) -> u8 {
        match self {
            QuackError::Exit(code) => u8::try_from(*code)
                .ok()
                .filter(|status| *status != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }

    /// Whether the entry point should print this error to the operator.
    pub fn is_reported(&self) -> bool {
        !matches!(self, QuackError::Quit | QuackError::Exit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_one() {
        let errors = [
            QuackError::Input("3 is not a valid input".into()),
            QuackError::Privilege("root".into()),
            QuackError::Network("down".into()),
            QuackError::Quit,
        ];
        for err in errors {
            assert_eq!(err.exit_status(), 1);
        }
    }

    #[test]
    fn child_status_is_propagated() {
        assert_eq!(QuackError::Exit(4).exit_status(), 4);
        assert_eq!(QuackError::Exit(-1).exit_status(), 1);
        assert!(!QuackError::Exit(4).is_reported());
        assert!(!QuackError::Quit.is_reported());
        assert!(QuackError::Input("x".into()).is_reported());
    }
}
