//! Subcommands and the JSON envelope they print.

pub mod config;
pub mod doctor;
pub mod migrate;

use std::fmt::Display;
use std::future::Future;

use serde_json::json;

/// Why a command failed. Each class maps to its own process exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    ConfigValidation,
    RuntimeInit,
    DbConnectivity,
    Migration,
}

impl FailureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigValidation => "config_validation",
            Self::RuntimeInit => "runtime_init",
            Self::DbConnectivity => "db_connectivity",
            Self::Migration => "migration",
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::ConfigValidation => 2,
            Self::RuntimeInit => 3,
            Self::DbConnectivity => 4,
            Self::Migration => 5,
        }
    }
}

#[derive(Debug)]
pub struct CommandFailure {
    pub class: FailureClass,
    pub message: String,
}

impl CommandFailure {
    pub fn new(class: FailureClass, message: impl Display) -> Self {
        Self { class, message: message.to_string() }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn ok(command: &str, message: impl Into<String>) -> Self {
        let output = json!({
            "command": command,
            "status": "ok",
            "error_class": null,
            "message": message.into(),
        });
        Self { exit_code: 0, output: output.to_string() }
    }

    pub fn failed(command: &str, failure: CommandFailure) -> Self {
        let output = json!({
            "command": command,
            "status": "error",
            "error_class": failure.class.as_str(),
            "message": failure.message,
        });
        Self { exit_code: failure.class.exit_code(), output: output.to_string() }
    }

    pub fn from_outcome(command: &str, outcome: Result<String, CommandFailure>) -> Self {
        match outcome {
            Ok(message) => Self::ok(command, message),
            Err(failure) => Self::failed(command, failure),
        }
    }
}

/// Drives `future` to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CommandFailure> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            CommandFailure::new(
                FailureClass::RuntimeInit,
                format!("failed to start async runtime: {error}"),
            )
        },
    )?;
    Ok(runtime.block_on(future))
}
