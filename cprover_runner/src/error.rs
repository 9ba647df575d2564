// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cprover_ir::IrError;
use thiserror::Error;

/// Errors raised while running the CBMC tools or reading their output.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to invoke {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure. The captured output is kept for the caller.
    #[error("{program} exited with status {}", render_status(.status))]
    ProcessFailure { program: String, status: Option<i32>, stdout: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ir(#[from] IrError),
}

fn render_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<terminated by signal>".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
