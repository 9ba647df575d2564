// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running external programs, and the logger of the `cprover-symtab` binary.

use crate::error::{Result, RunnerError};
use std::process::Command;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::{filter::Directive, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable used to control log tracing.
pub const LOG_ENV_VAR: &str = "CPROVER_LOG";

/// The captured result of a finished process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Render a command as a shell would print it, for logs.
pub fn render_command(cmd: &Command) -> String {
    let mut rendered = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Run a job and capture its output. Any exit status is returned; only failing to start the
/// program is an error.
pub fn run_captured(mut cmd: Command) -> Result<CapturedOutput> {
    debug!(cmd = render_command(&cmd), "running");
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd.output().map_err(|source| RunnerError::Spawn { program, source })?;
    let captured = CapturedOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(status = ?captured.status, "finished");
    Ok(captured)
}

/// Run a job and fail with the captured output if it does not exit successfully.
pub fn run_checked(cmd: Command) -> Result<CapturedOutput> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let captured = run_captured(cmd)?;
    if captured.success() {
        Ok(captured)
    } else {
        Err(RunnerError::ProcessFailure {
            program,
            status: captured.status,
            stdout: captured.stdout,
            stderr: captured.stderr,
        })
    }
}

/// Initialize the logger using the CPROVER_LOG environment variable and the `--log-level`
/// argument. Logs go to stderr so they never mix with the JSON printed on stdout.
pub fn init_logger(log_level: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_env(LOG_ENV_VAR);
    let filter = match log_level {
        Some(log_level) => filter.add_directive(Directive::from_str(log_level)?),
        None => filter,
    };

    if json {
        json_logs(filter)
    } else {
        plain_logs(filter)
    }
}

/// Configure global logger to use a json logger.
fn json_logs(filter: EnvFilter) -> anyhow::Result<()> {
    use tracing_subscriber::fmt::layer;
    let subscriber =
        Registry::default().with(filter).with(layer().json().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Configure global logger to print one line per event.
fn plain_logs(filter: EnvFilter) -> anyhow::Result<()> {
    use tracing_subscriber::fmt::layer;
    let subscriber =
        Registry::default().with(filter).with(layer().with_writer(std::io::stderr).with_target(true));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn test_run_captured_keeps_failures() {
        let out = run_captured(sh("echo out; echo err >&2; exit 3")).unwrap();
        assert_eq!(out.status, Some(3));
        assert!(!out.success());
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[test]
    fn test_run_checked() {
        assert!(run_checked(sh("exit 0")).unwrap().success());
        match run_checked(sh("echo partial; exit 1")) {
            Err(RunnerError::ProcessFailure { program, status, stdout, .. }) => {
                assert_eq!(program, "sh");
                assert_eq!(status, Some(1));
                assert_eq!(stdout, "partial\n");
            }
            other => panic!("expected a process failure, got {other:?}"),
        }
    }

    #[test]
    fn test_spawn_failure() {
        let cmd = Command::new("no-such-program-cprover-test");
        assert!(matches!(run_captured(cmd), Err(RunnerError::Spawn { .. })));
    }

    #[test]
    fn test_render_command() {
        let mut cmd = Command::new("cbmc");
        cmd.args(["main.c", "--json-ui"]);
        assert_eq!(render_command(&cmd), "cbmc main.c --json-ui");
    }
}
