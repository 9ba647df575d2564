// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::config::EngineConfig;
use crate::error::Result;
use crate::session::{run_captured, run_checked, CapturedOutput};
use cprover_ir::irep::{extract_symbol_table, parse_message_stream};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Flags that make CBMC print its symbol table as JSON and stop.
const SHOW_SYMBOL_TABLE: [&str; 2] = ["--json-ui", "--show-symbol-table"];

fn cbmc_command(
    cfg: &EngineConfig,
    input: &Path,
    flags: &[&str],
    options: &BTreeMap<String, String>,
) -> Command {
    let mut args: Vec<OsString> = vec![input.to_owned().into_os_string()];
    args.extend(flags.iter().map(OsString::from));
    for (key, value) in options {
        args.push(format!("--{key}").into());
        args.push(value.into());
    }
    let mut cmd = Command::new(&cfg.cbmc);
    cmd.args(args);
    cmd
}

/// Run CBMC on `input`. `flags` are passed as given, each `options` entry as `--key value`.
/// A failed verification is not an error: the exit status is part of the captured output.
pub fn run_cbmc_file(
    cfg: &EngineConfig,
    input: &Path,
    flags: &[&str],
    options: &BTreeMap<String, String>,
) -> Result<CapturedOutput> {
    run_captured(cbmc_command(cfg, input, flags, options))
}

/// Like `run_cbmc_file`, on C source held in memory.
pub fn run_cbmc_string(
    cfg: &EngineConfig,
    source: &str,
    flags: &[&str],
    options: &BTreeMap<String, String>,
) -> Result<CapturedOutput> {
    let mut file = tempfile::Builder::new().suffix(".c").tempfile()?;
    file.write_all(source.as_bytes())?;
    file.flush()?;
    debug!(path=%file.path().display(), "wrote C source");
    run_cbmc_file(cfg, file.path(), flags, options)
}

/// The symbol table CBMC builds for a C program, i.e. the `symbolTable` object of its JSON
/// output.
pub fn symtab_of_c(cfg: &EngineConfig, source: &str) -> Result<Value> {
    let mut file = tempfile::Builder::new().suffix(".c").tempfile()?;
    file.write_all(source.as_bytes())?;
    file.flush()?;
    let captured =
        run_checked(cbmc_command(cfg, file.path(), &SHOW_SYMBOL_TABLE, &BTreeMap::new()))?;
    let messages = parse_message_stream(&captured.stdout)?;
    let message = extract_symbol_table(&messages)?;
    Ok(message["symbolTable"].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use cprover_ir::IrError;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    const EXAMPLE: &str = r#"
int main(int argc, char *argv[]) {
  int arr[] = {0, 1, 2, 3};
  __CPROVER_assert(arr[3] != 3, "expected failure: arr[3] == 3");
}
"#;

    /// A stand-in for cbmc that prints `output` and exits with `status`.
    fn fake_cbmc(dir: &Path, output: &str, status: i32) -> PathBuf {
        let path = dir.join(format!("fake-cbmc-{status}-{}", output.len()));
        let script = format!("#!/bin/sh\ncat <<'EOF'\n{output}\nEOF\nexit {status}\n");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_arguments() {
        let cfg = EngineConfig::default().with_cbmc("echo");
        let options = BTreeMap::from([("unwind".to_string(), "3".to_string())]);
        let out = run_cbmc_string(&cfg, "int main() {}", &["--bounds-check"], &options).unwrap();
        let words: Vec<&str> = out.stdout.split_whitespace().collect();
        assert!(words[0].ends_with(".c"));
        assert_eq!(&words[1..], ["--bounds-check", "--unwind", "3"]);
    }

    #[test]
    fn test_failure_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let cbmc = fake_cbmc(dir.path(), "VERIFICATION FAILED", 10);
        let cfg = EngineConfig::default().with_cbmc(cbmc);
        let out = run_cbmc_string(&cfg, EXAMPLE, &[], &BTreeMap::new()).unwrap();
        assert_eq!(out.status, Some(10));
        assert!(out.stdout.contains("VERIFICATION FAILED"));
    }

    #[test]
    fn test_symtab_of_c_with_fake_cbmc() {
        let dir = tempfile::tempdir().unwrap();
        let output = r#"[{"program": "CBMC 5.95.1"}, {"symbolTable": {"main": {"name": "main"}}}]"#;
        let cfg = EngineConfig::default().with_cbmc(fake_cbmc(dir.path(), output, 0));
        let table = symtab_of_c(&cfg, EXAMPLE).unwrap();
        assert_eq!(table["main"]["name"], "main");

        let cfg = EngineConfig::default().with_cbmc(fake_cbmc(dir.path(), "[]", 0));
        assert!(matches!(
            symtab_of_c(&cfg, EXAMPLE),
            Err(RunnerError::Ir(IrError::ExtractionCount { found: 0 }))
        ));

        let cfg = EngineConfig::default().with_cbmc(fake_cbmc(dir.path(), "[]", 6));
        assert!(matches!(symtab_of_c(&cfg, EXAMPLE), Err(RunnerError::ProcessFailure { .. })));
    }

    #[test]
    #[ignore = "needs cbmc"]
    fn test_run_cbmc() {
        let cfg = EngineConfig::default();
        let out = run_cbmc_string(&cfg, EXAMPLE, &[], &BTreeMap::new()).unwrap();
        assert!(!out.success());
        let table = symtab_of_c(&cfg, EXAMPLE).unwrap();
        assert!(table.get("main").is_some());
    }
}
