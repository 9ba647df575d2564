// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::config::EngineConfig;
use crate::error::Result;
use crate::session::{run_checked, CapturedOutput};
use cprover_ir::goto_program::SymbolTable;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Given a `file.symtab.json`, produce `output` by calling symtab2gb.
pub fn run_symtab2gb(cfg: &EngineConfig, input: &Path, output: &Path) -> Result<CapturedOutput> {
    let mut cmd = Command::new(&cfg.symtab2gb);
    cmd.arg(input).arg("--out").arg(output);
    run_checked(cmd)
}

/// Write `symtab` as `{dir}/{name}.symtab.json`, one symbol at a time.
pub fn write_symbol_table(symtab: &SymbolTable, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.symtab.json"));
    let mut writer = BufWriter::new(std::fs::File::create(&path)?);
    serde_json::to_writer(&mut writer, symtab)?;
    writer.flush()?;
    debug!(path=%path.display(), symbols = symtab.len(), "wrote symbol table");
    Ok(path)
}

/// Write `symtab` into `dir` and convert it to a goto binary `{dir}/{name}.symtab.out`.
pub fn symbol_table_to_gotoc(
    cfg: &EngineConfig,
    symtab: &SymbolTable,
    dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let input = write_symbol_table(symtab, dir, name)?;
    let output = input.with_extension("out");
    run_symtab2gb(cfg, &input, &output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use cprover_ir::goto_program::{Location, Stmt, Symbol, Type};
    use cprover_ir::MachineModel;

    fn main_table() -> SymbolTable {
        let mut st = SymbolTable::new(MachineModel::x86_64()).unwrap();
        let body = Stmt::block(vec![Stmt::ret(None, Location::none())], Location::none());
        let main = Symbol::function(
            "main",
            Type::code(vec![], Type::empty()),
            Some(body),
            "main",
            Location::none(),
        );
        st.insert(main).unwrap();
        st
    }

    #[test]
    fn test_write_symbol_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_symbol_table(&main_table(), dir.path(), "main").unwrap();
        assert!(path.ends_with("main.symtab.json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["symbolTable"]["main"]["mode"], "C");
        assert_eq!(json["symbolTable"]["main"]["value"]["named_sub"]["statement"]["id"], "block");
    }

    #[test]
    fn test_symtab2gb_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::default().with_symtab2gb("false");
        let err = symbol_table_to_gotoc(&cfg, &main_table(), dir.path(), "main").unwrap_err();
        assert!(matches!(err, RunnerError::ProcessFailure { status: Some(1), .. }));
    }

    #[test]
    #[ignore = "needs symtab2gb"]
    fn test_symtab2gb_accepts_table() {
        let dir = tempfile::tempdir().unwrap();
        let out = symbol_table_to_gotoc(&EngineConfig::default(), &main_table(), dir.path(), "main")
            .unwrap();
        assert!(out.exists());
    }
}
