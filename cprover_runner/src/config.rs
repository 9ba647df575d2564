// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where to find the CBMC tools.

use crate::error::{Result, RunnerError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths of the external programs. By default they are looked up in `PATH` when invoked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub cbmc: PathBuf,
    pub symtab2gb: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { cbmc: PathBuf::from("cbmc"), symtab2gb: PathBuf::from("symtab2gb") }
    }
}

impl EngineConfig {
    pub fn with_cbmc<P: Into<PathBuf>>(mut self, cbmc: P) -> Self {
        self.cbmc = cbmc.into();
        self
    }

    pub fn with_symtab2gb<P: Into<PathBuf>>(mut self, symtab2gb: P) -> Self {
        self.symtab2gb = symtab2gb.into();
        self
    }

    /// Resolve both programs to absolute paths, failing early if one is not installed.
    pub fn locate(&self) -> Result<EngineConfig> {
        Ok(EngineConfig { cbmc: find(&self.cbmc)?, symtab2gb: find(&self.symtab2gb)? })
    }
}

fn find(program: &Path) -> Result<PathBuf> {
    let found = which::which(program).map_err(|err| RunnerError::Spawn {
        program: program.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, err.to_string()),
    })?;
    debug!(program=%program.display(), found=%found.display(), "located program");
    Ok(found)
}
