// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Runs CBMC and symtab2gb on programs built with `cprover_ir`, and reads typed symbol tables
//! back out of CBMC's JSON output.
//!
//! All invocations are synchronous and capture the output of the tool. Whether a nonzero exit
//! status is an error depends on the call: `symtab2gb` and `symtab_of_c` require success, while
//! `run_cbmc_*` report a failed verification through [CapturedOutput::status].

mod call_cbmc;
mod call_symtab;
mod config;
mod error;
pub mod session;

pub use call_cbmc::{run_cbmc_file, run_cbmc_string, symtab_of_c};
pub use call_symtab::{run_symtab2gb, symbol_table_to_gotoc, write_symbol_table};
pub use config::EngineConfig;
pub use error::{Result, RunnerError};
pub use session::CapturedOutput;
