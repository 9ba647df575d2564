// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `cprover-symtab`: print the symbol table CBMC builds for a C file.

use anyhow::{Context, Result};
use clap::Parser;
use cprover_ir::irep::lift_symbol_table;
use cprover_ir::MachineModel;
use cprover_runner::session::init_logger;
use cprover_runner::{symtab_of_c, EngineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The C file to analyze.
    input: PathBuf,

    /// Path of the cbmc executable.
    #[arg(long, default_value = "cbmc")]
    cbmc: PathBuf,

    /// Lift the table into typed symbols and print their names instead of the raw JSON.
    #[arg(long)]
    lift: bool,

    /// Target architecture used to read back constants when lifting.
    #[arg(long, value_enum, default_value_t = Arch::X86_64)]
    arch: Arch,

    /// Print logs as JSON.
    #[arg(long)]
    json_logs: bool,

    /// A tracing directive, e.g. `debug` or `cprover_ir=trace`. Added to `CPROVER_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Arch {
    X86_64,
    Aarch64,
    I386,
}

impl Arch {
    fn machine_model(self) -> MachineModel {
        match self {
            Arch::X86_64 => MachineModel::x86_64(),
            Arch::Aarch64 => MachineModel::aarch64(),
            Arch::I386 => MachineModel::i386(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = init_logger(args.log_level.as_deref(), args.json_logs).and_then(|_| run(args));
    if let Err(error) = result {
        debug!(?error, "main_failure");
        eprintln!("error: {error:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(args: Args) -> Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let cfg = EngineConfig::default().with_cbmc(args.cbmc);
    let table = symtab_of_c(&cfg, &source)?;

    if args.lift {
        let (symtab, skipped) = lift_symbol_table(&table, &args.arch.machine_model())?;
        for (name, _) in symtab.iter() {
            println!("{name}");
        }
        info!(lifted = symtab.len(), skipped = skipped.len(), "lifted symbols");
        for (name, err) in skipped {
            eprintln!("skipped {name}: {err}");
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&table)?);
    }
    Ok(())
}
