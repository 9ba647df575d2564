// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Typed representations of CBMC's goto-program data structures, and the translations between
//! them and CBMC's generic interchange tree.
//!
//! CBMC's AST has three levels:
//! 1. [irep::SymbolTable] is the top level symbol table.
//! 2. [irep::Symbol] is a symbol in the symbol table.
//! 3. [irep::Irep] represents all trees (code, expression, metadata, etc).
//!
//! Each tree represented by [irep::Irep] has three parts:
//! 1. [irep::Irep::id] for identity,
//! 2. [irep::Irep::sub] for a (potentially empty) list of unnamed subtrees,
//! 3. [irep::Irep::named_sub] for a (potentially empty) map of named subtrees.
//!
//! The function of a tree is usually (but not always) recognized by its [irep::Irep::id]. The
//! recognized ids are the variants of [irep::IrepId]. For a binary operation `a + b`, the id of
//! the tree is `"plus"`, `sub` holds the trees for `a` and `b`, and `named_sub` holds the type of
//! the expression, its source location, and so on.
//!
//! The [goto_program] module holds the typed side of the same structures: types, expressions,
//! statements, symbols and locations whose constructors reject ill-formed values. Typed values are
//! lowered into ireps by [irep::ToIrep] and recovered from ireps by [irep::FromIrep].

mod cbmc_string;
mod env;
mod error;
pub mod goto_program;
pub mod irep;
mod machine_model;
pub mod utils;

pub use cbmc_string::{InternString, InternStringOption, InternedString};
pub use error::{IrError, Result};
pub use irep::serialize;
pub use machine_model::{MachineModel, RoundingMode};

#[cfg(test)]
pub(crate) use machine_model::test_util;
