// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The generic interchange tree and its translations.
//!
//! [Irep] is the wire format consumed and produced by CBMC. [ToIrep] lowers the typed
//! goto-program into it, [FromIrep] lifts it back, and [extract] pulls the symbol table out of
//! CBMC's structured output.

pub mod extract;
mod from_irep;
#[allow(clippy::module_inception)]
mod irep;
mod irep_id;
pub mod serialize;
mod symbol;
mod symbol_table;
mod to_irep;

pub use extract::{extract_symbol_table, lift_symbol_table, parse_message_stream};
pub use from_irep::{FromIrep, FromIrepId};
pub use irep::Irep;
pub use irep_id::{FreeformText, IrepId};
pub use serialize::{from_json_str, irep_from_value, to_json_string};
pub use symbol::Symbol;
pub use symbol_table::SymbolTable;
pub use to_irep::{ToIrep, ToIrepId};
