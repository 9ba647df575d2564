// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::Irep;
use crate::InternedString;
use serde::Deserialize;

/// A direct implementation of the CBMC serilization format for symbols implemented in
/// <https://github.com/diffblue/cbmc/blob/develop/src/util/symbol.h>
///
/// Deserializes from the symbol objects CBMC prints with `--show-symbol-table --json-ui`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    #[serde(rename = "type")]
    pub typ: Irep,
    #[serde(default = "Irep::nil")]
    pub value: Irep,
    #[serde(default = "Irep::nil")]
    pub location: Irep,
    /// Unique identifier, same as key in symbol table `foo::x`
    pub name: InternedString,
    /// Only used by verilog
    #[serde(default = "empty_string")]
    pub module: InternedString,
    /// Local identifier `x`
    #[serde(default = "empty_string")]
    pub base_name: InternedString,
    /// Almost always the same as base_name, but with name mangling can be relevant
    #[serde(default = "empty_string")]
    pub pretty_name: InternedString,
    /// The type as C source text, only for display
    #[serde(default = "empty_string")]
    pub pretty_type: InternedString,
    /// The value as C source text, only for display
    #[serde(default = "empty_string")]
    pub pretty_value: InternedString,
    #[serde(default = "empty_string")]
    pub mode: InternedString,

    // global properties
    #[serde(default)]
    pub is_type: bool,
    #[serde(default)]
    pub is_macro: bool,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default)]
    pub is_input: bool,
    #[serde(default)]
    pub is_output: bool,
    #[serde(default)]
    pub is_state_var: bool,
    #[serde(default)]
    pub is_property: bool,

    // ansi-C properties
    #[serde(default)]
    pub is_static_lifetime: bool,
    #[serde(default)]
    pub is_thread_local: bool,
    #[serde(default)]
    pub is_lvalue: bool,
    #[serde(default)]
    pub is_file_local: bool,
    #[serde(default)]
    pub is_extern: bool,
    #[serde(default)]
    pub is_volatile: bool,
    #[serde(default)]
    pub is_parameter: bool,
    #[serde(default)]
    pub is_auxiliary: bool,
    #[serde(default)]
    pub is_weak: bool,
}

fn empty_string() -> InternedString {
    "".into()
}
