// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::Symbol;
use crate::InternedString;
use std::collections::BTreeMap;

/// A direct implementation of the CBMC serilization format for symbol tables implemented in
/// <https://github.com/diffblue/cbmc/blob/develop/src/util/symbol_table.h>
#[derive(Debug, Default, PartialEq)]
pub struct SymbolTable {
    pub symbol_table: BTreeMap<InternedString, Symbol>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable { symbol_table: BTreeMap::new() }
    }
}

/// Setters
impl SymbolTable {
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbol_table.insert(symbol.name, symbol);
    }
}

/// Getters
impl SymbolTable {
    pub fn lookup<T: Into<InternedString>>(&self, name: T) -> Option<&Symbol> {
        self.symbol_table.get(&name.into())
    }

    pub fn len(&self) -> usize {
        self.symbol_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_table.is_empty()
    }
}
