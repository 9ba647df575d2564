// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::super::env::{additional_env_symbols, machine_model_symbols};
use super::super::utils::aggr_tag;
use super::super::MachineModel;
use super::{arithmetic_overflow_result_type, DatatypeComponent, Symbol, Type};
use crate::{InternedString, IrError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// This is a typesafe implementation of the CBMC symbol table, based on the CBMC code at:
/// <https://github.com/diffblue/cbmc/blob/develop/src/util/symbol_table.h>
/// Since the field is kept private, with only immutable references handed out, elements can only
/// be added to the table through `insert` (which never overwrites) or `replace`.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    symbol_table: BTreeMap<InternedString, Symbol>,
    machine_model: MachineModel,
}

/// Constructors
impl SymbolTable {
    /// A table holding only the environment symbols CBMC expects for `machine_model`.
    /// Fails when the model does not pass `MachineModel::validate`.
    pub fn new(machine_model: MachineModel) -> Result<SymbolTable> {
        machine_model.validate()?;
        let mut symtab = SymbolTable::empty(machine_model);
        symtab.add_env_symbols()?;
        debug!(symbols = symtab.len(), "created symbol table");
        Ok(symtab)
    }

    /// An empty table, without the environment symbols.
    pub fn empty(machine_model: MachineModel) -> SymbolTable {
        SymbolTable { machine_model, symbol_table: BTreeMap::new() }
    }

    fn add_env_symbols(&mut self) -> Result<()> {
        for symbol in machine_model_symbols(&self.machine_model)? {
            self.insert(symbol)?;
        }
        for symbol in additional_env_symbols()? {
            self.insert(symbol)?;
        }
        Ok(())
    }
}

/// Setters
impl SymbolTable {
    /// Insert a new symbol. Names are unique: inserting a name twice is an error, and the
    /// table keeps the first symbol.
    pub fn insert(&mut self, symbol: Symbol) -> Result<()> {
        if self.symbol_table.contains_key(&symbol.name) {
            return Err(IrError::duplicate(symbol.name));
        }
        self.symbol_table.insert(symbol.name, symbol);
        Ok(())
    }

    /// Overwrite an existing symbol, e.g. to complete an incomplete struct or to attach a body
    /// to a function declaration. Returns the previous symbol.
    pub fn replace(&mut self, symbol: Symbol) -> Result<Symbol> {
        match self.symbol_table.get_mut(&symbol.name) {
            Some(old) => Ok(std::mem::replace(old, symbol)),
            None => Err(IrError::validation(format!("no symbol named {} to replace", symbol.name))),
        }
    }

    /// Insert the struct describing the result of an arithmetic-with-overflow operation on
    /// `operand_type`, unless it is already present, and return its tag type.
    pub fn register_overflow_result_type(&mut self, operand_type: &Type) -> Result<Type> {
        let struct_type = arithmetic_overflow_result_type(operand_type)?;
        let tag = struct_type
            .tag()
            .ok_or_else(|| IrError::validation(format!("{struct_type:?} has no tag")))?;
        if !self.contains(aggr_tag(tag)) {
            let pretty_name = tag;
            self.insert(Symbol::aggr_ty(struct_type, pretty_name)?)?;
        }
        Ok(Type::struct_tag(tag))
    }
}

/// Getters
impl SymbolTable {
    pub fn contains<T: Into<InternedString>>(&self, name: T) -> bool {
        self.symbol_table.contains_key(&name.into())
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, InternedString, Symbol> {
        self.symbol_table.iter()
    }

    pub fn len(&self) -> usize {
        self.symbol_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_table.is_empty()
    }

    pub fn lookup<T: Into<InternedString>>(&self, name: T) -> Option<&Symbol> {
        self.symbol_table.get(&name.into())
    }

    /// The components of the struct or union stored under `tag` (e.g. `tag-foo`).
    pub fn lookup_components(&self, tag: InternedString) -> Option<&Vec<DatatypeComponent>> {
        self.lookup(tag).and_then(|sym| sym.typ.components())
    }

    /// The type of `field` in the struct or union stored under `tag`.
    pub fn lookup_field_type(&self, tag: InternedString, field: InternedString) -> Option<&Type> {
        self.lookup_components(tag)?.iter().find(|c| c.name() == field)?.field_typ()
    }

    pub fn machine_model(&self) -> &MachineModel {
        &self.machine_model
    }
}
