// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! This crate implements irep serialization using serde Serializer, and the matching decoder.
//!
//! The canonical encoding of a node is `{"id": .., "sub": [..], "named_sub": {..}}` with all
//! three keys present and the named subtrees ordered by key. The decoder also accepts the
//! spelling CBMC itself prints (`namedSub`, plus a separate `comment` map for `#` keys).
use crate::irep::{Irep, IrepId, Symbol, SymbolTable};
use crate::{IrError, Result};
use linear_map::LinearMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

impl Serialize for Irep {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut obj = serializer.serialize_map(None)?;
        obj.serialize_entry("id", &self.id)?;
        obj.serialize_entry("sub", &self.sub)?;
        obj.serialize_entry("named_sub", &SortedNamedSub(self))?;
        obj.end()
    }
}

/// Emits the named subtrees ordered by key text, so the encoding never depends on the order in
/// which the lowering inserted them.
struct SortedNamedSub<'a>(&'a Irep);
impl Serialize for SortedNamedSub<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries = self.0.sorted_named_sub();
        let mut obj = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            obj.serialize_entry(k, v)?;
        }
        obj.end()
    }
}

impl Serialize for IrepId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Irep {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        irep_from_value(&value).map_err(<D::Error as serde::de::Error>::custom)
    }
}

/// Decode a node from an already parsed JSON value. Errors name the JSON path of the offending
/// node, e.g. `$.sub[1].named_sub.type`.
pub fn irep_from_value(value: &Value) -> Result<Irep> {
    decode_irep(value, "$")
}

fn decode_irep(value: &Value, path: &str) -> Result<Irep> {
    let obj = value.as_object().ok_or_else(|| IrError::decode(path, "expected an object"))?;
    let id = match obj.get("id") {
        Some(Value::String(s)) => IrepId::from_string(s.as_str()),
        Some(other) => {
            return Err(IrError::decode(format!("{path}.id"), format!("expected a string, got {other}")));
        }
        None => return Err(IrError::decode(path, "missing field `id`")),
    };
    let sub = match obj.get("sub") {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_irep(item, &format!("{path}.sub[{i}]")))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(IrError::decode(format!("{path}.sub"), "expected an array")),
    };
    let mut named_sub = LinearMap::new();
    for key in ["named_sub", "namedSub", "comment"] {
        match obj.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (name, child) in entries {
                    let child = decode_irep(child, &format!("{path}.{key}.{name}"))?;
                    named_sub.insert(IrepId::from_string(name.as_str()), child);
                }
            }
            Some(_) => return Err(IrError::decode(format!("{path}.{key}"), "expected an object")),
        }
    }
    Ok(Irep { id, sub, named_sub })
}

/// Serialize a node to its canonical text.
pub fn to_json_string(irep: &Irep) -> Result<String> {
    serde_json::to_string(irep).map_err(|e| IrError::validation(e.to_string()))
}

/// Parse a node from text. Malformed JSON is reported at the root path.
pub fn from_json_str(text: &str) -> Result<Irep> {
    let value: Value = serde_json::from_str(text).map_err(|e| IrError::decode("$", e.to_string()))?;
    irep_from_value(&value)
}

impl Serialize for SymbolTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut obj = serializer.serialize_map(None)?;
        obj.serialize_entry("symbolTable", &self.symbol_table)?;
        obj.end()
    }
}

// A direct serialization for the goto SymbolTable (contrasting to the irep SymbolTable just above).
// This permits a "streaming optimization" where we reduce memory usage considerably by
// only holding the irep conversion of one symbol in memory at a time.
impl Serialize for crate::goto_program::SymbolTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut obj = serializer.serialize_map(None)?;
        obj.serialize_entry("symbolTable", &StreamingSymbols(self))?;
        obj.end()
    }
}
struct StreamingSymbols<'a>(&'a crate::goto_program::SymbolTable);
impl Serialize for StreamingSymbols<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mm = self.0.machine_model();
        let mut obj = serializer.serialize_map(None)?;
        for (k, v) in self.0.iter() {
            // We're only storing the to_irep in RAM for one symbol at a time
            let irep = v.to_irep(mm).map_err(<S::Error as serde::ser::Error>::custom)?;
            obj.serialize_entry(k, &irep)?;
        }
        obj.end()
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut obj = serializer.serialize_map(None)?;
        obj.serialize_entry(&IrepId::Type.to_string(), &self.typ)?;
        obj.serialize_entry(&IrepId::Value.to_string(), &self.value)?;
        obj.serialize_entry("location", &self.location)?;
        obj.serialize_entry(&IrepId::Name.to_string(), &self.name)?;
        obj.serialize_entry(&IrepId::Module.to_string(), &self.module)?;
        obj.serialize_entry("baseName", &self.base_name)?;
        obj.serialize_entry("prettyName", &self.pretty_name)?;
        obj.serialize_entry("prettyType", &self.pretty_type)?;
        obj.serialize_entry("prettyValue", &self.pretty_value)?;
        obj.serialize_entry(&IrepId::Mode.to_string(), &self.mode)?;
        obj.serialize_entry("isType", &self.is_type)?;
        obj.serialize_entry("isMacro", &self.is_macro)?;
        obj.serialize_entry("isExported", &self.is_exported)?;
        obj.serialize_entry("isInput", &self.is_input)?;
        obj.serialize_entry("isOutput", &self.is_output)?;
        obj.serialize_entry("isStateVar", &self.is_state_var)?;
        obj.serialize_entry("isProperty", &self.is_property)?;
        obj.serialize_entry("isStaticLifetime", &self.is_static_lifetime)?;
        obj.serialize_entry("isThreadLocal", &self.is_thread_local)?;
        obj.serialize_entry("isLvalue", &self.is_lvalue)?;
        obj.serialize_entry("isFileLocal", &self.is_file_local)?;
        obj.serialize_entry("isExtern", &self.is_extern)?;
        obj.serialize_entry("isVolatile", &self.is_volatile)?;
        obj.serialize_entry("isParameter", &self.is_parameter)?;
        obj.serialize_entry("isAuxiliary", &self.is_auxiliary)?;
        obj.serialize_entry("isWeak", &self.is_weak)?;

        obj.end()
    }
}
