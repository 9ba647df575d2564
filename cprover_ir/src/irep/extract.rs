// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Pulls the symbol table out of CBMC's structured (`--json-ui`) output.
use super::super::goto_program;
use super::super::MachineModel;
use crate::{InternedString, IrError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const SYMBOL_TABLE_FIELD: &str = "symbolTable";

/// Split CBMC output into messages. `--json-ui` prints a single JSON array; line delimited
/// objects are accepted as well.
pub fn parse_message_stream(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| IrError::decode("$", e.to_string()));
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| IrError::decode(format!("$[{i}]"), e.to_string()))
        })
        .collect()
}

/// The one message carrying a `symbolTable` field.
pub fn extract_symbol_table(messages: &[Value]) -> Result<&Value> {
    let mut tables = messages.iter().filter(|m| m.get(SYMBOL_TABLE_FIELD).is_some());
    match (tables.next(), tables.next()) {
        (Some(table), None) => Ok(table),
        (None, _) => Err(IrError::ExtractionCount { found: 0 }),
        (Some(_), Some(_)) => Err(IrError::ExtractionCount { found: 2 + tables.count() }),
    }
}

/// Lift every symbol of an extracted symbol table message (or of the bare `symbolTable`
/// object). Symbols using constructs this crate does not model are skipped and returned next
/// to the table together with the reason.
pub fn lift_symbol_table(
    message: &Value,
    mm: &MachineModel,
) -> Result<(goto_program::SymbolTable, Vec<(InternedString, IrError)>)> {
    let table = message.get(SYMBOL_TABLE_FIELD).unwrap_or(message);
    let entries = table
        .as_object()
        .ok_or_else(|| IrError::decode("$.symbolTable", "expected an object"))?;
    let mut symtab = goto_program::SymbolTable::empty(mm.clone());
    let mut skipped = vec![];
    for (name, entry) in entries {
        let lifted = super::Symbol::deserialize_value(entry, name)
            .and_then(|symbol| goto_program::Symbol::from_irep_symbol(&symbol, mm));
        match lifted {
            Ok(symbol) => symtab.insert(symbol)?,
            Err(err) => {
                warn!(%name, %err, "skipping symbol");
                skipped.push((name.as_str().into(), err));
            }
        }
    }
    debug!(lifted = symtab.len(), skipped = skipped.len(), "lifted symbol table");
    Ok((symtab, skipped))
}

impl super::Symbol {
    fn deserialize_value(value: &Value, name: &str) -> Result<Self> {
        super::Symbol::deserialize(value)
            .map_err(|e| IrError::decode(format!("$.symbolTable.{name}"), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::{Expr, Location, Symbol, SymbolTable, Type};
    use crate::machine_model::test_util::machine_model_test_stub;
    use serde_json::json;

    fn table_message() -> Value {
        json!({"symbolTable": {}})
    }

    #[test]
    fn test_extraction_count() {
        let text = json!({"messageText": "CBMC version 5.95.1"});
        assert!(matches!(
            extract_symbol_table(&[text.clone()]),
            Err(IrError::ExtractionCount { found: 0 })
        ));
        let messages = vec![text.clone(), table_message()];
        assert_eq!(extract_symbol_table(&messages).unwrap(), &table_message());
        let messages = vec![table_message(), table_message()];
        assert_eq!(extract_symbol_table(&messages), Err(IrError::ExtractionCount { found: 2 }));
        let messages = vec![table_message(), text, table_message(), table_message()];
        assert_eq!(extract_symbol_table(&messages), Err(IrError::ExtractionCount { found: 3 }));
    }

    #[test]
    fn test_parse_message_stream() {
        let array = r#"[{"program": "CBMC 5.95.1"}, {"symbolTable": {}}]"#;
        assert_eq!(parse_message_stream(array).unwrap().len(), 2);
        let lines = "{\"program\": \"CBMC\"}\n\n{\"symbolTable\": {}}\n";
        let messages = parse_message_stream(lines).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(extract_symbol_table(&messages).is_ok());
        assert!(matches!(
            parse_message_stream("{\"a\": 1}\n{oops"),
            Err(IrError::Decode { path, .. }) if path == "$[1]"
        ));
    }

    #[test]
    fn test_lift_symbol_table() {
        let mm = machine_model_test_stub();
        let mut st = SymbolTable::empty(mm.clone());
        st.insert(Symbol::static_variable("x", "x", Type::bool(), Location::none())).unwrap();
        let one = Expr::int_constant(1, Type::signed_int(32).unwrap()).unwrap();
        st.insert(Symbol::constant("one", "one", "one", one, Location::none())).unwrap();
        let message = serde_json::to_value(&st).unwrap();

        let (lifted, skipped) = lift_symbol_table(&message, &mm).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(lifted.len(), 2);
        assert_eq!(lifted.lookup("x"), st.lookup("x"));
        assert_eq!(lifted.lookup("one"), st.lookup("one"));
    }

    #[test]
    fn test_lift_skips_unknown_constructs() {
        let mm = machine_model_test_stub();
        let message = json!({"symbolTable": {
            "odd": {
                "name": "odd",
                "mode": "C",
                "type": {"id": "c_enum", "namedSub": {"width": {"id": "32"}}},
                "value": {"id": "nil"},
                "location": {"id": "nil"}
            },
            "flag": {
                "name": "flag",
                "baseName": "flag",
                "mode": "C",
                "isStaticLifetime": true,
                "isLvalue": true,
                "type": {"id": "bool"},
                "value": {"id": "nil"},
                "location": {"id": "", "namedSub": {"file": {"id": "main.c"}, "line": {"id": "3"}}}
            }
        }});
        let (lifted, skipped) = lift_symbol_table(&message, &mm).unwrap();
        assert_eq!(lifted.len(), 1);
        let flag = lifted.lookup("flag").unwrap();
        assert!(flag.is_static_lifetime);
        assert_eq!(flag.base_name, Some("flag".into()));
        assert_eq!(flag.location.start_line(), Some(3));
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "odd");
        assert!(matches!(&skipped[0].1, IrError::Decode { reason, .. } if reason.contains("c_enum")));
    }
}
