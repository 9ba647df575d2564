// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for building, lowering and lifting goto-programs.

use thiserror::Error;

/// Errors raised by the IR.
///
/// Lookups that merely find nothing return `Option` instead of an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A value was built from fields inconsistent with its kind.
    #[error("cannot construct {what}: {}", construction_detail(.missing, .extraneous, .reason))]
    Construction {
        what: String,
        missing: Vec<String>,
        extraneous: Vec<String>,
        reason: Option<String>,
    },

    /// A symbol with this name is already in the symbol table.
    #[error("duplicate symbol name: {name}")]
    DuplicateName { name: String },

    /// An interchange tree or JSON document does not have the expected shape.
    #[error("decode error at {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A well-formed value was used in a way its type does not allow.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The tool output did not contain exactly one symbol table.
    #[error("expected exactly one symbol table message, found {found}")]
    ExtractionCount { found: usize },
}

fn construction_detail(
    missing: &[String],
    extraneous: &[String],
    reason: &Option<String>,
) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing fields [{}]", missing.join(", ")));
    }
    if !extraneous.is_empty() {
        parts.push(format!("unexpected fields [{}]", extraneous.join(", ")));
    }
    if let Some(reason) = reason {
        parts.push(reason.clone());
    }
    parts.join("; ")
}

/// Constructors
impl IrError {
    pub fn construction<T: Into<String>, U: Into<String>>(what: T, reason: U) -> Self {
        IrError::Construction {
            what: what.into(),
            missing: vec![],
            extraneous: vec![],
            reason: Some(reason.into()),
        }
    }

    pub fn fields<T: Into<String>>(what: T, missing: Vec<String>, extraneous: Vec<String>) -> Self {
        IrError::Construction { what: what.into(), missing, extraneous, reason: None }
    }

    pub fn duplicate<T: ToString>(name: T) -> Self {
        IrError::DuplicateName { name: name.to_string() }
    }

    pub fn decode<T: Into<String>, U: Into<String>>(path: T, reason: U) -> Self {
        IrError::Decode { path: path.into(), reason: reason.into() }
    }

    pub fn validation<T: Into<String>>(reason: T) -> Self {
        IrError::Validation { reason: reason.into() }
    }
}

/// Result type for IR operations
pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_message_names_fields() {
        let err = IrError::fields("array type", vec!["typ".into(), "size".into()], vec![]);
        assert_eq!(err.to_string(), "cannot construct array type: missing fields [typ, size]");
    }

    #[test]
    fn construction_message_with_reason() {
        let err = IrError::construction("contract", "expected a function type");
        assert_eq!(err.to_string(), "cannot construct contract: expected a function type");
    }

    #[test]
    fn extraction_message() {
        assert_eq!(
            IrError::ExtractionCount { found: 2 }.to_string(),
            "expected exactly one symbol table message, found 2"
        );
    }
}
