// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::cbmc_string::{InternStringOption, InternedString};
use crate::{IrError, Result};
use std::fmt::Debug;

/// A `Location` represents a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Unknown source location
    None,
    /// Code is in a builtin function
    BuiltinFunction { function_name: InternedString, line: Option<u64> },
    /// Location in user code.
    /// `function` is `None` for global, `Some(function_name)` for function local.
    Loc {
        file: InternedString,
        function: Option<InternedString>,
        start_line: u64,
        start_col: Option<u64>,
        end_line: u64,
        end_col: Option<u64>,
        pragmas: Vec<InternedString>,
    },
    /// Location for Statements that use Property Class and Description - Assert, Assume, Cover etc.
    Property {
        file: InternedString,
        function: Option<InternedString>,
        line: u64,
        col: Option<u64>,
        comment: InternedString,
        property_class: InternedString,
        pragmas: Vec<InternedString>,
    },
    /// Covers cases where Location Details are unknown or set as None but Property Class is needed.
    PropertyUnknownLocation { comment: InternedString, property_class: InternedString },
}

/// Getters and predicates
impl Location {
    pub fn is_none(&self) -> bool {
        matches!(self, Location::None)
    }

    pub fn filename(&self) -> Option<String> {
        match self {
            Location::Loc { file, .. } | Location::Property { file, .. } => Some(file.to_string()),
            _ => None,
        }
    }

    pub fn start_line(&self) -> Option<u64> {
        match self {
            Location::Loc { start_line, .. } => Some(*start_line),
            Location::Property { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn end_line(&self) -> Option<u64> {
        match self {
            Location::Loc { end_line, .. } => Some(*end_line),
            _ => None,
        }
    }

    pub fn pragmas(&self) -> &[InternedString] {
        match self {
            Location::Loc { pragmas, .. } | Location::Property { pragmas, .. } => pragmas,
            _ => &[],
        }
    }

    /// Convert a location to a short string suitable for (e.g.) logging.
    /// Goal is to return just "file:line" as clearly as possible.
    pub fn short_string(&self) -> String {
        match self {
            Location::None => "<none>".to_string(),
            Location::BuiltinFunction { function_name, line: Some(line) } => {
                format!("<{function_name}>:{line}")
            }
            Location::BuiltinFunction { function_name, line: None } => {
                format!("<{function_name}>")
            }
            Location::Loc { file, start_line: line, .. } => format!("{file}:{line}"),
            Location::Property { file, line, .. } => format!("{file}:{line}"),
            Location::PropertyUnknownLocation { .. } => "<none>".to_string(),
        }
    }
}

fn to_line<T>(what: &str, value: T) -> Result<u64>
where
    T: TryInto<u64> + Copy + Debug,
{
    value
        .try_into()
        .map_err(|_| IrError::construction("location", format!("invalid {what} {value:?}")))
}

/// Constructors
impl Location {
    pub fn new<T, U: Into<InternedString>, V: Into<InternedString>>(
        file: U,
        function: Option<V>,
        start_line: T,
        start_col: Option<T>,
        end_line: T,
        end_col: Option<T>,
    ) -> Result<Location>
    where
        T: TryInto<u64> + Copy + Debug,
    {
        Ok(Location::Loc {
            file: file.into(),
            function: function.intern(),
            start_line: to_line("start line", start_line)?,
            start_col: start_col.map(|c| to_line("start column", c)).transpose()?,
            end_line: to_line("end line", end_line)?,
            end_col: end_col.map(|c| to_line("end column", c)).transpose()?,
            pragmas: vec![],
        })
    }

    /// Create a Property type Location
    pub fn property_location<T, U>(
        file: U,
        function: Option<U>,
        line: T,
        col: Option<T>,
        comment: U,
        property_name: U,
    ) -> Result<Location>
    where
        T: TryInto<u64> + Copy + Debug,
        U: Into<InternedString>,
    {
        Ok(Location::Property {
            file: file.into(),
            function: function.intern(),
            line: to_line("line", line)?,
            col: col.map(|c| to_line("column", c)).transpose()?,
            comment: comment.into(),
            property_class: property_name.into(),
            pragmas: vec![],
        })
    }

    /// Create a Property type Location from an already existing Location type
    pub fn create_location_with_property<T: Into<InternedString>>(
        comment: T,
        property_name: T,
        location: Self,
    ) -> Self {
        let comment = comment.into();
        let property_class = property_name.into();
        match location {
            Location::BuiltinFunction { function_name, line } => Location::Property {
                file: format!("<builtin-library-{function_name}>").into(),
                function: Some(function_name),
                line: line.unwrap_or(0),
                col: None,
                comment,
                property_class,
                pragmas: vec![],
            },
            Location::Loc { file, function, start_line, start_col, pragmas, .. } => {
                Location::Property {
                    file,
                    function,
                    line: start_line,
                    col: start_col,
                    comment,
                    property_class,
                    pragmas,
                }
            }
            Location::Property { .. } | Location::PropertyUnknownLocation { .. } => location,
            // This converts None type Locations to PropertyUnknownLocation type which inserts Property Class and Description
            // into the Source Location Irep's without any location details.
            Location::None => Location::PropertyUnknownLocation { comment, property_class },
        }
    }

    pub fn none() -> Location {
        Location::None
    }

    pub fn builtin_function<T: Into<InternedString>>(name: T, line: Option<u64>) -> Location {
        let function_name = name.into();
        Location::BuiltinFunction { line, function_name }
    }

    /// Attach `#pragma` entries (e.g. `disable:pointer-check`). Only source and property
    /// locations can carry them; other locations are returned unchanged.
    pub fn with_pragmas(mut self, new: Vec<InternedString>) -> Self {
        if let Location::Loc { pragmas, .. } | Location::Property { pragmas, .. } = &mut self {
            pragmas.extend(new);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string() {
        assert_eq!(Location::none().short_string(), "<none>");
        assert_eq!(Location::builtin_function("memcpy", Some(4)).short_string(), "<memcpy>:4");
        let loc = Location::new("main.c", Some("main"), 3, Some(1), 5, None).unwrap();
        assert_eq!(loc.short_string(), "main.c:3");
        assert_eq!(loc.filename().as_deref(), Some("main.c"));
        assert_eq!(loc.end_line(), Some(5));
    }

    #[test]
    fn test_invalid_line_rejected() {
        assert!(matches!(
            Location::new("main.c", None::<&str>, -1i64, None, 1, None),
            Err(IrError::Construction { .. })
        ));
    }

    #[test]
    fn test_property_folding() {
        let loc = Location::new("main.c", Some("main"), 3, Some(7), 3, None)
            .unwrap()
            .with_pragmas(vec!["disable:bounds-check".into()]);
        let prop = Location::create_location_with_property("x is positive", "assertion", loc);
        match &prop {
            Location::Property { line, col, comment, property_class, pragmas, .. } => {
                assert_eq!(*line, 3);
                assert_eq!(*col, Some(7));
                assert_eq!(*comment, "x is positive");
                assert_eq!(*property_class, "assertion");
                assert_eq!(pragmas.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        // Already a property: kept as is.
        let again = Location::create_location_with_property("other", "other", prop.clone());
        assert_eq!(again, prop);
        assert!(matches!(
            Location::create_location_with_property("c", "p", Location::none()),
            Location::PropertyUnknownLocation { .. }
        ));
    }

    #[test]
    fn test_pragmas_ignored_on_none() {
        assert!(Location::none().with_pragmas(vec!["p".into()]).pragmas().is_empty());
    }
}
