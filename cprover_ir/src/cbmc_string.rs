// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use lazy_static::lazy_static;
use std::sync::{Mutex, MutexGuard, PoisonError};
use string_interner::StringInterner;
use string_interner::backend::StringBackend;
use string_interner::symbol::SymbolU32;

/// An interned string. Names of symbols, files, components and tags are repeated many times
/// across a goto-program, so each distinct string is stored once in a global interner and
/// referred to by index. This makes `InternedString` `Copy`, which keeps the typed AST cheap to
/// clone. Interned strings live until the process exits, so only intern long-lived names.
///
/// To create an interned string, either do
/// `let i : InternedString = s.into();` or
/// `let i = s.intern();`
#[derive(Clone, Hash, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InternedString(SymbolU32);

lazy_static! {
    static ref INTERNER: Mutex<StringInterner<StringBackend>> =
        Mutex::new(StringInterner::default());
}

/// The interner never holds the lock across user code, so a poisoned lock still guards a
/// consistent table.
fn interner() -> MutexGuard<'static, StringInterner<StringBackend>> {
    INTERNER.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InternedString {
    pub fn is_empty(&self) -> bool {
        self.map(|s| s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.map(|s| s.len())
    }

    /// Apply `f` to the interned text. The `&str` backing the symbol can't outlive the lock, so
    /// callers operate on it through this closure instead.
    pub fn map<T, F: FnOnce(&str) -> T>(&self, f: F) -> T {
        let guard = interner();
        f(guard.resolve(self.0).unwrap_or_default())
    }

    pub fn starts_with(&self, pattern: &str) -> bool {
        self.map(|s| s.starts_with(pattern))
    }

    pub fn ends_with(&self, pattern: &str) -> bool {
        self.map(|s| s.ends_with(pattern))
    }

    /// Returns the text after `prefix`, if `self` starts with it.
    pub fn strip_prefix(&self, prefix: &str) -> Option<String> {
        self.map(|s| s.strip_prefix(prefix).map(str::to_string))
    }
}

impl std::fmt::Display for InternedString {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.map(|s| write!(fmt, "{s}"))
    }
}

/// Debug output shows the text rather than the symbol index.
impl std::fmt::Debug for InternedString {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.map(|s| write!(fmt, "{s:?}"))
    }
}

impl<T> From<T> for InternedString
where
    T: AsRef<str>,
{
    fn from(s: T) -> InternedString {
        InternedString(interner().get_or_intern(s))
    }
}

impl<T> PartialEq<T> for InternedString
where
    T: AsRef<str>,
{
    fn eq(&self, other: &T) -> bool {
        self.map(|s| s == other.as_ref())
    }
}

pub trait InternString {
    fn intern(self) -> InternedString;
}

impl<T> InternString for T
where
    T: Into<InternedString>,
{
    fn intern(self) -> InternedString {
        self.into()
    }
}

pub trait InternStringOption {
    fn intern(self) -> Option<InternedString>;
}

impl<T> InternStringOption for Option<T>
where
    T: Into<InternedString>,
{
    fn intern(self) -> Option<InternedString> {
        self.map(|s| s.into())
    }
}

impl serde::Serialize for InternedString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.map(|s| serializer.serialize_str(s))
    }
}

struct InternedStringVisitor;

impl<'de> serde::Deserialize<'de> for InternedString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(InternedStringVisitor)
    }
}

impl serde::de::Visitor<'_> for InternedStringVisitor {
    type Value = InternedString;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(v.into())
    }
}
