// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The actual `Irep` structure, and associated constructors, getters, and setters.

use super::super::MachineModel;
use super::super::goto_program::{Location, Type};
use super::{IrepId, ToIrep};
use crate::linear_map;
use crate::{InternedString, IrError, Result};
use linear_map::LinearMap;
use num::BigInt;
use std::fmt::Debug;

/// The CBMC serialization format for goto-programs.
/// CBMC implementation code is at:
/// <https://github.com/diffblue/cbmc/blob/develop/src/util/irep.h>
///
/// Equality is deep: the ids match, `sub` matches position by position, and `named_sub` holds
/// the same keys with equal values regardless of insertion order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Irep {
    pub id: IrepId,
    pub sub: Vec<Irep>,
    pub named_sub: LinearMap<IrepId, Irep>,
}

/// Getters
impl Irep {
    pub fn lookup(&self, key: IrepId) -> Option<&Irep> {
        self.named_sub.get(&key)
    }

    pub fn lookup_as_string(&self, id: IrepId) -> Option<String> {
        self.lookup(id).and_then(|x| {
            let s = x.id.to_string();
            if s.is_empty() { None } else { Some(s) }
        })
    }

    pub fn lookup_as_int(&self, id: IrepId) -> Option<BigInt> {
        self.lookup(id).and_then(|x| x.id.to_bigint())
    }

    /// The named subtrees, ordered by key text.
    pub fn sorted_named_sub(&self) -> Vec<(&IrepId, &Irep)> {
        let mut entries: Vec<_> = self.named_sub.iter().collect();
        entries.sort_by_cached_key(|(k, _)| k.to_string());
        entries
    }
}

/// Fluent Builders
impl Irep {
    pub fn with_location(self, l: &Location, mm: &MachineModel) -> Result<Self> {
        if !l.is_none() {
            Ok(self.with_named_sub(IrepId::CSourceLocation, l.to_irep(mm)?))
        } else {
            Ok(self)
        }
    }

    /// Adds a `comment` sub to the irep.
    /// Note that there might be comments both on the irep itself and
    /// inside the location sub of the irep.
    pub fn with_comment<T: Into<InternedString>>(self, c: T) -> Self {
        self.with_named_sub(IrepId::Comment, Irep::just_string_id(c))
    }

    pub fn with_named_sub(mut self, key: IrepId, value: Irep) -> Self {
        if !value.is_nil() {
            self.named_sub.insert(key, value);
        }
        self
    }

    pub fn with_named_sub_option(self, key: IrepId, value: Option<Irep>) -> Self {
        match value {
            Some(value) => self.with_named_sub(key, value),
            _ => self,
        }
    }

    pub fn with_type(self, t: &Type, mm: &MachineModel) -> Result<Self> {
        Ok(self.with_named_sub(IrepId::Type, t.to_irep(mm)?))
    }
}

/// Predicates
impl Irep {
    pub fn is_just_id(&self) -> bool {
        self.sub.is_empty() && self.named_sub.is_empty()
    }

    pub fn is_just_named_sub(&self) -> bool {
        self.id == IrepId::EmptyString && self.sub.is_empty()
    }

    pub fn is_nil(&self) -> bool {
        self.id == IrepId::Nil
    }
}

/// Constructors
impl Irep {
    /// Builds a node from all three parts. The id must not be empty: anonymous carrier nodes
    /// are only built through [Irep::just_sub] and [Irep::just_named_sub].
    pub fn new(id: IrepId, sub: Vec<Irep>, named_sub: LinearMap<IrepId, Irep>) -> Result<Irep> {
        if id == IrepId::EmptyString {
            return Err(IrError::fields("irep", vec!["id".to_string()], vec![]));
        }
        Ok(Irep { id, sub, named_sub })
    }

    /// `__attribute__(constructor)`. Only valid as a function return type.
    /// <https://gcc.gnu.org/onlinedocs/gcc-4.7.0/gcc/Function-Attributes.html>
    pub fn constructor() -> Irep {
        Irep::just_id(IrepId::Constructor)
    }

    pub fn empty() -> Irep {
        Irep::just_id(IrepId::Empty)
    }

    pub fn just_bitpattern_id<T>(i: T, width: u64, signed: bool) -> Result<Irep>
    where
        T: Into<BigInt>,
    {
        Ok(Irep::just_id(IrepId::bitpattern_from_int(i, width, signed)?))
    }

    pub fn just_id(id: IrepId) -> Irep {
        Irep { id, sub: Vec::new(), named_sub: LinearMap::new() }
    }

    pub fn just_int_id<T>(i: T) -> Irep
    where
        T: Into<BigInt>,
    {
        Irep::just_id(IrepId::from_int(i))
    }

    pub fn just_named_sub(named_sub: LinearMap<IrepId, Irep>) -> Irep {
        Irep { id: IrepId::EmptyString, sub: vec![], named_sub }
    }

    pub fn just_string_id<T: Into<InternedString>>(s: T) -> Irep {
        Irep::just_id(IrepId::from_string(s))
    }

    pub fn just_sub(sub: Vec<Irep>) -> Irep {
        Irep { id: IrepId::EmptyString, sub, named_sub: LinearMap::new() }
    }

    pub fn nil() -> Irep {
        Irep::just_id(IrepId::Nil)
    }

    pub fn one() -> Irep {
        Irep::just_id(IrepId::Id1)
    }

    pub fn zero() -> Irep {
        Irep::just_id(IrepId::Id0)
    }

    pub fn tuple(sub: Vec<Irep>) -> Self {
        Irep {
            id: IrepId::Tuple,
            sub,
            named_sub: linear_map![(IrepId::Type, Irep::just_id(IrepId::Tuple))],
        }
    }

    pub fn symbol(identifier: InternedString) -> Self {
        Irep {
            id: IrepId::Symbol,
            sub: vec![],
            named_sub: linear_map![(IrepId::Identifier, Irep::just_string_id(identifier))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_id() {
        let err = Irep::new(IrepId::EmptyString, vec![], LinearMap::new()).unwrap_err();
        assert!(matches!(err, IrError::Construction { ref missing, .. } if missing == &["id"]));
        assert!(Irep::new(IrepId::Plus, vec![Irep::one(), Irep::zero()], LinearMap::new()).is_ok());
    }

    #[test]
    fn test_named_sub_order_is_irrelevant() {
        let a = Irep::just_named_sub(linear_map![
            (IrepId::File, Irep::just_string_id("main.c")),
            (IrepId::Line, Irep::just_int_id(3)),
        ]);
        let b = Irep::just_named_sub(linear_map![
            (IrepId::Line, Irep::just_int_id(3)),
            (IrepId::File, Irep::just_string_id("main.c")),
        ]);
        assert_eq!(a, b);
        let keys: Vec<String> = a.sorted_named_sub().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["file", "line"]);
    }

    #[test]
    fn test_sub_order_matters() {
        let a = Irep::just_sub(vec![Irep::one(), Irep::zero()]);
        let b = Irep::just_sub(vec![Irep::zero(), Irep::one()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_with_named_sub_skips_nil() {
        let irep = Irep::just_id(IrepId::Code).with_named_sub(IrepId::Type, Irep::nil());
        assert!(irep.is_just_id());
        let irep = irep.with_comment("deinit");
        assert_eq!(irep.lookup_as_string(IrepId::Comment).as_deref(), Some("deinit"));
    }

    #[test]
    fn test_lookup_as_int() {
        let irep = Irep::just_named_sub(linear_map![(IrepId::Width, Irep::just_int_id(32))]);
        assert_eq!(irep.lookup_as_int(IrepId::Width), Some(BigInt::from(32)));
        assert_eq!(irep.lookup_as_int(IrepId::Line), None);
        assert!(irep.is_just_named_sub());
    }
}
