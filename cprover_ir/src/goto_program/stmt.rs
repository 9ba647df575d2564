// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use self::StmtBody::*;
use super::{Expr, Location};
use crate::{InternedString, IrError, Result};
use std::fmt::Debug;
use tracing::debug;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// An `Stmt` represents a statement type: i.e. a computation that does not return a value.
/// Every statement has a type and a location (which may be `None`).
///
/// The fields of `Stmt` are kept private, and there are no getters that return mutable references.
/// This means that the only way to create and update `Stmt`s is using the constructors and setters.
/// The constructors ensure that statements are well formed, returning `IrError::Validation`
/// otherwise.
///
/// In general, statements are constructed in a "function-call" style:
///     `while (c) {stmt1, stmt2}`
///      would translate to `Stmt::while_loop(c, Stmt::block(vec![stmt1, stmt2], loc), loc)?`
/// Statements can also be created using the converters in the `Expr` module.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    body: Box<StmtBody>,
    location: Location,
}

/// The different kinds of bodies a statement can have.
/// The names are chosen to map directly onto the IrepID used by CBMC.
/// Each statement is described by reference to the corresponding C code that would generate it.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtBody {
    /// `lhs = rhs;`
    Assign {
        lhs: Expr,
        rhs: Expr,
    },
    /// `assert(cond)`
    Assert {
        cond: Expr,
        property_class: InternedString,
        msg: InternedString,
    },
    /// `__CPROVER_assume(cond);`
    Assume {
        cond: Expr,
    },
    /// { ATOMIC_BEGIN stmt1; stmt2; ... ATOMIC_END }
    AtomicBlock(Vec<Stmt>),
    /// `{ stmt1; stmt2; ... }`
    Block(Vec<Stmt>),
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// End-of-life of a local variable `dead x;`
    Dead(Expr),
    /// `lhs.typ lhs = value;` or `lhs.typ lhs;`
    Decl {
        lhs: Expr, // SymbolExpr
        value: Option<Expr>,
    },
    /// Marks the target place as uninitialized.
    Deinit(Expr),
    /// `e;`
    Expression(Expr),
    // `for (init; cond; update) {body}`
    For {
        init: Stmt,
        cond: Expr,
        update: Stmt,
        body: Stmt,
    },
    /// `lhs = function(arguments);` or `function(arguments);`
    FunctionCall {
        lhs: Option<Expr>,
        function: Expr,
        arguments: Vec<Expr>,
    },
    /// `goto dest;`
    Goto {
        dest: InternedString,
        // The loop invariants annotated to the goto, which can be
        // applied as loop contracts in CBMC if it is a backward goto.
        loop_invariants: Option<Expr>,
    },
    /// `if (i) { t } else { e }`
    Ifthenelse {
        i: Expr,
        t: Stmt,
        e: Option<Stmt>,
    },
    /// `label: body;`
    Label {
        label: InternedString,
        body: Stmt,
    },
    /// `return e;` or `return;`
    Return(Option<Expr>),
    /// `;`
    Skip,
    /// `switch (control) { case1.case: cast1.body; case2.case: case2.body; ... }`
    Switch {
        control: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Stmt>,
    },
    /// `while (cond) { body }`
    While {
        cond: Expr,
        body: Stmt,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    case: Expr,
    body: Stmt,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

/// Getters
impl Stmt {
    pub fn body(&self) -> &StmtBody {
        &self.body
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// Fluent builders
impl Stmt {
    /// Chained call to allow chained pattern
    /// An assert keeps its property class and message on the new location.
    pub fn with_location(mut self, loc: Location) -> Self {
        self.location = match self.body.as_ref() {
            Assert { property_class, msg, .. } => {
                Location::create_location_with_property(*msg, *property_class, loc)
            }
            _ => loc,
        };
        self
    }
}

macro_rules! stmt {
    ( $body:expr, $loc:expr) => {{
        let location = $loc;
        let body = Box::new($body);
        Stmt { body, location }
    }};
}

impl Stmt {
    pub(crate) fn from_parts(body: StmtBody, loc: Location) -> Self {
        stmt!(body, loc)
    }
}

fn require_bool(what: &str, cond: &Expr) -> Result<()> {
    if cond.typ().is_bool() {
        Ok(())
    } else {
        Err(IrError::validation(format!("{what} expected bool, got {:?}", cond.typ())))
    }
}

/// Constructors
impl Stmt {
    /// `lhs = rhs;`
    pub fn assign(lhs: Expr, rhs: Expr, loc: Location) -> Result<Self> {
        if lhs.typ() != rhs.typ() {
            debug!(lhs=?lhs.typ(), rhs=?rhs.typ(), "assign statement with unequal types");
            return Err(IrError::validation(format!(
                "assignment with unequal types {:?} {:?}",
                lhs.typ(),
                rhs.typ()
            )));
        }
        Ok(stmt!(Assign { lhs, rhs }, loc))
    }

    /// `assert(cond, property_class, message);`
    ///
    /// The property class and message travel to CBMC inside a property location.
    pub fn assert<T: Into<InternedString>>(
        cond: Expr,
        property_class: T,
        msg: T,
        loc: Location,
    ) -> Result<Self> {
        require_bool("Assert", &cond)?;
        let property_class = property_class.into();
        let msg = msg.into();
        let loc = Location::create_location_with_property(msg, property_class, loc);
        Ok(stmt!(Assert { cond, property_class, msg }, loc))
    }

    /// `__CPROVER_assume(cond);`
    pub fn assume(cond: Expr, loc: Location) -> Result<Self> {
        require_bool("Assume", &cond)?;
        Ok(stmt!(Assume { cond }, loc))
    }

    /// { ATOMIC_BEGIN stmt1; stmt2; ... ATOMIC_END }
    pub fn atomic_block(stmts: Vec<Stmt>, loc: Location) -> Self {
        stmt!(AtomicBlock(stmts), loc)
    }

    /// `{ stmt1; stmt2; ... }`
    pub fn block(stmts: Vec<Stmt>, loc: Location) -> Self {
        stmt!(Block(stmts), loc)
    }

    /// `break;`
    pub fn break_stmt(loc: Location) -> Self {
        stmt!(Break, loc)
    }

    /// `continue;`
    pub fn continue_stmt(loc: Location) -> Self {
        stmt!(Continue, loc)
    }

    /// `dead x;`
    pub fn dead(symbol: Expr, loc: Location) -> Result<Self> {
        if !symbol.is_symbol() {
            return Err(IrError::validation(format!("dead of non-symbol {symbol:?}")));
        }
        Ok(stmt!(Dead(symbol), loc))
    }

    /// `lhs.typ lhs = value;` or `lhs.typ lhs;`
    pub fn decl(lhs: Expr, value: Option<Expr>, loc: Location) -> Result<Self> {
        if !lhs.is_symbol() {
            return Err(IrError::validation(format!("declaration of non-symbol {lhs:?}")));
        }
        if let Some(value) = &value {
            if value.typ() != lhs.typ() {
                return Err(IrError::validation(format!(
                    "declaration of {:?} initialized with {:?}",
                    lhs.typ(),
                    value.typ()
                )));
            }
        }
        Ok(stmt!(Decl { lhs, value }, loc))
    }

    /// `place = nondet()`, tagged so the place reads as uninitialized.
    pub fn deinit(place: Expr, loc: Location) -> Self {
        stmt!(Deinit(place), loc)
    }

    /// `e;`
    pub fn code_expression(e: Expr, loc: Location) -> Self {
        stmt!(Expression(e), loc)
    }

    // `for (init; cond; update) {body}`
    pub fn for_loop(init: Stmt, cond: Expr, update: Stmt, body: Stmt, loc: Location) -> Result<Self> {
        require_bool("For", &cond)?;
        Ok(stmt!(For { init, cond, update, body }, loc))
    }

    /// `lhs = function(arguments);` or `function(arguments);`
    pub fn function_call(
        lhs: Option<Expr>,
        function: Expr,
        arguments: Vec<Expr>,
        loc: Location,
    ) -> Result<Self> {
        if !Expr::typecheck_call(&function, &arguments) {
            return Err(IrError::validation(format!(
                "Function call does not type check:\nfunc: {function:?}\nargs: {arguments:?}"
            )));
        }
        if let Some(lhs) = &lhs {
            if Some(lhs.typ()) != function.typ().return_type() {
                return Err(IrError::validation(format!(
                    "call result of type {:?} assigned to {:?}",
                    function.typ().return_type(),
                    lhs.typ()
                )));
            }
        }
        Ok(stmt!(FunctionCall { lhs, function, arguments }, loc))
    }

    /// `goto dest;`
    pub fn goto<T: Into<InternedString>>(dest: T, loc: Location) -> Result<Self> {
        let dest = dest.into();
        if dest.is_empty() {
            return Err(IrError::validation("goto with an empty label"));
        }
        Ok(stmt!(Goto { dest, loop_invariants: None }, loc))
    }

    /// Attach loop invariants to a `goto` statement. Other statements are returned unchanged.
    pub fn with_loop_contracts(self, inv: Expr) -> Self {
        if let Goto { dest, .. } = self.body() {
            let dest = *dest;
            return stmt!(Goto { dest, loop_invariants: Some(inv) }, self.location);
        }
        self
    }

    /// `if (i) { t } else { e }` or `if (i) { t }`
    pub fn if_then_else(i: Expr, t: Stmt, e: Option<Stmt>, loc: Location) -> Result<Self> {
        require_bool("If", &i)?;
        Ok(stmt!(Ifthenelse { i, t, e }, loc))
    }

    /// `return e;` or `return;`
    pub fn ret(e: Option<Expr>, loc: Location) -> Self {
        stmt!(Return(e), loc)
    }

    /// `;`
    pub fn skip(loc: Location) -> Self {
        stmt!(Skip, loc)
    }

    /// `switch (control) { case1.case: cast1.body; case2.case: case2.body; ... }`
    pub fn switch(
        control: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Stmt>,
        loc: Location,
    ) -> Result<Self> {
        if let Some(bad) = cases.iter().find(|x| x.case().typ() != control.typ()) {
            return Err(IrError::validation(format!(
                "switch on {:?} has a case of type {:?}",
                control.typ(),
                bad.case().typ()
            )));
        }
        Ok(stmt!(Switch { control, cases, default }, loc))
    }

    /// `while (cond) { body }`
    pub fn while_loop(cond: Expr, body: Stmt, loc: Location) -> Result<Self> {
        require_bool("While", &cond)?;
        Ok(stmt!(While { cond, body }, loc))
    }

    /// `label: self;`
    pub fn with_label<T: Into<InternedString>>(self, label: T) -> Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(IrError::validation("empty statement label"));
        }
        Ok(stmt!(Label { label, body: self }, self.location().clone()))
    }
}

/// Predicates
impl Stmt {
}

/// Constructors
impl SwitchCase {
    /// case : body;
    pub fn new(case: Expr, body: Stmt) -> Self {
        SwitchCase { case, body }
    }
}

/// Getters
impl SwitchCase {
    pub fn case(&self) -> &Expr {
        &self.case
    }

    pub fn body(&self) -> &Stmt {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::Type;

    fn x() -> Expr {
        Expr::symbol_expression("main::x", Type::c_int())
    }

    fn one() -> Expr {
        Expr::int_constant(1, Type::c_int()).unwrap()
    }

    #[test]
    fn test_conditions_must_be_bool() {
        assert!(matches!(Stmt::assume(x(), Location::none()), Err(IrError::Validation { .. })));
        assert!(Stmt::while_loop(x(), Stmt::skip(Location::none()), Location::none()).is_err());
        let cond = x().eq(one()).unwrap();
        assert!(Stmt::while_loop(cond, Stmt::skip(Location::none()), Location::none()).is_ok());
    }

    #[test]
    fn test_relocated_assert_keeps_property() {
        let cond = x().eq(one()).unwrap();
        let check = Stmt::assert(cond, "arithmetic_overflow", "x + 1 fits", Location::none());
        let loc = Location::new("main.c", Some("main"), 4, Some(2), 4, Some(9)).unwrap();
        let moved = check.unwrap().with_location(loc.clone());
        match moved.location() {
            Location::Property { file, line, col, comment, property_class, .. } => {
                assert_eq!(*file, "main.c");
                assert_eq!((*line, *col), (4, Some(2)));
                assert_eq!(*comment, "x + 1 fits");
                assert_eq!(*property_class, "arithmetic_overflow");
            }
            other => panic!("expected a property location, got {other:?}"),
        }
        assert_eq!(Stmt::skip(Location::none()).with_location(loc.clone()).location(), &loc);
    }

    #[test]
    fn test_decl_and_dead_need_symbols() {
        assert!(Stmt::decl(x(), Some(one()), Location::none()).is_ok());
        assert!(Stmt::decl(one(), None, Location::none()).is_err());
        assert!(Stmt::decl(x(), Some(Expr::c_true()), Location::none()).is_err());
        assert!(Stmt::dead(x(), Location::none()).is_ok());
        assert!(Stmt::dead(one(), Location::none()).is_err());
    }

    #[test]
    fn test_assign_types_must_match() {
        assert!(Stmt::assign(x(), one(), Location::none()).is_ok());
        assert!(Stmt::assign(x(), Expr::c_true(), Location::none()).is_err());
    }

    #[test]
    fn test_assert_folds_property_into_location() {
        let loc = Location::new("main.c", Some("main"), 4, None, 4, None).unwrap();
        let cond = x().eq(one()).unwrap();
        let stmt = Stmt::assert(cond, "assertion", "x == 1", loc).unwrap();
        match stmt.location() {
            Location::Property { property_class, comment, line, .. } => {
                assert_eq!(*property_class, "assertion");
                assert_eq!(*comment, "x == 1");
                assert_eq!(*line, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Stmt::assert(x(), "assertion", "x", Location::none()).is_err());
    }

    #[test]
    fn test_switch_case_types() {
        let case = one().switch_case(Stmt::break_stmt(Location::none()));
        assert!(Stmt::switch(x(), vec![case.clone()], None, Location::none()).is_ok());
        let bad = Expr::c_true().switch_case(Stmt::skip(Location::none()));
        assert!(Stmt::switch(x(), vec![case, bad], None, Location::none()).is_err());
    }

    #[test]
    fn test_goto_and_labels() {
        assert!(Stmt::goto("", Location::none()).is_err());
        let inv = x().eq(one()).unwrap();
        let goto = Stmt::goto("loop_head", Location::none()).unwrap().with_loop_contracts(inv.clone());
        assert_eq!(
            goto.body(),
            &Goto { dest: "loop_head".into(), loop_invariants: Some(inv.clone()) }
        );
        // Only gotos carry loop contracts.
        let skip = Stmt::skip(Location::none());
        assert_eq!(skip.clone().with_loop_contracts(inv), skip);
        assert!(skip.clone().with_label("").is_err());
        assert!(matches!(skip.with_label("l1").unwrap().body(), Label { .. }));
    }

    #[test]
    fn test_function_call_typecheck() {
        let f = Expr::symbol_expression(
            "f",
            Type::code_with_unnamed_parameters(vec![Type::c_int()], Type::c_int()),
        );
        assert!(Stmt::function_call(Some(x()), f.clone(), vec![one()], Location::none()).is_ok());
        assert!(Stmt::function_call(None, f.clone(), vec![one()], Location::none()).is_ok());
        let b = Expr::symbol_expression("b", Type::c_bool());
        assert!(Stmt::function_call(Some(b), f.clone(), vec![one()], Location::none()).is_err());
        assert!(Stmt::function_call(None, f, vec![], Location::none()).is_err());
    }

    #[test]
    fn test_building_twice_is_equal() {
        let build = || {
            let body = Stmt::block(
                vec![
                    Stmt::decl(x(), Some(one()), Location::none()).unwrap(),
                    x().ret(Location::none()),
                ],
                Location::none(),
            );
            Stmt::if_then_else(Expr::bool_true(), body, None, Location::none()).unwrap()
        };
        assert_eq!(build(), build());
    }
}
