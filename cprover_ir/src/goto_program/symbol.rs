// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use super::super::utils::aggr_tag;
use super::{DatatypeComponent, Expr, Location, Parameter, Stmt, Type};
use crate::{InternStringOption, InternedString, IrError, Result};

use std::fmt::Display;

/// Based off the CBMC symbol implementation here:
/// <https://github.com/diffblue/cbmc/blob/develop/src/util/symbol.h>
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    /// Unique identifier. Mangled name from the front-end `foo12_bar17_x@1`
    pub name: InternedString,
    pub location: Location,
    pub typ: Type,
    pub value: SymbolValues,
    /// Contracts to be enforced (only supported for functions)
    pub contract: Option<Box<FunctionContract>>,

    /// Local name `x`
    pub base_name: Option<InternedString>,
    /// Fully qualifier name `foo::bar::x`
    pub pretty_name: Option<InternedString>,
    /// The type as C source text, only for display
    pub pretty_type: Option<InternedString>,
    /// The value as C source text, only for display
    pub pretty_value: Option<InternedString>,
    /// Only used by verilog
    pub module: Option<InternedString>,
    pub mode: SymbolModes,
    // global properties
    pub is_exported: bool,
    pub is_input: bool,
    pub is_macro: bool,
    pub is_output: bool,
    pub is_property: bool,
    pub is_state_var: bool,
    pub is_type: bool,

    // ansi-C properties
    pub is_auxiliary: bool,
    pub is_extern: bool,
    pub is_file_local: bool,
    pub is_lvalue: bool,
    pub is_parameter: bool,
    pub is_static_lifetime: bool,
    pub is_thread_local: bool,
    pub is_volatile: bool,
    pub is_weak: bool,

    /// This flag marks a variable as constant (IrepId: `ID_C_constant`).
    ///
    /// In CBMC, this is a property of the type or expression. However, we keep it here to avoid
    /// having to propagate the attribute to all variants of `Type` and `Expr`.
    ///
    /// During contract verification, CBMC will not havoc static variables marked as constant.
    pub is_static_const: bool,
}

/// The equivalent of a "mathematical function" in CBMC. Semantically this is an
/// anonymous function object, similar to a closure, but without closing over an
/// environment.
///
/// This is only valid for use as a function contract. It may not perform side
/// effects, a property that is enforced on the CBMC side.
///
/// The precise nomenclature is that in CBMC a contract value has *type*
/// `mathematical_function` and values of that type are `lambda`s. Since this
/// struct represents such values it is named `Lambda`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub arguments: Vec<Parameter>,
    pub body: Expr,
}

impl Lambda {
    /// Bind `body` over the return value of `fn_ty` followed by its declared parameters.
    pub fn as_contract_for(
        fn_ty: &Type,
        return_var_name: Option<InternedString>,
        body: Expr,
    ) -> Result<Self> {
        let arguments = match fn_ty {
            Type::Code { parameters, return_type } => {
                [Parameter::new(None, return_var_name, (**return_type).clone())]
                    .into_iter()
                    .chain(parameters.iter().cloned())
                    .collect()
            }
            _ => {
                return Err(IrError::construction(
                    "contract lambda",
                    format!("expected a `Code` type, received {fn_ty:?}"),
                ));
            }
        };
        Ok(Self { arguments, body })
    }
}

/// The CBMC representation of a function contract. Represents
/// <https://diffblue.github.io/cbmc/contracts-user.html> but currently only assigns clauses are
/// supported.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionContract {
    pub(crate) assigns: Vec<Lambda>,
}

impl FunctionContract {
    pub fn new(assigns: Vec<Lambda>) -> Self {
        Self { assigns }
    }

    pub fn assigns(&self) -> &[Lambda] {
        &self.assigns
    }
}

/// Currently, only C is understood by CBMC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolModes {
    C,
    Rust,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SymbolValues {
    Expr(Expr),
    Stmt(Stmt),
    None,
}

/// Constructors
impl Symbol {
    pub fn new<T: Into<InternedString>, U: Into<InternedString>, V: Into<InternedString>>(
        name: T,
        location: Location,
        typ: Type,
        value: SymbolValues,
        base_name: Option<U>,
        pretty_name: Option<V>,
    ) -> Self {
        Symbol {
            name: name.into(),
            location,
            typ,
            value,
            base_name: base_name.intern(),
            pretty_name: pretty_name.intern(),

            contract: None,
            pretty_type: None,
            pretty_value: None,
            module: None,
            mode: SymbolModes::C,
            // global properties
            is_exported: false,
            is_input: false,
            is_macro: false,
            is_output: false,
            is_property: false,
            is_state_var: false,
            is_type: false,
            // ansi-C properties
            is_auxiliary: false,
            is_extern: false,
            is_file_local: false,
            is_lvalue: false,
            is_parameter: false,
            is_static_lifetime: false,
            is_static_const: false,
            is_thread_local: false,
            is_volatile: false,
            is_weak: false,
        }
    }

    /// Add this contract to the symbol (symbol must be a function) or fold the
    /// conditions into an existing contract.
    pub fn attach_contract(&mut self, contract: FunctionContract) -> Result<()> {
        if !self.typ.is_code() {
            return Err(IrError::validation(format!(
                "contract attached to {}, which is not a function",
                self.name
            )));
        }
        match self.contract {
            Some(ref mut prior) => {
                prior.assigns.extend(contract.assigns);
            }
            None => self.contract = Some(Box::new(contract)),
        }
        Ok(())
    }

    fn aggr_symbol(tag: InternedString, t: Type, pretty_name: InternedString) -> Symbol {
        Symbol::new(aggr_tag(tag), Location::none(), t, SymbolValues::None, Some(tag), Some(pretty_name))
            .with_is_type(true)
    }

    /// The symbol that defines the type of the struct or union.
    /// For a struct foo this is the symbol "tag-foo" that maps to the type struct foo.
    pub fn aggr_ty<T: Into<InternedString>>(t: Type, pretty_name: T) -> Result<Symbol> {
        let tag = t.tag().ok_or_else(|| {
            IrError::validation(format!("{t:?} is not a struct or union type"))
        })?;
        Ok(Symbol::aggr_symbol(tag, t, pretty_name.into()))
    }

    pub fn builtin_function<T: Into<InternedString>>(
        name: T,
        param_types: Vec<Type>,
        return_type: Type,
    ) -> Symbol {
        let name = name.into();
        Symbol::function(
            name,
            Type::code_with_unnamed_parameters(param_types, return_type),
            None,
            name,
            Location::builtin_function(name, None),
        )
    }

    pub fn constant<T: Into<InternedString>>(
        name: T,
        pretty_name: T,
        base_name: T,
        value: Expr,
        loc: Location,
    ) -> Symbol {
        Symbol::new(
            name,
            loc,
            value.typ().clone(),
            SymbolValues::Expr(value),
            Some(base_name),
            Some(pretty_name),
        )
        .with_is_static_lifetime(true)
    }

    pub fn function<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        typ: Type,
        body: Option<Stmt>,
        pretty_name: U,
        loc: Location,
    ) -> Symbol {
        let name = name.into();
        Symbol::new(
            name,
            loc,
            typ,
            body.map_or(SymbolValues::None, SymbolValues::Stmt),
            Some(name),
            Some(pretty_name),
        )
        .with_is_lvalue(true)
    }

    pub fn typedef<T: Into<InternedString>>(name: T, pretty_name: T, typ: Type, loc: Location) -> Symbol {
        let name = name.into();
        Symbol::new(name, loc, typ, SymbolValues::None, Some(name), Some(pretty_name))
            .with_is_type(true)
            .with_is_file_local(true)
            .with_is_static_lifetime(true)
    }

    pub fn variable<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        base_name: U,
        t: Type,
        l: Location,
    ) -> Symbol {
        Symbol::new(name, l, t, SymbolValues::None, Some(base_name), None::<InternedString>)
            .with_is_thread_local(true)
            .with_is_lvalue(true)
            .with_is_state_var(true)
    }

    pub fn static_variable<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        base_name: U,
        t: Type,
        l: Location,
    ) -> Symbol {
        Symbol::variable(name, base_name, t, l)
            .with_is_thread_local(false)
            .with_is_static_lifetime(true)
    }

    pub fn struct_type<T: Into<InternedString>>(
        name: T,
        pretty_name: InternedString,
        components: Vec<DatatypeComponent>,
    ) -> Result<Symbol> {
        let name = name.into();
        Ok(Symbol::aggr_symbol(name, Type::struct_type(name, components)?, pretty_name))
    }

    pub fn union_type<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        pretty_name: U,
        components: Vec<DatatypeComponent>,
    ) -> Result<Symbol> {
        let name = name.into();
        Ok(Symbol::aggr_symbol(name, Type::union_type(name, components)?, pretty_name.into()))
    }

    pub fn incomplete_struct<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        pretty_name: U,
    ) -> Symbol {
        let name = name.into();
        Symbol::aggr_symbol(name, Type::incomplete_struct(name), pretty_name.into())
    }

    pub fn incomplete_union<T: Into<InternedString>, U: Into<InternedString>>(
        name: T,
        pretty_name: U,
    ) -> Symbol {
        let name = name.into();
        Symbol::aggr_symbol(name, Type::incomplete_union(name), pretty_name.into())
    }
}

/// Setters
impl Symbol {
    pub fn update_fn_declaration_with_definition(&mut self, body: Stmt) -> Result<()> {
        if !self.is_function_declaration() {
            return Err(IrError::validation(format!(
                "Expected function declaration, got {}",
                self.name
            )));
        }
        self.value = SymbolValues::Stmt(body);
        Ok(())
    }

    pub fn with_is_extern(mut self, v: bool) -> Symbol {
        self.is_extern = v;
        self
    }

    pub fn with_is_file_local(mut self, v: bool) -> Symbol {
        self.is_file_local = v;
        self
    }

    pub fn with_is_lvalue(mut self, v: bool) -> Symbol {
        self.is_lvalue = v;
        self
    }

    pub fn with_is_static_lifetime(mut self, v: bool) -> Symbol {
        self.is_static_lifetime = v;
        self
    }

    pub fn with_is_static_const(mut self, v: bool) -> Symbol {
        self.is_static_const = v;
        self
    }

    pub fn with_is_state_var(mut self, v: bool) -> Symbol {
        self.is_state_var = v;
        self
    }

    pub fn with_is_thread_local(mut self, v: bool) -> Symbol {
        self.is_thread_local = v;
        self
    }

    pub fn with_is_type(mut self, v: bool) -> Symbol {
        self.is_type = v;
        self
    }
}

/// Predicates
impl Symbol {
    /// This is a struct or union that completes an incomplete struct or union.
    pub fn completes(&self, old_symbol: Option<&Symbol>) -> bool {
        match old_symbol {
            Some(symbol) => self.typ.completes(&symbol.typ),
            None => false,
        }
    }

    pub fn is_function(&self) -> bool {
        self.typ.is_code() || self.typ.is_variadic_code()
    }

    pub fn is_function_declaration(&self) -> bool {
        self.is_function() && self.value.is_none()
    }

    pub fn is_function_definition(&self) -> bool {
        self.is_function() && self.value.is_stmt()
    }
}

/// Conversions to goto_program types
impl Symbol {
    /// Makes a formal function parameter from a symbol.
    pub fn to_function_parameter(&self) -> Parameter {
        self.typ.clone().as_parameter(Some(self.name), self.base_name)
    }

    /// Makes an expression from a symbol.
    pub fn to_expr(&self) -> Expr {
        Expr::symbol_expression(self.name, self.typ.clone())
    }
}

impl SymbolValues {
    pub fn is_none(&self) -> bool {
        matches!(self, SymbolValues::None)
    }

    pub fn is_stmt(&self) -> bool {
        matches!(self, SymbolValues::Stmt(_))
    }
}

/// Display
impl Display for SymbolModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            SymbolModes::C => "C",
            SymbolModes::Rust => "Rust",
        };
        write!(f, "{mode}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fn_type() -> Type {
        Type::code(
            vec![
                Type::c_int().as_parameter(Some("f::a".into()), Some("a".into())),
                Type::c_char().as_parameter(Some("f::b".into()), Some("b".into())),
            ],
            Type::c_bool(),
        )
    }

    #[test]
    fn test_defaults() {
        let s = Symbol::new(
            "x",
            Location::none(),
            Type::c_int(),
            SymbolValues::None,
            None::<&str>,
            None::<&str>,
        );
        assert_eq!(s.mode, SymbolModes::C);
        assert!(s.contract.is_none());
        let flags = [
            s.is_exported,
            s.is_input,
            s.is_macro,
            s.is_output,
            s.is_property,
            s.is_state_var,
            s.is_type,
            s.is_auxiliary,
            s.is_extern,
            s.is_file_local,
            s.is_lvalue,
            s.is_parameter,
            s.is_static_lifetime,
            s.is_thread_local,
            s.is_volatile,
            s.is_weak,
            s.is_static_const,
        ];
        assert!(flags.iter().all(|f| !f));
        assert_eq!(SymbolModes::C.to_string(), "C");
    }

    #[test]
    fn test_variable_as_parameter_and_expr() {
        let v = Symbol::variable("f::n", "n", Type::c_int(), Location::none());
        let param = v.to_function_parameter();
        assert_eq!(param.identifier(), Some("f::n".into()));
        assert_eq!(param.base_name(), Some("n".into()));
        assert_eq!(param.typ(), &Type::c_int());
        assert_eq!(v.to_expr(), Expr::symbol_expression("f::n", Type::c_int()));
    }

    #[test]
    fn test_contract_lambda_arguments() {
        let body = Expr::bool_true();
        let lambda = Lambda::as_contract_for(&fn_type(), Some("f::ret".into()), body).unwrap();
        assert_eq!(lambda.arguments.len(), 3);
        assert_eq!(lambda.arguments[0].typ(), &Type::c_bool());
        assert_eq!(lambda.arguments[0].base_name(), Some("f::ret".into()));
        assert_eq!(lambda.arguments[0].identifier(), None);
        assert_eq!(lambda.arguments[1].identifier(), Some("f::a".into()));
        assert_eq!(lambda.arguments[2].typ(), &Type::c_char());
    }

    #[test]
    fn test_contract_lambda_needs_code() {
        let err = Lambda::as_contract_for(&Type::c_int(), None, Expr::bool_true()).unwrap_err();
        assert!(matches!(err, IrError::Construction { .. }));
        let variadic = Type::variadic_code(vec![], Type::c_int());
        assert!(Lambda::as_contract_for(&variadic, None, Expr::bool_true()).is_err());
    }

    #[test]
    fn test_attach_contract() {
        let mut f = Symbol::function("f", fn_type(), None, "f", Location::none());
        let lambda = Lambda::as_contract_for(&fn_type(), None, Expr::bool_true()).unwrap();
        f.attach_contract(FunctionContract::new(vec![lambda.clone()])).unwrap();
        f.attach_contract(FunctionContract::new(vec![lambda.clone()])).unwrap();
        assert_eq!(f.contract.as_ref().unwrap().assigns().len(), 2);

        let mut x = Symbol::variable("x", "x", Type::c_int(), Location::none());
        assert!(x.attach_contract(FunctionContract::new(vec![lambda])).is_err());
    }

    #[test]
    fn test_aggregate_symbols() {
        let s = Symbol::struct_type("pair", "pair".into(), vec![
            DatatypeComponent::field("a", Type::c_int()),
        ])
        .unwrap();
        assert_eq!(s.name, "tag-pair");
        assert_eq!(s.base_name, Some("pair".into()));
        assert!(s.is_type);
        assert!(Symbol::aggr_ty(Type::c_int(), "int").is_err());
        let complete = Symbol::aggr_ty(s.typ.clone(), "pair").unwrap();
        assert!(complete.completes(Some(&Symbol::incomplete_struct("pair", "pair"))));
    }

    #[test]
    fn test_function_definition() {
        let mut f = Symbol::function("f", fn_type(), None, "f", Location::none());
        assert!(f.is_function_declaration());
        f.update_fn_declaration_with_definition(Stmt::skip(Location::none())).unwrap();
        assert!(f.is_function_definition());
        assert!(f.update_fn_declaration_with_definition(Stmt::skip(Location::none())).is_err());
        assert_eq!(f.to_expr().typ(), &fn_type());
    }
}
