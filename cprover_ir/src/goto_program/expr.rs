// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// This file has a lot of function with names like "div"
#![allow(clippy::should_implement_trait)]

use self::BinaryOperator::*;
use self::ExprValue::*;
use self::UnaryOperator::*;
use super::{DatatypeComponent, Location, Parameter, Stmt, SwitchCase, SymbolTable, Type};
use crate::{InternedString, IrError, Result};
use num::bigint::BigInt;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::debug;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// An `Expr` represents an expression type: i.e. a computation that returns a value.
/// Every expression has a type, a value, and a location (which may be `None`). An expression may
/// also include a type annotation (`size_of_annotation`), which states that the expression is the
/// result of computing `size_of(type)`.
///
/// The `size_of_annotation` is eventually picked up by CBMC's symbolic execution when simulating
/// heap allocations: for a requested allocation of N bytes, CBMC can either create a byte array of
/// size N, or, when a type T is annotated and N is a multiple of the size of T, an array of
/// N/size_of(T) elements. Failing to provide such an annotation may hamper performance, but will
/// never affect correctness.
///
/// The fields of `Expr` are kept private, and there are no getters that return mutable references.
/// This means that the only way to create and update `Expr`s is using the constructors and setters.
/// In a few cases, there are properties, such as the existence of a field on a struct type,
/// which can only be checked given a symbol table.
/// Other than these properties, the constructors ensure that all expressions are well-formed:
/// a constructor given ill-typed operands returns `IrError::Validation`.
///
/// In general, expressions are constructed in a "chained" style:
///     ` *(&x + i);` would translate to `x.address_of()?.plus(i)?.dereference()?`
/// By default, these expressions have no location: to add a location, use the `.with_location()`
/// fluent builder to add locations when desired.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    value: Box<ExprValue>,
    typ: Type,
    location: Location,
    size_of_annotation: Option<Type>,
}

/// The different kinds of values an expression can have.
/// The names are chosen to map directly onto the IrepID used by CBMC.
/// Each expression is described by reference to the corresponding C code that would generate it.
/// When an expression makes most sense in a broader statement context,
/// the characters >>> e <<< are used to mark the part described by the enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    /// `&self`
    AddressOf(Expr),
    /// `typ x[] = >>> {elems0, elems1 ...} <<<`
    Array {
        elems: Vec<Expr>,
    },
    /// `typ x[width] = >>> {elem} <<<`
    ArrayOf {
        elem: Expr,
    },
    /// `left = right`
    Assign {
        left: Expr,
        right: Expr,
    },
    /// `lhs op rhs`.  E.g. `lhs + rhs` if `op == BinaryOperator::Plus`
    BinOp {
        op: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
    },
    /// `(__CPROVER_bool) >>> true/false <<<`. True/False as a single bit boolean.
    BoolConstant(bool),
    /// Reinterpret bytes of e as type self.typ
    ByteExtract {
        e: Expr,
        offset: u64,
    },
    /// `(bool) 1`. True false as an 8 bit c_boolean.
    CBoolConstant(bool),
    /// `*self`
    Dereference(Expr),
    /// `1.0`
    DoubleConstant(f64),
    /// `1.0f`
    FloatConstant(f32),
    /// `function(arguments)`
    FunctionCall {
        function: Expr,
        arguments: Vec<Expr>,
    },
    /// `c ? t : e`
    If {
        c: Expr,
        t: Expr,
        e: Expr,
    },
    /// `array[index]`
    Index {
        array: Expr,
        index: Expr,
    },
    /// `123`
    IntConstant(BigInt),
    /// `lhs.field`
    Member {
        lhs: Expr,
        field: InternedString,
    },
    /// `__nondet()`
    Nondet,
    /// `NULL`
    PointerConstant(u64),
    /// `__CPROVER_r_ok(ptr, size)`
    ReadOk {
        ptr: Expr,
        size: Expr,
    },
    // `op++` etc
    SelfOp {
        op: SelfOperator,
        e: Expr,
    },
    /// A raw string constant. Note that you normally actually want a pointer to the first element.
    /// `"s"`
    StringConstant {
        s: InternedString,
    },
    /// Struct initializer
    /// `struct foo the_foo = >>> {field1, field2, ... } <<<`
    Struct {
        values: Vec<Expr>,
    },
    /// `self`
    Symbol {
        identifier: InternedString,
    },
    /// `(typ) self`. Target type is in the outer `Expr` struct.
    Typecast(Expr),
    /// Union initializer
    /// `union foo the_foo = >>> {.field = value } <<<`
    Union {
        value: Expr,
        field: InternedString,
    },
    // `op self` eg `! self` if `op == UnaryOperator::Not`
    UnOp {
        op: UnaryOperator,
        e: Expr,
    },
    /// `vec_typ x = >>> {elems0, elems1 ...} <<<`
    Vector {
        elems: Vec<Expr>,
    },
}

/// Binary operators. The names are the same as in the Irep representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Ashr,
    Bitand,
    Bitor,
    Bitnand,
    Bitxor,
    Div,
    Equal,
    Ge,
    Gt,
    IeeeFloatEqual,
    IeeeFloatNotequal,
    Implies,
    Le,
    Lshr,
    Lt,
    Minus,
    Mod,
    Mult,
    Notequal,
    Or,
    OverflowMinus,
    OverflowMult,
    OverflowPlus,
    OverflowResultMinus,
    OverflowResultMult,
    OverflowResultPlus,
    Plus,
    Rol,
    Ror,
    Shl,
    VectorEqual,
    VectorNotequal,
    VectorGe,
    VectorGt,
    VectorLe,
    VectorLt,
    Xor,
}

// Unary operators with side-effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelfOperator {
    /// `self--`
    Postdecrement,
    /// `self++`
    Postincrement,
    /// `--self`
    Predecrement,
    /// `++self`
    Preincrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `~self`
    Bitnot,
    /// `__builtin_bitreverse<n>(self)`
    BitReverse,
    /// `__builtin_bswap<n>(self)`
    Bswap,
    /// `__CPROVER_DYNAMIC_OBJECT(self)`
    IsDynamicObject,
    /// `isfinite(self)`
    IsFinite,
    /// `!self`
    Not,
    /// `__CPROVER_OBJECT_SIZE(self)`
    ObjectSize,
    /// `__CPROVER_POINTER_OBJECT(self)`
    PointerObject,
    /// `__CPROVER_POINTER_OFFSET(self)`
    PointerOffset,
    /// `__builtin_popcount(self)`
    Popcount,
    /// `__builtin_cttz(self)`
    CountTrailingZeros { allow_zero: bool },
    /// `__builtin_ctlz(self)`
    CountLeadingZeros { allow_zero: bool },
    /// `-self`
    UnaryMinus,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 38] = [
        And,
        Ashr,
        Bitand,
        Bitor,
        Bitnand,
        Bitxor,
        Div,
        Equal,
        Ge,
        Gt,
        IeeeFloatEqual,
        IeeeFloatNotequal,
        Implies,
        Le,
        Lshr,
        Lt,
        Minus,
        Mod,
        Mult,
        Notequal,
        Or,
        OverflowMinus,
        OverflowMult,
        OverflowPlus,
        OverflowResultMinus,
        OverflowResultMult,
        OverflowResultPlus,
        Plus,
        Rol,
        Ror,
        Shl,
        VectorEqual,
        VectorNotequal,
        VectorGe,
        VectorGt,
        VectorLe,
        VectorLt,
        Xor,
    ];
}

impl SelfOperator {
    pub const ALL: [SelfOperator; 4] = [
        SelfOperator::Postdecrement,
        SelfOperator::Postincrement,
        SelfOperator::Predecrement,
        SelfOperator::Preincrement,
    ];
}

impl UnaryOperator {
    /// Every operator, with `allow_zero` unset for the counting operators.
    pub const ALL: [UnaryOperator; 13] = [
        Bitnot,
        BitReverse,
        Bswap,
        IsDynamicObject,
        IsFinite,
        Not,
        ObjectSize,
        PointerObject,
        PointerOffset,
        Popcount,
        CountTrailingZeros { allow_zero: false },
        CountLeadingZeros { allow_zero: false },
        UnaryMinus,
    ];
}

/// The return type for `__CPROVER_overflow_op` operations
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticOverflowResult {
    /// If overflow did not occur, the result of the operation. Otherwise undefined.
    pub result: Expr,
    /// Boolean: true if overflow occured, false otherwise.
    pub overflowed: Expr,
}

pub const ARITH_OVERFLOW_RESULT_FIELD: &str = "result";
pub const ARITH_OVERFLOW_OVERFLOWED_FIELD: &str = "overflowed";

/// For arithmetic-overflow-with-result operators, CBMC returns a struct whose
/// first component is the result, and whose second component is whether the
/// operation overflowed.
///
/// The struct is tagged `overflow_result_<operand>`, e.g. `overflow_result_signed_bv_32`, so
/// each distinct operand type gets exactly one such struct.
pub fn arithmetic_overflow_result_type(operand_type: &Type) -> Result<Type> {
    if !operand_type.is_integer() {
        return Err(IrError::validation(format!(
            "overflow result needs an integer operand, got {operand_type:?}"
        )));
    }
    let name = format!("overflow_result_{}", operand_type.to_identifier());
    Type::struct_type(
        name,
        vec![
            DatatypeComponent::field(ARITH_OVERFLOW_RESULT_FIELD, operand_type.clone()),
            DatatypeComponent::field(ARITH_OVERFLOW_OVERFLOWED_FIELD, Type::bool()),
        ],
    )
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

/// Getters
impl Expr {
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }

    pub fn value(&self) -> &ExprValue {
        &self.value
    }

    pub fn size_of_annotation(&self) -> Option<&Type> {
        self.size_of_annotation.as_ref()
    }

    /// If the expression is an Int constant type, return its value
    pub fn int_constant_value(&self) -> Option<BigInt> {
        match &*self.value {
            ExprValue::IntConstant(i) => Some(i.clone()),
            _ => None,
        }
    }

    pub fn struct_expr_values(&self) -> Option<&Vec<Expr>> {
        match &*self.value {
            Struct { values } => Some(values),
            _ => None,
        }
    }
}

/// Predicates
impl Expr {
    /// Returns whether an expression causes side effects or not
    pub fn is_side_effect(&self) -> bool {
        match &*self.value {
            // These expressions always cause side effects
            Assign { .. } | FunctionCall { .. } | Nondet | SelfOp { .. } => true,
            // These expressions do not cause side effects, but the expressions
            // they contain may do. All we need to do are recursive calls.
            AddressOf(e) => e.is_side_effect(),
            Array { elems } => elems.iter().any(|e| e.is_side_effect()),
            ArrayOf { elem } => elem.is_side_effect(),
            BinOp { op: _, lhs, rhs } => lhs.is_side_effect() || rhs.is_side_effect(),
            ByteExtract { e, offset: _ } => e.is_side_effect(),
            Dereference(e) => e.is_side_effect(),
            If { c, t, e } => c.is_side_effect() || t.is_side_effect() || e.is_side_effect(),
            Index { array, index } => array.is_side_effect() || index.is_side_effect(),
            Member { lhs, field: _ } => lhs.is_side_effect(),
            ReadOk { ptr, size } => ptr.is_side_effect() || size.is_side_effect(),
            Struct { values } => values.iter().any(|e| e.is_side_effect()),
            Typecast(e) => e.is_side_effect(),
            Union { value, field: _ } => value.is_side_effect(),
            UnOp { op: _, e } => e.is_side_effect(),
            Vector { elems } => elems.iter().any(|e| e.is_side_effect()),
            // The rest of expressions (constants) do not cause side effects
            BoolConstant(_)
            | CBoolConstant(_)
            | DoubleConstant(_)
            | FloatConstant(_)
            | IntConstant(_)
            | PointerConstant(_)
            | StringConstant { .. }
            | Symbol { .. } => false,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(*self.value, Symbol { .. })
    }

    /// What typecasts are legal. Based off the C standard, plus some additional types
    /// that don't appear in the standard, like `bool`
    /// <https://docs.microsoft.com/en-us/cpp/c-language/type-cast-conversions?view=msvc-160>
    pub fn can_cast_from(source: &Type, target: &Type) -> bool {
        let source = source.unwrap_typedef();
        let target = target.unwrap_typedef();
        #[allow(clippy::needless_bool)]
        if source == target {
            true
        } else if target.is_bool() {
            source.is_c_bool() || source.is_integer() || source.is_pointer()
        } else if target.is_c_bool() {
            source.is_integer() || source.is_pointer() || source.is_bool()
        } else if target.is_integer() {
            source.is_c_bool()
                || source.is_integer()
                || source.is_floating_point()
                || source.is_pointer()
        } else if target.is_floating_point() {
            source.is_numeric()
        } else if target.is_pointer() {
            source.is_integer() || source.is_pointer()
        } else if target.is_empty() {
            true
        } else {
            false
        }
    }

    pub fn can_cast_to(&self, target: &Type) -> bool {
        Expr::can_cast_from(&self.typ, target)
    }

    pub fn can_take_address_of(&self) -> bool {
        matches!(*self.value, Dereference(_) | Index { .. } | Member { .. } | Symbol { .. })
    }
}

/// Setters
impl Expr {
    pub fn with_location(mut self, loc: Location) -> Self {
        self.location = loc;
        self
    }

    pub fn with_size_of_annotation(mut self, ty: Type) -> Self {
        self.size_of_annotation = Some(ty);
        self
    }
}

/// Private constructor. Making this a macro allows multiple reference to self in the same call.
macro_rules! expr {
    ( $value:expr,  $typ:expr) => {{
        let typ = $typ;
        let value = Box::new($value);
        Expr { value, typ, location: Location::none(), size_of_annotation: None }
    }};
}

impl Expr {
    /// Reassembles an expression read back from an `Irep`, without re-checking its operands.
    pub(crate) fn from_parts(value: ExprValue, typ: Type) -> Self {
        expr!(value, typ)
    }
}

/// Fails with a validation error unless `cond` holds.
fn ensure<F: FnOnce() -> String>(cond: bool, msg: F) -> Result<()> {
    if cond { Ok(()) } else { Err(IrError::validation(msg())) }
}

/// Constructors for the main types
impl Expr {
    /// `&self`
    pub fn address_of(self) -> Result<Self> {
        ensure(self.can_take_address_of(), || format!("Can't take address of {self:?}"))?;
        Ok(expr!(AddressOf(self), self.typ.clone().to_pointer()))
    }

    /// `typ x[width] = >>> {elem} <<<`
    pub fn array_constant(self, width: u64) -> Self {
        expr!(ArrayOf { elem: self }, self.typ.clone().array_of(width))
    }

    /// `typ x[] = >>> {elems0, elems1 ...} <<<`
    pub fn array_expr(typ: Type, elems: Vec<Expr>) -> Result<Self> {
        match typ.unwrap_typedef() {
            Type::Array { size, typ: value_typ } => {
                ensure(*size as usize == elems.len(), || {
                    format!("Array of size {size} given {} elements", elems.len())
                })?;
                ensure(elems.iter().all(|x| x.typ == **value_typ), || {
                    format!("Array type and value types don't match: \n{typ:?}\n{elems:?}")
                })?;
            }
            _ => {
                return Err(IrError::validation(format!(
                    "Can't make an array_val with non-array target type {typ:?}"
                )));
            }
        }
        Ok(expr!(Array { elems }, typ))
    }

    pub fn vector_expr(typ: Type, elems: Vec<Expr>) -> Result<Self> {
        match typ.unwrap_typedef() {
            Type::Vector { size, typ: value_typ } => {
                ensure(*size as usize == elems.len(), || {
                    format!("Vector of size {size} given {} elements", elems.len())
                })?;
                ensure(elems.iter().all(|x| x.typ == **value_typ), || {
                    format!("Vector type and value types don't match: \n{typ:?}\n{elems:?}")
                })?;
            }
            _ => {
                return Err(IrError::validation(format!(
                    "Can't make a vector_val with non-vector target type {typ:?}"
                )));
            }
        }
        Ok(expr!(Vector { elems }, typ))
    }

    /// `left = right`, as an expression whose value is the assigned value.
    pub fn assign_expr(self, right: Expr) -> Result<Self> {
        ensure(self.typ == right.typ, || {
            format!("Assignment of {:?} to {:?}", right.typ, self.typ)
        })?;
        Ok(expr!(Assign { left: self, right }, self.typ.clone()))
    }

    /// `(__CPROVER_bool) >>> true/false <<<`. True/False as a single bit boolean.
    pub fn bool_constant(c: bool) -> Self {
        expr!(BoolConstant(c), Type::bool())
    }

    /// `(__CPROVER_bool) false`. False as a single bit boolean.
    pub fn bool_false() -> Self {
        Expr::bool_constant(false)
    }

    /// `(__CPROVER_bool) true`. True as a single bit boolean.
    pub fn bool_true() -> Self {
        Expr::bool_constant(true)
    }

    /// Reinterpret the bytes of `self`, starting at byte `offset`, as a value of type `typ`.
    pub fn byte_extract(self, typ: Type, offset: u64) -> Self {
        expr!(ByteExtract { e: self, offset }, typ)
    }

    /// `(bool) 1`. True false as an 8 bit c_boolean.
    pub fn c_bool_constant(c: bool) -> Self {
        expr!(CBoolConstant(c), Type::c_bool())
    }

    /// `(bool) 1`. True false as an 8 bit c_boolean.
    pub fn c_true() -> Self {
        Self::c_bool_constant(true)
    }

    /// `(bool) 0`. True false as an 8 bit c_boolean.
    pub fn c_false() -> Self {
        Self::c_bool_constant(false)
    }

    /// `(typ) self`.
    pub fn cast_to(self, typ: Type) -> Result<Self> {
        ensure(self.can_cast_to(&typ), || format!("Can't cast\n\n{self:?}\n\nto {typ:?}"))?;
        if self.typ == typ {
            Ok(self)
        } else if typ.is_bool() {
            let zero = self.typ.zero()?;
            self.neq(zero)
        } else {
            Ok(expr!(Typecast(self), typ))
        }
    }

    /// *self: t
    pub fn dereference(self) -> Result<Self> {
        let typ = match self.typ.unwrap_typedef() {
            Type::Pointer { typ } => (**typ).clone(),
            _ => return Err(IrError::validation(format!("Can't dereference {self:?}"))),
        };
        Ok(expr!(Dereference(self), typ))
    }

    /// `1.0`
    pub fn double_constant(c: f64) -> Self {
        expr!(DoubleConstant(c), Type::double())
    }

    /// `1.0f`
    pub fn float_constant(c: f32) -> Self {
        expr!(FloatConstant(c), Type::float())
    }

    /// `self[index]`
    pub fn index_array(self, index: Expr) -> Result<Self> {
        ensure(index.typ.is_integer(), || format!("Index {index:?} is not an integer"))?;
        let typ = match self.typ.base_type() {
            Some(typ) if self.typ.is_array_like() => typ.clone(),
            _ => return Err(IrError::validation(format!("Can't index into {self:?}"))),
        };
        Ok(expr!(Index { array: self, index }, typ))
    }

    /// `123`
    ///
    /// Whether the value fits in the type is only known for a given machine model, so that is
    /// checked when the constant is lowered.
    pub fn int_constant<T>(i: T, typ: Type) -> Result<Self>
    where
        T: Into<BigInt>,
    {
        ensure(typ.is_integer() || typ.is_bitfield(), || {
            format!("Integer constant of non-integer type {typ:?}")
        })?;
        let i = i.into();
        Ok(expr!(IntConstant(i), typ))
    }

    pub fn typecheck_call(function: &Expr, arguments: &[Expr]) -> bool {
        // For variadic functions, all named arguments must match the type of their formal param.
        // Extra arguments (e.g the ... args) can have any type.
        fn typecheck_named_args(parameters: &[Parameter], arguments: &[Expr]) -> bool {
            parameters.iter().zip(arguments.iter()).all(|(p, a)| {
                if a.typ() == p.typ() {
                    true
                } else {
                    debug!(param=?p.typ(), arg=?a.typ(), "Argument doesn't check");
                    false
                }
            })
        }

        match function.typ().parameters() {
            Some(parameters) if function.typ().is_code() => {
                arguments.len() == parameters.len() && typecheck_named_args(parameters, arguments)
            }
            Some(parameters) if function.typ().is_variadic_code() => {
                arguments.len() >= parameters.len() && typecheck_named_args(parameters, arguments)
            }
            _ => false,
        }
    }

    /// `function(arguments)`
    ///
    /// This gives an _expression_.
    /// If you are using this in statement context (e.g. ignoring or assigning the value), use
    /// the `Stmt::function_call` constructor.
    pub fn call(self, arguments: Vec<Expr>) -> Result<Self> {
        ensure(Expr::typecheck_call(&self, &arguments), || {
            format!("Function call does not type check:\nfunc: {self:?}\nargs: {arguments:?}")
        })?;
        let typ = match self.typ().return_type() {
            Some(typ) => typ.clone(),
            None => return Err(IrError::validation(format!("{self:?} is not a function"))),
        };
        Ok(expr!(FunctionCall { function: self, arguments }, typ))
    }

    /// `self.field`
    pub fn member<T>(self, field: T, symbol_table: &SymbolTable) -> Result<Self>
    where
        T: Into<InternedString>,
    {
        let field: InternedString = field.into();
        ensure(self.typ.is_struct_like() || self.typ.is_union() || self.typ.is_union_tag(), || {
            format!("Can't apply .member operation to\n\t{self:?}\n\t{field}")
        })?;
        match self.typ.lookup_field_type(field, symbol_table) {
            Some(ty) => Ok(expr!(Member { lhs: self, field }, ty)),
            None => Err(IrError::validation(format!(
                "unable to find field {field} for type {:?}",
                self.typ()
            ))),
        }
    }

    /// `__nondet_typ()`
    pub fn nondet(typ: Type) -> Self {
        expr!(Nondet, typ)
    }

    /// `e.g. NULL`
    pub fn pointer_constant(c: u64, typ: Type) -> Result<Self> {
        ensure(typ.is_pointer(), || format!("Pointer constant of non-pointer type {typ:?}"))?;
        Ok(expr!(PointerConstant(c), typ))
    }

    /// Internal helper function for Struct initalizer
    /// `struct foo the_foo = >>> {.field1 = val1, .field2 = val2, ... } <<<`
    /// ALL fields must be given, including padding
    fn struct_expr_with_explicit_padding(
        typ: Type,
        fields: &[DatatypeComponent],
        values: Vec<Expr>,
    ) -> Result<Self> {
        ensure(fields.len() == values.len(), || {
            format!("{typ:?} has {} fields, given {} values", fields.len(), values.len())
        })?;
        ensure(fields.iter().zip(values.iter()).all(|(f, v)| f.typ() == *v.typ()), || {
            format!(
                "Error in struct_expr; value type does not match field type.\n\t{typ:?}\n\t{fields:?}\n\t{values:?}"
            )
        })?;
        Ok(expr!(Struct { values }, typ))
    }

    fn struct_components(typ: &Type, symbol_table: &SymbolTable) -> Result<Vec<DatatypeComponent>> {
        ensure(typ.is_struct_tag(), || {
            format!("Error in struct_expr; must be given a struct_tag.\n\t{typ:?}")
        })?;
        typ.lookup_components(symbol_table)
            .cloned()
            .ok_or_else(|| IrError::validation(format!("No components known for {typ:?}")))
    }

    /// Struct initializer
    /// `struct foo the_foo = >>> {field1, field2, ... } <<<`
    /// Note that only the NON padding fields should be explicitly given.
    /// Padding fields are automatically inserted using the type from the `SymbolTable`
    pub fn struct_expr_from_values(
        typ: Type,
        non_padding_values: Vec<Expr>,
        symbol_table: &SymbolTable,
    ) -> Result<Self> {
        let fields = Expr::struct_components(&typ, symbol_table)?;
        let non_padding = fields.iter().filter(|x| !x.is_padding()).count();
        ensure(non_padding == non_padding_values.len(), || {
            format!(
                "Error in struct_expr; mismatch in number of fields and values.\n\t{typ:?}\n\t{non_padding_values:?}"
            )
        })?;
        let mut non_padding_values = non_padding_values.into_iter();
        let values = fields
            .iter()
            .map(|f| {
                if f.is_padding() {
                    f.typ().nondet()
                } else {
                    non_padding_values.next().unwrap_or_else(|| f.typ().nondet())
                }
            })
            .collect();
        Expr::struct_expr_with_explicit_padding(typ, &fields, values)
    }

    /// `identifier`
    pub fn symbol_expression<T: Into<InternedString>>(identifier: T, typ: Type) -> Self {
        let identifier = identifier.into();
        expr!(Symbol { identifier }, typ)
    }

    /// `self ? t : e`
    pub fn ternary(self, t: Expr, e: Expr) -> Result<Expr> {
        ensure(t.typ == e.typ, || format!("Ternary branches differ: {:?} {:?}", t.typ, e.typ))?;
        let c = self.cast_to(Type::bool())?;
        Ok(expr!(If { c, t, e }, t.typ.clone()))
    }

    /// Reinterpret the bits of `self` as being of type `t`.
    /// Note that this differs from standard casts, which may convert values.
    /// To abuse syntax: `(uint32_t)(1.0) == 1`, while `(1.0).transmute_to(uin32_t) == 0x3f800000`
    pub fn transmute_to(self, t: Type, st: &SymbolTable) -> Result<Expr> {
        let from = self.typ().sizeof_in_bits(st)?;
        let to = t.sizeof_in_bits(st)?;
        ensure(from == to, || format!("Can't transmute {from} bits to {to} bits"))?;
        Ok(self.byte_extract(t, 0))
    }

    /// Union initializer
    /// `union foo the_foo = >>> {.field = value } <<<`
    pub fn union_expr<T: Into<InternedString>>(
        typ: Type,
        field: T,
        value: Expr,
        symbol_table: &SymbolTable,
    ) -> Result<Self> {
        let field = field.into();
        ensure(typ.is_union_tag() || typ.is_union(), || format!("{typ:?} is not a union"))?;
        ensure(typ.lookup_field_type(field, symbol_table).as_ref() == Some(value.typ()), || {
            format!("Union field {field} of {typ:?} can't hold {:?}", value.typ())
        })?;
        let typ = typ.aggr_tag().unwrap_or(typ);
        Ok(expr!(Union { value, field }, typ))
    }
}

/// Constructors for Binary Operations
impl Expr {
    fn typecheck_binop_args(op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> bool {
        match op {
            // Arithmetic which can include pointers
            Minus => {
                (lhs.typ == rhs.typ)
                    && (lhs.typ.is_pointer() || lhs.typ.is_numeric() || lhs.typ.is_vector())
                    || (lhs.typ.is_pointer() && rhs.typ.is_integer())
            }
            Plus => {
                (lhs.typ == rhs.typ && (lhs.typ.is_numeric() || lhs.typ.is_vector()))
                    || (lhs.typ.is_pointer() && rhs.typ.is_integer())
            }
            // Arithmetic
            Div | Mod | Mult => lhs.typ == rhs.typ && (lhs.typ.is_numeric() || lhs.typ.is_vector()),
            // Bitshifts
            Ashr | Lshr | Shl => {
                lhs.typ.is_integer() && rhs.typ.is_integer()
                    || (lhs.typ == rhs.typ && lhs.typ.is_vector())
            }
            Rol | Ror => lhs.typ.is_integer() && rhs.typ.is_integer(),
            // Boolean ops
            And | Implies | Or | Xor => lhs.typ.is_bool() && rhs.typ.is_bool(),
            // Bitwise ops
            Bitand | Bitor | Bitxor => {
                lhs.typ == rhs.typ && (lhs.typ.is_integer() || lhs.typ.is_vector())
            }
            // Bitwise ops (no vector support)
            Bitnand => lhs.typ == rhs.typ && lhs.typ.is_integer(),
            // Comparisons
            Ge | Gt | Le | Lt => {
                lhs.typ == rhs.typ && (lhs.typ.is_numeric() || lhs.typ.is_pointer())
            }
            // Equalities
            Equal | Notequal => {
                lhs.typ == rhs.typ
                    && (lhs.typ.is_c_bool()
                        || lhs.typ.is_bool()
                        || lhs.typ.is_integer()
                        || lhs.typ.is_pointer())
            }
            // Floating Point Equalities
            IeeeFloatEqual | IeeeFloatNotequal => lhs.typ == rhs.typ && lhs.typ.is_floating_point(),
            // Overflow flags
            OverflowMinus | OverflowResultMinus => {
                (lhs.typ == rhs.typ && (lhs.typ.is_pointer() || lhs.typ.is_numeric()))
                    || (lhs.typ.is_pointer() && rhs.typ.is_integer())
            }
            OverflowMult | OverflowPlus | OverflowResultMult | OverflowResultPlus => {
                (lhs.typ == rhs.typ && lhs.typ.is_integer())
                    || (lhs.typ.is_pointer() && rhs.typ.is_integer())
            }
            // Vector comparisons are checked against the place type in `vector_cmp`.
            VectorEqual | VectorNotequal | VectorGe | VectorLe | VectorGt | VectorLt => false,
        }
    }

    fn binop_return_type(op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Result<Type> {
        match op {
            // Arithmetic which can include pointers
            Minus => {
                if lhs.typ.is_pointer() && rhs.typ.is_pointer() {
                    Ok(Type::ssize_t())
                } else {
                    Ok(lhs.typ.clone())
                }
            }
            // Arithmetic
            Div | Mod | Mult | Plus => Ok(lhs.typ.clone()),
            // Bitshifts
            Ashr | Lshr | Rol | Ror | Shl => Ok(lhs.typ.clone()),
            // Boolean ops
            And | Implies | Or | Xor => Ok(Type::bool()),
            // Bitwise ops
            Bitand | Bitnand | Bitor | Bitxor => Ok(lhs.typ.clone()),
            // Comparisons
            Ge | Gt | Le | Lt => Ok(Type::bool()),
            // Equalities
            Equal | Notequal => Ok(Type::bool()),
            // Floating Point Equalities
            IeeeFloatEqual | IeeeFloatNotequal => Ok(Type::bool()),
            // Overflow flags
            OverflowMinus | OverflowMult | OverflowPlus => Ok(Type::bool()),
            OverflowResultMinus | OverflowResultMult | OverflowResultPlus => {
                let struct_type = arithmetic_overflow_result_type(&lhs.typ)?;
                struct_type.aggr_tag().ok_or_else(|| {
                    IrError::validation(format!("{struct_type:?} has no tag"))
                })
            }
            // Vector comparisons
            VectorEqual | VectorNotequal | VectorGe | VectorLe | VectorGt | VectorLt => {
                Err(IrError::validation(
                    "return type for vector comparison operators depends on the place type",
                ))
            }
        }
    }

    /// Comparison operators for SIMD vectors aren't typechecked as regular
    /// comparison operators. First, the return type depends on the place's type
    /// (i.e., the variable or expression type for the result).
    ///
    /// In addition, the return type must have:
    ///  1. The same length (number of elements) as the operand types.
    ///  2. An integer base type. The signedness doesn't matter, as the result for each element
    ///     is either "all ones" (true) or "all zeros" (false).
    fn typecheck_vector_cmp_expr(lhs: &Expr, rhs: &Expr, ret_typ: &Type) -> bool {
        lhs.typ.is_vector()
            && lhs.typ == rhs.typ
            && lhs.typ.len() == ret_typ.len()
            && ret_typ.is_vector()
            && ret_typ.base_type().is_some_and(|t| t.is_integer())
    }

    /// self op right;
    pub fn binop(self, op: BinaryOperator, rhs: Expr) -> Result<Expr> {
        ensure(Expr::typecheck_binop_args(op, &self, &rhs), || {
            format!("BinaryOperation Expression does not typecheck {op:?} {self:?} {rhs:?}")
        })?;
        let typ = Expr::binop_return_type(op, &self, &rhs)?;
        Ok(expr!(BinOp { op, lhs: self, rhs }, typ))
    }

    /// Like `binop`, but receives an additional parameter `ret_typ` with the expected
    /// return type for the place, which is used as the return type.
    pub fn vector_cmp(self, op: BinaryOperator, rhs: Expr, ret_typ: Type) -> Result<Expr> {
        ensure(
            matches!(op, VectorEqual | VectorNotequal | VectorGe | VectorLe | VectorGt | VectorLt),
            || format!("{op:?} is not a vector comparison"),
        )?;
        ensure(Expr::typecheck_vector_cmp_expr(&self, &rhs, &ret_typ), || {
            format!("vector comparison expression does not typecheck {self:?} {rhs:?} {ret_typ:?}")
        })?;
        Ok(expr!(BinOp { op, lhs: self, rhs }, ret_typ))
    }

    /// `__builtin_add_overflow_p(self,e)
    pub fn add_overflow_p(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowPlus, e)
    }

    /// `__builtin_sub_overflow_p(self,e)
    pub fn sub_overflow_p(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowMinus, e)
    }

    /// `__builtin_mul_overflow_p(self,e)
    pub fn mul_overflow_p(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowMult, e)
    }

    /// `self && e`
    pub fn and(self, e: Expr) -> Result<Expr> {
        self.cast_to(Type::bool())?.binop(And, e.cast_to(Type::bool())?)
    }

    /// logical xor
    pub fn xor(self, e: Expr) -> Result<Expr> {
        self.binop(Xor, e)
    }

    /// `self + e`
    pub fn plus(self, e: Expr) -> Result<Expr> {
        self.binop(Plus, e)
    }

    /// `self - e`
    pub fn sub(self, e: Expr) -> Result<Expr> {
        self.binop(Minus, e)
    }

    /// self * e
    pub fn mul(self, e: Expr) -> Result<Expr> {
        self.binop(Mult, e)
    }

    /// self < e
    pub fn lt(self, e: Expr) -> Result<Expr> {
        self.binop(Lt, e)
    }

    /// self > e
    pub fn gt(self, e: Expr) -> Result<Expr> {
        self.binop(Gt, e)
    }

    /// self : integer == e
    pub fn eq(self, e: Expr) -> Result<Expr> {
        self.binop(Equal, e)
    }

    /// self : integer != e
    pub fn neq(self, e: Expr) -> Result<Expr> {
        self.binop(Notequal, e)
    }

    /// `__CPROVER_r_ok(self, e)`
    pub fn r_ok(self, e: Expr) -> Result<Expr> {
        ensure(self.typ.is_pointer() && e.typ.is_c_size_t(), || {
            format!("r_ok expects a pointer and a size_t: {self:?} {e:?}")
        })?;
        Ok(expr!(ReadOk { ptr: self, size: e }, Type::bool()))
    }

    // Regular comparison operators (e.g., `==` or `<`) don't work over SIMD vectors.
    // Instead, we must use the dedicated `vector-<op>` Irep operators.

    /// `self == e` for SIMD vectors
    pub fn vector_eq(self, e: Expr, ret_typ: Type) -> Result<Expr> {
        self.vector_cmp(VectorEqual, e, ret_typ)
    }

    /// `self < e` for SIMD vectors
    pub fn vector_lt(self, e: Expr, ret_typ: Type) -> Result<Expr> {
        self.vector_cmp(VectorLt, e, ret_typ)
    }

    // Expressions defined on top of other expressions

    /// `min(self, e)`
    pub fn min(self, e: Expr) -> Result<Expr> {
        ensure(!self.is_side_effect() && !e.is_side_effect(), || {
            "min of side effecting expressions".to_string()
        })?;
        let cmp = self.clone().lt(e.clone())?;
        cmp.ternary(self, e)
    }

    /// `max(self, e)`
    pub fn max(self, e: Expr) -> Result<Expr> {
        ensure(!self.is_side_effect() && !e.is_side_effect(), || {
            "max of side effecting expressions".to_string()
        })?;
        let cmp = self.clone().gt(e.clone())?;
        cmp.ternary(self, e)
    }
}

/// Constructors for self operations
impl Expr {
    /// Private constructor for self operations
    fn self_op(self, op: SelfOperator) -> Result<Expr> {
        ensure(self.typ.is_integer() || self.typ.is_pointer(), || {
            format!("Can't apply {op:?} to {self:?}")
        })?;
        Ok(expr!(SelfOp { op, e: self }, self.typ.clone()))
    }

    /// `self++`
    pub fn postincr(self) -> Result<Expr> {
        self.self_op(SelfOperator::Postincrement)
    }

    /// `++self`
    pub fn preincr(self) -> Result<Expr> {
        self.self_op(SelfOperator::Preincrement)
    }

}

/// Constructors for unary operators
impl Expr {
    fn typecheck_unop_arg(op: UnaryOperator, arg: &Expr) -> bool {
        match op {
            Bitnot | BitReverse | Bswap | Popcount => arg.typ.is_integer(),
            CountLeadingZeros { .. } | CountTrailingZeros { .. } => arg.typ.is_integer(),
            IsDynamicObject | ObjectSize | PointerObject => arg.typ().is_pointer(),
            IsFinite => arg.typ().is_floating_point(),
            PointerOffset => arg.typ == Type::void_pointer(),
            Not => arg.typ.is_bool(),
            UnaryMinus => arg.typ().is_numeric(),
        }
    }

    fn unop_return_type(op: UnaryOperator, arg: &Expr) -> Type {
        match op {
            Bitnot | BitReverse | Bswap | UnaryMinus => arg.typ.clone(),
            CountLeadingZeros { .. } | CountTrailingZeros { .. } => arg.typ.clone(),
            ObjectSize | PointerObject => Type::size_t(),
            PointerOffset => Type::ssize_t(),
            IsDynamicObject | IsFinite | Not => Type::bool(),
            Popcount => arg.typ.clone(),
        }
    }

    /// `op self`
    pub fn unop(self, op: UnaryOperator) -> Result<Expr> {
        ensure(Expr::typecheck_unop_arg(op, &self), || {
            format!("UnaryOperation Expression does not typecheck {op:?} {self:?}")
        })?;
        let typ = Expr::unop_return_type(op, &self);
        Ok(expr!(ExprValue::UnOp { op, e: self }, typ))
    }

    /// `!self`
    pub fn not(self) -> Result<Expr> {
        self.cast_to(Type::bool())?.unop(Not)
    }

    /// `__CPROVER_OBJECT_SIZE(self)`
    pub fn object_size(self) -> Result<Self> {
        self.unop(ObjectSize)
    }

    /// `__CPROVER_POINTER_OFFSET(self)`
    pub fn pointer_offset(self) -> Result<Self> {
        self.cast_to(Type::void_pointer())?.unop(PointerOffset)
    }

    /// `__builtin_popcount(self)`
    pub fn popcount(self) -> Result<Expr> {
        self.unop(Popcount)
    }

    /// `__builtin_cttz(self)`
    /// If `allow_zero == false`, calling this builtin with 0 causes UB
    /// Otherwise it is defined for all values
    pub fn cttz(self, allow_zero: bool) -> Result<Expr> {
        self.unop(CountTrailingZeros { allow_zero })
    }

    /// `__builtin_ctlz(self)`
    /// If `allow_zero == false`, calling this builtin with 0 causes UB
    /// Otherwise it is defined for all values
    pub fn ctlz(self, allow_zero: bool) -> Result<Expr> {
        self.unop(CountLeadingZeros { allow_zero })
    }
}

/// Compound Expressions
impl Expr {
    /// `self == 0`
    pub fn is_zero(self) -> Result<Self> {
        let zero = self.typ.zero()?;
        self.eq(zero)
    }

    /// `ArithmeticOverflowResult r; >>>r.overflowed = builtin_add_overflow(self, e, &r.result)<<<`
    pub fn add_overflow(self, e: Expr) -> Result<ArithmeticOverflowResult> {
        let result = self.clone().plus(e.clone())?;
        let overflowed = self.add_overflow_p(e)?;
        Ok(ArithmeticOverflowResult { result, overflowed })
    }

    /// Uses CBMC's [binop]-with-overflow operation that performs a single arithmetic
    /// operation
    /// `struct (T, bool) overflow(binop, self, e)` where `T` is the type of `self`
    /// Pseudocode:
    /// ```text
    /// struct overflow_result_t {
    ///   T    result;
    ///   bool overflowed;
    /// } overflow_result;
    /// raw_result = (cast to wider type) self + (cast to wider type) e;
    /// overflow_result.result = (cast to T) raw_result;
    /// overflow_result.overflowed = raw_result > maximum value of T;
    /// return overflow_result;
    /// ```
    /// The struct is registered in `symbol_table` the first time it is needed.
    pub fn overflow_op(
        self,
        op: BinaryOperator,
        e: Expr,
        symbol_table: &mut SymbolTable,
    ) -> Result<Expr> {
        ensure(matches!(op, OverflowResultMinus | OverflowResultMult | OverflowResultPlus), || {
            format!("Expected an overflow operation, but found: `{op:?}`")
        })?;
        let operand_type = self.typ.clone();
        let result = self.binop(op, e)?;
        symbol_table.register_overflow_result_type(&operand_type)?;
        Ok(result)
    }

    /// Like `overflow_op(OverflowResultPlus, ..)`, but the caller must register the result
    /// struct with `SymbolTable::register_overflow_result_type`.
    pub fn add_overflow_result(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowResultPlus, e)
    }

    /// `&self[0]`. Converts arrays into pointers
    pub fn array_to_ptr(self) -> Result<Self> {
        ensure(self.typ().is_array_like(), || format!("{self:?} is not an array"))?;
        self.index_array(Type::ssize_t().zero()?)?.address_of()
    }

    /// `ArithmeticOverflowResult r; >>>r.overflowed = builtin_mul_overflow(self, e, &r.result)<<<`
    pub fn mul_overflow(self, e: Expr) -> Result<ArithmeticOverflowResult> {
        let result = self.clone().mul(e.clone())?;
        let overflowed = self.mul_overflow_p(e)?;
        Ok(ArithmeticOverflowResult { result, overflowed })
    }

    /// Uses CBMC's multiply-with-overflow operation that performs a single
    /// multiplication operation
    /// `struct (T, bool) overflow(*, self, e)` where `T` is the type of `self`
    /// See pseudocode in `overflow_op`. The result struct is not registered.
    pub fn mul_overflow_result(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowResultMult, e)
    }

    /// `ArithmeticOverflowResult r; >>>r.overflowed = builtin_sub_overflow(self, e, &r.result)<<<`
    pub fn sub_overflow(self, e: Expr) -> Result<ArithmeticOverflowResult> {
        let result = self.clone().sub(e.clone())?;
        let overflowed = self.sub_overflow_p(e)?;
        Ok(ArithmeticOverflowResult { result, overflowed })
    }

    /// Uses CBMC's subtract-with-overflow operation that performs a single
    /// subtraction operation
    /// See pseudocode in `overflow_op`. The result struct is not registered.
    /// `struct (T, bool) overflow(-, self, e)` where `T` is the type of `self`
    pub fn sub_overflow_result(self, e: Expr) -> Result<Expr> {
        self.binop(OverflowResultMinus, e)
    }

    /// `"s"`
    /// only to be used when manually wrapped in `.array_to_ptr()`
    pub fn raw_string_constant(s: InternedString) -> Self {
        expr!(StringConstant { s }, Type::c_char().array_of(s.len() as u64 + 1))
    }

    /// `"s"`
    pub fn string_constant<T: Into<InternedString>>(s: T) -> Result<Self> {
        // Internally, CBMC distinguishes between the string constant, and the pointer to it.
        // The thing we actually manipulate is the pointer, so what is what we return from the constructor.
        Expr::raw_string_constant(s.into()).array_to_ptr()
    }
}

/// Conversions to statements
/// The statement constructors do typechecking, so we don't redundantly do that here.
impl Expr {
    /// `self;`
    pub fn as_stmt(self, loc: Location) -> Stmt {
        Stmt::code_expression(self, loc)
    }

    /// `self = rhs;`
    pub fn assign(self, rhs: Expr, loc: Location) -> Result<Stmt> {
        Stmt::assign(self, rhs, loc)
    }

    /// Shorthand to build a `Deinit(self)` statement. See `StmtBody::Deinit`
    pub fn deinit(self, loc: Location) -> Stmt {
        Stmt::deinit(self, loc)
    }

    /// `if (self) { t } else { e }` or `if (self) { t }`
    pub fn if_then_else(self, t: Stmt, e: Option<Stmt>, loc: Location) -> Result<Stmt> {
        Stmt::if_then_else(self, t, e, loc)
    }

    /// `return self;`
    pub fn ret(self, loc: Location) -> Stmt {
        Stmt::ret(Some(self), loc)
    }

    /// `switch (self) { cases }`
    pub fn switch(
        self,
        cases: Vec<SwitchCase>,
        default: Option<Stmt>,
        loc: Location,
    ) -> Result<Stmt> {
        Stmt::switch(self, cases, default, loc)
    }

    /// `case self: { body }`
    pub fn switch_case(self, body: Stmt) -> SwitchCase {
        SwitchCase::new(self, body)
    }
}

impl Expr {
    /// Given a struct value (Expr), construct a mapping from struct field names
    /// (Strings) to struct field values (Exprs), ignoring padding.
    pub fn struct_field_exprs(
        &self,
        symbol_table: &SymbolTable,
    ) -> Result<BTreeMap<InternedString, Expr>> {
        let fields = Expr::struct_components(self.typ(), symbol_table)?;
        let mut exprs = BTreeMap::new();
        match self.struct_expr_values() {
            Some(values) => {
                ensure(fields.len() == values.len(), || {
                    format!("{:?} does not match its fields", self.typ())
                })?;
                for (field, value) in fields.iter().zip(values.iter()) {
                    if !field.is_padding() {
                        exprs.insert(field.name(), value.clone());
                    }
                }
            }
            None => {
                for field in fields.iter().filter(|f| !f.is_padding()) {
                    exprs.insert(field.name(), self.clone().member(field.name(), symbol_table)?);
                }
            }
        }
        Ok(exprs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::Symbol;
    use crate::machine_model::test_util::machine_model_test_stub;

    fn int32() -> Type {
        Type::signed_int(32).unwrap()
    }

    fn sym(name: &str, typ: Type) -> Expr {
        Expr::symbol_expression(name, typ)
    }

    #[test]
    fn test_comparison_yields_bool() {
        let e = sym("a", int32()).lt(sym("b", int32())).unwrap();
        assert_eq!(e.typ(), &Type::bool());
        let e = sym("a", int32()).eq(sym("b", int32())).unwrap();
        assert_eq!(e.typ(), &Type::bool());
    }

    #[test]
    fn test_arithmetic_preserves_type() {
        let e = sym("a", int32()).plus(sym("b", int32())).unwrap();
        assert_eq!(e.typ(), &int32());
        assert!(matches!(
            sym("a", int32()).plus(sym("b", Type::c_int())),
            Err(IrError::Validation { .. })
        ));
    }

    #[test]
    fn test_pointer_arithmetic() {
        let ptr = Type::c_int().to_pointer();
        let e = sym("p", ptr.clone()).plus(sym("i", Type::unsigned_int(8).unwrap())).unwrap();
        assert_eq!(e.typ(), &ptr);
        let e = sym("p", ptr.clone()).sub(sym("q", ptr)).unwrap();
        assert_eq!(e.typ(), &Type::ssize_t());
    }

    #[test]
    fn test_boolean_connectives_cast_operands() {
        let e = sym("a", Type::c_bool()).and(sym("b", Type::bool())).unwrap();
        assert_eq!(e.typ(), &Type::bool());
        assert!(sym("a", Type::c_bool()).xor(sym("b", Type::bool())).is_err());
    }

    #[test]
    fn test_overflow_result_type() {
        let t = arithmetic_overflow_result_type(&int32()).unwrap();
        assert_eq!(t.tag().unwrap(), "overflow_result_signed_bv_32");
        let names: Vec<String> =
            t.components().unwrap().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["result", "overflowed"]);
        assert_eq!(t.components().unwrap()[0].field_typ(), Some(&int32()));
        assert_eq!(t.components().unwrap()[1].field_typ(), Some(&Type::bool()));
        assert!(matches!(
            arithmetic_overflow_result_type(&Type::float()),
            Err(IrError::Validation { .. })
        ));
    }

    #[test]
    fn test_overflow_result_expr_type() {
        let e = sym("a", int32()).add_overflow_result(sym("b", int32())).unwrap();
        assert_eq!(e.typ(), &Type::struct_tag("overflow_result_signed_bv_32"));
        let res = sym("a", int32()).mul_overflow(sym("b", int32())).unwrap();
        assert_eq!(res.overflowed.typ(), &Type::bool());
        assert_eq!(res.result.typ(), &int32());
    }

    #[test]
    fn test_overflow_op_registers_result_struct() {
        let mut st = SymbolTable::new(machine_model_test_stub()).unwrap();
        let before = st.len();
        let e = sym("a", int32()).overflow_op(OverflowResultMult, sym("b", int32()), &mut st);
        assert_eq!(e.unwrap().typ(), &Type::struct_tag("overflow_result_signed_bv_32"));
        assert!(st.contains("tag-overflow_result_signed_bv_32"));
        sym("a", int32()).overflow_op(OverflowResultMinus, sym("b", int32()), &mut st).unwrap();
        assert_eq!(st.len(), before + 1);
        assert!(sym("a", int32()).overflow_op(Plus, sym("b", int32()), &mut st).is_err());
        let flag = sym("a", Type::bool());
        assert!(flag.overflow_op(OverflowResultPlus, sym("b", Type::bool()), &mut st).is_err());
        assert_eq!(st.len(), before + 1);
    }

    #[test]
    fn test_read_ok_is_its_own_value() {
        let e = sym("p", Type::void_pointer()).r_ok(sym("n", Type::size_t())).unwrap();
        assert!(matches!(e.value(), ExprValue::ReadOk { .. }));
        assert_eq!(e.typ(), &Type::bool());
        assert!(sym("p", Type::void_pointer()).r_ok(sym("n", Type::c_int())).is_err());
    }

    #[test]
    fn test_unops() {
        let p = sym("p", Type::c_int().to_pointer());
        assert_eq!(p.clone().object_size().unwrap().typ(), &Type::size_t());
        assert_eq!(p.clone().pointer_offset().unwrap().typ(), &Type::ssize_t());
        assert_eq!(sym("x", int32()).ctlz(true).unwrap().typ(), &int32());
        assert!(sym("f", Type::float()).popcount().is_err());
        assert_eq!(sym("b", Type::c_bool()).not().unwrap().typ(), &Type::bool());
    }

    #[test]
    fn test_self_ops() {
        let e = sym("x", int32()).preincr().unwrap();
        assert!(matches!(e.value(), SelfOp { op: SelfOperator::Preincrement, .. }));
        assert!(sym("f", Type::float()).postincr().is_err());
    }

    #[test]
    fn test_vector_cmp() {
        let v = Type::vector(Type::float(), 4).unwrap();
        let ret = Type::vector(Type::unsigned_int(32).unwrap(), 4).unwrap();
        let e = sym("a", v.clone()).vector_lt(sym("b", v.clone()), ret.clone()).unwrap();
        assert_eq!(e.typ(), &ret);
        assert!(sym("a", v.clone()).binop(VectorLt, sym("b", v.clone())).is_err());
        let short = Type::vector(Type::unsigned_int(32).unwrap(), 2).unwrap();
        assert!(sym("a", v.clone()).vector_eq(sym("b", v), short).is_err());
    }

    #[test]
    fn test_cast_to_bool_compares_with_zero() {
        let e = sym("x", Type::c_int()).cast_to(Type::bool()).unwrap();
        assert!(matches!(e.value(), BinOp { op: Notequal, .. }));
        let e = sym("x", Type::c_int()).cast_to(Type::c_char()).unwrap();
        assert!(matches!(e.value(), Typecast(_)));
        assert!(sym("s", Type::struct_tag("s")).cast_to(Type::c_int()).is_err());
    }

    #[test]
    fn test_string_constant() {
        let e = Expr::string_constant("hi").unwrap();
        assert_eq!(e.typ(), &Type::c_char().to_pointer());
        match e.value() {
            AddressOf(index) => match index.value() {
                Index { array, .. } => assert_eq!(array.typ(), &Type::c_char().array_of(3)),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_call_typechecks() {
        let f = sym("f", Type::code_with_unnamed_parameters(vec![Type::c_int()], Type::c_bool()));
        assert!(f.clone().call(vec![sym("x", Type::c_char())]).is_err());
        assert!(f.clone().call(vec![]).is_err());
        let call = f.call(vec![sym("x", Type::c_int())]).unwrap();
        assert_eq!(call.typ(), &Type::c_bool());
        let v = sym(
            "printf",
            Type::variadic_code_with_unnamed_parameters(vec![Type::c_int()], Type::c_int()),
        );
        assert!(v.call(vec![sym("x", Type::c_int()), sym("y", Type::double())]).is_ok());
    }

    #[test]
    fn test_building_twice_is_equal() {
        let build = || {
            sym("a", int32())
                .plus(Expr::int_constant(1, int32()).unwrap())
                .unwrap()
                .with_location(Location::new("main.c", Some("main"), 3, None, 3, None).unwrap())
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_struct_and_member() {
        let mut st = SymbolTable::new(machine_model_test_stub()).unwrap();
        st.insert(
            Symbol::struct_type("pair", "pair".into(), vec![
                DatatypeComponent::field("a", Type::c_int()),
                DatatypeComponent::padding("$pad", 32),
                DatatypeComponent::field("b", Type::c_bool()),
            ])
            .unwrap(),
        )
        .unwrap();
        let typ = Type::struct_tag("pair");
        let value = Expr::struct_expr_from_values(
            typ.clone(),
            vec![Expr::int_constant(1, Type::c_int()).unwrap(), Expr::c_true()],
            &st,
        )
        .unwrap();
        assert_eq!(value.struct_expr_values().unwrap().len(), 3);
        let fields = value.struct_field_exprs(&st).unwrap();
        assert_eq!(fields.len(), 2);
        let member = sym("p", typ.clone()).member("b", &st).unwrap();
        assert_eq!(member.typ(), &Type::c_bool());
        assert!(sym("p", typ.clone()).member("c", &st).is_err());
        assert!(Expr::struct_expr_from_values(typ, vec![Expr::c_true()], &st).is_err());
    }

    #[test]
    fn test_union_expr_checks_field() {
        let mut st = SymbolTable::new(machine_model_test_stub()).unwrap();
        let components = vec![
            DatatypeComponent::field("i", Type::c_int()),
            DatatypeComponent::field("f", Type::float()),
        ];
        st.insert(Symbol::union_type("u", "u", components).unwrap()).unwrap();
        let typ = Type::union_tag("u");
        let value = Expr::union_expr(typ.clone(), "f", Expr::float_constant(1.0), &st).unwrap();
        assert_eq!(value.typ(), &typ);
        assert!(Expr::union_expr(typ.clone(), "i", Expr::float_constant(1.0), &st).is_err());
        assert!(Expr::union_expr(typ, "g", Expr::float_constant(1.0), &st).is_err());
        let pair = Type::struct_tag("pair");
        assert!(Expr::union_expr(pair, "f", Expr::float_constant(1.0), &st).is_err());
    }

    #[test]
    fn test_overflow_helpers() {
        let res = sym("a", int32()).sub_overflow(sym("b", int32())).unwrap();
        assert_eq!(res.result.typ(), &int32());
        assert_eq!(res.overflowed.typ(), &Type::bool());
        let res = sym("a", int32()).add_overflow(sym("b", int32())).unwrap();
        assert!(matches!(res.result.value(), ExprValue::BinOp { op: Plus, .. }));
        let tag = Type::struct_tag("overflow_result_signed_bv_32");
        assert_eq!(sym("a", int32()).sub_overflow_result(sym("b", int32())).unwrap().typ(), &tag);
        assert_eq!(sym("a", int32()).mul_overflow_result(sym("b", int32())).unwrap().typ(), &tag);
    }

    #[test]
    fn test_int_constant_requires_integer_type() {
        assert!(Expr::int_constant(1, Type::float()).is_err());
        assert_eq!(
            Expr::int_constant(7, Type::c_int()).unwrap().int_constant_value(),
            Some(BigInt::from(7))
        );
    }

    #[test]
    fn test_operator_tables_are_complete() {
        let mut bin: Vec<_> = BinaryOperator::ALL.iter().map(|op| format!("{op:?}")).collect();
        bin.sort();
        bin.dedup();
        assert_eq!(bin.len(), 38);
        assert_eq!(UnaryOperator::ALL.len(), 13);
        assert_eq!(SelfOperator::ALL.len(), 4);
    }
}
