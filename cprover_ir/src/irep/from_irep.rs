// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Reads typed goto-program values back out of `Irep`s.
//!
//! This is the inverse of `to_irep`: every id and named sub written there is recognized here,
//! and anything else is reported as `IrError::Decode` with the path of the offending node.
//! A few lowerings lose information and lift to an equivalent value instead:
//! C integer types come back as plain bit-vectors, zero sized arrays as flexible arrays, and a
//! switch without a default as one whose default is `skip`.
use super::super::goto_program;
use super::super::MachineModel;
use super::{Irep, IrepId, ToIrepId};
use crate::{InternedString, IrError, Result};
use goto_program::{
    BinaryOperator, DatatypeComponent, Expr, ExprValue, FunctionContract, Lambda, Location,
    Parameter, SelfOperator, Stmt, StmtBody, SwitchCase, SymbolModes, SymbolValues, Type,
    UnaryOperator,
};
use num::bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use tracing::trace;

pub trait FromIrep: Sized {
    fn from_irep(irep: &Irep, mm: &MachineModel) -> Result<Self>;
}

/// Inverse of `ToIrepId`. Returns `None` for ids that are not operators of this kind.
pub trait FromIrepId: Sized {
    fn from_irep_id(id: &IrepId) -> Option<Self>;
}

impl FromIrepId for BinaryOperator {
    fn from_irep_id(id: &IrepId) -> Option<Self> {
        BinaryOperator::ALL.iter().copied().find(|op| op.to_irep_id() == *id)
    }
}

impl FromIrepId for SelfOperator {
    fn from_irep_id(id: &IrepId) -> Option<Self> {
        SelfOperator::ALL.iter().copied().find(|op| op.to_irep_id() == *id)
    }
}

/// The `allow_zero` flag of the count-zeros operators is not part of the id, it defaults to
/// `false` here and is read from `#bounds_check` when lifting a whole expression.
impl FromIrepId for UnaryOperator {
    fn from_irep_id(id: &IrepId) -> Option<Self> {
        UnaryOperator::ALL.iter().copied().find(|op| op.to_irep_id() == *id)
    }
}

/// A node together with its JSON path, for error messages.
struct Node<'a> {
    irep: &'a Irep,
    path: String,
}

impl<'a> Node<'a> {
    fn root(irep: &'a Irep) -> Self {
        Node { irep, path: "$".to_string() }
    }

    fn err<T: Into<String>>(&self, reason: T) -> IrError {
        IrError::decode(self.path.clone(), reason)
    }

    fn unrecognized(&self) -> IrError {
        self.err(format!("unrecognized id `{}`", self.irep.id))
    }

    fn sub(&self, i: usize) -> Result<Node<'a>> {
        let path = format!("{}.sub[{i}]", self.path);
        match self.irep.sub.get(i) {
            Some(irep) => Ok(Node { irep, path }),
            None => Err(IrError::decode(path, "missing operand")),
        }
    }

    fn subs(&self) -> impl Iterator<Item = Node<'a>> + '_ {
        self.irep
            .sub
            .iter()
            .enumerate()
            .map(|(i, irep)| Node { irep, path: format!("{}.sub[{i}]", self.path) })
    }

    fn named_opt(&self, key: IrepId) -> Option<Node<'a>> {
        self.irep
            .lookup(key)
            .map(|irep| Node { irep, path: format!("{}.named_sub.{key}", self.path) })
    }

    fn named(&self, key: IrepId) -> Result<Node<'a>> {
        self.named_opt(key).ok_or_else(|| self.err(format!("missing field `{key}`")))
    }

    fn string_opt(&self, key: IrepId) -> Option<InternedString> {
        self.irep.lookup(key).map(|irep| irep.id.to_string().into())
    }

    fn string(&self, key: IrepId) -> Result<InternedString> {
        Ok(self.named(key)?.irep.id.to_string().into())
    }

    fn u64_opt(&self, key: IrepId) -> Result<Option<u64>> {
        self.named_opt(key)
            .map(|n| {
                let number = n.irep.id.to_bigint().and_then(|i| i.to_u64());
                number.ok_or_else(|| n.err("expected a number"))
            })
            .transpose()
    }

    fn u64(&self, key: IrepId) -> Result<u64> {
        self.u64_opt(key)?.ok_or_else(|| self.err(format!("missing field `{key}`")))
    }

    fn is_statement(&self, statement: IrepId) -> bool {
        self.irep.id == IrepId::Code
            && self.irep.lookup(IrepId::Statement).is_some_and(|s| s.id == statement)
    }
}

/// Lifting needs the machine model to read back bit-patterns.
struct Lifter<'a> {
    mm: &'a MachineModel,
}

/// Types
impl Lifter<'_> {
    fn typ(&self, n: &Node) -> Result<Type> {
        if let Some(name) = n.string_opt(IrepId::CTypedef) {
            let mut inner = n.irep.clone();
            inner.named_sub.remove(&IrepId::CTypedef);
            let inner = Node { irep: &inner, path: n.path.clone() };
            return Ok(Type::typedef(name, self.typ(&inner)?));
        }
        Ok(match n.irep.id {
            IrepId::Array => {
                let elem = self.typ(&n.sub(0)?)?;
                let size = n.named(IrepId::Size)?;
                if size.irep.id == IrepId::Infinity {
                    elem.infinite_array_of()
                } else {
                    match self.size(&size)? {
                        0 => elem.flexible_array_of(),
                        size => elem.array_of(size),
                    }
                }
            }
            IrepId::Bool => Type::bool(),
            IrepId::CBitField => Type::CBitField {
                typ: Box::new(self.typ(&n.sub(0)?)?),
                width: n.u64(IrepId::Width)?,
            },
            IrepId::CBool => Type::c_bool(),
            IrepId::Code => {
                let parameters = n.named(IrepId::Parameters)?;
                let params =
                    parameters.subs().map(|p| self.parameter(&p)).collect::<Result<Vec<_>>>()?;
                let return_type = self.typ(&n.named(IrepId::ReturnType)?)?;
                if parameters.irep.lookup(IrepId::Ellipsis) == Some(&Irep::one()) {
                    Type::variadic_code(params, return_type)
                } else {
                    Type::code(params, return_type)
                }
            }
            IrepId::Constructor => Type::Constructor,
            IrepId::Empty => Type::empty(),
            IrepId::Floatbv => match (n.u64(IrepId::F)?, n.u64(IrepId::Width)?) {
                (52, 64) => Type::Double,
                (23, 32) => Type::Float,
                (10, 16) => Type::Float16,
                (112, 128) => Type::Float128,
                (f, width) => {
                    return Err(n.err(format!("no float type with f={f} and width={width}")));
                }
            },
            IrepId::Integer => Type::integer(),
            IrepId::Pointer => self.typ(&n.sub(0)?)?.to_pointer(),
            IrepId::Signedbv => Type::signed_int(n.u64(IrepId::Width)?)?,
            IrepId::Struct | IrepId::Union => {
                let tag = n.string(IrepId::Tag)?;
                let is_struct = n.irep.id == IrepId::Struct;
                match (n.irep.lookup(IrepId::Incomplete).is_some(), is_struct) {
                    (true, true) => Type::incomplete_struct(tag),
                    (true, false) => Type::incomplete_union(tag),
                    (false, _) => {
                        let components = n
                            .named(IrepId::Components)?
                            .subs()
                            .map(|c| self.component(&c))
                            .collect::<Result<Vec<_>>>()?;
                        if is_struct {
                            Type::struct_type(tag, components)?
                        } else {
                            Type::union_type(tag, components)?
                        }
                    }
                }
            }
            IrepId::StructTag => Type::struct_tag_raw(n.string(IrepId::Identifier)?),
            IrepId::UnionTag => Type::union_tag_raw(n.string(IrepId::Identifier)?),
            IrepId::Unsignedbv => Type::unsigned_int(n.u64(IrepId::Width)?)?,
            IrepId::Vector => {
                let size = self.size(&n.named(IrepId::Size)?)?;
                Type::vector(self.typ(&n.sub(0)?)?, size)?
            }
            _ => return Err(n.unrecognized()),
        })
    }

    /// Array and vector sizes are integer constants.
    fn size(&self, n: &Node) -> Result<u64> {
        if n.irep.id != IrepId::Constant {
            return Err(n.err("expected a constant size"));
        }
        let typ = self.typ(&n.named(IrepId::Type)?)?;
        self.int_value(n, &typ)?.to_u64().ok_or_else(|| n.err("size out of range"))
    }

    fn component(&self, n: &Node) -> Result<DatatypeComponent> {
        let name = n.string(IrepId::Name)?;
        if n.irep.lookup(IrepId::CIsPadding).is_some() {
            let bits = n.named(IrepId::Type)?.u64(IrepId::Width)?;
            Ok(DatatypeComponent::padding(name, bits))
        } else {
            Ok(DatatypeComponent::field(name, self.typ(&n.named(IrepId::Type)?)?))
        }
    }

    fn parameter(&self, n: &Node) -> Result<Parameter> {
        if n.irep.id != IrepId::Parameter {
            return Err(n.unrecognized());
        }
        let typ = self.typ(&n.named(IrepId::Type)?)?;
        Ok(typ.as_parameter(n.string_opt(IrepId::CIdentifier), n.string_opt(IrepId::CBaseName)))
    }
}

/// Locations
impl Lifter<'_> {
    fn location(&self, n: &Node) -> Result<Location> {
        if n.irep.is_nil() {
            return Ok(Location::None);
        }
        let pragmas: Vec<InternedString> = n
            .irep
            .lookup(IrepId::Pragma)
            .map(|p| p.named_sub.keys().map(|k| k.to_string().into()).collect())
            .unwrap_or_default();
        let function = n.string_opt(IrepId::Function);
        let property =
            n.string_opt(IrepId::PropertyClass).zip(n.string_opt(IrepId::Comment));
        Ok(match (n.string_opt(IrepId::File), property) {
            (Some(file), _) if file.starts_with("<builtin-library-") && file.ends_with(">") => {
                Location::BuiltinFunction {
                    function_name: function
                        .ok_or_else(|| n.err("missing field `function`"))?,
                    line: n.u64_opt(IrepId::Line)?,
                }
            }
            (Some(file), Some((property_class, comment))) => Location::Property {
                file,
                function,
                line: n.u64(IrepId::Line)?,
                col: n.u64_opt(IrepId::Column)?,
                comment,
                property_class,
                pragmas,
            },
            (Some(file), None) => {
                let line = n.u64(IrepId::Line)?;
                Location::Loc {
                    file,
                    function,
                    start_line: line,
                    start_col: n.u64_opt(IrepId::Column)?,
                    end_line: line,
                    end_col: None,
                    pragmas,
                }
            }
            (None, Some((property_class, comment))) => {
                Location::PropertyUnknownLocation { comment, property_class }
            }
            (None, None) => return Err(n.err("a location needs a file or a property class")),
        })
    }

    fn location_of(&self, n: &Node) -> Result<Location> {
        match n.named_opt(IrepId::CSourceLocation) {
            Some(loc) => self.location(&loc),
            None => Ok(Location::None),
        }
    }
}

/// Expressions
impl Lifter<'_> {
    fn expr(&self, n: &Node) -> Result<Expr> {
        let typ = self.typ(&n.named(IrepId::Type)?)?;
        let value = self.expr_value(n, &typ)?;
        let mut e = Expr::from_parts(value, typ).with_location(self.location_of(n)?);
        if let Some(size_of) = n.named_opt(IrepId::CCSizeofType) {
            e = e.with_size_of_annotation(self.typ(&size_of)?);
        }
        Ok(e)
    }

    fn exprs(&self, n: &Node) -> Result<Vec<Expr>> {
        n.subs().map(|e| self.expr(&e)).collect()
    }

    fn operand(&self, n: &Node, i: usize) -> Result<Expr> {
        self.expr(&n.sub(i)?)
    }

    fn int_value(&self, n: &Node, typ: &Type) -> Result<BigInt> {
        let value = n.named(IrepId::Value)?;
        let parsed = match typ.native_width(self.mm) {
            Some(width) => value.irep.id.bitpattern_to_bigint(width, typ.is_signed(self.mm)),
            None => value.irep.id.to_bigint(),
        };
        parsed.ok_or_else(|| value.err("expected an integer"))
    }

    fn bits(&self, n: &Node, width: u64) -> Result<u64> {
        let value = n.named(IrepId::Value)?;
        value
            .irep
            .id
            .bitpattern_to_bigint(width, false)
            .and_then(|i| i.to_u64())
            .ok_or_else(|| value.err(format!("expected a {width}-bit pattern")))
    }

    fn constant(&self, n: &Node, typ: &Type) -> Result<ExprValue> {
        let value = n.named(IrepId::Value)?;
        Ok(match typ {
            Type::Bool => match value.irep.id {
                IrepId::True => ExprValue::BoolConstant(true),
                IrepId::False => ExprValue::BoolConstant(false),
                _ => return Err(value.unrecognized()),
            },
            Type::CInteger(goto_program::CIntType::Bool) => {
                ExprValue::CBoolConstant(!self.int_value(n, typ)?.is_zero())
            }
            Type::Double => ExprValue::DoubleConstant(f64::from_bits(self.bits(n, 64)?)),
            Type::Float => {
                let bits = u32::try_from(self.bits(n, 32)?)
                    .map_err(|_| value.err("expected a 32-bit pattern"))?;
                ExprValue::FloatConstant(f32::from_bits(bits))
            }
            Type::Pointer { .. } if value.irep.id == IrepId::NULL => ExprValue::PointerConstant(0),
            Type::Pointer { .. } => ExprValue::PointerConstant(self.bits(n, self.mm.pointer_width)?),
            _ if typ.is_integer() || typ.native_width(self.mm).is_some() => {
                ExprValue::IntConstant(self.int_value(n, typ)?)
            }
            _ => return Err(n.err(format!("unsupported constant of type {typ:?}"))),
        })
    }

    fn side_effect(&self, n: &Node) -> Result<ExprValue> {
        let statement = n.named(IrepId::Statement)?;
        Ok(match statement.irep.id {
            IrepId::Assign => {
                ExprValue::Assign { left: self.operand(n, 0)?, right: self.operand(n, 1)? }
            }
            IrepId::FunctionCall => ExprValue::FunctionCall {
                function: self.operand(n, 0)?,
                arguments: self.exprs(&n.sub(1)?)?,
            },
            IrepId::Nondet => ExprValue::Nondet,
            id => match SelfOperator::from_irep_id(&id) {
                Some(op) => ExprValue::SelfOp { op, e: self.operand(n, 0)? },
                None => return Err(statement.unrecognized()),
            },
        })
    }

    fn expr_value(&self, n: &Node, typ: &Type) -> Result<ExprValue> {
        Ok(match n.irep.id {
            IrepId::AddressOf => ExprValue::AddressOf(self.operand(n, 0)?),
            IrepId::Array => ExprValue::Array { elems: self.exprs(n)? },
            IrepId::ArrayOf => ExprValue::ArrayOf { elem: self.operand(n, 0)? },
            IrepId::ByteExtractBigEndian | IrepId::ByteExtractLittleEndian => {
                let offset = n.sub(1)?;
                let offset_value = self
                    .expr(&offset)?
                    .int_constant_value()
                    .and_then(|i| i.to_u64())
                    .ok_or_else(|| offset.err("expected a constant offset"))?;
                ExprValue::ByteExtract { e: self.operand(n, 0)?, offset: offset_value }
            }
            IrepId::Constant => self.constant(n, typ)?,
            IrepId::Dereference => ExprValue::Dereference(self.operand(n, 0)?),
            IrepId::If => ExprValue::If {
                c: self.operand(n, 0)?,
                t: self.operand(n, 1)?,
                e: self.operand(n, 2)?,
            },
            IrepId::Index => {
                ExprValue::Index { array: self.operand(n, 0)?, index: self.operand(n, 1)? }
            }
            IrepId::Member => ExprValue::Member {
                lhs: self.operand(n, 0)?,
                field: n.string(IrepId::ComponentName)?,
            },
            IrepId::ROk => ExprValue::ReadOk { ptr: self.operand(n, 0)?, size: self.operand(n, 1)? },
            IrepId::SideEffect => self.side_effect(n)?,
            IrepId::StringConstant => ExprValue::StringConstant { s: n.string(IrepId::Value)? },
            IrepId::Struct => ExprValue::Struct { values: self.exprs(n)? },
            IrepId::Symbol => ExprValue::Symbol { identifier: n.string(IrepId::Identifier)? },
            IrepId::Typecast => ExprValue::Typecast(self.operand(n, 0)?),
            IrepId::Union => ExprValue::Union {
                value: self.operand(n, 0)?,
                field: n.string(IrepId::ComponentName)?,
            },
            IrepId::Vector => ExprValue::Vector { elems: self.exprs(n)? },
            id => {
                if let Some(op) = UnaryOperator::from_irep_id(&id) {
                    let allow_zero = n.irep.lookup(IrepId::CBoundsCheck) == Some(&Irep::zero());
                    let op = match op {
                        UnaryOperator::CountLeadingZeros { .. } => {
                            UnaryOperator::CountLeadingZeros { allow_zero }
                        }
                        UnaryOperator::CountTrailingZeros { .. } => {
                            UnaryOperator::CountTrailingZeros { allow_zero }
                        }
                        op => op,
                    };
                    ExprValue::UnOp { op, e: self.operand(n, 0)? }
                } else if let Some(op) = BinaryOperator::from_irep_id(&id) {
                    ExprValue::BinOp { op, lhs: self.operand(n, 0)?, rhs: self.operand(n, 1)? }
                } else {
                    return Err(n.unrecognized());
                }
            }
        })
    }
}

/// Statements
impl Lifter<'_> {
    fn stmt(&self, n: &Node) -> Result<Stmt> {
        if n.irep.id != IrepId::Code {
            return Err(n.unrecognized());
        }
        let loc = self.location_of(n)?;
        let statement = n.named(IrepId::Statement)?;
        let body = match statement.irep.id {
            IrepId::Assign => {
                if n.irep.lookup_as_string(IrepId::Comment).as_deref() == Some("deinit") {
                    StmtBody::Deinit(self.operand(n, 0)?)
                } else {
                    StmtBody::Assign { lhs: self.operand(n, 0)?, rhs: self.operand(n, 1)? }
                }
            }
            IrepId::Assert => {
                let (property_class, msg) = match &loc {
                    Location::Property { property_class, comment, .. }
                    | Location::PropertyUnknownLocation { property_class, comment } => {
                        (*property_class, *comment)
                    }
                    _ => return Err(n.err("assertion without a property location")),
                };
                StmtBody::Assert { cond: self.operand(n, 0)?, property_class, msg }
            }
            IrepId::Assume => StmtBody::Assume { cond: self.operand(n, 0)? },
            IrepId::Block => {
                let stmts: Vec<Node> = n.subs().collect();
                let atomic = stmts.len() >= 2
                    && stmts[0].is_statement(IrepId::AtomicBegin)
                    && stmts[stmts.len() - 1].is_statement(IrepId::AtomicEnd);
                if atomic {
                    let inner = &stmts[1..stmts.len() - 1];
                    StmtBody::AtomicBlock(
                        inner.iter().map(|s| self.stmt(s)).collect::<Result<_>>()?,
                    )
                } else {
                    StmtBody::Block(stmts.iter().map(|s| self.stmt(s)).collect::<Result<_>>()?)
                }
            }
            IrepId::Break => StmtBody::Break,
            IrepId::Continue => StmtBody::Continue,
            IrepId::Dead => StmtBody::Dead(self.operand(n, 0)?),
            IrepId::Decl => StmtBody::Decl {
                lhs: self.operand(n, 0)?,
                value: if n.irep.sub.len() > 1 { Some(self.operand(n, 1)?) } else { None },
            },
            IrepId::Expression => StmtBody::Expression(self.operand(n, 0)?),
            IrepId::For => StmtBody::For {
                init: self.stmt(&n.sub(0)?)?,
                cond: self.operand(n, 1)?,
                update: self.stmt(&n.sub(2)?)?,
                body: self.stmt(&n.sub(3)?)?,
            },
            IrepId::FunctionCall => {
                let lhs = n.sub(0)?;
                StmtBody::FunctionCall {
                    lhs: if lhs.irep.is_nil() { None } else { Some(self.expr(&lhs)?) },
                    function: self.operand(n, 1)?,
                    arguments: self.exprs(&n.sub(2)?)?,
                }
            }
            IrepId::Goto => StmtBody::Goto {
                dest: n.string(IrepId::Destination)?,
                loop_invariants: n
                    .named_opt(IrepId::CSpecLoopInvariant)
                    .map(|inv| self.operand(&inv, 0))
                    .transpose()?,
            },
            IrepId::Ifthenelse => {
                let e = n.sub(2)?;
                StmtBody::Ifthenelse {
                    i: self.operand(n, 0)?,
                    t: self.stmt(&n.sub(1)?)?,
                    e: if e.irep.is_nil() { None } else { Some(self.stmt(&e)?) },
                }
            }
            IrepId::Label => {
                StmtBody::Label { label: n.string(IrepId::Label)?, body: self.stmt(&n.sub(0)?)? }
            }
            IrepId::Return => match n.irep.sub.first() {
                Some(e) if !e.is_nil() => StmtBody::Return(Some(self.operand(n, 0)?)),
                _ => StmtBody::Return(None),
            },
            IrepId::Skip => StmtBody::Skip,
            IrepId::Switch => {
                let mut cases = vec![];
                let mut default = None;
                for arm in n.sub(1)?.subs() {
                    if !arm.is_statement(IrepId::SwitchCase) {
                        return Err(arm.unrecognized());
                    }
                    if arm.irep.lookup(IrepId::Default) == Some(&Irep::one()) {
                        default = Some(self.stmt(&arm.sub(1)?)?);
                    } else {
                        let case = self.operand(&arm, 0)?;
                        cases.push(SwitchCase::new(case, self.stmt(&arm.sub(1)?)?));
                    }
                }
                StmtBody::Switch { control: self.operand(n, 0)?, cases, default }
            }
            IrepId::While => {
                StmtBody::While { cond: self.operand(n, 0)?, body: self.stmt(&n.sub(1)?)? }
            }
            _ => return Err(statement.unrecognized()),
        };
        Ok(Stmt::from_parts(body, loc))
    }

    fn lambda(&self, n: &Node) -> Result<Lambda> {
        if n.irep.id != IrepId::Lambda {
            return Err(n.unrecognized());
        }
        let arguments = n
            .sub(0)?
            .subs()
            .enumerate()
            .map(|(index, arg)| {
                let identifier = arg.string(IrepId::Identifier)?;
                let typ = self.typ(&arg.named(IrepId::Type)?)?;
                // Unnamed arguments were given a generated name when lowered.
                let identifier =
                    if identifier == format!("_modifies_{index}") { None } else { Some(identifier) };
                Ok(typ.as_parameter(identifier, arg.string_opt(IrepId::CBaseName)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Lambda { arguments, body: self.operand(n, 1)? })
    }
}

macro_rules! from_irep_via {
    ($t:ty, $method:ident) => {
        impl FromIrep for $t {
            fn from_irep(irep: &Irep, mm: &MachineModel) -> Result<Self> {
                Lifter { mm }.$method(&Node::root(irep))
            }
        }
    };
}

from_irep_via!(DatatypeComponent, component);
from_irep_via!(Expr, expr);
from_irep_via!(Lambda, lambda);
from_irep_via!(Location, location);
from_irep_via!(Parameter, parameter);
from_irep_via!(Stmt, stmt);
from_irep_via!(Type, typ);

fn non_empty(s: InternedString) -> Option<InternedString> {
    if s.is_empty() { None } else { Some(s) }
}

impl goto_program::Symbol {
    /// Lift a symbol as CBMC prints it. The contract and the `const` marker that lowering puts
    /// on the type are moved back onto the symbol.
    pub fn from_irep_symbol(symbol: &super::Symbol, mm: &MachineModel) -> Result<Self> {
        trace!(name=%symbol.name, "lifting symbol");
        let lifter = Lifter { mm };
        let mut typ_irep = symbol.typ.clone();
        let assigns = typ_irep.named_sub.remove(&IrepId::CSpecAssigns);
        let is_static_const = typ_irep.named_sub.remove(&IrepId::CConstant).is_some();
        let typ = lifter.typ(&Node { irep: &typ_irep, path: format!("{}.type", symbol.name) })?;
        let contract = match &assigns {
            Some(assigns) => {
                let node = Node {
                    irep: assigns,
                    path: format!("{}.type.named_sub.{}", symbol.name, IrepId::CSpecAssigns),
                };
                let lambdas = node.subs().map(|l| lifter.lambda(&l)).collect::<Result<_>>()?;
                Some(Box::new(FunctionContract::new(lambdas)))
            }
            None => None,
        };
        let value_node = Node { irep: &symbol.value, path: format!("{}.value", symbol.name) };
        let value = if symbol.value.is_nil() {
            SymbolValues::None
        } else if symbol.value.id == IrepId::Code {
            SymbolValues::Stmt(lifter.stmt(&value_node)?)
        } else {
            SymbolValues::Expr(lifter.expr(&value_node)?)
        };
        let location = lifter
            .location(&Node { irep: &symbol.location, path: format!("{}.location", symbol.name) })?;
        let mode = match symbol.mode.to_string().as_str() {
            "C" => SymbolModes::C,
            "Rust" => SymbolModes::Rust,
            other => {
                return Err(IrError::decode(
                    format!("{}.mode", symbol.name),
                    format!("unknown mode `{other}`"),
                ));
            }
        };
        Ok(goto_program::Symbol {
            name: symbol.name,
            location,
            typ,
            value,
            contract,
            base_name: non_empty(symbol.base_name),
            pretty_name: non_empty(symbol.pretty_name),
            pretty_type: non_empty(symbol.pretty_type),
            pretty_value: non_empty(symbol.pretty_value),
            module: non_empty(symbol.module),
            mode,
            is_exported: symbol.is_exported,
            is_input: symbol.is_input,
            is_macro: symbol.is_macro,
            is_output: symbol.is_output,
            is_property: symbol.is_property,
            is_state_var: symbol.is_state_var,
            is_type: symbol.is_type,
            is_auxiliary: symbol.is_auxiliary,
            is_extern: symbol.is_extern,
            is_file_local: symbol.is_file_local,
            is_lvalue: symbol.is_lvalue,
            is_parameter: symbol.is_parameter,
            is_static_lifetime: symbol.is_static_lifetime,
            is_thread_local: symbol.is_thread_local,
            is_volatile: symbol.is_volatile,
            is_weak: symbol.is_weak,
            is_static_const,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::Symbol;
    use crate::irep::ToIrep;
    use crate::machine_model::test_util::machine_model_test_stub;

    fn round_trip<T: ToIrep + FromIrep>(value: &T) -> T {
        let mm = machine_model_test_stub();
        T::from_irep(&value.to_irep(&mm).unwrap(), &mm).unwrap()
    }

    #[test]
    fn test_operator_ids_invert() {
        for op in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_irep_id(&op.to_irep_id()), Some(op));
        }
        for op in UnaryOperator::ALL {
            assert_eq!(UnaryOperator::from_irep_id(&op.to_irep_id()), Some(op));
        }
        for op in SelfOperator::ALL {
            assert_eq!(SelfOperator::from_irep_id(&op.to_irep_id()), Some(op));
        }
        assert_eq!(BinaryOperator::from_irep_id(&IrepId::Not), None);
        assert_eq!(UnaryOperator::from_irep_id(&IrepId::Plus), None);
    }

    #[test]
    fn test_types_round_trip() {
        let point = Type::struct_type("point", vec![
            DatatypeComponent::field("x", Type::signed_int(32).unwrap()),
            DatatypeComponent::padding("pad", 32),
            DatatypeComponent::field("next", Type::struct_tag("point").to_pointer()),
        ])
        .unwrap();
        for typ in [
            point,
            Type::bool(),
            Type::c_bool(),
            Type::double(),
            Type::float16(),
            Type::unsigned_int(8).unwrap().array_of(4),
            Type::unsigned_int(8).unwrap().infinite_array_of(),
            Type::unsigned_int(8).unwrap().flexible_array_of(),
            Type::incomplete_union("u"),
            Type::typedef("word", Type::unsigned_int(16).unwrap()),
            Type::variadic_code(
                vec![Type::bool().as_parameter(Some("f::a".into()), Some("a".into()))],
                Type::empty(),
            ),
        ] {
            assert_eq!(round_trip(&typ), typ);
        }
    }

    #[test]
    fn test_c_integers_lift_as_bitvectors() {
        assert_eq!(round_trip(&Type::c_int()), Type::signed_int(32).unwrap());
        assert_eq!(round_trip(&Type::size_t()), Type::unsigned_int(64).unwrap());
        assert_eq!(
            round_trip(&Type::c_int().array_of(0)),
            Type::signed_int(32).unwrap().flexible_array_of()
        );
    }

    #[test]
    fn test_exprs_round_trip() {
        let i = Type::signed_int(32).unwrap();
        let x = Expr::symbol_expression("main::x", i.clone());
        let p = Expr::symbol_expression("main::p", i.clone().to_pointer());
        for e in [
            Expr::bool_false(),
            Expr::int_constant(-5, i.clone()).unwrap(),
            Expr::double_constant(2.5),
            Expr::float_constant(-0.75),
            i.clone().to_pointer().null().unwrap(),
            x.clone().plus(Expr::int_constant(1, i.clone()).unwrap()).unwrap(),
            x.clone().ctlz(true).unwrap(),
            x.clone().postincr().unwrap(),
            p.clone().dereference().unwrap(),
            x.clone().address_of().unwrap(),
            x.clone().byte_extract(Type::float(), 0),
            Expr::array_expr(i.clone().array_of(2), vec![x.clone(), x.clone()]).unwrap(),
            x.clone().array_constant(3),
            Expr::vector_expr(Type::vector(i.clone(), 2).unwrap(), vec![x.clone(), x.clone()])
                .unwrap(),
            x.clone().assign_expr(Expr::int_constant(2, i.clone()).unwrap()).unwrap(),
        ] {
            assert_eq!(round_trip(&e), e);
        }
    }

    #[test]
    fn test_read_ok_lifts_as_read_ok() {
        let p = Expr::symbol_expression("main::p", Type::void_pointer());
        let e = p.r_ok(Expr::symbol_expression("main::n", Type::size_t())).unwrap();
        let mm = machine_model_test_stub();
        assert_eq!(e.to_irep(&mm).unwrap().id, IrepId::ROk);
        let lifted = round_trip(&e);
        assert!(matches!(lifted.value(), ExprValue::ReadOk { .. }));
        assert_eq!(lifted, e);
    }

    #[test]
    fn test_statements_round_trip() {
        let i = Type::signed_int(32).unwrap();
        let x = Expr::symbol_expression("main::x", i.clone());
        let loc = Location::new("main.c", Some("main"), 7, Some(2), 7, None).unwrap();
        let one = Expr::int_constant(1, i.clone()).unwrap();
        let assign = x.clone().assign(one.clone(), loc.clone()).unwrap();
        let cond = x.clone().eq(one.clone()).unwrap();
        let stmts = vec![
            assign.clone(),
            Stmt::assert(cond.clone(), "assertion", "x is one", loc.clone()).unwrap(),
            Stmt::decl(x.clone(), Some(one.clone()), loc.clone()).unwrap(),
            x.clone().deinit(loc.clone()),
            Stmt::if_then_else(cond.clone(), assign.clone(), None, loc.clone()).unwrap(),
            Stmt::while_loop(cond.clone(), Stmt::break_stmt(loc.clone()), loc.clone()).unwrap(),
            Stmt::atomic_block(vec![assign.clone()], loc.clone()),
            Stmt::goto("head", loc.clone()).unwrap().with_loop_contracts(cond.clone()),
            assign.clone().with_label("head").unwrap(),
            Stmt::ret(None, loc.clone()),
            Stmt::for_loop(
                assign.clone(),
                cond.clone(),
                x.clone().preincr().unwrap().as_stmt(loc.clone()),
                Stmt::continue_stmt(loc.clone()),
                loc.clone(),
            )
            .unwrap(),
            x.clone()
                .switch(
                    vec![one.clone().switch_case(assign.clone())],
                    Some(Stmt::skip(loc.clone())),
                    loc.clone(),
                )
                .unwrap(),
        ];
        for s in stmts {
            assert_eq!(round_trip(&s), s);
        }
    }

    #[test]
    fn test_missing_default_lifts_as_skip() {
        let i = Type::signed_int(32).unwrap();
        let x = Expr::symbol_expression("main::x", i.clone());
        let one = Expr::int_constant(1, i).unwrap();
        let arms = vec![one.switch_case(Stmt::skip(Location::none()))];
        let switch = x.switch(arms, None, Location::none()).unwrap();
        match round_trip(&switch).body() {
            StmtBody::Switch { default, cases, .. } => {
                assert_eq!(cases.len(), 1);
                assert_eq!(default, &Some(Stmt::skip(Location::none())));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_locations_round_trip() {
        let loc = Location::new("a.c", Some("f"), 3, Some(1), 3, None)
            .unwrap()
            .with_pragmas(vec!["disable:bounds-check".into()]);
        assert_eq!(round_trip(&loc), loc);
        let prop = Location::property_location(
            "a.c",
            Some("f"),
            3,
            None,
            "division by zero",
            "division-by-zero",
        )
        .unwrap();
        assert_eq!(round_trip(&prop), prop);
        let builtin = Location::builtin_function("memcpy", Some(4));
        assert_eq!(round_trip(&builtin), builtin);
        assert_eq!(round_trip(&Location::none()), Location::none());
    }

    #[test]
    fn test_unknown_id_names_path() {
        let mm = machine_model_test_stub();
        let mut irep = Expr::bool_true().not().unwrap().to_irep(&mm).unwrap();
        irep.sub[0].id = IrepId::from_string("mystery");
        match Expr::from_irep(&irep, &mm) {
            Err(IrError::Decode { path, reason }) => {
                assert_eq!(path, "$.sub[0]");
                assert!(reason.contains("mystery"), "{reason}");
            }
            other => panic!("expected a decode error, got {other:?}"),
        }
        let no_type = Irep::symbol("x".into());
        assert!(matches!(
            Expr::from_irep(&no_type, &mm),
            Err(IrError::Decode { reason, .. }) if reason.contains("type")
        ));
    }

    #[test]
    fn test_symbol_round_trip() {
        let mm = machine_model_test_stub();
        let fn_ty = Type::code(
            vec![Type::c_int().to_pointer().as_parameter(Some("f::p".into()), Some("p".into()))],
            Type::empty(),
        );
        let body = Stmt::block(vec![Stmt::skip(Location::none())], Location::none());
        let mut f = Symbol::function("f", fn_ty.clone(), Some(body), "f", Location::none());
        let lambda = Lambda::as_contract_for(&fn_ty, None, Expr::bool_true()).unwrap();
        f.attach_contract(FunctionContract::new(vec![lambda])).unwrap();
        let lifted = Symbol::from_irep_symbol(&f.to_irep(&mm).unwrap(), &mm).unwrap();
        assert_eq!(lifted.name, f.name);
        assert_eq!(lifted.contract, f.contract.clone().map(|c| Box::new(lift_contract(*c))));
        assert!(lifted.is_function_definition());
        assert_eq!(lifted.mode, SymbolModes::C);
        assert!(lifted.pretty_type.is_none());

        let c = Symbol::static_variable("c", "c", Type::bool(), Location::none())
            .with_is_static_const(true);
        let lifted = Symbol::from_irep_symbol(&c.to_irep(&mm).unwrap(), &mm).unwrap();
        assert_eq!(lifted, c);
    }

    #[test]
    fn test_contract_lambda_keeps_parameter_names() {
        let mm = machine_model_test_stub();
        let int = Type::signed_int(32).unwrap();
        let fn_ty = Type::code(
            vec![int.clone().as_parameter(Some("f::x".into()), Some("x".into()))],
            int.clone(),
        );
        let lambda = Lambda::as_contract_for(&fn_ty, Some("ret".into()), Expr::bool_true()).unwrap();
        let irep = lambda.to_irep(&mm).unwrap();
        assert_eq!(irep.sub[0].sub[0].lookup_as_string(IrepId::Identifier).unwrap(), "_modifies_0");
        let lifted = round_trip_with(&lambda, &mm);
        assert_eq!(lifted, lambda);
        assert_eq!(lifted.arguments[0].identifier(), None);
        assert_eq!(lifted.arguments[0].base_name(), Some("ret".into()));
        assert_eq!(lifted.arguments[1].identifier(), Some("f::x".into()));
        assert_eq!(lifted.arguments[1].base_name(), Some("x".into()));
    }

    /// The lowered parameter types are C integer types, which come back as bit-vectors.
    fn lift_contract(c: FunctionContract) -> FunctionContract {
        let mm = machine_model_test_stub();
        let assigns = c.assigns().iter().map(|l| round_trip_with(l, &mm)).collect();
        FunctionContract::new(assigns)
    }

    fn round_trip_with(l: &Lambda, mm: &MachineModel) -> Lambda {
        Lambda::from_irep(&l.to_irep(mm).unwrap(), mm).unwrap()
    }
}
