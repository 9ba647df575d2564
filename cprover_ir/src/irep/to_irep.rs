// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Converts a typed goto-program into the `Irep` serilization format of CBMC
use super::super::goto_program;
use super::super::MachineModel;
use super::{Irep, IrepId};
use crate::linear_map;
use crate::{InternedString, Result};
use goto_program::{
    BinaryOperator, CIntType, DatatypeComponent, Expr, ExprValue, Lambda, Location, Parameter,
    SelfOperator, Stmt, StmtBody, SwitchCase, SymbolValues, Type, UnaryOperator,
};
use linear_map::LinearMap;
use tracing::trace;

pub trait ToIrep {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep>;
}

/// Utility functions
fn lower_all<'a, T: ToIrep + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    mm: &MachineModel,
) -> Result<Vec<Irep>> {
    items.into_iter().map(|x| x.to_irep(mm)).collect()
}

fn arguments_irep(arguments: &[Expr], mm: &MachineModel) -> Result<Irep> {
    Ok(Irep { id: IrepId::Arguments, sub: lower_all(arguments, mm)?, named_sub: linear_map![] })
}

fn code_irep(kind: IrepId, ops: Vec<Irep>) -> Irep {
    Irep {
        id: IrepId::Code,
        sub: ops,
        named_sub: linear_map![(IrepId::Statement, Irep::just_id(kind))],
    }
}

fn side_effect_irep(kind: IrepId, ops: Vec<Irep>) -> Irep {
    Irep {
        id: IrepId::SideEffect,
        sub: ops,
        named_sub: linear_map![(IrepId::Statement, Irep::just_id(kind))],
    }
}

fn switch_default_irep(body: &Stmt, mm: &MachineModel) -> Result<Irep> {
    code_irep(IrepId::SwitchCase, vec![Irep::nil(), body.to_irep(mm)?])
        .with_named_sub(IrepId::Default, Irep::one())
        .with_location(body.location(), mm)
}

fn constant_irep(value: Irep) -> Irep {
    Irep { id: IrepId::Constant, sub: vec![], named_sub: linear_map![(IrepId::Value, value)] }
}

fn option_irep<T: ToIrep>(item: Option<&T>, mm: &MachineModel) -> Result<Irep> {
    item.map_or(Ok(Irep::nil()), |x| x.to_irep(mm))
}

fn pragmas_irep(pragmas: &[InternedString]) -> Option<Irep> {
    if pragmas.is_empty() {
        None
    } else {
        let named_sub: LinearMap<IrepId, Irep> = pragmas
            .iter()
            .map(|p| (IrepId::from_string(*p), Irep::just_id(IrepId::EmptyString)))
            .collect();
        Some(Irep::just_named_sub(named_sub))
    }
}

/// ID Converters
pub trait ToIrepId {
    fn to_irep_id(&self) -> IrepId;
}

impl ToIrepId for BinaryOperator {
    fn to_irep_id(&self) -> IrepId {
        match self {
            BinaryOperator::And => IrepId::And,
            BinaryOperator::Ashr => IrepId::Ashr,
            BinaryOperator::Bitand => IrepId::Bitand,
            BinaryOperator::Bitnand => IrepId::Bitnand,
            BinaryOperator::Bitor => IrepId::Bitor,
            BinaryOperator::Bitxor => IrepId::Bitxor,
            BinaryOperator::Div => IrepId::Div,
            BinaryOperator::Equal => IrepId::Equal,
            BinaryOperator::Ge => IrepId::Ge,
            BinaryOperator::Gt => IrepId::Gt,
            BinaryOperator::IeeeFloatEqual => IrepId::IeeeFloatEqual,
            BinaryOperator::IeeeFloatNotequal => IrepId::IeeeFloatNotequal,
            BinaryOperator::Implies => IrepId::Implies,
            BinaryOperator::Le => IrepId::Le,
            BinaryOperator::Lshr => IrepId::Lshr,
            BinaryOperator::Lt => IrepId::Lt,
            BinaryOperator::Minus => IrepId::Minus,
            BinaryOperator::Mod => IrepId::Mod,
            BinaryOperator::Mult => IrepId::Mult,
            BinaryOperator::Notequal => IrepId::Notequal,
            BinaryOperator::Or => IrepId::Or,
            BinaryOperator::OverflowMinus => IrepId::OverflowMinus,
            BinaryOperator::OverflowMult => IrepId::OverflowMult,
            BinaryOperator::OverflowPlus => IrepId::OverflowPlus,
            BinaryOperator::OverflowResultMinus => IrepId::OverflowResultMinus,
            BinaryOperator::OverflowResultMult => IrepId::OverflowResultMult,
            BinaryOperator::OverflowResultPlus => IrepId::OverflowResultPlus,
            BinaryOperator::Plus => IrepId::Plus,
            BinaryOperator::Rol => IrepId::Rol,
            BinaryOperator::Ror => IrepId::Ror,
            BinaryOperator::Shl => IrepId::Shl,
            BinaryOperator::Xor => IrepId::Xor,
            BinaryOperator::VectorEqual => IrepId::VectorEqual,
            BinaryOperator::VectorNotequal => IrepId::VectorNotequal,
            BinaryOperator::VectorGe => IrepId::VectorGe,
            BinaryOperator::VectorLe => IrepId::VectorLe,
            BinaryOperator::VectorGt => IrepId::VectorGt,
            BinaryOperator::VectorLt => IrepId::VectorLt,
        }
    }
}

impl ToIrepId for SelfOperator {
    fn to_irep_id(&self) -> IrepId {
        match self {
            SelfOperator::Postdecrement => IrepId::Postdecrement,
            SelfOperator::Postincrement => IrepId::Postincrement,
            SelfOperator::Predecrement => IrepId::Predecrement,
            SelfOperator::Preincrement => IrepId::Preincrement,
        }
    }
}

impl ToIrepId for UnaryOperator {
    fn to_irep_id(&self) -> IrepId {
        match self {
            UnaryOperator::Bitnot => IrepId::Bitnot,
            UnaryOperator::BitReverse => IrepId::BitReverse,
            UnaryOperator::Bswap => IrepId::Bswap,
            UnaryOperator::CountLeadingZeros { .. } => IrepId::CountLeadingZeros,
            UnaryOperator::CountTrailingZeros { .. } => IrepId::CountTrailingZeros,
            UnaryOperator::IsDynamicObject => IrepId::IsDynamicObject,
            UnaryOperator::IsFinite => IrepId::IsFinite,
            UnaryOperator::Not => IrepId::Not,
            UnaryOperator::ObjectSize => IrepId::ObjectSize,
            UnaryOperator::PointerObject => IrepId::PointerObject,
            UnaryOperator::PointerOffset => IrepId::PointerOffset,
            UnaryOperator::Popcount => IrepId::Popcount,
            UnaryOperator::UnaryMinus => IrepId::UnaryMinus,
        }
    }
}

/// The main converters
impl ToIrep for DatatypeComponent {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        Ok(match self {
            DatatypeComponent::Field { name, typ } => Irep::just_named_sub(linear_map![
                (IrepId::Name, Irep::just_string_id(*name)),
                (IrepId::PrettyName, Irep::just_string_id(*name)),
                (IrepId::Type, typ.to_irep(mm)?),
            ]),
            DatatypeComponent::Padding { name, bits } => Irep::just_named_sub(linear_map![
                (IrepId::CIsPadding, Irep::one()),
                (IrepId::Name, Irep::just_string_id(*name)),
                (IrepId::Type, Type::Unsignedbv { width: *bits }.to_irep(mm)?),
            ]),
        })
    }
}

/// Pointer arithmetic needs the offset in a pointer sized signed integer.
fn pointer_offset_operand(
    op: BinaryOperator,
    lhs: &Expr,
    rhs: &Expr,
    mm: &MachineModel,
) -> Result<Irep> {
    let adjusts_pointer = matches!(
        op,
        BinaryOperator::Plus
            | BinaryOperator::Minus
            | BinaryOperator::OverflowPlus
            | BinaryOperator::OverflowMinus
            | BinaryOperator::OverflowResultPlus
            | BinaryOperator::OverflowResultMinus
    );
    if adjusts_pointer
        && lhs.typ().is_pointer()
        && rhs.typ().is_integer()
        && rhs.typ().native_width(mm) != Some(mm.pointer_width)
    {
        rhs.clone().cast_to(Type::ssize_t())?.to_irep(mm)
    } else {
        rhs.to_irep(mm)
    }
}

impl ToIrep for Expr {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        let irep = match self.value() {
            ExprValue::IntConstant(i) => {
                let irep_value = match self.typ().native_width(mm) {
                    Some(width) => {
                        Irep::just_bitpattern_id(i.clone(), width, self.typ().is_signed(mm))?
                    }
                    None => Irep::just_int_id(i.clone()),
                };
                constant_irep(irep_value)
            }
            value => value.to_irep(mm)?,
        };
        Ok(irep
            .with_location(self.location(), mm)?
            .with_type(self.typ(), mm)?
            .with_named_sub_option(
                IrepId::CCSizeofType,
                self.size_of_annotation().map(|ty| ty.to_irep(mm)).transpose()?,
            ))
    }
}

impl ToIrep for ExprValue {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        Ok(match self {
            ExprValue::AddressOf(e) => {
                Irep { id: IrepId::AddressOf, sub: vec![e.to_irep(mm)?], named_sub: linear_map![] }
            }
            ExprValue::Array { elems } => {
                Irep { id: IrepId::Array, sub: lower_all(elems, mm)?, named_sub: linear_map![] }
            }
            ExprValue::ArrayOf { elem } => {
                Irep { id: IrepId::ArrayOf, sub: vec![elem.to_irep(mm)?], named_sub: linear_map![] }
            }
            ExprValue::Assign { left, right } => {
                side_effect_irep(IrepId::Assign, vec![left.to_irep(mm)?, right.to_irep(mm)?])
            }
            ExprValue::BinOp { op, lhs, rhs } => Irep {
                id: op.to_irep_id(),
                sub: vec![lhs.to_irep(mm)?, pointer_offset_operand(*op, lhs, rhs, mm)?],
                named_sub: linear_map![],
            },
            ExprValue::BoolConstant(c) => constant_irep(if *c {
                Irep::just_id(IrepId::True)
            } else {
                Irep::just_id(IrepId::False)
            }),
            ExprValue::ByteExtract { e, offset } => Irep {
                id: if mm.is_big_endian {
                    IrepId::ByteExtractBigEndian
                } else {
                    IrepId::ByteExtractLittleEndian
                },
                sub: vec![e.to_irep(mm)?, Expr::int_constant(*offset, Type::ssize_t())?.to_irep(mm)?],
                named_sub: linear_map![],
            },
            ExprValue::CBoolConstant(i) => {
                constant_irep(Irep::just_bitpattern_id(u8::from(*i), mm.bool_width, false)?)
            }
            ExprValue::Dereference(e) => {
                Irep { id: IrepId::Dereference, sub: vec![e.to_irep(mm)?], named_sub: linear_map![] }
            }
            ExprValue::DoubleConstant(i) => {
                let c: u64 = i.to_bits();
                constant_irep(Irep::just_bitpattern_id(c, mm.double_width, false)?)
                    .with_named_sub(IrepId::CRoundingMode, Irep::just_int_id(mm.rounding_mode))
            }
            ExprValue::FloatConstant(i) => {
                let c: u32 = i.to_bits();
                constant_irep(Irep::just_bitpattern_id(c, mm.float_width, false)?)
                    .with_named_sub(IrepId::CRoundingMode, Irep::just_int_id(mm.rounding_mode))
            }
            ExprValue::FunctionCall { function, arguments } => side_effect_irep(
                IrepId::FunctionCall,
                vec![function.to_irep(mm)?, arguments_irep(arguments, mm)?],
            ),
            ExprValue::If { c, t, e } => Irep {
                id: IrepId::If,
                sub: vec![c.to_irep(mm)?, t.to_irep(mm)?, e.to_irep(mm)?],
                named_sub: linear_map![],
            },
            ExprValue::Index { array, index } => Irep {
                id: IrepId::Index,
                sub: vec![array.to_irep(mm)?, index.to_irep(mm)?],
                named_sub: linear_map![],
            },
            // Without its type the width is unknown, so the value is written in decimal.
            // `Expr::to_irep` writes the bit-pattern instead.
            ExprValue::IntConstant(i) => constant_irep(Irep::just_int_id(i.clone())),
            ExprValue::Member { lhs, field } => Irep {
                id: IrepId::Member,
                sub: vec![lhs.to_irep(mm)?],
                named_sub: linear_map![
                    (IrepId::CLvalue, Irep::one()),
                    (IrepId::ComponentName, Irep::just_string_id(*field)),
                ],
            },
            ExprValue::Nondet => side_effect_irep(IrepId::Nondet, vec![]),
            ExprValue::PointerConstant(0) => constant_irep(Irep::just_id(IrepId::NULL)),
            ExprValue::PointerConstant(i) => {
                constant_irep(Irep::just_bitpattern_id(*i, mm.pointer_width, false)?)
            }
            ExprValue::ReadOk { ptr, size } => Irep {
                id: IrepId::ROk,
                sub: vec![ptr.to_irep(mm)?, size.to_irep(mm)?],
                named_sub: linear_map![],
            },
            ExprValue::SelfOp { op, e } => side_effect_irep(op.to_irep_id(), vec![e.to_irep(mm)?]),
            ExprValue::StringConstant { s } => Irep {
                id: IrepId::StringConstant,
                sub: vec![],
                named_sub: linear_map![(IrepId::Value, Irep::just_string_id(*s))],
            },
            ExprValue::Struct { values } => {
                Irep { id: IrepId::Struct, sub: lower_all(values, mm)?, named_sub: linear_map![] }
            }
            ExprValue::Symbol { identifier } => Irep::symbol(*identifier),
            ExprValue::Typecast(e) => {
                Irep { id: IrepId::Typecast, sub: vec![e.to_irep(mm)?], named_sub: linear_map![] }
            }
            ExprValue::Union { value, field } => Irep {
                id: IrepId::Union,
                sub: vec![value.to_irep(mm)?],
                named_sub: linear_map![(IrepId::ComponentName, Irep::just_string_id(*field))],
            },
            ExprValue::UnOp { op: UnaryOperator::Bswap, e } => Irep {
                id: IrepId::Bswap,
                sub: vec![e.to_irep(mm)?],
                named_sub: linear_map![(IrepId::BitsPerByte, Irep::just_int_id(8u8))],
            },
            ExprValue::UnOp { op: op @ UnaryOperator::CountLeadingZeros { allow_zero }, e }
            | ExprValue::UnOp { op: op @ UnaryOperator::CountTrailingZeros { allow_zero }, e } => {
                Irep {
                    id: op.to_irep_id(),
                    sub: vec![e.to_irep(mm)?],
                    named_sub: linear_map![(
                        IrepId::CBoundsCheck,
                        if *allow_zero { Irep::zero() } else { Irep::one() }
                    )],
                }
            }
            ExprValue::UnOp { op, e } => {
                Irep { id: op.to_irep_id(), sub: vec![e.to_irep(mm)?], named_sub: linear_map![] }
            }
            ExprValue::Vector { elems } => {
                Irep { id: IrepId::Vector, sub: lower_all(elems, mm)?, named_sub: linear_map![] }
            }
        })
    }
}

impl ToIrep for Location {
    fn to_irep(&self, _mm: &MachineModel) -> Result<Irep> {
        Ok(match self {
            Location::None => Irep::nil(),
            Location::BuiltinFunction { line, function_name } => Irep::just_named_sub(linear_map![
                (IrepId::File, Irep::just_string_id(format!("<builtin-library-{function_name}>"))),
                (IrepId::Function, Irep::just_string_id(*function_name)),
            ])
            .with_named_sub_option(IrepId::Line, line.map(Irep::just_int_id)),
            Location::Loc { file, function, start_line, start_col, pragmas, .. } => {
                Irep::just_named_sub(linear_map![
                    (IrepId::File, Irep::just_string_id(*file)),
                    (IrepId::Line, Irep::just_int_id(*start_line)),
                ])
                .with_named_sub_option(IrepId::Column, start_col.map(Irep::just_int_id))
                .with_named_sub_option(IrepId::Function, function.map(Irep::just_string_id))
                .with_named_sub_option(IrepId::Pragma, pragmas_irep(pragmas))
            }
            Location::Property { file, function, line, col, property_class, comment, pragmas } => {
                Irep::just_named_sub(linear_map![
                    (IrepId::File, Irep::just_string_id(*file)),
                    (IrepId::Line, Irep::just_int_id(*line)),
                ])
                .with_named_sub_option(IrepId::Column, col.map(Irep::just_int_id))
                .with_named_sub_option(IrepId::Function, function.map(Irep::just_string_id))
                .with_named_sub(IrepId::Comment, Irep::just_string_id(*comment))
                .with_named_sub(IrepId::PropertyClass, Irep::just_string_id(*property_class))
                .with_named_sub_option(IrepId::Pragma, pragmas_irep(pragmas))
            }
            Location::PropertyUnknownLocation { property_class, comment } => {
                Irep::just_named_sub(linear_map![
                    (IrepId::Comment, Irep::just_string_id(*comment)),
                    (IrepId::PropertyClass, Irep::just_string_id(*property_class))
                ])
            }
        })
    }
}

impl ToIrep for Parameter {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        Ok(Irep {
            id: IrepId::Parameter,
            sub: vec![],
            named_sub: linear_map![(IrepId::Type, self.typ().to_irep(mm)?)],
        }
        .with_named_sub_option(IrepId::CIdentifier, self.identifier().map(Irep::just_string_id))
        .with_named_sub_option(IrepId::CBaseName, self.base_name().map(Irep::just_string_id)))
    }
}

impl ToIrep for Stmt {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        self.body().to_irep(mm)?.with_location(self.location(), mm)
    }
}

impl ToIrep for StmtBody {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        Ok(match self {
            StmtBody::Assign { lhs, rhs } => {
                code_irep(IrepId::Assign, vec![lhs.to_irep(mm)?, rhs.to_irep(mm)?])
            }
            StmtBody::Assert { cond, .. } => code_irep(IrepId::Assert, vec![cond.to_irep(mm)?]),
            StmtBody::Assume { cond } => code_irep(IrepId::Assume, vec![cond.to_irep(mm)?]),
            StmtBody::AtomicBlock(stmts) => {
                let mut irep_stmts = vec![code_irep(IrepId::AtomicBegin, vec![])];
                irep_stmts.extend(lower_all(stmts, mm)?);
                irep_stmts.push(code_irep(IrepId::AtomicEnd, vec![]));
                code_irep(IrepId::Block, irep_stmts)
            }
            StmtBody::Block(stmts) => code_irep(IrepId::Block, lower_all(stmts, mm)?),
            StmtBody::Break => code_irep(IrepId::Break, vec![]),
            StmtBody::Continue => code_irep(IrepId::Continue, vec![]),
            StmtBody::Dead(symbol) => code_irep(IrepId::Dead, vec![symbol.to_irep(mm)?]),
            StmtBody::Decl { lhs, value: Some(value) } => {
                code_irep(IrepId::Decl, vec![lhs.to_irep(mm)?, value.to_irep(mm)?])
            }
            StmtBody::Decl { lhs, value: None } => code_irep(IrepId::Decl, vec![lhs.to_irep(mm)?]),
            StmtBody::Deinit(place) => {
                // CBMC doesn't yet have a notion of poison (https://github.com/diffblue/cbmc/issues/7014)
                // So we translate identically to `nondet` here, but add a comment noting we wish it were poison
                // potentially for other backends to pick up and treat specially.
                code_irep(IrepId::Assign, vec![
                    place.to_irep(mm)?,
                    place.typ().nondet().to_irep(mm)?,
                ])
                .with_comment("deinit")
            }
            StmtBody::Expression(e) => code_irep(IrepId::Expression, vec![e.to_irep(mm)?]),
            StmtBody::For { init, cond, update, body } => code_irep(IrepId::For, vec![
                init.to_irep(mm)?,
                cond.to_irep(mm)?,
                update.to_irep(mm)?,
                body.to_irep(mm)?,
            ]),
            StmtBody::FunctionCall { lhs, function, arguments } => {
                code_irep(IrepId::FunctionCall, vec![
                    option_irep(lhs.as_ref(), mm)?,
                    function.to_irep(mm)?,
                    arguments_irep(arguments, mm)?,
                ])
            }
            StmtBody::Goto { dest, loop_invariants } => code_irep(IrepId::Goto, vec![])
                .with_named_sub(IrepId::Destination, Irep::just_string_id(*dest))
                .with_named_sub_option(
                    IrepId::CSpecLoopInvariant,
                    loop_invariants
                        .as_ref()
                        .map(|inv| -> Result<Irep> { Ok(Irep::just_sub(vec![inv.to_irep(mm)?])) })
                        .transpose()?,
                ),
            StmtBody::Ifthenelse { i, t, e } => code_irep(IrepId::Ifthenelse, vec![
                i.to_irep(mm)?,
                t.to_irep(mm)?,
                option_irep(e.as_ref(), mm)?,
            ]),
            StmtBody::Label { label, body } => code_irep(IrepId::Label, vec![body.to_irep(mm)?])
                .with_named_sub(IrepId::Label, Irep::just_string_id(*label)),
            StmtBody::Return(e) => code_irep(IrepId::Return, vec![option_irep(e.as_ref(), mm)?]),
            StmtBody::Skip => code_irep(IrepId::Skip, vec![]),
            StmtBody::Switch { control, cases, default } => {
                let mut switch_arms = lower_all(cases, mm)?;
                // CBMC needs every switch to have a default arm.
                let default_arm = match default {
                    Some(default) => switch_default_irep(default, mm)?,
                    None => switch_default_irep(&Stmt::skip(Location::none()), mm)?,
                };
                switch_arms.push(default_arm);
                code_irep(IrepId::Switch, vec![
                    control.to_irep(mm)?,
                    code_irep(IrepId::Block, switch_arms),
                ])
            }
            StmtBody::While { cond, body } => {
                code_irep(IrepId::While, vec![cond.to_irep(mm)?, body.to_irep(mm)?])
            }
        })
    }
}

impl ToIrep for SwitchCase {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        code_irep(IrepId::SwitchCase, vec![self.case().to_irep(mm)?, self.body().to_irep(mm)?])
            .with_location(self.body().location(), mm)
    }
}

impl ToIrep for Lambda {
    /// At the moment this function assumes that this lambda is used for a
    /// `modifies` contract. It should work for any other lambda body, but
    /// the parameter names use "modifies" in their generated names.
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        let mut ops_ireps = Vec::with_capacity(self.arguments.len());
        let mut types = Vec::with_capacity(self.arguments.len());
        for (index, param) in self.arguments.iter().enumerate() {
            let ty_rep = param.typ().to_irep(mm)?;
            let name = param.identifier().unwrap_or_else(|| format!("_modifies_{index}").into());
            ops_ireps.push(
                Irep::symbol(name)
                    .with_named_sub(IrepId::Type, ty_rep.clone())
                    .with_named_sub_option(
                        IrepId::CBaseName,
                        param.base_name().map(Irep::just_string_id),
                    ),
            );
            types.push(ty_rep);
        }
        let typ = Irep {
            id: IrepId::MathematicalFunction,
            sub: vec![Irep::just_sub(types), self.body.typ().to_irep(mm)?],
            named_sub: Default::default(),
        };
        Ok(Irep {
            id: IrepId::Lambda,
            sub: vec![Irep::tuple(ops_ireps), self.body.to_irep(mm)?],
            named_sub: linear_map!((IrepId::Type, typ)),
        })
    }
}

impl goto_program::Symbol {
    pub fn to_irep(&self, mm: &MachineModel) -> Result<super::Symbol> {
        trace!(name=%self.name, "lowering symbol");
        let mut typ = self.typ.to_irep(mm)?;
        if let Some(contract) = &self.contract {
            typ = typ.with_named_sub(
                IrepId::CSpecAssigns,
                Irep::just_sub(lower_all(contract.assigns(), mm)?),
            );
        }
        if self.is_static_const {
            // Add a `const` to the type.
            typ = typ.with_named_sub(IrepId::CConstant, Irep::just_id(IrepId::Id1))
        }
        Ok(super::Symbol {
            typ,
            value: match &self.value {
                SymbolValues::Expr(e) => e.to_irep(mm)?,
                SymbolValues::Stmt(s) => s.to_irep(mm)?,
                SymbolValues::None => Irep::nil(),
            },
            location: self.location.to_irep(mm)?,
            // Unique identifier, same as key in symbol table `foo::x`
            name: self.name,
            // Only used by verilog
            module: self.module.unwrap_or("".into()),
            // Local identifier `x`
            base_name: self.base_name.unwrap_or("".into()),
            // Almost always the same as `base_name`, but with name mangling can be relevant
            pretty_name: self.pretty_name.unwrap_or("".into()),
            pretty_type: self.pretty_type.unwrap_or("".into()),
            pretty_value: self.pretty_value.unwrap_or("".into()),
            mode: self.mode.to_string().into(),

            // global properties
            is_type: self.is_type,
            is_macro: self.is_macro,
            is_exported: self.is_exported,
            is_input: self.is_input,
            is_output: self.is_output,
            is_state_var: self.is_state_var,
            is_property: self.is_property,

            // ansi-C properties
            is_static_lifetime: self.is_static_lifetime,
            is_thread_local: self.is_thread_local,
            is_lvalue: self.is_lvalue,
            is_file_local: self.is_file_local,
            is_extern: self.is_extern,
            is_volatile: self.is_volatile,
            is_parameter: self.is_parameter,
            is_auxiliary: self.is_auxiliary,
            is_weak: self.is_weak,
        })
    }
}

impl goto_program::SymbolTable {
    pub fn to_irep(&self) -> Result<super::SymbolTable> {
        let mm = self.machine_model();
        let mut st = super::SymbolTable::new();
        for (_key, value) in self.iter() {
            st.insert(value.to_irep(mm)?)
        }
        Ok(st)
    }
}

fn bv_irep(id: IrepId, width: u64) -> Irep {
    Irep { id, sub: vec![], named_sub: linear_map![(IrepId::Width, Irep::just_int_id(width))] }
}

fn floatbv_irep(f: u64, width: u64, c_type: IrepId) -> Irep {
    Irep {
        id: IrepId::Floatbv,
        sub: vec![],
        named_sub: linear_map![
            (IrepId::F, Irep::just_int_id(f)),
            (IrepId::Width, Irep::just_int_id(width)),
            (IrepId::CCType, Irep::just_id(c_type)),
        ],
    }
}

fn array_irep(typ: &Type, size: Irep, mm: &MachineModel) -> Result<Irep> {
    Ok(Irep {
        id: IrepId::Array,
        sub: vec![typ.to_irep(mm)?],
        named_sub: linear_map![(IrepId::Size, size)],
    })
}

fn aggregate_irep(id: IrepId, tag: &InternedString, components: Irep) -> Irep {
    Irep {
        id,
        sub: vec![],
        named_sub: linear_map![
            (IrepId::Tag, Irep::just_string_id(*tag)),
            (IrepId::Components, components),
        ],
    }
}

impl ToIrep for Type {
    fn to_irep(&self, mm: &MachineModel) -> Result<Irep> {
        Ok(match self {
            Type::Array { typ, size } => {
                //CBMC expects the size to be a signed int constant.
                let size = Expr::int_constant(*size, Type::ssize_t())?;
                array_irep(typ, size.to_irep(mm)?, mm)?
            }
            Type::CBitField { typ, width } => Irep {
                id: IrepId::CBitField,
                sub: vec![typ.to_irep(mm)?],
                named_sub: linear_map![(IrepId::Width, Irep::just_int_id(*width))],
            },
            Type::Bool => Irep::just_id(IrepId::Bool),
            Type::CInteger(CIntType::Bool) => bv_irep(IrepId::CBool, mm.bool_width),
            Type::CInteger(CIntType::Char) => bv_irep(
                if mm.char_is_unsigned { IrepId::Unsignedbv } else { IrepId::Signedbv },
                mm.char_width,
            ),
            Type::CInteger(CIntType::Int) => bv_irep(IrepId::Signedbv, mm.int_width),
            Type::CInteger(CIntType::LongInt) => bv_irep(IrepId::Signedbv, mm.long_int_width),
            Type::CInteger(CIntType::SizeT) => bv_irep(IrepId::Unsignedbv, mm.pointer_width),
            Type::CInteger(CIntType::SSizeT) => bv_irep(IrepId::Signedbv, mm.pointer_width),
            Type::Code { parameters, return_type } => Irep {
                id: IrepId::Code,
                sub: vec![],
                named_sub: linear_map![
                    (IrepId::Parameters, Irep::just_sub(lower_all(parameters, mm)?)),
                    (IrepId::ReturnType, return_type.to_irep(mm)?),
                ],
            },
            Type::Constructor => Irep::just_id(IrepId::Constructor),
            Type::Double => floatbv_irep(52, 64, IrepId::Double),
            Type::Empty => Irep::just_id(IrepId::Empty),
            // CMBC currently represents these as 0 length arrays.
            Type::FlexibleArray { typ } => {
                //CBMC expects the size to be a signed int constant.
                let size = Type::ssize_t().zero()?;
                array_irep(typ, size.to_irep(mm)?, mm)?
            }
            Type::Float => floatbv_irep(23, 32, IrepId::Float),
            Type::Float16 => floatbv_irep(10, 16, IrepId::Float16),
            Type::Float128 => floatbv_irep(112, 128, IrepId::Float128),
            Type::IncompleteStruct { tag } => Irep {
                id: IrepId::Struct,
                sub: vec![],
                named_sub: linear_map![
                    (IrepId::Tag, Irep::just_string_id(*tag)),
                    (IrepId::Incomplete, Irep::one()),
                ],
            },
            Type::IncompleteUnion { tag } => Irep {
                id: IrepId::Union,
                sub: vec![],
                named_sub: linear_map![
                    (IrepId::Tag, Irep::just_string_id(*tag)),
                    (IrepId::Incomplete, Irep::one()),
                ],
            },
            Type::InfiniteArray { typ } => {
                let infinity = Irep::just_id(IrepId::Infinity).with_type(&Type::ssize_t(), mm)?;
                array_irep(typ, infinity, mm)?
            }
            Type::Integer => Irep::just_id(IrepId::Integer),
            Type::Pointer { typ } => Irep {
                id: IrepId::Pointer,
                sub: vec![typ.to_irep(mm)?],
                named_sub: linear_map![(IrepId::Width, Irep::just_int_id(mm.pointer_width))],
            },
            Type::Signedbv { width } => bv_irep(IrepId::Signedbv, *width),
            Type::Struct { tag, components } => {
                aggregate_irep(IrepId::Struct, tag, Irep::just_sub(lower_all(components, mm)?))
            }
            Type::StructTag(name) => Irep {
                id: IrepId::StructTag,
                sub: vec![],
                named_sub: linear_map![(IrepId::Identifier, Irep::just_string_id(*name))],
            },
            Type::TypeDef { name, typ } => {
                typ.to_irep(mm)?.with_named_sub(IrepId::CTypedef, Irep::just_string_id(*name))
            }
            Type::Union { tag, components } => {
                aggregate_irep(IrepId::Union, tag, Irep::just_sub(lower_all(components, mm)?))
            }
            Type::UnionTag(name) => Irep {
                id: IrepId::UnionTag,
                sub: vec![],
                named_sub: linear_map![(IrepId::Identifier, Irep::just_string_id(*name))],
            },
            Type::Unsignedbv { width } => bv_irep(IrepId::Unsignedbv, *width),
            Type::VariadicCode { parameters, return_type } => Irep {
                id: IrepId::Code,
                sub: vec![],
                named_sub: linear_map![
                    (
                        IrepId::Parameters,
                        Irep::just_sub(lower_all(parameters, mm)?)
                            .with_named_sub(IrepId::Ellipsis, Irep::one()),
                    ),
                    (IrepId::ReturnType, return_type.to_irep(mm)?),
                ],
            },
            Type::Vector { typ, size } => {
                let size = Expr::int_constant(*size, Type::ssize_t())?;
                Irep {
                    id: IrepId::Vector,
                    sub: vec![typ.to_irep(mm)?],
                    named_sub: linear_map![(IrepId::Size, size.to_irep(mm)?)],
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::{FunctionContract, Symbol, SymbolTable};
    use crate::irep::to_json_string;
    use crate::machine_model::test_util::machine_model_test_stub;
    use crate::{IrError, MachineModel};
    use std::collections::HashSet;

    fn value_of(irep: &Irep) -> String {
        irep.lookup_as_string(IrepId::Value).unwrap()
    }

    #[test]
    fn test_bool_constant() {
        let mm = machine_model_test_stub();
        let irep = Expr::bool_true().to_irep(&mm).unwrap();
        assert_eq!(irep.id, IrepId::Constant);
        assert_eq!(irep.lookup(IrepId::Type), Some(&Irep::just_id(IrepId::Bool)));
        assert_eq!(value_of(&irep), "true");
        let irep = Expr::c_true().to_irep(&mm).unwrap();
        assert_eq!(value_of(&irep), "1");
        assert_eq!(irep.lookup(IrepId::Type).unwrap().id, IrepId::CBool);
    }

    #[test]
    fn test_int_constant_bitpattern() {
        let mm = machine_model_test_stub();
        let minus_one = Expr::int_constant(-1, Type::c_int()).unwrap();
        assert_eq!(value_of(&minus_one.to_irep(&mm).unwrap()), "FFFFFFFF");
        let big = Expr::int_constant(300, Type::unsigned_int(8).unwrap()).unwrap();
        assert!(matches!(big.to_irep(&mm), Err(IrError::Validation { .. })));
        let unbounded = Expr::int_constant(300, Type::integer()).unwrap();
        assert_eq!(value_of(&unbounded.to_irep(&mm).unwrap()), "300");
    }

    #[test]
    fn test_float_constants_record_rounding_mode() {
        let mm = machine_model_test_stub();
        let irep = Expr::float_constant(1.0).to_irep(&mm).unwrap();
        assert_eq!(value_of(&irep), "3F800000");
        assert_eq!(irep.lookup_as_int(IrepId::CRoundingMode), Some(0.into()));
    }

    #[test]
    fn test_null_pointer() {
        let mm = machine_model_test_stub();
        let irep = Type::void_pointer().null().unwrap().to_irep(&mm).unwrap();
        assert_eq!(irep.lookup(IrepId::Value), Some(&Irep::just_id(IrepId::NULL)));
    }

    #[test]
    fn test_operator_ids_are_distinct() {
        let bin: HashSet<_> = BinaryOperator::ALL.iter().map(|op| op.to_irep_id()).collect();
        assert_eq!(bin.len(), BinaryOperator::ALL.len());
        let un: HashSet<_> = UnaryOperator::ALL.iter().map(|op| op.to_irep_id()).collect();
        assert_eq!(un.len(), UnaryOperator::ALL.len());
        let selfop: HashSet<_> = SelfOperator::ALL.iter().map(|op| op.to_irep_id()).collect();
        assert_eq!(selfop.len(), SelfOperator::ALL.len());
    }

    #[test]
    fn test_binop_lowering() {
        let mm = machine_model_test_stub();
        let a = Expr::symbol_expression("a", Type::c_int());
        let b = Expr::symbol_expression("b", Type::c_int());
        let irep = a.plus(b).unwrap().to_irep(&mm).unwrap();
        assert_eq!(irep.id, IrepId::Plus);
        assert_eq!(irep.sub.len(), 2);
        assert_eq!(irep.sub[0], Irep::symbol("a".into()).with_type(&Type::c_int(), &mm).unwrap());
    }

    #[test]
    fn test_pointer_offset_is_widened() {
        let mm = machine_model_test_stub();
        let p = Expr::symbol_expression("p", Type::c_int().to_pointer());
        let i = Expr::symbol_expression("i", Type::c_int());
        let sum = p.plus(i).unwrap();
        let irep = sum.to_irep(&mm).unwrap();
        assert_eq!(irep.sub[1].id, IrepId::Typecast);
        assert_eq!(sum.value().to_irep(&mm).unwrap().sub, irep.sub);
        assert_eq!(irep.sub[1].lookup(IrepId::Type), Some(&Type::ssize_t().to_irep(&mm).unwrap()));
        let p = Expr::symbol_expression("p", Type::c_int().to_pointer());
        let n = Expr::symbol_expression("n", Type::size_t());
        assert_eq!(p.plus(n).unwrap().to_irep(&mm).unwrap().sub[1].id, IrepId::Symbol);
    }

    #[test]
    fn test_byte_extract_endianness() {
        let e = Expr::symbol_expression("x", Type::c_int()).byte_extract(Type::float(), 0);
        let little = e.to_irep(&machine_model_test_stub()).unwrap();
        assert_eq!(little.id, IrepId::ByteExtractLittleEndian);
        let big_mm = MachineModel { is_big_endian: true, ..machine_model_test_stub() };
        assert_eq!(e.to_irep(&big_mm).unwrap().id, IrepId::ByteExtractBigEndian);
    }

    #[test]
    fn test_count_zeros_bounds_check() {
        let mm = machine_model_test_stub();
        let x = Expr::symbol_expression("x", Type::c_int());
        let irep = x.clone().ctlz(true).unwrap().to_irep(&mm).unwrap();
        assert_eq!(irep.lookup(IrepId::CBoundsCheck), Some(&Irep::zero()));
        let irep = x.cttz(false).unwrap().to_irep(&mm).unwrap();
        assert_eq!(irep.id, IrepId::CountTrailingZeros);
        assert_eq!(irep.lookup(IrepId::CBoundsCheck), Some(&Irep::one()));
    }

    #[test]
    fn test_statement_lowering() {
        let mm = machine_model_test_stub();
        let x = Expr::symbol_expression("main::x", Type::c_int());
        let deinit = x.clone().deinit(Location::none()).to_irep(&mm).unwrap();
        assert_eq!(deinit.lookup(IrepId::Statement), Some(&Irep::just_id(IrepId::Assign)));
        assert_eq!(deinit.lookup_as_string(IrepId::Comment).as_deref(), Some("deinit"));
        assert_eq!(deinit.sub[1].id, IrepId::SideEffect);

        let switch = x
            .clone()
            .switch(
                vec![Expr::int_constant(1, Type::c_int()).unwrap().switch_case(Stmt::skip(Location::none()))],
                None,
                Location::none(),
            )
            .unwrap()
            .to_irep(&mm)
            .unwrap();
        let arms = &switch.sub[1].sub;
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[1].lookup(IrepId::Default), Some(&Irep::one()));
        assert!(arms[1].sub[0].is_nil());

        let inv = x.clone().eq(Expr::int_constant(0, Type::c_int()).unwrap()).unwrap();
        let goto = Stmt::goto("loop", Location::none()).unwrap().with_loop_contracts(inv);
        let irep = goto.to_irep(&mm).unwrap();
        assert_eq!(irep.lookup_as_string(IrepId::Destination).as_deref(), Some("loop"));
        assert_eq!(irep.lookup(IrepId::CSpecLoopInvariant).unwrap().sub.len(), 1);

        let atomic = Stmt::atomic_block(vec![Stmt::skip(Location::none())], Location::none());
        let irep = atomic.to_irep(&mm).unwrap();
        assert_eq!(irep.sub.len(), 3);
        assert_eq!(irep.sub[0].lookup(IrepId::Statement), Some(&Irep::just_id(IrepId::AtomicBegin)));
    }

    #[test]
    fn test_location_lowering() {
        let mm = machine_model_test_stub();
        let loc = Location::new("main.c", Some("main"), 3, Some(4), 3, None)
            .unwrap()
            .with_pragmas(vec!["disable:pointer-check".into()]);
        let irep = loc.to_irep(&mm).unwrap();
        assert_eq!(irep.lookup_as_string(IrepId::File).as_deref(), Some("main.c"));
        assert_eq!(irep.lookup_as_int(IrepId::Line), Some(3.into()));
        let pragma = irep.lookup(IrepId::Pragma).unwrap();
        assert!(pragma.lookup(IrepId::from_string("disable:pointer-check")).is_some());
        let builtin = Location::builtin_function("memcpy", None).to_irep(&mm).unwrap();
        assert_eq!(
            builtin.lookup_as_string(IrepId::File).as_deref(),
            Some("<builtin-library-memcpy>")
        );
        assert!(Location::none().to_irep(&mm).unwrap().is_nil());
    }

    #[test]
    fn test_type_lowering() {
        let mm = MachineModel::i386();
        let long = Type::c_long_int().to_irep(&mm).unwrap();
        assert_eq!(long.lookup_as_int(IrepId::Width), Some(32.into()));
        let flex = Type::c_int().flexible_array_of().to_irep(&mm).unwrap();
        assert_eq!(flex.lookup(IrepId::Size).unwrap().lookup_as_string(IrepId::Value).as_deref(), Some("0"));
        let inf = Type::c_int().infinite_array_of().to_irep(&mm).unwrap();
        assert_eq!(inf.lookup(IrepId::Size).unwrap().id, IrepId::Infinity);
        let variadic = Type::variadic_code(vec![], Type::empty()).to_irep(&mm).unwrap();
        assert_eq!(
            variadic.lookup(IrepId::Parameters).unwrap().lookup(IrepId::Ellipsis),
            Some(&Irep::one())
        );
        let half = Type::float16().to_irep(&mm).unwrap();
        assert_eq!(half.lookup_as_int(IrepId::F), Some(10.into()));
        let td = Type::typedef("myint", Type::c_int()).to_irep(&mm).unwrap();
        assert_eq!(td.lookup_as_string(IrepId::CTypedef).as_deref(), Some("myint"));
    }

    #[test]
    fn test_symbol_lowering() {
        let mm = machine_model_test_stub();
        let fn_ty = Type::code(vec![Type::c_int().as_parameter(None, Some("a".into()))], Type::c_int());
        let mut f = Symbol::function("f", fn_ty.clone(), None, "f", Location::none());
        let lambda = Lambda::as_contract_for(&fn_ty, None, Expr::bool_true()).unwrap();
        f.attach_contract(FunctionContract::new(vec![lambda])).unwrap();
        let irep = f.to_irep(&mm).unwrap();
        let assigns = irep.typ.lookup(IrepId::CSpecAssigns).unwrap();
        assert_eq!(assigns.sub.len(), 1);
        let lambda_irep = &assigns.sub[0];
        assert_eq!(lambda_irep.id, IrepId::Lambda);
        let args = &lambda_irep.sub[0].sub;
        assert_eq!(
            args[0].lookup(IrepId::Identifier),
            Some(&Irep::just_string_id("_modifies_0"))
        );
        assert_eq!(irep.mode, "C");
        assert!(irep.value.is_nil());

        let c = Symbol::static_variable("c", "c", Type::c_int(), Location::none())
            .with_is_static_const(true);
        assert_eq!(c.to_irep(&mm).unwrap().typ.lookup(IrepId::CConstant), Some(&Irep::one()));
    }

    #[test]
    fn test_lowering_is_deterministic() {
        let mm = machine_model_test_stub();
        let build = || {
            let x = Expr::symbol_expression("main::x", Type::c_int());
            let cond = x.clone().lt(Expr::int_constant(10, Type::c_int()).unwrap()).unwrap();
            let body = x.clone().assign(x.postincr().unwrap(), Location::none()).unwrap();
            Stmt::while_loop(cond, body, Location::new("a.c", Some("main"), 1, None, 2, None).unwrap())
                .unwrap()
        };
        let a = build().to_irep(&mm).unwrap();
        let b = build().to_irep(&mm).unwrap();
        assert_eq!(a, b);
        assert_eq!(to_json_string(&a).unwrap(), to_json_string(&b).unwrap());
    }

    #[test]
    fn test_symbol_table_lowering() {
        let st = SymbolTable::new(machine_model_test_stub()).unwrap();
        let lowered = st.to_irep().unwrap();
        assert_eq!(lowered.len(), st.len());
        assert!(lowered.lookup("__CPROVER_rounding_mode").is_some());
    }
}
