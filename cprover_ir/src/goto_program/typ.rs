// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use self::DatatypeComponent::*;
use self::Type::*;
use super::super::MachineModel;
use super::super::utils::aggr_tag;
use super::{Expr, SymbolTable};
use crate::cbmc_string::InternedString;
use crate::{IrError, Result};
use std::collections::BTreeMap;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// Represents the different types that can be used in a goto-program.
/// The names are directly taken from the CBMC IrepIds.
/// In the examples below, `x` is used as a placeholder showing how the a variable of that
/// type would be declared. In general, these types map directly to C types; when they do not,
/// the comment notes this.
#[derive(PartialEq, Debug, Clone)]
pub enum Type {
    /// `typ x[size]`. E.g. `unsigned int x[3]`
    Array { typ: Box<Type>, size: u64 },
    /// CBMC specific. `__CPROVER_bool x`. A single bit boolean
    Bool,
    /// `typ x : width`. e.g. `unsigned int x: 3`.
    CBitField { typ: Box<Type>, width: u64 },
    /// Machine dependent integers: `bool`, `char`, `int`, `long int`, `size_t`, etc.
    CInteger(CIntType),
    /// `return_type x(parameters)`
    Code { parameters: Vec<Parameter>, return_type: Box<Type> },
    /// `__attribute__(constructor)`. Only valid as a function return type.
    /// <https://gcc.gnu.org/onlinedocs/gcc-4.7.0/gcc/Function-Attributes.html>
    Constructor,
    /// `double`
    Double,
    /// `void`
    Empty,
    /// `typ x[]`. Has a type, but no size. Only valid as the last element of a struct.
    FlexibleArray { typ: Box<Type> },
    /// `float`
    Float,
    /// `_Float16`
    Float16,
    /// `_Float128`
    Float128,
    /// `struct x {}`
    IncompleteStruct { tag: InternedString },
    /// `union x {}`
    IncompleteUnion { tag: InternedString },
    /// CBMC specific. Unbounded mathematical integers, only meaningful inside specifications.
    Integer,
    /// CBMC specific. `typ x[__CPROVER_infinity()]`
    InfiniteArray { typ: Box<Type> },
    /// `typ*`
    Pointer { typ: Box<Type> },
    /// `int<width>_t`. e.g. `int32_t`
    Signedbv { width: u64 },
    /// `struct tag {component1.typ component1.name; component2.typ component2.name ... }`
    Struct { tag: InternedString, components: Vec<DatatypeComponent> },
    /// CBMC specific. A reference into the symbol table, where the tag is the name of the symbol.
    StructTag(InternedString),
    /// `typedef typ name`
    TypeDef { name: InternedString, typ: Box<Type> },
    /// `union tag {component1.typ component1.name; component2.typ component2.name ... }`
    Union { tag: InternedString, components: Vec<DatatypeComponent> },
    /// CBMC specific. A reference into the symbol table, where the tag is the name of the symbol.
    UnionTag(InternedString),
    /// `uint<width>_t`. e.g. `uint32_t`
    Unsignedbv { width: u64 },
    /// `return_type x(parameters, ...)`
    VariadicCode { parameters: Vec<Parameter>, return_type: Box<Type> },
    /// Packed SIMD vectors
    /// In CBMC/gcc, variables of this type are declared as:
    /// `typ __attribute__((vector_size (size * sizeof(typ)))) var;`
    Vector { typ: Box<Type>, size: u64 },
}

/// The kind of a `Type`, without its companion fields.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum TypeKind {
    Array,
    Bool,
    CBitField,
    CInteger,
    Code,
    Constructor,
    Double,
    Empty,
    FlexibleArray,
    Float,
    Float16,
    Float128,
    IncompleteStruct,
    IncompleteUnion,
    Integer,
    InfiniteArray,
    Pointer,
    Signedbv,
    Struct,
    StructTag,
    TypeDef,
    Union,
    UnionTag,
    Unsignedbv,
    VariadicCode,
    Vector,
}

/// The companion fields handed to [Type::construct]. Each kind requires a fixed subset of them
/// and rejects the rest.
#[derive(Debug, Clone, Default)]
pub struct TypeFields {
    pub typ: Option<Type>,
    pub size: Option<u64>,
    pub width: Option<u64>,
    pub tag: Option<InternedString>,
    pub name: Option<InternedString>,
    pub components: Option<Vec<DatatypeComponent>>,
    pub parameters: Option<Vec<Parameter>>,
    pub return_type: Option<Type>,
    pub int_kind: Option<CIntType>,
}

/// Machine dependent integers: `bool`, `char`, `int`, `size_t`, etc.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CIntType {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long int`
    LongInt,
    /// `size_t`
    SizeT,
    /// `ssize_t`
    SSizeT,
}

/// The fields types of a struct or union
#[derive(PartialEq, Debug, Clone)]
pub enum DatatypeComponent {
    Field { name: InternedString, typ: Type },
    Padding { name: InternedString, bits: u64 },
}

/// The formal parameters of a function.
#[derive(Debug, Clone)]
pub struct Parameter {
    typ: Type,
    /// The unique identifier that refers to this symbol (qualified by function name, module, etc)
    identifier: Option<InternedString>,
    /// The local name the symbol has within the function
    base_name: Option<InternedString>,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

/// Getters
impl DatatypeComponent {
    pub fn field_typ(&self) -> Option<&Type> {
        match self {
            Field { typ, .. } => Some(typ),
            Padding { .. } => None,
        }
    }

    pub fn is_padding(&self) -> bool {
        match self {
            Field { .. } => false,
            Padding { .. } => true,
        }
    }

    pub fn name(&self) -> InternedString {
        match self {
            Field { name, .. } | Padding { name, .. } => *name,
        }
    }

    pub fn typ(&self) -> Type {
        match self {
            Field { typ, .. } => typ.clone(),
            Padding { bits, .. } => Unsignedbv { width: *bits },
        }
    }
}

//Constructors
impl DatatypeComponent {
    pub fn field<T: Into<InternedString>>(name: T, typ: Type) -> Self {
        let name = name.into();
        Field { name, typ }
    }

    pub fn padding<T: Into<InternedString>>(name: T, bits: u64) -> Self {
        let name = name.into();
        Padding { name, bits }
    }
}

/// Parameters are equal regardless of the names given to them.
impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.typ == other.typ
    }
}

/// Getters
impl Parameter {
    pub fn base_name(&self) -> Option<InternedString> {
        self.base_name
    }

    pub fn identifier(&self) -> Option<InternedString> {
        self.identifier
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }
}

/// Constructor
impl Parameter {
    pub fn new(
        identifier: Option<InternedString>,
        base_name: Option<InternedString>,
        typ: Type,
    ) -> Self {
        Parameter { typ, identifier, base_name }
    }
}

impl CIntType {
    pub fn sizeof_in_bits(&self, mm: &MachineModel) -> u64 {
        match self {
            CIntType::Bool => mm.bool_width,
            CIntType::Char => mm.char_width,
            CIntType::Int => mm.int_width,
            CIntType::LongInt => mm.long_int_width,
            CIntType::SizeT | CIntType::SSizeT => mm.pointer_width,
        }
    }
}

impl TypeKind {
    /// The companion fields a type of this kind must carry, in reporting order.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            TypeKind::Array | TypeKind::Vector => &["typ", "size"],
            TypeKind::CBitField => &["typ", "width"],
            TypeKind::CInteger => &["int_kind"],
            TypeKind::Code | TypeKind::VariadicCode => &["parameters", "return_type"],
            TypeKind::FlexibleArray | TypeKind::InfiniteArray | TypeKind::Pointer => &["typ"],
            TypeKind::IncompleteStruct
            | TypeKind::IncompleteUnion
            | TypeKind::StructTag
            | TypeKind::UnionTag => &["tag"],
            TypeKind::Signedbv | TypeKind::Unsignedbv => &["width"],
            TypeKind::Struct | TypeKind::Union => &["tag", "components"],
            TypeKind::TypeDef => &["name", "typ"],
            TypeKind::Bool
            | TypeKind::Constructor
            | TypeKind::Double
            | TypeKind::Empty
            | TypeKind::Float
            | TypeKind::Float16
            | TypeKind::Float128
            | TypeKind::Integer => &[],
        }
    }
}

/// Builders
impl TypeFields {
    pub fn with_typ(mut self, typ: Type) -> Self {
        self.typ = Some(typ);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_width(mut self, width: u64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_tag<T: Into<InternedString>>(mut self, tag: T) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_name<T: Into<InternedString>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_components(mut self, components: Vec<DatatypeComponent>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_return_type(mut self, return_type: Type) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_int_kind(mut self, int_kind: CIntType) -> Self {
        self.int_kind = Some(int_kind);
        self
    }

    /// The names of the fields that are set.
    fn present(&self) -> Vec<&'static str> {
        [
            ("typ", self.typ.is_some()),
            ("size", self.size.is_some()),
            ("width", self.width.is_some()),
            ("tag", self.tag.is_some()),
            ("name", self.name.is_some()),
            ("components", self.components.is_some()),
            ("parameters", self.parameters.is_some()),
            ("return_type", self.return_type.is_some()),
            ("int_kind", self.int_kind.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Check the set fields are exactly the ones `kind` requires.
    fn check(&self, kind: TypeKind) -> Result<()> {
        let required = kind.required_fields();
        let present = self.present();
        let missing: Vec<String> =
            required.iter().filter(|f| !present.contains(*f)).map(|f| f.to_string()).collect();
        let extraneous: Vec<String> =
            present.iter().filter(|f| !required.contains(*f)).map(|f| f.to_string()).collect();
        if missing.is_empty() && extraneous.is_empty() {
            Ok(())
        } else {
            Err(IrError::fields(format!("{kind:?} type"), missing, extraneous))
        }
    }
}

/// Getters
impl Type {
    /// Return the StructTag or UnionTag naming the struct or union type.
    pub fn aggr_tag(&self) -> Option<Type> {
        match self {
            IncompleteStruct { tag } | Struct { tag, .. } => Some(Type::struct_tag(*tag)),
            IncompleteUnion { tag } | Union { tag, .. } => Some(Type::union_tag(*tag)),
            StructTag(_) | UnionTag(_) => Some(self.clone()),
            TypeDef { typ, .. } => typ.aggr_tag(),
            _ => None,
        }
    }

    /// The base type of this type, if one exists.
    /// `typ*` | `typ x[width]` | `typ x : width`  -> `typ`,
    pub fn base_type(&self) -> Option<&Type> {
        match self {
            Array { typ, .. }
            | CBitField { typ, .. }
            | FlexibleArray { typ }
            | InfiniteArray { typ }
            | Pointer { typ }
            | Vector { typ, .. } => Some(typ),
            TypeDef { typ, .. } => typ.base_type(),
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&Vec<DatatypeComponent>> {
        match self {
            Struct { components, .. } | Union { components, .. } => Some(components),
            TypeDef { typ, .. } => typ.components(),
            _ => None,
        }
    }

    /// The kind of this type.
    pub fn kind(&self) -> TypeKind {
        match self {
            Array { .. } => TypeKind::Array,
            Bool => TypeKind::Bool,
            CBitField { .. } => TypeKind::CBitField,
            CInteger(_) => TypeKind::CInteger,
            Code { .. } => TypeKind::Code,
            Constructor => TypeKind::Constructor,
            Double => TypeKind::Double,
            Empty => TypeKind::Empty,
            FlexibleArray { .. } => TypeKind::FlexibleArray,
            Float => TypeKind::Float,
            Float16 => TypeKind::Float16,
            Float128 => TypeKind::Float128,
            IncompleteStruct { .. } => TypeKind::IncompleteStruct,
            IncompleteUnion { .. } => TypeKind::IncompleteUnion,
            Integer => TypeKind::Integer,
            InfiniteArray { .. } => TypeKind::InfiniteArray,
            Pointer { .. } => TypeKind::Pointer,
            Signedbv { .. } => TypeKind::Signedbv,
            Struct { .. } => TypeKind::Struct,
            StructTag(_) => TypeKind::StructTag,
            TypeDef { .. } => TypeKind::TypeDef,
            Union { .. } => TypeKind::Union,
            UnionTag(_) => TypeKind::UnionTag,
            Unsignedbv { .. } => TypeKind::Unsignedbv,
            VariadicCode { .. } => TypeKind::VariadicCode,
            Vector { .. } => TypeKind::Vector,
        }
    }

    /// The number of elements of an array or vector.
    pub fn len(&self) -> Option<u64> {
        match self {
            Array { size, .. } | Vector { size, .. } => Some(*size),
            TypeDef { typ, .. } => typ.len(),
            _ => None,
        }
    }

    /// The bitwidth of the integer type or pointer on the machine m.
    /// If the type doesn't have a width, return None.
    pub fn native_width(&self, mm: &MachineModel) -> Option<u64> {
        match self {
            CInteger(int_kind) => Some(int_kind.sizeof_in_bits(mm)),
            Pointer { .. } => Some(mm.pointer_width),
            CBitField { width, .. } | Signedbv { width } | Unsignedbv { width } => Some(*width),
            TypeDef { typ, .. } => typ.native_width(mm),
            _ => None,
        }
    }

    pub fn parameters(&self) -> Option<&Vec<Parameter>> {
        match self {
            Code { parameters, .. } | VariadicCode { parameters, .. } => Some(parameters),
            TypeDef { typ, .. } => typ.parameters(),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Code { return_type, .. } | VariadicCode { return_type, .. } => Some(return_type),
            TypeDef { typ, .. } => typ.return_type(),
            _ => None,
        }
    }

    pub fn sizeof(&self, st: &SymbolTable) -> Result<u64> {
        let bits = self.sizeof_in_bits(st)?;
        let char_width = st.machine_model().char_width;
        if bits % char_width != 0 {
            return Err(IrError::validation(format!(
                "{bits} bits of {self:?} is not a whole number of bytes"
            )));
        }
        Ok(bits / char_width)
    }

    pub fn sizeof_in_bits(&self, st: &SymbolTable) -> Result<u64> {
        let mm = st.machine_model();
        let unsized_err = || IrError::validation(format!("{self:?} doesn't have a sizeof"));
        match self {
            Array { typ, size } | Vector { typ, size } => Ok(typ.sizeof_in_bits(st)? * size),
            CBitField { width, .. } => Ok(*width),
            CInteger(t) => Ok(t.sizeof_in_bits(mm)),
            // A function definition has no data of its own.
            Code { .. } => Ok(0),
            Double => Ok(mm.double_width),
            Empty => Ok(0),
            FlexibleArray { .. } => Ok(0),
            Float => Ok(mm.float_width),
            Float16 => Ok(16),
            Float128 => Ok(128),
            Pointer { .. } => Ok(mm.pointer_width),
            Signedbv { width } | Unsignedbv { width } => Ok(*width),
            Struct { components, .. } => components
                .iter()
                .map(|x| x.typ().sizeof_in_bits(st))
                .sum::<Result<u64>>(),
            Union { components, .. } => components
                .iter()
                .map(|x| x.typ().sizeof_in_bits(st))
                .collect::<Result<Vec<_>>>()
                .map(|sizes| sizes.into_iter().max().unwrap_or(0)),
            StructTag(tag) | UnionTag(tag) => match st.lookup(*tag) {
                Some(symbol) => symbol.typ.sizeof_in_bits(st),
                None => Err(IrError::validation(format!("no symbol for type tag {tag}"))),
            },
            TypeDef { typ, .. } => typ.sizeof_in_bits(st),
            Bool
            | Constructor
            | IncompleteStruct { .. }
            | IncompleteUnion { .. }
            | Integer
            | InfiniteArray { .. }
            | VariadicCode { .. } => Err(unsized_err()),
        }
    }

    /// Get the tag of a struct or union.
    pub fn tag(&self) -> Option<InternedString> {
        match self {
            IncompleteStruct { tag }
            | IncompleteUnion { tag }
            | Struct { tag, .. }
            | StructTag(tag)
            | Union { tag, .. }
            | UnionTag(tag) => Some(*tag),
            TypeDef { typ, .. } => typ.tag(),
            _ => None,
        }
    }

    /// Given a `struct foo` or `union foo`, returns `Some("tag-foo")`.
    /// Otherwise, returns `None`.
    pub fn type_name(&self) -> Option<InternedString> {
        match self {
            IncompleteStruct { tag }
            | Struct { tag, .. }
            | IncompleteUnion { tag }
            | Union { tag, .. } => Some(aggr_tag(*tag)),
            StructTag(tag) | UnionTag(tag) => Some(*tag),
            TypeDef { typ, .. } => typ.type_name(),
            _ => None,
        }
    }

    /// The type a typedef stands for, looking through nested typedefs.
    pub fn unwrap_typedef(&self) -> &Type {
        match self {
            TypeDef { typ, .. } => typ.unwrap_typedef(),
            _ => self,
        }
    }

    /// the width of an integer type
    pub fn width(&self) -> Option<u64> {
        match self {
            CBitField { width, .. } | Signedbv { width } | Unsignedbv { width } => Some(*width),
            TypeDef { typ, .. } => typ.width(),
            _ => None,
        }
    }
}

/// Predicates
impl Type {
    pub fn is_array_like(&self) -> bool {
        matches!(
            self.unwrap_typedef(),
            Array { .. } | FlexibleArray { .. } | InfiniteArray { .. } | Vector { .. }
        )
    }

    pub fn is_bitfield(&self) -> bool {
        matches!(self.unwrap_typedef(), CBitField { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.unwrap_typedef(), Bool)
    }

    pub fn is_c_bool(&self) -> bool {
        matches!(self.unwrap_typedef(), CInteger(CIntType::Bool))
    }

    pub fn is_c_size_t(&self) -> bool {
        matches!(self.unwrap_typedef(), CInteger(CIntType::SizeT))
    }

    pub fn is_code(&self) -> bool {
        matches!(self.unwrap_typedef(), Code { .. })
    }

    pub fn is_double(&self) -> bool {
        matches!(self.unwrap_typedef(), Double)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.unwrap_typedef(), Empty)
    }

    pub fn is_float(&self) -> bool {
        matches!(self.unwrap_typedef(), Float)
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self.unwrap_typedef(), Double | Float | Float16 | Float128)
    }

    /// Whether the current type is an integer: a finite width one, or a mathematical integer.
    pub fn is_integer(&self) -> bool {
        matches!(self.unwrap_typedef(), CInteger(_) | Signedbv { .. } | Unsignedbv { .. } | Integer)
    }

    pub fn is_lvalue(&self) -> bool {
        match self {
            Bool
            | CBitField { .. }
            | CInteger(_)
            | Double
            | Float
            | Float16
            | Float128
            | Integer
            | Pointer { .. }
            | Signedbv { .. }
            | Struct { .. }
            | StructTag(_)
            | Union { .. }
            | UnionTag(_)
            | Unsignedbv { .. }
            | Vector { .. } => true,

            TypeDef { typ, .. } => typ.is_lvalue(),

            Array { .. }
            | Code { .. }
            | Constructor
            | Empty
            | FlexibleArray { .. }
            | IncompleteStruct { .. }
            | IncompleteUnion { .. }
            | InfiniteArray { .. }
            | VariadicCode { .. } => false,
        }
    }

    /// Is the current type either an integer or a floating point?
    pub fn is_numeric(&self) -> bool {
        self.is_floating_point() || self.is_integer()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.unwrap_typedef(), Pointer { .. })
    }

    /// Is this a signed integer
    pub fn is_signed(&self, mm: &MachineModel) -> bool {
        match self {
            CInteger(CIntType::Int)
            | CInteger(CIntType::LongInt)
            | CInteger(CIntType::SSizeT)
            | Signedbv { .. }
            | Integer => true,
            CInteger(CIntType::Char) => !mm.char_is_unsigned,
            CBitField { typ, .. } | TypeDef { typ, .. } => typ.is_signed(mm),
            _ => false,
        }
    }

    pub fn is_struct_like(&self) -> bool {
        matches!(self.unwrap_typedef(), IncompleteStruct { .. } | Struct { .. } | StructTag(_))
    }

    /// This is a struct tag
    pub fn is_struct_tag(&self) -> bool {
        matches!(self.unwrap_typedef(), StructTag(_))
    }

    pub fn is_typedef(&self) -> bool {
        matches!(self, TypeDef { .. })
    }

    /// This is a union (and not an incomplete union or union tag)
    pub fn is_union(&self) -> bool {
        matches!(self.unwrap_typedef(), Union { .. })
    }

    /// This is a union tag
    pub fn is_union_tag(&self) -> bool {
        matches!(self.unwrap_typedef(), UnionTag(_))
    }

    /// Is this an unsigned integer
    pub fn is_unsigned(&self, mm: &MachineModel) -> bool {
        match self {
            CInteger(CIntType::Bool) | CInteger(CIntType::SizeT) | Unsignedbv { .. } => true,
            CInteger(CIntType::Char) => mm.char_is_unsigned,
            CBitField { typ, .. } | TypeDef { typ, .. } => typ.is_unsigned(mm),
            _ => false,
        }
    }

    pub fn is_variadic_code(&self) -> bool {
        matches!(self.unwrap_typedef(), VariadicCode { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.unwrap_typedef(), Vector { .. })
    }

    /// This is a struct or union that completes an incomplete struct or union.
    pub fn completes(&self, old: &Type) -> bool {
        match (old, self) {
            (IncompleteStruct { tag: old_tag }, Struct { tag: new_tag, .. })
            | (IncompleteUnion { tag: old_tag }, Union { tag: new_tag, .. }) => old_tag == new_tag,
            _ => false,
        }
    }
}

/// Generic construction
impl Type {
    /// Build a type of the given kind from its companion fields. Every field the kind requires
    /// must be set, and no other field may be: the error names each missing and each
    /// extraneous field.
    pub fn construct(kind: TypeKind, fields: TypeFields) -> Result<Type> {
        fields.check(kind)?;
        let TypeFields {
            typ,
            size,
            width,
            tag,
            name,
            components,
            parameters,
            return_type,
            int_kind,
        } = fields;
        let built: Option<Result<Type>> = match kind {
            TypeKind::Array => typ.zip(size).map(|(t, s)| Ok(t.array_of(s))),
            TypeKind::Bool => Some(Ok(Type::bool())),
            TypeKind::CBitField => typ.zip(width).map(|(t, w)| t.as_bitfield(w)),
            TypeKind::CInteger => int_kind.map(|k| Ok(CInteger(k))),
            TypeKind::Code => parameters.zip(return_type).map(|(p, r)| Ok(Type::code(p, r))),
            TypeKind::Constructor => Some(Ok(Type::constructor())),
            TypeKind::Double => Some(Ok(Type::double())),
            TypeKind::Empty => Some(Ok(Type::empty())),
            TypeKind::FlexibleArray => typ.map(|t| Ok(t.flexible_array_of())),
            TypeKind::Float => Some(Ok(Type::float())),
            TypeKind::Float16 => Some(Ok(Type::float16())),
            TypeKind::Float128 => Some(Ok(Type::float128())),
            TypeKind::IncompleteStruct => tag.map(|t| Ok(Type::incomplete_struct(t))),
            TypeKind::IncompleteUnion => tag.map(|t| Ok(Type::incomplete_union(t))),
            TypeKind::Integer => Some(Ok(Type::integer())),
            TypeKind::InfiniteArray => typ.map(|t| Ok(t.infinite_array_of())),
            TypeKind::Pointer => typ.map(|t| Ok(t.to_pointer())),
            TypeKind::Signedbv => width.map(Type::signed_int),
            TypeKind::Struct => tag.zip(components).map(|(t, c)| Type::struct_type(t, c)),
            TypeKind::StructTag => tag.map(|t| Ok(Type::struct_tag_raw(t))),
            TypeKind::TypeDef => name.zip(typ).map(|(n, t)| Ok(Type::typedef(n, t))),
            TypeKind::Union => tag.zip(components).map(|(t, c)| Type::union_type(t, c)),
            TypeKind::UnionTag => tag.map(|t| Ok(Type::union_tag_raw(t))),
            TypeKind::Unsignedbv => width.map(Type::unsigned_int),
            TypeKind::VariadicCode => {
                parameters.zip(return_type).map(|(p, r)| Ok(Type::variadic_code(p, r)))
            }
            TypeKind::Vector => typ.zip(size).map(|(t, s)| Type::vector(t, s)),
        };
        built.unwrap_or_else(|| {
            Err(IrError::construction(format!("{kind:?} type"), "inconsistent companion fields"))
        })
    }
}

/// Constructors
impl Type {
    /// elem_t[size]
    pub fn array_of(self, size: u64) -> Self {
        Array { typ: Box::new(self), size }
    }

    pub fn as_bitfield(self, width: u64) -> Result<Self> {
        if width == 0 {
            return Err(IrError::construction("bit-field", "width must be positive"));
        }
        if !self.is_integer() {
            return Err(IrError::construction(
                "bit-field",
                format!("base type {self:?} is not an integer"),
            ));
        }
        if let Some(base_width) = self.width() {
            if base_width < width {
                return Err(IrError::construction(
                    "bit-field",
                    format!("width {width} is wider than its {base_width}-bit base type"),
                ));
            }
        }
        Ok(CBitField { width, typ: Box::new(self) })
    }

    /// A formal function parameter.
    /// identifier: The unique identifier that refers to this parameter `foo12_bar17_x@1`
    /// base_name: the local name of the parameter within the function `x`
    /// typ: The type of the parameter
    pub fn as_parameter(
        self,
        identifier: Option<InternedString>,
        base_name: Option<InternedString>,
    ) -> Parameter {
        Parameter { identifier, base_name, typ: self }
    }

    pub fn bool() -> Self {
        Bool
    }

    pub fn c_bool() -> Self {
        CInteger(CIntType::Bool)
    }

    pub fn c_char() -> Self {
        CInteger(CIntType::Char)
    }

    pub fn c_int() -> Self {
        CInteger(CIntType::Int)
    }

    pub fn c_long_int() -> Self {
        CInteger(CIntType::LongInt)
    }

    /// corresponds to [code_typet] in CBMC, representing a function type
    ///    ret (params ..)
    pub fn code(parameters: Vec<Parameter>, return_type: Type) -> Self {
        Code { parameters, return_type: Box::new(return_type) }
    }

    /// CBMC, like c, allows function types to have unnamed formal paramaters
    /// `int foo(int, char, double)`
    pub fn code_with_unnamed_parameters(param_types: Vec<Type>, return_type: Type) -> Self {
        let parameters = param_types.into_iter().map(|t| t.as_parameter(None, None)).collect();
        Type::code(parameters, return_type)
    }

    pub fn constructor() -> Self {
        Constructor
    }

    pub fn double() -> Self {
        Double
    }

    /// The void type
    pub fn empty() -> Self {
        Empty
    }

    /// Empty union.
    /// union name {};
    pub fn empty_union<T: Into<InternedString>>(tag: T) -> Self {
        Union { tag: tag.into(), components: vec![] }
    }

    pub fn flexible_array_of(self) -> Self {
        FlexibleArray { typ: Box::new(self) }
    }

    pub fn float() -> Self {
        Float
    }

    pub fn float16() -> Self {
        Float16
    }

    pub fn float128() -> Self {
        Float128
    }

    /// A forward declared struct.
    /// struct foo;
    pub fn incomplete_struct<T: Into<InternedString>>(tag: T) -> Self {
        let tag = tag.into();
        IncompleteStruct { tag }
    }

    /// A forward declared union.
    /// union foo;
    pub fn incomplete_union<T: Into<InternedString>>(tag: T) -> Self {
        let tag = tag.into();
        IncompleteUnion { tag }
    }

    pub fn infinite_array_of(self) -> Self {
        InfiniteArray { typ: Box::new(self) }
    }

    pub fn integer() -> Self {
        Integer
    }

    /// self *
    pub fn to_pointer(self) -> Self {
        Pointer { typ: Box::new(self) }
    }

    pub fn signed_int(width: u64) -> Result<Self> {
        if width == 0 {
            return Err(IrError::construction("signed bit-vector", "width must be positive"));
        }
        Ok(Signedbv { width })
    }

    pub fn size_t() -> Self {
        CInteger(CIntType::SizeT)
    }

    pub fn ssize_t() -> Self {
        CInteger(CIntType::SSizeT)
    }

    /// struct name
    pub fn struct_tag<T: Into<InternedString>>(name: T) -> Self {
        StructTag(aggr_tag(name.into()))
    }

    /// struct name, but don't add a tag- prefix
    pub fn struct_tag_raw(name: InternedString) -> Self {
        StructTag(name)
    }

    pub fn components_are_unique(components: &[DatatypeComponent]) -> bool {
        let mut names: Vec<_> = components.iter().map(|x| x.name().to_string()).collect();
        names.sort();
        names.dedup();
        names.len() == components.len()
    }

    fn check_components(what: &str, components: &[DatatypeComponent]) -> Result<()> {
        if Type::components_are_unique(components) {
            Ok(())
        } else {
            let names: Vec<String> = components.iter().map(|c| c.name().to_string()).collect();
            Err(IrError::construction(
                what,
                format!("component names are not unique: [{}]", names.join(", ")),
            ))
        }
    }

    /// struct name {
    ///     f1.typ f1.data; ...
    /// }
    pub fn struct_type<T: Into<InternedString>>(
        tag: T,
        components: Vec<DatatypeComponent>,
    ) -> Result<Self> {
        let tag = tag.into();
        Type::check_components(&format!("struct {tag}"), &components)?;
        Ok(Struct { tag, components })
    }

    /// `typedef typ name`
    pub fn typedef<T: Into<InternedString>>(name: T, typ: Type) -> Self {
        TypeDef { name: name.into(), typ: Box::new(typ) }
    }

    /// union name
    pub fn union_tag<T: Into<InternedString>>(name: T) -> Self {
        UnionTag(aggr_tag(name.into()))
    }

    /// union name, but don't add a tag- prefix
    pub fn union_tag_raw(name: InternedString) -> Self {
        UnionTag(name)
    }

    /// union name {
    ///     f1.typ f1.data; ...
    /// }
    pub fn union_type<T: Into<InternedString>>(
        tag: T,
        components: Vec<DatatypeComponent>,
    ) -> Result<Self> {
        let tag = tag.into();
        Type::check_components(&format!("union {tag}"), &components)?;
        Ok(Union { tag, components })
    }

    pub fn unsigned_int(width: u64) -> Result<Self> {
        if width == 0 {
            return Err(IrError::construction("unsigned bit-vector", "width must be positive"));
        }
        Ok(Unsignedbv { width })
    }

    /// corresponds to [code_typet] in CBMC, representing a function type
    ///    ret (params, ... )
    pub fn variadic_code(parameters: Vec<Parameter>, return_type: Type) -> Self {
        VariadicCode { parameters, return_type: Box::new(return_type) }
    }

    /// CBMC, like c, allows function types to have unnamed formal paramaters
    /// `int foo(int, char, double, ...)`
    pub fn variadic_code_with_unnamed_parameters(
        param_types: Vec<Type>,
        return_type: Type,
    ) -> Self {
        let parameters = param_types.into_iter().map(|t| t.as_parameter(None, None)).collect();
        Type::variadic_code(parameters, return_type)
    }

    // `size` is the number of elements (e.g., a SIMD vector of 4 integers)
    pub fn vector(typ: Type, size: u64) -> Result<Self> {
        if !typ.is_numeric() {
            return Err(IrError::construction(
                "vector",
                format!("element type {typ:?} is not numeric"),
            ));
        }
        Ok(Vector { typ: Box::new(typ), size })
    }

    /// `void *`
    pub fn void_pointer() -> Self {
        Type::empty().to_pointer()
    }
}

/// Constants from Types, for use in Expr contexts
impl Type {
    /// an expression of nondeterministic value of type self
    pub fn nondet(&self) -> Expr {
        Expr::nondet(self.clone())
    }

    /// null pointer of self type
    /// (t)NULL
    pub fn null(&self) -> Result<Expr> {
        if !self.is_pointer() {
            return Err(IrError::validation(format!("{self:?} has no null value")));
        }
        self.zero()
    }

    pub fn one(&self) -> Result<Expr> {
        if self.is_c_bool() {
            Ok(Expr::c_true())
        } else if self.is_integer() {
            Expr::int_constant(1, self.clone())
        } else if self.is_float() {
            Ok(Expr::float_constant(1.0))
        } else if self.is_double() {
            Ok(Expr::double_constant(1.0))
        } else {
            Err(IrError::validation(format!("{self:?} has no one value")))
        }
    }

    pub fn zero(&self) -> Result<Expr> {
        if self.is_c_bool() {
            Ok(Expr::c_false())
        } else if self.is_integer() {
            Expr::int_constant(0, self.clone())
        } else if self.is_float() {
            Ok(Expr::float_constant(0.0))
        } else if self.is_double() {
            Ok(Expr::double_constant(0.0))
        } else if self.is_pointer() {
            Expr::pointer_constant(0, self.clone())
        } else {
            Err(IrError::validation(format!("{self:?} has no zero value")))
        }
    }
}

impl Type {
    /// The components of a struct or union, following tags through the symbol table.
    pub fn lookup_components<'a>(
        &'a self,
        symbol_table: &'a SymbolTable,
    ) -> Option<&'a Vec<DatatypeComponent>> {
        match self {
            Struct { components, .. } | Union { components, .. } => Some(components),
            StructTag(tag) | UnionTag(tag) => symbol_table.lookup_components(*tag),
            TypeDef { typ, .. } => typ.lookup_components(symbol_table),
            _ => None,
        }
    }

    /// The type of the named field of a struct or union, following tags through the symbol table.
    pub fn lookup_field_type<T: Into<InternedString>>(
        &self,
        field: T,
        symbol_table: &SymbolTable,
    ) -> Option<Type> {
        let field = field.into();
        self.lookup_components(symbol_table)?
            .iter()
            .find(|c| c.name() == field)
            .and_then(|c| c.field_typ().cloned())
    }

    /// Given a struct type, construct a mapping from struct field names
    /// (Strings) to struct field types (Types), ignoring padding.
    pub fn struct_field_types(
        &self,
        symbol_table: &SymbolTable,
    ) -> Result<BTreeMap<InternedString, Type>> {
        if !self.is_struct_like() {
            return Err(IrError::validation(format!("{self:?} is not a struct")));
        }
        let fields = self.lookup_components(symbol_table).ok_or_else(|| {
            IrError::validation(format!("no components known for {self:?}"))
        })?;
        Ok(fields
            .iter()
            .filter_map(|field| field.field_typ().map(|typ| (field.name(), typ.clone())))
            .collect())
    }

    /// Generate a string which uniquely identifies the given type
    /// while also being a valid variable/funcion name
    pub fn to_identifier(&self) -> String {
        // Use String instead of InternedString, since we don't want to intern temporaries.
        match self {
            Type::Array { typ, size } => {
                format!("array_of_{}_{}", size, typ.to_identifier())
            }
            Type::Bool => "bool".to_string(),
            Type::CBitField { width, typ } => {
                format!("cbitfield_of_{}_{}", width, typ.to_identifier())
            }
            Type::CInteger(int_kind) => format!("c_int_{int_kind:?}"),
            // e.g. `int my_func(double x, float_y) {`
            // => "code_from_double_float_to_int"
            Type::Code { parameters, return_type } => {
                let parameter_string = parameters
                    .iter()
                    .map(|param| param.typ().to_identifier())
                    .collect::<Vec<_>>()
                    .join("_");
                let return_string = return_type.to_identifier();
                format!("code_from_{parameter_string}_to_{return_string}")
            }
            Type::Constructor => "constructor".to_string(),
            Type::Double => "double".to_string(),
            Type::Empty => "empty".to_string(),
            Type::FlexibleArray { typ } => format!("flexarray_of_{}", typ.to_identifier()),
            Type::Float => "float".to_string(),
            Type::Float16 => "float16".to_string(),
            Type::Float128 => "float128".to_string(),
            Type::IncompleteStruct { tag } => tag.to_string(),
            Type::IncompleteUnion { tag } => tag.to_string(),
            Type::Integer => "integer".to_string(),
            Type::InfiniteArray { typ } => {
                format!("infinite_array_of_{}", typ.to_identifier())
            }
            Type::Pointer { typ } => format!("pointer_to_{}", typ.to_identifier()),
            Type::Signedbv { width } => format!("signed_bv_{width}"),
            Type::Struct { tag, .. } => format!("struct_{tag}"),
            Type::StructTag(tag) => format!("struct_tag_{tag}"),
            Type::TypeDef { name, .. } => format!("typedef_{name}"),
            Type::Union { tag, .. } => format!("union_{tag}"),
            Type::UnionTag(tag) => format!("union_tag_{tag}"),
            Type::Unsignedbv { width } => format!("unsigned_bv_{width}"),
            // e.g. `int my_func(double x, float_y, ..) {`
            // => "variadic_code_from_double_float_to_int"
            Type::VariadicCode { parameters, return_type } => {
                let parameter_string = parameters
                    .iter()
                    .map(|param| param.typ().to_identifier())
                    .collect::<Vec<_>>()
                    .join("_");
                let return_string = return_type.to_identifier();
                format!("variadic_code_from_{parameter_string}_to_{return_string}")
            }
            Type::Vector { size, typ } => {
                format!("vec_of_{}_{}", size, typ.to_identifier())
            }
        }
    }
}
