// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The ids CBMC uses to label `Irep` nodes.
//! c.f. CBMC code [src/util/irep_ids.def].
//!
//! Every textual id has exactly one representation: well known ids are enum variants, and any
//! other text (names, numbers, bit-patterns) is a `FreeformString`. `IrepId::from_string`
//! performs the normalization, and is the only way to build a `FreeformText`, so two ids are
//! equal iff their texts are equal.

use crate::utils::{fits_in_bits, twos_complement};
use crate::{InternedString, IrError, Result};
use lazy_static::lazy_static;
use num::bigint::BigInt;
use std::collections::HashMap;
use std::fmt::Display;

macro_rules! irep_ids {
    ($($variant:ident => $text:literal,)*) => {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum IrepId {
            /// Any id without a dedicated variant: identifiers, numbers, bit-patterns.
            FreeformString(FreeformText),
            $($variant,)*
        }

        impl IrepId {
            /// The text of a well known id, `None` for freeform ids.
            pub fn known_text(&self) -> Option<&'static str> {
                match self {
                    IrepId::FreeformString(_) => None,
                    $(IrepId::$variant => Some($text),)*
                }
            }
        }

        lazy_static! {
            static ref KNOWN_IDS: HashMap<&'static str, IrepId> =
                [$(($text, IrepId::$variant),)*].into_iter().collect();
        }
    };
}

irep_ids! {
    AddressOf => "address_of",
    And => "and",
    Arguments => "arguments",
    Array => "array",
    ArrayOf => "array_of",
    Ashr => "ashr",
    Assert => "assert",
    Assign => "assign",
    Assume => "assume",
    AtomicBegin => "atomic_begin",
    AtomicEnd => "atomic_end",
    BitReverse => "bitreverse",
    Bitand => "bitand",
    Bitnand => "bitnand",
    Bitnot => "bitnot",
    Bitor => "bitor",
    BitsPerByte => "bits_per_byte",
    Bitxor => "bitxor",
    Block => "block",
    Bool => "bool",
    Break => "break",
    Bswap => "bswap",
    ByteExtractBigEndian => "byte_extract_big_endian",
    ByteExtractLittleEndian => "byte_extract_little_endian",
    CBaseName => "#base_name",
    CBitField => "c_bit_field",
    CBool => "c_bool",
    CBoundsCheck => "#bounds_check",
    CCSizeofType => "#c_sizeof_type",
    CCType => "#c_type",
    CConstant => "#constant",
    CIdentifier => "#identifier",
    CIsPadding => "#is_padding",
    CLvalue => "#lvalue",
    CRoundingMode => "#rounding_mode",
    CSourceLocation => "#source_location",
    CSpecAssigns => "#spec_assigns",
    CSpecLoopInvariant => "#spec_loop_invariant",
    CTypedef => "#typedef",
    Code => "code",
    Column => "column",
    Comment => "comment",
    ComponentName => "component_name",
    Components => "components",
    Constant => "constant",
    Constructor => "constructor",
    Continue => "continue",
    CountLeadingZeros => "count_leading_zeros",
    CountTrailingZeros => "count_trailing_zeros",
    Dead => "dead",
    Decl => "decl",
    Default => "default",
    Dereference => "dereference",
    Destination => "destination",
    Div => "/",
    Double => "double",
    Ellipsis => "ellipsis",
    Empty => "empty",
    EmptyString => "",
    Equal => "=",
    Expression => "expression",
    F => "f",
    False => "false",
    File => "file",
    Float => "float",
    Float128 => "_Float128",
    Float16 => "_Float16",
    Floatbv => "floatbv",
    For => "for",
    Function => "function",
    FunctionCall => "function_call",
    Ge => ">=",
    Goto => "goto",
    Gt => ">",
    Id0 => "0",
    Id1 => "1",
    Identifier => "identifier",
    IeeeFloatEqual => "ieee_float_equal",
    IeeeFloatNotequal => "ieee_float_notequal",
    If => "if",
    Ifthenelse => "ifthenelse",
    Implies => "=>",
    Incomplete => "incomplete",
    Index => "index",
    Infinity => "infinity",
    Integer => "integer",
    IsDynamicObject => "is_dynamic_object",
    IsFinite => "isfinite",
    Label => "label",
    Lambda => "lambda",
    Le => "<=",
    Line => "line",
    Lshr => "lshr",
    Lt => "<",
    MathematicalFunction => "mathematical_function",
    Member => "member",
    Minus => "-",
    Mod => "mod",
    Mode => "mode",
    Module => "module",
    Mult => "*",
    NULL => "NULL",
    Name => "name",
    Nil => "nil",
    Nondet => "nondet",
    Not => "not",
    Notequal => "notequal",
    ObjectSize => "object_size",
    Or => "or",
    OverflowMinus => "overflow--",
    OverflowMult => "overflow-*",
    OverflowPlus => "overflow-+",
    OverflowResultMinus => "overflow_result--",
    OverflowResultMult => "overflow_result-*",
    OverflowResultPlus => "overflow_result-+",
    Parameter => "parameter",
    Parameters => "parameters",
    Plus => "+",
    Pointer => "pointer",
    PointerObject => "pointer_object",
    PointerOffset => "pointer_offset",
    Popcount => "popcount",
    Postdecrement => "postdecrement",
    Postincrement => "postincrement",
    Pragma => "#pragma",
    Predecrement => "predecrement",
    Preincrement => "preincrement",
    PrettyName => "pretty_name",
    PropertyClass => "property_class",
    ROk => "r_ok",
    Return => "return",
    ReturnType => "return_type",
    Rol => "rol",
    Ror => "ror",
    Shl => "shl",
    SideEffect => "side_effect",
    Signedbv => "signedbv",
    Size => "size",
    Skip => "skip",
    Statement => "statement",
    StringConstant => "string_constant",
    Struct => "struct",
    StructTag => "struct_tag",
    Switch => "switch",
    SwitchCase => "switch_case",
    Symbol => "symbol",
    Tag => "tag",
    True => "true",
    Tuple => "tuple",
    Type => "type",
    Typecast => "typecast",
    UnaryMinus => "unary-",
    Union => "union",
    UnionTag => "union_tag",
    Unsignedbv => "unsignedbv",
    Value => "value",
    Vector => "vector",
    VectorEqual => "vector-=",
    VectorGe => "vector->=",
    VectorGt => "vector->",
    VectorLe => "vector-<=",
    VectorLt => "vector-<",
    VectorNotequal => "vector-notequal",
    While => "while",
    Width => "width",
    Xor => "xor",
}

/// The text of an id that has no dedicated variant. Never holds the text of a well known id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FreeformText(InternedString);

impl FreeformText {
    pub fn text(&self) -> InternedString {
        self.0
    }
}

/// Constructors
impl IrepId {
    /// The id with text `s`. Known keywords map to their dedicated variant.
    pub fn from_string<T: Into<InternedString>>(s: T) -> IrepId {
        let s = s.into();
        s.map(|text| KNOWN_IDS.get(text).copied()).unwrap_or(IrepId::FreeformString(FreeformText(s)))
    }

    pub fn from_int<T: Into<BigInt>>(i: T) -> IrepId {
        IrepId::from_string(i.into().to_string())
    }

    /// CBMC's encoding of a `width`-bit constant: the two's complement bits as upper-case
    /// hexadecimal. Fails if `i` is not representable in `width` bits.
    pub fn bitpattern_from_int<T: Into<BigInt>>(i: T, width: u64, signed: bool) -> Result<IrepId> {
        let i = i.into();
        if !fits_in_bits(&i, width, signed) {
            let sign = if signed { "signed" } else { "unsigned" };
            return Err(IrError::validation(format!(
                "integer {i} does not fit in a {width}-bit {sign} type"
            )));
        }
        Ok(IrepId::from_string(format!("{:X}", twos_complement(&i, width))))
    }
}

/// Getters
impl IrepId {
    /// Parse the id as a decimal integer.
    pub fn to_bigint(&self) -> Option<BigInt> {
        self.to_string().parse().ok()
    }

    /// Parse the id as a hexadecimal bit-pattern of a `width`-bit integer.
    pub fn bitpattern_to_bigint(&self, width: u64, signed: bool) -> Option<BigInt> {
        let bits = BigInt::parse_bytes(self.to_string().as_bytes(), 16)?;
        if signed && width > 0 && bits.bit(width - 1) {
            Some(bits - (BigInt::from(1) << width))
        } else {
            Some(bits)
        }
    }
}

impl Display for IrepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrepId::FreeformString(s) => write!(f, "{}", s.0),
            known => f.write_str(known.known_text().unwrap_or_default()),
        }
    }
}

impl From<&str> for IrepId {
    fn from(s: &str) -> Self {
        IrepId::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_normalizes() {
        assert_eq!(IrepId::from_string("plus"), IrepId::FreeformString(FreeformText("plus".into())));
        assert_eq!(IrepId::from_string("+"), IrepId::Plus);
        assert_eq!(IrepId::from_string("#source_location"), IrepId::CSourceLocation);
        assert_eq!(IrepId::from_string(""), IrepId::EmptyString);
        assert_eq!(IrepId::from_int(1), IrepId::Id1);
        assert_eq!(IrepId::from_int(42), IrepId::FreeformString(FreeformText("42".into())));
        match IrepId::from_string("main::x") {
            IrepId::FreeformString(text) => assert_eq!(text.text(), "main::x"),
            other => panic!("expected a freeform id, got {other:?}"),
        }
    }

    #[test]
    fn test_text_round_trip() {
        for id in [IrepId::OverflowResultMinus, IrepId::VectorGe, IrepId::NULL, IrepId::Id0] {
            assert_eq!(IrepId::from_string(id.to_string()), id);
        }
    }

    #[test]
    fn test_bitpattern_from_int() {
        assert_eq!(IrepId::bitpattern_from_int(255, 8, false).unwrap().to_string(), "FF");
        assert_eq!(IrepId::bitpattern_from_int(-1, 8, true).unwrap().to_string(), "FF");
        assert_eq!(IrepId::bitpattern_from_int(-2, 32, true).unwrap().to_string(), "FFFFFFFE");
        assert_eq!(IrepId::bitpattern_from_int(1, 8, false).unwrap(), IrepId::Id1);
        assert_eq!(IrepId::bitpattern_from_int(0, 64, true).unwrap(), IrepId::Id0);
    }

    #[test]
    fn test_bitpattern_out_of_range() {
        assert!(matches!(IrepId::bitpattern_from_int(256, 8, false), Err(IrError::Validation { .. })));
        assert!(IrepId::bitpattern_from_int(128, 8, true).is_err());
        assert!(IrepId::bitpattern_from_int(-1, 8, false).is_err());
    }

    #[test]
    fn test_bitpattern_to_bigint() {
        let id = IrepId::bitpattern_from_int(-5, 16, true).unwrap();
        assert_eq!(id.bitpattern_to_bigint(16, true), Some(BigInt::from(-5)));
        assert_eq!(id.bitpattern_to_bigint(16, false), Some(BigInt::from(65531)));
        assert_eq!(IrepId::from_int(-3).to_bigint(), Some(BigInt::from(-3)));
        assert_eq!(IrepId::Plus.to_bigint(), None);
    }
}
