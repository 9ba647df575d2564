// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Useful utilities for CBMC

use crate::InternedString;
use num::bigint::{BigInt, Sign};
use num_traits::Zero;

/// The aggregate name used in CBMC for aggregates of type `n`.
/// For example, a struct tagged `foo` is stored in the symbol table as `tag-foo`.
pub fn aggr_tag<T: Into<InternedString>>(n: T) -> InternedString {
    let n = n.into();
    format!("tag-{n}").into()
}

/// Largest value representable in a `width`-bit integer.
pub fn max_int(width: u64, signed: bool) -> BigInt {
    let bignum = BigInt::from(1) << width;
    if signed { (bignum >> 1) - 1 } else { bignum - 1 }
}

/// Smallest value representable in a `width`-bit integer.
pub fn min_int(width: u64, signed: bool) -> BigInt {
    if signed {
        let bignum: BigInt = BigInt::from(1) << width;
        -(bignum >> 1usize)
    } else {
        BigInt::zero()
    }
}

/// Whether `value` is representable in a `width`-bit integer.
pub fn fits_in_bits(value: &BigInt, width: u64, signed: bool) -> bool {
    if width == 0 {
        return false;
    }
    *value >= min_int(width, signed) && *value <= max_int(width, signed)
}

/// The two's complement bit-pattern of `value` in `width` bits, as a non-negative number.
pub fn twos_complement(value: &BigInt, width: u64) -> BigInt {
    match value.sign() {
        Sign::Minus => (BigInt::from(1) << width) + value,
        _ => value.clone(),
    }
}

/// Build a `LinearMap` from `(key, value)` pairs, inserting them in order.
#[macro_export]
macro_rules! linear_map {
    ($($x:expr),*) => {{
        let mut map = ::linear_map::LinearMap::new();
        $(
            let (key, value) = $x;
            map.insert(key, value);
        )*
        map
    }};
    ($($x:expr,)*) => {
        $crate::linear_map![$($x),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_int() {
        assert_eq!(max_int(8, false), BigInt::from(255));
        assert_eq!(max_int(8, true), BigInt::from(127));
        assert_eq!(max_int(64, false), BigInt::from(u64::MAX));
        assert_eq!(max_int(64, true), BigInt::from(i64::MAX));
    }

    #[test]
    fn test_min_int() {
        assert_eq!(min_int(8, false), BigInt::zero());
        assert_eq!(min_int(8, true), BigInt::from(-128));
        assert_eq!(min_int(32, true), BigInt::from(i32::MIN));
    }

    #[test]
    fn test_fits_in_bits() {
        assert!(fits_in_bits(&BigInt::from(-1), 8, true));
        assert!(!fits_in_bits(&BigInt::from(-1), 8, false));
        assert!(!fits_in_bits(&BigInt::from(256), 8, false));
        assert!(!fits_in_bits(&BigInt::from(0), 0, false));
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(twos_complement(&BigInt::from(-1), 8), BigInt::from(255));
        assert_eq!(twos_complement(&BigInt::from(-128), 8), BigInt::from(128));
        assert_eq!(twos_complement(&BigInt::from(5), 8), BigInt::from(5));
    }

    #[test]
    fn test_aggr_tag() {
        assert_eq!(aggr_tag("foo"), "tag-foo");
    }

    #[test]
    fn test_linear_map_macro() {
        let m: linear_map::LinearMap<&str, i32> = linear_map![("a", 1), ("b", 2),];
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("b"), Some(&2));
    }
}
