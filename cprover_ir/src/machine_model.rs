// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The target facts that every lowering decision depends on: widths, signedness, endianness and
//! the floating point rounding mode.

use crate::{IrError, Result};
use num::bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Represents the machine specific information necessary to generate an Irep.
/// Built once per target and never mutated afterwards. Every `*_width` is in bits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineModel {
    /// Minimum architectural alignment, in bytes
    pub alignment: u64,
    /// The name of the architecture
    pub architecture: String,
    pub bool_width: u64,
    pub char_is_unsigned: bool,
    pub char_width: u64,
    pub double_width: u64,
    pub float_width: u64,
    pub int_width: u64,
    pub is_big_endian: bool,
    pub long_double_width: u64,
    pub long_int_width: u64,
    pub long_long_int_width: u64,
    pub memory_operand_size: u64,
    pub null_is_zero: bool,
    /// Width of a pointer, in bits
    pub pointer_width: u64,
    pub rounding_mode: RoundingMode,
    pub short_int_width: u64,
    pub single_width: u64,
    pub wchar_t_is_unsigned: bool,
    pub wchar_t_width: u64,
    pub word_size: u64,
}

/// The different rounding modes supported by cbmc.
/// <https://github.com/diffblue/cbmc/blob/2bc93c24ea6c09b5fc99b31df682ec5b31c4b162/src/ansi-c/library/fenv.c#L7>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    ToNearest = 0,
    Downward = 1,
    Upward = 2,
    TowardsZero = 3,
}

impl From<RoundingMode> for BigInt {
    fn from(rm: RoundingMode) -> Self {
        (rm as i32).into()
    }
}

impl From<RoundingMode> for i32 {
    fn from(rm: RoundingMode) -> Self {
        rm as Self
    }
}

impl TryFrom<i64> for RoundingMode {
    type Error = IrError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(RoundingMode::ToNearest),
            1 => Ok(RoundingMode::Downward),
            2 => Ok(RoundingMode::Upward),
            3 => Ok(RoundingMode::TowardsZero),
            _ => Err(IrError::validation(format!("unknown rounding mode {value}"))),
        }
    }
}

/// Getters
impl MachineModel {
    pub fn pointer_width_in_bytes(&self) -> usize {
        self.pointer_width as usize / 8
    }

    /// The pointer width implied by the architecture tag, for the architectures we know.
    fn architecture_pointer_width(&self) -> Option<u64> {
        match self.architecture.as_str() {
            "x86_64" | "aarch64" | "arm64" | "ppc64" | "ppc64le" | "riscv64" | "s390x" => Some(64),
            "i386" | "arm" | "armhf" | "ppc" | "riscv32" | "mips" => Some(32),
            _ => None,
        }
    }
}

/// Validation
impl MachineModel {
    /// Check the target facts are self consistent: every width is a positive multiple of 8,
    /// the pointer width matches the architecture, and the word size fits in a pointer.
    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("bool_width", self.bool_width),
            ("char_width", self.char_width),
            ("double_width", self.double_width),
            ("float_width", self.float_width),
            ("int_width", self.int_width),
            ("long_double_width", self.long_double_width),
            ("long_int_width", self.long_int_width),
            ("long_long_int_width", self.long_long_int_width),
            ("pointer_width", self.pointer_width),
            ("short_int_width", self.short_int_width),
            ("single_width", self.single_width),
            ("wchar_t_width", self.wchar_t_width),
            ("word_size", self.word_size),
        ];
        let invalid: Vec<String> = widths
            .iter()
            .filter(|(_, width)| *width == 0 || width % 8 != 0)
            .map(|(name, width)| format!("{name}={width}"))
            .collect();
        if !invalid.is_empty() {
            return Err(IrError::construction(
                "machine model",
                format!("widths must be positive multiples of 8: {}", invalid.join(", ")),
            ));
        }
        if let Some(expected) = self.architecture_pointer_width() {
            if self.pointer_width != expected {
                return Err(IrError::construction(
                    "machine model",
                    format!(
                        "architecture {} has {expected}-bit pointers, but pointer_width is {}",
                        self.architecture, self.pointer_width
                    ),
                ));
            }
        }
        if self.word_size > self.pointer_width {
            return Err(IrError::construction(
                "machine model",
                format!(
                    "word_size {} is wider than pointer_width {}",
                    self.word_size, self.pointer_width
                ),
            ));
        }
        Ok(())
    }
}

/// Presets
impl MachineModel {
    /// 64-bit little endian x86.
    pub fn x86_64() -> Self {
        MachineModel {
            alignment: 1,
            architecture: "x86_64".to_string(),
            bool_width: 8,
            char_is_unsigned: false,
            char_width: 8,
            double_width: 64,
            float_width: 32,
            int_width: 32,
            is_big_endian: false,
            long_double_width: 128,
            long_int_width: 64,
            long_long_int_width: 64,
            memory_operand_size: 4,
            null_is_zero: true,
            pointer_width: 64,
            rounding_mode: RoundingMode::ToNearest,
            short_int_width: 16,
            single_width: 32,
            wchar_t_is_unsigned: false,
            wchar_t_width: 32,
            word_size: 32,
        }
    }

    /// 64-bit little endian ARM. `char` and `wchar_t` are unsigned.
    pub fn aarch64() -> Self {
        MachineModel {
            architecture: "aarch64".to_string(),
            char_is_unsigned: true,
            wchar_t_is_unsigned: true,
            ..MachineModel::x86_64()
        }
    }

    /// 32-bit little endian x86.
    pub fn i386() -> Self {
        MachineModel {
            architecture: "i386".to_string(),
            long_double_width: 96,
            long_int_width: 32,
            pointer_width: 32,
            ..MachineModel::x86_64()
        }
    }
}

#[cfg(test)]
pub mod test_util {
    use super::MachineModel;

    pub fn machine_model_test_stub() -> MachineModel {
        MachineModel::x86_64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for mm in [MachineModel::x86_64(), MachineModel::aarch64(), MachineModel::i386()] {
            assert_eq!(mm.validate(), Ok(()), "{}", mm.architecture);
        }
        assert_eq!(MachineModel::x86_64().pointer_width_in_bytes(), 8);
        assert_eq!(MachineModel::i386().pointer_width_in_bytes(), 4);
    }

    #[test]
    fn rejects_width_not_multiple_of_eight() {
        let mm = MachineModel { int_width: 31, ..MachineModel::x86_64() };
        let err = mm.validate().unwrap_err();
        assert!(err.to_string().contains("int_width=31"), "{err}");
    }

    #[test]
    fn rejects_zero_width() {
        let mm = MachineModel { bool_width: 0, ..MachineModel::x86_64() };
        assert!(matches!(mm.validate(), Err(IrError::Construction { .. })));
    }

    #[test]
    fn rejects_pointer_width_for_architecture() {
        let mm = MachineModel { pointer_width: 32, word_size: 32, ..MachineModel::x86_64() };
        assert!(mm.validate().is_err());
        let unknown = MachineModel { architecture: "toy".into(), ..mm };
        assert_eq!(unknown.validate(), Ok(()));
    }

    #[test]
    fn rejects_word_wider_than_pointer() {
        let mm = MachineModel { word_size: 64, ..MachineModel::i386() };
        assert!(mm.validate().is_err());
    }

    #[test]
    fn rounding_mode_codes() {
        assert_eq!(i32::from(RoundingMode::TowardsZero), 3);
        assert_eq!(RoundingMode::try_from(2), Ok(RoundingMode::Upward));
        assert!(RoundingMode::try_from(7).is_err());
    }

    #[test]
    fn machine_model_json_round_trip() {
        let mm = MachineModel::aarch64();
        let text = serde_json::to_string(&mm).unwrap();
        let back: MachineModel = serde_json::from_str(&text).unwrap();
        assert_eq!(back, mm);
    }
}
