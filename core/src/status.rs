use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use proc_bitfield::bitfield;
use serde::{Deserialize, Serialize};
use strum::Display;

bitfield! {
    /// Sticky exception flags, laid out in x87 status word bit order
    #[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    pub struct ExceptionFlags(pub u8): Debug, FromStorage, IntoStorage, DerefStorage {
        pub invalid: bool @ 0,
        pub denormal: bool @ 1,
        pub zero_divide: bool @ 2,
        pub overflow: bool @ 3,
        pub underflow: bool @ 4,
        pub inexact: bool @ 5,
    }
}

impl ExceptionFlags {
    pub fn any(self) -> bool {
        self.0 != 0
    }
}

/// Rounding control, as encoded in control word bits 10..=11
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, FromPrimitive, Serialize, Deserialize, Default,
)]
pub enum RoundingMode {
    #[default]
    NearestEven = 0b00,
    Down = 0b01,
    Up = 0b10,
    Zero = 0b11,
}

/// Precision control, as encoded in control word bits 8..=9
///
/// Carried for completeness; the transcendental and remainder results are
/// always rounded at full 64-bit significand width, as the hardware does.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, FromPrimitive, Serialize, Deserialize, Default,
)]
pub enum PrecisionControl {
    Single = 0b00,
    Double = 0b10,
    #[default]
    Extended = 0b11,
}

/// Outcome of an operation that may need to be re-run by the caller
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Completion {
    /// Result is final
    Complete,
    /// One bounded reduction step was performed; the operand now holds a
    /// partial remainder and the operation must be issued again.
    PartialReductionNeeded,
    /// An invalid-operand condition produced a NaN result
    Invalid,
}

/// Evaluation context threaded through every operation: rounding mode,
/// precision control and the sticky exception flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FpuStatus {
    pub rounding: RoundingMode,
    pub precision: PrecisionControl,
    pub flags: ExceptionFlags,
}

impl FpuStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rounding(rounding: RoundingMode) -> Self {
        Self {
            rounding,
            ..Self::default()
        }
    }

    /// Decodes the RC and PC fields of an x87 control word. Flags start
    /// clear; the control word's mask bits do not live here.
    pub fn from_control_word(cw: u16) -> Self {
        Self {
            rounding: RoundingMode::from_u16((cw >> 10) & 3).unwrap(),
            precision: PrecisionControl::from_u16((cw >> 8) & 3)
                .unwrap_or(PrecisionControl::Extended),
            flags: ExceptionFlags::default(),
        }
    }

    pub fn raise_invalid(&mut self) {
        self.flags.set_invalid(true);
    }

    pub fn raise_denormal(&mut self) {
        self.flags.set_denormal(true);
    }

    pub fn raise_zero_divide(&mut self) {
        self.flags.set_zero_divide(true);
    }

    pub fn raise_overflow(&mut self) {
        self.flags.set_overflow(true);
    }

    pub fn raise_underflow(&mut self) {
        self.flags.set_underflow(true);
    }

    pub fn raise_inexact(&mut self) {
        self.flags.set_inexact(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_word_decode() {
        let st = FpuStatus::from_control_word(0x037F);
        assert_eq!(st.rounding, RoundingMode::NearestEven);
        assert_eq!(st.precision, PrecisionControl::Extended);
        assert!(!st.flags.any());

        let st = FpuStatus::from_control_word(0x0F7F);
        assert_eq!(st.rounding, RoundingMode::Zero);

        let st = FpuStatus::from_control_word(0x077F);
        assert_eq!(st.rounding, RoundingMode::Down);
        // PC = 01 is reserved; falls back to extended
        let st = FpuStatus::from_control_word(0x017F);
        assert_eq!(st.precision, PrecisionControl::Extended);
    }

    #[test]
    fn flags_are_sticky() {
        let mut st = FpuStatus::new();
        st.raise_inexact();
        st.raise_invalid();
        st.raise_inexact();
        assert!(st.flags.inexact());
        assert!(st.flags.invalid());
        assert!(!st.flags.underflow());
        assert_eq!(st.flags.0, 0b10_0001);
    }
}
