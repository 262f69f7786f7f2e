// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime value model for `vliw_sched`.
//!
//! Values are either signed 64-bit integers or 64-bit floats. Integer arithmetic stays integral
//! and is overflow-checked; mixing an integer with a float promotes to float. `DIV` always
//! produces a float.

use core::fmt;

use crate::vm::Trap;

/// Kind of a [`Value`], used in type errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed 64-bit integer.
    I64,
    /// 64-bit float.
    F64,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::I64 => "i64",
            Self::F64 => "f64",
        })
    }
}

/// A runtime value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer.
    I64(i64),
    /// 64-bit float.
    F64(f64),
}

impl Value {
    /// Returns the kind of this value.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::I64(_) => ValueKind::I64,
            Self::F64(_) => ValueKind::F64,
        }
    }

    /// Returns the value as a float, converting integers.
    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::I64(v) => v as f64,
            Self::F64(v) => v,
        }
    }

    /// Returns the integer payload, or `None` for floats.
    #[inline]
    #[must_use]
    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(v),
            Self::F64(_) => None,
        }
    }

    /// `self + rhs`.
    pub fn checked_add(self, rhs: Self) -> Result<Self, Trap> {
        match (self, rhs) {
            (Self::I64(a), Self::I64(b)) => {
                a.checked_add(b).map(Self::I64).ok_or(Trap::IntOverflow)
            }
            (a, b) => Ok(Self::F64(a.as_f64() + b.as_f64())),
        }
    }

    /// `self - rhs`.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, Trap> {
        match (self, rhs) {
            (Self::I64(a), Self::I64(b)) => {
                a.checked_sub(b).map(Self::I64).ok_or(Trap::IntOverflow)
            }
            (a, b) => Ok(Self::F64(a.as_f64() - b.as_f64())),
        }
    }

    /// `self * rhs`.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, Trap> {
        match (self, rhs) {
            (Self::I64(a), Self::I64(b)) => {
                a.checked_mul(b).map(Self::I64).ok_or(Trap::IntOverflow)
            }
            (a, b) => Ok(Self::F64(a.as_f64() * b.as_f64())),
        }
    }

    /// True division; the result is always a float.
    pub fn true_div(self, rhs: Self) -> Result<Self, Trap> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(Trap::DivByZero);
        }
        Ok(Self::F64(self.as_f64() / divisor))
    }

    /// Reinterprets the single-precision bits of `self` as a 32-bit signed integer.
    ///
    /// The value is first rounded to `f32`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rounding to single precision is the point of this operation"
    )]
    pub fn float_bits(self) -> Self {
        let single = self.as_f64() as f32;
        Self::I64(i64::from(single.to_bits().cast_signed()))
    }

    /// Reinterprets the low 32 bits of an integer as a single-precision float.
    ///
    /// The integer must fit in `i32`.
    pub fn bits_float(self) -> Result<Self, Trap> {
        let Self::I64(v) = self else {
            return Err(Trap::TypeMismatch {
                expected: ValueKind::I64,
                actual: self.kind(),
            });
        };
        let bits = i32::try_from(v).map_err(|_| Trap::IntCastOverflow { value: v })?;
        Ok(Self::F64(f64::from(f32::from_bits(bits.cast_unsigned()))))
    }

    /// Arithmetic right shift of an integer by `amount` bits.
    ///
    /// Shifts of 64 bits or more saturate to the sign.
    pub fn shift_right(self, amount: u32) -> Result<Self, Trap> {
        match self {
            Self::I64(v) => Ok(Self::I64(v >> amount.min(63))),
            Self::F64(_) => Err(Trap::TypeMismatch {
                expected: ValueKind::I64,
                actual: ValueKind::F64,
            }),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}
