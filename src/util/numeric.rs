//! Numeric precision guard.
//!
//! Deserialized numbers arrive dynamically typed and must populate statically
//! expected numeric slots. Every narrowing here is verified to round-trip
//! exactly; the single tolerated exception is f64 -> f32, which may lose
//! precision (but never magnitude) for values inside f32's finite range.

use crate::core::Value;
use crate::util::{Error, Result};

/// Statically expected numeric slot widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericTag {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl NumericTag {
    /// Slot name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// Dynamically typed number lifted to its widest representation.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn num_of(value: &Value) -> Result<Num> {
    match value {
        Value::I8(v) => Ok(Num::Int(*v as i64)),
        Value::I16(v) => Ok(Num::Int(*v as i64)),
        Value::I32(v) => Ok(Num::Int(*v as i64)),
        Value::I64(v) => Ok(Num::Int(*v)),
        Value::F32(v) => Ok(Num::Float(*v as f64)),
        Value::F64(v) => Ok(Num::Float(*v)),
        other => Err(Error::mismatch("numeric value", other.kind_name())),
    }
}

fn lossy(num: Num, target: NumericTag) -> Error {
    let value = match num {
        Num::Int(v) => v.to_string(),
        Num::Float(v) => v.to_string(),
    };
    Error::InaccurateConversion {
        value,
        target: target.name().to_string(),
    }
}

/// Upper bound of the i64 range in f64, exactly 2^63.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Widen to i64, rejecting floats with a fractional or out-of-range part.
fn int_of(num: Num, target: NumericTag) -> Result<i64> {
    match num {
        Num::Int(v) => Ok(v),
        Num::Float(v) => {
            // The range check must precede the cast: exactly 2^63 saturates
            // to i64::MAX, which rounds back to 2^63 and would fool the
            // round-trip comparison. NaN fails the range check too.
            if !(v >= -I64_BOUND && v < I64_BOUND) {
                return Err(lossy(num, target));
            }
            let n = v as i64;
            if n as f64 == v {
                Ok(n)
            } else {
                Err(lossy(num, target))
            }
        }
    }
}

/// Convert into a signed 8-bit slot, or fail with an inaccurate-conversion error.
pub fn to_i8(value: &Value) -> Result<i8> {
    let num = num_of(value)?;
    let wide = int_of(num, NumericTag::I8)?;
    i8::try_from(wide).map_err(|_| lossy(num, NumericTag::I8))
}

/// Convert into a signed 16-bit slot.
pub fn to_i16(value: &Value) -> Result<i16> {
    let num = num_of(value)?;
    let wide = int_of(num, NumericTag::I16)?;
    i16::try_from(wide).map_err(|_| lossy(num, NumericTag::I16))
}

/// Convert into a signed 32-bit slot.
pub fn to_i32(value: &Value) -> Result<i32> {
    let num = num_of(value)?;
    let wide = int_of(num, NumericTag::I32)?;
    i32::try_from(wide).map_err(|_| lossy(num, NumericTag::I32))
}

/// Convert into a signed 64-bit slot.
pub fn to_i64(value: &Value) -> Result<i64> {
    let num = num_of(value)?;
    int_of(num, NumericTag::I64)
}

/// Convert into a 32-bit float slot.
///
/// Integers must round-trip exactly. Doubles are accepted whenever the result
/// stays finite, even if decimal digits are dropped.
pub fn to_f32(value: &Value) -> Result<f32> {
    let num = num_of(value)?;
    match num {
        Num::Int(v) => {
            let f = v as f32;
            if f.is_finite() && f as i128 == v as i128 {
                Ok(f)
            } else {
                Err(lossy(num, NumericTag::F32))
            }
        }
        Num::Float(v) => {
            let f = v as f32;
            if f.is_finite() || !v.is_finite() {
                Ok(f)
            } else {
                Err(lossy(num, NumericTag::F32))
            }
        }
    }
}

/// Convert into a 64-bit float slot. Integers must round-trip exactly.
pub fn to_f64(value: &Value) -> Result<f64> {
    let num = num_of(value)?;
    match num {
        Num::Int(v) => {
            let f = v as f64;
            if f as i128 == v as i128 {
                Ok(f)
            } else {
                Err(lossy(num, NumericTag::F64))
            }
        }
        Num::Float(v) => Ok(v),
    }
}

/// Coerce a dynamically typed number into the given slot.
pub fn coerce(value: &Value, target: NumericTag) -> Result<Value> {
    Ok(match target {
        NumericTag::I8 => Value::I8(to_i8(value)?),
        NumericTag::I16 => Value::I16(to_i16(value)?),
        NumericTag::I32 => Value::I32(to_i32(value)?),
        NumericTag::I64 => Value::I64(to_i64(value)?),
        NumericTag::F32 => Value::F32(to_f32(value)?),
        NumericTag::F64 => Value::F64(to_f64(value)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_magnitude_overflow() {
        let err = to_f32(&Value::F64(3.4e40)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));
    }

    #[test]
    fn test_float_precision_tolerated() {
        assert_eq!(to_f32(&Value::F64(3.0)).unwrap(), 3.0_f32);
        // Precision loss inside f32 range is allowed for doubles.
        let f = to_f32(&Value::F64(0.1)).unwrap();
        assert_eq!(f, 0.1_f32);
    }

    #[test]
    fn test_integer_overflow() {
        let err = to_i8(&Value::I32(200)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));
        assert_eq!(to_i8(&Value::I32(100)).unwrap(), 100);
    }

    #[test]
    fn test_exact_passthrough() {
        assert_eq!(to_i32(&Value::I32(42)).unwrap(), 42);
        assert_eq!(to_i64(&Value::I8(-5)).unwrap(), -5);
        assert_eq!(to_f64(&Value::F64(1.5)).unwrap(), 1.5);
    }

    #[test]
    fn test_float_at_i64_range_edge() {
        // Exactly 2^63 is not an i64; a saturating cast would round-trip
        // through i64::MAX and slip past the guard.
        let err = to_i64(&Value::F64(9_223_372_036_854_775_808.0)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));

        // -2^63 is i64::MIN and must pass.
        assert_eq!(
            to_i64(&Value::F64(-9_223_372_036_854_775_808.0)).unwrap(),
            i64::MIN
        );

        let err = to_i64(&Value::F64(f64::NAN)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));
    }

    #[test]
    fn test_fractional_float_to_int() {
        let err = to_i32(&Value::F64(1.5)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));
        assert_eq!(to_i32(&Value::F64(7.0)).unwrap(), 7);
    }

    #[test]
    fn test_large_int_to_float() {
        // 2^24 + 1 is the first integer a f32 cannot hold exactly.
        let err = to_f32(&Value::I64((1 << 24) + 1)).unwrap_err();
        assert!(matches!(err, Error::InaccurateConversion { .. }));
        assert_eq!(to_f32(&Value::I64(1 << 24)).unwrap(), 16_777_216.0);
    }

    #[test]
    fn test_non_numeric_is_type_mismatch() {
        let err = to_i32(&Value::String("7".into())).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_coerce_targets() {
        assert_eq!(
            coerce(&Value::I64(12), NumericTag::I16).unwrap(),
            Value::I16(12)
        );
        assert_eq!(
            coerce(&Value::F32(2.5), NumericTag::F64).unwrap(),
            Value::F64(2.5)
        );
    }
}
