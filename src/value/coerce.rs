use super::FieldValue;
use crate::error::FieldError;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

/// Kind name of a dynamic value, as used in conversion errors.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Readable name of `T` with module paths stripped.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
#[must_use]
pub fn type_label<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

/// Convert `value` into `T` following serde's conversion rules.
///
/// This is the fallback coercion for every type that is neither an integer
/// nor a float.
pub fn convert<T: DeserializeOwned>(value: Value) -> Result<T, FieldError> {
    let from = value_kind(&value);
    serde_json::from_value(value).map_err(|_| FieldError::Convert {
        from,
        to: type_label::<T>(),
    })
}

fn out_of_range<T>(input: impl ToString) -> FieldError {
    FieldError::OutOfRange {
        input: input.to_string(),
        target: type_label::<T>(),
    }
}

/// Coerce a candidate into an integer type.
///
/// Strings are parsed as base-10 signed integers; floating-point numbers are
/// truncated toward zero. Values that do not fit `T` are rejected.
pub fn coerce_integer<T>(value: Value) -> Result<T, FieldError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    match value {
        Value::String(input) => {
            let parsed = input.parse::<i64>().map_err(|err| FieldError::Parse {
                input: input.clone(),
                source: Box::new(err),
            })?;
            <T as TryFrom<i64>>::try_from(parsed).map_err(|_| out_of_range::<T>(input))
        }
        Value::Number(n) => integer_from_number(&n),
        other => Err(FieldError::Convert {
            from: value_kind(&other),
            to: type_label::<T>(),
        }),
    }
}

fn integer_from_number<T>(n: &Number) -> Result<T, FieldError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    if let Some(i) = n.as_i64() {
        return <T as TryFrom<i64>>::try_from(i).map_err(|_| out_of_range::<T>(n));
    }
    if let Some(u) = n.as_u64() {
        return <T as TryFrom<u64>>::try_from(u).map_err(|_| out_of_range::<T>(n));
    }
    let truncated = n.as_f64().map(f64::trunc).unwrap_or(f64::NAN);
    // i64::MAX as f64 rounds up to 2^63, so the upper bounds are exclusive.
    if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        <T as TryFrom<i64>>::try_from(truncated as i64).map_err(|_| out_of_range::<T>(n))
    } else if truncated >= 0.0 && truncated < u64::MAX as f64 {
        <T as TryFrom<u64>>::try_from(truncated as u64).map_err(|_| out_of_range::<T>(n))
    } else {
        Err(out_of_range::<T>(n))
    }
}

/// Coerce a candidate into a 64-bit float.
///
/// `target` names the field's type in error messages.
pub fn coerce_float(value: Value, target: &str) -> Result<f64, FieldError> {
    match value {
        Value::String(input) => input.parse::<f64>().map_err(|err| FieldError::Parse {
            input,
            source: Box::new(err),
        }),
        Value::Number(n) => n.as_f64().ok_or_else(|| FieldError::OutOfRange {
            input: n.to_string(),
            target: target.to_string(),
        }),
        other => Err(FieldError::Convert {
            from: value_kind(&other),
            to: target.to_string(),
        }),
    }
}

fn float_value(v: f64) -> Value {
    // JSON numbers have no NaN or infinity; keep them round-trippable.
    Number::from_f64(v).map_or_else(|| Value::String(v.to_string()), Value::Number)
}

macro_rules! impl_integer_field {
    ($($ty:ty),* $(,)?) => {$(
        impl FieldValue for $ty {
            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
                *self = coerce_integer::<$ty>(value)?;
                Ok(())
            }
        }
    )*};
}

impl_integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        float_value(*self)
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        *self = coerce_float(value, "f64")?;
        Ok(())
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        float_value(f64::from(*self))
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        let wide = coerce_float(value, "f32")?;
        let narrow = wide as f32;
        // finite inputs beyond f32::MAX would otherwise become infinite
        if wide.is_finite() && !narrow.is_finite() {
            return Err(FieldError::OutOfRange {
                input: wide.to_string(),
                target: "f32".to_string(),
            });
        }
        *self = narrow;
        Ok(())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        *self = convert(value)?;
        Ok(())
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        *self = convert(value)?;
        Ok(())
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        *self = value;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        *self = Value::Null;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerced<T: FieldValue>(value: Value) -> Result<T, FieldError> {
        let mut slot = T::default();
        slot.coerce_from(value)?;
        Ok(slot)
    }

    #[test]
    fn test_integer_from_string() {
        assert_eq!(coerced::<i64>(json!("42")).unwrap(), 42);
        assert_eq!(coerced::<i8>(json!("-7")).unwrap(), -7);
        assert_eq!(coerced::<u16>(json!("7")).unwrap(), 7);
    }

    #[test]
    fn test_integer_parse_failure() {
        let err = coerced::<i64>(json!("notanumber")).unwrap_err();
        match err {
            FieldError::Parse { input, .. } => assert_eq!(input, "notanumber"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_integer_from_float_truncates_toward_zero() {
        assert_eq!(coerced::<i32>(json!(2.9)).unwrap(), 2);
        assert_eq!(coerced::<i32>(json!(-2.9)).unwrap(), -2);
    }

    #[test]
    fn test_integer_out_of_range() {
        assert!(matches!(
            coerced::<u8>(json!(300)),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerced::<u32>(json!("-1")),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerced::<i64>(json!(1e300)),
            Err(FieldError::OutOfRange { .. })
        ));
        assert_eq!(coerced::<u64>(json!(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_integer_rejects_bool() {
        let err = coerced::<i64>(json!(true)).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert value of type bool to type i64");
    }

    #[test]
    fn test_float_from_string_and_numbers() {
        assert_eq!(coerced::<f64>(json!("2.7")).unwrap(), 2.7);
        assert_eq!(coerced::<f64>(json!(3)).unwrap(), 3.0);
        assert_eq!(coerced::<f32>(json!(1.5)).unwrap(), 1.5);
        assert!(matches!(
            coerced::<f64>(json!("two")),
            Err(FieldError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_finite_floats_round_trip() {
        let value = f64::INFINITY.to_value();
        assert_eq!(coerced::<f64>(value).unwrap(), f64::INFINITY);
        assert!(coerced::<f64>(f64::NAN.to_value()).unwrap().is_nan());
    }

    #[test]
    fn test_f32_out_of_range() {
        assert!(matches!(
            coerced::<f32>(json!("1e39")),
            Err(FieldError::OutOfRange { ref target, .. }) if target == "f32"
        ));
        assert!(matches!(coerced::<f32>(json!(-1e39)), Err(FieldError::OutOfRange { .. })));
        assert_eq!(coerced::<f32>(json!("inf")).unwrap(), f32::INFINITY);
        assert_eq!(coerced::<f32>(json!(f32::MAX as f64)).unwrap(), f32::MAX);
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(coerced::<String>(json!("taz")).unwrap(), "taz");
        let err = coerced::<String>(json!(5)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert value of type number to type String"
        );
    }

    #[test]
    fn test_null_into_non_optional() {
        let mut slot = 5i64;
        assert!(matches!(slot.clear(), Err(FieldError::NullToNonPointer)));
        assert_eq!(slot, 5);
    }

    #[test]
    fn test_option_allocates_and_clears() {
        let mut slot: Option<i64> = None;
        slot.coerce_from(json!("9")).unwrap();
        assert_eq!(slot, Some(9));
        slot.coerce_from(Value::Null).unwrap();
        assert_eq!(slot, None);
    }

    #[test]
    fn test_vec_elementwise() {
        assert_eq!(coerced::<Vec<i32>>(json!(["1", 2, 3.5])).unwrap(), vec![1, 2, 3]);
        let err = coerced::<Vec<String>>(json!("a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert value of type string to type Vec<String>"
        );
    }

    #[test]
    fn test_type_label() {
        assert_eq!(type_label::<String>(), "String");
        assert_eq!(type_label::<Option<Vec<u8>>>(), "Option<Vec<u8>>");
        assert_eq!(type_label::<(i64, String)>(), "(i64, String)");
    }
}
