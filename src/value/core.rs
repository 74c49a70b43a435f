use crate::error::FieldError;
use crate::field::Retype;
use serde_json::Value;

/// Hook run before a request value is stored in the field.
pub trait PreReceiver {
    fn pre_receive(&mut self) -> anyhow::Result<()>;
}

/// Takes full ownership of parsing a raw request value.
///
/// When a field value exposes a receiver, standard coercion is skipped for
/// values that came from the request.
pub trait Receiver {
    fn receive(&mut self, value: Value) -> anyhow::Result<()>;
}

/// Hook run after a request value was successfully stored in the field.
pub trait PostReceiver {
    fn post_receive(&mut self) -> anyhow::Result<()>;
}

/// A type that can be stored in a record field.
///
/// `Default` provides the type's zero value.
pub trait FieldValue: Default {
    /// The current value as a dynamically-typed value.
    fn to_value(&self) -> Value;

    /// Replace `self` with `value` converted to this type.
    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError>;

    /// Assign null. Only optional types accept it.
    fn clear(&mut self) -> Result<(), FieldError> {
        Err(FieldError::NullToNonPointer)
    }

    /// Make sure a value is present before a non-null value is stored.
    fn allocate(&mut self) {}

    /// Replacement for an empty candidate, if the type has one.
    fn default_value() -> Option<Value> {
        None
    }

    fn as_pre_receiver(&mut self) -> Option<&mut dyn PreReceiver> {
        None
    }

    fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
        None
    }

    fn as_post_receiver(&mut self) -> Option<&mut dyn PostReceiver> {
        None
    }
}

/// Object-safe view of a field slot, used by the structure walker.
pub trait Field {
    /// Current value of the field.
    fn current(&self) -> Value;

    /// Zero value of the field's type.
    fn zero(&self) -> Value;

    /// The type's default-value capability, if it has one.
    fn fallback_value(&self) -> Option<Value>;

    /// Conversion of raw values into this field's type.
    fn retype(&self) -> Retype;

    /// Store `value`, running value hooks when it came from the request.
    fn set_value(&mut self, value: Value, from_request: bool) -> Result<(), FieldError>;
}

impl<T: FieldValue> Field for T {
    fn current(&self) -> Value {
        self.to_value()
    }

    fn zero(&self) -> Value {
        T::default().to_value()
    }

    fn fallback_value(&self) -> Option<Value> {
        <T as FieldValue>::default_value()
    }

    fn retype(&self) -> Retype {
        retype_value::<T>
    }

    fn set_value(&mut self, value: Value, from_request: bool) -> Result<(), FieldError> {
        crate::lifecycle::assign(self, value, from_request)
    }
}

/// Coerce `value` into a scratch `T` and render the result.
///
/// No value hooks run. `None` when `value` does not convert.
pub fn retype_value<T: FieldValue>(value: &Value) -> Option<Value> {
    let mut scratch = T::default();
    if value.is_null() {
        scratch.clear().ok()?;
    } else {
        scratch.allocate();
        scratch.coerce_from(value.clone()).ok()?;
    }
    Some(scratch.to_value())
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        if value.is_null() {
            return self.clear();
        }
        self.get_or_insert_with(T::default).coerce_from(value)
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        *self = None;
        Ok(())
    }

    fn allocate(&mut self) {
        self.get_or_insert_with(T::default).allocate();
    }

    fn default_value() -> Option<Value> {
        T::default_value()
    }

    fn as_pre_receiver(&mut self) -> Option<&mut dyn PreReceiver> {
        self.as_mut().and_then(T::as_pre_receiver)
    }

    fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
        self.as_mut().and_then(T::as_receiver)
    }

    fn as_post_receiver(&mut self) -> Option<&mut dyn PostReceiver> {
        self.as_mut().and_then(T::as_post_receiver)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        (**self).coerce_from(value)
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        (**self).clear()
    }

    fn allocate(&mut self) {
        (**self).allocate();
    }

    fn default_value() -> Option<Value> {
        T::default_value()
    }

    fn as_pre_receiver(&mut self) -> Option<&mut dyn PreReceiver> {
        (**self).as_pre_receiver()
    }

    fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
        (**self).as_receiver()
    }

    fn as_post_receiver(&mut self) -> Option<&mut dyn PostReceiver> {
        (**self).as_post_receiver()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
        match value {
            Value::Array(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                for item in items {
                    let mut slot = T::default();
                    slot.coerce_from(item)?;
                    coerced.push(slot);
                }
                *self = coerced;
                Ok(())
            }
            other => Err(FieldError::Convert {
                from: super::value_kind(&other),
                to: super::type_label::<Self>(),
            }),
        }
    }
}
