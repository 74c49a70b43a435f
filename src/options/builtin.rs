use crate::field::FieldDescriptor;
use anyhow::bail;
use serde_json::Value;

/// `required`: the candidate must be neither null nor the field's zero value.
///
/// Emptiness is judged on the candidate coerced to the field's type, so
/// `0`, `0.0` and `"0"` are all empty for a float field.
///
/// Fields missing from the request still pass through here with their
/// carried-over or zero value, so an untouched field is rejected.
pub fn required(
    field: &FieldDescriptor,
    _arg: Option<&str>,
    _current: &Value,
    candidate: Value,
) -> anyhow::Result<Value> {
    if field.is_zero(&candidate) {
        bail!("a value is required");
    }
    Ok(candidate)
}

/// `immutable`: once the field holds a non-zero value it cannot change.
///
/// The candidate is compared in the field's type, so re-sending the current
/// value as a form string is accepted.
pub fn immutable(
    field: &FieldDescriptor,
    _arg: Option<&str>,
    current: &Value,
    candidate: Value,
) -> anyhow::Result<Value> {
    if !field.is_zero(current) && field.retyped(&candidate).as_ref() != Some(current) {
        bail!("value cannot be changed once set");
    }
    Ok(candidate)
}

/// `default=<literal>`: an empty candidate is replaced by the literal.
///
/// The literal is passed on as a string and coerced like request input.
pub fn default_option(
    field: &FieldDescriptor,
    arg: Option<&str>,
    _current: &Value,
    candidate: Value,
) -> anyhow::Result<Value> {
    let Some(literal) = arg else {
        bail!("the default option needs a value, e.g. default=guest");
    };
    if field.is_zero(&candidate) {
        return Ok(Value::String(literal.to_string()));
    }
    Ok(candidate)
}
