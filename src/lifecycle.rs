//! # Lifecycle Module
//!
//! Invocation of the optional hooks around an unmarshal call.
//!
//! ## Overview
//!
//! Hooks exist at two levels:
//!
//! - **Whole target** - [`PreUnmarshal`](crate::PreUnmarshal) runs before
//!   anything else and aborts the call on failure.
//!   [`PostUnmarshal`](crate::PostUnmarshal) always runs at the end; its
//!   failure only becomes the result when nothing failed earlier
//!   (see [`merge_outcome`]).
//! - **Field value** - for values that came from the request, the value's
//!   pre-receive hook, then its receiver (which replaces standard coercion),
//!   then its post-receive hook once the value was stored.
//!
//! ```mermaid
//! sequenceDiagram
//!     participant U as unmarshal
//!     participant T as Target
//!     participant W as Walker
//!     participant V as Field value
//!     U->>T: pre_unmarshal()
//!     U->>W: walk fields
//!     W->>V: pre_receive()
//!     W->>V: receive(raw) / coerce
//!     W->>V: post_receive()
//!     U->>T: post_unmarshal()
//! ```

use crate::error::{FieldError, UnmarshalError};
use crate::record::Record;
use crate::value::FieldValue;
use serde_json::Value;
use tracing::debug;

/// Store a candidate in a field value.
///
/// Null clears optional values and is rejected otherwise. Any other value
/// first makes sure an optional slot is allocated. Value hooks only run for
/// candidates taken from the request; carried-over and defaulted values go
/// straight to coercion.
pub(crate) fn assign<T: FieldValue>(
    target: &mut T,
    value: Value,
    from_request: bool,
) -> Result<(), FieldError> {
    if value.is_null() {
        return target.clear();
    }
    target.allocate();

    if !from_request {
        return target.coerce_from(value);
    }

    if let Some(pre) = target.as_pre_receiver() {
        pre.pre_receive().map_err(FieldError::PreReceive)?;
    }
    match target.as_receiver() {
        Some(receiver) => receiver.receive(value).map_err(FieldError::Receive)?,
        None => target.coerce_from(value)?,
    }
    if let Some(post) = target.as_post_receiver() {
        post.post_receive().map_err(FieldError::PostReceive)?;
    }
    Ok(())
}

/// Run the target's pre-unmarshal hook, if it has one.
pub(crate) fn pre_unmarshal(record: &mut dyn Record) -> Result<(), UnmarshalError> {
    match record.as_pre_unmarshal() {
        Some(hook) => hook.pre_unmarshal().map_err(|err| {
            debug!(error = %err, "pre-unmarshal hook failed");
            UnmarshalError::PreUnmarshal(err)
        }),
        None => Ok(()),
    }
}

/// Run the target's post-unmarshal hook, if it has one.
pub(crate) fn post_unmarshal(record: &mut dyn Record) -> Result<(), UnmarshalError> {
    match record.as_post_unmarshal() {
        Some(hook) => hook.post_unmarshal().map_err(|err| {
            debug!(error = %err, "post-unmarshal hook failed");
            UnmarshalError::PostUnmarshal(err)
        }),
        None => Ok(()),
    }
}

/// Combine the main result with the post-hook result.
///
/// A post-hook failure never masks an earlier, more specific failure.
pub fn merge_outcome(
    main: Result<(), UnmarshalError>,
    post: Result<(), UnmarshalError>,
) -> Result<(), UnmarshalError> {
    main.and(post)
}
