//! Structured field names owned by the logging system.
//!
//! Every rendered record carries these fields, so caller-supplied fields must never be allowed to
//! overwrite them.

use std::{any::Any, borrow::Cow, sync::Arc};

use crate::Error;

pub const LEVEL_KEY: &str = "_l";
pub const MESSAGE_KEY: &str = "_m";
pub const NAME_KEY: &str = "_n";
pub const TIME_KEY: &str = "_t";
pub const CALLSTACK_KEY: &str = "_c";

/// The complete set of reserved keys
pub const RESERVED_KEYS: [&str; 5] = [LEVEL_KEY, MESSAGE_KEY, NAME_KEY, TIME_KEY, CALLSTACK_KEY];

/// Returns true if `key` is one of the [RESERVED_KEYS].
#[inline]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Like [is_reserved], but for keys whose type is only known at runtime.
///
/// Returns [Error::TypeMismatch] if `key` is not one of the common string types.
pub fn check_key(key: &dyn Any) -> Result<bool, Error> {
    let key: &str = if let Some(key) = key.downcast_ref::<&'static str>() {
        *key
    } else if let Some(key) = key.downcast_ref::<String>() {
        key.as_str()
    } else if let Some(key) = key.downcast_ref::<Box<str>>() {
        &**key
    } else if let Some(key) = key.downcast_ref::<Arc<str>>() {
        &**key
    } else if let Some(key) = key.downcast_ref::<Cow<'static, str>>() {
        &**key
    } else {
        return Err(Error::TypeMismatch);
    };
    Ok(is_reserved(key))
}

/// Rename a caller-supplied key so that it cannot collide with a reserved key.
pub(crate) fn escape_reserved(key: &str) -> Option<String> {
    is_reserved(key).then(|| format!("@{key}"))
}
