// File: tripbot-common/src/traits/diagnostics.rs

use crate::error::Error;

/// Side channel for recovered failures. Services decide what to return on
/// their own; they only report through here.
pub trait Diagnostics: Send + Sync {
    /// A remote collaborator failed and a substitute result was used.
    fn remote_failure(&self, operation: &str, error: &Error);

    /// Something was skipped or defaulted without an error value.
    fn degraded(&self, operation: &str, detail: &str);
}
