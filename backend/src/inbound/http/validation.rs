//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::Error;

/// Reject a request when any named field is absent or blank.
///
/// `message` is the exact client-facing sentence for this endpoint; the
/// missing field names are attached as structured details.
pub(crate) fn require_fields(
    fields: &[(&'static str, Option<&str>)],
    message: &'static str,
) -> Result<(), Error> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_request(message).with_details(json!({
            "missing": missing,
            "code": "missing_field",
        })))
    }
}
