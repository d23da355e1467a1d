//! Checks shared by the names and text fields of every record.

use crate::Error;

/// Trim `raw` and check that it has between `min` and `max` characters.
///
/// `field` is the human readable name used in the error message.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, Error> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();

    if length < min || length > max {
        return Err(Error::InvalidLength { field, min, max });
    }

    Ok(trimmed.to_owned())
}
