//! Placeholder substitution.
//!
//! Templates carry positional markers (`?` by default). Values are flattened,
//! counted against the markers, then spliced in left to right: NULL becomes
//! the literal `NULL`, every other scalar goes through the escape function,
//! and structured values are rejected. The scan is purely positional; a
//! marker inside a quoted literal in the template is still a marker.

use crate::error::{OrmError, OrmResult};
use crate::value::{Param, Value};

/// Number of markers in a template.
pub fn count_markers(template: &str, marker: char) -> usize {
    template.chars().filter(|&c| c == marker).count()
}

/// Expand `template` against `values`.
///
/// `clause` names the caller (`"where"`, `"having"`) in error messages.
///
/// # Errors
///
/// [`OrmError::Argument`] when the marker count differs from the number of
/// values after flattening, or when a value is not a scalar.
pub fn substitute(
    template: &str,
    values: impl IntoIterator<Item = Param>,
    marker: char,
    escape: &dyn Fn(&Value) -> String,
    clause: &str,
) -> OrmResult<String> {
    let values = Param::flatten(values);
    let markers = count_markers(template, marker);
    if markers != values.len() {
        return Err(OrmError::argument(format!(
            "{clause} - number of values ({}) does not match number of '{marker}' ({markers}) in query",
            values.len()
        )));
    }

    let mut values = values.into_iter();
    let mut out = String::with_capacity(template.len() + markers * 8);
    for ch in template.chars() {
        if ch != marker {
            out.push(ch);
            continue;
        }
        match values.next() {
            Some(Param::Scalar(Value::Null)) => out.push_str("NULL"),
            Some(Param::Scalar(value)) => out.push_str(&escape(&value)),
            Some(Param::Object(_)) => {
                return Err(OrmError::argument(format!(
                    "{clause} - accepts values in string | numeric | NULL. object provided instead"
                )));
            }
            // Flattened above and counted: neither case is reachable.
            Some(Param::List(_)) | None => {
                return Err(OrmError::argument(format!(
                    "{clause} - malformed value list"
                )));
            }
        }
    }
    Ok(out)
}

/// Build an `IN` template with one marker per (flattened) value.
///
/// ```ignore
/// let ids = vec![1, 2, 3];
/// let cond = make_where_in("id", params![ids.clone()], '?');
/// model.where_(&cond, params![ids])?;
/// ```
///
/// An empty value list yields `column in (NULL)`, which matches no rows and
/// carries no markers.
pub fn make_where_in(
    column: &str,
    values: impl IntoIterator<Item = Param>,
    marker: char,
) -> String {
    let count = Param::flatten(values).len();
    if count == 0 {
        return format!("{column} in (NULL)");
    }
    let markers = vec![marker.to_string(); count];
    format!("{column} in ({})", markers.join(", "))
}
