//! SQL identifier validation.
//!
//! Table and column names are emitted as unquoted bareword tokens, so every
//! name that comes from entity metadata must match `[A-Za-z0-9_]+`.

use crate::error::{OrmError, OrmResult};

/// Whether `name` is a bareword identifier (`[A-Za-z0-9_]+`).
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Validate an identifier, returning it unchanged.
pub fn validate_identifier<'a>(name: &'a str, what: &str) -> OrmResult<&'a str> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(OrmError::configuration(format!(
            "{what} '{name}' is not a valid identifier"
        )))
    }
}

/// Split a comma-separated identifier list, trimming whitespace around items.
///
/// Returns `None` if the list is empty or any item is not an identifier.
pub fn parse_identifier_list(list: &str) -> Option<Vec<String>> {
    let mut out = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        if !is_valid_identifier(part) {
            return None;
        }
        out.push(part.to_string());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bareword_identifiers() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("user_2"));
        assert!(is_valid_identifier("9lives"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("users;"));
        assert!(!is_valid_identifier("public.users"));
        assert!(!is_valid_identifier("first name"));
    }

    #[test]
    fn identifier_lists() {
        assert_eq!(
            parse_identifier_list("a, b ,c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(parse_identifier_list("id"), Some(vec!["id".to_string()]));
        assert_eq!(parse_identifier_list("a,,b"), None);
        assert_eq!(parse_identifier_list(""), None);
        assert_eq!(parse_identifier_list("a,b-c"), None);
    }

    #[test]
    fn validate_reports_configuration_error() {
        let err = validate_identifier("bad name", "Column").unwrap_err();
        assert!(err.is_configuration());
    }
}
