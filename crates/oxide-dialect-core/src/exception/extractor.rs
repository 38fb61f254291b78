//! Constraint name extraction from driver messages.

use regex::Regex;

/// Returns the text between `start` and the next `end` in `message`.
#[must_use]
pub fn extract_using_template(start: &str, end: &str, message: &str) -> Option<String> {
    let from = message.find(start)? + start.len();
    let len = message[from..].find(end)?;
    Some(message[from..from + len].to_string())
}

/// Returns the first capture group of `pattern` in `message`.
///
/// An invalid pattern yields `None`.
#[must_use]
pub fn extract_using_regex(pattern: &str, message: &str) -> Option<String> {
    let regex = Regex::new(pattern).ok()?;
    regex
        .captures(message)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Strips an `owner.` prefix from a constraint name.
#[must_use]
pub fn strip_owner(name: &str) -> &str {
    name.split_once('.').map_or(name, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template() {
        assert_eq!(
            extract_using_template(
                "Unique constraint (",
                ") violated.",
                "Unique constraint (informix.u101_1) violated."
            ),
            Some("informix.u101_1".into())
        );
        assert_eq!(extract_using_template("(", ")", "no parens"), None);
    }

    #[test]
    fn test_regex() {
        assert_eq!(
            extract_using_regex(
                r#"violation of .+? constraint "([^"]+)""#,
                r#"violation of FOREIGN KEY constraint "FK_ORDER" on table "ORDERS""#
            ),
            Some("FK_ORDER".into())
        );
        assert_eq!(extract_using_regex("(", "x"), None);
    }

    #[test]
    fn test_strip_owner() {
        assert_eq!(strip_owner("informix.u101_1"), "u101_1");
        assert_eq!(strip_owner("pk_t"), "pk_t");
    }
}
