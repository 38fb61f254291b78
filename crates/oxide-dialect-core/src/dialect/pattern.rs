//! `?N` placeholder patterns.
//!
//! Function and temporal patterns such as `dateadd(?1,?2,?3)` are parsed
//! once into segments and rendered with already translated arguments.
//! Each argument is a [`Fragment`] carrying its own bind parameters, so
//! a pattern that repeats or reorders arguments also repeats or reorders
//! their bindings.

use std::collections::BTreeSet;

use crate::error::{DialectError, Result};
use crate::translate::ParameterBinding;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Arg(usize),
}

/// A parsed `?N` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses a pattern. A `?` not followed by a digit is kept as text.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c == '?' {
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Ok(index) = digits.parse::<usize>() {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Arg(index));
                    continue;
                }
                text.push('?');
                continue;
            }
            text.push(c);
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self {
            source: source.to_string(),
            segments,
        }
    }

    /// Returns the pattern text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the distinct placeholder indexes used by the pattern.
    #[must_use]
    pub fn placeholders(&self) -> BTreeSet<usize> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Arg(i) => Some(*i),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Returns the highest placeholder index, or 0.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.placeholders().last().copied().unwrap_or(0)
    }

    /// Renders the pattern with translated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::ArgumentCount`] when a placeholder has no
    /// matching argument.
    pub fn render(&self, args: &[Fragment]) -> Result<Fragment> {
        let mut out = Fragment::default();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.sql.push_str(text),
                Segment::Arg(index) => {
                    let arg = index
                        .checked_sub(1)
                        .and_then(|i| args.get(i))
                        .ok_or_else(|| self.argument_count_error(args.len()))?;
                    out.push(arg);
                }
            }
        }
        Ok(out)
    }

    /// Renders the pattern with plain text arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::ArgumentCount`] when a placeholder has no
    /// matching argument.
    pub fn render_str(&self, args: &[&str]) -> Result<String> {
        let fragments: Vec<Fragment> = args.iter().map(|a| Fragment::text(*a)).collect();
        Ok(self.render(&fragments)?.sql)
    }

    fn argument_count_error(&self, actual: usize) -> DialectError {
        DialectError::ArgumentCount {
            name: self.source.clone(),
            expected: self.arity(),
            actual,
        }
    }
}

/// Renders a one-off pattern with text arguments.
///
/// # Errors
///
/// Returns [`DialectError::ArgumentCount`] when a placeholder has no
/// matching argument.
pub fn render_pattern(pattern: &str, args: &[&str]) -> Result<String> {
    Pattern::parse(pattern).render_str(args)
}

/// Translated SQL text together with the bind parameters it contains.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    /// SQL text.
    pub sql: String,
    /// Bind parameters in text order.
    pub parameters: Vec<ParameterBinding>,
}

impl Fragment {
    /// A fragment without parameters.
    #[must_use]
    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends another fragment.
    pub fn push(&mut self, other: &Self) {
        self.sql.push_str(&other.sql);
        self.parameters.extend_from_slice(&other.parameters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_placeholders() {
        let pattern = Pattern::parse("dateadd(?1,?2,?3)");
        assert_eq!(pattern.placeholders(), BTreeSet::from([1, 2, 3]));
        assert_eq!(pattern.arity(), 3);
    }

    #[test]
    fn test_bare_question_mark_is_text() {
        let pattern = Pattern::parse("select ? from t where x=?1");
        assert_eq!(pattern.placeholders(), BTreeSet::from([1]));
        assert_eq!(pattern.render_str(&["a"]).unwrap(), "select ? from t where x=a");
    }

    #[test]
    fn test_render_reorders_bindings() {
        let pattern = Pattern::parse("(?3+?2 units ?1)");
        let unit = Fragment::text("day");
        let magnitude = Fragment {
            sql: "?".into(),
            parameters: vec![ParameterBinding::Query(1)],
        };
        let datetime = Fragment {
            sql: "?".into(),
            parameters: vec![ParameterBinding::Query(2)],
        };
        let out = pattern.render(&[unit, magnitude, datetime]).unwrap();
        assert_eq!(out.sql, "(?+? units day)");
        assert_eq!(
            out.parameters,
            vec![ParameterBinding::Query(2), ParameterBinding::Query(1)]
        );
    }

    #[test]
    fn test_render_duplicates_bindings() {
        let pattern = Pattern::parse("case when ?1<=?2 then ?1 else ?2 end");
        let a = Fragment {
            sql: "?".into(),
            parameters: vec![ParameterBinding::Query(1)],
        };
        let b = Fragment::text("b");
        let out = pattern.render(&[a, b]).unwrap();
        assert_eq!(out.sql, "case when ?<=b then ? else b end");
        assert_eq!(out.parameters.len(), 2);
    }

    #[test]
    fn test_missing_argument() {
        let err = render_pattern("mod(?1,?2)", &["a"]).unwrap_err();
        assert!(matches!(
            err,
            DialectError::ArgumentCount {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }
}
