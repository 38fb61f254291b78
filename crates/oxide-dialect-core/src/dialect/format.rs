//! Translation of Java-style datetime patterns (`yyyy-MM-dd HH:mm`) into
//! native format strings.

/// Rewrites a datetime pattern with an ordered list of rules.
///
/// The pattern is split at single quotes. Text outside quotes is scanned
/// left to right and, at each position, the first rule whose source
/// matches is applied. Quoted text is copied unchanged and the quotes are
/// replaced by the configured delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatetimeFormatReplacer {
    quote_delimiter: String,
    rules: Vec<(String, String)>,
}

impl DatetimeFormatReplacer {
    /// Creates a replacer. List longer sources before their prefixes.
    #[must_use]
    pub fn new(quote_delimiter: &str, rules: &[(&str, &str)]) -> Self {
        Self {
            quote_delimiter: quote_delimiter.to_string(),
            rules: rules
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }

    /// Creates a replacer from owned rules.
    #[must_use]
    pub fn from_rules(quote_delimiter: &str, rules: Vec<(String, String)>) -> Self {
        Self {
            quote_delimiter: quote_delimiter.to_string(),
            rules,
        }
    }

    /// Applies the rules to `format`.
    #[must_use]
    pub fn replace(&self, format: &str) -> String {
        let mut out = String::with_capacity(format.len() * 2);
        for (i, chunk) in format.split('\'').enumerate() {
            if i > 0 {
                out.push_str(&self.quote_delimiter);
            }
            if i % 2 == 1 {
                out.push_str(chunk);
            } else {
                self.replace_unquoted(chunk, &mut out);
            }
        }
        out
    }

    fn replace_unquoted(&self, chunk: &str, out: &mut String) {
        let mut rest = chunk;
        'scan: while let Some(c) = rest.chars().next() {
            for (from, to) in &self.rules {
                if rest.starts_with(from.as_str()) {
                    out.push_str(to);
                    rest = &rest[from.len()..];
                    continue 'scan;
                }
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
}
