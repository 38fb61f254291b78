//! A shallow scanner over rendered SQL.
//!
//! Limit handlers work on SQL text, so they need to find the top-level
//! `select`, `distinct`, `from` and trailing locking keywords without
//! being fooled by string literals, quoted identifiers or subqueries.
//! The scanner records each token's byte span and parenthesis depth.

/// Byte range of a token in the scanned SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// Kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, keyword or number.
    Word,
    /// `'string'`, `"identifier"` or `[identifier]`.
    Quoted,
    /// `(`
    Open,
    /// `)`
    Close,
    /// `,`
    Comma,
    /// Any other punctuation.
    Symbol,
}

/// A scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Location in the input.
    pub span: Span,
    /// Parenthesis depth; `(` and `)` carry the outer depth.
    pub depth: usize,
}

impl Token {
    /// Returns the token text.
    #[must_use]
    pub fn text<'a>(&self, sql: &'a str) -> &'a str {
        &sql[self.span.start..self.span.end]
    }

    /// Returns true if the token is the given keyword, ignoring case.
    #[must_use]
    pub fn is_keyword(&self, sql: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text(sql).eq_ignore_ascii_case(keyword)
    }
}

/// Splits SQL into tokens.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Scans the whole input.
    #[must_use]
    pub fn tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }
            break;
        }
    }

    fn scan_quoted(&mut self, close: char) {
        self.advance();
        while let Some(c) = self.advance() {
            if c == close {
                if close != ']' && self.peek() == Some(close) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let c = self.peek()?;
        let mut depth = self.depth;
        let kind = match c {
            '\'' => {
                self.scan_quoted('\'');
                TokenKind::Quoted
            }
            '"' => {
                self.scan_quoted('"');
                TokenKind::Quoted
            }
            '`' => {
                self.scan_quoted('`');
                TokenKind::Quoted
            }
            '[' => {
                self.scan_quoted(']');
                TokenKind::Quoted
            }
            '(' => {
                self.advance();
                self.depth += 1;
                TokenKind::Open
            }
            ')' => {
                self.advance();
                self.depth = self.depth.saturating_sub(1);
                depth = self.depth;
                TokenKind::Close
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            c if is_word_char(c) => {
                while self.peek().is_some_and(is_word_char) {
                    self.advance();
                }
                TokenKind::Word
            }
            _ => {
                self.advance();
                TokenKind::Symbol
            }
        };
        Some(Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
            depth,
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#' || c == '@' || c == '%'
}

/// Index of the first top-level token that is `keyword`.
#[must_use]
pub fn find_keyword(sql: &str, tokens: &[Token], from: usize, keyword: &str) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, t)| t.depth == 0 && t.is_keyword(sql, keyword))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_and_quotes() {
        let sql = "select a, (select b from t) c from [my from] where x='from'";
        let tokens = Scanner::new(sql).tokens();
        let froms: Vec<usize> = tokens
            .iter()
            .filter(|t| t.is_keyword(sql, "from"))
            .map(|t| t.depth)
            .collect();
        assert_eq!(froms, vec![1, 0]);
        assert_eq!(find_keyword(sql, &tokens, 0, "where").map(|i| tokens[i].text(sql)), Some("where"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Quoted && t.text(sql) == "[my from]"));
    }

    #[test]
    fn test_comments_skipped() {
        let sql = "select /* from */ a -- from\nfrom t";
        let tokens = Scanner::new(sql).tokens();
        let idx = find_keyword(sql, &tokens, 0, "from").unwrap();
        assert_eq!(&sql[tokens[idx].span.start..], "from t");
    }
}
