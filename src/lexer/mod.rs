//! Shell word lexer for error-tolerant tokenization
//!
//! Splits a command line into words following POSIX shell quoting rules,
//! keeping the raw byte span of every word so callers can re-wrap completed
//! values with the surrounding text. It only understands what is needed to
//! locate the cursor: whitespace, single and double quotes and backslash
//! escapes. Nothing is expanded or executed.
//!
//! # Design Principles
//!
//! - **Never panic** - always return a valid token list
//! - **Never reject input** - an unterminated quote is reported, not an error
//! - **Cursor at end** - the last token is the word being completed

use std::ops::Range;

/// One shell word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    /// Unquoted, unescaped value
    pub value: String,
    /// Byte range of the raw text
    pub span: Range<usize>,
    /// Quote character still open at the end of the input
    pub open_quote: Option<char>,
}

impl WordToken {
    fn empty_at(pos: usize) -> Self {
        Self {
            value: String::new(),
            span: pos..pos,
            open_quote: None,
        }
    }
}

/// Shell lexer
pub struct ShellLexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> ShellLexer<'a> {
    /// Create a new lexer from input string
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str) -> Vec<WordToken> {
        let mut lexer = ShellLexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_word() {
            tokens.push(token);
        }
        tokens
    }

    /// Tokenize for completion: the last token is always the word under the cursor
    ///
    /// Trailing whitespace outside of quotes starts a new, empty word.
    pub fn tokenize_for_completion(input: &str) -> Vec<WordToken> {
        let mut tokens = Self::tokenize(input);
        let ends_inside_word = tokens
            .last()
            .is_some_and(|last| last.span.end == input.len());
        if !ends_inside_word {
            tokens.push(WordToken::empty_at(input.len()));
        }
        tokens
    }

    fn next_word(&mut self) -> Option<WordToken> {
        self.skip_whitespace();
        if self.is_at_end() {
            return None;
        }

        let start = self.offset();
        let mut value = String::new();
        let mut open_quote = None;

        while !self.is_at_end() {
            let ch = self.current_char();
            match ch {
                c if c.is_whitespace() => break,
                '\\' => {
                    self.advance();
                    if !self.is_at_end() {
                        let escaped = self.current_char();
                        if escaped != '\n' {
                            value.push(escaped);
                        }
                        self.advance();
                    }
                }
                '\'' => {
                    self.advance();
                    if !self.scan_single_quoted(&mut value) {
                        open_quote = Some('\'');
                    }
                }
                '"' => {
                    self.advance();
                    if !self.scan_double_quoted(&mut value) {
                        open_quote = Some('"');
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Some(WordToken {
            value,
            span: start..self.offset(),
            open_quote,
        })
    }

    /// Scan up to the closing quote, returns false when the input ends first
    fn scan_single_quoted(&mut self, value: &mut String) -> bool {
        while !self.is_at_end() {
            let ch = self.current_char();
            self.advance();
            if ch == '\'' {
                return true;
            }
            value.push(ch);
        }
        false
    }

    fn scan_double_quoted(&mut self, value: &mut String) -> bool {
        while !self.is_at_end() {
            let ch = self.current_char();
            self.advance();
            match ch {
                '"' => return true,
                '\\' if !self.is_at_end() => {
                    let escaped = self.current_char();
                    match escaped {
                        '"' | '\\' | '$' | '`' => value.push(escaped),
                        '\n' => {}
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                    self.advance();
                }
                _ => value.push(ch),
            }
        }
        false
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn current_char(&self) -> char {
        self.chars[self.pos].1
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

const METACHARACTERS: &[char] = &[
    ' ', '\t', '\n', '\\', '\'', '"', '`', '$', '|', '&', ';', '(', ')', '<', '>', '*', '?', '[',
    ']', '{', '}', '#', '~', '!',
];

/// Backslash-escape whitespace and shell metacharacters
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape a value for use inside the given quote character
pub fn escape_quoted(value: &str, quote: char) -> String {
    match quote {
        '\'' => value.replace('\'', r"'\''"),
        _ => {
            let mut escaped = String::with_capacity(value.len());
            for ch in value.chars() {
                if matches!(ch, '"' | '\\' | '$' | '`') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<String> {
        ShellLexer::tokenize(input)
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(values("pos1  --bool  x"), vec!["pos1", "--bool", "x"]);
        assert!(values("   ").is_empty());
    }

    #[test]
    fn test_quotes_and_escapes() {
        assert_eq!(values(r#"'a b' "c \"d\"" e\ f"#), vec!["a b", "c \"d\"", "e f"]);
        assert_eq!(values(r#""keep \n""#), vec![r"keep \n"]);
        assert_eq!(values(r#"mixed'quo'"ted""#), vec!["mixedquoted"]);
    }

    #[test]
    fn test_spans() {
        let tokens = ShellLexer::tokenize(r#"pos1 "--bool=x""#);
        assert_eq!(tokens[0].span, 0..4);
        assert_eq!(tokens[1].span, 5..15);
        assert_eq!(tokens[1].open_quote, None);
    }

    #[test]
    fn test_unterminated_quote() {
        let tokens = ShellLexer::tokenize(r#"pos1 "--bool="#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, "--bool=");
        assert_eq!(tokens[1].open_quote, Some('"'));

        let tokens = ShellLexer::tokenize("pos1 'a b");
        assert_eq!(tokens[1].value, "a b");
        assert_eq!(tokens[1].open_quote, Some('\''));
    }

    #[test]
    fn test_completion_adds_empty_word() {
        let tokens = ShellLexer::tokenize_for_completion("pos1 ");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, "");
        assert_eq!(tokens[1].span, 5..5);

        let tokens = ShellLexer::tokenize_for_completion("");
        assert_eq!(tokens.len(), 1);

        let tokens = ShellLexer::tokenize_for_completion("pos1 --");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, "--");
    }

    #[test]
    fn test_open_quote_with_trailing_space_stays_one_word() {
        let tokens = ShellLexer::tokenize_for_completion("pos1 \"a ");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, "a ");
    }

    #[test]
    fn test_trailing_backslash_is_dropped() {
        assert_eq!(values(r"abc\"), vec!["abc"]);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a b$c"), r"a\ b\$c");
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape_quoted("it's", '\''), r"it'\''s");
        assert_eq!(escape_quoted(r#"say "hi""#, '"'), r#"say \"hi\""#);
    }
}
