//! Low-level byte-by-byte cursor over a single Newick string.
//!
//! This module provides [ByteParser] for reading Newick text with support for
//! peeking, consuming, skipping whitespace and `[...]` comments, and
//! quote-aware label reading. It is the foundation of the
//! [NewickParser](crate::newick::NewickParser).

use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte cursor over an in-memory ASCII-compatible string.
///
/// Labels may contain arbitrary UTF-8; they are sliced out of the input as
/// whole byte ranges so multi-byte characters survive untouched. All
/// structural characters of Newick (`(`, `)`, `,`, `:`, `;`, `[`, `]`, `'`)
/// are ASCII, so scanning byte-wise is safe.
///
/// # Example
/// ```
/// use cladekit::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [a comment] (A:1,B:2);");
/// parser.skip_comment_and_whitespace().unwrap();
/// assert_eq!(parser.peek(), Some(b'('));
/// ```
pub struct ByteParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> ByteParser<'a> {
    /// Creates a new [ByteParser] reading the given string.
    pub fn for_str(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Checks if the current byte is exactly `ch`.
    #[inline]
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Consumes the current byte if it is exactly `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a `[...]` comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.peek_is(b'[') {
            return Ok(false);
        }

        let start = self.pos;
        while let Some(b) = self.next_byte() {
            if b == b']' {
                return Ok(true);
            }
        }

        self.pos = start;
        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips (consumes) all consecutive whitespace and `[...]` comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let end = (self.pos + k).min(self.input.len());
        let start = self.pos.min(end);
        String::from_utf8_lossy(&self.input[start..end]).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Leading comments and whitespace are skipped. Unquoted labels are
    /// trimmed of surrounding whitespace; quoted labels are returned verbatim
    /// without their enclosing quotes.
    ///
    /// # Errors
    /// Returns an error if a quoted label is never closed or a comment inside
    /// the leading whitespace is never closed.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek_is(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label(delimiters))
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// Returns an error if the quoted label is not properly closed.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let opening = self.pos;
        self.pos += 1;

        let mut label: Vec<u8> = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.peek_is(b'\'') {
                        label.push(b'\'');
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Some(b) => label.push(b),
                None => {
                    self.pos = opening;
                    return Err(ParsingError::unclosed_quote(self));
                }
            }
        }

        Ok(String::from_utf8_lossy(&label).into_owned())
    }

    /// Parses an unquoted label until any of the given delimiters (or EOF) is
    /// encountered, returning it trimmed.
    ///
    /// Inner whitespace is kept (`Fork tailed` stays one label); leading and
    /// trailing whitespace never belongs to an unquoted label.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.pos += 1;
        }

        String::from_utf8_lossy(&self.input[start..self.pos])
            .trim()
            .to_string()
    }

    /// Reads the maximal run of characters that may occur in a numeral:
    /// digits, `.`, `-`, `+`, `e`, `E`.
    ///
    /// The token is returned as text and not validated here.
    pub fn parse_numeral_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }

        // Only ASCII was consumed, so the slice is valid UTF-8
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_comment_and_whitespace() {
        let mut parser = ByteParser::for_str("[Go] \n[Keep going]   \t \n  END");
        parser.skip_comment_and_whitespace().unwrap();
        assert_eq!(parser.next_byte(), Some(b'E'));
    }

    #[test]
    fn test_unclosed_comment_is_error() {
        let mut parser = ByteParser::for_str("  [never closed");
        assert!(parser.skip_comment_and_whitespace().is_err());
    }

    #[test]
    fn test_quoted_label_with_escape() {
        let mut parser = ByteParser::for_str("'Baillon''s crake':1");
        let label = parser.parse_label(b"(),:;[").unwrap();
        assert_eq!(label, "Baillon's crake");
        assert_eq!(parser.peek(), Some(b':'));
    }

    #[test]
    fn test_unclosed_quote_is_error() {
        let mut parser = ByteParser::for_str("'Pukeko:1,B");
        assert!(parser.parse_label(b"(),:;[").is_err());
    }

    #[test]
    fn test_unquoted_label_is_trimmed_and_keeps_utf8() {
        let mut parser = ByteParser::for_str("  Kākāpō  ,B");
        let label = parser.parse_label(b"(),:;[").unwrap();
        assert_eq!(label, "Kākāpō");
        assert_eq!(parser.peek(), Some(b','));
    }

    #[test]
    fn test_numeral_token() {
        let mut parser = ByteParser::for_str("1.23e-5,");
        assert_eq!(parser.parse_numeral_token(), "1.23e-5");
        assert_eq!(parser.position(), 7);
    }

    #[test]
    fn test_context() {
        let parser = ByteParser::for_str("(A,B);");
        assert_eq!(parser.get_context_as_string(3), "(A,");
        assert_eq!(parser.get_context_as_string(50), "(A,B);");
    }
}
