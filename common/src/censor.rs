//! Typed parsing for stored thumbnail censor rectangles.
//!
//! The editor stores censor rectangles in `character.ini` as a
//! bracketed list such as `[(10, 20, 110, 120), (30, 40, 50, 60)]`.
//! Historically that string was evaluated as a literal; here it is
//! parsed with a strict grammar instead, and anything outside the
//! grammar is rejected with a message. Each rectangle is exactly four
//! non-negative integers; both round and square brackets are accepted
//! around a rectangle because both forms exist in saved files.

use crate::error::{CharacterError, Result};
use std::fmt;

/// An axis-aligned censor rectangle in thumbnail pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CensorRect {
    /// Left edge, inclusive.
    pub left: u32,
    /// Top edge, inclusive.
    pub top: u32,
    /// Right edge, inclusive.
    pub right: u32,
    /// Bottom edge, inclusive.
    pub bottom: u32,
}

impl CensorRect {
    /// Construct a rectangle from its four edges.
    #[must_use]
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl fmt::Display for CensorRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Parse a stored censor-rectangle list.
///
/// Accepts the exact shape the editor writes: a `[...]` list of
/// rectangles, each `(l, t, r, b)` or `[l, t, r, b]` with four
/// non-negative integers. Whitespace between tokens is ignored.
///
/// # Errors
///
/// Returns [`CharacterError::InvalidCensorRects`] for any input outside
/// that grammar, including trailing garbage, float coordinates, or a
/// wrong coordinate count.
pub fn parse_censor_rects(input: &str) -> Result<Vec<CensorRect>> {
    let mut parser = RectParser::new(input);
    parser.expect('[')?;
    let mut rects = Vec::new();
    parser.skip_whitespace();
    if parser.peek() == Some(']') {
        parser.advance();
    } else {
        loop {
            rects.push(parser.rect()?);
            parser.skip_whitespace();
            match parser.peek() {
                Some(',') => {
                    parser.advance();
                }
                Some(']') => {
                    parser.advance();
                    break;
                }
                other => return Err(parser.unexpected(other, "',' or ']'")),
            }
        }
    }
    parser.skip_whitespace();
    if let Some(trailing) = parser.peek() {
        return Err(parser.unexpected(Some(trailing), "end of input"));
    }
    Ok(rects)
}

/// Serialize rectangles back to the stored list form.
///
/// The output round-trips through [`parse_censor_rects`].
#[must_use]
pub fn format_censor_rects(rects: &[CensorRect]) -> String {
    let parts: Vec<String> = rects.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Minimal character-level parser for the rectangle list grammar.
struct RectParser<'a> {
    input: &'a str,
    chars: std::str::CharIndices<'a>,
    current: Option<(usize, char)>,
}

impl<'a> RectParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == wanted => {
                self.advance();
                Ok(())
            }
            other => Err(self.unexpected(other, &format!("'{wanted}'"))),
        }
    }

    /// Parse one `(l, t, r, b)` or `[l, t, r, b]` rectangle.
    fn rect(&mut self) -> Result<CensorRect> {
        self.skip_whitespace();
        let close = match self.peek() {
            Some('(') => ')',
            Some('[') => ']',
            other => return Err(self.unexpected(other, "'(' or '['")),
        };
        self.advance();

        let left = self.integer()?;
        self.expect(',')?;
        let top = self.integer()?;
        self.expect(',')?;
        let right = self.integer()?;
        self.expect(',')?;
        let bottom = self.integer()?;
        self.expect(close)?;

        Ok(CensorRect::new(left, top, right, bottom))
    }

    fn integer(&mut self) -> Result<u32> {
        self.skip_whitespace();
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            let found = self.peek();
            return Err(self.unexpected(found, "a non-negative integer"));
        }
        digits
            .parse()
            .map_err(|_| CharacterError::InvalidCensorRects {
                reason: format!("coordinate '{digits}' is out of range in '{}'", self.input),
            })
    }

    fn unexpected(&self, found: Option<char>, wanted: &str) -> CharacterError {
        let found = found.map_or_else(|| "end of input".to_owned(), |c| format!("'{c}'"));
        CharacterError::InvalidCensorRects {
            reason: format!("expected {wanted}, found {found} in '{}'", self.input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_empty_list() {
        assert_eq!(parse_censor_rects("[]").expect("valid"), Vec::new());
    }

    #[test]
    fn parses_tuple_rects() {
        let rects = parse_censor_rects("[(10, 20, 110, 120), (30, 40, 50, 60)]").expect("valid");
        assert_eq!(
            rects,
            vec![
                CensorRect::new(10, 20, 110, 120),
                CensorRect::new(30, 40, 50, 60),
            ]
        );
    }

    #[test]
    fn parses_square_bracket_rects() {
        let rects = parse_censor_rects("[[1,2,3,4]]").expect("valid");
        assert_eq!(rects, vec![CensorRect::new(1, 2, 3, 4)]);
    }

    #[rstest]
    #[case::bare_word("__import__('os')")]
    #[case::float_coords("[(1.5, 2, 3, 4)]")]
    #[case::negative("[(-1, 2, 3, 4)]")]
    #[case::three_coords("[(1, 2, 3)]")]
    #[case::five_coords("[(1, 2, 3, 4, 5)]")]
    #[case::trailing_garbage("[(1, 2, 3, 4)] extra")]
    #[case::unterminated("[(1, 2, 3, 4")]
    #[case::mismatched_brackets("[(1, 2, 3, 4]]")]
    #[case::not_a_list("(1, 2, 3, 4)")]
    fn rejects_malformed_input(#[case] input: &str) {
        let err = parse_censor_rects(input).expect_err("input should be rejected");
        assert!(matches!(err, CharacterError::InvalidCensorRects { .. }));
    }

    #[test]
    fn format_round_trips() {
        let rects = vec![CensorRect::new(10, 20, 110, 120), CensorRect::new(0, 0, 5, 5)];
        let text = format_censor_rects(&rects);
        assert_eq!(text, "[(10, 20, 110, 120), (0, 0, 5, 5)]");
        assert_eq!(parse_censor_rects(&text).expect("round trip"), rects);
    }
}
