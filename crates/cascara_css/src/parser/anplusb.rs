use crate::errors::{ParseError, ParseResult};
use crate::tokenizer::{Number, Token, TokenType};
use crate::Css3;

impl Css3<'_> {
    /// Parses the `An+B` micro syntax and returns `(A, B)`. Stops before `)` or `of`.
    ///
    /// The tokenizer has already glued most of the forms together: `2n-1` is a dimension with unit
    /// `n-1`, `-n-` is an identifier and `+3` a signed number. What is left is checking which
    /// token shapes may follow each other.
    pub(crate) fn parse_an_plus_b(&mut self) -> ParseResult<(i32, i32)> {
        log::trace!("parse_an_plus_b");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();

        match &t.token_type {
            TokenType::Ident(ident) if ident.eq_ignore_ascii_case("odd") => Ok((2, 1)),
            TokenType::Ident(ident) if ident.eq_ignore_ascii_case("even") => Ok((2, 0)),
            TokenType::Number(number) => Ok((0, integer(number, &t)?)),
            TokenType::Dimension { value, unit } => {
                let a = integer(value, &t)?;
                self.parse_n_suffix(a, unit, &t)
            }
            TokenType::Ident(ident) => match ident.strip_prefix('-') {
                Some(rest) => self.parse_n_suffix(-1, rest, &t),
                None => self.parse_n_suffix(1, ident, &t),
            },
            TokenType::Delim('+') => {
                let next = self.tokenizer.consume();
                match &next.token_type {
                    TokenType::Ident(ident) if t.touches(&next) && !ident.starts_with('-') => {
                        self.parse_n_suffix(1, ident, &next)
                    }
                    _ => Err(self.unexpected(&next, "'n' directly after '+'")),
                }
            }
            _ => Err(self.unexpected(&t, "An+B expression")),
        }
    }

    /// Everything from the `n` onwards: `n`, `n-`, `n-<digits>`
    fn parse_n_suffix(&mut self, a: i32, suffix: &str, t: &Token) -> ParseResult<(i32, i32)> {
        let lower = suffix.to_ascii_lowercase();
        let Some(rest) = lower.strip_prefix('n') else {
            return Err(self.unexpected(t, "An+B expression"));
        };

        match rest {
            "" => Ok((a, self.parse_b()?)),
            "-" => {
                self.consume_whitespace_comments();
                let b = self.consume_signless_integer()?;
                Ok((a, -b))
            }
            _ => match rest.strip_prefix('-') {
                Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                    let b: i32 = digits
                        .parse()
                        .map_err(|_| ParseError::syntax("Offset out of range", t.location))?;
                    Ok((a, -b))
                }
                _ => Err(self.unexpected(t, "An+B expression")),
            },
        }
    }

    /// The optional `+B`, `-B`, `+ B` or `- B` after `An`
    fn parse_b(&mut self) -> ParseResult<i32> {
        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);

        match &t.token_type {
            TokenType::RParen | TokenType::Eof => Ok(0),
            TokenType::Ident(ident) if ident.eq_ignore_ascii_case("of") => Ok(0),
            TokenType::Number(number) if number.has_sign => {
                self.tokenizer.consume();
                integer(number, &t)
            }
            TokenType::Delim(c @ ('+' | '-')) => {
                let sign = if *c == '-' { -1 } else { 1 };
                self.tokenizer.consume();
                self.consume_whitespace_comments();
                Ok(sign * self.consume_signless_integer()?)
            }
            _ => Err(self.unexpected(&t, "'+' or '-'")),
        }
    }

    fn consume_signless_integer(&mut self) -> ParseResult<i32> {
        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::Number(number) if !number.has_sign => integer(number, &t),
            _ => Err(self.unexpected(&t, "unsigned integer")),
        }
    }
}

fn integer(number: &Number, t: &Token) -> ParseResult<i32> {
    if !number.is_integer {
        return Err(ParseError::syntax(
            format!("Expected an integer, found '{t}'"),
            t.location,
        ));
    }
    Ok(number.int_value())
}
