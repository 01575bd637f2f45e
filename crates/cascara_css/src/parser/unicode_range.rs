use crate::errors::{ParseError, ParseResult};
use crate::tokenizer::{Token, TokenType};
use crate::values::{Chain, LexicalType, UnitArena, UnitNode};
use crate::Css3;

const MAX_CODE_POINT: u32 = 0x10FFFF;

impl Css3<'_> {
    /// True when the `u` ident that was just consumed is directly followed by a `+`
    pub(crate) fn starts_unicode_range(&mut self, u: &Token) -> bool {
        let next = self.tokenizer.lookahead(0);
        u.touches(&next) && self.tokenizer.slice(next.start, next.start + 1) == "+"
    }

    /// Parses `U+hex`, `U+hex-hex` or `U+hex??`. The tokenizer splits these up in several ways
    /// (`+4??` is a number and two delims, `+a5` a delim and an ident), so the source text is
    /// scanned again and the tokens it covers are skipped.
    pub(crate) fn parse_unicode_range(
        &mut self,
        arena: &mut UnitArena,
        u: &Token,
    ) -> ParseResult<UnitNode> {
        log::trace!("parse_unicode_range");

        let mut run_end = u.end;
        let mut i = 0;
        loop {
            let t = self.tokenizer.lookahead(i);
            let ends_run = t.start != run_end
                || matches!(
                    t.token_type,
                    TokenType::Eof
                        | TokenType::Whitespace(_)
                        | TokenType::Comment(_)
                        | TokenType::Comma
                        | TokenType::Semicolon
                        | TokenType::RCurly
                        | TokenType::RParen
                        | TokenType::Delim('!')
                );
            if ends_run {
                break;
            }
            run_end = t.end;
            i += 1;
        }

        let raw: Vec<char> = self.tokenizer.slice(u.start, run_end).chars().collect();

        // skip "u+"
        let mut pos = 2;
        let start = take_while(&raw, &mut pos, |c| c.is_ascii_hexdigit() || c == '?');
        let wildcard = start.contains('?');

        if start.is_empty() || start.len() > 6 {
            return Err(ParseError::syntax("Invalid unicode range", u.location));
        }
        if start.trim_end_matches('?').contains('?') {
            return Err(ParseError::syntax(
                "Digits are not allowed after '?' in a unicode range",
                u.location,
            ));
        }

        let mut end = None;
        if raw.get(pos) == Some(&'-') {
            if wildcard {
                return Err(ParseError::syntax(
                    "A unicode range with wildcards cannot have an end",
                    u.location,
                ));
            }
            pos += 1;
            let digits = take_while(&raw, &mut pos, |c| c.is_ascii_hexdigit());
            if digits.is_empty() || digits.len() > 6 {
                return Err(ParseError::syntax("Invalid unicode range end", u.location));
            }
            end = Some(digits);
        }

        let range_end = u.start + pos;
        loop {
            let t = self.tokenizer.lookahead(0);
            if t.is_eof() || t.start >= range_end {
                break;
            }
            if t.end > range_end {
                return Err(ParseError::syntax("Invalid unicode range", t.location));
            }
            self.tokenizer.consume();
        }

        let mut bounds = Chain::default();
        if wildcard {
            bounds.append(
                arena,
                UnitNode::with_string(LexicalType::UnicodeWildcard, start),
            );
        } else {
            let first = code_point(&start).ok_or_else(|| {
                ParseError::syntax("Unicode range out of bounds", u.location)
            })?;
            bounds.append(arena, UnitNode::integer(first as i32));

            if let Some(end) = end {
                let last = code_point(&end)
                    .filter(|last| *last >= first)
                    .ok_or_else(|| ParseError::syntax("Invalid unicode range end", u.location))?;
                bounds.append(arena, UnitNode::integer(last as i32));
            }
        }

        let mut node = UnitNode::new(LexicalType::UnicodeRange);
        node.parameters = bounds.head;
        Ok(node)
    }
}

fn take_while(raw: &[char], pos: &mut usize, accept: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(c) = raw.get(*pos).copied().filter(|c| accept(*c)) {
        out.push(c);
        *pos += 1;
        if out.len() > 6 {
            break;
        }
    }
    out
}

fn code_point(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|cp| *cp <= MAX_CODE_POINT)
}

#[cfg(test)]
mod test {
    use crate::values::LexicalType;
    use crate::CssParser;
    use test_case::test_case;

    #[test]
    fn range_bounds() {
        let value = CssParser::new().parse_property_value("U+0025-00FF").unwrap();
        let head = value.head();
        assert_eq!(head.lexical_type(), LexicalType::UnicodeRange);

        let bounds: Vec<i32> = head.sub_values().unwrap().iter().map(|u| u.integer_value()).collect();
        assert_eq!(bounds, vec![37, 255]);
        assert_eq!(value.to_string(), "U+25-ff");
    }

    #[test_case("u+a5", "U+a5")]
    #[test_case("U+4??", "U+4??")]
    #[test_case("U+??????", "U+??????")]
    #[test_case("U+0-7F, U+1e3", "U+0-7f, U+1e3")]
    #[test_case("U+10FFFF", "U+10ffff")]
    fn serialized(input: &str, expected: &str) {
        let value = CssParser::new().parse_property_value(input).unwrap();
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn wildcard_unit() {
        let value = CssParser::new().parse_property_value("U+4??").unwrap();
        let sub = value.head().sub_values().unwrap();
        assert_eq!(sub.lexical_type(), LexicalType::UnicodeWildcard);
        assert_eq!(sub.string_value(), Some("4??"));
    }

    #[test_case("U+???????" ; "seven wildcards")]
    #[test_case("U+1234567" ; "seven digits")]
    #[test_case("U+4?5" ; "digit after wildcard")]
    #[test_case("U+4??-50" ; "wildcard with end")]
    #[test_case("U+50-40" ; "end before start")]
    #[test_case("U+110000" ; "out of range")]
    #[test_case("U+0025-00FFxyz" ; "trailing garbage")]
    fn rejected(input: &str) {
        assert!(CssParser::new().parse_property_value(input).is_err());
    }
}
