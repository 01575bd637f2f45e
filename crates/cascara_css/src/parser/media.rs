use crate::errors::{ParseError, ParseResult};
use crate::media::{MediaQualifier, MediaQuery, MediaQueryList};
use crate::parser::normalize_tokens;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

/// Words that can never be a media type
const RESERVED_MEDIA_TYPES: [&str; 4] = ["and", "or", "not", "only"];

impl Token {
    /// Ends a media query list: the block or statement it belongs to starts or ends here
    fn ends_media_list(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::LCurly | TokenType::RCurly | TokenType::Semicolon | TokenType::Eof
        )
    }
}

impl Css3<'_> {
    /// Parses a standalone media query list. Trailing content invalidates the last query.
    pub(crate) fn parse_media_query_list_internal(&mut self) -> MediaQueryList {
        log::trace!("parse_media_query_list_internal");

        let mut list = self.parse_media_query_list_inner();

        let t = self.tokenizer.lookahead_sc(0);
        if !t.is_eof() {
            self.report_error(self.unexpected(&t, "',' or end of media query list"));
            match list.queries.last_mut() {
                Some(query) => *query = MediaQuery::not_all(),
                None => list.queries.push(MediaQuery::not_all()),
            }
        }

        list
    }

    /// Parses the media query list in front of a block or at the end of a statement. Invalid
    /// queries are reported and replaced by `not all`; the list itself never fails.
    pub(crate) fn parse_media_query_list_inner(&mut self) -> MediaQueryList {
        log::trace!("parse_media_query_list_inner");

        let mut list = MediaQueryList::default();

        self.consume_whitespace_comments();
        if self.tokenizer.lookahead(0).ends_media_list() {
            return list;
        }

        loop {
            let mark = self.tokenizer.tell();
            match self.parse_media_query() {
                Ok(query) => list.queries.push(query),
                Err(err) => {
                    self.report_error(err);
                    self.tokenizer.seek(mark);
                    self.skip_media_query();
                    list.queries.push(MediaQuery::not_all());
                }
            }

            self.consume_whitespace_comments();
            if !self.tokenizer.lookahead(0).is_comma() {
                break;
            }
            self.tokenizer.consume();
        }

        list
    }

    /// `[not | only]? <type> [and <condition>]?` or a bare condition
    fn parse_media_query(&mut self) -> ParseResult<MediaQuery> {
        log::trace!("parse_media_query");

        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);
        let starts_condition = matches!(t.token_type, TokenType::LParen)
            || (t.is_ident_ci("not")
                && matches!(self.tokenizer.lookahead_sc(1).token_type, TokenType::LParen));
        if starts_condition {
            let condition = self.parse_media_condition(true)?;
            return Ok(MediaQuery {
                qualifier: None,
                media_type: None,
                condition: Some(condition),
            });
        }

        let mut t = self.tokenizer.consume();
        let mut qualifier = None;
        if self.tokenizer.lookahead_sc(0).is_ident() {
            if t.is_ident_ci("not") {
                qualifier = Some(MediaQualifier::Not);
            } else if t.is_ident_ci("only") {
                qualifier = Some(MediaQualifier::Only);
            }
            if qualifier.is_some() {
                self.consume_whitespace_comments();
                t = self.tokenizer.consume();
            }
        }

        let TokenType::Ident(name) = &t.token_type else {
            return Err(self.unexpected(&t, "media type or '('"));
        };
        let media_type = name.to_ascii_lowercase();
        if RESERVED_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(ParseError::syntax(
                format!("'{name}' is not a valid media type"),
                t.location,
            ));
        }

        self.consume_whitespace_comments();
        let mut condition = None;
        if self.tokenizer.lookahead(0).is_ident_ci("and") {
            self.tokenizer.consume();
            condition = Some(self.parse_media_condition(false)?);
        }

        let t = self.tokenizer.lookahead_sc(0);
        if !t.is_comma() && !t.ends_media_list() {
            return Err(self.unexpected(&t, "'and', ',' or end of media query"));
        }

        Ok(MediaQuery {
            qualifier,
            media_type: Some(media_type),
            condition,
        })
    }

    /// Collects a media condition up to the next top-level `,` or the end of the list. Only
    /// parenthesized groups and functions joined by one kind of operator are accepted; the text
    /// inside them is kept as is.
    fn parse_media_condition(&mut self, allow_or: bool) -> ParseResult<String> {
        log::trace!("parse_media_condition");

        self.consume_whitespace_comments();

        let mut tokens: Vec<Token> = Vec::new();
        let mut operator: Option<String> = None;
        let mut negated = false;
        let mut expect_operand = true;

        loop {
            let t = self.tokenizer.lookahead(0);
            if t.is_comma() || t.ends_media_list() {
                if expect_operand {
                    return Err(self.unexpected(&t, "'('"));
                }
                break;
            }

            match &t.token_type {
                TokenType::Whitespace(_) | TokenType::Comment(_) => {
                    self.tokenizer.consume();
                    tokens.push(t);
                }
                TokenType::LParen | TokenType::Function(_) if expect_operand => {
                    if let TokenType::Function(name) = &t.token_type {
                        if RESERVED_MEDIA_TYPES.iter().any(|k| name.eq_ignore_ascii_case(k)) {
                            return Err(ParseError::syntax(
                                format!("Expected whitespace after '{name}'"),
                                t.location,
                            ));
                        }
                    }

                    self.tokenizer.consume();
                    let inner = self.consume_until_close_paren(&t)?;
                    if matches!(t.token_type, TokenType::LParen)
                        && inner.iter().all(|i| i.is_whitespace() || i.is_comment())
                    {
                        return Err(ParseError::syntax("Empty media feature", t.location));
                    }

                    tokens.push(t);
                    tokens.extend(inner);
                    tokens.push(self.tokenizer.current());
                    expect_operand = false;
                }
                TokenType::Ident(word) if expect_operand && tokens.is_empty() && word.eq_ignore_ascii_case("not") => {
                    self.tokenizer.consume();
                    tokens.push(keyword(&t, "not"));
                    negated = true;
                }
                TokenType::Ident(word) if !expect_operand => {
                    let word = word.to_ascii_lowercase();
                    if word != "and" && word != "or" {
                        return Err(self.unexpected(&t, "'and' or 'or'"));
                    }
                    if negated {
                        return Err(ParseError::syntax(
                            format!("'{word}' cannot follow a negated condition without parentheses"),
                            t.location,
                        ));
                    }
                    if word == "or" && !allow_or {
                        return Err(ParseError::syntax(
                            "'or' is not allowed after a media type",
                            t.location,
                        ));
                    }
                    if operator.as_ref().is_some_and(|op| *op != word) {
                        return Err(ParseError::syntax(
                            "'and' and 'or' cannot be mixed without parentheses",
                            t.location,
                        ));
                    }
                    if !tokens.last().is_some_and(|l| l.is_whitespace() || l.is_comment()) {
                        return Err(ParseError::syntax(
                            format!("Expected whitespace before '{word}'"),
                            t.location,
                        ));
                    }

                    self.tokenizer.consume();
                    tokens.push(keyword(&t, &word));
                    operator = Some(word);
                    expect_operand = true;
                }
                _ if expect_operand => return Err(self.unexpected(&t, "'('")),
                _ => return Err(self.unexpected(&t, "'and', 'or' or ','")),
            }
        }

        Ok(normalize_tokens(&tokens))
    }

    /// Skips the rest of an invalid query, stopping before its `,` or the end of the list
    fn skip_media_query(&mut self) {
        let mut depth = 0usize;

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof => return,
                TokenType::Comma | TokenType::LCurly | TokenType::RCurly | TokenType::Semicolon
                    if depth == 0 =>
                {
                    return
                }
                TokenType::LParen | TokenType::LBracket | TokenType::Function(_) => depth += 1,
                TokenType::RParen | TokenType::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.tokenizer.consume();
        }
    }
}

/// An operator keyword in its lower-case form, at the position of the original token
fn keyword(t: &Token, word: &str) -> Token {
    Token {
        token_type: TokenType::Ident(word.to_string()),
        ..t.clone()
    }
}

#[cfg(test)]
mod test {
    use crate::media::{MediaQualifier, MediaQuery};
    use crate::{CollectErrors, CssParser};
    use test_case::test_case;

    #[test]
    fn query_parts() {
        let mut errors = CollectErrors::new();
        let list = CssParser::new()
            .parse_media_query_list("ONLY Screen and (min-width: 100px), not print", &mut errors);

        assert!(errors.errors.is_empty());
        assert_eq!(
            list.queries,
            vec![
                MediaQuery {
                    qualifier: Some(MediaQualifier::Only),
                    media_type: Some("screen".into()),
                    condition: Some("(min-width: 100px)".into()),
                },
                MediaQuery {
                    qualifier: Some(MediaQualifier::Not),
                    media_type: Some("print".into()),
                    condition: None,
                },
            ]
        );
    }

    #[test_case("", "" ; "empty")]
    #[test_case("screen, PRINT and (orientation: landscape)", "screen,print and (orientation: landscape)")]
    #[test_case("(min-width: 1px) AND (max-width: 2px)", "(min-width: 1px) and (max-width: 2px)")]
    #[test_case("(a) or (b) or (c)", "(a) or (b) or (c)")]
    #[test_case("not (color)", "not (color)")]
    #[test_case("not  screen", "not screen")]
    #[test_case("screen and ((a) or (b))", "screen and ((a) or (b))")]
    #[test_case("all /* c */ and (hover)", "all and (hover)")]
    #[test_case("print and foo(x)", "print and foo(x)")]
    fn serialized(input: &str, expected: &str) {
        let mut errors = CollectErrors::new();
        let list = CssParser::new().parse_media_query_list(input, &mut errors);
        assert!(errors.errors.is_empty(), "{:?}", errors.errors);
        assert_eq!(list.to_string(), expected);
    }

    #[test_case("screen and", "not all" ; "dangling and")]
    #[test_case("and", "not all" ; "reserved type")]
    #[test_case("only", "not all" ; "bare qualifier")]
    #[test_case("screen print", "not all" ; "two types")]
    #[test_case("(a) and (b) or (c)", "not all" ; "mixed operators")]
    #[test_case("screen and (a) or (b)", "not all" ; "or after type")]
    #[test_case("not (a) and (b)", "not all" ; "negation with and")]
    #[test_case("()", "not all" ; "empty feature")]
    #[test_case("(a)and (b)", "not all" ; "no space before and")]
    #[test_case("not(color)", "not all" ; "not function")]
    #[test_case("screen,,print", "screen,not all,print" ; "empty query")]
    #[test_case("print, @x y, screen", "print,not all,screen" ; "at keyword")]
    #[test_case("print, (a) x (b), screen", "print,not all,screen" ; "junk between features")]
    #[test_case("screen, print {", "screen,not all" ; "trailing block")]
    fn invalid_queries_become_not_all(input: &str, expected: &str) {
        let mut errors = CollectErrors::new();
        let list = CssParser::new().parse_media_query_list(input, &mut errors);
        assert_eq!(errors.errors.len(), 1, "{:?}", errors.errors);
        assert_eq!(list.to_string(), expected);
    }

    #[test]
    fn all_media() {
        let parser = CssParser::new();
        let mut errors = CollectErrors::new();
        assert!(parser.parse_media_query_list("", &mut errors).is_all_media());
        assert!(parser.parse_media_query_list("print, all", &mut errors).is_all_media());
        assert!(!parser.parse_media_query_list("not all", &mut errors).is_all_media());
        assert!(errors.errors.is_empty());
    }
}
