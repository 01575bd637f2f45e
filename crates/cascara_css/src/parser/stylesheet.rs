use crate::errors::{ErrorKind, ParseError};
use crate::handler::Locator;
use crate::parser::declaration::NestedAtRules;
use crate::parser::recovery::Recovery;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

/// Which of the rules that have to come first are still allowed
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SheetState {
    /// Nothing but comments and whitespace so far, `@charset` is allowed
    Start,
    /// After `@charset` or `@import`
    Imports,
    /// After `@namespace`
    Namespaces,
    /// After any other rule
    Body,
}

impl Css3<'_> {
    /// Parses a complete style sheet
    pub(crate) fn parse_stylesheet_internal(&mut self) {
        log::trace!("parse_stylesheet_internal");

        let locator = Locator::from(self.tokenizer.current_location());
        self.handler.parse_start(&locator);

        self.parse_rule_list(false);

        self.handler.end_of_stream();
    }

    /// Parses rules until the end of the input or, when nested, until the `}` that closes the
    /// enclosing block. That `}` is not consumed.
    pub(crate) fn parse_rule_list(&mut self, nested: bool) {
        log::trace!("parse_rule_list");

        let mut preceded_by_line_feed = false;

        loop {
            let t = self.tokenizer.lookahead(0);
            match &t.token_type {
                TokenType::Eof => break,
                TokenType::RCurly if nested => break,
                TokenType::RCurly => {
                    self.tokenizer.consume();
                    self.report_error(ParseError::syntax("Unexpected '}'", t.location));
                }
                TokenType::Whitespace(ws) => {
                    self.tokenizer.consume();
                    preceded_by_line_feed = ws.contains('\n');
                    continue;
                }
                TokenType::Comment(text) => {
                    self.tokenizer.consume();
                    self.handler.comment(text, preceded_by_line_feed);
                }
                TokenType::BadComment(_) => {
                    self.tokenizer.consume();
                    self.report_error(self.unexpected(&t, "comment"));
                }
                TokenType::Cdo | TokenType::Cdc => {
                    self.tokenizer.consume();
                }
                TokenType::AtKeyword(_) => {
                    self.tokenizer.consume();
                    self.parse_at_rule(&t, nested);
                }
                _ => self.parse_style_rule(),
            }

            preceded_by_line_feed = false;
        }
    }

    /// Parses a qualified rule. A rule whose selector fails is dropped as a whole.
    fn parse_style_rule(&mut self) {
        log::trace!("parse_style_rule");

        let mark = self.tokenizer.tell();
        let locator = Locator::from(self.tokenizer.current_location());
        self.sheet_state = SheetState::Body;

        let selectors = self.parse_selector_list(false).and_then(|list| {
            self.consume_whitespace_comments();
            self.consume(TokenType::LCurly).map(|open| (list, open))
        });

        let (selectors, open) = match selectors {
            Ok(parsed) => parsed,
            Err(err) => {
                self.report_error(err);
                self.tokenizer.seek(mark);
                self.recover(Recovery::Rule);
                return;
            }
        };

        self.handler.start_selector(&selectors, &locator);
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_selector(&selectors);
    }

    /// Consumes the `}` of a block. A block left open at the end of the input is closed
    /// implicitly, with one warning for the whole sheet.
    pub(crate) fn close_block(&mut self, open: &Token) {
        let t = self.tokenizer.lookahead(0);
        match t.token_type {
            TokenType::RCurly => {
                self.tokenizer.consume();
            }
            TokenType::Eof if !self.eof_reported => {
                self.eof_reported = true;
                self.report_warning(
                    ErrorKind::Syntax,
                    format!("Unexpected end of input, block opened at {} is not closed", open.location),
                    t.location,
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use crate::recorder::CssEvent;
    use crate::{CollectErrors, CssParser, EventRecorder};

    fn parse(input: &str) -> (EventRecorder, CollectErrors) {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(input, &mut events, &mut errors)
            .unwrap();
        (events, errors)
    }

    #[test]
    fn brace_recovery() {
        let (events, errors) = parse(
            "input:not(){}body:not(.foo)[id*=substring] .header {margin-left:0;margin-right:auto;}",
        );

        let selectors = events.selectors();
        assert_eq!(selectors.len(), 1);
        assert_eq!(
            selectors[0].to_string(),
            "body:not(.foo)[id*=\"substring\"] .header"
        );
        assert_eq!(events.properties().len(), 2);

        assert_eq!(errors.errors.len(), 1);
        assert_eq!((errors.errors[0].line, errors.errors[0].column), (1, 11));
    }

    #[test]
    fn bad_rules_leave_siblings_alone() {
        let (events, errors) = parse("a{x:1} b c > {y:2} d{z:3} e{{}} f{w:4}");
        let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
        assert_eq!(names, vec!["x", "z", "w"]);
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn comments_between_rules() {
        let (events, _) = parse("/* a */ p{}\n/* b */");
        let comments: Vec<(&str, bool)> = events
            .events()
            .iter()
            .filter_map(|e| match e {
                CssEvent::Comment {
                    text,
                    preceded_by_line_feed,
                } => Some((text.as_str(), *preceded_by_line_feed)),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec![(" a ", false), (" b ", true)]);
    }

    #[test]
    fn unclosed_blocks_are_closed_at_eof() {
        let (events, errors) = parse("@media screen { p { color: red");
        let evs = events.events();
        assert!(matches!(evs[evs.len() - 3], CssEvent::EndSelector { .. }));
        assert!(matches!(evs[evs.len() - 2], CssEvent::EndMedia { .. }));
        assert!(matches!(evs[evs.len() - 1], CssEvent::EndOfStream));
        assert!(errors.errors.is_empty());
        assert_eq!(errors.warnings.len(), 1);
    }

    #[test]
    fn cdo_cdc_are_skipped() {
        let (events, errors) = parse("<!-- p{a:b} -->");
        assert_eq!(events.properties().len(), 1);
        assert!(errors.errors.is_empty());
    }

    #[test]
    fn stray_close_brace() {
        let (events, errors) = parse("} p{a:b}");
        assert_eq!(events.properties().len(), 1);
        assert_eq!(errors.errors.len(), 1);
    }
}
