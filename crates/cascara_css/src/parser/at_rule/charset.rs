use crate::errors::ParseResult;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

impl Css3<'_> {
    /// `@charset "name";`. Only valid as the very first rule; the stream has already been
    /// decoded by the time the rule is seen, so it is only checked.
    pub(crate) fn parse_charset_rule(&mut self, at_keyword: &Token, nested: bool) -> ParseResult<()> {
        log::trace!("parse_charset_rule");

        self.check_placement(at_keyword, nested, SheetState::Start)?;

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let TokenType::QuotedString(encoding) = t.token_type else {
            return Err(self.unexpected(&t, "encoding name"));
        };
        self.end_statement()?;

        log::debug!("charset rule: {encoding}");
        self.sheet_state = SheetState::Imports;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{CollectErrors, CssParser, EventRecorder};
    use test_case::test_case;

    #[test_case("@charset \"utf-8\"; p{a:b}", 0 ; "first")]
    #[test_case("/* c */ @charset \"utf-8\"; p{a:b}", 0 ; "after comment")]
    #[test_case("p{a:b} @charset \"utf-8\";", 1 ; "after rule")]
    #[test_case("@charset \"utf-8\"; @charset \"utf-8\"; p{a:b}", 1 ; "twice")]
    #[test_case("@charset utf-8; p{a:b}", 1 ; "unquoted")]
    #[test_case("@media all { @charset \"utf-8\"; } p{a:b}", 1 ; "nested")]
    fn placement(input: &str, expected_errors: usize) {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(input, &mut events, &mut errors)
            .unwrap();

        assert_eq!(errors.errors.len(), expected_errors);
        assert_eq!(events.properties().len(), 1);
    }
}
