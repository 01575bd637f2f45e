use crate::errors::{ParseError, ParseResult};
use crate::parser::declaration::NestedAtRules;
use crate::parser::normalize_tokens;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::TokenType;
use crate::Css3;

impl Css3<'_> {
    /// `@page [selector] { declarations and margin rules }`
    pub(crate) fn parse_page_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_page_rule");

        let mut tokens = Vec::new();
        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::LCurly => break,
                TokenType::Ident(_)
                | TokenType::Colon
                | TokenType::Comma
                | TokenType::Whitespace(_)
                | TokenType::Comment(_) => {
                    self.tokenizer.consume();
                    tokens.push(t);
                }
                _ => return Err(self.unexpected(&t, "page selector or '{'")),
            }
        }

        // pseudo pages are written without space after the colon
        for pair in tokens.windows(2) {
            if pair[0].is_colon() && !(pair[1].is_ident() && pair[0].touches(&pair[1])) {
                return Err(ParseError::syntax("Invalid page selector", pair[0].location));
            }
        }
        if tokens.last().is_some_and(|t| t.is_colon()) {
            return Err(ParseError::syntax("Invalid page selector", self.tokenizer.current().location));
        }

        let selector = normalize_tokens(&tokens);
        let selector = (!selector.is_empty()).then_some(selector);

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_page(selector.as_deref());
        self.parse_declaration_list(NestedAtRules::PageMargins, false);
        self.close_block(&open);
        self.handler.end_page(selector.as_deref());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{CollectErrors, CssParser, EventRecorder};

    #[test]
    fn margins() {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(
                "@page :first { margin: 1in; @top-left { content: 'x' } @bottom-center{ a: b } }\
                 @page toc, index:blank { c: d }",
                &mut events,
                &mut errors,
            )
            .unwrap();

        assert!(errors.errors.is_empty());
        assert_eq!(
            events.walk_to_string(),
            "[ParseStart]\n\
             [StartPage] :first\n  \
               [Property] margin: 1in\n  \
               [StartMargin] top-left\n    \
                 [Property] content: \"x\"\n  \
               [EndMargin] top-left\n  \
               [StartMargin] bottom-center\n    \
                 [Property] a: b\n  \
               [EndMargin] bottom-center\n\
             [EndPage] :first\n\
             [StartPage] toc, index:blank\n  \
               [Property] c: d\n\
             [EndPage] toc, index:blank\n\
             [EndOfStream]\n"
        );
    }

    #[test]
    fn rejected() {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(
                "@page : first { a: b } @page { @top-middle { c: d } e: f } @page .x { } p { g: h }",
                &mut events,
                &mut errors,
            )
            .unwrap();

        let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
        assert_eq!(names, vec!["e", "g"]);
        assert_eq!(errors.errors.len(), 3);
    }
}
