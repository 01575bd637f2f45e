use crate::errors::{ParseError, ParseResult};
use crate::parser::normalize_tokens;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

impl Css3<'_> {
    /// `@import url [layer | layer(name)] [supports(condition)] [media-list];`
    pub(crate) fn parse_import_rule(&mut self, at_keyword: &Token, nested: bool) -> ParseResult<()> {
        log::trace!("parse_import_rule");

        self.check_placement(at_keyword, nested, SheetState::Imports)?;

        let uri = self.consume_url_or_string()?;

        self.consume_whitespace_comments();
        let mut layer = None;
        let t = self.tokenizer.lookahead(0);
        match &t.token_type {
            TokenType::Ident(name) if name.eq_ignore_ascii_case("layer") => {
                self.tokenizer.consume();
                layer = Some(String::new());
            }
            TokenType::Function(name) if name.eq_ignore_ascii_case("layer") => {
                self.tokenizer.consume();
                let tokens = self.consume_until_close_paren(&t)?;
                let name = normalize_tokens(&tokens);
                if name.is_empty() || !tokens.iter().all(|t| t.is_ident() || t.is_delim('.')) {
                    return Err(ParseError::syntax("Invalid layer name", t.location));
                }
                layer = Some(name);
            }
            _ => {}
        }

        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);
        if matches!(&t.token_type, TokenType::Function(name) if name.eq_ignore_ascii_case("supports")) {
            self.tokenizer.consume();
            let condition = self.parse_import_supports(&t)?;
            log::debug!("import {uri} supports {condition}");
        }

        let media = self.parse_media_query_list_inner();
        self.end_statement()?;

        self.sheet_state = SheetState::Imports;
        self.handler.import_style(&uri, &media, layer.as_deref());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::recorder::CssEvent;
    use crate::{CollectErrors, CssParser, EventRecorder};
    use test_case::test_case;

    fn imports(input: &str) -> (Vec<(String, String, Option<String>)>, CollectErrors) {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        CssParser::new()
            .parse_style_sheet_str(input, &mut events, &mut errors)
            .unwrap();

        let imports = events
            .into_events()
            .into_iter()
            .filter_map(|e| match e {
                CssEvent::ImportStyle { uri, media, layer } => Some((uri, media.to_string(), layer)),
                _ => None,
            })
            .collect();
        (imports, errors)
    }

    #[test]
    fn forms() {
        let (imports, errors) = imports(
            "@charset \"utf-8\";\n\
             @import \"a.css\";\n\
             @import url(b.css) screen, PRINT and (orientation: landscape);\n\
             @layer reset;\n\
             @import url(\"c.css\") layer(base.theme) supports(display: grid) all;\n\
             @import 'd.css' layer;",
        );
        assert!(errors.errors.is_empty(), "{:?}", errors.errors);
        assert_eq!(
            imports,
            vec![
                ("a.css".into(), "".into(), None),
                (
                    "b.css".into(),
                    "screen,print and (orientation: landscape)".into(),
                    None
                ),
                ("c.css".into(), "all".into(), Some("base.theme".into())),
                ("d.css".into(), "".into(), Some("".into())),
            ]
        );
    }

    #[test_case("p{} @import 'a.css';" ; "after rule")]
    #[test_case("@namespace x url(y); @import 'a.css';" ; "after namespace")]
    #[test_case("@media all { @import 'a.css'; }" ; "nested")]
    #[test_case("@import a.css;" ; "bare url")]
    #[test_case("@import 'a.css' layer();" ; "empty layer")]
    #[test_case("@import 'a.css' supports(not);" ; "bad supports")]
    fn rejected(input: &str) {
        let (imports, errors) = imports(input);
        assert!(imports.is_empty());
        assert_eq!(errors.errors.len(), 1);
    }
}
