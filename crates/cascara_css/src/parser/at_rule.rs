use crate::errors::{ParseError, ParseResult};
use crate::parser::recovery::Recovery;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

mod charset;
mod counter_style;
mod font_face;
mod font_feature_values;
mod import;
mod keyframes;
mod media;
mod namespace;
mod page;
mod property;
mod supports;
mod viewport;

impl Css3<'_> {
    /// Dispatches an at-rule whose at-keyword has been consumed. A rule that fails is skipped
    /// up to its `;` or the end of its block.
    pub(crate) fn parse_at_rule(&mut self, at_keyword: &Token, nested: bool) {
        log::trace!("parse_at_rule");

        let TokenType::AtKeyword(name) = &at_keyword.token_type else {
            return;
        };

        let mark = self.tokenizer.tell();
        let lower = name.to_ascii_lowercase();

        let result = match lower.as_str() {
            "charset" => self.parse_charset_rule(at_keyword, nested),
            "import" => self.parse_import_rule(at_keyword, nested),
            "namespace" => self.parse_namespace_rule(at_keyword, nested),
            "media" => self.parse_media_rule(),
            "page" => self.parse_page_rule(),
            "font-face" => self.parse_font_face_rule(),
            "keyframes" | "-webkit-keyframes" | "-moz-keyframes" | "-o-keyframes" => {
                self.parse_keyframes_rule()
            }
            "supports" => self.parse_supports_rule(),
            "counter-style" => self.parse_counter_style_rule(),
            "font-feature-values" => self.parse_font_feature_values_rule(),
            "viewport" | "-ms-viewport" => self.parse_viewport_rule(),
            "property" => self.parse_property_rule(at_keyword),
            _ => {
                self.parse_unknown_at_rule(at_keyword, &lower);
                Ok(())
            }
        };

        if let Err(err) = result {
            self.report_error(err);
            self.tokenizer.seek(mark);
            self.recover(Recovery::AtRule);
        }
    }

    /// Reports an at-rule without dedicated events as its source text. Layer statements may
    /// appear between imports, so they leave the sheet state alone.
    fn parse_unknown_at_rule(&mut self, at_keyword: &Token, name: &str) {
        self.recover(Recovery::AtRule);

        let last = self.tokenizer.current();
        let statement = matches!(last.token_type, TokenType::Semicolon);
        if !(name == "layer" && statement) {
            self.sheet_state = SheetState::Body;
        }

        let text = self.raw_text(at_keyword, &last);
        self.handler.ignorable_at_rule(text.trim_end());
    }

    /// Consumes the `{` that starts the block of an at-rule
    pub(crate) fn open_block(&mut self) -> ParseResult<Token> {
        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::LCurly => Ok(t),
            _ => Err(self.unexpected(&t, "'{'")),
        }
    }

    /// `url(...)`, `url("...")` or a plain string
    pub(crate) fn consume_url_or_string(&mut self) -> ParseResult<String> {
        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Url(url) | TokenType::QuotedString(url) => Ok(url),
            TokenType::Function(name) if name.eq_ignore_ascii_case("url") => {
                self.consume_whitespace_comments();
                let s = self.tokenizer.consume();
                let TokenType::QuotedString(url) = s.token_type else {
                    return Err(self.unexpected(&s, "string"));
                };
                self.consume_whitespace_comments();
                self.consume(TokenType::RParen)?;
                Ok(url)
            }
            _ => Err(self.unexpected(&t, "url or string")),
        }
    }

    /// The `;` that ends a statement at-rule, or the end of the input
    pub(crate) fn end_statement(&mut self) -> ParseResult<()> {
        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);
        match t.token_type {
            TokenType::Semicolon => {
                self.tokenizer.consume();
                Ok(())
            }
            TokenType::Eof => Ok(()),
            _ => Err(self.unexpected(&t, "';'")),
        }
    }

    /// Rules that may only appear at the top of a sheet
    pub(crate) fn check_placement(
        &self,
        at_keyword: &Token,
        nested: bool,
        latest: SheetState,
    ) -> ParseResult<()> {
        if nested {
            return Err(ParseError::syntax(
                format!("'{at_keyword}' is not allowed inside a block"),
                at_keyword.location,
            ));
        }
        if self.sheet_state > latest {
            return Err(ParseError::syntax(
                format!("'{at_keyword}' must come before other rules"),
                at_keyword.location,
            ));
        }
        Ok(())
    }
}
