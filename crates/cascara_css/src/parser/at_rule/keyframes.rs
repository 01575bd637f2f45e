use crate::errors::{ParseError, ParseResult};
use crate::parser::declaration::NestedAtRules;
use crate::parser::recovery::Recovery;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::TokenType;
use crate::values::{Chain, LexicalType, LexicalValue, UnitArena, UnitNode};
use crate::Css3;

impl Css3<'_> {
    /// `@keyframes name { keyframe blocks }`, including the vendor prefixed forms
    pub(crate) fn parse_keyframes_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_keyframes_rule");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let name = match t.token_type {
            TokenType::Ident(name)
                if !matches!(
                    name.to_ascii_lowercase().as_str(),
                    "none" | "initial" | "inherit" | "unset" | "revert" | "default"
                ) =>
            {
                name
            }
            TokenType::QuotedString(name) => name,
            _ => return Err(self.unexpected(&t, "keyframes name")),
        };

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_keyframes(&name);
        self.parse_keyframe_blocks();
        self.close_block(&open);
        self.handler.end_keyframes(&name);

        Ok(())
    }

    fn parse_keyframe_blocks(&mut self) {
        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof | TokenType::RCurly => break,
                TokenType::Whitespace(_) | TokenType::Comment(_) | TokenType::Semicolon => {
                    self.tokenizer.consume();
                    continue;
                }
                _ => {}
            }

            let mark = self.tokenizer.tell();
            let keys = match self.parse_keyframe_selector() {
                Ok(keys) => keys,
                Err(err) => {
                    self.report_error(err);
                    self.tokenizer.seek(mark);
                    self.recover(Recovery::Rule);
                    continue;
                }
            };
            let open = self.tokenizer.current();

            self.handler.start_keyframe(&keys);
            self.parse_declaration_list(NestedAtRules::None, false);
            self.close_block(&open);
            self.handler.end_keyframe(&keys);
        }
    }

    /// Comma separated `from`, `to` and percentages, up to and including the `{`
    fn parse_keyframe_selector(&mut self) -> ParseResult<LexicalValue> {
        log::trace!("parse_keyframe_selector");

        let mut arena = UnitArena::default();
        let mut chain = Chain::default();

        loop {
            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            let node = match &t.token_type {
                TokenType::Ident(key)
                    if key.eq_ignore_ascii_case("from") || key.eq_ignore_ascii_case("to") =>
                {
                    UnitNode::with_string(LexicalType::Ident, key.to_ascii_lowercase())
                }
                TokenType::Percentage(p) if (0.0..=100.0).contains(&p.value) => {
                    UnitNode::percentage(p.value)
                }
                TokenType::Percentage(_) => {
                    return Err(ParseError::syntax(
                        "Keyframe selector out of range",
                        t.location,
                    ));
                }
                _ => return Err(self.unexpected(&t, "'from', 'to' or percentage")),
            };
            chain.append(&mut arena, node);

            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Comma => {
                    chain.append(&mut arena, UnitNode::new(LexicalType::OperatorComma));
                }
                TokenType::LCurly => break,
                _ => return Err(self.unexpected(&t, "',' or '{'")),
            }
        }

        match chain.head {
            Some(head) => Ok(arena.finish(head)),
            None => Err(ParseError::syntax(
                "Empty keyframe selector",
                self.tokenizer.current().location,
            )),
        }
    }
}
