use crate::errors::ParseResult;
use crate::parser::declaration::NestedAtRules;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::TokenType;
use crate::Css3;

impl Css3<'_> {
    pub(crate) fn parse_counter_style_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_counter_style_rule");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let name = match t.token_type {
            TokenType::Ident(name)
                if !matches!(
                    name.to_ascii_lowercase().as_str(),
                    "none" | "decimal" | "disc" | "initial" | "inherit" | "unset" | "revert"
                ) =>
            {
                name
            }
            _ => return Err(self.unexpected(&t, "counter style name")),
        };

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_counter_style(&name);
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_counter_style(&name);

        Ok(())
    }
}
