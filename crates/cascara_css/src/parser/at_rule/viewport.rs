use crate::errors::ParseResult;
use crate::parser::declaration::NestedAtRules;
use crate::parser::stylesheet::SheetState;
use crate::Css3;

impl Css3<'_> {
    /// `@viewport` and `@-ms-viewport`
    pub(crate) fn parse_viewport_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_viewport_rule");

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_viewport();
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_viewport();

        Ok(())
    }
}
