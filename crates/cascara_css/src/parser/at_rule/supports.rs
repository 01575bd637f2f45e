use crate::errors::ParseResult;
use crate::parser::stylesheet::SheetState;
use crate::Css3;

impl Css3<'_> {
    pub(crate) fn parse_supports_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_supports_rule");

        let condition = self.parse_supports_condition_body()?;
        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_supports(&condition);
        self.parse_rule_list(true);
        self.close_block(&open);
        self.handler.end_supports(&condition);

        Ok(())
    }
}
