use crate::errors::ParseResult;
use crate::parser::declaration::NestedAtRules;
use crate::parser::stylesheet::SheetState;
use crate::Css3;

impl Css3<'_> {
    pub(crate) fn parse_font_face_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_font_face_rule");

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_font_face();
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_font_face();

        Ok(())
    }
}
