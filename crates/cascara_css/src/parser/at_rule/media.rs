use crate::errors::ParseResult;
use crate::parser::stylesheet::SheetState;
use crate::Css3;

impl Css3<'_> {
    pub(crate) fn parse_media_rule(&mut self) -> ParseResult<()> {
        log::trace!("parse_media_rule");

        let media = self.parse_media_query_list_inner();
        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_media(&media);
        self.parse_rule_list(true);
        self.close_block(&open);
        self.handler.end_media(&media);

        Ok(())
    }
}
