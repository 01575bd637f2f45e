use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

impl Css3<'_> {
    /// `@namespace [prefix] url;`. An omitted prefix declares the default namespace.
    pub(crate) fn parse_namespace_rule(&mut self, at_keyword: &Token, nested: bool) -> ParseResult<()> {
        log::trace!("parse_namespace_rule");

        self.check_placement(at_keyword, nested, SheetState::Namespaces)
            .map_err(|err| ParseError::new(ErrorKind::Namespace, err.message, at_keyword.location))?;

        self.consume_whitespace_comments();
        let mut prefix = String::new();
        let t = self.tokenizer.lookahead(0);
        if let TokenType::Ident(name) = t.token_type {
            self.tokenizer.consume();
            prefix = name;
        }

        let uri = self.consume_url_or_string()?;
        self.end_statement()?;

        log::debug!("namespace '{prefix}' = {uri}");
        self.namespaces.insert(prefix.clone(), uri.clone());
        self.sheet_state = SheetState::Namespaces;
        self.handler.namespace_declaration(&prefix, &uri);

        Ok(())
    }
}
