use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::handler::Locator;
use crate::parser::recovery::Recovery;
use crate::parser_config::Flags;
use crate::tokenizer::{Token, TokenType};
use crate::values::{LexicalType, LexicalValue, UnitNode};
use crate::Css3;

/// At-rules that may appear between the declarations of a block
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum NestedAtRules {
    None,
    /// `@top-left` and the other margin boxes of `@page`
    PageMargins,
    /// `@swash`, `@styleset` and the other feature maps of `@font-feature-values`
    FeatureMaps,
}

/// A declaration as it was reported to the handler
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Declaration {
    pub name: String,
    pub value: LexicalValue,
    pub important: bool,
}

const MARGIN_BOXES: [&str; 16] = [
    "top-left-corner",
    "top-left",
    "top-center",
    "top-right",
    "top-right-corner",
    "bottom-left-corner",
    "bottom-left",
    "bottom-center",
    "bottom-right",
    "bottom-right-corner",
    "left-top",
    "left-middle",
    "left-bottom",
    "right-top",
    "right-middle",
    "right-bottom",
];

impl Css3<'_> {
    /// Parses the contents of a `style` attribute
    pub(crate) fn parse_style_declaration_internal(&mut self) {
        log::trace!("parse_style_declaration_internal");

        let locator = Locator::from(self.tokenizer.current_location());
        self.handler.parse_start(&locator);

        loop {
            self.parse_declaration_list(NestedAtRules::None, false);

            let t = self.tokenizer.consume();
            if t.is_eof() {
                break;
            }
            self.report_error(self.unexpected(&t, "declaration"));
        }

        self.handler.end_of_stream();
    }

    /// Parses declarations up to the `}` that closes the block, which is not consumed. Every
    /// declaration is reported to the handler; with `collect` they are returned as well.
    pub(crate) fn parse_declaration_list(
        &mut self,
        nested: NestedAtRules,
        collect: bool,
    ) -> Vec<Declaration> {
        log::trace!("parse_declaration_list");

        let mut declarations = Vec::new();

        loop {
            let t = self.tokenizer.lookahead(0);
            match &t.token_type {
                TokenType::Eof | TokenType::RCurly => break,
                TokenType::Whitespace(_) | TokenType::Comment(_) | TokenType::Semicolon => {
                    self.tokenizer.consume();
                }
                TokenType::AtKeyword(name) => {
                    self.tokenizer.consume();
                    if let Err(err) = self.parse_nested_at_rule(nested, name, &t) {
                        self.report_error(err);
                        self.recover(Recovery::AtRule);
                    }
                }
                _ => {
                    let mark = self.tokenizer.tell();
                    match self.parse_declaration() {
                        Ok((declaration, locator)) => {
                            if collect {
                                declarations.push(declaration.clone());
                            }
                            self.handler.property(
                                &declaration.name,
                                declaration.value,
                                declaration.important,
                                &locator,
                            );
                        }
                        Err(err) => {
                            self.report_error(err);
                            self.tokenizer.seek(mark);
                            self.recover(Recovery::Declaration);
                        }
                    }
                }
            }
        }

        declarations
    }

    fn parse_nested_at_rule(
        &mut self,
        nested: NestedAtRules,
        name: &str,
        t: &Token,
    ) -> ParseResult<()> {
        let lower = name.to_ascii_lowercase();
        match nested {
            NestedAtRules::PageMargins if MARGIN_BOXES.contains(&lower.as_str()) => {
                self.parse_margin_rule(&lower)
            }
            NestedAtRules::FeatureMaps => self.parse_feature_map(&lower, t),
            _ => Err(ParseError::syntax(
                format!("Unexpected at-rule '@{name}'"),
                t.location,
            )),
        }
    }

    fn parse_margin_rule(&mut self, name: &str) -> ParseResult<()> {
        log::trace!("parse_margin_rule");

        self.consume_whitespace_comments();
        let open = self.consume(TokenType::LCurly)?;

        self.handler.start_margin(name);
        self.parse_declaration_list(NestedAtRules::None, false);
        self.close_block(&open);
        self.handler.end_margin(name);

        Ok(())
    }

    /// Parses `name: value [!important]` up to and including the `;` that ends it. Returns the
    /// declaration and the location of its name.
    fn parse_declaration(&mut self) -> ParseResult<(Declaration, Locator)> {
        log::trace!("parse_declaration");

        let t = self.tokenizer.consume();
        let locator = Locator::from(t.location);

        let name = match &t.token_type {
            TokenType::Ident(name) if name.starts_with("--") => name.clone(),
            TokenType::Ident(name) => name.to_ascii_lowercase(),
            TokenType::Delim('*') => self.parse_star_hack(&t)?,
            _ => return Err(self.unexpected(&t, "property name")),
        };
        let custom_property = name.starts_with("--");

        self.consume_whitespace_comments();
        self.consume(TokenType::Colon)?;

        let mut units = self.parse_value_units(custom_property)?;
        let mut important = false;

        self.consume_whitespace_comments();
        let bang = self.tokenizer.lookahead(0);
        if bang.is_delim('!') {
            self.tokenizer.consume();
            self.consume_whitespace_comments();
            let priority = self.tokenizer.consume();

            if priority.is_ident_ci("important") {
                important = true;

                let trailing = self.tokenizer.lookahead(0);
                if trailing.is_delim('!') && priority.touches(&trailing) {
                    if !self.has_flag(Flags::IEPRIOCHAR) {
                        return Err(ParseError::new(
                            ErrorKind::Compat,
                            "'!important!' requires the IEPRIOCHAR flag",
                            trailing.location,
                        ));
                    }
                    self.tokenizer.consume();
                    self.report_warning(
                        ErrorKind::Compat,
                        "Accepted '!important!' priority",
                        bang.location,
                    );
                    units.chain.append(
                        &mut units.arena,
                        UnitNode::with_string(LexicalType::CompatPrio, "!important!"),
                    );
                }
            } else if priority.is_ident_ci("ie") {
                if !self.has_flag(Flags::IEPRIO) {
                    return Err(ParseError::new(
                        ErrorKind::Compat,
                        "'!ie' requires the IEPRIO flag",
                        bang.location,
                    ));
                }
                self.report_warning(ErrorKind::Compat, "Accepted '!ie' priority", bang.location);

                let raw = format!("{} {}", units.raw, self.raw_text(&bang, &priority));
                units.replace(UnitNode::with_string(LexicalType::CompatIdent, raw));
            } else {
                return Err(self.unexpected(&priority, "'important'"));
            }
        }

        self.consume_whitespace_comments();
        let end = self.tokenizer.lookahead(0);
        match end.token_type {
            TokenType::Semicolon => {
                self.tokenizer.consume();
            }
            TokenType::RCurly | TokenType::Eof => {}
            _ => return Err(self.unexpected(&end, "';' or '}'")),
        }

        Ok((
            Declaration {
                name,
                value: units.finish(),
                important,
            },
            locator,
        ))
    }

    /// `*name`, only valid with the star hack enabled. The `*` stays part of the name.
    fn parse_star_hack(&mut self, star: &Token) -> ParseResult<String> {
        let t = self.tokenizer.lookahead(0);
        let TokenType::Ident(name) = &t.token_type else {
            return Err(self.unexpected(star, "property name"));
        };
        if !star.touches(&t) {
            return Err(self.unexpected(star, "property name"));
        }

        if !self.has_flag(Flags::STARHACK) {
            return Err(ParseError::new(
                ErrorKind::Compat,
                "Property names starting with '*' require the STARHACK flag",
                star.location,
            ));
        }

        self.tokenizer.consume();
        self.report_warning(ErrorKind::Compat, "Accepted '*' property hack", star.location);
        Ok(format!("*{}", name.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod test {
    use crate::handler::CollectErrors;
    use crate::parser_config::Flags;
    use crate::values::LexicalType;
    use crate::{CssParser, ErrorKind, EventRecorder};
    use test_case::test_case;

    fn declarations(parser: &CssParser, input: &str) -> (EventRecorder, CollectErrors) {
        let mut events = EventRecorder::new();
        let mut errors = CollectErrors::new();
        parser
            .parse_style_declaration_str(input, &mut events, &mut errors)
            .unwrap();
        (events, errors)
    }

    #[test]
    fn names_values_and_priority() {
        let (events, errors) = declarations(
            &CssParser::new(),
            "COLOR: Red; margin :0 auto !important;--Custom-Prop: {a; b}",
        );
        assert!(errors.errors.is_empty());

        let props = events.properties();
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].0, "color");
        assert_eq!(props[0].1.to_string(), "Red");
        assert!(!props[0].2);
        assert_eq!(props[1].0, "margin");
        assert_eq!(props[1].1.to_string(), "0 auto");
        assert!(props[1].2);
        assert_eq!(props[2].0, "--Custom-Prop");
        assert_eq!(props[2].1.head().lexical_type(), LexicalType::Block);
        assert_eq!(props[2].1.to_string(), "{a; b}");
    }

    #[test]
    fn nested_blocks_in_custom_property() {
        let (events, errors) = declarations(
            &CssParser::new(),
            "--x: foo { a: { b }; c } 1px; --y: {a",
        );
        assert_eq!(errors.errors.len(), 1);

        let props = events.properties();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].1.to_string(), "foo {a: {b}; c} 1px");
    }

    #[test_case("--Box-shadow-inset:" ; "at end of input")]
    #[test_case("--My-property:;" ; "before semicolon")]
    fn empty_custom_property(input: &str) {
        let (events, errors) = declarations(&CssParser::new(), input);
        assert!(errors.errors.is_empty());

        let props = events.properties();
        assert_eq!(props.len(), 1);

        let value = props[0].1.head();
        assert_eq!(value.lexical_type(), LexicalType::Empty);
        assert_eq!(value.string_value().unwrap_or_default(), "");
        assert!(value.next().is_none());
    }

    #[test]
    fn recovery_keeps_later_declarations() {
        let (events, errors) = declarations(
            &CssParser::new(),
            "color: ; width: 1px 2px } margin: 0; 3: x; padding: f(;) ; top: 0",
        );

        let names: Vec<&str> = events.properties().iter().map(|p| p.0).collect();
        assert_eq!(names, vec!["width", "margin", "top"]);
        assert_eq!(errors.errors.len(), 4);
    }

    #[test]
    fn locator_points_at_the_name() {
        let (events, _) = declarations(&CssParser::new(), "a: b;\n  color: red");
        let json = events.to_json().to_string();
        assert!(json.contains("\"line\":2"));
        assert!(json.contains("\"column\":3"));
    }

    #[test_case("width: 600px\\9" ; "at end of input")]
    #[test_case("width: 600px\\9 ; color: red" ; "space before semicolon")]
    #[test_case("width: 600px\\9\n" ; "trailing newline")]
    #[test_case("width: RED\\9 ; color: red" ; "identifier")]
    fn backslash_nine(input: &str) {
        let (events, errors) = declarations(&CssParser::new(), input);
        assert!(events.properties().iter().all(|p| p.0 != "width"));
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Compat);

        let mut parser = CssParser::new();
        parser.set_flag(Flags::IEVALUES);
        let (events, errors) = declarations(&parser, input);
        let props = events.properties();
        assert_eq!(props[0].0, "width");
        assert_eq!(props[0].1.head().lexical_type(), LexicalType::CompatIdent);
        assert!(props[0].1.head().next().is_none());
        assert!(props[0].1.to_string().ends_with("\\9"));
        assert!(errors.errors.is_empty());
        assert_eq!(errors.warnings.len(), 1);
    }

    #[test]
    fn star_hack() {
        let (events, errors) = declarations(&CssParser::new(), "*zoom: 1; color: red");
        assert_eq!(events.properties().len(), 1);
        assert_eq!(errors.errors[0].kind, ErrorKind::Compat);

        let mut parser = CssParser::new();
        parser.set_flag(Flags::STARHACK);
        let (events, errors) = declarations(&parser, "*zoom: 1");
        assert_eq!(events.properties()[0].0, "*zoom");
        assert_eq!(errors.warnings.len(), 1);
    }

    #[test]
    fn ie_priority() {
        let (events, errors) = declarations(&CssParser::new(), "color: red !ie");
        assert!(events.properties().is_empty());
        assert_eq!(errors.errors.len(), 1);

        let mut parser = CssParser::new();
        parser.set_flag(Flags::IEPRIO);
        let (events, errors) = declarations(&parser, "color: red !ie");
        let props = events.properties();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].1.head().lexical_type(), LexicalType::CompatIdent);
        assert_eq!(props[0].1.to_string(), "red !ie");
        assert!(!props[0].2);
        assert_eq!(errors.warnings.len(), 1);
    }

    #[test]
    fn important_bang() {
        let (events, errors) = declarations(&CssParser::new(), "color: red !important!");
        assert!(events.properties().is_empty());
        assert_eq!(errors.errors.len(), 1);

        let mut parser = CssParser::new();
        parser.set_flag(Flags::IEPRIOCHAR);
        let (events, errors) = declarations(&parser, "color: red !important!; top: 0");
        let props = events.properties();
        assert_eq!(props.len(), 2);
        assert!(props[0].2);
        let units: Vec<LexicalType> = props[0].1.iter().map(|u| u.lexical_type()).collect();
        assert_eq!(units, vec![LexicalType::Ident, LexicalType::CompatPrio]);
        assert_eq!(errors.warnings.len(), 1);
    }

    #[test_case("color red")]
    #[test_case("color: red !importent")]
    #[test_case("color: red blue; }")]
    #[test_case("@media screen {}")]
    fn reported(input: &str) {
        let (_, errors) = declarations(&CssParser::new(), input);
        assert_eq!(errors.errors.len(), 1, "{input}");
    }
}
