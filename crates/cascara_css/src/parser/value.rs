use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::parser::normalize_tokens;
use crate::parser_config::Flags;
use crate::tokenizer::{Number, Token, TokenType};
use crate::values::{Chain, LexicalType, LexicalValue, UnitArena, UnitNode};
use crate::Css3;

/// Where a chain of units is being built
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ValueContext {
    /// Inside function arguments, where `)` ends the chain
    pub in_function: bool,
    /// Anything goes: custom property values and `var()` fallbacks
    pub custom_property: bool,
}

impl ValueContext {
    pub fn function() -> Self {
        Self {
            in_function: true,
            custom_property: false,
        }
    }

    pub fn custom_function() -> Self {
        Self {
            in_function: true,
            custom_property: true,
        }
    }
}

/// Units of a declaration value before its priority is known
pub(crate) struct ValueUnits {
    pub arena: UnitArena,
    pub chain: Chain,
    /// Source text of the value, trimmed
    pub raw: String,
}

impl ValueUnits {
    /// Replaces the whole value with a single unit
    pub fn replace(&mut self, node: UnitNode) {
        self.chain = Chain::default();
        self.chain.append(&mut self.arena, node);
    }

    pub fn finish(mut self) -> LexicalValue {
        let head = match self.chain.head {
            Some(head) => head,
            None => self.arena.push(UnitNode::new(LexicalType::Empty)),
        };

        self.arena.finish(head)
    }
}

impl Css3<'_> {
    /// Parses a declaration value up to its priority, `;`, `}` or the end of the input
    pub(crate) fn parse_value_units(&mut self, custom_property: bool) -> ParseResult<ValueUnits> {
        log::trace!("parse_value_units");

        self.consume_whitespace_comments();
        let first = self.tokenizer.lookahead(0);

        let mut arena = UnitArena::default();
        let ctx = ValueContext {
            in_function: false,
            custom_property,
        };
        let chain = self.parse_unit_chain(&mut arena, ctx)?;

        let raw = if chain.is_empty() {
            String::new()
        } else {
            let last = self.tokenizer.current();
            self.raw_text(&first, &last).trim().to_string()
        };

        let mut units = ValueUnits { arena, chain, raw };

        if units.chain.is_empty() {
            if !custom_property {
                return Err(ParseError::syntax("Empty value", first.location));
            }
            units.replace(UnitNode::new(LexicalType::Empty));
        }

        if has_backslash_nine(&units) {
            let raw = units.raw.clone();
            units.replace(UnitNode::with_string(LexicalType::CompatIdent, raw));
        }

        Ok(units)
    }

    /// Parses a value that stands on its own, such as the value given to `parse_property_value`
    pub(crate) fn parse_property_value_internal(&mut self) -> ParseResult<LexicalValue> {
        log::trace!("parse_property_value_internal");

        let units = self.parse_value_units(false)?;

        let t = self.tokenizer.lookahead_sc(0);
        if !t.is_eof() {
            return Err(self.unexpected(&t, "end of value"));
        }

        Ok(units.finish())
    }

    /// Parses units until the end of the enclosing construct. The terminating token is not
    /// consumed.
    pub(crate) fn parse_unit_chain(
        &mut self,
        arena: &mut UnitArena,
        ctx: ValueContext,
    ) -> ParseResult<Chain> {
        log::trace!("parse_unit_chain");

        let mut chain = Chain::default();
        let mut after_operator = false;

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof | TokenType::Semicolon | TokenType::RCurly => break,
                TokenType::Delim('!') if !ctx.in_function => break,
                TokenType::RParen if ctx.in_function => break,
                _ => {}
            }

            self.tokenizer.consume();

            let is_operator = matches!(t.token_type, TokenType::Comma | TokenType::Delim('/'));
            if is_operator && !ctx.custom_property && (chain.is_empty() || after_operator) {
                return Err(self.unexpected(&t, "value"));
            }
            after_operator = is_operator;

            self.parse_term(arena, &mut chain, &t, ctx)?;
        }

        if after_operator && !ctx.custom_property {
            let t = self.tokenizer.lookahead(0);
            return Err(self.unexpected(&t, "value"));
        }

        Ok(chain)
    }

    /// Converts one consumed token, and whatever belongs to it, into units
    fn parse_term(
        &mut self,
        arena: &mut UnitArena,
        chain: &mut Chain,
        t: &Token,
        ctx: ValueContext,
    ) -> ParseResult<()> {
        let node = match &t.token_type {
            TokenType::Ident(name) => {
                if name.eq_ignore_ascii_case("u") && self.starts_unicode_range(t) {
                    self.parse_unicode_range(arena, t)?
                } else if name.eq_ignore_ascii_case("progid") && self.tokenizer.lookahead(0).is_colon() {
                    self.parse_progid(t)?
                } else if let Some(node) = self.backslash_nine(t)? {
                    node
                } else {
                    ident_node(name)
                }
            }
            TokenType::QuotedString(s) => UnitNode::with_string(LexicalType::String, s.as_str()),
            TokenType::Number(number) => number_node(number),
            TokenType::Percentage(number) => UnitNode::percentage(number.value),
            TokenType::Dimension { value, unit } => match self.backslash_nine(t)? {
                Some(node) => node,
                None => UnitNode::dimension(value.value, unit),
            },
            TokenType::Hash(name) | TokenType::IDHash(name) => self.hex_color(arena, t, name)?,
            TokenType::Url(url) => UnitNode::with_string(LexicalType::Uri, url.as_str()),
            TokenType::Function(name) => self.parse_function(arena, t, name)?,
            TokenType::Comma => UnitNode::new(LexicalType::OperatorComma),
            TokenType::Delim('/') => UnitNode::new(LexicalType::OperatorSlash),
            TokenType::Delim('+') if ctx.custom_property => UnitNode::new(LexicalType::OperatorPlus),
            TokenType::Delim('-') if ctx.custom_property => UnitNode::new(LexicalType::OperatorMinus),
            TokenType::Delim('*') if ctx.custom_property => {
                UnitNode::new(LexicalType::OperatorMultiply)
            }
            TokenType::LBracket => return self.parse_bracket_list(arena, chain, t),
            TokenType::LParen if ctx.custom_property => {
                let inner = self.parse_unit_chain(arena, ValueContext::custom_function())?;
                self.expect_close_paren(t)?;

                let mut node = UnitNode::new(LexicalType::SubExpression);
                node.parameters = inner.head;
                node
            }
            TokenType::LCurly if ctx.custom_property => {
                let inner = self.consume_until_close_curly(t)?;
                UnitNode::with_string(LexicalType::Block, normalize_tokens(&inner))
            }
            _ => return Err(self.unexpected(t, "value")),
        };

        chain.append(arena, node);
        Ok(())
    }

    /// `[ident ident ...]`, as used by grid line names
    fn parse_bracket_list(
        &mut self,
        arena: &mut UnitArena,
        chain: &mut Chain,
        open: &Token,
    ) -> ParseResult<()> {
        log::trace!("parse_bracket_list");

        chain.append(arena, UnitNode::new(LexicalType::LeftBracket));

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.consume();
            match &t.token_type {
                TokenType::Ident(name) => {
                    chain.append(arena, UnitNode::with_string(LexicalType::Ident, name.as_str()));
                }
                TokenType::RBracket => break,
                TokenType::Eof => {
                    return Err(ParseError::syntax("Unclosed '['", open.location));
                }
                _ => return Err(self.unexpected(&t, "identifier or ']'")),
            }
        }

        chain.append(arena, UnitNode::new(LexicalType::RightBracket));
        Ok(())
    }

    pub(crate) fn expect_close_paren(&mut self, open: &Token) -> ParseResult<()> {
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::RParen => Ok(()),
            TokenType::Eof => Err(ParseError::syntax("Unclosed parenthesis", open.location)),
            _ => Err(self.unexpected(&t, "')'")),
        }
    }

    /// A `\9` suffix decodes to a trailing tab. With IEVALUES the token becomes a compat unit,
    /// which later turns the whole value into one. The escape may have swallowed one whitespace
    /// character after it, which is not part of the hack.
    fn backslash_nine(&mut self, t: &Token) -> ParseResult<Option<UnitNode>> {
        let decoded_tab = match &t.token_type {
            TokenType::Ident(name) => name.ends_with('\t'),
            TokenType::Dimension { unit, .. } => unit.ends_with('\t'),
            _ => false,
        };
        if !decoded_tab {
            return Ok(None);
        }

        let raw = self.tokenizer.slice(t.start, t.end);
        let raw = without_escape_whitespace(&raw);
        if !raw.ends_with("\\9") {
            return Ok(None);
        }

        if !self.has_flag(Flags::IEVALUES) {
            return Err(ParseError::new(
                ErrorKind::Compat,
                "A '\\9' suffix needs the IEVALUES flag",
                t.location,
            ));
        }

        self.report_warning(ErrorKind::Compat, "Accepted '\\9' hack", t.location);
        Ok(Some(UnitNode::with_string(LexicalType::CompatIdent, raw)))
    }

    /// `progid:...` filter values run to the end of the declaration value
    fn parse_progid(&mut self, first: &Token) -> ParseResult<UnitNode> {
        log::trace!("parse_progid");

        if !self.has_flag(Flags::IEVALUES) {
            return Err(ParseError::new(
                ErrorKind::Compat,
                "A 'progid:' value needs the IEVALUES flag",
                first.location,
            ));
        }

        let mut depth = 0usize;
        let mut last = first.clone();
        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof => break,
                TokenType::Semicolon | TokenType::RCurly | TokenType::Delim('!') if depth == 0 => {
                    break
                }
                TokenType::LParen | TokenType::Function(_) | TokenType::LBracket => depth += 1,
                TokenType::RParen | TokenType::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }

            self.tokenizer.consume();
            if !t.is_whitespace() && !t.is_comment() {
                last = t;
            }
        }

        if depth > 0 {
            return Err(ParseError::syntax("Unclosed parenthesis", first.location));
        }

        self.report_warning(ErrorKind::Compat, "Accepted 'progid:' value", first.location);
        Ok(UnitNode::with_string(
            LexicalType::CompatIdent,
            self.raw_text(first, &last),
        ))
    }

    /// Hex colors: 3, 4, 6 or 8 hex digits. The rgb components are added as parameters.
    fn hex_color(&mut self, arena: &mut UnitArena, t: &Token, name: &str) -> ParseResult<UnitNode> {
        let valid = matches!(name.len(), 3 | 4 | 6 | 8) && name.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ParseError::syntax(
                format!("Invalid color '#{name}'"),
                t.location,
            ));
        }

        let digits: Vec<u32> = name.chars().filter_map(|c| c.to_digit(16)).collect();
        let components: Vec<u32> = match digits.len() {
            3 | 4 => digits.iter().map(|d| d * 17).collect(),
            _ => digits.chunks(2).map(|p| p.iter().fold(0, |acc, d| acc * 16 + d)).collect(),
        };

        let mut params = Chain::default();
        for (i, component) in components.iter().enumerate() {
            if i > 0 {
                params.append(arena, UnitNode::new(LexicalType::OperatorComma));
            }
            if i == 3 {
                let alpha = (*component as f32 / 255.0 * 1000.0).round() / 1000.0;
                params.append(arena, UnitNode::real(alpha));
            } else {
                params.append(arena, UnitNode::integer(*component as i32));
            }
        }

        let mut node = UnitNode::function(LexicalType::RgbColor, "rgb", params.head);
        node.string_value = Some(name.to_ascii_lowercase());
        Ok(node)
    }
}

fn ident_node(name: &str) -> UnitNode {
    let keyword = match name.to_ascii_lowercase().as_str() {
        "inherit" => Some(LexicalType::Inherit),
        "initial" => Some(LexicalType::Initial),
        "unset" => Some(LexicalType::Unset),
        "revert" => Some(LexicalType::Revert),
        _ => None,
    };

    match keyword {
        Some(lexical_type) => UnitNode::with_string(lexical_type, name.to_ascii_lowercase()),
        None => UnitNode::with_string(LexicalType::Ident, name),
    }
}

pub(crate) fn number_node(number: &Number) -> UnitNode {
    if number.is_integer {
        UnitNode::integer(number.int_value())
    } else {
        UnitNode::real(number.value)
    }
}

/// Drops the single whitespace character an escape sequence consumes after itself
fn without_escape_whitespace(raw: &str) -> &str {
    if let Some(stripped) = raw.strip_suffix("\r\n") {
        return stripped;
    }

    match raw.chars().last() {
        Some(c) if c.is_ascii_whitespace() => &raw[..raw.len() - c.len_utf8()],
        _ => raw,
    }
}

fn has_backslash_nine(units: &ValueUnits) -> bool {
    let mut next = units.chain.head;
    while let Some(node) = next.and_then(|id| units.arena.get(id)) {
        if node.lexical_type == LexicalType::CompatIdent
            && node.string_value.as_deref().is_some_and(|s| s.ends_with("\\9"))
        {
            return true;
        }
        next = node.next;
    }

    false
}

#[cfg(test)]
mod test {
    use crate::parser_config::Flags;
    use crate::values::{CssUnit, DimensionKind, LexicalType};
    use crate::CssParser;

    macro_rules! assert_value {
        ($input:expr, $expected:expr) => {
            let value = CssParser::new().parse_property_value($input).unwrap();
            assert_eq!(value.to_string(), $expected);
        };
    }

    #[test]
    fn simple_values() {
        assert_value!("1px solid  red", "1px solid red");
        assert_value!("'Times New Roman' , serif", "\"Times New Roman\", serif");
        assert_value!("1.50em", "1.5em");
        assert_value!("2.0", "2.0");
        assert_value!("url( img.png )", "url(\"img.png\")");
        assert_value!("1/ 2", "1/2");
        assert_value!("[a  b] auto", "[a b] auto");
        assert_value!("INHERIT", "inherit");
    }

    #[test]
    fn value_types() {
        let parser = CssParser::new();

        let value = parser.parse_property_value("12px 3 4.5 50% 10foo").unwrap();
        let types: Vec<LexicalType> = value.iter().map(|u| u.lexical_type()).collect();
        assert_eq!(
            types,
            vec![
                LexicalType::Dimension,
                LexicalType::Integer,
                LexicalType::Real,
                LexicalType::Percentage,
                LexicalType::Dimension,
            ]
        );

        let head = value.head();
        assert_eq!(head.css_unit(), CssUnit::Px);
        assert_eq!(head.dimension_kind(), Some(DimensionKind::Length));

        let unknown = value.iter().last().unwrap();
        assert_eq!(unknown.css_unit(), CssUnit::Other);
        assert_eq!(unknown.dimension_unit_text(), "foo");
    }

    #[test]
    fn hex_colors() {
        let parser = CssParser::new();

        let value = parser.parse_property_value("#FfA").unwrap();
        let head = value.head();
        assert_eq!(head.lexical_type(), LexicalType::RgbColor);
        assert_eq!(value.to_string(), "#ffa");

        let components: Vec<i32> = head
            .iter_parameters()
            .filter(|u| u.lexical_type() == LexicalType::Integer)
            .map(|u| u.integer_value())
            .collect();
        assert_eq!(components, vec![255, 255, 170]);

        let value = parser.parse_property_value("#11223380").unwrap();
        let alpha = value.head().iter_parameters().last().unwrap();
        assert_eq!(alpha.lexical_type(), LexicalType::Real);
        assert!((alpha.float_value() - 0.502).abs() < 0.001);

        assert!(parser.parse_property_value("#12345").is_err());
        assert!(parser.parse_property_value("#ggg").is_err());
    }

    #[test]
    fn quoted_urls() {
        let parser = CssParser::new();

        let value = parser.parse_property_value("URL( 'a b' ) no-repeat").unwrap();
        assert_eq!(value.head().lexical_type(), LexicalType::Uri);
        assert_eq!(value.head().string_value(), Some("a b"));
        assert_eq!(value.to_string(), "url(\"a b\") no-repeat");

        let again = parser.parse_property_value(&value.to_string()).unwrap();
        assert_eq!(again, value);

        assert!(parser.parse_property_value("url('a' b)").is_err());
        assert!(parser.parse_property_value("url(\"a\"").is_err());
    }

    #[test]
    fn operators_need_operands() {
        let parser = CssParser::new();
        assert!(parser.parse_property_value(", a").is_err());
        assert!(parser.parse_property_value("a,,b").is_err());
        assert!(parser.parse_property_value("a,").is_err());
        assert!(parser.parse_property_value("a / / b").is_err());
        assert!(parser.parse_property_value("").is_err());
        assert!(parser.parse_property_value("'open").is_err());
        assert!(parser.parse_property_value("url(a b)").is_err());
    }

    #[test]
    fn backslash_nine_needs_flag() {
        let mut parser = CssParser::new();
        assert!(parser.parse_property_value("600px\\9").is_err());

        parser.set_flag(Flags::IEVALUES);
        let value = parser.parse_property_value("600px\\9").unwrap();
        assert_eq!(value.head().lexical_type(), LexicalType::CompatIdent);
        assert_eq!(value.head().string_value(), Some("600px\\9"));
        assert!(value.head().next().is_none());

        let value = parser.parse_property_value("red\\9").unwrap();
        assert_eq!(value.to_string(), "red\\9");
    }

    #[test]
    fn progid_needs_flag() {
        let input = "progid:DXImageTransform.Microsoft.gradient(startColorstr='#80000000', GradientType=0)";

        let mut parser = CssParser::new();
        assert!(parser.parse_property_value(input).is_err());

        parser.set_flag(Flags::IEVALUES);
        let value = parser.parse_property_value(input).unwrap();
        assert_eq!(value.head().lexical_type(), LexicalType::CompatIdent);
        assert_eq!(value.to_string(), input);
    }

    #[test]
    fn escaped_idents_round_trip() {
        let parser = CssParser::new();
        let value = parser.parse_property_value("\\31 0px-wide a\\.b").unwrap();
        assert_eq!(value.head().string_value(), Some("10px-wide"));
        assert_eq!(value.to_string(), "\\31 0px-wide a\\.b");

        let again = parser.parse_property_value(&value.to_string()).unwrap();
        assert_eq!(again, value);
    }
}
