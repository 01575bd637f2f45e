use crate::errors::{ParseError, ParseResult};
use crate::parser::value::number_node;
use crate::tokenizer::TokenType;
use crate::values::{Chain, LexicalType, UnitArena, UnitNode};
use crate::Css3;

impl Css3<'_> {
    /// Parses the arguments of `calc()` and the other math functions into a flat chain of
    /// operands and operators. Operands and operators must alternate. `+` and `-` need
    /// whitespace on both sides, otherwise they are the sign of the following number.
    pub(crate) fn parse_calc_expression(
        &mut self,
        arena: &mut UnitArena,
        allow_comma: bool,
    ) -> ParseResult<Chain> {
        log::trace!("parse_calc_expression");

        let mut chain = Chain::default();
        let mut expect_operand = true;

        loop {
            let space_before = self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            if matches!(
                t.token_type,
                TokenType::RParen | TokenType::Eof | TokenType::Semicolon | TokenType::RCurly
            ) {
                break;
            }

            self.tokenizer.consume();

            let operator = match t.token_type {
                TokenType::Delim('+') => Some(LexicalType::OperatorPlus),
                TokenType::Delim('-') => Some(LexicalType::OperatorMinus),
                TokenType::Delim('*') => Some(LexicalType::OperatorMultiply),
                TokenType::Delim('/') => Some(LexicalType::OperatorSlash),
                TokenType::Comma if allow_comma => Some(LexicalType::OperatorComma),
                _ => None,
            };

            if let Some(operator) = operator {
                if expect_operand {
                    return Err(self.unexpected(&t, "operand"));
                }

                let additive = matches!(
                    operator,
                    LexicalType::OperatorPlus | LexicalType::OperatorMinus
                );
                if additive && (!space_before || !self.tokenizer.lookahead(0).is_whitespace()) {
                    return Err(ParseError::syntax(
                        format!("'{t}' must be surrounded by whitespace"),
                        t.location,
                    ));
                }

                chain.append(arena, UnitNode::new(operator));
                expect_operand = true;
                continue;
            }

            if !expect_operand {
                return Err(ParseError::syntax("Missing operator", t.location));
            }

            let node = match &t.token_type {
                TokenType::Number(number) => number_node(number),
                TokenType::Percentage(number) => UnitNode::percentage(number.value),
                TokenType::Dimension { value, unit } => UnitNode::dimension(value.value, unit),
                TokenType::Ident(name) => UnitNode::with_string(LexicalType::Ident, name.as_str()),
                TokenType::Function(name) => self.parse_function(arena, &t, name)?,
                TokenType::LParen => {
                    let inner = self.parse_calc_expression(arena, false)?;
                    self.expect_close_paren(&t)?;

                    let mut node = UnitNode::new(LexicalType::SubExpression);
                    node.parameters = inner.head;
                    node
                }
                _ => return Err(self.unexpected(&t, "number, dimension or function")),
            };

            chain.append(arena, node);
            expect_operand = false;
        }

        if expect_operand {
            let t = self.tokenizer.lookahead(0);
            let message = if chain.is_empty() {
                "Empty expression"
            } else {
                "Expression ends with an operator"
            };
            return Err(ParseError::syntax(message, t.location));
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod test {
    use crate::values::LexicalType;
    use crate::CssParser;
    use test_case::test_case;

    #[test]
    fn flattened_parameters() {
        let parser = CssParser::new();
        let value = parser.parse_property_value("calc(100% - 2*3px)").unwrap();

        let head = value.head();
        assert_eq!(head.lexical_type(), LexicalType::Calc);

        let params: Vec<LexicalType> = head.iter_parameters().map(|u| u.lexical_type()).collect();
        assert_eq!(
            params,
            vec![
                LexicalType::Percentage,
                LexicalType::OperatorMinus,
                LexicalType::Integer,
                LexicalType::OperatorMultiply,
                LexicalType::Dimension,
            ]
        );
        assert_eq!(value.to_string(), "calc(100% - 2 * 3px)");
    }

    #[test_case("calc(1px + (2px * 3))", "calc(1px + (2px * 3))")]
    #[test_case("calc( 1px+ 0px )", "" ; "plus without leading space")]
    #[test_case("calc(var(--a) / 2)", "calc(var(--a) / 2)")]
    #[test_case("min(10px, 5vw + 1em)", "min(10px, 5vw + 1em)")]
    #[test_case("calc(1px + calc(2px - 1px))", "calc(1px + calc(2px - 1px))")]
    fn serialized(input: &str, expected: &str) {
        let result = CssParser::new().parse_property_value(input);
        if expected.is_empty() {
            assert!(result.is_err());
        } else {
            assert_eq!(result.unwrap().to_string(), expected);
        }
    }

    #[test_case("calc()" ; "empty")]
    #[test_case("calc(1px +)" ; "trailing operator")]
    #[test_case("calc(* 2)" ; "leading operator")]
    #[test_case("calc(1px 2px)" ; "missing operator")]
    #[test_case("calc(100% -2em)" ; "sign attached to operand")]
    #[test_case("calc(1px +2px)" ; "plus attached to operand")]
    #[test_case("calc(1px, 2px)" ; "comma in calc")]
    #[test_case("calc(1px + 2px" ; "unclosed")]
    fn rejected(input: &str) {
        assert!(CssParser::new().parse_property_value(input).is_err());
    }
}
