use crate::errors::{ParseError, ParseResult};
use crate::parser::normalize_tokens;
use crate::parser::value::ValueContext;
use crate::supports::{BooleanCondition, SupportsPredicate};
use crate::tokenizer::{Token, TokenType};
use crate::values::UnitArena;
use crate::Css3;

#[derive(Clone, Copy, PartialEq)]
enum Operator {
    And,
    Or,
}

impl Css3<'_> {
    /// Parses a standalone supports condition; the whole input must be consumed
    pub(crate) fn parse_supports_condition_internal(&mut self) -> ParseResult<BooleanCondition> {
        log::trace!("parse_supports_condition_internal");

        let condition = self.parse_supports_condition_body()?;

        let t = self.tokenizer.lookahead_sc(0);
        if !t.is_eof() {
            return Err(self.unexpected(&t, "'and', 'or' or end of condition"));
        }

        Ok(condition)
    }

    /// `not <in-parens>` or `<in-parens> [and <in-parens>]*` or the same with `or`. Stops
    /// before the token that follows the condition.
    pub(crate) fn parse_supports_condition_body(&mut self) -> ParseResult<BooleanCondition> {
        log::trace!("parse_supports_condition_body");

        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);
        if t.is_ident_ci("not") {
            self.tokenizer.consume();
            self.expect_whitespace_before_parens()?;
            let operand = self.parse_supports_in_parens()?;
            return Ok(BooleanCondition::Not(Box::new(operand)));
        }

        let mut operands = vec![self.parse_supports_in_parens()?];
        let mut operator = None;

        loop {
            self.consume_whitespace_comments();
            let t = self.tokenizer.lookahead(0);
            let found = if t.is_ident_ci("and") {
                Operator::And
            } else if t.is_ident_ci("or") {
                Operator::Or
            } else {
                break;
            };

            if operator.is_some_and(|op| op != found) {
                return Err(ParseError::syntax(
                    "'and' and 'or' cannot be mixed without parentheses",
                    t.location,
                ));
            }
            operator = Some(found);

            self.tokenizer.consume();
            self.expect_whitespace_before_parens()?;
            operands.push(self.parse_supports_in_parens()?);
        }

        Ok(match operator {
            None => operands.remove(0),
            Some(Operator::And) => BooleanCondition::And(operands),
            Some(Operator::Or) => BooleanCondition::Or(operands),
        })
    }

    /// `and`, `or` and `not` must be followed by whitespace: `not(` is a function
    fn expect_whitespace_before_parens(&mut self) -> ParseResult<()> {
        if self.consume_whitespace_comments() {
            return Ok(());
        }
        let t = self.tokenizer.lookahead(0);
        Err(self.unexpected(&t, "whitespace"))
    }

    /// A parenthesized declaration or condition, `selector()` or another functional test
    fn parse_supports_in_parens(&mut self) -> ParseResult<BooleanCondition> {
        log::trace!("parse_supports_in_parens");

        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::LParen => {
                let is_declaration = self.tokenizer.lookahead_sc(0).is_ident()
                    && self.tokenizer.lookahead_sc(1).is_colon();
                if is_declaration {
                    return self.parse_supports_declaration(&t);
                }

                let inner = self.parse_supports_condition_body()?;
                self.consume_whitespace_comments();
                self.expect_close_paren(&t)?;
                Ok(inner)
            }
            TokenType::Function(name) if name.eq_ignore_ascii_case("selector") => {
                let list = self.parse_selector_list(false)?;
                self.consume_whitespace_comments();
                self.expect_close_paren(&t)?;
                Ok(BooleanCondition::Predicate(SupportsPredicate::Selector(list)))
            }
            TokenType::Function(name)
                if ["not", "and", "or"].iter().any(|k| name.eq_ignore_ascii_case(k)) =>
            {
                Err(ParseError::syntax(
                    format!("Expected whitespace after '{name}'"),
                    t.location,
                ))
            }
            TokenType::Function(name) => {
                let tokens = self.consume_until_close_paren(&t)?;
                Ok(BooleanCondition::Predicate(SupportsPredicate::Function {
                    name: name.to_ascii_lowercase(),
                    argument: normalize_tokens(&tokens),
                }))
            }
            _ => Err(self.unexpected(&t, "'(' or a supports function")),
        }
    }

    /// `(name: value)`, the `(` has been consumed. The value is kept in its serialized form, or
    /// as normalized source text when it is not a valid property value.
    fn parse_supports_declaration(&mut self, open: &Token) -> ParseResult<BooleanCondition> {
        log::trace!("parse_supports_declaration");

        self.consume_whitespace_comments();
        let name = self.consume_any_ident()?;
        let custom_property = name.starts_with("--");
        let name = if custom_property {
            name
        } else {
            name.to_ascii_lowercase()
        };
        self.consume_whitespace_comments();
        self.consume(TokenType::Colon)?;

        let mark = self.tokenizer.tell();
        let tokens = self.consume_until_close_paren(open)?;
        let after = self.tokenizer.tell();
        self.tokenizer.seek(mark);

        let ctx = if custom_property {
            ValueContext::custom_function()
        } else {
            ValueContext::function()
        };
        let mut arena = UnitArena::default();
        let parsed = self.parse_unit_chain(&mut arena, ctx).ok().filter(|_| {
            self.consume_whitespace_comments();
            self.tokenizer.tell() + 1 == after
        });
        self.tokenizer.seek(after);

        let value = match parsed.and_then(|chain| chain.head) {
            Some(head) => arena.finish(head).to_string(),
            None => normalize_tokens(&tokens),
        };
        if value.is_empty() && !custom_property {
            return Err(ParseError::syntax("Empty value", open.location));
        }

        Ok(BooleanCondition::Predicate(SupportsPredicate::Declaration {
            name,
            value,
        }))
    }

    /// The argument of `supports()` in `@import`, a condition or a bare declaration. The
    /// function token has been consumed; its `)` is consumed here.
    pub(crate) fn parse_import_supports(&mut self, function: &Token) -> ParseResult<BooleanCondition> {
        log::trace!("parse_import_supports");

        self.consume_whitespace_comments();
        let t = self.tokenizer.lookahead(0);
        if t.is_ident() && self.tokenizer.lookahead_sc(1).is_colon() {
            return self.parse_supports_declaration(function);
        }

        let condition = self.parse_supports_condition_body()?;
        self.consume_whitespace_comments();
        self.expect_close_paren(function)?;
        Ok(condition)
    }
}
