use crate::errors::{ParseError, ParseResult};
use crate::parser::normalize_tokens;
use crate::selector::{Condition, PositionalCondition};
use crate::tokenizer::{Token, TokenType};
use crate::Css3;

/// Pseudo-elements that may still be written with a single colon
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

/// Pseudo-classes that take a selector list
const SELECTOR_FUNCTIONS: [&str; 5] = ["not", "is", "where", "matches", "has"];

impl Css3<'_> {
    /// Parses a pseudo-class or pseudo-element. The first `:` has been consumed.
    pub(crate) fn parse_pseudo(&mut self, colon: &Token) -> ParseResult<Condition> {
        log::trace!("parse_pseudo");

        let mut t = self.tokenizer.consume();
        let element = t.is_colon() && colon.touches(&t);
        if element {
            let next = self.tokenizer.consume();
            if !t.touches(&next) {
                return Err(self.unexpected(&next, "pseudo-element name"));
            }
            t = next;
        } else if !colon.touches(&t) {
            return Err(self.unexpected(&t, "pseudo-class name"));
        }

        match &t.token_type {
            TokenType::Ident(name) => {
                let name = name.to_ascii_lowercase();
                if element || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
                    return Ok(Condition::PseudoElement {
                        name,
                        argument: None,
                    });
                }
                Ok(pseudo_class(name))
            }
            TokenType::Function(name) => {
                let name = name.to_ascii_lowercase();
                if element {
                    let argument = self.parse_pseudo_argument(&t)?;
                    return Ok(Condition::PseudoElement {
                        name,
                        argument: Some(argument),
                    });
                }
                self.parse_functional_pseudo_class(name, &t)
            }
            _ if element => Err(self.unexpected(&t, "pseudo-element name")),
            _ => Err(self.unexpected(&t, "pseudo-class name")),
        }
    }

    fn parse_functional_pseudo_class(&mut self, name: String, t: &Token) -> ParseResult<Condition> {
        if SELECTOR_FUNCTIONS.contains(&name.as_str()) {
            let arguments = self.parse_selector_list(name == "has")?;
            self.expect_selector_close(t)?;
            return Ok(Condition::SelectorArgument { name, arguments });
        }

        let (forward, of_type) = match name.as_str() {
            "nth-child" => (true, false),
            "nth-last-child" => (false, false),
            "nth-of-type" => (true, true),
            "nth-last-of-type" => (false, true),
            "lang" => return Ok(Condition::Lang(self.parse_pseudo_argument(t)?)),
            _ => {
                let argument = self.parse_pseudo_argument(t)?;
                return Ok(Condition::PseudoClass {
                    name,
                    argument: Some(argument),
                });
            }
        };

        self.consume_whitespace_comments();
        let next = self.tokenizer.lookahead(0);
        if next.token_type == TokenType::RParen {
            return Err(ParseError::syntax(
                format!("Empty argument to ':{name}()'"),
                next.location,
            ));
        }

        let (factor, offset) = self.parse_an_plus_b()?;

        self.consume_whitespace_comments();
        let mut of_selector = None;
        let next = self.tokenizer.lookahead(0);
        if next.is_ident_ci("of") {
            if of_type {
                return Err(self.unexpected(&next, "')'"));
            }
            self.tokenizer.consume();
            of_selector = Some(self.parse_selector_list(false)?);
        }
        self.expect_selector_close(t)?;

        Ok(Condition::Positional(PositionalCondition {
            factor,
            offset,
            forward,
            of_type,
            of_selector,
        }))
    }

    /// Argument text of a functional pseudo-class that is not parsed any further
    fn parse_pseudo_argument(&mut self, function: &Token) -> ParseResult<String> {
        let tokens = self.consume_until_close_paren(function)?;
        let argument = normalize_tokens(&tokens);
        if argument.is_empty() {
            let close = self.tokenizer.current();
            return Err(ParseError::syntax(
                format!("Empty argument to '{function}'"),
                close.location,
            ));
        }
        Ok(argument)
    }

    fn expect_selector_close(&mut self, function: &Token) -> ParseResult<()> {
        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::RParen => Ok(()),
            TokenType::Eof => Err(ParseError::syntax("Unclosed parenthesis", function.location)),
            _ => Err(self.unexpected(&t, "')'")),
        }
    }
}

fn pseudo_class(name: String) -> Condition {
    let edge = |forward, of_type| {
        Condition::Positional(PositionalCondition {
            factor: 0,
            offset: 1,
            forward,
            of_type,
            of_selector: None,
        })
    };

    match name.as_str() {
        "first-child" => edge(true, false),
        "last-child" => edge(false, false),
        "first-of-type" => edge(true, true),
        "last-of-type" => edge(false, true),
        "only-child" => Condition::OnlyChild,
        "only-of-type" => Condition::OnlyType,
        _ => Condition::PseudoClass {
            name,
            argument: None,
        },
    }
}
