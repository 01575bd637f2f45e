use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::parser::value::ValueContext;
use crate::parser_config::Flags;
use crate::tokenizer::{Token, TokenType};
use crate::values::{Chain, LexicalType, UnitArena, UnitId, UnitNode};
use crate::Css3;

/// Math functions whose arguments are comma separated calc expressions
const MATH_FUNCTIONS: [&str; 21] = [
    "min", "max", "clamp", "round", "mod", "rem", "abs", "sign", "sin", "cos", "tan", "asin",
    "acos", "atan", "atan2", "pow", "sqrt", "hypot", "log", "exp", "calc-size",
];

const STEP_POSITIONS: [&str; 6] = [
    "jump-start",
    "jump-end",
    "jump-none",
    "jump-both",
    "start",
    "end",
];

fn function_type(lower: &str) -> LexicalType {
    match lower {
        "calc" | "-webkit-calc" | "-moz-calc" => LexicalType::Calc,
        "cubic-bezier" => LexicalType::CubicBezierFunction,
        "steps" => LexicalType::StepsFunction,
        "var" => LexicalType::Var,
        "attr" => LexicalType::Attr,
        "rgb" | "rgba" => LexicalType::RgbColor,
        "hsl" | "hsla" => LexicalType::HslColor,
        "hwb" => LexicalType::HwbColor,
        "lab" => LexicalType::LabColor,
        "lch" => LexicalType::LchColor,
        "oklab" => LexicalType::OklabColor,
        "oklch" => LexicalType::OklchColor,
        "color" => LexicalType::ColorFunction,
        n if n.starts_with("--") => LexicalType::CustomFunction,
        _ => LexicalType::Function,
    }
}

impl Css3<'_> {
    /// Parses the arguments of an already consumed function token, including the closing
    /// parenthesis
    pub(crate) fn parse_function(
        &mut self,
        arena: &mut UnitArena,
        t: &Token,
        name: &str,
    ) -> ParseResult<UnitNode> {
        log::trace!("parse_function");

        let lower = name.to_ascii_lowercase();
        if lower == "url" {
            return self.parse_quoted_url(t);
        }
        let lexical_type = function_type(&lower);

        let first = self.tokenizer.lookahead_sc(0);
        if first.is_delim('=') {
            return Err(ParseError::syntax(
                format!("Unexpected '=' in arguments of '{name}()'"),
                first.location,
            ));
        }

        let mark = self.tokenizer.tell();
        let parsed = match lexical_type {
            LexicalType::Calc => self.parse_calc_expression(arena, false),
            _ if MATH_FUNCTIONS.contains(&lower.as_str()) => self.parse_calc_expression(arena, true),
            LexicalType::Var | LexicalType::CustomFunction => {
                self.parse_unit_chain(arena, ValueContext::custom_function())
            }
            _ => self.parse_unit_chain(arena, ValueContext::function()),
        }
        .and_then(|chain| self.expect_close_paren(t).map(|_| chain));

        let mut params = match parsed {
            Ok(chain) => chain,
            Err(e) if self.has_flag(Flags::IEVALUES) => {
                log::debug!("keeping arguments of {name}() as compat value: {e}");
                self.tokenizer.seek(mark);
                self.compat_arguments(arena, t)?
            }
            Err(e) => return Err(e),
        };

        match lexical_type {
            LexicalType::Var => self.check_var(arena, &mut params, t)?,
            LexicalType::Attr => {
                if !first_is(arena, params.head, LexicalType::Ident) {
                    return Err(ParseError::syntax("attr() needs an attribute name", t.location));
                }
            }
            LexicalType::CubicBezierFunction => self.check_cubic_bezier(arena, &params, t)?,
            LexicalType::StepsFunction => self.check_steps(arena, &params, t)?,
            LexicalType::RgbColor => self.check_rgb_range(arena, &params, t),
            _ => {}
        }

        Ok(UnitNode::function(lexical_type, name, params.head))
    }

    /// `url("...")`: a quoted url reaches the parser as a function token
    fn parse_quoted_url(&mut self, open: &Token) -> ParseResult<UnitNode> {
        log::trace!("parse_quoted_url");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let TokenType::QuotedString(url) = &t.token_type else {
            return Err(self.unexpected(&t, "quoted url"));
        };

        self.consume_whitespace_comments();
        self.expect_close_paren(open)?;

        Ok(UnitNode::with_string(LexicalType::Uri, url.as_str()))
    }

    /// With IEVALUES, arguments that do not parse are kept as their source text
    fn compat_arguments(&mut self, arena: &mut UnitArena, open: &Token) -> ParseResult<Chain> {
        let tokens = self.consume_until_close_paren(open)?;

        let significant: Vec<&Token> = tokens
            .iter()
            .filter(|t| !t.is_whitespace() && !t.is_comment())
            .collect();

        let mut chain = Chain::default();
        if let (Some(first), Some(last)) = (significant.first(), significant.last()) {
            let raw = self.raw_text(first, last);
            self.report_warning(
                ErrorKind::Compat,
                format!("Accepted non-standard arguments '{raw}'"),
                first.location,
            );
            chain.append(arena, UnitNode::with_string(LexicalType::CompatIdent, raw));
        }

        Ok(chain)
    }

    /// `var(--name [, fallback]?)`. An empty fallback becomes an EMPTY unit.
    fn check_var(&mut self, arena: &mut UnitArena, params: &mut Chain, t: &Token) -> ParseResult<()> {
        let name_ok = params
            .head
            .and_then(|id| arena.get(id))
            .is_some_and(|n| {
                n.lexical_type == LexicalType::Ident
                    && n.string_value.as_deref().is_some_and(|s| s.starts_with("--"))
            });
        if !name_ok {
            return Err(ParseError::syntax(
                "var() needs a custom property name",
                t.location,
            ));
        }

        let second = params.head.and_then(|id| arena.get(id)).and_then(|n| n.next);
        if let Some(node) = second.and_then(|id| arena.get(id)) {
            if node.lexical_type != LexicalType::OperatorComma {
                return Err(ParseError::syntax(
                    "Expected ',' after the custom property name in var()",
                    t.location,
                ));
            }
        }

        if params.last_type(arena) == Some(LexicalType::OperatorComma) {
            params.append(arena, UnitNode::new(LexicalType::Empty));
        }

        Ok(())
    }

    fn check_cubic_bezier(&mut self, arena: &UnitArena, params: &Chain, t: &Token) -> ParseResult<()> {
        let units = collect(arena, params.head);

        let numbers: Vec<f32> = units
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match (i % 2, n.lexical_type) {
                (0, LexicalType::Integer | LexicalType::Real) => Some(n.float_value),
                _ => None,
            })
            .collect();
        let commas = units
            .iter()
            .skip(1)
            .step_by(2)
            .all(|n| n.lexical_type == LexicalType::OperatorComma);

        if units.len() != 7 || numbers.len() != 4 || !commas {
            return Err(ParseError::syntax(
                "cubic-bezier() needs four comma separated numbers",
                t.location,
            ));
        }

        let x_in_range = [numbers[0], numbers[2]].iter().all(|x| (0.0..=1.0).contains(x));
        if !x_in_range {
            return Err(ParseError::new(
                ErrorKind::Value,
                "cubic-bezier() x values must be between 0 and 1",
                t.location,
            ));
        }

        Ok(())
    }

    fn check_steps(&mut self, arena: &UnitArena, params: &Chain, t: &Token) -> ParseResult<()> {
        let units = collect(arena, params.head);

        let count_ok = units
            .first()
            .is_some_and(|n| n.lexical_type == LexicalType::Integer && n.int_value > 0);

        let position_ok = match units.len() {
            1 => true,
            3 => {
                units[1].lexical_type == LexicalType::OperatorComma
                    && units[2].lexical_type == LexicalType::Ident
                    && units[2].string_value.as_deref().is_some_and(|s| {
                        STEP_POSITIONS.iter().any(|p| p.eq_ignore_ascii_case(s))
                    })
            }
            _ => false,
        };

        if !count_ok || !position_ok {
            return Err(ParseError::syntax(
                "steps() needs a positive integer and an optional position",
                t.location,
            ));
        }

        Ok(())
    }

    /// Components are kept as written, out of range ones only give a warning
    fn check_rgb_range(&mut self, arena: &UnitArena, params: &Chain, t: &Token) {
        let out_of_range = collect(arena, params.head).iter().any(|n| match n.lexical_type {
            LexicalType::Integer => !(0..=255).contains(&n.int_value),
            LexicalType::Percentage => !(0.0..=100.0).contains(&n.float_value),
            _ => false,
        });

        if out_of_range {
            self.report_warning(
                ErrorKind::Value,
                "Color component out of range",
                t.location,
            );
        }
    }
}

fn collect(arena: &UnitArena, head: Option<UnitId>) -> Vec<&UnitNode> {
    let mut units = Vec::new();
    let mut next = head;
    while let Some(node) = next.and_then(|id| arena.get(id)) {
        units.push(node);
        next = node.next;
    }
    units
}

fn first_is(arena: &UnitArena, head: Option<UnitId>, lexical_type: LexicalType) -> bool {
    head.and_then(|id| arena.get(id))
        .is_some_and(|n| n.lexical_type == lexical_type)
}
