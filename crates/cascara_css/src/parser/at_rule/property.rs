use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::parser::declaration::{Declaration, NestedAtRules};
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::{Token, TokenType};
use crate::values::LexicalType;
use crate::Css3;

/// Data types allowed between `<` and `>` in a `syntax` descriptor
const SYNTAX_TYPES: [&str; 15] = [
    "angle",
    "color",
    "custom-ident",
    "image",
    "integer",
    "length",
    "length-percentage",
    "number",
    "percentage",
    "resolution",
    "string",
    "time",
    "transform-function",
    "transform-list",
    "url",
];

impl Css3<'_> {
    /// `@property --name { syntax; inherits; initial-value }`. The descriptors are reported as
    /// properties; a registration with missing or invalid descriptors ends with `discard` set.
    pub(crate) fn parse_property_rule(&mut self, at_keyword: &Token) -> ParseResult<()> {
        log::trace!("parse_property_rule");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let name = match t.token_type {
            TokenType::Ident(name) if name.starts_with("--") => name,
            _ => return Err(self.unexpected(&t, "custom property name")),
        };

        let open = self.open_block()?;
        self.sheet_state = SheetState::Body;

        self.handler.start_property(&name);
        let descriptors = self.parse_declaration_list(NestedAtRules::None, true);
        self.close_block(&open);

        let discard = match validate_descriptors(&descriptors) {
            Ok(()) => false,
            Err(message) => {
                self.report_error(ParseError::new(
                    ErrorKind::Value,
                    format!("@property {name}: {message}"),
                    at_keyword.location,
                ));
                true
            }
        };
        self.handler.end_property(&name, discard);

        Ok(())
    }
}

fn descriptor<'a>(descriptors: &'a [Declaration], name: &str) -> Option<&'a Declaration> {
    descriptors.iter().rev().find(|d| d.name == name)
}

fn validate_descriptors(descriptors: &[Declaration]) -> Result<(), String> {
    let syntax = descriptor(descriptors, "syntax").ok_or("missing 'syntax' descriptor")?;
    let head = syntax.value.head();
    if head.lexical_type() != LexicalType::String || head.next().is_some() {
        return Err("'syntax' must be a string".into());
    }
    let syntax = head.string_value().unwrap_or_default().trim();
    if !valid_syntax(syntax) {
        return Err(format!("invalid syntax \"{syntax}\""));
    }

    let inherits = descriptor(descriptors, "inherits").ok_or("missing 'inherits' descriptor")?;
    let head = inherits.value.head();
    let keyword = head.string_value().unwrap_or_default();
    if head.lexical_type() != LexicalType::Ident
        || head.next().is_some()
        || !(keyword.eq_ignore_ascii_case("true") || keyword.eq_ignore_ascii_case("false"))
    {
        return Err("'inherits' must be 'true' or 'false'".into());
    }

    if syntax != "*" && descriptor(descriptors, "initial-value").is_none() {
        return Err("missing 'initial-value' descriptor".into());
    }

    Ok(())
}

/// `*`, or `|` separated components that are a `<type>` or an identifier, each with an optional
/// `+` or `#` multiplier
fn valid_syntax(syntax: &str) -> bool {
    if syntax == "*" {
        return true;
    }

    syntax.split('|').all(|component| {
        let component = component.trim();
        let base = component
            .strip_suffix('+')
            .or_else(|| component.strip_suffix('#'))
            .unwrap_or(component);

        match base.strip_prefix('<').and_then(|b| b.strip_suffix('>')) {
            Some(data_type) => {
                SYNTAX_TYPES.contains(&data_type)
                    && !(data_type == "transform-list" && base.len() != component.len())
            }
            None => {
                !base.is_empty()
                    && base == component
                    && !base.starts_with(|c: char| c.is_ascii_digit())
                    && base.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
                    && !matches!(
                        base.to_ascii_lowercase().as_str(),
                        "initial" | "inherit" | "unset" | "revert" | "default"
                    )
            }
        }
    })
}
