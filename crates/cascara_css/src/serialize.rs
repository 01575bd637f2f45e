//! Minimal escaping for identifiers, names and strings, following
//! [CSSOM serialization](https://drafts.csswg.org/cssom/#common-serializing-idioms).
//!
//! Hex escapes are only followed by a space when the next character would otherwise be read as
//! part of the escape, or when the escape ends the identifier (the caller may append whitespace
//! that would be swallowed by the escape).

use crate::unicode::{is_control, UnicodeChar};
use std::fmt::Write;

fn push_hex_escape(out: &mut String, c: char, next: Option<char>) {
    let _ = write!(out, "\\{:x}", c as u32);
    match next {
        Some(n) if !n.is_ascii_hexdigit() && !matches!(n, ' ' | '\t' | '\n') => {}
        _ => out.push(' '),
    }
}

/// [Serialize an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
pub fn escape_ident(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    if chars.len() == 1 && chars[0] == '-' {
        return "\\-".into();
    }

    for (i, &c) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();

        if c == UnicodeChar::NULL {
            out.push(UnicodeChar::REPLACEMENT_CHARACTER);
        } else if is_control(c)
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            push_hex_escape(&mut out, c, next);
        } else if c as u32 >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

/// Serializes the name part of a hash or a unit, where a leading digit is allowed
pub fn escape_name(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == UnicodeChar::NULL {
            out.push(UnicodeChar::REPLACEMENT_CHARACTER);
        } else if is_control(c) {
            push_hex_escape(&mut out, c, chars.get(i + 1).copied());
        } else if c as u32 >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

/// Serializes a unit directly following a number. An `e` that could be read back as an exponent
/// is escaped.
pub fn escape_unit(unit: &str) -> String {
    let mut chars = unit.chars();
    match (chars.next(), chars.next()) {
        (Some(e @ ('e' | 'E')), Some(n)) if n.is_ascii_digit() || n == '-' || n == '+' => {
            let rest: String = unit.chars().skip(1).collect();
            format!("\\{:x} {}", e as u32, escape_name(&rest))
        }
        _ => escape_name(unit),
    }
}

/// [Serialize a string](https://drafts.csswg.org/cssom/#serialize-a-string). Double quotes are
/// preferred; single quotes are used when that saves escaping.
pub fn quote_string(value: &str) -> String {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };

    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);

    for (i, &c) in chars.iter().enumerate() {
        if c == UnicodeChar::NULL {
            out.push(UnicodeChar::REPLACEMENT_CHARACTER);
        } else if is_control(c) {
            push_hex_escape(&mut out, c, chars.get(i + 1).copied());
        } else if c == quote || c == '\\' {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }

    out.push(quote);
    out
}

/// Formats a number the shortest way that reads back to the same value. Reals keep a fractional
/// part so they are not read back as integers.
pub fn format_number(value: f32, is_integer: bool) -> String {
    if is_integer {
        return format!("{}", value as i64);
    }

    let s = format!("{value}");
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

/// Formats a number that is followed by a unit or `%`. No fractional part is forced.
pub fn format_quantity(value: f32) -> String {
    format!("{value}")
}
