//! Code point classes from the CSS syntax definitions, shared by the tokenizer and the
//! serializers.

#[allow(clippy::module_name_repetitions)]
pub struct UnicodeChar;

impl UnicodeChar {
    pub const NULL: char = '\u{0000}';
    pub const BACKSPACE: char = '\u{0008}';
    pub const LINE_TABULATION: char = '\u{000B}';
    pub const SHIFT_OUT: char = '\u{000E}';
    pub const INFORMATION_SEPARATOR_ONE: char = '\u{001F}';
    pub const DELETE: char = '\u{007F}';
    pub const MAX_ALLOWED: char = '\u{10FFFF}';
    pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';
}

/// [ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || !c.is_ascii() || c == '_'
}

/// [ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
pub fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

/// [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
pub fn is_non_printable(c: char) -> bool {
    (UnicodeChar::NULL..=UnicodeChar::BACKSPACE).contains(&c)
        || c == UnicodeChar::LINE_TABULATION
        || (UnicodeChar::SHIFT_OUT..=UnicodeChar::INFORMATION_SEPARATOR_ONE).contains(&c)
        || c == UnicodeChar::DELETE
}

/// Control characters that never appear literally in serialized output
pub fn is_control(c: char) -> bool {
    (UnicodeChar::NULL..=UnicodeChar::INFORMATION_SEPARATOR_ONE).contains(&c)
        || c == UnicodeChar::DELETE
}
