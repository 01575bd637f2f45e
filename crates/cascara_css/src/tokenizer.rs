use crate::serialize::{escape_ident, escape_name, escape_unit, format_number, format_quantity, quote_string};
use crate::unicode::{is_ident_char, is_ident_start, is_non_printable, UnicodeChar};
use cascara_shared::byte_stream::Character::Ch;
use cascara_shared::byte_stream::{ByteStream, Character, Location, LocationHandler, Stream};
use std::fmt;

/// Numeric part of a number, percentage or dimension token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub value: f32,
    /// The source had no fraction and no exponent
    pub is_integer: bool,
    /// The source started with `+` or `-`
    pub has_sign: bool,
}

impl Number {
    pub fn integer(value: i32) -> Self {
        Self {
            value: value as f32,
            is_integer: true,
            has_sign: false,
        }
    }

    pub fn real(value: f32) -> Self {
        Self {
            value,
            is_integer: false,
            has_sign: false,
        }
    }

    pub fn int_value(&self) -> i32 {
        self.value as i32
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),
    Ident(String),
    /// The value does not include the opening parenthesis
    Function(String),
    Url(String),
    BadUrl(String),
    Dimension {
        value: Number,
        unit: String,
    },
    Percentage(Number),
    Number(Number),
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),
    /// A `<bad-string-token>`: a string cut off by a newline or the end of the input
    ///
    /// This token always indicates a parse error.
    BadString(String),
    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    Whitespace(String),
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "unrestricted"
    ///
    /// The value does not include the `#` marker.
    Hash(String),
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "id"
    ///
    /// The value does not include the `#` marker.
    IDHash(String),
    /// A `<delim-token>`
    Delim(char),
    /// A `<{-token>`
    LCurly,
    /// A `<}-token>`
    RCurly,
    /// A `<(-token>`
    LParen,
    /// A `<)-token>`
    RParen,
    /// A `<[-token>`
    LBracket,
    /// A `<]-token>`
    RBracket,
    /// A `<comma-token>`
    Comma,
    /// A `:` `<colon-token>`
    Colon,
    /// A `;` `<semicolon-token>`
    Semicolon,
    /// A `<!--` `<CDO-token>`
    Cdo,
    /// A `-->` `<CDC-token>`
    Cdc,
    /// A `<EOF-token>`
    Eof,
    /// A comment, without the `/*` and `*/` markers
    Comment(String),
    /// A comment that was not closed before the end of the input
    BadComment(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Location of the token in the stream
    pub location: Location,
    /// Stream position of the first character
    pub start: usize,
    /// Stream position after the last character
    pub end: usize,
}

impl Token {
    fn new(token_type: TokenType, location: Location, start: usize, end: usize) -> Token {
        Token {
            token_type,
            location,
            start,
            end,
        }
    }

    pub(crate) fn is_comma(&self) -> bool {
        matches!(self.token_type, TokenType::Comma)
    }

    pub(crate) fn is_ident(&self) -> bool {
        matches!(self.token_type, TokenType::Ident(_))
    }

    pub(crate) fn is_ident_ci(&self, name: &str) -> bool {
        matches!(&self.token_type, TokenType::Ident(s) if s.eq_ignore_ascii_case(name))
    }

    pub(crate) fn is_whitespace(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace(_))
    }

    pub(crate) fn is_comment(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::Comment(_) | TokenType::BadComment(_)
        )
    }

    pub(crate) fn is_colon(&self) -> bool {
        matches!(self.token_type, TokenType::Colon)
    }

    pub(crate) fn is_delim(&self, delim: char) -> bool {
        matches!(self.token_type, TokenType::Delim(c) if c == delim)
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }

    /// True when the other token starts exactly where this one ends
    pub(crate) fn touches(&self, other: &Token) -> bool {
        self.end == other.start
    }

    /// Serializes the token back to CSS text with minimal escaping
    pub fn to_css(&self) -> String {
        match &self.token_type {
            TokenType::AtKeyword(name) => format!("@{}", escape_ident(name)),
            TokenType::Ident(name) => escape_ident(name),
            TokenType::Function(name) => format!("{}(", escape_ident(name)),
            TokenType::Url(url) => format!("url({})", quote_string(url)),
            TokenType::BadUrl(_) => "url()".into(),
            TokenType::Dimension { value, unit } => {
                format!("{}{}", format_quantity(value.value), escape_unit(unit))
            }
            TokenType::Percentage(value) => format!("{}%", format_quantity(value.value)),
            TokenType::Number(value) => {
                let s = format_number(value.value, value.is_integer);
                if value.has_sign && value.value >= 0.0 {
                    format!("+{s}")
                } else {
                    s
                }
            }
            TokenType::QuotedString(s) | TokenType::BadString(s) => quote_string(s),
            TokenType::Whitespace(_) => " ".into(),
            TokenType::Hash(name) => format!("#{}", escape_name(name)),
            TokenType::IDHash(name) => format!("#{}", escape_ident(name)),
            TokenType::Delim(c) => c.to_string(),
            TokenType::LCurly => "{".into(),
            TokenType::RCurly => "}".into(),
            TokenType::LParen => "(".into(),
            TokenType::RParen => ")".into(),
            TokenType::LBracket => "[".into(),
            TokenType::RBracket => "]".into(),
            TokenType::Comma => ",".into(),
            TokenType::Colon => ":".into(),
            TokenType::Semicolon => ";".into(),
            TokenType::Cdo => "<!--".into(),
            TokenType::Cdc => "-->".into(),
            TokenType::Eof => String::new(),
            TokenType::Comment(text) | TokenType::BadComment(text) => format!("/*{text}*/"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

/// CSS Tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// Tokens are produced on demand and kept, so the parser can look ahead and rewind to any
/// earlier token position.
pub struct Tokenizer<'stream> {
    /// The stream of characters
    stream: &'stream mut ByteStream,
    /// Current position in the tokens list
    position: usize,
    /// Full list of all tokens produced by the tokenizer
    tokens: Vec<Token>,
    /// Line/column tracking of the character stream
    location_handler: LocationHandler,
}

impl<'stream> Tokenizer<'stream> {
    /// Creates a new tokenizer with the given stream that starts on the given location. This does not have
    /// to be 1/1, but can be any location.
    pub fn new(stream: &'stream mut ByteStream, location: Location) -> Self {
        Self {
            stream,
            position: 0,
            tokens: Vec::new(),
            location_handler: LocationHandler::new(location),
        }
    }

    /// Returns the location of the next token that will be consumed
    pub fn current_location(&mut self) -> Location {
        self.lookahead(0).location
    }

    /// Returns true when the next token is the end of the stream
    pub fn eof(&mut self) -> bool {
        self.lookahead(0).is_eof()
    }

    /// Returns the last consumed token, or EOF when nothing has been consumed yet
    pub fn current(&self) -> Token {
        match self.position.checked_sub(1).and_then(|p| self.tokens.get(p)) {
            Some(t) => t.clone(),
            None => Token::new(
                TokenType::Eof,
                self.location_handler.current(),
                self.stream.tell(),
                self.stream.tell(),
            ),
        }
    }

    /// Looks ahead at the offset'th token that is not whitespace or a comment
    pub(crate) fn lookahead_sc(&mut self, offset: usize) -> Token {
        let mut seen = 0;
        let mut i = 0;

        loop {
            let t = self.lookahead(i);
            if t.is_eof() {
                return t;
            }
            if !t.is_whitespace() && !t.is_comment() {
                if seen == offset {
                    return t;
                }
                seen += 1;
            }
            i += 1;
        }
    }

    /// Looks ahead at the next token with offset. So lookahead(0) will look at the token
    /// that will be consumed with consume()
    pub fn lookahead(&mut self, offset: usize) -> Token {
        self.fill(self.position + offset);

        match self.tokens.get(self.position + offset) {
            Some(t) => t.clone(),
            None => self.eof_token(),
        }
    }

    /// Consumes the next token and returns it
    pub fn consume(&mut self) -> Token {
        self.fill(self.position);

        let token = match self.tokens.get(self.position) {
            Some(t) => t.clone(),
            None => return self.eof_token(),
        };

        // EOF is sticky
        if !token.is_eof() {
            self.position += 1;
        }

        log::trace!("{:?}", token);

        token
    }

    /// Reconsumes will push the current position back so the next read will be the same token
    pub fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    /// Position in the token list, to be used with `seek`
    pub fn tell(&self) -> usize {
        self.position
    }

    /// Rewinds (or forwards) to a token position returned by `tell`
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Returns the raw source text between two stream positions
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.stream.get_slice(start, end)
    }

    fn eof_token(&self) -> Token {
        match self.tokens.last() {
            Some(t) if t.is_eof() => t.clone(),
            _ => Token::new(
                TokenType::Eof,
                self.location_handler.current(),
                self.stream.tell(),
                self.stream.tell(),
            ),
        }
    }

    /// Makes sure the token list holds the token at the given index, or ends with EOF
    fn fill(&mut self, index: usize) {
        while self.tokens.len() <= index {
            if self.tokens.last().is_some_and(|t| t.is_eof()) {
                return;
            }

            let token = self.consume_token();
            self.tokens.push(token);
        }
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Token {
        let loc = self.location_handler.current();
        let start = self.stream.tell();

        let token_type = self.consume_token_type();

        Token::new(token_type, loc, start, self.stream.tell())
    }

    fn consume_token_type(&mut self) -> TokenType {
        if self.look_ahead_slice(2) == "/*" {
            return self.consume_comment();
        }

        match self.current_char() {
            Character::StreamEnd | Character::StreamEmpty => TokenType::Eof,
            c if c.is_whitespace() => TokenType::Whitespace(self.consume_whitespace()),
            Ch(c @ ('"' | '\'')) => self.consume_string_token(c),
            Ch('#') => {
                // consume '#'
                self.next_char();

                if matches!(self.current_char(), Ch(c) if is_ident_char(c))
                    || self.is_start_of_escape(0)
                {
                    return if self.is_next_3_points_starts_ident_seq(0) {
                        TokenType::IDHash(self.consume_ident())
                    } else {
                        TokenType::Hash(self.consume_ident())
                    };
                }

                TokenType::Delim('#')
            }
            Ch(c @ ('(' | ')' | '[' | ']' | '{' | '}' | ',' | ':' | ';')) => {
                self.next_char();
                match c {
                    '(' => TokenType::LParen,
                    ')' => TokenType::RParen,
                    '[' => TokenType::LBracket,
                    ']' => TokenType::RBracket,
                    '{' => TokenType::LCurly,
                    '}' => TokenType::RCurly,
                    ',' => TokenType::Comma,
                    ':' => TokenType::Colon,
                    _ => TokenType::Semicolon,
                }
            }
            Ch('+') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                self.next_char();
                TokenType::Delim('+')
            }
            Ch('.') => {
                if self.stream.look_ahead(1).is_numeric() {
                    return self.consume_numeric_token();
                }

                self.next_char();
                TokenType::Delim('.')
            }
            Ch('-') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                if self.look_ahead_slice(3) == "-->" {
                    self.consume_chars(3);
                    return TokenType::Cdc;
                }

                if self.is_next_3_points_starts_ident_seq(0) {
                    return self.consume_ident_like_seq();
                }

                self.next_char();
                TokenType::Delim('-')
            }
            Ch('<') => {
                if self.look_ahead_slice(4) == "<!--" {
                    self.consume_chars(4);
                    return TokenType::Cdo;
                }

                self.next_char();
                TokenType::Delim('<')
            }
            Ch('@') => {
                // consume '@'
                self.next_char();

                if self.is_next_3_points_starts_ident_seq(0) {
                    return TokenType::AtKeyword(self.consume_ident());
                }

                TokenType::Delim('@')
            }
            Ch('\\') => {
                if self.is_start_of_escape(0) {
                    return self.consume_ident_like_seq();
                }

                // parse error: a backslash followed by a newline
                self.next_char();
                TokenType::Delim('\\')
            }
            c if c.is_numeric() => self.consume_numeric_token(),
            Ch(c) if is_ident_start(c) => self.consume_ident_like_seq(),
            Ch(c) => {
                self.next_char();
                TokenType::Delim(c)
            }
        }
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comment(&mut self) -> TokenType {
        // consume '/*'
        self.consume_chars(2);

        let mut comment = String::new();
        loop {
            if self.look_ahead_slice(2) == "*/" {
                self.consume_chars(2);
                return TokenType::Comment(comment);
            }

            match self.next_char() {
                Ch(c) => comment.push(c),
                _ => return TokenType::BadComment(comment),
            }
        }
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    /// Returns either a `<number-token>`, `<percentage-token>`, or `<dimension-token>`.
    fn consume_numeric_token(&mut self) -> TokenType {
        let number = self.consume_number();

        if self.is_next_3_points_starts_ident_seq(0) {
            let unit = self.consume_ident();
            return TokenType::Dimension {
                value: number,
                unit,
            };
        }

        if self.current_char() == Ch('%') {
            // consume '%'
            self.next_char();
            return TokenType::Percentage(number);
        }

        TokenType::Number(number)
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Returns either a `<string-token>` or `<bad-string-token>`.
    fn consume_string_token(&mut self, ending: char) -> TokenType {
        // consume the opening quote
        self.next_char();

        let mut value = String::new();

        loop {
            match self.current_char() {
                Ch(c) if c == ending => {
                    self.next_char();
                    return TokenType::QuotedString(value);
                }
                Character::StreamEnd | Character::StreamEmpty => {
                    return TokenType::BadString(value);
                }
                // newline: parser error, the newline is not consumed
                Ch('\n') => return TokenType::BadString(value),
                Ch('\\') => match self.stream.look_ahead(1) {
                    // escaped newline is a line continuation
                    Ch('\n') => {
                        self.consume_chars(2);
                    }
                    Character::StreamEnd | Character::StreamEmpty => {
                        self.next_char();
                    }
                    _ => value.push(self.consume_escaped_token()),
                },
                Ch(c) => {
                    self.next_char();
                    value.push(c);
                }
            }
        }
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> Number {
        let mut value = String::new();
        let mut is_integer = true;
        let mut has_sign = false;

        if matches!(self.current_char(), Ch('+' | '-')) {
            has_sign = true;
            value.push(self.next_char().into());
        }

        value.push_str(&self.consume_digits());

        if self.current_char() == Ch('.') && self.stream.look_ahead(1).is_numeric() {
            is_integer = false;
            value.push_str(&self.consume_chars(2));
            value.push_str(&self.consume_digits());
        }

        let c1 = self.stream.look_ahead(0);
        let c2 = self.stream.look_ahead(1);
        let c3 = self.stream.look_ahead(2);
        if matches!(c1, Ch('e' | 'E'))
            && ((matches!(c2, Ch('-' | '+')) && c3.is_numeric()) || c2.is_numeric())
        {
            is_integer = false;
            value.push(self.next_char().into());
            value.push(self.next_char().into());
            value.push_str(&self.consume_digits());
        }

        let parsed = value.parse::<f64>().unwrap_or(0.0);

        Number {
            value: parsed as f32,
            is_integer,
            has_sign,
        }
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns: `<ident-token>`, `<function-token>`, `<url-token>`, or `<bad-url-token>`.
    fn consume_ident_like_seq(&mut self) -> TokenType {
        let value = self.consume_ident();

        if self.current_char() != Ch('(') {
            return TokenType::Ident(value);
        }

        // consume '('
        self.next_char();

        if !value.eq_ignore_ascii_case("url") {
            return TokenType::Function(value);
        }

        let mut i = 0;
        while self.stream.look_ahead(i).is_whitespace() {
            i += 1;
        }

        if matches!(self.stream.look_ahead(i), Ch('"' | '\'')) {
            return TokenType::Function(value);
        }

        self.consume_url()
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Returns either a `<url-token>` or a `<bad-url-token>`
    fn consume_url(&mut self) -> TokenType {
        let mut url = String::new();

        self.consume_whitespace();

        loop {
            match self.current_char() {
                Ch(')') => {
                    self.next_char();
                    return TokenType::Url(url);
                }
                // parse error: unterminated url
                Character::StreamEnd | Character::StreamEmpty => {
                    return TokenType::BadUrl(url);
                }
                c if c.is_whitespace() => {
                    self.consume_whitespace();
                    if self.current_char() == Ch(')') {
                        continue;
                    }
                    self.consume_remnants_of_bad_url();
                    return TokenType::BadUrl(url);
                }
                Ch('"' | '\'' | '(') => {
                    self.consume_remnants_of_bad_url();
                    return TokenType::BadUrl(url);
                }
                Ch(c) if is_non_printable(c) => {
                    self.consume_remnants_of_bad_url();
                    return TokenType::BadUrl(url);
                }
                Ch('\\') => {
                    if self.is_start_of_escape(0) {
                        url.push(self.consume_escaped_token());
                    } else {
                        self.consume_remnants_of_bad_url();
                        return TokenType::BadUrl(url);
                    }
                }
                Ch(c) => {
                    self.next_char();
                    url.push(c);
                }
            }
        }
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Used is to consume enough of the input stream to reach a recovery point where normal tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            match self.current_char() {
                Ch(')') => {
                    self.next_char();
                    return;
                }
                Character::StreamEnd | Character::StreamEmpty => return,
                _ if self.is_start_of_escape(0) => {
                    self.consume_escaped_token();
                }
                _ => {
                    self.next_char();
                }
            }
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    fn consume_escaped_token(&mut self) -> char {
        // consume '\'
        self.next_char();

        let default_char = UnicodeChar::REPLACEMENT_CHARACTER;

        if !self.current_char().is_hex_digit() {
            return match self.next_char() {
                Ch(c) => c,
                // eof: parser error
                _ => default_char,
            };
        }

        let mut value = String::new();
        while self.current_char().is_hex_digit() && value.len() < 6 {
            value.push(self.next_char().into());
        }

        if self.current_char().is_whitespace() {
            self.next_char();
        }

        match u32::from_str_radix(&value, 16).ok().and_then(char::from_u32) {
            Some(c) if c != UnicodeChar::NULL && c <= UnicodeChar::MAX_ALLOWED => c,
            _ => default_char,
        }
    }

    /// 4.3.11. [Consume an ident
    /// sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Note: that algorithm does not do the verification that are necessary to
    /// ensure the returned code points would constitute an <ident-token>.
    /// Caller should ensure that the stream starts with an ident sequence before calling this
    /// algorithm.
    fn consume_ident(&mut self) -> String {
        let mut value = String::new();

        loop {
            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_token());
                continue;
            }

            match self.current_char() {
                Ch(c) if is_ident_char(c) => {
                    self.next_char();
                    value.push(c);
                }
                _ => break,
            }
        }

        value
    }

    fn consume_digits(&mut self) -> String {
        let mut value = String::new();

        while self.current_char().is_numeric() {
            value.push(self.next_char().into());
        }

        value
    }

    fn consume_chars(&mut self, len: usize) -> String {
        (0..len).map(|_| char::from(self.next_char())).collect()
    }

    fn consume_whitespace(&mut self) -> String {
        let mut value = String::new();
        while self.current_char().is_whitespace() {
            value.push(self.next_char().into());
        }

        value
    }

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_start_of_escape(&self, start: usize) -> bool {
        let current_char = self.stream.look_ahead(start);
        let next_char = self.stream.look_ahead(start + 1);

        current_char == Ch('\\') && next_char != Ch('\n')
    }

    /// [4.3.9. Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn is_next_3_points_starts_ident_seq(&self, start: usize) -> bool {
        match self.stream.look_ahead(start) {
            Ch('-') => {
                let second = self.stream.look_ahead(start + 1);
                matches!(second, Ch(c) if is_ident_start(c) || c == '-')
                    || self.is_start_of_escape(start + 1)
            }
            Ch('\\') => self.is_start_of_escape(start),
            Ch(c) => is_ident_start(c),
            _ => false,
        }
    }

    /// e.g. +1, -1, +.1, -0.01
    fn is_signed_decimal(&self, start: usize) -> bool {
        let current = self.stream.look_ahead(start);
        let next = self.stream.look_ahead(start + 1);
        let last = self.stream.look_ahead(start + 2);

        matches!(current, Ch('+' | '-'))
            && ((next == Ch('.') && last.is_numeric()) || next.is_numeric())
    }

    fn current_char(&self) -> Character {
        self.stream.look_ahead(0)
    }

    fn next_char(&mut self) -> Character {
        let c = self.stream.read_and_next();
        self.location_handler.inc(c);

        c
    }

    fn look_ahead_slice(&self, len: usize) -> String {
        let mut s = String::new();

        for i in 0..len {
            match self.stream.look_ahead(i) {
                Ch(c) => s.push(c),
                _ => break,
            }
        }

        s
    }
}
