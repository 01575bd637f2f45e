use crate::errors::{ErrorKind, ParseError, ParseResult};
use crate::parser_config::Flags;
use crate::tokenizer::{Token, TokenType};
use crate::Css3;
use cascara_shared::byte_stream::Location;

mod anplusb;
mod at_rule;
mod calc;
mod declaration;
mod function;
mod media;
mod pseudo;
mod recovery;
mod selector;
pub(crate) mod stylesheet;
mod supports;
mod unicode_range;
mod value;

impl Css3<'_> {
    /// Consumes a specific token
    pub(crate) fn consume(&mut self, token_type: TokenType) -> ParseResult<Token> {
        let t = self.tokenizer.consume();
        if t.token_type != token_type {
            return Err(self.unexpected(&t, &Token::describe_type(&token_type)));
        }

        Ok(t)
    }

    pub(crate) fn consume_any_ident(&mut self) -> ParseResult<String> {
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Ident(s) => Ok(s),
            _ => Err(self.unexpected(&t, "identifier")),
        }
    }

    /// Skips whitespace and comments. Returns true when anything was skipped.
    pub(crate) fn consume_whitespace_comments(&mut self) -> bool {
        let mut skipped = false;
        loop {
            let t = self.tokenizer.lookahead(0);
            if !t.is_whitespace() && !t.is_comment() {
                return skipped;
            }
            self.tokenizer.consume();
            skipped = true;
        }
    }

    /// Error for a token that does not fit the grammar at this point
    pub(crate) fn unexpected(&self, t: &Token, expected: &str) -> ParseError {
        let message = match &t.token_type {
            TokenType::Eof => format!("Expected {expected}, found end of input"),
            TokenType::BadString(_) => "Unterminated string".to_string(),
            TokenType::BadUrl(_) => "Invalid url".to_string(),
            TokenType::BadComment(_) => "Unterminated comment".to_string(),
            _ => format!("Expected {expected}, found '{t}'"),
        };

        let kind = match t.token_type {
            TokenType::BadString(_) | TokenType::BadUrl(_) | TokenType::BadComment(_) => {
                ErrorKind::Tokenization
            }
            _ => ErrorKind::Syntax,
        };

        ParseError::new(kind, message, t.location)
    }

    pub(crate) fn has_flag(&self, flag: Flags) -> bool {
        self.config.has_flag(flag)
    }

    pub(crate) fn report_error(&mut self, error: ParseError) {
        log::debug!(
            "{}: error: {error}",
            self.config.source.as_deref().unwrap_or("css")
        );
        self.error_handler.error(&error);
    }

    pub(crate) fn report_warning(&mut self, kind: ErrorKind, message: impl Into<String>, location: Location) {
        let warning = ParseError::new(kind, message, location);
        log::debug!(
            "{}: warning: {warning}",
            self.config.source.as_deref().unwrap_or("css")
        );
        self.error_handler.warning(&warning);
    }

    /// Consumes tokens up to the closing parenthesis that matches an already consumed opening
    /// one, and returns them without the closing parenthesis
    pub(crate) fn consume_until_close_paren(&mut self, open: &Token) -> ParseResult<Vec<Token>> {
        self.consume_until_close(open, TokenType::RParen)
    }

    /// Same as [`Self::consume_until_close_paren`] for an already consumed `{`
    pub(crate) fn consume_until_close_curly(&mut self, open: &Token) -> ParseResult<Vec<Token>> {
        self.consume_until_close(open, TokenType::RCurly)
    }

    fn consume_until_close(&mut self, open: &Token, close: TokenType) -> ParseResult<Vec<Token>> {
        let mut depth = 0usize;
        let mut tokens = Vec::new();

        loop {
            let t = self.tokenizer.consume();
            if depth == 0 && t.token_type == close {
                return Ok(tokens);
            }

            match t.token_type {
                TokenType::Eof => {
                    let message = match close {
                        TokenType::RCurly => "Unclosed block",
                        _ => "Unclosed parenthesis",
                    };
                    return Err(ParseError::syntax(message, open.location));
                }
                TokenType::BadString(_) | TokenType::BadUrl(_) => {
                    let expected = Token::describe_type(&close);
                    return Err(self.unexpected(&t, &expected));
                }
                TokenType::RParen | TokenType::RBracket | TokenType::RCurly => {
                    depth = depth.saturating_sub(1);
                }
                TokenType::LParen
                | TokenType::LBracket
                | TokenType::LCurly
                | TokenType::Function(_) => depth += 1,
                _ => {}
            }
            tokens.push(t);
        }
    }

    /// Raw source text covered by a token range
    pub(crate) fn raw_text(&self, first: &Token, last: &Token) -> String {
        self.tokenizer.slice(first.start, last.end)
    }
}

/// Serializes tokens with whitespace collapsed to single spaces and comments dropped. No space is
/// kept after an opening or before a closing parenthesis, bracket or brace.
pub(crate) fn normalize_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut pending_space = false;

    for t in tokens {
        match &t.token_type {
            TokenType::Whitespace(_) => {
                pending_space = !out.is_empty();
                continue;
            }
            TokenType::Comment(_) | TokenType::BadComment(_) => continue,
            _ => {}
        }

        let closes = matches!(
            t.token_type,
            TokenType::RParen | TokenType::RBracket | TokenType::RCurly | TokenType::Comma
        );
        let after_open = out.ends_with('(') || out.ends_with('[') || out.ends_with('{');
        if pending_space && !closes && !after_open {
            out.push(' ');
        }
        pending_space = false;

        out.push_str(&t.to_css());
    }

    out
}

impl Token {
    fn describe_type(token_type: &TokenType) -> String {
        match token_type {
            TokenType::LCurly => "'{'".into(),
            TokenType::RCurly => "'}'".into(),
            TokenType::LParen => "'('".into(),
            TokenType::RParen => "')'".into(),
            TokenType::LBracket => "'['".into(),
            TokenType::RBracket => "']'".into(),
            TokenType::Colon => "':'".into(),
            TokenType::Semicolon => "';'".into(),
            TokenType::Comma => "','".into(),
            TokenType::Delim(c) => format!("'{c}'"),
            other => format!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use cascara_shared::byte_stream::{ByteStream, Stream};

    #[test]
    fn normalized_text() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("(  min-width :  100px )  and /* c */ ( color )");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        let mut tokens = Vec::new();
        while !tokenizer.eof() {
            tokens.push(tokenizer.consume());
        }

        assert_eq!(
            normalize_tokens(&tokens),
            "(min-width : 100px) and (color)"
        );
    }
}
