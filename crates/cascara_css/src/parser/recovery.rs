use crate::tokenizer::TokenType;
use crate::Css3;

/// What is being skipped after an error
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Recovery {
    /// Up to and including the next `;`, or up to the `}` closing the enclosing block
    Declaration,
    /// Up to and including the `{}` block of a qualified rule
    Rule,
    /// Up to and including the `;` or the block that ends an at-rule
    AtRule,
}

impl Css3<'_> {
    /// Skips tokens until the construct that failed has ended. Strings, urls and comments are
    /// single tokens, so only brackets have to be counted. A `}` that closes the enclosing block
    /// is never consumed.
    pub(crate) fn recover(&mut self, mode: Recovery) {
        log::trace!("recover");

        let first = self.tokenizer.lookahead(0);
        let mut depth = 0usize;

        loop {
            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof => break,
                TokenType::RCurly if depth == 0 => break,
                TokenType::Semicolon if depth == 0 && mode != Recovery::Rule => {
                    self.tokenizer.consume();
                    break;
                }
                TokenType::LCurly if depth == 0 && mode != Recovery::Declaration => {
                    self.tokenizer.consume();
                    self.skip_block();
                    break;
                }
                TokenType::LParen
                | TokenType::LBracket
                | TokenType::LCurly
                | TokenType::Function(_) => depth += 1,
                TokenType::RParen | TokenType::RBracket | TokenType::RCurly => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.tokenizer.consume();
        }

        let last = self.tokenizer.current();
        if last.end > first.start {
            log::debug!(
                "skipped {:?} at {}",
                self.raw_text(&first, &last),
                first.location
            );
        }
    }

    /// Skips the rest of a block whose `{` has been consumed, including its `}`
    pub(crate) fn skip_block(&mut self) {
        let mut depth = 1usize;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Eof => return,
                TokenType::LCurly => depth += 1,
                TokenType::RCurly => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}
