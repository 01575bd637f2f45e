use derive_more::Display;
use encoding_rs::{Encoding, UTF_8};
use std::fmt::{Debug, Formatter};
use std::io::Read;
use std::{fmt, io};

pub const CHAR_LF: char = '\u{000A}';
pub const CHAR_CR: char = '\u{000D}';
pub const CHAR_FF: char = '\u{000C}';

/// Defines a single character/element in the stream.
///
/// Eof is denoted as a separate element, so is Empty to indicate that the buffer is empty but
/// not yet closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Character {
    /// Standard UTF character
    Ch(char),
    /// Stream buffer empty and closed
    StreamEnd,
    /// Stream buffer empty (but not closed)
    StreamEmpty,
}

use Character::*;

/// Converts the given character to a char. Stream markers are converted to 0x0000
impl From<&Character> for char {
    fn from(c: &Character) -> Self {
        match c {
            Ch(c) => *c,
            StreamEmpty | StreamEnd => 0x0000 as char,
        }
    }
}

impl From<Character> for char {
    fn from(c: Character) -> Self {
        char::from(&c)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ch(ch) => write!(f, "{ch}"),
            StreamEnd => write!(f, "StreamEnd"),
            StreamEmpty => write!(f, "StreamEmpty"),
        }
    }
}

impl Character {
    /// Returns true when the character is CSS whitespace (space, tab or newline). Newlines are
    /// already normalized to LF by the stream.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Ch(' ' | '\t' | CHAR_LF))
    }

    /// Returns true when the character is an ASCII digit
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_digit())
    }

    /// Returns true when the character is an ASCII hex digit
    pub fn is_hex_digit(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_hexdigit())
    }
}

/// Configuration structure for a bytestream.
#[derive(Clone, Debug)]
pub struct Config {
    /// Treat CRLF pairs, lone CR and FF as a single LF
    pub normalize_newlines: bool,
    /// Replace NUL characters with U+FFFD while filling the buffer
    pub replace_null: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalize_newlines: true,
            replace_null: false,
        }
    }
}

/// Decoded character buffer with a read position.
///
/// Input can be added as text or as raw bytes. Bytes are decoded up front, so the position and
/// every offset reported by the stream count characters, not bytes.
pub struct ByteStream {
    /// Decoded characters
    buffer: Vec<char>,
    /// Current position in the buffer
    position: usize,
    /// True when no more data will be added
    closed: bool,
    /// Encoding used for the last byte input
    encoding: &'static Encoding,
    // Configuration for the stream
    config: Config,
}

/// Generic stream trait
pub trait Stream {
    /// Read current character
    fn read(&self) -> Character;
    /// Read current character and advance to next
    fn read_and_next(&mut self) -> Character;
    /// Look ahead in the stream
    fn look_ahead(&self, offset: usize) -> Character;
    /// Advance with 1 character
    fn next(&mut self);
    /// Advance with offset characters
    fn next_n(&mut self, offset: usize);
    /// Seek to a specific character position
    fn seek(&mut self, position: usize);
    /// Tell the current character position
    fn tell(&self) -> usize;
    /// Retrieves the text between two character positions
    fn get_slice(&self, start: usize, end: usize) -> String;
    /// Resets the stream back to the start position
    fn reset_stream(&mut self);
    /// Closes the stream (no more data can be added)
    fn close(&mut self);
    /// Returns true when the stream is closed
    fn closed(&self) -> bool;
    /// Returns true when the stream is empty (but still open)
    fn exhausted(&self) -> bool;
    /// Returns true when the stream is closed and empty
    fn eof(&self) -> bool;
}

impl Default for ByteStream {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Stream for ByteStream {
    fn read(&self) -> Character {
        self.look_ahead(0)
    }

    fn read_and_next(&mut self) -> Character {
        let c = self.read();
        self.next();
        c
    }

    fn look_ahead(&self, offset: usize) -> Character {
        match self.buffer.get(self.position + offset) {
            Some(c) => Ch(*c),
            None if self.closed => StreamEnd,
            None => StreamEmpty,
        }
    }

    fn next(&mut self) {
        self.next_n(1);
    }

    fn next_n(&mut self, offset: usize) {
        self.position = (self.position + offset).min(self.buffer.len());
    }

    fn seek(&mut self, position: usize) {
        self.position = position.min(self.buffer.len());
    }

    fn tell(&self) -> usize {
        self.position
    }

    fn get_slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.buffer.len());
        if start >= end {
            return String::new();
        }

        self.buffer[start..end].iter().collect()
    }

    fn reset_stream(&mut self) {
        self.position = 0;
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn closed(&self) -> bool {
        self.closed
    }

    fn exhausted(&self) -> bool {
        self.position >= self.buffer.len()
    }

    fn eof(&self) -> bool {
        self.closed() && self.exhausted()
    }
}

impl ByteStream {
    /// Create a new default empty input stream
    #[must_use]
    pub fn new(config: Option<Config>) -> Self {
        Self {
            buffer: Vec::new(),
            position: 0,
            closed: false,
            encoding: UTF_8,
            config: config.unwrap_or_default(),
        }
    }

    /// Populates the current buffer with the contents of the given string s
    pub fn read_from_str(&mut self, s: &str) {
        self.buffer.clear();
        self.append_str(s);
        self.reset_stream();
    }

    /// Appends text to the buffer. A CR at the end of the previous chunk that is followed by LF in
    /// this chunk is already converted, so the pair ends up as two newlines only when
    /// normalization is disabled.
    pub fn append_str(&mut self, s: &str) {
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            let c = match c {
                CHAR_CR if self.config.normalize_newlines => {
                    if chars.peek() == Some(&CHAR_LF) {
                        chars.next();
                    }
                    CHAR_LF
                }
                CHAR_FF if self.config.normalize_newlines => CHAR_LF,
                '\0' if self.config.replace_null => char::REPLACEMENT_CHARACTER,
                c => c,
            };
            self.buffer.push(c);
        }
    }

    /// Read directly from bytes. The encoding is taken from a byte order mark, the given label,
    /// a leading `@charset "...";` rule, or defaults to UTF-8, in that order. Malformed sequences
    /// decode to U+FFFD.
    pub fn read_from_bytes(&mut self, bytes: &[u8], label: Option<&str>) {
        let encoding = match Encoding::for_bom(bytes) {
            Some((encoding, _)) => encoding,
            None => label
                .and_then(|l| Encoding::for_label(l.as_bytes()))
                .or_else(|| sniff_charset_rule(bytes))
                .unwrap_or(UTF_8),
        };

        log::debug!("decoding css input as {}", encoding.name());

        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            log::debug!("malformed {} sequences replaced", encoding.name());
        }

        self.encoding = encoding;
        self.read_from_str(&text);
        self.close();
    }

    /// Populates the current buffer with the contents of given reader f
    pub fn read_from_file(&mut self, mut f: impl Read, label: Option<&str>) -> io::Result<()> {
        let mut bytes = Vec::new();
        f.read_to_end(&mut bytes)?;
        self.read_from_bytes(&bytes, label);
        Ok(())
    }

    /// Name of the encoding that was used to decode byte input
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    /// Number of characters in the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Determine the fallback encoding from a `@charset "name";` prefix. UTF-16 labels are replaced by
/// UTF-8, since an ASCII-compatible prefix could not have been read in UTF-16.
fn sniff_charset_rule(bytes: &[u8]) -> Option<&'static Encoding> {
    const PREFIX: &[u8] = b"@charset \"";

    let rest = bytes.strip_prefix(PREFIX)?;
    let end = rest.iter().take(1024).position(|b| *b == b'"')?;
    if rest.get(end + 1) != Some(&b';') {
        return None;
    }

    let encoding = Encoding::for_label(&rest[..end])?;
    if encoding == encoding_rs::UTF_16BE || encoding == encoding_rs::UTF_16LE {
        return Some(UTF_8);
    }

    Some(encoding)
}

/// Location holds the start position of the given element in the data source
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{line}:{column}")]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Character offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// LocationHandler is a wrapper that will deal with line/column locations in the stream
#[derive(Clone, Debug)]
pub struct LocationHandler {
    /// The start offset of the location. Normally this is 1:1, but can be different in case of inline streams
    pub start_location: Location,
    /// The current location of the stream, relative to the start location
    pub cur_location: Location,
}

impl LocationHandler {
    /// Create a new LocationHandler. Start_location can be set in case the stream is
    /// not starting at 1:1
    pub fn new(start_location: Location) -> Self {
        Self {
            start_location,
            cur_location: Location::default(),
        }
    }

    /// Sets the current location to the given location. This is useful when we want to
    /// return back into the stream to a certain location.
    pub fn set(&mut self, loc: Location) {
        self.cur_location = loc;
    }

    /// Will increase the current location based on the given character
    pub fn inc(&mut self, ch: Character) {
        match ch {
            Ch(CHAR_LF) => {
                self.cur_location.line += 1;
                self.cur_location.column = 1;
                self.cur_location.offset += 1;
            }
            Ch(_) => {
                self.cur_location.column += 1;
                self.cur_location.offset += 1;
            }
            StreamEnd | StreamEmpty => {}
        }
    }

    /// Returns the current location with the start location taken into account. Only the first
    /// line is shifted by the start column.
    pub fn current(&self) -> Location {
        let column = if self.cur_location.line == 1 {
            self.start_location.column + self.cur_location.column - 1
        } else {
            self.cur_location.column
        };

        Location::new(
            self.start_location.line + self.cur_location.line - 1,
            column,
            self.start_location.offset + self.cur_location.offset,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stream() {
        let mut stream = ByteStream::new(None);
        assert!(stream.exhausted());
        assert!(!stream.eof());

        stream.read_from_str("f👽f");
        stream.close();
        assert!(!stream.eof());
        assert_eq!(stream.read_and_next(), Ch('f'));
        assert_eq!(stream.read_and_next(), Ch('👽'));
        assert_eq!(stream.read_and_next(), Ch('f'));
        assert!(stream.eof());
        assert!(matches!(stream.read_and_next(), StreamEnd));

        stream.reset_stream();
        assert_eq!(stream.look_ahead(1), Ch('👽'));
        assert_eq!(stream.get_slice(0, 2), "f👽");
    }

    #[test]
    fn test_open_stream_is_empty_not_ended() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("a");
        assert_eq!(stream.look_ahead(1), StreamEmpty);
        stream.close();
        assert_eq!(stream.look_ahead(1), StreamEnd);
    }

    #[test]
    fn test_newline_normalization() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("a\r\nb\rc\u{c}d");
        stream.close();
        assert_eq!(stream.get_slice(0, stream.len()), "a\nb\nc\nd");

        let mut stream = ByteStream::new(Some(Config {
            normalize_newlines: false,
            replace_null: true,
        }));
        stream.read_from_str("a\r\n\0");
        assert_eq!(stream.get_slice(0, 4), "a\r\n\u{FFFD}");
    }

    #[test]
    fn test_decoding() {
        let mut stream = ByteStream::new(None);
        stream.read_from_bytes(b"\xEF\xBB\xBFa{}", None);
        assert_eq!(stream.encoding(), "UTF-8");
        assert_eq!(stream.get_slice(0, stream.len()), "a{}");

        let mut stream = ByteStream::new(None);
        stream.read_from_bytes(b"@charset \"iso-8859-1\"; p{content:'\xe9'}", None);
        assert_eq!(stream.encoding(), "windows-1252");
        assert!(stream.get_slice(0, stream.len()).ends_with("'é'}"));

        let mut stream = ByteStream::new(None);
        stream.read_from_bytes(b"p{content:'\xe9'}", Some("latin1"));
        assert!(stream.get_slice(0, stream.len()).contains('é'));
    }

    #[test]
    fn test_read_from_file() {
        let mut stream = ByteStream::new(None);
        stream
            .read_from_file(&b"div { color: red }"[..], None)
            .unwrap();
        assert!(stream.closed());
        assert_eq!(stream.len(), 18);
    }

    #[test]
    fn test_location_handler() {
        let mut handler = LocationHandler::new(Location::new(3, 10, 100));
        handler.inc(Ch('a'));
        assert_eq!(handler.current(), Location::new(3, 11, 101));
        handler.inc(Ch('\n'));
        handler.inc(Ch('b'));
        assert_eq!(handler.current(), Location::new(4, 2, 102));
        assert_eq!(format!("{}", handler.current()), "4:2");
        assert_eq!(format!("{:?}", handler.current()), "(4:2)");
    }
}
