//! CSS3/CSS4 tokenizer and event driven parser.
//!
//! Style sheets, declaration lists, selector lists, `@supports` conditions and media query lists
//! are parsed from a [`ByteStream`] or a string. Sheets and declarations are reported as events to
//! a [`CssHandler`]; problems go to a [`CssErrorHandler`]. Property values are chains of lexical
//! units ([`LexicalValue`]), selectors are trees ([`Selector`]) and every node serializes back to
//! CSS through `Display`.
//!
//! ```
//! use cascara_css::{CssParser, EventRecorder, CollectErrors};
//!
//! let parser = CssParser::new();
//! let mut events = EventRecorder::new();
//! let mut errors = CollectErrors::new();
//! parser
//!     .parse_style_sheet_str("p { color: #FFF }", &mut events, &mut errors)
//!     .unwrap();
//!
//! let properties = events.properties();
//! assert_eq!(properties[0].1.to_string(), "#fff");
//! ```

use crate::handler::Locator;
use crate::parser::stylesheet::SheetState;
use crate::tokenizer::Tokenizer;
use cascara_shared::byte_stream::{ByteStream, Stream};
use indexmap::IndexMap;
use std::io::Read;

pub mod errors;
pub mod handler;
pub mod media;
mod parser;
pub mod parser_config;
pub mod recorder;
pub mod selector;
pub mod serialize;
pub mod supports;
pub mod tokenizer;
mod unicode;
pub mod values;

pub use errors::{CssError, CssResult, ErrorKind, ParseError};
pub use handler::{CollectErrors, CssErrorHandler, CssHandler, IgnoreErrors, NoopHandler};
pub use media::{MediaQuery, MediaQueryList};
pub use parser_config::{Flags, ParserConfig};
pub use recorder::{CssEvent, EventRecorder};
pub use selector::{Condition, Selector, SelectorList};
pub use supports::{BooleanCondition, SupportsPredicate};
pub use values::{LexicalType, LexicalValue, UnitRef};

/// Namespace prefixes mapped to their uri. The default namespace has the empty prefix.
pub type Namespaces = IndexMap<String, String>;

/// Parse engine for a single parse call
pub(crate) struct Css3<'a> {
    /// The tokenizer is responsible for reading the input stream
    pub tokenizer: Tokenizer<'a>,
    /// The parser configuration as given
    config: ParserConfig,
    handler: &'a mut dyn CssHandler,
    error_handler: &'a mut dyn CssErrorHandler,
    /// Namespaces declared so far
    namespaces: Namespaces,
    /// Which of the rules that must come first are still allowed
    sheet_state: SheetState,
    /// A missing `}` at the end of the input is reported once
    eof_reported: bool,
}

impl<'a> Css3<'a> {
    fn new(
        stream: &'a mut ByteStream,
        config: ParserConfig,
        handler: &'a mut dyn CssHandler,
        error_handler: &'a mut dyn CssErrorHandler,
    ) -> Self {
        Self {
            tokenizer: Tokenizer::new(stream, config.location),
            config,
            handler,
            error_handler,
            namespaces: Namespaces::new(),
            sheet_state: SheetState::Start,
            eof_reported: false,
        }
    }
}

/// Public entry point of the parser. Holds the configuration only, every parse call runs on its
/// own engine.
#[derive(Clone, Debug, Default)]
pub struct CssParser {
    config: ParserConfig,
}

impl CssParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Enables a flag, or every flag of a union
    pub fn set_flag(&mut self, flag: Flags) {
        self.config.flags.insert(flag);
    }

    pub fn unset_flag(&mut self, flag: Flags) {
        self.config.flags.remove(flag);
    }

    pub fn has_flag(&self, flag: Flags) -> bool {
        self.config.has_flag(flag)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a complete style sheet, reporting it to the handler. Grammar errors are reported
    /// to the error handler and never abort the parse.
    pub fn parse_style_sheet(
        &self,
        stream: &mut ByteStream,
        handler: &mut dyn CssHandler,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut css = Css3::new(stream, self.config.clone(), handler, error_handler);
        css.parse_stylesheet_internal();
        Ok(())
    }

    pub fn parse_style_sheet_str(
        &self,
        data: &str,
        handler: &mut dyn CssHandler,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut stream = stream_from_str(data);
        self.parse_style_sheet(&mut stream, handler, error_handler)
    }

    /// Reads and decodes the whole reader before parsing. `label` is the encoding given by the
    /// transport, if any. Read failures are returned as [`CssError::Io`].
    pub fn parse_style_sheet_reader(
        &self,
        reader: impl Read,
        label: Option<&str>,
        handler: &mut dyn CssHandler,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut stream = ByteStream::new(None);
        stream.read_from_file(reader, label)?;
        self.parse_style_sheet(&mut stream, handler, error_handler)
    }

    /// Parses the contents of a `style` attribute: declarations without surrounding braces
    pub fn parse_style_declaration(
        &self,
        stream: &mut ByteStream,
        handler: &mut dyn CssHandler,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut css = Css3::new(stream, self.config.clone(), handler, error_handler);
        css.parse_style_declaration_internal();
        Ok(())
    }

    pub fn parse_style_declaration_str(
        &self,
        data: &str,
        handler: &mut dyn CssHandler,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut stream = stream_from_str(data);
        self.parse_style_declaration(&mut stream, handler, error_handler)
    }

    /// Parses a selector list. The whole input must be one valid list; the first error is
    /// returned. Warnings, such as dropped duplicates, go to the error handler.
    pub fn parse_selectors(
        &self,
        stream: &mut ByteStream,
        error_handler: &mut dyn CssErrorHandler,
    ) -> CssResult<SelectorList> {
        let mut handler = NoopHandler;
        let mut css = Css3::new(stream, self.config.clone(), &mut handler, error_handler);
        Ok(css.parse_selectors_internal()?)
    }

    pub fn parse_selectors_str(&self, data: &str) -> CssResult<SelectorList> {
        let mut stream = stream_from_str(data);
        self.parse_selectors(&mut stream, &mut IgnoreErrors)
    }

    /// Parses the condition of an `@supports` rule. `namespaces` resolves prefixes used in
    /// `selector()` tests.
    pub fn parse_supports_condition(
        &self,
        data: &str,
        namespaces: Option<&Namespaces>,
    ) -> CssResult<BooleanCondition> {
        let mut stream = stream_from_str(data);
        let mut handler = NoopHandler;
        let mut error_handler = IgnoreErrors;
        let mut css = Css3::new(&mut stream, self.config.clone(), &mut handler, &mut error_handler);
        if let Some(namespaces) = namespaces {
            css.namespaces = namespaces.clone();
        }

        Ok(css.parse_supports_condition_internal()?)
    }

    /// Parses a single property value, without priority
    pub fn parse_property_value(&self, data: &str) -> CssResult<LexicalValue> {
        let mut stream = stream_from_str(data);
        let mut handler = NoopHandler;
        let mut error_handler = IgnoreErrors;
        let mut css = Css3::new(&mut stream, self.config.clone(), &mut handler, &mut error_handler);

        Ok(css.parse_property_value_internal()?)
    }

    /// Parses a media query list. Invalid queries become `not all` and are reported to the
    /// error handler.
    pub fn parse_media_query_list(
        &self,
        data: &str,
        error_handler: &mut dyn CssErrorHandler,
    ) -> MediaQueryList {
        let mut stream = stream_from_str(data);
        let mut handler = NoopHandler;
        let mut css = Css3::new(&mut stream, self.config.clone(), &mut handler, error_handler);

        css.parse_media_query_list_internal()
    }

    /// Location of the start of the source, as given in the configuration
    pub fn start_locator(&self) -> Locator {
        Locator::from(self.config.location)
    }
}

fn stream_from_str(data: &str) -> ByteStream {
    let mut stream = ByteStream::new(None);
    stream.read_from_str(data);
    stream.close();
    stream
}
