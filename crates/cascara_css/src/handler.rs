//! Callback interfaces driven by the parser.
//!
//! Every method has an empty default, so a handler only implements the events it cares about.

use crate::errors::ParseError;
use crate::media::MediaQueryList;
use crate::selector::SelectorList;
use crate::supports::BooleanCondition;
use crate::values::LexicalValue;
use cascara_shared::byte_stream::Location;
use serde::Serialize;

/// Line and column snapshot of a position in the source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Locator {
    pub line: usize,
    pub column: usize,
}

impl From<Location> for Locator {
    fn from(location: Location) -> Self {
        Self {
            line: location.line,
            column: location.column,
        }
    }
}

/// Receives the structure of the parsed source, in document order
#[allow(unused_variables)]
pub trait CssHandler {
    fn parse_start(&mut self, locator: &Locator) {}
    fn end_of_stream(&mut self) {}

    /// A comment between rules, without its delimiters
    fn comment(&mut self, text: &str, preceded_by_line_feed: bool) {}

    /// `@namespace`; the default namespace has an empty prefix
    fn namespace_declaration(&mut self, prefix: &str, uri: &str) {}
    fn import_style(&mut self, uri: &str, media: &MediaQueryList, layer: Option<&str>) {}

    /// Any at-rule that has no dedicated event, as raw source text
    fn ignorable_at_rule(&mut self, at_rule: &str) {}

    fn start_selector(&mut self, selectors: &SelectorList, locator: &Locator) {}
    fn end_selector(&mut self, selectors: &SelectorList) {}

    fn property(&mut self, name: &str, value: LexicalValue, important: bool, locator: &Locator) {}

    fn start_media(&mut self, media: &MediaQueryList) {}
    fn end_media(&mut self, media: &MediaQueryList) {}

    fn start_page(&mut self, page_selector: Option<&str>) {}
    fn end_page(&mut self, page_selector: Option<&str>) {}
    fn start_margin(&mut self, name: &str) {}
    fn end_margin(&mut self, name: &str) {}

    fn start_font_face(&mut self) {}
    fn end_font_face(&mut self) {}

    fn start_keyframes(&mut self, name: &str) {}
    fn end_keyframes(&mut self, name: &str) {}
    fn start_keyframe(&mut self, keys: &LexicalValue) {}
    fn end_keyframe(&mut self, keys: &LexicalValue) {}

    fn start_supports(&mut self, condition: &BooleanCondition) {}
    fn end_supports(&mut self, condition: &BooleanCondition) {}

    fn start_counter_style(&mut self, name: &str) {}
    fn end_counter_style(&mut self, name: &str) {}

    fn start_font_features(&mut self, family_names: &[String]) {}
    fn end_font_features(&mut self, family_names: &[String]) {}
    fn start_feature_map(&mut self, name: &str) {}
    fn end_feature_map(&mut self, name: &str) {}

    fn start_viewport(&mut self) {}
    fn end_viewport(&mut self) {}

    /// `@property`
    fn start_property(&mut self, name: &str) {}
    /// `discard` is set when a required descriptor was missing or invalid
    fn end_property(&mut self, name: &str, discard: bool) {}
}

/// Handler that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;

impl CssHandler for NoopHandler {}

/// Receives problems found while parsing. Warnings leave the construct in place, errors mean
/// the construct was dropped.
pub trait CssErrorHandler {
    fn warning(&mut self, error: &ParseError);
    fn error(&mut self, error: &ParseError);
}

/// Error handler that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreErrors;

impl CssErrorHandler for IgnoreErrors {
    fn warning(&mut self, error: &ParseError) {
        log::debug!("css warning: {error}");
    }

    fn error(&mut self, error: &ParseError) {
        log::debug!("css error: {error}");
    }
}

/// Error handler that keeps everything it receives
#[derive(Clone, Debug, Default)]
pub struct CollectErrors {
    pub warnings: Vec<ParseError>,
    pub errors: Vec<ParseError>,
}

impl CollectErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl CssErrorHandler for CollectErrors {
    fn warning(&mut self, error: &ParseError) {
        self.warnings.push(error.clone());
    }

    fn error(&mut self, error: &ParseError) {
        self.errors.push(error.clone());
    }
}
