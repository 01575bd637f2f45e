use crate::handler::{CssHandler, Locator};
use crate::media::MediaQueryList;
use crate::selector::SelectorList;
use crate::supports::BooleanCondition;
use crate::values::LexicalValue;
use serde::Serialize;
use std::io::Write;

/// One handler callback, as recorded by [`EventRecorder`]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CssEvent {
    ParseStart,
    EndOfStream,
    Comment {
        text: String,
        preceded_by_line_feed: bool,
    },
    Namespace {
        prefix: String,
        uri: String,
    },
    ImportStyle {
        uri: String,
        media: MediaQueryList,
        layer: Option<String>,
    },
    IgnorableAtRule {
        text: String,
    },
    StartSelector {
        selectors: SelectorList,
        locator: Locator,
    },
    EndSelector {
        selectors: SelectorList,
    },
    Property {
        name: String,
        value: LexicalValue,
        important: bool,
        locator: Locator,
    },
    StartMedia {
        media: MediaQueryList,
    },
    EndMedia {
        media: MediaQueryList,
    },
    StartPage {
        selector: Option<String>,
    },
    EndPage {
        selector: Option<String>,
    },
    StartMargin {
        name: String,
    },
    EndMargin {
        name: String,
    },
    StartFontFace,
    EndFontFace,
    StartKeyframes {
        name: String,
    },
    EndKeyframes {
        name: String,
    },
    StartKeyframe {
        keys: LexicalValue,
    },
    EndKeyframe {
        keys: LexicalValue,
    },
    StartSupports {
        condition: BooleanCondition,
    },
    EndSupports {
        condition: BooleanCondition,
    },
    StartCounterStyle {
        name: String,
    },
    EndCounterStyle {
        name: String,
    },
    StartFontFeatures {
        family_names: Vec<String>,
    },
    EndFontFeatures {
        family_names: Vec<String>,
    },
    StartFeatureMap {
        name: String,
    },
    EndFeatureMap {
        name: String,
    },
    StartViewport,
    EndViewport,
    StartProperty {
        name: String,
    },
    EndProperty {
        name: String,
        discard: bool,
    },
}

impl CssEvent {
    /// Starts a nested group of events
    pub fn opens(&self) -> bool {
        use CssEvent::*;
        matches!(
            self,
            StartSelector { .. }
                | StartMedia { .. }
                | StartPage { .. }
                | StartMargin { .. }
                | StartFontFace
                | StartKeyframes { .. }
                | StartKeyframe { .. }
                | StartSupports { .. }
                | StartCounterStyle { .. }
                | StartFontFeatures { .. }
                | StartFeatureMap { .. }
                | StartViewport
                | StartProperty { .. }
        )
    }

    /// Ends the group started by the matching `opens` event
    pub fn closes(&self) -> bool {
        use CssEvent::*;
        matches!(
            self,
            EndSelector { .. }
                | EndMedia { .. }
                | EndPage { .. }
                | EndMargin { .. }
                | EndFontFace
                | EndKeyframes { .. }
                | EndKeyframe { .. }
                | EndSupports { .. }
                | EndCounterStyle { .. }
                | EndFontFeatures { .. }
                | EndFeatureMap { .. }
                | EndViewport
                | EndProperty { .. }
        )
    }

    fn describe(&self) -> String {
        use CssEvent::*;
        match self {
            ParseStart => "[ParseStart]".into(),
            EndOfStream => "[EndOfStream]".into(),
            Comment { text, .. } => format!("[Comment] {text}"),
            Namespace { prefix, uri } => format!("[Namespace] {prefix} {uri}"),
            ImportStyle { uri, media, layer } => match layer {
                Some(layer) => format!("[Import] {uri} layer({layer}) {media}"),
                None => format!("[Import] {uri} {media}"),
            },
            IgnorableAtRule { text } => format!("[AtRule] {text}"),
            StartSelector { selectors, .. } => format!("[StartSelector] {selectors}"),
            EndSelector { selectors } => format!("[EndSelector] {selectors}"),
            Property {
                name,
                value,
                important,
                ..
            } => {
                if *important {
                    format!("[Property] {name}: {value} !important")
                } else {
                    format!("[Property] {name}: {value}")
                }
            }
            StartMedia { media } => format!("[StartMedia] {media}"),
            EndMedia { media } => format!("[EndMedia] {media}"),
            StartPage { selector: None } => "[StartPage]".into(),
            StartPage {
                selector: Some(selector),
            } => format!("[StartPage] {selector}"),
            EndPage { selector: None } => "[EndPage]".into(),
            EndPage {
                selector: Some(selector),
            } => format!("[EndPage] {selector}"),
            StartMargin { name } => format!("[StartMargin] {name}"),
            EndMargin { name } => format!("[EndMargin] {name}"),
            StartFontFace => "[StartFontFace]".into(),
            EndFontFace => "[EndFontFace]".into(),
            StartKeyframes { name } => format!("[StartKeyframes] {name}"),
            EndKeyframes { name } => format!("[EndKeyframes] {name}"),
            StartKeyframe { keys } => format!("[StartKeyframe] {keys}"),
            EndKeyframe { keys } => format!("[EndKeyframe] {keys}"),
            StartSupports { condition } => format!("[StartSupports] {condition}"),
            EndSupports { condition } => format!("[EndSupports] {condition}"),
            StartCounterStyle { name } => format!("[StartCounterStyle] {name}"),
            EndCounterStyle { name } => format!("[EndCounterStyle] {name}"),
            StartFontFeatures { family_names } => {
                format!("[StartFontFeatures] {}", family_names.join(", "))
            }
            EndFontFeatures { family_names } => {
                format!("[EndFontFeatures] {}", family_names.join(", "))
            }
            StartFeatureMap { name } => format!("[StartFeatureMap] {name}"),
            EndFeatureMap { name } => format!("[EndFeatureMap] {name}"),
            StartViewport => "[StartViewport]".into(),
            EndViewport => "[EndViewport]".into(),
            StartProperty { name } => format!("[StartProperty] {name}"),
            EndProperty { name, discard } => {
                if *discard {
                    format!("[EndProperty] {name} (discarded)")
                } else {
                    format!("[EndProperty] {name}")
                }
            }
        }
    }
}

/// Handler that records every event, used for dumping and for tests.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Vec<CssEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[CssEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<CssEvent> {
        self.events
    }

    /// Recorded property events as (name, value, important)
    pub fn properties(&self) -> Vec<(&str, &LexicalValue, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CssEvent::Property {
                    name,
                    value,
                    important,
                    ..
                } => Some((name.as_str(), value, *important)),
                _ => None,
            })
            .collect()
    }

    /// Selector lists of all style rules
    pub fn selectors(&self) -> Vec<&SelectorList> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CssEvent::StartSelector { selectors, .. } => Some(selectors),
                _ => None,
            })
            .collect()
    }

    pub fn walk_stdout(&self) {
        let _ = self.walk(&mut std::io::stdout());
    }

    pub fn walk_to_string(&self) -> String {
        let mut output: Vec<u8> = Vec::new();

        let _ = self.walk(&mut output);

        String::from_utf8_lossy(&output).into_owned()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.events).unwrap_or(serde_json::Value::Null)
    }

    fn walk(&self, f: &mut dyn Write) -> Result<(), std::io::Error> {
        let mut depth = 0usize;

        for event in &self.events {
            if event.closes() {
                depth = depth.saturating_sub(1);
            }

            writeln!(f, "{}{}", " ".repeat(depth * 2), event.describe())?;

            if event.opens() {
                depth += 1;
            }
        }

        Ok(())
    }
}

impl CssHandler for EventRecorder {
    fn parse_start(&mut self, _locator: &Locator) {
        self.events.push(CssEvent::ParseStart);
    }

    fn end_of_stream(&mut self) {
        self.events.push(CssEvent::EndOfStream);
    }

    fn comment(&mut self, text: &str, preceded_by_line_feed: bool) {
        self.events.push(CssEvent::Comment {
            text: text.into(),
            preceded_by_line_feed,
        });
    }

    fn namespace_declaration(&mut self, prefix: &str, uri: &str) {
        self.events.push(CssEvent::Namespace {
            prefix: prefix.into(),
            uri: uri.into(),
        });
    }

    fn import_style(&mut self, uri: &str, media: &MediaQueryList, layer: Option<&str>) {
        self.events.push(CssEvent::ImportStyle {
            uri: uri.into(),
            media: media.clone(),
            layer: layer.map(String::from),
        });
    }

    fn ignorable_at_rule(&mut self, at_rule: &str) {
        self.events.push(CssEvent::IgnorableAtRule {
            text: at_rule.into(),
        });
    }

    fn start_selector(&mut self, selectors: &SelectorList, locator: &Locator) {
        self.events.push(CssEvent::StartSelector {
            selectors: selectors.clone(),
            locator: *locator,
        });
    }

    fn end_selector(&mut self, selectors: &SelectorList) {
        self.events.push(CssEvent::EndSelector {
            selectors: selectors.clone(),
        });
    }

    fn property(&mut self, name: &str, value: LexicalValue, important: bool, locator: &Locator) {
        self.events.push(CssEvent::Property {
            name: name.into(),
            value,
            important,
            locator: *locator,
        });
    }

    fn start_media(&mut self, media: &MediaQueryList) {
        self.events.push(CssEvent::StartMedia {
            media: media.clone(),
        });
    }

    fn end_media(&mut self, media: &MediaQueryList) {
        self.events.push(CssEvent::EndMedia {
            media: media.clone(),
        });
    }

    fn start_page(&mut self, page_selector: Option<&str>) {
        self.events.push(CssEvent::StartPage {
            selector: page_selector.map(String::from),
        });
    }

    fn end_page(&mut self, page_selector: Option<&str>) {
        self.events.push(CssEvent::EndPage {
            selector: page_selector.map(String::from),
        });
    }

    fn start_margin(&mut self, name: &str) {
        self.events.push(CssEvent::StartMargin { name: name.into() });
    }

    fn end_margin(&mut self, name: &str) {
        self.events.push(CssEvent::EndMargin { name: name.into() });
    }

    fn start_font_face(&mut self) {
        self.events.push(CssEvent::StartFontFace);
    }

    fn end_font_face(&mut self) {
        self.events.push(CssEvent::EndFontFace);
    }

    fn start_keyframes(&mut self, name: &str) {
        self.events
            .push(CssEvent::StartKeyframes { name: name.into() });
    }

    fn end_keyframes(&mut self, name: &str) {
        self.events.push(CssEvent::EndKeyframes { name: name.into() });
    }

    fn start_keyframe(&mut self, keys: &LexicalValue) {
        self.events
            .push(CssEvent::StartKeyframe { keys: keys.clone() });
    }

    fn end_keyframe(&mut self, keys: &LexicalValue) {
        self.events.push(CssEvent::EndKeyframe { keys: keys.clone() });
    }

    fn start_supports(&mut self, condition: &BooleanCondition) {
        self.events.push(CssEvent::StartSupports {
            condition: condition.clone(),
        });
    }

    fn end_supports(&mut self, condition: &BooleanCondition) {
        self.events.push(CssEvent::EndSupports {
            condition: condition.clone(),
        });
    }

    fn start_counter_style(&mut self, name: &str) {
        self.events
            .push(CssEvent::StartCounterStyle { name: name.into() });
    }

    fn end_counter_style(&mut self, name: &str) {
        self.events
            .push(CssEvent::EndCounterStyle { name: name.into() });
    }

    fn start_font_features(&mut self, family_names: &[String]) {
        self.events.push(CssEvent::StartFontFeatures {
            family_names: family_names.to_vec(),
        });
    }

    fn end_font_features(&mut self, family_names: &[String]) {
        self.events.push(CssEvent::EndFontFeatures {
            family_names: family_names.to_vec(),
        });
    }

    fn start_feature_map(&mut self, name: &str) {
        self.events
            .push(CssEvent::StartFeatureMap { name: name.into() });
    }

    fn end_feature_map(&mut self, name: &str) {
        self.events.push(CssEvent::EndFeatureMap { name: name.into() });
    }

    fn start_viewport(&mut self) {
        self.events.push(CssEvent::StartViewport);
    }

    fn end_viewport(&mut self) {
        self.events.push(CssEvent::EndViewport);
    }

    fn start_property(&mut self, name: &str) {
        self.events.push(CssEvent::StartProperty { name: name.into() });
    }

    fn end_property(&mut self, name: &str, discard: bool) {
        self.events.push(CssEvent::EndProperty {
            name: name.into(),
            discard,
        });
    }
}
