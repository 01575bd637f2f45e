//! Media query lists, as far as `@media` and `@import` need them
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaQualifier {
    Not,
    Only,
}

/// One query of a media query list. The condition is kept as normalized text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaQuery {
    pub qualifier: Option<MediaQualifier>,
    /// Lower-cased media type
    pub media_type: Option<String>,
    pub condition: Option<String>,
}

impl MediaQuery {
    /// The query an invalid query is replaced with
    pub fn not_all() -> Self {
        Self {
            qualifier: Some(MediaQualifier::Not),
            media_type: Some("all".into()),
            condition: None,
        }
    }

    pub fn is_not_all(&self) -> bool {
        *self == Self::not_all()
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(MediaQualifier::Not) => write!(f, "not ")?,
            Some(MediaQualifier::Only) => write!(f, "only ")?,
            None => {}
        }

        match (&self.media_type, &self.condition) {
            (Some(t), Some(c)) => write!(f, "{t} and {c}"),
            (Some(t), None) => write!(f, "{t}"),
            (None, Some(c)) => write!(f, "{c}"),
            (None, None) => Ok(()),
        }
    }
}

/// Comma separated media queries. An empty list matches all media.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MediaQueryList {
    pub queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    pub fn is_all_media(&self) -> bool {
        self.queries.is_empty()
            || self
                .queries
                .iter()
                .any(|q| q.qualifier.is_none() && q.media_type.as_deref() == Some("all") && q.condition.is_none())
    }
}

impl fmt::Display for MediaQueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.queries.iter().format(","))
    }
}

impl Serialize for MediaQueryList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
