use bitflags::bitflags;
use cascara_shared::byte_stream::Location;

bitflags! {
    /// Compatibility switches that opt into legacy browser hacks. Without the flag the
    /// corresponding construct is always an error.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        /// Accept `\9` value suffixes, `progid:` filters and `name=value` function arguments
        const IEVALUES = 0b0001;
        /// Accept a trailing `!ie` priority
        const IEPRIO = 0b0010;
        /// Accept a trailing `!important!`
        const IEPRIOCHAR = 0b0100;
        /// Accept property names prefixed with `*`
        const STARHACK = 0b1000;
    }
}

impl Flags {
    /// Looks up a flag by its name, case-insensitive
    pub fn from_flag_name(name: &str) -> Option<Flags> {
        Flags::all()
            .iter_names()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| f)
    }
}

/// ParserConfig holds the configuration for the parser
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Enabled compatibility flags
    pub flags: Flags,
    /// Location holds the start position of the given element in the data source
    pub location: Location,
    /// Optional source filename or url
    pub source: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flags: Flags::empty(),
            location: Location::default(),
            source: None,
        }
    }
}

impl ParserConfig {
    pub fn has_flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }
}
