use cow_utils::CowUtils;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;

/// Unit code carried by every lexical unit. Non-numeric units use `Number` for plain numbers
/// and `Invalid` for everything that has no unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CssUnit {
    Invalid,
    Number,
    Percentage,
    // absolute lengths
    Cm,
    Mm,
    Q,
    In,
    Pt,
    Pc,
    Px,
    // font relative lengths
    Em,
    Ex,
    Cap,
    Ch,
    Ic,
    Rem,
    Lh,
    Rlh,
    // viewport and container lengths
    Vw,
    Vh,
    Vi,
    Vb,
    Vmin,
    Vmax,
    Cqw,
    Cqh,
    Cqi,
    Cqb,
    Cqmin,
    Cqmax,
    // angles
    Deg,
    Grad,
    Rad,
    Turn,
    // time
    S,
    Ms,
    // frequency
    Hz,
    Khz,
    // resolution
    Dpi,
    Dpcm,
    Dppx,
    // flex
    Fr,
    /// A well-formed dimension whose unit is not known
    Other,
}

/// Sub-kind of a DIMENSION unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DimensionKind {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
    Flex,
    Unknown,
}

lazy_static! {
    static ref CSS_UNITS: HashMap<&'static str, CssUnit> = {
        let mut units = HashMap::new();
        for (name, unit) in [
            ("cm", CssUnit::Cm),
            ("mm", CssUnit::Mm),
            ("q", CssUnit::Q),
            ("in", CssUnit::In),
            ("pt", CssUnit::Pt),
            ("pc", CssUnit::Pc),
            ("px", CssUnit::Px),
            ("em", CssUnit::Em),
            ("ex", CssUnit::Ex),
            ("cap", CssUnit::Cap),
            ("ch", CssUnit::Ch),
            ("ic", CssUnit::Ic),
            ("rem", CssUnit::Rem),
            ("lh", CssUnit::Lh),
            ("rlh", CssUnit::Rlh),
            ("vw", CssUnit::Vw),
            ("vh", CssUnit::Vh),
            ("vi", CssUnit::Vi),
            ("vb", CssUnit::Vb),
            ("vmin", CssUnit::Vmin),
            ("vmax", CssUnit::Vmax),
            ("cqw", CssUnit::Cqw),
            ("cqh", CssUnit::Cqh),
            ("cqi", CssUnit::Cqi),
            ("cqb", CssUnit::Cqb),
            ("cqmin", CssUnit::Cqmin),
            ("cqmax", CssUnit::Cqmax),
            ("deg", CssUnit::Deg),
            ("grad", CssUnit::Grad),
            ("rad", CssUnit::Rad),
            ("turn", CssUnit::Turn),
            ("s", CssUnit::S),
            ("ms", CssUnit::Ms),
            ("hz", CssUnit::Hz),
            ("khz", CssUnit::Khz),
            ("dpi", CssUnit::Dpi),
            ("dpcm", CssUnit::Dpcm),
            ("dppx", CssUnit::Dppx),
            ("x", CssUnit::Dppx),
            ("fr", CssUnit::Fr),
        ] {
            units.insert(name, unit);
        }
        units
    };
}

impl CssUnit {
    /// Looks up the unit code for the unit text of a dimension, case-insensitive. Unknown units
    /// give `Other`.
    pub fn from_unit_text(text: &str) -> CssUnit {
        let lower = text.cow_to_ascii_lowercase();
        CSS_UNITS.get(lower.as_ref()).copied().unwrap_or(CssUnit::Other)
    }

    pub fn dimension_kind(&self) -> Option<DimensionKind> {
        use CssUnit::*;

        let kind = match self {
            Invalid | Number | Percentage => return None,
            Cm | Mm | Q | In | Pt | Pc | Px | Em | Ex | Cap | Ch | Ic | Rem | Lh | Rlh | Vw
            | Vh | Vi | Vb | Vmin | Vmax | Cqw | Cqh | Cqi | Cqb | Cqmin | Cqmax => {
                DimensionKind::Length
            }
            Deg | Grad | Rad | Turn => DimensionKind::Angle,
            S | Ms => DimensionKind::Time,
            Hz | Khz => DimensionKind::Frequency,
            Dpi | Dpcm | Dppx => DimensionKind::Resolution,
            Fr => DimensionKind::Flex,
            Other => DimensionKind::Unknown,
        };

        Some(kind)
    }
}
