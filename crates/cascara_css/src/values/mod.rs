//! Property values as chains of lexical units
mod lexical;
pub mod unit;

pub use lexical::{ChainIter, LexicalType, LexicalValue, UnitId, UnitRef};
pub(crate) use lexical::{Chain, UnitArena, UnitNode};
pub use unit::{CssUnit, DimensionKind};
