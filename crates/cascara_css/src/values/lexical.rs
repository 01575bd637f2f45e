use crate::serialize::{escape_ident, escape_unit, format_number, format_quantity, quote_string};
use crate::values::unit::{CssUnit, DimensionKind};
use serde::{Serialize, Serializer};
use std::fmt;

/// Type of a single lexical unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LexicalType {
    Ident,
    String,
    Integer,
    Real,
    Percentage,
    Dimension,
    Uri,
    /// `rgb()`, `rgba()` or a hex color
    RgbColor,
    HslColor,
    HwbColor,
    LabColor,
    LchColor,
    OklabColor,
    OklchColor,
    /// `color()`
    ColorFunction,
    /// Any function without a dedicated type
    Function,
    Calc,
    CubicBezierFunction,
    StepsFunction,
    Var,
    Attr,
    /// A `--name()` function
    CustomFunction,
    UnicodeRange,
    UnicodeWildcard,
    OperatorComma,
    OperatorSlash,
    OperatorPlus,
    OperatorMinus,
    OperatorMultiply,
    LeftBracket,
    RightBracket,
    /// A parenthesized group inside `calc()`
    SubExpression,
    /// A `{}` block inside a custom property value, kept as its normalized text
    Block,
    /// The value of a custom property that has no tokens at all
    Empty,
    CompatIdent,
    CompatPrio,
    Inherit,
    Initial,
    Unset,
    Revert,
}

impl LexicalType {
    pub fn is_function(&self) -> bool {
        use LexicalType::*;
        matches!(
            self,
            RgbColor
                | HslColor
                | HwbColor
                | LabColor
                | LchColor
                | OklabColor
                | OklchColor
                | ColorFunction
                | Function
                | Calc
                | CubicBezierFunction
                | StepsFunction
                | Var
                | Attr
                | CustomFunction
        )
    }

    pub fn is_operator(&self) -> bool {
        use LexicalType::*;
        matches!(
            self,
            OperatorComma | OperatorSlash | OperatorPlus | OperatorMinus | OperatorMultiply
        )
    }

    pub fn is_numeric(&self) -> bool {
        use LexicalType::*;
        matches!(self, Integer | Real | Percentage | Dimension)
    }
}

/// Index of a unit inside the arena of a [`LexicalValue`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitId(usize);

/// Storage for one lexical unit. Units refer to each other by index.
#[derive(Clone, Debug)]
pub(crate) struct UnitNode {
    pub lexical_type: LexicalType,
    pub unit: CssUnit,
    pub int_value: i32,
    pub float_value: f32,
    pub string_value: Option<String>,
    pub dimension_unit_text: String,
    pub function_name: Option<String>,
    pub parameters: Option<UnitId>,
    pub next: Option<UnitId>,
}

impl UnitNode {
    pub fn new(lexical_type: LexicalType) -> Self {
        Self {
            lexical_type,
            unit: CssUnit::Invalid,
            int_value: 0,
            float_value: 0.0,
            string_value: None,
            dimension_unit_text: String::new(),
            function_name: None,
            parameters: None,
            next: None,
        }
    }

    pub fn with_string(lexical_type: LexicalType, value: impl Into<String>) -> Self {
        let mut node = Self::new(lexical_type);
        node.string_value = Some(value.into());
        node
    }

    pub fn integer(value: i32) -> Self {
        let mut node = Self::new(LexicalType::Integer);
        node.unit = CssUnit::Number;
        node.int_value = value;
        node.float_value = value as f32;
        node
    }

    pub fn real(value: f32) -> Self {
        let mut node = Self::new(LexicalType::Real);
        node.unit = CssUnit::Number;
        node.float_value = value;
        node
    }

    pub fn percentage(value: f32) -> Self {
        let mut node = Self::new(LexicalType::Percentage);
        node.unit = CssUnit::Percentage;
        node.float_value = value;
        node
    }

    pub fn dimension(value: f32, unit_text: &str) -> Self {
        let mut node = Self::new(LexicalType::Dimension);
        node.unit = CssUnit::from_unit_text(unit_text);
        node.float_value = value;
        node.dimension_unit_text = unit_text.to_string();
        node
    }

    pub fn function(lexical_type: LexicalType, name: &str, parameters: Option<UnitId>) -> Self {
        let mut node = Self::new(lexical_type);
        node.function_name = Some(name.to_string());
        node.parameters = parameters;
        node
    }
}

/// Arena the builder appends units to
#[derive(Default, Debug)]
pub(crate) struct UnitArena {
    nodes: Vec<UnitNode>,
}

impl UnitArena {
    pub fn push(&mut self, node: UnitNode) -> UnitId {
        self.nodes.push(node);
        UnitId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn finish(self, head: UnitId) -> LexicalValue {
        LexicalValue {
            nodes: self.nodes,
            head,
        }
    }
}

/// Head and tail of a chain under construction
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Chain {
    pub head: Option<UnitId>,
    pub tail: Option<UnitId>,
}

impl Chain {
    pub fn append(&mut self, arena: &mut UnitArena, node: UnitNode) -> UnitId {
        let id = arena.push(node);
        if let Some(tail) = self.tail.and_then(|t| arena.get_mut(t)) {
            tail.next = Some(id);
        }
        if self.head.is_none() {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn last_type(&self, arena: &UnitArena) -> Option<LexicalType> {
        self.tail.and_then(|t| arena.get(t)).map(|n| n.lexical_type)
    }
}

/// A complete parsed value: the arena holding every unit and the first unit of the chain.
///
/// The value is immutable once built. Units are inspected through [`UnitRef`].
#[derive(Clone, Debug)]
pub struct LexicalValue {
    nodes: Vec<UnitNode>,
    head: UnitId,
}

impl LexicalValue {
    /// First unit of the value
    pub fn head(&self) -> UnitRef<'_> {
        UnitRef {
            value: self,
            id: self.head,
        }
    }

    /// Iterates over the top level chain
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            next: Some(self.head()),
        }
    }

    fn node(&self, id: UnitId) -> &UnitNode {
        // ids only come from the arena that built this value
        &self.nodes[id.0]
    }
}

impl PartialEq for LexicalValue {
    fn eq(&self, other: &Self) -> bool {
        chains_equal(Some(self.head()), Some(other.head()))
    }
}

impl fmt::Display for LexicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head())
    }
}

impl Serialize for LexicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Borrowed view of one unit inside a [`LexicalValue`]
#[derive(Clone, Copy)]
pub struct UnitRef<'a> {
    value: &'a LexicalValue,
    id: UnitId,
}

impl<'a> UnitRef<'a> {
    fn node(&self) -> &'a UnitNode {
        self.value.node(self.id)
    }

    fn at(&self, id: Option<UnitId>) -> Option<UnitRef<'a>> {
        id.map(|id| UnitRef {
            value: self.value,
            id,
        })
    }

    pub fn lexical_type(&self) -> LexicalType {
        self.node().lexical_type
    }

    pub fn css_unit(&self) -> CssUnit {
        self.node().unit
    }

    pub fn dimension_kind(&self) -> Option<DimensionKind> {
        match self.lexical_type() {
            LexicalType::Dimension => self.node().unit.dimension_kind(),
            _ => None,
        }
    }

    pub fn integer_value(&self) -> i32 {
        self.node().int_value
    }

    pub fn float_value(&self) -> f32 {
        self.node().float_value
    }

    /// Text of identifiers, strings, urls, compat values and unicode wildcards
    pub fn string_value(&self) -> Option<&'a str> {
        match self.lexical_type() {
            LexicalType::Empty => Some(""),
            _ => self.node().string_value.as_deref(),
        }
    }

    /// Unit of a dimension as written
    pub fn dimension_unit_text(&self) -> &'a str {
        &self.node().dimension_unit_text
    }

    pub fn function_name(&self) -> Option<&'a str> {
        self.node().function_name.as_deref()
    }

    /// First parameter of a function, or first sub-value of a unicode range
    pub fn parameters(&self) -> Option<UnitRef<'a>> {
        self.at(self.node().parameters)
    }

    pub fn sub_values(&self) -> Option<UnitRef<'a>> {
        self.parameters()
    }

    pub fn next(&self) -> Option<UnitRef<'a>> {
        self.at(self.node().next)
    }

    /// Iterates over this unit and every unit after it
    pub fn iter(&self) -> ChainIter<'a> {
        ChainIter { next: Some(*self) }
    }

    /// Iterates over the parameters of a function
    pub fn iter_parameters(&self) -> ChainIter<'a> {
        ChainIter {
            next: self.parameters(),
        }
    }

    /// Serializes only this unit, without the units that follow it
    pub fn current_to_string(&self) -> String {
        let node = self.node();

        match node.lexical_type {
            LexicalType::Ident => escape_ident(node.string_value.as_deref().unwrap_or_default()),
            LexicalType::String => quote_string(node.string_value.as_deref().unwrap_or_default()),
            LexicalType::Integer => format_number(node.int_value as f32, true),
            LexicalType::Real => format_number(node.float_value, false),
            LexicalType::Percentage => format!("{}%", format_quantity(node.float_value)),
            LexicalType::Dimension => format!(
                "{}{}",
                format_quantity(node.float_value),
                escape_unit(&node.dimension_unit_text)
            ),
            LexicalType::Uri => format!(
                "url({})",
                quote_string(node.string_value.as_deref().unwrap_or_default())
            ),
            LexicalType::UnicodeRange => self.unicode_range_to_string(),
            LexicalType::UnicodeWildcard => node
                .string_value
                .as_deref()
                .unwrap_or_default()
                .to_ascii_lowercase(),
            LexicalType::OperatorComma => ",".into(),
            LexicalType::OperatorSlash => "/".into(),
            LexicalType::OperatorPlus => "+".into(),
            LexicalType::OperatorMinus => "-".into(),
            LexicalType::OperatorMultiply => "*".into(),
            LexicalType::LeftBracket => "[".into(),
            LexicalType::RightBracket => "]".into(),
            LexicalType::SubExpression => {
                format!("({})", chain_to_string(self.parameters(), true))
            }
            LexicalType::Empty => String::new(),
            LexicalType::Block => {
                format!("{{{}}}", node.string_value.as_deref().unwrap_or_default())
            }
            LexicalType::CompatIdent | LexicalType::CompatPrio => {
                node.string_value.clone().unwrap_or_default()
            }
            LexicalType::Inherit => "inherit".into(),
            LexicalType::Initial => "initial".into(),
            LexicalType::Unset => "unset".into(),
            LexicalType::Revert => "revert".into(),
            t if t.is_function() => {
                if let (LexicalType::RgbColor, Some(hex)) = (t, &node.string_value) {
                    return format!("#{hex}");
                }

                let calc = matches!(t, LexicalType::Calc);
                format!(
                    "{}({})",
                    escape_ident(node.function_name.as_deref().unwrap_or_default()),
                    chain_to_string(self.parameters(), calc)
                )
            }
            _ => String::new(),
        }
    }

    fn unicode_range_to_string(&self) -> String {
        let mut s = String::from("U+");
        let mut bound = self.parameters();
        let mut first = true;

        while let Some(unit) = bound {
            if !first {
                s.push('-');
            }
            match unit.lexical_type() {
                LexicalType::Integer => s.push_str(&format!("{:x}", unit.integer_value())),
                _ => s.push_str(&unit.current_to_string()),
            }
            first = false;
            bound = unit.next();
        }

        s
    }

    /// Structural comparison of this chain with another, ignoring arena layout
    pub fn same_as(&self, other: &UnitRef<'_>) -> bool {
        chains_equal(Some(*self), Some(*other))
    }

    fn current_equals(&self, other: &UnitRef<'_>) -> bool {
        let (a, b) = (self.node(), other.node());

        a.lexical_type == b.lexical_type
            && a.unit == b.unit
            && a.int_value == b.int_value
            && a.float_value == b.float_value
            && a.string_value == b.string_value
            && a.dimension_unit_text.eq_ignore_ascii_case(&b.dimension_unit_text)
            && a.function_name == b.function_name
            && chains_equal(self.parameters(), other.parameters())
    }
}

impl fmt::Display for UnitRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", chain_to_string(Some(*self), false))
    }
}

impl fmt::Debug for UnitRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.lexical_type(), self.current_to_string())
    }
}

pub struct ChainIter<'a> {
    next: Option<UnitRef<'a>>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = UnitRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

fn chains_equal(a: Option<UnitRef<'_>>, b: Option<UnitRef<'_>>) -> bool {
    let (mut a, mut b) = (a, b);
    loop {
        match (a, b) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !x.current_equals(&y) {
                    return false;
                }
                a = x.next();
                b = y.next();
            }
            _ => return false,
        }
    }
}

/// Serializes a chain. Commas are followed by one space, slashes and brackets are not spaced,
/// and inside `calc()` every arithmetic operator is surrounded by single spaces.
fn chain_to_string(first: Option<UnitRef<'_>>, calc: bool) -> String {
    use LexicalType::{LeftBracket, OperatorComma, OperatorSlash, RightBracket};

    let mut out = String::new();
    let mut prev: Option<LexicalType> = None;

    let mut unit = first;
    while let Some(u) = unit {
        let current = u.lexical_type();

        let separator = match (prev, current) {
            (None, _) => "",
            (_, OperatorComma) => "",
            (Some(OperatorComma), _) => " ",
            (Some(p), c) if calc && (p.is_operator() || c.is_operator()) => " ",
            (_, OperatorSlash) | (Some(OperatorSlash), _) => "",
            (Some(LeftBracket), _) | (_, RightBracket) => "",
            _ => " ",
        };

        out.push_str(separator);
        out.push_str(&u.current_to_string());

        prev = Some(current);
        unit = u.next();
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn build(nodes: Vec<UnitNode>) -> LexicalValue {
        let mut arena = UnitArena::default();
        let mut chain = Chain::default();
        for node in nodes {
            chain.append(&mut arena, node);
        }
        let head = chain.head.unwrap();
        arena.finish(head)
    }

    #[test]
    fn chain_serialization() {
        let value = build(vec![
            UnitNode::dimension(1.0, "px"),
            UnitNode::with_string(LexicalType::Ident, "solid"),
            UnitNode::new(LexicalType::OperatorComma),
            UnitNode::with_string(LexicalType::String, "a b"),
            UnitNode::new(LexicalType::OperatorSlash),
            UnitNode::percentage(50.0),
        ]);

        assert_eq!(value.to_string(), "1px solid, \"a b\"/50%");
        assert_eq!(value.iter().count(), 6);
        assert_eq!(value.head().next().unwrap().to_string(), "solid, \"a b\"/50%");
        assert_eq!(value.head().current_to_string(), "1px");
    }

    #[test]
    fn function_parameters() {
        let mut arena = UnitArena::default();
        let mut params = Chain::default();
        params.append(&mut arena, UnitNode::percentage(100.0));
        params.append(&mut arena, UnitNode::new(LexicalType::OperatorMinus));
        params.append(&mut arena, UnitNode::dimension(2.0, "em"));

        let mut chain = Chain::default();
        chain.append(
            &mut arena,
            UnitNode::function(LexicalType::Calc, "calc", params.head),
        );
        let value = arena.finish(chain.head.unwrap());

        let head = value.head();
        assert_eq!(head.lexical_type(), LexicalType::Calc);
        assert_eq!(head.function_name(), Some("calc"));
        assert_eq!(head.iter_parameters().count(), 3);
        assert_eq!(value.to_string(), "calc(100% - 2em)");
    }

    #[test]
    fn unicode_range() {
        let mut arena = UnitArena::default();
        let mut bounds = Chain::default();
        bounds.append(&mut arena, UnitNode::integer(0x25));
        bounds.append(&mut arena, UnitNode::integer(0xff));

        let mut node = UnitNode::new(LexicalType::UnicodeRange);
        node.parameters = bounds.head;
        let mut chain = Chain::default();
        chain.append(&mut arena, node);
        let value = arena.finish(chain.head.unwrap());

        assert_eq!(value.to_string(), "U+25-ff");
        let sub = value.head().sub_values().unwrap();
        assert_eq!(sub.integer_value(), 37);
        assert_eq!(sub.next().unwrap().integer_value(), 255);
    }

    #[test]
    fn structural_equality() {
        let a = build(vec![UnitNode::integer(1), UnitNode::dimension(2.0, "PX")]);
        let b = build(vec![UnitNode::integer(1), UnitNode::dimension(2.0, "px")]);
        let c = build(vec![UnitNode::integer(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.head().same_as(&b.head()));
    }

    #[test]
    fn empty_value() {
        let value = build(vec![UnitNode::new(LexicalType::Empty)]);
        assert_eq!(value.to_string(), "");
        assert_eq!(value.head().string_value(), Some(""));
        assert!(value.head().next().is_none());
    }

    #[test]
    fn brackets() {
        let value = build(vec![
            UnitNode::new(LexicalType::LeftBracket),
            UnitNode::with_string(LexicalType::Ident, "a"),
            UnitNode::with_string(LexicalType::Ident, "b"),
            UnitNode::new(LexicalType::RightBracket),
            UnitNode::with_string(LexicalType::Ident, "auto"),
        ]);
        assert_eq!(value.to_string(), "[a b] auto");
    }
}
