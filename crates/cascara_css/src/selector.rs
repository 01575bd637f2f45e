//! Selector trees.
//!
//! Combinators associate to the left: in `A B > C` the outermost node is the child combinator,
//! whose ancestor operand is the descendant combinator `A B`. A compound selector is a
//! [`Selector::Conditional`] whose condition is a left-leaning chain of [`Condition::And`].

use crate::serialize::{escape_ident, quote_string};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::fmt;

/// Namespace part of a type selector, universal selector or attribute name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamespaceSpec {
    /// No prefix and no default namespace
    Unspecified,
    /// No prefix, with the default namespace declared by `@namespace`
    Default(String),
    /// `*|`
    Any,
    /// `|`, elements without namespace
    None,
    /// `prefix|`, resolved to its uri
    Prefixed { prefix: String, uri: String },
}

impl NamespaceSpec {
    /// The namespace uri to match, if any
    pub fn uri(&self) -> Option<&str> {
        match self {
            NamespaceSpec::Default(uri) | NamespaceSpec::Prefixed { uri, .. } => Some(uri),
            _ => None,
        }
    }

    fn is_implicit(&self) -> bool {
        matches!(self, NamespaceSpec::Unspecified | NamespaceSpec::Default(_))
    }
}

impl fmt::Display for NamespaceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceSpec::Unspecified | NamespaceSpec::Default(_) => Ok(()),
            NamespaceSpec::Any => write!(f, "*|"),
            NamespaceSpec::None => write!(f, "|"),
            NamespaceSpec::Prefixed { prefix, .. } => write!(f, "{}|", escape_ident(prefix)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    Universal {
        namespace: NamespaceSpec,
    },
    Element {
        local_name: String,
        namespace: NamespaceSpec,
    },
    Conditional {
        simple: Box<Selector>,
        condition: Condition,
    },
    Descendant {
        ancestor: Box<Selector>,
        simple: Box<Selector>,
    },
    Child {
        ancestor: Box<Selector>,
        simple: Box<Selector>,
    },
    DirectAdjacent {
        first: Box<Selector>,
        sibling: Box<Selector>,
    },
    SubsequentSibling {
        first: Box<Selector>,
        sibling: Box<Selector>,
    },
    Column {
        ancestor: Box<Selector>,
        simple: Box<Selector>,
    },
    /// Implicit anchor of a relative selector
    Scope,
}

/// Matching operator of an attribute selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeMatcher {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals,
    /// `[attr~=v]`
    OneOf,
    /// `[attr*=v]`
    Substring,
    /// `[attr^=v]`
    Begins,
    /// `[attr$=v]`
    Ends,
    /// `[attr|=v]`
    BeginsHyphen,
}

impl AttributeMatcher {
    fn operator(&self) -> &'static str {
        match self {
            AttributeMatcher::Exists => "",
            AttributeMatcher::Equals => "=",
            AttributeMatcher::OneOf => "~=",
            AttributeMatcher::Substring => "*=",
            AttributeMatcher::Begins => "^=",
            AttributeMatcher::Ends => "$=",
            AttributeMatcher::BeginsHyphen => "|=",
        }
    }
}

/// Case sensitivity flag of an attribute selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CaseSensitivity {
    Default,
    /// ` i`
    Insensitive,
    /// ` s`
    Sensitive,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeCondition {
    pub name: String,
    pub namespace: NamespaceSpec,
    pub matcher: AttributeMatcher,
    /// `None` for `[attr]`
    pub value: Option<String>,
    pub case: CaseSensitivity,
}

impl AttributeCondition {
    /// True when the selector compares a value, as opposed to `[attr]`
    pub fn is_specified(&self) -> bool {
        self.value.is_some()
    }
}

/// An+B condition of `:nth-*()` and of the `:first-*`/`:last-*` pseudo-classes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionalCondition {
    /// A
    pub factor: i32,
    /// B
    pub offset: i32,
    /// Counting from the first sibling (`nth-child`) instead of the last (`nth-last-child`)
    pub forward: bool,
    pub of_type: bool,
    /// Selector list of `:nth-child(An+B of S)`
    pub of_selector: Option<SelectorList>,
}

impl PositionalCondition {
    pub fn an_plus_b(&self) -> String {
        let a = match self.factor {
            0 => String::new(),
            1 => "n".into(),
            -1 => "-n".into(),
            f => format!("{f}n"),
        };

        match (self.factor, self.offset) {
            (0, b) => b.to_string(),
            (_, 0) => a,
            (_, b) if b > 0 => format!("{a}+{b}"),
            (_, b) => format!("{a}{b}"),
        }
    }
}

impl fmt::Display for PositionalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.forward { "" } else { "last-" };
        let kind = if self.of_type { "of-type" } else { "child" };

        if self.factor == 0 && self.offset == 1 && self.of_selector.is_none() {
            let edge = if self.forward { "first" } else { "last" };
            return write!(f, ":{edge}-{kind}");
        }

        write!(f, ":nth-{side}{kind}({}", self.an_plus_b())?;
        if let Some(list) = &self.of_selector {
            write!(f, " of {list}")?;
        }
        write!(f, ")")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Attribute(AttributeCondition),
    Class(String),
    Id(String),
    PseudoClass {
        name: String,
        argument: Option<String>,
    },
    PseudoElement {
        name: String,
        argument: Option<String>,
    },
    Positional(PositionalCondition),
    /// Raw language range list of `:lang()`
    Lang(String),
    OnlyChild,
    OnlyType,
    And(Box<Condition>, Box<Condition>),
    /// Functional pseudo-class taking a selector list, such as `:not()`, `:is()` or `:has()`
    SelectorArgument {
        name: String,
        arguments: SelectorList,
    },
}

impl Condition {
    /// Conditions of a compound, in source order
    pub fn flatten(&self) -> Vec<&Condition> {
        match self {
            Condition::And(a, b) => {
                let mut v = a.flatten();
                v.extend(b.flatten());
                v
            }
            c => vec![c],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Attribute(attr) => {
                write!(f, "[{}{}", attr.namespace, escape_ident(&attr.name))?;
                if let Some(value) = &attr.value {
                    write!(f, "{}{}", attr.matcher.operator(), quote_string(value))?;
                }
                match attr.case {
                    CaseSensitivity::Default => {}
                    CaseSensitivity::Insensitive => write!(f, " i")?,
                    CaseSensitivity::Sensitive => write!(f, " s")?,
                }
                write!(f, "]")
            }
            Condition::Class(name) => write!(f, ".{}", escape_ident(name)),
            Condition::Id(name) => write!(f, "#{}", escape_ident(name)),
            Condition::PseudoClass { name, argument } => {
                write!(f, ":{}", escape_ident(name))?;
                match argument {
                    Some(arg) => write!(f, "({arg})"),
                    None => Ok(()),
                }
            }
            Condition::PseudoElement { name, argument } => {
                write!(f, "::{}", escape_ident(name))?;
                match argument {
                    Some(arg) => write!(f, "({arg})"),
                    None => Ok(()),
                }
            }
            Condition::Positional(p) => write!(f, "{p}"),
            Condition::Lang(range) => write!(f, ":lang({range})"),
            Condition::OnlyChild => write!(f, ":only-child"),
            Condition::OnlyType => write!(f, ":only-of-type"),
            Condition::And(a, b) => write!(f, "{a}{b}"),
            Condition::SelectorArgument { name, arguments } => {
                write!(f, ":{}({arguments})", escape_ident(name))
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Universal { namespace } => write!(f, "{namespace}*"),
            Selector::Element {
                local_name,
                namespace,
            } => write!(f, "{namespace}{}", escape_ident(local_name)),
            Selector::Conditional { simple, condition } => match simple.as_ref() {
                Selector::Universal { namespace } if namespace.is_implicit() => {
                    write!(f, "{condition}")
                }
                s => write!(f, "{s}{condition}"),
            },
            Selector::Descendant { ancestor, simple } => match ancestor.as_ref() {
                Selector::Scope => write!(f, "{simple}"),
                a => write!(f, "{a} {simple}"),
            },
            Selector::Child { ancestor, simple } => write_combined(f, ancestor, ">", simple),
            Selector::DirectAdjacent { first, sibling } => write_combined(f, first, "+", sibling),
            Selector::SubsequentSibling { first, sibling } => {
                write_combined(f, first, "~", sibling)
            }
            Selector::Column { ancestor, simple } => write_combined(f, ancestor, "||", simple),
            Selector::Scope => Ok(()),
        }
    }
}

fn write_combined(
    f: &mut fmt::Formatter<'_>,
    left: &Selector,
    combinator: &str,
    right: &Selector,
) -> fmt::Result {
    if let Selector::Scope = left {
        return write!(f, "{combinator}{right}");
    }

    // `-->` would read back as a CDC token
    let left = left.to_string();
    let gap = if left.ends_with("--") && combinator == ">" { " " } else { "" };
    write!(f, "{left}{gap}{combinator}{right}")
}

/// Ordered list of selectors without duplicates
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    pub(crate) fn new(selectors: Vec<Selector>) -> Self {
        Self(selectors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Selector> {
        self.0.get(index)
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.0.contains(selector)
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(","))
    }
}

impl Serialize for SelectorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn class(name: &str) -> Selector {
        Selector::Conditional {
            simple: Box::new(Selector::Universal {
                namespace: NamespaceSpec::Unspecified,
            }),
            condition: Condition::Class(name.into()),
        }
    }

    #[test]
    fn combinators() {
        let sel = Selector::SubsequentSibling {
            first: Box::new(Selector::Child {
                ancestor: Box::new(Selector::Descendant {
                    ancestor: Box::new(class("a")),
                    simple: Box::new(class("b")),
                }),
                simple: Box::new(class("c")),
            }),
            sibling: Box::new(class("d")),
        };
        assert_eq!(sel.to_string(), ".a .b>.c~.d");
    }

    #[test]
    fn child_of_name_ending_in_dashes() {
        let sel = Selector::Child {
            ancestor: Box::new(Selector::Element {
                local_name: "--".into(),
                namespace: NamespaceSpec::Unspecified,
            }),
            simple: Box::new(class("a")),
        };
        assert_eq!(sel.to_string(), "-- >.a");
    }

    #[test]
    fn relative_selectors() {
        let sel = Selector::Child {
            ancestor: Box::new(Selector::Scope),
            simple: Box::new(Selector::Element {
                local_name: "img".into(),
                namespace: NamespaceSpec::Unspecified,
            }),
        };
        assert_eq!(sel.to_string(), ">img");
    }

    #[test]
    fn positional() {
        let mut p = PositionalCondition {
            factor: 2,
            offset: 1,
            forward: true,
            of_type: false,
            of_selector: None,
        };
        assert_eq!(p.to_string(), ":nth-child(2n+1)");
        p.factor = -1;
        p.offset = 6;
        p.forward = false;
        assert_eq!(p.to_string(), ":nth-last-child(-n+6)");
        p.factor = 0;
        p.offset = 1;
        p.of_type = true;
        assert_eq!(p.to_string(), ":last-of-type");
        p.factor = 3;
        p.offset = -2;
        assert_eq!(p.to_string(), ":nth-last-of-type(3n-2)");
        p.factor = 1;
        p.offset = 0;
        p.of_type = false;
        p.forward = true;
        p.of_selector = Some(SelectorList::new(vec![class("x")]));
        assert_eq!(p.to_string(), ":nth-child(n of .x)");
    }

    #[test]
    fn attributes_and_namespaces() {
        let attr = Condition::Attribute(AttributeCondition {
            name: "id".into(),
            namespace: NamespaceSpec::None,
            matcher: AttributeMatcher::Substring,
            value: Some("substring".into()),
            case: CaseSensitivity::Insensitive,
        });
        assert_eq!(attr.to_string(), "[|id*=\"substring\" i]");

        let el = Selector::Element {
            local_name: "svg".into(),
            namespace: NamespaceSpec::Prefixed {
                prefix: "s".into(),
                uri: "http://www.w3.org/2000/svg".into(),
            },
        };
        assert_eq!(el.to_string(), "s|svg");
        assert_eq!(
            Selector::Universal {
                namespace: NamespaceSpec::Any
            }
            .to_string(),
            "*|*"
        );
    }

    #[test]
    fn flatten_compound() {
        let cond = Condition::And(
            Box::new(Condition::And(
                Box::new(Condition::Class("a".into())),
                Box::new(Condition::Class("b".into())),
            )),
            Box::new(Condition::Id("c".into())),
        );
        assert_eq!(cond.flatten().len(), 3);
        assert_eq!(cond.to_string(), ".a.b#c");
    }
}
