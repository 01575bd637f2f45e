//! Condition trees of `@supports`
use crate::selector::SelectorList;
use serde::{Serialize, Serializer};
use std::fmt;

/// Leaf test of a supports condition
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SupportsPredicate {
    /// `(property: value)`, the value normalized to its serialized form
    Declaration { name: String, value: String },
    /// `selector(...)`
    Selector(SelectorList),
    /// Any other functional test, such as `font-tech(color-COLRv1)`, with its normalized argument
    Function { name: String, argument: String },
}

impl fmt::Display for SupportsPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportsPredicate::Declaration { name, value } => write!(f, "({name}: {value})"),
            SupportsPredicate::Selector(list) => write!(f, "selector({list})"),
            SupportsPredicate::Function { name, argument } => write!(f, "{name}({argument})"),
        }
    }
}

/// Boolean tree of a supports condition. Equality and hashing are structural, so whitespace and
/// comments in the source never matter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BooleanCondition {
    Predicate(SupportsPredicate),
    Not(Box<BooleanCondition>),
    And(Vec<BooleanCondition>),
    Or(Vec<BooleanCondition>),
}

impl BooleanCondition {
    fn write_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanCondition::Predicate(p) => write!(f, "{p}"),
            c => write!(f, "({c})"),
        }
    }

    fn write_joined(
        f: &mut fmt::Formatter<'_>,
        operands: &[BooleanCondition],
        keyword: &str,
    ) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {keyword} ")?;
            }
            operand.write_operand(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for BooleanCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanCondition::Predicate(p) => write!(f, "{p}"),
            BooleanCondition::Not(c) => {
                write!(f, "not ")?;
                c.write_operand(f)
            }
            BooleanCondition::And(operands) => Self::write_joined(f, operands, "and"),
            BooleanCondition::Or(operands) => Self::write_joined(f, operands, "or"),
        }
    }
}

impl Serialize for BooleanCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decl(name: &str, value: &str) -> BooleanCondition {
        BooleanCondition::Predicate(SupportsPredicate::Declaration {
            name: name.into(),
            value: value.into(),
        })
    }

    #[test]
    fn serialization() {
        let cond = BooleanCondition::Or(vec![
            BooleanCondition::And(vec![decl("a", "1"), decl("b", "2")]),
            BooleanCondition::Not(Box::new(decl("c", "3"))),
        ]);
        assert_eq!(cond.to_string(), "((a: 1) and (b: 2)) or (not (c: 3))");

        let not = BooleanCondition::Not(Box::new(BooleanCondition::Or(vec![
            decl("a", "1"),
            decl("b", "2"),
        ])));
        assert_eq!(not.to_string(), "not ((a: 1) or (b: 2))");
    }
}
