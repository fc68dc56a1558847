use serde::{Deserialize, Serialize};

use crate::logic::LiteralText;
use crate::range::Range;
use crate::types::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Identifier,
    StringLiteral,
}

/// Result of evaluating one expression: what to print and what it may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicValue {
    pub kind: ValueKind,
    pub text: String,
    pub range: Range,
}

impl SymbolicValue {
    pub fn integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer,
            text: value.to_string(),
            range: Range::single(value),
        }
    }

    /// String texts are kept unquoted and carry no numeric range.
    pub fn string(text: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::StringLiteral,
            text: text.into(),
            range: Range::new(),
        }
    }

    pub fn identifier(text: impl Into<String>, range: Range) -> Self {
        Self {
            kind: ValueKind::Identifier,
            text: text.into(),
            range,
        }
    }

    /// An unknown runtime value.
    pub fn free(text: impl Into<String>) -> Self {
        Self::identifier(text, Range::full())
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == ValueKind::Identifier
    }

    pub fn is_string(&self) -> bool {
        self.kind == ValueKind::StringLiteral
    }

    /// The concrete value when the range pins down exactly one integer.
    pub fn constant(&self) -> Option<i64> {
        self.range.singleton()
    }
}

/// Source form of a comparison: the operator and the other operand's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub op: BinaryOp,
    pub other: String,
}

/// Literal payload of branch conditions.
///
/// `range` holds the values of `name` for which the literal holds, and is
/// only set when that set is exact, so its complement is exact too.
/// `relation` keeps the comparison as written for literals whose range is
/// unknown or reads badly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    pub range: Option<Range>,
    pub relation: Option<Relation>,
}

impl Condition {
    pub fn new(name: impl Into<String>, range: Range) -> Self {
        Self {
            name: name.into(),
            range: Some(range),
            relation: None,
        }
    }

    pub fn relation(name: impl Into<String>, op: BinaryOp, other: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
            relation: Some(Relation {
                op,
                other: other.into(),
            }),
        }
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// `name OP value` text when `range` has a readable shape.
    fn range_text(&self, range: &Range, negated: bool) -> Option<String> {
        let name = &self.name;
        if let Some(value) = range.singleton() {
            let op = if negated { "!=" } else { "==" };
            return Some(format!("{} {} {}", name, op, value));
        }
        if let Some(value) = Range::full().subtract(range).ok()?.singleton() {
            let op = if negated { "==" } else { "!=" };
            return Some(format!("{} {} {}", name, op, value));
        }
        let [only] = range.intervals() else {
            return None;
        };
        match (only.min == i64::MIN, only.max == i64::MAX) {
            (true, true) => None,
            (false, true) if negated => Some(format!("{} < {}", name, only.min)),
            (false, true) => Some(format!("{} >= {}", name, only.min)),
            (true, false) if negated => Some(format!("{} > {}", name, only.max)),
            (true, false) => Some(format!("{} <= {}", name, only.max)),
            (false, false) if negated && self.relation.is_some() => None,
            (false, false) => {
                let text = format!("{} <= {} <= {}", only.min, name, only.max);
                Some(if negated { format!("!({})", text) } else { text })
            }
        }
    }
}

impl LiteralText for Condition {
    fn literal_text(&self, negated: bool) -> String {
        if let Some(text) = self
            .range
            .as_ref()
            .and_then(|range| self.range_text(range, negated))
        {
            return text;
        }
        if let Some(relation) = &self.relation {
            let op = if negated {
                relation.op.inverse()
            } else {
                relation.op
            };
            return format!("{} {} {}", self.name, op.symbol(), relation.other);
        }

        let Some(range) = &self.range else {
            return if negated {
                format!("!{}", self.name)
            } else {
                self.name.clone()
            };
        };
        if range.is_empty() || range.is_full() {
            let holds = range.is_full() != negated;
            return holds.to_string();
        }
        let text = format!("{} in {{{}}}", self.name, range);
        if negated {
            format!("!({})", text)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn constructors_set_kind_and_range() {
        let ten = SymbolicValue::integer(10);
        assert_eq!(ten.kind, ValueKind::Integer);
        assert_eq!(ten.text, "10");
        assert_eq!(ten.constant(), Some(10));

        let text = SymbolicValue::string("Hello");
        assert!(text.is_string());
        assert!(text.range.is_empty());

        let free = SymbolicValue::free("Hp");
        assert!(free.is_identifier());
        assert!(free.range.is_full());
    }

    #[test]
    fn condition_text_follows_range_shape() {
        let equal = Condition::new("Class", Range::single(1));
        assert_eq!(equal.literal_text(false), "Class == 1");
        assert_eq!(equal.literal_text(true), "Class != 1");

        let above = Condition::new("BaseLevel", Range::interval(50, i64::MAX).expect("range"));
        assert_eq!(above.literal_text(false), "BaseLevel >= 50");
        assert_eq!(above.literal_text(true), "BaseLevel < 50");

        let below = Condition::new("Hp", Range::interval(i64::MIN, 9).expect("range"));
        assert_eq!(below.literal_text(false), "Hp <= 9");
        assert_eq!(below.literal_text(true), "Hp > 9");

        let between = Condition::new("Refine", Range::interval(7, 9).expect("range"));
        assert_eq!(between.literal_text(false), "7 <= Refine <= 9");
        assert_eq!(between.literal_text(true), "!(7 <= Refine <= 9)");

        let mut split = Range::single(1);
        split.add(4, 6).expect("add");
        let set = Condition::new("Job", split);
        assert_eq!(set.literal_text(false), "Job in {1, 4 ~ 6}");

        let nonzero = Condition::new(".@x", Range::full().subtract(&Range::single(0)).expect("range"));
        assert_eq!(nonzero.literal_text(false), ".@x != 0");
        assert_eq!(nonzero.literal_text(true), ".@x == 0");
    }

    #[test]
    fn relation_text_covers_unknown_and_awkward_ranges() {
        let free = Condition::relation(".@a", BinaryOp::Less, ".@b");
        assert_eq!(free.literal_text(false), ".@a < .@b");
        assert_eq!(free.literal_text(true), ".@a >= .@b");

        let text = Condition::relation(".@s$", BinaryOp::Equal, "\"abc\"");
        assert_eq!(text.literal_text(false), ".@s$ == \"abc\"");
        assert_eq!(text.literal_text(true), ".@s$ != \"abc\"");

        let mut holes = Range::interval(0, 4).expect("range");
        holes.add(6, 20).expect("add");
        let refine = Condition::relation("Refine", BinaryOp::NotEqual, "5").with_range(holes);
        assert_eq!(refine.literal_text(false), "Refine != 5");
        assert_eq!(refine.literal_text(true), "Refine == 5");

        let exact = Condition::relation("Refine", BinaryOp::GreaterEqual, "7")
            .with_range(Range::interval(7, 20).expect("range"));
        assert_eq!(exact.literal_text(false), "7 <= Refine <= 20");
        assert_eq!(exact.literal_text(true), "Refine < 7");
    }
}
