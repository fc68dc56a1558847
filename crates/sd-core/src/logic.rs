//! Boolean conditions kept in disjunction-of-conjunctions shape.
//!
//! `Logic` is a reduce stack driven in the order a parser discovers `&&`,
//! `||`, `!` and comparisons. Every `pop` folds the two topmost frames into
//! one, so however deep the source nesting is, a frame is never more than
//! two levels deep.

use crate::error::{ErrorKind, ScriptDescError};

/// Renders a literal payload, flipping the relation when `negated` is set.
pub trait LiteralText {
    fn literal_text(&self, negated: bool) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicNode<L> {
    Literal { negated: bool, payload: L },
    And(Vec<LogicNode<L>>),
    Or(Vec<LogicNode<L>>),
    /// Only lives on the scope stack; gone once popped.
    Not(Vec<LogicNode<L>>),
    DisjOfConj(Vec<LogicNode<L>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    And,
    Or,
    Not,
}

impl<L: Clone> LogicNode<L> {
    pub fn literal(payload: L) -> Self {
        Self::Literal {
            negated: false,
            payload,
        }
    }

    /// The empty conjunction.
    pub fn truth() -> Self {
        Self::And(Vec::new())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::Not(_) => "not",
            Self::DisjOfConj(_) => "disj_of_conj",
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Literal { .. } => 0,
            Self::And(children)
            | Self::Or(children)
            | Self::Not(children)
            | Self::DisjOfConj(children) => {
                1 + children.iter().map(LogicNode::depth).max().unwrap_or(0)
            }
        }
    }

    pub fn is_truth(&self) -> bool {
        matches!(self, Self::And(children) if children.is_empty())
    }

    fn flipped(&self) -> Self {
        match self {
            Self::Literal { negated, payload } => Self::Literal {
                negated: !negated,
                payload: payload.clone(),
            },
            other => other.clone(),
        }
    }

    /// Each disjunct as its list of `(negated, payload)` literals.
    pub fn conjunctions(&self) -> Vec<Vec<(bool, &L)>> {
        match self {
            Self::Literal { negated, payload } => vec![vec![(*negated, payload)]],
            Self::And(children) | Self::Not(children) => {
                let mut literals = Vec::new();
                collect_literals(children, &mut literals);
                vec![literals]
            }
            Self::Or(children) | Self::DisjOfConj(children) => children
                .iter()
                .map(|child| {
                    let mut literals = Vec::new();
                    collect_literals(std::slice::from_ref(child), &mut literals);
                    literals
                })
                .collect(),
        }
    }

    /// Structural negation, reduced back to canonical shape.
    pub fn negate(&self) -> Result<Self, ScriptDescError> {
        match self {
            Self::Literal { .. } => Ok(self.flipped()),
            Self::And(children) | Self::Not(children) => {
                let mut disjuncts = Vec::new();
                reserve(&mut disjuncts, children.len())?;
                for literal in flatten_conjunction(children)? {
                    disjuncts.push(literal.flipped());
                }
                Ok(Self::Or(disjuncts))
            }
            Self::Or(children) | Self::DisjOfConj(children) => {
                let mut logic = Logic::with_root(Self::truth());
                for child in children {
                    logic.push_scope(ScopeKind::Or)?;
                    for literal in to_conjunction(child)? {
                        logic.attach(literal.flipped())?;
                    }
                    logic.pop_scope()?;
                }
                logic.into_root().ok_or_else(|| {
                    ScriptDescError::new(ErrorKind::InvalidLogicShape, "Negation left no frame.")
                })
            }
        }
    }
}

impl<L: LiteralText> LogicNode<L> {
    pub fn render(&self) -> String {
        match self {
            Self::Literal { negated, payload } => payload.literal_text(*negated),
            Self::And(children) | Self::Not(children) => {
                if children.is_empty() {
                    return "true".to_string();
                }
                join_rendered(children, " && ", false)
            }
            Self::Or(children) | Self::DisjOfConj(children) => {
                if children.is_empty() {
                    return "false".to_string();
                }
                join_rendered(children, " || ", true)
            }
        }
    }
}

fn join_rendered<L: LiteralText>(
    children: &[LogicNode<L>],
    separator: &str,
    group_conjunctions: bool,
) -> String {
    children
        .iter()
        .map(|child| match child {
            LogicNode::And(inner) if group_conjunctions && inner.len() > 1 => {
                format!("({})", child.render())
            }
            _ => child.render(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn collect_literals<'a, L>(nodes: &'a [LogicNode<L>], out: &mut Vec<(bool, &'a L)>) {
    for node in nodes {
        match node {
            LogicNode::Literal { negated, payload } => out.push((*negated, payload)),
            LogicNode::And(children)
            | LogicNode::Not(children)
            | LogicNode::Or(children)
            | LogicNode::DisjOfConj(children) => collect_literals(children, out),
        }
    }
}

fn shape_error(message: impl Into<String>) -> ScriptDescError {
    ScriptDescError::new(ErrorKind::InvalidLogicShape, message)
}

fn reserve<T>(items: &mut Vec<T>, additional: usize) -> Result<(), ScriptDescError> {
    items
        .try_reserve(additional)
        .map_err(|_| ScriptDescError::out_of_memory("logic"))
}

/// AND `node` into a conjunction list, descending into nested And/Not frames.
fn and_into<L: Clone>(
    conjunction: &mut Vec<LogicNode<L>>,
    node: &LogicNode<L>,
) -> Result<(), ScriptDescError> {
    match node {
        LogicNode::Literal { .. } => {
            reserve(conjunction, 1)?;
            conjunction.push(node.clone());
            Ok(())
        }
        LogicNode::And(children) | LogicNode::Not(children) => {
            for child in children {
                and_into(conjunction, child)?;
            }
            Ok(())
        }
        other => Err(shape_error(format!(
            "Cannot AND a {} frame into a conjunction.",
            other.kind_name()
        ))),
    }
}

/// OR `node` into a disjunct list as one more disjunct.
fn or_into<L: Clone>(
    disjuncts: &mut Vec<LogicNode<L>>,
    node: &LogicNode<L>,
) -> Result<(), ScriptDescError> {
    reserve(disjuncts, 1)?;
    match node {
        LogicNode::Literal { .. } => disjuncts.push(node.clone()),
        LogicNode::And(children) | LogicNode::Not(children) => {
            let conjunction = flatten_conjunction(children)?;
            if conjunction.len() == 1 {
                disjuncts.push(conjunction[0].clone());
            } else {
                disjuncts.push(LogicNode::And(conjunction));
            }
        }
        other => {
            return Err(shape_error(format!(
                "Cannot OR a {} frame in as a single disjunct.",
                other.kind_name()
            )))
        }
    }
    Ok(())
}

fn flatten_conjunction<L: Clone>(
    children: &[LogicNode<L>],
) -> Result<Vec<LogicNode<L>>, ScriptDescError> {
    let mut conjunction = Vec::new();
    for child in children {
        and_into(&mut conjunction, child)?;
    }
    Ok(conjunction)
}

fn to_conjunction<L: Clone>(node: &LogicNode<L>) -> Result<Vec<LogicNode<L>>, ScriptDescError> {
    let mut conjunction = Vec::new();
    and_into(&mut conjunction, node)?;
    Ok(conjunction)
}

fn disjuncts_of<L>(node: &LogicNode<L>) -> &[LogicNode<L>] {
    match node {
        LogicNode::Or(children) | LogicNode::DisjOfConj(children) => children,
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logic<L> {
    frames: Vec<LogicNode<L>>,
}

impl<L: Clone> Default for Logic<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Clone> Logic<L> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Starts from an existing condition, turning it into a frame that
    /// conjoins whatever is popped into it.
    pub fn with_root(root: LogicNode<L>) -> Self {
        let root = match root {
            LogicNode::Literal { .. } => LogicNode::And(vec![root]),
            LogicNode::Not(children) => LogicNode::And(children),
            LogicNode::Or(children) => LogicNode::DisjOfConj(children),
            other => other,
        };
        Self {
            frames: vec![root],
        }
    }

    pub fn frames(&self) -> &[LogicNode<L>] {
        &self.frames
    }

    pub fn top(&self) -> Option<&LogicNode<L>> {
        self.frames.last()
    }

    pub fn root(&self) -> Option<&LogicNode<L>> {
        self.frames.first()
    }

    pub fn into_root(mut self) -> Option<LogicNode<L>> {
        if self.frames.len() == 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) -> Result<(), ScriptDescError> {
        reserve(&mut self.frames, 1)?;
        self.frames.push(match kind {
            ScopeKind::And => LogicNode::And(Vec::new()),
            ScopeKind::Or => LogicNode::Or(Vec::new()),
            ScopeKind::Not => LogicNode::Not(Vec::new()),
        });
        Ok(())
    }

    pub fn push_literal(&mut self, payload: L) -> Result<(), ScriptDescError> {
        self.attach(LogicNode::literal(payload))
    }

    fn attach(&mut self, literal: LogicNode<L>) -> Result<(), ScriptDescError> {
        let Some(top) = self.frames.last_mut() else {
            return Err(shape_error("No open scope to attach a literal to."));
        };
        match top {
            LogicNode::And(children) | LogicNode::Or(children) => {
                reserve(children, 1)?;
                children.push(literal);
            }
            LogicNode::Not(children) => {
                reserve(children, 1)?;
                children.push(literal.flipped());
            }
            LogicNode::DisjOfConj(disjuncts) => {
                for disjunct in disjuncts.iter_mut() {
                    match disjunct {
                        LogicNode::And(children) => {
                            reserve(children, 1)?;
                            children.push(literal.clone());
                        }
                        LogicNode::Literal { .. } => {
                            let existing = disjunct.clone();
                            *disjunct = LogicNode::And(vec![existing, literal.clone()]);
                        }
                        other => {
                            return Err(shape_error(format!(
                                "Unexpected {} disjunct.",
                                other.kind_name()
                            )))
                        }
                    }
                }
            }
            LogicNode::Literal { .. } => {
                let existing = top.clone();
                *top = LogicNode::And(vec![existing, literal]);
            }
        }
        Ok(())
    }

    /// Folds the two topmost frames into one replacement frame.
    pub fn pop(&mut self) -> Result<(), ScriptDescError> {
        if self.frames.len() < 2 {
            return Err(shape_error("Pop needs two open frames."));
        }
        let right = self.frames.pop().ok_or_else(|| shape_error("Missing right frame."))?;
        let left = self.frames.pop().ok_or_else(|| shape_error("Missing left frame."))?;
        let merged = combine(left, right)?;
        self.frames.push(merged);
        Ok(())
    }

    /// Like `pop`, but first relabels a disjunction-of-conjunctions on top as
    /// the equivalent `Or` when the frame below is itself disjunctive.
    pub fn pop_scope(&mut self) -> Result<(), ScriptDescError> {
        let len = self.frames.len();
        if len >= 2 {
            let below_is_disjunctive = matches!(
                self.frames[len - 2],
                LogicNode::Or(_) | LogicNode::DisjOfConj(_)
            );
            if below_is_disjunctive {
                if let LogicNode::DisjOfConj(children) = &mut self.frames[len - 1] {
                    let children = std::mem::take(children);
                    self.frames[len - 1] = LogicNode::Or(children);
                }
            }
        }
        self.pop()
    }

    /// ANDs a finished condition into the top frame.
    pub fn conjoin(&mut self, node: LogicNode<L>) -> Result<(), ScriptDescError> {
        let frame = match node {
            LogicNode::Literal { .. } => LogicNode::And(vec![node]),
            LogicNode::Not(children) => LogicNode::And(children),
            other => other,
        };
        reserve(&mut self.frames, 1)?;
        self.frames.push(frame);
        self.pop_scope()
    }

    /// Pops until a single frame remains.
    pub fn reduce(&mut self) -> Result<(), ScriptDescError> {
        while self.frames.len() > 1 {
            self.pop_scope()?;
        }
        Ok(())
    }
}

fn combine<L: Clone>(left: LogicNode<L>, right: LogicNode<L>) -> Result<LogicNode<L>, ScriptDescError> {
    match (&left, &right) {
        (
            LogicNode::And(children),
            LogicNode::And(_) | LogicNode::Not(_) | LogicNode::Literal { .. },
        ) => {
            let mut conjunction = children.clone();
            and_into(&mut conjunction, &right)?;
            Ok(LogicNode::And(conjunction))
        }
        (LogicNode::And(children), LogicNode::Or(disjuncts)) => {
            let mut result = Vec::new();
            reserve(&mut result, disjuncts.len())?;
            for disjunct in disjuncts {
                let mut conjunction = children.clone();
                and_into(&mut conjunction, disjunct)?;
                result.push(LogicNode::And(conjunction));
            }
            Ok(LogicNode::DisjOfConj(result))
        }
        (LogicNode::And(children), LogicNode::DisjOfConj(disjuncts)) => {
            let mut result = Vec::new();
            reserve(&mut result, disjuncts.len())?;
            for disjunct in disjuncts {
                let mut conjunction = children.clone();
                and_into(&mut conjunction, disjunct)?;
                result.push(LogicNode::And(conjunction));
            }
            Ok(LogicNode::DisjOfConj(result))
        }
        (
            LogicNode::Or(children),
            LogicNode::And(_) | LogicNode::Not(_) | LogicNode::Literal { .. },
        ) => {
            let mut disjuncts = children.clone();
            or_into(&mut disjuncts, &right)?;
            Ok(LogicNode::Or(disjuncts))
        }
        (LogicNode::Or(children), LogicNode::Or(others)) => {
            let mut disjuncts = children.clone();
            for other in others {
                or_into(&mut disjuncts, other)?;
            }
            Ok(LogicNode::Or(disjuncts))
        }
        (
            LogicNode::DisjOfConj(disjuncts),
            LogicNode::And(_) | LogicNode::Not(_) | LogicNode::Literal { .. },
        ) => {
            let mut result = Vec::new();
            reserve(&mut result, disjuncts.len())?;
            for disjunct in disjuncts {
                let mut conjunction = to_conjunction(disjunct)?;
                and_into(&mut conjunction, &right)?;
                result.push(LogicNode::And(conjunction));
            }
            Ok(LogicNode::DisjOfConj(result))
        }
        (LogicNode::DisjOfConj(_), LogicNode::Or(_)) => {
            let mut result = Vec::new();
            reserve(&mut result, disjuncts_of(&left).len() * disjuncts_of(&right).len())?;
            for existing in disjuncts_of(&left) {
                for added in disjuncts_of(&right) {
                    let mut conjunction = to_conjunction(existing)?;
                    and_into(&mut conjunction, added)?;
                    result.push(LogicNode::And(conjunction));
                }
            }
            Ok(LogicNode::DisjOfConj(result))
        }
        _ => Err(shape_error(format!(
            "Cannot pop a {} frame into a {} frame.",
            right.kind_name(),
            left.kind_name()
        ))),
    }
}

#[cfg(test)]
mod logic_tests {
    use super::*;
    use proptest::prelude::*;

    impl LiteralText for &'static str {
        fn literal_text(&self, negated: bool) -> String {
            if negated {
                format!("!{}", self)
            } else {
                self.to_string()
            }
        }
    }

    fn lit(name: &'static str) -> LogicNode<&'static str> {
        LogicNode::literal(name)
    }

    fn not(name: &'static str) -> LogicNode<&'static str> {
        LogicNode::Literal {
            negated: true,
            payload: name,
        }
    }

    fn rooted() -> Logic<&'static str> {
        Logic::with_root(LogicNode::truth())
    }

    #[test]
    fn and_scope_merges_literals_into_parent_conjunction() {
        let mut logic = rooted();
        logic.push_literal("a").expect("literal");
        logic.push_scope(ScopeKind::And).expect("scope");
        logic.push_literal("b").expect("literal");
        logic.push_literal("c").expect("literal");
        logic.pop().expect("pop");
        assert_eq!(logic.frames(), &[LogicNode::And(vec![lit("a"), lit("b"), lit("c")])]);
    }

    #[test]
    fn or_under_and_distributes_into_disjunction_of_conjunctions() {
        let mut logic = rooted();
        logic.push_literal("x").expect("literal");
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("a").expect("literal");
        logic.push_scope(ScopeKind::And).expect("scope");
        logic.push_literal("b").expect("literal");
        logic.push_literal("c").expect("literal");
        logic.pop().expect("pop and into or");
        assert_eq!(
            logic.top(),
            Some(&LogicNode::Or(vec![
                lit("a"),
                LogicNode::And(vec![lit("b"), lit("c")])
            ]))
        );
        logic.pop().expect("pop or into and");
        let root = logic.into_root().expect("single frame");
        assert_eq!(
            root,
            LogicNode::DisjOfConj(vec![
                LogicNode::And(vec![lit("x"), lit("a")]),
                LogicNode::And(vec![lit("x"), lit("b"), lit("c")]),
            ])
        );
        assert_eq!(root.render(), "(x && a) || (x && b && c)");
    }

    #[test]
    fn literal_pushed_into_disjunction_is_added_to_every_disjunct() {
        let mut logic = Logic::with_root(LogicNode::DisjOfConj(vec![
            lit("a"),
            LogicNode::And(vec![lit("b"), lit("c")]),
        ]));
        logic.push_literal("d").expect("literal");
        assert_eq!(
            logic.top(),
            Some(&LogicNode::DisjOfConj(vec![
                LogicNode::And(vec![lit("a"), lit("d")]),
                LogicNode::And(vec![lit("b"), lit("c"), lit("d")]),
            ]))
        );
    }

    #[test]
    fn disjunction_popped_into_disjunction_takes_cross_product() {
        let mut logic = Logic::with_root(LogicNode::Or(vec![lit("a"), lit("b")]));
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("c").expect("literal");
        logic.push_literal("d").expect("literal");
        logic.pop().expect("pop");
        let root = logic.into_root().expect("root");
        assert_eq!(root.render(), "(a && c) || (a && d) || (b && c) || (b && d)");
        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn or_frames_absorb_conjunctions_and_other_disjunctions() {
        let mut logic = Logic::new();
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("a").expect("literal");
        logic.push_scope(ScopeKind::Not).expect("scope");
        logic.push_literal("b").expect("literal");
        logic.pop().expect("pop not into or");
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("c").expect("literal");
        logic.pop().expect("pop or into or");
        assert_eq!(
            logic.top(),
            Some(&LogicNode::Or(vec![lit("a"), not("b"), lit("c")]))
        );
    }

    #[test]
    fn invalid_pairings_are_reported() {
        let mut logic: Logic<&'static str> = Logic::new();
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_scope(ScopeKind::And).expect("scope");
        logic.push_literal("a").expect("literal");
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("b").expect("literal");
        logic.pop().expect("or into and");
        let error = logic.pop().expect_err("disj_of_conj into or is invalid");
        assert_eq!(error.kind, ErrorKind::InvalidLogicShape);

        let mut single: Logic<&'static str> = Logic::new();
        single.push_scope(ScopeKind::And).expect("scope");
        assert_eq!(
            single.pop().expect_err("needs two frames").kind,
            ErrorKind::InvalidLogicShape
        );

        let mut under_not: Logic<&'static str> = Logic::new();
        under_not.push_scope(ScopeKind::Not).expect("scope");
        under_not.push_scope(ScopeKind::And).expect("scope");
        assert!(under_not.pop().is_err());
    }

    #[test]
    fn pop_scope_relabels_nested_disjunction() {
        let mut logic: Logic<&'static str> = Logic::new();
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("a").expect("literal");
        logic.push_scope(ScopeKind::And).expect("scope");
        logic.push_literal("b").expect("literal");
        logic.push_scope(ScopeKind::Or).expect("scope");
        logic.push_literal("c").expect("literal");
        logic.push_literal("d").expect("literal");
        logic.pop_scope().expect("or into and");
        logic.pop_scope().expect("relabelled disjunction into or");
        let root = logic.into_root().expect("root");
        assert_eq!(root.render(), "a || (b && c) || (b && d)");
    }

    #[test]
    fn not_scope_flips_single_literal_like_direct_negation() {
        let mut logic = rooted();
        logic.push_scope(ScopeKind::Not).expect("scope");
        logic.push_literal("a").expect("literal");
        logic.pop().expect("pop");
        let root = logic.into_root().expect("root");
        let direct = lit("a").negate().expect("negate");
        assert_eq!(root, LogicNode::And(vec![direct.clone()]));
        assert_eq!(direct, not("a"));
        assert_eq!(root.render(), "!a");
    }

    #[test]
    fn negation_applies_de_morgan_and_stays_canonical() {
        let conjunction = LogicNode::And(vec![lit("a"), not("b")]);
        assert_eq!(
            conjunction.negate().expect("negate"),
            LogicNode::Or(vec![not("a"), lit("b")])
        );

        let dnf = LogicNode::DisjOfConj(vec![
            LogicNode::And(vec![lit("a"), lit("b")]),
            lit("c"),
        ]);
        let negated = dnf.negate().expect("negate");
        assert_eq!(negated.render(), "(!a && !c) || (!b && !c)");
        assert!(negated.depth() <= 2);

        assert_eq!(
            LogicNode::<&'static str>::Or(Vec::new()).negate().expect("negate"),
            LogicNode::truth()
        );
    }

    #[test]
    fn conjoin_combines_finished_conditions() {
        let mut logic = rooted();
        logic.conjoin(lit("a")).expect("literal");
        logic
            .conjoin(LogicNode::DisjOfConj(vec![lit("b"), lit("c")]))
            .expect("disjunction");
        logic
            .conjoin(LogicNode::DisjOfConj(vec![lit("d"), lit("e")]))
            .expect("second disjunction");
        let root = logic.into_root().expect("root");
        assert_eq!(
            root.render(),
            "(a && b && d) || (a && b && e) || (a && c && d) || (a && c && e)"
        );
    }

    #[test]
    fn conjunctions_lists_literals_per_disjunct() {
        let dnf = LogicNode::DisjOfConj(vec![
            LogicNode::And(vec![lit("a"), not("b")]),
            lit("c"),
        ]);
        let conjunctions = dnf.conjunctions();
        assert_eq!(conjunctions.len(), 2);
        assert_eq!(conjunctions[0], vec![(false, &"a"), (true, &"b")]);
        assert_eq!(conjunctions[1], vec![(false, &"c")]);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Scope(ScopeKind),
        Literal(usize),
        Pop,
    }

    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    fn steps() -> impl Strategy<Value = Vec<Step>> {
        prop::collection::vec(
            prop_oneof![
                1 => Just(Step::Scope(ScopeKind::And)),
                1 => Just(Step::Scope(ScopeKind::Or)),
                1 => Just(Step::Scope(ScopeKind::Not)),
                2 => (0..NAMES.len()).prop_map(Step::Literal),
                2 => Just(Step::Pop),
            ],
            0..32,
        )
    }

    /// Frame pairings `pop` can fold; every other pairing is a shape error.
    fn foldable(left: &LogicNode<&'static str>, right: &LogicNode<&'static str>) -> bool {
        match (left, right) {
            (LogicNode::And(_), _) => true,
            (LogicNode::Or(_) | LogicNode::DisjOfConj(_), LogicNode::DisjOfConj(_)) => false,
            (LogicNode::Or(_) | LogicNode::DisjOfConj(_), _) => true,
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn arbitrary_sequences_never_exceed_depth_two(sequence in steps()) {
            let mut logic = rooted();
            for step in sequence {
                match step {
                    Step::Scope(kind) => logic.push_scope(kind).expect("scope"),
                    Step::Literal(index) => logic.push_literal(NAMES[index]).expect("literal"),
                    Step::Pop => {
                        let [.., left, right] = logic.frames() else {
                            continue;
                        };
                        let expected = foldable(left, right);
                        let result = logic.pop();
                        if !expected {
                            prop_assert_eq!(
                                result.map_err(|error| error.kind),
                                Err(ErrorKind::InvalidLogicShape)
                            );
                            return Ok(());
                        }
                        prop_assert!(result.is_ok(), "{:?}", result);
                    }
                }
                for frame in logic.frames() {
                    prop_assert!(frame.depth() <= 2, "frame too deep: {:?}", frame);
                }
            }
        }

        #[test]
        fn scoped_sequences_without_negation_reduce_to_dnf(sequence in steps()) {
            let mut logic = rooted();
            for step in sequence {
                match step {
                    Step::Scope(ScopeKind::Not) => {}
                    Step::Scope(kind) => logic.push_scope(kind).expect("scope"),
                    Step::Literal(index) => logic.push_literal(NAMES[index]).expect("literal"),
                    Step::Pop => {
                        if logic.frames().len() >= 2 {
                            logic.pop_scope().expect("well-formed pop");
                        }
                    }
                }
            }
            logic.reduce().expect("reduce");
            let root = logic.into_root().expect("root");
            prop_assert!(root.depth() <= 2);
            prop_assert!(matches!(
                root,
                LogicNode::And(_) | LogicNode::Or(_) | LogicNode::DisjOfConj(_)
            ));
        }
    }
}
