use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self::at(1, 1)
    }

    pub fn at(line: usize, column: usize) -> Self {
        Self {
            start: SourceLocation { line, column },
            end: SourceLocation { line, column },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    Comma,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::Comma => ",",
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    /// The relation holding exactly when `self` does not; other operators
    /// come back unchanged.
    pub fn inverse(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::Less => Self::GreaterEqual,
            Self::LessEqual => Self::Greater,
            Self::Greater => Self::LessEqual,
            Self::GreaterEqual => Self::Less,
            other => other,
        }
    }

    pub fn is_assignment(self) -> bool {
        matches!(self, Self::Assign | Self::AddAssign | Self::SubAssign)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Comma => 0,
            Self::Assign | Self::AddAssign | Self::SubAssign => 1,
            Self::Or => 3,
            Self::And => 4,
            Self::BitOr => 5,
            Self::BitXor => 6,
            Self::BitAnd => 7,
            Self::Equal | Self::NotEqual => 8,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual => 9,
            Self::ShiftLeft | Self::ShiftRight => 10,
            Self::Add | Self::Sub => 11,
            Self::Mul | Self::Div | Self::Rem => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

/// Script AST. Built once per script by the parser and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptNode {
    Integer {
        value: i64,
    },
    Str {
        value: String,
    },
    /// `args` is `Some` for calls, including `f()` which carries `Empty`.
    Identifier {
        name: String,
        args: Option<Box<ScriptNode>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ScriptNode>,
        right: Box<ScriptNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ScriptNode>,
    },
    Ternary {
        condition: Box<ScriptNode>,
        then_branch: Box<ScriptNode>,
        else_branch: Box<ScriptNode>,
    },
    Block {
        statements: Vec<ScriptNode>,
    },
    If {
        condition: Box<ScriptNode>,
        then_branch: Box<ScriptNode>,
    },
    IfElse {
        condition: Box<ScriptNode>,
        then_branch: Box<ScriptNode>,
        else_branch: Box<ScriptNode>,
    },
    Empty,
}

impl ScriptNode {
    pub fn integer(value: i64) -> Self {
        Self::Integer { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Str {
            value: value.into(),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier {
            name: name.into(),
            args: None,
        }
    }

    pub fn call(name: impl Into<String>, args: ScriptNode) -> Self {
        Self::Identifier {
            name: name.into(),
            args: Some(Box::new(args)),
        }
    }

    pub fn binary(op: BinaryOp, left: ScriptNode, right: ScriptNode) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: ScriptNode) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn is_comma(&self) -> bool {
        matches!(
            self,
            Self::Binary {
                op: BinaryOp::Comma,
                ..
            }
        )
    }
}
