use sd_core::{BinaryOp, ErrorKind, ScriptDescError, ScriptNode, SourceSpan, UnaryOp};

use crate::scanner::{tokenize, Token, TokenKind};

/// Binary operator tiers from loosest to tightest, below the ternary.
const BINARY_TIERS: [&[(&str, BinaryOp)]; 10] = [
    &[("||", BinaryOp::Or)],
    &[("&&", BinaryOp::And)],
    &[("|", BinaryOp::BitOr)],
    &[("^", BinaryOp::BitXor)],
    &[("&", BinaryOp::BitAnd)],
    &[("==", BinaryOp::Equal), ("!=", BinaryOp::NotEqual)],
    &[
        ("<", BinaryOp::Less),
        ("<=", BinaryOp::LessEqual),
        (">", BinaryOp::Greater),
        (">=", BinaryOp::GreaterEqual),
    ],
    &[("<<", BinaryOp::ShiftLeft), (">>", BinaryOp::ShiftRight)],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
    &[
        ("*", BinaryOp::Mul),
        ("/", BinaryOp::Div),
        ("%", BinaryOp::Rem),
    ],
];

/// Parses a whole script into a `Block` of statements.
pub fn parse_script(source: &str) -> Result<ScriptNode, ScriptDescError> {
    let mut parser = Parser::new(source)?;
    let mut statements = Vec::new();
    while !parser.at_eof() {
        statements.push(parser.statement()?);
    }
    Ok(ScriptNode::Block { statements })
}

/// Parses a single expression, rejecting trailing tokens.
pub fn parse_expression(source: &str) -> Result<ScriptNode, ScriptDescError> {
    let mut parser = Parser::new(source)?;
    let expression = parser.comma()?;
    if !parser.at_eof() {
        return Err(parser.unexpected("end of expression"));
    }
    Ok(expression)
}

static EOF: TokenKind = TokenKind::Eof;

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(source: &str) -> Result<Self, ScriptDescError> {
        Ok(Self {
            tokens: tokenize(source)?,
            position: 0,
        })
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.position + offset)
            .or_else(|| self.tokens.last())
            .map(|token| &token.kind)
            .unwrap_or(&EOF)
    }

    fn span(&self) -> SourceSpan {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map(|token| token.span.clone())
            .unwrap_or_else(SourceSpan::synthetic)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn at_punct(&self, symbol: &str) -> bool {
        matches!(self.peek(), TokenKind::Punct(found) if *found == symbol)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Identifier(name) if name == keyword)
    }

    fn eat_punct(&mut self, symbol: &str) -> bool {
        if self.at_punct(symbol) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, symbol: &str) -> Result<(), ScriptDescError> {
        if self.eat_punct(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("\"{}\"", symbol)))
        }
    }

    fn unexpected(&self, expected: &str) -> ScriptDescError {
        ScriptDescError::with_span(
            ErrorKind::Parse,
            format!("Expected {} but found {}.", expected, self.peek().describe()),
            self.span(),
        )
    }

    fn statement(&mut self) -> Result<ScriptNode, ScriptDescError> {
        if self.eat_punct(";") {
            return Ok(ScriptNode::Empty);
        }
        if self.eat_punct("{") {
            let mut statements = Vec::new();
            while !self.eat_punct("}") {
                if self.at_eof() {
                    return Err(self.unexpected("\"}\""));
                }
                statements.push(self.statement()?);
            }
            return Ok(ScriptNode::Block { statements });
        }
        if self.at_keyword("if") && matches!(self.peek_at(1), TokenKind::Punct("(")) {
            return self.if_statement();
        }
        if let TokenKind::Identifier(name) = self.peek().clone() {
            if name != "else" && self.peek_at(1).starts_operand() {
                self.advance();
                let args = self.comma()?;
                self.end_statement()?;
                return Ok(ScriptNode::call(name, args));
            }
        }
        let expression = self.comma()?;
        self.end_statement()?;
        Ok(expression)
    }

    fn end_statement(&mut self) -> Result<(), ScriptDescError> {
        if self.eat_punct(";") || self.at_punct("}") || self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("\";\""))
        }
    }

    fn if_statement(&mut self) -> Result<ScriptNode, ScriptDescError> {
        self.advance();
        self.expect_punct("(")?;
        let condition = self.comma()?;
        self.expect_punct(")")?;
        let then_branch = self.statement()?;
        if self.at_keyword("else") {
            self.advance();
            let else_branch = self.statement()?;
            return Ok(ScriptNode::IfElse {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Ok(ScriptNode::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
        })
    }

    fn comma(&mut self) -> Result<ScriptNode, ScriptDescError> {
        let mut left = self.assignment()?;
        while self.eat_punct(",") {
            let right = self.assignment()?;
            left = ScriptNode::binary(BinaryOp::Comma, left, right);
        }
        Ok(left)
    }

    fn assignment(&mut self) -> Result<ScriptNode, ScriptDescError> {
        let target = self.ternary()?;
        let op = match self.peek() {
            TokenKind::Punct("=") => BinaryOp::Assign,
            TokenKind::Punct("+=") => BinaryOp::AddAssign,
            TokenKind::Punct("-=") => BinaryOp::SubAssign,
            _ => return Ok(target),
        };
        if !matches!(target, ScriptNode::Identifier { args: None, .. }) {
            return Err(ScriptDescError::with_span(
                ErrorKind::Parse,
                "Only variables can be assigned to.",
                self.span(),
            ));
        }
        self.advance();
        let value = self.assignment()?;
        Ok(ScriptNode::binary(op, target, value))
    }

    fn ternary(&mut self) -> Result<ScriptNode, ScriptDescError> {
        let condition = self.binary(0)?;
        if !self.eat_punct("?") {
            return Ok(condition);
        }
        let then_branch = self.assignment()?;
        self.expect_punct(":")?;
        let else_branch = self.ternary()?;
        Ok(ScriptNode::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn binary(&mut self, tier: usize) -> Result<ScriptNode, ScriptDescError> {
        let Some(operators) = BINARY_TIERS.get(tier) else {
            return self.unary();
        };
        let mut left = self.binary(tier + 1)?;
        'operators: loop {
            for (symbol, op) in operators.iter() {
                if self.eat_punct(symbol) {
                    let right = self.binary(tier + 1)?;
                    left = ScriptNode::binary(*op, left, right);
                    continue 'operators;
                }
            }
            return Ok(left);
        }
    }

    fn unary(&mut self) -> Result<ScriptNode, ScriptDescError> {
        let op = match self.peek() {
            TokenKind::Punct("!") => UnaryOp::Not,
            TokenKind::Punct("~") => UnaryOp::BitNot,
            TokenKind::Punct("-") => UnaryOp::Minus,
            TokenKind::Punct("+") => UnaryOp::Plus,
            TokenKind::Punct("++") => UnaryOp::PreIncrement,
            TokenKind::Punct("--") => UnaryOp::PreDecrement,
            _ => return self.postfix(),
        };
        self.advance();
        let operand = self.unary()?;
        Ok(ScriptNode::unary(op, operand))
    }

    fn postfix(&mut self) -> Result<ScriptNode, ScriptDescError> {
        let mut operand = self.primary()?;
        loop {
            if self.eat_punct("++") {
                operand = ScriptNode::unary(UnaryOp::PostIncrement, operand);
            } else if self.eat_punct("--") {
                operand = ScriptNode::unary(UnaryOp::PostDecrement, operand);
            } else {
                return Ok(operand);
            }
        }
    }

    fn primary(&mut self) -> Result<ScriptNode, ScriptDescError> {
        match self.peek().clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(ScriptNode::integer(value))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(ScriptNode::string(value))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if !self.eat_punct("(") {
                    return Ok(ScriptNode::identifier(name));
                }
                let args = if self.at_punct(")") {
                    ScriptNode::Empty
                } else {
                    self.comma()?
                };
                self.expect_punct(")")?;
                Ok(ScriptNode::call(name, args))
            }
            TokenKind::Punct("(") => {
                self.advance();
                let inner = self.comma()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    fn ident(name: &str) -> ScriptNode {
        ScriptNode::identifier(name)
    }

    #[test]
    fn binary_precedence_and_associativity() {
        let node = parse_expression("a + b * 2 - c").expect("parse");
        assert_eq!(
            node,
            ScriptNode::binary(
                BinaryOp::Sub,
                ScriptNode::binary(
                    BinaryOp::Add,
                    ident("a"),
                    ScriptNode::binary(BinaryOp::Mul, ident("b"), ScriptNode::integer(2)),
                ),
                ident("c"),
            )
        );

        let logical = parse_expression("a == 1 || b < 2 && !c").expect("parse");
        let ScriptNode::Binary { op, right, .. } = logical else {
            panic!("expected binary node");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, ScriptNode::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let node = parse_expression(".@a = .@b += 2").expect("parse");
        assert_eq!(
            node,
            ScriptNode::binary(
                BinaryOp::Assign,
                ident(".@a"),
                ScriptNode::binary(BinaryOp::AddAssign, ident(".@b"), ScriptNode::integer(2)),
            )
        );
        assert!(parse_expression("1 = 2").is_err());
    }

    #[test]
    fn ternary_and_unary_forms() {
        let node = parse_expression("(a > 0) ? 1 : -1").expect("parse");
        let ScriptNode::Ternary { else_branch, .. } = node else {
            panic!("expected ternary");
        };
        assert_eq!(
            *else_branch,
            ScriptNode::unary(UnaryOp::Minus, ScriptNode::integer(1))
        );
        assert_eq!(
            parse_expression("x++").expect("parse"),
            ScriptNode::unary(UnaryOp::PostIncrement, ident("x"))
        );
    }

    #[test]
    fn command_statement_becomes_call() {
        let script = parse_script("bonus bStr,1; bonus2 bAddRace,RC_Boss,5;").expect("parse");
        let ScriptNode::Block { statements } = script else {
            panic!("expected block");
        };
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            ScriptNode::call(
                "bonus",
                ScriptNode::binary(BinaryOp::Comma, ident("bStr"), ScriptNode::integer(1)),
            )
        );
        let ScriptNode::Identifier { name, args: Some(args) } = &statements[1] else {
            panic!("expected call");
        };
        assert_eq!(name, "bonus2");
        assert!(args.is_comma());
    }

    #[test]
    fn if_else_and_blocks() {
        let script = parse_script(
            "if (Class == Swordman) { bonus bStr,1; } else if (BaseLevel > 50) bonus bAgi,2; else ;",
        )
        .expect("parse");
        let ScriptNode::Block { statements } = script else {
            panic!("expected block");
        };
        let ScriptNode::IfElse {
            then_branch,
            else_branch,
            ..
        } = &statements[0]
        else {
            panic!("expected if/else");
        };
        assert!(matches!(**then_branch, ScriptNode::Block { .. }));
        let ScriptNode::IfElse { else_branch: inner, .. } = &**else_branch else {
            panic!("expected nested if/else");
        };
        assert_eq!(**inner, ScriptNode::Empty);
    }

    #[test]
    fn calls_with_and_without_arguments() {
        assert_eq!(
            parse_expression("rand(1,10)").expect("parse"),
            ScriptNode::call(
                "rand",
                ScriptNode::binary(
                    BinaryOp::Comma,
                    ScriptNode::integer(1),
                    ScriptNode::integer(10)
                ),
            )
        );
        assert_eq!(
            parse_expression("getrefine()").expect("parse"),
            ScriptNode::call("getrefine", ScriptNode::Empty)
        );
    }

    #[test]
    fn parse_errors_carry_span() {
        let error = parse_script("bonus bStr,1;\nif (a > ) bonus bAgi,1;").expect_err("bad condition");
        assert_eq!(error.kind, ErrorKind::Parse);
        assert_eq!(error.span, Some(SourceSpan {
            start: sd_core::SourceLocation { line: 2, column: 9 },
            end: sd_core::SourceLocation { line: 2, column: 10 },
        }));
        assert!(parse_script("{ bonus bStr,1;").is_err());
        assert!(parse_expression("a b").is_err());
    }

    #[test]
    fn ast_dump_is_tagged_json() {
        let script = parse_script("bonus bStr,1;").expect("parse");
        let json = serde_json::to_value(&script).expect("serialize");
        assert_eq!(json["kind"], "block");
        assert_eq!(json["statements"][0]["name"], "bonus");
    }
}
