mod parser;
mod scanner;

pub use parser::{parse_expression, parse_script};
pub use scanner::{tokenize, Token, TokenKind};
