pub mod error;
pub mod logic;
pub mod range;
pub mod tables;
pub mod types;
pub mod value;

pub use error::{ErrorKind, ScriptDescError};
pub use logic::{LiteralText, Logic, LogicNode, ScopeKind};
pub use range::{Interval, Range};
pub use tables::*;
pub use types::*;
pub use value::*;
