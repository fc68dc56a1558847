use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::sync::OnceLock;

use bitflags::bitflags;
use regex::Regex;
use sd_core::{
    ArgumentTemplate, BinaryOp, Condition, ConstantRecord, ErrorKind, GameData, IntegerFormat,
    Logic, LogicNode, Range, ScopeKind, ScriptDescError, ScriptNode, SymbolicValue,
    TemplateNamespace, UnaryOp, ValueKind,
};
use sd_parser::{parse_expression, parse_script};
use tracing::{debug, trace};

mod builtins;
mod context;
mod evaluator;
mod options;
mod renderer;


use context::EvalContext;

pub use context::RenderedLine;
pub use evaluator::{CompileOutput, ScriptCompiler};
pub use options::{
    CompilerOptions, FlagLabel, RendererConfig, TimeUnits, DEFAULT_MAX_TEMPLATE_DEPTH,
    FLAG_HANDLERS, GROUP_HANDLERS,
};
