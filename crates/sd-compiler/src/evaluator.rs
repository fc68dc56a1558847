use crate::*;

bitflags! {
    /// Modes threaded through `evaluate`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub(crate) struct EvalFlags: u8 {
        /// Comparisons push literals into the open condition level.
        const CONDITION  = 1 << 0;
        /// Inside an odd number of `!`.
        const NEGATED    = 1 << 1;
        /// Operand of a string concatenation.
        const IDENTIFIER = 1 << 2;
    }
}

impl EvalFlags {
    /// Flags passed to the operands of an arithmetic or call expression.
    pub(crate) fn operand(self) -> Self {
        self & Self::IDENTIFIER
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub text: String,
    pub lines: Vec<RenderedLine>,
}

/// Symbolic evaluator turning bonus scripts into annotated text.
///
/// One compiler may compile many scripts in sequence; the undefined set
/// accumulates across all of them.
pub struct ScriptCompiler<'db> {
    pub(crate) db: &'db dyn GameData,
    pub(crate) config: RendererConfig,
    pub(crate) options: CompilerOptions,
    pub(crate) undefined: BTreeSet<String>,
    pub(crate) context: EvalContext,
    pub(crate) template_depth: usize,
}

impl<'db> ScriptCompiler<'db> {
    pub fn new(db: &'db dyn GameData) -> Self {
        Self::with_options(db, CompilerOptions::default())
    }

    pub fn with_options(db: &'db dyn GameData, options: CompilerOptions) -> Self {
        Self {
            db,
            config: RendererConfig::from_data(db),
            options,
            undefined: BTreeSet::new(),
            context: EvalContext::default(),
            template_depth: 0,
        }
    }

    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.config = config;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Distinct references that resolved nowhere, namespaced like
    /// `statement.MaxWeight` or `bonus2.bAddEle`.
    pub fn undefined(&self) -> &BTreeSet<String> {
        &self.undefined
    }

    pub fn take_undefined(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.undefined)
    }

    pub fn compile(&mut self, source: &str) -> Result<CompileOutput, ScriptDescError> {
        debug!(target: "sd_compiler::compile", bytes = source.len(), "compiling script");
        let script = parse_script(source)?;

        self.context.clear();
        self.template_depth = 0;
        let result = self.with_buffer(|compiler| compiler.translate(&script));
        self.context.clear();
        let ((), lines) = result?;

        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.options.line_separator);
        debug!(target: "sd_compiler::compile", lines = lines.len(), "compiled script");
        Ok(CompileOutput { text, lines })
    }

    pub fn evaluate_expression(&mut self, source: &str) -> Result<SymbolicValue, ScriptDescError> {
        let expression = parse_expression(source)?;
        self.context.clear();
        self.template_depth = 0;
        let result = self.with_variable_scope(|compiler| {
            compiler.evaluate(&expression, EvalFlags::empty())
        });
        self.context.clear();
        result
    }

    /// Renders a named `argument` template against already evaluated values.
    pub fn render_argument(
        &mut self,
        identifier: &str,
        args: &[SymbolicValue],
    ) -> Result<String, ScriptDescError> {
        let db = self.db;
        let template = db
            .argument_template(TemplateNamespace::Argument, identifier)
            .ok_or_else(|| {
                ScriptDescError::new(
                    ErrorKind::UnresolvedRequiredReference,
                    format!("Unknown argument template '{}'.", identifier),
                )
            })?;
        self.render_template(template, args)
    }

    pub(crate) fn record_undefined(&mut self, key: String) {
        if !self.undefined.contains(&key) {
            debug!(target: "sd_compiler::undefined", reference = %key, "undefined reference");
            self.undefined.insert(key);
        }
    }

    pub(crate) fn with_variable_scope<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ScriptDescError>,
    ) -> Result<T, ScriptDescError> {
        self.context.push_variables();
        let result = body(self);
        self.context.pop_variables();
        result
    }

    pub(crate) fn with_condition<T>(
        &mut self,
        root: LogicNode<Condition>,
        body: impl FnOnce(&mut Self) -> Result<T, ScriptDescError>,
    ) -> Result<(T, Logic<Condition>), ScriptDescError> {
        self.context.push_condition(root);
        let result = body(self);
        let logic = self.context.pop_condition();
        let value = result?;
        let logic = logic.ok_or_else(|| {
            ScriptDescError::new(ErrorKind::InvalidLogicShape, "Condition level vanished.")
        })?;
        Ok((value, logic))
    }

    pub(crate) fn with_arguments(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<(), ScriptDescError>,
    ) -> Result<Vec<SymbolicValue>, ScriptDescError> {
        self.context.push_arguments();
        let result = body(self);
        let values = self.context.pop_arguments();
        result.map(|()| values)
    }

    pub(crate) fn with_buffer<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ScriptDescError>,
    ) -> Result<(T, Vec<RenderedLine>), ScriptDescError> {
        self.context.push_buffer();
        let result = body(self);
        let lines = self.context.pop_buffer();
        result.map(|value| (value, lines))
    }

    fn emit(&mut self, text: String) -> Result<(), ScriptDescError> {
        let condition = self.context.current_condition()?;
        self.emit_with(text, condition);
        Ok(())
    }

    fn emit_with(&mut self, text: String, condition: Option<String>) {
        trace!(target: "sd_compiler::condition", line = %text, condition = ?condition, "emit");
        self.context.emit(RenderedLine { text, condition });
    }

    pub(crate) fn translate(&mut self, node: &ScriptNode) -> Result<(), ScriptDescError> {
        match node {
            ScriptNode::Block { statements } => self.with_variable_scope(|compiler| {
                for statement in statements {
                    compiler.translate(statement)?;
                }
                Ok(())
            }),
            ScriptNode::If {
                condition,
                then_branch,
            } => self.translate_branch(condition, then_branch, None),
            ScriptNode::IfElse {
                condition,
                then_branch,
                else_branch,
            } => self.translate_branch(condition, then_branch, Some(else_branch)),
            ScriptNode::Empty => Ok(()),
            expression => {
                let value = self.evaluate(expression, EvalFlags::empty())?;
                if value.is_identifier() && !binds_only(expression) {
                    self.emit(value.text)?;
                }
                Ok(())
            }
        }
    }

    fn translate_branch(
        &mut self,
        condition: &ScriptNode,
        then_branch: &ScriptNode,
        else_branch: Option<&ScriptNode>,
    ) -> Result<(), ScriptDescError> {
        let outer = self.context.current_condition()?;
        let ((), logic) = self.with_condition(LogicNode::truth(), |compiler| {
            let value = compiler.evaluate_condition(condition, EvalFlags::CONDITION)?;
            compiler.context.condition_mut()?.reduce()?;
            compiler.emit_with(format!("[{}]", value.text), outer.clone());
            compiler.translate(then_branch)
        })?;

        let Some(else_branch) = else_branch else {
            return Ok(());
        };
        let negated = settled_root(logic)?.negate()?;
        self.with_condition(negated, |compiler| {
            compiler.emit_with("[else]".to_string(), outer);
            compiler.translate(else_branch)
        })?;
        Ok(())
    }

    pub(crate) fn evaluate(
        &mut self,
        node: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        match node {
            ScriptNode::Integer { value } => Ok(SymbolicValue::integer(*value)),
            ScriptNode::Str { value } => Ok(SymbolicValue::string(value.clone())),
            ScriptNode::Identifier { name, args: None } => self.resolve_identifier(name, flags),
            ScriptNode::Identifier {
                name,
                args: Some(args),
            } => self.call(name, args, flags),
            ScriptNode::Binary { op, left, right } => {
                self.evaluate_binary(*op, left, right, flags)
            }
            ScriptNode::Unary { op, operand } => self.evaluate_unary(*op, operand, flags),
            ScriptNode::Ternary {
                condition,
                then_branch,
                else_branch,
            } => self.evaluate_ternary(condition, then_branch, else_branch, flags),
            ScriptNode::Empty => Ok(SymbolicValue {
                kind: ValueKind::Integer,
                text: String::new(),
                range: Range::new(),
            }),
            ScriptNode::Block { .. } | ScriptNode::If { .. } | ScriptNode::IfElse { .. } => {
                Err(ScriptDescError::new(
                    ErrorKind::Parse,
                    "Statements cannot be used as values.",
                ))
            }
        }
    }

    /// Evaluates a branch condition. Plain values count as `value != 0`.
    fn evaluate_condition(
        &mut self,
        node: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let predicate = match node {
            ScriptNode::Binary { op, .. } => op.is_relational() || op.is_logical(),
            ScriptNode::Unary {
                op: UnaryOp::Not, ..
            } => true,
            _ => false,
        };
        if predicate {
            return self.evaluate(node, flags | EvalFlags::CONDITION);
        }

        let value = self.evaluate(node, flags.operand())?;
        if value.is_identifier() {
            let truthy = value.range.not_equal(&Range::single(0))?;
            let literal = Condition::relation(value.text.clone(), BinaryOp::NotEqual, "0")
                .with_range(truthy);
            self.push_condition_literal(literal, flags.contains(EvalFlags::NEGATED))?;
        }
        Ok(value)
    }

    /// Adds one comparison literal to the open condition level, through a
    /// `Not` frame when an odd number of `!` encloses it.
    fn push_condition_literal(
        &mut self,
        literal: Condition,
        negated: bool,
    ) -> Result<(), ScriptDescError> {
        let logic = self.context.condition_mut()?;
        if !negated {
            return logic.push_literal(literal);
        }
        logic.push_scope(ScopeKind::Not)?;
        logic.push_literal(literal)?;
        logic.pop_scope()
    }

    fn resolve_identifier(
        &mut self,
        name: &str,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let db = self.db;
        if let Some(template) = db.argument_template(TemplateNamespace::Statement, name) {
            let text = self.render_template(template, &[])?;
            let range = template.range.clone().unwrap_or_else(Range::full);
            return self.narrowed(SymbolicValue::identifier(text, range));
        }

        if let Some(constant) = db.constant_by_identifier(name) {
            if flags.contains(EvalFlags::IDENTIFIER) {
                let range = constant
                    .range
                    .clone()
                    .unwrap_or_else(|| Range::single(constant.value));
                return Ok(SymbolicValue::identifier(constant.display_name(), range));
            }
            return match &constant.range {
                Some(range) => self.narrowed(SymbolicValue::identifier(name, range.clone())),
                None => Ok(SymbolicValue {
                    kind: ValueKind::Integer,
                    text: name.to_string(),
                    range: Range::single(constant.value),
                }),
            };
        }

        if let Some(bound) = self.context.lookup(name).cloned() {
            return if bound.is_identifier() {
                self.narrowed(bound)
            } else {
                Ok(bound)
            };
        }

        if !has_sigil(name) {
            self.record_undefined(format!("statement.{}", name));
        }
        self.narrowed(SymbolicValue::free(name))
    }

    /// Restricts an identifier's range to what the enclosing branches allow.
    fn narrowed(&self, mut value: SymbolicValue) -> Result<SymbolicValue, ScriptDescError> {
        for node in self.context.settled_conditions() {
            value.range = narrow_by(node, &value.text, &value.range)?;
        }
        Ok(value)
    }

    fn call(
        &mut self,
        name: &str,
        args: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let nodes = flatten_arguments(args);
        if let Some(value) = self.call_builtin(name, &nodes, flags)? {
            return Ok(value);
        }

        let values = self.evaluate_arguments(&nodes)?;
        let db = self.db;
        if let Some(template) = db.argument_template(TemplateNamespace::Statement, name) {
            let text = self.render_template(template, &values)?;
            let range = template.range.clone().unwrap_or_else(Range::full);
            return Ok(SymbolicValue::identifier(text, range));
        }

        self.record_undefined(format!("statement.{}", name));
        Ok(SymbolicValue::free(name))
    }

    pub(crate) fn evaluate_arguments(
        &mut self,
        nodes: &[&ScriptNode],
    ) -> Result<Vec<SymbolicValue>, ScriptDescError> {
        self.with_arguments(|compiler| {
            for node in nodes {
                let value = compiler.evaluate(node, EvalFlags::empty())?;
                compiler.context.push_argument(value)?;
            }
            Ok(())
        })
    }

    fn evaluate_binary(
        &mut self,
        op: BinaryOp,
        left: &ScriptNode,
        right: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        if op.is_logical() {
            return self.evaluate_logical(op, left, right, flags);
        }
        if op.is_assignment() {
            return self.evaluate_assignment(op, left, right, flags);
        }

        let operand = flags.operand();
        let mut left_value = self.evaluate(left, operand)?;
        let right_value = if left_value.is_string() && op == BinaryOp::Add {
            self.evaluate(right, operand | EvalFlags::IDENTIFIER)?
        } else {
            self.evaluate(right, operand)?
        };

        if op == BinaryOp::Add && (left_value.is_string() || right_value.is_string()) {
            if !left_value.is_string() {
                left_value = self.evaluate(left, operand | EvalFlags::IDENTIFIER)?;
            }
            return Ok(SymbolicValue::string(format!(
                "{}{}",
                left_value.text, right_value.text
            )));
        }

        if op == BinaryOp::Comma {
            return Ok(SymbolicValue {
                kind: right_value.kind,
                text: format!("{}, {}", left_value.text, right_value.text),
                range: right_value.range,
            });
        }

        let text = format!(
            "{} {} {}",
            operand_text(left, &left_value, op, false),
            op.symbol(),
            operand_text(right, &right_value, op, true)
        );

        if op.is_relational() {
            if flags.contains(EvalFlags::CONDITION) {
                if let Some(literal) = comparison_literal(op, &left_value, &right_value)? {
                    self.push_condition_literal(literal, flags.contains(EvalFlags::NEGATED))?;
                }
            }
            return Ok(SymbolicValue {
                kind: combined_kind(&left_value, &right_value),
                text,
                range: Range::boolean(),
            });
        }

        let (a, b) = (&left_value.range, &right_value.range);
        let range = match op {
            BinaryOp::Add => a.plus(b)?,
            BinaryOp::Sub => a.minus(b)?,
            BinaryOp::Mul => a.multiply(b)?,
            BinaryOp::Div => a.divide(b)?,
            BinaryOp::Rem => a.remainder(b)?,
            BinaryOp::ShiftLeft => a.shift_left(b)?,
            BinaryOp::ShiftRight => a.shift_right(b)?,
            BinaryOp::BitAnd => a.bit_and(b)?,
            BinaryOp::BitOr => a.bit_or(b)?,
            BinaryOp::BitXor => a.bit_xor(b)?,
            other => {
                return Err(ScriptDescError::new(
                    ErrorKind::Parse,
                    format!("Operator '{}' is not arithmetic.", other.symbol()),
                ))
            }
        };
        Ok(SymbolicValue {
            kind: combined_kind(&left_value, &right_value),
            text,
            range,
        })
    }

    fn evaluate_logical(
        &mut self,
        op: BinaryOp,
        left: &ScriptNode,
        right: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let (left_value, right_value) = if flags.contains(EvalFlags::CONDITION) {
            // De Morgan: under `!` an `&&` collects alternatives and vice versa.
            let scope = match (op, flags.contains(EvalFlags::NEGATED)) {
                (BinaryOp::And, false) | (BinaryOp::Or, true) => ScopeKind::And,
                _ => ScopeKind::Or,
            };
            self.context.condition_mut()?.push_scope(scope)?;
            let left_value = self.evaluate_condition(left, flags)?;
            let right_value = self.evaluate_condition(right, flags)?;
            self.context.condition_mut()?.pop_scope()?;
            (left_value, right_value)
        } else {
            (self.evaluate(left, flags)?, self.evaluate(right, flags)?)
        };

        Ok(SymbolicValue {
            kind: combined_kind(&left_value, &right_value),
            text: format!(
                "{} {} {}",
                operand_text(left, &left_value, op, false),
                op.symbol(),
                operand_text(right, &right_value, op, true)
            ),
            range: Range::boolean(),
        })
    }

    fn evaluate_assignment(
        &mut self,
        op: BinaryOp,
        left: &ScriptNode,
        right: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let ScriptNode::Identifier { name, args: None } = left else {
            return Err(ScriptDescError::new(
                ErrorKind::Parse,
                "Only variables can be assigned to.",
            ));
        };
        let value = self.evaluate(right, flags.operand())?;
        let bound = if op == BinaryOp::Assign {
            value
        } else {
            let current = self.resolve_identifier(name, flags.operand())?;
            let range = if op == BinaryOp::AddAssign {
                current.range.plus(&value.range)?
            } else {
                current.range.minus(&value.range)?
            };
            let kind = combined_kind(&current, &value);
            let text = match (kind, range.singleton()) {
                (ValueKind::Integer, Some(result)) => result.to_string(),
                _ => format!(
                    "{} {} {}",
                    current.text,
                    if op == BinaryOp::AddAssign { "+" } else { "-" },
                    value.text
                ),
            };
            SymbolicValue { kind, text, range }
        };
        self.context.bind(name, bound.clone());
        Ok(bound)
    }

    fn evaluate_unary(
        &mut self,
        op: UnaryOp,
        operand: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        if op == UnaryOp::Not {
            let value = if flags.contains(EvalFlags::CONDITION) {
                self.evaluate_condition(operand, flags ^ EvalFlags::NEGATED)?
            } else {
                self.evaluate(operand, flags)?
            };
            return Ok(SymbolicValue {
                kind: numeric_kind(&value),
                text: format!("!{}", wrapped_text(operand, &value)),
                range: Range::boolean(),
            });
        }

        let value = self.evaluate(operand, flags.operand())?;
        let kind = numeric_kind(&value);
        let (text, range) = match op {
            UnaryOp::Plus => (format!("+{}", wrapped_text(operand, &value)), value.range.clone()),
            UnaryOp::Minus => (format!("-{}", wrapped_text(operand, &value)), value.range.negate()?),
            UnaryOp::BitNot => (format!("~{}", wrapped_text(operand, &value)), value.range.bit_not()?),
            UnaryOp::PreIncrement => (format!("++{}", value.text), value.range.increment()?),
            UnaryOp::PostIncrement => (format!("{}++", value.text), value.range.increment()?),
            UnaryOp::PreDecrement => (format!("--{}", value.text), value.range.decrement()?),
            UnaryOp::PostDecrement => (format!("{}--", value.text), value.range.decrement()?),
            UnaryOp::Not => (format!("!{}", wrapped_text(operand, &value)), Range::boolean()),
        };

        if matches!(
            op,
            UnaryOp::PreIncrement
                | UnaryOp::PostIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostDecrement
        ) {
            if let ScriptNode::Identifier { name, args: None } = operand {
                let bound_text = match (kind, range.singleton()) {
                    (ValueKind::Integer, Some(result)) => result.to_string(),
                    _ => value.text.clone(),
                };
                self.context.bind(
                    name,
                    SymbolicValue {
                        kind,
                        text: bound_text,
                        range: range.clone(),
                    },
                );
            }
        }

        Ok(SymbolicValue { kind, text, range })
    }

    fn evaluate_ternary(
        &mut self,
        condition: &ScriptNode,
        then_branch: &ScriptNode,
        else_branch: &ScriptNode,
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let operand = flags.operand();
        let ((condition_value, then_value), logic) =
            self.with_condition(LogicNode::truth(), |compiler| {
                let condition_value =
                    compiler.evaluate_condition(condition, EvalFlags::CONDITION)?;
                compiler.context.condition_mut()?.reduce()?;
                let then_value = compiler.evaluate(then_branch, operand)?;
                Ok((condition_value, then_value))
            })?;
        let negated = settled_root(logic)?.negate()?;
        let (else_value, _) =
            self.with_condition(negated, |compiler| compiler.evaluate(else_branch, operand))?;

        let kind = if then_value.is_string() && else_value.is_string() {
            ValueKind::StringLiteral
        } else if condition_value.is_identifier()
            || then_value.is_identifier()
            || else_value.is_identifier()
        {
            ValueKind::Identifier
        } else {
            ValueKind::Integer
        };
        Ok(SymbolicValue {
            kind,
            text: format!(
                "{} ? {} : {}",
                wrapped_text(condition, &condition_value),
                wrapped_text(then_branch, &then_value),
                wrapped_text(else_branch, &else_value)
            ),
            range: then_value.range.union(&else_value.range)?,
        })
    }
}

fn settled_root(mut logic: Logic<Condition>) -> Result<LogicNode<Condition>, ScriptDescError> {
    logic.reduce()?;
    logic.into_root().ok_or_else(|| {
        ScriptDescError::new(ErrorKind::InvalidLogicShape, "Condition did not reduce.")
    })
}

/// Statements evaluated only for their bindings; they print nothing.
fn binds_only(node: &ScriptNode) -> bool {
    match node {
        ScriptNode::Binary { op, .. } => op.is_assignment(),
        ScriptNode::Unary { op, .. } => matches!(
            op,
            UnaryOp::PreIncrement
                | UnaryOp::PostIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostDecrement
        ),
        ScriptNode::Identifier {
            name,
            args: Some(_),
        } => name == "set",
        _ => false,
    }
}

pub(crate) fn has_sigil(name: &str) -> bool {
    name.starts_with(['.', '@', '$', '\'', '#']) || name.ends_with('$')
}

/// Positional arguments of a call, flattening left-nested comma chains.
pub(crate) fn flatten_arguments(node: &ScriptNode) -> Vec<&ScriptNode> {
    let mut nodes = Vec::new();
    collect_arguments(node, &mut nodes);
    nodes
}

fn collect_arguments<'a>(node: &'a ScriptNode, nodes: &mut Vec<&'a ScriptNode>) {
    match node {
        ScriptNode::Binary {
            op: BinaryOp::Comma,
            left,
            right,
        } => {
            collect_arguments(left, nodes);
            collect_arguments(right, nodes);
        }
        ScriptNode::Empty => {}
        other => nodes.push(other),
    }
}

fn combined_kind(left: &SymbolicValue, right: &SymbolicValue) -> ValueKind {
    if left.is_identifier() || right.is_identifier() {
        ValueKind::Identifier
    } else {
        ValueKind::Integer
    }
}

fn numeric_kind(value: &SymbolicValue) -> ValueKind {
    match value.kind {
        ValueKind::Identifier => ValueKind::Identifier,
        _ => ValueKind::Integer,
    }
}

/// Operand text, parenthesised when the operand binds looser than `parent`.
fn operand_text(node: &ScriptNode, value: &SymbolicValue, parent: BinaryOp, right: bool) -> String {
    let needs_parens = match node {
        ScriptNode::Binary { op, .. } => {
            op.precedence() < parent.precedence()
                || (right && op.precedence() == parent.precedence() && !parent.is_assignment())
        }
        ScriptNode::Ternary { .. } => true,
        _ => false,
    };
    if needs_parens {
        format!("({})", value.text)
    } else {
        display_text(value)
    }
}

/// Value text as it appears inside a larger expression; strings get their
/// quotes back.
fn display_text(value: &SymbolicValue) -> String {
    if value.is_string() {
        format!(
            "\"{}\"",
            value.text.replace('\\', "\\\\").replace('"', "\\\"")
        )
    } else {
        value.text.clone()
    }
}

fn wrapped_text(node: &ScriptNode, value: &SymbolicValue) -> String {
    match node {
        ScriptNode::Binary { .. } | ScriptNode::Ternary { .. } => format!("({})", value.text),
        _ => value.text.clone(),
    }
}

fn mirrored(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Less => BinaryOp::Greater,
        BinaryOp::LessEqual => BinaryOp::GreaterEqual,
        BinaryOp::Greater => BinaryOp::Less,
        BinaryOp::GreaterEqual => BinaryOp::LessEqual,
        other => other,
    }
}

/// The literal recorded for `left op right`, keyed on the identifier side.
/// Only a comparison against a concrete number narrows; any other keeps
/// just the relation text.
fn comparison_literal(
    op: BinaryOp,
    left: &SymbolicValue,
    right: &SymbolicValue,
) -> Result<Option<Condition>, ScriptDescError> {
    let (subject, op, other) = if left.is_identifier() {
        (left, op, right)
    } else if right.is_identifier() {
        (right, mirrored(op), left)
    } else {
        return Ok(None);
    };
    let literal = Condition::relation(subject.text.clone(), op, display_text(other));
    if other.is_string() || other.constant().is_none() {
        return Ok(Some(literal));
    }
    let range = narrow_relation(op, &subject.range, &other.range)?;
    Ok(Some(literal.with_range(range)))
}

/// Values of `subject` for which `subject op other` holds, `other` being a
/// single value.
fn narrow_relation(op: BinaryOp, subject: &Range, other: &Range) -> Result<Range, ScriptDescError> {
    match op {
        BinaryOp::Equal => subject.equal(other),
        BinaryOp::NotEqual => subject.not_equal(other),
        BinaryOp::Less => subject.lesser(other),
        BinaryOp::LessEqual => subject.lesser_equal(other),
        BinaryOp::Greater => subject.greater(other),
        BinaryOp::GreaterEqual => subject.greater_equal(other),
        _ => Ok(subject.clone()),
    }
}

/// Intersects `base` with what `condition` says about `name`: positive
/// literals intersect, negated ones subtract, disjuncts union.
pub(crate) fn narrow_by(
    condition: &LogicNode<Condition>,
    name: &str,
    base: &Range,
) -> Result<Range, ScriptDescError> {
    let mut result = Range::new();
    for conjunction in condition.conjunctions() {
        let mut range = base.clone();
        let mut constrained = false;
        for (negated, literal) in conjunction {
            let Some(holds) = literal.range.as_ref().filter(|_| literal.name == name) else {
                continue;
            };
            constrained = true;
            range = if negated {
                range.subtract(holds)?
            } else {
                range.intersect(holds)?
            };
        }
        if !constrained {
            return Ok(base.clone());
        }
        result = result.union(&range)?;
    }
    // contradictory branch: nothing can hold, keep what we knew
    if result.is_empty() {
        return Ok(base.clone());
    }
    Ok(result)
}
