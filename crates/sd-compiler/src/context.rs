use crate::*;

/// One line of compiled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    /// Canonical rendering of every enclosing branch condition.
    pub condition: Option<String>,
}

/// The four scope stacks of one compilation. Each push is matched by a pop
/// on every exit path, see the `with_*` helpers on `ScriptCompiler`.
#[derive(Debug, Default)]
pub(crate) struct EvalContext {
    variables: Vec<BTreeMap<String, SymbolicValue>>,
    conditions: Vec<Logic<Condition>>,
    arguments: Vec<Vec<SymbolicValue>>,
    buffers: Vec<Vec<RenderedLine>>,
}

impl EvalContext {
    pub(crate) fn clear(&mut self) {
        self.variables.clear();
        self.conditions.clear();
        self.arguments.clear();
        self.buffers.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.variables.is_empty()
            && self.conditions.is_empty()
            && self.arguments.is_empty()
            && self.buffers.is_empty()
    }

    pub(crate) fn push_variables(&mut self) {
        self.variables.push(BTreeMap::new());
    }

    pub(crate) fn pop_variables(&mut self) {
        self.variables.pop();
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&SymbolicValue> {
        self.variables
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
    }

    pub(crate) fn bind(&mut self, name: &str, value: SymbolicValue) {
        if self.variables.is_empty() {
            self.variables.push(BTreeMap::new());
        }
        if let Some(frame) = self.variables.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    pub(crate) fn push_condition(&mut self, root: LogicNode<Condition>) {
        self.conditions.push(Logic::with_root(root));
    }

    pub(crate) fn pop_condition(&mut self) -> Option<Logic<Condition>> {
        self.conditions.pop()
    }

    pub(crate) fn condition_mut(&mut self) -> Result<&mut Logic<Condition>, ScriptDescError> {
        self.conditions.last_mut().ok_or_else(|| {
            ScriptDescError::new(
                ErrorKind::InvalidLogicShape,
                "No condition level is open.",
            )
        })
    }

    /// Conditions that are fully built, outermost first.
    pub(crate) fn settled_conditions(&self) -> impl Iterator<Item = &LogicNode<Condition>> {
        self.conditions
            .iter()
            .filter(|logic| logic.frames().len() == 1)
            .filter_map(Logic::root)
    }

    pub(crate) fn push_arguments(&mut self) {
        self.arguments.push(Vec::new());
    }

    pub(crate) fn pop_arguments(&mut self) -> Vec<SymbolicValue> {
        self.arguments.pop().unwrap_or_default()
    }

    pub(crate) fn push_argument(&mut self, value: SymbolicValue) -> Result<(), ScriptDescError> {
        let frame = self.arguments.last_mut().ok_or_else(|| {
            ScriptDescError::new(ErrorKind::InvalidLogicShape, "No argument list is open.")
        })?;
        frame
            .try_reserve(1)
            .map_err(|_| ScriptDescError::out_of_memory("argument list"))?;
        frame.push(value);
        Ok(())
    }

    pub(crate) fn push_buffer(&mut self) {
        self.buffers.push(Vec::new());
    }

    pub(crate) fn pop_buffer(&mut self) -> Vec<RenderedLine> {
        self.buffers.pop().unwrap_or_default()
    }

    pub(crate) fn emit(&mut self, line: RenderedLine) {
        if self.buffers.is_empty() {
            self.buffers.push(Vec::new());
        }
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push(line);
        }
    }

    /// Conjunction of every open condition level, `None` when unconditional.
    pub(crate) fn current_condition(&self) -> Result<Option<String>, ScriptDescError> {
        let mut combined = Logic::with_root(LogicNode::truth());
        for node in self.settled_conditions() {
            combined.conjoin(node.clone())?;
        }
        Ok(combined
            .into_root()
            .filter(|root| !root.is_truth())
            .map(|root| root.render()))
    }
}

#[cfg(test)]
mod context_tests {
    use super::*;

    #[test]
    fn variable_frames_shadow_and_restore() {
        let mut context = EvalContext::default();
        context.push_variables();
        context.bind(".@a", SymbolicValue::integer(1));
        context.push_variables();
        context.bind(".@a", SymbolicValue::integer(2));
        assert_eq!(context.lookup(".@a").map(|v| v.text.as_str()), Some("2"));
        context.pop_variables();
        assert_eq!(context.lookup(".@a").map(|v| v.text.as_str()), Some("1"));
        context.pop_variables();
        assert!(context.lookup(".@a").is_none());
        assert!(context.is_idle());
    }

    #[test]
    fn current_condition_joins_settled_levels() {
        let mut context = EvalContext::default();
        assert_eq!(context.current_condition().expect("condition"), None);

        context.push_condition(LogicNode::literal(Condition::new("Class", Range::single(1))));
        context.push_condition(LogicNode::truth());
        context
            .condition_mut()
            .expect("open level")
            .push_scope(ScopeKind::Or)
            .expect("scope");
        assert_eq!(
            context.current_condition().expect("condition"),
            Some("Class == 1".to_string())
        );
    }

    #[test]
    fn argument_frames_collect_in_order() {
        let mut context = EvalContext::default();
        assert!(context.push_argument(SymbolicValue::integer(1)).is_err());
        context.push_arguments();
        context.push_argument(SymbolicValue::integer(1)).expect("push");
        context.push_argument(SymbolicValue::integer(2)).expect("push");
        let values = context.pop_arguments();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].text, "2");
        context.clear();
        assert!(context.is_idle());
    }
}
