use crate::*;

use crate::evaluator::EvalFlags;

impl ScriptCompiler<'_> {
    /// Evaluates a built-in script function, `Ok(None)` when `name` is not one.
    pub(crate) fn call_builtin(
        &mut self,
        name: &str,
        nodes: &[&ScriptNode],
        flags: EvalFlags,
    ) -> Result<Option<SymbolicValue>, ScriptDescError> {
        let value = match name {
            "set" => self.builtin_set(nodes, flags)?,
            "min" | "max" => self.builtin_extremum(name, nodes)?,
            "pow" => self.builtin_pow(nodes)?,
            "rand" => self.builtin_rand(nodes)?,
            "getskilllv" => self.builtin_skill_level(nodes)?,
            "gettime" => self.builtin_time(nodes)?,
            "readparam" => self.builtin_read_param(nodes)?,
            "vip_status" => self.builtin_vip_status(nodes)?,
            "checkoption" => {
                let values = self.evaluate_arguments(nodes)?;
                SymbolicValue::identifier(call_text(name, &values), Range::boolean())
            }
            "autobonus" | "autobonus2" | "autobonus3" => {
                check_autobonus(name, nodes)?;
                // rendered through the statement template of the same name
                return Ok(None);
            }
            other => match TemplateNamespace::for_function(other) {
                Some(namespace) => self.builtin_bonus(namespace, nodes)?,
                None => return Ok(None),
            },
        };
        Ok(Some(value))
    }

    fn builtin_set(
        &mut self,
        nodes: &[&ScriptNode],
        flags: EvalFlags,
    ) -> Result<SymbolicValue, ScriptDescError> {
        let [ScriptNode::Identifier { name, args: None }, source, ..] = nodes else {
            return Err(arity_error("set", "a variable and a value"));
        };
        let value = self.evaluate(source, flags.operand())?;
        self.context.bind(name, value.clone());
        Ok(value)
    }

    fn builtin_extremum(
        &mut self,
        name: &str,
        nodes: &[&ScriptNode],
    ) -> Result<SymbolicValue, ScriptDescError> {
        let values = self.evaluate_arguments(nodes)?;
        let Some((first, rest)) = values.split_first() else {
            return Err(arity_error(name, "at least one value"));
        };
        let mut range = first.range.clone();
        for value in rest {
            range = if name == "min" {
                range.min_of(&value.range)?
            } else {
                range.max_of(&value.range)?
            };
        }
        Ok(SymbolicValue {
            kind: kind_of(&values),
            text: call_text(name, &values),
            range,
        })
    }

    fn builtin_pow(&mut self, nodes: &[&ScriptNode]) -> Result<SymbolicValue, ScriptDescError> {
        let values = self.evaluate_arguments(nodes)?;
        let [base, exponent] = values.as_slice() else {
            return Err(arity_error("pow", "a base and an exponent"));
        };
        Ok(SymbolicValue {
            kind: kind_of(&values),
            text: call_text("pow", &values),
            range: base.range.pow(&exponent.range)?,
        })
    }

    fn builtin_rand(&mut self, nodes: &[&ScriptNode]) -> Result<SymbolicValue, ScriptDescError> {
        let values = self.evaluate_arguments(nodes)?;
        let range = match values.as_slice() {
            [upper] => match upper.range.max() {
                Some(max) if max > 0 => Range::interval(0, max - 1)?,
                _ => Range::single(0),
            },
            [low, high] => {
                let bounds = low.range.union(&high.range)?;
                match (bounds.min(), bounds.max()) {
                    (Some(min), Some(max)) => Range::interval(min, max)?,
                    _ => Range::full(),
                }
            }
            _ => return Err(arity_error("rand", "one or two bounds")),
        };
        Ok(SymbolicValue::identifier(call_text("rand", &values), range))
    }

    fn builtin_skill_level(
        &mut self,
        nodes: &[&ScriptNode],
    ) -> Result<SymbolicValue, ScriptDescError> {
        let Some(argument) = nodes.first() else {
            return Err(arity_error("getskilllv", "a skill"));
        };
        let db = self.db;
        let skill = match argument {
            ScriptNode::Identifier { name, args: None } => db.skill_by_name(name),
            ScriptNode::Str { value } => db.skill_by_name(value),
            other => {
                let value = self.evaluate(other, EvalFlags::empty())?;
                value.constant().and_then(|id| db.skill_by_id(id))
            }
        };
        let Some(skill) = skill else {
            return Err(ScriptDescError::new(
                ErrorKind::UnresolvedRequiredReference,
                format!("getskilllv refers to an unknown skill: {:?}.", argument),
            ));
        };
        Ok(SymbolicValue::identifier(
            format!("getskilllv({})", skill.name),
            Range::interval(0, skill.max_level.max(0))?,
        ))
    }

    fn builtin_time(&mut self, nodes: &[&ScriptNode]) -> Result<SymbolicValue, ScriptDescError> {
        let values = self.evaluate_arguments(nodes)?;
        let Some(kind) = values.first() else {
            return Err(arity_error("gettime", "a time type"));
        };
        let (min, max) = match kind.constant() {
            Some(1) | Some(2) => (0, 59),
            Some(3) => (0, 23),
            Some(4) => (0, 6),
            Some(5) => (1, 31),
            Some(6) => (1, 12),
            Some(7) => (0, i64::MAX),
            Some(8) => (1, 366),
            _ => (i64::MIN, i64::MAX),
        };
        Ok(SymbolicValue::identifier(
            call_text("gettime", &values),
            Range::interval(min, max)?,
        ))
    }

    fn builtin_read_param(
        &mut self,
        nodes: &[&ScriptNode],
    ) -> Result<SymbolicValue, ScriptDescError> {
        let Some(argument) = nodes.first() else {
            return Err(arity_error("readparam", "a parameter"));
        };
        let name = match argument {
            ScriptNode::Identifier { name, args: None } => name.clone(),
            other => self.evaluate(other, EvalFlags::empty())?.text,
        };
        let db = self.db;
        let range = match db.constant_by_identifier(&name).and_then(|c| c.range.clone()) {
            Some(range) => range,
            None => Range::interval(0, i64::MAX)?,
        };
        Ok(SymbolicValue::identifier(format!("readparam({})", name), range))
    }

    fn builtin_vip_status(
        &mut self,
        nodes: &[&ScriptNode],
    ) -> Result<SymbolicValue, ScriptDescError> {
        let values = self.evaluate_arguments(nodes)?;
        let range = match values.first().and_then(SymbolicValue::constant) {
            Some(1) => Range::boolean(),
            _ => Range::interval(0, i64::MAX)?,
        };
        Ok(SymbolicValue::identifier(call_text("vip_status", &values), range))
    }

    /// `bonus`..`bonus5` and `sc_start*`: the first argument names the
    /// template, the rest are its positional arguments.
    fn builtin_bonus(
        &mut self,
        namespace: TemplateNamespace,
        nodes: &[&ScriptNode],
    ) -> Result<SymbolicValue, ScriptDescError> {
        let Some((keyword_node, rest)) = nodes.split_first() else {
            return Err(arity_error(&namespace.key(), "a bonus type"));
        };
        let keyword = match keyword_node {
            ScriptNode::Identifier { name, args: None } => name.clone(),
            ScriptNode::Str { value } => value.clone(),
            other => self.evaluate(other, EvalFlags::empty())?.text,
        };
        let values = self.evaluate_arguments(rest)?;

        let db = self.db;
        match db.argument_template(namespace, &keyword) {
            Some(template) => {
                let text = self.render_template(template, &values)?;
                Ok(SymbolicValue::identifier(text, Range::full()))
            }
            None => {
                self.record_undefined(format!("{}.{}", namespace.key(), keyword));
                Ok(SymbolicValue::free(keyword))
            }
        }
    }
}

fn check_autobonus(name: &str, nodes: &[&ScriptNode]) -> Result<(), ScriptDescError> {
    if nodes.len() < 3 || !matches!(nodes[0], ScriptNode::Str { .. }) {
        return Err(arity_error(name, "a bonus script, a rate and a duration"));
    }
    Ok(())
}

fn arity_error(name: &str, expected: &str) -> ScriptDescError {
    ScriptDescError::new(
        ErrorKind::Parse,
        format!("{} expects {}.", name, expected),
    )
}

fn call_text(name: &str, values: &[SymbolicValue]) -> String {
    let args = values
        .iter()
        .map(|value| value.text.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", name, args)
}

fn kind_of(values: &[SymbolicValue]) -> ValueKind {
    if values.iter().any(SymbolicValue::is_identifier) {
        ValueKind::Identifier
    } else {
        ValueKind::Integer
    }
}
