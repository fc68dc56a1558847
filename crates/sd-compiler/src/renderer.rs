use crate::*;

/// More members than this and enumerating handlers fall back to the value text.
const ENUMERATION_LIMIT: usize = 16;

/// Fraction digits kept by `divide=N` before the expansion is cut.
const FRACTION_DIGITS: usize = 6;

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{([^{}|]*)\|([^{}]+)\}").expect("placeholder regex must compile")
    })
}

impl ScriptCompiler<'_> {
    /// Renders `template` against positional `args`. Nested renders through
    /// placeholders or `script` arguments count against the depth limit.
    pub(crate) fn render_template(
        &mut self,
        template: &ArgumentTemplate,
        args: &[SymbolicValue],
    ) -> Result<String, ScriptDescError> {
        if self.template_depth >= self.options.max_template_depth {
            return Err(ScriptDescError::new(
                ErrorKind::MalformedTemplate,
                format!(
                    "Template '{}' nests deeper than {} levels.",
                    template.identifier, self.options.max_template_depth
                ),
            ));
        }
        self.template_depth += 1;
        let result = self.render_handler(template, args);
        self.template_depth -= 1;
        result
    }

    fn render_handler(
        &mut self,
        template: &ArgumentTemplate,
        args: &[SymbolicValue],
    ) -> Result<String, ScriptDescError> {
        let handler = template.handler.as_deref().unwrap_or("print");
        match handler {
            "print" => self.render_print(template, args),
            "prefix" => {
                let value = effective_value(template, first_argument(template, args)?)?;
                let mut format = template.integer_format()?;
                format.sign = true;
                let number = format_integer(&value, &format)?;
                if template.print.is_none() {
                    return Ok(number);
                }
                let text = self.render_print(template, args)?;
                Ok(if text.is_empty() {
                    number
                } else {
                    format!("{} {}", number, text)
                })
            }
            "zero" => {
                let value = first_argument(template, args)?;
                if value.constant() == Some(0) {
                    Ok(String::new())
                } else {
                    self.render_print(template, args)
                }
            }
            "array" => {
                let value = effective_value(template, first_argument(template, args)?)?;
                Ok(render_array(template, &value))
            }
            "integer" => {
                let value = effective_value(template, first_argument(template, args)?)?;
                format_integer(&value, &template.integer_format()?)
            }
            "string" => Ok(first_argument(template, args)?.text),
            "second" | "millisecond" => {
                let value = effective_value(template, first_argument(template, args)?)?;
                self.render_duration(handler, &value)
            }
            "constant" => {
                let value = first_argument(template, args)?;
                Ok(self.constant_label(&value.text))
            }
            "item" | "skill" | "mob" | "mercenary" => {
                let value = first_argument(template, args)?;
                self.render_record(handler, &value)
            }
            "splash" => {
                let value = effective_value(template, first_argument(template, args)?)?;
                Ok(render_splash(&value))
            }
            "script" => {
                let value = first_argument(template, args)?;
                self.render_nested_script(&value.text)
            }
            other if self.config.group_for(other).is_some() => {
                let value = effective_value(template, first_argument(template, args)?)?;
                Ok(self.render_group(other, &value))
            }
            other if self.config.flags.contains_key(other) => {
                let value = first_argument(template, args)?;
                Ok(self.render_flags(other, &value))
            }
            other => Err(ScriptDescError::new(
                ErrorKind::MalformedTemplate,
                format!(
                    "Template '{}' uses unknown handler '{}'.",
                    template.identifier, other
                ),
            )),
        }
    }

    /// Expands the `print` text. Without one, the template identifier
    /// stands alone or the arguments are listed.
    fn render_print(
        &mut self,
        template: &ArgumentTemplate,
        args: &[SymbolicValue],
    ) -> Result<String, ScriptDescError> {
        let Some(print) = template.print.as_deref() else {
            if args.is_empty() {
                return Ok(template.identifier.clone());
            }
            return Ok(joined_texts(args));
        };

        let mut output = String::new();
        let mut last = 0;
        for captures in placeholder_regex().captures_iter(print) {
            let (Some(whole), Some(selector), Some(target)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            output.push_str(&print[last..whole.start()]);
            let selected = select_arguments(template, selector.as_str(), args)?;
            output.push_str(&self.render_reference(target.as_str().trim(), &selected)?);
            last = whole.end();
        }
        output.push_str(&print[last..]);
        Ok(output)
    }

    fn render_reference(
        &mut self,
        target: &str,
        args: &[SymbolicValue],
    ) -> Result<String, ScriptDescError> {
        let db = self.db;
        match db.argument_template(TemplateNamespace::Argument, target) {
            Some(template) => self.render_template(template, args),
            None => {
                self.record_undefined(format!("argument.{}", target));
                Ok(joined_texts(args))
            }
        }
    }

    fn render_duration(
        &self,
        handler: &str,
        value: &SymbolicValue,
    ) -> Result<String, ScriptDescError> {
        let units = &self.config.time_units;
        let mut scale: Vec<(i64, &str)> = vec![
            (86_400, units.day.as_str()),
            (3_600, units.hour.as_str()),
            (60, units.minute.as_str()),
            (1, units.second.as_str()),
        ];
        if handler == "millisecond" {
            for (factor, _) in scale.iter_mut() {
                *factor *= 1_000;
            }
            scale.push((1, units.millisecond.as_str()));
        }
        let base = (1, scale.last().map_or("", |(_, label)| *label));

        let (Some(min), true) = (value.range.min(), value.range.is_bounded()) else {
            return Ok(format!("{} {}", value.text, base.1));
        };
        let (factor, label) = scale
            .iter()
            .copied()
            .find(|(factor, _)| *factor <= min)
            .unwrap_or(base);

        let mut scaled = Range::new();
        for interval in value.range.intervals() {
            scaled.add(interval.min / factor, interval.max / factor)?;
        }
        Ok(format!("{} {}", scaled, label))
    }

    fn constant_label(&self, identifier: &str) -> String {
        match self.db.constant_by_identifier(identifier) {
            Some(constant) => constant.display_name().to_string(),
            None => identifier.to_string(),
        }
    }

    /// Item, skill, mob and mercenary names. Concrete ids must exist;
    /// strings are looked up by name and kept verbatim when unknown.
    fn render_record(
        &self,
        handler: &str,
        value: &SymbolicValue,
    ) -> Result<String, ScriptDescError> {
        let db = self.db;
        if value.is_string() || value.constant().is_none() {
            let name = match handler {
                "item" => db.item_by_name(&value.text).map(|item| item.name.clone()),
                "skill" => db.skill_by_name(&value.text).map(|skill| skill.name.clone()),
                "mob" => db.mob_by_sprite(&value.text).map(|mob| mob.name.clone()),
                _ => None,
            };
            return Ok(name.unwrap_or_else(|| value.text.clone()));
        }

        let Some(id) = value.constant() else {
            return Ok(value.text.clone());
        };
        let name = match handler {
            "item" => db.item_by_id(id).map(|item| item.name.clone()),
            "skill" => db.skill_by_id(id).map(|skill| skill.name.clone()),
            "mob" => db.mob_by_id(id).map(|mob| mob.name.clone()),
            _ => db.mercenary_by_id(id).map(|mercenary| mercenary.name.clone()),
        };
        name.ok_or_else(|| {
            ScriptDescError::new(
                ErrorKind::UnresolvedRequiredReference,
                format!("No {} with id {}.", handler, id),
            )
        })
    }

    /// Labels from the constant group bound to `handler`, matched by
    /// identifier first and then by value.
    fn render_group(&self, handler: &str, value: &SymbolicValue) -> String {
        let db = self.db;
        let Some(group) = self
            .config
            .group_for(handler)
            .and_then(|name| db.constant_group_by_identifier(name))
        else {
            return value.text.clone();
        };
        if let Some(constant) = group.get(&value.text) {
            return constant.display_name().to_string();
        }
        let Some(members) = value.range.values(ENUMERATION_LIMIT) else {
            return value.text.clone();
        };
        let labels: Vec<&str> = members
            .iter()
            .filter_map(|member| {
                group
                    .values()
                    .find(|constant| constant.value == *member)
                    .map(ConstantRecord::display_name)
            })
            .collect();
        if labels.is_empty() {
            value.text.clone()
        } else {
            labels.join(", ")
        }
    }

    fn render_flags(&self, handler: &str, value: &SymbolicValue) -> String {
        let Some(mask) = value.constant() else {
            return value.text.clone();
        };
        let labels: Vec<&str> = self
            .config
            .flag_labels(handler)
            .iter()
            .filter(|flag| mask & flag.mask != 0)
            .map(|flag| flag.label.as_str())
            .collect();
        if labels.is_empty() {
            value.text.clone()
        } else {
            labels.join(", ")
        }
    }

    /// Compiles `source` in a fresh variable scope and buffer, one output
    /// line per emitted line, joined with `; `.
    fn render_nested_script(&mut self, source: &str) -> Result<String, ScriptDescError> {
        let script = parse_script(source)?;
        let ((), lines) = self.with_variable_scope(|compiler| {
            compiler.with_buffer(|compiler| compiler.translate(&script))
        })?;
        Ok(lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("; "))
    }
}

fn first_argument(
    template: &ArgumentTemplate,
    args: &[SymbolicValue],
) -> Result<SymbolicValue, ScriptDescError> {
    if let Some(value) = args.first() {
        return Ok(value.clone());
    }
    template
        .default_for(0)
        .map(SymbolicValue::integer)
        .ok_or_else(|| {
            ScriptDescError::new(
                ErrorKind::MalformedTemplate,
                format!("Template '{}' needs an argument.", template.identifier),
            )
        })
}

/// `*` selects every argument, otherwise a comma list of positions with
/// template defaults filling the gaps.
fn select_arguments(
    template: &ArgumentTemplate,
    selector: &str,
    args: &[SymbolicValue],
) -> Result<Vec<SymbolicValue>, ScriptDescError> {
    let selector = selector.trim();
    if selector == "*" {
        return Ok(args.to_vec());
    }
    let mut selected = Vec::new();
    for position in selector.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let index: usize = position.parse().map_err(|_| {
            ScriptDescError::new(
                ErrorKind::MalformedTemplate,
                format!(
                    "Template '{}' has a bad placeholder index '{}'.",
                    template.identifier, position
                ),
            )
        })?;
        let value = match args.get(index) {
            Some(value) => value.clone(),
            None => template
                .default_for(index)
                .map(SymbolicValue::integer)
                .ok_or_else(|| {
                    ScriptDescError::new(
                        ErrorKind::MalformedTemplate,
                        format!(
                            "Template '{}' references missing argument {}.",
                            template.identifier, index
                        ),
                    )
                })?,
        };
        selected.push(value);
    }
    Ok(selected)
}

/// An unbounded value takes the template's declared range instead.
fn effective_value(
    template: &ArgumentTemplate,
    mut value: SymbolicValue,
) -> Result<SymbolicValue, ScriptDescError> {
    if value.is_string() || value.range.is_bounded() {
        return Ok(value);
    }
    if let Some(declared) = &template.range {
        let narrowed = declared.intersect(&value.range)?;
        value.range = if narrowed.is_empty() {
            declared.clone()
        } else {
            narrowed
        };
    }
    Ok(value)
}

fn render_array(template: &ArgumentTemplate, value: &SymbolicValue) -> String {
    let (Some(index), Some(members)) = (&template.index, value.range.values(ENUMERATION_LIMIT))
    else {
        return value.text.clone();
    };
    if members.is_empty() {
        return value.text.clone();
    }
    members
        .iter()
        .map(|member| {
            index
                .get(member)
                .cloned()
                .unwrap_or_else(|| member.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_splash(value: &SymbolicValue) -> String {
    let area = |n: i64| {
        let side = n.saturating_mul(2).saturating_add(1);
        format!("{}x{}", side, side)
    };
    match (value.range.is_bounded(), value.range.min(), value.range.max()) {
        (true, Some(min), Some(max)) if min == max => area(min),
        (true, Some(min), Some(max)) => format!("{} ~ {}", area(min), area(max)),
        _ => value.text.clone(),
    }
}

/// Numeric rendering of a value under the template's integer flags.
pub(crate) fn format_integer(
    value: &SymbolicValue,
    format: &IntegerFormat,
) -> Result<String, ScriptDescError> {
    if value.is_string() || format.string || !value.range.is_bounded() || value.range.is_empty()
    {
        return Ok(value.text.clone());
    }

    let mut range = value.range.clone();
    if format.inverse {
        range = range.negate()?;
    }
    if format.absolute {
        range = range.absolute()?;
    }

    let number = |n: i64| {
        let digits = match format.divide {
            Some(divisor) => decimal(n, divisor),
            None => n.to_string(),
        };
        if format.sign && n > 0 {
            format!("+{}", digits)
        } else {
            digits
        }
    };
    let mut text = range
        .intervals()
        .iter()
        .map(|interval| {
            if interval.min == interval.max {
                number(interval.min)
            } else {
                format!("{} ~ {}", number(interval.min), number(interval.max))
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    if format.percent {
        text.push('%');
    }
    Ok(text)
}

/// Exact long division of `n / divisor`, truncated after
/// `FRACTION_DIGITS` digits. `divisor` is never zero.
fn decimal(n: i64, divisor: i64) -> String {
    let negative = (n < 0) != (divisor < 0);
    let divisor = u128::from(divisor.unsigned_abs());
    let numerator = u128::from(n.unsigned_abs());

    let mut text = (numerator / divisor).to_string();
    let mut remainder = numerator % divisor;
    let mut fraction = String::new();
    while remainder != 0 && fraction.len() < FRACTION_DIGITS {
        remainder *= 10;
        fraction.push(char::from(b'0' + (remainder / divisor) as u8));
        remainder %= divisor;
    }
    let fraction = fraction.trim_end_matches('0');
    if !fraction.is_empty() {
        text.push('.');
        text.push_str(fraction);
    }
    if negative && text != "0" {
        text.insert(0, '-');
    }
    text
}

fn joined_texts(args: &[SymbolicValue]) -> String {
    args.iter()
        .map(|value| value.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod renderer_tests {
    use super::*;

    fn format(flags: &[&str]) -> IntegerFormat {
        ArgumentTemplate {
            identifier: "test".to_string(),
            handler: Some("integer".to_string()),
            print: None,
            range: None,
            index: None,
            integer: Some(flags.iter().map(|flag| flag.to_string()).collect()),
            defaults: None,
        }
        .integer_format()
        .expect("flags should parse")
    }

    #[test]
    fn integer_flags_shape_output() {
        let five = SymbolicValue::integer(5);
        assert_eq!(format_integer(&five, &format(&["sign"])).expect("fmt"), "+5");
        assert_eq!(
            format_integer(&five, &format(&["inverse", "percent"])).expect("fmt"),
            "-5%"
        );
        assert_eq!(
            format_integer(&SymbolicValue::integer(150), &format(&["divide=100"])).expect("fmt"),
            "1.5"
        );

        let spread = SymbolicValue::identifier(
            "x",
            Range::interval(-3, 4).expect("valid interval"),
        );
        assert_eq!(
            format_integer(&spread, &format(&["sign"])).expect("fmt"),
            "-3 ~ +4"
        );
        assert_eq!(
            format_integer(&SymbolicValue::free("x"), &format(&["sign"])).expect("fmt"),
            "x"
        );
    }

    #[test]
    fn decimals_trim_trailing_zeros() {
        assert_eq!(decimal(125, 100), "1.25");
        assert_eq!(decimal(-50, 100), "-0.5");
        assert_eq!(decimal(300, 100), "3");
        assert_eq!(decimal(-300, 100), "-3");
    }

    #[test]
    fn small_quotients_keep_their_digits() {
        assert_eq!(decimal(1, 100_000), "0.00001");
        assert_eq!(decimal(-1, 100_000), "-0.00001");
        assert_eq!(decimal(5, -1_000), "-0.005");
        assert_eq!(decimal(1, 3), "0.333333");
        assert_eq!(decimal(-1, 10_000_000), "0");
        assert_eq!(decimal(0, 7), "0");
        assert_eq!(decimal(i64::MIN, 1_000), "-9223372036854775.808");
    }

    #[test]
    fn splash_covers_square_area() {
        assert_eq!(render_splash(&SymbolicValue::integer(2)), "5x5");
        let spread = SymbolicValue::identifier("r", Range::interval(1, 2).expect("interval"));
        assert_eq!(render_splash(&spread), "3x3 ~ 5x5");
    }

    #[test]
    fn placeholder_regex_splits_selector_and_target() {
        let captures = placeholder_regex()
            .captures("Adds {0,1|bonus_value} to {*|all}")
            .expect("placeholder should match");
        assert_eq!(&captures[1], "0,1");
        assert_eq!(&captures[2], "bonus_value");
    }
}
