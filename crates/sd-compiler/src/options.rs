use crate::*;

pub const DEFAULT_MAX_TEMPLATE_DEPTH: usize = 16;

/// Compiler knobs.
///
/// Environment variables read by [`CompilerOptions::from_env`]:
/// - `SCRIPTDESC_TEMPLATE_DEPTH` - nested template rendering limit (default: 16)
/// - `SCRIPTDESC_LINE_SEPARATOR` - separator between rendered lines (default: newline)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    pub max_template_depth: usize,
    pub line_separator: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_template_depth: DEFAULT_MAX_TEMPLATE_DEPTH,
            line_separator: "\n".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds options from an arbitrary key lookup; unparsable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(depth) = read_var::<usize>(&lookup, "SCRIPTDESC_TEMPLATE_DEPTH") {
            options.max_template_depth = depth.max(1);
        }
        if let Some(separator) = lookup("SCRIPTDESC_LINE_SEPARATOR") {
            options.line_separator = separator.replace("\\n", "\n").replace("\\t", "\t");
        }

        options
    }
}

fn read_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

/// Labels for the units the time handlers scale into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeUnits {
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub millisecond: String,
}

impl Default for TimeUnits {
    fn default() -> Self {
        Self {
            day: "day(s)".to_string(),
            hour: "hour(s)".to_string(),
            minute: "minute(s)".to_string(),
            second: "second(s)".to_string(),
            millisecond: "millisecond(s)".to_string(),
        }
    }
}

/// One named bit of a flag handler's mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagLabel {
    pub mask: i64,
    pub label: String,
}

/// Tables the renderer consults, built once from the constant table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RendererConfig {
    pub flags: BTreeMap<String, Vec<FlagLabel>>,
    /// Handler name to the constant group it labels values from.
    pub groups: BTreeMap<String, String>,
    pub time_units: TimeUnits,
}

pub const FLAG_HANDLERS: [&str; 3] = ["bf", "atf_target", "atf_trigger"];
pub const GROUP_HANDLERS: [&str; 7] =
    ["element", "job", "size", "race", "mob_race", "effect", "class"];

impl RendererConfig {
    pub fn from_data(db: &dyn GameData) -> Self {
        let mut config = Self::default();

        for handler in FLAG_HANDLERS {
            let mut labels: Vec<FlagLabel> = db
                .constant_group_by_identifier(handler)
                .map(|group| {
                    group
                        .values()
                        .filter(|constant| constant.value > 0)
                        .map(|constant| FlagLabel {
                            mask: constant.value,
                            label: constant.display_name().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            labels.sort_by_key(|flag| flag.mask);
            config.flags.insert(handler.to_string(), labels);
        }

        for handler in GROUP_HANDLERS {
            config
                .groups
                .insert(handler.to_string(), handler.to_string());
        }

        config
    }

    pub fn flag_labels(&self, handler: &str) -> &[FlagLabel] {
        self.flags.get(handler).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_for(&self, handler: &str) -> Option<&str> {
        self.groups.get(handler).map(String::as_str)
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults_and_ignores_garbage() {
        let options = CompilerOptions::from_lookup(|key| match key {
            "SCRIPTDESC_TEMPLATE_DEPTH" => Some(" 4 ".to_string()),
            "SCRIPTDESC_LINE_SEPARATOR" => Some("\\n--\\n".to_string()),
            _ => None,
        });
        assert_eq!(options.max_template_depth, 4);
        assert_eq!(options.line_separator, "\n--\n");

        let fallback = CompilerOptions::from_lookup(|key| {
            (key == "SCRIPTDESC_TEMPLATE_DEPTH").then(|| "deep".to_string())
        });
        assert_eq!(fallback, CompilerOptions::default());
    }
}
