use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ScriptDescError};
use crate::range::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRecord {
    pub identifier: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Declared sub-ranges, `[[min, max], ...]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ConstantRecord {
    /// The label to print, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentTemplate {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Literal text with `{i,j|template}` or `{*|template}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BTreeMap<i64, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<BTreeMap<usize, i64>>,
}

impl ArgumentTemplate {
    pub fn default_for(&self, position: usize) -> Option<i64> {
        self.defaults
            .as_ref()
            .and_then(|defaults| defaults.get(&position).copied())
    }

    pub fn integer_format(&self) -> Result<IntegerFormat, ScriptDescError> {
        let mut format = IntegerFormat::default();
        for flag in self.integer.iter().flatten() {
            match flag.as_str() {
                "sign" => format.sign = true,
                "string" => format.string = true,
                "percent" => format.percent = true,
                "inverse" => format.inverse = true,
                "absolute" => format.absolute = true,
                other => {
                    let divisor = other
                        .strip_prefix("divide=")
                        .and_then(|value| value.trim().parse::<i64>().ok())
                        .filter(|value| *value != 0);
                    match divisor {
                        Some(divisor) => format.divide = Some(divisor),
                        None => {
                            return Err(ScriptDescError::new(
                                ErrorKind::MalformedTemplate,
                                format!(
                                    "Template '{}' has unknown integer flag '{}'.",
                                    self.identifier, other
                                ),
                            ))
                        }
                    }
                }
            }
        }
        Ok(format)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerFormat {
    pub sign: bool,
    pub string: bool,
    pub percent: bool,
    pub inverse: bool,
    pub absolute: bool,
    pub divide: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: i64,
    pub aegis_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: i64,
    pub aegis_name: String,
    pub name: String,
    pub max_level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobRecord {
    pub id: i64,
    pub sprite: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercenaryRecord {
    pub id: i64,
    pub name: String,
}

/// Which family of argument templates a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateNamespace {
    Argument,
    /// `bonus` is `Bonus(1)`, `bonus5` is `Bonus(5)`.
    Bonus(u8),
    /// `sc_start`, `sc_start2` and `sc_start4`.
    ScStart(u8),
    Statement,
}

impl TemplateNamespace {
    pub const ALL: [TemplateNamespace; 10] = [
        TemplateNamespace::Argument,
        TemplateNamespace::Bonus(1),
        TemplateNamespace::Bonus(2),
        TemplateNamespace::Bonus(3),
        TemplateNamespace::Bonus(4),
        TemplateNamespace::Bonus(5),
        TemplateNamespace::ScStart(1),
        TemplateNamespace::ScStart(2),
        TemplateNamespace::ScStart(4),
        TemplateNamespace::Statement,
    ];

    /// Namespace of the built-in script function with this name.
    pub fn for_function(name: &str) -> Option<Self> {
        match name {
            "bonus" => Some(Self::Bonus(1)),
            "bonus2" => Some(Self::Bonus(2)),
            "bonus3" => Some(Self::Bonus(3)),
            "bonus4" => Some(Self::Bonus(4)),
            "bonus5" => Some(Self::Bonus(5)),
            "sc_start" => Some(Self::ScStart(1)),
            "sc_start2" => Some(Self::ScStart(2)),
            "sc_start4" => Some(Self::ScStart(4)),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "argument" => Some(Self::Argument),
            "statement" => Some(Self::Statement),
            other => Self::for_function(other),
        }
    }

    pub fn key(self) -> String {
        match self {
            Self::Argument => "argument".to_string(),
            Self::Statement => "statement".to_string(),
            Self::Bonus(1) => "bonus".to_string(),
            Self::Bonus(n) => format!("bonus{}", n),
            Self::ScStart(1) => "sc_start".to_string(),
            Self::ScStart(n) => format!("sc_start{}", n),
        }
    }
}

impl fmt::Display for TemplateNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Read-only lookups into the game tables.
pub trait GameData {
    fn constant_by_identifier(&self, identifier: &str) -> Option<&ConstantRecord>;
    fn constant_group_by_identifier(&self, group: &str)
        -> Option<&BTreeMap<String, ConstantRecord>>;
    fn argument_template(
        &self,
        namespace: TemplateNamespace,
        identifier: &str,
    ) -> Option<&ArgumentTemplate>;
    fn item_by_id(&self, id: i64) -> Option<&ItemRecord>;
    fn item_by_name(&self, name: &str) -> Option<&ItemRecord>;
    fn skill_by_id(&self, id: i64) -> Option<&SkillRecord>;
    fn skill_by_name(&self, name: &str) -> Option<&SkillRecord>;
    fn mob_by_id(&self, id: i64) -> Option<&MobRecord>;
    fn mob_by_sprite(&self, sprite: &str) -> Option<&MobRecord>;
    fn mercenary_by_id(&self, id: i64) -> Option<&MercenaryRecord>;
}
