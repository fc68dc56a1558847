use std::collections::BTreeMap;

use sd_core::{
    ArgumentTemplate, ConstantRecord, ErrorKind, GameData, ItemRecord, MercenaryRecord, MobRecord,
    ScriptDescError, SkillRecord, TemplateNamespace,
};
use serde::{Deserialize, Serialize};

/// One database document as stored on disk. Every table is optional so a
/// directory can split tables across files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSource {
    pub constants: Vec<ConstantRecord>,
    /// Argument templates keyed by namespace (`bonus2`, `statement`, ...).
    pub arguments: BTreeMap<String, Vec<ArgumentTemplate>>,
    pub items: Vec<ItemRecord>,
    pub skills: Vec<SkillRecord>,
    pub mobs: Vec<MobRecord>,
    pub mercenaries: Vec<MercenaryRecord>,
}

impl DatabaseSource {
    pub fn merge(&mut self, other: DatabaseSource) {
        self.constants.extend(other.constants);
        for (namespace, templates) in other.arguments {
            self.arguments.entry(namespace).or_default().extend(templates);
        }
        self.items.extend(other.items);
        self.skills.extend(other.skills);
        self.mobs.extend(other.mobs);
        self.mercenaries.extend(other.mercenaries);
    }
}

/// Indexed, read-only game tables.
#[derive(Debug, Clone, Default)]
pub struct GameDatabase {
    constants: BTreeMap<String, ConstantRecord>,
    groups: BTreeMap<String, BTreeMap<String, ConstantRecord>>,
    templates: BTreeMap<TemplateNamespace, BTreeMap<String, ArgumentTemplate>>,
    items: BTreeMap<i64, ItemRecord>,
    item_names: BTreeMap<String, i64>,
    skills: BTreeMap<i64, SkillRecord>,
    skill_names: BTreeMap<String, i64>,
    mobs: BTreeMap<i64, MobRecord>,
    mob_sprites: BTreeMap<String, i64>,
    mercenaries: BTreeMap<i64, MercenaryRecord>,
}

impl GameDatabase {
    pub fn from_source(source: DatabaseSource) -> Result<Self, ScriptDescError> {
        let mut db = Self::default();

        for constant in source.constants {
            if let Some(group) = &constant.group {
                db.groups
                    .entry(group.clone())
                    .or_default()
                    .insert(constant.identifier.clone(), constant.clone());
            }
            let identifier = constant.identifier.clone();
            insert_unique(&mut db.constants, identifier, constant, "constant")?;
        }

        for (key, templates) in source.arguments {
            let namespace = TemplateNamespace::from_key(&key).ok_or_else(|| {
                ScriptDescError::new(
                    ErrorKind::Database,
                    format!("Unknown argument namespace '{}'.", key),
                )
            })?;
            let table = db.templates.entry(namespace).or_default();
            for template in templates {
                let identifier = template.identifier.clone();
                insert_unique(table, identifier, template, &key)?;
            }
        }

        for item in source.items {
            db.item_names.insert(item.aegis_name.clone(), item.id);
            db.item_names.entry(item.name.clone()).or_insert(item.id);
            insert_unique(&mut db.items, item.id, item, "item")?;
        }
        for skill in source.skills {
            db.skill_names.insert(skill.aegis_name.clone(), skill.id);
            db.skill_names.entry(skill.name.clone()).or_insert(skill.id);
            insert_unique(&mut db.skills, skill.id, skill, "skill")?;
        }
        for mob in source.mobs {
            db.mob_sprites.insert(mob.sprite.clone(), mob.id);
            insert_unique(&mut db.mobs, mob.id, mob, "mob")?;
        }
        for mercenary in source.mercenaries {
            insert_unique(&mut db.mercenaries, mercenary.id, mercenary, "mercenary")?;
        }

        Ok(db)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScriptDescError> {
        Self::from_source(parse_source(text)?)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.values()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.values().map(BTreeMap::len).sum()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

pub(crate) fn parse_source(text: &str) -> Result<DatabaseSource, ScriptDescError> {
    serde_json::from_str(text).map_err(|error| {
        ScriptDescError::new(
            ErrorKind::Database,
            format!("Malformed database document: {}", error),
        )
    })
}

fn insert_unique<K, V>(
    table: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    what: &str,
) -> Result<(), ScriptDescError>
where
    K: Ord + std::fmt::Display,
{
    if table.contains_key(&key) {
        return Err(ScriptDescError::new(
            ErrorKind::Database,
            format!("Duplicate {} '{}'.", what, key),
        ));
    }
    table.insert(key, value);
    Ok(())
}

impl GameData for GameDatabase {
    fn constant_by_identifier(&self, identifier: &str) -> Option<&ConstantRecord> {
        self.constants.get(identifier)
    }

    fn constant_group_by_identifier(
        &self,
        group: &str,
    ) -> Option<&BTreeMap<String, ConstantRecord>> {
        self.groups.get(group)
    }

    fn argument_template(
        &self,
        namespace: TemplateNamespace,
        identifier: &str,
    ) -> Option<&ArgumentTemplate> {
        self.templates.get(&namespace)?.get(identifier)
    }

    fn item_by_id(&self, id: i64) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    fn item_by_name(&self, name: &str) -> Option<&ItemRecord> {
        self.items.get(self.item_names.get(name)?)
    }

    fn skill_by_id(&self, id: i64) -> Option<&SkillRecord> {
        self.skills.get(&id)
    }

    fn skill_by_name(&self, name: &str) -> Option<&SkillRecord> {
        self.skills.get(self.skill_names.get(name)?)
    }

    fn mob_by_id(&self, id: i64) -> Option<&MobRecord> {
        self.mobs.get(&id)
    }

    fn mob_by_sprite(&self, sprite: &str) -> Option<&MobRecord> {
        self.mobs.get(self.mob_sprites.get(sprite)?)
    }

    fn mercenary_by_id(&self, id: i64) -> Option<&MercenaryRecord> {
        self.mercenaries.get(&id)
    }
}

#[cfg(test)]
mod database_tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "constants": [
            {"identifier": "Ele_Fire", "value": 3, "label": "Fire", "group": "element"},
            {"identifier": "Class", "value": 0, "range": [[0, 4000]]}
        ],
        "arguments": {
            "bonus": [{"identifier": "bStr", "print": "STR {0|stat}"}],
            "argument": [{"identifier": "stat", "handler": "integer", "integer": ["sign"]}]
        },
        "items": [{"id": 501, "aegis_name": "Red_Potion", "name": "Red Potion"}],
        "skills": [{"id": 5, "aegis_name": "SM_BASH", "name": "Bash", "max_level": 10}],
        "mobs": [{"id": 1002, "sprite": "PORING", "name": "Poring"}]
    }"#;

    #[test]
    fn document_indexes_every_table() {
        let db = GameDatabase::from_json_str(DOCUMENT).expect("document should load");
        assert_eq!(db.constant_count(), 2);
        assert_eq!(db.template_count(), 2);
        assert!(db
            .constant_group_by_identifier("element")
            .is_some_and(|group| group.contains_key("Ele_Fire")));
        assert!(db
            .argument_template(TemplateNamespace::Bonus(1), "bStr")
            .is_some());
        assert_eq!(db.item_by_name("Red_Potion").map(|item| item.id), Some(501));
        assert_eq!(db.skill_by_name("Bash").map(|skill| skill.id), Some(5));
        assert_eq!(db.mob_by_sprite("PORING").map(|mob| mob.id), Some(1002));
        assert!(db.mercenary_by_id(1).is_none());
    }

    #[test]
    fn duplicates_and_unknown_namespaces_are_rejected() {
        let duplicate = r#"{"items": [
            {"id": 1, "aegis_name": "A", "name": "A"},
            {"id": 1, "aegis_name": "B", "name": "B"}
        ]}"#;
        let error = GameDatabase::from_json_str(duplicate).expect_err("duplicate id");
        assert_eq!(error.kind, ErrorKind::Database);

        let namespace = r#"{"arguments": {"bonus9": []}}"#;
        let error = GameDatabase::from_json_str(namespace).expect_err("bad namespace");
        assert_eq!(error.kind, ErrorKind::Database);

        let error = GameDatabase::from_json_str("{").expect_err("malformed json");
        assert_eq!(error.kind, ErrorKind::Database);
    }
}
