use std::collections::BTreeSet;

use sd_compiler::{CompileOutput, CompilerOptions, ScriptCompiler};
use sd_core::ScriptDescError;
use tracing::warn;

use crate::database::GameDatabase;

#[derive(Debug, Clone)]
pub struct ItemDescription {
    pub id: i64,
    pub name: String,
    pub result: Result<CompileOutput, ScriptDescError>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<ItemDescription>,
    /// Undefined references across every compiled script.
    pub undefined: BTreeSet<String>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_err()).count()
    }
}

/// Compiles every item that carries a script. A failing item is logged
/// and reported; the batch moves on.
pub fn compile_item_scripts(db: &GameDatabase, options: CompilerOptions) -> BatchReport {
    let mut compiler = ScriptCompiler::with_options(db, options);
    let mut items = Vec::new();

    for item in db.items() {
        let Some(script) = item.script.as_deref() else {
            continue;
        };
        let result = compiler.compile(script);
        if let Err(error) = &result {
            warn!(
                target: "sd_api::database",
                item = item.id,
                code = error.code(),
                "item script failed: {}",
                error.message
            );
        }
        items.push(ItemDescription {
            id: item.id,
            name: item.name.clone(),
            result,
        });
    }

    BatchReport {
        items,
        undefined: compiler.take_undefined(),
    }
}

/// Compiles one script against `db`, returning the output and the
/// references it could not resolve.
pub fn describe_script(
    db: &GameDatabase,
    source: &str,
    options: CompilerOptions,
) -> Result<(CompileOutput, BTreeSet<String>), ScriptDescError> {
    let mut compiler = ScriptCompiler::with_options(db, options);
    let output = compiler.compile(source)?;
    Ok((output, compiler.take_undefined()))
}

#[cfg(test)]
mod batch_tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "arguments": {
            "bonus": [{"identifier": "bStr", "print": "STR {0|stat}"}],
            "argument": [{"identifier": "stat", "handler": "integer", "integer": ["sign"]}]
        },
        "items": [
            {"id": 1, "aegis_name": "Plain", "name": "Plain"},
            {"id": 2, "aegis_name": "Strong", "name": "Strong Ring", "script": "bonus bStr, 2;"},
            {"id": 3, "aegis_name": "Odd", "name": "Odd Ring", "script": "bonus bVit, 1;"},
            {"id": 4, "aegis_name": "Broken", "name": "Broken Ring", "script": "bonus bStr,"}
        ]
    }"#;

    #[test]
    fn batch_continues_past_failures() {
        let db = GameDatabase::from_json_str(DOCUMENT).expect("document should load");
        let report = compile_item_scripts(&db, CompilerOptions::default());

        let ids: Vec<i64> = report.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(
            report.items[0].result.as_ref().ok().map(|output| output.text.as_str()),
            Some("STR +2")
        );
        assert_eq!(report.failures(), 1);
        assert!(report.undefined.contains("bonus.bVit"));
    }

    #[test]
    fn describe_script_reports_undefined() {
        let db = GameDatabase::from_json_str(DOCUMENT).expect("document should load");
        let (output, undefined) =
            describe_script(&db, "bonus bStr, 1; bonus bLuk, 1;", CompilerOptions::default())
                .expect("script should compile");
        assert_eq!(output.text, "STR +1\nbLuk");
        assert_eq!(undefined.len(), 1);
    }
}
