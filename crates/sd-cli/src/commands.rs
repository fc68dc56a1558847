use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use sd_api::{compile_item_scripts, describe_script, load_database};
use sd_compiler::{CompileOutput, CompilerOptions};
use sd_core::ScriptDescError;
use sd_parser::parse_script;

use crate::{map_cli_json, map_cli_read, map_cli_write, AstArgs, DescribeArgs};

pub(crate) fn run_describe(out: &mut dyn Write, args: DescribeArgs) -> Result<i32, ScriptDescError> {
    let db = load_database(Path::new(&args.db))?;
    let options = CompilerOptions::from_env();

    if args.items {
        let report = compile_item_scripts(&db, options);
        for item in &report.items {
            writeln!(out, "[{}] {}", item.id, item.name).map_err(map_cli_write)?;
            match &item.result {
                Ok(output) => write_lines(out, output, args.conditions)?,
                Err(error) => writeln!(out, "ERROR:{} {}", error.code(), error.message)
                    .map_err(map_cli_write)?,
            }
        }
        write_undefined(out, &report.undefined)?;
    } else {
        let source = read_script(args.script, args.script_file)?;
        let (output, undefined) = describe_script(&db, &source, options)?;
        write_lines(out, &output, args.conditions)?;
        write_undefined(out, &undefined)?;
    }

    writeln!(out, "RESULT:OK").map_err(map_cli_write)?;
    Ok(0)
}

pub(crate) fn run_ast(out: &mut dyn Write, args: AstArgs) -> Result<i32, ScriptDescError> {
    let source = read_script(args.script, args.script_file)?;
    let script = parse_script(&source)?;
    let json = serde_json::to_string_pretty(&script).map_err(map_cli_json)?;
    writeln!(out, "{}", json).map_err(map_cli_write)?;
    writeln!(out, "RESULT:OK").map_err(map_cli_write)?;
    Ok(0)
}

fn read_script(
    script: Option<String>,
    script_file: Option<String>,
) -> Result<String, ScriptDescError> {
    match (script, script_file) {
        (Some(script), _) => Ok(script),
        (None, Some(path)) => fs::read_to_string(&path).map_err(|error| map_cli_read(&path, error)),
        (None, None) => Ok(String::new()),
    }
}

fn write_lines(
    out: &mut dyn Write,
    output: &CompileOutput,
    conditions: bool,
) -> Result<(), ScriptDescError> {
    for line in &output.lines {
        let written = match (&line.condition, conditions) {
            (Some(condition), true) => writeln!(out, "{}\t[{}]", line.text, condition),
            _ => writeln!(out, "{}", line.text),
        };
        written.map_err(map_cli_write)?;
    }
    Ok(())
}

fn write_undefined(out: &mut dyn Write, undefined: &BTreeSet<String>) -> Result<(), ScriptDescError> {
    for name in undefined {
        writeln!(out, "UNDEFINED:{}", name).map_err(map_cli_write)?;
    }
    Ok(())
}
