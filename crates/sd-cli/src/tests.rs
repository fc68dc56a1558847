use super::*;

use std::path::PathBuf;

fn demo_db() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("item_db.json")
        .to_string_lossy()
        .to_string()
}

fn run_args(args: &[&str]) -> (i32, String) {
    let cli = Cli::try_parse_from(args).expect("arguments should parse");
    let mut out = Vec::new();
    let code = match run(&mut out, cli) {
        Ok(code) => code,
        Err(error) => emit_error(&mut out, &error),
    };
    (code, String::from_utf8(out).expect("utf8 output"))
}

#[test]
fn describe_script_prints_lines_then_result() {
    let db = demo_db();
    let (code, out) = run_args(&[
        "scriptdesc",
        "describe",
        "--db",
        &db,
        "--script",
        "bonus bStr, 3; bonus bDex, 1;",
    ]);
    assert_eq!(code, 0);
    assert_eq!(out, "STR +3\nbDex\nUNDEFINED:bonus.bDex\nRESULT:OK\n");
}

#[test]
fn describe_items_lists_every_scripted_item() {
    let db = demo_db();
    let (code, out) = run_args(&["scriptdesc", "describe", "--db", &db, "--items"]);
    assert_eq!(code, 0);
    assert!(out.contains("[2102] Swordman Guard\n[Class == Swordman]\nMax HP +10%\n[else]\nINT +1\n"));
    assert!(out.contains("+2 ~ +15% damage against Demi-Human enemies"));
    assert!(out.contains("5% chance to cast Fire Bolt Lv. 3 when attacking"));
    assert!(!out.contains("[2301]"));
    assert!(out.ends_with("RESULT:OK\n"));
}

#[test]
fn describe_conditions_flag_appends_branch_condition() {
    let db = demo_db();
    let (_, out) = run_args(&[
        "scriptdesc",
        "describe",
        "--db",
        &db,
        "--conditions",
        "--script",
        "if (Refine >= 7) bonus bStr, 1;",
    ]);
    assert!(out.contains("STR +1\t[7 <= Refine <= 20]\n"));
}

#[test]
fn errors_are_reported_with_code() {
    let db = demo_db();
    let (code, out) = run_args(&["scriptdesc", "describe", "--db", &db, "--script", "if ("]);
    assert_eq!(code, 1);
    assert!(out.starts_with("RESULT:ERROR\nERROR_CODE:PARSE_ERROR\nERROR_MSG_JSON:"));

    let (code, out) = run_args(&[
        "scriptdesc",
        "describe",
        "--db",
        "/definitely/missing/db.json",
        "--items",
    ]);
    assert_eq!(code, 1);
    assert!(out.contains("ERROR_CODE:IO_ERROR"));
}

#[test]
fn ast_dumps_json_tree() {
    let (code, out) = run_args(&["scriptdesc", "ast", "--script", "bonus bStr, 1;"]);
    assert_eq!(code, 0);
    assert!(out.contains("\"kind\": \"block\""));
    assert!(out.contains("\"name\": \"bonus\""));
}

#[test]
fn describe_requires_a_source() {
    assert!(Cli::try_parse_from(["scriptdesc", "describe", "--db", "x.json"]).is_err());
    assert!(Cli::try_parse_from([
        "scriptdesc",
        "describe",
        "--db",
        "x.json",
        "--items",
        "--script",
        "bonus bStr, 1;"
    ])
    .is_err());
}
