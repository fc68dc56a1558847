use sd_core::{ErrorKind, ScriptDescError};
use std::io::Write;

pub(crate) fn emit_error(out: &mut dyn Write, error: &ScriptDescError) -> i32 {
    let message = serde_json::to_string(&error.message).unwrap_or_else(|_| "\"\"".to_string());
    let _ = writeln!(out, "RESULT:ERROR");
    let _ = writeln!(out, "ERROR_CODE:{}", error.code());
    let _ = writeln!(out, "ERROR_MSG_JSON:{}", message);
    1
}

pub(crate) fn map_cli_read(path: &str, error: std::io::Error) -> ScriptDescError {
    ScriptDescError::new(ErrorKind::Io, format!("Cannot read {}: {}", path, error))
}

pub(crate) fn map_cli_write(error: std::io::Error) -> ScriptDescError {
    ScriptDescError::new(ErrorKind::Io, format!("Cannot write output: {}", error))
}

pub(crate) fn map_cli_json(error: serde_json::Error) -> ScriptDescError {
    ScriptDescError::new(ErrorKind::Io, format!("Cannot encode JSON: {}", error))
}
