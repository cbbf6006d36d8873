use super::*;

use std::fs;
use std::io;

/// Resolve the sources into the list of files to read.
/// A directory stands for its `*.json` files sorted by file name.
pub(super) fn expand(paths: &[PathBuf], errors: &mut Vec<LocatedError>) -> Vec<PathBuf> {
    let mut out = vec![];
    for path in paths {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                errors.push(LocatedError::in_file(path, e.to_string()));
                continue;
            }
        };
        if !meta.is_dir() {
            out.push(path.clone());
            continue;
        }
        match read_dir(path) {
            Ok(files) => out.extend(files),
            Err(e) => errors.push(LocatedError::in_file(path, e.to_string())),
        }
    }
    out
}

fn read_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Parse one file. The top level must be a JSON object.
pub(super) fn load(path: &Path) -> std::result::Result<Map<String, Value>, LocatedError> {
    let text = fs::read_to_string(path).map_err(|e| LocatedError::in_file(path, e.to_string()))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        // The position is kept apart from the message.
        let message = e.to_string();
        let message = match message.rfind(" at line ") {
            Some(i) => message[..i].to_string(),
            None => message,
        };
        LocatedError {
            file: Some(path.to_path_buf()),
            position: Some((e.line(), e.column())),
            key: None,
            message,
        }
    })?;
    match value {
        Value::Object(object) => Ok(object),
        other => Err(LocatedError::in_file(
            path,
            format!("top level must be an object, found {}", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
