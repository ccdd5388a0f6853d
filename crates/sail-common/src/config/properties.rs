use std::path::Path;

use crate::error::{CommonError, CommonResult};

/// Parses Spark properties in the `spark-defaults.conf` format.
///
/// Each non-empty line is either `key=value` or `key value` (split at the first
/// whitespace). Lines starting with `#` or `!` are comments.
/// Entries are returned in file order, so later entries override earlier ones
/// when collected into a map.
pub fn parse_properties(content: &str) -> CommonResult<Vec<(String, String)>> {
    let mut entries = vec![];
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let split = match (line.find('='), line.find(char::is_whitespace)) {
            (Some(eq), Some(ws)) => eq.min(ws),
            (Some(eq), None) => eq,
            (None, Some(ws)) => ws,
            (None, None) => {
                return Err(CommonError::invalid(format!(
                    "missing value for property on line {}: {line}",
                    index + 1
                )))
            }
        };
        let key = line[..split].trim();
        let rest = line[split..].trim_start();
        let value = rest.strip_prefix('=').unwrap_or(rest).trim();
        if key.is_empty() {
            return Err(CommonError::invalid(format!(
                "missing key for property on line {}: {line}",
                index + 1
            )));
        }
        entries.push((key.to_string(), value.to_string()));
    }
    Ok(entries)
}

pub fn load_properties(path: impl AsRef<Path>) -> CommonResult<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)?;
    parse_properties(&content)
}
