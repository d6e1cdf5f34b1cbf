//! Text-level capability backfill that keeps every other byte of the block as written.

use semver::Version;

use super::{BlockError, TOOL_USE};

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Key name and its effective indentation, treating `- key:` as a key nested two deeper.
fn key_at(line: &str) -> Option<(&str, usize, &str)> {
    let indent = indent_of(line);
    let mut rest = &line[indent..];
    let mut key_indent = indent;
    if let Some(stripped) = rest.strip_prefix("- ") {
        rest = stripped;
        key_indent += 2;
    }
    let (key, value) = rest.split_once(':')?;
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    Some((key, key_indent, value.trim()))
}

/// Index one past the last line of the block that starts at `start` (a key at `key_indent`).
fn end_of_block(lines: &[String], start: usize, key_indent: usize) -> usize {
    let mut end = start + 1;
    while end < lines.len() {
        let line = &lines[end];
        if line.trim().is_empty() {
            break;
        }
        let indent = indent_of(line);
        let is_item = indent == key_indent && line[indent..].starts_with("- ");
        if indent > key_indent || is_item {
            end += 1;
        } else {
            break;
        }
    }
    end
}

/// Bump the top-level `version:` line and add the tool-use capability to the first model entry.
pub fn patch_capability(text: &str, version: &Version) -> Result<String, BlockError> {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = text.ends_with('\n');
    let mut lines: Vec<String> = text.lines().map(String::from).collect();

    set_version(&mut lines, version);
    add_capability(&mut lines)?;

    let mut out = lines.join(newline);
    if trailing {
        out.push_str(newline);
    }
    Ok(out)
}

fn set_version(lines: &mut Vec<String>, version: &Version) {
    let new_line = format!("version: {}", version);
    if let Some(line) = lines.iter_mut().find(|l| l.starts_with("version:")) {
        *line = new_line;
        return;
    }
    let at = lines
        .iter()
        .position(|l| l.starts_with("name:"))
        .map(|i| i + 1)
        .unwrap_or(0);
    lines.insert(at, new_line);
}

/// Line range `[start, end)` of the first item under the top-level `models:` key.
fn first_model_entry(lines: &[String]) -> Option<(usize, usize)> {
    let models = lines
        .iter()
        .position(|l| matches!(key_at(l), Some(("models", 0, ""))))?;
    let start = (models + 1..lines.len())
        .find(|&i| !lines[i].trim().is_empty() && !lines[i].trim_start().starts_with('#'))
        .filter(|&i| lines[i].trim_start().starts_with("- "))?;
    let marker = indent_of(&lines[start]);
    let end = (start + 1..lines.len())
        .find(|&i| !lines[i].trim().is_empty() && indent_of(&lines[i]) <= marker)
        .unwrap_or(lines.len());
    Some((start, end))
}

/// First line in `range` holding `key`, with its effective indent and value.
fn find_key(
    lines: &[String],
    (start, end): (usize, usize),
    key: &str,
) -> Option<(usize, usize, String)> {
    (start..end).find_map(|i| {
        key_at(&lines[i])
            .filter(|(k, indent, _)| *k == key && *indent > 0)
            .map(|(_, indent, value)| (i, indent, value.to_string()))
    })
}

fn add_capability(lines: &mut Vec<String>) -> Result<(), BlockError> {
    let entry = first_model_entry(lines)
        .ok_or_else(|| BlockError::Unpatchable("no model entry found".to_string()))?;

    if let Some((i, key_indent, value)) = find_key(lines, entry, "capabilities") {
        if value.is_empty() {
            let end = end_of_block(lines, i, key_indent);
            let item_indent = lines
                .get(i + 1)
                .filter(|l| l.trim_start().starts_with("- ") && i + 1 < end)
                .map(|l| indent_of(l))
                .unwrap_or(key_indent + 2);
            lines.insert(end, format!("{}- {}", " ".repeat(item_indent), TOOL_USE));
            return Ok(());
        }
        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let inner = inner.trim();
            let merged = if inner.is_empty() {
                TOOL_USE.to_string()
            } else {
                format!("{}, {}", inner, TOOL_USE)
            };
            lines[i] = format!("{}: [{}]", capability_key_prefix(&lines[i]), merged);
            return Ok(());
        }
        return Err(BlockError::Unpatchable(format!(
            "unsupported capabilities value '{}'",
            value
        )));
    }

    let (model_line, field_indent, _) = find_key(lines, entry, "model")
        .ok_or_else(|| BlockError::Unpatchable("first model entry has no 'model' key".to_string()))?;

    // After the entry's roles list when it has one, otherwise right after `model:`.
    let roles = find_key(lines, entry, "roles").filter(|(_, indent, _)| *indent == field_indent);
    let at = match roles {
        Some((i, _, _)) => end_of_block(lines, i, field_indent).min(entry.1),
        None => model_line + 1,
    };

    let pad = " ".repeat(field_indent);
    lines.insert(at, format!("{}capabilities:", pad));
    lines.insert(at + 1, format!("{}  - {}", pad, TOOL_USE));
    Ok(())
}

/// Leading text of a `capabilities` line up to the key (keeps a `- ` item marker).
fn capability_key_prefix(line: &str) -> String {
    let idx = line.find("capabilities").unwrap_or(0);
    format!("{}capabilities", &line[..idx])
}
