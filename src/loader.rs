//! Export discovery, reading and top-level shape checks.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{RecapError, RecapResult};
use crate::parser::flatten_messages;
use crate::types::NormalizedMessage;

pub const EXPORT_FILE_NAME: &str = "conversations.json";
const MAX_SCAN_DEPTH: usize = 3;

/// Locate the `conversations.json` to analyse.
///
/// A file path is taken as is. A directory is searched breadth-first up to
/// three levels deep; when several exports are found the first in path order
/// wins.
pub fn find_conversation_file(root: &Path) -> RecapResult<PathBuf> {
    if root.is_file() {
        return Ok(root.to_path_buf());
    }
    if !root.is_dir() {
        return Err(RecapError::ExportNotFound {
            path: root.to_path_buf(),
        });
    }

    let direct = root.join(EXPORT_FILE_NAME);
    if direct.is_file() {
        debug!(path = %direct.display(), "found export at the top level");
        return Ok(direct);
    }

    let mut results = Vec::new();
    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
    let mut visited = HashSet::new();

    queue.push_back((root.to_path_buf(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if !visited.insert(current.clone()) || depth > MAX_SCAN_DEPTH {
            continue;
        }

        if current != root {
            let candidate = current.join(EXPORT_FILE_NAME);
            if candidate.is_file() {
                debug!(path = %candidate.display(), depth, "found export");
                results.push(candidate);
                continue;
            }
        }

        if depth == MAX_SCAN_DEPTH {
            continue;
        }

        let entries = fs::read_dir(&current).map_err(|source| RecapError::read(&current, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| RecapError::read(&current, source))?;
            let path = entry.path();
            if path.is_dir() {
                queue.push_back((path, depth + 1));
            }
        }
    }

    results.sort();
    results
        .into_iter()
        .next()
        .ok_or_else(|| RecapError::ExportNotFound {
            path: root.to_path_buf(),
        })
}

/// Read and parse an export, insisting on a top-level array.
pub fn read_export(path: &Path) -> RecapResult<Vec<Value>> {
    let raw = fs::read_to_string(path).map_err(|source| RecapError::read(path, source))?;
    parse_export(&raw).map_err(|err| match err {
        ParseFailure::Json(source) => RecapError::json(path, source),
        ParseFailure::NotAnArray => RecapError::NotAnArray,
    })
}

enum ParseFailure {
    Json(serde_json::Error),
    NotAnArray,
}

fn parse_export(raw: &str) -> Result<Vec<Value>, ParseFailure> {
    match serde_json::from_str(raw).map_err(ParseFailure::Json)? {
        Value::Array(items) => Ok(items),
        _ => Err(ParseFailure::NotAnArray),
    }
}

/// Flatten already-parsed conversations, failing when nothing was extracted.
pub fn messages_from_conversations(conversations: &[Value]) -> RecapResult<Vec<NormalizedMessage>> {
    let messages = flatten_messages(conversations);
    if messages.is_empty() {
        return Err(RecapError::NoMessages);
    }
    Ok(messages)
}

/// Find, read and flatten an export in one step.
pub fn load_messages(export: &Path) -> RecapResult<Vec<NormalizedMessage>> {
    let file = find_conversation_file(export)?;
    let conversations = read_export(&file)?;
    info!(
        path = %file.display(),
        conversations = conversations.len(),
        "loaded export"
    );
    messages_from_conversations(&conversations)
}
