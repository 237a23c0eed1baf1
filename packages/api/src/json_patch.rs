//! JSON Patch (RFC 6902) over `serde_json::Value`
//!
//! PATCH requests carry a list of operations that are applied to the
//! editable projection of a record. Application is all-or-nothing: the
//! operations run against a copy and the target is replaced only when every
//! operation succeeded.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Invalid JSON pointer '{0}'")]
    InvalidPointer(String),

    #[error("Path '{0}' does not exist")]
    PathNotFound(String),

    #[error("Array index in '{0}' is out of bounds")]
    IndexOutOfBounds(String),

    #[error("Cannot move '{from}' into its own child '{path}'")]
    MoveIntoChild { from: String, path: String },

    #[error("Test failed at '{0}'")]
    TestFailed(String),
}

/// Apply `operations` to `target` in order
///
/// # Errors
///
/// Returns the first failing operation's error; `target` is left untouched.
pub fn apply(target: &mut Value, operations: &[PatchOperation]) -> Result<(), PatchError> {
    let mut working = target.clone();
    for operation in operations {
        apply_one(&mut working, operation)?;
    }
    *target = working;
    Ok(())
}

fn apply_one(doc: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOperation::Replace { path, value } => {
            let slot = doc
                .pointer_mut(&checked(path)?)
                .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
            *slot = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if from == path {
                return Ok(());
            }
            if path.starts_with(&format!("{}/", from)) {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = doc
                .pointer(&checked(from)?)
                .cloned()
                .ok_or_else(|| PatchError::PathNotFound(from.clone()))?;
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            let current = doc
                .pointer(&checked(path)?)
                .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
            if current == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

/// Pointers are either empty (whole document) or start with `/`
fn checked(path: &str) -> Result<String, PatchError> {
    if path.is_empty() || path.starts_with('/') {
        Ok(path.to_string())
    } else {
        Err(PatchError::InvalidPointer(path.to_string()))
    }
}

/// Split a pointer into its parent pointer and unescaped last token
fn split_last(path: &str) -> Result<(&str, String), PatchError> {
    checked(path)?;
    let idx = path
        .rfind('/')
        .ok_or_else(|| PatchError::InvalidPointer(path.to_string()))?;
    let token = path[idx + 1..].replace("~1", "/").replace("~0", "~");
    Ok((&path[..idx], token))
}

fn array_index(token: &str, len: usize, path: &str) -> Result<usize, PatchError> {
    if token.len() > 1 && token.starts_with('0') {
        return Err(PatchError::InvalidPointer(path.to_string()));
    }
    let index: usize = token
        .parse()
        .map_err(|_| PatchError::InvalidPointer(path.to_string()))?;
    if index >= len {
        return Err(PatchError::IndexOutOfBounds(path.to_string()));
    }
    Ok(index)
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }

    let (parent, token) = split_last(path)?;
    let container = doc
        .pointer_mut(parent)
        .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;

    match container {
        Value::Object(map) => {
            map.insert(token, value);
            Ok(())
        }
        Value::Array(items) => {
            if token == "-" {
                items.push(value);
                return Ok(());
            }
            // insertion may target one past the end
            let index = array_index(&token, items.len() + 1, path)?;
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<Value, PatchError> {
    let (parent, token) = split_last(path)?;
    let container = doc
        .pointer_mut(parent)
        .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;

    match container {
        Value::Object(map) => map
            .remove(&token)
            .ok_or_else(|| PatchError::PathNotFound(path.to_string())),
        Value::Array(items) => {
            let index = array_index(&token, items.len(), path)?;
            Ok(items.remove(index))
        }
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}
