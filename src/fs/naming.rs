//! Filename sanitizing.

use crate::error::{Error, Result};

/// Characters Windows refuses in file names.
const RESERVED: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Validate an image file name taken from a URL.
///
/// Traversal, separators and NUL are rejected outright; other reserved
/// characters are replaced with `_`.
pub fn sanitize_filename(name: &str) -> Result<String> {
    reject_unsafe(name)?;

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    non_empty(replace_reserved(name, false))
}

/// Sanitize an account or artwork folder name.
///
/// Separators are replaced rather than rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    reject_unsafe(name)?;
    non_empty(replace_reserved(name, true))
}

fn reject_unsafe(name: &str) -> Result<()> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }
    Ok(())
}

fn replace_reserved(name: &str, separators: bool) -> String {
    name.chars()
        .map(|c| {
            let separator = separators && (c == '/' || c == '\\');
            if separator || RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn non_empty(name: String) -> Result<String> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Name cannot be empty or whitespace-only".to_string(),
        ));
    }
    Ok(name)
}
