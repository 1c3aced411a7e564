//! Request target to filesystem path resolution.
//!
//! Resolution is purely lexical: no filesystem call is made, so a rejected
//! target never touches the disk. Symlinks below the root are checked later,
//! once the file is known to exist (see [`crate::fs::static_files`]).

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Served when the target names the root or a directory.
pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("path escapes the document root")]
    Traversal,
    #[error("path is not valid UTF-8 after percent-decoding")]
    InvalidEncoding,
    #[error("path contains a NUL byte")]
    NulByte,
}

/// A request target mapped into the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Always a descendant of the root passed to [`resolve`]
    pub absolute_path: PathBuf,
    /// Lower-cased with its leading dot (".html"), empty when there is none
    pub extension: String,
}

/// Maps `raw_target` onto `root`.
///
/// `root` is expected to be canonical already; the result is checked to lie
/// under it component by component, so a root of `/a/b` never admits
/// `/a/bc`.
pub fn resolve(raw_target: &str, root: &Path) -> Result<ResolvedPath, ResolveError> {
    let path = raw_target
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ResolveError::InvalidEncoding)?;

    if decoded.contains('\0') {
        return Err(ResolveError::NulByte);
    }

    // Lexical canonicalization: ".." may climb into the root's own
    // components, containment is decided once the whole target is applied
    let mut absolute_path = root.to_path_buf();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                absolute_path.pop();
            }
            name => absolute_path.push(name),
        }
    }

    if !absolute_path.starts_with(root) {
        return Err(ResolveError::Traversal);
    }

    // "/", "" and "/docs/" all name a directory
    if absolute_path == root || decoded.ends_with(['/', '\\']) {
        absolute_path.push(INDEX_FILE);
    }

    let extension = absolute_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    Ok(ResolvedPath {
        absolute_path,
        extension,
    })
}
