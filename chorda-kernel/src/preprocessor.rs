//! `:include` preprocessor - a purely textual pre-pass.
//!
//! Inlines included files before scanning. Paths are resolved relative to the
//! including file's directory; absolute paths are used verbatim. Sources read
//! from stdin resolve against `$PWD`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ChordError;

/// Hard cap on include nesting, so an accidental self-include fails with a
/// diagnostic instead of exhausting the stack.
const MAX_INCLUDE_DEPTH: usize = 64;

/// Run the preprocessor over `source`. `source_path` is the file the text
/// came from, or `None` for stdin scripts.
pub fn run(source: &str, source_path: Option<&Path>) -> Result<String, ChordError> {
    let base = match source_path {
        Some(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        None => std::env::var_os("PWD").map(PathBuf::from).ok_or_else(|| {
            ChordError::Parse(
                "Cannot get environment variable '$PWD' required for scripts.".to_string(),
            )
        })?,
    };
    run_at_depth(source, &base, 0)
}

fn run_at_depth(source: &str, base: &Path, depth: usize) -> Result<String, ChordError> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ChordError::Parse(format!(
            "Includes nested deeper than {MAX_INCLUDE_DEPTH} levels; is a file including itself?"
        )));
    }

    let bytes = source.as_bytes();
    let mut result = String::with_capacity(source.len());
    let mut copied = 0; /* everything before this offset is already in result */
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            /* comments cannot hold includes */
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            /* skip %{{…}} command blocks so their text cannot false-positive */
            b'%' if bytes[i..].starts_with(b"%{{") => {
                i += 3;
                while i < bytes.len() {
                    if bytes[i] == b'}' && bytes.get(i + 1) == Some(&b'}') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            /* skip "…" literals, honoring escaped quotes */
            b'"' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            b':' if source[i..].starts_with(":include")
                && !matches!(
                    bytes.get(i + ":include".len()),
                    Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-')
                ) =>
            {
                let directive_start = i;
                i += ":include".len();

                /* first '"' after the keyword */
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ChordError::Parse(
                        "Expect '\"' after `:include` preprocessor directive.".to_string(),
                    ));
                }
                i += 1;

                let path_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'"') {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ChordError::Parse(
                        "Expect closing '\"' for `:include` preprocessor directive.".to_string(),
                    ));
                }
                let raw_path = source[path_start..i].replace("\\\"", "\"");
                i += 1;

                if raw_path.is_empty() {
                    return Err(ChordError::Parse(
                        "`:include` directive given an empty path.".to_string(),
                    ));
                }

                result.push_str(&source[copied..directive_start]);
                copied = i;

                let include_path = resolve_include_path(&raw_path, base);
                debug!(path = %include_path.display(), "including file");

                let included = std::fs::read_to_string(&include_path).map_err(|err| {
                    ChordError::Parse(format!(
                        "Could not read included file '{}': {}.",
                        include_path.display(),
                        err
                    ))
                })?;

                let include_base = include_path.parent().map(Path::to_path_buf).unwrap_or_default();
                let processed = run_at_depth(&included, &include_base, depth + 1)?;
                result.push_str(&processed);
            }
            _ => i += 1,
        }
    }

    result.push_str(&source[copied..]);
    Ok(result)
}

fn resolve_include_path(raw: &str, base: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
