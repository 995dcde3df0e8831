//! File-name safety checks for the persistent download directory.

use std::path::{Component, Path, PathBuf};

/// True when `name` contains a `../` or `..\` sequence.
pub fn contains_traversal(name: &str) -> bool {
    name.contains("../") || name.contains("..\\")
}

/// A name that may only address a file directly inside the library.
///
/// Rejects traversal sequences, bare `.`/`..`, separators and empty names.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !contains_traversal(name)
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Lexically resolve `name` against `root`.
///
/// Returns `None` when the result would leave `root`: `..` climbing above
/// it, or an absolute component replacing it. No filesystem access.
pub fn resolve_within(root: &Path, name: &str) -> Option<PathBuf> {
    // A backslash is an ordinary character on Unix; still refuse `..\`.
    if contains_traversal(name) {
        return None;
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (depth > 0).then_some(resolved)
}
