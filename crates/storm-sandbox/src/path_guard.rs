//! Containment checks that keep resolved paths beneath the sandbox root.

use crate::error::SandboxError;
use std::path::{Component, Path, PathBuf};

/// Return the canonical form of an existing sandbox root.
pub fn canonical_root(root: &Path) -> Result<PathBuf, SandboxError> {
    root.canonicalize()
        .map_err(|e| SandboxError::io(root, e))
}

/// Resolve `path` against a canonical `root` and ensure it stays within it.
///
/// The deepest existing ancestor of the candidate is canonicalized, so
/// symlinks are followed before the containment check. Missing trailing
/// components are appended as-is, which lets callers resolve files they are
/// about to create. Containment is tested per component, never as a string
/// prefix.
pub fn resolve(root: &Path, path: &Path) -> Result<PathBuf, SandboxError> {
    let candidate = absolutize(path, root);
    let (existing_base, tail) = split_existing_ancestor(path, &candidate)?;
    let resolved = if tail.as_os_str().is_empty() {
        existing_base
    } else {
        existing_base.join(tail)
    };

    ensure_within_root(path, &resolved, root)?;
    Ok(resolved)
}

/// Render `path` relative to `root` with `/` separators.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn absolutize(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&root.join(path))
    }
}

fn ensure_within_root(original: &Path, resolved: &Path, root: &Path) -> Result<(), SandboxError> {
    if !resolved.starts_with(root) {
        tracing::warn!(path = %original.display(), "rejected path outside sandbox root");
        return Err(SandboxError::AccessDenied(format!(
            "path '{}' is outside the sandbox root",
            original.display()
        )));
    }
    Ok(())
}

fn split_existing_ancestor(
    original: &Path,
    candidate: &Path,
) -> Result<(PathBuf, PathBuf), SandboxError> {
    let mut existing = candidate.to_path_buf();
    let mut tail = PathBuf::new();

    // symlink_metadata so that a dangling link counts as present and is
    // rejected below instead of being written through.
    while std::fs::symlink_metadata(&existing).is_err() {
        let name = existing.file_name().ok_or_else(|| {
            SandboxError::AccessDenied(format!("cannot resolve path '{}'", original.display()))
        })?;
        tail = if tail.as_os_str().is_empty() {
            PathBuf::from(name)
        } else {
            PathBuf::from(name).join(&tail)
        };
        existing = existing
            .parent()
            .ok_or_else(|| {
                SandboxError::AccessDenied(format!(
                    "cannot resolve path '{}'",
                    original.display()
                ))
            })?
            .to_path_buf();
    }

    let canonical_existing = existing.canonicalize().map_err(|e| {
        SandboxError::AccessDenied(format!(
            "cannot resolve path '{}': {e}",
            original.display()
        ))
    })?;

    Ok((canonical_existing, tail))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir => out.push(component.as_os_str()),
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::Normal(seg) => out.push(seg),
        }
    }
    out
}
