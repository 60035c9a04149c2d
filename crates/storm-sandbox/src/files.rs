//! File manager: read, list, search and upload beneath a sandbox root.

use crate::error::SandboxError;
use crate::mime;
use crate::path_guard::{canonical_root, relative_display, resolve};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a listed filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One entry produced by a listing or a search. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File or directory name.
    pub name: String,
    /// Path relative to the sandbox root, `/`-separated.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes, files only.
    pub size: Option<u64>,
}

/// Decode a base64 payload, ignoring embedded whitespace such as line wraps.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, SandboxError> {
    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SandboxError::InvalidEncoding(e.to_string()))
}

/// Sandboxed file access rooted at a single directory.
///
/// The root is fixed at construction and is the only state held, so one
/// manager can serve concurrent calls without locking.
#[derive(Debug, Clone)]
pub struct FileManager {
    root: PathBuf,
}

impl FileManager {
    /// Open a sandbox at `root`, creating the directory (and parents) if absent.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| SandboxError::io(root, e))?;
        let root = canonical_root(root)?;
        tracing::debug!(root = %root.display(), "file sandbox ready");
        Ok(Self { root })
    }

    /// Canonical sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path, denying anything outside the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, SandboxError> {
        resolve(&self.root, Path::new(path))
    }

    /// Read a UTF-8 text file, returning its content and guessed MIME type.
    pub async fn read_file(&self, path: &str) -> Result<(String, &'static str), SandboxError> {
        let full_path = self.existing_file(path).await?;
        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| SandboxError::io(&full_path, e))?;
        Ok((content, mime::guess(&full_path)))
    }

    /// Read a file's raw bytes.
    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SandboxError> {
        let full_path = self.existing_file(path).await?;
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| SandboxError::io(&full_path, e))
    }

    /// List the immediate children of a directory, sorted by name.
    pub async fn list_directory(&self, path: &str) -> Result<Vec<FileEntry>, SandboxError> {
        let full_path = self.resolve(path)?;
        let is_dir = tokio::fs::metadata(&full_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SandboxError::NotADirectory(path.to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&full_path)
            .await
            .map_err(|e| SandboxError::io(&full_path, e))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| SandboxError::io(&full_path, e))?
        {
            let entry_path = entry.path();
            // Follow symlinks so a linked directory lists as a directory.
            let metadata = match tokio::fs::metadata(&entry_path).await {
                Ok(metadata) => metadata,
                Err(_) => entry
                    .metadata()
                    .await
                    .map_err(|e| SandboxError::io(&entry_path, e))?,
            };
            let (kind, size) = if metadata.is_dir() {
                (EntryKind::Directory, None)
            } else {
                (EntryKind::File, Some(metadata.len()))
            };
            entries.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: relative_display(&self.root, &entry_path),
                kind,
                size,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Find files whose name contains `pattern`, ignoring case.
    ///
    /// Depth-first from the root; each directory's files are reported before
    /// its subdirectories are entered. Symlinked directories are not followed
    /// and never reported.
    pub async fn search_files(&self, pattern: &str) -> Result<Vec<FileEntry>, SandboxError> {
        let root = self.root.clone();
        let needle = pattern.to_lowercase();
        tokio::task::spawn_blocking(move || walk(&root, &needle))
        .await
        .map_err(|e| SandboxError::io(&self.root, std::io::Error::other(e)))?
    }

    /// Decode `b64_content` and write it to `path`, creating parent directories.
    ///
    /// Existing files are overwritten. Returns the number of bytes written.
    pub async fn upload_file(&self, path: &str, b64_content: &str) -> Result<usize, SandboxError> {
        let full_path = self.resolve(path)?;
        let data = decode_base64(b64_content)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SandboxError::io(parent, e))?;
        }
        tokio::fs::write(&full_path, &data)
            .await
            .map_err(|e| SandboxError::io(&full_path, e))?;

        tracing::debug!(path = %full_path.display(), bytes = data.len(), "uploaded file");
        Ok(data.len())
    }

    async fn existing_file(&self, path: &str) -> Result<PathBuf, SandboxError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => Ok(full_path),
            _ => Err(SandboxError::NotFound(path.to_string())),
        }
    }
}

fn walk(root: &Path, needle: &str) -> Result<Vec<FileEntry>, SandboxError> {
    // Files sort ahead of directories, so each directory's files come out
    // before the walk descends.
    let walker = WalkDir::new(root).follow_links(false).sort_by(|a, b| {
        let a_dir = a.file_type().is_dir();
        let b_dir = b.file_type().is_dir();
        a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
    });

    let mut matches = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SandboxError::io(&path, e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().contains(needle) {
            continue;
        }
        // Symlinks are judged by their target; dangling links are skipped.
        let Ok(metadata) = std::fs::metadata(entry.path()) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        matches.push(FileEntry {
            path: relative_display(root, entry.path()),
            name,
            kind: EntryKind::File,
            size: Some(metadata.len()),
        });
    }
    Ok(matches)
}
